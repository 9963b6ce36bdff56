//! Shared fixtures: a deterministic Titanic-shaped table
//!
//! Rows 1..=50 are noise: every feature and the label come from independent
//! hash bits. From row 51 on, survival follows `PassengerId % 8 in {0, 3, 5}`
//! (no threshold on the id can separate it) and `Sex` matches survival except
//! for one row in twenty.

#![allow(dead_code)]

use fitlab::dataset::RawTable;
use polars::prelude::*;

pub const NOISY_ROWS: usize = 50;

fn mix(mut x: u64) -> u64 {
    x = x.wrapping_add(0x9E37_79B9_7F4A_7C15);
    x = (x ^ (x >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    x = (x ^ (x >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    x ^ (x >> 31)
}

pub fn titanic_frame(n: usize) -> DataFrame {
    let mut ids = Vec::with_capacity(n);
    let mut survived = Vec::with_capacity(n);
    let mut pclass = Vec::with_capacity(n);
    let mut names = Vec::with_capacity(n);
    let mut sex = Vec::with_capacity(n);
    let mut age = Vec::with_capacity(n);
    let mut sibsp = Vec::with_capacity(n);
    let mut parch = Vec::with_capacity(n);
    let mut tickets = Vec::with_capacity(n);
    let mut fare = Vec::with_capacity(n);
    let mut cabin = Vec::with_capacity(n);
    let mut embarked = Vec::with_capacity(n);

    for id in 1..=n as u64 {
        let h = mix(id);
        let noisy = id as usize <= NOISY_ROWS;
        let lived = if noisy {
            (h >> 7) & 1 == 1
        } else {
            matches!(id % 8, 0 | 3 | 5)
        };
        let female = if noisy {
            (h >> 13) & 1 == 0
        } else {
            lived != (id % 20 == 7)
        };

        ids.push(id as i64);
        survived.push(i64::from(lived));
        pclass.push(1 + ((h >> 17) % 3) as i64);
        let title = match (female, id % 3 == 0, id % 7 == 0) {
            (true, true, _) => "Miss",
            (true, false, _) => "Mrs",
            (false, _, true) => "Master",
            (false, _, false) => "Mr",
        };
        names.push(format!("Surname{}, {}. Given", id, title));
        sex.push(if female { "female" } else { "male" });
        age.push(if id % 5 == 0 {
            None
        } else {
            Some(1.0 + ((h >> 23) % 70) as f64)
        });
        sibsp.push(((h >> 29) % 3) as i64);
        parch.push(((h >> 31) % 2) as i64);
        tickets.push(match id % 4 {
            0 => format!("PC {}", 17_000 + id),
            1 => format!("A/5 {}", 21_000 + id),
            _ => format!("{}", 300_000 + id),
        });
        fare.push(5.0 + id as f64 + ((h >> 37) % 100) as f64 / 100.0);
        cabin.push(if id % 6 == 0 {
            Some(format!("{}{}", ["A", "B", "C", "D", "E", "F", "G"][(id % 7) as usize], id % 100))
        } else {
            None
        });
        embarked.push(match id % 10 {
            0 => None,
            1 | 2 => Some("C"),
            3 => Some("Q"),
            _ => Some("S"),
        });
    }

    df!(
        "PassengerId" => ids,
        "Survived" => survived,
        "Pclass" => pclass,
        "Name" => names,
        "Sex" => sex,
        "Age" => age,
        "SibSp" => sibsp,
        "Parch" => parch,
        "Ticket" => tickets,
        "Fare" => fare,
        "Cabin" => cabin,
        "Embarked" => embarked
    )
    .unwrap()
}

/// Same size as the real passenger list
pub fn titanic_table() -> RawTable {
    RawTable::new(titanic_frame(891)).unwrap()
}

pub fn small_table(n: usize) -> RawTable {
    RawTable::new(titanic_frame(n)).unwrap()
}
