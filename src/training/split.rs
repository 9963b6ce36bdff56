//! Seeded train/test splitting

use crate::error::{FitLabError, Result};
use ndarray::{Array1, Array2};
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Row indices on each side of a split, sorted ascending
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitIndices {
    pub train: Vec<usize>,
    pub test: Vec<usize>,
}

/// Shuffle split with an optional per-class stratification
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrainTestSplitter {
    /// Fraction of rows assigned to the test side
    pub test_size: f64,
    pub stratify: bool,
    pub random_state: u64,
}

impl TrainTestSplitter {
    pub fn new(test_size: f64) -> Self {
        Self {
            test_size,
            stratify: false,
            random_state: 42,
        }
    }

    pub fn with_stratify(mut self, stratify: bool) -> Self {
        self.stratify = stratify;
        self
    }

    /// Set random state for reproducibility
    pub fn with_random_state(mut self, seed: u64) -> Self {
        self.random_state = seed;
        self
    }

    pub fn split(&self, y: &Array1<f64>) -> Result<SplitIndices> {
        if !(self.test_size > 0.0 && self.test_size < 1.0) {
            return Err(FitLabError::Training(format!(
                "test_size must be in (0, 1), got {}",
                self.test_size
            )));
        }
        let n = y.len();
        if n < 2 {
            return Err(FitLabError::Training(format!(
                "need at least 2 rows to split, got {}",
                n
            )));
        }

        let mut rng = ChaCha8Rng::seed_from_u64(self.random_state);
        let (mut train, mut test) = if self.stratify {
            self.stratified(y, &mut rng)?
        } else {
            let mut indices: Vec<usize> = (0..n).collect();
            indices.shuffle(&mut rng);
            let n_test = ((n as f64) * self.test_size).ceil() as usize;
            let n_test = n_test.clamp(1, n - 1);
            let train = indices.split_off(n_test);
            (train, indices)
        };

        train.sort_unstable();
        test.sort_unstable();
        Ok(SplitIndices { train, test })
    }

    /// Each class is shuffled on its own; classes are visited in ascending label order
    fn stratified(&self, y: &Array1<f64>, rng: &mut ChaCha8Rng) -> Result<(Vec<usize>, Vec<usize>)> {
        let mut class_indices: BTreeMap<i64, Vec<usize>> = BTreeMap::new();
        for (i, &label) in y.iter().enumerate() {
            class_indices.entry(label.round() as i64).or_default().push(i);
        }

        if let Some((label, members)) = class_indices.iter().find(|(_, m)| m.len() < 2) {
            return Err(FitLabError::Training(format!(
                "class {} has only {} member(s); cannot stratify",
                label,
                members.len()
            )));
        }

        let mut train = Vec::with_capacity(y.len());
        let mut test = Vec::new();
        for mut members in class_indices.into_values() {
            members.shuffle(rng);
            let n_test = ((members.len() as f64) * self.test_size).round() as usize;
            let n_test = n_test.clamp(1, members.len() - 1);
            test.extend_from_slice(&members[..n_test]);
            train.extend_from_slice(&members[n_test..]);
        }
        Ok((train, test))
    }
}

/// Gather rows of `x` in index order
pub fn take_rows(x: &Array2<f64>, indices: &[usize]) -> Array2<f64> {
    Array2::from_shape_fn((indices.len(), x.ncols()), |(i, j)| x[[indices[i], j]])
}

pub fn take(y: &Array1<f64>, indices: &[usize]) -> Array1<f64> {
    Array1::from_iter(indices.iter().map(|&i| y[i]))
}
