//! Terminal front-end for the pipeline game

use super::{accent, bad, dim, fit_label_colored, muted, ok, pct, section, theme, warn};
use crate::dataset::Feature;
use crate::feedback::{Assessment, Severity};
use crate::pipeline::{DepthHint, GameSession, MaxDepth, PipelineStep, StepChoice};
use crate::preprocessing::{AgeStrategy, CleanupStrategy, ColumnEncoding, EncodingPlan, FeatureSelection};
use colored::Colorize;
use dialoguer::theme::ColorfulTheme;
use dialoguer::{Input, MultiSelect, Select};

const BACK: &str = "← Back";

/// Menu for steps that need no choice
const PASS_THROUGH_ITEMS: [&str; 2] = ["Continue", BACK];

/// What the learner wants after a step prompt
enum Nav {
    Stay,
    Back,
    Quit,
}

pub fn run(mut session: GameSession) -> anyhow::Result<()> {
    let theme = theme();

    loop {
        let step = session.state();
        if step != PipelineStep::Start {
            section(&format!(
                "Step {}/{}  {}",
                step.index(),
                PipelineStep::ALL.len() - 1,
                step.title()
            ));
        }

        let nav = match step {
            PipelineStep::Start => start(&mut session, &theme)?,
            PipelineStep::FeatureSelection => select_features(&mut session, &theme)?,
            PipelineStep::MissingValueHandling => handle_age(&mut session, &theme)?,
            PipelineStep::CategoricalEncoding => encode(&mut session, &theme)?,
            PipelineStep::FinalCleanup => cleanup(&mut session, &theme)?,
            PipelineStep::HyperparameterChoice => choose_depth(&mut session, &theme)?,
            PipelineStep::TrainAndEvaluate => results(&mut session, &theme)?,
        };

        match nav {
            Nav::Stay => {}
            Nav::Back => {
                session.retreat()?;
            }
            Nav::Quit => return Ok(()),
        }
    }
}

/// Report a rejected choice and keep the session where it is
fn report(err: impl std::fmt::Display) -> Nav {
    println!("  {} {}", bad("✗"), err);
    Nav::Stay
}

fn advance(session: &mut GameSession) -> Nav {
    match session.advance() {
        Ok(_) => Nav::Stay,
        Err(e) => report(e),
    }
}

/// Steps without a choice still stop here so Back can rewind past them
fn pass_through(session: &mut GameSession, theme: &ColorfulTheme, note: &str) -> anyhow::Result<Nav> {
    println!("  {}", dim(note));
    println!();
    let sel = Select::with_theme(theme)
        .items(&PASS_THROUGH_ITEMS)
        .default(0)
        .interact_opt()?;
    Ok(if continues(sel) { advance(session) } else { Nav::Back })
}

fn continues(sel: Option<usize>) -> bool {
    sel == Some(0)
}

fn start(session: &mut GameSession, theme: &ColorfulTheme) -> anyhow::Result<Nav> {
    section("Build a survival model");
    println!("  {}", muted("You will pick features, handle missing values, encode text"));
    println!("  {}", muted("columns, clean up and choose the tree depth. Then we train"));
    println!("  {}", muted("and see how well your model generalises."));
    println!();

    let sel = Select::with_theme(theme)
        .with_prompt("Ready?")
        .items(&["Start", "Quit"])
        .default(0)
        .interact_opt()?;
    Ok(match sel {
        Some(0) => advance(session),
        _ => Nav::Quit,
    })
}

fn select_features(session: &mut GameSession, theme: &ColorfulTheme) -> anyhow::Result<Nav> {
    let items: Vec<String> = Feature::ALL
        .iter()
        .map(|f| format!("{:<12} {}", f.column(), f.description()))
        .collect();
    let defaults: Vec<bool> = Feature::ALL
        .iter()
        .map(|f| FeatureSelection::DEFAULT.contains(f))
        .collect();

    let picked = MultiSelect::with_theme(theme)
        .with_prompt("Which columns should the model see? (space to toggle, esc to go back)")
        .items(&items)
        .defaults(&defaults)
        .interact_opt()?;
    let Some(picked) = picked else {
        return Ok(Nav::Back);
    };

    let selection = match FeatureSelection::new(picked.into_iter().map(|i| Feature::ALL[i])) {
        Ok(selection) => selection,
        Err(e) => return Ok(report(e)),
    };
    let excluded = selection.excluded_useful();
    if !excluded.is_empty() {
        let names: Vec<String> = excluded.iter().map(|f| f.to_string()).collect();
        println!("  {} {}", dim("left out:"), dim(&names.join(", ")));
    }
    if let Err(e) = session.choose(StepChoice::Features(selection)) {
        return Ok(report(e));
    }
    Ok(advance(session))
}

fn handle_age(session: &mut GameSession, theme: &ColorfulTheme) -> anyhow::Result<Nav> {
    if !session.requires_choice(PipelineStep::MissingValueHandling) {
        return pass_through(session, theme, "Age is not selected, nothing to fill");
    }

    let nulls = session
        .raw()
        .frame()
        .column(Feature::Age.column())
        .map(|c| c.null_count())
        .unwrap_or(0);
    println!("  {} passengers have no recorded age", accent(&nulls.to_string()));
    println!();

    let mut items: Vec<&str> = AgeStrategy::ALL.iter().map(|s| s.label()).collect();
    items.push(BACK);
    let sel = Select::with_theme(theme)
        .with_prompt("What should happen to missing ages?")
        .items(&items)
        .default(AgeStrategy::ALL.len() - 1)
        .interact_opt()?;

    Ok(match sel {
        Some(i) if i < AgeStrategy::ALL.len() => {
            match session.choose(StepChoice::Age(AgeStrategy::ALL[i])) {
                Ok(()) => advance(session),
                Err(e) => report(e),
            }
        }
        _ => Nav::Back,
    })
}

fn encode(session: &mut GameSession, theme: &ColorfulTheme) -> anyhow::Result<Nav> {
    if !session.requires_choice(PipelineStep::CategoricalEncoding) {
        return pass_through(session, theme, "No text columns selected, nothing to encode");
    }

    let categorical = session
        .choices()
        .features()
        .map(|s| s.categorical())
        .unwrap_or_default();

    let mut plan = EncodingPlan::new();
    for feature in categorical {
        let options = ColumnEncoding::options(feature);
        let mut items: Vec<&str> = options.iter().map(|o| o.label()).collect();
        items.push(BACK);
        let sel = Select::with_theme(theme)
            .with_prompt(format!("Encode {}", feature))
            .items(&items)
            .default(0)
            .interact_opt()?;
        match sel {
            Some(i) if i < options.len() => plan = plan.with(options[i]),
            _ => return Ok(Nav::Back),
        }
    }

    Ok(match session.choose(StepChoice::Encodings(plan)) {
        Ok(()) => advance(session),
        Err(e) => report(e),
    })
}

fn cleanup(session: &mut GameSession, theme: &ColorfulTheme) -> anyhow::Result<Nav> {
    let working = session.working_dataset()?;
    let nulls: usize = working.get_columns().iter().map(|c| c.null_count()).sum();
    println!(
        "  {} rows, {} missing values left",
        accent(&working.height().to_string()),
        accent(&nulls.to_string())
    );
    println!();

    let mut items: Vec<&str> = CleanupStrategy::ALL.iter().map(|s| s.label()).collect();
    items.push(BACK);
    let sel = Select::with_theme(theme)
        .with_prompt("Final cleanup")
        .items(&items)
        .default(0)
        .interact_opt()?;

    Ok(match sel {
        Some(i) if i < CleanupStrategy::ALL.len() => {
            match session.choose(StepChoice::Cleanup(CleanupStrategy::ALL[i])) {
                Ok(()) => advance(session),
                Err(e) => report(e),
            }
        }
        _ => Nav::Back,
    })
}

fn depth_prompt(theme: &ColorfulTheme, default: MaxDepth) -> anyhow::Result<MaxDepth> {
    let depth: i64 = Input::with_theme(theme)
        .with_prompt(format!("max_depth ({}-{})", MaxDepth::MIN, MaxDepth::MAX))
        .default(default.get() as i64)
        .interact_text()?;
    let depth = MaxDepth::new(depth);
    match depth.hint() {
        DepthHint::UnderfitRisk => println!("  {}", warn("a very shallow tree may underfit")),
        DepthHint::OverfitRisk => println!("  {}", warn("a very deep tree may overfit")),
        DepthHint::Balanced => println!("  {}", ok("a balanced depth")),
    }
    Ok(depth)
}

fn choose_depth(session: &mut GameSession, theme: &ColorfulTheme) -> anyhow::Result<Nav> {
    let sel = Select::with_theme(theme)
        .with_prompt("Tree depth")
        .items(&["Choose max_depth and train", BACK])
        .default(0)
        .interact_opt()?;
    if sel != Some(0) {
        return Ok(Nav::Back);
    }

    let depth = depth_prompt(theme, session.choices().max_depth().unwrap_or_default())?;
    if let Err(e) = session.choose(StepChoice::MaxDepth(depth)) {
        return Ok(report(e));
    }
    Ok(advance(session))
}

fn print_assessment(session: &GameSession, assessment: &Assessment) {
    println!(
        "  {:<16} {}",
        muted("Train accuracy"),
        pct(assessment.train_accuracy).white().bold()
    );
    println!(
        "  {:<16} {}",
        muted("Test accuracy"),
        pct(assessment.test_accuracy).white().bold()
    );
    println!("  {:<16} {}", muted("Gap"), pct(assessment.difference));
    println!("  {:<16} {:.3}", muted("F1 (test)"), assessment.f1_score);
    println!();
    println!(
        "  {:<16} {}  {}",
        muted("Verdict"),
        fit_label_colored(assessment.fit_label).bold(),
        dim(&format!("({})", assessment.tier))
    );
    println!("  {}", dim(crate::feedback::explain(assessment.fit_label)));

    section("Feedback");
    for item in &assessment.items {
        let marker = match item.severity {
            Severity::Celebrate => ok("★"),
            Severity::Positive => ok("✓"),
            Severity::Warning => warn("!"),
            Severity::Negative => bad("✗"),
        };
        println!("  {} {}", marker, item.message);
    }

    if !assessment.recommendations.is_empty() {
        section("Try next");
        for rec in &assessment.recommendations {
            println!("  {} {}", accent("›"), rec);
        }
    }

    if let Some(model) = session.fitted_model() {
        section("Feature importance");
        for (name, importance) in model.feature_importance() {
            let bar = "█".repeat((importance * 30.0).round() as usize);
            println!("  {:<10} {:>6}  {}", name, pct(importance), accent(&bar));
        }
    }
}

fn results(session: &mut GameSession, theme: &ColorfulTheme) -> anyhow::Result<Nav> {
    if let Some(assessment) = session.assessment() {
        print_assessment(session, &assessment);
    }

    println!();
    let sel = Select::with_theme(theme)
        .with_prompt("What next?")
        .items(&["Retrain with another depth", "Back", "Start over", "Quit"])
        .default(0)
        .interact_opt()?;

    Ok(match sel {
        Some(0) => {
            let current = session.choices().max_depth().unwrap_or_default();
            let depth = depth_prompt(theme, current)?;
            match session.retrain_with(depth) {
                Ok(_) => Nav::Stay,
                Err(e) => report(e),
            }
        }
        Some(1) => Nav::Back,
        Some(2) => {
            session.reset();
            Nav::Stay
        }
        _ => Nav::Quit,
    })
}
