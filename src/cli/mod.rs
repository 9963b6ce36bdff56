//! fitlab CLI Module
//!
//! Command-line interface for explanation mode, the pipeline game and
//! single-passenger predictions.

mod game;

use clap::{Parser, Subcommand};
use colored::*;
use std::path::PathBuf;
use std::time::Instant;

use crate::comparison::{ComparisonBuilder, ComparisonBundle, ComparisonCache, Regime};
use crate::config::LabConfig;
use crate::dataset::{DatasetProvider, RawTable};
use crate::feedback::{explain, FitLabel};
use crate::inference::{ModelHandle, ModelStore, Passenger, SurvivalPredictor};
use crate::pipeline::GameSession;

// ─── Styling helpers ───────────────────────────────────────────────────────────

fn dim(s: &str) -> ColoredString   { s.truecolor(100, 100, 100) }
fn accent(s: &str) -> ColoredString { s.truecolor(120, 170, 255) }
fn muted(s: &str) -> ColoredString  { s.truecolor(140, 140, 140) }
fn ok(s: &str) -> ColoredString     { s.truecolor(100, 210, 120) }
fn warn(s: &str) -> ColoredString   { s.truecolor(235, 190, 90) }
fn bad(s: &str) -> ColoredString    { s.truecolor(230, 100, 100) }

fn step_run(msg: &str) {
    print!("  {} {}... ", accent("›"), msg);
}

fn step_done(detail: &str) {
    println!("{} {}", ok("done"), dim(detail));
}

fn section(title: &str) {
    println!();
    println!("  {}", title.white().bold());
    println!("  {}", dim(&"─".repeat(56)));
}

fn wait_enter() {
    println!();
    println!("  {}", dim("press enter to continue"));
    let mut input = String::new();
    let _ = std::io::stdin().read_line(&mut input);
}

fn pct(v: f64) -> String {
    format!("{:.1}%", v * 100.0)
}

fn fit_label_colored(label: FitLabel) -> ColoredString {
    match label {
        FitLabel::Overfitting => bad(label.as_str()),
        FitLabel::Underfitting => warn(label.as_str()),
        FitLabel::GoodFit => ok(label.as_str()),
    }
}

fn theme() -> dialoguer::theme::ColorfulTheme {
    use dialoguer::console::{style, Style};

    dialoguer::theme::ColorfulTheme {
        active_item_prefix: style("  ›".to_string()).for_stderr().cyan(),
        active_item_style: Style::new().for_stderr().white().bold(),
        inactive_item_prefix: style("   ".to_string()).for_stderr(),
        inactive_item_style: Style::new().for_stderr().color256(245),
        prompt_prefix: style("  ?".to_string()).for_stderr().color256(111),
        prompt_style: Style::new().for_stderr().white().bold(),
        checked_item_prefix: style("  ✔".to_string()).for_stderr().green(),
        unchecked_item_prefix: style("  ⬚".to_string()).for_stderr().color256(245),
        ..dialoguer::theme::ColorfulTheme::default()
    }
}

// ─── CLI definition ────────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "fitlab")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Learn overfitting, underfitting and good fit on the Titanic dataset")]
#[command(long_about = None)]
pub struct Cli {
    /// JSON configuration file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Local Titanic CSV (downloaded when missing)
    #[arg(long, global = true)]
    pub data: Option<PathBuf>,

    /// Directory for cached comparison results and the stored model
    #[arg(long, global = true)]
    pub models_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

impl Cli {
    /// Configuration file (or defaults) with command-line overrides applied
    pub fn lab_config(&self) -> anyhow::Result<LabConfig> {
        let mut config = match &self.config {
            Some(path) => LabConfig::from_file(path)?,
            None => LabConfig::default(),
        };
        if let Some(data) = &self.data {
            config = config.with_data_path(data.clone());
        }
        if let Some(dir) = &self.models_dir {
            config = config.with_models_dir(dir.clone());
        }
        config.validate()?;
        Ok(config)
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Compare an overfit, an underfit and a well-fit model side by side
    Explain {
        /// Ignore the cached results and train again
        #[arg(long)]
        retrain: bool,
    },

    /// Build your own pipeline step by step
    Play,

    /// Predict survival for one passenger
    Predict {
        /// Ticket class (1, 2 or 3)
        #[arg(long, value_parser = clap::value_parser!(u8).range(1..=3))]
        pclass: u8,

        /// male / female
        #[arg(long)]
        sex: String,

        /// Age in years (median when omitted)
        #[arg(long)]
        age: Option<f64>,

        /// Siblings and spouses aboard
        #[arg(long, default_value = "0")]
        sibsp: u32,

        /// Parents and children aboard
        #[arg(long, default_value = "0")]
        parch: u32,

        /// Ticket fare (median when omitted)
        #[arg(long)]
        fare: Option<f64>,
    },

    /// Train and store the model used for predictions
    TrainModel,

    /// Show dataset information
    Info,
}

// ─── Data loading ──────────────────────────────────────────────────────────────

pub fn load_table(config: &LabConfig) -> anyhow::Result<RawTable> {
    step_run("Loading Titanic data");
    let start = Instant::now();
    let raw = DatasetProvider::from_config(config).load()?;
    step_done(&format!(
        "{} rows × {} cols in {:?}",
        raw.height(),
        raw.frame().width(),
        start.elapsed()
    ));
    Ok(raw)
}

// ─── Commands ──────────────────────────────────────────────────────────────────

pub fn cmd_explain(config: &LabConfig, retrain: bool) -> anyhow::Result<()> {
    section("Overfitting vs underfitting vs good fit");

    let cache = ComparisonCache::in_dir(&config.models_dir);
    let bundle = cache.load_or_build(retrain, || {
        let raw = DatasetProvider::from_config(config).load()?;
        let build = ComparisonBuilder::new(config.seed).build(&raw)?;
        ModelStore::new(&config.models_dir).save(&build.primary)?;
        Ok(build.bundle)
    })?;

    print_bundle(&bundle);
    Ok(())
}

fn print_bundle(bundle: &ComparisonBundle) {
    println!();
    println!(
        "  {:<14} {:>8} {:>8} {:>8}  {}",
        muted("Model"),
        muted("Train"),
        muted("Test"),
        muted("Gap"),
        muted("Verdict")
    );
    println!("  {}", dim(&"─".repeat(56)));
    for regime in Regime::ALL {
        let entry = bundle.get(regime);
        println!(
            "  {:<14} {:>8} {:>8} {:>8}  {}",
            regime.as_str(),
            pct(entry.train_accuracy),
            pct(entry.test_accuracy),
            pct(entry.difference),
            fit_label_colored(entry.fit_label())
        );
    }

    for regime in Regime::ALL {
        let entry = bundle.get(regime);
        section(regime.as_str());
        println!("  {:<12} {}", muted("Recipe"), entry.params.description);
        println!("  {:<12} {}", muted("Features"), entry.params.features.join(", "));
        println!(
            "  {:<12} {} rows, depth {}, {} test",
            muted("Setup"),
            entry.params.n_rows,
            entry.params.max_depth,
            pct(entry.params.test_size)
        );
        println!("  {}", dim(explain(entry.fit_label())));
    }
    println!();
    println!(
        "  {}",
        dim(&format!("computed {}", bundle.created_at.format("%Y-%m-%d %H:%M UTC")))
    );
    println!();
}

pub fn cmd_play(config: &LabConfig) -> anyhow::Result<()> {
    let raw = load_table(config)?;
    let session = GameSession::new(raw).with_seed(config.seed);
    game::run(session)
}

pub fn cmd_train_model(config: &LabConfig) -> anyhow::Result<()> {
    section("Train prediction model");

    let raw = load_table(config)?;
    step_run("Training good-fit model");
    let start = Instant::now();
    let build = ComparisonBuilder::new(config.seed).build(&raw)?;
    step_done(&format!("{:?}", start.elapsed()));

    let store = ModelStore::new(&config.models_dir);
    store.save(&build.primary)?;

    let metrics = build.primary.model.metrics;
    println!();
    println!("  {:<16} {}", muted("Train accuracy"), pct(metrics.train_accuracy).white().bold());
    println!("  {:<16} {}", muted("Test accuracy"), pct(metrics.test_accuracy).white().bold());
    println!("  {:<16} {}", muted("Gap"), pct(metrics.difference()));
    println!("  {:<16} {}", muted("Saved to"), store.dir().display());
    println!();
    Ok(())
}

pub fn cmd_predict(config: &LabConfig, passenger: &Passenger) -> anyhow::Result<()> {
    section("Survival prediction");

    let handle = ModelHandle::new(ModelStore::new(&config.models_dir));
    let predictor = SurvivalPredictor::new(&handle);
    let prediction = predictor.predict(passenger)?;

    let verdict = if prediction.survived {
        ok(&prediction.label)
    } else {
        bad(&prediction.label)
    };
    println!("  {:<14} {}", muted("Verdict"), verdict.bold());
    println!("  {:<14} {}", muted("Probability"), pct(prediction.probability));

    section("What the model looks at");
    for (name, importance) in predictor.feature_importance()? {
        let bar = "█".repeat((importance * 30.0).round() as usize);
        println!("  {:<8} {:>6}  {}", name, pct(importance), accent(&bar));
    }
    println!();
    Ok(())
}

pub fn cmd_info(config: &LabConfig) -> anyhow::Result<()> {
    section("Data Info");

    let raw = DatasetProvider::from_config(config).load()?;
    let df = raw.frame();

    println!("  {:<12} {}", muted("File"), config.data_path.display());
    println!("  {:<12} {}", muted("Rows"), df.height());
    println!("  {:<12} {}", muted("Columns"), df.width());
    println!();

    println!("  {:<14} {:<14} {:>6}", muted("Column"), muted("Kind"), muted("Nulls"));
    println!("  {}", dim(&"─".repeat(40)));

    for col in df.get_columns() {
        let kind = raw
            .kind_of(col.name().as_str())
            .map(|k| format!("{:?}", k))
            .unwrap_or_else(|| "-".to_string());
        println!(
            "  {:<14} {:<14} {:>6}",
            col.name().as_str(),
            kind.truecolor(140, 140, 140),
            col.null_count()
        );
    }

    println!();
    Ok(())
}

// ─── Interactive mode ──────────────────────────────────────────────────────────

fn print_banner() {
    println!();
    println!("       {}", "┏━╸╻╺┳╸╻  ┏━┓┏┓ ".truecolor(120, 170, 255));
    println!("       {}", "┣╸ ┃ ┃ ┃  ┣━┫┣┻┓".truecolor(100, 150, 240));
    println!("       {}", "╹  ╹ ╹ ┗━╸╹ ╹┗━┛".truecolor(80, 130, 220));
    println!();
    println!(
        "       {}",
        dim(&format!("Fit regimes on the Titanic  ·  v{}", env!("CARGO_PKG_VERSION")))
    );
    println!();
}

fn prompt_passenger(theme: &dialoguer::theme::ColorfulTheme) -> anyhow::Result<Passenger> {
    use dialoguer::{Input, Select};

    let pclass = Select::with_theme(theme)
        .with_prompt("Ticket class")
        .items(&["1st", "2nd", "3rd"])
        .default(2)
        .interact()?;
    let sex = Select::with_theme(theme)
        .with_prompt("Sex")
        .items(&["male", "female"])
        .default(0)
        .interact()?;
    let age: f64 = Input::with_theme(theme)
        .with_prompt("Age")
        .default(28.0)
        .interact_text()?;
    let sibsp: u32 = Input::with_theme(theme)
        .with_prompt("Siblings / spouses aboard")
        .default(0)
        .interact_text()?;
    let parch: u32 = Input::with_theme(theme)
        .with_prompt("Parents / children aboard")
        .default(0)
        .interact_text()?;
    let fare: f64 = Input::with_theme(theme)
        .with_prompt("Fare")
        .default(14.45)
        .interact_text()?;

    Ok(Passenger::new(pclass as u8 + 1, ["male", "female"][sex])
        .with_age(age)
        .with_family(sibsp, parch)
        .with_fare(fare))
}

pub fn cmd_interactive(config: &LabConfig) -> anyhow::Result<()> {
    use dialoguer::Select;

    print_banner();
    let theme = theme();

    loop {
        let items = &[
            "Explanation mode      three models, three fit regimes",
            "Game mode             build your own pipeline",
            "Predict survival      ask the good-fit model",
            "Dataset info          columns and missing values",
            "Exit",
        ];

        println!();
        let sel = Select::with_theme(&theme)
            .with_prompt("What would you like to do")
            .items(items)
            .default(0)
            .interact_opt()?;

        let outcome = match sel {
            Some(0) => cmd_explain(config, false),
            Some(1) => cmd_play(config),
            Some(2) => prompt_passenger(&theme).and_then(|p| cmd_predict(config, &p)),
            Some(3) => cmd_info(config),
            Some(4) | None => {
                println!();
                println!("  {}", dim("goodbye"));
                println!();
                break;
            }
            _ => Ok(()),
        };
        if let Err(e) = outcome {
            println!();
            println!("  {} {}", bad("error"), e);
        }
        wait_enter();
    }

    Ok(())
}
