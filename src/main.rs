//! fitlab - Main Entry Point
//!
//! Explanation mode, the pipeline game and survival predictions from the terminal.

use clap::Parser;
use fitlab::cli::{
    cmd_explain, cmd_info, cmd_interactive, cmd_play, cmd_predict, cmd_train_model, Cli, Commands,
};
use fitlab::inference::Passenger;

fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "fitlab=info".into()),
        )
        .init();

    let cli = Cli::parse();
    let config = cli.lab_config()?;

    match cli.command {
        Some(Commands::Explain { retrain }) => {
            cmd_explain(&config, retrain)?;
        }
        Some(Commands::Play) => {
            cmd_play(&config)?;
        }
        Some(Commands::Predict { pclass, sex, age, sibsp, parch, fare }) => {
            let passenger = Passenger {
                pclass,
                sex,
                age,
                sibsp,
                parch,
                fare,
            };
            cmd_predict(&config, &passenger)?;
        }
        Some(Commands::TrainModel) => {
            cmd_train_model(&config)?;
        }
        Some(Commands::Info) => {
            cmd_info(&config)?;
        }
        None => {
            cmd_interactive(&config)?;
        }
    }

    Ok(())
}
