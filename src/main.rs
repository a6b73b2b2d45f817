//! `samediff`: trial generator for the same/different frequency task.
//!
//! ```text
//! USAGE:
//!   samediff trial --mode test --fpair 18,22 --targets   One trial as JSON
//!   samediff validation --dt 10                           Validation set summary
//!   samediff network                                      Connectivity summary
//!   samediff terminate history.json                       Check the stop criterion
//! ```

mod app;

use anyhow::Result;
use clap::{Parser, Subcommand};
use samediff_core::{FrequencyPair, MatchCondition};
use samediff_experiment::Mode;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use app::App;

#[derive(Parser)]
#[command(name = "samediff", about = "Same/different frequency comparison trials", version)]
struct Cli {
    /// Task configuration as JSON; defaults are used for absent fields.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Cmd,
}

#[derive(Subcommand)]
enum Cmd {
    /// Generate a single trial and print it as JSON.
    Trial {
        /// gradient, test or validation
        #[arg(long, default_value = "gradient")]
        mode: Mode,
        #[arg(long, default_value_t = 1.0)]
        dt: f64,
        #[arg(long, default_value_t = 0)]
        seed: u64,
        /// Force catch status instead of sampling it.
        #[arg(long)]
        catch: Option<bool>,
        /// Force the frequency pair, e.g. 18,22.
        #[arg(long)]
        fpair: Option<FrequencyPair>,
        /// Force the match condition label (same or different).
        #[arg(long)]
        match_condition: Option<MatchCondition>,
        /// Minibatch index, required in validation mode.
        #[arg(long)]
        index: Option<usize>,
        /// Include target outputs and loss mask.
        #[arg(long)]
        targets: bool,
        /// Write JSON here instead of stdout.
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Generate the validation set and summarise its conditions.
    Validation {
        #[arg(long, default_value_t = 10.0)]
        dt: f64,
        #[arg(long, default_value_t = 0)]
        seed: u64,
        /// Write the full set as JSON here.
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Build the recurrent/output connectivity and summarise it.
    Network {
        /// Override the number of recurrent units.
        #[arg(long)]
        units: Option<usize>,
        /// Override the connectivity seed.
        #[arg(long)]
        seed: Option<u64>,
        /// Write the matrices as JSON here.
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Decide whether training should stop given a JSON array of scores.
    Terminate {
        history: PathBuf,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .init();

    let cli = Cli::parse();
    let app = App::new(cli.config.as_deref())?;

    match cli.command {
        Cmd::Trial {
            mode,
            dt,
            seed,
            catch,
            fpair,
            match_condition,
            index,
            targets,
            out,
        } => {
            let params = app::trial_params(mode, catch, fpair, match_condition, index, targets);
            let trial = app.trial(&params, dt, seed)?;
            app::write_json(&trial, out.as_deref())?;
        }
        Cmd::Validation { dt, seed, out } => {
            let (summary, trials) = app.validation(dt, seed)?;
            println!("{}", serde_json::to_string_pretty(&summary)?);
            if let Some(path) = out {
                app::write_json(&trials, Some(&path))?;
            }
        }
        Cmd::Network { units, seed, out } => {
            let (summary, connectivity) = app.network(units, seed)?;
            println!("{}", serde_json::to_string_pretty(&summary)?);
            if let Some(path) = out {
                app::write_json(&connectivity, Some(&path))?;
            }
        }
        Cmd::Terminate { history } => {
            let done = app.terminate(&history)?;
            println!("{done}");
        }
    }

    Ok(())
}
