use anyhow::{Context, Result};
use rand::SeedableRng;
use rand::rngs::StdRng;
use samediff_core::{FrequencyPair, MatchCondition};
use samediff_experiment::{
    Connectivity, Mode, NetworkConfig, PerformanceHistory, TaskConfig, TerminationPolicy, Trial,
    TrialGenerator, TrialParams, validation_set,
};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use tracing::info;

pub struct App {
    config: TaskConfig,
}

#[derive(Debug, Serialize)]
pub struct ValidationSummary {
    pub trials: usize,
    pub catch_trials: usize,
    /// Trial count per `f1,f2/label` condition
    pub conditions: BTreeMap<String, usize>,
}

#[derive(Debug, Serialize)]
pub struct NetworkSummary {
    pub units: usize,
    pub excitatory: usize,
    pub inhibitory: usize,
    pub mean_in_degree: f64,
    pub seed: u64,
}

impl App {
    pub fn new(config_path: Option<&Path>) -> Result<Self> {
        let config = match config_path {
            Some(path) => {
                let text = fs::read_to_string(path)
                    .with_context(|| format!("reading config {}", path.display()))?;
                TaskConfig::from_json(&text)
                    .with_context(|| format!("loading config {}", path.display()))?
            }
            None => TaskConfig::default(),
        };
        Ok(Self { config })
    }

    pub fn trial(&self, params: &TrialParams, dt: f64, seed: u64) -> Result<Trial> {
        let generator = TrialGenerator::new(&self.config)?;
        let mut rng = StdRng::seed_from_u64(seed);
        Ok(generator.generate(&mut rng, dt, params)?)
    }

    pub fn validation(&self, dt: f64, seed: u64) -> Result<(ValidationSummary, Vec<Trial>)> {
        let generator = TrialGenerator::new(&self.config)?;
        let trials = validation_set(&generator, dt, seed)?;

        let mut conditions = BTreeMap::new();
        let mut catch_trials = 0;
        for trial in &trials {
            match trial.info {
                None => catch_trials += 1,
                Some(info) => {
                    let label = match info.match_condition {
                        MatchCondition::Same => "same",
                        MatchCondition::Different => "different",
                    };
                    let key = format!("{},{}/{}", info.f1, info.f2, label);
                    *conditions.entry(key).or_insert(0) += 1;
                }
            }
        }
        info!(trials = trials.len(), catch_trials, "generated validation set");

        Ok((
            ValidationSummary {
                trials: trials.len(),
                catch_trials,
                conditions,
            },
            trials,
        ))
    }

    pub fn network(
        &self,
        units: Option<usize>,
        seed: Option<u64>,
    ) -> Result<(NetworkSummary, Connectivity)> {
        let defaults = NetworkConfig::default();
        let config = NetworkConfig {
            n: units.unwrap_or(defaults.n),
            seed: seed.unwrap_or(defaults.seed),
            ..defaults
        };
        let connectivity = Connectivity::build(&config)?;
        let summary = NetworkSummary {
            units: config.n,
            excitatory: connectivity.ei.exc.len(),
            inhibitory: connectivity.ei.inh.len(),
            mean_in_degree: connectivity.mean_in_degree(),
            seed: config.seed,
        };
        Ok((summary, connectivity))
    }

    pub fn terminate(&self, history_path: &Path) -> Result<bool> {
        let text = fs::read_to_string(history_path)
            .with_context(|| format!("reading history {}", history_path.display()))?;
        let history: PerformanceHistory = serde_json::from_str(&text)
            .with_context(|| format!("parsing history {}", history_path.display()))?;
        Ok(TerminationPolicy::from_config(&self.config).should_terminate(history.as_slice()))
    }
}

pub fn trial_params(
    mode: Mode,
    catch: Option<bool>,
    fpair: Option<FrequencyPair>,
    match_condition: Option<MatchCondition>,
    index: Option<usize>,
    targets: bool,
) -> TrialParams {
    TrialParams {
        mode,
        catch,
        fpair,
        match_condition,
        minibatch_index: index,
        target_output: targets,
    }
}

pub fn write_json<T: Serialize>(value: &T, out: Option<&Path>) -> Result<()> {
    match out {
        Some(path) => {
            let file = fs::File::create(path)
                .with_context(|| format!("creating {}", path.display()))?;
            serde_json::to_writer(std::io::BufWriter::new(file), value)?;
        }
        None => println!("{}", serde_json::to_string(value)?),
    }
    Ok(())
}
