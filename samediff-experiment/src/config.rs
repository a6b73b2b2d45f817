use samediff_core::{
    ConfigurationError, FrequencyPair, MatchCondition, Result, StimulusEncoder,
};
use serde::{Deserialize, Serialize};

/// Epoch lengths in trial time units
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EpochDurations {
    pub fixation: f64,
    /// Fixation in `test` mode
    pub fixation_test: f64,
    pub f1: f64,
    /// Uniform range the delay is drawn from outside `test` mode
    pub delay_range: (f64, f64),
    /// Delay in `test` mode
    pub delay_test: f64,
    pub f2: f64,
    pub decision: f64,
    /// Whole length of a catch trial, independent of the comparison epochs
    pub catch: f64,
}

impl Default for EpochDurations {
    fn default() -> Self {
        Self {
            fixation: 100.0,
            fixation_test: 500.0,
            f1: 500.0,
            delay_range: (2500.0, 3500.0),
            delay_test: 3000.0,
            f2: 500.0,
            decision: 300.0,
            catch: 2500.0,
        }
    }
}

impl EpochDurations {
    fn validate(&self) -> Result<()> {
        let fixed = [
            ("fixation", self.fixation),
            ("fixation_test", self.fixation_test),
            ("f1", self.f1),
            ("delay_test", self.delay_test),
            ("f2", self.f2),
            ("decision", self.decision),
            ("catch", self.catch),
        ];
        for (epoch, d) in fixed {
            if !(d.is_finite() && d >= 0.0) {
                return Err(ConfigurationError::InvalidDuration {
                    epoch,
                    reason: format!("{d} is not a finite non-negative duration"),
                });
            }
        }
        let (lo, hi) = self.delay_range;
        if !(lo.is_finite() && hi.is_finite() && 0.0 <= lo && lo <= hi) {
            return Err(ConfigurationError::InvalidDuration {
                epoch: "delay",
                reason: format!("range ({lo}, {hi}) is not an ordered non-negative interval"),
            });
        }
        Ok(())
    }
}

/// Output hold values for target construction
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct TargetLevels {
    pub high: f64,
    pub low: f64,
}

impl Default for TargetLevels {
    fn default() -> Self {
        Self { high: 1.0, low: 0.2 }
    }
}

/// Immutable task definition shared by every trial generator.
///
/// Build once at startup and pass by reference; nothing here changes while
/// trials are generated.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TaskConfig {
    pub fpairs: Vec<FrequencyPair>,
    pub match_conditions: Vec<MatchCondition>,
    pub durations: EpochDurations,
    pub targets: TargetLevels,
    /// Score (0-100) at which training stops
    pub target_performance: f64,
    /// Number of most recent scores averaged by the termination check
    pub termination_window: usize,
    /// Validation set size is this times the validation cycle length
    pub validation_repeats: usize,
}

impl Default for TaskConfig {
    fn default() -> Self {
        Self {
            fpairs: vec![
                FrequencyPair::new(18.0, 18.0),
                FrequencyPair::new(22.0, 22.0),
                FrequencyPair::new(18.0, 22.0),
                FrequencyPair::new(22.0, 18.0),
            ],
            match_conditions: MatchCondition::ALL.to_vec(),
            durations: EpochDurations::default(),
            targets: TargetLevels::default(),
            target_performance: 85.0,
            termination_window: 1,
            validation_repeats: 100,
        }
    }
}

impl TaskConfig {
    /// Parses a JSON document; absent fields keep their defaults.
    pub fn from_json(text: &str) -> Result<Self> {
        let config: Self =
            serde_json::from_str(text).map_err(|e| ConfigurationError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.fpairs.is_empty() {
            return Err(ConfigurationError::EmptyCatalog);
        }
        if !self.fpairs.iter().any(FrequencyPair::is_same) {
            return Err(ConfigurationError::MissingPairKind("same"));
        }
        if self.fpairs.iter().all(FrequencyPair::is_same) {
            return Err(ConfigurationError::MissingPairKind("different"));
        }
        if self.match_conditions.is_empty() {
            return Err(ConfigurationError::EmptyMatchConditions);
        }
        self.encoder()?;
        self.durations.validate()?;
        if self.termination_window == 0 {
            return Err(ConfigurationError::InvalidTermination(
                "window must hold at least one score".to_string(),
            ));
        }
        if !self.target_performance.is_finite() {
            return Err(ConfigurationError::InvalidTermination(format!(
                "target {} is not finite",
                self.target_performance
            )));
        }
        Ok(())
    }

    pub fn nconditions(&self) -> usize {
        self.fpairs.len()
    }

    /// Length of one deterministic validation cycle: one catch slot plus one
    /// slot per catalog pair.
    pub fn validation_cycle(&self) -> usize {
        self.nconditions() + 1
    }

    pub fn pcatch(&self) -> f64 {
        1.0 / self.validation_cycle() as f64
    }

    pub fn n_validation(&self) -> usize {
        self.validation_repeats * self.validation_cycle()
    }

    pub fn encoder(&self) -> Result<StimulusEncoder> {
        StimulusEncoder::from_pairs(&self.fpairs)
    }
}
