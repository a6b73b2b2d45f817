use ndarray::Array2;
use samediff_core::{
    ConfigurationError, Epoch, FrequencyPair, MatchCondition, Result, TrialCondition, TrialInfo,
};
use samediff_timing::Timeline;
use serde::{Deserialize, Serialize};
use std::ops::Range;
use std::str::FromStr;

use crate::schedule::EpochSchedule;

/// How trial conditions are chosen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Sampled conditions, sampled delay
    Gradient,
    /// Sampled conditions, long fixation and fixed delay
    Test,
    /// Conditions cycled deterministically by minibatch index
    Validation,
}

impl Mode {
    pub fn name(&self) -> &'static str {
        match self {
            Mode::Gradient => "gradient",
            Mode::Test => "test",
            Mode::Validation => "validation",
        }
    }
}

impl FromStr for Mode {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "gradient" => Ok(Mode::Gradient),
            "test" => Ok(Mode::Test),
            "validation" => Ok(Mode::Validation),
            other => Err(ConfigurationError::UnknownMode(other.to_string())),
        }
    }
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Per-call generation options. Any `Some` override wins over sampling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrialParams {
    pub mode: Mode,
    #[serde(default)]
    pub catch: Option<bool>,
    #[serde(default)]
    pub fpair: Option<FrequencyPair>,
    #[serde(default)]
    pub match_condition: Option<MatchCondition>,
    /// Required in validation mode
    #[serde(default)]
    pub minibatch_index: Option<usize>,
    /// Populate `outputs` and `mask`
    #[serde(default)]
    pub target_output: bool,
}

impl TrialParams {
    pub fn new(mode: Mode) -> Self {
        Self {
            mode,
            catch: None,
            fpair: None,
            match_condition: None,
            minibatch_index: None,
            target_output: false,
        }
    }

    /// Looks the mode up by name, failing on anything unrecognised.
    pub fn named(name: &str) -> Result<Self> {
        Ok(Self::new(name.parse()?))
    }

    pub fn with_catch(mut self, catch: bool) -> Self {
        self.catch = Some(catch);
        self
    }

    pub fn with_fpair(mut self, pair: FrequencyPair) -> Self {
        self.fpair = Some(pair);
        self
    }

    pub fn with_match_condition(mut self, condition: MatchCondition) -> Self {
        self.match_condition = Some(condition);
        self
    }

    pub fn with_minibatch_index(mut self, index: usize) -> Self {
        self.minibatch_index = Some(index);
        self
    }

    pub fn with_target_output(mut self, target_output: bool) -> Self {
        self.target_output = target_output;
        self
    }
}

/// One generated trial, ready to hand to a sequence model.
#[derive(Debug, Clone, Serialize)]
pub struct Trial {
    pub condition: TrialCondition,
    /// Epoch spans in continuous time, plus the total duration `T`
    pub epochs: EpochSchedule,
    /// Step time stamps and per-epoch index ranges
    pub timeline: Timeline<Epoch>,
    /// `None` for catch trials
    pub info: Option<TrialInfo>,
    /// time x channel
    pub inputs: Array2<f64>,
    pub outputs: Option<Array2<f64>>,
    /// 1 where the loss is computed, 0 elsewhere
    pub mask: Option<Array2<f64>>,
}

impl Trial {
    pub fn is_catch(&self) -> bool {
        self.condition.is_catch()
    }

    pub fn t(&self) -> &[f64] {
        &self.timeline.t
    }

    pub fn n_steps(&self) -> usize {
        self.timeline.len()
    }

    pub fn total(&self) -> f64 {
        self.epochs.total
    }

    pub fn epoch_range(&self, epoch: Epoch) -> Option<Range<usize>> {
        self.timeline.range(epoch)
    }
}
