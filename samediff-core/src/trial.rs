use crate::{ConfigurationError, Result};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Ordered pair of stimulus frequencies, `f1` presented before `f2`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "(f64, f64)", into = "(f64, f64)")]
pub struct FrequencyPair {
    pub f1: f64,
    pub f2: f64,
}

impl FrequencyPair {
    pub const fn new(f1: f64, f2: f64) -> Self {
        Self { f1, f2 }
    }

    /// Exact equality; no tolerance is applied.
    #[allow(clippy::float_cmp)]
    pub fn is_same(&self) -> bool {
        self.f1 == self.f2
    }

    /// Bitwise identity of the pair, usable as a map key.
    pub fn key(&self) -> (u64, u64) {
        (self.f1.to_bits(), self.f2.to_bits())
    }

    /// Ground-truth label, always derived from the frequencies themselves.
    pub fn choice(&self) -> Choice {
        if self.is_same() {
            Choice::Same
        } else {
            Choice::Different
        }
    }
}

impl From<(f64, f64)> for FrequencyPair {
    fn from((f1, f2): (f64, f64)) -> Self {
        Self { f1, f2 }
    }
}

impl From<FrequencyPair> for (f64, f64) {
    fn from(p: FrequencyPair) -> Self {
        (p.f1, p.f2)
    }
}

impl FromStr for FrequencyPair {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || ConfigurationError::InvalidPair(s.to_string());
        let (a, b) = s.split_once(',').ok_or_else(invalid)?;
        let f1: f64 = a.trim().parse().map_err(|_| invalid())?;
        let f2: f64 = b.trim().parse().map_err(|_| invalid())?;
        if !(f1.is_finite() && f2.is_finite() && f1 > 0.0 && f2 > 0.0) {
            return Err(invalid());
        }
        Ok(Self { f1, f2 })
    }
}

/// Label a trial was drawn under. Metadata only: scoring uses `Choice`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchCondition {
    Same,
    Different,
}

impl MatchCondition {
    pub const ALL: [MatchCondition; 2] = [MatchCondition::Same, MatchCondition::Different];
}

impl FromStr for MatchCondition {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "same" => Ok(MatchCondition::Same),
            "different" => Ok(MatchCondition::Different),
            _ => Err(ConfigurationError::InvalidMatchCondition(s.to_string())),
        }
    }
}

/// Correct decision for a comparison trial; doubles as the output channel index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum Choice {
    Same = 0,
    Different = 1,
}

impl Choice {
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(idx: usize) -> Option<Self> {
        match idx {
            0 => Some(Choice::Same),
            1 => Some(Choice::Different),
            _ => None,
        }
    }

    pub fn other(self) -> Self {
        match self {
            Choice::Same => Choice::Different,
            Choice::Different => Choice::Same,
        }
    }
}

impl From<Choice> for u8 {
    fn from(c: Choice) -> Self {
        c as u8
    }
}

impl TryFrom<u8> for Choice {
    type Error = ConfigurationError;

    fn try_from(v: u8) -> Result<Self> {
        Choice::from_index(v as usize).ok_or(ConfigurationError::InvalidChoice(v))
    }
}

/// Condition a single trial is generated under
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum TrialCondition {
    /// No stimulus, no decision
    Catch,
    Comparison {
        pair: FrequencyPair,
        match_condition: MatchCondition,
    },
}

impl TrialCondition {
    pub fn is_catch(&self) -> bool {
        matches!(self, TrialCondition::Catch)
    }

    pub fn info(&self) -> Option<TrialInfo> {
        match *self {
            TrialCondition::Catch => None,
            TrialCondition::Comparison {
                pair,
                match_condition,
            } => Some(TrialInfo {
                f1: pair.f1,
                f2: pair.f2,
                choice: pair.choice(),
                match_condition,
            }),
        }
    }
}

/// Recorded metadata for a comparison trial
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrialInfo {
    pub f1: f64,
    pub f2: f64,
    pub choice: Choice,
    pub match_condition: MatchCondition,
}
