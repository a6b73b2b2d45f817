use crate::{ConfigurationError, FrequencyPair, Result};
use serde::{Deserialize, Serialize};

/// Input channels driven by a frequency stimulus
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    Positive,
    Negative,
}

impl Channel {
    pub const COUNT: usize = 2;

    pub fn index(self) -> usize {
        match self {
            Channel::Positive => 0,
            Channel::Negative => 1,
        }
    }
}

/// Maps a frequency onto a pair of complementary channel intensities.
///
/// Both intensities lie in `[LOW, LOW + SPAN]` across the catalog range and
/// always sum to `2 * LOW + SPAN`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StimulusEncoder {
    fmin: f64,
    fmax: f64,
}

impl StimulusEncoder {
    const LOW: f64 = 0.4;
    const SPAN: f64 = 0.8;

    pub fn new(fmin: f64, fmax: f64) -> Result<Self> {
        if !(fmax > fmin) {
            return Err(ConfigurationError::DegenerateCatalog(fmin));
        }
        Ok(Self { fmin, fmax })
    }

    /// Extrema over every frequency that appears in the catalog.
    pub fn from_pairs(pairs: &[FrequencyPair]) -> Result<Self> {
        let mut all = pairs.iter().flat_map(|p| [p.f1, p.f2]);
        let first = all.next().ok_or(ConfigurationError::EmptyCatalog)?;
        let (fmin, fmax) = all.fold((first, first), |(lo, hi), f| (lo.min(f), hi.max(f)));
        Self::new(fmin, fmax)
    }

    pub fn fmin(&self) -> f64 {
        self.fmin
    }

    pub fn fmax(&self) -> f64 {
        self.fmax
    }

    /// Increases with `f`
    pub fn scale_p(&self, f: f64) -> f64 {
        Self::LOW + Self::SPAN * (f - self.fmin) / (self.fmax - self.fmin)
    }

    /// Decreases with `f`
    pub fn scale_n(&self, f: f64) -> f64 {
        Self::LOW + Self::SPAN * (self.fmax - f) / (self.fmax - self.fmin)
    }

    pub fn intensity(&self, channel: Channel, f: f64) -> f64 {
        match channel {
            Channel::Positive => self.scale_p(f),
            Channel::Negative => self.scale_n(f),
        }
    }

    /// Intensities indexed by `Channel::index`.
    pub fn encode(&self, f: f64) -> [f64; Channel::COUNT] {
        [self.scale_p(f), self.scale_n(f)]
    }
}
