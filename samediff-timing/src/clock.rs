use serde::{Deserialize, Serialize};
use std::ops::Range;
use thiserror::Error;

/// Absorbs float error when a boundary sits exactly on the grid (e.g. 0.3 / 0.1).
const GRID_EPSILON: f64 = 1e-9;

/// Trait for mapping continuous trial time onto a discrete step grid
pub trait Clock: Clone + Send + Sync {
    fn dt(&self) -> f64;

    /// Step index containing `time`, i.e. `floor(time / dt)`.
    fn index(&self, time: f64) -> usize;

    /// Time stamp of step `idx`, taken at the end of the step.
    fn time_of(&self, idx: usize) -> f64;

    /// Largest grid multiple not above `time`.
    fn snap(&self, time: f64) -> f64;

    fn steps(&self, duration: f64) -> usize {
        self.index(duration)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Error)]
#[error("timestep must be finite and positive, got {0}")]
pub struct InvalidStep(pub f64);

/// Uniform grid with spacing `dt`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FixedStep {
    dt: f64,
}

impl FixedStep {
    pub fn new(dt: f64) -> Result<Self, InvalidStep> {
        if dt.is_finite() && dt > 0.0 {
            Ok(Self { dt })
        } else {
            Err(InvalidStep(dt))
        }
    }
}

impl Clock for FixedStep {
    fn dt(&self) -> f64 {
        self.dt
    }

    fn index(&self, time: f64) -> usize {
        if time <= 0.0 {
            return 0;
        }
        (time / self.dt + GRID_EPSILON).floor() as usize
    }

    fn time_of(&self, idx: usize) -> f64 {
        (idx + 1) as f64 * self.dt
    }

    fn snap(&self, time: f64) -> f64 {
        (time / self.dt + GRID_EPSILON).floor() * self.dt
    }
}

/// Half-open interval `[start, end)` in continuous time units
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Span {
    pub start: f64,
    pub end: f64,
}

impl Span {
    pub fn new(start: f64, end: f64) -> Self {
        Self { start, end }
    }

    pub fn duration(&self) -> f64 {
        self.end - self.start
    }
}

/// Discretised trial timeline: one time stamp per step plus an index range per key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Timeline<K> {
    pub t: Vec<f64>,
    pub ranges: Vec<(K, Range<usize>)>,
}

impl<K: Copy + PartialEq> Timeline<K> {
    /// Converts every span to an index range on `clock`'s grid. Only the named
    /// spans are converted; `total` just sets the number of steps.
    pub fn discretize<C: Clock>(clock: &C, total: f64, spans: &[(K, Span)]) -> Self {
        let n = clock.steps(total);
        let t = (0..n).map(|i| clock.time_of(i)).collect();
        let ranges = spans
            .iter()
            .map(|&(key, span)| {
                let start = clock.index(span.start).min(n);
                let end = clock.index(span.end).clamp(start, n);
                (key, start..end)
            })
            .collect();
        Self { t, ranges }
    }

    pub fn len(&self) -> usize {
        self.t.len()
    }

    pub fn is_empty(&self) -> bool {
        self.t.is_empty()
    }

    pub fn range(&self, key: K) -> Option<Range<usize>> {
        self.ranges
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, r)| r.clone())
    }

    /// Indices covered by any of `keys`, in ascending order.
    pub fn indices_of(&self, keys: &[K]) -> Vec<usize> {
        let mut idx: Vec<usize> = self
            .ranges
            .iter()
            .filter(|(k, _)| keys.contains(k))
            .flat_map(|(_, r)| r.clone())
            .collect();
        idx.sort_unstable();
        idx.dedup();
        idx
    }
}
