use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::TaskConfig;

/// Append-only record of per-minibatch scores, owned by the training loop.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PerformanceHistory {
    scores: Vec<f64>,
}

impl PerformanceHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, score: f64) {
        self.scores.push(score);
    }

    pub fn latest(&self) -> Option<f64> {
        self.scores.last().copied()
    }

    /// The most recent `n` scores, fewer if the history is shorter.
    pub fn window(&self, n: usize) -> &[f64] {
        &self.scores[self.scores.len().saturating_sub(n)..]
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.scores
    }

    pub fn len(&self) -> usize {
        self.scores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }
}

impl From<Vec<f64>> for PerformanceHistory {
    fn from(scores: Vec<f64>) -> Self {
        Self { scores }
    }
}

/// Stops training once the mean of the last `window` scores reaches `target`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TerminationPolicy {
    pub target: f64,
    pub window: usize,
}

impl Default for TerminationPolicy {
    fn default() -> Self {
        Self {
            target: 85.0,
            window: 1,
        }
    }
}

impl TerminationPolicy {
    pub fn from_config(config: &TaskConfig) -> Self {
        Self {
            target: config.target_performance,
            window: config.termination_window.max(1),
        }
    }

    /// An empty history never terminates.
    pub fn should_terminate(&self, history: &[f64]) -> bool {
        let recent = &history[history.len().saturating_sub(self.window.max(1))..];
        if recent.is_empty() {
            return false;
        }
        let mean = recent.iter().sum::<f64>() / recent.len() as f64;
        let done = mean >= self.target;
        if done {
            info!(mean, target = self.target, "performance target reached");
        }
        done
    }
}

/// Default policy: a single score of at least 85 ends training.
pub fn terminate(history: &[f64]) -> bool {
    TerminationPolicy::default().should_terminate(history)
}
