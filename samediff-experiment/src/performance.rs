//! Scoring of model responses against generated trials.
//!
//! A model's decision is the output channel with the largest value on the
//! final time step. Catch trials carry no decision and are not scored. The
//! batch score is the *worst* per-frequency-pair accuracy, so a model that
//! fails any single pair cannot score well.

use ndarray::ArrayView2;
use samediff_core::{Choice, ConfigurationError, FrequencyPair, Result};
use serde::Serialize;
use std::collections::BTreeMap;

use crate::trial::Trial;

/// Decision read out from a time x channel response.
pub fn decision_of(response: ArrayView2<'_, f64>) -> Option<Choice> {
    let steps = response.nrows();
    if steps == 0 {
        return None;
    }
    let (idx, _) = response
        .row(steps - 1)
        .iter()
        .enumerate()
        .fold(None, |best: Option<(usize, f64)>, (i, &v)| match best {
            Some((_, b)) if v <= b => best,
            _ => Some((i, v)),
        })?;
    Choice::from_index(idx)
}

/// Correctness of a single response; `None` for catch trials.
pub fn score_trial(trial: &Trial, response: ArrayView2<'_, f64>) -> Option<bool> {
    let info = trial.info.as_ref()?;
    Some(decision_of(response) == Some(info.choice))
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct GroupScore {
    pub correct: usize,
    pub total: usize,
}

impl GroupScore {
    fn record(&mut self, correct: bool) {
        self.total += 1;
        if correct {
            self.correct += 1;
        }
    }

    /// Percent correct, 0-100.
    pub fn accuracy(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            100.0 * self.correct as f64 / self.total as f64
        }
    }
}

/// Accuracy on one frequency pair
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PairScore {
    pub pair: FrequencyPair,
    #[serde(flatten)]
    pub score: GroupScore,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PerformanceReport {
    /// Minimum accuracy over the frequency pairs present in the batch
    pub score: f64,
    /// Every scored trial pooled together
    pub overall: GroupScore,
    /// In order of first appearance in the batch
    pub by_pair: Vec<PairScore>,
    pub by_choice: BTreeMap<Choice, GroupScore>,
    pub catch_trials: usize,
}

impl PerformanceReport {
    pub fn pair(&self, pair: FrequencyPair) -> Option<&GroupScore> {
        self.by_pair
            .iter()
            .find(|p| p.pair.key() == pair.key())
            .map(|p| &p.score)
    }
}

/// Scores a batch, reporting the accuracy of the worst-performing condition.
pub fn performance_min_condition<'r, I>(trials: &[Trial], responses: I) -> Result<PerformanceReport>
where
    I: IntoIterator<Item = ArrayView2<'r, f64>>,
    I::IntoIter: ExactSizeIterator,
{
    let responses = responses.into_iter();
    if responses.len() != trials.len() {
        return Err(ConfigurationError::ResponseMismatch {
            trials: trials.len(),
            responses: responses.len(),
        });
    }

    let mut overall = GroupScore::default();
    let mut by_pair: Vec<PairScore> = Vec::new();
    let mut slots: BTreeMap<(u64, u64), usize> = BTreeMap::new();
    let mut by_choice: BTreeMap<Choice, GroupScore> = BTreeMap::new();
    let mut catch_trials = 0;
    for (trial, response) in trials.iter().zip(responses) {
        let Some(info) = trial.info.as_ref() else {
            catch_trials += 1;
            continue;
        };
        let correct = decision_of(response) == Some(info.choice);
        let pair = FrequencyPair::new(info.f1, info.f2);

        let slot = *slots.entry(pair.key()).or_insert_with(|| {
            by_pair.push(PairScore {
                pair,
                score: GroupScore::default(),
            });
            by_pair.len() - 1
        });
        by_pair[slot].score.record(correct);
        by_choice.entry(info.choice).or_default().record(correct);
        overall.record(correct);
    }

    let score = by_pair
        .iter()
        .map(|p| p.score.accuracy())
        .reduce(f64::min)
        .unwrap_or(0.0);

    Ok(PerformanceReport {
        score,
        overall,
        by_pair,
        by_choice,
        catch_trials,
    })
}
