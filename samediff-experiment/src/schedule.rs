use rand::Rng;
use samediff_core::{Epoch, Phase, TrialCondition};
use samediff_timing::{Clock, Span};
use serde::{Deserialize, Serialize};

use crate::config::EpochDurations;
use crate::trial::Mode;

/// Epoch layout of one trial in continuous time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpochSchedule {
    /// Total trial duration `T`
    pub total: f64,
    /// Contiguous spans in trial order; empty for catch trials
    pub spans: Vec<(Epoch, Span)>,
}

impl EpochSchedule {
    pub fn span(&self, epoch: Epoch) -> Option<Span> {
        self.spans
            .iter()
            .find(|(e, _)| *e == epoch)
            .map(|(_, s)| *s)
    }
}

impl EpochDurations {
    /// Length of `epoch` under `mode`. Only the non-test delay consumes randomness.
    pub fn duration_of<C: Clock, R: Rng + ?Sized>(
        &self,
        epoch: Epoch,
        mode: Mode,
        clock: &C,
        rng: &mut R,
    ) -> f64 {
        let test = mode == Mode::Test;
        match epoch {
            Epoch::Fixation if test => self.fixation_test,
            Epoch::Fixation => self.fixation,
            Epoch::F1 => self.f1,
            Epoch::Delay if test => self.delay_test,
            Epoch::Delay => {
                let (lo, hi) = self.delay_range;
                clock.snap(rng.random_range(lo..=hi))
            }
            Epoch::F2 => self.f2,
            Epoch::Decision => self.decision,
        }
    }
}

/// Lays out the epochs of a trial. Catch trials get only a total duration.
pub fn schedule_epochs<C: Clock, R: Rng + ?Sized>(
    durations: &EpochDurations,
    mode: Mode,
    condition: &TrialCondition,
    clock: &C,
    rng: &mut R,
) -> EpochSchedule {
    if condition.is_catch() {
        return EpochSchedule {
            total: durations.catch,
            spans: Vec::new(),
        };
    }

    let mut offset = 0.0;
    let spans = Epoch::sequence()
        .into_iter()
        .map(|epoch| {
            let start = offset;
            offset += durations.duration_of(epoch, mode, clock, rng);
            (epoch, Span::new(start, offset))
        })
        .collect();

    EpochSchedule {
        total: offset,
        spans,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use samediff_core::{FrequencyPair, MatchCondition};
    use samediff_timing::FixedStep;

    fn comparison() -> TrialCondition {
        TrialCondition::Comparison {
            pair: FrequencyPair::new(18.0, 22.0),
            match_condition: MatchCondition::Different,
        }
    }

    #[test]
    fn test_mode_is_fixed_length() {
        let clock = FixedStep::new(1.0).unwrap();
        let mut rng = StdRng::seed_from_u64(0);
        let schedule = schedule_epochs(
            &EpochDurations::default(),
            Mode::Test,
            &comparison(),
            &clock,
            &mut rng,
        );
        assert_eq!(schedule.total, 4800.0);
        assert_eq!(schedule.span(Epoch::Fixation), Some(Span::new(0.0, 500.0)));
        assert_eq!(schedule.span(Epoch::F1), Some(Span::new(500.0, 1000.0)));
        assert_eq!(schedule.span(Epoch::Delay), Some(Span::new(1000.0, 4000.0)));
        assert_eq!(schedule.span(Epoch::F2), Some(Span::new(4000.0, 4500.0)));
        assert_eq!(schedule.span(Epoch::Decision), Some(Span::new(4500.0, 4800.0)));
    }

    #[test]
    fn sampled_delay_stays_in_range_and_on_grid() {
        let clock = FixedStep::new(20.0).unwrap();
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..200 {
            let schedule = schedule_epochs(
                &EpochDurations::default(),
                Mode::Gradient,
                &comparison(),
                &clock,
                &mut rng,
            );
            let delay = schedule.span(Epoch::Delay).unwrap().duration();
            assert!((2500.0..=3500.0).contains(&delay));
            assert_eq!(delay % 20.0, 0.0);
            assert_eq!(schedule.span(Epoch::Fixation).unwrap().duration(), 100.0);
        }
    }

    #[test]
    fn catch_has_no_named_epochs() {
        let clock = FixedStep::new(1.0).unwrap();
        let mut rng = StdRng::seed_from_u64(0);
        let schedule = schedule_epochs(
            &EpochDurations::default(),
            Mode::Gradient,
            &TrialCondition::Catch,
            &clock,
            &mut rng,
        );
        assert_eq!(schedule.total, 2500.0);
        assert!(schedule.spans.is_empty());
    }

    #[test]
    fn zero_length_epoch_is_kept() {
        let clock = FixedStep::new(1.0).unwrap();
        let mut rng = StdRng::seed_from_u64(0);
        let durations = EpochDurations {
            delay_range: (0.0, 0.0),
            ..EpochDurations::default()
        };
        let schedule = schedule_epochs(&durations, Mode::Gradient, &comparison(), &clock, &mut rng);
        assert_eq!(schedule.span(Epoch::Delay), Some(Span::new(600.0, 600.0)));
        assert_eq!(schedule.spans.len(), 5);
    }
}
