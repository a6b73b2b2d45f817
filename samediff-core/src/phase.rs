use serde::{Deserialize, Serialize};

/// Defines the ordered phases of a comparison trial and how each is treated
pub trait Phase: Copy + Clone + PartialEq + Eq + Send + Sync + std::fmt::Debug {
    /// Phase every comparison trial opens with
    fn first() -> Self;
    fn next(&self) -> Option<Self>;
    fn name(&self) -> &'static str;

    /// Loss is computed on this phase's time steps
    fn is_trained(&self) -> bool {
        false
    }

    /// A stimulus is presented during this phase
    fn carries_stimulus(&self) -> bool {
        false
    }

    /// Every phase from `first()` onwards, in trial order.
    fn sequence() -> Vec<Self> {
        let mut phases = vec![Self::first()];
        while let Some(next) = phases.last().and_then(Phase::next) {
            phases.push(next);
        }
        phases
    }
}

/// Named epochs of a same/different comparison trial.
///
/// The total duration `T` is deliberately not a variant: it is a scalar, not
/// an interval, and lives on the schedule itself.
#[derive(Copy, Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Epoch {
    Fixation,
    F1,
    Delay,
    F2,
    Decision,
}

impl Phase for Epoch {
    fn first() -> Self {
        Epoch::Fixation
    }

    fn next(&self) -> Option<Self> {
        use Epoch::*;
        Some(match self {
            Fixation => F1,
            F1 => Delay,
            Delay => F2,
            F2 => Decision,
            Decision => return None,
        })
    }

    fn name(&self) -> &'static str {
        match self {
            Epoch::Fixation => "fixation",
            Epoch::F1 => "f1",
            Epoch::Delay => "delay",
            Epoch::F2 => "f2",
            Epoch::Decision => "decision",
        }
    }

    fn is_trained(&self) -> bool {
        matches!(self, Epoch::Fixation | Epoch::Decision)
    }

    fn carries_stimulus(&self) -> bool {
        matches!(self, Epoch::F1 | Epoch::F2)
    }
}

impl std::fmt::Display for Epoch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sequence_follows_trial_order() {
        assert_eq!(
            Epoch::sequence(),
            vec![
                Epoch::Fixation,
                Epoch::F1,
                Epoch::Delay,
                Epoch::F2,
                Epoch::Decision
            ]
        );
    }

    #[test]
    fn only_fixation_and_decision_are_trained() {
        let trained: Vec<_> = Epoch::sequence()
            .into_iter()
            .filter(Phase::is_trained)
            .collect();
        assert_eq!(trained, vec![Epoch::Fixation, Epoch::Decision]);
    }

    #[test]
    fn stimulus_epochs() {
        assert!(Epoch::F1.carries_stimulus());
        assert!(Epoch::F2.carries_stimulus());
        assert!(!Epoch::Delay.carries_stimulus());
    }
}
