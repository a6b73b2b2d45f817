use ndarray::{Array2, s};
use rand::Rng;
use samediff_core::{
    Channel, ConfigurationError, Epoch, Phase, Result, StimulusEncoder, TrialInfo,
};
use samediff_timing::{FixedStep, Timeline};
use tracing::debug;

use crate::condition::select_condition;
use crate::config::{TargetLevels, TaskConfig};
use crate::schedule::schedule_epochs;
use crate::trial::{Trial, TrialParams};

/// Output channels, one per possible choice
pub const N_OUT: usize = 2;

/// Builds trials against one validated task configuration.
///
/// Holds no mutable state, so a single generator can be shared across
/// threads as long as each thread brings its own RNG.
#[derive(Debug, Clone)]
pub struct TrialGenerator<'a> {
    config: &'a TaskConfig,
    encoder: StimulusEncoder,
}

impl<'a> TrialGenerator<'a> {
    pub fn new(config: &'a TaskConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            encoder: config.encoder()?,
        })
    }

    pub fn config(&self) -> &TaskConfig {
        self.config
    }

    pub fn encoder(&self) -> &StimulusEncoder {
        &self.encoder
    }

    /// Generates one complete trial, or nothing at all on error.
    pub fn generate<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        dt: f64,
        params: &TrialParams,
    ) -> Result<Trial> {
        let clock = FixedStep::new(dt).map_err(|e| ConfigurationError::InvalidTimestep(e.0))?;

        let condition = select_condition(self.config, params, rng)?;
        let epochs = schedule_epochs(&self.config.durations, params.mode, &condition, &clock, rng);
        let timeline = Timeline::discretize(&clock, epochs.total, &epochs.spans);
        let info = condition.info();

        let inputs = self.inputs(&timeline, info.as_ref());
        let (outputs, mask) = if params.target_output {
            let (y, m) = targets(&timeline, info.as_ref(), self.config.targets);
            (Some(y), Some(m))
        } else {
            (None, None)
        };

        debug!(
            mode = %params.mode,
            catch = condition.is_catch(),
            total = epochs.total,
            steps = timeline.len(),
            "generated trial"
        );

        Ok(Trial {
            condition,
            epochs,
            timeline,
            info,
            inputs,
            outputs,
            mask,
        })
    }

    fn inputs(&self, timeline: &Timeline<Epoch>, info: Option<&TrialInfo>) -> Array2<f64> {
        let mut x = Array2::zeros((timeline.len(), Channel::COUNT));
        let Some(info) = info else {
            return x;
        };

        for epoch in Epoch::sequence().into_iter().filter(Phase::carries_stimulus) {
            let f = match epoch {
                Epoch::F2 => info.f2,
                _ => info.f1,
            };
            let Some(range) = timeline.range(epoch) else {
                continue;
            };
            for channel in [Channel::Positive, Channel::Negative] {
                x.slice_mut(s![range.clone(), channel.index()])
                    .fill(self.encoder.intensity(channel, f));
            }
        }
        x
    }
}

/// Target outputs and loss mask.
///
/// Catch trials hold every output low and train on every step. Comparison
/// trials hold low during fixation, put the chosen channel high during the
/// decision epoch, and train only on the trained epochs.
fn targets(
    timeline: &Timeline<Epoch>,
    info: Option<&TrialInfo>,
    levels: TargetLevels,
) -> (Array2<f64>, Array2<f64>) {
    let n = timeline.len();
    let mut y = Array2::zeros((n, N_OUT));
    let mut m = Array2::zeros((n, N_OUT));

    let Some(info) = info else {
        y.fill(levels.low);
        m.fill(1.0);
        return (y, m);
    };

    if let Some(fixation) = timeline.range(Epoch::Fixation) {
        y.slice_mut(s![fixation, ..]).fill(levels.low);
    }
    if let Some(decision) = timeline.range(Epoch::Decision) {
        y.slice_mut(s![decision.clone(), info.choice.index()])
            .fill(levels.high);
        y.slice_mut(s![decision, info.choice.other().index()])
            .fill(levels.low);
    }

    let trained: Vec<Epoch> = Epoch::sequence()
        .into_iter()
        .filter(Phase::is_trained)
        .collect();
    for i in timeline.indices_of(&trained) {
        m.row_mut(i).fill(1.0);
    }

    (y, m)
}

/// One-shot form of [`TrialGenerator::generate`].
pub fn generate_trial<R: Rng + ?Sized>(
    rng: &mut R,
    dt: f64,
    params: &TrialParams,
    config: &TaskConfig,
) -> Result<Trial> {
    TrialGenerator::new(config)?.generate(rng, dt, params)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trial::Mode;
    use approx::assert_abs_diff_eq;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use samediff_core::{Choice, FrequencyPair};

    #[test]
    fn rejects_bad_timestep() {
        let config = TaskConfig::default();
        let mut rng = StdRng::seed_from_u64(0);
        let params = TrialParams::new(Mode::Test);
        assert_eq!(
            generate_trial(&mut rng, 0.0, &params, &config).unwrap_err(),
            ConfigurationError::InvalidTimestep(0.0)
        );
    }

    #[test]
    fn targets_only_when_requested() {
        let config = TaskConfig::default();
        let generator = TrialGenerator::new(&config).unwrap();
        let mut rng = StdRng::seed_from_u64(0);

        let trial = generator
            .generate(&mut rng, 10.0, &TrialParams::new(Mode::Gradient))
            .unwrap();
        assert!(trial.outputs.is_none());
        assert!(trial.mask.is_none());

        let params = TrialParams::new(Mode::Gradient).with_target_output(true);
        let trial = generator.generate(&mut rng, 10.0, &params).unwrap();
        assert_eq!(trial.outputs.as_ref().unwrap().dim(), (trial.n_steps(), N_OUT));
        assert_eq!(trial.mask.as_ref().unwrap().dim(), (trial.n_steps(), N_OUT));
    }

    #[test]
    fn catch_trial_is_silent_and_fully_masked() {
        let config = TaskConfig::default();
        let mut rng = StdRng::seed_from_u64(0);
        let params = TrialParams::new(Mode::Gradient)
            .with_catch(true)
            .with_target_output(true);
        let trial = generate_trial(&mut rng, 1.0, &params, &config).unwrap();

        assert!(trial.info.is_none());
        assert_eq!(trial.n_steps(), 2500);
        assert!(trial.inputs.iter().all(|&v| v == 0.0));
        assert!(trial.outputs.unwrap().iter().all(|&v| v == 0.2));
        assert!(trial.mask.unwrap().iter().all(|&v| v == 1.0));
    }

    #[test]
    fn decision_targets_follow_choice() {
        let config = TaskConfig::default();
        let mut rng = StdRng::seed_from_u64(0);
        let params = TrialParams::new(Mode::Test)
            .with_catch(false)
            .with_fpair(FrequencyPair::new(22.0, 22.0))
            .with_target_output(true);
        let trial = generate_trial(&mut rng, 10.0, &params, &config).unwrap();
        assert_eq!(trial.info.unwrap().choice, Choice::Same);

        let y = trial.outputs.as_ref().unwrap();
        let decision = trial.epoch_range(Epoch::Decision).unwrap();
        for i in decision {
            assert_abs_diff_eq!(y[[i, Choice::Same.index()]], 1.0);
            assert_abs_diff_eq!(y[[i, Choice::Different.index()]], 0.2);
        }
        let delay = trial.epoch_range(Epoch::Delay).unwrap();
        assert!(delay.into_iter().all(|i| y[[i, 0]] == 0.0 && y[[i, 1]] == 0.0));
    }
}
