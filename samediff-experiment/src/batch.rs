use rand::SeedableRng;
use rand::rngs::StdRng;
use rayon::prelude::*;
use samediff_core::Result;
use tracing::debug;

use crate::generator::TrialGenerator;
use crate::trial::{Mode, Trial, TrialParams};

/// Generates `size` trials in parallel.
///
/// Trial `i` draws from its own RNG seeded with `seed + i`, so the batch is
/// identical for a given seed however rayon schedules the work. In
/// validation mode trial `i` also uses `minibatch_index + i`.
pub fn generate_minibatch(
    generator: &TrialGenerator<'_>,
    dt: f64,
    params: &TrialParams,
    size: usize,
    seed: u64,
) -> Result<Vec<Trial>> {
    let cycle = generator.config().validation_cycle();
    let trials = (0..size)
        .into_par_iter()
        .map(|i| {
            let mut rng = StdRng::seed_from_u64(seed.wrapping_add(i as u64));
            let mut params = params.clone();
            if params.mode == Mode::Validation {
                // Only the position within the cycle matters.
                params.minibatch_index = params.minibatch_index.map(|base| base % cycle + i);
            }
            generator.generate(&mut rng, dt, &params)
        })
        .collect::<Result<Vec<_>>>()?;

    debug!(size, mode = %params.mode, "generated minibatch");
    Ok(trials)
}

/// The full validation set: enough cycles of the deterministic condition
/// sequence to fill `n_validation()` trials, with targets.
pub fn validation_set(generator: &TrialGenerator<'_>, dt: f64, seed: u64) -> Result<Vec<Trial>> {
    let params = TrialParams::new(Mode::Validation)
        .with_minibatch_index(0)
        .with_target_output(true);
    generate_minibatch(generator, dt, &params, generator.config().n_validation(), seed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::condition::cycle_condition;
    use crate::config::TaskConfig;
    use samediff_core::ConfigurationError;

    #[test]
    fn same_seed_same_batch() {
        let config = TaskConfig::default();
        let generator = TrialGenerator::new(&config).unwrap();
        let params = TrialParams::new(Mode::Gradient);
        let a = generate_minibatch(&generator, 10.0, &params, 32, 99).unwrap();
        let b = generate_minibatch(&generator, 10.0, &params, 32, 99).unwrap();
        assert_eq!(a.len(), 32);
        for (x, y) in a.iter().zip(&b) {
            assert_eq!(x.condition, y.condition);
            assert_eq!(x.epochs, y.epochs);
            assert_eq!(x.inputs, y.inputs);
        }
    }

    #[test]
    fn validation_batch_needs_index() {
        let config = TaskConfig::default();
        let generator = TrialGenerator::new(&config).unwrap();
        let params = TrialParams::new(Mode::Validation);
        assert_eq!(
            generate_minibatch(&generator, 10.0, &params, 4, 0).unwrap_err(),
            ConfigurationError::MissingMinibatchIndex
        );
    }

    #[test]
    fn validation_batch_near_index_limit() {
        let config = TaskConfig::default();
        let generator = TrialGenerator::new(&config).unwrap();
        let base = usize::MAX - 1;
        let params = TrialParams::new(Mode::Validation).with_minibatch_index(base);
        let batch = generate_minibatch(&generator, 10.0, &params, 12, 0).unwrap();

        let cycle = config.validation_cycle();
        for (i, trial) in batch.iter().enumerate() {
            let expected = cycle_condition(&config, base % cycle + i).unwrap();
            assert_eq!(trial.condition, expected);
        }
    }

    #[test]
    fn validation_set_size() {
        let config = TaskConfig::default();
        let generator = TrialGenerator::new(&config).unwrap();
        let set = validation_set(&generator, 50.0, 0).unwrap();
        assert_eq!(set.len(), config.n_validation());
        assert_eq!(set.iter().filter(|t| t.is_catch()).count(), 100);
        assert!(set.iter().all(|t| t.mask.is_some()));
    }
}
