//! Chooses the condition each trial is generated under.
//!
//! Sampling modes draw catch status, pair and match condition independently
//! (each skipped when overridden). Validation mode cycles through a fixed
//! sequence keyed by the minibatch index: slot 0 is a catch trial and slot
//! `b > 0` unravels `b - 1` row-major over `(pairs, match conditions)`.

use rand::Rng;
use rand::seq::IndexedRandom;
use samediff_core::{ConfigurationError, Result, TrialCondition};
use tracing::trace;

use crate::config::TaskConfig;
use crate::trial::{Mode, TrialParams};

pub fn select_condition<R: Rng + ?Sized>(
    config: &TaskConfig,
    params: &TrialParams,
    rng: &mut R,
) -> Result<TrialCondition> {
    let condition = match params.mode {
        Mode::Gradient | Mode::Test => sample_condition(config, params, rng)?,
        Mode::Validation => {
            let index = params
                .minibatch_index
                .ok_or(ConfigurationError::MissingMinibatchIndex)?;
            cycle_condition(config, index)?
        }
    };
    trace!(mode = %params.mode, ?condition, "selected trial condition");
    Ok(condition)
}

fn sample_condition<R: Rng + ?Sized>(
    config: &TaskConfig,
    params: &TrialParams,
    rng: &mut R,
) -> Result<TrialCondition> {
    let catch = match params.catch {
        Some(catch) => catch,
        None => rng.random::<f64>() < config.pcatch(),
    };
    if catch {
        return Ok(TrialCondition::Catch);
    }

    let pair = match params.fpair {
        Some(pair) => pair,
        None => *config
            .fpairs
            .choose(rng)
            .ok_or(ConfigurationError::EmptyCatalog)?,
    };
    let match_condition = match params.match_condition {
        Some(condition) => condition,
        None => *config
            .match_conditions
            .choose(rng)
            .ok_or(ConfigurationError::EmptyMatchConditions)?,
    };

    Ok(TrialCondition::Comparison {
        pair,
        match_condition,
    })
}

/// Deterministic condition for validation slot `minibatch_index`.
pub fn cycle_condition(config: &TaskConfig, minibatch_index: usize) -> Result<TrialCondition> {
    let b = minibatch_index % config.validation_cycle();
    if b == 0 {
        return Ok(TrialCondition::Catch);
    }

    let n_conditions = config.match_conditions.len();
    if n_conditions == 0 {
        return Err(ConfigurationError::EmptyMatchConditions);
    }
    let (pair_idx, cond_idx) = ((b - 1) / n_conditions, (b - 1) % n_conditions);
    let pair = *config
        .fpairs
        .get(pair_idx)
        .ok_or(ConfigurationError::EmptyCatalog)?;

    Ok(TrialCondition::Comparison {
        pair,
        match_condition: config.match_conditions[cond_idx],
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use samediff_core::{FrequencyPair, MatchCondition};

    #[test]
    fn validation_slot_zero_is_catch() {
        let config = TaskConfig::default();
        assert_eq!(cycle_condition(&config, 0), Ok(TrialCondition::Catch));
        assert_eq!(cycle_condition(&config, 5), Ok(TrialCondition::Catch));
    }

    #[test]
    fn validation_unravels_row_major() {
        let config = TaskConfig::default();
        let expected = [
            (FrequencyPair::new(18.0, 18.0), MatchCondition::Same),
            (FrequencyPair::new(18.0, 18.0), MatchCondition::Different),
            (FrequencyPair::new(22.0, 22.0), MatchCondition::Same),
            (FrequencyPair::new(22.0, 22.0), MatchCondition::Different),
        ];
        for (b, (pair, match_condition)) in expected.into_iter().enumerate() {
            assert_eq!(
                cycle_condition(&config, b + 1),
                Ok(TrialCondition::Comparison {
                    pair,
                    match_condition
                })
            );
        }
    }

    #[test]
    fn validation_requires_index() {
        let config = TaskConfig::default();
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(
            select_condition(&config, &TrialParams::new(Mode::Validation), &mut rng),
            Err(ConfigurationError::MissingMinibatchIndex)
        );
    }

    #[test]
    fn overrides_win_over_sampling() {
        let config = TaskConfig::default();
        let mut rng = StdRng::seed_from_u64(7);
        let params = TrialParams::new(Mode::Gradient)
            .with_catch(false)
            .with_fpair(FrequencyPair::new(22.0, 18.0))
            .with_match_condition(MatchCondition::Same);
        for _ in 0..50 {
            assert_eq!(
                select_condition(&config, &params, &mut rng),
                Ok(TrialCondition::Comparison {
                    pair: FrequencyPair::new(22.0, 18.0),
                    match_condition: MatchCondition::Same,
                })
            );
        }

        let forced_catch = TrialParams::new(Mode::Test).with_catch(true);
        assert_eq!(
            select_condition(&config, &forced_catch, &mut rng),
            Ok(TrialCondition::Catch)
        );
    }

    #[test]
    fn sampled_pairs_come_from_catalog() {
        let config = TaskConfig::default();
        let mut rng = StdRng::seed_from_u64(11);
        let params = TrialParams::new(Mode::Gradient).with_catch(false);
        for _ in 0..200 {
            match select_condition(&config, &params, &mut rng).unwrap() {
                TrialCondition::Comparison { pair, .. } => assert!(config.fpairs.contains(&pair)),
                TrialCondition::Catch => panic!("catch was overridden to false"),
            }
        }
    }
}
