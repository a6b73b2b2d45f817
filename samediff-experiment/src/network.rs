//! Static network setup consumed by the external recurrent model.
//!
//! Built once at startup from a seed and never mutated afterwards. The trial
//! protocol itself never looks inside these matrices.

use ndarray::Array2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use samediff_core::{Channel, ConfigurationError, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::generator::N_OUT;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    pub n_in: usize,
    /// Recurrent units
    pub n: usize,
    pub n_out: usize,
    /// Fraction of recurrent units that are excitatory
    pub exc_fraction: f64,
    pub p_exc: f64,
    pub p_inh: f64,
    pub seed: u64,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            n_in: Channel::COUNT,
            n: 500,
            n_out: N_OUT,
            exc_fraction: 0.8,
            p_exc: 0.1,
            p_inh: 0.5,
            seed: 1066,
        }
    }
}

impl NetworkConfig {
    pub fn validate(&self) -> Result<()> {
        if self.n == 0 || self.n_in == 0 || self.n_out == 0 {
            return Err(ConfigurationError::InvalidNetwork(format!(
                "sizes must be positive (n_in={}, n={}, n_out={})",
                self.n_in, self.n, self.n_out
            )));
        }
        for (name, p) in [
            ("exc_fraction", self.exc_fraction),
            ("p_exc", self.p_exc),
            ("p_inh", self.p_inh),
        ] {
            if !(0.0..=1.0).contains(&p) {
                return Err(ConfigurationError::InvalidNetwork(format!(
                    "{name} = {p} is outside [0, 1]"
                )));
            }
        }
        Ok(())
    }
}

/// Excitatory/inhibitory split of the recurrent units
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EiPartition {
    /// +1 for excitatory, -1 for inhibitory
    pub signs: Vec<i8>,
    pub exc: Vec<usize>,
    pub inh: Vec<usize>,
}

/// First `floor(exc_fraction * n)` units are excitatory, the rest inhibitory.
pub fn generate_ei(n: usize, exc_fraction: f64) -> Result<EiPartition> {
    if !(0.0..=1.0).contains(&exc_fraction) {
        return Err(ConfigurationError::InvalidNetwork(format!(
            "exc_fraction = {exc_fraction} is outside [0, 1]"
        )));
    }
    let n_exc = ((exc_fraction * n as f64).floor() as usize).min(n);
    let signs = (0..n).map(|i| if i < n_exc { 1 } else { -1 }).collect();
    Ok(EiPartition {
        signs,
        exc: (0..n_exc).collect(),
        inh: (n_exc..n).collect(),
    })
}

/// Sparse recurrent connectivity mask.
///
/// Each row draws excitatory and inhibitory inputs with their own
/// probabilities, drops the self connection, rescales its inhibitory entries
/// so they sum to the excitatory total, and is normalised to unit L2 norm.
pub fn generate_crec(ei: &EiPartition, p_exc: f64, p_inh: f64, seed: u64) -> Array2<f64> {
    let n = ei.signs.len();
    let mut rng = StdRng::seed_from_u64(seed);
    let mut c = Array2::zeros((n, n));

    for i in ei.exc.iter().chain(ei.inh.iter()).copied() {
        for &j in &ei.exc {
            if rng.random::<f64>() < p_exc {
                c[[i, j]] = 1.0;
            }
        }
        for &j in &ei.inh {
            if rng.random::<f64>() < p_inh {
                c[[i, j]] = 1.0;
            }
        }
        c[[i, i]] = 0.0;

        let exc_sum: f64 = ei.exc.iter().map(|&j| c[[i, j]]).sum();
        let inh_sum: f64 = ei.inh.iter().map(|&j| c[[i, j]]).sum();
        if inh_sum > 0.0 {
            for &j in &ei.inh {
                c[[i, j]] *= exc_sum / inh_sum;
            }
        }

        let mut row = c.row_mut(i);
        let norm = row.dot(&row).sqrt();
        if norm > 0.0 {
            row /= norm;
        }
    }
    c
}

/// Everything the external model needs about its wiring
#[derive(Debug, Clone, Serialize)]
pub struct Connectivity {
    pub config: NetworkConfig,
    pub ei: EiPartition,
    /// `n x n`
    pub crec: Array2<f64>,
    /// `n_out x n`, reading out from excitatory units only
    pub cout: Array2<f64>,
}

impl Connectivity {
    pub fn build(config: &NetworkConfig) -> Result<Self> {
        config.validate()?;
        let ei = generate_ei(config.n, config.exc_fraction)?;
        let crec = generate_crec(&ei, config.p_exc, config.p_inh, config.seed);

        let mut cout = Array2::zeros((config.n_out, config.n));
        for &j in &ei.exc {
            cout.column_mut(j).fill(1.0);
        }

        info!(
            n = config.n,
            exc = ei.exc.len(),
            inh = ei.inh.len(),
            seed = config.seed,
            "built network connectivity"
        );

        Ok(Self {
            config: config.clone(),
            ei,
            crec,
            cout,
        })
    }

    /// Mean number of non-zero recurrent inputs per unit.
    pub fn mean_in_degree(&self) -> f64 {
        let n = self.crec.nrows();
        if n == 0 {
            return 0.0;
        }
        self.crec.iter().filter(|&&v| v != 0.0).count() as f64 / n as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn ei_split_is_eighty_twenty() {
        let ei = generate_ei(500, 0.8).unwrap();
        assert_eq!(ei.exc.len(), 400);
        assert_eq!(ei.inh.len(), 100);
        assert_eq!(ei.signs[399], 1);
        assert_eq!(ei.signs[400], -1);
        assert!(generate_ei(10, 1.5).is_err());
    }

    #[test]
    fn crec_is_deterministic_per_seed() {
        let ei = generate_ei(60, 0.8).unwrap();
        let a = generate_crec(&ei, 0.1, 0.5, 1066);
        let b = generate_crec(&ei, 0.1, 0.5, 1066);
        let c = generate_crec(&ei, 0.1, 0.5, 7);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn crec_rows_are_balanced_and_normalised() {
        let ei = generate_ei(100, 0.8).unwrap();
        let c = generate_crec(&ei, 0.3, 0.5, 1066);
        for i in 0..100 {
            assert_eq!(c[[i, i]], 0.0);
            let row = c.row(i);
            let norm = row.dot(&row).sqrt();
            if norm == 0.0 {
                continue;
            }
            assert_abs_diff_eq!(norm, 1.0, epsilon = 1e-12);
            let exc: f64 = ei.exc.iter().map(|&j| row[j]).sum();
            let inh: f64 = ei.inh.iter().map(|&j| row[j]).sum();
            if inh > 0.0 {
                assert_abs_diff_eq!(exc, inh, epsilon = 1e-12);
            }
        }
    }

    #[test]
    fn cout_reads_excitatory_units() {
        let config = NetworkConfig {
            n: 20,
            ..NetworkConfig::default()
        };
        let conn = Connectivity::build(&config).unwrap();
        assert_eq!(conn.cout.dim(), (2, 20));
        assert_eq!(conn.cout.sum(), 2.0 * 16.0);
        assert!(conn.cout.column(19).iter().all(|&v| v == 0.0));
    }

    #[test]
    fn invalid_probability_is_rejected() {
        let config = NetworkConfig {
            p_inh: 1.5,
            ..NetworkConfig::default()
        };
        assert!(matches!(
            Connectivity::build(&config),
            Err(ConfigurationError::InvalidNetwork(_))
        ));
    }
}
