//! Error type shared by every stage of trial construction.

use thiserror::Error;

/// Result alias for task configuration and trial construction.
pub type Result<T> = std::result::Result<T, ConfigurationError>;

/// Raised before any trial data is produced. There is no partial trial:
/// callers treat any of these as "no trial generated".
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigurationError {
    /// Trial mode name outside `gradient`, `test`, `validation`
    #[error("unknown trial mode: {0:?} (expected gradient, test or validation)")]
    UnknownMode(String),

    /// Every catalog frequency is identical, so stimulus scaling is undefined
    #[error("degenerate frequency catalog: fmin == fmax == {0}")]
    DegenerateCatalog(f64),

    /// Catalog has no pairs at all
    #[error("frequency pair catalog is empty")]
    EmptyCatalog,

    /// Catalog must hold at least one same pair and one different pair
    #[error("frequency pair catalog has no {0} pair")]
    MissingPairKind(&'static str),

    /// No match conditions to draw from
    #[error("match condition catalog is empty")]
    EmptyMatchConditions,

    /// Validation mode without a minibatch index
    #[error("minibatch_index is required in validation mode")]
    MissingMinibatchIndex,

    /// Timestep not finite or not positive
    #[error("invalid timestep dt = {0}")]
    InvalidTimestep(f64),

    /// Epoch duration negative, non-finite, or an inverted delay range
    #[error("invalid epoch duration for {epoch}: {reason}")]
    InvalidDuration {
        /// Epoch or constant the duration belongs to
        epoch: &'static str,
        /// Why it was rejected
        reason: String,
    },

    /// Frequency pair text that is not `f1,f2`
    #[error("invalid frequency pair {0:?} (expected f1,f2)")]
    InvalidPair(String),

    /// Match condition text other than `same` / `different`
    #[error("invalid match condition {0:?} (expected same or different)")]
    InvalidMatchCondition(String),

    /// Choice label outside {0, 1}
    #[error("invalid choice label {0} (expected 0 or 1)")]
    InvalidChoice(u8),

    /// Network sizing or connection probabilities out of range
    #[error("invalid network configuration: {0}")]
    InvalidNetwork(String),

    /// Termination settings out of range
    #[error("invalid termination policy: {0}")]
    InvalidTermination(String),

    /// Number of model responses differs from number of trials
    #[error("got {responses} responses for {trials} trials")]
    ResponseMismatch {
        /// Trials in the batch
        trials: usize,
        /// Responses supplied
        responses: usize,
    },

    /// Configuration document could not be parsed
    #[error("failed to parse configuration: {0}")]
    Parse(String),
}
