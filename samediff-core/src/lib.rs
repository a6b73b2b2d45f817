pub mod error;
pub mod phase;
pub mod stimulus;
pub mod trial;

pub use error::{ConfigurationError, Result};
pub use phase::{Epoch, Phase};
pub use stimulus::{Channel, StimulusEncoder};
pub use trial::{Choice, FrequencyPair, MatchCondition, TrialCondition, TrialInfo};
