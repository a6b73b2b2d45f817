pub mod batch;
pub mod condition;
pub mod config;
pub mod generator;
pub mod network;
pub mod performance;
pub mod schedule;
pub mod termination;
pub mod trial;
pub use batch::{generate_minibatch, validation_set};
pub use condition::select_condition;
pub use config::{EpochDurations, TargetLevels, TaskConfig};
pub use generator::{TrialGenerator, generate_trial};
pub use network::{Connectivity, EiPartition, NetworkConfig, generate_crec, generate_ei};
pub use performance::{
    GroupScore, PairScore, PerformanceReport, decision_of, performance_min_condition, score_trial,
};
pub use schedule::{EpochSchedule, schedule_epochs};
pub use termination::{PerformanceHistory, TerminationPolicy, terminate};
pub use trial::{Mode, Trial, TrialParams};
