pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(test)]
mod testing;

#[cfg(feature = "cli")]
pub use crate::config::CliConfig;

pub use crate::adapters::{load_pairs, HttpIntentClient};
pub use crate::config::{RunConfig, TomlConfig};
pub use crate::core::{
    driver::{PhasePolicies, TransactionDriver},
    pool::ResourcePool,
    recorder::TimingRecorder,
    retry::RetryPolicy,
    scheduler::{RunScheduler, RunSummary, SchedulePolicy, StopReason},
};
pub use crate::domain::model::{IdentifierPair, IntentStatus, TxnOutcome};
pub use crate::utils::error::{LoadTestError, Result};
pub use crate::utils::logger::LogFormat;
