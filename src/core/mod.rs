pub mod driver;
pub mod pool;
pub mod recorder;
pub mod retry;
pub mod scheduler;

pub use crate::domain::model::{
    IdentifierPair, IntentStatus, ProcessResult, TimingRecord, TxnOutcome,
};
pub use crate::domain::ports::IntentApi;
pub use crate::utils::error::Result;
