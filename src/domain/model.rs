use chrono::{DateTime, Local};
use std::fmt;

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f";

/// One controllable payment terminal. Claimed by at most one driver at a time.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IdentifierPair {
    pub merchant_id: String,
    pub terminal_id: String,
}

impl IdentifierPair {
    pub fn new(merchant_id: impl Into<String>, terminal_id: impl Into<String>) -> Self {
        Self {
            merchant_id: merchant_id.into(),
            terminal_id: terminal_id.into(),
        }
    }
}

impl fmt::Display for IdentifierPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.merchant_id, self.terminal_id)
    }
}

/// A single row of the timing log.
#[derive(Debug, Clone, PartialEq)]
pub struct TimingRecord {
    pub label: String,
    pub start_time: DateTime<Local>,
    pub end_time: DateTime<Local>,
    pub elapsed_seconds: f64,
}

impl TimingRecord {
    pub fn new(
        label: impl Into<String>,
        start_time: DateTime<Local>,
        end_time: DateTime<Local>,
    ) -> Self {
        let elapsed_seconds = (end_time - start_time)
            .num_microseconds()
            .map(|us| us as f64 / 1_000_000.0)
            .unwrap_or_default();
        Self {
            label: label.into(),
            start_time,
            end_time,
            elapsed_seconds,
        }
    }

    pub fn to_row(&self) -> [String; 4] {
        [
            self.label.clone(),
            self.start_time.format(TIMESTAMP_FORMAT).to_string(),
            self.end_time.format(TIMESTAMP_FORMAT).to_string(),
            self.elapsed_seconds.to_string(),
        ]
    }
}

/// Remote-side lifecycle of an intent. Anything unrecognised is transient.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IntentStatus {
    Processing,
    Cancelled,
    Failed,
    Completed,
    Other(String),
}

impl IntentStatus {
    pub fn is_settled(&self) -> bool {
        matches!(self, Self::Cancelled | Self::Failed | Self::Completed)
    }
}

impl From<&str> for IntentStatus {
    fn from(value: &str) -> Self {
        match value {
            "PROCESSING" => Self::Processing,
            "CANCELLED" => Self::Cancelled,
            "FAILED" => Self::Failed,
            "COMPLETED" => Self::Completed,
            other => Self::Other(other.to_string()),
        }
    }
}

impl fmt::Display for IntentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Processing => f.write_str("PROCESSING"),
            Self::Cancelled => f.write_str("CANCELLED"),
            Self::Failed => f.write_str("FAILED"),
            Self::Completed => f.write_str("COMPLETED"),
            Self::Other(s) => f.write_str(s),
        }
    }
}

/// Classification of the process-intent HTTP status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessResult {
    /// 201
    Accepted,
    /// 400
    Rejected,
    /// 422: the terminal is busy with another intent
    TerminalBusy,
    Pending(u16),
}

impl ProcessResult {
    pub fn from_status(code: u16) -> Self {
        match code {
            201 => Self::Accepted,
            400 => Self::Rejected,
            422 => Self::TerminalBusy,
            other => Self::Pending(other),
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Pending(_))
    }
}

pub const TERMINAL_AVAILABLE: &str = "AVAILABLE";

/// How a driver run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TxnOutcome {
    Settled { intent_id: String, status: IntentStatus },
    CreateExhausted,
    ProcessExhausted { intent_id: String },
    PollExhausted { intent_id: String },
    TerminalAvailable { intent_id: String },
    TerminalUnavailable { intent_id: String },
}

/// What happens to the claimed pair once a driver run ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    Release,
    Forfeit,
}

impl TxnOutcome {
    pub fn disposition(&self) -> Disposition {
        match self {
            Self::Settled { .. }
            | Self::CreateExhausted
            | Self::ProcessExhausted { .. }
            | Self::TerminalAvailable { .. } => Disposition::Release,
            Self::PollExhausted { .. } | Self::TerminalUnavailable { .. } => Disposition::Forfeit,
        }
    }
}
