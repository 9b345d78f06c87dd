use crate::core::pool::ResourcePool;
use crate::core::recorder::TimingRecorder;
use crate::core::retry::RetryPolicy;
use crate::domain::model::{
    Disposition, IdentifierPair, IntentStatus, ProcessResult, TxnOutcome, TERMINAL_AVAILABLE,
};
use crate::domain::ports::IntentApi;
use chrono::{DateTime, Local};
use std::fmt;
use std::sync::Arc;

/// Remote call a driver makes. The prefix doubles as the timing-log label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Create,
    Process,
    Poll,
    TerminalCheck,
}

impl Phase {
    pub fn label(&self, intent_id: &str) -> String {
        format!("{}-{}", self, intent_id)
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Phase::Create => "create",
            Phase::Process => "process",
            Phase::Poll => "get",
            Phase::TerminalCheck => "terminal",
        })
    }
}

/// Attempt budgets and backoff for each phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhasePolicies {
    pub create: RetryPolicy,
    pub process: RetryPolicy,
    pub poll: RetryPolicy,
    pub terminal: RetryPolicy,
}

impl Default for PhasePolicies {
    fn default() -> Self {
        Self {
            create: RetryPolicy::from_secs(10, 5),
            process: RetryPolicy::from_secs(5, 5),
            poll: RetryPolicy::from_secs(15, 10),
            terminal: RetryPolicy::from_secs(15, 10),
        }
    }
}

/// Runs the create → process → poll lifecycle for one claimed pair and hands
/// the pair back to (or drops it from) the pool when done.
pub struct TransactionDriver<A: IntentApi> {
    api: Arc<A>,
    pool: Arc<ResourcePool>,
    recorder: Arc<TimingRecorder>,
    policies: PhasePolicies,
}

impl<A: IntentApi> TransactionDriver<A> {
    pub fn new(
        api: Arc<A>,
        pool: Arc<ResourcePool>,
        recorder: Arc<TimingRecorder>,
        policies: PhasePolicies,
    ) -> Self {
        Self {
            api,
            pool,
            recorder,
            policies,
        }
    }

    pub fn pool(&self) -> &Arc<ResourcePool> {
        &self.pool
    }

    /// Drives `pair` to an outcome, then releases or forfeits it. Never fails.
    #[tracing::instrument(name = "txn", skip_all, fields(pair = %pair))]
    pub async fn run(&self, pair: IdentifierPair) -> TxnOutcome {
        let outcome = self.drive(&pair).await;
        match outcome.disposition() {
            Disposition::Release => self.pool.release(pair),
            Disposition::Forfeit => self.pool.forfeit(&pair),
        }
        outcome
    }

    async fn drive(&self, pair: &IdentifierPair) -> TxnOutcome {
        let Some(intent_id) = self.create(pair).await else {
            return TxnOutcome::CreateExhausted;
        };

        match self.process(pair, &intent_id).await {
            None => TxnOutcome::ProcessExhausted { intent_id },
            Some(ProcessResult::TerminalBusy) => self.await_terminal(pair, intent_id).await,
            Some(_) => self.poll(pair, intent_id).await,
        }
    }

    async fn create(&self, pair: &IdentifierPair) -> Option<String> {
        let result = self
            .policies
            .create
            .run(
                |attempt| async move {
                    let start = Local::now();
                    let response = self.api.create_intent(&pair.merchant_id).await;
                    let end = Local::now();
                    let intent_id = response.unwrap_or_else(|e| {
                        tracing::warn!("Create attempt {} failed: {}", attempt, e);
                        String::new()
                    });
                    self.record(Phase::Create.label(&intent_id), start, end);
                    intent_id
                },
                |intent_id: &String| !intent_id.is_empty(),
            )
            .await;

        if result.reached {
            tracing::debug!("Created intent {} after {} attempt(s)", result.last, result.attempts);
            Some(result.last)
        } else {
            tracing::warn!("No intent created after {} attempts", result.attempts);
            None
        }
    }

    async fn process(&self, pair: &IdentifierPair, intent_id: &str) -> Option<ProcessResult> {
        let result = self
            .policies
            .process
            .run(
                |attempt| async move {
                    let start = Local::now();
                    let response = self
                        .api
                        .process_intent(&pair.merchant_id, &pair.terminal_id, intent_id)
                        .await;
                    let end = Local::now();
                    self.record(Phase::Process.label(intent_id), start, end);
                    match response {
                        Ok(code) => Some(ProcessResult::from_status(code)),
                        Err(e) => {
                            tracing::warn!(
                                "Process attempt {} for {} failed: {}",
                                attempt,
                                intent_id,
                                e
                            );
                            None
                        }
                    }
                },
                |outcome: &Option<ProcessResult>| outcome.is_some_and(|r| r.is_terminal()),
            )
            .await;

        if result.reached {
            tracing::debug!("Processed {}: {:?}", intent_id, result.last);
            result.last
        } else {
            tracing::warn!(
                "Intent {} not processed after {} attempts (last: {:?})",
                intent_id,
                result.attempts,
                result.last
            );
            None
        }
    }

    async fn poll(&self, pair: &IdentifierPair, intent_id: String) -> TxnOutcome {
        let id = intent_id.as_str();
        let result = self
            .policies
            .poll
            .run(
                |attempt| async move {
                    let start = Local::now();
                    let response = self.api.get_intent_status(&pair.merchant_id, id).await;
                    let end = Local::now();
                    self.record(Phase::Poll.label(id), start, end);
                    response
                        .map_err(|e| {
                            tracing::warn!("Status attempt {} for {} failed: {}", attempt, id, e)
                        })
                        .ok()
                },
                |status: &Option<IntentStatus>| {
                    status.as_ref().is_some_and(IntentStatus::is_settled)
                },
            )
            .await;

        match result.last {
            Some(status) if result.reached => {
                tracing::info!(
                    "Intent {} settled as {} after {} poll(s)",
                    intent_id,
                    status,
                    result.attempts
                );
                TxnOutcome::Settled { intent_id, status }
            }
            _ => {
                tracing::warn!(
                    "Intent {} did not settle after {} polls",
                    intent_id,
                    result.attempts
                );
                TxnOutcome::PollExhausted { intent_id }
            }
        }
    }

    /// Waits for a busy terminal to come back. These calls are not timed.
    async fn await_terminal(&self, pair: &IdentifierPair, intent_id: String) -> TxnOutcome {
        tracing::info!(
            "Terminal busy for intent {}, waiting for it to become available",
            intent_id
        );
        let result = self
            .policies
            .terminal
            .run(
                |attempt| async move {
                    self.api
                        .get_terminal_status(&pair.merchant_id, &pair.terminal_id)
                        .await
                        .unwrap_or_else(|e| {
                            let phase = Phase::TerminalCheck;
                            tracing::warn!("{} check {} failed: {}", phase, attempt, e);
                            String::new()
                        })
                },
                |status: &String| status == TERMINAL_AVAILABLE,
            )
            .await;

        if result.reached {
            TxnOutcome::TerminalAvailable { intent_id }
        } else {
            tracing::warn!(
                "Terminal still not available after {} checks (last: '{}')",
                result.attempts,
                result.last
            );
            TxnOutcome::TerminalUnavailable { intent_id }
        }
    }

    fn record(&self, label: String, start: DateTime<Local>, end: DateTime<Local>) {
        if let Err(e) = self.recorder.record(&label, start, end) {
            tracing::error!("Failed to record timing for {}: {}", label, e);
        }
    }
}
