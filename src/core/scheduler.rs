use crate::core::driver::TransactionDriver;
use crate::core::pool::PoolStats;
use crate::domain::model::TxnOutcome;
use crate::domain::ports::IntentApi;
use crate::utils::monitor::SystemMonitor;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task::JoinSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchedulePolicy {
    pub rounds: usize,
    pub empty_round_delay: Duration,
    pub max_empty_rounds: u32,
}

impl SchedulePolicy {
    pub fn new(rounds: usize) -> Self {
        Self {
            rounds,
            empty_round_delay: Duration::from_secs(60),
            max_empty_rounds: 10,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    RoundsCompleted,
    PoolExhausted,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OutcomeCounts {
    pub settled: usize,
    pub create_exhausted: usize,
    pub process_exhausted: usize,
    pub poll_exhausted: usize,
    pub terminal_available: usize,
    pub terminal_unavailable: usize,
    pub aborted: usize,
}

impl OutcomeCounts {
    pub fn add(&mut self, outcome: &TxnOutcome) {
        match outcome {
            TxnOutcome::Settled { .. } => self.settled += 1,
            TxnOutcome::CreateExhausted => self.create_exhausted += 1,
            TxnOutcome::ProcessExhausted { .. } => self.process_exhausted += 1,
            TxnOutcome::PollExhausted { .. } => self.poll_exhausted += 1,
            TxnOutcome::TerminalAvailable { .. } => self.terminal_available += 1,
            TxnOutcome::TerminalUnavailable { .. } => self.terminal_unavailable += 1,
        }
    }

    pub fn merge(&mut self, other: &OutcomeCounts) {
        self.settled += other.settled;
        self.create_exhausted += other.create_exhausted;
        self.process_exhausted += other.process_exhausted;
        self.poll_exhausted += other.poll_exhausted;
        self.terminal_available += other.terminal_available;
        self.terminal_unavailable += other.terminal_unavailable;
        self.aborted += other.aborted;
    }

    pub fn total(&self) -> usize {
        self.settled
            + self.create_exhausted
            + self.process_exhausted
            + self.poll_exhausted
            + self.terminal_available
            + self.terminal_unavailable
            + self.aborted
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundReport {
    pub round: usize,
    pub width: usize,
    pub outcomes: OutcomeCounts,
    pub duration: Duration,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub rounds_run: usize,
    pub empty_rounds: usize,
    pub stop_reason: StopReason,
    pub outcomes: OutcomeCounts,
    pub pool: PoolStats,
}

/// Runs rounds of concurrent transactions: every pair available at the start
/// of a round gets its own task, and the next round waits for all of them.
pub struct RunScheduler<A: IntentApi + 'static> {
    driver: Arc<TransactionDriver<A>>,
    policy: SchedulePolicy,
    monitor: SystemMonitor,
}

impl<A: IntentApi + 'static> RunScheduler<A> {
    pub fn new(driver: TransactionDriver<A>, policy: SchedulePolicy) -> Self {
        Self::new_with_monitoring(driver, policy, false)
    }

    pub fn new_with_monitoring(
        driver: TransactionDriver<A>,
        policy: SchedulePolicy,
        monitor_enabled: bool,
    ) -> Self {
        Self {
            driver: Arc::new(driver),
            policy,
            monitor: SystemMonitor::new(monitor_enabled),
        }
    }

    pub async fn run(&self) -> RunSummary {
        let pool = Arc::clone(self.driver.pool());
        let mut outcomes = OutcomeCounts::default();
        let mut rounds_run = 0;
        let mut empty_rounds = 0;
        let mut consecutive_empty = 0;
        let mut stop_reason = StopReason::RoundsCompleted;

        tracing::info!(
            "🚀 Starting {} round(s) with {} identifier pair(s)",
            self.policy.rounds,
            pool.len()
        );

        for round in 1..=self.policy.rounds {
            let width = pool.len();
            if width == 0 {
                let delay = self.policy.empty_round_delay;
                tracing::warn!("No available TIDs (round {}), waiting {:?}", round, delay);
                empty_rounds += 1;
                consecutive_empty += 1;
                tokio::time::sleep(self.policy.empty_round_delay).await;
                if consecutive_empty >= self.policy.max_empty_rounds {
                    tracing::warn!("Pool still empty after {} rounds, stopping", consecutive_empty);
                    stop_reason = StopReason::PoolExhausted;
                    break;
                }
                continue;
            }

            consecutive_empty = 0;
            let report = self.run_round(round, width).await;
            rounds_run += 1;
            outcomes.merge(&report.outcomes);

            tracing::info!(
                "✅ Round {} finished in {:?}: {} settled, {} not started, {} dropped",
                report.round,
                report.duration,
                report.outcomes.settled + report.outcomes.terminal_available,
                report.outcomes.create_exhausted + report.outcomes.process_exhausted,
                report.outcomes.poll_exhausted + report.outcomes.terminal_unavailable
            );
            self.monitor.log_stats(&format!("Round {}", round));
        }

        let summary = RunSummary {
            rounds_run,
            empty_rounds,
            stop_reason,
            outcomes,
            pool: pool.stats(),
        };
        tracing::info!(
            "🏁 Run finished ({:?}): {} round(s), {} transaction(s), {} available, {} dropped",
            summary.stop_reason,
            summary.rounds_run,
            summary.outcomes.total(),
            summary.pool.available,
            summary.pool.dropped
        );
        self.monitor.log_final_stats();
        summary
    }

    /// Claims `width` pairs, runs one driver per pair and waits for all of them.
    pub async fn run_round(&self, round: usize, width: usize) -> RoundReport {
        let started = Instant::now();
        let pool = self.driver.pool();
        let mut tasks = JoinSet::new();

        tracing::info!("Making request {} ({} concurrent transaction(s))", round, width);
        for _ in 0..width {
            let Some(pair) = pool.claim_one() else { break };
            let driver = Arc::clone(&self.driver);
            tasks.spawn(async move { driver.run(pair).await });
        }

        let mut outcomes = OutcomeCounts::default();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(outcome) => outcomes.add(&outcome),
                Err(e) => {
                    tracing::error!("Transaction task aborted: {}", e);
                    outcomes.aborted += 1;
                }
            }
        }

        RoundReport {
            round,
            width,
            outcomes,
            duration: started.elapsed(),
        }
    }
}
