use std::future::Future;
use std::time::Duration;

/// Bounded retry with a fixed pause between attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub delay: Duration,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Attempts<T> {
    pub last: T,
    pub attempts: u32,
    pub reached: bool,
}

impl RetryPolicy {
    pub const fn new(max_attempts: u32, delay: Duration) -> Self {
        Self { max_attempts, delay }
    }

    pub const fn from_secs(max_attempts: u32, delay_secs: u64) -> Self {
        Self::new(max_attempts, Duration::from_secs(delay_secs))
    }

    /// Calls `attempt` (with the 1-based attempt number) until `done` accepts
    /// its value or the budget runs out. Always makes at least one attempt and
    /// never sleeps after the last one.
    pub async fn run<T, F, Fut, P>(&self, mut attempt: F, done: P) -> Attempts<T>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = T>,
        P: Fn(&T) -> bool,
    {
        let budget = self.max_attempts.max(1);
        let mut n = 0;
        loop {
            n += 1;
            let value = attempt(n).await;
            if done(&value) {
                return Attempts {
                    last: value,
                    attempts: n,
                    reached: true,
                };
            }
            if n >= budget {
                return Attempts {
                    last: value,
                    attempts: n,
                    reached: false,
                };
            }
            tokio::time::sleep(self.delay).await;
        }
    }
}
