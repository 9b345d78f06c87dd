use crate::domain::model::IdentifierPair;
use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PoolStats {
    pub available: usize,
    pub in_flight: usize,
    pub dropped: usize,
}

impl PoolStats {
    /// Pairs the pool is accountable for. Constant across claims, releases and forfeits.
    pub fn total(&self) -> usize {
        self.available + self.in_flight + self.dropped
    }
}

#[derive(Debug, Default)]
struct PoolState {
    available: VecDeque<IdentifierPair>,
    in_flight: usize,
    dropped: usize,
}

/// Shared set of identifier pairs. A pair is either available, claimed by
/// exactly one driver, or forfeited.
#[derive(Debug, Default)]
pub struct ResourcePool {
    state: Mutex<PoolState>,
}

impl ResourcePool {
    pub fn new(pairs: impl IntoIterator<Item = IdentifierPair>) -> Self {
        Self {
            state: Mutex::new(PoolState {
                available: pairs.into_iter().collect(),
                ..PoolState::default()
            }),
        }
    }

    // A panicking holder cannot leave the state half-updated: every mutation
    // below is a single push/pop plus counter bump.
    fn lock(&self) -> MutexGuard<'_, PoolState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn claim_one(&self) -> Option<IdentifierPair> {
        let mut state = self.lock();
        let pair = state.available.pop_front()?;
        state.in_flight += 1;
        Some(pair)
    }

    pub fn release(&self, pair: IdentifierPair) {
        let mut state = self.lock();
        state.in_flight = state.in_flight.saturating_sub(1);
        state.available.push_back(pair);
    }

    /// Takes a claimed pair out of circulation for the rest of the run.
    pub fn forfeit(&self, pair: &IdentifierPair) {
        let mut state = self.lock();
        state.in_flight = state.in_flight.saturating_sub(1);
        state.dropped += 1;
        tracing::warn!("Dropping {} from the pool ({} dropped so far)", pair, state.dropped);
    }

    pub fn len(&self) -> usize {
        self.lock().available.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn stats(&self) -> PoolStats {
        let state = self.lock();
        PoolStats {
            available: state.available.len(),
            in_flight: state.in_flight,
            dropped: state.dropped,
        }
    }

    pub fn available_pairs(&self) -> Vec<IdentifierPair> {
        self.lock().available.iter().cloned().collect()
    }
}
