//! In-memory `IntentApi` that replays scripted responses.

use crate::domain::model::IntentStatus;
use crate::domain::ports::IntentApi;
use crate::utils::error::{LoadTestError, Result};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CallCounts {
    pub create: usize,
    pub process: usize,
    pub status: usize,
    pub terminal: usize,
}

#[derive(Default)]
struct Script {
    creates: VecDeque<String>,
    processes: VecDeque<u16>,
    statuses: VecDeque<String>,
    terminals: VecDeque<String>,
    calls: CallCounts,
    log: Vec<&'static str>,
}

/// Once a script runs dry: create fails with 503, process answers 503,
/// status stays PROCESSING and the terminal reports no connectivity.
#[derive(Clone, Default)]
pub struct ScriptedApi {
    script: Arc<Mutex<Script>>,
}

impl ScriptedApi {
    pub fn new() -> Self {
        Self::default()
    }

    fn with(self, f: impl FnOnce(&mut Script)) -> Self {
        f(&mut *self.script.lock().unwrap());
        self
    }

    pub fn creates<'a>(self, ids: impl IntoIterator<Item = &'a str>) -> Self {
        self.with(|s| s.creates.extend(ids.into_iter().map(String::from)))
    }

    pub fn processes(self, codes: impl IntoIterator<Item = u16>) -> Self {
        self.with(|s| s.processes.extend(codes))
    }

    pub fn statuses<'a>(self, statuses: impl IntoIterator<Item = &'a str>) -> Self {
        self.with(|s| s.statuses.extend(statuses.into_iter().map(String::from)))
    }

    pub fn terminals<'a>(self, statuses: impl IntoIterator<Item = &'a str>) -> Self {
        self.with(|s| s.terminals.extend(statuses.into_iter().map(String::from)))
    }

    pub fn calls(&self) -> CallCounts {
        self.script.lock().unwrap().calls
    }

    /// Every call made so far, in order: "create", "process", "status" or "terminal".
    pub fn call_log(&self) -> Vec<&'static str> {
        self.script.lock().unwrap().log.clone()
    }
}

#[async_trait]
impl IntentApi for ScriptedApi {
    async fn create_intent(&self, _merchant_id: &str) -> Result<String> {
        let mut script = self.script.lock().unwrap();
        script.calls.create += 1;
        script.log.push("create");
        script.creates.pop_front().ok_or(LoadTestError::UnexpectedStatus {
            status: 503,
            body: "scripted failure".to_string(),
        })
    }

    async fn process_intent(
        &self,
        _merchant_id: &str,
        _terminal_id: &str,
        _intent_id: &str,
    ) -> Result<u16> {
        let mut script = self.script.lock().unwrap();
        script.calls.process += 1;
        script.log.push("process");
        Ok(script.processes.pop_front().unwrap_or(503))
    }

    async fn get_intent_status(
        &self,
        _merchant_id: &str,
        _intent_id: &str,
    ) -> Result<IntentStatus> {
        let mut script = self.script.lock().unwrap();
        script.calls.status += 1;
        script.log.push("status");
        Ok(script
            .statuses
            .pop_front()
            .map(|s| IntentStatus::from(s.as_str()))
            .unwrap_or(IntentStatus::Processing))
    }

    async fn get_terminal_status(&self, _merchant_id: &str, _terminal_id: &str) -> Result<String> {
        let mut script = self.script.lock().unwrap();
        script.calls.terminal += 1;
        script.log.push("terminal");
        Ok(script.terminals.pop_front().unwrap_or_default())
    }
}
