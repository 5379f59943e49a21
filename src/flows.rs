use crate::models::MatchFilters;
use std::collections::HashMap;
use std::sync::Mutex;

/// One step of a short-lived edit dialogue. The next plain message from the
/// user is consumed as the answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Flow {
    ChooseLanguage,
    AskGender,
    AskRegion,
    AskCountry,
    FilterGender { draft: MatchFilters },
    FilterRegion { draft: MatchFilters },
    FilterLanguage { draft: MatchFilters },
    AwaitUpgradeProof,
}

/// Volatile per-user flow state, keyed by user id. Process-local on purpose:
/// the flows are seconds long and every one restarts cleanly from its
/// command.
#[derive(Default)]
pub struct FlowTracker {
    inner: Mutex<HashMap<i64, Flow>>,
}

impl FlowTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, user_id: i64, flow: Flow) {
        self.lock().insert(user_id, flow);
    }

    /// Remove and return the pending flow, if any.
    pub fn take(&self, user_id: i64) -> Option<Flow> {
        self.lock().remove(&user_id)
    }

    pub fn get(&self, user_id: i64) -> Option<Flow> {
        self.lock().get(&user_id).cloned()
    }

    pub fn clear(&self, user_id: i64) {
        self.lock().remove(&user_id);
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<i64, Flow>> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}
