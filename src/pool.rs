use rand::seq::IteratorRandom;
use std::collections::HashSet;
use std::sync::Mutex;

/// In-memory waiting set for opportunistic matching. A user is here iff they
/// are online, not blocked, and hold no room binding. All operations are
/// short critical sections behind one coarse lock.
#[derive(Default)]
pub struct Pool {
    inner: Mutex<HashSet<i64>>,
}

impl Pool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns false if the user was already waiting.
    pub fn add(&self, user_id: i64) -> bool {
        self.lock().insert(user_id)
    }

    /// Idempotent; returns whether the user was present.
    pub fn remove(&self, user_id: i64) -> bool {
        self.lock().remove(&user_id)
    }

    pub fn contains(&self, user_id: i64) -> bool {
        self.lock().contains(&user_id)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Uniform-random member other than the given user.
    pub fn random_member_excluding(&self, user_id: i64) -> Option<i64> {
        let set = self.lock();
        set.iter()
            .copied()
            .filter(|&u| u != user_id)
            .choose(&mut rand::thread_rng())
    }

    /// Copy of the current membership, for filtered scans that look up user
    /// rows without holding the pool lock.
    pub fn snapshot(&self) -> Vec<i64> {
        self.lock().iter().copied().collect()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashSet<i64>> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}
