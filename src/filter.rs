use regex::Regex;
use std::collections::HashMap;
use std::sync::{LazyLock, Mutex};

/// Forbidden-content infractions allowed before escalating to the moderator
/// channel.
pub const MAX_STRIKES: u32 = 3;

// Links and gateway bot handles. Covers scheme prefixes, bare `www.`, the
// dotted TLDs spammers actually use here, and `@somethingbot` handles.
static LINK_OR_BOT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)(https?://|www\.|\.com|\.net|\.org|\.me|\.io|\.ly|\.ru|\.ir|\.in|\.id|@\w{5,32}bot\b)",
    )
    .expect("link pattern compiles")
});

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Clean,
    BlockedWord(String),
    Forbidden,
}

/// Screen a message body. Blocked words win over the link check; the match is
/// a case-folded substring against the stored (already lowercased) word set.
pub fn check(blocked_words: &[String], text: &str) -> Verdict {
    let folded = text.to_lowercase();
    for word in blocked_words {
        if !word.is_empty() && folded.contains(word.as_str()) {
            return Verdict::BlockedWord(word.clone());
        }
    }
    if LINK_OR_BOT_RE.is_match(text) {
        return Verdict::Forbidden;
    }
    Verdict::Clean
}

/// Per-user infraction counter for the current process lifetime. Resets on
/// restart; a multi-instance deployment would need to move this to the store.
#[derive(Default)]
pub struct StrikeCounter {
    counts: Mutex<HashMap<i64, u32>>,
}

impl StrikeCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one infraction and return the new total.
    pub fn record(&self, user_id: i64) -> u32 {
        let mut counts = self.counts.lock().unwrap_or_else(|e| e.into_inner());
        let entry = counts.entry(user_id).or_insert(0);
        *entry += 1;
        *entry
    }

    pub fn count(&self, user_id: i64) -> u32 {
        let counts = self.counts.lock().unwrap_or_else(|e| e.into_inner());
        counts.get(&user_id).copied().unwrap_or(0)
    }
}
