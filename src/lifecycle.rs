use crate::Services;
use crate::matchmaker;
use crate::texts::t;
use std::sync::Arc;
use std::time::Duration;

/// Sweep cadences. Correctness does not depend on the exact values; they are
/// tuned to keep a small deployment cheap.
pub const EXPIRY_SWEEP_INTERVAL_SECS: u64 = 3600;
pub const QUEUE_SCAN_INTERVAL_SECS: u64 = 45;
pub const RECONCILE_INTERVAL_SECS: u64 = 1800;

/// How long an inactive room (and its chat log) is kept for history exports
/// before the reconciliation sweeper deletes it.
pub const ROOM_GRACE_HOURS: i64 = 24;

/// Initial delay before the first iteration of each loop, so the server can
/// finish starting up.
const STARTUP_DELAY_SECS: u64 = 10;

/// Spawn the three background loops. Each iteration is contained: a failing
/// body is logged and the loop keeps running.
pub fn spawn_lifecycle_tasks(svc: Arc<Services>) {
    {
        let svc = svc.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(STARTUP_DELAY_SECS)).await;
            loop {
                let downgraded = run_expiry_sweep(&svc).await;
                if downgraded > 0 {
                    println!("⏰ Premium expiry sweep: downgraded {downgraded} users");
                }
                tokio::time::sleep(Duration::from_secs(EXPIRY_SWEEP_INTERVAL_SECS)).await;
            }
        });
    }
    {
        let svc = svc.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(STARTUP_DELAY_SECS)).await;
            loop {
                let sealed = run_queue_scan(&svc).await;
                if sealed > 0 {
                    println!("🔍 Queue scan: sealed {sealed} matches");
                }
                tokio::time::sleep(Duration::from_secs(QUEUE_SCAN_INTERVAL_SECS)).await;
            }
        });
    }
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_secs(STARTUP_DELAY_SECS)).await;
        loop {
            let removed = run_room_reconciliation(&svc).await;
            if removed > 0 {
                println!("🧹 Reconciliation: removed {removed} stale bindings/rooms");
            }
            tokio::time::sleep(Duration::from_secs(RECONCILE_INTERVAL_SECS)).await;
        }
    });
}

/// Downgrade every premium user whose grant has expired and tell them in
/// their locale. Returns the number of users downgraded.
pub async fn run_expiry_sweep(svc: &Services) -> usize {
    let now = chrono::Utc::now().to_rfc3339();
    let expired = svc.db.expired_premium_users(&now);
    for user in &expired {
        svc.db.revoke_premium(user.user_id);
        let text = format!("⏰ {}", t(user.language, "premium_expired"));
        svc.gateway.safe_send_text(user.user_id, &text).await;
    }
    expired.len()
}

/// Walk the premium queue: evict entries that got bound in the meantime,
/// and for the rest look for an online, unbound, satisfying candidate,
/// sealing exactly as the matchmaker would. Returns the number of matches
/// sealed.
pub async fn run_queue_scan(svc: &Services) -> usize {
    let mut sealed = 0;
    for entry in svc.db.queue_entries() {
        if svc.db.get_binding(entry.user_id).is_some() {
            svc.db.queue_remove(entry.user_id);
            continue;
        }
        for candidate_id in svc.db.online_unbound_users() {
            if candidate_id == entry.user_id {
                continue;
            }
            let Some(candidate) = svc.db.get_user(candidate_id) else {
                continue;
            };
            if !entry.filters.satisfied_by(&candidate) {
                continue;
            }
            match matchmaker::seal_match(svc, entry.user_id, candidate_id, false).await {
                Ok(_) => {
                    sealed += 1;
                    break;
                }
                Err(e) => {
                    eprintln!(
                        "⚠️ Queue scan could not seal {} with {}: {:?}",
                        entry.user_id, candidate_id, e
                    );
                    break;
                }
            }
        }
    }
    sealed
}

/// Drop bindings whose room is missing or inactive, then garbage-collect
/// inactive rooms (with their chat logs) past the grace period. Returns the
/// total number of bindings and rooms removed.
pub async fn run_room_reconciliation(svc: &Services) -> usize {
    let mut removed = svc.db.cleanup_stale_rooms();
    let cutoff = (chrono::Utc::now() - chrono::Duration::hours(ROOM_GRACE_HOURS)).to_rfc3339();
    for room_id in svc.db.inactive_rooms_closed_before(&cutoff) {
        svc.db.delete_room(&room_id);
        removed += 1;
    }
    removed
}
