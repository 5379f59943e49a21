use crate::Services;
use crate::db;
use crate::models::{ContentKind, FindOutcome, MatchFilters, User};
use crate::texts::t;

/// How many profile photos per participant the match mirror forwards.
pub const MATCH_PHOTO_LIMIT: usize = 10;

/// Delay between consecutive moderator-channel sends, to stay inside gateway
/// rate limits.
pub const MIRROR_PACING_MS: u64 = 50;

#[derive(Debug)]
pub enum SealError {
    /// Lost a race: one of the two users got bound elsewhere mid-seal.
    Conflict,
    Store(String),
}

/// Matchmaking entry point. `override_filters` lets a live search deviate
/// from the user's saved preferences.
pub async fn find(
    svc: &Services,
    user_id: i64,
    override_filters: Option<MatchFilters>,
) -> FindOutcome {
    if svc.db.get_binding(user_id).is_some() {
        return FindOutcome::AlreadyInRoom;
    }
    if svc.pool.contains(user_id) || svc.db.queue_contains(user_id) {
        return FindOutcome::AlreadySearching;
    }
    let Some(user) = svc.db.get_user(user_id) else {
        return FindOutcome::ProfileIncomplete;
    };
    if !user.profile_complete() {
        return FindOutcome::ProfileIncomplete;
    }

    let filters = override_filters.unwrap_or_else(|| user.filters.clone());
    if user.is_premium && !filters.is_empty() {
        find_advanced(svc, &user, filters).await
    } else {
        find_simple(svc, &user).await
    }
}

/// Free tier: any partner. The premium queue is scanned first (someone
/// waiting there may have filters this user satisfies), then the pool.
async fn find_simple(svc: &Services, user: &User) -> FindOutcome {
    if let Some(queued) = svc.db.scan_queue_for_match(user)
        && let Ok(room_id) = seal_match(svc, queued, user.user_id, false).await
    {
        return FindOutcome::Matched {
            room_id,
            partner: queued,
        };
    }

    if let Some(partner) = svc.pool.random_member_excluding(user.user_id)
        && let Ok(room_id) = seal_match(svc, user.user_id, partner, false).await
    {
        return FindOutcome::Matched { room_id, partner };
    }

    svc.pool.add(user.user_id);
    FindOutcome::Searching
}

/// Premium tier with filters: queue scan, then a filtered pool scan taking
/// the first satisfying candidate, else a durable queue entry. Filter
/// symmetry is deliberately not required: pool members are matched against
/// premium filters unconditionally.
async fn find_advanced(svc: &Services, user: &User, filters: MatchFilters) -> FindOutcome {
    if let Some(queued) = svc.db.scan_queue_for_match(user)
        && let Ok(room_id) = seal_match(svc, queued, user.user_id, false).await
    {
        return FindOutcome::Matched {
            room_id,
            partner: queued,
        };
    }

    for candidate_id in svc.pool.snapshot() {
        if candidate_id == user.user_id {
            continue;
        }
        let Some(candidate) = svc.db.get_user(candidate_id) else {
            continue;
        };
        if candidate.blocked || !filters.satisfied_by(&candidate) {
            continue;
        }
        // A candidate whose binding appeared mid-scan is unavailable.
        if svc.db.get_binding(candidate_id).is_some() {
            continue;
        }
        if let Ok(room_id) = seal_match(svc, user.user_id, candidate_id, false).await {
            return FindOutcome::Matched {
                room_id,
                partner: candidate_id,
            };
        }
    }

    svc.db.queue_upsert(user.user_id, &filters);
    FindOutcome::Queued
}

/// Remove the user from whichever waiting structure holds them. Idempotent;
/// returns whether a search was actually cancelled.
pub fn cancel_search(svc: &Services, user_id: i64) -> bool {
    let from_pool = svc.pool.remove(user_id);
    let from_queue = svc.db.queue_remove(user_id);
    from_pool || from_queue
}

/// Seal a match: withdraw both users from pool and queue, create the room and
/// both bindings in one transaction, notify both sides in their locale, and
/// mirror the new room to the moderator channel. On conflict the untouched
/// side is returned to its prior waiting state.
pub async fn seal_match(
    svc: &Services,
    a: i64,
    b: i64,
    privileged: bool,
) -> Result<String, SealError> {
    let a_pooled = svc.pool.remove(a);
    let b_pooled = svc.pool.remove(b);
    let a_queued = svc.db.queue_take(a);
    let b_queued = svc.db.queue_take(b);

    let room_id = db::generate_room_id();
    match svc.db.seal_room(&room_id, a, b, privileged) {
        Ok(true) => {}
        Ok(false) => {
            release(svc, a, a_pooled, a_queued);
            release(svc, b, b_pooled, b_queued);
            return Err(SealError::Conflict);
        }
        Err(e) => {
            release(svc, a, a_pooled, a_queued);
            release(svc, b, b_pooled, b_queued);
            return Err(SealError::Store(e.to_string()));
        }
    }

    // Both notifications fire before the matchmaker returns to the caller.
    for uid in [a, b] {
        let lang = svc
            .db
            .get_user(uid)
            .map(|u| u.language)
            .unwrap_or_default();
        let text = format!("🎉 {}", t(lang, "match_found"));
        svc.gateway.safe_send_text(uid, &text).await;
    }

    mirror_new_room(svc, &room_id, a, b).await;
    Ok(room_id)
}

/// Put a user back where they were waiting, unless they got bound elsewhere
/// in the meantime.
fn release(svc: &Services, user_id: i64, was_pooled: bool, was_queued: Option<MatchFilters>) {
    if svc.db.get_binding(user_id).is_some() {
        return;
    }
    if was_pooled {
        svc.pool.add(user_id);
    } else if let Some(filters) = was_queued {
        svc.db.queue_upsert(user_id, &filters);
    }
}

/// Post the new-room header and both participants' profile photos to the
/// moderator channel. Failures are logged and never affect the match.
async fn mirror_new_room(svc: &Services, room_id: &str, a: i64, b: i64) {
    let channel = svc.config.mod_channel_id;
    if channel == 0 {
        return;
    }

    let users: Vec<User> = [a, b].iter().filter_map(|&id| svc.db.get_user(id)).collect();
    let mut txt = format!("🆕 New Room Created\nRoomID: {room_id}\n");
    for (i, u) in users.iter().enumerate() {
        txt.push_str(&format!(
            "👤 User{}:\nID: {} | Username: @{}\nLanguage: {}, Gender: {}, Region: {}, Premium: {}\n",
            i + 1,
            u.user_id,
            u.username,
            u.language.as_str(),
            u.gender.map(|g| g.as_str()).unwrap_or(""),
            u.region.map(|r| r.as_str()).unwrap_or(""),
            u.is_premium,
        ));
    }
    if !svc.gateway.safe_send_text(channel, &txt).await {
        return;
    }

    for u in &users {
        for photo in u.profile_photos.iter().take(MATCH_PHOTO_LIMIT) {
            tokio::time::sleep(std::time::Duration::from_millis(MIRROR_PACING_MS)).await;
            if svc
                .gateway
                .copy_media(channel, ContentKind::Photo, photo, None)
                .await
                .is_err()
            {
                eprintln!("⚠️ Could not mirror profile photo for user {}", u.user_id);
            }
        }
    }
}
