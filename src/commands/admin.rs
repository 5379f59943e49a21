use super::Command;
use crate::Services;
use crate::matchmaker::MIRROR_PACING_MS;
use crate::models::{ContentKind, InboundMessage, User};
use crate::rooms;
use rusqlite::params;

/// `/setpremium` grant length when no day count is given.
pub const DEFAULT_PREMIUM_DAYS: i64 = 90;

/// Delay between consecutive broadcast sends, to stay inside gateway rate
/// limits.
pub const BROADCAST_PACING_MS: u64 = 50;

pub fn is_admin_command(name: &str) -> bool {
    matches!(
        name,
        "block"
            | "unblock"
            | "setpremium"
            | "resetpremium"
            | "message"
            | "ad"
            | "adminroom"
            | "linkusers"
            | "blockword"
            | "unblockword"
            | "stats"
            | "export"
            | "userinfo"
            | "roominfo"
            | "viewhistory"
            | "checkreferrals"
    )
}

/// Resolve `<user_id or @username>` to a user row.
fn lookup_user(svc: &Services, identifier: &str) -> Option<User> {
    if let Ok(id) = identifier.parse::<i64>()
        && let Some(u) = svc.db.get_user(id)
    {
        return Some(u);
    }
    svc.db.get_user_by_username(identifier)
}

async fn reply(svc: &Services, admin_id: i64, text: &str) {
    let _ = svc.gateway.safe_send_text(admin_id, text).await;
}

pub async fn dispatch(svc: &Services, msg: &InboundMessage, cmd: &Command) {
    let admin_id = msg.from.id;
    match cmd.name.as_str() {
        "block" => toggle_block(svc, admin_id, cmd, true).await,
        "unblock" => toggle_block(svc, admin_id, cmd, false).await,
        "setpremium" => set_premium(svc, admin_id, cmd).await,
        "resetpremium" => reset_premium(svc, admin_id, cmd).await,
        "message" => message(svc, msg, cmd).await,
        "ad" => broadcast(svc, msg, cmd).await,
        "adminroom" => admin_room(svc, admin_id, cmd).await,
        "linkusers" => link_users(svc, admin_id, cmd).await,
        "blockword" => block_word(svc, admin_id, cmd, true).await,
        "unblockword" => block_word(svc, admin_id, cmd, false).await,
        "stats" => stats(svc, admin_id).await,
        "export" => export(svc, admin_id, cmd).await,
        "userinfo" => user_info(svc, admin_id, cmd).await,
        "roominfo" => room_info(svc, admin_id, cmd).await,
        "viewhistory" => view_history(svc, admin_id, cmd).await,
        "checkreferrals" => check_referrals(svc, admin_id, cmd).await,
        _ => {}
    }
}

async fn toggle_block(svc: &Services, admin_id: i64, cmd: &Command, blocked: bool) {
    let verb = if blocked { "block" } else { "unblock" };
    let Some(identifier) = cmd.arg(0) else {
        reply(svc, admin_id, &format!("Usage: /{verb} <user_id or @username>")).await;
        return;
    };
    let Some(user) = lookup_user(svc, identifier) else {
        reply(svc, admin_id, "User not found.").await;
        return;
    };
    svc.db.set_blocked(user.user_id, blocked);
    if blocked {
        // A blocked user must not stay matchable.
        svc.pool.remove(user.user_id);
        svc.db.queue_remove(user.user_id);
    }
    reply(
        svc,
        admin_id,
        &format!("User {} {}ed.", user.user_id, verb),
    )
    .await;
}

async fn set_premium(svc: &Services, admin_id: i64, cmd: &Command) {
    let Some(identifier) = cmd.arg(0) else {
        reply(svc, admin_id, "Usage: /setpremium <user_id or @username> [days]").await;
        return;
    };
    let Some(user) = lookup_user(svc, identifier) else {
        reply(svc, admin_id, "User not found.").await;
        return;
    };
    let days = cmd
        .arg(1)
        .and_then(|d| d.parse::<i64>().ok())
        .filter(|&d| d > 0)
        .unwrap_or(DEFAULT_PREMIUM_DAYS);
    let expiry = (chrono::Utc::now() + chrono::Duration::days(days)).to_rfc3339();
    svc.db.grant_premium(user.user_id, &expiry);
    reply(
        svc,
        admin_id,
        &format!("User {} promoted to premium until {expiry}", user.user_id),
    )
    .await;
    svc.gateway
        .safe_send_text(user.user_id, &format!("⭐ You are premium until {expiry}"))
        .await;
}

async fn reset_premium(svc: &Services, admin_id: i64, cmd: &Command) {
    let Some(identifier) = cmd.arg(0) else {
        reply(svc, admin_id, "Usage: /resetpremium <user_id or @username>").await;
        return;
    };
    let Some(user) = lookup_user(svc, identifier) else {
        reply(svc, admin_id, "User not found.").await;
        return;
    };
    svc.db.revoke_premium(user.user_id);
    svc.db.queue_remove(user.user_id);
    reply(
        svc,
        admin_id,
        &format!("User {} downgraded to normal user.", user.user_id),
    )
    .await;
}

/// `/message <id|@name> <text>`, or reply to a message to copy its text.
async fn message(svc: &Services, msg: &InboundMessage, cmd: &Command) {
    let admin_id = msg.from.id;
    let Some(identifier) = cmd.arg(0) else {
        reply(svc, admin_id, "Usage: /message <user_id or @username> <text>").await;
        return;
    };
    let mut text = cmd.tail(1);
    if text.is_empty()
        && let Some(r) = &msg.reply_to
    {
        text = r
            .text
            .clone()
            .or_else(|| r.caption.clone())
            .unwrap_or_default();
    }
    if text.is_empty() {
        reply(svc, admin_id, "Usage: /message <user_id or @username> <text>").await;
        return;
    }
    let Some(user) = lookup_user(svc, identifier) else {
        reply(svc, admin_id, "User not found.").await;
        return;
    };
    if svc.gateway.safe_send_text(user.user_id, &text).await {
        reply(svc, admin_id, "Message sent.").await;
    } else {
        reply(svc, admin_id, "Failed to send message.").await;
    }
}

/// `/ad <text>`: paced broadcast to every known user, reporting aggregate
/// counts instead of failing fast.
async fn broadcast(svc: &Services, msg: &InboundMessage, cmd: &Command) {
    let admin_id = msg.from.id;
    let mut text = cmd.tail(0);
    if text.is_empty()
        && let Some(r) = &msg.reply_to
    {
        text = r
            .text
            .clone()
            .or_else(|| r.caption.clone())
            .unwrap_or_default();
    }
    if text.is_empty() {
        reply(svc, admin_id, "Usage: /ad <text> (or reply to a message)").await;
        return;
    }

    let user_ids = svc.db.all_user_ids();
    let total = user_ids.len();
    let mut sent = 0usize;
    let mut failed = 0usize;
    for (i, user_id) in user_ids.into_iter().enumerate() {
        if i > 0 {
            tokio::time::sleep(std::time::Duration::from_millis(BROADCAST_PACING_MS)).await;
        }
        if svc.gateway.safe_send_text(user_id, &text).await {
            sent += 1;
        } else {
            failed += 1;
        }
    }
    reply(
        svc,
        admin_id,
        &format!("Broadcast: {sent} sent, {failed} failed ({total} users)."),
    )
    .await;
}

async fn admin_room(svc: &Services, admin_id: i64, cmd: &Command) {
    let Some(identifier) = cmd.arg(0) else {
        reply(svc, admin_id, "Usage: /adminroom <user_id or @username>").await;
        return;
    };
    let Some(user) = lookup_user(svc, identifier) else {
        reply(svc, admin_id, "User not found.").await;
        return;
    };
    match rooms::adopt_admin_room(svc, admin_id, user.user_id).await {
        Ok(_) => {
            reply(
                svc,
                admin_id,
                &format!(
                    "Private room with user {} created. Now chat as usual. Use /end to leave.",
                    user.user_id
                ),
            )
            .await;
        }
        Err(_) => {
            reply(
                svc,
                admin_id,
                "Could not create room (one of you is already in a chat).",
            )
            .await;
        }
    }
}

async fn link_users(svc: &Services, admin_id: i64, cmd: &Command) {
    let (Some(first), Some(second)) = (cmd.arg(0), cmd.arg(1)) else {
        reply(svc, admin_id, "Usage: /linkusers <user_a> <user_b>").await;
        return;
    };
    let Some(a) = lookup_user(svc, first) else {
        reply(svc, admin_id, &format!("User {first} not found.")).await;
        return;
    };
    let Some(b) = lookup_user(svc, second) else {
        reply(svc, admin_id, &format!("User {second} not found.")).await;
        return;
    };
    if a.user_id == b.user_id {
        reply(svc, admin_id, "Cannot link a user with themselves.").await;
        return;
    }
    match rooms::link_users(svc, a.user_id, b.user_id).await {
        Ok(room_id) => {
            reply(
                svc,
                admin_id,
                &format!("Linked users {} and {} in room {room_id}.", a.user_id, b.user_id),
            )
            .await;
        }
        Err(rooms::LinkError::AlreadyBound(uid)) => {
            reply(svc, admin_id, &format!("User {uid} is already in a room.")).await;
        }
        Err(rooms::LinkError::Seal(_)) => {
            reply(svc, admin_id, "Could not link users.").await;
        }
    }
}

async fn block_word(svc: &Services, admin_id: i64, cmd: &Command, add: bool) {
    let verb = if add { "blockword" } else { "unblockword" };
    let Some(word) = cmd.arg(0) else {
        reply(svc, admin_id, &format!("Usage: /{verb} <word>")).await;
        return;
    };
    let text = if add {
        if svc.db.add_blocked_word(word) {
            format!("Blocked word '{word}' added.")
        } else {
            format!("Blocked word '{word}' was already present.")
        }
    } else if svc.db.remove_blocked_word(word) {
        format!("Blocked word '{word}' removed.")
    } else {
        format!("Blocked word '{word}' not found.")
    };
    reply(svc, admin_id, &text).await;
}

async fn stats(svc: &Services, admin_id: i64) {
    // Build the whole report before any send so the store lock never spans
    // a suspension point.
    let text = {
        let conn = svc.db.conn();
        let count = |sql: &str| -> i64 { conn.query_row(sql, [], |r| r.get(0)).unwrap_or(0) };
        let dist = |sql: &str| -> String {
            let mut stmt = match conn.prepare(sql) {
                Ok(s) => s,
                Err(_) => return String::new(),
            };
            let rows: Vec<String> = stmt
                .query_map([], |row| {
                    let key: Option<String> = row.get(0)?;
                    let n: i64 = row.get(1)?;
                    Ok((key, n))
                })
                .map(|rows| {
                    rows.filter_map(|r| r.ok())
                        .filter_map(|(key, n)| key.filter(|k| !k.is_empty()).map(|k| format!("{k}: {n}")))
                        .collect()
                })
                .unwrap_or_default();
            rows.join(", ")
        };

        format!(
            "📊 Stats\nUsers: {} (premium: {}, blocked: {}, online: {})\nRooms: {} (active: {})\nWaiting: pool {}, queue {}\nReports: {} (unreviewed: {})\nBlocked words: {}\nChat messages: {}\nLanguages: {}\nGenders: {}\nRegions: {}",
            count("SELECT COUNT(*) FROM users"),
            count("SELECT COUNT(*) FROM users WHERE is_premium = 1"),
            count("SELECT COUNT(*) FROM users WHERE blocked = 1"),
            count("SELECT COUNT(*) FROM users WHERE is_online = 1"),
            count("SELECT COUNT(*) FROM rooms"),
            count("SELECT COUNT(*) FROM rooms WHERE active = 1"),
            svc.pool.len(),
            count("SELECT COUNT(*) FROM premium_queue"),
            count("SELECT COUNT(*) FROM reports"),
            count("SELECT COUNT(*) FROM reports WHERE reviewed = 0"),
            count("SELECT COUNT(*) FROM blocked_words"),
            count("SELECT COUNT(*) FROM chatlogs"),
            dist("SELECT language, COUNT(*) FROM users GROUP BY language ORDER BY COUNT(*) DESC"),
            dist("SELECT gender, COUNT(*) FROM users GROUP BY gender ORDER BY COUNT(*) DESC"),
            dist("SELECT region, COUNT(*) FROM users GROUP BY region ORDER BY COUNT(*) DESC LIMIT 10"),
        )
    };
    reply(svc, admin_id, &text).await;
}

/// `/export <users|rooms|reports>`: JSON dump, truncated to one gateway
/// message.
async fn export(svc: &Services, admin_id: i64, cmd: &Command) {
    let kind = cmd.arg(0).unwrap_or("");
    let (label, json, n) = match kind {
        "users" => {
            let users = svc.db.all_users();
            let n = users.len();
            (kind, serde_json::to_string_pretty(&users).unwrap_or_default(), n)
        }
        "rooms" => {
            let rooms = svc.db.all_rooms();
            let n = rooms.len();
            (kind, serde_json::to_string_pretty(&rooms).unwrap_or_default(), n)
        }
        "reports" => {
            let reports = svc.db.all_reports();
            let n = reports.len();
            (kind, serde_json::to_string_pretty(&reports).unwrap_or_default(), n)
        }
        _ => {
            reply(svc, admin_id, "Usage: /export <users|rooms|reports>").await;
            return;
        }
    };
    reply(svc, admin_id, &format!("📦 Export {label} ({n} records):")).await;
    reply(svc, admin_id, &json).await;
}

async fn user_info(svc: &Services, admin_id: i64, cmd: &Command) {
    let Some(identifier) = cmd.arg(0) else {
        reply(svc, admin_id, "Usage: /userinfo <user_id or @username>").await;
        return;
    };
    let Some(u) = lookup_user(svc, identifier) else {
        reply(svc, admin_id, "User not found.").await;
        return;
    };
    let text = format!(
        "ID: {}\nUsername: @{}\nName: {}\nLanguage: {}\nGender: {}\nRegion: {}\nCountry: {}\nPremium: {}\nBlocked: {}\nPremium Expiry: {}\nMatching Prefs: {}\nReferrals: {} (referred by: {})\nCreated: {}\nProfile Photos: {}",
        u.user_id,
        u.username,
        u.name,
        u.language.as_str(),
        u.gender.map(|g| g.as_str()).unwrap_or(""),
        u.region.map(|r| r.as_str()).unwrap_or(""),
        u.country,
        u.is_premium,
        u.blocked,
        u.premium_expiry.as_deref().unwrap_or("N/A"),
        u.filters.describe(),
        u.referral_count,
        u.referred_by
            .map(|id| id.to_string())
            .unwrap_or_else(|| "None".to_string()),
        u.created_at,
        u.profile_photos.len(),
    );
    reply(svc, admin_id, &text).await;
    for photo in &u.profile_photos {
        tokio::time::sleep(std::time::Duration::from_millis(MIRROR_PACING_MS)).await;
        let _ = svc
            .gateway
            .copy_media(admin_id, ContentKind::Photo, photo, None)
            .await;
    }
}

async fn room_info(svc: &Services, admin_id: i64, cmd: &Command) {
    let Some(room_id) = cmd.arg(0) else {
        reply(svc, admin_id, "Usage: /roominfo <room_id>").await;
        return;
    };
    let Some(room) = svc.db.get_room(room_id) else {
        reply(svc, admin_id, "Room not found.").await;
        return;
    };
    let mut sections = Vec::new();
    for uid in room.users {
        match svc.db.get_user(uid) {
            Some(u) => sections.push(format!(
                "ID: {}\nUsername: @{}\nLanguage: {}\nGender: {}\nRegion: {}\nCountry: {}\nPremium: {}",
                u.user_id,
                u.username,
                u.language.as_str(),
                u.gender.map(|g| g.as_str()).unwrap_or(""),
                u.region.map(|r| r.as_str()).unwrap_or(""),
                u.country,
                u.is_premium,
            )),
            None => sections.push(format!("ID: {uid}\n(unknown user)")),
        }
    }
    let text = format!(
        "RoomID: {}\nActive: {}\nPrivileged: {}\nCreated: {}\nUsers:\n{}",
        room.room_id,
        room.active,
        room.privileged,
        room.created_at,
        sections.join("\n---\n"),
    );
    reply(svc, admin_id, &text).await;
}

async fn view_history(svc: &Services, admin_id: i64, cmd: &Command) {
    let Some(room_id) = cmd.arg(0) else {
        reply(svc, admin_id, "Usage: /viewhistory <room_id>").await;
        return;
    };
    let history = svc.db.get_chat_history(room_id);
    if history.is_empty() {
        reply(svc, admin_id, "No chat history found.").await;
        return;
    }
    let lines: Vec<String> = history
        .iter()
        .map(|e| format!("{} [{}] {}: {}", e.created_at, e.content_type, e.user_id, e.text))
        .collect();
    reply(svc, admin_id, &lines.join("\n")).await;
}

async fn check_referrals(svc: &Services, admin_id: i64, cmd: &Command) {
    match cmd.arg(0) {
        Some(identifier) => {
            let Some(u) = lookup_user(svc, identifier) else {
                reply(svc, admin_id, "User not found.").await;
                return;
            };
            let text = format!(
                "👤 Referral Info for {}\n\n📊 Referrals made: {}\n🔗 Referred by: {}",
                u.user_id,
                u.referral_count,
                u.referred_by
                    .map(|id| id.to_string())
                    .unwrap_or_else(|| "None".to_string()),
            );
            reply(svc, admin_id, &text).await;
        }
        None => {
            let top: Vec<String> = {
                let conn = svc.db.conn();
                let mut stmt = match conn.prepare(
                    "SELECT user_id, username, referral_count FROM users
                     WHERE referral_count > 0 ORDER BY referral_count DESC LIMIT 10",
                ) {
                    Ok(s) => s,
                    Err(_) => return,
                };
                stmt.query_map(params![], |row| {
                    let user_id: i64 = row.get(0)?;
                    let username: String = row.get(1)?;
                    let n: i64 = row.get(2)?;
                    Ok(format!("👤 {user_id} (@{username}): {n} referrals"))
                })
                .map(|rows| rows.filter_map(|r| r.ok()).collect())
                .unwrap_or_default()
            };
            let text = if top.is_empty() {
                "No referrals yet.".to_string()
            } else {
                format!("🏆 Top Referrers\n\n{}", top.join("\n"))
            };
            reply(svc, admin_id, &text).await;
        }
    }
}
