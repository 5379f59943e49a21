use crate::Services;
use crate::filter::{self, MAX_STRIKES, Verdict};
use crate::gateway::SendError;
use crate::matchmaker::MIRROR_PACING_MS;
use crate::models::{ContentKind, InboundMessage, Room, User};
use crate::texts::t;

/// Relay one inbound non-command message from a bound user: resolve the
/// partner, screen the content, log it, copy it verbatim, and mirror it to
/// the moderator channel. Unbound senders get a hint and are still mirrored.
pub async fn handle_message(svc: &Services, msg: &InboundMessage) {
    let user_id = msg.from.id;
    let user = svc.db.get_user(user_id);
    let lang = user.as_ref().map(|u| u.language).unwrap_or_default();
    let body = msg.body_text();

    let Some(room_id) = svc.db.get_binding(user_id) else {
        let _ = svc
            .gateway
            .safe_send_text(user_id, t(lang, "not_in_room"))
            .await;
        mirror_message(svc, None, user.as_ref(), None, msg).await;
        return;
    };

    match filter::check(&svc.db.blocked_words(), body) {
        Verdict::BlockedWord(_) => {
            let _ = svc
                .gateway
                .safe_send_text(user_id, t(lang, "blocked_word"))
                .await;
            return;
        }
        Verdict::Forbidden => {
            let strikes = svc.strikes.record(user_id);
            if strikes < MAX_STRIKES {
                let _ = svc
                    .gateway
                    .safe_send_text(user_id, t(lang, "policy_warning"))
                    .await;
            } else {
                if strikes == MAX_STRIKES && svc.config.mod_channel_id != 0 {
                    let alert = format!(
                        "#spam User {user_id} sent forbidden links or bot usernames {MAX_STRIKES} times. Please consider blocking."
                    );
                    let _ = svc
                        .gateway
                        .safe_send_text(svc.config.mod_channel_id, &alert)
                        .await;
                }
                let _ = svc
                    .gateway
                    .safe_send_text(user_id, t(lang, "policy_final"))
                    .await;
            }
            return;
        }
        Verdict::Clean => {}
    }

    svc.db.log_chat(&room_id, user_id, msg.content_kind(), body);

    let room = svc.db.get_room(&room_id);
    let Some(partner_id) = room.as_ref().and_then(|r| r.partner_of(user_id)) else {
        let _ = svc
            .gateway
            .safe_send_text(user_id, t(lang, "chat_error"))
            .await;
        return;
    };

    let delivered = match &msg.media {
        Some(m) => {
            svc.gateway
                .copy_media(partner_id, m.kind, &m.file_id, msg.caption.as_deref())
                .await
        }
        None => svc.gateway.send_text(partner_id, body).await,
    };

    match delivered {
        Ok(()) => {}
        Err(SendError::Gone) => {
            // Partner unreachable: tear down the caller's side only; the
            // partner's side is reconciled on their next action or by the
            // stale-binding sweeper.
            svc.db.delete_binding(user_id);
            let _ = svc
                .gateway
                .safe_send_text(user_id, t(lang, "partner_left"))
                .await;
            return;
        }
        Err(SendError::Transient) => {
            let _ = svc
                .gateway
                .safe_send_text(user_id, t(lang, "delivery_failed"))
                .await;
            return;
        }
    }

    let partner = svc.db.get_user(partner_id);
    mirror_message(svc, room.as_ref(), user.as_ref(), partner.as_ref(), msg).await;
}

fn mirror_header(room: Option<&Room>, sender: Option<&User>, partner: Option<&User>, sender_id: i64) -> String {
    let username = |u: Option<&User>| -> String {
        match u {
            Some(u) if !u.username.is_empty() => format!("@{}", u.username),
            _ => "No username".to_string(),
        }
    };
    let mut header = format!(
        "📢 Room #{}\n👤 Sender: {} (username: {})",
        room.map(|r| r.room_id.as_str()).unwrap_or("none"),
        sender_id,
        username(sender),
    );
    if let Some(p) = partner {
        header.push_str(&format!(
            "\n👥 Receiver: {} (username: {})",
            p.user_id,
            username(Some(p))
        ));
    }
    header.push_str(&format!(
        "\nRoom Created: {}",
        room.map(|r| r.created_at.as_str()).unwrap_or("N/A")
    ));
    header
}

/// Out-of-band copy of the message into the moderator channel. An
/// independent send; failures are logged and the relay still succeeds.
async fn mirror_message(
    svc: &Services,
    room: Option<&Room>,
    sender: Option<&User>,
    partner: Option<&User>,
    msg: &InboundMessage,
) {
    let channel = svc.config.mod_channel_id;
    if channel == 0 {
        return;
    }
    let header = mirror_header(room, sender, partner, msg.from.id);

    let result = match &msg.media {
        None => {
            let text = format!("{header}\n💬 Message: {}", msg.body_text());
            svc.gateway.send_text(channel, &text).await
        }
        // Stickers and round videos cannot carry captions; the header
        // follows as a separate message.
        Some(m) if matches!(m.kind, ContentKind::Sticker | ContentKind::VideoNote) => {
            let first = svc.gateway.copy_media(channel, m.kind, &m.file_id, None).await;
            tokio::time::sleep(std::time::Duration::from_millis(MIRROR_PACING_MS)).await;
            let _ = svc
                .gateway
                .send_text(channel, &format!("{header}\n{}", m.kind.label()))
                .await;
            first
        }
        Some(m) => {
            let caption = format!("{header}\n{}", m.kind.label());
            svc.gateway
                .copy_media(channel, m.kind, &m.file_id, Some(&caption))
                .await
        }
    };

    if let Err(e) = result {
        eprintln!("⚠️ Moderator mirror failed: {e}");
    }
}
