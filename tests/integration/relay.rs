use crate::common::*;
use anon_pair_chat::models::ContentKind;

// --- Text relay ---

#[test]
fn test_text_message_reaches_partner_and_log_and_mirror() {
    let client = test_client();
    let svc = services(&client);
    let room = pair_users(&client, 1, 2);

    send_text(&client, 1, "hello");

    // Partner got the verbatim copy
    let to_partner = texts_to(&svc, 2);
    assert_eq!(to_partner, vec!["hello".to_string()]);

    // One chat log record with the right attribution
    let history = svc.db.get_chat_history(&room);
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].user_id, 1);
    assert_eq!(history[0].text, "hello");
    assert_eq!(history[0].content_type, "text");

    // The moderator mirror carries the structured header
    let mirrors = texts_to(&svc, MOD_CHANNEL);
    let mirror = mirrors
        .iter()
        .find(|t| t.contains("💬 Message: hello"))
        .expect("mirror present");
    assert!(mirror.contains(&format!("Room #{room}")));
    assert!(mirror.contains("Sender: 1"));
    assert!(mirror.contains("Receiver: 2"));
    assert!(mirror.contains("Room Created:"));
}

#[test]
fn test_chat_log_preserves_order() {
    let client = test_client();
    let svc = services(&client);
    let room = pair_users(&client, 1, 2);

    send_text(&client, 1, "first");
    send_text(&client, 2, "second");
    send_text(&client, 1, "third");

    let history = svc.db.get_chat_history(&room);
    let texts: Vec<&str> = history.iter().map(|e| e.text.as_str()).collect();
    assert_eq!(texts, vec!["first", "second", "third"]);
    let senders: Vec<i64> = history.iter().map(|e| e.user_id).collect();
    assert_eq!(senders, vec![1, 2, 1]);
}

// --- Media relay ---

#[test]
fn test_media_passes_opaque_handle() {
    let client = test_client();
    let svc = services(&client);
    let room = pair_users(&client, 1, 2);

    assert_eq!(
        post_update(&client, media_update(1, "photo", "ph_123", Some("look at this"))),
        rocket::http::Status::Ok
    );

    let to_partner = svc.gateway.sent_to(2);
    assert_eq!(to_partner.len(), 1);
    assert_eq!(to_partner[0].kind, ContentKind::Photo);
    assert_eq!(to_partner[0].file_id.as_deref(), Some("ph_123"));
    assert_eq!(to_partner[0].text, "look at this");

    // The caption is what gets logged
    let history = svc.db.get_chat_history(&room);
    assert_eq!(history[0].content_type, "photo");
    assert_eq!(history[0].text, "look at this");

    // The mirror copies the same handle with the header as caption
    let mirror_media: Vec<_> = svc
        .gateway
        .sent_to(MOD_CHANNEL)
        .into_iter()
        .filter(|m| m.file_id.is_some())
        .collect();
    assert_eq!(mirror_media.len(), 1);
    assert_eq!(mirror_media[0].file_id.as_deref(), Some("ph_123"));
    assert!(mirror_media[0].text.contains("[Photo message]"));
}

#[test]
fn test_sticker_mirror_sends_header_separately() {
    let client = test_client();
    let svc = services(&client);
    pair_users(&client, 1, 2);

    post_update(&client, media_update(1, "sticker", "st_1", None));

    let mirrors = svc.gateway.sent_to(MOD_CHANNEL);
    assert!(mirrors.iter().any(|m| m.file_id.as_deref() == Some("st_1")));
    assert!(
        mirrors
            .iter()
            .any(|m| m.file_id.is_none() && m.text.contains("[Sticker]"))
    );
}

// --- Unbound senders ---

#[test]
fn test_not_in_room_hint_still_mirrors() {
    let client = test_client();
    let svc = services(&client);

    send_text(&client, 42, "anybody there?");
    assert_sent_containing(&svc, 42, "not in a chat");
    let mirrors = texts_to(&svc, MOD_CHANNEL);
    let mirror = mirrors
        .iter()
        .find(|t| t.contains("anybody there?"))
        .expect("unbound message still mirrored");
    assert!(mirror.contains("Room #none"));
    assert!(mirror.contains("Sender: 42"));
}

// --- Partner-gone ---

#[test]
fn test_partner_gone_tears_down_caller_side_only() {
    let client = test_client();
    let svc = services(&client);
    let room = pair_users(&client, 1, 2);

    svc.gateway.fail_chat(2);
    send_text(&client, 1, "are you there?");

    assert_sent_containing(&svc, 1, "partner has left");
    assert!(svc.db.get_binding(1).is_none(), "caller side torn down");
    assert_eq!(
        svc.db.get_binding(2).as_deref(),
        Some(room.as_str()),
        "partner side left for the sweeper"
    );

    // The partner's next /end reconciles their side
    svc.gateway.heal_chat(2);
    send_text(&client, 2, "/end");
    assert!(svc.db.get_binding(2).is_none());
}

#[test]
fn test_blocked_user_gets_fixed_notice() {
    let client = test_client();
    let svc = services(&client);
    pair_users(&client, 1, 2);

    send_text(&client, ADMIN_ID, "/block 1");
    svc.gateway.clear_sent();

    send_text(&client, 1, "hello?");
    assert_sent_containing(&svc, 1, "blocked");
    // Nothing relayed, logged or mirrored
    assert!(texts_to(&svc, 2).is_empty());
    assert!(texts_to(&svc, MOD_CHANNEL).is_empty());
}
