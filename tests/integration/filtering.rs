use crate::common::*;

// --- Blocked words ---

#[test]
fn test_blocked_word_stops_message() {
    let client = test_client();
    let svc = services(&client);
    let room = pair_users(&client, 1, 2);

    send_text(&client, ADMIN_ID, "/blockword durian");
    svc.gateway.clear_sent();

    send_text(&client, 1, "I love DURIAN so much");
    assert_sent_containing(&svc, 1, "blocked word");
    assert!(texts_to(&svc, 2).is_empty(), "no copy to partner");
    assert!(svc.db.get_chat_history(&room).is_empty(), "nothing logged");
}

#[test]
fn test_unblockword_restores_flow() {
    let client = test_client();
    let svc = services(&client);
    pair_users(&client, 1, 2);

    send_text(&client, ADMIN_ID, "/blockword durian");
    send_text(&client, ADMIN_ID, "/unblockword durian");
    svc.gateway.clear_sent();

    send_text(&client, 1, "durian is fine now");
    assert_eq!(texts_to(&svc, 2), vec!["durian is fine now".to_string()]);
}

#[test]
fn test_blockword_acknowledges_duplicates() {
    let client = test_client();
    let svc = services(&client);
    send_text(&client, ADMIN_ID, "/blockword spam");
    assert_sent_containing(&svc, ADMIN_ID, "'spam' added");
    send_text(&client, ADMIN_ID, "/blockword SPAM");
    assert_sent_containing(&svc, ADMIN_ID, "already present");
    send_text(&client, ADMIN_ID, "/unblockword nope");
    assert_sent_containing(&svc, ADMIN_ID, "not found");
}

// --- Link strikes ---

#[test]
fn test_three_strikes_escalate_to_moderators() {
    let client = test_client();
    let svc = services(&client);
    let room = pair_users(&client, 1, 2);

    // Strikes 1 and 2: policy warning only
    for _ in 0..2 {
        send_text(&client, 1, "visit https://x.me");
    }
    let warnings = texts_to(&svc, 1)
        .iter()
        .filter(|t| t.contains("not allowed"))
        .count();
    assert_eq!(warnings, 2);
    assert!(
        !texts_to(&svc, MOD_CHANNEL)
            .iter()
            .any(|t| t.contains("#spam"))
    );

    // Strike 3: terminal notice + #spam escalation
    send_text(&client, 1, "visit https://x.me");
    assert_sent_containing(&svc, 1, "violated the bot policy");
    assert_sent_containing(&svc, MOD_CHANNEL, "#spam User 1");

    // Never copied, never logged
    assert!(texts_to(&svc, 2).is_empty());
    assert!(svc.db.get_chat_history(&room).is_empty());
}

#[test]
fn test_fourth_strike_does_not_escalate_again() {
    let client = test_client();
    let svc = services(&client);
    pair_users(&client, 1, 2);

    for _ in 0..4 {
        send_text(&client, 1, "see www.spam.ru");
    }
    let escalations = texts_to(&svc, MOD_CHANNEL)
        .iter()
        .filter(|t| t.contains("#spam"))
        .count();
    assert_eq!(escalations, 1);
    let finals = texts_to(&svc, 1)
        .iter()
        .filter(|t| t.contains("violated the bot policy"))
        .count();
    assert_eq!(finals, 2);
}

#[test]
fn test_bot_handle_counts_as_forbidden() {
    let client = test_client();
    let svc = services(&client);
    pair_users(&client, 1, 2);

    send_text(&client, 1, "talk to @shadymatchbot instead");
    assert_sent_containing(&svc, 1, "not allowed");
    assert!(texts_to(&svc, 2).is_empty());
}

#[test]
fn test_strikes_are_per_user() {
    let client = test_client();
    let svc = services(&client);
    pair_users(&client, 1, 2);

    send_text(&client, 1, "https://a.com");
    send_text(&client, 1, "https://b.com");
    send_text(&client, 2, "https://c.com");

    // User 2 is on strike 1, no escalation yet
    assert!(
        !texts_to(&svc, MOD_CHANNEL)
            .iter()
            .any(|t| t.contains("#spam"))
    );
    // User 1's third strike escalates, naming user 1
    send_text(&client, 1, "https://d.com");
    assert_sent_containing(&svc, MOD_CHANNEL, "#spam User 1");
}
