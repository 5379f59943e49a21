use crate::common::*;
use anon_pair_chat::models::{Gender, Region};

// --- Opportunistic matching (simple path) ---

#[test]
fn test_two_free_users_match() {
    let client = test_client();
    let svc = services(&client);
    setup_profile(&svc, 1, Gender::Male, Region::Europe);
    setup_profile(&svc, 2, Gender::Female, Region::Asia);

    // A searches an empty pool
    send_text(&client, 1, "/find");
    assert_sent_containing(&svc, 1, "Searching for a partner");
    assert!(svc.pool.contains(1));
    assert!(svc.db.get_binding(1).is_none());

    // B finds A
    send_text(&client, 2, "/find");
    let room_a = svc.db.get_binding(1).expect("A bound");
    let room_b = svc.db.get_binding(2).expect("B bound");
    assert_eq!(room_a, room_b);
    assert!(svc.pool.is_empty());

    let room = svc.db.get_room(&room_a).expect("room exists");
    assert!(room.active);
    assert!(room.contains(1) && room.contains(2));

    // Both received the match notification
    assert_sent_containing(&svc, 1, "Match found");
    assert_sent_containing(&svc, 2, "Match found");

    // The moderator channel got the new-room header
    assert_sent_containing(&svc, MOD_CHANNEL, "New Room Created");
    assert_sent_containing(&svc, MOD_CHANNEL, &room_a);
}

#[test]
fn test_exactly_two_bindings_per_room() {
    let client = test_client();
    let svc = services(&client);
    let room = pair_users(&client, 1, 2);
    assert_eq!(svc.db.bindings_for_room(&room), vec![1, 2]);
}

#[test]
fn test_find_while_in_room() {
    let client = test_client();
    let svc = services(&client);
    pair_users(&client, 1, 2);
    send_text(&client, 1, "/find");
    assert_sent_containing(&svc, 1, "already in a chat");
    // No double membership
    assert!(!svc.pool.contains(1));
}

#[test]
fn test_find_twice_reports_already_searching() {
    let client = test_client();
    let svc = services(&client);
    setup_profile(&svc, 1, Gender::Male, Region::Europe);
    send_text(&client, 1, "/find");
    send_text(&client, 1, "/find");
    assert_sent_containing(&svc, 1, "already searching");
    assert_eq!(svc.pool.len(), 1);
}

#[test]
fn test_incomplete_profile_routes_into_setup_flow() {
    let client = test_client();
    let svc = services(&client);

    send_text(&client, 7, "/find");
    assert_sent_containing(&svc, 7, "complete your profile");
    assert!(svc.pool.is_empty());

    // Walk the profile flow: gender → region → country
    send_text(&client, 7, "male");
    assert_sent_containing(&svc, 7, "region");
    send_text(&client, 7, "Asia");
    assert_sent_containing(&svc, 7, "country");
    send_text(&client, 7, "Testland");
    assert_sent_containing(&svc, 7, "Profile saved");

    let user = svc.db.get_user(7).unwrap();
    assert_eq!(user.gender, Some(Gender::Male));
    assert_eq!(user.region, Some(Region::Asia));
    assert_eq!(user.country, "Testland");

    // Now /find works
    svc.gateway.clear_sent();
    send_text(&client, 7, "/find");
    assert_sent_containing(&svc, 7, "Searching for a partner");
}

#[test]
fn test_invalid_flow_answer_reprompts() {
    let client = test_client();
    let svc = services(&client);
    send_text(&client, 7, "/find");
    send_text(&client, 7, "attack-helicopter");
    assert_sent_containing(&svc, 7, "Invalid option");
    // The flow is still pending and accepts a valid answer
    send_text(&client, 7, "female");
    assert_sent_containing(&svc, 7, "region");
}

// --- Ending and cancelling ---

#[test]
fn test_end_closes_room_and_notifies_partner() {
    let client = test_client();
    let svc = services(&client);
    let room = pair_users(&client, 1, 2);

    send_text(&client, 1, "/end");
    assert_sent_containing(&svc, 1, "left the chat");
    assert_sent_containing(&svc, 2, "partner has left");

    assert!(svc.db.get_binding(1).is_none());
    assert!(svc.db.get_binding(2).is_none());
    let room = svc.db.get_room(&room).expect("room retained for grace period");
    assert!(!room.active);
    assert!(room.closed_at.is_some());
}

#[test]
fn test_end_twice_is_a_noop() {
    let client = test_client();
    let svc = services(&client);
    pair_users(&client, 1, 2);
    send_text(&client, 1, "/end");
    svc.gateway.clear_sent();
    send_text(&client, 1, "/end");
    assert_sent_containing(&svc, 1, "not in a chat");
    // Partner was not notified twice
    assert!(texts_to(&svc, 2).is_empty());
}

#[test]
fn test_end_cancels_pool_search() {
    let client = test_client();
    let svc = services(&client);
    setup_profile(&svc, 1, Gender::Male, Region::Europe);
    send_text(&client, 1, "/find");
    assert!(svc.pool.contains(1));
    send_text(&client, 1, "/end");
    assert_sent_containing(&svc, 1, "Stopped searching");
    assert!(svc.pool.is_empty());
}

#[test]
fn test_next_leaves_and_searches_again() {
    let client = test_client();
    let svc = services(&client);
    pair_users(&client, 1, 2);

    send_text(&client, 1, "/next");
    assert_sent_containing(&svc, 1, "left the chat");
    assert_sent_containing(&svc, 2, "partner has left");
    assert_sent_containing(&svc, 1, "Searching for a partner");
    assert!(svc.pool.contains(1));
    assert!(svc.db.get_binding(1).is_none());
}

// --- Admin pairing operations ---

#[test]
fn test_linkusers_withdraws_from_pool() {
    let client = test_client();
    let svc = services(&client);
    setup_profile(&svc, 1, Gender::Male, Region::Europe);
    setup_profile(&svc, 2, Gender::Female, Region::Asia);
    send_text(&client, 2, "/find");
    assert!(svc.pool.contains(2));
    svc.gateway.clear_sent();

    send_text(&client, ADMIN_ID, "/linkusers 1 2");
    assert!(!svc.pool.contains(2));
    let room_a = svc.db.get_binding(1).expect("A bound");
    assert_eq!(svc.db.get_binding(2), Some(room_a.clone()));
    assert_sent_containing(&svc, 1, "Match found");
    assert_sent_containing(&svc, 2, "Match found");
    assert_sent_containing(&svc, ADMIN_ID, "Linked users");
    assert_sent_containing(&svc, MOD_CHANNEL, "New Room Created");
}

#[test]
fn test_linkusers_rejects_bound_user() {
    let client = test_client();
    let svc = services(&client);
    pair_users(&client, 1, 2);
    setup_profile(&svc, 3, Gender::Male, Region::Europe);
    send_text(&client, ADMIN_ID, "/linkusers 1 3");
    assert_sent_containing(&svc, ADMIN_ID, "already in a room");
    assert!(svc.db.get_binding(3).is_none());
}

#[test]
fn test_adminroom_creates_privileged_room() {
    let client = test_client();
    let svc = services(&client);
    setup_profile(&svc, 5, Gender::Female, Region::Africa);
    send_text(&client, ADMIN_ID, "/adminroom 5");

    let room_id = svc.db.get_binding(5).expect("target bound");
    assert_eq!(svc.db.get_binding(ADMIN_ID), Some(room_id.clone()));
    let room = svc.db.get_room(&room_id).unwrap();
    assert!(room.privileged);
    // The target sees a normal match notification
    assert_sent_containing(&svc, 5, "Match found");
    assert_sent_containing(&svc, ADMIN_ID, "Private room with user 5 created");
}

// --- Waiting-state exclusivity ---

#[test]
fn test_user_is_in_at_most_one_waiting_structure() {
    let client = test_client();
    let svc = services(&client);
    setup_profile(&svc, 1, Gender::Male, Region::Europe);
    send_text(&client, 1, "/find");
    assert!(svc.pool.contains(1));
    assert!(!svc.db.queue_contains(1));
    assert!(svc.db.get_binding(1).is_none());

    // Once matched, the user is only in a room
    setup_profile(&svc, 2, Gender::Female, Region::Asia);
    send_text(&client, 2, "/find");
    for uid in [1, 2] {
        assert!(!svc.pool.contains(uid));
        assert!(!svc.db.queue_contains(uid));
        assert!(svc.db.get_binding(uid).is_some());
    }
}
