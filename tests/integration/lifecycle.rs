use crate::common::*;
use anon_pair_chat::db::Db;
use anon_pair_chat::models::{Gender, Region};
use rocket::http::Header;
use rusqlite::params;

fn run_reconcile(client: &rocket::local::blocking::Client) -> i64 {
    let res = client
        .post("/api/v1/maintenance/reconcile")
        .header(Header::new("X-Admin-Key", ADMIN_API_KEY))
        .dispatch();
    let body: serde_json::Value = res.into_json().unwrap();
    body["affected"].as_i64().unwrap()
}

// --- Startup reconciliation (restart survival) ---

#[test]
fn test_restart_drops_binding_to_inactive_room() {
    let db_path = temp_db_path();

    // Seed a pre-restart state: a binding pointing at an inactive room
    {
        let db = Db::new(&db_path);
        assert!(db.seal_room("room_stale", 1, 2, false).unwrap());
        let conn = db.conn();
        conn.execute("UPDATE rooms SET active = 0 WHERE id = 'room_stale'", [])
            .unwrap();
    }

    let client = test_client_at(&db_path);
    let svc = services(&client);
    assert!(svc.db.get_binding(1).is_none(), "stale binding removed at startup");
    assert!(svc.db.get_binding(2).is_none());

    // A subsequent /find succeeds normally
    setup_profile(&svc, 1, Gender::Male, Region::Europe);
    send_text(&client, 1, "/find");
    assert_sent_containing(&svc, 1, "Searching for a partner");
}

#[test]
fn test_restart_marks_everyone_offline() {
    let db_path = temp_db_path();
    {
        let client = test_client_at(&db_path).keep_db_on_drop();
        let svc = services(&client);
        setup_profile(&svc, 1, Gender::Male, Region::Europe);
        assert!(svc.db.get_user(1).unwrap().is_online);
    }

    let client = test_client_at(&db_path);
    let svc = services(&client);
    assert!(!svc.db.get_user(1).unwrap().is_online);
}

// --- Reconciliation sweep ---

#[test]
fn test_reconcile_drops_binding_to_missing_room() {
    let client = test_client();
    let svc = services(&client);
    {
        let conn = svc.db.conn();
        conn.execute(
            "INSERT INTO user_rooms (user_id, room_id) VALUES (?1, ?2)",
            params![5, "room_gone"],
        )
        .unwrap();
    }

    assert_eq!(run_reconcile(&client), 1);
    assert!(svc.db.get_binding(5).is_none());
}

#[test]
fn test_reconcile_keeps_active_rooms() {
    let client = test_client();
    let svc = services(&client);
    let room = pair_users(&client, 1, 2);
    assert_eq!(run_reconcile(&client), 0);
    assert_eq!(svc.db.get_binding(1), Some(room));
}

#[test]
fn test_inactive_room_garbage_collected_after_grace_period() {
    let client = test_client();
    let svc = services(&client);
    let room = pair_users(&client, 1, 2);
    send_text(&client, 1, "hello");
    send_text(&client, 1, "/end");

    // Within the grace period the room and its history survive
    assert_eq!(run_reconcile(&client), 0);
    assert!(svc.db.get_room(&room).is_some());
    assert_eq!(svc.db.get_chat_history(&room).len(), 1);

    // Age the closure beyond the grace period
    {
        let conn = svc.db.conn();
        conn.execute(
            "UPDATE rooms SET closed_at = '2000-01-01T00:00:00+00:00' WHERE id = ?1",
            params![&room],
        )
        .unwrap();
    }
    assert_eq!(run_reconcile(&client), 1);
    assert!(svc.db.get_room(&room).is_none());
    assert!(svc.db.get_chat_history(&room).is_empty());
}

// --- History survives the end of a chat (within grace) ---

#[test]
fn test_history_readable_after_end() {
    let client = test_client();
    let svc = services(&client);
    let room = pair_users(&client, 1, 2);
    send_text(&client, 1, "for the record");
    send_text(&client, 1, "/end");
    svc.gateway.clear_sent();

    send_text(&client, ADMIN_ID, &format!("/viewhistory {room}"));
    assert_sent_containing(&svc, ADMIN_ID, "for the record");
}
