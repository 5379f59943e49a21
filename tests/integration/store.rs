// Store-level checks that are awkward to reach through the gateway surface:
// the seal transaction's conflict behavior, upsert totality, and lookup
// case-folding.

use crate::common::temp_db_path;
use anon_pair_chat::db::{Db, generate_room_id};
use anon_pair_chat::models::{Gender, Language, MatchFilters, Region, UserRef};

struct TempDb {
    db: Db,
    path: String,
}

impl Drop for TempDb {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.path);
        let _ = std::fs::remove_file(format!("{}-wal", self.path));
        let _ = std::fs::remove_file(format!("{}-shm", self.path));
    }
}

fn temp_db() -> TempDb {
    let path = temp_db_path();
    TempDb {
        db: Db::new(&path),
        path,
    }
}

fn touch(db: &Db, id: i64, username: &str) {
    db.touch_user(&UserRef {
        id,
        username: Some(username.to_string()),
        first_name: Some("Test".to_string()),
        last_name: None,
        language_code: Some("en".to_string()),
    });
}

#[test]
fn test_touch_creates_total_user_row() {
    let t = temp_db();
    touch(&t.db, 1, "alice");
    let user = t.db.get_user(1).expect("row created");
    assert_eq!(user.username, "alice");
    assert_eq!(user.language, Language::En);
    assert_eq!(user.gender, None);
    assert_eq!(user.country, "");
    assert!(!user.is_premium);
    assert!(!user.blocked);
    assert!(user.is_online);
    assert_eq!(user.referral_count, 0);
    assert!(user.profile_photos.is_empty());
    assert!(!user.created_at.is_empty());
}

#[test]
fn test_touch_does_not_clobber_with_empty_identity() {
    let t = temp_db();
    touch(&t.db, 1, "alice");
    t.db.touch_user(&UserRef {
        id: 1,
        username: None,
        first_name: None,
        last_name: None,
        language_code: None,
    });
    let user = t.db.get_user(1).unwrap();
    assert_eq!(user.username, "alice");
    assert_eq!(user.name, "Test");
}

#[test]
fn test_username_lookup_is_case_insensitive() {
    let t = temp_db();
    touch(&t.db, 1, "Alice");
    assert_eq!(t.db.get_user_by_username("alice").unwrap().user_id, 1);
    assert_eq!(t.db.get_user_by_username("@ALICE").unwrap().user_id, 1);
    assert!(t.db.get_user_by_username("bob").is_none());
    assert!(t.db.get_user_by_username("@").is_none());
}

#[test]
fn test_seal_room_creates_room_and_both_bindings() {
    let t = temp_db();
    let room_id = generate_room_id();
    assert!(room_id.starts_with("room_"));
    assert!(t.db.seal_room(&room_id, 1, 2, false).unwrap());

    let room = t.db.get_room(&room_id).unwrap();
    assert!(room.active);
    assert_eq!(room.partner_of(1), Some(2));
    assert_eq!(t.db.get_binding(1).as_deref(), Some(room_id.as_str()));
    assert_eq!(t.db.get_binding(2).as_deref(), Some(room_id.as_str()));
    assert_eq!(t.db.bindings_for_room(&room_id), vec![1, 2]);
}

#[test]
fn test_seal_room_conflicts_when_either_side_is_bound() {
    let t = temp_db();
    let first = generate_room_id();
    assert!(t.db.seal_room(&first, 1, 2, false).unwrap());

    // User 2 is already bound: the whole transaction must roll back
    let second = generate_room_id();
    assert!(!t.db.seal_room(&second, 3, 2, false).unwrap());
    assert!(t.db.get_room(&second).is_none(), "room insert rolled back");
    assert!(t.db.get_binding(3).is_none(), "loser's binding rolled back");
    assert_eq!(t.db.get_binding(2).as_deref(), Some(first.as_str()));
}

#[test]
fn test_seal_room_rejects_self_pair() {
    let t = temp_db();
    assert!(!t.db.seal_room(&generate_room_id(), 7, 7, false).unwrap());
    assert!(t.db.get_binding(7).is_none());
}

#[test]
fn test_close_room_drops_bindings_and_keeps_row() {
    let t = temp_db();
    let room_id = generate_room_id();
    t.db.seal_room(&room_id, 1, 2, false).unwrap();
    t.db.log_chat(&room_id, 1, anon_pair_chat::models::ContentKind::Text, "hi");

    t.db.close_room(&room_id);
    assert!(t.db.get_binding(1).is_none());
    assert!(t.db.get_binding(2).is_none());
    let room = t.db.get_room(&room_id).unwrap();
    assert!(!room.active);
    assert!(room.closed_at.is_some());
    assert_eq!(t.db.get_chat_history(&room_id).len(), 1);

    t.db.delete_room(&room_id);
    assert!(t.db.get_room(&room_id).is_none());
    assert!(t.db.get_chat_history(&room_id).is_empty());
}

#[test]
fn test_queue_take_returns_filter_snapshot() {
    let t = temp_db();
    let filters = MatchFilters {
        gender: Some(Gender::Female),
        region: Some(Region::SouthAmerica),
        language: Some(Language::Ar),
    };
    t.db.queue_upsert(1, &filters);
    assert!(t.db.queue_contains(1));

    let taken = t.db.queue_take(1).expect("entry present");
    assert_eq!(taken, filters);
    assert!(!t.db.queue_contains(1));
    assert!(t.db.queue_take(1).is_none());
}

#[test]
fn test_queue_entries_keep_insertion_order() {
    let t = temp_db();
    for uid in [10, 20, 30] {
        t.db.queue_upsert(uid, &MatchFilters::default());
    }
    let order: Vec<i64> = t.db.queue_entries().iter().map(|e| e.user_id).collect();
    assert_eq!(order, vec![10, 20, 30]);
}

#[test]
fn test_scan_queue_skips_self_and_blocked() {
    let t = temp_db();
    touch(&t.db, 1, "alice");
    t.db.set_gender(1, Gender::Female);
    t.db.set_region(1, Region::Asia);
    t.db.set_country(1, "Testland");

    touch(&t.db, 2, "bob");
    t.db.queue_upsert(
        2,
        &MatchFilters {
            gender: Some(Gender::Female),
            region: None,
            language: None,
        },
    );

    let candidate = t.db.get_user(1).unwrap();
    assert_eq!(t.db.scan_queue_for_match(&candidate), Some(2));

    // Not against their own entry
    let queued = t.db.get_user(2).unwrap();
    assert_eq!(t.db.scan_queue_for_match(&queued), None);

    // Blocked queued users are skipped
    t.db.set_blocked(2, true);
    assert_eq!(t.db.scan_queue_for_match(&candidate), None);
}

#[test]
fn test_blocked_words_are_case_folded_and_idempotent() {
    let t = temp_db();
    assert!(t.db.add_blocked_word("Durian"));
    assert!(!t.db.add_blocked_word("DURIAN"));
    assert_eq!(t.db.blocked_words(), vec!["durian".to_string()]);
    assert!(t.db.remove_blocked_word("dUrIaN"));
    assert!(!t.db.remove_blocked_word("durian"));
}

#[test]
fn test_filters_round_trip_through_user_row() {
    let t = temp_db();
    touch(&t.db, 1, "alice");
    let filters = MatchFilters {
        gender: Some(Gender::Male),
        region: Some(Region::NorthAmerica),
        language: None,
    };
    t.db.set_filters(1, &filters);
    assert_eq!(t.db.get_user(1).unwrap().filters, filters);
}
