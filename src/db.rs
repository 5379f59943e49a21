use crate::models::{
    ChatLogEntry, ContentKind, Gender, Language, MatchFilters, QueueEntry, Region, Report, Room,
    User, UserRef,
};
use rusqlite::{Connection, Row, params};
use std::sync::{Mutex, MutexGuard};

pub struct Db {
    pub conn: Mutex<Connection>,
}

/// Generate a room id: `room_<32 hex chars>`
pub fn generate_room_id() -> String {
    format!("room_{:032x}", uuid::Uuid::new_v4().as_u128())
}

/// Generate a report id: `rep_<32 hex chars>`
pub fn generate_report_id() -> String {
    format!("rep_{:032x}", uuid::Uuid::new_v4().as_u128())
}

fn now_rfc3339() -> String {
    chrono::Utc::now().to_rfc3339()
}

const USER_COLUMNS: &str = "user_id, username, name, language, gender, region, country, \
     pref_gender, pref_region, pref_language, is_premium, premium_expiry, blocked, is_online, \
     referral_count, referred_by, profile_photos, created_at, updated_at";

fn row_to_user(row: &Row) -> rusqlite::Result<User> {
    let language: String = row.get(3)?;
    let gender: Option<String> = row.get(4)?;
    let region: Option<String> = row.get(5)?;
    let pref_gender: Option<String> = row.get(7)?;
    let pref_region: Option<String> = row.get(8)?;
    let pref_language: Option<String> = row.get(9)?;
    let photos_json: String = row.get(16)?;
    Ok(User {
        user_id: row.get(0)?,
        username: row.get::<_, Option<String>>(1)?.unwrap_or_default(),
        name: row.get::<_, Option<String>>(2)?.unwrap_or_default(),
        language: Language::parse(&language).unwrap_or_default(),
        gender: gender.as_deref().and_then(Gender::parse),
        region: region.as_deref().and_then(Region::parse),
        country: row.get::<_, Option<String>>(6)?.unwrap_or_default(),
        filters: MatchFilters {
            gender: pref_gender.as_deref().and_then(Gender::parse),
            region: pref_region.as_deref().and_then(Region::parse),
            language: pref_language.as_deref().and_then(Language::parse),
        },
        is_premium: row.get::<_, i64>(10)? != 0,
        premium_expiry: row.get(11)?,
        blocked: row.get::<_, i64>(12)? != 0,
        is_online: row.get::<_, i64>(13)? != 0,
        referral_count: row.get::<_, Option<i64>>(14)?.unwrap_or(0),
        referred_by: row.get(15)?,
        profile_photos: serde_json::from_str(&photos_json).unwrap_or_default(),
        created_at: row.get(17)?,
        updated_at: row.get(18)?,
    })
}

fn row_to_room(row: &Row) -> rusqlite::Result<Room> {
    Ok(Room {
        room_id: row.get(0)?,
        users: [row.get(1)?, row.get(2)?],
        created_at: row.get(3)?,
        active: row.get::<_, i64>(4)? != 0,
        privileged: row.get::<_, i64>(5)? != 0,
        closed_at: row.get(6)?,
    })
}

impl Db {
    pub fn new(path: &str) -> Self {
        let conn = Connection::open(path).expect("Failed to open database");
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")
            .expect("Failed to set pragmas");
        let db = Db {
            conn: Mutex::new(conn),
        };
        db.migrate();
        db
    }

    /// Lock the connection, recovering from a poisoned mutex.
    pub fn conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn migrate(&self) {
        let conn = self.conn();
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS users (
                user_id INTEGER PRIMARY KEY,
                username TEXT NOT NULL DEFAULT '',
                name TEXT NOT NULL DEFAULT '',
                language TEXT NOT NULL DEFAULT 'en',
                gender TEXT,
                region TEXT,
                country TEXT NOT NULL DEFAULT '',
                pref_gender TEXT,
                pref_region TEXT,
                pref_language TEXT,
                is_premium INTEGER NOT NULL DEFAULT 0,
                premium_expiry TEXT,
                blocked INTEGER NOT NULL DEFAULT 0,
                is_online INTEGER NOT NULL DEFAULT 0,
                referral_count INTEGER NOT NULL DEFAULT 0,
                referred_by INTEGER,
                profile_photos TEXT NOT NULL DEFAULT '[]',
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_users_username ON users(username);
            CREATE INDEX IF NOT EXISTS idx_users_online ON users(is_online);
            CREATE INDEX IF NOT EXISTS idx_users_premium ON users(is_premium);

            CREATE TABLE IF NOT EXISTS rooms (
                id TEXT PRIMARY KEY,
                user_a INTEGER NOT NULL,
                user_b INTEGER NOT NULL,
                created_at TEXT NOT NULL,
                active INTEGER NOT NULL DEFAULT 1,
                privileged INTEGER NOT NULL DEFAULT 0,
                closed_at TEXT
            );
            CREATE INDEX IF NOT EXISTS idx_rooms_active ON rooms(active);

            CREATE TABLE IF NOT EXISTS user_rooms (
                user_id INTEGER PRIMARY KEY,
                room_id TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_user_rooms_room ON user_rooms(room_id);

            CREATE TABLE IF NOT EXISTS premium_queue (
                user_id INTEGER PRIMARY KEY,
                pref_gender TEXT,
                pref_region TEXT,
                pref_language TEXT,
                added_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS chatlogs (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                room_id TEXT NOT NULL,
                user_id INTEGER NOT NULL,
                content_type TEXT NOT NULL DEFAULT 'text',
                text TEXT NOT NULL DEFAULT '',
                created_at TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_chatlogs_room ON chatlogs(room_id, id);

            CREATE TABLE IF NOT EXISTS reports (
                id TEXT PRIMARY KEY,
                room_id TEXT NOT NULL,
                reporter_id INTEGER NOT NULL,
                reported_id INTEGER NOT NULL,
                chat_history TEXT NOT NULL DEFAULT '[]',
                created_at TEXT NOT NULL,
                reviewed INTEGER NOT NULL DEFAULT 0
            );

            CREATE TABLE IF NOT EXISTS blocked_words (
                word TEXT PRIMARY KEY
            );",
        )
        .expect("Failed to run migrations");
    }

    // --- Users ---

    /// Upsert the sender's identity on every inbound update and mark them
    /// online. Column defaults supply every missing field, so reads are total.
    /// Username and name only overwrite when the gateway sent a value.
    pub fn touch_user(&self, who: &UserRef) {
        let conn = self.conn();
        let now = now_rfc3339();
        let username = who.username.clone().unwrap_or_default();
        let name = who.full_name();
        let language = who
            .language_code
            .as_deref()
            .and_then(Language::parse)
            .unwrap_or_default();
        conn.execute(
            "INSERT INTO users (user_id, username, name, language, is_online, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, 1, ?5, ?5)
             ON CONFLICT(user_id) DO UPDATE SET
                 username = CASE WHEN excluded.username != '' THEN excluded.username ELSE username END,
                 name = CASE WHEN excluded.name != '' THEN excluded.name ELSE name END,
                 is_online = 1,
                 updated_at = excluded.updated_at",
            params![who.id, username, name, language.as_str(), &now],
        )
        .ok();
    }

    pub fn get_user(&self, user_id: i64) -> Option<User> {
        let conn = self.conn();
        conn.query_row(
            &format!("SELECT {USER_COLUMNS} FROM users WHERE user_id = ?1"),
            params![user_id],
            row_to_user,
        )
        .ok()
    }

    /// Case-insensitive lookup; accepts the name with or without a leading `@`.
    pub fn get_user_by_username(&self, username: &str) -> Option<User> {
        let name = username.trim().trim_start_matches('@');
        if name.is_empty() {
            return None;
        }
        let conn = self.conn();
        conn.query_row(
            &format!(
                "SELECT {USER_COLUMNS} FROM users WHERE username = ?1 COLLATE NOCASE LIMIT 1"
            ),
            params![name],
            row_to_user,
        )
        .ok()
    }

    pub fn set_language(&self, user_id: i64, language: Language) {
        self.update_field(user_id, "language", language.as_str());
    }

    pub fn set_gender(&self, user_id: i64, gender: Gender) {
        self.update_field(user_id, "gender", gender.as_str());
    }

    pub fn set_region(&self, user_id: i64, region: Region) {
        self.update_field(user_id, "region", region.as_str());
    }

    pub fn set_country(&self, user_id: i64, country: &str) {
        self.update_field(user_id, "country", country);
    }

    fn update_field(&self, user_id: i64, field: &str, value: &str) {
        let conn = self.conn();
        conn.execute(
            &format!("UPDATE users SET {field} = ?1, updated_at = ?2 WHERE user_id = ?3"),
            params![value, now_rfc3339(), user_id],
        )
        .ok();
    }

    /// Save matching preferences (the user's default filters).
    pub fn set_filters(&self, user_id: i64, filters: &MatchFilters) {
        let conn = self.conn();
        conn.execute(
            "UPDATE users SET pref_gender = ?1, pref_region = ?2, pref_language = ?3,
                 updated_at = ?4 WHERE user_id = ?5",
            params![
                filters.gender.map(|g| g.as_str()),
                filters.region.map(|r| r.as_str()),
                filters.language.map(|l| l.as_str()),
                now_rfc3339(),
                user_id
            ],
        )
        .ok();
    }

    pub fn set_profile_photos(&self, user_id: i64, photos: &[String]) {
        let json = serde_json::to_string(photos).unwrap_or_else(|_| "[]".to_string());
        self.update_field(user_id, "profile_photos", &json);
    }

    pub fn grant_premium(&self, user_id: i64, expiry: &str) {
        let conn = self.conn();
        conn.execute(
            "UPDATE users SET is_premium = 1, premium_expiry = ?1, updated_at = ?2 WHERE user_id = ?3",
            params![expiry, now_rfc3339(), user_id],
        )
        .ok();
    }

    pub fn revoke_premium(&self, user_id: i64) {
        let conn = self.conn();
        conn.execute(
            "UPDATE users SET is_premium = 0, premium_expiry = NULL, updated_at = ?1 WHERE user_id = ?2",
            params![now_rfc3339(), user_id],
        )
        .ok();
    }

    pub fn set_blocked(&self, user_id: i64, blocked: bool) {
        let conn = self.conn();
        conn.execute(
            "UPDATE users SET blocked = ?1, updated_at = ?2 WHERE user_id = ?3",
            params![blocked as i64, now_rfc3339(), user_id],
        )
        .ok();
    }

    pub fn set_referred_by(&self, user_id: i64, referrer_id: i64) {
        let conn = self.conn();
        conn.execute(
            "UPDATE users SET referred_by = ?1, updated_at = ?2 WHERE user_id = ?3",
            params![referrer_id, now_rfc3339(), user_id],
        )
        .ok();
    }

    pub fn increment_referral_count(&self, user_id: i64) {
        let conn = self.conn();
        conn.execute(
            "UPDATE users SET referral_count = referral_count + 1, updated_at = ?1 WHERE user_id = ?2",
            params![now_rfc3339(), user_id],
        )
        .ok();
    }

    pub fn mark_all_users_offline(&self) {
        let conn = self.conn();
        conn.execute("UPDATE users SET is_online = 0", []).ok();
    }

    pub fn all_user_ids(&self) -> Vec<i64> {
        let conn = self.conn();
        let mut stmt = match conn.prepare("SELECT user_id FROM users ORDER BY user_id ASC") {
            Ok(s) => s,
            Err(_) => return Vec::new(),
        };
        match stmt.query_map([], |row| row.get(0)) {
            Ok(rows) => rows.filter_map(|r| r.ok()).collect(),
            Err(_) => Vec::new(),
        }
    }

    /// Online, not blocked, holding no binding: the candidate set the queue
    /// scanner considers.
    pub fn online_unbound_users(&self) -> Vec<i64> {
        let conn = self.conn();
        let mut stmt = match conn.prepare(
            "SELECT user_id FROM users
             WHERE is_online = 1 AND blocked = 0
               AND user_id NOT IN (SELECT user_id FROM user_rooms)
             ORDER BY user_id ASC",
        ) {
            Ok(s) => s,
            Err(_) => return Vec::new(),
        };
        match stmt.query_map([], |row| row.get(0)) {
            Ok(rows) => rows.filter_map(|r| r.ok()).collect(),
            Err(_) => Vec::new(),
        }
    }

    pub fn expired_premium_users(&self, now: &str) -> Vec<User> {
        let conn = self.conn();
        let mut stmt = match conn.prepare(&format!(
            "SELECT {USER_COLUMNS} FROM users
             WHERE is_premium = 1 AND premium_expiry IS NOT NULL AND premium_expiry < ?1"
        )) {
            Ok(s) => s,
            Err(_) => return Vec::new(),
        };
        match stmt.query_map(params![now], row_to_user) {
            Ok(rows) => rows.filter_map(|r| r.ok()).collect(),
            Err(_) => Vec::new(),
        }
    }

    pub fn all_users(&self) -> Vec<User> {
        let conn = self.conn();
        let mut stmt =
            match conn.prepare(&format!("SELECT {USER_COLUMNS} FROM users ORDER BY user_id ASC")) {
                Ok(s) => s,
                Err(_) => return Vec::new(),
            };
        match stmt.query_map([], row_to_user) {
            Ok(rows) => rows.filter_map(|r| r.ok()).collect(),
            Err(_) => Vec::new(),
        }
    }

    // --- Rooms and bindings ---

    /// The "seal match" critical section: insert the room and both bindings in
    /// one transaction. The unique index on `user_rooms.user_id` is the
    /// compare-and-set: if either side got bound elsewhere in the meantime,
    /// the whole transaction rolls back and `Ok(false)` is returned so the
    /// caller can release the partner.
    pub fn seal_room(
        &self,
        room_id: &str,
        a: i64,
        b: i64,
        privileged: bool,
    ) -> rusqlite::Result<bool> {
        if a == b {
            return Ok(false);
        }
        let mut conn = self.conn();
        let now = now_rfc3339();
        let tx = conn.transaction()?;
        tx.execute(
            "INSERT INTO rooms (id, user_a, user_b, created_at, active, privileged)
             VALUES (?1, ?2, ?3, ?4, 1, ?5)",
            params![room_id, a, b, &now, privileged as i64],
        )?;
        for uid in [a, b] {
            match tx.execute(
                "INSERT INTO user_rooms (user_id, room_id) VALUES (?1, ?2)",
                params![uid, room_id],
            ) {
                Ok(_) => {}
                Err(rusqlite::Error::SqliteFailure(e, _))
                    if e.code == rusqlite::ErrorCode::ConstraintViolation =>
                {
                    return Ok(false);
                }
                Err(e) => return Err(e),
            }
        }
        tx.commit()?;
        Ok(true)
    }

    pub fn get_room(&self, room_id: &str) -> Option<Room> {
        let conn = self.conn();
        conn.query_row(
            "SELECT id, user_a, user_b, created_at, active, privileged, closed_at
             FROM rooms WHERE id = ?1",
            params![room_id],
            row_to_room,
        )
        .ok()
    }

    /// Mark a room inactive and drop both bindings. The room row (and its
    /// chat log) stays for the grace period so history reads keep working.
    pub fn close_room(&self, room_id: &str) {
        let mut conn = self.conn();
        let now = now_rfc3339();
        if let Ok(tx) = conn.transaction() {
            tx.execute(
                "DELETE FROM user_rooms WHERE room_id = ?1",
                params![room_id],
            )
            .ok();
            tx.execute(
                "UPDATE rooms SET active = 0, closed_at = ?1 WHERE id = ?2",
                params![&now, room_id],
            )
            .ok();
            tx.commit().ok();
        }
    }

    /// Remove a room, its chat log and any leftover bindings.
    pub fn delete_room(&self, room_id: &str) {
        let conn = self.conn();
        conn.execute(
            "DELETE FROM user_rooms WHERE room_id = ?1",
            params![room_id],
        )
        .ok();
        conn.execute("DELETE FROM chatlogs WHERE room_id = ?1", params![room_id])
            .ok();
        conn.execute("DELETE FROM rooms WHERE id = ?1", params![room_id])
            .ok();
    }

    pub fn get_binding(&self, user_id: i64) -> Option<String> {
        let conn = self.conn();
        conn.query_row(
            "SELECT room_id FROM user_rooms WHERE user_id = ?1",
            params![user_id],
            |r| r.get(0),
        )
        .ok()
    }

    pub fn delete_binding(&self, user_id: i64) -> bool {
        let conn = self.conn();
        conn.execute("DELETE FROM user_rooms WHERE user_id = ?1", params![user_id])
            .map(|n| n > 0)
            .unwrap_or(false)
    }

    pub fn bindings_for_room(&self, room_id: &str) -> Vec<i64> {
        let conn = self.conn();
        let mut stmt = match conn
            .prepare("SELECT user_id FROM user_rooms WHERE room_id = ?1 ORDER BY user_id ASC")
        {
            Ok(s) => s,
            Err(_) => return Vec::new(),
        };
        match stmt.query_map(params![room_id], |row| row.get(0)) {
            Ok(rows) => rows.filter_map(|r| r.ok()).collect(),
            Err(_) => Vec::new(),
        }
    }

    /// Delete bindings whose room is missing or inactive. Runs at startup and
    /// from the reconciliation sweeper.
    pub fn cleanup_stale_rooms(&self) -> usize {
        let conn = self.conn();
        conn.execute(
            "DELETE FROM user_rooms WHERE room_id NOT IN (SELECT id FROM rooms WHERE active = 1)",
            [],
        )
        .unwrap_or(0)
    }

    pub fn inactive_rooms_closed_before(&self, cutoff: &str) -> Vec<String> {
        let conn = self.conn();
        let mut stmt = match conn.prepare(
            "SELECT id FROM rooms WHERE active = 0 AND closed_at IS NOT NULL AND closed_at < ?1",
        ) {
            Ok(s) => s,
            Err(_) => return Vec::new(),
        };
        match stmt.query_map(params![cutoff], |row| row.get(0)) {
            Ok(rows) => rows.filter_map(|r| r.ok()).collect(),
            Err(_) => Vec::new(),
        }
    }

    pub fn all_rooms(&self) -> Vec<Room> {
        let conn = self.conn();
        let mut stmt = match conn.prepare(
            "SELECT id, user_a, user_b, created_at, active, privileged, closed_at
             FROM rooms ORDER BY created_at ASC",
        ) {
            Ok(s) => s,
            Err(_) => return Vec::new(),
        };
        match stmt.query_map([], row_to_room) {
            Ok(rows) => rows.filter_map(|r| r.ok()).collect(),
            Err(_) => Vec::new(),
        }
    }

    // --- Premium queue ---

    pub fn queue_upsert(&self, user_id: i64, filters: &MatchFilters) {
        let conn = self.conn();
        conn.execute(
            "INSERT INTO premium_queue (user_id, pref_gender, pref_region, pref_language, added_at)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT(user_id) DO UPDATE SET
                 pref_gender = excluded.pref_gender,
                 pref_region = excluded.pref_region,
                 pref_language = excluded.pref_language",
            params![
                user_id,
                filters.gender.map(|g| g.as_str()),
                filters.region.map(|r| r.as_str()),
                filters.language.map(|l| l.as_str()),
                now_rfc3339()
            ],
        )
        .ok();
    }

    pub fn queue_remove(&self, user_id: i64) -> bool {
        let conn = self.conn();
        conn.execute(
            "DELETE FROM premium_queue WHERE user_id = ?1",
            params![user_id],
        )
        .map(|n| n > 0)
        .unwrap_or(false)
    }

    /// Remove and return the entry's filter snapshot, if the user was queued.
    pub fn queue_take(&self, user_id: i64) -> Option<MatchFilters> {
        let filters = {
            let conn = self.conn();
            conn.query_row(
                "SELECT pref_gender, pref_region, pref_language FROM premium_queue WHERE user_id = ?1",
                params![user_id],
                |row| {
                    let g: Option<String> = row.get(0)?;
                    let r: Option<String> = row.get(1)?;
                    let l: Option<String> = row.get(2)?;
                    Ok(MatchFilters {
                        gender: g.as_deref().and_then(Gender::parse),
                        region: r.as_deref().and_then(Region::parse),
                        language: l.as_deref().and_then(Language::parse),
                    })
                },
            )
            .ok()
        }?;
        self.queue_remove(user_id);
        Some(filters)
    }

    pub fn queue_contains(&self, user_id: i64) -> bool {
        let conn = self.conn();
        conn.query_row(
            "SELECT 1 FROM premium_queue WHERE user_id = ?1",
            params![user_id],
            |_| Ok(()),
        )
        .is_ok()
    }

    /// All entries in natural order. Scans iterate this without reshuffling so
    /// older entries are seen first.
    pub fn queue_entries(&self) -> Vec<QueueEntry> {
        let conn = self.conn();
        let mut stmt = match conn.prepare(
            "SELECT user_id, pref_gender, pref_region, pref_language, added_at
             FROM premium_queue ORDER BY added_at ASC, user_id ASC",
        ) {
            Ok(s) => s,
            Err(_) => return Vec::new(),
        };
        match stmt.query_map([], |row| {
            let g: Option<String> = row.get(1)?;
            let r: Option<String> = row.get(2)?;
            let l: Option<String> = row.get(3)?;
            Ok(QueueEntry {
                user_id: row.get(0)?,
                filters: MatchFilters {
                    gender: g.as_deref().and_then(Gender::parse),
                    region: r.as_deref().and_then(Region::parse),
                    language: l.as_deref().and_then(Language::parse),
                },
                added_at: row.get(4)?,
            })
        }) {
            Ok(rows) => rows.filter_map(|r| r.ok()).collect(),
            Err(_) => Vec::new(),
        }
    }

    /// First queued user whose saved filters are satisfied by the candidate.
    pub fn scan_queue_for_match(&self, candidate: &User) -> Option<i64> {
        for entry in self.queue_entries() {
            if entry.user_id == candidate.user_id {
                continue;
            }
            if !entry.filters.satisfied_by(candidate) {
                continue;
            }
            match self.get_user(entry.user_id) {
                Some(u) if !u.blocked => return Some(entry.user_id),
                _ => continue,
            }
        }
        None
    }

    // --- Chat log ---

    pub fn log_chat(&self, room_id: &str, user_id: i64, kind: ContentKind, text: &str) {
        let conn = self.conn();
        conn.execute(
            "INSERT INTO chatlogs (room_id, user_id, content_type, text, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![room_id, user_id, kind.as_str(), text, now_rfc3339()],
        )
        .ok();
    }

    pub fn get_chat_history(&self, room_id: &str) -> Vec<ChatLogEntry> {
        let conn = self.conn();
        let mut stmt = match conn.prepare(
            "SELECT room_id, user_id, content_type, text, created_at
             FROM chatlogs WHERE room_id = ?1 ORDER BY id ASC",
        ) {
            Ok(s) => s,
            Err(_) => return Vec::new(),
        };
        match stmt.query_map(params![room_id], |row| {
            Ok(ChatLogEntry {
                room_id: row.get(0)?,
                user_id: row.get(1)?,
                content_type: row.get(2)?,
                text: row.get(3)?,
                created_at: row.get(4)?,
            })
        }) {
            Ok(rows) => rows.filter_map(|r| r.ok()).collect(),
            Err(_) => Vec::new(),
        }
    }

    // --- Reports ---

    pub fn insert_report(&self, report: &Report) {
        let history =
            serde_json::to_string(&report.chat_history).unwrap_or_else(|_| "[]".to_string());
        let conn = self.conn();
        conn.execute(
            "INSERT INTO reports (id, room_id, reporter_id, reported_id, chat_history, created_at, reviewed)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                report.id,
                report.room_id,
                report.reporter_id,
                report.reported_id,
                history,
                report.created_at,
                report.reviewed as i64
            ],
        )
        .ok();
    }

    pub fn all_reports(&self) -> Vec<Report> {
        let conn = self.conn();
        let mut stmt = match conn.prepare(
            "SELECT id, room_id, reporter_id, reported_id, chat_history, created_at, reviewed
             FROM reports ORDER BY created_at ASC",
        ) {
            Ok(s) => s,
            Err(_) => return Vec::new(),
        };
        match stmt.query_map([], |row| {
            let history: String = row.get(4)?;
            Ok(Report {
                id: row.get(0)?,
                room_id: row.get(1)?,
                reporter_id: row.get(2)?,
                reported_id: row.get(3)?,
                chat_history: serde_json::from_str(&history).unwrap_or_default(),
                created_at: row.get(5)?,
                reviewed: row.get::<_, i64>(6)? != 0,
            })
        }) {
            Ok(rows) => rows.filter_map(|r| r.ok()).collect(),
            Err(_) => Vec::new(),
        }
    }

    // --- Blocked words ---

    /// Words are stored case-folded. Returns false if the word was already
    /// present.
    pub fn add_blocked_word(&self, word: &str) -> bool {
        let conn = self.conn();
        conn.execute(
            "INSERT OR IGNORE INTO blocked_words (word) VALUES (?1)",
            params![word.trim().to_lowercase()],
        )
        .map(|n| n > 0)
        .unwrap_or(false)
    }

    pub fn remove_blocked_word(&self, word: &str) -> bool {
        let conn = self.conn();
        conn.execute(
            "DELETE FROM blocked_words WHERE word = ?1",
            params![word.trim().to_lowercase()],
        )
        .map(|n| n > 0)
        .unwrap_or(false)
    }

    pub fn blocked_words(&self) -> Vec<String> {
        let conn = self.conn();
        let mut stmt = match conn.prepare("SELECT word FROM blocked_words ORDER BY word ASC") {
            Ok(s) => s,
            Err(_) => return Vec::new(),
        };
        match stmt.query_map([], |row| row.get(0)) {
            Ok(rows) => rows.filter_map(|r| r.ok()).collect(),
            Err(_) => Vec::new(),
        }
    }
}
