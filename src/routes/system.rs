use super::AdminKey;
use crate::Services;
use crate::lifecycle;
use rocket::http::Status;
use rocket::serde::json::Json;
use rocket::{State, get, post};
use std::sync::Arc;

#[get("/api/v1/health")]
pub fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "service": "anon-pair-chat",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

#[get("/api/v1/stats")]
pub fn stats(svc: &State<Arc<Services>>) -> Json<serde_json::Value> {
    let conn = svc.db.conn();
    let count = |sql: &str| -> i64 { conn.query_row(sql, [], |r| r.get(0)).unwrap_or(0) };

    Json(serde_json::json!({
        "users": count("SELECT COUNT(*) FROM users"),
        "premium_users": count("SELECT COUNT(*) FROM users WHERE is_premium = 1"),
        "blocked_users": count("SELECT COUNT(*) FROM users WHERE blocked = 1"),
        "online_users": count("SELECT COUNT(*) FROM users WHERE is_online = 1"),
        "rooms": count("SELECT COUNT(*) FROM rooms"),
        "active_rooms": count("SELECT COUNT(*) FROM rooms WHERE active = 1"),
        "pool_waiting": svc.pool.len(),
        "queue_waiting": count("SELECT COUNT(*) FROM premium_queue"),
        "chat_messages": count("SELECT COUNT(*) FROM chatlogs"),
        "reports": count("SELECT COUNT(*) FROM reports"),
        "unreviewed_reports": count("SELECT COUNT(*) FROM reports WHERE reviewed = 0"),
        "blocked_words": count("SELECT COUNT(*) FROM blocked_words"),
    }))
}

/// Run one sweep on demand. The background loops run the same bodies on
/// their own cadence; this endpoint exists for operators and tests.
#[post("/api/v1/maintenance/<task>")]
pub async fn run_maintenance(
    svc: &State<Arc<Services>>,
    key: AdminKey,
    task: &str,
) -> Result<Json<serde_json::Value>, (Status, Json<serde_json::Value>)> {
    if svc.config.admin_api_key.is_empty() || key.0 != svc.config.admin_api_key {
        return Err((
            Status::Unauthorized,
            Json(serde_json::json!({"error": "Invalid admin key"})),
        ));
    }

    let affected = match task {
        "expiry" => lifecycle::run_expiry_sweep(svc.inner()).await,
        "queue-scan" => lifecycle::run_queue_scan(svc.inner()).await,
        "reconcile" => lifecycle::run_room_reconciliation(svc.inner()).await,
        _ => {
            return Err((
                Status::NotFound,
                Json(serde_json::json!({"error": "Unknown maintenance task"})),
            ));
        }
    };

    Ok(Json(serde_json::json!({"task": task, "affected": affected})))
}
