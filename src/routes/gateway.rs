use super::GatewaySignature;
use crate::Services;
use crate::commands;
use crate::models::Update;
use hmac::{Hmac, Mac};
use rocket::State;
use rocket::http::Status;
use rocket::post;
use rocket::serde::json::Json;
use sha2::Sha256;
use std::sync::Arc;

type HmacSha256 = Hmac<Sha256>;

/// Verify the gateway's HMAC-SHA256 signature over the raw body.
fn signature_valid(secret: &str, body: &[u8], signature_hex: &str) -> bool {
    let Ok(signature) = hex::decode(signature_hex) else {
        return false;
    };
    let Ok(mut mac) = HmacSha256::new_from_slice(secret.as_bytes()) else {
        return false;
    };
    mac.update(body);
    mac.verify_slice(&signature).is_ok()
}

/// Webhook ingestion: the gateway pushes signed updates here.
#[post("/api/v1/gateway/update", format = "json", data = "<body>")]
pub async fn gateway_update(
    svc: &State<Arc<Services>>,
    signature: GatewaySignature,
    body: String,
) -> Result<Json<serde_json::Value>, (Status, Json<serde_json::Value>)> {
    if svc.config.gateway_secret.is_empty()
        || !signature_valid(&svc.config.gateway_secret, body.as_bytes(), &signature.0)
    {
        return Err((
            Status::Unauthorized,
            Json(serde_json::json!({"error": "Invalid gateway signature"})),
        ));
    }

    let update: Update = serde_json::from_str(&body).map_err(|e| {
        (
            Status::BadRequest,
            Json(serde_json::json!({"error": format!("Malformed update: {e}")})),
        )
    })?;

    commands::handle_update(svc.inner(), &update).await;
    Ok(Json(serde_json::json!({"ok": true})))
}
