// HTTP surface: gateway update ingestion and the ops endpoints.
// Shared request guards and catchers live here; route functions in submodules.

mod gateway;
mod system;

pub use gateway::gateway_update;
pub use system::{health, run_maintenance, stats};

use rocket::catch;
use rocket::http::Status;
use rocket::request::{FromRequest, Outcome, Request};
use rocket::serde::json::Json;

/// Bearer or `X-Admin-Key` header, for the maintenance endpoints.
pub struct AdminKey(pub String);

#[rocket::async_trait]
impl<'r> FromRequest<'r> for AdminKey {
    type Error = ();

    async fn from_request(req: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        if let Some(auth) = req.headers().get_one("Authorization")
            && let Some(key) = auth.strip_prefix("Bearer ")
        {
            return Outcome::Success(AdminKey(key.to_string()));
        }
        if let Some(key) = req.headers().get_one("X-Admin-Key") {
            return Outcome::Success(AdminKey(key.to_string()));
        }
        Outcome::Forward(Status::Unauthorized)
    }
}

/// Hex HMAC-SHA256 of the request body, from the `X-Gateway-Signature`
/// header (an optional `sha256=` prefix is accepted).
pub struct GatewaySignature(pub String);

#[rocket::async_trait]
impl<'r> FromRequest<'r> for GatewaySignature {
    type Error = ();

    async fn from_request(req: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        match req.headers().get_one("X-Gateway-Signature") {
            Some(sig) => {
                let sig = sig.strip_prefix("sha256=").unwrap_or(sig);
                Outcome::Success(GatewaySignature(sig.to_string()))
            }
            None => Outcome::Error((Status::Unauthorized, ())),
        }
    }
}

#[catch(404)]
pub fn not_found() -> Json<serde_json::Value> {
    Json(serde_json::json!({"error": "Not found"}))
}

#[catch(401)]
pub fn unauthorized() -> Json<serde_json::Value> {
    Json(serde_json::json!({"error": "Unauthorized"}))
}
