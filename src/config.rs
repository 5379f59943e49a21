use std::env;

/// Runtime configuration. All read from environment variables with defaults.
///
/// Environment variables:
/// - `GATEWAY_API_BASE` — base URL of the gateway send API (default: `http://localhost:8081`)
/// - `GATEWAY_PUBLIC_BASE` — public bot link used in referral links
/// - `GATEWAY_SECRET` — shared secret; inbound updates must carry a matching HMAC-SHA256 signature
/// - `ADMIN_USER_ID` — the administrator identity (default: 0, no admin)
/// - `MOD_CHANNEL_ID` — moderator channel receiving mirrors (default: 0, mirroring disabled)
/// - `ADMIN_API_KEY` — key guarding the HTTP maintenance endpoints (default: empty, disabled)
pub struct Config {
    pub gateway_api_base: String,
    pub gateway_public_base: String,
    pub gateway_secret: String,
    pub admin_user_id: i64,
    pub mod_channel_id: i64,
    pub admin_api_key: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            gateway_api_base: "http://localhost:8081".to_string(),
            gateway_public_base: "https://gateway.example/anonpairchat".to_string(),
            gateway_secret: String::new(),
            admin_user_id: 0,
            mod_channel_id: 0,
            admin_api_key: String::new(),
        }
    }
}

impl Config {
    /// Create a Config from environment variables, with defaults.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(val) = env::var("GATEWAY_API_BASE")
            && !val.is_empty()
        {
            config.gateway_api_base = val;
        }
        if let Ok(val) = env::var("GATEWAY_PUBLIC_BASE")
            && !val.is_empty()
        {
            config.gateway_public_base = val;
        }
        if let Ok(val) = env::var("GATEWAY_SECRET") {
            config.gateway_secret = val;
        }
        if let Ok(val) = env::var("ADMIN_USER_ID")
            && let Ok(n) = val.parse::<i64>()
        {
            config.admin_user_id = n;
        }
        if let Ok(val) = env::var("MOD_CHANNEL_ID")
            && let Ok(n) = val.parse::<i64>()
        {
            config.mod_channel_id = n;
        }
        if let Ok(val) = env::var("ADMIN_API_KEY") {
            config.admin_api_key = val;
        }

        config
    }

    /// Referral deep link for a user: `<public base>?start=ref_<user_id>`.
    pub fn referral_link(&self, user_id: i64) -> String {
        format!("{}?start=ref_{}", self.gateway_public_base, user_id)
    }
}
