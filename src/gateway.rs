use crate::models::ContentKind;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Mutex;

/// Gateway messages are capped at 4096 characters.
pub const MAX_MESSAGE_LEN: usize = 4096;

/// Tagged send failure. `Gone` means the chat is unreachable for good (the
/// peer blocked the bot or the chat no longer exists); `Transient` covers
/// network trouble and gateway 5xx.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendError {
    Gone,
    Transient,
}

impl fmt::Display for SendError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SendError::Gone => write!(f, "chat unreachable"),
            SendError::Transient => write!(f, "transient gateway failure"),
        }
    }
}

/// One outbound message as the capture transport records it.
#[derive(Debug, Clone)]
pub struct SentMessage {
    pub chat_id: i64,
    pub kind: ContentKind,
    pub text: String,
    pub file_id: Option<String>,
}

enum Transport {
    Http {
        client: reqwest::Client,
        base: String,
    },
    /// In-memory transport for tests: records every send, can be told to
    /// fail a chat, and serves canned profile photos.
    Capture {
        sent: Mutex<Vec<SentMessage>>,
        failing: Mutex<HashSet<i64>>,
        photos: Mutex<HashMap<i64, Vec<String>>>,
    },
}

pub struct GatewayClient {
    transport: Transport,
}

impl GatewayClient {
    pub fn http(base: &str) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(5))
            .build()
            .expect("Failed to create HTTP client");
        GatewayClient {
            transport: Transport::Http {
                client,
                base: base.trim_end_matches('/').to_string(),
            },
        }
    }

    pub fn capture() -> Self {
        GatewayClient {
            transport: Transport::Capture {
                sent: Mutex::new(Vec::new()),
                failing: Mutex::new(HashSet::new()),
                photos: Mutex::new(HashMap::new()),
            },
        }
    }

    /// Send a plain text message.
    pub async fn send_text(&self, chat_id: i64, text: &str) -> Result<(), SendError> {
        let text = sanitize_text(text);
        match &self.transport {
            Transport::Http { client, base } => {
                post(
                    client,
                    base,
                    "sendMessage",
                    serde_json::json!({ "chat_id": chat_id, "text": text }),
                )
                .await
                .map(|_| ())
            }
            Transport::Capture { sent, failing, .. } => {
                if failing.lock().unwrap_or_else(|e| e.into_inner()).contains(&chat_id) {
                    return Err(SendError::Gone);
                }
                sent.lock().unwrap_or_else(|e| e.into_inner()).push(SentMessage {
                    chat_id,
                    kind: ContentKind::Text,
                    text,
                    file_id: None,
                });
                Ok(())
            }
        }
    }

    /// Pass a media handle through to another chat, no re-upload.
    pub async fn copy_media(
        &self,
        chat_id: i64,
        kind: ContentKind,
        file_id: &str,
        caption: Option<&str>,
    ) -> Result<(), SendError> {
        let caption = caption.map(sanitize_text);
        match &self.transport {
            Transport::Http { client, base } => {
                let (method, field) = media_endpoint(kind);
                let mut body = serde_json::json!({ "chat_id": chat_id, field: file_id });
                if let Some(c) = &caption {
                    body["caption"] = serde_json::Value::String(c.clone());
                }
                post(client, base, method, body).await.map(|_| ())
            }
            Transport::Capture { sent, failing, .. } => {
                if failing.lock().unwrap_or_else(|e| e.into_inner()).contains(&chat_id) {
                    return Err(SendError::Gone);
                }
                sent.lock().unwrap_or_else(|e| e.into_inner()).push(SentMessage {
                    chat_id,
                    kind,
                    text: caption.unwrap_or_default(),
                    file_id: Some(file_id.to_string()),
                });
                Ok(())
            }
        }
    }

    /// Send and swallow failures. Returns whether the send succeeded.
    pub async fn safe_send_text(&self, chat_id: i64, text: &str) -> bool {
        match self.send_text(chat_id, text).await {
            Ok(()) => true,
            Err(e) => {
                eprintln!("⚠️ Could not send message to chat {chat_id}: {e}");
                false
            }
        }
    }

    /// Up to `limit` profile photo handles for a user. Failures degrade to an
    /// empty list.
    pub async fn fetch_profile_photos(&self, user_id: i64, limit: usize) -> Vec<String> {
        match &self.transport {
            Transport::Http { client, base } => {
                let body = serde_json::json!({ "user_id": user_id, "limit": limit });
                match post(client, base, "getUserProfilePhotos", body).await {
                    Ok(value) => value
                        .get("photos")
                        .and_then(|p| p.as_array())
                        .map(|photos| {
                            photos
                                .iter()
                                .filter_map(|p| p.get("file_id"))
                                .filter_map(|f| f.as_str())
                                .take(limit)
                                .map(String::from)
                                .collect()
                        })
                        .unwrap_or_default(),
                    Err(e) => {
                        eprintln!("⚠️ Could not fetch profile photos for {user_id}: {e}");
                        Vec::new()
                    }
                }
            }
            Transport::Capture { photos, .. } => photos
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .get(&user_id)
                .map(|p| p.iter().take(limit).cloned().collect())
                .unwrap_or_default(),
        }
    }

    // --- Capture-transport hooks (no-ops over HTTP) ---

    pub fn sent(&self) -> Vec<SentMessage> {
        match &self.transport {
            Transport::Capture { sent, .. } => {
                sent.lock().unwrap_or_else(|e| e.into_inner()).clone()
            }
            Transport::Http { .. } => Vec::new(),
        }
    }

    pub fn sent_to(&self, chat_id: i64) -> Vec<SentMessage> {
        self.sent()
            .into_iter()
            .filter(|m| m.chat_id == chat_id)
            .collect()
    }

    pub fn clear_sent(&self) {
        if let Transport::Capture { sent, .. } = &self.transport {
            sent.lock().unwrap_or_else(|e| e.into_inner()).clear();
        }
    }

    pub fn fail_chat(&self, chat_id: i64) {
        if let Transport::Capture { failing, .. } = &self.transport {
            failing
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .insert(chat_id);
        }
    }

    pub fn heal_chat(&self, chat_id: i64) {
        if let Transport::Capture { failing, .. } = &self.transport {
            failing
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .remove(&chat_id);
        }
    }

    pub fn set_profile_photos(&self, user_id: i64, handles: Vec<String>) {
        if let Transport::Capture { photos, .. } = &self.transport {
            photos
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .insert(user_id, handles);
        }
    }
}

fn media_endpoint(kind: ContentKind) -> (&'static str, &'static str) {
    match kind {
        ContentKind::Text => ("sendMessage", "text"),
        ContentKind::Photo => ("sendPhoto", "photo"),
        ContentKind::Video => ("sendVideo", "video"),
        ContentKind::VideoNote => ("sendVideoNote", "video_note"),
        ContentKind::Audio => ("sendAudio", "audio"),
        ContentKind::Voice => ("sendVoice", "voice"),
        ContentKind::Document => ("sendDocument", "document"),
        ContentKind::Sticker => ("sendSticker", "sticker"),
    }
}

async fn post(
    client: &reqwest::Client,
    base: &str,
    method: &str,
    body: serde_json::Value,
) -> Result<serde_json::Value, SendError> {
    let url = format!("{base}/{method}");
    match client.post(&url).json(&body).send().await {
        Ok(resp) if resp.status().is_success() => {
            Ok(resp.json().await.unwrap_or(serde_json::Value::Null))
        }
        Ok(resp)
            if resp.status() == reqwest::StatusCode::FORBIDDEN
                || resp.status() == reqwest::StatusCode::BAD_REQUEST =>
        {
            Err(SendError::Gone)
        }
        Ok(resp) => {
            eprintln!("⚠️ Gateway {method} failed: HTTP {}", resp.status());
            Err(SendError::Transient)
        }
        Err(e) => {
            eprintln!("⚠️ Gateway {method} error: {e}");
            Err(SendError::Transient)
        }
    }
}

/// Strip NULs and truncate to the gateway message limit.
pub fn sanitize_text(text: &str) -> String {
    let cleaned: String = text.chars().filter(|&c| c != '\0').collect();
    if cleaned.chars().count() > MAX_MESSAGE_LEN {
        let truncated: String = cleaned.chars().take(MAX_MESSAGE_LEN - 3).collect();
        format!("{truncated}...")
    } else {
        cleaned
    }
}
