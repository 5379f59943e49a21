use serde::{Deserialize, Serialize};

// --- Profile attributes ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
        }
    }

    pub fn parse(s: &str) -> Option<Gender> {
        match s.trim().to_lowercase().as_str() {
            "male" => Some(Gender::Male),
            "female" => Some(Gender::Female),
            _ => None,
        }
    }
}

/// The seven continental buckets a profile can claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Region {
    Africa,
    Europe,
    Asia,
    #[serde(rename = "North America")]
    NorthAmerica,
    #[serde(rename = "South America")]
    SouthAmerica,
    Oceania,
    Antarctica,
}

impl Region {
    pub const ALL: [Region; 7] = [
        Region::Africa,
        Region::Europe,
        Region::Asia,
        Region::NorthAmerica,
        Region::SouthAmerica,
        Region::Oceania,
        Region::Antarctica,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Region::Africa => "Africa",
            Region::Europe => "Europe",
            Region::Asia => "Asia",
            Region::NorthAmerica => "North America",
            Region::SouthAmerica => "South America",
            Region::Oceania => "Oceania",
            Region::Antarctica => "Antarctica",
        }
    }

    pub fn parse(s: &str) -> Option<Region> {
        let wanted = s.trim().to_lowercase();
        Region::ALL
            .into_iter()
            .find(|r| r.as_str().to_lowercase() == wanted)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Ar,
    Hi,
    Id,
}

impl Language {
    pub const ALL: [Language; 4] = [Language::En, Language::Ar, Language::Hi, Language::Id];

    pub fn as_str(&self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Ar => "ar",
            Language::Hi => "hi",
            Language::Id => "id",
        }
    }

    pub fn parse(s: &str) -> Option<Language> {
        match s.trim().to_lowercase().as_str() {
            "en" => Some(Language::En),
            "ar" => Some(Language::Ar),
            "hi" => Some(Language::Hi),
            "id" => Some(Language::Id),
            _ => None,
        }
    }
}

// --- Matching filters ---

/// Optional per-attribute constraints. An absent key means "any".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchFilters {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<Gender>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<Region>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<Language>,
}

impl MatchFilters {
    pub fn is_empty(&self) -> bool {
        self.gender.is_none() && self.region.is_none() && self.language.is_none()
    }

    /// A candidate matches iff every non-empty filter key equals the
    /// candidate's attribute.
    pub fn satisfied_by(&self, user: &User) -> bool {
        if let Some(g) = self.gender
            && user.gender != Some(g)
        {
            return false;
        }
        if let Some(r) = self.region
            && user.region != Some(r)
        {
            return false;
        }
        if let Some(l) = self.language
            && user.language != l
        {
            return false;
        }
        true
    }

    pub fn describe(&self) -> String {
        let mut parts = Vec::new();
        if let Some(g) = self.gender {
            parts.push(format!("gender={}", g.as_str()));
        }
        if let Some(r) = self.region {
            parts.push(format!("region={}", r.as_str()));
        }
        if let Some(l) = self.language {
            parts.push(format!("language={}", l.as_str()));
        }
        if parts.is_empty() {
            "any".to_string()
        } else {
            parts.join(", ")
        }
    }
}

// --- Persistent entities ---

#[derive(Debug, Clone, Serialize)]
pub struct User {
    pub user_id: i64,
    pub username: String,
    pub name: String,
    pub language: Language,
    pub gender: Option<Gender>,
    pub region: Option<Region>,
    pub country: String,
    pub filters: MatchFilters,
    pub is_premium: bool,
    pub premium_expiry: Option<String>,
    pub blocked: bool,
    pub is_online: bool,
    pub referral_count: i64,
    pub referred_by: Option<i64>,
    pub profile_photos: Vec<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl User {
    /// Matchmaking requires gender, region and country to be set.
    pub fn profile_complete(&self) -> bool {
        self.gender.is_some() && self.region.is_some() && !self.country.is_empty()
    }

    pub fn display_name(&self) -> String {
        if !self.username.is_empty() {
            format!("@{}", self.username)
        } else if !self.name.is_empty() {
            self.name.clone()
        } else {
            format!("User {}", self.user_id)
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Room {
    pub room_id: String,
    pub users: [i64; 2],
    pub created_at: String,
    pub active: bool,
    pub privileged: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub closed_at: Option<String>,
}

impl Room {
    pub fn contains(&self, user_id: i64) -> bool {
        self.users[0] == user_id || self.users[1] == user_id
    }

    pub fn partner_of(&self, user_id: i64) -> Option<i64> {
        if self.users[0] == user_id {
            Some(self.users[1])
        } else if self.users[1] == user_id {
            Some(self.users[0])
        } else {
            None
        }
    }
}

#[derive(Debug, Clone)]
pub struct QueueEntry {
    pub user_id: i64,
    pub filters: MatchFilters,
    pub added_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatLogEntry {
    pub room_id: String,
    pub user_id: i64,
    pub content_type: String,
    pub text: String,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub id: String,
    pub room_id: String,
    pub reporter_id: i64,
    pub reported_id: i64,
    pub chat_history: Vec<ChatLogEntry>,
    pub created_at: String,
    pub reviewed: bool,
}

// --- Gateway update model ---

/// Content types the relay forwards. Media moves as opaque gateway handles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentKind {
    Text,
    Photo,
    Video,
    VideoNote,
    Audio,
    Voice,
    Document,
    Sticker,
}

impl ContentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentKind::Text => "text",
            ContentKind::Photo => "photo",
            ContentKind::Video => "video",
            ContentKind::VideoNote => "video_note",
            ContentKind::Audio => "audio",
            ContentKind::Voice => "voice",
            ContentKind::Document => "document",
            ContentKind::Sticker => "sticker",
        }
    }

    /// Bracketed label used in moderator mirrors, e.g. `[Photo message]`.
    pub fn label(&self) -> &'static str {
        match self {
            ContentKind::Text => "[Text message]",
            ContentKind::Photo => "[Photo message]",
            ContentKind::Video => "[Video message]",
            ContentKind::VideoNote => "[Video Note (round video)]",
            ContentKind::Audio => "[Audio message]",
            ContentKind::Voice => "[Voice message]",
            ContentKind::Document => "[Document message]",
            ContentKind::Sticker => "[Sticker]",
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct UserRef {
    pub id: i64,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub language_code: Option<String>,
}

impl UserRef {
    pub fn full_name(&self) -> String {
        match (&self.first_name, &self.last_name) {
            (Some(f), Some(l)) => format!("{f} {l}"),
            (Some(f), None) => f.clone(),
            (None, Some(l)) => l.clone(),
            (None, None) => String::new(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Media {
    pub kind: ContentKind,
    pub file_id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReplyRef {
    #[serde(default)]
    pub from_id: Option<i64>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub caption: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct InboundMessage {
    pub message_id: i64,
    pub from: UserRef,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub caption: Option<String>,
    #[serde(default)]
    pub media: Option<Media>,
    #[serde(default)]
    pub reply_to: Option<Box<ReplyRef>>,
}

impl InboundMessage {
    /// Text or caption, whichever carries the words.
    pub fn body_text(&self) -> &str {
        self.text
            .as_deref()
            .or(self.caption.as_deref())
            .unwrap_or("")
    }

    pub fn content_kind(&self) -> ContentKind {
        self.media
            .as_ref()
            .map(|m| m.kind)
            .unwrap_or(ContentKind::Text)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Update {
    pub update_id: i64,
    #[serde(default)]
    pub message: Option<InboundMessage>,
}

// --- Component outcomes ---

/// Result of a matchmaking attempt. The command layer turns these into
/// user-visible status lines; match notifications themselves are sent while
/// sealing, before the matchmaker returns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FindOutcome {
    Matched { room_id: String, partner: i64 },
    Searching,
    Queued,
    AlreadyInRoom,
    AlreadySearching,
    ProfileIncomplete,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EndOutcome {
    LeftRoom { partner: Option<i64> },
    SearchCancelled,
    NotInRoom,
}
