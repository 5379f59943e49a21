use super::Command;
use crate::Services;
use crate::db;
use crate::flows::Flow;
use crate::matchmaker;
use crate::models::{
    EndOutcome, FindOutcome, Gender, InboundMessage, Language, Region, Report, User,
};
use crate::rooms;
use crate::texts::t;

/// How many profile photos `/start` captures from the gateway.
pub const PROFILE_PHOTO_LIMIT: usize = 10;

fn lang_of(svc: &Services, user_id: i64) -> Language {
    svc.db
        .get_user(user_id)
        .map(|u| u.language)
        .unwrap_or_default()
}

/// `/start [ref_<id>]`: referral processing, profile-photo capture, then the
/// language choice.
pub async fn start(svc: &Services, msg: &InboundMessage, cmd: &Command) {
    let user_id = msg.from.id;
    if let Some(payload) = cmd.arg(0) {
        process_referral(svc, user_id, payload).await;
    }

    let photos = svc
        .gateway
        .fetch_profile_photos(user_id, PROFILE_PHOTO_LIMIT)
        .await;
    if !photos.is_empty() {
        svc.db.set_profile_photos(user_id, &photos);
    }

    let lang = lang_of(svc, user_id);
    let text = format!("🎉 {}\n\n🌍 {}", t(lang, "welcome"), t(lang, "choose_language"));
    let _ = svc.gateway.safe_send_text(user_id, &text).await;
    svc.flows.set(user_id, Flow::ChooseLanguage);
}

/// `ref_<n>` start payload: mark the newcomer as referred (once) and credit
/// the referrer one premium day, extending from the later of now and their
/// current expiry.
async fn process_referral(svc: &Services, new_user_id: i64, payload: &str) {
    let Some(raw) = payload.strip_prefix("ref_") else {
        return;
    };
    let Ok(referrer_id) = raw.parse::<i64>() else {
        return;
    };
    if referrer_id == new_user_id {
        return;
    }
    if let Some(me) = svc.db.get_user(new_user_id)
        && me.referred_by.is_some()
    {
        return;
    }
    let Some(referrer) = svc.db.get_user(referrer_id) else {
        return;
    };

    svc.db.set_referred_by(new_user_id, referrer_id);

    let now = chrono::Utc::now();
    let base = referrer
        .premium_expiry
        .as_deref()
        .and_then(|s| chrono::DateTime::parse_from_rfc3339(s).ok())
        .map(|d| d.with_timezone(&chrono::Utc))
        .filter(|d| *d > now)
        .unwrap_or(now);
    let new_expiry = (base + chrono::Duration::days(1)).to_rfc3339();
    svc.db.grant_premium(referrer_id, &new_expiry);
    svc.db.increment_referral_count(referrer_id);

    let text = format!("🎉 {}", t(referrer.language, "referral_reward"));
    svc.gateway.safe_send_text(referrer_id, &text).await;
}

pub async fn find(svc: &Services, user_id: i64) {
    let lang = lang_of(svc, user_id);
    match matchmaker::find(svc, user_id, None).await {
        // Both sides were already notified while sealing.
        FindOutcome::Matched { .. } => {}
        FindOutcome::Searching => {
            let text = format!("🔍 {}", t(lang, "searching_partner"));
            let _ = svc.gateway.safe_send_text(user_id, &text).await;
        }
        FindOutcome::Queued => {
            let text = format!("⏳ {}", t(lang, "queue_waiting"));
            let _ = svc.gateway.safe_send_text(user_id, &text).await;
        }
        FindOutcome::AlreadyInRoom => {
            let _ = svc
                .gateway
                .safe_send_text(user_id, t(lang, "already_in_room"))
                .await;
        }
        FindOutcome::AlreadySearching => {
            let text = format!("⏳ {}", t(lang, "already_searching"));
            let _ = svc.gateway.safe_send_text(user_id, &text).await;
        }
        FindOutcome::ProfileIncomplete => {
            let text = format!(
                "📝 {}\n\n👤 {}",
                t(lang, "profile_setup_required"),
                t(lang, "ask_gender")
            );
            let _ = svc.gateway.safe_send_text(user_id, &text).await;
            svc.flows.set(user_id, Flow::AskGender);
        }
    }
}

pub async fn end(svc: &Services, user_id: i64) {
    let lang = lang_of(svc, user_id);
    match rooms::end_room(svc, user_id).await {
        EndOutcome::LeftRoom { partner } => {
            let text = format!("👋 {}", t(lang, "end_chat"));
            let _ = svc.gateway.safe_send_text(user_id, &text).await;
            if let Some(partner_id) = partner {
                let partner_lang = lang_of(svc, partner_id);
                let text = format!("💔 {}", t(partner_lang, "partner_left"));
                svc.gateway.safe_send_text(partner_id, &text).await;
            }
        }
        EndOutcome::SearchCancelled => {
            let text = format!("❌ {}", t(lang, "search_stopped"));
            let _ = svc.gateway.safe_send_text(user_id, &text).await;
        }
        EndOutcome::NotInRoom => {
            let _ = svc
                .gateway
                .safe_send_text(user_id, t(lang, "not_in_room"))
                .await;
        }
    }
}

/// `/next`: leave quietly when idle, then search again.
pub async fn next(svc: &Services, user_id: i64) {
    let lang = lang_of(svc, user_id);
    if let EndOutcome::LeftRoom { partner } = rooms::end_room(svc, user_id).await {
        let text = format!("👋 {}", t(lang, "end_chat"));
        let _ = svc.gateway.safe_send_text(user_id, &text).await;
        if let Some(partner_id) = partner {
            let partner_lang = lang_of(svc, partner_id);
            let text = format!("💔 {}", t(partner_lang, "partner_left"));
            svc.gateway.safe_send_text(partner_id, &text).await;
        }
    }
    find(svc, user_id).await;
}

fn report_profile(u: Option<&User>, label: &str) -> String {
    match u {
        Some(u) => format!(
            "{label}\nID: {}\nUsername: {}\nLanguage: {}\nGender: {}\nRegion: {}\nPremium: {}",
            u.user_id,
            if u.username.is_empty() {
                "No username".to_string()
            } else {
                format!("@{}", u.username)
            },
            u.language.as_str(),
            u.gender.map(|g| g.as_str()).unwrap_or(""),
            u.region.map(|r| r.as_str()).unwrap_or(""),
            u.is_premium,
        ),
        None => format!("{label}\n(unknown user)"),
    }
}

/// `/report [as reply]`: record a report with the full chat history snapshot
/// and mirror it to the moderator channel.
pub async fn report(svc: &Services, msg: &InboundMessage) {
    let user_id = msg.from.id;
    let lang = lang_of(svc, user_id);

    let Some(room_id) = svc.db.get_binding(user_id) else {
        let _ = svc
            .gateway
            .safe_send_text(user_id, t(lang, "report_no_room"))
            .await;
        return;
    };
    let Some(partner_id) = rooms::get_partner(svc, user_id) else {
        let _ = svc
            .gateway
            .safe_send_text(user_id, t(lang, "chat_error"))
            .await;
        return;
    };

    let history = svc.db.get_chat_history(&room_id);
    let report = Report {
        id: db::generate_report_id(),
        room_id: room_id.clone(),
        reporter_id: user_id,
        reported_id: partner_id,
        chat_history: history.clone(),
        created_at: chrono::Utc::now().to_rfc3339(),
        reviewed: false,
    };
    svc.db.insert_report(&report);

    if svc.config.mod_channel_id != 0 {
        let reporter = svc.db.get_user(user_id);
        let reported = svc.db.get_user(partner_id);

        let reported_detail = match &msg.reply_to {
            Some(r) => {
                let quoted = r
                    .text
                    .as_deref()
                    .or(r.caption.as_deref())
                    .unwrap_or("(Message type not supported for reporting.)");
                let author = r
                    .from_id
                    .map(|id| id.to_string())
                    .unwrap_or_else(|| "Unknown".to_string());
                format!(
                    "📝 Reported Message (by user {author}):\n━━━━━━━━━━━━━━━━\n{quoted}\n━━━━━━━━━━━━━━━━\n"
                )
            }
            None => "ℹ️ No specific message was reported.\n(User used /report without replying to a message)\n"
                .to_string(),
        };

        let text = format!(
            "🚨 REPORT RECEIVED 🚨\n━━━━━━━━━━━━━━━━\n\n📍 Room: {}\n\n{}\n{}\n\n{}\n\n💬 Total messages in room: {}\n⏰ Report time: {}",
            room_id,
            reported_detail,
            report_profile(reporter.as_ref(), "👤 Reporter:"),
            report_profile(reported.as_ref(), "👤 Reported:"),
            history.len(),
            report.created_at,
        );
        svc.gateway
            .safe_send_text(svc.config.mod_channel_id, &text)
            .await;
    }

    let text = format!("✅ {}", t(lang, "report_sent"));
    let _ = svc.gateway.safe_send_text(user_id, &text).await;
}

/// `/upgrade`: refused while in a room; otherwise the next message is
/// treated as payment proof.
pub async fn upgrade(svc: &Services, user_id: i64) {
    let lang = lang_of(svc, user_id);
    if svc.db.get_binding(user_id).is_some() {
        let _ = svc
            .gateway
            .safe_send_text(user_id, t(lang, "upgrade_in_room"))
            .await;
        return;
    }
    svc.flows.set(user_id, Flow::AwaitUpgradeProof);
    let text = format!("💳 {}", t(lang, "upgrade_tip"));
    let _ = svc.gateway.safe_send_text(user_id, &text).await;
}

/// `/filters`: premium only; walks gender, then region, then language.
pub async fn filters(svc: &Services, user_id: i64) {
    let Some(user) = svc.db.get_user(user_id) else {
        return;
    };
    if !user.is_premium {
        let _ = svc
            .gateway
            .safe_send_text(user_id, t(user.language, "premium_only"))
            .await;
        return;
    }
    let text = format!(
        "🔍 {}\n\n👤 {}",
        t(user.language, "filters_intro"),
        t(user.language, "ask_filter_gender")
    );
    let _ = svc.gateway.safe_send_text(user_id, &text).await;
    svc.flows.set(
        user_id,
        Flow::FilterGender {
            draft: user.filters.clone(),
        },
    );
}

/// `/referral` (alias `/invite`): link and counters.
pub async fn referral(svc: &Services, user_id: i64) {
    let Some(user) = svc.db.get_user(user_id) else {
        return;
    };
    let link = svc.config.referral_link(user_id);
    let text = format!(
        "🎁 Referral Program\n━━━━━━━━━━━━━━━━\n\n📊 Your Stats\n👥 Referrals: {}\n⭐ Premium Days Earned: {}\n\n🔗 Your Referral Link\n{}\n\n💡 How it works\n• Share your link with friends\n• They join using your link\n• You get 1 day of premium for each referral!",
        user.referral_count, user.referral_count, link,
    );
    let _ = svc.gateway.safe_send_text(user_id, &text).await;
}

/// `/language [code]`: direct set, or re-enter the choice flow.
pub async fn language(svc: &Services, user_id: i64, cmd: &Command) {
    match cmd.arg(0).and_then(Language::parse) {
        Some(lang) => {
            svc.db.set_language(user_id, lang);
            let _ = svc
                .gateway
                .safe_send_text(user_id, t(lang, "language_set"))
                .await;
        }
        None => {
            let lang = lang_of(svc, user_id);
            let _ = svc
                .gateway
                .safe_send_text(user_id, t(lang, "choose_language"))
                .await;
            svc.flows.set(user_id, Flow::ChooseLanguage);
        }
    }
}

/// Consume one plain message as the answer to a pending flow step. Returns
/// true when the message was handled here.
pub async fn handle_flow_reply(svc: &Services, msg: &InboundMessage, flow: Flow) -> bool {
    let user_id = msg.from.id;
    let text = msg.text.as_deref().unwrap_or("").trim().to_string();
    let lang = lang_of(svc, user_id);

    match flow {
        Flow::ChooseLanguage => match Language::parse(&text) {
            Some(chosen) => {
                svc.db.set_language(user_id, chosen);
                let _ = svc
                    .gateway
                    .safe_send_text(user_id, t(chosen, "language_set"))
                    .await;
                let complete = svc
                    .db
                    .get_user(user_id)
                    .map(|u| u.profile_complete())
                    .unwrap_or(false);
                if !complete {
                    let prompt = format!("👤 {}", t(chosen, "ask_gender"));
                    let _ = svc.gateway.safe_send_text(user_id, &prompt).await;
                    svc.flows.set(user_id, Flow::AskGender);
                }
            }
            None => {
                let _ = svc
                    .gateway
                    .safe_send_text(user_id, t(lang, "invalid_option"))
                    .await;
                svc.flows.set(user_id, Flow::ChooseLanguage);
            }
        },
        Flow::AskGender => match Gender::parse(&text) {
            Some(g) => {
                svc.db.set_gender(user_id, g);
                let prompt = format!("🌍 {}", t(lang, "ask_region"));
                let _ = svc.gateway.safe_send_text(user_id, &prompt).await;
                svc.flows.set(user_id, Flow::AskRegion);
            }
            None => {
                let _ = svc
                    .gateway
                    .safe_send_text(user_id, t(lang, "invalid_option"))
                    .await;
                svc.flows.set(user_id, Flow::AskGender);
            }
        },
        Flow::AskRegion => match Region::parse(&text) {
            Some(r) => {
                svc.db.set_region(user_id, r);
                let prompt = format!("📍 {}", t(lang, "ask_country"));
                let _ = svc.gateway.safe_send_text(user_id, &prompt).await;
                svc.flows.set(user_id, Flow::AskCountry);
            }
            None => {
                let _ = svc
                    .gateway
                    .safe_send_text(user_id, t(lang, "invalid_option"))
                    .await;
                svc.flows.set(user_id, Flow::AskRegion);
            }
        },
        Flow::AskCountry => {
            let country = text.trim().to_string();
            if country.chars().count() < 2 || country.chars().count() > 40 {
                let _ = svc
                    .gateway
                    .safe_send_text(user_id, t(lang, "invalid_option"))
                    .await;
                svc.flows.set(user_id, Flow::AskCountry);
            } else {
                svc.db.set_country(user_id, &country);
                let done = format!("✅ {}", t(lang, "profile_saved"));
                let _ = svc.gateway.safe_send_text(user_id, &done).await;
            }
        }
        Flow::FilterGender { mut draft } => {
            if text.eq_ignore_ascii_case("any") {
                draft.gender = None;
            } else if let Some(g) = Gender::parse(&text) {
                draft.gender = Some(g);
            } else {
                let _ = svc
                    .gateway
                    .safe_send_text(user_id, t(lang, "invalid_option"))
                    .await;
                svc.flows.set(user_id, Flow::FilterGender { draft });
                return true;
            }
            let prompt = format!("🌍 {}", t(lang, "ask_filter_region"));
            let _ = svc.gateway.safe_send_text(user_id, &prompt).await;
            svc.flows.set(user_id, Flow::FilterRegion { draft });
        }
        Flow::FilterRegion { mut draft } => {
            if text.eq_ignore_ascii_case("any") {
                draft.region = None;
            } else if let Some(r) = Region::parse(&text) {
                draft.region = Some(r);
            } else {
                let _ = svc
                    .gateway
                    .safe_send_text(user_id, t(lang, "invalid_option"))
                    .await;
                svc.flows.set(user_id, Flow::FilterRegion { draft });
                return true;
            }
            let prompt = format!("💬 {}", t(lang, "ask_filter_language"));
            let _ = svc.gateway.safe_send_text(user_id, &prompt).await;
            svc.flows.set(user_id, Flow::FilterLanguage { draft });
        }
        Flow::FilterLanguage { mut draft } => {
            if text.eq_ignore_ascii_case("any") {
                draft.language = None;
            } else if let Some(l) = Language::parse(&text) {
                draft.language = Some(l);
            } else {
                let _ = svc
                    .gateway
                    .safe_send_text(user_id, t(lang, "invalid_option"))
                    .await;
                svc.flows.set(user_id, Flow::FilterLanguage { draft });
                return true;
            }
            svc.db.set_filters(user_id, &draft);
            let done = format!("✅ {}", t(lang, "filters_saved"));
            let _ = svc.gateway.safe_send_text(user_id, &done).await;
        }
        Flow::AwaitUpgradeProof => {
            if svc.config.mod_channel_id != 0 {
                let tag = format!("#upgrade Payment proof from user {user_id}");
                match &msg.media {
                    Some(m) => {
                        let _ = svc
                            .gateway
                            .copy_media(svc.config.mod_channel_id, m.kind, &m.file_id, Some(&tag))
                            .await;
                    }
                    None => {
                        let text = format!("{tag}:\n{}", msg.body_text());
                        svc.gateway
                            .safe_send_text(svc.config.mod_channel_id, &text)
                            .await;
                    }
                }
            }
            let ack = format!("✅ {}", t(lang, "proof_sent"));
            let _ = svc.gateway.safe_send_text(user_id, &ack).await;
        }
    }
    true
}
