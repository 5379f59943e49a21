// Gateway command surface: dispatch here, one file per actor below.
// The command layer is the single place component outcomes become
// user-visible status lines.

pub mod admin;
pub mod user;

use crate::Services;
use crate::models::{InboundMessage, Update};
use crate::relay;
use crate::texts::t;

/// A parsed gateway command: `/name arg1 arg2 ...`.
#[derive(Debug, Clone)]
pub struct Command {
    pub name: String,
    pub args: Vec<String>,
}

impl Command {
    pub fn arg(&self, index: usize) -> Option<&str> {
        self.args.get(index).map(|s| s.as_str())
    }

    /// Arguments from `index` on, joined back into free text.
    pub fn tail(&self, index: usize) -> String {
        self.args.get(index..).unwrap_or_default().join(" ")
    }
}

/// Commands may arrive addressed as `/find@SomeBot`; the handle is dropped.
pub fn parse_command(text: &str) -> Option<Command> {
    let rest = text.trim().strip_prefix('/')?;
    let mut parts = rest.split_whitespace();
    let raw_name = parts.next()?;
    let name = raw_name.split('@').next().unwrap_or(raw_name).to_lowercase();
    if name.is_empty() {
        return None;
    }
    Some(Command {
        name,
        args: parts.map(String::from).collect(),
    })
}

/// Entry point for every inbound gateway update.
pub async fn handle_update(svc: &Services, update: &Update) {
    let Some(msg) = &update.message else { return };
    let user_id = msg.from.id;

    // Coarse online marker + identity refresh on every interaction.
    svc.db.touch_user(&msg.from);

    if let Some(u) = svc.db.get_user(user_id)
        && u.blocked
    {
        let _ = svc
            .gateway
            .safe_send_text(user_id, t(u.language, "blocked_notice"))
            .await;
        return;
    }

    if let Some(text) = msg.text.as_deref()
        && let Some(cmd) = parse_command(text)
    {
        // A fresh command abandons any pending edit flow.
        svc.flows.clear(user_id);
        dispatch(svc, msg, &cmd).await;
        return;
    }

    if let Some(flow) = svc.flows.take(user_id)
        && user::handle_flow_reply(svc, msg, flow).await
    {
        return;
    }

    relay::handle_message(svc, msg).await;
}

async fn dispatch(svc: &Services, msg: &InboundMessage, cmd: &Command) {
    let user_id = msg.from.id;
    match cmd.name.as_str() {
        "start" => user::start(svc, msg, cmd).await,
        "find" => user::find(svc, user_id).await,
        "end" => user::end(svc, user_id).await,
        "next" => user::next(svc, user_id).await,
        "report" => user::report(svc, msg).await,
        "upgrade" => user::upgrade(svc, user_id).await,
        "filters" => user::filters(svc, user_id).await,
        "referral" | "invite" => user::referral(svc, user_id).await,
        "language" => user::language(svc, user_id, cmd).await,
        name if admin::is_admin_command(name) => {
            if svc.config.admin_user_id == 0 || user_id != svc.config.admin_user_id {
                let _ = svc.gateway.safe_send_text(user_id, "Unauthorized.").await;
                return;
            }
            admin::dispatch(svc, msg, cmd).await;
        }
        _ => {
            let lang = svc
                .db
                .get_user(user_id)
                .map(|u| u.language)
                .unwrap_or_default();
            let _ = svc
                .gateway
                .safe_send_text(user_id, t(lang, "unknown_command"))
                .await;
        }
    }
}
