use crate::Services;
use crate::matchmaker::{SealError, seal_match};
use crate::models::EndOutcome;

/// Leave the current room, or cancel a pending search when there is none.
/// The returned partner id (if any) is for the caller to notify; the
/// partner's side of the room is already torn down here.
pub async fn end_room(svc: &Services, user_id: i64) -> EndOutcome {
    let Some(room_id) = svc.db.get_binding(user_id) else {
        if crate::matchmaker::cancel_search(svc, user_id) {
            return EndOutcome::SearchCancelled;
        }
        return EndOutcome::NotInRoom;
    };

    let partner = svc
        .db
        .get_room(&room_id)
        .and_then(|r| r.partner_of(user_id));
    svc.db.close_room(&room_id);
    EndOutcome::LeftRoom { partner }
}

/// The other participant of the caller's active room.
pub fn get_partner(svc: &Services, user_id: i64) -> Option<i64> {
    let room_id = svc.db.get_binding(user_id)?;
    svc.db.get_room(&room_id)?.partner_of(user_id)
}

/// Admin operation: open a privileged room with a user. The user receives
/// the normal match notification and chats as usual.
pub async fn adopt_admin_room(
    svc: &Services,
    admin_id: i64,
    user_id: i64,
) -> Result<String, SealError> {
    seal_match(svc, admin_id, user_id, true).await
}

#[derive(Debug)]
pub enum LinkError {
    /// One of the two users already holds a binding.
    AlreadyBound(i64),
    Seal(SealError),
}

/// Admin operation: seal a match between two users who are not currently
/// bound. Pool and queue withdrawal, notifications and the moderator mirror
/// all happen exactly as for an organic match.
pub async fn link_users(svc: &Services, a: i64, b: i64) -> Result<String, LinkError> {
    for uid in [a, b] {
        if svc.db.get_binding(uid).is_some() {
            return Err(LinkError::AlreadyBound(uid));
        }
    }
    seal_match(svc, a, b, false).await.map_err(LinkError::Seal)
}
