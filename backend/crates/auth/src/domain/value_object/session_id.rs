use kernel::id::Id;
use uuid::Uuid;

pub struct SessionMarker;
pub type SessionId = Id<SessionMarker>;

/// Parse the textual form carried in the session cookie
pub fn parse_session_id(s: &str) -> Option<SessionId> {
    Uuid::parse_str(s).ok().map(SessionId::from_uuid)
}
