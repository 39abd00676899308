//! Anonymous client identity
//!
//! There is no login. Each client gets a long-lived `id` that partitions the
//! cache and tags owned records, plus a `session_id` that rotates whenever a
//! new client session starts against the same durable store.
//!
//! ## Storage
//!
//! - Durable store, key [`IDENTITY_KEY`]: the serialized [`Identity`]
//! - Session-scoped store, key [`SESSION_MARKER_KEY`]: the current `session_id`
//!
//! Processes sharing a durable store share the identity; a process with a
//! fresh session scope rotates `session_id` but keeps `id`.

mod provider;
mod session;


pub use provider::IdentityProvider;
pub use session::Session;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Durable key holding the serialized identity
pub const IDENTITY_KEY: &str = "zeropass_user_identity";
/// Session-scoped key holding the current session id
pub const SESSION_MARKER_KEY: &str = "zeropass_session_id";
/// Durable key holding the display session record
pub const SESSION_RECORD_KEY: &str = "zeropass_session_record";
/// Identity id used when storage is unavailable
pub const PLACEHOLDER_USER_ID: &str = "anonymous";
/// Session id used when storage is unavailable
pub const PLACEHOLDER_SESSION_ID: &str = "anonymous-session";

/// Who is asking
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    pub id: String,
    pub session_id: String,
    pub created_at: DateTime<Utc>,
}

impl Identity {
    /// Constant identity returned when no storage is reachable
    pub fn placeholder() -> Self {
        Self {
            id: PLACEHOLDER_USER_ID.to_string(),
            session_id: PLACEHOLDER_SESSION_ID.to_string(),
            created_at: DateTime::<Utc>::UNIX_EPOCH,
        }
    }

    pub fn is_placeholder(&self) -> bool {
        self.id == PLACEHOLDER_USER_ID
    }
}

pub(crate) fn generate_user_id() -> String {
    format!("user_{}", uuid::Uuid::new_v4().simple())
}

pub(crate) fn generate_session_id() -> String {
    format!("session_{}", uuid::Uuid::new_v4().simple())
}
