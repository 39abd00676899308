//! Display-facing session record

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Human-readable handle used to label the current session.
///
/// Independent of [`super::Identity::session_id`]; it survives session
/// rotation and is only replaced when the identity is reset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub id: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub last_active: DateTime<Utc>,
}

impl Session {
    pub(crate) fn fresh(now: DateTime<Utc>) -> Self {
        let id = format!("sess_{}", uuid::Uuid::new_v4().simple());
        let name = format!("Session {}", &id[5..13]);
        Self {
            id,
            name,
            created_at: now,
            last_active: now,
        }
    }
}
