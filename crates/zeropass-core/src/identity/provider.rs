//! Identity provider

use super::session::Session;
use super::{
    IDENTITY_KEY, Identity, SESSION_MARKER_KEY, SESSION_RECORD_KEY, generate_session_id,
    generate_user_id,
};
use crate::clock::{Clock, SystemClock};
use crate::error::ZeroPassResult;
use crate::storage::KeyValueStore;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// Produces the current [`Identity`].
///
/// Construct once at startup and share through `Arc`.
#[derive(Debug)]
pub struct IdentityProvider {
    durable: Arc<dyn KeyValueStore>,
    session_scope: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
    /// In-process copy; the lock also serializes first-time synthesis
    cached: Mutex<Option<Identity>>,
}

enum Stored {
    Found(Identity),
    Missing,
    Unavailable,
}

impl IdentityProvider {
    /// Create a provider over a durable store and a session-scoped store
    pub fn new(durable: Arc<dyn KeyValueStore>, session_scope: Arc<dyn KeyValueStore>) -> Self {
        Self::with_clock(durable, session_scope, Arc::new(SystemClock))
    }

    /// Create a provider with an explicit clock
    pub fn with_clock(
        durable: Arc<dyn KeyValueStore>,
        session_scope: Arc<dyn KeyValueStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            durable,
            session_scope,
            clock,
            cached: Mutex::new(None),
        }
    }

    /// The durable store this provider persists into
    pub fn durable_store(&self) -> &Arc<dyn KeyValueStore> {
        &self.durable
    }

    /// Return the current identity, creating or rotating it as needed.
    ///
    /// Never fails: unreadable storage yields [`Identity::placeholder`].
    pub async fn current(&self) -> Identity {
        let mut cached = self.cached.lock().await;
        if let Some(identity) = cached.as_ref() {
            return identity.clone();
        }

        let stored = self.load_stored().await;
        let marker = match self.session_scope.get(SESSION_MARKER_KEY).await {
            Ok(marker) => marker,
            Err(e) => {
                warn!(error = %e, "Session scope unavailable, using placeholder identity");
                return Identity::placeholder();
            }
        };

        let identity = match stored {
            Stored::Unavailable => return Identity::placeholder(),
            Stored::Found(identity) if marker.as_deref() == Some(identity.session_id.as_str()) => {
                debug!(user_id = %identity.id, "Reusing stored identity");
                identity
            }
            Stored::Found(mut identity) => {
                identity.session_id = generate_session_id();
                info!(
                    user_id = %identity.id,
                    session_id = %identity.session_id,
                    "Rotated session for existing identity"
                );
                self.persist(&identity).await;
                identity
            }
            Stored::Missing => {
                let identity = Identity {
                    id: generate_user_id(),
                    session_id: generate_session_id(),
                    created_at: self.clock.now(),
                };
                info!(user_id = %identity.id, "Created new anonymous identity");
                self.persist(&identity).await;
                identity
            }
        };

        *cached = Some(identity.clone());
        identity
    }

    /// Forget the persisted identity and the in-process copy.
    ///
    /// Returns the id that was current, if one had been established.
    pub async fn reset(&self) -> Option<String> {
        let mut cached = self.cached.lock().await;
        let previous = match cached.take() {
            Some(identity) => Some(identity.id),
            None => match self.load_stored().await {
                Stored::Found(identity) => Some(identity.id),
                _ => None,
            },
        };

        if let Err(e) = self.durable.remove(IDENTITY_KEY).await {
            warn!(error = %e, "Failed to remove persisted identity");
        }
        if let Err(e) = self.session_scope.remove(SESSION_MARKER_KEY).await {
            warn!(error = %e, "Failed to remove session marker");
        }
        if let Err(e) = self.durable.remove(SESSION_RECORD_KEY).await {
            warn!(error = %e, "Failed to remove session record");
        }

        info!(previous = ?previous, "Identity reset");
        previous
    }

    /// Return the display session, refreshing its `last_active` stamp.
    pub async fn current_session(&self) -> Session {
        let now = self.clock.now();
        let session = match self.load_session().await {
            Ok(Some(mut session)) => {
                session.last_active = now;
                session
            }
            Ok(None) => Session::fresh(now),
            Err(e) => {
                warn!(error = %e, "Session record unavailable, using ephemeral session");
                return Session::fresh(now);
            }
        };

        self.persist_session(&session).await;
        session
    }

    /// Give the display session a human-readable name
    pub async fn rename_session(&self, name: impl Into<String>) -> Session {
        let mut session = self.current_session().await;
        session.name = name.into();
        self.persist_session(&session).await;
        session
    }

    async fn load_stored(&self) -> Stored {
        match self.durable.get(IDENTITY_KEY).await {
            Ok(Some(raw)) => match serde_json::from_str::<Identity>(&raw) {
                Ok(identity) if !identity.id.is_empty() => Stored::Found(identity),
                Ok(_) => Stored::Missing,
                Err(e) => {
                    warn!(error = %e, "Discarding unreadable persisted identity");
                    Stored::Missing
                }
            },
            Ok(None) => Stored::Missing,
            Err(e) => {
                warn!(error = %e, "Durable storage unavailable, using placeholder identity");
                Stored::Unavailable
            }
        }
    }

    async fn persist(&self, identity: &Identity) {
        match serde_json::to_string(identity) {
            Ok(raw) => {
                if let Err(e) = self.durable.set(IDENTITY_KEY, &raw).await {
                    warn!(error = %e, "Failed to persist identity");
                }
            }
            Err(e) => warn!(error = %e, "Failed to serialize identity"),
        }
        if let Err(e) = self
            .session_scope
            .set(SESSION_MARKER_KEY, &identity.session_id)
            .await
        {
            warn!(error = %e, "Failed to persist session marker");
        }
    }

    async fn load_session(&self) -> ZeroPassResult<Option<Session>> {
        let Some(raw) = self.durable.get(SESSION_RECORD_KEY).await? else {
            return Ok(None);
        };
        Ok(serde_json::from_str(&raw).ok())
    }

    async fn persist_session(&self, session: &Session) {
        let result = match serde_json::to_string(session) {
            Ok(raw) => self.durable.set(SESSION_RECORD_KEY, &raw).await,
            Err(e) => Err(e.into()),
        };
        if let Err(e) = result {
            warn!(error = %e, "Failed to persist session record");
        }
    }
}
