//! Access gate: turns a typed code into an [`AccessSession`].

use std::sync::Arc;
use std::time::Duration;

use chrono::{TimeDelta, Utc};
use tracing::{debug, info};

use crate::error::CommentError;
use crate::service::CommentService;
use crate::session::{AccessSession, SessionStore};
use crate::signal::Field;

/// Local session lifetime when the server does not report one.
pub const DEFAULT_SESSION_TTL: Duration = Duration::from_secs(120);

/// State of the stored session for a memorial.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionLookup {
    /// No code has been validated (or the session was cleared).
    Missing,
    /// A session exists but is past its local expiry.
    Expired,
    Valid(AccessSession),
}

/// Validates access codes and answers session queries.
pub struct AccessGate {
    service: Arc<dyn CommentService>,
    store: Arc<dyn SessionStore>,
    session_ttl: Option<Duration>,
}

impl AccessGate {
    pub fn new(service: Arc<dyn CommentService>, store: Arc<dyn SessionStore>) -> Self {
        Self {
            service,
            store,
            session_ttl: Some(DEFAULT_SESSION_TTL),
        }
    }

    /// Override the local lifetime; `None` trusts the token until the server
    /// refuses it.
    #[must_use]
    pub fn with_session_ttl(mut self, ttl: Option<Duration>) -> Self {
        self.session_ttl = ttl;
        self
    }

    pub fn session_ttl(&self) -> Option<Duration> {
        self.session_ttl
    }

    pub fn lookup(&self, memorial_id: &str) -> SessionLookup {
        match self.store.get(memorial_id) {
            None => SessionLookup::Missing,
            Some(session) if session.is_expired_at(Utc::now()) => SessionLookup::Expired,
            Some(session) => SessionLookup::Valid(session),
        }
    }

    /// Whether a non-expired session exists, so the UI can skip the prompt.
    pub fn has_session(&self, memorial_id: &str) -> bool {
        matches!(self.lookup(memorial_id), SessionLookup::Valid(_))
    }

    /// Token of a still-valid session; `None` means the caller must re-validate.
    pub fn current_token(&self, memorial_id: &str) -> Option<String> {
        match self.lookup(memorial_id) {
            SessionLookup::Valid(session) => Some(session.token),
            SessionLookup::Missing | SessionLookup::Expired => None,
        }
    }

    /// Validate `code` remotely and store the resulting session.
    ///
    /// Blank codes fail with [`CommentError::EmptyInput`] without a network
    /// call.
    pub fn validate_code(
        &self,
        memorial_id: &str,
        code: &str,
    ) -> Result<AccessSession, CommentError> {
        let code = code.trim();
        if code.is_empty() {
            return Err(CommentError::EmptyInput {
                field: Field::AccessCode,
            });
        }

        let access = self
            .service
            .validate_code(memorial_id, code)
            .map_err(CommentError::from_validation)?;

        let lifetime = access
            .expires_in
            .map(Duration::from_secs)
            .or(self.session_ttl);
        let expires_at = lifetime
            .and_then(|d| TimeDelta::from_std(d).ok())
            .and_then(|delta| Utc::now().checked_add_signed(delta));

        let session = AccessSession::new(access.token, access.nivel, access.permisos, expires_at);
        self.store.set(memorial_id, session.clone());
        info!(
            "Access granted for memorial {} as {}",
            memorial_id, session.nivel
        );
        Ok(session)
    }

    /// Drop the stored session, reverting the memorial to anonymous.
    pub fn invalidate(&self, memorial_id: &str) {
        debug!("Clearing access session for memorial {}", memorial_id);
        self.store.clear(memorial_id);
    }

    pub(crate) fn service(&self) -> &Arc<dyn CommentService> {
        &self.service
    }
}
