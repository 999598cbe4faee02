//! Access sessions and the store that holds them.
//!
//! A session is created when an access code validates and is keyed by the
//! memorial identifier. Every panel for the same memorial shares one store,
//! passed in explicitly rather than held in a global.

use std::collections::{BTreeSet, HashMap};
use std::sync::{PoisonError, RwLock};

use chrono::{DateTime, Utc};

use crate::types::{Nivel, Permiso};

/// Token plus tier and permissions obtained from a code validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessSession {
    pub token: String,
    pub nivel: Nivel,
    pub permisos: BTreeSet<Permiso>,
    /// Local expiry estimate; the server remains authoritative.
    pub expires_at: Option<DateTime<Utc>>,
}

impl AccessSession {
    /// Build a session, normalizing permissions against the tier.
    ///
    /// Every tier may comment. Only [`Nivel::Cliente`] may reply, whatever
    /// the server listed.
    pub fn new(
        token: impl Into<String>,
        nivel: Nivel,
        granted: impl IntoIterator<Item = Permiso>,
        expires_at: Option<DateTime<Utc>>,
    ) -> Self {
        let mut permisos: BTreeSet<Permiso> = granted.into_iter().collect();
        permisos.insert(Permiso::Comentar);
        match nivel {
            Nivel::Cliente => {
                permisos.insert(Permiso::Responder);
            }
            Nivel::Familiar => {
                permisos.remove(&Permiso::Responder);
            }
        }
        Self {
            token: token.into(),
            nivel,
            permisos,
            expires_at,
        }
    }

    pub fn can_reply(&self) -> bool {
        self.permisos.contains(&Permiso::Responder)
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|at| now >= at)
    }
}

/// Per-memorial session storage.
///
/// Writes replace the whole record, so implementations need no field-level
/// coordination.
pub trait SessionStore: Send + Sync {
    fn get(&self, memorial_id: &str) -> Option<AccessSession>;

    fn set(&self, memorial_id: &str, session: AccessSession);

    fn clear(&self, memorial_id: &str);
}

/// In-process [`SessionStore`].
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    sessions: RwLock<HashMap<String, AccessSession>>,
}

impl MemorySessionStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for MemorySessionStore {
    fn get(&self, memorial_id: &str) -> Option<AccessSession> {
        self.sessions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(memorial_id)
            .cloned()
    }

    fn set(&self, memorial_id: &str, session: AccessSession) {
        self.sessions
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(memorial_id.to_owned(), session);
    }

    fn clear(&self, memorial_id: &str) {
        self.sessions
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(memorial_id);
    }
}
