//! Comment data model.
//!
//! These are the normalized records the panels work with. Wire shapes are
//! mapped into them at the service boundary, so nothing past that point
//! probes for alternative field names.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::CommentError;
use crate::signal::Field;

/// Display name used when the poster leaves the name blank.
pub const ANONYMOUS_NAME: &str = "Anónimo";

/// Relationship of the poster to the person being remembered.
///
/// Unknown categories coming from the server are preserved verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Relacion {
    #[default]
    Familiar,
    Amigo,
    Colega,
    Vecino,
    Otra(String),
}

impl Relacion {
    /// Wire/display tag for this category.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Familiar => "familiar",
            Self::Amigo => "amigo",
            Self::Colega => "colega",
            Self::Vecino => "vecino",
            Self::Otra(other) => other,
        }
    }
}

impl From<&str> for Relacion {
    fn from(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "" | "familiar" => Self::Familiar,
            "amigo" => Self::Amigo,
            "colega" => Self::Colega,
            "vecino" => Self::Vecino,
            _ => Self::Otra(value.trim().to_owned()),
        }
    }
}

impl From<String> for Relacion {
    fn from(value: String) -> Self {
        Self::from(value.as_str())
    }
}

impl From<Relacion> for String {
    fn from(value: Relacion) -> Self {
        value.as_str().to_owned()
    }
}

impl fmt::Display for Relacion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Permission tier granted by an access code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Nivel {
    /// Holder of the family code: may comment.
    Familiar,
    /// Holder of the client code: may comment and reply.
    Cliente,
}

impl fmt::Display for Nivel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Familiar => "familiar",
            Self::Cliente => "cliente",
        })
    }
}

/// Action a session is allowed to perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Permiso {
    Comentar,
    Responder,
}

/// Top-level comment on a memorial.
#[derive(Debug, Clone, PartialEq)]
pub struct Comment {
    pub id: String,
    pub nombre: String,
    pub mensaje: String,
    pub relacion: Relacion,
    pub fecha_creacion: Option<DateTime<Utc>>,
    pub nivel_usuario: Nivel,
    pub likes: u64,
    /// Access code that authorized the post (admin listings only).
    pub codigo_usado: Option<String>,
    /// Poster address (admin listings only).
    pub ip: Option<String>,
    /// Replies in chronological order.
    pub respuestas: Vec<Reply>,
}

impl Comment {
    /// Find this comment or one of its replies by id and overwrite the like count.
    ///
    /// Returns `true` if an item matched.
    pub fn set_likes(&mut self, item_id: &str, likes: u64) -> bool {
        if self.id == item_id {
            self.likes = likes;
            return true;
        }
        match self.respuestas.iter_mut().find(|r| r.id == item_id) {
            Some(reply) => {
                reply.likes = likes;
                true
            }
            None => false,
        }
    }
}

/// Reply to a [`Comment`].
///
/// Replies never own replies of their own, and only client-tier holders can
/// post them, so the tier is not stored.
#[derive(Debug, Clone, PartialEq)]
pub struct Reply {
    pub id: String,
    pub nombre: String,
    pub mensaje: String,
    pub relacion: Relacion,
    pub fecha_creacion: Option<DateTime<Utc>>,
    pub likes: u64,
    pub codigo_usado: Option<String>,
    pub ip: Option<String>,
}

impl Reply {
    /// Tier of the poster, always [`Nivel::Cliente`].
    pub fn nivel_usuario(&self) -> Nivel {
        Nivel::Cliente
    }
}

/// Public comment settings for one memorial.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentConfiguration {
    /// Whether the comment section is shown at all.
    pub habilitados: bool,
    /// Whether posting requires a validated access code.
    #[serde(default = "default_requiere_codigo")]
    pub requiere_codigo: bool,
    /// Free text shown to visitors.
    #[serde(default)]
    pub mensaje: Option<String>,
}

fn default_requiere_codigo() -> bool {
    true
}

/// Pagination counters from the most recent page response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub pagina_actual: u32,
    pub total_paginas: u32,
    pub total_comentarios: u64,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            pagina_actual: 1,
            total_paginas: 1,
            total_comentarios: 0,
        }
    }
}

/// One page of comments as returned by the service.
#[derive(Debug, Clone, PartialEq)]
pub struct CommentPage {
    /// Comments, newest first.
    pub comentarios: Vec<Comment>,
    pub page: u32,
    pub total_pages: u32,
    pub total: u64,
}

/// Form input for a comment or reply, as typed by the visitor.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CommentInput {
    pub nombre: String,
    pub mensaje: String,
    pub relacion: Relacion,
}

impl CommentInput {
    /// Input with just a message; name and relation take their defaults.
    pub fn with_mensaje(mensaje: impl Into<String>) -> Self {
        Self {
            mensaje: mensaje.into(),
            ..Self::default()
        }
    }

    /// Validate and normalize the input for submission.
    ///
    /// A blank message is rejected against `field`; a blank name becomes
    /// [`ANONYMOUS_NAME`].
    pub fn prepare(&self, field: Field) -> Result<NewComment, CommentError> {
        let mensaje = self.mensaje.trim();
        if mensaje.is_empty() {
            return Err(CommentError::EmptyInput { field });
        }
        let nombre = match self.nombre.trim() {
            "" => ANONYMOUS_NAME,
            name => name,
        };
        Ok(NewComment {
            nombre: nombre.to_owned(),
            mensaje: mensaje.to_owned(),
            relacion: self.relacion.clone(),
        })
    }
}

/// Validated comment or reply ready to be sent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewComment {
    pub nombre: String,
    pub mensaje: String,
    pub relacion: Relacion,
}

/// Result of a successful code validation on the remote service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedAccess {
    pub token: String,
    pub nivel: Nivel,
    pub permisos: Vec<Permiso>,
    /// Token lifetime in seconds, when the server reports one.
    pub expires_in: Option<u64>,
}

/// Access codes stored on the memorial record.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MemorialCodes {
    pub codigo_familiar: Option<String>,
    pub codigo_cliente: Option<String>,
}

/// Administrator-editable comment settings, saved in a single call.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ModerationSettings {
    pub codigo_familiar: String,
    pub codigo_cliente: String,
    pub habilitados: bool,
    pub mensaje: String,
}

/// Codes produced by the server's generator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedCodes {
    pub codigo_familiar: String,
    pub codigo_cliente: String,
}
