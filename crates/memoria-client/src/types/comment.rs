//! Comment and reply wire records.

use chrono::{DateTime, Utc};
use memoria_comments::{ANONYMOUS_NAME, Comment, CommentPage, Nivel, Relacion, Reply};
use serde::Deserialize;

/// Comment as sent by the server.
///
/// Identifiers come as `id` or `_id`, timestamps as `fechaCreacion` or
/// `createdAt`; both spellings are kept and resolved in the mapping.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct WireComment {
    #[serde(default)]
    id: Option<String>,
    #[serde(rename = "_id", default)]
    object_id: Option<String>,
    #[serde(default)]
    nombre: Option<String>,
    #[serde(default)]
    mensaje: String,
    #[serde(default)]
    relacion: Option<String>,
    #[serde(default)]
    fecha_creacion: Option<String>,
    #[serde(default)]
    created_at: Option<String>,
    #[serde(default)]
    nivel_usuario: Option<String>,
    #[serde(default)]
    likes: Option<u64>,
    #[serde(default)]
    codigo_usado: Option<String>,
    #[serde(default)]
    ip: Option<String>,
    #[serde(default)]
    respuestas: Option<Vec<WireReply>>,
}

/// Reply as sent by the server.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct WireReply {
    #[serde(default)]
    id: Option<String>,
    #[serde(rename = "_id", default)]
    object_id: Option<String>,
    #[serde(default)]
    nombre: Option<String>,
    #[serde(default)]
    mensaje: String,
    #[serde(default)]
    relacion: Option<String>,
    #[serde(default)]
    fecha_creacion: Option<String>,
    #[serde(default)]
    created_at: Option<String>,
    #[serde(default)]
    likes: Option<u64>,
    #[serde(default)]
    codigo_usado: Option<String>,
    #[serde(default)]
    ip: Option<String>,
}

/// Comment listing response (public and admin).
#[derive(Debug, Deserialize)]
pub(crate) struct ListResponse {
    #[serde(default)]
    comentarios: Vec<WireComment>,
    #[serde(default)]
    pagination: Option<WirePagination>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WirePagination {
    #[serde(default)]
    page: Option<u32>,
    #[serde(default)]
    total_pages: Option<u32>,
    #[serde(default)]
    total: Option<u64>,
}

impl ListResponse {
    /// Normalize into a [`CommentPage`], falling back to `requested` when the
    /// server omits pagination.
    pub(crate) fn into_page(self, requested: u32) -> CommentPage {
        let comentarios: Vec<Comment> = self.comentarios.into_iter().map(Comment::from).collect();
        let pagination = self.pagination.unwrap_or(WirePagination {
            page: None,
            total_pages: None,
            total: None,
        });
        let page = pagination.page.unwrap_or(requested);
        CommentPage {
            total: pagination.total.unwrap_or(comentarios.len() as u64),
            total_pages: pagination.total_pages.unwrap_or(page),
            page,
            comentarios,
        }
    }
}

fn pick_id(id: Option<String>, object_id: Option<String>) -> String {
    id.or(object_id).unwrap_or_default()
}

fn display_name(nombre: Option<String>) -> String {
    match nombre {
        Some(name) if !name.trim().is_empty() => name,
        _ => ANONYMOUS_NAME.to_owned(),
    }
}

fn parse_fecha(fecha: Option<String>, created_at: Option<String>) -> Option<DateTime<Utc>> {
    fecha
        .or(created_at)
        .and_then(|raw| DateTime::parse_from_rfc3339(&raw).ok())
        .map(|parsed| parsed.with_timezone(&Utc))
}

impl From<WireComment> for Comment {
    fn from(wire: WireComment) -> Self {
        Self {
            id: pick_id(wire.id, wire.object_id),
            nombre: display_name(wire.nombre),
            mensaje: wire.mensaje,
            relacion: wire.relacion.map(Relacion::from).unwrap_or_default(),
            fecha_creacion: parse_fecha(wire.fecha_creacion, wire.created_at),
            nivel_usuario: match wire.nivel_usuario.as_deref() {
                Some("cliente") => Nivel::Cliente,
                _ => Nivel::Familiar,
            },
            likes: wire.likes.unwrap_or(0),
            codigo_usado: wire.codigo_usado,
            ip: wire.ip,
            respuestas: wire
                .respuestas
                .unwrap_or_default()
                .into_iter()
                .map(Reply::from)
                .collect(),
        }
    }
}

impl From<WireReply> for Reply {
    fn from(wire: WireReply) -> Self {
        Self {
            id: pick_id(wire.id, wire.object_id),
            nombre: display_name(wire.nombre),
            mensaje: wire.mensaje,
            relacion: wire.relacion.map(Relacion::from).unwrap_or_default(),
            fecha_creacion: parse_fecha(wire.fecha_creacion, wire.created_at),
            likes: wire.likes.unwrap_or(0),
            codigo_usado: wire.codigo_usado,
            ip: wire.ip,
        }
    }
}
