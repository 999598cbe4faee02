//! Mock comment service for testing.
//!
//! Provides [`MockCommentService`], an in-memory implementation of both
//! service traits that behaves like the remote API (newest-first listing,
//! token checks, cascade delete) and records every call.

use std::collections::HashMap;
use std::sync::RwLock;

use chrono::Utc;

use crate::error::ServiceError;
use crate::service::{CommentService, ModerationService};
use crate::types::{
    Comment, CommentConfiguration, CommentPage, GeneratedCodes, MemorialCodes,
    ModerationSettings, Nivel, NewComment, Permiso, Relacion, Reply, ValidatedAccess,
};

/// A call received by the mock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    GetConfiguration {
        memorial_id: String,
    },
    ListComments {
        memorial_id: String,
        page: u32,
        page_size: u32,
    },
    ValidateCode {
        memorial_id: String,
        code: String,
    },
    CreateComment {
        memorial_id: String,
        comment: NewComment,
        token: Option<String>,
    },
    CreateReply {
        memorial_id: String,
        comment_id: String,
        reply: NewComment,
        token: Option<String>,
    },
    LikeItem {
        memorial_id: String,
        item_id: String,
    },
    GetSettings {
        memorial_id: String,
    },
    GetMemorialCodes {
        memorial_id: String,
    },
    ListAdminComments {
        memorial_id: String,
        page: u32,
        page_size: u32,
    },
    SaveConfiguration {
        memorial_id: String,
        settings: ModerationSettings,
    },
    GenerateCodes {
        memorial_id: String,
    },
    GenerateClientCode {
        memorial_id: String,
    },
    DeleteComment {
        comment_id: String,
    },
}

/// Operation selector for failure injection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    GetConfiguration,
    ListComments,
    ValidateCode,
    CreateComment,
    CreateReply,
    LikeItem,
    GetSettings,
    GetMemorialCodes,
    ListAdminComments,
    SaveConfiguration,
    GenerateCodes,
    GenerateClientCode,
    DeleteComment,
}

impl Call {
    pub fn operation(&self) -> Operation {
        match self {
            Self::GetConfiguration { .. } => Operation::GetConfiguration,
            Self::ListComments { .. } => Operation::ListComments,
            Self::ValidateCode { .. } => Operation::ValidateCode,
            Self::CreateComment { .. } => Operation::CreateComment,
            Self::CreateReply { .. } => Operation::CreateReply,
            Self::LikeItem { .. } => Operation::LikeItem,
            Self::GetSettings { .. } => Operation::GetSettings,
            Self::GetMemorialCodes { .. } => Operation::GetMemorialCodes,
            Self::ListAdminComments { .. } => Operation::ListAdminComments,
            Self::SaveConfiguration { .. } => Operation::SaveConfiguration,
            Self::GenerateCodes { .. } => Operation::GenerateCodes,
            Self::GenerateClientCode { .. } => Operation::GenerateClientCode,
            Self::DeleteComment { .. } => Operation::DeleteComment,
        }
    }
}

/// Build a top-level comment fixture.
pub fn comment(id: &str, mensaje: &str) -> Comment {
    Comment {
        id: id.to_owned(),
        nombre: "Anónimo".to_owned(),
        mensaje: mensaje.to_owned(),
        relacion: Relacion::Familiar,
        fecha_creacion: None,
        nivel_usuario: Nivel::Familiar,
        likes: 0,
        codigo_usado: None,
        ip: None,
        respuestas: Vec::new(),
    }
}

/// Build a reply fixture.
pub fn reply(id: &str, mensaje: &str) -> Reply {
    Reply {
        id: id.to_owned(),
        nombre: "Anónimo".to_owned(),
        mensaje: mensaje.to_owned(),
        relacion: Relacion::Familiar,
        fecha_creacion: None,
        likes: 0,
        codigo_usado: None,
        ip: None,
    }
}

#[derive(Debug, Default)]
struct MockState {
    configs: HashMap<String, CommentConfiguration>,
    comments: HashMap<String, Vec<Comment>>,
    codes: HashMap<(String, String), Nivel>,
    tokens: HashMap<String, (Nivel, String)>,
    memorial_codes: HashMap<String, MemorialCodes>,
    failures: HashMap<Operation, ServiceError>,
    calls: Vec<Call>,
    next_id: u64,
}

impl MockState {
    fn next_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    /// Record the call and return the injected failure for it, if any.
    fn record(&mut self, call: Call) -> Result<(), ServiceError> {
        let operation = call.operation();
        self.calls.push(call);
        match self.failures.get(&operation) {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }

    fn page(&self, memorial_id: &str, page: u32, page_size: u32) -> CommentPage {
        let all = self.comments.get(memorial_id).map_or(&[][..], Vec::as_slice);
        let page_size = page_size.max(1) as usize;
        let page = page.max(1);
        let start = (page as usize - 1) * page_size;
        let comentarios = all.iter().skip(start).take(page_size).cloned().collect();
        let total_pages = u32::try_from(all.len().div_ceil(page_size)).unwrap_or(u32::MAX);
        CommentPage {
            comentarios,
            page,
            total_pages,
            total: all.len() as u64,
        }
    }

    fn requires_code(&self, memorial_id: &str) -> bool {
        self.configs
            .get(memorial_id)
            .is_none_or(|config| config.requiere_codigo)
    }

    fn authorize(
        &self,
        memorial_id: &str,
        token: Option<&str>,
        need: Nivel,
    ) -> Result<Option<(Nivel, String)>, ServiceError> {
        let holder = token.and_then(|t| self.tokens.get(t)).cloned();
        match holder {
            None if need == Nivel::Familiar && !self.requires_code(memorial_id) => Ok(None),
            None => Err(ServiceError::unauthorized("Token inválido o expirado")),
            Some((Nivel::Familiar, _)) if need == Nivel::Cliente => Err(
                ServiceError::unauthorized("Solo el cliente puede responder"),
            ),
            Some(holder) => Ok(Some(holder)),
        }
    }

    fn set_codes(&mut self, memorial_id: &str, familiar: &str, cliente: &str) {
        self.codes.retain(|(memorial, _), _| memorial != memorial_id);
        if !familiar.is_empty() {
            self.codes
                .insert((memorial_id.to_owned(), familiar.to_owned()), Nivel::Familiar);
        }
        if !cliente.is_empty() {
            self.codes
                .insert((memorial_id.to_owned(), cliente.to_owned()), Nivel::Cliente);
        }
        self.memorial_codes.insert(
            memorial_id.to_owned(),
            MemorialCodes {
                codigo_familiar: Some(familiar.to_owned()).filter(|c| !c.is_empty()),
                codigo_cliente: Some(cliente.to_owned()).filter(|c| !c.is_empty()),
            },
        );
    }
}

/// In-memory comment service for testing.
///
/// # Example
///
/// ```ignore
/// use memoria_comments::mock::{MockCommentService, comment};
/// use memoria_comments::{CommentConfiguration, Nivel};
///
/// let service = MockCommentService::new()
///     .with_configuration("qr1", CommentConfiguration {
///         habilitados: true,
///         requiere_codigo: true,
///         mensaje: None,
///     })
///     .with_code("qr1", "FAM-2025", Nivel::Familiar)
///     .with_comment("qr1", comment("c1", "Descanse en paz"));
/// ```
#[derive(Debug, Default)]
pub struct MockCommentService {
    state: RwLock<MockState>,
}

impl MockCommentService {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the public configuration for a memorial.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn with_configuration(self, memorial_id: &str, config: CommentConfiguration) -> Self {
        self.state
            .write()
            .unwrap()
            .configs
            .insert(memorial_id.to_owned(), config);
        self
    }

    /// Accept `code` for a memorial at the given tier.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn with_code(self, memorial_id: &str, code: &str, nivel: Nivel) -> Self {
        {
            let mut state = self.state.write().unwrap();
            state
                .codes
                .insert((memorial_id.to_owned(), code.to_owned()), nivel);
            let codes = state
                .memorial_codes
                .entry(memorial_id.to_owned())
                .or_default();
            match nivel {
                Nivel::Familiar => codes.codigo_familiar = Some(code.to_owned()),
                Nivel::Cliente => codes.codigo_cliente = Some(code.to_owned()),
            }
        }
        self
    }

    /// Append a comment (lists are newest first, so append older ones last).
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn with_comment(self, memorial_id: &str, comment: Comment) -> Self {
        self.state
            .write()
            .unwrap()
            .comments
            .entry(memorial_id.to_owned())
            .or_default()
            .push(comment);
        self
    }

    /// Make every call of `operation` fail with `err`.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn failing(self, operation: Operation, err: ServiceError) -> Self {
        self.fail(operation, err);
        self
    }

    /// Make every subsequent call of `operation` fail with `err`.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    pub fn fail(&self, operation: Operation, err: ServiceError) {
        self.state.write().unwrap().failures.insert(operation, err);
    }

    /// Remove all injected failures.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    pub fn clear_failures(&self) {
        self.state.write().unwrap().failures.clear();
    }

    /// Forget every issued token, as if they all expired server-side.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    pub fn revoke_tokens(&self) {
        self.state.write().unwrap().tokens.clear();
    }

    /// Calls received so far, in order.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    pub fn calls(&self) -> Vec<Call> {
        self.state.read().unwrap().calls.clone()
    }

    /// Number of calls received for `operation`.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    pub fn count(&self, operation: Operation) -> usize {
        self.state
            .read()
            .unwrap()
            .calls
            .iter()
            .filter(|call| call.operation() == operation)
            .count()
    }

    /// Forget recorded calls.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    pub fn clear_calls(&self) {
        self.state.write().unwrap().calls.clear();
    }

    /// Current server-side comments for a memorial.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    pub fn stored_comments(&self, memorial_id: &str) -> Vec<Comment> {
        self.state
            .read()
            .unwrap()
            .comments
            .get(memorial_id)
            .cloned()
            .unwrap_or_default()
    }
}

impl CommentService for MockCommentService {
    fn get_configuration(&self, memorial_id: &str) -> Result<CommentConfiguration, ServiceError> {
        let mut state = self.state.write().unwrap();
        state.record(Call::GetConfiguration {
            memorial_id: memorial_id.to_owned(),
        })?;
        state
            .configs
            .get(memorial_id)
            .cloned()
            .ok_or_else(|| ServiceError::rejected("Memorial no encontrado"))
    }

    fn list_comments(
        &self,
        memorial_id: &str,
        page: u32,
        page_size: u32,
    ) -> Result<CommentPage, ServiceError> {
        let mut state = self.state.write().unwrap();
        state.record(Call::ListComments {
            memorial_id: memorial_id.to_owned(),
            page,
            page_size,
        })?;
        let mut result = state.page(memorial_id, page, page_size);
        // The public listing never exposes audit fields.
        for comment in &mut result.comentarios {
            comment.ip = None;
            comment.codigo_usado = None;
            for reply in &mut comment.respuestas {
                reply.ip = None;
                reply.codigo_usado = None;
            }
        }
        Ok(result)
    }

    fn validate_code(
        &self,
        memorial_id: &str,
        code: &str,
    ) -> Result<ValidatedAccess, ServiceError> {
        let mut state = self.state.write().unwrap();
        state.record(Call::ValidateCode {
            memorial_id: memorial_id.to_owned(),
            code: code.to_owned(),
        })?;
        let nivel = *state
            .codes
            .get(&(memorial_id.to_owned(), code.to_owned()))
            .ok_or_else(|| ServiceError::rejected("Código inválido"))?;
        let token = format!("token-{}", state.next_id());
        state
            .tokens
            .insert(token.clone(), (nivel, code.to_owned()));
        let permisos = match nivel {
            Nivel::Familiar => vec![Permiso::Comentar],
            Nivel::Cliente => vec![Permiso::Comentar, Permiso::Responder],
        };
        Ok(ValidatedAccess {
            token,
            nivel,
            permisos,
            expires_in: None,
        })
    }

    fn create_comment(
        &self,
        memorial_id: &str,
        comment: &NewComment,
        token: Option<&str>,
    ) -> Result<(), ServiceError> {
        let mut state = self.state.write().unwrap();
        state.record(Call::CreateComment {
            memorial_id: memorial_id.to_owned(),
            comment: comment.clone(),
            token: token.map(str::to_owned),
        })?;
        let holder = state.authorize(memorial_id, token, Nivel::Familiar)?;
        let id = format!("c{}", state.next_id());
        let (nivel, code) = holder.map_or((Nivel::Familiar, None), |(n, c)| (n, Some(c)));
        let created = Comment {
            id,
            nombre: comment.nombre.clone(),
            mensaje: comment.mensaje.clone(),
            relacion: comment.relacion.clone(),
            fecha_creacion: Some(Utc::now()),
            nivel_usuario: nivel,
            likes: 0,
            codigo_usado: code,
            ip: Some("127.0.0.1".to_owned()),
            respuestas: Vec::new(),
        };
        state
            .comments
            .entry(memorial_id.to_owned())
            .or_default()
            .insert(0, created);
        Ok(())
    }

    fn create_reply(
        &self,
        memorial_id: &str,
        comment_id: &str,
        reply: &NewComment,
        token: Option<&str>,
    ) -> Result<(), ServiceError> {
        let mut state = self.state.write().unwrap();
        state.record(Call::CreateReply {
            memorial_id: memorial_id.to_owned(),
            comment_id: comment_id.to_owned(),
            reply: reply.clone(),
            token: token.map(str::to_owned),
        })?;
        let holder = state.authorize(memorial_id, token, Nivel::Cliente)?;
        let id = format!("r{}", state.next_id());
        let parent = state
            .comments
            .get_mut(memorial_id)
            .and_then(|list| list.iter_mut().find(|c| c.id == comment_id))
            .ok_or_else(|| ServiceError::rejected("Comentario no encontrado"))?;
        parent.respuestas.push(Reply {
            id,
            nombre: reply.nombre.clone(),
            mensaje: reply.mensaje.clone(),
            relacion: reply.relacion.clone(),
            fecha_creacion: Some(Utc::now()),
            likes: 0,
            codigo_usado: holder.map(|(_, code)| code),
            ip: Some("127.0.0.1".to_owned()),
        });
        Ok(())
    }

    fn like_item(&self, memorial_id: &str, item_id: &str) -> Result<u64, ServiceError> {
        let mut state = self.state.write().unwrap();
        state.record(Call::LikeItem {
            memorial_id: memorial_id.to_owned(),
            item_id: item_id.to_owned(),
        })?;
        let list = state
            .comments
            .get_mut(memorial_id)
            .ok_or_else(|| ServiceError::rejected("Comentario no encontrado"))?;
        for comment in list.iter_mut() {
            if comment.id == item_id {
                comment.likes += 1;
                return Ok(comment.likes);
            }
            if let Some(reply) = comment.respuestas.iter_mut().find(|r| r.id == item_id) {
                reply.likes += 1;
                return Ok(reply.likes);
            }
        }
        Err(ServiceError::rejected("Comentario no encontrado"))
    }
}

impl ModerationService for MockCommentService {
    fn get_settings(&self, memorial_id: &str) -> Result<CommentConfiguration, ServiceError> {
        let mut state = self.state.write().unwrap();
        state.record(Call::GetSettings {
            memorial_id: memorial_id.to_owned(),
        })?;
        Ok(state
            .configs
            .get(memorial_id)
            .cloned()
            .unwrap_or(CommentConfiguration {
                habilitados: false,
                requiere_codigo: true,
                mensaje: None,
            }))
    }

    fn get_memorial_codes(&self, memorial_id: &str) -> Result<MemorialCodes, ServiceError> {
        let mut state = self.state.write().unwrap();
        state.record(Call::GetMemorialCodes {
            memorial_id: memorial_id.to_owned(),
        })?;
        Ok(state
            .memorial_codes
            .get(memorial_id)
            .cloned()
            .unwrap_or_default())
    }

    fn list_admin_comments(
        &self,
        memorial_id: &str,
        page: u32,
        page_size: u32,
    ) -> Result<CommentPage, ServiceError> {
        let mut state = self.state.write().unwrap();
        state.record(Call::ListAdminComments {
            memorial_id: memorial_id.to_owned(),
            page,
            page_size,
        })?;
        Ok(state.page(memorial_id, page, page_size))
    }

    fn save_configuration(
        &self,
        memorial_id: &str,
        settings: &ModerationSettings,
    ) -> Result<ModerationSettings, ServiceError> {
        let mut state = self.state.write().unwrap();
        state.record(Call::SaveConfiguration {
            memorial_id: memorial_id.to_owned(),
            settings: settings.clone(),
        })?;
        let requiere_codigo = state.requires_code(memorial_id);
        state.configs.insert(
            memorial_id.to_owned(),
            CommentConfiguration {
                habilitados: settings.habilitados,
                requiere_codigo,
                mensaje: Some(settings.mensaje.clone()).filter(|m| !m.is_empty()),
            },
        );
        state.set_codes(
            memorial_id,
            &settings.codigo_familiar,
            &settings.codigo_cliente,
        );
        Ok(settings.clone())
    }

    fn generate_codes(&self, memorial_id: &str) -> Result<GeneratedCodes, ServiceError> {
        let mut state = self.state.write().unwrap();
        state.record(Call::GenerateCodes {
            memorial_id: memorial_id.to_owned(),
        })?;
        let n = state.next_id();
        Ok(GeneratedCodes {
            codigo_familiar: format!("FAM-{n:04}"),
            codigo_cliente: format!("CLI-{n:04}"),
        })
    }

    fn generate_client_code(&self, memorial_id: &str) -> Result<String, ServiceError> {
        let mut state = self.state.write().unwrap();
        state.record(Call::GenerateClientCode {
            memorial_id: memorial_id.to_owned(),
        })?;
        let n = state.next_id();
        Ok(format!("CLI-{n:04}"))
    }

    fn delete_comment(&self, comment_id: &str) -> Result<(), ServiceError> {
        let mut state = self.state.write().unwrap();
        state.record(Call::DeleteComment {
            comment_id: comment_id.to_owned(),
        })?;
        for list in state.comments.values_mut() {
            if let Some(pos) = list.iter().position(|c| c.id == comment_id) {
                // Replies go with their parent.
                list.remove(pos);
                return Ok(());
            }
            for comment in list.iter_mut() {
                if let Some(pos) = comment.respuestas.iter().position(|r| r.id == comment_id) {
                    comment.respuestas.remove(pos);
                    return Ok(());
                }
            }
        }
        Err(ServiceError::rejected("Comentario no encontrado"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn test_mock_service_is_send_sync() {
        assert_send_sync::<MockCommentService>();
    }

    #[test]
    fn test_listing_is_paginated() {
        let service = MockCommentService::new()
            .with_comment("qr", comment("c3", "tres"))
            .with_comment("qr", comment("c2", "dos"))
            .with_comment("qr", comment("c1", "uno"));

        let page = service.list_comments("qr", 2, 2).unwrap();

        assert_eq!(page.comentarios.len(), 1);
        assert_eq!(page.comentarios[0].id, "c1");
        assert_eq!(page.total_pages, 2);
        assert_eq!(page.total, 3);
    }

    #[test]
    fn test_delete_top_level_cascades_replies() {
        let mut parent = comment("c1", "uno");
        parent.respuestas.push(reply("r1", "gracias"));
        let service = MockCommentService::new()
            .with_comment("qr", parent)
            .with_comment("qr", comment("c2", "dos"));

        service.delete_comment("c1").unwrap();

        let ids: Vec<_> = service
            .stored_comments("qr")
            .into_iter()
            .map(|c| c.id)
            .collect();
        assert_eq!(ids, vec!["c2".to_owned()]);
    }

    #[test]
    fn test_delete_reply_keeps_parent() {
        let mut parent = comment("c1", "uno");
        parent.respuestas.push(reply("r1", "gracias"));
        parent.respuestas.push(reply("r2", "abrazo"));
        let service = MockCommentService::new().with_comment("qr", parent);

        service.delete_comment("r1").unwrap();

        let stored = service.stored_comments("qr");
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].respuestas.len(), 1);
        assert_eq!(stored[0].respuestas[0].id, "r2");
    }

    #[test]
    fn test_injected_failure_is_recorded() {
        let service = MockCommentService::new()
            .failing(Operation::LikeItem, ServiceError::Transport("down".to_owned()));

        let err = service.like_item("qr", "c1").unwrap_err();

        assert_eq!(err, ServiceError::Transport("down".to_owned()));
        assert_eq!(service.count(Operation::LikeItem), 1);
    }

    #[test]
    fn test_revoked_token_is_unauthorized() {
        let service = MockCommentService::new()
            .with_configuration(
                "qr",
                CommentConfiguration {
                    habilitados: true,
                    requiere_codigo: true,
                    mensaje: None,
                },
            )
            .with_code("qr", "FAM", Nivel::Familiar);
        let access = service.validate_code("qr", "FAM").unwrap();
        service.revoke_tokens();

        let err = service
            .create_comment(
                "qr",
                &NewComment {
                    nombre: "Anónimo".to_owned(),
                    mensaje: "Hola".to_owned(),
                    relacion: Relacion::Familiar,
                },
                Some(&access.token),
            )
            .unwrap_err();

        assert!(matches!(err, ServiceError::Unauthorized { .. }));
    }
}
