//! Administrator moderation panel.
//!
//! Bypasses the access-code gate entirely: the administrator edits both codes
//! and the enabled flag, browses the unfiltered comment list (with audit
//! fields), and deletes comments or replies behind a confirmation prompt.

use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info, warn};

use crate::error::{CommentError, ServiceError};
use crate::pager::{CommentPager, PageTicket};
use crate::service::ModerationService;
use crate::signal::{Confirm, Notice, Signals, UiEvent};
use crate::types::{Comment, CommentPage, ModerationSettings, Pagination};

/// Comments per page on the moderation panel.
pub const ADMIN_PAGE_SIZE: u32 = 20;

/// Confirmation prompt before deleting a top-level comment.
pub const DELETE_COMMENT_PROMPT: &str = "¿Eliminar este comentario y todas sus respuestas?";

/// Confirmation prompt before deleting a reply.
pub const DELETE_REPLY_PROMPT: &str = "¿Eliminar esta respuesta?";

/// Comment moderation for one memorial, keyed by its internal identifier.
pub struct ModerationPanel {
    memorial_id: String,
    service: Arc<dyn ModerationService>,
    form: ModerationSettings,
    configuration_loaded: bool,
    pager: CommentPager,
    signals: Signals,
}

impl ModerationPanel {
    pub fn new(memorial_id: impl Into<String>, service: Arc<dyn ModerationService>) -> Self {
        Self {
            memorial_id: memorial_id.into(),
            service,
            form: ModerationSettings::default(),
            configuration_loaded: false,
            pager: CommentPager::new(ADMIN_PAGE_SIZE),
            signals: Signals::default(),
        }
    }

    #[must_use]
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.pager = CommentPager::new(page_size);
        self
    }

    pub fn memorial_id(&self) -> &str {
        &self.memorial_id
    }

    /// Form state, as loaded or as edited since.
    pub fn form(&self) -> &ModerationSettings {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut ModerationSettings {
        &mut self.form
    }

    pub fn is_configuration_loaded(&self) -> bool {
        self.configuration_loaded
    }

    pub fn comments(&self) -> &[Comment] {
        self.pager.comments()
    }

    pub fn pagination(&self) -> Pagination {
        self.pager.pagination()
    }

    pub fn is_loading_page(&self) -> bool {
        self.pager.is_loading()
    }

    pub fn has_more(&self) -> bool {
        self.pager.has_more()
    }

    pub fn status(&self) -> Option<&Notice> {
        self.signals.status()
    }

    pub fn drain_events(&mut self) -> Vec<UiEvent> {
        self.signals.drain()
    }

    pub fn dismiss_expired(&mut self, now: Instant) {
        self.signals.dismiss_expired(now);
    }

    /// Populate the form from the comment settings and the stored codes.
    pub fn load_configuration(&mut self) -> Result<(), CommentError> {
        self.signals.clear_status();
        debug!("Loading moderation settings for {}", self.memorial_id);

        let config = match self.service.get_settings(&self.memorial_id) {
            Ok(config) => config,
            Err(err) => return Err(self.reject(err)),
        };
        let codes = match self.service.get_memorial_codes(&self.memorial_id) {
            Ok(codes) => codes,
            Err(err) => return Err(self.reject(err)),
        };

        self.form = ModerationSettings {
            codigo_familiar: codes.codigo_familiar.unwrap_or_default(),
            codigo_cliente: codes.codigo_cliente.unwrap_or_default(),
            habilitados: config.habilitados,
            mensaje: config.mensaje.unwrap_or_default(),
        };
        self.configuration_loaded = true;
        Ok(())
    }

    /// Fetch `page` of the unfiltered listing.
    ///
    /// Requires [`load_configuration`](Self::load_configuration) first.
    pub fn load_comments(&mut self, page: u32) -> Result<(), CommentError> {
        let ticket = self.begin_page_load(page)?;
        let result = self.service.list_admin_comments(
            &self.memorial_id,
            ticket.page(),
            self.pager.page_size(),
        );
        self.finish_page_load(ticket, result).map(|_| ())
    }

    pub fn begin_page_load(&mut self, page: u32) -> Result<PageTicket, CommentError> {
        if !self.configuration_loaded {
            let err = CommentError::NotReady;
            self.signals.notify(Notice::error(err.user_message()));
            return Err(err);
        }
        Ok(self.pager.begin(page))
    }

    /// Apply a listing result. `Ok(false)` means the response was stale.
    pub fn finish_page_load(
        &mut self,
        ticket: PageTicket,
        result: Result<CommentPage, ServiceError>,
    ) -> Result<bool, CommentError> {
        match result {
            Ok(page) => Ok(self.pager.complete(ticket, page)),
            Err(err) => {
                if !self.pager.fail(ticket) {
                    return Ok(false);
                }
                Err(self.reject(err))
            }
        }
    }

    pub fn load_next_page(&mut self) -> Result<(), CommentError> {
        if self.pager.is_loading() || !self.pager.has_more() {
            return Ok(());
        }
        self.load_comments(self.pager.pagination().pagina_actual + 1)
    }

    /// Persist the whole form in one call.
    ///
    /// On success `on_saved` receives the stored settings. On failure the
    /// form keeps the administrator's edits.
    pub fn save_configuration(
        &mut self,
        on_saved: impl FnOnce(&ModerationSettings),
    ) -> Result<(), CommentError> {
        self.signals.clear_status();
        let settings = ModerationSettings {
            codigo_familiar: self.form.codigo_familiar.trim().to_owned(),
            codigo_cliente: self.form.codigo_cliente.trim().to_owned(),
            habilitados: self.form.habilitados,
            mensaje: self.form.mensaje.trim().to_owned(),
        };

        match self.service.save_configuration(&self.memorial_id, &settings) {
            Ok(saved) => {
                info!("Saved comment settings for memorial {}", self.memorial_id);
                self.form = saved;
                self.signals
                    .notify(Notice::success("Configuración guardada correctamente"));
                on_saved(&self.form);
                Ok(())
            }
            Err(err) => Err(self.reject(err)),
        }
    }

    /// Replace both codes in the form with server-generated ones.
    ///
    /// Nothing is persisted until [`save_configuration`](Self::save_configuration).
    pub fn generate_both_codes(&mut self) -> Result<(), CommentError> {
        self.signals.clear_status();
        match self.service.generate_codes(&self.memorial_id) {
            Ok(codes) => {
                let text = format!(
                    "Códigos generados:\nFamiliar: {}\nCliente: {}\nGuarde la configuración para aplicarlos.",
                    codes.codigo_familiar, codes.codigo_cliente
                );
                self.form.codigo_familiar = codes.codigo_familiar;
                self.form.codigo_cliente = codes.codigo_cliente;
                self.signals.notify(Notice::success_long(text));
                Ok(())
            }
            Err(err) => Err(self.reject(err)),
        }
    }

    /// Replace only the client code in the form.
    pub fn generate_client_code_only(&mut self) -> Result<(), CommentError> {
        self.signals.clear_status();
        match self.service.generate_client_code(&self.memorial_id) {
            Ok(code) => {
                let text = format!(
                    "Código de cliente generado: {code}\nGuarde la configuración para aplicarlo."
                );
                self.form.codigo_cliente = code;
                self.signals.notify(Notice::success_long(text));
                Ok(())
            }
            Err(err) => Err(self.reject(err)),
        }
    }

    /// Delete a comment (with its replies) or a single reply.
    ///
    /// Asks `confirm` first; a declined prompt returns `Ok(false)` without
    /// a remote call. On success page 1 is refetched instead of splicing the
    /// list locally, so the server's cascade is reflected exactly.
    pub fn delete_comment(
        &mut self,
        comment_id: &str,
        is_reply: bool,
        confirm: &dyn Confirm,
    ) -> Result<bool, CommentError> {
        let prompt = if is_reply {
            DELETE_REPLY_PROMPT
        } else {
            DELETE_COMMENT_PROMPT
        };
        if !confirm.confirm(prompt) {
            debug!("Deletion of {} declined", comment_id);
            return Ok(false);
        }

        self.signals.clear_status();
        if let Err(err) = self.service.delete_comment(comment_id) {
            warn!("Deleting {} failed: {}", comment_id, err);
            return Err(self.reject(err));
        }

        info!(
            "Deleted {} {} on memorial {}",
            if is_reply { "reply" } else { "comment" },
            comment_id,
            self.memorial_id
        );
        let text = if is_reply {
            "Respuesta eliminada"
        } else {
            "Comentario eliminado"
        };
        self.signals.notify(Notice::success(text));
        if let Err(err) = self.load_comments(1) {
            warn!("Reload after delete failed: {}", err);
        }
        Ok(true)
    }

    /// Stop applying listing responses.
    pub fn dispose(&mut self) {
        self.pager.dispose();
    }

    fn reject(&mut self, err: ServiceError) -> CommentError {
        let err = CommentError::from(err);
        self.signals.notify(Notice::error(err.user_message()));
        err
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{Call, MockCommentService, Operation, comment, reply};
    use crate::signal::NoticeKind;
    use crate::types::{CommentConfiguration, Nivel};
    use pretty_assertions::assert_eq;
    use std::cell::Cell;
    use std::time::Duration;

    const ID: &str = "mem-42";

    fn panel_for(mock: &Arc<MockCommentService>) -> ModerationPanel {
        let service: Arc<dyn ModerationService> = Arc::clone(mock) as Arc<dyn ModerationService>;
        ModerationPanel::new(ID, service)
    }

    fn seeded() -> MockCommentService {
        let mut parent = comment("c1", "Descanse en paz");
        parent.ip = Some("10.0.0.1".to_owned());
        parent.codigo_usado = Some("FAM-2025".to_owned());
        parent.respuestas.push(reply("r1", "Gracias"));
        MockCommentService::new()
            .with_configuration(
                ID,
                CommentConfiguration {
                    habilitados: true,
                    requiere_codigo: true,
                    mensaje: Some("Deje su recuerdo".to_owned()),
                },
            )
            .with_code(ID, "FAM-2025", Nivel::Familiar)
            .with_code(ID, "CLI-2025", Nivel::Cliente)
            .with_comment(ID, parent)
            .with_comment(ID, comment("c2", "Te extrañamos"))
    }

    #[test]
    fn test_load_configuration_merges_codes() {
        let mock = Arc::new(seeded());
        let mut panel = panel_for(&mock);

        panel.load_configuration().unwrap();

        assert_eq!(
            panel.form(),
            &ModerationSettings {
                codigo_familiar: "FAM-2025".to_owned(),
                codigo_cliente: "CLI-2025".to_owned(),
                habilitados: true,
                mensaje: "Deje su recuerdo".to_owned(),
            }
        );
        assert!(panel.is_configuration_loaded());
    }

    #[test]
    fn test_admin_listing_keeps_audit_fields() {
        let mock = Arc::new(seeded());
        let mut panel = panel_for(&mock);
        panel.load_configuration().unwrap();
        mock.clear_calls();

        panel.load_comments(1).unwrap();

        assert_eq!(panel.comments()[0].ip.as_deref(), Some("10.0.0.1"));
        assert_eq!(
            mock.calls(),
            vec![Call::ListAdminComments {
                memorial_id: ID.to_owned(),
                page: 1,
                page_size: ADMIN_PAGE_SIZE,
            }]
        );
    }

    #[test]
    fn test_listing_requires_configuration() {
        let mock = Arc::new(seeded());
        let mut panel = panel_for(&mock);

        let err = panel.load_comments(1).unwrap_err();

        assert_eq!(err, CommentError::NotReady);
        assert!(mock.calls().is_empty());
        assert!(!panel.is_loading_page());
    }

    #[test]
    fn test_save_failure_keeps_form_edits() {
        let mock = Arc::new(seeded().failing(
            Operation::SaveConfiguration,
            ServiceError::rejected("El código ya está en uso"),
        ));
        let mut panel = panel_for(&mock);
        panel.load_configuration().unwrap();
        panel.form_mut().codigo_familiar = "NUEVO-1".to_owned();
        let called = Cell::new(false);

        let err = panel.save_configuration(|_| called.set(true)).unwrap_err();

        assert_eq!(err.user_message(), "El código ya está en uso");
        assert_eq!(panel.form().codigo_familiar, "NUEVO-1");
        assert!(!called.get());
        assert!(panel.status().unwrap().is_error());
    }

    #[test]
    fn test_save_invokes_callback_with_saved_settings() {
        let mock = Arc::new(seeded());
        let mut panel = panel_for(&mock);
        panel.load_configuration().unwrap();
        panel.form_mut().habilitados = false;
        panel.form_mut().codigo_cliente = " CLI-9 ".to_owned();
        let mut saved = None;

        panel
            .save_configuration(|settings| saved = Some(settings.clone()))
            .unwrap();

        let saved = saved.unwrap();
        assert!(!saved.habilitados);
        assert_eq!(saved.codigo_cliente, "CLI-9");
        assert_eq!(mock.count(Operation::SaveConfiguration), 1);
        assert_eq!(panel.status().unwrap().kind, NoticeKind::Success);
    }

    #[test]
    fn test_generate_both_codes_does_not_save() {
        let mock = Arc::new(seeded());
        let mut panel = panel_for(&mock);
        panel.load_configuration().unwrap();

        panel.generate_both_codes().unwrap();

        assert!(panel.form().codigo_familiar.starts_with("FAM-"));
        assert!(panel.form().codigo_cliente.starts_with("CLI-"));
        assert_ne!(panel.form().codigo_familiar, "FAM-2025");
        assert_eq!(mock.count(Operation::SaveConfiguration), 0);
        let status = panel.status().unwrap();
        assert_eq!(status.dismiss_after, Some(Duration::from_secs(5)));
        assert!(status.text.contains('\n'));
    }

    #[test]
    fn test_generate_client_code_keeps_family_code() {
        let mock = Arc::new(seeded());
        let mut panel = panel_for(&mock);
        panel.load_configuration().unwrap();

        panel.generate_client_code_only().unwrap();

        assert_eq!(panel.form().codigo_familiar, "FAM-2025");
        assert_ne!(panel.form().codigo_cliente, "CLI-2025");
    }

    #[test]
    fn test_declined_delete_makes_no_call() {
        let mock = Arc::new(seeded());
        let mut panel = panel_for(&mock);
        panel.load_configuration().unwrap();
        panel.load_comments(1).unwrap();
        mock.clear_calls();
        let asked = Cell::new("");
        let decline = |prompt: &str| {
            asked.set(if prompt == DELETE_COMMENT_PROMPT { "comment" } else { "reply" });
            false
        };

        let deleted = panel.delete_comment("c1", false, &decline).unwrap();

        assert!(!deleted);
        assert_eq!(asked.get(), "comment");
        assert!(mock.calls().is_empty());
        assert_eq!(panel.comments().len(), 2);
    }

    #[test]
    fn test_confirmed_delete_refreshes_first_page() {
        let mock = Arc::new(seeded());
        let mut panel = panel_for(&mock);
        panel.load_configuration().unwrap();
        panel.load_comments(1).unwrap();
        mock.clear_calls();

        let deleted = panel.delete_comment("c1", false, &|_: &str| true).unwrap();

        assert!(deleted);
        assert_eq!(
            mock.calls(),
            vec![
                Call::DeleteComment {
                    comment_id: "c1".to_owned()
                },
                Call::ListAdminComments {
                    memorial_id: ID.to_owned(),
                    page: 1,
                    page_size: ADMIN_PAGE_SIZE,
                },
            ]
        );
        let ids: Vec<_> = panel.comments().iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["c2"]);
    }

    #[test]
    fn test_delete_reply_uses_reply_prompt() {
        let mock = Arc::new(seeded());
        let mut panel = panel_for(&mock);
        panel.load_configuration().unwrap();
        panel.load_comments(1).unwrap();
        let prompts = std::cell::RefCell::new(Vec::new());

        panel
            .delete_comment("r1", true, &|prompt: &str| {
                prompts.borrow_mut().push(prompt.to_owned());
                true
            })
            .unwrap();

        assert_eq!(prompts.into_inner(), vec![DELETE_REPLY_PROMPT.to_owned()]);
        assert_eq!(panel.comments()[0].id, "c1");
        assert!(panel.comments()[0].respuestas.is_empty());
    }

    #[test]
    fn test_delete_failure_leaves_list_untouched() {
        let mock = Arc::new(seeded());
        let mut panel = panel_for(&mock);
        panel.load_configuration().unwrap();
        panel.load_comments(1).unwrap();
        mock.fail(
            Operation::DeleteComment,
            ServiceError::rejected("No autorizado"),
        );
        mock.clear_calls();

        let err = panel
            .delete_comment("c1", false, &|_: &str| true)
            .unwrap_err();

        assert_eq!(err.user_message(), "No autorizado");
        assert_eq!(panel.comments().len(), 2);
        assert_eq!(mock.count(Operation::ListAdminComments), 0);
    }
}
