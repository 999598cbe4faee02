//! Public comment panel for one memorial.
//!
//! Lifecycle: `Uninitialized → LoadingConfig → Disabled | LoadingComments →
//! Ready`. Posting, replying, liking, paging and code validation all happen
//! inside `Ready` without leaving it. Failures land in `Failed`, from which
//! [`CommentPanel::initialize`] can be retried.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use crate::error::{CommentError, ServiceError};
use crate::gate::{AccessGate, SessionLookup};
use crate::pager::{CommentPager, PageTicket};
use crate::service::CommentService;
use crate::session::{AccessSession, SessionStore};
use crate::signal::{Field, Notice, Signals, UiEvent};
use crate::types::{Comment, CommentConfiguration, CommentInput, CommentPage, Nivel, Pagination};

/// Comments per page on the public panel.
pub const DEFAULT_PAGE_SIZE: u32 = 10;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PanelState {
    Uninitialized,
    LoadingConfig,
    /// Comments are turned off for this memorial; nothing else happens.
    Disabled,
    LoadingComments,
    Ready,
    /// A load failed; the panel stays interactive and can be re-initialized.
    Failed {
        message: String,
    },
}

/// Reply form open under a comment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplyForm {
    pub comment_id: String,
    pub input: CommentInput,
}

/// Read/write comment interface for one memorial.
pub struct CommentPanel {
    memorial_id: String,
    gate: AccessGate,
    state: PanelState,
    config: Option<CommentConfiguration>,
    pager: CommentPager,
    comment_form: CommentInput,
    reply_form: Option<ReplyForm>,
    signals: Signals,
}

impl CommentPanel {
    pub fn new(
        memorial_id: impl Into<String>,
        service: Arc<dyn CommentService>,
        store: Arc<dyn SessionStore>,
    ) -> Self {
        Self {
            memorial_id: memorial_id.into(),
            gate: AccessGate::new(service, store),
            state: PanelState::Uninitialized,
            config: None,
            pager: CommentPager::new(DEFAULT_PAGE_SIZE),
            comment_form: CommentInput::default(),
            reply_form: None,
            signals: Signals::default(),
        }
    }

    #[must_use]
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.pager = CommentPager::new(page_size);
        self
    }

    #[must_use]
    pub fn with_session_ttl(mut self, ttl: Option<Duration>) -> Self {
        self.gate = self.gate.with_session_ttl(ttl);
        self
    }

    pub fn memorial_id(&self) -> &str {
        &self.memorial_id
    }

    pub fn state(&self) -> &PanelState {
        &self.state
    }

    pub fn config(&self) -> Option<&CommentConfiguration> {
        self.config.as_ref()
    }

    pub fn comments(&self) -> &[Comment] {
        self.pager.comments()
    }

    pub fn pagination(&self) -> Pagination {
        self.pager.pagination()
    }

    /// Whether a page load is in flight ("load more" should be disabled).
    pub fn is_loading_page(&self) -> bool {
        self.pager.is_loading()
    }

    pub fn has_more(&self) -> bool {
        self.pager.has_more()
    }

    pub fn gate(&self) -> &AccessGate {
        &self.gate
    }

    pub fn comment_form(&self) -> &CommentInput {
        &self.comment_form
    }

    pub fn comment_form_mut(&mut self) -> &mut CommentInput {
        &mut self.comment_form
    }

    pub fn reply_form(&self) -> Option<&ReplyForm> {
        self.reply_form.as_ref()
    }

    pub fn reply_input_mut(&mut self) -> Option<&mut CommentInput> {
        self.reply_form.as_mut().map(|form| &mut form.input)
    }

    /// Tier of the current session, `None` when anonymous.
    pub fn tier(&self) -> Option<Nivel> {
        match self.gate.lookup(&self.memorial_id) {
            SessionLookup::Valid(session) => Some(session.nivel),
            SessionLookup::Missing | SessionLookup::Expired => None,
        }
    }

    /// Whether the reply affordance should be rendered.
    pub fn can_reply(&self) -> bool {
        matches!(
            self.gate.lookup(&self.memorial_id),
            SessionLookup::Valid(session) if session.can_reply()
        )
    }

    /// Whether a valid session exists, so the code prompt can be skipped.
    pub fn has_session(&self) -> bool {
        self.gate.has_session(&self.memorial_id)
    }

    pub fn status(&self) -> Option<&Notice> {
        self.signals.status()
    }

    /// Take the queued events for the host UI.
    pub fn drain_events(&mut self) -> Vec<UiEvent> {
        self.signals.drain()
    }

    /// Clear the status line if its auto-dismiss delay has elapsed.
    pub fn dismiss_expired(&mut self, now: Instant) {
        self.signals.dismiss_expired(now);
    }

    /// Fetch the configuration and, when enabled, the first page.
    pub fn initialize(&mut self) -> Result<(), CommentError> {
        self.signals.clear_status();
        self.state = PanelState::LoadingConfig;
        debug!("Loading comment configuration for {}", self.memorial_id);

        let config = match self.gate.service().get_configuration(&self.memorial_id) {
            Ok(config) => config,
            Err(err) => return Err(self.fail_load(CommentError::from(err))),
        };

        let enabled = config.habilitados;
        self.config = Some(config);
        if !enabled {
            info!("Comments disabled for memorial {}", self.memorial_id);
            self.state = PanelState::Disabled;
            return Ok(());
        }

        self.state = PanelState::LoadingComments;
        self.load_comments(1)
    }

    /// Fetch `page` and apply it (page 1 replaces, later pages append).
    pub fn load_comments(&mut self, page: u32) -> Result<(), CommentError> {
        let ticket = self.begin_page_load(page)?;
        let result = self.gate.service().list_comments(
            &self.memorial_id,
            ticket.page(),
            self.pager.page_size(),
        );
        self.finish_page_load(ticket, result).map(|_| ())
    }

    /// Issue a page request without performing it.
    ///
    /// For hosts that run the service call elsewhere; hand the result to
    /// [`finish_page_load`](Self::finish_page_load).
    pub fn begin_page_load(&mut self, page: u32) -> Result<PageTicket, CommentError> {
        if let Err(err) = self.enabled_config() {
            return Err(self.reject(err));
        }
        if matches!(self.state, PanelState::Failed { .. }) {
            self.state = PanelState::LoadingComments;
        }
        Ok(self.pager.begin(page))
    }

    /// Apply the result of a page request.
    ///
    /// Returns `Ok(false)` when the response was stale or arrived after
    /// [`dispose`](Self::dispose).
    pub fn finish_page_load(
        &mut self,
        ticket: PageTicket,
        result: Result<CommentPage, ServiceError>,
    ) -> Result<bool, CommentError> {
        match result {
            Ok(page) => {
                let applied = self.pager.complete(ticket, page);
                if applied && self.state == PanelState::LoadingComments {
                    self.state = PanelState::Ready;
                }
                Ok(applied)
            }
            Err(err) => {
                if !self.pager.fail(ticket) {
                    return Ok(false);
                }
                let err = CommentError::from(err);
                if self.state == PanelState::LoadingComments {
                    return Err(self.fail_load(err));
                }
                Err(self.reject(err))
            }
        }
    }

    /// Load the page after the current one.
    ///
    /// No-op on the last page or while a load is in flight.
    pub fn load_next_page(&mut self) -> Result<(), CommentError> {
        if self.pager.is_loading() || !self.pager.has_more() {
            return Ok(());
        }
        self.load_comments(self.pager.pagination().pagina_actual + 1)
    }

    /// Validate an access code and store the session.
    ///
    /// Empty or rejected codes request focus back on the code input.
    pub fn validate_code(&mut self, code: &str) -> Result<AccessSession, CommentError> {
        self.signals.clear_status();
        match self.gate.validate_code(&self.memorial_id, code) {
            Ok(session) => {
                let text = self.access_granted_text(&session);
                self.signals.notify(Notice::success(text));
                Ok(session)
            }
            Err(err) => {
                let focus = matches!(
                    err,
                    CommentError::EmptyInput { .. } | CommentError::InvalidCode { .. }
                );
                let err = self.reject(err);
                if focus {
                    self.signals.focus(Field::AccessCode);
                }
                Err(err)
            }
        }
    }

    /// Forget the session and fall back to anonymous.
    pub fn logout(&mut self) {
        self.gate.invalidate(&self.memorial_id);
        self.reply_form = None;
    }

    /// Submit the comment form.
    ///
    /// On success the form is cleared and page 1 is reloaded so the new
    /// comment shows with its server-assigned fields.
    pub fn post_comment(&mut self) -> Result<(), CommentError> {
        self.signals.clear_status();
        let requiere_codigo = match self.enabled_config() {
            Ok(config) => config.requiere_codigo,
            Err(err) => return Err(self.reject(err)),
        };

        let comment = match self.comment_form.prepare(Field::CommentMessage) {
            Ok(comment) => comment,
            Err(err) => return Err(self.reject(err)),
        };

        let token = match self.gate.lookup(&self.memorial_id) {
            SessionLookup::Valid(session) => Some(session.token),
            SessionLookup::Missing if requiere_codigo => {
                return Err(self.reject(CommentError::AccessRequired));
            }
            SessionLookup::Expired if requiere_codigo => return Err(self.expire_session()),
            SessionLookup::Missing | SessionLookup::Expired => None,
        };

        let result =
            self.gate
                .service()
                .create_comment(&self.memorial_id, &comment, token.as_deref());
        match result {
            Ok(()) => {
                info!("Comment posted on memorial {}", self.memorial_id);
                self.comment_form = CommentInput::default();
                self.signals
                    .notify(Notice::success("Comentario publicado con éxito"));
                self.reload_first_page();
                Ok(())
            }
            Err(err) => Err(self.fail_mutation(err)),
        }
    }

    /// Submit the reply form open under `comment_id`.
    ///
    /// Requires the `responder` permission, checked before any network call.
    pub fn post_reply(&mut self, comment_id: &str) -> Result<(), CommentError> {
        self.signals.clear_status();
        if let Err(err) = self.enabled_config() {
            return Err(self.reject(err));
        }

        let token = match self.gate.lookup(&self.memorial_id) {
            SessionLookup::Valid(session) if session.can_reply() => session.token,
            SessionLookup::Expired => return Err(self.expire_session()),
            SessionLookup::Valid(_) | SessionLookup::Missing => {
                let err = CommentError::Forbidden;
                self.signals
                    .notify(Notice::error_transient(err.user_message()));
                return Err(err);
            }
        };

        let input = self
            .reply_form
            .as_ref()
            .filter(|form| form.comment_id == comment_id)
            .map(|form| form.input.clone())
            .unwrap_or_default();
        let field = Field::ReplyMessage(comment_id.to_owned());
        let reply = match input.prepare(field.clone()) {
            Ok(reply) => reply,
            Err(err) => {
                let err = self.reject(err);
                self.signals.focus(field);
                return Err(err);
            }
        };

        let result = self.gate.service().create_reply(
            &self.memorial_id,
            comment_id,
            &reply,
            Some(&token),
        );
        match result {
            Ok(()) => {
                info!(
                    "Reply posted under {} on memorial {}",
                    comment_id, self.memorial_id
                );
                self.reply_form = None;
                self.signals
                    .notify(Notice::success("Respuesta publicada con éxito"));
                self.reload_first_page();
                Ok(())
            }
            Err(err) => Err(self.fail_mutation(err)),
        }
    }

    /// Open the reply form under `comment_id`, or close it if already open.
    ///
    /// Opening discards any unsent text in a previously open form.
    /// Returns whether a form is now open under `comment_id`.
    pub fn toggle_reply_form(&mut self, comment_id: &str) -> bool {
        let open_here = self
            .reply_form
            .as_ref()
            .is_some_and(|form| form.comment_id == comment_id);
        if open_here {
            self.reply_form = None;
            return false;
        }
        self.reply_form = Some(ReplyForm {
            comment_id: comment_id.to_owned(),
            input: CommentInput::default(),
        });
        self.signals
            .focus(Field::ReplyMessage(comment_id.to_owned()));
        true
    }

    /// Like a comment or reply.
    ///
    /// The displayed count only changes to the server's returned value.
    pub fn like_item(&mut self, item_id: &str) -> Result<u64, CommentError> {
        self.signals.clear_status();
        if let Err(err) = self.enabled_config() {
            return Err(self.reject(err));
        }

        match self.gate.service().like_item(&self.memorial_id, item_id) {
            Ok(likes) => {
                if !self.pager.apply_likes(item_id, likes) {
                    debug!("Liked item {} is not in the loaded list", item_id);
                }
                Ok(likes)
            }
            Err(err) => {
                let err = CommentError::from(err);
                self.signals
                    .notify(Notice::error_transient(err.user_message()));
                Err(err)
            }
        }
    }

    /// Stop applying responses; call when the host view goes away.
    pub fn dispose(&mut self) {
        self.pager.dispose();
    }

    fn enabled_config(&self) -> Result<&CommentConfiguration, CommentError> {
        match &self.config {
            None => Err(CommentError::NotReady),
            Some(config) if !config.habilitados => Err(CommentError::Disabled),
            Some(config) => Ok(config),
        }
    }

    fn reload_first_page(&mut self) {
        if let Err(err) = self.load_comments(1) {
            warn!(
                "Reload after post failed for memorial {}: {}",
                self.memorial_id, err
            );
        }
    }

    fn access_granted_text(&self, session: &AccessSession) -> String {
        let base = match session.nivel {
            Nivel::Familiar => "Código válido. Ya puede dejar su comentario.",
            Nivel::Cliente => "Código de cliente válido. Puede comentar y responder.",
        };
        match self.gate.session_ttl() {
            Some(ttl) if ttl.as_secs() >= 60 => {
                format!("{base} (válido por {} minutos)", ttl.as_secs().div_ceil(60))
            }
            _ => base.to_owned(),
        }
    }

    /// Clear the session after the token went stale.
    fn expire_session(&mut self) -> CommentError {
        warn!("Access token for memorial {} expired", self.memorial_id);
        self.logout();
        self.reject(CommentError::TokenExpired)
    }

    fn fail_mutation(&mut self, err: ServiceError) -> CommentError {
        match CommentError::from_mutation(err) {
            CommentError::TokenExpired => self.expire_session(),
            err => {
                warn!(
                    "Mutation rejected on memorial {}: {}",
                    self.memorial_id, err
                );
                self.reject(err)
            }
        }
    }

    fn fail_load(&mut self, err: CommentError) -> CommentError {
        let message = err.user_message();
        warn!("Loading comments for {} failed: {}", self.memorial_id, err);
        self.state = PanelState::Failed {
            message: message.clone(),
        };
        self.signals.notify(Notice::error(message));
        err
    }

    fn reject(&mut self, err: CommentError) -> CommentError {
        self.signals.notify(Notice::error(err.user_message()));
        err
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GENERIC_ERROR_MESSAGE;
    use crate::mock::{Call, MockCommentService, Operation, comment, reply};
    use crate::session::MemorySessionStore;
    use crate::signal::NoticeKind;
    use chrono::{TimeDelta, Utc};
    use pretty_assertions::assert_eq;

    const QR: &str = "qr-ana";

    fn config(habilitados: bool, requiere_codigo: bool) -> CommentConfiguration {
        CommentConfiguration {
            habilitados,
            requiere_codigo,
            mensaje: None,
        }
    }

    fn service() -> MockCommentService {
        MockCommentService::new()
            .with_configuration(QR, config(true, true))
            .with_code(QR, "FAM-2025", Nivel::Familiar)
            .with_code(QR, "CLI-2025", Nivel::Cliente)
    }

    fn panel_for(mock: &Arc<MockCommentService>) -> CommentPanel {
        let service: Arc<dyn CommentService> = Arc::clone(mock) as Arc<dyn CommentService>;
        CommentPanel::new(QR, service, Arc::new(MemorySessionStore::new()))
    }

    fn ready_panel(mock: &Arc<MockCommentService>) -> CommentPanel {
        let mut panel = panel_for(mock);
        panel.initialize().unwrap();
        mock.clear_calls();
        panel
    }

    fn comment_ids(panel: &CommentPanel) -> Vec<String> {
        panel.comments().iter().map(|c| c.id.clone()).collect()
    }

    #[test]
    fn test_disabled_memorial_never_lists_comments() {
        let mock = Arc::new(
            MockCommentService::new()
                .with_configuration(QR, config(false, true))
                .with_comment(QR, comment("c1", "Hola")),
        );
        let mut panel = panel_for(&mock);

        panel.initialize().unwrap();

        assert_eq!(panel.state(), &PanelState::Disabled);
        assert_eq!(mock.count(Operation::ListComments), 0);
        assert!(panel.comments().is_empty());
    }

    #[test]
    fn test_initialize_loads_first_page() {
        let mock = Arc::new(
            service()
                .with_comment(QR, comment("c2", "Siempre en nuestro corazón"))
                .with_comment(QR, comment("c1", "Descanse en paz")),
        );
        let mut panel = panel_for(&mock);

        panel.initialize().unwrap();

        assert_eq!(panel.state(), &PanelState::Ready);
        assert_eq!(comment_ids(&panel), vec!["c2", "c1"]);
        assert_eq!(
            mock.calls(),
            vec![
                Call::GetConfiguration {
                    memorial_id: QR.to_owned()
                },
                Call::ListComments {
                    memorial_id: QR.to_owned(),
                    page: 1,
                    page_size: DEFAULT_PAGE_SIZE,
                },
            ]
        );
    }

    #[test]
    fn test_config_failure_is_retryable() {
        let mock = Arc::new(service().failing(
            Operation::GetConfiguration,
            ServiceError::Transport("timeout".to_owned()),
        ));
        let mut panel = panel_for(&mock);

        let err = panel.initialize().unwrap_err();

        assert_eq!(err, CommentError::TransportError("timeout".to_owned()));
        assert!(matches!(panel.state(), PanelState::Failed { .. }));
        assert!(panel.status().unwrap().is_error());

        mock.clear_failures();
        panel.initialize().unwrap();
        assert_eq!(panel.state(), &PanelState::Ready);
    }

    #[test]
    fn test_post_without_session_requires_access() {
        let mock = Arc::new(service());
        let mut panel = ready_panel(&mock);
        panel.comment_form_mut().mensaje = "Hola".to_owned();

        let err = panel.post_comment().unwrap_err();

        assert_eq!(err, CommentError::AccessRequired);
        assert_eq!(mock.count(Operation::CreateComment), 0);
        // The draft survives for a retry after validating.
        assert_eq!(panel.comment_form().mensaje, "Hola");
    }

    #[test]
    fn test_whitespace_message_is_rejected_locally() {
        let mock = Arc::new(service());
        let mut panel = ready_panel(&mock);
        panel.validate_code("FAM-2025").unwrap();
        mock.clear_calls();
        *panel.comment_form_mut() = CommentInput {
            nombre: "Rosa".to_owned(),
            mensaje: "   ".to_owned(),
            ..CommentInput::default()
        };

        let err = panel.post_comment().unwrap_err();

        assert_eq!(
            err,
            CommentError::EmptyInput {
                field: Field::CommentMessage
            }
        );
        assert_eq!(panel.status().unwrap().text, "Por favor escriba un mensaje");
        assert!(mock.calls().is_empty());
    }

    #[test]
    fn test_family_code_then_post_reloads_first_page() {
        let mock = Arc::new(service().with_comment(QR, comment("c1", "Primer recuerdo")));
        let mut panel = ready_panel(&mock);

        let session = panel.validate_code("FAM-2025").unwrap();
        assert_eq!(session.nivel, Nivel::Familiar);
        assert_eq!(panel.tier(), Some(Nivel::Familiar));
        assert!(!panel.can_reply());

        panel.comment_form_mut().mensaje = "Descanse en paz".to_owned();
        panel.post_comment().unwrap();

        let calls = mock.calls();
        assert_eq!(
            calls[1],
            Call::CreateComment {
                memorial_id: QR.to_owned(),
                comment: crate::types::NewComment {
                    nombre: crate::types::ANONYMOUS_NAME.to_owned(),
                    mensaje: "Descanse en paz".to_owned(),
                    relacion: crate::types::Relacion::Familiar,
                },
                token: Some(session.token.clone()),
            }
        );
        assert_eq!(
            calls[2],
            Call::ListComments {
                memorial_id: QR.to_owned(),
                page: 1,
                page_size: DEFAULT_PAGE_SIZE,
            }
        );
        assert_eq!(panel.comments().len(), 2);
        assert_eq!(panel.comments()[0].mensaje, "Descanse en paz");
        assert_eq!(panel.comment_form(), &CommentInput::default());
        let status = panel.status().unwrap();
        assert_eq!(status.kind, NoticeKind::Success);
        assert_eq!(status.dismiss_after, Some(Duration::from_secs(3)));
    }

    #[test]
    fn test_optional_code_posts_anonymously() {
        let mock = Arc::new(
            MockCommentService::new().with_configuration(QR, config(true, false)),
        );
        let mut panel = ready_panel(&mock);
        panel.comment_form_mut().mensaje = "Un abrazo".to_owned();

        panel.post_comment().unwrap();

        assert!(matches!(
            &mock.calls()[0],
            Call::CreateComment { token: None, .. }
        ));
        assert_eq!(panel.comments().len(), 1);
    }

    #[test]
    fn test_client_code_can_reply() {
        let mock = Arc::new(service().with_comment(QR, comment("c1", "Descanse en paz")));
        let mut panel = ready_panel(&mock);
        panel.validate_code("CLI-2025").unwrap();
        assert!(panel.can_reply());

        assert!(panel.toggle_reply_form("c1"));
        panel.reply_input_mut().unwrap().mensaje = "Gracias".to_owned();
        panel.post_reply("c1").unwrap();

        assert!(panel.reply_form().is_none());
        assert_eq!(mock.count(Operation::CreateReply), 1);
        let replies = &panel.comments()[0].respuestas;
        assert_eq!(replies.len(), 1);
        assert_eq!(replies[0].mensaje, "Gracias");
        assert_eq!(replies[0].nivel_usuario(), Nivel::Cliente);
    }

    #[test]
    fn test_family_tier_reply_is_forbidden_without_network() {
        let mock = Arc::new(service().with_comment(QR, comment("c1", "Descanse en paz")));
        let mut panel = ready_panel(&mock);
        panel.validate_code("FAM-2025").unwrap();
        mock.clear_calls();
        panel.toggle_reply_form("c1");
        panel.reply_input_mut().unwrap().mensaje = "Gracias".to_owned();

        let err = panel.post_reply("c1").unwrap_err();

        assert_eq!(err, CommentError::Forbidden);
        assert!(mock.calls().is_empty());
        let status = panel.status().unwrap();
        assert_eq!(status.text, "Solo el cliente puede responder comentarios");
        assert_eq!(status.dismiss_after, Some(Duration::from_secs(3)));
    }

    #[test]
    fn test_empty_reply_requests_focus() {
        let mock = Arc::new(service().with_comment(QR, comment("c1", "Descanse en paz")));
        let mut panel = ready_panel(&mock);
        panel.validate_code("CLI-2025").unwrap();
        panel.toggle_reply_form("c1");
        panel.drain_events();

        let err = panel.post_reply("c1").unwrap_err();

        assert_eq!(err.user_message(), "Por favor escriba una respuesta");
        let events = panel.drain_events();
        assert!(events.contains(&UiEvent::FocusRequested(Field::ReplyMessage(
            "c1".to_owned()
        ))));
        assert_eq!(mock.count(Operation::CreateReply), 0);
    }

    #[test]
    fn test_invalid_code_restores_focus() {
        let mock = Arc::new(service());
        let mut panel = ready_panel(&mock);

        let err = panel.validate_code("WRONG").unwrap_err();

        assert_eq!(
            err,
            CommentError::InvalidCode {
                message: "Código inválido".to_owned()
            }
        );
        assert!(!panel.has_session());
        assert!(
            panel
                .drain_events()
                .contains(&UiEvent::FocusRequested(Field::AccessCode))
        );
    }

    #[test]
    fn test_server_error_on_validation_keeps_focus() {
        let mock = Arc::new(service());
        let mut panel = ready_panel(&mock);
        mock.fail(
            Operation::ValidateCode,
            ServiceError::Server {
                status: 500,
                message: None,
            },
        );

        let err = panel.validate_code("FAM-2025").unwrap_err();

        assert_eq!(
            err,
            CommentError::RemoteFailure {
                message: GENERIC_ERROR_MESSAGE.to_owned()
            }
        );
        assert!(
            !panel
                .drain_events()
                .contains(&UiEvent::FocusRequested(Field::AccessCode))
        );
    }

    #[test]
    fn test_server_refusal_demotes_to_anonymous() {
        let mock = Arc::new(service());
        let mut panel = ready_panel(&mock);
        panel.validate_code("FAM-2025").unwrap();
        mock.revoke_tokens();
        panel.comment_form_mut().mensaje = "Hola".to_owned();

        let err = panel.post_comment().unwrap_err();

        assert_eq!(err, CommentError::TokenExpired);
        assert_eq!(panel.tier(), None);
        assert!(!panel.has_session());
    }

    #[test]
    fn test_locally_expired_session_skips_network() {
        let mock = Arc::new(service());
        let store = Arc::new(MemorySessionStore::new());
        store.set(
            QR,
            AccessSession::new(
                "stale",
                Nivel::Cliente,
                [],
                Some(Utc::now() - TimeDelta::seconds(5)),
            ),
        );
        let service: Arc<dyn CommentService> = Arc::clone(&mock) as Arc<dyn CommentService>;
        let mut panel = CommentPanel::new(QR, service, Arc::clone(&store) as Arc<dyn SessionStore>);
        panel.initialize().unwrap();
        mock.clear_calls();
        panel.comment_form_mut().mensaje = "Hola".to_owned();

        let err = panel.post_comment().unwrap_err();

        assert_eq!(err, CommentError::TokenExpired);
        assert!(mock.calls().is_empty());
        assert!(store.get(QR).is_none());
    }

    #[test]
    fn test_like_updates_only_matching_item() {
        let mut parent = comment("c1", "Descanse en paz");
        parent.likes = 3;
        parent.respuestas.push(reply("r1", "Gracias"));
        let mut other = comment("c0", "Te extrañamos");
        other.likes = 8;
        let mock = Arc::new(service().with_comment(QR, other).with_comment(QR, parent));
        let mut panel = ready_panel(&mock);

        let likes = panel.like_item("r1").unwrap();

        assert_eq!(likes, 1);
        assert_eq!(panel.comments()[0].likes, 8);
        assert_eq!(panel.comments()[1].likes, 3);
        assert_eq!(panel.comments()[1].respuestas[0].likes, 1);
    }

    #[test]
    fn test_like_failure_changes_nothing() {
        let mut liked = comment("c1", "Descanse en paz");
        liked.likes = 3;
        let mock = Arc::new(service().with_comment(QR, liked));
        let mut panel = ready_panel(&mock);
        mock.fail(
            Operation::LikeItem,
            ServiceError::rejected("Demasiadas solicitudes"),
        );

        let err = panel.like_item("c1").unwrap_err();

        assert_eq!(err.user_message(), "Demasiadas solicitudes");
        assert_eq!(panel.comments()[0].likes, 3);
        assert!(panel.status().unwrap().dismiss_after.is_some());
    }

    #[test]
    fn test_load_page_two_appends_in_order() {
        let mut mock = service();
        for n in (1..=12).rev() {
            mock = mock.with_comment(QR, comment(&format!("c{n}"), "recuerdo"));
        }
        let mock = Arc::new(mock);
        let mut panel = ready_panel(&mock);
        let first_page = comment_ids(&panel);

        panel.load_comments(2).unwrap();

        let ids = comment_ids(&panel);
        assert_eq!(ids.len(), 12);
        assert_eq!(&ids[..10], &first_page[..]);
        assert_eq!(&ids[10..], &["c2".to_owned(), "c1".to_owned()]);
        let pagination = panel.pagination();
        assert_eq!(pagination.pagina_actual, 2);
        assert!(pagination.pagina_actual <= pagination.total_paginas);
        assert_eq!(pagination.total_comentarios, 12);
    }

    #[test]
    fn test_load_next_page_is_noop_on_last_page() {
        let mock = Arc::new(service().with_comment(QR, comment("c1", "uno")));
        let mut panel = ready_panel(&mock);

        panel.load_next_page().unwrap();

        assert_eq!(mock.count(Operation::ListComments), 0);
    }

    #[test]
    fn test_load_next_page_is_noop_while_loading() {
        let mut mock = service();
        for n in 0..15 {
            mock = mock.with_comment(QR, comment(&format!("c{n}"), "recuerdo"));
        }
        let mock = Arc::new(mock);
        let mut panel = ready_panel(&mock);
        let _pending = panel.begin_page_load(2).unwrap();

        panel.load_next_page().unwrap();

        assert_eq!(mock.count(Operation::ListComments), 0);
        assert!(panel.is_loading_page());
    }

    #[test]
    fn test_late_response_after_dispose_is_ignored() {
        let mock = Arc::new(service().with_comment(QR, comment("c1", "uno")));
        let mut panel = ready_panel(&mock);
        let ticket = panel.begin_page_load(1).unwrap();
        panel.dispose();

        let applied = panel
            .finish_page_load(
                ticket,
                Ok(CommentPage {
                    comentarios: vec![comment("late", "tarde")],
                    page: 1,
                    total_pages: 1,
                    total: 1,
                }),
            )
            .unwrap();

        assert!(!applied);
        assert_eq!(comment_ids(&panel), vec!["c1"]);
    }

    #[test]
    fn test_toggle_reply_form_discards_draft() {
        let mock = Arc::new(service());
        let mut panel = ready_panel(&mock);

        panel.toggle_reply_form("c1");
        panel.reply_input_mut().unwrap().mensaje = "borrador".to_owned();
        assert!(panel.toggle_reply_form("c2"));

        let form = panel.reply_form().unwrap();
        assert_eq!(form.comment_id, "c2");
        assert_eq!(form.input.mensaje, "");

        assert!(!panel.toggle_reply_form("c2"));
        assert!(panel.reply_form().is_none());
    }

    #[test]
    fn test_panels_share_session_store() {
        let mock = Arc::new(service());
        let store: Arc<dyn SessionStore> = Arc::new(MemorySessionStore::new());
        let service: Arc<dyn CommentService> = Arc::clone(&mock) as Arc<dyn CommentService>;
        let mut first = CommentPanel::new(QR, Arc::clone(&service), Arc::clone(&store));
        let second = CommentPanel::new(QR, service, store);

        first.validate_code("CLI-2025").unwrap();

        assert!(second.has_session());
        assert_eq!(second.tier(), Some(Nivel::Cliente));
    }

    #[test]
    fn test_mutations_refused_before_initialize() {
        let mock = Arc::new(service());
        let mut panel = panel_for(&mock);
        panel.comment_form_mut().mensaje = "Hola".to_owned();

        assert_eq!(panel.post_comment().unwrap_err(), CommentError::NotReady);
        assert!(mock.calls().is_empty());
    }
}
