//! Access-code gated comments for memorial pages.
//!
//! This crate holds the headless state machines behind a memorial's comment
//! section. Visitors read comments freely; posting requires an access code
//! that grants one of two tiers:
//!
//! - **familiar**: may post top-level comments
//! - **cliente**: may also reply to comments
//!
//! # Architecture
//!
//! The crate provides:
//! - [`CommentService`] and [`ModerationService`] traits for the remote API
//! - [`AccessGate`] turning a typed code into an [`AccessSession`], stored in
//!   an injected [`SessionStore`] shared by every panel
//! - [`CommentPanel`] for the public view and [`ModerationPanel`] for the
//!   administrator
//! - [`UiEvent`]s (status notices and focus requests) the host UI drains
//!   instead of the core touching any rendering primitive
//! - `MockCommentService` for testing (behind `mock` feature flag)
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use memoria_comments::{CommentPanel, MemorySessionStore};
//!
//! let store = Arc::new(MemorySessionStore::new());
//! let mut panel = CommentPanel::new("qr-ana", service, store);
//! panel.initialize()?;
//! panel.validate_code("FAM-2025")?;
//! panel.comment_form_mut().mensaje = "Descanse en paz".to_owned();
//! panel.post_comment()?;
//! ```

mod display;
mod error;
mod gate;
#[cfg(any(test, feature = "mock"))]
pub mod mock;
mod moderation;
mod pager;
mod panel;
mod service;
mod session;
mod signal;
mod types;

pub use display::{FECHA_PLACEHOLDER, format_fecha, format_fecha_in};
pub use error::{CommentError, GENERIC_ERROR_MESSAGE, ServiceError};
pub use gate::{AccessGate, DEFAULT_SESSION_TTL, SessionLookup};
pub use moderation::{
    ADMIN_PAGE_SIZE, DELETE_COMMENT_PROMPT, DELETE_REPLY_PROMPT, ModerationPanel,
};
pub use pager::{CommentPager, PageTicket};
pub use panel::{CommentPanel, DEFAULT_PAGE_SIZE, PanelState, ReplyForm};
pub use service::{CommentService, ModerationService};
pub use session::{AccessSession, MemorySessionStore, SessionStore};
pub use signal::{
    Confirm, Field, LONG_NOTICE_DISMISS, NOTICE_DISMISS, Notice, NoticeKind, UiEvent,
};
pub use types::{
    ANONYMOUS_NAME, Comment, CommentConfiguration, CommentInput, CommentPage, GeneratedCodes,
    MemorialCodes, ModerationSettings, NewComment, Nivel, Pagination, Permiso, Relacion, Reply,
    ValidatedAccess,
};
