//! Signals from the panels to the host UI.
//!
//! The panels never touch rendering primitives. They queue [`UiEvent`]s
//! (focus requests, notices) which the host drains after each action, and
//! keep the current status line so a host timer can dismiss it.

use std::fmt;
use std::time::{Duration, Instant};

/// Auto-dismiss delay for ordinary notices.
pub const NOTICE_DISMISS: Duration = Duration::from_secs(3);

/// Auto-dismiss delay for multi-line notices (generated codes).
pub const LONG_NOTICE_DISMISS: Duration = Duration::from_secs(5);

/// Input field the host can focus.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Field {
    /// Access code input of the validation form.
    AccessCode,
    /// Message input of the comment form.
    CommentMessage,
    /// Message input of the reply form open under the given comment.
    ReplyMessage(String),
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AccessCode => f.write_str("access code"),
            Self::CommentMessage => f.write_str("comment message"),
            Self::ReplyMessage(id) => write!(f, "reply message for {id}"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Error,
}

/// Status message shown to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub text: String,
    /// `None` keeps the notice until the next action.
    pub dismiss_after: Option<Duration>,
    pub shown_at: Instant,
}

impl Notice {
    fn new(kind: NoticeKind, text: impl Into<String>, dismiss_after: Option<Duration>) -> Self {
        Self {
            kind,
            text: text.into(),
            dismiss_after,
            shown_at: Instant::now(),
        }
    }

    pub fn success(text: impl Into<String>) -> Self {
        Self::new(NoticeKind::Success, text, Some(NOTICE_DISMISS))
    }

    /// Success notice that stays up longer, for multi-line confirmations.
    pub fn success_long(text: impl Into<String>) -> Self {
        Self::new(NoticeKind::Success, text, Some(LONG_NOTICE_DISMISS))
    }

    /// Error notice that persists until the next action.
    pub fn error(text: impl Into<String>) -> Self {
        Self::new(NoticeKind::Error, text, None)
    }

    /// Error notice that auto-dismisses.
    pub fn error_transient(text: impl Into<String>) -> Self {
        Self::new(NoticeKind::Error, text, Some(NOTICE_DISMISS))
    }

    pub fn is_error(&self) -> bool {
        self.kind == NoticeKind::Error
    }

    /// Whether the notice should be gone at `now`.
    pub fn is_expired(&self, now: Instant) -> bool {
        self.dismiss_after
            .is_some_and(|after| now.saturating_duration_since(self.shown_at) >= after)
    }
}

/// Event for the host UI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiEvent {
    /// Return keyboard focus to the given input.
    FocusRequested(Field),
    /// Show a status message.
    Notice(Notice),
}

/// Interactive confirmation for irreversible actions.
pub trait Confirm {
    /// Ask the user; `true` means proceed.
    fn confirm(&self, prompt: &str) -> bool;
}

impl<F> Confirm for F
where
    F: Fn(&str) -> bool,
{
    fn confirm(&self, prompt: &str) -> bool {
        self(prompt)
    }
}

/// Status line plus pending events, embedded in each panel.
#[derive(Debug, Default)]
pub(crate) struct Signals {
    status: Option<Notice>,
    events: Vec<UiEvent>,
}

impl Signals {
    pub(crate) fn notify(&mut self, notice: Notice) {
        self.status = Some(notice.clone());
        self.events.push(UiEvent::Notice(notice));
    }

    pub(crate) fn focus(&mut self, field: Field) {
        self.events.push(UiEvent::FocusRequested(field));
    }

    /// Drop the current status at the start of a new action.
    pub(crate) fn clear_status(&mut self) {
        self.status = None;
    }

    pub(crate) fn status(&self) -> Option<&Notice> {
        self.status.as_ref()
    }

    pub(crate) fn drain(&mut self) -> Vec<UiEvent> {
        std::mem::take(&mut self.events)
    }

    pub(crate) fn dismiss_expired(&mut self, now: Instant) {
        if self.status.as_ref().is_some_and(|n| n.is_expired(now)) {
            self.status = None;
        }
    }
}
