//! HTTP client for the Memoria comment API.
//!
//! [`HttpCommentService`] implements both `memoria_comments` service traits
//! over a blocking `ureq` agent. Responses are unwrapped from the server's
//! `{success, ...}` envelope and normalized into the core records, so the
//! panels never see wire field spellings.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use memoria_client::HttpCommentService;
//! use memoria_comments::{CommentPanel, MemorySessionStore};
//!
//! let service = Arc::new(HttpCommentService::new("http://localhost:3000"));
//! let mut panel = CommentPanel::new("qr-ana", service, Arc::new(MemorySessionStore::new()));
//! panel.initialize()?;
//! ```

mod client;
mod error;
mod types;

pub use client::HttpCommentService;
pub use error::ClientError;
