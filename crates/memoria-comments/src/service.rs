//! Remote comment service contracts.
//!
//! The panels depend only on these traits. The `memoria-client` crate provides
//! the HTTP implementation; the `mock` feature provides an in-memory one.
//!
//! Every call is blocking. Hosts that need to stay responsive run calls off
//! the UI thread and feed page results back through
//! [`CommentPanel::finish_page_load`](crate::CommentPanel::finish_page_load).

use crate::error::ServiceError;
use crate::types::{
    CommentConfiguration, CommentPage, GeneratedCodes, MemorialCodes, ModerationSettings,
    NewComment, ValidatedAccess,
};

/// Public comment operations, keyed by the memorial's public identifier.
pub trait CommentService: Send + Sync {
    /// Fetch the public comment settings.
    fn get_configuration(&self, memorial_id: &str) -> Result<CommentConfiguration, ServiceError>;

    /// Fetch one page of comments, newest first.
    fn list_comments(
        &self,
        memorial_id: &str,
        page: u32,
        page_size: u32,
    ) -> Result<CommentPage, ServiceError>;

    /// Exchange an access code for a short-lived token.
    fn validate_code(&self, memorial_id: &str, code: &str)
    -> Result<ValidatedAccess, ServiceError>;

    /// Post a top-level comment.
    fn create_comment(
        &self,
        memorial_id: &str,
        comment: &NewComment,
        token: Option<&str>,
    ) -> Result<(), ServiceError>;

    /// Post a reply under `comment_id`.
    fn create_reply(
        &self,
        memorial_id: &str,
        comment_id: &str,
        reply: &NewComment,
        token: Option<&str>,
    ) -> Result<(), ServiceError>;

    /// Increment the like counter of a comment or reply.
    ///
    /// Returns the new count as stored by the server.
    fn like_item(&self, memorial_id: &str, item_id: &str) -> Result<u64, ServiceError>;
}

/// Administrator operations, keyed by the memorial's internal identifier.
pub trait ModerationService: Send + Sync {
    /// Fetch the current comment settings.
    fn get_settings(&self, memorial_id: &str) -> Result<CommentConfiguration, ServiceError>;

    /// Fetch the access codes stored on the memorial record.
    fn get_memorial_codes(&self, memorial_id: &str) -> Result<MemorialCodes, ServiceError>;

    /// Fetch one page of comments with audit fields.
    fn list_admin_comments(
        &self,
        memorial_id: &str,
        page: u32,
        page_size: u32,
    ) -> Result<CommentPage, ServiceError>;

    /// Persist codes, enablement and visitor message in one call.
    fn save_configuration(
        &self,
        memorial_id: &str,
        settings: &ModerationSettings,
    ) -> Result<ModerationSettings, ServiceError>;

    /// Generate fresh values for both codes (not persisted until saved).
    fn generate_codes(&self, memorial_id: &str) -> Result<GeneratedCodes, ServiceError>;

    /// Generate a fresh client code (not persisted until saved).
    fn generate_client_code(&self, memorial_id: &str) -> Result<String, ServiceError>;

    /// Delete a comment (with its replies) or a single reply.
    fn delete_comment(&self, comment_id: &str) -> Result<(), ServiceError>;
}
