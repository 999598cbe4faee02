//! CLI error types.

use memoria_comments::CommentError;
use memoria_config::ConfigError;

/// CLI error type.
#[derive(Debug, thiserror::Error)]
pub(crate) enum CliError {
    #[error("{0}")]
    Config(#[from] ConfigError),

    /// Rendered with the same Spanish message the panel shows.
    #[error("{}", .0.user_message())]
    Comment(#[from] CommentError),
}
