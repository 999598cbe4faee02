//! Error types for the HTTP client.

use memoria_comments::ServiceError;

use crate::types::envelope_message;

/// Error from comment API operations.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// HTTP request failed (network error, timeout, etc).
    #[error("HTTP request failed")]
    HttpRequest(#[from] ureq::Error),

    /// HTTP response error (server returned error status).
    #[error("HTTP error: {status} - {body}")]
    HttpResponse {
        /// HTTP status code.
        status: u16,
        /// Response body (may contain error details).
        body: String,
    },

    /// JSON serialization/deserialization error.
    #[error("JSON error")]
    Json(#[from] serde_json::Error),

    /// Server answered `{"success": false}`.
    #[error("request rejected: {}", message.as_deref().unwrap_or("(no message)"))]
    Rejected {
        /// Server-supplied message.
        message: Option<String>,
    },

    /// Moderation call attempted without an administrator token.
    #[error("administrator token not configured")]
    MissingAdminToken,
}

impl From<ClientError> for ServiceError {
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::HttpRequest(e) => Self::Transport(e.to_string()),
            ClientError::Json(e) => Self::Transport(format!("invalid response: {e}")),
            ClientError::HttpResponse {
                status: 401 | 403,
                body,
            } => Self::Unauthorized {
                message: envelope_message(&body),
            },
            ClientError::HttpResponse { status, body } if status >= 500 => Self::Server {
                status,
                message: envelope_message(&body),
            },
            ClientError::HttpResponse { body, .. } => Self::Rejected {
                message: envelope_message(&body),
            },
            ClientError::Rejected { message } => Self::Rejected { message },
            ClientError::MissingAdminToken => Self::Unauthorized { message: None },
        }
    }
}
