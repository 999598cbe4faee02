//! Error types for the comment panels and the service boundary.

use crate::signal::Field;

/// Message shown when the server fails without saying why.
pub const GENERIC_ERROR_MESSAGE: &str = "Ocurrió un error. Intente nuevamente.";

/// Failure reported by a [`CommentService`](crate::CommentService) or
/// [`ModerationService`](crate::ModerationService) implementation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ServiceError {
    /// Network failure or unreadable response.
    #[error("transport error: {0}")]
    Transport(String),

    /// Server answered with `success: false` or a 4xx status.
    #[error("request rejected: {}", message.as_deref().unwrap_or("(no message)"))]
    Rejected {
        /// Server-supplied, user-displayable message.
        message: Option<String>,
    },

    /// Server failed with a 5xx status.
    #[error("server error {status}: {}", message.as_deref().unwrap_or("(no message)"))]
    Server {
        /// HTTP status code.
        status: u16,
        /// Server-supplied message, if the body was an envelope.
        message: Option<String>,
    },

    /// Server refused the credentials (expired or unknown token).
    #[error("unauthorized: {}", message.as_deref().unwrap_or("(no message)"))]
    Unauthorized {
        /// Server-supplied, user-displayable message.
        message: Option<String>,
    },
}

impl ServiceError {
    /// Rejection carrying a server message.
    pub fn rejected(message: impl Into<String>) -> Self {
        Self::Rejected {
            message: Some(message.into()),
        }
    }

    /// Authorization failure carrying a server message.
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized {
            message: Some(message.into()),
        }
    }
}

/// Error surfaced by the panels and the access gate.
///
/// None of these are fatal: every variant is rendered as a status message and
/// prior panel state is left intact.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum CommentError {
    /// Local validation failure; never reaches the network.
    #[error("{field} cannot be empty")]
    EmptyInput {
        /// Input that was empty.
        field: Field,
    },

    /// Mutation attempted without a required access session.
    #[error("access code required")]
    AccessRequired,

    /// Stored token is stale or was refused by the server.
    #[error("access token expired")]
    TokenExpired,

    /// Validation endpoint rejected the submitted code.
    #[error("invalid access code: {message}")]
    InvalidCode {
        /// Server-supplied message.
        message: String,
    },

    /// Reply attempted without the `responder` permission.
    #[error("replying requires client access")]
    Forbidden,

    /// Network failure.
    #[error("transport error: {0}")]
    TransportError(String),

    /// Unexpected server-side failure.
    #[error("remote failure: {message}")]
    RemoteFailure {
        /// Server-supplied or generic message.
        message: String,
    },

    /// Comments are disabled for this memorial.
    #[error("comments are disabled")]
    Disabled,

    /// Configuration has not been loaded yet.
    #[error("comment configuration not loaded")]
    NotReady,
}

impl CommentError {
    /// Localized message suitable for the status line.
    pub fn user_message(&self) -> String {
        match self {
            Self::EmptyInput { field } => match field {
                Field::AccessCode => "Por favor ingrese un código".to_owned(),
                Field::CommentMessage => "Por favor escriba un mensaje".to_owned(),
                Field::ReplyMessage(_) => "Por favor escriba una respuesta".to_owned(),
            },
            Self::AccessRequired => {
                "Debe ingresar un código de acceso para comentar".to_owned()
            }
            Self::TokenExpired => {
                "Su acceso expiró. Ingrese el código nuevamente.".to_owned()
            }
            Self::InvalidCode { message } | Self::RemoteFailure { message } => message.clone(),
            Self::Forbidden => "Solo el cliente puede responder comentarios".to_owned(),
            Self::TransportError(_) => "No se pudo conectar con el servidor".to_owned(),
            Self::Disabled => "Los comentarios están deshabilitados".to_owned(),
            Self::NotReady => "Los comentarios aún se están cargando".to_owned(),
        }
    }

    /// Map a failed mutating call (post, reply).
    ///
    /// Authorization failures mean the token is no longer good.
    pub fn from_mutation(err: ServiceError) -> Self {
        match err {
            ServiceError::Unauthorized { .. } => Self::TokenExpired,
            other => Self::from(other),
        }
    }

    /// Map a failed code validation.
    ///
    /// Only a refused code is `InvalidCode`; 5xx and transport failures keep
    /// their own variants.
    pub fn from_validation(err: ServiceError) -> Self {
        match err {
            ServiceError::Rejected { message } | ServiceError::Unauthorized { message } => {
                Self::InvalidCode {
                    message: message.unwrap_or_else(|| "Código inválido".to_owned()),
                }
            }
            other => Self::from(other),
        }
    }
}

impl From<ServiceError> for CommentError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Transport(detail) => Self::TransportError(detail),
            ServiceError::Rejected { message }
            | ServiceError::Unauthorized { message }
            | ServiceError::Server { message, .. } => Self::RemoteFailure {
                message: message.unwrap_or_else(|| GENERIC_ERROR_MESSAGE.to_owned()),
            },
        }
    }
}
