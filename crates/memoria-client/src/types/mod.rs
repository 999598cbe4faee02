//! Wire types for the comment API.
//!
//! Every response is wrapped in `{"success": bool, ...payload | "message"}`.
//! Payload types here are private to the client; they are mapped into the
//! normalized `memoria_comments` records before leaving the crate.

mod access;
mod admin;
mod comment;

use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::error::ClientError;

pub(crate) use access::{ConfigResponse, LikeResponse, ValidateBody, ValidateResponse};
pub(crate) use admin::{
    ClientCodeResponse, GeneratedCodesResponse, MemorialResponse, SaveResponse, SaveSettingsBody,
};
pub(crate) use comment::ListResponse;

/// Envelope fields shared by every response.
#[derive(Debug, Deserialize)]
struct Status {
    #[serde(default)]
    success: Option<bool>,
    #[serde(default)]
    message: Option<String>,
}

/// Parse a 2xx body, turning `success: false` into [`ClientError::Rejected`].
pub(crate) fn parse_envelope<T: DeserializeOwned>(body: &str) -> Result<T, ClientError> {
    let status: Status = serde_json::from_str(body)?;
    if status.success == Some(false) {
        return Err(ClientError::Rejected {
            message: status.message,
        });
    }
    Ok(serde_json::from_str(body)?)
}

/// Server message from an error body, if it is a JSON envelope.
pub(crate) fn envelope_message(body: &str) -> Option<String> {
    serde_json::from_str::<Status>(body)
        .ok()
        .and_then(|status| status.message)
        .filter(|message| !message.trim().is_empty())
}

/// Payload-free acknowledgement.
#[derive(Debug, Deserialize)]
pub(crate) struct Ack {}
