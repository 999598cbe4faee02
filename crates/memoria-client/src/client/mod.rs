//! Comment API client.
//!
//! Provides sync HTTP client for the memorial comment API. Public calls carry
//! the visitor's access token when one is held; moderation calls carry the
//! administrator token.

mod comments;
mod moderation;
#[cfg(test)]
mod test_server;

use std::time::Duration;

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use serde::de::DeserializeOwned;
use ureq::Agent;
use ureq::http::Response;

use crate::error::ClientError;
use crate::types::parse_envelope;

/// Default HTTP timeout in seconds.
const DEFAULT_TIMEOUT: u64 = 30;

/// Everything but `A-Z a-z 0-9 - _ ~`. `.` stays encoded so an id can never
/// form a `..` segment.
const PATH_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC.remove(b'-').remove(b'_').remove(b'~');

/// HTTP implementation of `CommentService` and `ModerationService`.
pub struct HttpCommentService {
    agent: Agent,
    base_url: String,
    admin_token: Option<String>,
}

impl HttpCommentService {
    /// Create client for the server at `base_url`.
    pub fn new(base_url: &str) -> Self {
        Self::with_timeout(base_url, Duration::from_secs(DEFAULT_TIMEOUT))
    }

    /// Create client with a custom per-request timeout.
    pub fn with_timeout(base_url: &str, timeout: Duration) -> Self {
        let agent = Agent::config_builder()
            .timeout_global(Some(timeout))
            .http_status_as_error(false)
            .build()
            .into();

        Self {
            agent,
            base_url: base_url.trim_end_matches('/').to_owned(),
            admin_token: None,
        }
    }

    /// Attach the administrator token used by moderation calls.
    #[must_use]
    pub fn with_admin_token(mut self, token: impl Into<String>) -> Self {
        self.admin_token = Some(token.into()).filter(|t| !t.is_empty());
        self
    }

    /// Get the API base URL.
    fn api_url(&self) -> String {
        format!("{}/api", self.base_url)
    }

    /// Authorization header value for moderation calls.
    fn admin_auth(&self) -> Result<String, ClientError> {
        self.admin_token
            .as_deref()
            .map(bearer)
            .ok_or(ClientError::MissingAdminToken)
    }
}

/// Percent-encode an identifier for use as one URL path segment.
fn segment(id: &str) -> String {
    utf8_percent_encode(id, PATH_SEGMENT).to_string()
}

fn bearer(token: &str) -> String {
    format!("Bearer {token}")
}

/// Check the status and decode the envelope payload.
fn read_response<T: DeserializeOwned>(response: Response<ureq::Body>) -> Result<T, ClientError> {
    let status = response.status().as_u16();
    let mut body_reader = response.into_body();

    if status >= 400 {
        let error_body = body_reader
            .read_to_string()
            .unwrap_or_else(|_| "(unable to read error body)".to_owned());
        return Err(ClientError::HttpResponse {
            status,
            body: error_body,
        });
    }

    let body = body_reader.read_to_string()?;
    if body.trim().is_empty() {
        // 204 and friends: success without an envelope.
        return parse_envelope("{}");
    }
    parse_envelope(&body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_api_url_strips_trailing_slash() {
        let client = HttpCommentService::new("https://memoria.example/");
        assert_eq!(client.api_url(), "https://memoria.example/api");
    }

    #[test]
    fn test_admin_auth_requires_token() {
        let client = HttpCommentService::new("http://localhost:3000");
        assert!(matches!(
            client.admin_auth(),
            Err(ClientError::MissingAdminToken)
        ));

        let client = client.with_admin_token("secret");
        assert_eq!(client.admin_auth().unwrap(), "Bearer secret");
    }

    #[test]
    fn test_segment_encodes_reserved_characters() {
        assert_eq!(segment("qr-ana_2025~x"), "qr-ana_2025~x");
        assert_eq!(segment("abc/../admin#x"), "abc%2F%2E%2E%2Fadmin%23x");
        assert_eq!(segment("a b?c"), "a%20b%3Fc");
        assert_eq!(segment(".."), "%2E%2E");
    }

    #[test]
    fn test_empty_admin_token_is_ignored() {
        let client = HttpCommentService::new("http://localhost:3000").with_admin_token("");
        assert!(client.admin_auth().is_err());
    }
}
