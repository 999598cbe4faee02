//! Public comment operations.

use memoria_comments::{
    CommentConfiguration, CommentPage, CommentService, NewComment, ServiceError, ValidatedAccess,
};
use tracing::info;

use super::{HttpCommentService, bearer, read_response, segment};
use crate::error::ClientError;
use crate::types::{Ack, ConfigResponse, LikeResponse, ListResponse, ValidateBody, ValidateResponse};

impl HttpCommentService {
    fn memorial_url(&self, memorial_id: &str) -> String {
        format!(
            "{}/comentarios/memorial/{}",
            self.api_url(),
            segment(memorial_id)
        )
    }

    fn comment_url(&self, comment_id: &str) -> String {
        format!("{}/comentarios/{}", self.api_url(), segment(comment_id))
    }

    /// Fetch the public comment settings.
    pub(crate) fn fetch_configuration(
        &self,
        memorial_id: &str,
    ) -> Result<CommentConfiguration, ClientError> {
        let url = format!("{}/config", self.memorial_url(memorial_id));

        info!("Getting comment configuration for memorial {}", memorial_id);

        let response = self
            .agent
            .get(&url)
            .header("Accept", "application/json")
            .call()?;

        let wire: ConfigResponse = read_response(response)?;
        Ok(wire.config)
    }

    /// Fetch one page of the public listing.
    pub(crate) fn fetch_comments(
        &self,
        memorial_id: &str,
        page: u32,
        page_size: u32,
    ) -> Result<CommentPage, ClientError> {
        let url = format!(
            "{}?page={}&limit={}",
            self.memorial_url(memorial_id),
            page,
            page_size
        );

        info!("Getting comments page {} for memorial {}", page, memorial_id);

        let response = self
            .agent
            .get(&url)
            .header("Accept", "application/json")
            .call()?;

        let wire: ListResponse = read_response(response)?;
        let page = wire.into_page(page);
        info!(
            "Found {} comments ({} total) for memorial {}",
            page.comentarios.len(),
            page.total,
            memorial_id
        );
        Ok(page)
    }

    /// Exchange an access code for a token.
    pub(crate) fn post_validation(
        &self,
        memorial_id: &str,
        code: &str,
    ) -> Result<ValidatedAccess, ClientError> {
        let url = format!("{}/validar", self.memorial_url(memorial_id));

        info!("Validating access code for memorial {}", memorial_id);

        let response = self
            .agent
            .post(&url)
            .header("Accept", "application/json")
            .send_json(ValidateBody { codigo: code })?;

        let wire: ValidateResponse = read_response(response)?;
        Ok(wire.into())
    }

    /// Post a comment or reply body to `url`.
    fn post_message(
        &self,
        url: &str,
        message: &NewComment,
        token: Option<&str>,
    ) -> Result<(), ClientError> {
        let mut request = self.agent.post(url).header("Accept", "application/json");
        if let Some(token) = token {
            request = request.header("Authorization", &bearer(token));
        }
        let response = request.send_json(message)?;

        let _: Ack = read_response(response)?;
        Ok(())
    }

    /// Increment a like counter.
    pub(crate) fn post_like(&self, item_id: &str) -> Result<u64, ClientError> {
        let url = format!("{}/like", self.comment_url(item_id));

        info!("Liking item {}", item_id);

        let response = self
            .agent
            .post(&url)
            .header("Accept", "application/json")
            .send_empty()?;

        let wire: LikeResponse = read_response(response)?;
        Ok(wire.likes)
    }
}

impl CommentService for HttpCommentService {
    fn get_configuration(&self, memorial_id: &str) -> Result<CommentConfiguration, ServiceError> {
        Ok(self.fetch_configuration(memorial_id)?)
    }

    fn list_comments(
        &self,
        memorial_id: &str,
        page: u32,
        page_size: u32,
    ) -> Result<CommentPage, ServiceError> {
        Ok(self.fetch_comments(memorial_id, page, page_size)?)
    }

    fn validate_code(
        &self,
        memorial_id: &str,
        code: &str,
    ) -> Result<ValidatedAccess, ServiceError> {
        Ok(self.post_validation(memorial_id, code)?)
    }

    fn create_comment(
        &self,
        memorial_id: &str,
        comment: &NewComment,
        token: Option<&str>,
    ) -> Result<(), ServiceError> {
        let url = self.memorial_url(memorial_id);
        info!("Posting comment on memorial {}", memorial_id);
        Ok(self.post_message(&url, comment, token)?)
    }

    fn create_reply(
        &self,
        memorial_id: &str,
        comment_id: &str,
        reply: &NewComment,
        token: Option<&str>,
    ) -> Result<(), ServiceError> {
        let url = format!("{}/respuestas", self.comment_url(comment_id));
        info!(
            "Posting reply to {} on memorial {}",
            comment_id, memorial_id
        );
        Ok(self.post_message(&url, reply, token)?)
    }

    fn like_item(&self, _memorial_id: &str, item_id: &str) -> Result<u64, ServiceError> {
        Ok(self.post_like(item_id)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::test_server::serve_once;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_memorial_id_stays_one_path_segment() {
        let (base_url, server) = serve_once(
            "200 OK",
            r#"{"success":true,"config":{"habilitados":true,"requiereCodigo":true}}"#,
        );
        let client = HttpCommentService::new(&base_url);

        client.get_configuration("abc/../../admin#x").unwrap();

        assert_eq!(
            server.join().unwrap(),
            "GET /api/comentarios/memorial/abc%2F%2E%2E%2F%2E%2E%2Fadmin%23x/config HTTP/1.1"
        );
    }

    #[test]
    fn test_server_error_on_validation_is_not_a_refusal() {
        let (base_url, server) = serve_once("500 Internal Server Error", "<html>boom</html>");
        let client = HttpCommentService::new(&base_url);

        let err = client.validate_code("qr1", "FAM-2025").unwrap_err();
        server.join().unwrap();

        assert_eq!(
            err,
            ServiceError::Server {
                status: 500,
                message: None
            }
        );
    }

    #[test]
    fn test_reply_url_encodes_comment_id() {
        let client = HttpCommentService::new("https://memoria.example");
        assert_eq!(
            format!("{}/respuestas", client.comment_url("c1?x=1")),
            "https://memoria.example/api/comentarios/c1%3Fx%3D1/respuestas"
        );
    }
}
