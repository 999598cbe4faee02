//! Administrator operations.

use memoria_comments::{
    CommentConfiguration, CommentPage, GeneratedCodes, MemorialCodes, ModerationService,
    ModerationSettings, ServiceError,
};
use tracing::info;

use super::{HttpCommentService, read_response, segment};
use crate::error::ClientError;
use crate::types::{
    Ack, ClientCodeResponse, ConfigResponse, GeneratedCodesResponse, ListResponse,
    MemorialResponse, SaveResponse, SaveSettingsBody,
};

impl HttpCommentService {
    fn admin_memorial_url(&self, memorial_id: &str) -> String {
        format!(
            "{}/comentarios/admin/memorial/{}",
            self.api_url(),
            segment(memorial_id)
        )
    }

    fn admin_item_url(&self, comment_id: &str) -> String {
        format!("{}/comentarios/admin/{}", self.api_url(), segment(comment_id))
    }

    fn admin_get<T: serde::de::DeserializeOwned>(&self, url: &str) -> Result<T, ClientError> {
        let auth_header = self.admin_auth()?;
        let response = self
            .agent
            .get(url)
            .header("Authorization", &auth_header)
            .header("Accept", "application/json")
            .call()?;
        read_response(response)
    }

    fn admin_post<T: serde::de::DeserializeOwned>(&self, url: &str) -> Result<T, ClientError> {
        let auth_header = self.admin_auth()?;
        let response = self
            .agent
            .post(url)
            .header("Authorization", &auth_header)
            .header("Accept", "application/json")
            .send_empty()?;
        read_response(response)
    }

    /// Store codes, enabled flag and message in one call.
    pub(crate) fn put_settings(
        &self,
        memorial_id: &str,
        settings: &ModerationSettings,
    ) -> Result<ModerationSettings, ClientError> {
        let auth_header = self.admin_auth()?;
        let url = format!("{}/config", self.admin_memorial_url(memorial_id));

        info!("Saving comment settings for memorial {}", memorial_id);

        let response = self
            .agent
            .put(&url)
            .header("Authorization", &auth_header)
            .header("Accept", "application/json")
            .send_json(SaveSettingsBody::from(settings))?;

        let wire: SaveResponse = read_response(response)?;
        Ok(wire.into_settings(settings))
    }

    /// Delete a comment or reply by id.
    pub(crate) fn delete_item(&self, comment_id: &str) -> Result<(), ClientError> {
        let auth_header = self.admin_auth()?;
        let url = self.admin_item_url(comment_id);

        info!("Deleting comment {}", comment_id);

        let response = self
            .agent
            .delete(&url)
            .header("Authorization", &auth_header)
            .header("Accept", "application/json")
            .call()?;

        let _: Ack = read_response(response)?;
        Ok(())
    }
}

impl ModerationService for HttpCommentService {
    fn get_settings(&self, memorial_id: &str) -> Result<CommentConfiguration, ServiceError> {
        info!("Getting admin comment settings for memorial {}", memorial_id);
        let url = format!("{}/config", self.admin_memorial_url(memorial_id));
        let wire: ConfigResponse = self.admin_get(&url)?;
        Ok(wire.config)
    }

    fn get_memorial_codes(&self, memorial_id: &str) -> Result<MemorialCodes, ServiceError> {
        info!("Getting memorial {}", memorial_id);
        let url = format!("{}/memoriales/{}", self.api_url(), segment(memorial_id));
        let wire: MemorialResponse = self.admin_get(&url)?;
        Ok(wire.into())
    }

    fn list_admin_comments(
        &self,
        memorial_id: &str,
        page: u32,
        page_size: u32,
    ) -> Result<CommentPage, ServiceError> {
        info!(
            "Getting admin comments page {} for memorial {}",
            page, memorial_id
        );
        let url = format!(
            "{}?page={}&limit={}",
            self.admin_memorial_url(memorial_id),
            page,
            page_size
        );
        let wire: ListResponse = self.admin_get(&url)?;
        Ok(wire.into_page(page))
    }

    fn save_configuration(
        &self,
        memorial_id: &str,
        settings: &ModerationSettings,
    ) -> Result<ModerationSettings, ServiceError> {
        Ok(self.put_settings(memorial_id, settings)?)
    }

    fn generate_codes(&self, memorial_id: &str) -> Result<GeneratedCodes, ServiceError> {
        info!("Generating access codes for memorial {}", memorial_id);
        let url = format!("{}/generar-codigos", self.admin_memorial_url(memorial_id));
        let wire: GeneratedCodesResponse = self.admin_post(&url)?;
        Ok(wire.into())
    }

    fn generate_client_code(&self, memorial_id: &str) -> Result<String, ServiceError> {
        info!("Generating client code for memorial {}", memorial_id);
        let url = format!(
            "{}/generar-codigo-cliente",
            self.admin_memorial_url(memorial_id)
        );
        let wire: ClientCodeResponse = self.admin_post(&url)?;
        Ok(wire.codigo_cliente)
    }

    fn delete_comment(&self, comment_id: &str) -> Result<(), ServiceError> {
        Ok(self.delete_item(comment_id)?)
    }
}
