//! Moderation payloads.
//!
//! The server names the family code `codigoComentarios` and the enabled flag
//! `comentariosHabilitados`; the mapping below renames them.

use memoria_comments::{GeneratedCodes, MemorialCodes, ModerationSettings};
use serde::{Deserialize, Serialize};

/// Memorial record, reduced to the stored access codes.
///
/// The record arrives under `memorial`, under `data`, or at the top level.
#[derive(Debug, Deserialize)]
pub(crate) struct MemorialResponse {
    #[serde(default)]
    memorial: Option<WireCodes>,
    #[serde(default)]
    data: Option<WireCodes>,
    #[serde(flatten)]
    top_level: WireCodes,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireCodes {
    #[serde(default)]
    codigo_comentarios: Option<String>,
    #[serde(default)]
    codigo_cliente: Option<String>,
}

impl From<MemorialResponse> for MemorialCodes {
    fn from(wire: MemorialResponse) -> Self {
        let codes = wire.memorial.or(wire.data).unwrap_or(wire.top_level);
        Self {
            codigo_familiar: codes.codigo_comentarios.filter(|c| !c.is_empty()),
            codigo_cliente: codes.codigo_cliente.filter(|c| !c.is_empty()),
        }
    }
}

/// Save request body.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SaveSettingsBody<'a> {
    codigo_comentarios: &'a str,
    codigo_cliente: &'a str,
    comentarios_habilitados: bool,
    mensaje: &'a str,
}

impl<'a> From<&'a ModerationSettings> for SaveSettingsBody<'a> {
    fn from(settings: &'a ModerationSettings) -> Self {
        Self {
            codigo_comentarios: &settings.codigo_familiar,
            codigo_cliente: &settings.codigo_cliente,
            comentarios_habilitados: settings.habilitados,
            mensaje: &settings.mensaje,
        }
    }
}

/// Save response; the stored config is echoed back when the server has it.
#[derive(Debug, Deserialize)]
pub(crate) struct SaveResponse {
    #[serde(default)]
    config: Option<WireSavedConfig>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireSavedConfig {
    #[serde(default)]
    codigo_comentarios: Option<String>,
    #[serde(default)]
    codigo_cliente: Option<String>,
    #[serde(default)]
    comentarios_habilitados: Option<bool>,
    #[serde(default)]
    mensaje: Option<String>,
}

impl SaveResponse {
    /// Stored settings, filling gaps from what was sent.
    pub(crate) fn into_settings(self, sent: &ModerationSettings) -> ModerationSettings {
        let Some(config) = self.config else {
            return sent.clone();
        };
        ModerationSettings {
            codigo_familiar: config
                .codigo_comentarios
                .unwrap_or_else(|| sent.codigo_familiar.clone()),
            codigo_cliente: config
                .codigo_cliente
                .unwrap_or_else(|| sent.codigo_cliente.clone()),
            habilitados: config.comentarios_habilitados.unwrap_or(sent.habilitados),
            mensaje: config.mensaje.unwrap_or_else(|| sent.mensaje.clone()),
        }
    }
}

/// Both generated codes.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GeneratedCodesResponse {
    codigo_comentarios: String,
    codigo_cliente: String,
}

impl From<GeneratedCodesResponse> for GeneratedCodes {
    fn from(wire: GeneratedCodesResponse) -> Self {
        Self {
            codigo_familiar: wire.codigo_comentarios,
            codigo_cliente: wire.codigo_cliente,
        }
    }
}

/// Generated client code.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ClientCodeResponse {
    pub(crate) codigo_cliente: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::parse_envelope;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_memorial_codes_under_memorial_key() {
        let wire: MemorialResponse = parse_envelope(
            r#"{"success":true,"memorial":{"nombre":"Ana","codigoComentarios":"FAM-2025","codigoCliente":""}}"#,
        )
        .unwrap();

        assert_eq!(
            MemorialCodes::from(wire),
            MemorialCodes {
                codigo_familiar: Some("FAM-2025".to_owned()),
                codigo_cliente: None,
            }
        );
    }

    #[test]
    fn test_memorial_codes_at_top_level() {
        let wire: MemorialResponse =
            parse_envelope(r#"{"codigoComentarios":"FAM-1","codigoCliente":"CLI-1"}"#).unwrap();

        let codes = MemorialCodes::from(wire);
        assert_eq!(codes.codigo_familiar.as_deref(), Some("FAM-1"));
        assert_eq!(codes.codigo_cliente.as_deref(), Some("CLI-1"));
    }

    #[test]
    fn test_save_body_uses_server_field_names() {
        let settings = ModerationSettings {
            codigo_familiar: "FAM-1".to_owned(),
            codigo_cliente: "CLI-1".to_owned(),
            habilitados: true,
            mensaje: "Bienvenidos".to_owned(),
        };

        let json = serde_json::to_value(SaveSettingsBody::from(&settings)).unwrap();

        assert_eq!(
            json,
            serde_json::json!({
                "codigoComentarios": "FAM-1",
                "codigoCliente": "CLI-1",
                "comentariosHabilitados": true,
                "mensaje": "Bienvenidos",
            })
        );
    }

    #[test]
    fn test_save_response_falls_back_to_sent_values() {
        let sent = ModerationSettings {
            codigo_familiar: "FAM-1".to_owned(),
            codigo_cliente: "CLI-1".to_owned(),
            habilitados: true,
            mensaje: String::new(),
        };
        let wire: SaveResponse = parse_envelope(
            r#"{"success":true,"config":{"comentariosHabilitados":false}}"#,
        )
        .unwrap();

        let saved = wire.into_settings(&sent);

        assert!(!saved.habilitados);
        assert_eq!(saved.codigo_familiar, "FAM-1");
    }
}
