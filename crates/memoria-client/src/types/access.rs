//! Public configuration, code validation and like payloads.

use memoria_comments::{CommentConfiguration, Nivel, Permiso, ValidatedAccess};
use serde::{Deserialize, Serialize};

/// Comment settings response.
#[derive(Debug, Deserialize)]
pub(crate) struct ConfigResponse {
    pub(crate) config: CommentConfiguration,
}

/// Code validation request body.
#[derive(Debug, Serialize)]
pub(crate) struct ValidateBody<'a> {
    pub(crate) codigo: &'a str,
}

/// Code validation response.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ValidateResponse {
    token: String,
    nivel: Nivel,
    #[serde(default)]
    permisos: Vec<String>,
    #[serde(default)]
    expires_in: Option<u64>,
}

impl From<ValidateResponse> for ValidatedAccess {
    fn from(wire: ValidateResponse) -> Self {
        let permisos = wire
            .permisos
            .iter()
            .filter_map(|permiso| match permiso.as_str() {
                "comentar" => Some(Permiso::Comentar),
                "responder" => Some(Permiso::Responder),
                _ => None,
            })
            .collect();
        Self {
            token: wire.token,
            nivel: wire.nivel,
            permisos,
            expires_in: wire.expires_in,
        }
    }
}

/// Like response carrying the stored count.
#[derive(Debug, Deserialize)]
pub(crate) struct LikeResponse {
    pub(crate) likes: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::parse_envelope;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_validate_response_maps_known_permissions() {
        let wire: ValidateResponse = parse_envelope(
            r#"{"success":true,"token":"t1","nivel":"cliente","permisos":["comentar","responder","moderar"],"expiresIn":90}"#,
        )
        .unwrap();

        assert_eq!(
            ValidatedAccess::from(wire),
            ValidatedAccess {
                token: "t1".to_owned(),
                nivel: Nivel::Cliente,
                permisos: vec![Permiso::Comentar, Permiso::Responder],
                expires_in: Some(90),
            }
        );
    }

    #[test]
    fn test_config_response_defaults_requiere_codigo() {
        let wire: ConfigResponse =
            parse_envelope(r#"{"success":true,"config":{"habilitados":true}}"#).unwrap();

        assert!(wire.config.habilitados);
        assert!(wire.config.requiere_codigo);
        assert_eq!(wire.config.mensaje, None);
    }
}
