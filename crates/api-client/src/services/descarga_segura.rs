//! Token-protected download of a history PDF.
//!
//! The links are meant for the athlete, so these endpoints take no session. The server
//! holds the token, the attempt counter and the expiry; the client only relays.

use crate::client::Download;
use crate::{ApiClient, ApiResult};
use inder_types::Cedula;
use reqwest::Method;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Answer of `GET info/{token}`.
///
/// An unknown or expired token is reported in the body with `valido: false`, not as an
/// error status.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TokenInfo {
    pub valido: bool,
    #[serde(default)]
    pub intentos_restantes: Option<u32>,
    /// Expiry as naive ISO-8601 UTC.
    #[serde(default)]
    pub expira_en: Option<String>,
    #[serde(default)]
    pub mensaje: Option<String>,
}

/// Answer of a successful `POST verificar`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Verificacion {
    pub success: bool,
    #[serde(default)]
    pub mensaje: Option<String>,
    #[serde(default)]
    pub historia_clinica_id: Option<Uuid>,
}

/// Answer of `POST generar-token/{historia_id}`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TokenGenerado {
    #[serde(default)]
    pub success: bool,
    pub token: String,
    #[serde(default)]
    pub url: Option<String>,
    /// Human lifetime, e.g. "2 horas".
    #[serde(default)]
    pub expira_en: Option<String>,
    #[serde(default)]
    pub mensaje: Option<String>,
}

#[derive(Debug, Serialize)]
struct VerificarBody<'a> {
    token: &'a str,
    cedula: &'a str,
}

/// `/descarga-segura` endpoints.
pub struct DescargaSegura<'a> {
    pub(crate) client: &'a ApiClient,
}

impl DescargaSegura<'_> {
    /// Creates a link for a history. Requires a clinician session.
    pub async fn generar_token(&self, historia_id: Uuid) -> ApiResult<TokenGenerado> {
        let path = format!("/descarga-segura/generar-token/{historia_id}");
        let endpoint = format!("POST {path}");
        let generado: TokenGenerado = self
            .client
            .fetch(&endpoint, self.client.request(Method::POST, &path))
            .await?;
        tracing::info!(%historia_id, "secure download link generated");
        Ok(generado)
    }

    pub async fn info(&self, token: &str) -> ApiResult<TokenInfo> {
        self.client
            .get(&format!("/descarga-segura/info/{token}"))
            .await
    }

    /// Checks the cédula against the history's owner. Every call spends one attempt.
    pub async fn verificar(&self, token: &str, cedula: &Cedula) -> ApiResult<Verificacion> {
        tracing::debug!(cedula = %cedula.masked(), "verifying secure download");
        self.client
            .post(
                "/descarga-segura/verificar",
                &VerificarBody {
                    token,
                    cedula: cedula.as_str(),
                },
            )
            .await
    }

    /// The PDF. Only allowed once the token has been verified.
    pub async fn descargar(&self, token: &str) -> ApiResult<Download> {
        let path = format!("/descarga-segura/descargar/{token}");
        self.client
            .download(
                "GET /descarga-segura/descargar",
                self.client.request(Method::GET, &path),
            )
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_info_decodes_both_shapes() {
        let valid: TokenInfo = serde_json::from_str(
            r#"{"valido": true, "intentos_restantes": 3, "expira_en": "2025-03-01T12:00:00"}"#,
        )
        .unwrap();
        assert!(valid.valido);
        assert_eq!(valid.intentos_restantes, Some(3));

        let invalid: TokenInfo =
            serde_json::from_str(r#"{"valido": false, "mensaje": "Enlace no válido"}"#).unwrap();
        assert!(!invalid.valido);
        assert_eq!(invalid.mensaje.as_deref(), Some("Enlace no válido"));
    }
}
