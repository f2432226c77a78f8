use crate::client::Download;
use crate::{ApiClient, ApiError, ApiResult};
use reqwest::Method;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Serialize)]
struct EnvioEmail<'a> {
    email: &'a str,
}

/// Answer of the e-mail endpoint.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct EnvioConfirmado {
    #[serde(default)]
    pub success: bool,
    #[serde(default, alias = "mensaje")]
    pub message: Option<String>,
}

/// `/documentos` endpoints: rendered documents.
pub struct Documentos<'a> {
    pub(crate) client: &'a ApiClient,
}

impl Documentos<'_> {
    /// The history rendered as PDF.
    ///
    /// Falls back to `historia_clinica_{id}.pdf` when the server sends no filename.
    pub async fn historia_pdf(&self, historia_id: Uuid) -> ApiResult<Download> {
        let path = format!("/documentos/{historia_id}/historia-clinica-pdf");
        let endpoint = format!("GET {path}");
        let mut download = self
            .client
            .download(&endpoint, self.client.request(Method::GET, &path))
            .await?;
        if download.filename.is_none() {
            download.filename = Some(format!("historia_clinica_{historia_id}.pdf"));
        }
        Ok(download)
    }

    /// Asks the server to e-mail the PDF to `destinatario`.
    pub async fn enviar_email(
        &self,
        historia_id: Uuid,
        destinatario: &str,
    ) -> ApiResult<EnvioConfirmado> {
        let destinatario = destinatario.trim();
        if !looks_like_email(destinatario) {
            return Err(ApiError::InvalidInput(format!(
                "'{destinatario}' is not an e-mail address"
            )));
        }
        self.client
            .post(
                &format!("/documentos/{historia_id}/enviar-email"),
                &EnvioEmail {
                    email: destinatario,
                },
            )
            .await
    }
}

fn looks_like_email(value: &str) -> bool {
    match value.split_once('@') {
        Some((user, domain)) => {
            !user.is_empty()
                && !value.contains(char::is_whitespace)
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
        }
        None => false,
    }
}
