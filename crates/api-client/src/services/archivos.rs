use crate::client::Download;
use crate::{ApiClient, ApiResult};
use inder_core::models::ArchivoClinico;
use inder_files::InspectedFile;
use reqwest::multipart::{Form, Part};
use reqwest::Method;
use uuid::Uuid;

/// `/archivos` endpoints: files attached to a medical history.
pub struct Archivos<'a> {
    pub(crate) client: &'a ApiClient,
}

impl Archivos<'_> {
    pub async fn by_historia(&self, historia_id: Uuid) -> ApiResult<Vec<ArchivoClinico>> {
        self.client
            .get(&format!("/archivos/historia/{historia_id}"))
            .await
    }

    /// Uploads one inspected file under `categoria` (e.g. "Laboratorios").
    pub async fn upload(
        &self,
        historia_id: Uuid,
        categoria: &str,
        file: &InspectedFile,
    ) -> ApiResult<ArchivoClinico> {
        let part = Part::bytes(file.bytes.clone())
            .file_name(file.metadata.nombre.as_str().to_string())
            .mime_str(&file.metadata.tipo)?;
        let form = Form::new()
            .text("historia_id", historia_id.to_string())
            .text("categoria", categoria.to_string())
            .part("file", part);

        tracing::info!(
            %historia_id,
            categoria,
            size = file.metadata.tamano,
            "uploading attachment"
        );
        self.client
            .fetch(
                "POST /archivos/",
                self.client.request(Method::POST, "/archivos/").multipart(form),
            )
            .await
    }

    pub async fn descargar(&self, id: Uuid) -> ApiResult<Download> {
        let path = format!("/archivos/{id}/descargar");
        let endpoint = format!("GET {path}");
        self.client
            .download(&endpoint, self.client.request(Method::GET, &path))
            .await
    }

    pub async fn delete(&self, id: Uuid) -> ApiResult<()> {
        self.client.delete(&format!("/archivos/{id}")).await
    }
}
