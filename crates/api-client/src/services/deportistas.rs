use crate::client::Download;
use crate::envelope::Page;
use crate::{ApiClient, ApiError, ApiResult};
use inder_core::models::{Deportista, DeportistaCreate, DeportistaUpdate, Vacuna, VacunaCreate};
use inder_files::InspectedFile;
use reqwest::multipart::{Form, Part};
use reqwest::Method;
use uuid::Uuid;

/// Shortest query the search endpoint accepts.
pub const MIN_SEARCH_CHARS: usize = 2;

/// `/deportistas` endpoints.
pub struct Deportistas<'a> {
    pub(crate) client: &'a ApiClient,
}

impl Deportistas<'_> {
    /// One page of athletes.
    ///
    /// The backend returns the full list; it is paginated here.
    pub async fn list(&self, page: usize, page_size: usize) -> ApiResult<Page<Deportista>> {
        let all: Vec<Deportista> = self.client.get("/deportistas").await?;
        Ok(Page::paginate(all, page, page_size))
    }

    pub async fn all(&self) -> ApiResult<Vec<Deportista>> {
        self.client.get("/deportistas").await
    }

    pub async fn get(&self, id: Uuid) -> ApiResult<Deportista> {
        self.client.get(&format!("/deportistas/{id}")).await
    }

    /// Searches by name, surname or document number.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::InvalidInput` for queries shorter than [`MIN_SEARCH_CHARS`]
    /// without calling the server.
    pub async fn search(&self, q: &str) -> ApiResult<Vec<Deportista>> {
        let q = q.trim();
        if q.chars().count() < MIN_SEARCH_CHARS {
            return Err(ApiError::InvalidInput(format!(
                "search needs at least {MIN_SEARCH_CHARS} characters"
            )));
        }
        self.client
            .get_query("/deportistas/search", &[("q", q)])
            .await
    }

    pub async fn create(&self, data: &DeportistaCreate) -> ApiResult<Deportista> {
        self.client.post("/deportistas", data).await
    }

    /// # Errors
    ///
    /// Returns `ApiError::InvalidInput` if `data` changes nothing.
    pub async fn update(&self, id: Uuid, data: &DeportistaUpdate) -> ApiResult<Deportista> {
        if data.is_empty() {
            return Err(ApiError::InvalidInput("nothing to update".into()));
        }
        self.client.put(&format!("/deportistas/{id}"), data).await
    }

    pub async fn delete(&self, id: Uuid) -> ApiResult<()> {
        self.client.delete(&format!("/deportistas/{id}")).await
    }

    pub async fn vacunas(&self, id: Uuid) -> ApiResult<Vec<Vacuna>> {
        self.client.get(&format!("/deportistas/{id}/vacunas")).await
    }

    pub async fn crear_vacuna(&self, id: Uuid, data: &VacunaCreate) -> ApiResult<Vacuna> {
        self.client
            .post(&format!("/deportistas/{id}/vacunas"), data)
            .await
    }

    /// Attaches a certificate file to a vaccination record.
    pub async fn subir_archivo_vacuna(
        &self,
        id: Uuid,
        vacuna_id: Uuid,
        file: &InspectedFile,
    ) -> ApiResult<serde_json::Value> {
        let path = format!("/deportistas/{id}/vacunas/{vacuna_id}/archivo");
        let part = Part::bytes(file.bytes.clone())
            .file_name(file.metadata.nombre.as_str().to_string())
            .mime_str(&file.metadata.tipo)?;
        let form = Form::new().part("file", part);

        let endpoint = format!("POST {path}");
        self.client
            .fetch(&endpoint, self.client.request(Method::POST, &path).multipart(form))
            .await
    }

    pub async fn descargar_archivo_vacuna(&self, id: Uuid, vacuna_id: Uuid) -> ApiResult<Download> {
        let path = format!("/deportistas/{id}/vacunas/{vacuna_id}/archivo");
        let endpoint = format!("GET {path}");
        self.client
            .download(&endpoint, self.client.request(Method::GET, &path))
            .await
    }

    pub async fn eliminar_vacuna(&self, id: Uuid, vacuna_id: Uuid) -> ApiResult<()> {
        self.client
            .delete(&format!("/deportistas/{id}/vacunas/{vacuna_id}"))
            .await
    }
}
