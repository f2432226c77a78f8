use crate::{ApiClient, ApiError, ApiResult};
use inder_core::models::{Cita, CitaCreate, CitaDelDia, CitaUpdate};
use uuid::Uuid;

/// `/citas` endpoints.
pub struct Citas<'a> {
    pub(crate) client: &'a ApiClient,
}

impl Citas<'_> {
    /// One page of appointments, paginated by the server.
    pub async fn list(&self, page: usize, page_size: usize) -> ApiResult<Vec<Cita>> {
        if page == 0 || page_size == 0 {
            return Err(ApiError::InvalidInput(
                "page and page_size start at 1".into(),
            ));
        }
        self.client
            .get_query("/citas/", &[("page", page), ("page_size", page_size)])
            .await
    }

    pub async fn get(&self, id: Uuid) -> ApiResult<Cita> {
        self.client.get(&format!("/citas/{id}")).await
    }

    pub async fn by_deportista(&self, deportista_id: Uuid) -> ApiResult<Vec<Cita>> {
        self.client
            .get(&format!("/citas/deportista/{deportista_id}"))
            .await
    }

    pub async fn create(&self, data: &CitaCreate) -> ApiResult<Cita> {
        self.client.post("/citas/", data).await
    }

    pub async fn update(&self, id: Uuid, data: &CitaUpdate) -> ApiResult<Cita> {
        self.client.put(&format!("/citas/{id}"), data).await
    }

    pub async fn delete(&self, id: Uuid) -> ApiResult<()> {
        self.client.delete(&format!("/citas/{id}")).await
    }

    /// Athletes with an appointment today.
    pub async fn deportistas_con_citas_hoy(&self) -> ApiResult<Vec<CitaDelDia>> {
        self.client
            .get("/citas/deportistas-con-citas-hoy")
            .await
    }
}
