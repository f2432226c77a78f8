use crate::{ApiClient, ApiResult};
use inder_core::models::{server_datetime, HistoriaResumen};
use inder_core::HistoriaSubmission;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Answer of `POST /historias_clinicas/completa`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoriaCreada {
    pub historia_clinica_id: Uuid,
    pub deportista_id: Uuid,
    #[serde(default)]
    pub fecha_apertura: Option<NaiveDate>,
    #[serde(default, with = "server_datetime")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub message: Option<String>,
}

/// `/historias_clinicas` endpoints.
pub struct Historias<'a> {
    pub(crate) client: &'a ApiClient,
}

impl Historias<'_> {
    pub async fn list(&self) -> ApiResult<Vec<HistoriaResumen>> {
        self.client.get("/historias_clinicas/").await
    }

    /// Histories of one athlete, taken from the full list.
    pub async fn by_deportista(&self, deportista_id: Uuid) -> ApiResult<Vec<HistoriaResumen>> {
        let mut historias = self.list().await?;
        historias.retain(|h| h.deportista_id == deportista_id);
        Ok(historias)
    }

    /// History header as returned by the server, for display.
    pub async fn get(&self, id: Uuid) -> ApiResult<serde_json::Value> {
        self.client.get(&format!("/historias_clinicas/{id}")).await
    }

    /// The full history with every section, for display.
    pub async fn completa(&self, id: Uuid) -> ApiResult<serde_json::Value> {
        self.client
            .get(&format!("/historias_clinicas/{id}/completa"))
            .await
    }

    /// Submits a finished wizard draft. Call once per draft.
    pub async fn crear_completa(&self, submission: &HistoriaSubmission) -> ApiResult<HistoriaCreada> {
        tracing::info!(deportista_id = %submission.deportista_id, "submitting medical history");
        let creada: HistoriaCreada = self
            .client
            .post("/historias_clinicas/completa", submission)
            .await?;
        tracing::info!(historia_id = %creada.historia_clinica_id, "medical history created");
        Ok(creada)
    }

    pub async fn delete(&self, id: Uuid) -> ApiResult<()> {
        self.client
            .delete(&format!("/historias_clinicas/{id}"))
            .await
    }
}
