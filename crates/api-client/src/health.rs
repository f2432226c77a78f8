use crate::{ApiClient, ApiResult};
use reqwest::Method;
use serde::Deserialize;

/// Answer of `GET /health`, served at the server root rather than under `/api/v1`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    #[serde(default)]
    pub app: Option<String>,
    #[serde(default)]
    pub environment: Option<String>,
}

impl HealthStatus {
    pub fn is_ok(&self) -> bool {
        self.status.eq_ignore_ascii_case("ok")
    }
}

impl ApiClient {
    pub async fn health(&self) -> ApiResult<HealthStatus> {
        self.fetch("GET /health", self.root_request(Method::GET, "/health"))
            .await
    }
}
