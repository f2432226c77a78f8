//! # API Client
//!
//! Async client for the INDER clinical-records REST API.
//!
//! [`ApiClient`] owns the HTTP connection pool, the base URL and the bearer token taken
//! from the [`Session`](inder_core::Session). Endpoints are grouped into services borrowed
//! from it:
//!
//! ```no_run
//! # async fn run(client: api_client::ApiClient) -> api_client::ApiResult<()> {
//! let catalogos = client.catalogos().load_all().await?;
//! let hoy = client.citas().deportistas_con_citas_hoy().await?;
//! # let _ = (catalogos, hoy);
//! # Ok(())
//! # }
//! ```
//!
//! Every body is decoded strictly into a typed model; a mismatch is reported with the JSON
//! path that failed. Non-success statuses become [`ApiError`] with the server's `detail`.
//! Nothing is retried.

mod client;
pub mod envelope;
mod error;
mod health;
pub mod secure_download;
pub mod services;
pub mod share;

pub use client::{filename_from_disposition, sanitise_filename, ApiClient, Download};
pub use envelope::Page;
pub use error::{ApiError, ApiResult};
pub use health::HealthStatus;
pub use secure_download::{DownloadState, SecureDownload};

/// The catalog cache, loaded once through [`ApiClient::catalogos`].
pub mod catalogos {
    pub use crate::services::catalogos::{Catalogos, CatalogoResumen};
}

use services::archivos::Archivos;
use services::catalogos::CatalogosApi;
use services::citas::Citas;
use services::deportistas::Deportistas;
use services::descarga_segura::DescargaSegura;
use services::documentos::Documentos;
use services::historias::Historias;

impl ApiClient {
    pub fn deportistas(&self) -> Deportistas<'_> {
        Deportistas { client: self }
    }

    pub fn historias(&self) -> Historias<'_> {
        Historias { client: self }
    }

    pub fn citas(&self) -> Citas<'_> {
        Citas { client: self }
    }

    pub fn catalogos(&self) -> CatalogosApi<'_> {
        CatalogosApi { client: self }
    }

    pub fn archivos(&self) -> Archivos<'_> {
        Archivos { client: self }
    }

    pub fn documentos(&self) -> Documentos<'_> {
        Documentos { client: self }
    }

    pub fn descarga_segura(&self) -> DescargaSegura<'_> {
        DescargaSegura { client: self }
    }

    /// Starts the athlete-facing flow for `token`.
    pub fn secure_download(&self, token: impl Into<String>) -> SecureDownload<'_> {
        SecureDownload::new(self, token)
    }
}
