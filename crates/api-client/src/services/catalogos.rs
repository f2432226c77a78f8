//! Reference catalogs (document types, sexes, athlete states, appointment types and states).
//!
//! The five catalogs are fetched once at start-up into an immutable [`Catalogos`] and read
//! from there afterwards.

use crate::{ApiClient, ApiResult};
use inder_core::models::CatalogoItem;
use serde::Deserialize;
use uuid::Uuid;

/// A catalog as listed by `GET /catalogos/`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CatalogoResumen {
    pub id: Uuid,
    pub nombre: String,
}

/// `/catalogos` endpoints.
pub struct CatalogosApi<'a> {
    pub(crate) client: &'a ApiClient,
}

impl CatalogosApi<'_> {
    pub async fn list(&self) -> ApiResult<Vec<CatalogoResumen>> {
        self.client.get("/catalogos/").await
    }

    /// Items of the catalog named `nombre`.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::NotFound` for an unknown catalog.
    pub async fn items(&self, nombre: &str) -> ApiResult<Vec<CatalogoItem>> {
        self.client
            .get(&format!("/catalogos/{nombre}/items"))
            .await
    }

    /// Fetches every catalog concurrently. Fails if any one of them fails.
    pub async fn load_all(&self) -> ApiResult<Catalogos> {
        let (tipo_documento, sexo, estado_deportista, tipo_cita, estado_cita) = tokio::try_join!(
            self.items("tipo_documento"),
            self.items("sexo"),
            self.items("estado_deportista"),
            self.items("tipo_cita"),
            self.items("estado_cita"),
        )?;

        let catalogos = Catalogos {
            tipo_documento,
            sexo,
            estado_deportista,
            tipo_cita,
            estado_cita,
        };
        tracing::debug!(items = catalogos.len(), "catalogs loaded");
        Ok(catalogos)
    }
}

/// The catalogs, loaded once.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Catalogos {
    pub tipo_documento: Vec<CatalogoItem>,
    pub sexo: Vec<CatalogoItem>,
    pub estado_deportista: Vec<CatalogoItem>,
    pub tipo_cita: Vec<CatalogoItem>,
    pub estado_cita: Vec<CatalogoItem>,
}

impl Catalogos {
    /// Catalog by name, as used in the URL.
    pub fn get(&self, nombre: &str) -> Option<&[CatalogoItem]> {
        let items = match nombre {
            "tipo_documento" => &self.tipo_documento,
            "sexo" => &self.sexo,
            "estado_deportista" => &self.estado_deportista,
            "tipo_cita" => &self.tipo_cita,
            "estado_cita" => &self.estado_cita,
            _ => return None,
        };
        Some(items)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &[CatalogoItem])> {
        [
            ("tipo_documento", self.tipo_documento.as_slice()),
            ("sexo", self.sexo.as_slice()),
            ("estado_deportista", self.estado_deportista.as_slice()),
            ("tipo_cita", self.tipo_cita.as_slice()),
            ("estado_cita", self.estado_cita.as_slice()),
        ]
        .into_iter()
    }

    /// Total number of items across catalogs.
    pub fn len(&self) -> usize {
        self.iter().map(|(_, items)| items.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Display name of any catalog item.
    pub fn nombre(&self, id: Uuid) -> Option<&str> {
        self.iter()
            .flat_map(|(_, items)| items.iter())
            .find(|item| item.id == id)
            .map(|item| item.nombre.as_str())
    }

    /// Item of catalog `catalogo` whose name matches `nombre`, ignoring case.
    pub fn by_nombre(&self, catalogo: &str, nombre: &str) -> Option<&CatalogoItem> {
        let wanted = nombre.trim().to_lowercase();
        self.get(catalogo)?
            .iter()
            .find(|item| item.nombre.to_lowercase() == wanted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(nombre: &str) -> CatalogoItem {
        CatalogoItem {
            id: Uuid::new_v4(),
            catalogo_id: None,
            codigo: None,
            nombre: nombre.into(),
            activo: true,
        }
    }

    #[test]
    fn test_lookups() {
        let programada = item("Programada");
        let catalogos = Catalogos {
            estado_cita: vec![programada.clone(), item("Cancelada")],
            sexo: vec![item("Femenino")],
            ..Default::default()
        };

        assert_eq!(catalogos.len(), 3);
        assert_eq!(catalogos.nombre(programada.id), Some("Programada"));
        assert_eq!(
            catalogos.by_nombre("estado_cita", "programada").map(|i| i.id),
            Some(programada.id)
        );
        assert!(catalogos.by_nombre("sexo", "Programada").is_none());
        assert!(catalogos.get("deportes").is_none());
    }
}
