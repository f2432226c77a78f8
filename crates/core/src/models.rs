//! Backend resources used outside the wizard.
//!
//! These mirror the JSON the REST backend returns. Required fields are required here too, so
//! a response missing one fails to decode instead of producing a half-filled value. Fields
//! the client does not use are ignored.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Athlete record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Deportista {
    pub id: Uuid,
    pub tipo_documento_id: Uuid,
    pub numero_documento: String,
    pub nombres: String,
    pub apellidos: String,
    pub fecha_nacimiento: NaiveDate,
    pub sexo_id: Uuid,
    #[serde(default)]
    pub telefono: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub direccion: Option<String>,
    #[serde(default)]
    pub tipo_deporte: Option<String>,
    pub estado_id: Uuid,
    #[serde(default, with = "server_datetime")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Deportista {
    pub fn nombre_completo(&self) -> String {
        format!("{} {}", self.nombres.trim(), self.apellidos.trim())
    }

    /// Age in whole years on `today`.
    pub fn edad(&self, today: NaiveDate) -> u32 {
        today.years_since(self.fecha_nacimiento).unwrap_or(0)
    }
}

/// Body of `POST /deportistas`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DeportistaCreate {
    pub tipo_documento_id: Uuid,
    pub numero_documento: String,
    pub nombres: String,
    pub apellidos: String,
    pub fecha_nacimiento: NaiveDate,
    pub sexo_id: Uuid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub telefono: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub direccion: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tipo_deporte: Option<String>,
    pub estado_id: Uuid,
}

/// Body of `PUT /deportistas/{id}`. Absent fields are left unchanged by the server.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DeportistaUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub numero_documento: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nombres: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub apellidos: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fecha_nacimiento: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub telefono: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub direccion: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tipo_deporte: Option<String>,
}

impl DeportistaUpdate {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

/// Minimal `{id, nombre}` reference to a catalog item embedded in other resources.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogoRef {
    pub id: Uuid,
    pub nombre: String,
}

/// One entry of a reference catalog (document types, sexes, appointment states, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogoItem {
    pub id: Uuid,
    #[serde(default)]
    pub catalogo_id: Option<Uuid>,
    #[serde(default)]
    pub codigo: Option<String>,
    pub nombre: String,
    #[serde(default = "default_true")]
    pub activo: bool,
}

fn default_true() -> bool {
    true
}

/// Appointment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cita {
    pub id: Uuid,
    pub deportista_id: Uuid,
    pub fecha: NaiveDate,
    pub hora: NaiveTime,
    pub tipo_cita_id: Uuid,
    pub estado_cita_id: Uuid,
    #[serde(default)]
    pub observaciones: Option<String>,
    #[serde(default, with = "server_datetime")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub tipo_cita: Option<CatalogoRef>,
    #[serde(default)]
    pub estado_cita: Option<CatalogoRef>,
}

/// Body of `POST /citas/`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CitaCreate {
    pub deportista_id: Uuid,
    pub fecha: NaiveDate,
    pub hora: NaiveTime,
    pub tipo_cita_id: Uuid,
    pub estado_cita_id: Uuid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub observaciones: Option<String>,
}

/// Body of `PUT /citas/{id}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CitaUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fecha: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hora: Option<NaiveTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tipo_cita_id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estado_cita_id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub observaciones: Option<String>,
}

/// Row of `GET /citas/deportistas-con-citas-hoy`: an athlete plus today's appointment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CitaDelDia {
    pub id: Uuid,
    pub numero_documento: String,
    pub nombres: String,
    pub apellidos: String,
    #[serde(default)]
    pub tipo_deporte: Option<String>,
    #[serde(default)]
    pub cita_hora: Option<NaiveTime>,
    pub cita_tipo: String,
    pub cita_deporte: String,
    pub cita_estado: String,
}

/// Athlete summary embedded in history listings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeportistaResumen {
    pub id: Uuid,
    pub nombres: String,
    pub apellidos: String,
    pub numero_documento: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub telefono: Option<String>,
}

/// Row of `GET /historias_clinicas/`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoriaResumen {
    pub id: Uuid,
    pub deportista_id: Uuid,
    #[serde(default)]
    pub fecha_apertura: Option<NaiveDate>,
    #[serde(default, with = "server_datetime")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub deportista: Option<DeportistaResumen>,
}

/// File stored against a medical history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArchivoClinico {
    pub id: Uuid,
    pub historia_id: Uuid,
    pub nombre_original: String,
    pub tipo_archivo: String,
    #[serde(default)]
    pub categoria: Option<String>,
    pub ruta: String,
    #[serde(with = "server_datetime::required")]
    pub fecha_subida: DateTime<Utc>,
}

/// Vaccination record of an athlete.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vacuna {
    pub id: Uuid,
    pub deportista_id: Uuid,
    pub nombre_vacuna: String,
    #[serde(default)]
    pub fecha_administracion: Option<NaiveDate>,
    #[serde(default)]
    pub observaciones: Option<String>,
    #[serde(default)]
    pub nombre_archivo: Option<String>,
    #[serde(default)]
    pub tipo_archivo: Option<String>,
    #[serde(default)]
    pub ruta_archivo: Option<String>,
    #[serde(default, with = "server_datetime")]
    pub created_at: Option<DateTime<Utc>>,
}

/// Body of `POST /deportistas/{id}/vacunas`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VacunaCreate {
    pub nombre_vacuna: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fecha_administracion: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub observaciones: Option<String>,
}

/// Parses a timestamp as the backend writes it.
///
/// The backend emits naive ISO-8601 values in UTC (`2025-01-10T14:03:00.123456`); values
/// with an explicit offset are accepted too.
pub fn parse_server_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f"))
        .ok()
        .map(|naive| naive.and_utc())
}

/// Serde adapter for optional backend timestamps.
pub mod server_datetime {
    use super::parse_server_timestamp;
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &Option<DateTime<Utc>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(value) => serializer.serialize_some(&value.to_rfc3339()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        match raw {
            None => Ok(None),
            Some(raw) => parse_server_timestamp(&raw)
                .map(Some)
                .ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp {raw:?}"))),
        }
    }

    /// Same parsing for a timestamp that must be present.
    pub mod required {
        use super::parse_server_timestamp;
        use chrono::{DateTime, Utc};
        use serde::{Deserialize, Deserializer, Serializer};

        pub fn serialize<S>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
        where
            S: Serializer,
        {
            serializer.serialize_str(&value.to_rfc3339())
        }

        pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
        where
            D: Deserializer<'de>,
        {
            let raw = String::deserialize(deserializer)?;
            parse_server_timestamp(&raw)
                .ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp {raw:?}")))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn deportista_json() -> serde_json::Value {
        json!({
            "id": "6f1c2a9e-1b7e-4a51-9b3a-1f6f8f0c2d11",
            "tipo_documento_id": "1a0e6a44-4a57-4f0e-9d1c-6e2f5b1c0a01",
            "numero_documento": "1098765432",
            "nombres": "Laura",
            "apellidos": "Gómez",
            "fecha_nacimiento": "2004-03-15",
            "sexo_id": "2b1f7b55-5b68-4a1f-8e2d-7f3a6c2d1b02",
            "telefono": null,
            "tipo_deporte": "Atletismo",
            "estado_id": "3c2a8c66-6c79-4b2a-9f3e-8a4b7d3e2c03",
            "created_at": "2025-01-10T14:03:00.123456",
            "updated_at": "2025-01-10T14:03:00"
        })
    }

    #[test]
    fn test_deportista_decodes_backend_shape() {
        let deportista: Deportista = serde_json::from_value(deportista_json()).unwrap();
        assert_eq!(deportista.nombre_completo(), "Laura Gómez");
        assert_eq!(deportista.tipo_deporte.as_deref(), Some("Atletismo"));
        assert!(deportista.created_at.is_some());
        assert_eq!(
            deportista.edad(NaiveDate::from_ymd_opt(2025, 3, 14).unwrap()),
            20
        );
    }

    #[test]
    fn test_deportista_requires_documento() {
        let mut value = deportista_json();
        value.as_object_mut().unwrap().remove("numero_documento");
        assert!(serde_json::from_value::<Deportista>(value).is_err());
    }

    #[test]
    fn test_cita_decodes_time_and_refs() {
        let cita: Cita = serde_json::from_value(json!({
            "id": "6f1c2a9e-1b7e-4a51-9b3a-1f6f8f0c2d11",
            "deportista_id": "6f1c2a9e-1b7e-4a51-9b3a-1f6f8f0c2d12",
            "fecha": "2025-02-01",
            "hora": "09:30:00",
            "tipo_cita_id": "6f1c2a9e-1b7e-4a51-9b3a-1f6f8f0c2d13",
            "estado_cita_id": "6f1c2a9e-1b7e-4a51-9b3a-1f6f8f0c2d14",
            "observaciones": null,
            "created_at": null,
            "estado_cita": {"id": "6f1c2a9e-1b7e-4a51-9b3a-1f6f8f0c2d14", "nombre": "Programada"}
        }))
        .unwrap();
        assert_eq!(cita.hora, NaiveTime::from_hms_opt(9, 30, 0).unwrap());
        assert_eq!(cita.estado_cita.unwrap().nombre, "Programada");
        assert!(cita.tipo_cita.is_none());
    }

    #[test]
    fn test_cita_create_serialises_wire_formats() {
        let create = CitaCreate {
            deportista_id: Uuid::nil(),
            fecha: NaiveDate::from_ymd_opt(2025, 2, 1).unwrap(),
            hora: NaiveTime::from_hms_opt(14, 0, 0).unwrap(),
            tipo_cita_id: Uuid::nil(),
            estado_cita_id: Uuid::nil(),
            observaciones: None,
        };
        let value = serde_json::to_value(&create).unwrap();
        assert_eq!(value["fecha"], "2025-02-01");
        assert_eq!(value["hora"], "14:00:00");
        assert!(value.get("observaciones").is_none());
    }

    #[test]
    fn test_parse_server_timestamp_variants() {
        let naive = parse_server_timestamp("2025-01-10T14:03:00").unwrap();
        let offset = parse_server_timestamp("2025-01-10T09:03:00-05:00").unwrap();
        assert_eq!(naive, offset);
        assert!(parse_server_timestamp("yesterday").is_none());
    }

    #[test]
    fn test_update_is_empty() {
        assert!(DeportistaUpdate::default().is_empty());
        let update = DeportistaUpdate {
            telefono: Some("3001234567".into()),
            ..Default::default()
        };
        assert!(!update.is_empty());
    }
}
