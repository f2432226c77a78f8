//! Coded list editors for the history draft.
//!
//! Each list in the draft (antecedents, complementary tests, diagnoses, referrals) is edited
//! by building a draft entry and resolving it against the code tables. A draft whose code
//! does not resolve is rejected and the list is left as it was.

use crate::constants::{ESPECIALISTAS, FAMILIARES};
use crate::historia::{
    AntecedenteFamiliar, AntecedentePersonal, AyudaDiagnostica, Diagnostico,
    HistoriaClinicaData, Prioridad, Remision,
};
use chrono::NaiveDate;
use inder_codes::CodeTables;
use inder_files::AttachmentMetadata;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EntryError {
    #[error("{0}")]
    Required(&'static str),
    #[error("Primero busque el código {tabla} para verificar ({code} no encontrado)")]
    UnresolvedCode { tabla: &'static str, code: String },
    #[error("{value:?} no es una opción válida para {campo}")]
    InvalidOption { campo: &'static str, value: String },
    #[error("no entry at index {index} (list has {len})")]
    IndexOutOfRange { index: usize, len: usize },
}

/// An item stored in one of the draft's lists.
pub trait ListEntry: Sized {
    fn list(data: &HistoriaClinicaData) -> &[Self];
    fn list_mut(data: &mut HistoriaClinicaData) -> &mut Vec<Self>;
}

/// User input for a new list item, checked against the code tables.
pub trait EntryDraft {
    type Entry: ListEntry;

    /// # Errors
    ///
    /// Returns `EntryError` when a required value is missing or a code does not resolve.
    fn resolve(self, codes: &CodeTables) -> Result<Self::Entry, EntryError>;
}

/// Resolves `draft` and appends it to its list.
pub fn add<D: EntryDraft>(
    data: &mut HistoriaClinicaData,
    draft: D,
    codes: &CodeTables,
) -> Result<usize, EntryError> {
    let entry = draft.resolve(codes)?;
    let list = D::Entry::list_mut(data);
    list.push(entry);
    Ok(list.len() - 1)
}

/// Removes the item at `index`, keeping the order of the rest.
pub fn remove<E: ListEntry>(data: &mut HistoriaClinicaData, index: usize) -> Result<E, EntryError> {
    let list = E::list_mut(data);
    if index >= list.len() {
        return Err(EntryError::IndexOutOfRange {
            index,
            len: list.len(),
        });
    }
    Ok(list.remove(index))
}

impl ListEntry for AntecedentePersonal {
    fn list(data: &HistoriaClinicaData) -> &[Self] {
        &data.antecedentes_personales
    }
    fn list_mut(data: &mut HistoriaClinicaData) -> &mut Vec<Self> {
        &mut data.antecedentes_personales
    }
}

impl ListEntry for AntecedenteFamiliar {
    fn list(data: &HistoriaClinicaData) -> &[Self] {
        &data.antecedentes_familiares
    }
    fn list_mut(data: &mut HistoriaClinicaData) -> &mut Vec<Self> {
        &mut data.antecedentes_familiares
    }
}

impl ListEntry for AyudaDiagnostica {
    fn list(data: &HistoriaClinicaData) -> &[Self] {
        &data.ayudas_diagnosticas
    }
    fn list_mut(data: &mut HistoriaClinicaData) -> &mut Vec<Self> {
        &mut data.ayudas_diagnosticas
    }
}

impl ListEntry for Diagnostico {
    fn list(data: &HistoriaClinicaData) -> &[Self] {
        &data.diagnosticos
    }
    fn list_mut(data: &mut HistoriaClinicaData) -> &mut Vec<Self> {
        &mut data.diagnosticos
    }
}

impl ListEntry for Remision {
    fn list(data: &HistoriaClinicaData) -> &[Self] {
        &data.plan.remisiones_especialistas
    }
    fn list_mut(data: &mut HistoriaClinicaData) -> &mut Vec<Self> {
        &mut data.plan.remisiones_especialistas
    }
}

fn resolve_cie11(codes: &CodeTables, raw: &str) -> Result<(String, String), EntryError> {
    let code = raw.trim().to_uppercase();
    if code.is_empty() {
        return Err(EntryError::Required("Ingrese un código CIE-11"));
    }
    match codes.cie11().lookup(&code) {
        Some(name) => Ok((code, name.to_string())),
        None => Err(EntryError::UnresolvedCode {
            tabla: "CIE-11",
            code,
        }),
    }
}

fn pick_option(campo: &'static str, options: &[&str], value: &str) -> Result<String, EntryError> {
    let wanted = value.trim();
    options
        .iter()
        .find(|option| option.to_lowercase() == wanted.to_lowercase())
        .map(|option| (*option).to_string())
        .ok_or_else(|| EntryError::InvalidOption {
            campo,
            value: wanted.to_string(),
        })
}

#[derive(Debug, Clone, Default)]
pub struct AntecedentePersonalDraft {
    pub codigo: String,
    pub observaciones: String,
}

impl EntryDraft for AntecedentePersonalDraft {
    type Entry = AntecedentePersonal;

    fn resolve(self, codes: &CodeTables) -> Result<Self::Entry, EntryError> {
        let (codigo_cie11, nombre_enfermedad) = resolve_cie11(codes, &self.codigo)?;
        Ok(AntecedentePersonal {
            codigo_cie11,
            nombre_enfermedad,
            observaciones: self.observaciones.trim().to_string(),
        })
    }
}

#[derive(Debug, Clone, Default)]
pub struct AntecedenteFamiliarDraft {
    pub codigo: String,
    pub familiar: String,
    pub observaciones: String,
}

impl EntryDraft for AntecedenteFamiliarDraft {
    type Entry = AntecedenteFamiliar;

    fn resolve(self, codes: &CodeTables) -> Result<Self::Entry, EntryError> {
        let (codigo_cie11, nombre_enfermedad) = resolve_cie11(codes, &self.codigo)?;
        if self.familiar.trim().is_empty() {
            return Err(EntryError::Required("Seleccione el familiar afectado"));
        }
        let familiar = pick_option("familiar", FAMILIARES, &self.familiar)?;
        Ok(AntecedenteFamiliar {
            codigo_cie11,
            nombre_enfermedad,
            familiar,
            observaciones: self.observaciones.trim().to_string(),
        })
    }
}

#[derive(Debug, Clone, Default)]
pub struct DiagnosticoDraft {
    pub codigo: String,
    pub observaciones: String,
}

impl EntryDraft for DiagnosticoDraft {
    type Entry = Diagnostico;

    fn resolve(self, codes: &CodeTables) -> Result<Self::Entry, EntryError> {
        let (codigo, nombre) = resolve_cie11(codes, &self.codigo)?;
        Ok(Diagnostico {
            codigo,
            nombre,
            observaciones: self.observaciones.trim().to_string(),
        })
    }
}

/// A complementary test. Name and category come from the CUPS table.
#[derive(Debug, Clone, Default)]
pub struct AyudaDiagnosticaDraft {
    pub codigo_cups: String,
    pub resultado: String,
    pub archivos: Vec<AttachmentMetadata>,
}

impl EntryDraft for AyudaDiagnosticaDraft {
    type Entry = AyudaDiagnostica;

    fn resolve(self, codes: &CodeTables) -> Result<Self::Entry, EntryError> {
        if self.codigo_cups.trim().is_empty() {
            return Err(EntryError::Required("Ingrese un código CUPS"));
        }
        let entry = codes
            .cups()
            .lookup(&self.codigo_cups)
            .ok_or_else(|| EntryError::UnresolvedCode {
                tabla: "CUPS",
                code: self.codigo_cups.trim().to_string(),
            })?;

        Ok(AyudaDiagnostica {
            categoria: entry.category.clone(),
            nombre_prueba: entry.name.clone(),
            codigo_cups: entry.code.clone(),
            resultado: self.resultado.trim().to_string(),
            archivos_adjuntos: self.archivos,
        })
    }
}

/// Interconsultation (normal priority) or referral (urgent).
#[derive(Debug, Clone)]
pub struct RemisionDraft {
    pub especialista: String,
    pub motivo: String,
    pub prioridad: Prioridad,
    /// Defaults to today when `None`.
    pub fecha: Option<NaiveDate>,
}

impl RemisionDraft {
    pub fn interconsulta(especialista: impl Into<String>, motivo: impl Into<String>) -> Self {
        Self {
            especialista: especialista.into(),
            motivo: motivo.into(),
            prioridad: Prioridad::Normal,
            fecha: None,
        }
    }

    pub fn remision(especialista: impl Into<String>, motivo: impl Into<String>) -> Self {
        Self {
            prioridad: Prioridad::Urgente,
            ..Self::interconsulta(especialista, motivo)
        }
    }

    pub fn with_fecha(mut self, fecha: NaiveDate) -> Self {
        self.fecha = Some(fecha);
        self
    }
}

impl EntryDraft for RemisionDraft {
    type Entry = Remision;

    fn resolve(self, _codes: &CodeTables) -> Result<Self::Entry, EntryError> {
        if self.especialista.trim().is_empty() || self.motivo.trim().is_empty() {
            return Err(EntryError::Required(
                "Complete todos los campos de interconsulta/remisión",
            ));
        }
        Ok(Remision {
            especialista: pick_option("especialista", ESPECIALISTAS, &self.especialista)?,
            motivo: self.motivo.trim().to_string(),
            prioridad: self.prioridad,
            fecha_remision: self
                .fecha
                .unwrap_or_else(|| chrono::Local::now().date_naive()),
        })
    }
}
