//! The seven-step medical-history wizard.
//!
//! A [`Wizard`] owns one draft for one athlete. Moving forward runs the current step's
//! validation and stays put when it fails; moving back is always allowed. Nothing is
//! persisted between steps and nothing is sent to the server from here: [`Wizard::finish`]
//! only builds the submission payload.

use crate::editors::{self, EntryDraft, EntryError, ListEntry};
use crate::historia::{
    BodySystem, EstadoSistema, HistoriaClinicaData, HistoriaPatch, HistoriaSubmission,
    SistemasCorporales, TipoAlergia,
};
use crate::validation::{self, FieldIssue, Seccion, StepValidationError};
use crate::{alergias, CoreResult};
use inder_codes::CodeTables;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Step {
    Evaluacion,
    Antecedentes,
    RevisionSistemas,
    ExploracionFisica,
    PruebasComplementarias,
    Diagnostico,
    PlanTratamiento,
}

impl Step {
    pub const ALL: [Step; 7] = [
        Step::Evaluacion,
        Step::Antecedentes,
        Step::RevisionSistemas,
        Step::ExploracionFisica,
        Step::PruebasComplementarias,
        Step::Diagnostico,
        Step::PlanTratamiento,
    ];

    /// 1-based position.
    pub fn number(self) -> u8 {
        match self {
            Step::Evaluacion => 1,
            Step::Antecedentes => 2,
            Step::RevisionSistemas => 3,
            Step::ExploracionFisica => 4,
            Step::PruebasComplementarias => 5,
            Step::Diagnostico => 6,
            Step::PlanTratamiento => 7,
        }
    }

    pub fn from_number(number: u8) -> Option<Self> {
        Step::ALL.into_iter().find(|step| step.number() == number)
    }

    pub fn title(self) -> &'static str {
        match self {
            Step::Evaluacion => "Evaluación",
            Step::Antecedentes => "Antecedentes Médicos",
            Step::RevisionSistemas => "Revisión de Sistemas",
            Step::ExploracionFisica => "Exploración Física",
            Step::PruebasComplementarias => "Pruebas Complementarias",
            Step::Diagnostico => "Diagnóstico",
            Step::PlanTratamiento => "Plan de Tratamiento",
        }
    }

    /// The following step; the last step returns itself.
    pub fn next(self) -> Self {
        Step::from_number(self.number() + 1).unwrap_or(self)
    }

    /// The preceding step; the first step returns itself.
    pub fn previous(self) -> Self {
        Step::from_number(self.number().saturating_sub(1)).unwrap_or(self)
    }

    pub fn is_last(self) -> bool {
        self == Step::PlanTratamiento
    }
}

impl std::fmt::Display for Step {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Paso {}: {}", self.number(), self.title())
    }
}

/// Step navigation over one history draft.
#[derive(Debug, Clone)]
pub struct Wizard {
    deportista_id: Uuid,
    step: Step,
    data: HistoriaClinicaData,
}

impl Wizard {
    pub fn new(deportista_id: Uuid) -> Self {
        Self::with_data(deportista_id, HistoriaClinicaData::new())
    }

    /// Starts at step 1 over an existing draft.
    pub fn with_data(deportista_id: Uuid, data: HistoriaClinicaData) -> Self {
        Self {
            deportista_id,
            step: Step::Evaluacion,
            data,
        }
    }

    pub fn deportista_id(&self) -> Uuid {
        self.deportista_id
    }

    pub fn step(&self) -> Step {
        self.step
    }

    pub fn data(&self) -> &HistoriaClinicaData {
        &self.data
    }

    /// Shallow-merges `patch` into the draft.
    pub fn update(&mut self, patch: HistoriaPatch) -> CoreResult<()> {
        let keys: Vec<String> = patch.keys().map(str::to_string).collect();
        self.data.apply(patch)?;
        tracing::debug!(step = self.step.number(), ?keys, "draft updated");
        Ok(())
    }

    /// Validates the current step and moves forward.
    ///
    /// # Errors
    ///
    /// Returns the step's `StepValidationError`; the wizard stays on the current step.
    pub fn next(&mut self) -> Result<Step, StepValidationError> {
        if let Err(err) = validation::validate_step(self.step, &self.data) {
            tracing::debug!(
                step = self.step.number(),
                issues = err.issues.len(),
                "step validation failed"
            );
            return Err(err);
        }
        let from = self.step;
        self.step = self.step.next();
        tracing::debug!(from = from.number(), to = self.step.number(), "step forward");
        Ok(self.step)
    }

    /// Moves back one step without validating.
    pub fn previous(&mut self) -> Step {
        let from = self.step;
        self.step = self.step.previous();
        tracing::debug!(from = from.number(), to = self.step.number(), "step back");
        self.step
    }

    /// Non-blocking reminders for the current step.
    pub fn advisories(&self) -> Vec<FieldIssue> {
        validation::advisories(self.step, &self.data)
    }

    /// Re-runs every step's checks and builds the submission payload.
    ///
    /// Attachments are reduced to name, size and type. The wizard stays usable, so a
    /// failed submission can be retried by the caller.
    ///
    /// # Errors
    ///
    /// Returns the first step that fails validation.
    pub fn finish(&self) -> Result<HistoriaSubmission, StepValidationError> {
        for step in Step::ALL {
            validation::validate_step(step, &self.data)?;
        }

        let mut data = self.data.clone();
        for ayuda in &mut data.ayudas_diagnosticas {
            for archivo in &mut ayuda.archivos_adjuntos {
                archivo.sha256 = None;
            }
        }
        tracing::debug!(deportista_id = %self.deportista_id, "history ready to submit");

        Ok(HistoriaSubmission {
            deportista_id: self.deportista_id,
            data,
        })
    }

    /// Resolves a list entry against the code tables and appends it.
    pub fn add_entry<D: EntryDraft>(
        &mut self,
        draft: D,
        codes: &CodeTables,
    ) -> Result<usize, EntryError> {
        let index = editors::add(&mut self.data, draft, codes)?;
        tracing::debug!(index, "list entry added");
        Ok(index)
    }

    pub fn remove_entry<E: ListEntry>(&mut self, index: usize) -> Result<E, EntryError> {
        let entry = editors::remove(&mut self.data, index)?;
        tracing::debug!(index, "list entry removed");
        Ok(entry)
    }

    /// Sets one system's state. In the review of systems, marking a system normal clears
    /// its notes; exam notes are kept so templates survive.
    pub fn set_system_estado(&mut self, seccion: Seccion, system: BodySystem, estado: EstadoSistema) {
        let hallazgo = self.sistemas_mut(seccion).get_mut(system);
        hallazgo.estado = estado;
        if seccion == Seccion::Revision && estado == EstadoSistema::Normal {
            hallazgo.observaciones.clear();
        }
    }

    pub fn set_system_notes(&mut self, seccion: Seccion, system: BodySystem, notes: &str) {
        self.sistemas_mut(seccion).get_mut(system).observaciones = notes.to_string();
    }

    /// Appends one of the system's predefined findings to its exam notes.
    pub fn apply_plantilla(&mut self, system: BodySystem, index: usize) -> Result<(), EntryError> {
        let plantillas = system.plantillas();
        let plantilla = plantillas.get(index).ok_or(EntryError::IndexOutOfRange {
            index,
            len: plantillas.len(),
        })?;

        let hallazgo = self.data.exploracion_sistemas.get_mut(system);
        if hallazgo.observaciones.trim().is_empty() {
            hallazgo.observaciones = (*plantilla).to_string();
        } else {
            hallazgo.observaciones = format!("{} {}", hallazgo.observaciones.trim_end(), plantilla);
        }
        Ok(())
    }

    pub fn toggle_alergia(&mut self, tipo: TipoAlergia, subtipo: &str) -> CoreResult<()> {
        alergias::toggle_subtipo(&mut self.data.alergias, tipo, subtipo)?;
        if !self.data.alergias.is_empty() {
            self.data.tiene_alergias = true;
        }
        Ok(())
    }

    pub fn set_alergia_detalles(&mut self, tipo: TipoAlergia, detalles: &str) {
        alergias::set_detalles(&mut self.data.alergias, tipo, detalles);
    }

    pub fn remove_alergia(&mut self, tipo: TipoAlergia) {
        alergias::remove_tipo(&mut self.data.alergias, tipo);
    }

    fn sistemas_mut(&mut self, seccion: Seccion) -> &mut SistemasCorporales {
        match seccion {
            Seccion::Revision => &mut self.data.revision_sistemas,
            Seccion::Exploracion => &mut self.data.exploracion_sistemas,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editors::{AyudaDiagnosticaDraft, DiagnosticoDraft};
    use crate::historia::Diagnostico;
    use inder_files::AttachmentMetadata;
    use inder_types::NonEmptyText;

    fn patch(pairs: &[(&str, &str)]) -> HistoriaPatch {
        pairs
            .iter()
            .fold(HistoriaPatch::new(), |p, (k, v)| p.set(k, v).unwrap())
    }

    fn complete_wizard() -> Wizard {
        let codes = CodeTables::embedded().unwrap();
        let mut wizard = Wizard::new(Uuid::new_v4());
        wizard
            .update(patch(&[
                ("motivoConsulta", "Control"),
                ("enfermedadActual", "Asintomático"),
                ("estatura", "175"),
                ("peso", "70"),
                ("analisisObjetivoDiagnostico", "Apto"),
                ("impresionDiagnostica", "Sano"),
            ]))
            .unwrap();
        wizard
            .add_entry(
                DiagnosticoDraft {
                    codigo: "CA20".into(),
                    ..Default::default()
                },
                &codes,
            )
            .unwrap();
        wizard
    }

    #[test]
    fn test_step_bounds() {
        assert_eq!(Step::PlanTratamiento.next(), Step::PlanTratamiento);
        assert_eq!(Step::Evaluacion.previous(), Step::Evaluacion);
        assert_eq!(Step::from_number(4), Some(Step::ExploracionFisica));
        assert_eq!(Step::from_number(0), None);
        assert_eq!(Step::from_number(8), None);
    }

    #[test]
    fn test_next_blocks_on_invalid_step() {
        let mut wizard = Wizard::new(Uuid::new_v4());
        let err = wizard.next().expect_err("empty step 1");
        assert_eq!(err.step, Step::Evaluacion);
        assert_eq!(wizard.step(), Step::Evaluacion);
    }

    #[test]
    fn test_walks_all_steps_and_stays_on_last() {
        let mut wizard = complete_wizard();
        for expected in &Step::ALL[1..] {
            assert_eq!(wizard.next().unwrap(), *expected);
        }
        assert_eq!(wizard.next().unwrap(), Step::PlanTratamiento);
        assert_eq!(wizard.previous(), Step::Diagnostico);
    }

    #[test]
    fn test_step3_blocks_until_assessed() {
        let mut wizard = complete_wizard();
        wizard.next().unwrap();
        wizard.next().unwrap();
        assert_eq!(wizard.step(), Step::RevisionSistemas);

        wizard.set_system_estado(Seccion::Revision, BodySystem::Digestivo, EstadoSistema::SinEvaluar);
        let err = wizard.next().expect_err("digestivo unassessed");
        assert_eq!(err.unassessed(Seccion::Revision), vec![BodySystem::Digestivo]);
        assert_eq!(wizard.step(), Step::RevisionSistemas);

        wizard.set_system_estado(Seccion::Revision, BodySystem::Digestivo, EstadoSistema::Anormal);
        assert!(wizard.next().is_err());
        wizard.set_system_notes(Seccion::Revision, BodySystem::Digestivo, "Dolor epigástrico");
        assert_eq!(wizard.next().unwrap(), Step::ExploracionFisica);
    }

    #[test]
    fn test_normal_clears_notes() {
        let mut wizard = Wizard::new(Uuid::nil());
        wizard.set_system_estado(Seccion::Revision, BodySystem::Endocrino, EstadoSistema::Anormal);
        wizard.set_system_notes(Seccion::Revision, BodySystem::Endocrino, "Bocio");
        wizard.set_system_estado(Seccion::Revision, BodySystem::Endocrino, EstadoSistema::Normal);
        assert!(wizard.data().revision_sistemas.endocrino.observaciones.is_empty());

        wizard.apply_plantilla(BodySystem::Endocrino, 0).unwrap();
        wizard.set_system_estado(Seccion::Exploracion, BodySystem::Endocrino, EstadoSistema::Normal);
        assert!(wizard.data().exploracion_sistemas.endocrino.has_notes());
    }

    #[test]
    fn test_plantilla_appends() {
        let mut wizard = Wizard::new(Uuid::nil());
        wizard.apply_plantilla(BodySystem::Endocrino, 0).unwrap();
        wizard.apply_plantilla(BodySystem::Endocrino, 1).unwrap();
        let notes = &wizard.data().exploracion_sistemas.endocrino.observaciones;
        assert!(notes.starts_with("Tiroides no palpable."));
        assert!(notes.contains("Glándula tiroides"));
        assert!(wizard.apply_plantilla(BodySystem::Endocrino, 3).is_err());
    }

    #[test]
    fn test_finish_requires_all_gates() {
        let wizard = Wizard::new(Uuid::new_v4());
        let err = wizard.finish().expect_err("empty draft");
        assert_eq!(err.step, Step::Evaluacion);
    }

    #[test]
    fn test_finish_strips_attachment_hashes() {
        let codes = CodeTables::embedded().unwrap();
        let mut wizard = complete_wizard();
        wizard
            .add_entry(
                AyudaDiagnosticaDraft {
                    codigo_cups: "902201".into(),
                    resultado: "Normal".into(),
                    archivos: vec![AttachmentMetadata {
                        nombre: NonEmptyText::new("hemo.pdf").unwrap(),
                        tamano: 2048,
                        tipo: "application/pdf".into(),
                        sha256: Some("ab".repeat(32)),
                    }],
                },
                &codes,
            )
            .unwrap();

        let submission = wizard.finish().unwrap();
        assert_eq!(submission.deportista_id, wizard.deportista_id());
        let archivo = &submission.data.ayudas_diagnosticas[0].archivos_adjuntos[0];
        assert!(archivo.sha256.is_none());
        // The wizard keeps its own copy intact.
        assert!(wizard.data().ayudas_diagnosticas[0].archivos_adjuntos[0]
            .sha256
            .is_some());
    }

    #[test]
    fn test_remove_entry_through_wizard() {
        let mut wizard = complete_wizard();
        let removed: Diagnostico = wizard.remove_entry(0).unwrap();
        assert_eq!(removed.codigo, "CA20");
        assert!(wizard.data().diagnosticos.is_empty());
    }

    #[test]
    fn test_toggle_alergia_sets_flag() {
        let mut wizard = Wizard::new(Uuid::nil());
        wizard.toggle_alergia(TipoAlergia::Digestivas, "Gluten").unwrap();
        assert!(wizard.data().tiene_alergias);
        assert_eq!(wizard.data().alergias.len(), 1);
    }
}
