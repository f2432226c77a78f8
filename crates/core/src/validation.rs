//! Per-step validation of the medical-history draft.
//!
//! [`validate_step`] is the gate the wizard runs before moving forward. It collects every
//! problem on the step instead of stopping at the first one, so the caller can show them
//! all at once. [`advisories`] reports softer, non-blocking reminders.
//!
//! Both are pure functions of the draft.

use crate::historia::{BodySystem, EstadoSistema, HistoriaClinicaData, SistemasCorporales};
use crate::vitals::parse_measure;
use crate::wizard::Step;

/// Draft fields that can fail a check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    MotivoConsulta,
    EnfermedadActual,
    Estatura,
    Peso,
    FrecuenciaCardiaca,
    PresionArterial,
    FrecuenciaRespiratoria,
    Temperatura,
    AnalisisObjetivoDiagnostico,
    ImpresionDiagnostica,
    MedicacionActual,
    DescripcionLesiones,
    DetalleCirugias,
    IndicacionesMedicas,
    PlanSeguimiento,
}

impl Field {
    /// Wire name of the field.
    pub fn key(self) -> &'static str {
        match self {
            Field::MotivoConsulta => "motivoConsulta",
            Field::EnfermedadActual => "enfermedadActual",
            Field::Estatura => "estatura",
            Field::Peso => "peso",
            Field::FrecuenciaCardiaca => "frecuenciaCardiaca",
            Field::PresionArterial => "presionArterial",
            Field::FrecuenciaRespiratoria => "frecuenciaRespiratoria",
            Field::Temperatura => "temperatura",
            Field::AnalisisObjetivoDiagnostico => "analisisObjetivoDiagnostico",
            Field::ImpresionDiagnostica => "impresionDiagnostica",
            Field::MedicacionActual => "medicacionActual",
            Field::DescripcionLesiones => "descripcionLesiones",
            Field::DetalleCirugias => "detalleCirugias",
            Field::IndicacionesMedicas => "indicacionesMedicas",
            Field::PlanSeguimiento => "planSeguimiento",
        }
    }

    fn required_message(self) -> &'static str {
        match self {
            Field::MotivoConsulta => "Por favor ingrese el motivo de consulta",
            Field::EnfermedadActual => "Por favor ingrese la enfermedad actual / anamnesis",
            Field::Estatura => "Por favor ingrese la estatura (cm)",
            Field::Peso => "Por favor ingrese el peso (kg)",
            Field::FrecuenciaCardiaca => "Por favor ingrese la frecuencia cardíaca (FC)",
            Field::PresionArterial => "Por favor ingrese la presión arterial (TA)",
            Field::FrecuenciaRespiratoria => "Por favor ingrese la frecuencia respiratoria (FR)",
            Field::Temperatura => "Por favor ingrese la temperatura (T°)",
            Field::AnalisisObjetivoDiagnostico => "Por favor complete el Análisis Objetivo",
            Field::ImpresionDiagnostica => "Por favor complete la Impresión Diagnóstica",
            Field::MedicacionActual => "Por favor especifique la medicación actual",
            Field::DescripcionLesiones => "Por favor describa las lesiones deportivas",
            Field::DetalleCirugias => "Por favor detalle las cirugías previas",
            Field::IndicacionesMedicas => "Por favor ingrese las indicaciones médicas",
            Field::PlanSeguimiento => "Por favor ingrese el plan de seguimiento",
        }
    }

    fn invalid_message(self) -> String {
        let nombre = match self {
            Field::Estatura => "La estatura",
            Field::Peso => "El peso",
            Field::FrecuenciaCardiaca => "La frecuencia cardíaca",
            Field::FrecuenciaRespiratoria => "La frecuencia respiratoria",
            Field::Temperatura => "La temperatura",
            other => return format!("El campo {} debe ser un número mayor a 0", other.key()),
        };
        format!("{nombre} debe ser un número mayor a 0")
    }
}

/// Which systems block a finding belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Seccion {
    /// Step 3, review of systems
    Revision,
    /// Step 4, physical exam
    Exploracion,
}

/// A single problem found on a step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldIssue {
    Required(Field),
    NotNumeric(Field),
    NotPositive(Field),
    SystemNotAssessed(Seccion, BodySystem),
    AbnormalWithoutNotes(Seccion, BodySystem),
    NoDiagnoses,
    // Advisories
    NoAntecedentes,
    NoAlergias,
    AlergiaSinDetalles,
    Recommended(Field),
}

impl std::fmt::Display for FieldIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FieldIssue::Required(field) | FieldIssue::Recommended(field) => {
                f.write_str(field.required_message())
            }
            FieldIssue::NotNumeric(field) | FieldIssue::NotPositive(field) => {
                f.write_str(&field.invalid_message())
            }
            FieldIssue::SystemNotAssessed(_, system) => {
                write!(f, "Por favor evalúe el sistema {}", system.nombre())
            }
            FieldIssue::AbnormalWithoutNotes(_, system) => write!(
                f,
                "Por favor agregue observaciones para el sistema {} marcado como anormal",
                system.nombre()
            ),
            FieldIssue::NoDiagnoses => {
                f.write_str("Por favor agregue al menos un diagnóstico CIE-11")
            }
            FieldIssue::NoAntecedentes => f.write_str(
                "Por favor agregue al menos un antecedente (personal o familiar)",
            ),
            FieldIssue::NoAlergias => f.write_str("Por favor agregue al menos una alergia"),
            FieldIssue::AlergiaSinDetalles => f.write_str(
                "Por favor complete los detalles de las alergias marcadas como \"Otro\"",
            ),
        }
    }
}

/// The step could not be left because of `issues`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{}", summary(.step, .issues))]
pub struct StepValidationError {
    pub step: Step,
    pub issues: Vec<FieldIssue>,
}

impl StepValidationError {
    /// Systems in `seccion` that were not assessed, in display order.
    pub fn unassessed(&self, seccion: Seccion) -> Vec<BodySystem> {
        self.issues
            .iter()
            .filter_map(|issue| match issue {
                FieldIssue::SystemNotAssessed(s, system) if *s == seccion => Some(*system),
                _ => None,
            })
            .collect()
    }
}

fn summary(step: &Step, issues: &[FieldIssue]) -> String {
    let mut lines = vec![format!("Paso {} ({}) incompleto:", step.number(), step.title())];
    let mut grouped = Vec::new();

    for seccion in [Seccion::Revision, Seccion::Exploracion] {
        let missing: Vec<&str> = issues
            .iter()
            .filter_map(|issue| match issue {
                FieldIssue::SystemNotAssessed(s, system) if *s == seccion => Some(system.nombre()),
                _ => None,
            })
            .collect();
        if !missing.is_empty() {
            grouped.push(format!(
                "Por favor evalúe todos los sistemas. Faltan: {}",
                missing.join(", ")
            ));
        }

        let abnormal: Vec<&str> = issues
            .iter()
            .filter_map(|issue| match issue {
                FieldIssue::AbnormalWithoutNotes(s, system) if *s == seccion => {
                    Some(system.nombre())
                }
                _ => None,
            })
            .collect();
        if !abnormal.is_empty() {
            grouped.push(format!(
                "Por favor agregue observaciones para los sistemas marcados como anormales: {}",
                abnormal.join(", ")
            ));
        }
    }

    for issue in issues {
        if !matches!(
            issue,
            FieldIssue::SystemNotAssessed(..) | FieldIssue::AbnormalWithoutNotes(..)
        ) {
            lines.push(format!("- {issue}"));
        }
    }
    lines.extend(grouped.into_iter().map(|line| format!("- {line}")));
    lines.join("\n")
}

/// Runs the blocking checks for `step`.
///
/// Steps 2, 5 and 7 always pass.
///
/// # Errors
///
/// Returns a `StepValidationError` listing every problem found on the step.
pub fn validate_step(step: Step, data: &HistoriaClinicaData) -> Result<(), StepValidationError> {
    let mut issues = Vec::new();

    match step {
        Step::Evaluacion => {
            require_text(&mut issues, Field::MotivoConsulta, &data.motivo_consulta);
            require_text(&mut issues, Field::EnfermedadActual, &data.enfermedad_actual);
        }
        Step::RevisionSistemas => {
            check_systems(&mut issues, Seccion::Revision, &data.revision_sistemas);
        }
        Step::ExploracionFisica => {
            let vitals = &data.signos_vitales;
            require_positive(&mut issues, Field::Estatura, &vitals.estatura);
            require_positive(&mut issues, Field::Peso, &vitals.peso);
            require_text(&mut issues, Field::PresionArterial, &vitals.presion_arterial);
            require_positive(
                &mut issues,
                Field::FrecuenciaCardiaca,
                &vitals.frecuencia_cardiaca,
            );
            require_positive(
                &mut issues,
                Field::FrecuenciaRespiratoria,
                &vitals.frecuencia_respiratoria,
            );
            require_positive(&mut issues, Field::Temperatura, &vitals.temperatura);
            check_systems(&mut issues, Seccion::Exploracion, &data.exploracion_sistemas);
        }
        Step::Diagnostico => {
            require_text(
                &mut issues,
                Field::AnalisisObjetivoDiagnostico,
                &data.analisis_objetivo_diagnostico,
            );
            require_text(
                &mut issues,
                Field::ImpresionDiagnostica,
                &data.impresion_diagnostica,
            );
            if data.diagnosticos.is_empty() {
                issues.push(FieldIssue::NoDiagnoses);
            }
        }
        Step::Antecedentes | Step::PruebasComplementarias | Step::PlanTratamiento => {}
    }

    if issues.is_empty() {
        Ok(())
    } else {
        Err(StepValidationError { step, issues })
    }
}

/// Non-blocking reminders for `step`. Never prevents a transition.
pub fn advisories(step: Step, data: &HistoriaClinicaData) -> Vec<FieldIssue> {
    let mut issues = Vec::new();

    match step {
        Step::Antecedentes => {
            if data.antecedentes_personales.is_empty() && data.antecedentes_familiares.is_empty()
            {
                issues.push(FieldIssue::NoAntecedentes);
            }
            if data.toma_medicacion && is_blank(&data.medicacion_actual) {
                issues.push(FieldIssue::Recommended(Field::MedicacionActual));
            }
            if data.tiene_alergias && data.alergias.is_empty() {
                issues.push(FieldIssue::NoAlergias);
            }
            if data
                .alergias
                .iter()
                .any(|a| a.necesita_detalles() && is_blank(&a.detalles))
            {
                issues.push(FieldIssue::AlergiaSinDetalles);
            }
            if data.lesiones_deportivas && is_blank(&data.descripcion_lesiones) {
                issues.push(FieldIssue::Recommended(Field::DescripcionLesiones));
            }
            if data.cirugias_previas && is_blank(&data.detalle_cirugias) {
                issues.push(FieldIssue::Recommended(Field::DetalleCirugias));
            }
        }
        Step::PlanTratamiento => {
            if is_blank(&data.plan.indicaciones_medicas) {
                issues.push(FieldIssue::Recommended(Field::IndicacionesMedicas));
            }
            if is_blank(&data.plan.plan_seguimiento) {
                issues.push(FieldIssue::Recommended(Field::PlanSeguimiento));
            }
        }
        _ => {}
    }

    issues
}

fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

fn require_text(issues: &mut Vec<FieldIssue>, field: Field, value: &str) {
    if is_blank(value) {
        issues.push(FieldIssue::Required(field));
    }
}

fn require_positive(issues: &mut Vec<FieldIssue>, field: Field, value: &str) {
    if is_blank(value) {
        issues.push(FieldIssue::Required(field));
        return;
    }
    match parse_measure(value) {
        None => issues.push(FieldIssue::NotNumeric(field)),
        Some(v) if v <= 0.0 => issues.push(FieldIssue::NotPositive(field)),
        Some(_) => {}
    }
}

fn check_systems(issues: &mut Vec<FieldIssue>, seccion: Seccion, sistemas: &SistemasCorporales) {
    for (system, hallazgo) in sistemas.iter() {
        match hallazgo.estado {
            EstadoSistema::SinEvaluar => {
                issues.push(FieldIssue::SystemNotAssessed(seccion, system));
            }
            EstadoSistema::Anormal if !hallazgo.has_notes() => {
                issues.push(FieldIssue::AbnormalWithoutNotes(seccion, system));
            }
            _ => {}
        }
    }
}
