//! The medical-history draft built by the wizard.
//!
//! [`HistoriaClinicaData`] serialises to the camelCase document the backend accepts at
//! `POST /historias_clinicas/completa`. Vital signs and the treatment plan are grouped into
//! their own structs but flattened on the wire, so every wire key is a top-level key of the
//! draft. That is what makes [`HistoriaPatch`] a plain shallow merge.
//!
//! Vital signs are kept as the text the clinician typed. Parsing happens in
//! [`crate::vitals`] and [`crate::validation`]; BMI is derived there and never stored.

use crate::{CoreError, CoreResult};
use chrono::NaiveDate;
use inder_files::AttachmentMetadata;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::str::FromStr;
use uuid::Uuid;

/// The eight body systems assessed in steps 3 and 4.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum BodySystem {
    Cardiovascular,
    Respiratorio,
    Digestivo,
    Neurologico,
    Musculoesqueletico,
    Genitourinario,
    Endocrino,
    PielFaneras,
}

impl BodySystem {
    pub const ALL: [BodySystem; 8] = [
        BodySystem::Cardiovascular,
        BodySystem::Respiratorio,
        BodySystem::Digestivo,
        BodySystem::Neurologico,
        BodySystem::Musculoesqueletico,
        BodySystem::Genitourinario,
        BodySystem::Endocrino,
        BodySystem::PielFaneras,
    ];

    /// Wire key inside `revisionSistemas` / `exploracionSistemas`.
    pub fn key(self) -> &'static str {
        match self {
            BodySystem::Cardiovascular => "cardiovascular",
            BodySystem::Respiratorio => "respiratorio",
            BodySystem::Digestivo => "digestivo",
            BodySystem::Neurologico => "neurologico",
            BodySystem::Musculoesqueletico => "musculoesqueletico",
            BodySystem::Genitourinario => "genitourinario",
            BodySystem::Endocrino => "endocrino",
            BodySystem::PielFaneras => "pielFaneras",
        }
    }

    /// Display name.
    pub fn nombre(self) -> &'static str {
        match self {
            BodySystem::Cardiovascular => "Cardiovascular",
            BodySystem::Respiratorio => "Respiratorio",
            BodySystem::Digestivo => "Digestivo",
            BodySystem::Neurologico => "Neurológico",
            BodySystem::Musculoesqueletico => "Musculoesquelético",
            BodySystem::Genitourinario => "Genitourinario",
            BodySystem::Endocrino => "Endocrino",
            BodySystem::PielFaneras => "Piel y Faneras",
        }
    }

    /// Predefined physical-exam findings offered for a normal system.
    pub fn plantillas(self) -> &'static [&'static str] {
        match self {
            BodySystem::Cardiovascular => &[
                "Ruidos cardíacos rítmicos, sin soplos ni agregados. Pulsos periféricos simétricos y de buena amplitud.",
                "Ruidos cardíacos normales. Frecuencia y ritmo regular. Sin soplos audibles.",
                "Auscultación cardíaca sin alteraciones. Pulsos presentes y simétricos en las cuatro extremidades.",
            ],
            BodySystem::Respiratorio => &[
                "Murmullo vesicular conservado bilateral. Sin ruidos agregados. Expansión torácica simétrica.",
                "Tórax simétrico con buena expansibilidad. Murmullo vesicular audible en ambos campos pulmonares.",
                "Auscultación pulmonar sin estertores, sibilancias ni roncus. Ventilación bilateral adecuada.",
            ],
            BodySystem::Digestivo => &[
                "Abdomen blando, depresible, no doloroso. Ruidos hidroaéreos presentes. Sin visceromegalias.",
                "Abdomen plano, blando, depresible, no doloroso a la palpación superficial ni profunda.",
                "Ruidos intestinales normales. Sin masas palpables. No se evidencia hepatomegalia ni esplenomegalia.",
            ],
            BodySystem::Neurologico => &[
                "Consciente, alerta y orientado. Fuerza muscular conservada. Sensibilidad y reflejos normales. Sin alteraciones en coordinación ni equilibrio.",
                "Paciente consciente y orientado en tiempo, espacio y persona. Funciones mentales superiores conservadas.",
                "Pares craneales sin alteraciones. Fuerza muscular 5/5 en las cuatro extremidades. Reflejos osteotendinosos presentes y simétricos.",
            ],
            BodySystem::Musculoesqueletico => &[
                "Rangos de movilidad articular conservados. Sin signos de inflamación ni deformidades. Fuerza muscular adecuada. Marcha normal.",
                "Articulaciones sin deformidades, edema ni limitación funcional. Movilidad activa y pasiva conservada.",
                "Tono y trofismo muscular adecuados. Sin atrofias. Marcha sin alteraciones. Balance articular completo.",
            ],
            BodySystem::Genitourinario => &[
                "Sin alteraciones. Sin dolor a la palpación en región lumbar ni hipogastrio.",
                "No se evidencian alteraciones en región genital. Puño percusión lumbar negativa bilateral.",
                "Sin dolor a la palpación abdominal. No se palpa globo vesical.",
            ],
            BodySystem::Endocrino => &[
                "Tiroides no palpable. Sin signos de alteraciones endocrinas.",
                "Glándula tiroides de tamaño y consistencia normales. Sin nódulos palpables.",
                "No se evidencian signos de hipo o hipertiroidismo. Distribución de grasa corporal normal.",
            ],
            BodySystem::PielFaneras => &[
                "Piel de coloración y temperatura normales. Hidratada. Sin lesiones dérmicas.",
                "Piel íntegra, sin lesiones, cicatrices ni manchas. Buena turgencia e hidratación.",
                "Faneras sin alteraciones. Uñas sin cambios de coloración. Cabello de implantación normal.",
            ],
        }
    }
}

impl std::fmt::Display for BodySystem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.nombre())
    }
}

impl FromStr for BodySystem {
    type Err = CoreError;

    /// Accepts the wire key or the display name, ignoring case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        BodySystem::ALL
            .into_iter()
            .find(|system| {
                system.key().to_lowercase() == wanted || system.nombre().to_lowercase() == wanted
            })
            .ok_or_else(|| CoreError::InvalidPatch(format!("unknown body system {s:?}")))
    }
}

/// Assessment state of one body system.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EstadoSistema {
    #[default]
    #[serde(rename = "")]
    SinEvaluar,
    #[serde(rename = "normal")]
    Normal,
    #[serde(rename = "anormal")]
    Anormal,
}

impl FromStr for EstadoSistema {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "" => Ok(EstadoSistema::SinEvaluar),
            "normal" => Ok(EstadoSistema::Normal),
            "anormal" => Ok(EstadoSistema::Anormal),
            other => Err(CoreError::InvalidPatch(format!(
                "estado must be normal or anormal, got {other:?}"
            ))),
        }
    }
}

/// Finding for one body system.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HallazgoSistema {
    #[serde(default)]
    pub estado: EstadoSistema,
    #[serde(default)]
    pub observaciones: String,
}

impl HallazgoSistema {
    pub fn normal() -> Self {
        Self {
            estado: EstadoSistema::Normal,
            observaciones: String::new(),
        }
    }

    pub fn anormal(observaciones: impl Into<String>) -> Self {
        Self {
            estado: EstadoSistema::Anormal,
            observaciones: observaciones.into(),
        }
    }

    pub fn is_assessed(&self) -> bool {
        self.estado != EstadoSistema::SinEvaluar
    }

    pub fn has_notes(&self) -> bool {
        !self.observaciones.trim().is_empty()
    }
}

/// Findings for all eight body systems. A system left out of a document is unassessed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SistemasCorporales {
    pub cardiovascular: HallazgoSistema,
    pub respiratorio: HallazgoSistema,
    pub digestivo: HallazgoSistema,
    pub neurologico: HallazgoSistema,
    pub musculoesqueletico: HallazgoSistema,
    pub genitourinario: HallazgoSistema,
    pub endocrino: HallazgoSistema,
    pub piel_faneras: HallazgoSistema,
}

impl SistemasCorporales {
    /// Every system set to the same finding.
    pub fn uniform(hallazgo: HallazgoSistema) -> Self {
        Self {
            cardiovascular: hallazgo.clone(),
            respiratorio: hallazgo.clone(),
            digestivo: hallazgo.clone(),
            neurologico: hallazgo.clone(),
            musculoesqueletico: hallazgo.clone(),
            genitourinario: hallazgo.clone(),
            endocrino: hallazgo.clone(),
            piel_faneras: hallazgo,
        }
    }

    pub fn get(&self, system: BodySystem) -> &HallazgoSistema {
        match system {
            BodySystem::Cardiovascular => &self.cardiovascular,
            BodySystem::Respiratorio => &self.respiratorio,
            BodySystem::Digestivo => &self.digestivo,
            BodySystem::Neurologico => &self.neurologico,
            BodySystem::Musculoesqueletico => &self.musculoesqueletico,
            BodySystem::Genitourinario => &self.genitourinario,
            BodySystem::Endocrino => &self.endocrino,
            BodySystem::PielFaneras => &self.piel_faneras,
        }
    }

    pub fn get_mut(&mut self, system: BodySystem) -> &mut HallazgoSistema {
        match system {
            BodySystem::Cardiovascular => &mut self.cardiovascular,
            BodySystem::Respiratorio => &mut self.respiratorio,
            BodySystem::Digestivo => &mut self.digestivo,
            BodySystem::Neurologico => &mut self.neurologico,
            BodySystem::Musculoesqueletico => &mut self.musculoesqueletico,
            BodySystem::Genitourinario => &mut self.genitourinario,
            BodySystem::Endocrino => &mut self.endocrino,
            BodySystem::PielFaneras => &mut self.piel_faneras,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (BodySystem, &HallazgoSistema)> {
        BodySystem::ALL
            .into_iter()
            .map(move |system| (system, self.get(system)))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AntecedentePersonal {
    #[serde(rename = "codigoCIE11")]
    pub codigo_cie11: String,
    pub nombre_enfermedad: String,
    #[serde(default)]
    pub observaciones: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AntecedenteFamiliar {
    #[serde(rename = "codigoCIE11")]
    pub codigo_cie11: String,
    pub nombre_enfermedad: String,
    pub familiar: String,
    #[serde(default)]
    pub observaciones: String,
}

/// Allergy categories offered in step 2.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TipoAlergia {
    Respiratorias,
    Digestivas,
    #[serde(rename = "Dermatológicas")]
    Dermatologicas,
    Medicamentosas,
    Otra,
}

/// One allergy category with the sub-types ticked and free-text details.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alergia {
    pub tipo: TipoAlergia,
    pub subtipos: Vec<String>,
    #[serde(default)]
    pub detalles: String,
}

/// Complementary test (laboratory, imaging, functional or sports test).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AyudaDiagnostica {
    pub categoria: String,
    pub nombre_prueba: String,
    #[serde(rename = "codigoCUPS")]
    pub codigo_cups: String,
    #[serde(default)]
    pub resultado: String,
    #[serde(default)]
    pub archivos_adjuntos: Vec<AttachmentMetadata>,
}

/// Coded diagnosis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostico {
    pub codigo: String,
    pub nombre: String,
    #[serde(default)]
    pub observaciones: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Prioridad {
    #[default]
    Normal,
    Urgente,
}

/// Specialist referral. `Normal` priority is an interconsultation, `Urgente` a referral.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Remision {
    pub especialista: String,
    pub motivo: String,
    pub prioridad: Prioridad,
    pub fecha_remision: NaiveDate,
}

/// Vital signs as typed, step 4.
///
/// Each reading is kept as text. Documents may also give a bare number (`peso: 70`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SignosVitales {
    /// Height in centimetres
    #[serde(deserialize_with = "measure_text")]
    pub estatura: String,
    /// Weight in kilograms
    #[serde(deserialize_with = "measure_text")]
    pub peso: String,
    #[serde(deserialize_with = "measure_text")]
    pub frecuencia_cardiaca: String,
    /// Systolic/diastolic, e.g. `120/80`
    #[serde(deserialize_with = "measure_text")]
    pub presion_arterial: String,
    #[serde(deserialize_with = "measure_text")]
    pub frecuencia_respiratoria: String,
    /// Degrees Celsius
    #[serde(deserialize_with = "measure_text")]
    pub temperatura: String,
    /// Percent; optional
    #[serde(deserialize_with = "measure_text")]
    pub saturacion_oxigeno: String,
}

/// Wire keys of [`SignosVitales`]. They sit at the top level of the draft.
const VITALS_KEYS: [&str; 7] = [
    "estatura",
    "peso",
    "frecuenciaCardiaca",
    "presionArterial",
    "frecuenciaRespiratoria",
    "temperatura",
    "saturacionOxigeno",
];

/// Reads a measurement given as text, as a number, or as null (blank).
fn measure_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    struct MeasureVisitor;

    impl serde::de::Visitor<'_> for MeasureVisitor {
        type Value = String;

        fn expecting(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.write_str("a measurement as text or number")
        }

        fn visit_str<E: serde::de::Error>(self, v: &str) -> Result<String, E> {
            Ok(v.to_owned())
        }

        fn visit_string<E: serde::de::Error>(self, v: String) -> Result<String, E> {
            Ok(v)
        }

        fn visit_i64<E: serde::de::Error>(self, v: i64) -> Result<String, E> {
            Ok(v.to_string())
        }

        fn visit_u64<E: serde::de::Error>(self, v: u64) -> Result<String, E> {
            Ok(v.to_string())
        }

        fn visit_f64<E: serde::de::Error>(self, v: f64) -> Result<String, E> {
            Ok(v.to_string())
        }

        fn visit_unit<E: serde::de::Error>(self) -> Result<String, E> {
            Ok(String::new())
        }

        fn visit_none<E: serde::de::Error>(self) -> Result<String, E> {
            Ok(String::new())
        }
    }

    deserializer.deserialize_any(MeasureVisitor)
}

impl Default for SignosVitales {
    fn default() -> Self {
        Self {
            estatura: String::new(),
            peso: String::new(),
            frecuencia_cardiaca: "70".into(),
            presion_arterial: "120/80".into(),
            frecuencia_respiratoria: "16".into(),
            temperatura: "36.5".into(),
            saturacion_oxigeno: "98".into(),
        }
    }
}

/// Treatment plan, step 7.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PlanTratamiento {
    pub indicaciones_medicas: String,
    pub recomendaciones_entrenamiento: String,
    pub plan_seguimiento: String,
    pub remisiones_especialistas: Vec<Remision>,
}

/// Working draft of a medical history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct HistoriaClinicaData {
    // Paso 1
    pub tipo_cita: String,
    pub motivo_consulta: String,
    pub enfermedad_actual: String,

    // Paso 2
    pub antecedentes_personales: Vec<AntecedentePersonal>,
    pub antecedentes_familiares: Vec<AntecedenteFamiliar>,
    pub lesiones_deportivas: bool,
    pub descripcion_lesiones: String,
    pub fecha_ultima_lesion: String,
    pub cirugias_previas: bool,
    pub detalle_cirugias: String,
    pub tiene_alergias: bool,
    pub alergias: Vec<Alergia>,
    pub toma_medicacion: bool,
    pub medicacion_actual: String,
    pub vacunas: Vec<String>,

    // Paso 3
    pub revision_sistemas: SistemasCorporales,

    // Paso 4
    #[serde(flatten)]
    pub signos_vitales: SignosVitales,
    pub exploracion_sistemas: SistemasCorporales,

    // Paso 5
    pub ayudas_diagnosticas: Vec<AyudaDiagnostica>,

    // Paso 6
    pub analisis_objetivo_diagnostico: String,
    pub impresion_diagnostica: String,
    pub diagnosticos: Vec<Diagnostico>,

    // Paso 7
    #[serde(flatten)]
    pub plan: PlanTratamiento,
}

impl HistoriaClinicaData {
    /// A fresh draft: every system starts as normal and the vitals carry the usual
    /// resting values, with height and weight left blank.
    pub fn new() -> Self {
        Self {
            tipo_cita: String::new(),
            motivo_consulta: String::new(),
            enfermedad_actual: String::new(),
            antecedentes_personales: Vec::new(),
            antecedentes_familiares: Vec::new(),
            lesiones_deportivas: false,
            descripcion_lesiones: String::new(),
            fecha_ultima_lesion: String::new(),
            cirugias_previas: false,
            detalle_cirugias: String::new(),
            tiene_alergias: false,
            alergias: Vec::new(),
            toma_medicacion: false,
            medicacion_actual: String::new(),
            vacunas: Vec::new(),
            revision_sistemas: SistemasCorporales::uniform(HallazgoSistema::normal()),
            signos_vitales: SignosVitales::default(),
            exploracion_sistemas: SistemasCorporales::uniform(HallazgoSistema::normal()),
            ayudas_diagnosticas: Vec::new(),
            analisis_objetivo_diagnostico: String::new(),
            impresion_diagnostica: String::new(),
            diagnosticos: Vec::new(),
            plan: PlanTratamiento::default(),
        }
    }

    /// Shallow-merges `patch` into the draft.
    ///
    /// Each key in the patch replaces the whole top-level value of the same wire name; nested
    /// objects are not merged. The draft is left untouched if the patch is rejected.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::InvalidPatch` for keys that are not part of the draft and
    /// `CoreError::DraftFormat` (with the failing path) for values of the wrong shape.
    pub fn apply(&mut self, patch: HistoriaPatch) -> CoreResult<()> {
        let mut current = match serde_json::to_value(&*self) {
            Ok(Value::Object(map)) => map,
            Ok(_) => {
                return Err(CoreError::InvalidPatch(
                    "draft did not serialise to an object".into(),
                ))
            }
            Err(e) => return Err(CoreError::InvalidPatch(e.to_string())),
        };

        for (key, value) in patch.0 {
            if !current.contains_key(&key) {
                return Err(CoreError::InvalidPatch(format!("unknown field {key:?}")));
            }
            // Flattened vitals lose their path in serde errors, so check their shape here.
            if VITALS_KEYS.contains(&key.as_str())
                && !matches!(value, Value::String(_) | Value::Number(_) | Value::Null)
            {
                return Err(CoreError::DraftFormat {
                    path: key,
                    message: format!("invalid type: {value}, expected a measurement as text or number"),
                });
            }
            current.insert(key, value);
        }

        let updated: HistoriaClinicaData =
            serde_path_to_error::deserialize(Value::Object(current)).map_err(|err| {
                CoreError::DraftFormat {
                    path: err.path().to_string(),
                    message: err.inner().to_string(),
                }
            })?;
        *self = updated;
        Ok(())
    }

    /// Builds a draft from a YAML or JSON document, applied over [`HistoriaClinicaData::new`].
    ///
    /// Unknown keys are rejected, so a misspelled field in a draft file is reported instead of
    /// silently ignored.
    pub fn from_document(text: &str) -> CoreResult<Self> {
        if text.trim().is_empty() {
            return Ok(Self::new());
        }

        let deserializer = serde_yaml::Deserializer::from_str(text);
        let value: Value = serde_path_to_error::deserialize(deserializer).map_err(|err| {
            CoreError::DraftFormat {
                path: err.path().to_string(),
                message: err.inner().to_string(),
            }
        })?;

        let mut data = Self::new();
        if !value.is_null() {
            data.apply(HistoriaPatch::from_value(value)?)?;
        }
        Ok(data)
    }

    /// Reads a draft file (YAML or JSON) and builds the draft from it.
    pub fn load(path: &std::path::Path) -> CoreResult<Self> {
        let text = std::fs::read_to_string(path).map_err(CoreError::DraftRead)?;
        tracing::debug!("loaded draft from {}", path.display());
        Self::from_document(&text)
    }
}

impl Default for HistoriaClinicaData {
    fn default() -> Self {
        Self::new()
    }
}

/// A partial update of the draft, keyed by wire name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HistoriaPatch(Map<String, Value>);

impl HistoriaPatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wraps a JSON object.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::InvalidPatch` if `value` is not an object.
    pub fn from_value(value: Value) -> CoreResult<Self> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            other => Err(CoreError::InvalidPatch(format!(
                "patch must be an object, got {other}"
            ))),
        }
    }

    /// Adds one key to the patch.
    pub fn set(mut self, key: &str, value: impl Serialize) -> CoreResult<Self> {
        let value =
            serde_json::to_value(value).map_err(|e| CoreError::InvalidPatch(e.to_string()))?;
        self.0.insert(key.to_string(), value);
        Ok(self)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }
}

/// Body of `POST /historias_clinicas/completa`: the athlete id plus every draft field.
///
/// The endpoint stores allergies as `{tipo_alergia, descripcion}` rows, so the draft's
/// sub-type selection is folded into the description when serialised.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoriaSubmission {
    pub deportista_id: Uuid,
    pub data: HistoriaClinicaData,
}

#[derive(Debug, Serialize)]
struct AlergiaEnvio<'a> {
    tipo_alergia: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    descripcion: Option<String>,
}

impl<'a> From<&'a Alergia> for AlergiaEnvio<'a> {
    fn from(alergia: &'a Alergia) -> Self {
        let mut partes: Vec<&str> = alergia
            .subtipos
            .iter()
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .collect();
        let detalles = alergia.detalles.trim();
        if !detalles.is_empty() {
            partes.push(detalles);
        }
        AlergiaEnvio {
            tipo_alergia: alergia.tipo.nombre(),
            descripcion: (!partes.is_empty()).then(|| partes.join(", ")),
        }
    }
}

impl Serialize for HistoriaSubmission {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::Error as _;

        let mut body = match serde_json::to_value(&self.data).map_err(S::Error::custom)? {
            Value::Object(map) => map,
            _ => return Err(S::Error::custom("draft did not serialise to an object")),
        };
        let alergias: Vec<AlergiaEnvio<'_>> = self.data.alergias.iter().map(Into::into).collect();
        body.insert(
            "alergias".into(),
            serde_json::to_value(alergias).map_err(S::Error::custom)?,
        );
        body.insert(
            "deportista_id".into(),
            Value::String(self.deportista_id.to_string()),
        );
        body.serialize(serializer)
    }
}
