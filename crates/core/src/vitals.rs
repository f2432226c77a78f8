//! Derived vital-sign values: body-mass index and threshold alerts.
//!
//! Everything here is computed from the text in [`SignosVitales`] and never stored in the
//! draft. An empty or unparseable reading produces no alert.

use crate::historia::SignosVitales;
use serde::Serialize;

/// Shown in place of the BMI when height or weight is missing.
pub const BMI_PLACEHOLDER: &str = "-";

/// Parses a typed measurement, accepting a comma as decimal separator.
pub fn parse_measure(raw: &str) -> Option<f64> {
    let value: f64 = raw.trim().replace(',', ".").parse().ok()?;
    value.is_finite().then_some(value)
}

/// Body-mass index rounded to two decimals.
///
/// Returns `None` unless both readings parse and are greater than zero.
pub fn bmi(peso_kg: &str, estatura_cm: &str) -> Option<f64> {
    let peso = parse_measure(peso_kg).filter(|v| *v > 0.0)?;
    let metros = parse_measure(estatura_cm).filter(|v| *v > 0.0)? / 100.0;
    Some((peso / (metros * metros) * 100.0).round() / 100.0)
}

pub fn bmi_display(peso_kg: &str, estatura_cm: &str) -> String {
    match bmi(peso_kg, estatura_cm) {
        Some(value) => format!("{value:.2}"),
        None => BMI_PLACEHOLDER.to_string(),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BmiCategory {
    BajoPeso,
    Normal,
    Sobrepeso,
    Obesidad,
}

impl BmiCategory {
    pub fn from_bmi(value: f64) -> Self {
        if value < 18.5 {
            BmiCategory::BajoPeso
        } else if value < 25.0 {
            BmiCategory::Normal
        } else if value < 30.0 {
            BmiCategory::Sobrepeso
        } else {
            BmiCategory::Obesidad
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            BmiCategory::BajoPeso => "Bajo peso",
            BmiCategory::Normal => "Normal",
            BmiCategory::Sobrepeso => "Sobrepeso",
            BmiCategory::Obesidad => "Obesidad",
        }
    }
}

impl std::fmt::Display for BmiCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Severity of a vital-sign reading, least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertLevel {
    Normal,
    Warning,
    Danger,
    Critical,
}

impl std::fmt::Display for AlertLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            AlertLevel::Normal => "normal",
            AlertLevel::Warning => "warning",
            AlertLevel::Danger => "danger",
            AlertLevel::Critical => "critical",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VitalAlert {
    pub level: AlertLevel,
    pub message: &'static str,
}

impl VitalAlert {
    const fn new(level: AlertLevel, message: &'static str) -> Self {
        Self { level, message }
    }
}

pub fn evaluate_heart_rate(raw: &str) -> Option<VitalAlert> {
    let fc = parse_measure(raw)?;
    let alert = if fc < 40.0 {
        VitalAlert::new(
            AlertLevel::Warning,
            "Bradicardia (puede ser normal en deportistas)",
        )
    } else if fc > 120.0 {
        VitalAlert::new(AlertLevel::Critical, "Taquicardia severa")
    } else if fc > 100.0 {
        VitalAlert::new(AlertLevel::Danger, "Taquicardia")
    } else {
        VitalAlert::new(AlertLevel::Normal, "Frecuencia cardíaca normal")
    };
    Some(alert)
}

/// Splits `"120/80"` into systolic and diastolic readings.
pub fn parse_blood_pressure(raw: &str) -> Option<(f64, f64)> {
    let (sistolica, diastolica) = raw.split_once('/')?;
    Some((parse_measure(sistolica)?, parse_measure(diastolica)?))
}

pub fn evaluate_blood_pressure(raw: &str) -> Option<VitalAlert> {
    let (s, d) = parse_blood_pressure(raw)?;
    // Crisis needs both readings over the limit.
    let alert = if s > 180.0 && d > 120.0 {
        VitalAlert::new(
            AlertLevel::Critical,
            "Crisis de hipertensión - Requiere atención inmediata",
        )
    } else if s >= 140.0 || d >= 90.0 {
        VitalAlert::new(AlertLevel::Danger, "Hipertensión Nivel 2")
    } else if (130.0..=139.0).contains(&s) || (d > 80.0 && d <= 89.0) {
        VitalAlert::new(AlertLevel::Danger, "Hipertensión Nivel 1")
    } else if (120.0..=129.0).contains(&s) && d <= 80.0 {
        VitalAlert::new(AlertLevel::Warning, "Presión arterial elevada")
    } else if s < 80.0 || d < 60.0 {
        VitalAlert::new(AlertLevel::Warning, "Hipotensión")
    } else {
        VitalAlert::new(AlertLevel::Normal, "Presión arterial normal")
    };
    Some(alert)
}

pub fn evaluate_respiratory_rate(raw: &str) -> Option<VitalAlert> {
    let fr = parse_measure(raw)?;
    let alert = if fr > 30.0 {
        VitalAlert::new(AlertLevel::Critical, "Taquipnea severa")
    } else if fr > 20.0 {
        VitalAlert::new(AlertLevel::Danger, "Taquipnea")
    } else if fr < 12.0 {
        VitalAlert::new(AlertLevel::Warning, "Bradipnea")
    } else {
        VitalAlert::new(AlertLevel::Normal, "Frecuencia respiratoria normal")
    };
    Some(alert)
}

pub fn evaluate_temperature(raw: &str) -> Option<VitalAlert> {
    let t = parse_measure(raw)?;
    let alert = if t > 39.0 {
        VitalAlert::new(AlertLevel::Critical, "Fiebre alta")
    } else if t > 38.0 {
        VitalAlert::new(AlertLevel::Danger, "Fiebre")
    } else if t >= 37.5 {
        VitalAlert::new(AlertLevel::Warning, "Febrícula")
    } else if t < 36.0 {
        VitalAlert::new(AlertLevel::Warning, "Hipotermia")
    } else {
        VitalAlert::new(AlertLevel::Normal, "Temperatura normal")
    };
    Some(alert)
}

pub fn evaluate_saturation(raw: &str) -> Option<VitalAlert> {
    let spo2 = parse_measure(raw)?;
    let alert = if spo2 < 90.0 {
        VitalAlert::new(
            AlertLevel::Critical,
            "Saturación crítica - Requiere atención inmediata",
        )
    } else if spo2 < 95.0 {
        VitalAlert::new(AlertLevel::Danger, "Saturación baja")
    } else if spo2 < 97.0 {
        VitalAlert::new(AlertLevel::Warning, "Saturación levemente baja")
    } else {
        VitalAlert::new(AlertLevel::Normal, "Saturación normal")
    };
    Some(alert)
}

/// The vitals panel: BMI plus one alert per readable measurement.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VitalsSummary {
    pub imc: Option<f64>,
    pub categoria_imc: Option<BmiCategory>,
    pub frecuencia_cardiaca: Option<VitalAlert>,
    pub presion_arterial: Option<VitalAlert>,
    pub frecuencia_respiratoria: Option<VitalAlert>,
    pub temperatura: Option<VitalAlert>,
    pub saturacion_oxigeno: Option<VitalAlert>,
}

impl VitalsSummary {
    /// Alerts that are present, in panel order.
    pub fn alerts(&self) -> impl Iterator<Item = (&'static str, &VitalAlert)> {
        [
            ("FC", self.frecuencia_cardiaca.as_ref()),
            ("TA", self.presion_arterial.as_ref()),
            ("FR", self.frecuencia_respiratoria.as_ref()),
            ("T°", self.temperatura.as_ref()),
            ("SpO2", self.saturacion_oxigeno.as_ref()),
        ]
        .into_iter()
        .filter_map(|(label, alert)| alert.map(|a| (label, a)))
    }

    /// Highest alert level among the readings, if any reading was usable.
    pub fn worst_level(&self) -> Option<AlertLevel> {
        self.alerts().map(|(_, alert)| alert.level).max()
    }
}

impl SignosVitales {
    pub fn summary(&self) -> VitalsSummary {
        let imc = bmi(&self.peso, &self.estatura);
        VitalsSummary {
            imc,
            categoria_imc: imc.map(BmiCategory::from_bmi),
            frecuencia_cardiaca: evaluate_heart_rate(&self.frecuencia_cardiaca),
            presion_arterial: evaluate_blood_pressure(&self.presion_arterial),
            frecuencia_respiratoria: evaluate_respiratory_rate(&self.frecuencia_respiratoria),
            temperatura: evaluate_temperature(&self.temperatura),
            saturacion_oxigeno: evaluate_saturation(&self.saturacion_oxigeno),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bmi_example() {
        assert_eq!(bmi("70", "175"), Some(22.86));
        assert_eq!(bmi_display("70", "175"), "22.86");
        assert_eq!(BmiCategory::from_bmi(22.86), BmiCategory::Normal);
    }

    #[test]
    fn test_bmi_missing_or_zero() {
        assert_eq!(bmi("", "175"), None);
        assert_eq!(bmi("70", "0"), None);
        assert_eq!(bmi("setenta", "175"), None);
        assert_eq!(bmi_display("70", ""), BMI_PLACEHOLDER);
    }

    #[test]
    fn test_bmi_comma_decimal() {
        assert_eq!(bmi("70,5", "175"), Some(23.02));
    }

    #[test]
    fn test_parse_measure_needs_whole_number() {
        assert_eq!(parse_measure(" 36,5 "), Some(36.5));
        assert_eq!(parse_measure("70kg"), None);
        assert_eq!(parse_measure("inf"), None);
        assert_eq!(bmi("70kg", "175"), None);
    }

    #[test]
    fn test_bmi_category_boundaries() {
        assert_eq!(BmiCategory::from_bmi(18.49), BmiCategory::BajoPeso);
        assert_eq!(BmiCategory::from_bmi(18.5), BmiCategory::Normal);
        assert_eq!(BmiCategory::from_bmi(25.0), BmiCategory::Sobrepeso);
        assert_eq!(BmiCategory::from_bmi(30.0), BmiCategory::Obesidad);
    }

    #[test]
    fn test_blood_pressure_table() {
        let level = |raw: &str| evaluate_blood_pressure(raw).map(|a| (a.level, a.message));

        assert_eq!(
            level("190/110"),
            Some((AlertLevel::Danger, "Hipertensión Nivel 2"))
        );
        assert_eq!(level("190/125").unwrap().0, AlertLevel::Critical);
        assert_eq!(
            level("135/78"),
            Some((AlertLevel::Danger, "Hipertensión Nivel 1"))
        );
        assert_eq!(
            level("125/80"),
            Some((AlertLevel::Warning, "Presión arterial elevada"))
        );
        assert_eq!(level("75/50"), Some((AlertLevel::Warning, "Hipotensión")));
        assert_eq!(
            level("110/70"),
            Some((AlertLevel::Normal, "Presión arterial normal"))
        );
        assert_eq!(level("120"), None);
        assert_eq!(level("abc/80"), None);
    }

    #[test]
    fn test_heart_rate_table() {
        assert_eq!(evaluate_heart_rate("38").unwrap().level, AlertLevel::Warning);
        assert_eq!(evaluate_heart_rate("110").unwrap().level, AlertLevel::Danger);
        assert_eq!(evaluate_heart_rate("121").unwrap().level, AlertLevel::Critical);
        assert_eq!(evaluate_heart_rate("70").unwrap().level, AlertLevel::Normal);
        assert!(evaluate_heart_rate("").is_none());
    }

    #[test]
    fn test_temperature_and_saturation() {
        assert_eq!(evaluate_temperature("37.8").unwrap().message, "Febrícula");
        assert_eq!(evaluate_temperature("38.5").unwrap().message, "Fiebre");
        assert_eq!(evaluate_temperature("39.5").unwrap().level, AlertLevel::Critical);
        assert_eq!(evaluate_temperature("35.5").unwrap().message, "Hipotermia");
        assert_eq!(evaluate_saturation("96").unwrap().level, AlertLevel::Warning);
        assert_eq!(evaluate_saturation("89").unwrap().level, AlertLevel::Critical);
        assert_eq!(evaluate_respiratory_rate("25").unwrap().message, "Taquipnea");
    }

    #[test]
    fn test_summary_end_to_end() {
        let vitals = SignosVitales {
            peso: "70".into(),
            estatura: "175".into(),
            presion_arterial: "190/110".into(),
            ..SignosVitales::default()
        };
        let summary = vitals.summary();

        assert_eq!(summary.imc, Some(22.86));
        assert_eq!(summary.categoria_imc.map(|c| c.label()), Some("Normal"));
        let ta = summary.presion_arterial.clone().unwrap();
        assert_eq!(ta.level, AlertLevel::Danger);
        assert_eq!(ta.message, "Hipertensión Nivel 2");
        assert_eq!(summary.worst_level(), Some(AlertLevel::Danger));
        assert_eq!(summary.alerts().count(), 5);
    }
}
