//! Dashboard figures computed from the athlete and appointment lists.

use crate::constants::SIN_ASIGNAR;
use crate::models::{CatalogoItem, Cita, Deportista};
use chrono::{Datelike, NaiveDateTime};
use serde::Serialize;
use std::collections::HashMap;
use std::fmt::Write as _;
use uuid::Uuid;

pub const MESES: [&str; 12] = [
    "Ene", "Feb", "Mar", "Abr", "May", "Jun", "Jul", "Ago", "Sep", "Oct", "Nov", "Dic",
];

const RULE: &str = "═══════════════════════════════════════════════════════════════════";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConteoDeporte {
    pub deporte: String,
    pub total: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportSummary {
    pub total_deportistas: usize,
    pub total_citas: usize,
    pub total_historias: usize,
    pub citas_completadas: usize,
    pub citas_programadas: usize,
    pub citas_canceladas: usize,
    /// Percent, one decimal.
    pub tasa_completitud: f64,
    /// Percent, one decimal.
    pub tasa_cancelacion: f64,
    pub deportistas_por_deporte: Vec<ConteoDeporte>,
    /// `(month label, appointments)` for January to December.
    pub citas_por_mes: Vec<(&'static str, usize)>,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum EstadoCita {
    Realizada,
    Programada,
    Cancelada,
    Otro,
}

fn classify(nombre: &str) -> EstadoCita {
    let nombre = nombre.to_lowercase();
    if nombre.contains("realizada") {
        EstadoCita::Realizada
    } else if nombre.contains("programada") {
        EstadoCita::Programada
    } else if nombre.contains("cancelada") {
        EstadoCita::Cancelada
    } else {
        EstadoCita::Otro
    }
}

fn percent(part: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    (part as f64 / total as f64 * 1000.0).round() / 10.0
}

impl ReportSummary {
    /// Builds the summary.
    ///
    /// An appointment's state is taken from its embedded `estado_cita` when present, and
    /// otherwise looked up by id in `estados_cita`.
    pub fn build(deportistas: &[Deportista], citas: &[Cita], estados_cita: &[CatalogoItem]) -> Self {
        let nombres: HashMap<Uuid, &str> = estados_cita
            .iter()
            .map(|item| (item.id, item.nombre.as_str()))
            .collect();

        let mut completadas = 0;
        let mut programadas = 0;
        let mut canceladas = 0;
        let mut por_mes = [0usize; 12];

        for cita in citas {
            let nombre = cita
                .estado_cita
                .as_ref()
                .map(|e| e.nombre.as_str())
                .or_else(|| nombres.get(&cita.estado_cita_id).copied())
                .unwrap_or_default();
            match classify(nombre) {
                EstadoCita::Realizada => completadas += 1,
                EstadoCita::Programada => programadas += 1,
                EstadoCita::Cancelada => canceladas += 1,
                EstadoCita::Otro => {}
            }
            por_mes[cita.fecha.month0() as usize] += 1;
        }

        let mut conteo: HashMap<String, usize> = HashMap::new();
        for deportista in deportistas {
            let deporte = deportista
                .tipo_deporte
                .as_deref()
                .map(str::trim)
                .filter(|d| !d.is_empty())
                .unwrap_or(SIN_ASIGNAR);
            *conteo.entry(deporte.to_string()).or_default() += 1;
        }
        let mut deportistas_por_deporte: Vec<ConteoDeporte> = conteo
            .into_iter()
            .map(|(deporte, total)| ConteoDeporte { deporte, total })
            .collect();
        deportistas_por_deporte
            .sort_by(|a, b| b.total.cmp(&a.total).then_with(|| a.deporte.cmp(&b.deporte)));

        Self {
            total_deportistas: deportistas.len(),
            total_citas: citas.len(),
            total_historias: 0,
            citas_completadas: completadas,
            citas_programadas: programadas,
            citas_canceladas: canceladas,
            tasa_completitud: percent(completadas, citas.len()),
            tasa_cancelacion: percent(canceladas, citas.len()),
            deportistas_por_deporte,
            citas_por_mes: MESES.iter().copied().zip(por_mes).collect(),
        }
    }

    pub fn with_historias(mut self, total: usize) -> Self {
        self.total_historias = total;
        self
    }

    /// Appointments per athlete, two decimals in the text report.
    pub fn ratio_citas(&self) -> f64 {
        self.total_citas as f64 / self.total_deportistas.max(1) as f64
    }

    /// Plain-text export of the summary.
    pub fn render_text(&self, generado: NaiveDateTime) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "REPORTE DE ESTADÍSTICAS - INDER");
        let _ = writeln!(out);
        let _ = writeln!(out, "Fecha de generación: {}", generado.format("%d/%m/%Y"));
        let _ = writeln!(out, "Hora: {}", generado.format("%H:%M:%S"));
        let _ = writeln!(out);

        section(&mut out, "RESUMEN EJECUTIVO");
        row(&mut out, "Total de Deportistas:", self.total_deportistas.to_string());
        row(&mut out, "Total de Citas:", self.total_citas.to_string());
        row(&mut out, "Total de Historias Clínicas:", self.total_historias.to_string());
        let _ = writeln!(out);

        section(&mut out, "ESTADO DE CITAS");
        row(
            &mut out,
            "Citas Completadas:",
            format!("{}  ({}%)", self.citas_completadas, self.tasa_completitud),
        );
        row(&mut out, "Citas Programadas:", self.citas_programadas.to_string());
        row(
            &mut out,
            "Citas Canceladas:",
            format!("{}  ({}%)", self.citas_canceladas, self.tasa_cancelacion),
        );
        let _ = writeln!(out);

        section(&mut out, "INDICADORES CLAVE");
        row(&mut out, "Tasa de Completitud:", format!("{}%", self.tasa_completitud));
        row(&mut out, "Tasa de Cancelación:", format!("{}%", self.tasa_cancelacion));
        row(&mut out, "Ratio Deportistas/Citas:", format!("{:.2}", self.ratio_citas()));
        let _ = writeln!(out);

        if !self.deportistas_por_deporte.is_empty() {
            section(&mut out, "DEPORTISTAS POR DEPORTE");
            for conteo in &self.deportistas_por_deporte {
                row(&mut out, &format!("{}:", conteo.deporte), conteo.total.to_string());
            }
            let _ = writeln!(out);
        }

        section(&mut out, "CITAS POR MES");
        for (mes, total) in &self.citas_por_mes {
            row(&mut out, &format!("{mes}:"), total.to_string());
        }
        let _ = writeln!(out, "{RULE}");
        out
    }
}

fn section(out: &mut String, title: &str) {
    let _ = writeln!(out, "{RULE}\n{title}\n{RULE}\n");
}

fn row(out: &mut String, label: &str, value: String) {
    let _ = writeln!(out, "{label:<32}{value}");
}
