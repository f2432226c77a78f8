//! Plain-text views printed by the commands.

use api_client::catalogos::Catalogos;
use chrono::NaiveDate;
use inder_core::calendar::MonthGrid;
use inder_core::models::{Cita, Deportista, HistoriaResumen, Vacuna};
use inder_core::vitals::{bmi_display, VitalsSummary};
use inder_core::historia::SignosVitales;
use std::fmt::Write as _;

pub fn catalogos(catalogos: &Catalogos) -> String {
    let mut out = String::new();
    for (nombre, items) in catalogos.iter() {
        let _ = writeln!(out, "{nombre}");
        for item in items {
            let inactivo = if item.activo { "" } else { " (inactivo)" };
            let _ = writeln!(out, "  {}  {}{inactivo}", item.id, item.nombre);
        }
    }
    out
}

pub fn deportistas(deportistas: &[Deportista]) -> String {
    let mut out = String::new();
    for d in deportistas {
        let _ = writeln!(
            out,
            "{:<14}{:<36}{:<16}{}",
            d.numero_documento,
            d.nombre_completo(),
            d.tipo_deporte.as_deref().unwrap_or("-"),
            d.id
        );
    }
    out
}

pub fn deportista(
    deportista: &Deportista,
    historias: &[HistoriaResumen],
    vacunas: &[Vacuna],
    today: NaiveDate,
) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", deportista.nombre_completo());
    let _ = writeln!(out, "  Documento:  {}", deportista.numero_documento);
    let _ = writeln!(
        out,
        "  Nacimiento: {} ({} años)",
        deportista.fecha_nacimiento,
        deportista.edad(today)
    );
    let _ = writeln!(
        out,
        "  Deporte:    {}",
        deportista.tipo_deporte.as_deref().unwrap_or("-")
    );
    if let Some(telefono) = &deportista.telefono {
        let _ = writeln!(out, "  Teléfono:   {telefono}");
    }
    if let Some(email) = &deportista.email {
        let _ = writeln!(out, "  Email:      {email}");
    }

    let _ = writeln!(out, "Historias clínicas: {}", historias.len());
    for historia in historias {
        let fecha = historia
            .fecha_apertura
            .map(|f| f.to_string())
            .unwrap_or_else(|| "-".into());
        let _ = writeln!(out, "  {fecha}  {}", historia.id);
    }

    let _ = writeln!(out, "Vacunas: {}", vacunas.len());
    for vacuna in vacunas {
        let fecha = vacuna
            .fecha_administracion
            .map(|f| f.to_string())
            .unwrap_or_else(|| "-".into());
        let adjunto = if vacuna.nombre_archivo.is_some() { " [certificado]" } else { "" };
        let _ = writeln!(out, "  {fecha}  {}{adjunto}", vacuna.nombre_vacuna);
    }
    out
}

pub fn citas(citas: &[Cita]) -> String {
    let mut out = String::new();
    for cita in citas {
        let tipo = cita.tipo_cita.as_ref().map(|t| t.nombre.as_str()).unwrap_or("-");
        let estado = cita.estado_cita.as_ref().map(|e| e.nombre.as_str()).unwrap_or("-");
        let _ = writeln!(
            out,
            "{} {}  {:<14}{:<12}{}",
            cita.fecha,
            cita.hora.format("%H:%M"),
            tipo,
            estado,
            cita.deportista_id
        );
    }
    out
}

/// The grid followed by the appointments of each busy day.
pub fn calendario(grid: &MonthGrid<'_>) -> String {
    let mut out = grid.render_text();
    let _ = writeln!(out, "\n{} citas", grid.total());
    for dia in grid.dias.iter().filter(|dia| !dia.citas.is_empty()) {
        let _ = writeln!(out, "{}", dia.fecha.format("%d/%m"));
        out.push_str(&indent(&citas(&dia.citas.iter().copied().cloned().collect::<Vec<_>>())));
    }
    out
}

/// The vitals panel: every reading next to its evaluation.
pub fn vitals(signos: &SignosVitales, summary: &VitalsSummary) -> String {
    let mut out = String::new();
    let imc = match summary.categoria_imc {
        Some(categoria) => format!(
            "{} ({categoria})",
            bmi_display(&signos.peso, &signos.estatura)
        ),
        None => "-".into(),
    };
    let _ = writeln!(out, "  IMC   {imc}");

    let lecturas = [
        ("FC", &signos.frecuencia_cardiaca),
        ("TA", &signos.presion_arterial),
        ("FR", &signos.frecuencia_respiratoria),
        ("T°", &signos.temperatura),
        ("SpO2", &signos.saturacion_oxigeno),
    ];
    for (label, valor) in lecturas {
        match summary.alerts().find(|(l, _)| *l == label) {
            Some((_, alert)) => {
                let _ = writeln!(out, "  {label:<6}{valor:<10}[{}] {}", alert.level, alert.message);
            }
            None => {
                let _ = writeln!(out, "  {label:<6}{valor:<10}-");
            }
        }
    }
    out
}

fn indent(text: &str) -> String {
    text.lines().map(|line| format!("  {line}\n")).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vitals_panel_flags_hypertension() {
        let signos = SignosVitales {
            peso: "70".into(),
            estatura: "175".into(),
            presion_arterial: "190/110".into(),
            ..Default::default()
        };
        let panel = vitals(&signos, &signos.summary());
        assert!(panel.contains("22.86 (Normal)"), "{panel}");
        assert!(panel.contains("[danger]"), "{panel}");
    }

    #[test]
    fn test_indent() {
        assert_eq!(indent("a\nb"), "  a\n  b\n");
    }
}
