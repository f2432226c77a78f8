use crate::render;
use crate::{ArchivosCommand, CitasCommand, CodesCommand, DeportistasCommand};
use anyhow::{anyhow, bail, Context};
use api_client::{ApiClient, DownloadState};
use chrono::{Local, NaiveTime, Utc};
use inder_codes::CodeTables;
use inder_core::calendar;
use inder_core::models::{Cita, CitaCreate, DeportistaCreate};
use inder_core::reports::ReportSummary;
use std::path::Path;

const CITAS_PAGE_SIZE: usize = 100;

pub fn codes(table: CodesCommand) -> anyhow::Result<()> {
    let tables = CodeTables::embedded()?;

    match table {
        CodesCommand::Cie11 { code, search } => {
            if let Some(code) = code {
                let name = tables
                    .cie11()
                    .lookup(&code)
                    .ok_or_else(|| anyhow!("código CIE-11 no encontrado: {code}"))?;
                println!("{} {name}", code.trim().to_uppercase());
            }
            if let Some(query) = search {
                let mut hits = tables.cie11().search(&query);
                if hits.is_empty() {
                    hits = tables.cie11().search_code_prefix(&query);
                }
                for entry in hits {
                    println!("{:<8}{}", entry.code, entry.name);
                }
            }
        }
        CodesCommand::Cups { code, search } => {
            if let Some(code) = code {
                let entry = tables
                    .cups()
                    .lookup(&code)
                    .ok_or_else(|| anyhow!("código CUPS no encontrado: {code}"))?;
                println!("{} {} [{}]", entry.code, entry.name, entry.category);
            }
            if let Some(query) = search {
                for entry in tables.cups().search(&query) {
                    println!("{:<8}{} [{}]", entry.code, entry.name, entry.category);
                }
            }
        }
    }
    Ok(())
}

pub async fn deportistas(client: &ApiClient, command: DeportistasCommand) -> anyhow::Result<()> {
    let api = client.deportistas();

    match command {
        DeportistasCommand::List { page, page_size } => {
            let page = api.list(page, page_size).await?;
            print!("{}", render::deportistas(&page.items));
            println!(
                "Página {} de {} ({} deportistas)",
                page.page,
                page.total_pages.max(1),
                page.total
            );
        }
        DeportistasCommand::Search { query } => {
            let found = api.search(&query).await?;
            if found.is_empty() {
                println!("Sin resultados para '{query}'");
            } else {
                print!("{}", render::deportistas(&found));
            }
        }
        DeportistasCommand::Show { id } => {
            let deportista = api.get(id).await?;
            let historias = client.historias().by_deportista(id).await?;
            let vacunas = api.vacunas(id).await?;
            print!(
                "{}",
                render::deportista(&deportista, &historias, &vacunas, Local::now().date_naive())
            );
        }
        DeportistasCommand::Create { file } => {
            let data: DeportistaCreate = read_document(&file)?;
            let creado = api.create(&data).await?;
            println!("Deportista creado: {} ({})", creado.nombre_completo(), creado.id);
        }
        DeportistasCommand::Delete { id } => {
            api.delete(id).await?;
            println!("Deportista eliminado: {id}");
        }
    }
    Ok(())
}

pub async fn citas(client: &ApiClient, command: CitasCommand) -> anyhow::Result<()> {
    match command {
        CitasCommand::List { page, page_size } => {
            let citas = client.citas().list(page, page_size).await?;
            print!("{}", render::citas(&citas));
        }
        CitasCommand::Hoy => {
            let hoy = client.citas().deportistas_con_citas_hoy().await?;
            if hoy.is_empty() {
                println!("No hay citas para hoy");
            }
            for cita in hoy {
                let hora = cita
                    .cita_hora
                    .map(|h| h.format("%H:%M").to_string())
                    .unwrap_or_else(|| "--:--".into());
                println!(
                    "{hora}  {} {} ({})  {}  {}",
                    cita.nombres, cita.apellidos, cita.numero_documento, cita.cita_tipo, cita.cita_estado
                );
            }
        }
        CitasCommand::Crear {
            deportista,
            fecha,
            hora,
            tipo,
            estado,
            observaciones,
        } => {
            let hora = NaiveTime::parse_from_str(&hora, "%H:%M")
                .or_else(|_| NaiveTime::parse_from_str(&hora, "%H:%M:%S"))
                .with_context(|| format!("hora inválida: {hora}"))?;
            let catalogos = client.catalogos().load_all().await?;
            let tipo_cita = catalogos
                .by_nombre("tipo_cita", &tipo)
                .ok_or_else(|| anyhow!("tipo de cita desconocido: {tipo}"))?;
            let estado_cita = catalogos
                .by_nombre("estado_cita", &estado)
                .ok_or_else(|| anyhow!("estado de cita desconocido: {estado}"))?;

            let cita = client
                .citas()
                .create(&CitaCreate {
                    deportista_id: deportista,
                    fecha,
                    hora,
                    tipo_cita_id: tipo_cita.id,
                    estado_cita_id: estado_cita.id,
                    observaciones,
                })
                .await?;
            println!("Cita creada: {} {} ({})", cita.fecha, cita.hora.format("%H:%M"), cita.id);
        }
        CitasCommand::Calendario { year, month } => {
            let citas = all_citas(client).await?;
            let grid = calendar::month_grid(&citas, year, month)
                .ok_or_else(|| anyhow!("mes inválido: {month}"))?;
            print!("{}", render::calendario(&grid));
        }
    }
    Ok(())
}

pub async fn archivos(client: &ApiClient, command: ArchivosCommand) -> anyhow::Result<()> {
    match command {
        ArchivosCommand::List { historia_id } => {
            let archivos = client.archivos().by_historia(historia_id).await?;
            if archivos.is_empty() {
                println!("La historia no tiene archivos");
            }
            for archivo in archivos {
                println!(
                    "{}  {}  {}  {}",
                    archivo.fecha_subida.format("%Y-%m-%d"),
                    archivo.categoria.as_deref().unwrap_or("-"),
                    archivo.nombre_original,
                    archivo.id
                );
            }
        }
        ArchivosCommand::Subir {
            historia_id,
            path,
            categoria,
        } => {
            let file = inder_files::inspect(&path)?;
            let archivo = client
                .archivos()
                .upload(historia_id, &categoria, &file)
                .await?;
            println!(
                "Archivo subido: {} ({}, {})",
                archivo.nombre_original,
                inder_files::format_size(file.metadata.tamano),
                file.metadata.tipo
            );
        }
    }
    Ok(())
}

/// The athlete-side secure download: check the link, verify the cédula, save the PDF.
pub async fn descarga(client: &ApiClient, token: &str, cedula: &str, dir: &Path) -> anyhow::Result<()> {
    let mut flow = client.secure_download(token);

    if let DownloadState::Invalid { mensaje } = flow.start().await? {
        bail!("{mensaje}");
    }
    if let Some(remaining) = flow.remaining_time(Utc::now().naive_utc()) {
        println!(
            "El enlace vence en {}",
            api_client::secure_download::format_remaining(remaining)
        );
    }

    match flow.verify(cedula).await?.clone() {
        DownloadState::Verified => {}
        DownloadState::Ready {
            intentos_restantes, ..
        } => {
            let mensaje = flow.mensaje().unwrap_or("Cédula incorrecta");
            match intentos_restantes {
                Some(n) => bail!("{mensaje} (intentos restantes: {n})"),
                None => bail!("{mensaje}"),
            }
        }
        DownloadState::Blocked { mensaje } | DownloadState::Invalid { mensaje } => bail!("{mensaje}"),
        other => bail!("estado inesperado: {other:?}"),
    }

    if let DownloadState::Downloaded { path } = flow.download(dir).await? {
        println!("Historia guardada en {}", path.display());
        return Ok(());
    }
    bail!("{}", flow.mensaje().unwrap_or("No se pudo descargar la historia"))
}

pub async fn reportes(client: &ApiClient) -> anyhow::Result<()> {
    let (deportistas_api, catalogos_api, historias_api) =
        (client.deportistas(), client.catalogos(), client.historias());
    let (deportistas, citas, catalogos, historias) = tokio::try_join!(
        deportistas_api.all(),
        all_citas(client),
        catalogos_api.load_all(),
        historias_api.list(),
    )?;

    let summary = ReportSummary::build(&deportistas, &citas, &catalogos.estado_cita)
        .with_historias(historias.len());
    print!("{}", summary.render_text(Local::now().naive_local()));
    Ok(())
}

/// Every appointment, following the server's pages until a short one.
async fn all_citas(client: &ApiClient) -> api_client::ApiResult<Vec<Cita>> {
    let mut all = Vec::new();
    let mut page = 1;
    loop {
        let batch = client.citas().list(page, CITAS_PAGE_SIZE).await?;
        let done = batch.len() < CITAS_PAGE_SIZE;
        all.extend(batch);
        if done {
            return Ok(all);
        }
        page += 1;
    }
}

/// Reads a YAML (or JSON) document, reporting the path of the first bad field.
pub fn read_document<T: serde::de::DeserializeOwned>(path: &Path) -> anyhow::Result<T> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    let deserializer = serde_yaml::Deserializer::from_str(&text);
    serde_path_to_error::deserialize(deserializer).map_err(|err| {
        anyhow!(
            "{}: invalid value at {}: {}",
            path.display(),
            err.path(),
            err.inner()
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use inder_core::models::CitaUpdate;

    #[test]
    fn test_read_document_reports_bad_field() {
        let temp = tempfile::TempDir::new().unwrap();
        let path = temp.path().join("cita.yaml");
        std::fs::write(&path, "fecha: 2025-02-30\n").unwrap();

        let err = read_document::<CitaUpdate>(&path).expect_err("invalid date");
        assert!(err.to_string().contains("at fecha"), "{err}");
    }

    #[test]
    fn test_read_document_rejects_unknown_fields() {
        let temp = tempfile::TempDir::new().unwrap();
        let path = temp.path().join("cita.yaml");
        std::fs::write(&path, "observaciones: control\nlugar: coliseo\n").unwrap();

        assert!(read_document::<CitaUpdate>(&path).is_err());

        std::fs::write(&path, "observaciones: control\n").unwrap();
        let update: CitaUpdate = read_document(&path).unwrap();
        assert_eq!(update.observaciones.as_deref(), Some("control"));
    }
}
