use crate::HistoriaCommand;
use anyhow::{bail, Context};
use api_client::{share, ApiClient};
use inder_core::validation::{advisories, validate_step};
use inder_core::{ClientConfig, HistoriaClinicaData, Step, Wizard};
use std::path::Path;
use uuid::Uuid;

pub async fn run(client: &ApiClient, config: &ClientConfig, command: HistoriaCommand) -> anyhow::Result<()> {
    match command {
        HistoriaCommand::Validate { draft } => validate(&draft)?,
        HistoriaCommand::Submit { draft, deportista } => submit(client, &draft, deportista).await?,
        HistoriaCommand::Show { id } => {
            let completa = client.historias().completa(id).await?;
            println!("{}", serde_json::to_string_pretty(&completa)?);
        }
        HistoriaCommand::Pdf { id, dir } => {
            let dir = dir.unwrap_or_else(|| config.download_dir().to_path_buf());
            let download = client.documentos().historia_pdf(id).await?;
            let filename = download
                .filename
                .as_deref()
                .and_then(api_client::sanitise_filename)
                .unwrap_or_else(|| format!("historia_clinica_{id}.pdf"));
            let path = dir.join(filename);
            std::fs::write(&path, &download.bytes)
                .with_context(|| format!("writing {}", path.display()))?;
            println!("PDF guardado en {}", path.display());
        }
        HistoriaCommand::Email { id, to } => {
            let envio = client.documentos().enviar_email(id, &to).await?;
            println!(
                "{}",
                envio
                    .message
                    .unwrap_or_else(|| format!("Historia enviada a {}", to.trim()))
            );
        }
        HistoriaCommand::Share { id, telefono } => {
            let generado = client.descarga_segura().generar_token(id).await?;
            let url = generado
                .url
                .clone()
                .unwrap_or_else(|| share::download_page(config.frontend_base_url(), &generado.token));
            println!("Enlace: {url}");
            if let Some(expira_en) = &generado.expira_en {
                println!("Vence en: {expira_en}");
            }
            if let Some(telefono) = telefono {
                println!("WhatsApp: {}", share::whatsapp_link(&telefono, &url)?);
            }
        }
    }
    Ok(())
}

/// Checks every step of a draft and prints what blocks it and what is only advised.
pub fn validate(draft: &Path) -> anyhow::Result<()> {
    let data = load_draft(draft)?;
    let mut blocked = 0;

    for step in Step::ALL {
        match validate_step(step, &data) {
            Ok(()) => println!("{step}  OK"),
            Err(err) => {
                blocked += 1;
                println!("{step}  INCOMPLETO");
                for issue in &err.issues {
                    println!("  - {issue}");
                }
            }
        }
        for advisory in advisories(step, &data) {
            println!("  ~ {advisory}");
        }
    }

    let signos = &data.signos_vitales;
    println!("\nSignos vitales");
    print!("{}", crate::render::vitals(signos, &signos.summary()));

    if blocked > 0 {
        bail!("el borrador tiene {blocked} paso(s) incompletos");
    }
    Ok(())
}

/// Walks the wizard over the draft and submits it once every step passes.
async fn submit(client: &ApiClient, draft: &Path, deportista_id: Uuid) -> anyhow::Result<()> {
    let data = load_draft(draft)?;
    let mut wizard = Wizard::with_data(deportista_id, data);

    loop {
        for advisory in wizard.advisories() {
            println!("{}  ~ {advisory}", wizard.step());
        }
        if wizard.step().is_last() {
            break;
        }
        wizard.next()?;
    }

    let submission = wizard.finish()?;
    let creada = client.historias().crear_completa(&submission).await?;
    println!(
        "{} ({})",
        creada
            .message
            .as_deref()
            .unwrap_or("Historia clínica creada"),
        creada.historia_clinica_id
    );
    Ok(())
}

fn load_draft(path: &Path) -> anyhow::Result<HistoriaClinicaData> {
    HistoriaClinicaData::load(path).with_context(|| format!("loading draft {}", path.display()))
}
