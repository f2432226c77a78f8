use anyhow::Context;
use api_client::{ApiClient, ApiError};
use clap::{Parser, Subcommand};
use inder_core::config;
use inder_core::{ClientConfig, Session};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

mod commands;
mod historia;
mod render;

#[derive(Parser)]
#[command(name = "inder")]
#[command(about = "INDER sports clinical records client")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Check that the backend is up
    Health,
    /// Store a bearer token for later commands
    Login {
        #[arg(long)]
        token: String,
        /// Display name shown by other commands
        #[arg(long)]
        nombre: Option<String>,
    },
    /// Forget the stored token
    Logout,
    /// Look up CIE-11 and CUPS codes
    Codes {
        #[command(subcommand)]
        table: CodesCommand,
    },
    /// Athletes
    Deportistas {
        #[command(subcommand)]
        command: DeportistasCommand,
    },
    /// Appointments
    Citas {
        #[command(subcommand)]
        command: CitasCommand,
    },
    /// Print the reference catalogs
    Catalogos,
    /// Medical histories
    Historia {
        #[command(subcommand)]
        command: HistoriaCommand,
    },
    /// Files attached to a history
    Archivos {
        #[command(subcommand)]
        command: ArchivosCommand,
    },
    /// Download a history through a secure link
    Descarga {
        token: String,
        /// Cédula of the athlete the history belongs to
        #[arg(long)]
        cedula: String,
        /// Directory to save the PDF in
        #[arg(long)]
        dir: Option<PathBuf>,
    },
    /// Summary report over athletes and appointments
    Reportes,
}

#[derive(Subcommand)]
enum CodesCommand {
    Cie11 {
        code: Option<String>,
        #[arg(long)]
        search: Option<String>,
    },
    Cups {
        code: Option<String>,
        #[arg(long)]
        search: Option<String>,
    },
}

#[derive(Subcommand)]
enum DeportistasCommand {
    List {
        #[arg(long, default_value_t = 1)]
        page: usize,
        #[arg(long, default_value_t = 20)]
        page_size: usize,
    },
    /// Search by name or document number
    Search { query: String },
    Show { id: Uuid },
    /// Create an athlete from a YAML or JSON file
    Create { file: PathBuf },
    Delete { id: Uuid },
}

#[derive(Subcommand)]
enum CitasCommand {
    List {
        #[arg(long, default_value_t = 1)]
        page: usize,
        #[arg(long, default_value_t = 20)]
        page_size: usize,
    },
    /// Athletes with an appointment today
    Hoy,
    Crear {
        #[arg(long)]
        deportista: Uuid,
        /// YYYY-MM-DD
        #[arg(long)]
        fecha: chrono::NaiveDate,
        /// HH:MM
        #[arg(long)]
        hora: String,
        /// Appointment type, by catalog name
        #[arg(long)]
        tipo: String,
        #[arg(long, default_value = "Programada")]
        estado: String,
        #[arg(long)]
        observaciones: Option<String>,
    },
    /// Month view of appointments
    Calendario { year: i32, month: u32 },
}

#[derive(Subcommand)]
enum HistoriaCommand {
    /// Check a draft step by step without sending it
    Validate { draft: PathBuf },
    /// Validate a draft and submit it
    Submit {
        draft: PathBuf,
        #[arg(long)]
        deportista: Uuid,
    },
    Show { id: Uuid },
    /// Save the history as PDF
    Pdf {
        id: Uuid,
        #[arg(long)]
        dir: Option<PathBuf>,
    },
    /// Have the server e-mail the PDF
    Email { id: Uuid, to: String },
    /// Create a secure download link
    Share {
        id: Uuid,
        /// Also print a WhatsApp link for this number
        #[arg(long)]
        telefono: Option<String>,
    },
}

#[derive(Subcommand)]
enum ArchivosCommand {
    List { historia_id: Uuid },
    Subir {
        historia_id: Uuid,
        path: PathBuf,
        #[arg(long, default_value = "General")]
        categoria: String,
    },
}

/// Entry point for the `inder` command.
///
/// # Environment Variables
/// - `INDER_API_URL`: REST API base (default: "http://localhost:8000/api/v1")
/// - `INDER_API_TIMEOUT_MS`: request timeout in milliseconds (default: 10000)
/// - `INDER_SESSION_FILE`: where the bearer token is kept (default: ".inder/session.json")
/// - `INDER_DOWNLOAD_DIR`: where PDFs are saved (default: ".")
/// - `INDER_FRONTEND_URL`: web app base, used for share links (default: "http://localhost:5173")
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("inder=info".parse()?)
                .add_directive("api_client=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let Some(command) = cli.command else {
        println!("Use 'inder --help' for commands");
        return Ok(());
    };

    let config = load_config()?;
    let mut session = Session::load(config.session_file())?;

    let authenticated = !matches!(command, Commands::Descarga { .. } | Commands::Health);
    if let Err(err) = run(command, &config, &mut session).await {
        if authenticated
            && matches!(err.downcast_ref::<ApiError>(), Some(ApiError::Unauthorized { .. }))
        {
            session.clear()?;
            eprintln!("error: {err:#} (sesión cerrada, inicie sesión de nuevo)");
        } else {
            eprintln!("error: {err:#}");
        }
        std::process::exit(1);
    }

    Ok(())
}

fn load_config() -> anyhow::Result<ClientConfig> {
    let env = |name: &str| std::env::var(name).ok();
    let config = ClientConfig::new(
        config::api_url_from_env_value(env("INDER_API_URL")),
        config::timeout_from_env_value(env("INDER_API_TIMEOUT_MS"))?,
        config::session_file_from_env_value(env("INDER_SESSION_FILE")),
        config::download_dir_from_env_value(env("INDER_DOWNLOAD_DIR")),
        config::frontend_url_from_env_value(env("INDER_FRONTEND_URL")),
    )?;
    tracing::debug!(api = config.api_base_url(), "configuration resolved");
    Ok(config)
}

async fn run(command: Commands, config: &ClientConfig, session: &mut Session) -> anyhow::Result<()> {
    match command {
        Commands::Login { token, nombre } => {
            let perfil = nombre.map(|nombre| inder_core::PerfilUsuario {
                nombre: Some(nombre),
                ..Default::default()
            });
            session.sign_in(token, perfil)?;
            println!("Sesión guardada en {}", session.path().display());
            return Ok(());
        }
        Commands::Logout => {
            session.clear()?;
            println!("Sesión cerrada");
            return Ok(());
        }
        Commands::Codes { table } => return commands::codes(table),
        Commands::Historia {
            command: HistoriaCommand::Validate { draft },
        } => return historia::validate(&draft),
        _ => {}
    }

    let client = ApiClient::new(config, session).context("building HTTP client")?;

    match command {
        Commands::Health => {
            let health = client.health().await?;
            println!(
                "{} {} ({})",
                health.status,
                health.app.as_deref().unwrap_or("-"),
                health.environment.as_deref().unwrap_or("-")
            );
        }
        Commands::Deportistas { command } => commands::deportistas(&client, command).await?,
        Commands::Citas { command } => commands::citas(&client, command).await?,
        Commands::Catalogos => {
            let catalogos = client.catalogos().load_all().await?;
            print!("{}", render::catalogos(&catalogos));
        }
        Commands::Historia { command } => historia::run(&client, config, command).await?,
        Commands::Archivos { command } => commands::archivos(&client, command).await?,
        Commands::Descarga { token, cedula, dir } => {
            let dir = dir.unwrap_or_else(|| config.download_dir().to_path_buf());
            commands::descarga(&client, &token, &cedula, &dir).await?
        }
        Commands::Reportes => commands::reportes(&client).await?,
        Commands::Login { .. } | Commands::Logout | Commands::Codes { .. } => {}
    }

    Ok(())
}
