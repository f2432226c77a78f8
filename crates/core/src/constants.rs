//! Constants used throughout the INDER core crate.

/// Default REST base URL when `INDER_API_URL` is not set.
pub const DEFAULT_API_URL: &str = "http://localhost:8000/api/v1";

/// Default request timeout in milliseconds.
pub const DEFAULT_TIMEOUT_MS: u64 = 10_000;

/// Default location of the persisted session.
pub const DEFAULT_SESSION_FILE: &str = ".inder/session.json";

/// Default directory for downloaded documents.
pub const DEFAULT_DOWNLOAD_DIR: &str = ".";

/// Default base URL of the web front end, used to rebuild share links.
pub const DEFAULT_FRONTEND_URL: &str = "http://localhost:5173";

/// Number of wizard steps.
pub const TOTAL_STEPS: u8 = 7;

/// Label used in reports for athletes without a sport.
pub const SIN_ASIGNAR: &str = "Sin asignar";

/// Fixed list of specialists offered for referrals.
pub const ESPECIALISTAS: &[&str] = &[
    "Psicólogo/a Deportivo",
    "Médico Fisiatra",
    "Nutricionista Deportivo",
    "Fisioterapeuta",
    "Cardiólogo",
    "Médico Ortopedista",
];

/// Relatives offered for family antecedents.
pub const FAMILIARES: &[&str] = &[
    "Padre",
    "Madre",
    "Hermano/a",
    "Abuelo Paterno",
    "Abuela Paterna",
    "Abuelo Materno",
    "Abuela Materna",
    "Tío/a Paterno/a",
    "Tío/a Materno/a",
    "Otro",
];

/// Names of the catalogs loaded once at start-up.
pub const CATALOGOS: &[&str] = &[
    "tipo_documento",
    "sexo",
    "estado_deportista",
    "tipo_cita",
    "estado_cita",
];
