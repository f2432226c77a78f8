//! # INDER code tables
//!
//! Static lookup tables for the two coding systems used while writing a medical history:
//!
//! - **CIE-11** diagnosis codes, used for personal/family antecedents and diagnoses
//! - **CUPS** procedure codes, used for complementary tests
//!
//! Both tables ship as YAML under `data/` and are embedded at build time. They can also be
//! loaded from other YAML text with [`CodeTables::from_yaml`].
//!
//! ## Matching rules
//!
//! - Code lookup is an exact match after normalising the code (CIE-11: trimmed and
//!   upper-cased; CUPS: non-digits removed).
//! - Name search is a case-insensitive substring match, needs at least
//!   [`MIN_QUERY_CHARS`] characters, returns entries in table order and stops at
//!   [`MAX_SUGGESTIONS`]. There is no ranking and no fuzzy matching.

mod cie11;
mod cups;

pub use cie11::{Cie11Entry, Cie11Table};
pub use cups::{format_cups_code, CupsEntry, CupsTable};

use serde::de::DeserializeOwned;

/// Maximum number of suggestions returned by a name search.
pub const MAX_SUGGESTIONS: usize = 10;

/// Minimum number of characters a name query needs before any search runs.
pub const MIN_QUERY_CHARS: usize = 3;

const EMBEDDED_CIE11: &str = include_str!("../data/cie11.yaml");
const EMBEDDED_CUPS: &str = include_str!("../data/cups.yaml");

/// Errors that can occur while loading code tables.
#[derive(Debug, thiserror::Error)]
pub enum CodesError {
    /// The YAML did not match the table schema
    #[error("{table} table schema mismatch: {message}")]
    Schema {
        table: &'static str,
        message: String,
    },
    /// The same code appears more than once after normalisation
    #[error("{table} table contains duplicate code {code}")]
    DuplicateCode { table: &'static str, code: String },
}

pub type CodesResult<T> = std::result::Result<T, CodesError>;

/// Both code tables, loaded together.
#[derive(Debug, Clone)]
pub struct CodeTables {
    cie11: Cie11Table,
    cups: CupsTable,
}

impl CodeTables {
    /// Parses the tables embedded in the binary.
    ///
    /// # Errors
    ///
    /// Returns [`CodesError`] if an embedded table is malformed. This only happens if the
    /// files under `data/` were edited incorrectly.
    pub fn embedded() -> CodesResult<Self> {
        Self::from_yaml(EMBEDDED_CIE11, EMBEDDED_CUPS)
    }

    /// Parses both tables from YAML text.
    ///
    /// # Arguments
    ///
    /// * `cie11_yaml` - a list of `{code, name}` mappings
    /// * `cups_yaml` - a list of `{code, name, category}` mappings
    ///
    /// # Errors
    ///
    /// Returns [`CodesError::Schema`] with the failing path if either document does not
    /// match, or [`CodesError::DuplicateCode`] if a code repeats.
    pub fn from_yaml(cie11_yaml: &str, cups_yaml: &str) -> CodesResult<Self> {
        let cie11 = Cie11Table::new(parse_table("CIE-11", cie11_yaml)?)?;
        let cups = CupsTable::new(parse_table("CUPS", cups_yaml)?)?;
        tracing::debug!(
            "loaded code tables: {} CIE-11 entries, {} CUPS entries",
            cie11.len(),
            cups.len()
        );
        Ok(Self { cie11, cups })
    }

    pub fn cie11(&self) -> &Cie11Table {
        &self.cie11
    }

    pub fn cups(&self) -> &CupsTable {
        &self.cups
    }
}

fn parse_table<T: DeserializeOwned>(table: &'static str, yaml_text: &str) -> CodesResult<Vec<T>> {
    let deserializer = serde_yaml::Deserializer::from_str(yaml_text);

    match serde_path_to_error::deserialize(deserializer) {
        Ok(parsed) => Ok(parsed),
        Err(err) => {
            let path = err.path().to_string();
            let source = err.into_inner();
            let path = if path.is_empty() {
                "<root>"
            } else {
                path.as_str()
            };
            Err(CodesError::Schema {
                table,
                message: format!("at {path}: {source}"),
            })
        }
    }
}

/// Lower-cases a name query, or returns `None` if it is too short to search.
fn normalise_query(query: &str) -> Option<String> {
    let trimmed = query.trim();
    if trimmed.chars().count() < MIN_QUERY_CHARS {
        return None;
    }
    Some(trimmed.to_lowercase())
}
