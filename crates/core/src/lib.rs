//! # INDER Core
//!
//! Client-side business logic for the INDER sports-medicine records system.
//!
//! This crate holds everything that does not talk to the network:
//! - The seven-step medical-history wizard, its draft and per-step validation
//! - Coded list editors backed by the CIE-11 and CUPS tables
//! - Derived vital-sign values (BMI, threshold alerts)
//! - Report and calendar views over appointment data
//! - Client configuration and the persisted session
//!
//! **No HTTP concerns**: requests, response decoding and the secure-download flow belong in
//! `api-client`.

pub mod alergias;
pub mod calendar;
pub mod config;
pub mod constants;
pub mod editors;
pub mod error;
pub mod historia;
pub mod models;
pub mod reports;
pub mod session;
pub mod validation;
pub mod vitals;
pub mod wizard;

pub use config::ClientConfig;
pub use error::{CoreError, CoreResult};
pub use historia::{HistoriaClinicaData, HistoriaPatch, HistoriaSubmission};
pub use session::{PerfilUsuario, Session};
pub use validation::{FieldIssue, StepValidationError};
pub use wizard::{Step, Wizard};

pub use inder_codes::CodeTables;
