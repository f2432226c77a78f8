//! The athlete-facing side of a secure download link.
//!
//! [`SecureDownload`] walks a token through `info`, `verificar` and `descargar`, turning the
//! server's refusals into states a caller can show. It keeps no counter and no clock of its
//! own: attempts left and expiry are whatever the server last reported.

use crate::client::sanitise_filename;
use crate::services::descarga_segura::DescargaSegura;
use crate::{ApiClient, ApiError, ApiResult};
use chrono::{Duration, NaiveDateTime};
use inder_types::Cedula;
use std::path::{Path, PathBuf};

/// Used when the server sends no usable filename.
pub const DEFAULT_FILENAME: &str = "historia_clinica.pdf";

/// Where a download link stands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadState {
    /// `start` has not been called yet.
    Pending,
    /// The link is valid and waiting for a cédula.
    Ready {
        intentos_restantes: Option<u32>,
        /// Naive UTC.
        expira_en: Option<NaiveDateTime>,
    },
    /// Unknown, used or expired link.
    Invalid { mensaje: String },
    /// The cédula matched; the PDF may be fetched.
    Verified,
    /// Too many failed attempts, or the server refused the download.
    Blocked { mensaje: String },
    Downloaded { path: PathBuf },
}

pub struct SecureDownload<'a> {
    api: DescargaSegura<'a>,
    token: String,
    state: DownloadState,
    mensaje: Option<String>,
}

impl<'a> SecureDownload<'a> {
    pub fn new(client: &'a ApiClient, token: impl Into<String>) -> Self {
        Self {
            api: DescargaSegura { client },
            token: token.into().trim().to_string(),
            state: DownloadState::Pending,
            mensaje: None,
        }
    }

    pub fn state(&self) -> &DownloadState {
        &self.state
    }

    /// The last message the server gave, e.g. "Cédula incorrecta. Intentos restantes: 2".
    pub fn mensaje(&self) -> Option<&str> {
        self.mensaje.as_deref()
    }

    /// Asks the server whether the link can still be used.
    ///
    /// # Errors
    ///
    /// Network and decode failures only. An unusable link is `DownloadState::Invalid`.
    pub async fn start(&mut self) -> ApiResult<&DownloadState> {
        if self.token.is_empty() {
            self.invalid("Enlace no válido");
            return Ok(&self.state);
        }

        let info = self.api.info(&self.token).await?;
        if info.valido {
            let expira_en = info
                .expira_en
                .as_deref()
                .and_then(|raw| raw.trim().parse::<NaiveDateTime>().ok());
            self.mensaje = None;
            self.transition(DownloadState::Ready {
                intentos_restantes: info.intentos_restantes,
                expira_en,
            });
        } else {
            let mensaje = info.mensaje.unwrap_or_else(|| "Enlace no válido".into());
            self.invalid(&mensaje);
        }
        Ok(&self.state)
    }

    /// Sends the cédula. A wrong one leaves the flow `Ready` with fewer attempts.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::InvalidInput` for a malformed cédula, without spending an attempt,
    /// or when the link is not `Ready`.
    pub async fn verify(&mut self, cedula: &str) -> ApiResult<&DownloadState> {
        let DownloadState::Ready { expira_en, .. } = self.state else {
            return Err(ApiError::InvalidInput(format!(
                "link is not waiting for verification ({:?})",
                self.state
            )));
        };
        let cedula =
            Cedula::parse(cedula).map_err(|err| ApiError::InvalidInput(err.to_string()))?;

        match self.api.verificar(&self.token, &cedula).await {
            Ok(verificacion) => {
                self.mensaje = verificacion.mensaje;
                self.transition(DownloadState::Verified);
            }
            Err(ApiError::Unauthorized { detail }) => {
                let intentos_restantes = intentos_restantes(&detail);
                self.mensaje = Some(detail);
                self.transition(DownloadState::Ready {
                    intentos_restantes,
                    expira_en,
                });
            }
            Err(err) => self.refused(err)?,
        }
        Ok(&self.state)
    }

    /// Fetches the PDF into `dir` under the server's filename.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::InvalidInput` unless the flow is `Verified`, and `ApiError::Io` if
    /// the file cannot be written.
    pub async fn download(&mut self, dir: &Path) -> ApiResult<&DownloadState> {
        if self.state != DownloadState::Verified {
            return Err(ApiError::InvalidInput(
                "the cédula has not been verified".into(),
            ));
        }

        let download = match self.api.descargar(&self.token).await {
            Ok(download) => download,
            Err(err) => {
                self.refused(err)?;
                return Ok(&self.state);
            }
        };

        let filename = download
            .filename
            .as_deref()
            .and_then(sanitise_filename)
            .unwrap_or_else(|| {
                tracing::warn!("no usable filename in response, using {DEFAULT_FILENAME}");
                DEFAULT_FILENAME.to_string()
            });
        let path = dir.join(filename);
        tokio::fs::write(&path, &download.bytes).await?;
        tracing::info!(path = %path.display(), bytes = download.bytes.len(), "history downloaded");

        self.transition(DownloadState::Downloaded { path });
        Ok(&self.state)
    }

    /// Time left before the link expires, as last reported. Never negative.
    pub fn remaining_time(&self, now: NaiveDateTime) -> Option<Duration> {
        match self.state {
            DownloadState::Ready {
                expira_en: Some(expira_en),
                ..
            } => Some((expira_en - now).max(Duration::zero())),
            _ => None,
        }
    }

    /// Maps the server's refusal statuses to states; anything else is an error.
    fn refused(&mut self, err: ApiError) -> ApiResult<()> {
        match err.status() {
            Some(403) | Some(429) => {
                let mensaje = err.detail().unwrap_or("Enlace bloqueado").to_string();
                self.mensaje = Some(mensaje.clone());
                self.transition(DownloadState::Blocked { mensaje });
                Ok(())
            }
            Some(404) => {
                let mensaje = err.detail().unwrap_or("Enlace no válido").to_string();
                self.invalid(&mensaje);
                Ok(())
            }
            Some(410) => {
                self.invalid("expirado");
                Ok(())
            }
            _ => Err(err),
        }
    }

    fn invalid(&mut self, mensaje: &str) {
        self.mensaje = Some(mensaje.to_string());
        self.transition(DownloadState::Invalid {
            mensaje: mensaje.to_string(),
        });
    }

    fn transition(&mut self, next: DownloadState) {
        tracing::debug!(from = ?self.state, to = ?next, "secure download");
        self.state = next;
    }
}

/// Attempts left, read from "Cédula incorrecta. Intentos restantes: 2".
pub fn intentos_restantes(detail: &str) -> Option<u32> {
    let (_, tail) = detail.rsplit_once(':')?;
    tail.trim().trim_end_matches('.').parse().ok()
}

/// A countdown such as "1h 05m" or "4m 09s".
pub fn format_remaining(remaining: Duration) -> String {
    let secs = remaining.num_seconds().max(0);
    let (h, m, s) = (secs / 3600, (secs % 3600) / 60, secs % 60);
    if h > 0 {
        format!("{h}h {m:02}m")
    } else {
        format!("{m}m {s:02}s")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intentos_restantes() {
        assert_eq!(
            intentos_restantes("Cédula incorrecta. Intentos restantes: 2"),
            Some(2)
        );
        assert_eq!(intentos_restantes("Cédula incorrecta"), None);
    }

    #[test]
    fn test_format_remaining() {
        assert_eq!(format_remaining(Duration::minutes(65)), "1h 05m");
        assert_eq!(format_remaining(Duration::seconds(249)), "4m 09s");
        assert_eq!(format_remaining(Duration::seconds(-5)), "0m 00s");
    }
}
