//! Links for handing a secure download to the athlete.

use crate::{ApiError, ApiResult};
use reqwest::Url;

/// Colombian country code, prepended to national numbers.
pub const COUNTRY_CODE: &str = "57";

/// A `wa.me` link that opens WhatsApp with a message carrying `url`.
///
/// # Errors
///
/// Returns `ApiError::InvalidInput` if `telefono` holds fewer than 7 digits.
pub fn whatsapp_link(telefono: &str, url: &str) -> ApiResult<Url> {
    let digits: String = telefono.chars().filter(char::is_ascii_digit).collect();
    if digits.len() < 7 {
        return Err(ApiError::InvalidInput(format!(
            "'{telefono}' is not a phone number"
        )));
    }
    let numero = if digits.starts_with(COUNTRY_CODE) && digits.len() > 10 {
        digits
    } else {
        format!("{COUNTRY_CODE}{digits}")
    };

    let text = format!(
        "Hola, puede descargar su historia clínica del INDER en el siguiente enlace: {url}\n\
         Se le pedirá su número de cédula. El enlace vence en 2 horas."
    );
    Url::parse_with_params(&format!("https://wa.me/{numero}"), &[("text", text)])
        .map_err(|err| ApiError::InvalidInput(err.to_string()))
}

/// The page an athlete opens for `token`.
pub fn download_page(frontend_base_url: &str, token: &str) -> String {
    format!(
        "{}/descargar/{token}",
        frontend_base_url.trim_end_matches('/')
    )
}
