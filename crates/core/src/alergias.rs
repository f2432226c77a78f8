//! Allergy selection for step 2.
//!
//! Each allergy category holds the sub-types ticked by the clinician. A category disappears
//! from the list as soon as its last sub-type is unticked.

use crate::historia::{Alergia, TipoAlergia};
use crate::{CoreError, CoreResult};

impl TipoAlergia {
    pub const ALL: [TipoAlergia; 5] = [
        TipoAlergia::Respiratorias,
        TipoAlergia::Digestivas,
        TipoAlergia::Dermatologicas,
        TipoAlergia::Medicamentosas,
        TipoAlergia::Otra,
    ];

    pub fn nombre(self) -> &'static str {
        match self {
            TipoAlergia::Respiratorias => "Respiratorias",
            TipoAlergia::Digestivas => "Digestivas",
            TipoAlergia::Dermatologicas => "Dermatológicas",
            TipoAlergia::Medicamentosas => "Medicamentosas",
            TipoAlergia::Otra => "Otra",
        }
    }

    /// Sub-types offered for the category.
    pub fn subtipos(self) -> &'static [&'static str] {
        match self {
            TipoAlergia::Respiratorias => &["Asma", "Rinitis", "Otro"],
            TipoAlergia::Digestivas => &["Gluten", "Nueces", "Lácteos", "Otro"],
            TipoAlergia::Dermatologicas => &["Eccema", "Urticaria", "Otro"],
            TipoAlergia::Medicamentosas => &[
                "AINEs",
                "Paracetamol",
                "Antibióticos (especifique cuál)",
                "Otro",
            ],
            TipoAlergia::Otra => &["Especifique"],
        }
    }
}

impl std::fmt::Display for TipoAlergia {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.nombre())
    }
}

impl std::str::FromStr for TipoAlergia {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        TipoAlergia::ALL
            .into_iter()
            .find(|tipo| {
                let nombre = tipo.nombre().to_lowercase();
                nombre == wanted || nombre.replace('ó', "o") == wanted
            })
            .ok_or_else(|| CoreError::InvalidPatch(format!("unknown allergy type {s:?}")))
    }
}

impl Alergia {
    /// True when a ticked sub-type asks the clinician to describe it.
    pub fn necesita_detalles(&self) -> bool {
        self.subtipos.iter().any(|subtipo| {
            subtipo.contains("Otro")
                || subtipo.contains("Especifique")
                || subtipo.to_lowercase().contains("especifique")
        })
    }
}

/// Ticks or unticks `subtipo` under `tipo`.
///
/// # Errors
///
/// Returns `CoreError::InvalidPatch` if `subtipo` is not offered for `tipo`.
pub fn toggle_subtipo(alergias: &mut Vec<Alergia>, tipo: TipoAlergia, subtipo: &str) -> CoreResult<()> {
    let Some(canonical) = tipo
        .subtipos()
        .iter()
        .find(|candidate| candidate.eq_ignore_ascii_case(subtipo.trim()))
    else {
        return Err(CoreError::InvalidPatch(format!(
            "{subtipo:?} is not a sub-type of {tipo}"
        )));
    };

    match alergias.iter_mut().find(|a| a.tipo == tipo) {
        Some(alergia) => {
            if let Some(index) = alergia.subtipos.iter().position(|s| s == canonical) {
                alergia.subtipos.remove(index);
            } else {
                alergia.subtipos.push((*canonical).to_string());
            }
            alergias.retain(|a| !a.subtipos.is_empty());
        }
        None => alergias.push(Alergia {
            tipo,
            subtipos: vec![(*canonical).to_string()],
            detalles: String::new(),
        }),
    }
    Ok(())
}

/// Sets the free-text details of `tipo`. Does nothing if the category is not selected.
pub fn set_detalles(alergias: &mut [Alergia], tipo: TipoAlergia, detalles: &str) {
    if let Some(alergia) = alergias.iter_mut().find(|a| a.tipo == tipo) {
        alergia.detalles = detalles.to_string();
    }
}

/// Removes the whole category.
pub fn remove_tipo(alergias: &mut Vec<Alergia>, tipo: TipoAlergia) {
    alergias.retain(|a| a.tipo != tipo);
}
