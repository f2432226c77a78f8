//! Validated primitive types shared across the INDER crates.
//!
//! Values that cross a trust boundary (typed by a clinician, read from a draft file, sent to
//! the backend) are wrapped here so that the invariant is checked once, at construction.

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TextError {
    #[error("value is blank")]
    Empty,
    /// Something other than digits, letters or the usual separators was typed.
    #[error("invalid identity number: {0}")]
    InvalidCedula(String),
}

/// Free text that is never blank once stored: clinical notes, file names, diagnoses.
///
/// Surrounding whitespace is dropped on the way in.
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct NonEmptyText(String);

impl NonEmptyText {
    pub fn new(input: impl AsRef<str>) -> Result<Self, TextError> {
        match input.as_ref().trim() {
            "" => Err(TextError::Empty),
            text => Ok(Self(text.to_owned())),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl TryFrom<String> for NonEmptyText {
    type Error = TextError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<NonEmptyText> for String {
    fn from(text: NonEmptyText) -> Self {
        text.0
    }
}

impl std::fmt::Display for NonEmptyText {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for NonEmptyText {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

/// A national identity number (cédula) as typed by a person.
///
/// Separators commonly typed by people (`.`, `,` and whitespace) are stripped, which is the
/// same normalisation the backend applies before comparing. What remains must be ASCII
/// letters or digits. This does not check that the number exists or belongs to anyone.
#[derive(Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Cedula(String);

impl Cedula {
    /// Parses and normalises a cédula.
    ///
    /// # Errors
    ///
    /// Returns `TextError::Empty` if nothing is left after stripping separators, or
    /// `TextError::InvalidCedula` if any other character is present.
    pub fn parse(input: impl AsRef<str>) -> Result<Self, TextError> {
        let normalised: String = input
            .as_ref()
            .chars()
            .filter(|c| !matches!(c, '.' | ',') && !c.is_whitespace())
            .collect();

        if normalised.is_empty() {
            return Err(TextError::Empty);
        }
        if !normalised.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(TextError::InvalidCedula(input.as_ref().trim().to_owned()));
        }
        Ok(Self(normalised))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the number with all but the last four characters hidden, for logs.
    pub fn masked(&self) -> String {
        let visible = self.0.len().saturating_sub(4);
        format!("{}{}", "*".repeat(visible), &self.0[visible..])
    }
}

// Debug must not leak the full number into logs.
impl std::fmt::Debug for Cedula {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Cedula").field(&self.masked()).finish()
    }
}

impl AsRef<str> for Cedula {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Cedula {
    type Error = TextError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<Cedula> for String {
    fn from(cedula: Cedula) -> Self {
        cedula.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_empty_text_trims() {
        let text = NonEmptyText::new("  Dolor en rodilla  ").unwrap();
        assert_eq!(text.as_str(), "Dolor en rodilla");
    }

    #[test]
    fn test_non_empty_text_rejects_whitespace() {
        assert_eq!(NonEmptyText::new(" \t\n"), Err(TextError::Empty));
    }

    #[test]
    fn test_non_empty_text_deserialize_rejects_empty() {
        let result: Result<NonEmptyText, _> = serde_json::from_str("\"   \"");
        assert!(result.is_err());
    }

    #[test]
    fn test_cedula_strips_separators() {
        let cedula = Cedula::parse(" 1.234.567,89 ").unwrap();
        assert_eq!(cedula.as_str(), "123456789");
    }

    #[test]
    fn test_cedula_rejects_symbols() {
        let err = Cedula::parse("12-34").expect_err("hyphen is not a separator");
        assert!(matches!(err, TextError::InvalidCedula(_)));
    }

    #[test]
    fn test_cedula_rejects_only_separators() {
        assert_eq!(Cedula::parse(". , ."), Err(TextError::Empty));
    }

    #[test]
    fn test_cedula_debug_is_masked() {
        let cedula = Cedula::parse("1098765432").unwrap();
        assert_eq!(cedula.masked(), "******5432");
        assert!(!format!("{cedula:?}").contains("1098765432"));
    }

    #[test]
    fn test_cedula_masked_short_value() {
        let cedula = Cedula::parse("123").unwrap();
        assert_eq!(cedula.masked(), "123");
    }
}
