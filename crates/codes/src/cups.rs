//! CUPS procedure table (Clasificación Única de Procedimientos en Salud).

use crate::{normalise_query, CodesError, CodesResult, MAX_SUGGESTIONS};
use std::collections::HashMap;

/// One CUPS row. `category` groups procedures for display (Laboratorios, Imágenes, ...).
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CupsEntry {
    pub code: String,
    pub name: String,
    pub category: String,
}

#[derive(Debug, Clone)]
pub struct CupsTable {
    entries: Vec<CupsEntry>,
    by_code: HashMap<String, usize>,
}

impl CupsTable {
    pub(crate) fn new(entries: Vec<CupsEntry>) -> CodesResult<Self> {
        let mut by_code = HashMap::with_capacity(entries.len());
        for (index, entry) in entries.iter().enumerate() {
            let code = digits_only(&entry.code);
            if code.is_empty() {
                return Err(CodesError::Schema {
                    table: "CUPS",
                    message: format!("at [{index}].code: code has no digits"),
                });
            }
            if by_code.insert(code.clone(), index).is_some() {
                return Err(CodesError::DuplicateCode {
                    table: "CUPS",
                    code,
                });
            }
        }
        Ok(Self { entries, by_code })
    }

    /// Exact lookup. Everything but digits is dropped first, so `"90.22.01"` finds `902201`.
    pub fn lookup(&self, code: &str) -> Option<&CupsEntry> {
        self.by_code
            .get(&digits_only(code))
            .map(|&index| &self.entries[index])
    }

    /// Name search with the same rules as the CIE-11 table.
    pub fn search(&self, query: &str) -> Vec<&CupsEntry> {
        let Some(query) = normalise_query(query) else {
            return Vec::new();
        };
        self.entries
            .iter()
            .filter(|entry| entry.name.to_lowercase().contains(&query))
            .take(MAX_SUGGESTIONS)
            .collect()
    }

    /// Distinct categories in first-seen order.
    pub fn categories(&self) -> Vec<&str> {
        let mut seen: Vec<&str> = Vec::new();
        for entry in &self.entries {
            if !seen.contains(&entry.category.as_str()) {
                seen.push(&entry.category);
            }
        }
        seen
    }

    pub fn entries(&self) -> &[CupsEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Formats a six-digit CUPS code as `NN.NN.NN`.
///
/// Anything that is not six digits after stripping non-digits is returned stripped but
/// otherwise unchanged.
pub fn format_cups_code(code: &str) -> String {
    let digits = digits_only(code);
    if digits.len() == 6 {
        format!("{}.{}.{}", &digits[0..2], &digits[2..4], &digits[4..6])
    } else {
        digits
    }
}

fn digits_only(code: &str) -> String {
    code.chars().filter(char::is_ascii_digit).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::CodeTables;

    fn tables() -> CodeTables {
        CodeTables::embedded().expect("embedded tables should parse")
    }

    #[test]
    fn test_lookup_strips_punctuation() {
        let tables = tables();
        let entry = tables.cups().lookup("90.22.01").expect("hemograma is in the table");
        assert_eq!(entry.name, "Hemograma completo");
        assert_eq!(entry.category, "Laboratorios");
    }

    #[test]
    fn test_lookup_unknown() {
        let tables = tables();
        assert!(tables.cups().lookup("000000").is_none());
        assert!(tables.cups().lookup("abc").is_none());
    }

    #[test]
    fn test_search_case_insensitive() {
        let tables = tables();
        let results = tables.cups().search("HEMO");
        let codes: Vec<&str> = results.iter().map(|e| e.code.as_str()).collect();
        assert_eq!(codes, vec!["902201", "902204", "903802", "906002"]);
    }

    #[test]
    fn test_search_is_capped() {
        let tables = tables();
        let results = tables.cups().search("radiografía");
        assert_eq!(results.len(), MAX_SUGGESTIONS);
        for entry in results {
            assert!(entry.name.to_lowercase().contains("radiografía"));
        }
    }

    #[test]
    fn test_table_is_in_numeric_order() {
        let tables = tables();
        let codes: Vec<u64> = tables
            .cups()
            .entries()
            .iter()
            .map(|e| e.code.parse().expect("numeric code"))
            .collect();
        let mut sorted = codes.clone();
        sorted.sort_unstable();
        assert_eq!(codes, sorted);
    }

    #[test]
    fn test_categories() {
        let tables = tables();
        let categories = tables.cups().categories();
        assert_eq!(categories.len(), 5);
        assert!(categories.contains(&"Pruebas Deportivas"));
    }

    #[test]
    fn test_format_cups_code() {
        assert_eq!(format_cups_code("902201"), "90.22.01");
        assert_eq!(format_cups_code(" 90-22-01 "), "90.22.01");
        assert_eq!(format_cups_code("9022"), "9022");
    }

    #[test]
    fn test_duplicate_code_rejected() {
        let cups = "- code: \"902201\"\n  name: \"A\"\n  category: \"X\"\n- code: \"90.22.01\"\n  name: \"B\"\n  category: \"X\"\n";
        let err = CodeTables::from_yaml("[]", cups).expect_err("duplicate should fail");
        assert!(matches!(err, CodesError::DuplicateCode { table: "CUPS", .. }));
    }
}
