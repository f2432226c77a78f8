//! CIE-11 diagnosis table.

use crate::{normalise_query, CodesError, CodesResult, MAX_SUGGESTIONS};
use std::collections::HashMap;

/// One CIE-11 row.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Cie11Entry {
    pub code: String,
    pub name: String,
}

/// CIE-11 codes in table order, with an index for exact lookup.
#[derive(Debug, Clone)]
pub struct Cie11Table {
    entries: Vec<Cie11Entry>,
    by_code: HashMap<String, usize>,
}

impl Cie11Table {
    pub(crate) fn new(entries: Vec<Cie11Entry>) -> CodesResult<Self> {
        let mut by_code = HashMap::with_capacity(entries.len());
        for (index, entry) in entries.iter().enumerate() {
            let code = normalise_code(&entry.code);
            if by_code.insert(code.clone(), index).is_some() {
                return Err(CodesError::DuplicateCode {
                    table: "CIE-11",
                    code,
                });
            }
        }
        Ok(Self { entries, by_code })
    }

    /// Returns the disease name for a code, if the code is known.
    ///
    /// The code is trimmed and upper-cased first, so `" ba00"` finds `BA00`.
    pub fn lookup(&self, code: &str) -> Option<&str> {
        self.by_code
            .get(&normalise_code(code))
            .map(|&index| self.entries[index].name.as_str())
    }

    /// Name search: entries whose name contains `query`, ignoring case.
    ///
    /// Returns nothing for queries shorter than three characters and never more than
    /// [`MAX_SUGGESTIONS`] entries.
    pub fn search(&self, query: &str) -> Vec<&Cie11Entry> {
        let Some(query) = normalise_query(query) else {
            return Vec::new();
        };
        self.entries
            .iter()
            .filter(|entry| entry.name.to_lowercase().contains(&query))
            .take(MAX_SUGGESTIONS)
            .collect()
    }

    /// Entries whose code starts with the partially typed code.
    pub fn search_code_prefix(&self, partial: &str) -> Vec<&Cie11Entry> {
        let partial = normalise_code(partial);
        if partial.is_empty() {
            return Vec::new();
        }
        self.entries
            .iter()
            .filter(|entry| normalise_code(&entry.code).starts_with(&partial))
            .take(MAX_SUGGESTIONS)
            .collect()
    }

    pub fn entries(&self) -> &[Cie11Entry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn normalise_code(code: &str) -> String {
    code.trim().to_uppercase()
}

#[cfg(test)]
mod tests {
    use crate::CodeTables;

    fn tables() -> CodeTables {
        CodeTables::embedded().expect("embedded tables should parse")
    }

    #[test]
    fn test_lookup_known_code() {
        let tables = tables();
        assert_eq!(
            tables.cie11().lookup("BA00"),
            Some("Hipertensión esencial (primaria)")
        );
    }

    #[test]
    fn test_lookup_normalises_case_and_whitespace() {
        let tables = tables();
        assert_eq!(tables.cie11().lookup("  ca20 "), Some("Asma"));
    }

    #[test]
    fn test_lookup_is_idempotent() {
        let tables = tables();
        let first = tables.cie11().lookup("FB80");
        let second = tables.cie11().lookup("FB80");
        assert!(first.is_some());
        assert_eq!(first, second);
    }

    #[test]
    fn test_lookup_unknown_code() {
        let tables = tables();
        assert_eq!(tables.cie11().lookup("ZZ99"), None);
        assert_eq!(tables.cie11().lookup(""), None);
    }

    #[test]
    fn test_search_results_contain_query() {
        let tables = tables();
        let results = tables.cie11().search("ASMA");
        assert!(!results.is_empty());
        for entry in &results {
            assert!(entry.name.to_lowercase().contains("asma"), "{}", entry.name);
        }
    }

    #[test]
    fn test_search_keeps_table_order() {
        let tables = tables();
        let results = tables.cie11().search("asma");
        let codes: Vec<&str> = results.iter().map(|e| e.code.as_str()).collect();
        assert_eq!(codes, vec!["CA20", "CA21"]);
    }

    #[test]
    fn test_search_is_capped() {
        let tables = tables();
        let results = tables.cie11().search("itis");
        assert_eq!(results.len(), crate::MAX_SUGGESTIONS);
        assert_eq!(results[0].code, "CA24");
    }

    #[test]
    fn test_search_needs_three_characters() {
        let tables = tables();
        assert!(tables.cie11().search("as").is_empty());
    }

    #[test]
    fn test_search_code_prefix() {
        let tables = tables();
        let results = tables.cie11().search_code_prefix("ba0");
        let codes: Vec<&str> = results.iter().map(|e| e.code.as_str()).collect();
        assert_eq!(codes, vec!["BA00", "BA01", "BA02"]);
    }
}
