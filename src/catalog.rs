//! Built-in automaton definitions, embedded from the `demos/` directory.

use crate::automaton::Definition;
use crate::types::DfaError;

use std::sync::RwLock;

// Default embedded definitions
const DEFINITION_TEXTS: [&str; 5] = [
    include_str!("../demos/ends-with-a.dfa"),
    include_str!("../demos/even-zeros.dfa"),
    include_str!("../demos/divisible-by-three.dfa"),
    include_str!("../demos/contains-ab.dfa"),
    include_str!("../demos/identifier.dfa"),
];

lazy_static::lazy_static! {
    pub static ref DEFINITIONS: RwLock<Vec<Definition>> = RwLock::new(Vec::new());
}

/// Summary information about a catalog entry.
#[derive(Debug, Clone)]
pub struct CatalogEntry {
    pub index: usize,
    pub name: String,
    pub root: String,
    pub state_count: usize,
    pub symbol_count: usize,
    pub transition_count: usize,
}

pub struct Catalog;

impl Catalog {
    /// Parses the embedded definitions and stores them, replacing anything loaded before.
    ///
    /// Fails if any embedded definition is invalid, so an index always names the same
    /// definition in `by_index`, `info`, and `text_by_index`.
    pub fn load() -> Result<(), DfaError> {
        let definitions = parse_texts(&DEFINITION_TEXTS)?;

        let mut guard = DEFINITIONS
            .write()
            .map_err(|_| DfaError::FileError("Failed to acquire write lock".to_string()))?;
        *guard = definitions;

        Ok(())
    }

    /// Loads the embedded definitions unless they are loaded already.
    fn ensure_loaded() -> Result<(), DfaError> {
        let loaded = DEFINITIONS
            .read()
            .map(|definitions| !definitions.is_empty())
            .unwrap_or(false);

        if loaded {
            Ok(())
        } else {
            Self::load()
        }
    }

    /// Runs `f` over the loaded definitions.
    fn with_definitions<T>(f: impl FnOnce(&[Definition]) -> T) -> Result<T, DfaError> {
        Self::ensure_loaded()?;

        DEFINITIONS
            .read()
            .map(|definitions| f(&definitions))
            .map_err(|_| DfaError::FileError("Failed to acquire read lock".to_string()))
    }

    /// Get the number of available definitions
    pub fn count() -> usize {
        Self::with_definitions(|definitions| definitions.len()).unwrap_or(0)
    }

    /// Get a definition by its index
    pub fn by_index(index: usize) -> Result<Definition, DfaError> {
        Self::with_definitions(|definitions| definitions.get(index).cloned())?.ok_or_else(|| {
            DfaError::ValidationError(format!("Definition index {} out of range", index))
        })
    }

    /// Get a definition by its name, ignoring case
    pub fn by_name(name: &str) -> Result<Definition, DfaError> {
        Self::with_definitions(|definitions| {
            definitions
                .iter()
                .find(|definition| definition.name.eq_ignore_ascii_case(name))
                .cloned()
        })?
        .ok_or_else(|| DfaError::ValidationError(format!("Definition '{}' not found", name)))
    }

    /// List all definition names
    pub fn names() -> Vec<String> {
        Self::with_definitions(|definitions| {
            definitions
                .iter()
                .map(|definition| definition.name.clone())
                .collect()
        })
        .unwrap_or_default()
    }

    /// Search for definitions whose name contains `query`, ignoring case
    pub fn search(query: &str) -> Vec<usize> {
        let query = query.to_lowercase();
        Self::with_definitions(|definitions| {
            definitions
                .iter()
                .enumerate()
                .filter(|(_, definition)| definition.name.to_lowercase().contains(&query))
                .map(|(index, _)| index)
                .collect()
        })
        .unwrap_or_default()
    }

    /// Get information about a definition by its index
    pub fn info(index: usize) -> Result<CatalogEntry, DfaError> {
        let definition = Self::by_index(index)?;
        let automaton = &definition.automaton;

        Ok(CatalogEntry {
            index,
            name: definition.name.clone(),
            root: automaton.root().to_string(),
            state_count: automaton.states().len(),
            symbol_count: automaton.alphabet().len(),
            transition_count: automaton.relation().len(),
        })
    }

    /// Get the original text of a definition by its index
    pub fn text_by_index(index: usize) -> Result<&'static str, DfaError> {
        DEFINITION_TEXTS.get(index).copied().ok_or_else(|| {
            DfaError::ValidationError(format!("Definition text index {} out of range", index))
        })
    }
}

/// Parses every text, failing on the first invalid one.
fn parse_texts(texts: &[&str]) -> Result<Vec<Definition>, DfaError> {
    texts
        .iter()
        .enumerate()
        .map(|(index, text)| {
            crate::parser::parse(text).map_err(|e| {
                tracing::error!(index, error = %e, "failed to parse embedded definition");
                DfaError::ValidationError(format!("Embedded definition {index} is invalid: {e}"))
            })
        })
        .collect()
}
