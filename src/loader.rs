//! This module provides the `Loader` struct, responsible for loading automaton
//! definitions from files, strings, and directories.

use crate::automaton::Definition;
use crate::parser::parse;
use crate::types::DfaError;
use std::fs;
use std::path::{Path, PathBuf};

/// The file extension of automaton definition files.
pub const DEFINITION_EXTENSION: &str = "dfa";

/// `Loader` is a utility struct for loading automaton definitions.
pub struct Loader;

impl Loader {
    /// Loads a single definition from the specified file path.
    ///
    /// # Returns
    ///
    /// * `Ok(Definition)` if the file is successfully read and parsed.
    /// * `Err(DfaError::FileError)` if the file cannot be read.
    /// * Any error `parse` returns if the content is not a valid definition.
    pub fn load(path: &Path) -> Result<Definition, DfaError> {
        let content = fs::read_to_string(path).map_err(|e| {
            DfaError::FileError(format!("Failed to read file {}: {}", path.display(), e))
        })?;

        parse(&content)
    }

    /// Loads a single definition from the provided string content.
    pub fn load_from_string(content: &str) -> Result<Definition, DfaError> {
        parse(content)
    }

    /// Loads every `.dfa` file of a directory.
    ///
    /// Subdirectories and files with other extensions are skipped. Each file yields
    /// its own result, so one broken definition does not hide the others. Results are
    /// sorted by path.
    pub fn load_dir(directory: &Path) -> Vec<Result<(PathBuf, Definition), DfaError>> {
        if !directory.exists() {
            return vec![Err(DfaError::FileError(format!(
                "Directory {} does not exist",
                directory.display()
            )))];
        }

        let entries = match fs::read_dir(directory) {
            Ok(entries) => entries,
            Err(e) => {
                return vec![Err(DfaError::FileError(format!(
                    "Failed to read directory {}: {}",
                    directory.display(),
                    e
                )))]
            }
        };

        let mut paths = Vec::new();
        let mut results = Vec::new();

        for entry in entries {
            match entry {
                Ok(entry) => paths.push(entry.path()),
                Err(e) => results.push(Err(DfaError::FileError(format!(
                    "Failed to read directory entry: {}",
                    e
                )))),
            }
        }

        paths.sort();

        results.extend(
            paths
                .into_iter()
                .filter(|path| {
                    !path.is_dir()
                        && path
                            .extension()
                            .is_some_and(|ext| ext == DEFINITION_EXTENSION)
                })
                .map(|path| match Self::load(&path) {
                    Ok(definition) => Ok((path, definition)),
                    Err(e) => {
                        tracing::warn!(path = %path.display(), error = %e, "skipping definition");
                        Err(DfaError::FileError(format!(
                            "Failed to load definition from {}: {}",
                            path.display(),
                            e
                        )))
                    }
                }),
        );

        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;
    use tempfile::tempdir;

    const VALID: &str = "name: Valid\nfinal: t\nrules:\n  s:\n    a -> t\n  t:";

    fn write_file(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        let mut file = File::create(&path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_load_valid_definition() {
        let dir = tempdir().unwrap();
        let path = write_file(dir.path(), "valid.dfa", VALID);

        let definition = Loader::load(&path).unwrap();
        assert_eq!(definition.name, "Valid");
        assert_eq!(definition.automaton.states().len(), 2);
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempdir().unwrap();
        let result = Loader::load(&dir.path().join("missing.dfa"));

        assert!(matches!(result, Err(DfaError::FileError(_))));
    }

    #[test]
    fn test_load_invalid_definition() {
        let dir = tempdir().unwrap();
        let path = write_file(dir.path(), "invalid.dfa", "This is not a definition");

        assert!(Loader::load(&path).is_err());
    }

    #[test]
    fn test_load_from_string() {
        let definition = Loader::load_from_string(VALID).unwrap();
        assert_eq!(definition.name, "Valid");
    }

    #[test]
    fn test_load_dir() {
        let dir = tempdir().unwrap();
        write_file(dir.path(), "a-valid.dfa", VALID);
        write_file(dir.path(), "b-invalid.dfa", "This is not a definition");
        write_file(dir.path(), "ignored.txt", "This file should be ignored");
        fs::create_dir(dir.path().join("nested.dfa")).unwrap();

        let results = Loader::load_dir(dir.path());

        assert_eq!(results.len(), 2);
        assert!(results[0].is_ok());
        assert!(matches!(results[1], Err(DfaError::FileError(_))));
    }

    #[test]
    fn test_load_dir_missing_directory() {
        let dir = tempdir().unwrap();
        let results = Loader::load_dir(&dir.path().join("nope"));

        assert_eq!(results.len(), 1);
        assert!(results[0].is_err());
    }
}
