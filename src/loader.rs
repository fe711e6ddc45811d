//! This module provides the `ProgramLoader` struct, responsible for building evaluators
//! and machines from JSON construction literals stored in files or strings.
//!
//! Evaluator literals look like `{"startAt": 0, "trueIf": 0, "states": [{"t": 1, "f": 0}]}`
//! and machine literals like `{"states": [{"t": {"wr": 1, "mv": -1, "nxt": -1}, "f": {...}}]}`.

use crate::evaluator::Evaluator;
use crate::machine::Machine;
use crate::types::{AutomatonGraph, TuringError, TuringProgram};
use std::fs;
use std::path::Path;

/// `ProgramLoader` is a utility struct for loading evaluators and machines.
pub struct ProgramLoader;

impl ProgramLoader {
    /// Loads an `Evaluator` literal from the specified file path.
    ///
    /// # Returns
    ///
    /// * `Err(TuringError::FileError)` if the file cannot be read.
    /// * `Err(TuringError::ParseError)` if the content is not a valid literal.
    /// * `Err(TuringError::ValidationError)` if the graph references undefined states.
    pub fn load_evaluator(path: &Path) -> Result<Evaluator, TuringError> {
        Self::load_evaluator_from_string(&read(path)?)
    }

    /// Loads an `Evaluator` literal from string content.
    pub fn load_evaluator_from_string(content: &str) -> Result<Evaluator, TuringError> {
        let graph: AutomatonGraph = serde_json::from_str(content)?;
        Evaluator::new(graph)
    }

    /// Loads a `Machine` literal from the specified file path.
    pub fn load_machine(path: &Path) -> Result<Machine, TuringError> {
        Self::load_machine_from_string(&read(path)?)
    }

    /// Loads a `Machine` literal from string content.
    pub fn load_machine_from_string(content: &str) -> Result<Machine, TuringError> {
        let program: TuringProgram = serde_json::from_str(content)?;
        Machine::new(program)
    }
}

fn read(path: &Path) -> Result<String, TuringError> {
    fs::read_to_string(path).map_err(|e| {
        TuringError::FileError(format!("Failed to read file {}: {}", path.display(), e))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;
    use tempfile::tempdir;

    #[test]
    fn test_load_valid_evaluator() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("parity.json");

        let content = r#"{"startAt": 0, "trueIf": 1, "states": [{"t": 1, "f": 0}, {"t": 0, "f": 1}]}"#;
        let mut file = File::create(&file_path).unwrap();
        file.write_all(content.as_bytes()).unwrap();

        let evaluator = ProgramLoader::load_evaluator(&file_path).unwrap();
        // Odd number of one bits.
        assert!(evaluator.process(0b1011).unwrap());
        assert!(!evaluator.process(0b1001).unwrap());
    }

    #[test]
    fn test_load_valid_machine() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("flip.json");

        let content = r#"{"states": [{"f": {"wr": 1, "mv": 1, "nxt": -1}, "t": {"wr": 0, "mv": 1, "nxt": -1}}]}"#;
        let mut file = File::create(&file_path).unwrap();
        file.write_all(content.as_bytes()).unwrap();

        let machine = ProgramLoader::load_machine(&file_path).unwrap();
        let execution = machine.process("10", false).unwrap();
        assert_eq!(execution.tape, "00");
        assert_eq!(execution.tape_index, 1);
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempdir().unwrap();
        let result = ProgramLoader::load_machine(&dir.path().join("missing.json"));
        assert!(matches!(result, Err(TuringError::FileError(_))));
    }

    #[test]
    fn test_load_invalid_literal() {
        let result = ProgramLoader::load_evaluator_from_string("This is not a valid program");
        assert!(matches!(result, Err(TuringError::ParseError(_))));

        let result = ProgramLoader::load_evaluator_from_string(
            r#"{"startAt": 0, "trueIf": 0, "states": [{"t": 4, "f": 0}]}"#,
        );
        assert!(matches!(result, Err(TuringError::ValidationError(_))));
    }
}
