//! This module defines the core data structures used throughout the crate: the automaton
//! graph driven by the `Evaluator`, the two-symbol program driven by the `Machine`, the
//! runtime trace records, and the crate-wide error type.

use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

/// A single node of an `AutomatonGraph`.
///
/// A state is identified by its position in `AutomatonGraph::states`; `t` and `f` are the
/// ids followed on a `1` and a `0` digit respectively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct State {
    /// Next state when the digit is `1`.
    pub t: usize,
    /// Next state when the digit is `0`.
    pub f: usize,
}

impl State {
    /// Returns the id reached from this state on the given digit.
    pub fn follow(&self, bit: bool) -> usize {
        if bit {
            self.t
        } else {
            self.f
        }
    }
}

/// The data model behind an `Evaluator`.
///
/// All ids must lie in `0..states.len()` and `states` must not be empty; see
/// [`crate::analyzer::analyze_graph`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AutomatonGraph {
    /// The state the traversal starts from.
    pub start_at: usize,
    /// The only accepting state.
    pub true_if: usize,
    /// The transition table, indexed by state id.
    pub states: Vec<State>,
}

/// Where a `Machine` goes after executing an instruction.
///
/// On the wire any negative integer means halt. Decoding maps every negative value to
/// `Halt`, and encoding writes `Halt` back as `-1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "i64", into = "i64")]
pub enum Next {
    /// Continue in the state with the given id.
    Continue(usize),
    /// Stop the machine.
    Halt,
}

impl From<i64> for Next {
    fn from(value: i64) -> Self {
        if value < 0 {
            Next::Halt
        } else {
            // Ids beyond usize are rejected later by the analyzer.
            Next::Continue(usize::try_from(value).unwrap_or(usize::MAX))
        }
    }
}

impl From<Next> for i64 {
    fn from(next: Next) -> Self {
        match next {
            Next::Continue(id) => i64::try_from(id).unwrap_or(i64::MAX),
            Next::Halt => -1,
        }
    }
}

/// What a `Machine` does for one (state, symbol) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instruction {
    /// The bit written under the head. A write always happens.
    #[serde(deserialize_with = "bit_or_bool")]
    pub wr: bool,
    /// Signed head displacement.
    pub mv: i64,
    /// The next state, or halt.
    pub nxt: Next,
}

/// A `Machine` state: one instruction per symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MachineState {
    /// Instruction used when the head reads `0`.
    pub f: Instruction,
    /// Instruction used when the head reads `1`.
    pub t: Instruction,
}

impl MachineState {
    /// Selects the instruction for the symbol under the head.
    pub fn instruction(&self, symbol: bool) -> &Instruction {
        if symbol {
            &self.t
        } else {
            &self.f
        }
    }
}

/// The data model behind a `Machine`. Execution always starts in state 0.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TuringProgram {
    pub states: Vec<MachineState>,
}

/// A snapshot taken right before a `Machine` step executes.
///
/// `tape_index` is a position in `tape`, and `tape_offset` is the position of logical
/// coordinate zero in `tape`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TraceEntry {
    pub state: usize,
    pub tape: String,
    pub tape_offset: usize,
    pub tape_index: usize,
}

/// The outcome of `Machine::process`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Execution {
    /// Final tape contents.
    pub tape: String,
    /// Final head position in buffer coordinates. It may sit one move past either edge.
    pub tape_index: i64,
    /// Buffer position of logical coordinate zero.
    pub tape_offset: usize,
    /// Aligned snapshots, empty unless tracing was requested.
    pub trace: Vec<TraceEntry>,
}

/// Represents the outcome of a single machine step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// The machine performed a step and continues.
    Continue,
    /// The machine has halted.
    Halt,
}

/// Represents the errors that can occur while running, encoding, or loading devices.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TuringError {
    /// A character other than `0` or `1` was found in an input, tape, or bitstring.
    #[error("Invalid symbol of '{0}'. Only 0 and 1 are permitted.")]
    InvalidSymbol(char),
    /// An evaluator was asked to classify an empty digit string.
    #[error("Input is empty")]
    EmptyInput,
    /// A universal code ran past the end of its input.
    #[error("Bitstring ends inside a code at bit {position}")]
    Truncated { position: usize },
    /// A decoded value or an integer reinterpretation does not fit the target type.
    #[error("Value does not fit in the target integer type")]
    Overflow,
    /// A value lies outside the integer domain of the coder.
    #[error("Value {0} is outside the coder domain")]
    OutOfDomain(i64),
    /// A graph or program violates its structural invariants.
    #[error("Validation error: {0}")]
    ValidationError(String),
    /// A construction literal could not be parsed.
    #[error("Parse error: {0}")]
    ParseError(String),
    /// A file could not be read.
    #[error("File error: {0}")]
    FileError(String),
}

impl From<serde_json::Error> for TuringError {
    fn from(error: serde_json::Error) -> Self {
        TuringError::ParseError(error.to_string())
    }
}

/// Accepts either `true`/`false` or an integer (non-zero meaning `true`) for `wr`.
fn bit_or_bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum WriteLiteral {
        Bool(bool),
        Int(i64),
    }

    Ok(match WriteLiteral::deserialize(deserializer)? {
        WriteLiteral::Bool(bit) => bit,
        WriteLiteral::Int(value) => value != 0,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_next_from_integer() {
        assert_eq!(Next::from(0), Next::Continue(0));
        assert_eq!(Next::from(7), Next::Continue(7));
        assert_eq!(Next::from(-1), Next::Halt);
        assert_eq!(Next::from(-42), Next::Halt);

        assert_eq!(i64::from(Next::Halt), -1);
        assert_eq!(i64::from(Next::Continue(3)), 3);
    }

    #[test]
    fn test_graph_literal_keys() {
        let json = r#"{"startAt": 0, "trueIf": 1, "states": [{"t": 1, "f": 0}, {"t": 0, "f": 1}]}"#;
        let graph: AutomatonGraph = serde_json::from_str(json).unwrap();

        assert_eq!(graph.start_at, 0);
        assert_eq!(graph.true_if, 1);
        assert_eq!(graph.states[1], State { t: 0, f: 1 });

        let back = serde_json::to_string(&graph).unwrap();
        assert!(back.contains("\"startAt\":0"));
        assert!(back.contains("\"trueIf\":1"));
    }

    #[test]
    fn test_instruction_literal_accepts_integers() {
        let json = r#"{"wr": 1, "mv": -1, "nxt": -1}"#;
        let instruction: Instruction = serde_json::from_str(json).unwrap();

        assert!(instruction.wr);
        assert_eq!(instruction.mv, -1);
        assert_eq!(instruction.nxt, Next::Halt);

        let json = r#"{"wr": false, "mv": 2, "nxt": 4}"#;
        let instruction: Instruction = serde_json::from_str(json).unwrap();
        assert!(!instruction.wr);
        assert_eq!(instruction.nxt, Next::Continue(4));
    }

    #[test]
    fn test_state_selection() {
        let state = State { t: 2, f: 5 };
        assert_eq!(state.follow(true), 2);
        assert_eq!(state.follow(false), 5);
    }

    #[test]
    fn test_error_display() {
        let error = TuringError::InvalidSymbol('2');
        let error_msg = format!("{}", error);
        assert!(error_msg.contains("Invalid symbol of '2'"));
    }
}
