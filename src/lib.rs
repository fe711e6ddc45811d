//! This crate models two small computational devices and a canonical bit-level encoding
//! for them: an [`Evaluator`] that classifies a bit sequence by walking a two-way
//! transition graph, and a two-symbol [`Machine`] that runs on an unbounded binary tape.
//! Both can be exported to, and imported from, a single self-delimiting bitstring built
//! from Elias omega codes.

pub mod analyzer;
pub mod coder;
pub mod evaluator;
pub mod loader;
pub mod machine;
pub mod programs;
pub mod trace;
pub mod types;

/// Re-exports the structural checks from the analyzer module.
pub use analyzer::{analyze_graph, analyze_program, AnalysisError};
/// Re-exports the universal integer coder and its two shared instances.
pub use coder::{Decoded, Domain, EliasOmega, UniversalCoder, ALL_INTEGERS, NON_NEGATIVE};
/// Re-exports the `Evaluator` struct from the evaluator module.
pub use evaluator::Evaluator;
/// Re-exports the `ProgramLoader` struct from the loader module.
pub use loader::ProgramLoader;
/// Re-exports the `Machine` and its stepping `Run` from the machine module.
pub use machine::{align_trace, Machine, Run, DEFAULT_TAPE};
/// Re-exports the built-in catalog.
pub use programs::{Catalog, CATALOG};
/// Re-exports the trace rendering helpers.
pub use trace::{export_state_transitions, render_line};
/// Re-exports the data model and error type from the types module.
pub use types::{
    AutomatonGraph, Execution, Instruction, MachineState, Next, State, Step, TraceEntry,
    TuringError, TuringProgram,
};
