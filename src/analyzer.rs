//! This module provides structural checks for automaton graphs and machine programs.
//! Both devices index their state tables directly while running, so every id a graph or
//! program refers to has to be checked once, up front.

use crate::types::{AutomatonGraph, Next, TuringError, TuringProgram};

/// Represents the problems that can be found while analyzing a graph or program.
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum AnalysisError {
    /// The state table is empty.
    NoStates,
    /// The start state of a graph is not a valid id.
    InvalidStartState(usize),
    /// The accepting state of a graph is not a valid id.
    InvalidAcceptState(usize),
    /// Transitions reference ids outside the state table, as `(from, to)` pairs.
    UndefinedNextStates(Vec<(usize, usize)>),
}

impl From<AnalysisError> for TuringError {
    /// Converts an `AnalysisError` into a `TuringError::ValidationError`.
    fn from(error: AnalysisError) -> Self {
        match error {
            AnalysisError::NoStates => {
                TuringError::ValidationError("At least one state is required".to_string())
            }
            AnalysisError::InvalidStartState(id) => {
                TuringError::ValidationError(format!("Invalid start state: {}", id))
            }
            AnalysisError::InvalidAcceptState(id) => {
                TuringError::ValidationError(format!("Invalid accepting state: {}", id))
            }
            AnalysisError::UndefinedNextStates(transitions) => TuringError::ValidationError(
                format!("Transitions reference undefined states: {:?}", transitions),
            ),
        }
    }
}

/// Analyzes an `AutomatonGraph`.
///
/// # Returns
///
/// * `Ok(())` if every referenced id is in range.
/// * `Err(TuringError::ValidationError)` describing the first problem found.
pub fn analyze_graph(graph: &AutomatonGraph) -> Result<(), TuringError> {
    let count = graph.states.len();
    if count == 0 {
        return Err(AnalysisError::NoStates.into());
    }
    if graph.start_at >= count {
        return Err(AnalysisError::InvalidStartState(graph.start_at).into());
    }
    if graph.true_if >= count {
        return Err(AnalysisError::InvalidAcceptState(graph.true_if).into());
    }

    let undefined: Vec<(usize, usize)> = graph
        .states
        .iter()
        .enumerate()
        .flat_map(|(id, state)| [(id, state.t), (id, state.f)])
        .filter(|&(_, to)| to >= count)
        .collect();

    if undefined.is_empty() {
        Ok(())
    } else {
        Err(AnalysisError::UndefinedNextStates(undefined).into())
    }
}

/// Analyzes a `TuringProgram`. Halting transitions are always valid.
pub fn analyze_program(program: &TuringProgram) -> Result<(), TuringError> {
    let count = program.states.len();
    if count == 0 {
        return Err(AnalysisError::NoStates.into());
    }

    let undefined: Vec<(usize, usize)> = program
        .states
        .iter()
        .enumerate()
        .flat_map(|(id, state)| [(id, state.f.nxt), (id, state.t.nxt)])
        .filter_map(|(id, next)| match next {
            Next::Continue(to) if to >= count => Some((id, to)),
            _ => None,
        })
        .collect();

    if undefined.is_empty() {
        Ok(())
    } else {
        Err(AnalysisError::UndefinedNextStates(undefined).into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Instruction, MachineState, State};

    fn graph(start_at: usize, true_if: usize, states: Vec<State>) -> AutomatonGraph {
        AutomatonGraph {
            start_at,
            true_if,
            states,
        }
    }

    fn halt_state() -> MachineState {
        let halt = Instruction {
            wr: true,
            mv: 0,
            nxt: Next::Halt,
        };
        MachineState { f: halt, t: halt }
    }

    #[test]
    fn test_valid_graph() {
        let g = graph(0, 1, vec![State { t: 1, f: 0 }, State { t: 0, f: 1 }]);
        assert!(analyze_graph(&g).is_ok());
    }

    #[test]
    fn test_empty_graph() {
        let g = graph(0, 0, Vec::new());
        let result = analyze_graph(&g);
        assert!(matches!(result, Err(TuringError::ValidationError(_))));
    }

    #[test]
    fn test_graph_bad_start_and_accept() {
        let g = graph(2, 0, vec![State { t: 0, f: 0 }]);
        let error = analyze_graph(&g).unwrap_err();
        assert!(error.to_string().contains("Invalid start state: 2"));

        let g = graph(0, 5, vec![State { t: 0, f: 0 }]);
        let error = analyze_graph(&g).unwrap_err();
        assert!(error.to_string().contains("Invalid accepting state: 5"));
    }

    #[test]
    fn test_graph_undefined_transitions() {
        let g = graph(0, 0, vec![State { t: 3, f: 0 }, State { t: 1, f: 9 }]);
        assert_eq!(
            analyze_graph(&g),
            Err(TuringError::from(AnalysisError::UndefinedNextStates(vec![
                (0, 3),
                (1, 9)
            ])))
        );
    }

    #[test]
    fn test_program_checks() {
        let program = TuringProgram {
            states: vec![halt_state()],
        };
        assert!(analyze_program(&program).is_ok());

        let empty = TuringProgram { states: Vec::new() };
        assert!(analyze_program(&empty).is_err());

        let mut dangling = halt_state();
        dangling.t.nxt = Next::Continue(1);
        let program = TuringProgram {
            states: vec![dangling],
        };
        assert_eq!(
            analyze_program(&program),
            Err(TuringError::from(AnalysisError::UndefinedNextStates(vec![(0, 1)])))
        );
    }
}
