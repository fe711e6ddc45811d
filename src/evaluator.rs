//! This module defines the `Evaluator`, a two-way branching classifier. It walks an
//! `AutomatonGraph` one binary digit at a time and accepts when the walk ends in the
//! graph's accepting state.
//!
//! # Bitstring format
//!
//! Using the non-negative coder:
//!
//! ```text
//! 1 <startAt> <trueIf> (<t_i> <f_i>)+
//! ```
//!
//! The number of states is not stored; pairs are read until the input is used up.

use crate::analyzer::analyze_graph;
use crate::coder::{self, BitReader, BitWriter, UniversalCoder, NON_NEGATIVE};
use crate::types::{AutomatonGraph, State, TuringError};
use log::debug;

/// A validated, immutable classifier automaton.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Evaluator {
    graph: AutomatonGraph,
}

impl Evaluator {
    /// Creates a new `Evaluator` from a graph, checking that every id is in range.
    pub fn new(graph: AutomatonGraph) -> Result<Self, TuringError> {
        analyze_graph(&graph)?;
        Ok(Self { graph })
    }

    /// Returns the underlying graph.
    pub fn graph(&self) -> &AutomatonGraph {
        &self.graph
    }

    /// Classifies `value` by its plain binary digits. Zero is the single digit `0`.
    pub fn process(&self, value: u64) -> Result<bool, TuringError> {
        self.process_bits(&format!("{value:b}"))
    }

    /// Classifies an explicit digit string.
    ///
    /// # Returns
    ///
    /// * `Ok(true)` if the walk ends in the accepting state.
    /// * `Err(TuringError::InvalidSymbol)` on the first character other than `0` or `1`.
    /// * `Err(TuringError::EmptyInput)` if `digits` is empty.
    pub fn process_bits(&self, digits: &str) -> Result<bool, TuringError> {
        if digits.is_empty() {
            return Err(TuringError::EmptyInput);
        }

        let mut state = self.graph.start_at;
        for digit in digits.chars() {
            let bit = match digit {
                '0' => false,
                '1' => true,
                other => return Err(TuringError::InvalidSymbol(other)),
            };
            state = self.graph.states[state].follow(bit);
        }

        Ok(state == self.graph.true_if)
    }

    /// Exports the canonical bitstring.
    pub fn export_as_binary(&self) -> Result<String, TuringError> {
        self.encode_with(&NON_NEGATIVE)
    }

    /// Exports the canonical bitstring reinterpreted as an integer.
    pub fn export_as_integer(&self) -> Result<u128, TuringError> {
        coder::to_integer(&self.export_as_binary()?)
    }

    /// Encodes the graph with an explicit coder.
    pub fn encode_with<C: UniversalCoder + ?Sized>(&self, coder: &C) -> Result<String, TuringError> {
        let mut writer = BitWriter::new(coder);
        writer.write_index(self.graph.start_at)?;
        writer.write_index(self.graph.true_if)?;

        for state in &self.graph.states {
            writer.write_index(state.t)?;
            writer.write_index(state.f)?;
        }

        let bits = writer.finish();
        debug!(
            "exported evaluator with {} states as {} bits",
            self.graph.states.len(),
            bits.len()
        );
        Ok(bits)
    }

    /// Imports an evaluator from its canonical bitstring.
    pub fn import_from_binary(bits: &str) -> Result<Self, TuringError> {
        Self::decode_with(&NON_NEGATIVE, bits)
    }

    /// Imports an evaluator from the integer reading of its canonical bitstring.
    pub fn import_from_integer(value: u128) -> Result<Self, TuringError> {
        Self::import_from_binary(&coder::from_integer(value))
    }

    /// Decodes a graph with an explicit coder.
    ///
    /// At least one `(t, f)` pair is always read, then pairs are read for as long as bits
    /// remain. A corrupted input that happens to end on a pair boundary decodes into a
    /// graph with a different number of states.
    pub fn decode_with<C: UniversalCoder + ?Sized>(
        coder: &C,
        bits: &str,
    ) -> Result<Self, TuringError> {
        let mut reader = BitReader::new(coder, bits)?;
        let start_at = reader.read_index()?;
        let true_if = reader.read_index()?;

        let mut states = Vec::new();
        loop {
            let t = reader.read_index()?;
            let f = reader.read_index()?;
            states.push(State { t, f });

            if reader.is_exhausted() {
                break;
            }
        }

        debug!(
            "imported evaluator with {} states from {} bits",
            states.len(),
            bits.len()
        );

        Self::new(AutomatonGraph {
            start_at,
            true_if,
            states,
        })
    }
}
