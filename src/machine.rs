//! This module defines the `Machine`, a two-symbol Turing machine simulator. It runs a
//! `TuringProgram` on a tape that grows on demand in both directions, can record a
//! snapshot before every step, and aligns those snapshots afterwards so that every
//! trace line shares one coordinate system.
//!
//! # Bitstring format
//!
//! Using the all-integers coder:
//!
//! ```text
//! 1 <stateCount> (<f.wr> <f.mv> <f.nxt> <t.wr> <t.mv> <t.nxt>) x stateCount
//! ```

use crate::analyzer::analyze_program;
use crate::coder::{self, BitReader, BitWriter, UniversalCoder, ALL_INTEGERS};
use crate::types::{
    Execution, Instruction, MachineState, Next, Step, TraceEntry, TuringError, TuringProgram,
};
use log::{debug, trace, warn};
use std::collections::VecDeque;

/// The tape a machine starts on when the caller has no input.
pub const DEFAULT_TAPE: &str = "0";

/// The most cells a tape may grow by to reach the head after a single move.
pub const MAX_TAPE_GROWTH: usize = 1 << 20;

fn growth(cells: u64) -> Result<usize, TuringError> {
    usize::try_from(cells)
        .ok()
        .filter(|&cells| cells <= MAX_TAPE_GROWTH)
        .ok_or(TuringError::Overflow)
}

/// A growable binary tape. `offset` is the buffer index of logical coordinate zero.
#[derive(Debug, Clone)]
struct Tape {
    cells: VecDeque<bool>,
    offset: usize,
}

impl Tape {
    fn parse(initial: &str) -> Result<Self, TuringError> {
        Ok(Self {
            cells: coder::parse_bits(initial)?.into(),
            offset: 0,
        })
    }

    /// Grows the buffer until `head` lies inside it and returns the buffer index of the
    /// head. Growing on the left shifts every index, so `offset` moves with it.
    ///
    /// A single growth is limited to `MAX_TAPE_GROWTH` cells; a larger jump fails with
    /// `TuringError::Overflow`, as does a failed allocation.
    fn cover(&mut self, head: i64) -> Result<usize, TuringError> {
        if head < 0 {
            let missing = growth(head.unsigned_abs())?;
            self.reserve(missing)?;
            for _ in 0..missing {
                self.cells.push_front(false);
            }
            self.offset += missing;
            Ok(0)
        } else {
            let index = usize::try_from(head).map_err(|_| TuringError::Overflow)?;
            if index >= self.cells.len() {
                let missing = growth((index - self.cells.len()) as u64 + 1)?;
                self.reserve(missing)?;
                self.cells.resize(index + 1, false);
            }
            Ok(index)
        }
    }

    fn reserve(&mut self, additional: usize) -> Result<(), TuringError> {
        self.cells
            .try_reserve(additional)
            .map_err(|_| TuringError::Overflow)
    }

    fn render(&self) -> String {
        self.cells.iter().map(|&bit| if bit { '1' } else { '0' }).collect()
    }
}

/// A single execution of a `Machine`, driven one step at a time.
///
/// The machine itself never stops a run that does not halt. Callers that need a bound
/// drive `step` themselves and stop when they choose.
#[derive(Debug, Clone)]
pub struct Run<'a> {
    program: &'a TuringProgram,
    state: Next,
    tape: Tape,
    head: i64,
    step_count: usize,
}

impl<'a> Run<'a> {
    fn new(program: &'a TuringProgram, initial_tape: &str) -> Result<Self, TuringError> {
        Ok(Self {
            program,
            state: Next::Continue(0),
            tape: Tape::parse(initial_tape)?,
            head: 0,
            step_count: 0,
        })
    }

    /// Executes a single step.
    ///
    /// # Returns
    ///
    /// * `Ok(Step::Continue)` if a step was performed.
    /// * `Ok(Step::Halt)` if the machine had already halted.
    /// * `Err(TuringError::Overflow)` if the head moved further than the tape may grow.
    pub fn step(&mut self) -> Result<Step, TuringError> {
        self.advance(None)
    }

    fn advance(&mut self, snapshots: Option<&mut Vec<TraceEntry>>) -> Result<Step, TuringError> {
        let Next::Continue(state) = self.state else {
            return Ok(Step::Halt);
        };

        let index = self.tape.cover(self.head)?;
        if let Some(snapshots) = snapshots {
            snapshots.push(self.snapshot(state, index));
        }

        let symbol = self.tape.cells[index];
        let instruction = self.program.states[state].instruction(symbol);
        self.tape.cells[index] = instruction.wr;
        self.head = (index as i64).saturating_add(instruction.mv);
        self.state = instruction.nxt;
        self.step_count += 1;

        trace!(
            "step {}: state {} read {} wrote {} move {} -> {:?}",
            self.step_count,
            state,
            u8::from(symbol),
            u8::from(instruction.wr),
            instruction.mv,
            instruction.nxt
        );

        Ok(Step::Continue)
    }

    fn snapshot(&self, state: usize, index: usize) -> TraceEntry {
        TraceEntry {
            state,
            tape: self.tape.render(),
            tape_offset: self.tape.offset,
            tape_index: index,
        }
    }

    /// Returns the current state id, or `None` once halted.
    pub fn state(&self) -> Option<usize> {
        match self.state {
            Next::Continue(id) => Some(id),
            Next::Halt => None,
        }
    }

    pub fn is_halted(&self) -> bool {
        self.state == Next::Halt
    }

    /// Returns the head position in buffer coordinates.
    pub fn head(&self) -> i64 {
        self.head
    }

    pub fn tape(&self) -> String {
        self.tape.render()
    }

    pub fn tape_offset(&self) -> usize {
        self.tape.offset
    }

    pub fn step_count(&self) -> usize {
        self.step_count
    }

    fn into_execution(self, trace: Vec<TraceEntry>) -> Execution {
        Execution {
            tape: self.tape.render(),
            tape_index: self.head,
            tape_offset: self.tape.offset,
            trace,
        }
    }
}

/// Re-anchors raw snapshots onto the coordinates of the widest tape.
///
/// Each snapshot is padded on the left by the distance between its offset and the
/// largest offset seen, then padded on the right to the common width.
pub fn align_trace(trace: Vec<TraceEntry>) -> Vec<TraceEntry> {
    let offset = trace.iter().map(|entry| entry.tape_offset).max().unwrap_or(0);
    let width = trace
        .iter()
        .map(|entry| entry.tape.len() + offset - entry.tape_offset)
        .max()
        .unwrap_or(0);

    trace
        .into_iter()
        .map(|mut entry| {
            let left = offset - entry.tape_offset;
            if left > 0 {
                entry.tape.insert_str(0, &"0".repeat(left));
                entry.tape_index += left;
                entry.tape_offset = offset;
            }
            let right = width - entry.tape.len();
            entry.tape.push_str(&"0".repeat(right));
            entry
        })
        .collect()
}

/// A validated, immutable two-symbol Turing machine. Execution starts in state 0.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Machine {
    program: TuringProgram,
}

impl Machine {
    /// Creates a new `Machine`, checking that every continuing transition is in range.
    pub fn new(program: TuringProgram) -> Result<Self, TuringError> {
        analyze_program(&program)?;
        Ok(Self { program })
    }

    pub fn program(&self) -> &TuringProgram {
        &self.program
    }

    /// Starts a run on `initial_tape`. Every tape character must be `0` or `1`.
    pub fn start(&self, initial_tape: &str) -> Result<Run<'_>, TuringError> {
        Run::new(&self.program, initial_tape)
    }

    /// Runs until the machine halts.
    ///
    /// When `keep_trace` is set, the result carries one aligned snapshot per step, taken
    /// right before the step executed. A program that never halts never returns.
    pub fn process(&self, initial_tape: &str, keep_trace: bool) -> Result<Execution, TuringError> {
        let mut run = self.start(initial_tape)?;
        let mut snapshots = Vec::new();

        while run.advance(keep_trace.then_some(&mut snapshots))? == Step::Continue {}

        debug!(
            "machine halted after {} steps with tape width {}",
            run.step_count(),
            run.tape.cells.len()
        );

        Ok(run.into_execution(align_trace(snapshots)))
    }

    /// Exports the canonical bitstring.
    pub fn export_as_binary(&self) -> Result<String, TuringError> {
        self.encode_with(&ALL_INTEGERS)
    }

    /// Exports the canonical bitstring reinterpreted as an integer.
    pub fn export_as_integer(&self) -> Result<u128, TuringError> {
        coder::to_integer(&self.export_as_binary()?)
    }

    /// Encodes the program with an explicit coder. `wr` is written as 0 or 1 and a
    /// halting `nxt` as -1.
    pub fn encode_with<C: UniversalCoder + ?Sized>(&self, coder: &C) -> Result<String, TuringError> {
        let mut writer = BitWriter::new(coder);
        writer.write_index(self.program.states.len())?;

        for state in &self.program.states {
            for instruction in [&state.f, &state.t] {
                writer.write(i64::from(instruction.wr))?;
                writer.write(instruction.mv)?;
                writer.write(i64::from(instruction.nxt))?;
            }
        }

        let bits = writer.finish();
        debug!(
            "exported machine with {} states as {} bits",
            self.program.states.len(),
            bits.len()
        );
        Ok(bits)
    }

    /// Imports a machine from its canonical bitstring.
    pub fn import_from_binary(bits: &str) -> Result<Self, TuringError> {
        Self::decode_with(&ALL_INTEGERS, bits)
    }

    /// Imports a machine from the integer reading of its canonical bitstring.
    pub fn import_from_integer(value: u128) -> Result<Self, TuringError> {
        Self::import_from_binary(&coder::from_integer(value))
    }

    /// Decodes a program with an explicit coder. Bits after the last state are ignored.
    pub fn decode_with<C: UniversalCoder + ?Sized>(
        coder: &C,
        bits: &str,
    ) -> Result<Self, TuringError> {
        let mut reader = BitReader::new(coder, bits)?;
        let count = reader.read_index()?;

        let mut states = Vec::new();
        for _ in 0..count {
            let f = read_instruction(&mut reader)?;
            let t = read_instruction(&mut reader)?;
            states.push(MachineState { f, t });
        }

        if !reader.is_exhausted() {
            warn!(
                "ignoring {} bits after the last machine state",
                bits.len() - reader.position()
            );
        }
        debug!("imported machine with {} states from {} bits", count, bits.len());

        Self::new(TuringProgram { states })
    }
}

fn read_instruction<C: UniversalCoder + ?Sized>(
    reader: &mut BitReader<'_, C>,
) -> Result<Instruction, TuringError> {
    Ok(Instruction {
        wr: reader.read()? != 0,
        mv: reader.read()?,
        nxt: Next::from(reader.read()?),
    })
}
