//! Formatting helpers for machine traces.

use crate::types::TraceEntry;

/// Renders the tape of a trace entry with the cell under the head marked: `x` for a `0`
/// and `*` for a `1`.
pub fn render_line(entry: &TraceEntry) -> String {
    entry
        .tape
        .chars()
        .enumerate()
        .map(|(index, cell)| match (index == entry.tape_index, cell) {
            (true, '0') => 'x',
            (true, _) => '*',
            (false, cell) => cell,
        })
        .collect()
}

/// Calls `output` once per entry, in order, with the entry's state and rendered line.
pub fn export_state_transitions<F>(trace: &[TraceEntry], mut output: F)
where
    F: FnMut(usize, &str),
{
    for entry in trace {
        output(entry.state, &render_line(entry));
    }
}
