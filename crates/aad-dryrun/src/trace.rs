//! # Execution Trace
//!
//! Pairs every entry of a transaction's `app-call-trace` with the
//! disassembled line it executed. The trace is produced lazily; call
//! [`get_trace`] again to restart it.

use std::fmt;

use aad_types::TealValue;

use crate::errors::DryrunError;
use crate::response::{DryrunResponse, DryrunState};

/// One executed line and the stack it left.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceEntry {
    /// 1-based line in the disassembly.
    pub line_number: u64,
    /// Program counter.
    pub pc: u64,
    /// The disassembled instruction.
    pub instruction: String,
    /// Stack after the line, bottom first.
    pub stack: Vec<TealValue>,
}

impl fmt::Display for TraceEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} → [", self.instruction)?;
        for (i, value) in self.stack.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{value}")?;
        }
        f.write_str("]")
    }
}

/// Lazy iterator over a transaction's trace.
#[derive(Debug, Clone)]
pub struct Trace<'a> {
    lines: &'a [String],
    states: std::slice::Iter<'a, DryrunState>,
}

impl Trace<'_> {
    fn entry(&self, state: &DryrunState) -> Result<TraceEntry, DryrunError> {
        let instruction = usize::try_from(state.line)
            .ok()
            .and_then(|line| line.checked_sub(1))
            .and_then(|index| self.lines.get(index))
            .ok_or_else(|| {
                DryrunError::malformed(format!(
                    "trace line {} outside the {}-line disassembly",
                    state.line,
                    self.lines.len()
                ))
            })?;
        Ok(TraceEntry {
            line_number: state.line,
            pc: state.pc,
            instruction: instruction.clone(),
            stack: state.stack.clone(),
        })
    }
}

impl Iterator for Trace<'_> {
    type Item = Result<TraceEntry, DryrunError>;

    fn next(&mut self) -> Option<Self::Item> {
        let state = self.states.next()?;
        Some(self.entry(state))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.states.size_hint()
    }
}

impl ExactSizeIterator for Trace<'_> {}

/// The trace of transaction `txn_index`'s application program.
///
/// # Errors
///
/// * `MalformedResult` - the transaction, its `disassembly` or its
///   `app-call-trace` is absent. Entries whose line is outside the
///   disassembly are reported as they are reached.
pub fn get_trace(result: &DryrunResponse, txn_index: usize) -> Result<Trace<'_>, DryrunError> {
    let txn = result.txn(txn_index)?;
    let lines = txn.disassembly.as_deref().ok_or_else(|| {
        DryrunError::malformed(format!("transaction {txn_index} has no disassembly"))
    })?;
    let states = txn.app_call_trace.as_deref().ok_or_else(|| {
        DryrunError::malformed(format!("transaction {txn_index} has no app-call-trace"))
    })?;
    Ok(Trace {
        lines,
        states: states.iter(),
    })
}
