//! Line-oriented text output, plus a cursor adapter example.
//!
//! [`TextOutput`] emits one `String` atom per line. [`RowAdapter`] crosses
//! a coordinate-system boundary: inside an opened row the atoms are numeric
//! cells, and flushing folds the finalized row back into the parent as a
//! single formatted line.

use super::seq::{SealedSeqRange, SeqOutput, SeqRange};
use crate::cell::Value;
use crate::output::{AppendingRange, CursorAdapter, ReactiveRange};
use crate::update::Updater;

// =============================================================================
// Text Output
// =============================================================================

/// Textual output: each atom is one line.
pub struct TextOutput {
    inner: SeqOutput<String>,
}

impl TextOutput {
    pub fn new() -> Self {
        Self {
            inner: SeqOutput::new(),
        }
    }

    /// The appending range over the whole document.
    pub fn range(&self) -> SeqRange<String> {
        self.inner.range()
    }

    /// The rendered document, lines joined with `\n`.
    pub fn render(&self) -> String {
        self.inner.snapshot().join("\n")
    }
}

impl Default for TextOutput {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Row Adapter
// =============================================================================

/// Adapter whose child coordinate system collects numeric cells and folds
/// them into one `"a | b | c"` line on flush.
///
/// The fold is a snapshot of the finalized child: content the child emits
/// after the flush, or in-place updates to its cells, do not re-fold.
pub struct RowAdapter;

impl CursorAdapter for RowAdapter {
    type Parent = SeqRange<String>;
    type Child = RowRange;

    fn child(&self, cursor: SeqRange<String>) -> RowRange {
        let scratch = SeqOutput::new();
        RowRange {
            cells: scratch.range(),
            scratch,
            target: cursor,
        }
    }

    fn flush(&self, parent: SeqRange<String>, child: SealedRowRange) -> SeqRange<String> {
        let row = child
            .scratch
            .snapshot()
            .iter()
            .map(i64::to_string)
            .collect::<Vec<_>>()
            .join(" | ");
        let mut target = child.target;
        target.append_raw(row);
        parent
    }
}

/// Appending range inside a row: numeric cells collected into a scratch
/// sequence, folded into the parent line on flush.
pub struct RowRange {
    scratch: SeqOutput<i64>,
    cells: SeqRange<i64>,
    target: SeqRange<String>,
}

impl Clone for RowRange {
    fn clone(&self) -> Self {
        Self {
            scratch: self.scratch.clone(),
            cells: self.cells.clone(),
            target: self.target.clone(),
        }
    }
}

impl AppendingRange for RowRange {
    type Atom = Value<i64>;
    type Finalized = SealedRowRange;

    fn append(&mut self, atom: Value<i64>) -> Option<Box<dyn Updater>> {
        self.cells.append(atom)
    }

    fn child(&mut self) -> Self {
        Self {
            scratch: self.scratch.clone(),
            cells: self.cells.child(),
            target: self.target.clone(),
        }
    }

    fn finalize(self) -> SealedRowRange {
        SealedRowRange {
            scratch: self.scratch,
            cells: self.cells.finalize(),
            target: self.target,
        }
    }
}

/// Read-only form of a [`RowRange`].
pub struct SealedRowRange {
    scratch: SeqOutput<i64>,
    cells: SealedSeqRange<i64>,
    target: SeqRange<String>,
}

impl ReactiveRange for SealedRowRange {
    type Appending = RowRange;

    fn clear(self) -> RowRange {
        RowRange {
            scratch: self.scratch,
            cells: self.cells.clear(),
            target: self.target,
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::UserBlock;
    use crate::host::NoopHost;
    use crate::root::RootBlock;
    use std::rc::Rc;

    #[test]
    fn test_render_joins_lines() {
        let output = TextOutput::new();
        let mut range = output.range();
        range.append(Value::constant("one".to_string()));
        range.append(Value::constant("two".to_string()));
        assert_eq!(output.render(), "one\ntwo");
    }

    #[test]
    fn test_row_adapter_folds_cells_into_one_line() {
        let output = TextOutput::new();
        let program = UserBlock::new("report", |region| {
            region.atom(Value::constant("totals".to_string()))?;

            let mut row = region.open(&RowAdapter);
            row.atom(Value::constant(1))?;
            row.atom(Value::constant(2))?;
            row.atom(Value::constant(3))?;
            let mut after = region.flush(&RowAdapter, row);

            after.atom(Value::constant("end".to_string()))?;
            Ok(())
        });

        let mut root = RootBlock::new(program, Rc::new(NoopHost));
        root.render(output.range()).unwrap();
        assert_eq!(output.render(), "totals\n1 | 2 | 3\nend");
    }
}
