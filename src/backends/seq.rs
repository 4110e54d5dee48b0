//! Sequential output backend - a span tree over an in-memory sequence.
//!
//! The output is a tree of spans: each range is a handle on one span node,
//! and nested ranges (dynamic blocks, adapter children) are sub-spans
//! inserted at the parent's cursor. Clearing a range empties its span *in
//! place*, so sibling positions survive any number of teardown/rebuild
//! cycles and authoring order is preserved structurally rather than by
//! index arithmetic.
//!
//! Atoms are [`Value`]s. Appending reads the value once (inside the
//! caller's tracking frame) and emits it into a slot; non-const values
//! return an updater that re-reads and rewrites the slot in place.

use std::cell::RefCell;
use std::rc::Rc;

use crate::cell::Value;
use crate::host::Host;
use crate::output::{AppendingRange, ReactiveRange};
use crate::update::{Poll, PollError, Updater};

// =============================================================================
// Span Tree
// =============================================================================

enum Node<T> {
    Atom(Rc<RefCell<T>>),
    Span(Span<T>),
}

struct Span<T> {
    nodes: Rc<RefCell<Vec<Node<T>>>>,
}

impl<T> Span<T> {
    fn new() -> Self {
        Self {
            nodes: Rc::new(RefCell::new(Vec::new())),
        }
    }

    fn push_atom(&self, value: T) -> Rc<RefCell<T>> {
        let slot = Rc::new(RefCell::new(value));
        self.nodes.borrow_mut().push(Node::Atom(Rc::clone(&slot)));
        slot
    }

    fn push_span(&self) -> Self {
        let span = Self::new();
        self.nodes.borrow_mut().push(Node::Span(span.clone()));
        span
    }

    fn clear(&self) {
        self.nodes.borrow_mut().clear();
    }

    fn flatten_into(&self, out: &mut Vec<T>)
    where
        T: Clone,
    {
        for node in self.nodes.borrow().iter() {
            match node {
                Node::Atom(slot) => out.push(slot.borrow().clone()),
                Node::Span(span) => span.flatten_into(out),
            }
        }
    }
}

impl<T> Clone for Span<T> {
    fn clone(&self) -> Self {
        Self {
            nodes: Rc::clone(&self.nodes),
        }
    }
}

// =============================================================================
// Output
// =============================================================================

/// An in-memory sequential output. Hand [`SeqOutput::range`] to a
/// [`RootBlock`](crate::root::RootBlock) and read the flattened content
/// back with [`SeqOutput::snapshot`].
pub struct SeqOutput<T> {
    root: Span<T>,
}

impl<T: Clone + 'static> SeqOutput<T> {
    pub fn new() -> Self {
        Self { root: Span::new() }
    }

    /// The appending range over the whole output.
    pub fn range(&self) -> SeqRange<T> {
        SeqRange {
            span: self.root.clone(),
        }
    }

    /// Flatten the span tree into the emitted sequence, in authoring order.
    pub fn snapshot(&self) -> Vec<T> {
        let mut out = Vec::new();
        self.root.flatten_into(&mut out);
        out
    }
}

impl<T: Clone + 'static> Default for SeqOutput<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for SeqOutput<T> {
    fn clone(&self) -> Self {
        Self {
            root: self.root.clone(),
        }
    }
}

// =============================================================================
// Ranges
// =============================================================================

/// Appending range over one span node.
pub struct SeqRange<T> {
    span: Span<T>,
}

impl<T: Clone + 'static> SeqRange<T> {
    /// Append a plain value with no updater, bypassing the tracker. Meant
    /// for adapters that fold child content into the parent medium.
    pub fn append_raw(&mut self, value: T) {
        self.span.push_atom(value);
    }
}

impl<T> Clone for SeqRange<T> {
    fn clone(&self) -> Self {
        Self {
            span: self.span.clone(),
        }
    }
}

impl<T: Clone + 'static> AppendingRange for SeqRange<T> {
    type Atom = Value<T>;
    type Finalized = SealedSeqRange<T>;

    fn append(&mut self, atom: Value<T>) -> Option<Box<dyn Updater>> {
        let slot = self.span.push_atom(atom.get());
        match atom {
            Value::Const(_) => None,
            atom => Some(Box::new(SlotUpdater { slot, atom })),
        }
    }

    fn child(&mut self) -> Self {
        Self {
            span: self.span.push_span(),
        }
    }

    fn finalize(self) -> SealedSeqRange<T> {
        SealedSeqRange { span: self.span }
    }
}

/// Read-only form of a [`SeqRange`].
pub struct SealedSeqRange<T> {
    span: Span<T>,
}

impl<T: Clone + 'static> ReactiveRange for SealedSeqRange<T> {
    type Appending = SeqRange<T>;

    fn clear(self) -> SeqRange<T> {
        self.span.clear();
        SeqRange { span: self.span }
    }
}

/// Rewrites one emitted slot from its value. Always stays alive: the
/// freshness gate around it decides whether it actually runs.
struct SlotUpdater<T> {
    slot: Rc<RefCell<T>>,
    atom: Value<T>,
}

impl<T: Clone + 'static> Updater for SlotUpdater<T> {
    fn poll(self: Box<Self>, _host: &dyn Host) -> Result<Poll, PollError> {
        *self.slot.borrow_mut() = self.atom.get();
        Ok(Poll::Continue(self))
    }

    fn describe(&self) -> String {
        "SlotUpdater".to_string()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::Cell;
    use crate::host::NoopHost;
    use crate::track::tracked;

    #[test]
    fn test_append_and_snapshot() {
        let output = SeqOutput::new();
        let mut range = output.range();
        range.append(Value::constant(1));
        range.append(Value::constant(2));
        assert_eq!(output.snapshot(), vec![1, 2]);
    }

    #[test]
    fn test_const_atom_has_no_updater() {
        let output = SeqOutput::new();
        let mut range = output.range();
        assert!(range.append(Value::constant(1)).is_none());
    }

    #[test]
    fn test_child_content_precedes_later_appends() {
        let output = SeqOutput::new();
        let mut range = output.range();
        range.append(Value::constant(1));
        let mut child = range.child();
        range.append(Value::constant(4));
        child.append(Value::constant(2));
        child.append(Value::constant(3));
        assert_eq!(output.snapshot(), vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_clear_preserves_sibling_positions() {
        let output = SeqOutput::new();
        let mut range = output.range();
        range.append(Value::constant(1));
        let mut child = range.child();
        child.append(Value::constant(2));
        child.append(Value::constant(3));
        range.append(Value::constant(9));

        let mut reopened = child.finalize().clear();
        assert_eq!(output.snapshot(), vec![1, 9]);

        reopened.append(Value::constant(7));
        assert_eq!(output.snapshot(), vec![1, 7, 9]);
    }

    #[test]
    fn test_slot_updater_rewrites_in_place() {
        let output = SeqOutput::new();
        let mut range = output.range();
        let cell = Cell::new(10);

        let (updater, _) = tracked(|| range.append(Value::from(cell.clone())));
        let updater = updater.expect("cell atoms are updatable");
        assert_eq!(output.snapshot(), vec![10]);

        cell.set(20);
        match updater.poll(&NoopHost).unwrap() {
            Poll::Continue(_) => {}
            Poll::Done => panic!("slot updaters never complete"),
        }
        assert_eq!(output.snapshot(), vec![20]);
    }
}
