//! Reactive inputs - cells, derived computations and atom values.
//!
//! These are the mutable inputs the tracker observes. The engine itself
//! only consumes their version-tag interface (read consumes the tag, write
//! bumps it); integrators are free to bring their own input model as long
//! as it does the same.

use std::cell::RefCell;
use std::rc::Rc;

use crate::track::Tag;

// =============================================================================
// Cell
// =============================================================================

/// A shared mutable input. Reads inside a tracking frame register a
/// dependency; writes bump the global revision into the cell's tag.
pub struct Cell<T> {
    value: Rc<RefCell<T>>,
    tag: Tag,
}

impl<T: Clone> Cell<T> {
    pub fn new(value: T) -> Self {
        Self {
            value: Rc::new(RefCell::new(value)),
            tag: Tag::new(),
        }
    }

    /// Read the current value, registering a dependency with any open
    /// tracking frame.
    pub fn get(&self) -> T {
        self.tag.consume();
        self.value.borrow().clone()
    }

    /// Replace the value and mark every computation that read it stale.
    pub fn set(&self, value: T) {
        *self.value.borrow_mut() = value;
        self.tag.bump();
    }

    /// Mutate the value in place and mark readers stale.
    pub fn update(&self, f: impl FnOnce(&mut T)) {
        f(&mut self.value.borrow_mut());
        self.tag.bump();
    }
}

impl<T> Clone for Cell<T> {
    fn clone(&self) -> Self {
        Self {
            value: Rc::clone(&self.value),
            tag: self.tag.clone(),
        }
    }
}

// =============================================================================
// Derived
// =============================================================================

/// A computation re-run on every read. Its dependencies are whatever cells
/// the closure reads, so staleness falls out of the tracker with no
/// bookkeeping here.
pub struct Derived<T> {
    f: Rc<dyn Fn() -> T>,
}

impl<T> Derived<T> {
    pub fn new(f: impl Fn() -> T + 'static) -> Self {
        Self { f: Rc::new(f) }
    }

    /// Compute the current value.
    pub fn get(&self) -> T {
        (self.f)()
    }
}

impl<T> Clone for Derived<T> {
    fn clone(&self) -> Self {
        Self { f: Rc::clone(&self.f) }
    }
}

// =============================================================================
// Value
// =============================================================================

/// Atom payload accepted by the bundled output backends: a constant, a
/// cell, or a derived computation.
pub enum Value<T> {
    Const(T),
    Cell(Cell<T>),
    Derived(Derived<T>),
}

impl<T: Clone> Value<T> {
    /// A value that will never change. Atoms built from constants retain no
    /// updater at all.
    pub fn constant(value: T) -> Self {
        Self::Const(value)
    }

    /// Read the current value, registering dependencies for the non-const
    /// variants.
    pub fn get(&self) -> T {
        match self {
            Self::Const(value) => value.clone(),
            Self::Cell(cell) => cell.get(),
            Self::Derived(derived) => derived.get(),
        }
    }
}

impl<T> Clone for Value<T>
where
    T: Clone,
{
    fn clone(&self) -> Self {
        match self {
            Self::Const(value) => Self::Const(value.clone()),
            Self::Cell(cell) => Self::Cell(cell.clone()),
            Self::Derived(derived) => Self::Derived(derived.clone()),
        }
    }
}

impl<T> From<Cell<T>> for Value<T> {
    fn from(cell: Cell<T>) -> Self {
        Self::Cell(cell)
    }
}

impl<T> From<Derived<T>> for Value<T> {
    fn from(derived: Derived<T>) -> Self {
        Self::Derived(derived)
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::track::tracked;

    #[test]
    fn test_cell_read_write() {
        let cell = Cell::new(1);
        assert_eq!(cell.get(), 1);
        cell.set(2);
        assert_eq!(cell.get(), 2);
        cell.update(|v| *v += 10);
        assert_eq!(cell.get(), 12);
    }

    #[test]
    fn test_cell_clones_share_state() {
        let a = Cell::new("x".to_string());
        let b = a.clone();
        b.set("y".to_string());
        assert_eq!(a.get(), "y");
    }

    #[test]
    fn test_tracked_cell_read() {
        let cell = Cell::new(5);
        let (value, freshness) = tracked(|| cell.get());
        assert_eq!(value, 5);
        assert!(!freshness.is_const());
        assert!(!freshness.is_stale());

        cell.set(6);
        assert!(freshness.is_stale());
    }

    #[test]
    fn test_derived_tracks_its_cells() {
        let a = Cell::new(2);
        let b = Cell::new(3);
        let (a2, b2) = (a.clone(), b.clone());
        let sum = Derived::new(move || a2.get() + b2.get());

        let (value, freshness) = tracked(|| sum.get());
        assert_eq!(value, 5);
        assert!(!freshness.is_stale());

        b.set(10);
        assert!(freshness.is_stale());
        assert_eq!(sum.get(), 12);
    }

    #[test]
    fn test_const_value_is_untracked() {
        let value = Value::constant(7);
        let (v, freshness) = tracked(|| value.get());
        assert_eq!(v, 7);
        assert!(freshness.is_const());
    }
}
