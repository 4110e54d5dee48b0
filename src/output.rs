//! Output medium traits - the integrator-supplied Cursor/Atom contract.
//!
//! The engine renders into an abstract append-only medium. A medium is
//! described by two range types: an appending range (a positioned cursor
//! that can still grow) and its finalized, read-only form. Both are cheap
//! clonable handles; the positions they describe must survive edits made
//! through sibling handles.
//!
//! There is no separate cursor type: an appending range *is* a position in
//! the output at which new content may be inserted, so inserting and
//! positioning travel as one handle.

use crate::update::Updater;

/// A span of output that is still being appended to.
pub trait AppendingRange: Clone + 'static {
    /// The indivisible unit of output content.
    type Atom;

    /// The read-only form of this range once no more appends will occur.
    type Finalized: ReactiveRange<Appending = Self>;

    /// Insert one atom at the current position and advance past it.
    ///
    /// The backend decides whether the atom can be refreshed in place
    /// later: return an updater that re-reads the atom's inputs and
    /// rewrites the emitted unit, or `None` for atoms that can never
    /// change. The call runs inside a tracking frame, so reads made here
    /// are the dependencies of the returned updater.
    fn append(&mut self, atom: Self::Atom) -> Option<Box<dyn Updater>>;

    /// Spawn an independent nested range at the current position. Content
    /// appended to the child lands before anything appended to `self`
    /// afterwards.
    fn child(&mut self) -> Self;

    /// Convert into the read-only form once appends are done.
    fn finalize(self) -> Self::Finalized;
}

/// A previously-rendered span of output.
pub trait ReactiveRange: 'static {
    type Appending: AppendingRange<Finalized = Self>;

    /// Remove exactly the content this range produced - nothing else - and
    /// return a fresh insertion cursor positioned where it was. Move
    /// semantics make a second clear of the same live range impossible.
    fn clear(self) -> Self::Appending;
}

/// Crossing into a nested coordinate system: a child medium with its own
/// cursor and atom types, rendered inside a parent range and folded back
/// into it when flushed.
pub trait CursorAdapter {
    type Parent: AppendingRange;
    type Child: AppendingRange;

    /// Produce the child appending range. Receives the parent's freshly
    /// spawned child range, so the fold target is carried inside the
    /// returned range.
    fn child(&self, cursor: Self::Parent) -> Self::Child;

    /// Fold the finalized child back into the parent, returning the parent
    /// range to continue appending to.
    fn flush(
        &self,
        parent: Self::Parent,
        child: <Self::Child as AppendingRange>::Finalized,
    ) -> Self::Parent;
}
