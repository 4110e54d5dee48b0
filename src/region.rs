//! Region - the per-subtree rendering context.
//!
//! A region is created for each area of the output. It inserts content at
//! its range's cursor and accumulates the updaters that must run whenever
//! inputs to the area change. Sibling regions (created by
//! [`Region::render_block`], [`Region::open`] and [`Region::flush`]) share
//! one updater list; private child regions (created by
//! [`Region::render_static`] and the dynamic render path) collect their own
//! list, which is folded into a single composite before the parent retains
//! it.
//!
//! A region can only wrap the integrator's range primitive: the type system
//! rules out wrapping a region around another region.

use std::cell::RefCell;
use std::rc::Rc;

use crate::block::{Block, UserBlock};
use crate::error::RenderError;
use crate::host::Host;
use crate::output::{AppendingRange, CursorAdapter, ReactiveRange};
use crate::track::UpdatableComputation;
use crate::update::{to_updater, Updater};

type UpdaterList = Rc<RefCell<Vec<Box<dyn Updater>>>>;

/// Execution context handed to a user block while it runs.
pub struct Region<'h, R: AppendingRange> {
    range: R,
    updaters: UpdaterList,
    host: &'h dyn Host,
}

impl<'h, R: AppendingRange> Region<'h, R> {
    /// Render a block once into `range` and fold everything it retained
    /// into a single updater. This is the top-level entry used by
    /// [`RootBlock`](crate::root::RootBlock).
    pub fn render(
        block: &UserBlock<R>,
        range: R,
        host: &'h dyn Host,
    ) -> Result<Option<Box<dyn Updater>>, RenderError> {
        let mut region = Self::new(range, host);
        region.render_static(block)?;
        Ok(region.into_updater())
    }

    fn new(range: R, host: &'h dyn Host) -> Self {
        Self {
            range,
            updaters: Rc::new(RefCell::new(Vec::new())),
            host,
        }
    }

    fn with_updaters(range: R, host: &'h dyn Host, updaters: UpdaterList) -> Self {
        Self {
            range,
            updaters,
            host,
        }
    }

    /// The diagnostics host this region renders under.
    pub fn host(&self) -> &'h dyn Host {
        self.host
    }

    /// Append one atom at the current cursor.
    ///
    /// The append runs under a tracking frame: if the atom's value is
    /// dynamic, re-appending is retained as an updater; a fully static atom
    /// retains nothing.
    pub fn atom(&mut self, atom: R::Atom) -> Result<(), RenderError> {
        let range = &mut self.range;
        let updater = UpdatableComputation::initialize(|| Ok(range.append(atom)))?;
        self.update_with(updater);
        Ok(())
    }

    /// Open a nested coordinate system over a different cursor/atom pair.
    /// The child region shares this region's updater list.
    pub fn open<A>(&mut self, adapter: &A) -> Region<'h, A::Child>
    where
        A: CursorAdapter<Parent = R>,
    {
        Region::with_updaters(
            adapter.child(self.range.child()),
            self.host,
            Rc::clone(&self.updaters),
        )
    }

    /// Finalize a child coordinate system and fold it back into this
    /// region's range, returning the region to continue rendering with.
    pub fn flush<A>(&mut self, adapter: &A, child: Region<'h, A::Child>) -> Self
    where
        A: CursorAdapter<Parent = R>,
    {
        let range = adapter.flush(self.range.clone(), child.range.finalize());
        Self::with_updaters(range, self.host, Rc::clone(&self.updaters))
    }

    /// Render a block that will only ever run once. Dynamic atoms or blocks
    /// *inside* it may still change, but the set of things it renders will
    /// not; its updaters are folded into one composite retained here.
    pub fn render_static(&mut self, block: &UserBlock<R>) -> Result<(), RenderError> {
        self.host.begin(&format!("rendering {}", block.describe()));
        let mut inner = Region::new(self.range.clone(), self.host);
        let result = block.invoke(&mut inner);
        self.host.end(&format!("rendering {}", block.describe()));
        result?;

        let updater = inner.into_updater();
        self.update_with(updater);
        Ok(())
    }

    /// Render a block into either a fresh child cursor or - when given a
    /// previously-rendered range - the cursor obtained by clearing it.
    /// Returns the finalized range and the folded child updater; the caller
    /// (a dynamic block) retains both so it can clear-and-rebuild on
    /// staleness.
    pub(crate) fn render_dynamic(
        &mut self,
        block: &UserBlock<R>,
        into: Option<R::Finalized>,
    ) -> Result<(R::Finalized, Option<Box<dyn Updater>>), RenderError> {
        let cursor = match into {
            Some(range) => range.clear(),
            None => self.range.child(),
        };
        let (range, updaters) = render_into(block, cursor, self.host);
        Ok((range, updaters?))
    }

    /// Render a polymorphic [`Block`] into a sibling region sharing this
    /// region's updater list.
    pub fn render_block(&mut self, block: &Block<R>) -> Result<(), RenderError> {
        let mut sibling =
            Region::with_updaters(self.range.clone(), self.host, Rc::clone(&self.updaters));
        block.invoke(&mut sibling)
    }

    /// Retain an updater for this region. Polled on every rerender of the
    /// enclosing subtree.
    pub(crate) fn update_with(&mut self, updater: Option<Box<dyn Updater>>) {
        if let Some(updater) = updater {
            self.host
                .log_result(&format!("retaining {}", updater.describe()));
            self.updaters.borrow_mut().push(updater);
        }
    }

    fn into_updater(self) -> Option<Box<dyn Updater>> {
        to_updater(std::mem::take(&mut *self.updaters.borrow_mut()))
    }
}

/// Render a user block into a private region over `cursor`. Shared by the
/// first render of a dynamic block and by its clear-and-rebuild transition.
///
/// The finalized range comes back even when the block fails, so a dynamic
/// block can retain it and retry the rebuild on a later poll. Updaters
/// collected before a failure are discarded; the retry rebuilds from
/// scratch anyway.
pub(crate) fn render_into<R: AppendingRange>(
    block: &UserBlock<R>,
    cursor: R,
    host: &dyn Host,
) -> (R::Finalized, Result<Option<Box<dyn Updater>>, RenderError>) {
    let mut region = Region::new(cursor, host);
    let result = block.invoke(&mut region);
    let updater = to_updater(std::mem::take(&mut *region.updaters.borrow_mut()));
    let range = region.range.finalize();
    match result {
        Ok(()) => (range, Ok(updater)),
        Err(error) => (range, Err(error)),
    }
}
