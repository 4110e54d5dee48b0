//! Dependency Tracker - revision tags and tracking frames.
//!
//! Every mutable input carries a [`Tag`]: a handle on the revision at which
//! the input was last written. While a tracking frame is open, reading an
//! input consumes its tag into the frame. Closing the frame yields a
//! [`Freshness`]: the set of tags that were consumed plus a snapshot of
//! their combined revision. Staleness is then a lazy comparison - "has any
//! consumed tag moved past the snapshot" - and never re-runs the
//! computation.
//!
//! # Process-wide state
//!
//! The revision counter and the frame stack are process-wide (thread-local)
//! state with a strict begin/end lifecycle, like the registries in the rest
//! of the ecosystem this crate grew out of. Frames must nest: [`tracked`]
//! closes its frame even when the computation unwinds, so an abrupt exit
//! never corrupts the computations that follow. Nested frames merge their
//! consumed tags into the enclosing frame when they close, so dependencies
//! propagate outward.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::error::RenderError;
use crate::host::Host;
use crate::update::{Poll, PollError, Updater};

/// Monotonically increasing version number. Bumped once per input write.
pub type Revision = u64;

// =============================================================================
// Tracker State
// =============================================================================

struct TrackState {
    /// Current revision. Starts at 1; revision 0 is older than every tag.
    revision: Revision,
    /// Stack of open tracking frames, innermost last.
    frames: Vec<TagSet>,
}

thread_local! {
    static TRACKER: RefCell<TrackState> = RefCell::new(TrackState {
        revision: 1,
        frames: Vec::new(),
    });
}

/// The revision of the most recent write.
pub fn current_revision() -> Revision {
    TRACKER.with(|t| t.borrow().revision)
}

fn advance_revision() -> Revision {
    TRACKER.with(|t| {
        let mut t = t.borrow_mut();
        t.revision += 1;
        t.revision
    })
}

/// Number of open tracking frames. Exposed for balance assertions in tests.
pub(crate) fn frame_depth() -> usize {
    TRACKER.with(|t| t.borrow().frames.len())
}

// =============================================================================
// Tags
// =============================================================================

/// A cheap clonable handle on one mutable input's last-modified revision.
///
/// The input bumps its tag on every write; tracked computations consume the
/// tag on every read.
#[derive(Debug, Clone)]
pub struct Tag {
    inner: Rc<Cell<Revision>>,
}

impl Tag {
    /// Create a tag stamped with the current revision.
    pub fn new() -> Self {
        Self {
            inner: Rc::new(Cell::new(current_revision())),
        }
    }

    /// The revision at which the owning input was last written.
    pub fn revision(&self) -> Revision {
        self.inner.get()
    }

    /// Record a write: stamp the tag with a fresh revision.
    pub fn bump(&self) {
        self.inner.set(advance_revision());
    }

    /// Record a read: add this tag to the innermost open frame, if any.
    /// Outside of any frame this is a no-op, so untracked reads are free.
    pub fn consume(&self) {
        TRACKER.with(|t| {
            if let Some(frame) = t.borrow_mut().frames.last_mut() {
                frame.insert(self);
            }
        });
    }

    fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Default for Tag {
    fn default() -> Self {
        Self::new()
    }
}

/// The set of tags consumed during one tracking frame, deduplicated.
///
/// Its combined version is the maximum revision among its members, so
/// "did anything change" is a single scan, never a re-run.
#[derive(Debug, Default)]
pub struct TagSet {
    tags: Vec<Tag>,
}

impl TagSet {
    fn insert(&mut self, tag: &Tag) {
        if !self.tags.iter().any(|t| t.ptr_eq(tag)) {
            self.tags.push(tag.clone());
        }
    }

    fn merge_into(&self, parent: &mut Self) {
        for tag in &self.tags {
            parent.insert(tag);
        }
    }

    /// Maximum revision among members; 0 when empty.
    pub fn max_revision(&self) -> Revision {
        self.tags.iter().map(Tag::revision).max().unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }
}

// =============================================================================
// Freshness
// =============================================================================

/// One bit of information about a completed computation: did any of the
/// inputs it read change since it ran?
///
/// Captured immediately after a tracked computation finishes; immutable.
/// Re-tracking produces a new `Freshness` rather than mutating this one.
#[derive(Debug)]
pub struct Freshness {
    tags: TagSet,
    snapshot: Revision,
}

impl Freshness {
    /// Have any of the consumed inputs been written since the snapshot?
    pub fn is_stale(&self) -> bool {
        self.tags.max_revision() > self.snapshot
    }

    /// Will this computation ever become stale? True when no mutable input
    /// was read.
    pub fn is_const(&self) -> bool {
        self.tags.is_empty()
    }
}

// =============================================================================
// Tracking Frames
// =============================================================================

/// Closes the frame on drop so an unwinding computation still leaves the
/// frame stack balanced.
struct FrameGuard {
    open: bool,
}

impl FrameGuard {
    fn begin() -> Self {
        TRACKER.with(|t| t.borrow_mut().frames.push(TagSet::default()));
        Self { open: true }
    }

    fn commit(mut self) -> Freshness {
        self.open = false;
        let tags = end_frame();
        let snapshot = tags.max_revision();
        Freshness { tags, snapshot }
    }
}

impl Drop for FrameGuard {
    fn drop(&mut self) {
        if self.open {
            let _ = end_frame();
        }
    }
}

fn end_frame() -> TagSet {
    TRACKER.with(|t| {
        let mut t = t.borrow_mut();
        let frame = t.frames.pop().expect("unbalanced tracking frame");
        if let Some(parent) = t.frames.last_mut() {
            frame.merge_into(parent);
        }
        frame
    })
}

/// Run `f` under a tracking frame and capture its [`Freshness`].
///
/// The frame is closed whether `f` completes or unwinds. Reads made by `f`
/// also count toward any enclosing frame.
pub fn tracked<T>(f: impl FnOnce() -> T) -> (T, Freshness) {
    let guard = FrameGuard::begin();
    let value = f();
    (value, guard.commit())
}

// =============================================================================
// Updatable Computations
// =============================================================================

/// A computation that decided, on first run, that it needs to be polled
/// again later: an [`Updater`] plus the freshness captured while producing
/// it.
///
/// Polling revalidates the captured tags first. While they are still valid
/// the poll is a no-op that stays mutable; only when they are invalid does
/// the retained updater re-run, under a fresh frame that captures a new
/// freshness.
pub struct UpdatableComputation {
    updater: Box<dyn Updater>,
    freshness: Freshness,
}

impl UpdatableComputation {
    /// Run `init` under a tracking frame. A const result, or one that
    /// produced no updater, retains nothing; otherwise the updater is
    /// wrapped with the captured freshness.
    pub fn initialize(
        init: impl FnOnce() -> Result<Option<Box<dyn Updater>>, RenderError>,
    ) -> Result<Option<Box<dyn Updater>>, RenderError> {
        let (result, freshness) = tracked(init);
        match result? {
            Some(updater) if !freshness.is_const() => {
                Ok(Some(Box::new(Self { updater, freshness })))
            }
            _ => Ok(None),
        }
    }
}

impl Updater for UpdatableComputation {
    fn poll(self: Box<Self>, host: &dyn Host) -> Result<Poll, PollError> {
        if !self.freshness.is_stale() {
            // Inputs unchanged: report mutable without re-running anything.
            return Ok(Poll::Continue(self));
        }

        let Self { updater, freshness } = *self;
        let (result, refreshed) = tracked(|| updater.poll(host));
        match result {
            Ok(Poll::Done) => Ok(Poll::Done),
            Ok(Poll::Continue(updater)) => Ok(Poll::Continue(Box::new(Self {
                updater,
                freshness: refreshed,
            }))),
            Err(PollError { error, retry }) => Err(PollError {
                error,
                // The stale freshness is kept, so the next poll retries.
                retry: retry.map(|updater| Box::new(Self { updater, freshness }) as Box<dyn Updater>),
            }),
        }
    }

    fn describe(&self) -> String {
        format!("UpdatableComputation({})", self.updater.describe())
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::NoopHost;

    struct CountingUpdater {
        runs: Rc<Cell<usize>>,
    }

    impl Updater for CountingUpdater {
        fn poll(self: Box<Self>, _host: &dyn Host) -> Result<Poll, PollError> {
            self.runs.set(self.runs.get() + 1);
            Ok(Poll::Continue(self))
        }
    }

    #[test]
    fn test_const_computation() {
        let (value, freshness) = tracked(|| 42);
        assert_eq!(value, 42);
        assert!(freshness.is_const());
        assert!(!freshness.is_stale());
        assert_eq!(frame_depth(), 0);
    }

    #[test]
    fn test_stale_after_bump() {
        let tag = Tag::new();
        let (_, freshness) = tracked(|| tag.consume());
        assert!(!freshness.is_const());
        assert!(!freshness.is_stale());

        tag.bump();
        assert!(freshness.is_stale());
    }

    #[test]
    fn test_nested_reads_propagate_outward() {
        let tag = Tag::new();
        let (_, outer) = tracked(|| {
            let (_, inner) = tracked(|| tag.consume());
            assert!(!inner.is_const());
        });
        assert!(!outer.is_const());

        tag.bump();
        assert!(outer.is_stale());
    }

    #[test]
    fn test_write_during_frame_is_not_stale() {
        let tag = Tag::new();
        let (_, freshness) = tracked(|| {
            tag.consume();
            tag.bump();
        });
        // Snapshot is taken at frame end, after the write.
        assert!(!freshness.is_stale());
    }

    #[test]
    fn test_untracked_read_is_free() {
        let tag = Tag::new();
        tag.consume();
        assert_eq!(frame_depth(), 0);
    }

    #[test]
    fn test_frame_balanced_on_unwind() {
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            tracked(|| -> u32 { panic!("boom") });
        }));
        assert!(result.is_err());
        assert_eq!(frame_depth(), 0);
    }

    #[test]
    fn test_unwound_frame_still_propagates() {
        let tag = Tag::new();
        let (_, outer) = tracked(|| {
            let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
                tracked(|| -> u32 {
                    tag.consume();
                    panic!("boom")
                });
            }));
            assert!(result.is_err());
        });
        assert!(!outer.is_const());
    }

    #[test]
    fn test_initialize_const_retains_nothing() {
        let runs = Rc::new(Cell::new(0));
        let updater = UpdatableComputation::initialize(|| {
            Ok(Some(Box::new(CountingUpdater { runs: runs.clone() }) as Box<dyn Updater>))
        })
        .unwrap();
        // No tags consumed: const, updater discarded.
        assert!(updater.is_none());
    }

    #[test]
    fn test_initialize_without_updater_retains_nothing() {
        let tag = Tag::new();
        let updater = UpdatableComputation::initialize(|| {
            tag.consume();
            Ok(None)
        })
        .unwrap();
        assert!(updater.is_none());
    }

    #[test]
    fn test_poll_is_noop_while_valid() {
        let tag = Tag::new();
        let runs = Rc::new(Cell::new(0));
        let runs_inner = runs.clone();
        let updater = UpdatableComputation::initialize(move || {
            tag.consume();
            Ok(Some(Box::new(CountingUpdater { runs: runs_inner }) as Box<dyn Updater>))
        })
        .unwrap()
        .expect("mutable computation retains an updater");

        // Valid tags: the inner updater must not run.
        let updater = match updater.poll(&NoopHost).unwrap() {
            Poll::Continue(u) => u,
            Poll::Done => panic!("updatable computation completed early"),
        };
        assert_eq!(runs.get(), 0);
        drop(updater);
    }

    #[test]
    fn test_poll_reruns_when_invalid() {
        let tag = Tag::new();
        let runs = Rc::new(Cell::new(0));
        let runs_inner = runs.clone();
        let consumed = tag.clone();
        let updater = UpdatableComputation::initialize(move || {
            consumed.consume();
            Ok(Some(Box::new(CountingUpdater { runs: runs_inner }) as Box<dyn Updater>))
        })
        .unwrap()
        .expect("mutable computation retains an updater");

        tag.bump();
        let updater = match updater.poll(&NoopHost).unwrap() {
            Poll::Continue(u) => u,
            Poll::Done => panic!("updatable computation completed early"),
        };
        assert_eq!(runs.get(), 1);

        // Fresh again until the next bump.
        match updater.poll(&NoopHost).unwrap() {
            Poll::Continue(_) => {}
            Poll::Done => panic!("updatable computation completed early"),
        }
        assert_eq!(runs.get(), 1);
    }
}
