//! Block / DynamicBlock - the renderable unit.
//!
//! A [`UserBlock`] is a user-supplied render closure plus a debug
//! description. A [`Block`] is the polymorphic capability "can be rendered
//! into an output": either a plain block, rendered exactly once, or a
//! [`DynamicBlock`], whose entire rendered subtree is torn down and rebuilt
//! whenever any input it read changes.

use std::rc::Rc;

use crate::error::RenderError;
use crate::host::Host;
use crate::output::{AppendingRange, ReactiveRange};
use crate::region::{render_into, Region};
use crate::track::{tracked, Freshness};
use crate::update::{Poll, PollError, Updater};

/// Render closure shape shared by every block variant.
pub type BlockFn<R> = dyn Fn(&mut Region<'_, R>) -> Result<(), RenderError>;

/// A user-supplied block: a render closure and a debug description.
pub struct UserBlock<R: AppendingRange> {
    f: Rc<BlockFn<R>>,
    description: String,
}

impl<R: AppendingRange> UserBlock<R> {
    pub fn new(
        description: impl Into<String>,
        f: impl Fn(&mut Region<'_, R>) -> Result<(), RenderError> + 'static,
    ) -> Self {
        Self {
            f: Rc::new(f),
            description: description.into(),
        }
    }

    pub fn describe(&self) -> &str {
        &self.description
    }

    pub(crate) fn invoke(&self, region: &mut Region<'_, R>) -> Result<(), RenderError> {
        (self.f)(region)
    }
}

impl<R: AppendingRange> Clone for UserBlock<R> {
    fn clone(&self) -> Self {
        Self {
            f: Rc::clone(&self.f),
            description: self.description.clone(),
        }
    }
}

/// The polymorphic renderable: a plain block or a dynamic one.
pub enum Block<R: AppendingRange> {
    /// Rendered exactly once; only atoms inside it may change.
    Static(UserBlock<R>),
    /// Torn down and rebuilt when any tracked input it read changes.
    Dynamic(DynamicBlock<R>),
}

impl<R: AppendingRange> Block<R> {
    /// A block rendered once, statically.
    pub fn static_block(block: UserBlock<R>) -> Self {
        Self::Static(block)
    }

    /// A block rebuilt whenever its tracked inputs change.
    pub fn dynamic(block: UserBlock<R>) -> Self {
        Self::Dynamic(DynamicBlock::new(block))
    }

    pub fn describe(&self) -> String {
        match self {
            Self::Static(block) => block.describe().to_string(),
            Self::Dynamic(block) => format!("DynamicBlock({})", block.block.describe()),
        }
    }

    pub(crate) fn invoke(&self, region: &mut Region<'_, R>) -> Result<(), RenderError> {
        let host = region.host();
        host.begin(&format!("rendering {}", self.describe()));
        let result = match self {
            Self::Static(block) => block.invoke(region),
            Self::Dynamic(block) => block.render(region),
        };
        host.end(&format!("rendering {}", self.describe()));
        result
    }
}

/// A block whose rendered subtree is one atomic unit: however many atoms
/// and nested blocks it contains, a change to any input it read tears the
/// whole span down and rebuilds it from scratch.
pub struct DynamicBlock<R: AppendingRange> {
    block: UserBlock<R>,
}

impl<R: AppendingRange> DynamicBlock<R> {
    pub fn new(block: UserBlock<R>) -> Self {
        Self { block }
    }

    /// First render: run the user block under the tracker into a dedicated
    /// child range/region pair, then hand the bundled result - range,
    /// folded updater, freshness - to the parent region as this subtree's
    /// updater.
    pub(crate) fn render(&self, region: &mut Region<'_, R>) -> Result<(), RenderError> {
        let (result, freshness) = tracked(|| region.render_dynamic(&self.block, None));
        let (range, updaters) = result?;

        if freshness.is_const() && updaters.is_none() {
            // Fully constant subtree: it can never go stale and has nothing
            // to poll, so nothing is retained.
            return Ok(());
        }

        region.update_with(Some(Box::new(DynamicBlockResult {
            block: self.clone(),
            range,
            updaters,
            freshness,
        })));
        Ok(())
    }
}

impl<R: AppendingRange> Clone for DynamicBlock<R> {
    fn clone(&self) -> Self {
        Self {
            block: self.block.clone(),
        }
    }
}

/// The rendered state of one dynamic block: it owns the rendered range, the
/// most recent freshness and the folded child updater, and it *is* the
/// updater for that subtree.
struct DynamicBlockResult<R: AppendingRange> {
    block: DynamicBlock<R>,
    range: R::Finalized,
    updaters: Option<Box<dyn Updater>>,
    freshness: Freshness,
}

impl<R: AppendingRange> Updater for DynamicBlockResult<R> {
    fn poll(self: Box<Self>, host: &dyn Host) -> Result<Poll, PollError> {
        let Self {
            block,
            range,
            updaters,
            freshness,
        } = *self;

        if freshness.is_stale() {
            // The only transition that re-executes user code: clear the
            // rendered span, obtaining a fresh cursor, and run the block
            // again from scratch.
            host.log_result("stale, rerendering");
            let (result, rebuilt) = tracked(|| render_into(&block.block, range.clear(), host));
            let (range, outcome) = result;
            match outcome {
                Ok(updaters) => Ok(Poll::Continue(Box::new(Self {
                    block,
                    range,
                    updaters,
                    freshness: rebuilt,
                }))),
                Err(error) => Err(PollError {
                    error,
                    // The pre-rebuild freshness is still stale, so the next
                    // poll retries the rebuild.
                    retry: Some(Box::new(Self {
                        block,
                        range,
                        updaters: None,
                        freshness,
                    })),
                }),
            }
        } else if freshness.is_const() && updaters.is_none() {
            // A rebuild that read no mutable input: terminal, drop it.
            host.log_result("const, dropping");
            Ok(Poll::Done)
        } else if let Some(updaters) = updaters {
            host.log_result("fresh, polling updaters");
            match updaters.poll(host) {
                Ok(Poll::Done) => Ok(Poll::Continue(Box::new(Self {
                    block,
                    range,
                    updaters: None,
                    freshness,
                }))),
                Ok(Poll::Continue(updaters)) => Ok(Poll::Continue(Box::new(Self {
                    block,
                    range,
                    updaters: Some(updaters),
                    freshness,
                }))),
                Err(PollError { error, retry }) => Err(PollError {
                    error,
                    retry: Some(Box::new(Self {
                        block,
                        range,
                        updaters: retry,
                        freshness,
                    })),
                }),
            }
        } else {
            host.log_result("fresh, no updaters to poll");
            Ok(Poll::Continue(Box::new(Self {
                block,
                range,
                updaters: None,
                freshness,
            })))
        }
    }

    fn describe(&self) -> String {
        format!("DynamicBlockResult({})", self.block.block.describe())
    }
}
