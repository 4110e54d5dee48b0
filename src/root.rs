//! RootBlock - the top-level handle held by the integrator.
//!
//! The root block corresponds to the entire output. It is created once per
//! output target, is never cleared through the reactive lifetime of that
//! output, and is only discarded by the integrator.

use std::rc::Rc;

use crate::block::UserBlock;
use crate::error::RenderError;
use crate::host::Host;
use crate::output::AppendingRange;
use crate::region::Region;
use crate::update::{Poll, PollError, Updater};

/// Owns the program and the single updater produced by the initial render.
pub struct RootBlock<R: AppendingRange> {
    program: UserBlock<R>,
    host: Rc<dyn Host>,
    updater: Option<Box<dyn Updater>>,
}

impl<R: AppendingRange> RootBlock<R> {
    pub fn new(program: UserBlock<R>, host: Rc<dyn Host>) -> Self {
        Self {
            program,
            host,
            updater: None,
        }
    }

    /// Run the program once into `cursor` and retain the resulting updater,
    /// if the program produced any dynamic content at all.
    pub fn render(&mut self, cursor: R) -> Result<(), RenderError> {
        self.host.begin("render RootBlock");
        let result = Region::render(&self.program, cursor, self.host.as_ref());
        self.host.end("render RootBlock");
        self.updater = result?;
        Ok(())
    }

    /// Poll the retained updater. A documented no-op when the initial
    /// render produced no dynamic content.
    pub fn rerender(&mut self) -> Result<(), RenderError> {
        self.host.begin("rerender RootBlock");
        let result = self.poll_retained();
        self.host.end("rerender RootBlock");
        result
    }

    /// True when no updater is retained: rerender will not touch the
    /// output medium at all.
    pub fn is_const(&self) -> bool {
        self.updater.is_none()
    }

    fn poll_retained(&mut self) -> Result<(), RenderError> {
        let Some(updater) = self.updater.take() else {
            self.host.log_result("nothing to do, no updaters");
            return Ok(());
        };

        match updater.poll(self.host.as_ref()) {
            Ok(Poll::Done) => Ok(()),
            Ok(Poll::Continue(updater)) => {
                self.updater = Some(updater);
                Ok(())
            }
            Err(PollError { error, retry }) => {
                // A failed pass keeps its retriable state; the next
                // rerender picks up where this one left off.
                self.updater = retry;
                Err(error)
            }
        }
    }
}
