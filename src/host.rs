//! Host - diagnostics collaborator.
//!
//! The host supplies tracing hooks fired around renders, rerenders and
//! block invocations. They are purely diagnostic: the engine behaves
//! identically under [`NoopHost`]. [`TraceHost`] forwards everything to the
//! `tracing` ecosystem with an indentation depth so nested block renders
//! read as a tree in the log output.

/// Tracing hooks. All methods default to no-ops.
pub trait Host {
    /// A traced operation (render, rerender, block invocation) begins.
    fn begin(&self, _what: &str) {}

    /// The matching operation ends.
    fn end(&self, _what: &str) {}

    /// An intermediate result worth logging.
    fn log_result(&self, _message: &str) {}
}

/// Host that discards everything.
pub struct NoopHost;

impl Host for NoopHost {}

/// Host that emits to `tracing` at DEBUG (begin/end) and TRACE (results),
/// tracking nesting depth for readable output.
pub struct TraceHost {
    depth: std::cell::Cell<usize>,
}

impl TraceHost {
    pub fn new() -> Self {
        Self {
            depth: std::cell::Cell::new(0),
        }
    }

    /// Current nesting depth; 0 outside of any traced operation.
    pub fn depth(&self) -> usize {
        self.depth.get()
    }

    fn pad(&self) -> String {
        "  ".repeat(self.depth.get())
    }
}

impl Default for TraceHost {
    fn default() -> Self {
        Self::new()
    }
}

impl Host for TraceHost {
    fn begin(&self, what: &str) {
        tracing::debug!("{}> {}", self.pad(), what);
        self.depth.set(self.depth.get() + 1);
    }

    fn end(&self, what: &str) {
        self.depth.set(self.depth.get().saturating_sub(1));
        tracing::debug!("{}< {}", self.pad(), what);
    }

    fn log_result(&self, message: &str) {
        tracing::trace!("{}- {}", self.pad(), message);
    }
}
