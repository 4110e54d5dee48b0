//! # reflow
//!
//! Incremental rendering engine with fine-grained dependency tracking.
//!
//! reflow renders a hierarchical, block-structured program into an abstract
//! append-only output medium, then re-renders only the parts whose inputs
//! changed. The medium is fully generic - the engine is parameterized over
//! the integrator's range/atom types - so the same kernel can target
//! in-memory sequences, textual streams, or tree structures.
//!
//! ## Architecture
//!
//! The pipeline is a single synchronous pass in each direction:
//!
//! ```text
//! render:   RootBlock -> Region -> blocks/atoms -> tree of Updaters
//! rerender: RootBlock -> poll retained Updater -> refresh / clear-and-rebuild
//! ```
//!
//! Every atom append and every dynamic block runs under a tracking frame
//! ([`track`]). The captured [`Freshness`] decides, on each rerender,
//! whether a subtree is refreshed in place (polling its retained updaters)
//! or torn down and rebuilt from scratch (a stale [`DynamicBlock`]).
//!
//! ## Modules
//!
//! - [`track`] - revision tags, tracking frames, freshness
//! - [`cell`] - reactive inputs ([`Cell`], [`Derived`], [`Value`])
//! - [`output`] - the integrator-supplied range/atom traits
//! - [`update`] - the updater polling protocol
//! - [`region`] - the per-subtree rendering context
//! - [`block`] - static and dynamic renderable units
//! - [`root`] - the top-level handle driving render/rerender
//! - [`host`] - diagnostics hooks ([`NoopHost`], [`TraceHost`])
//! - [`backends`] - bundled sequence and text output media

pub mod backends;
pub mod block;
pub mod cell;
pub mod error;
pub mod host;
pub mod output;
pub mod region;
pub mod root;
pub mod track;
pub mod update;

pub use block::{Block, BlockFn, DynamicBlock, UserBlock};
pub use cell::{Cell, Derived, Value};
pub use error::{BoxError, RenderError};
pub use host::{Host, NoopHost, TraceHost};
pub use output::{AppendingRange, CursorAdapter, ReactiveRange};
pub use region::Region;
pub use root::RootBlock;
pub use track::{current_revision, tracked, Freshness, Revision, Tag, TagSet, UpdatableComputation};
pub use update::{to_updater, Poll, PollError, Updater};
