//! Bundled output backends.
//!
//! The engine is generic over its output medium; these are the two media it
//! ships with. [`seq`] renders into an in-memory sequence and is what most
//! of the test suite drives; [`text`] layers a line-oriented textual output
//! plus a [`CursorAdapter`](crate::output::CursorAdapter) example on top of
//! it.

pub mod seq;
pub mod text;

pub use seq::{SealedSeqRange, SeqOutput, SeqRange};
pub use text::{RowAdapter, TextOutput};
