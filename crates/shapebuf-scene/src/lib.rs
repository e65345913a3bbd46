#![warn(missing_docs)]

//! Scene packing, validation and batch tracing for shapebuf.
//!
//! - [`build`] packs a [`SceneDoc`](shapebuf_ir::SceneDoc) into flat
//!   parameter buffers, checking parameters and [`Limits`] on the way.
//! - [`validate`](validate::validate) checks the block layout of packed
//!   buffers, including ones built elsewhere.
//! - [`PackedScene`] traces single rays or parallel batches.

mod builder;
mod error;
mod limits;
mod trace;
pub mod validate;

pub use builder::{build, build_json, build_node};
pub use error::{Result, SceneError};
pub use limits::Limits;
pub use trace::PackedScene;
pub use validate::LayoutStats;
