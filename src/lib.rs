//! VA Pipeline - voice-line session automation
//!
//! Takes a folder of voice-line recordings through three stages inside a
//! DAW-style session:
//! 1. Import: one track per character folder, one clip per recording
//! 2. Sort: each track's clips reordered quietest to loudest
//! 3. Glue: each track merged into one clip, with a named marker for
//!    every original clip boundary
//!
//! # Architecture
//!
//! The stages in [`pipeline`] only talk to the session through the
//! [`host::Host`] trait. [`session::Session`] is the bundled host: a
//! JSON-persisted project with undo history and real WAV rendering.

pub mod cli;
pub mod config;
pub mod engine;
pub mod error;
pub mod host;
pub mod pipeline;
pub mod session;

pub use config::PipelineConfig;
pub use error::{Result, VaError};
pub use host::{ClipId, Host, LocalFs, MediaFs, MediaSource};
pub use pipeline::{run_pipeline, PipelineReport};
pub use session::Session;
