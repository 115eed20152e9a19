//! Audio Engine Module
//!
//! Audio work the bundled session host performs:
//! - WAV probing, decoding and glued renders
//! - Loudness measurement

pub mod io;
pub mod loudness;

pub use io::{probe_wav, read_wav, render_glued, write_test_tone, write_wav_f32, GluePart, WavInfo};
pub use loudness::{calculate_rms, linear_to_db, normalization_gain};
