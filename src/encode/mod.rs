//! Frame sinks.
//!
//! Sinks consume rendered frames in strictly increasing frame order.

/// `ffmpeg`-based MP4 output via the system binary.
pub mod ffmpeg;
/// Numbered PNG files in a directory.
pub mod png;
/// The sink contract and the in-memory sink.
pub mod sink;
