//! The frame loop and its viewport feed.

/// Frame loop, run limits and pacing.
pub mod driver;
/// Fixed and scripted viewport sources.
pub mod viewport;
