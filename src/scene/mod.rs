//! Layout and the scene that owns every live entity.

/// Text layout.
pub mod layout;
/// Run options.
pub mod opts;
#[allow(clippy::module_inception)]
/// Scene state and the per-frame tick.
pub mod scene;
