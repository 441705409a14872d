//! Drawing surfaces.

/// `vello_cpu` raster surface.
pub mod cpu;
/// Headless command-recording surface.
pub mod recording;
/// The surface contract.
pub mod surface;
pub(crate) mod text;
