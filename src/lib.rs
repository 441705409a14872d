//! Fanfare renders an animated greeting: each letter of a short text launches as a firework
//! from the bottom center of the viewport, flies to its place in the centered text block,
//! releases a rising, fading balloon and settles.
//!
//! The API is driver-oriented:
//!
//! - Build [`GreetingOpts`] (or load them from JSON)
//! - Create a [`Scene`] with a [`RandomSource`] and pick a [`Surface`]
//! - Hand both to a [`Driver`] and stream frames into a [`FrameSink`]
#![forbid(unsafe_code)]

mod animation;
mod assets;
mod foundation;

/// Frame sinks: memory, PNG sequences and MP4 via `ffmpeg`.
pub mod encode;
/// Drawing surfaces.
pub mod render;
/// Layout, options and the per-frame scene tick.
pub mod scene;
/// The frame loop.
pub mod session;

pub use crate::foundation::core::{Fps, FrameIndex, Point, Rgba8Premul, Vec2, Viewport};
pub use crate::foundation::error::{FanfareError, FanfareResult};
pub use crate::foundation::rng::{RandomSource, Rng64, SequenceRandom};

pub use crate::animation::balloon::Balloon;
pub use crate::animation::letter::{Letter, Phase, PhaseKind};
pub use crate::assets::color::{ColorDef, LetterPalette};

pub use crate::encode::ffmpeg::{FfmpegSink, FfmpegSinkOpts, is_ffmpeg_on_path};
pub use crate::encode::png::{PngSequenceSink, write_png};
pub use crate::encode::sink::{FrameSink, InMemorySink, NullSink, SinkConfig};
pub use crate::render::cpu::{CpuSurface, CpuSurfaceOpts};
pub use crate::render::recording::{DrawCmd, RecordingSurface};
pub use crate::render::surface::{FrameRGBA, Surface, TextAlign, TextBaseline};
pub use crate::render::text::FontBytes;
pub use crate::scene::layout::{GlyphPlacement, TextLayout, layout_text};
pub use crate::scene::opts::GreetingOpts;
pub use crate::scene::scene::{FrameStats, Scene};
pub use crate::session::driver::{Driver, DriverOpts, RunLimit, RunStats};
pub use crate::session::viewport::{FixedViewport, ScriptedViewport, ViewportSource};
