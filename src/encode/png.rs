use std::path::{Path, PathBuf};

use crate::encode::ffmpeg::ensure_parent_dir;
use crate::encode::sink::{FrameSink, SinkConfig, check_frame_size};
use crate::foundation::core::FrameIndex;
use crate::foundation::error::{FanfareError, FanfareResult};
use crate::render::surface::FrameRGBA;

/// Writes each frame to `<dir>/frame_000000.png`, `<dir>/frame_000001.png`, ...
pub struct PngSequenceSink {
    dir: PathBuf,
    cfg: Option<SinkConfig>,
    last_idx: Option<FrameIndex>,
    written: u64,
}

impl PngSequenceSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            cfg: None,
            last_idx: None,
            written: 0,
        }
    }

    /// Path the frame `idx` is written to.
    pub fn frame_path(&self, idx: FrameIndex) -> PathBuf {
        self.dir.join(format!("frame_{:06}.png", idx.0))
    }

    pub fn written(&self) -> u64 {
        self.written
    }
}

impl FrameSink for PngSequenceSink {
    fn begin(&mut self, cfg: SinkConfig) -> FanfareResult<()> {
        use anyhow::Context as _;

        std::fs::create_dir_all(&self.dir)
            .with_context(|| format!("create output dir '{}'", self.dir.display()))?;
        self.cfg = Some(cfg);
        self.last_idx = None;
        self.written = 0;
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRGBA) -> FanfareResult<()> {
        let cfg = self
            .cfg
            .as_ref()
            .ok_or_else(|| FanfareError::encode("png sink not started"))?;
        if let Some(last) = self.last_idx
            && idx <= last
        {
            return Err(FanfareError::encode(
                "png sink received out-of-order frame index",
            ));
        }
        check_frame_size(cfg, frame)?;

        write_png(&self.frame_path(idx), frame)?;
        self.last_idx = Some(idx);
        self.written += 1;
        Ok(())
    }

    fn end(&mut self) -> FanfareResult<()> {
        tracing::info!(dir = %self.dir.display(), frames = self.written, "wrote png sequence");
        self.cfg = None;
        Ok(())
    }
}

/// Write one frame as a straight-alpha PNG.
pub fn write_png(path: &Path, frame: &FrameRGBA) -> FanfareResult<()> {
    use anyhow::Context as _;

    ensure_parent_dir(path)?;
    let straight;
    let data = if frame.premultiplied {
        straight = unpremultiply_rgba8(&frame.data);
        straight.as_slice()
    } else {
        frame.data.as_slice()
    };

    image::save_buffer_with_format(
        path,
        data,
        frame.width,
        frame.height,
        image::ColorType::Rgba8,
        image::ImageFormat::Png,
    )
    .with_context(|| format!("write png '{}'", path.display()))?;
    Ok(())
}

fn unpremultiply_rgba8(src: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(src.len());
    for px in src.chunks_exact(4) {
        let a = u16::from(px[3]);
        if a == 0 {
            out.extend_from_slice(&[0, 0, 0, 0]);
            continue;
        }
        let un = |c: u8| -> u8 { ((u16::from(c) * 255 + a / 2) / a).min(255) as u8 };
        out.extend_from_slice(&[un(px[0]), un(px[1]), un(px[2]), px[3]]);
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/encode/png.rs"]
mod tests;
