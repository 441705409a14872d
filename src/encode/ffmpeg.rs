use crate::encode::sink::{FrameSink, SinkConfig, check_frame_size};
use crate::foundation::core::{Fps, FrameIndex};
use crate::foundation::error::{FanfareError, FanfareResult};
use crate::foundation::math::mul_div255_u16;
use crate::render::surface::FrameRGBA;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdin, Command, Stdio};

/// Where and how [`FfmpegSink`] writes its MP4.
#[derive(Clone, Debug)]
pub struct FfmpegSinkOpts {
    /// Destination `.mp4`.
    pub out_path: PathBuf,
    /// Replace an existing file at `out_path`.
    pub overwrite: bool,
    /// Straight-alpha color that translucent pixels are composited onto.
    pub background: [u8; 4],
}

impl FfmpegSinkOpts {
    /// Overwriting, black-backed output at `out_path`.
    pub fn new(out_path: impl Into<PathBuf>) -> Self {
        Self {
            out_path: out_path.into(),
            overwrite: true,
            background: [0, 0, 0, 255],
        }
    }
}

/// Pipes frames as raw RGBA into a child `ffmpeg` that encodes H.264.
pub struct FfmpegSink {
    opts: FfmpegSinkOpts,

    child: Option<Child>,
    stdin: Option<ChildStdin>,
    stderr_drain: Option<std::thread::JoinHandle<std::io::Result<Vec<u8>>>>,

    scratch: Vec<u8>,
    cfg: Option<SinkConfig>,
    last_idx: Option<FrameIndex>,
}

impl FfmpegSink {
    pub fn new(opts: FfmpegSinkOpts) -> Self {
        Self {
            opts,
            child: None,
            stdin: None,
            stderr_drain: None,
            scratch: Vec::new(),
            cfg: None,
            last_idx: None,
        }
    }
}

impl FrameSink for FfmpegSink {
    fn begin(&mut self, cfg: SinkConfig) -> FanfareResult<()> {
        if cfg.width == 0 || cfg.height == 0 {
            return Err(FanfareError::validation(
                "mp4 output needs a non-empty frame",
            ));
        }
        if !cfg.width.is_multiple_of(2) || !cfg.height.is_multiple_of(2) {
            return Err(FanfareError::validation(
                "mp4 output needs even width and height (yuv420p)",
            ));
        }

        ensure_parent_dir(&self.opts.out_path)?;
        if !self.opts.overwrite && self.opts.out_path.exists() {
            return Err(FanfareError::validation(format!(
                "refusing to replace '{}'",
                self.opts.out_path.display()
            )));
        }

        if !is_ffmpeg_on_path() {
            return Err(FanfareError::encode(
                "no ffmpeg on PATH; mp4 output needs it",
            ));
        }

        let mut cmd = Command::new("ffmpeg");
        cmd.stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped());
        cmd.arg(if self.opts.overwrite { "-y" } else { "-n" });

        // stdin carries opaque rgba; push_frame composites each frame onto the background.
        cmd.args([
            "-loglevel",
            "error",
            "-f",
            "rawvideo",
            "-pix_fmt",
            "rgba",
            "-s",
            &format!("{}x{}", cfg.width, cfg.height),
        ]);
        push_input_fps(&mut cmd, cfg.fps);
        cmd.args(["-i", "pipe:0"]);
        cmd.args([
            "-an",
            "-c:v",
            "libx264",
            "-pix_fmt",
            "yuv420p",
            "-movflags",
            "+faststart",
        ]);
        cmd.arg(&self.opts.out_path);

        let mut child = cmd.spawn().map_err(|e| {
            FanfareError::encode(format!(
                "could not start ffmpeg: {e}"
            ))
        })?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| FanfareError::encode("ffmpeg stdin unavailable"))?;
        let mut stderr = child
            .stderr
            .take()
            .ok_or_else(|| FanfareError::encode("ffmpeg stderr unavailable"))?;
        let stderr_drain = std::thread::spawn(move || {
            let mut stderr_bytes = Vec::new();
            stderr.read_to_end(&mut stderr_bytes)?;
            Ok(stderr_bytes)
        });

        tracing::debug!(
            out = %self.opts.out_path.display(),
            width = cfg.width,
            height = cfg.height,
            "encoding mp4"
        );
        self.scratch = vec![0u8; (cfg.width as usize) * (cfg.height as usize) * 4];
        self.child = Some(child);
        self.stdin = Some(stdin);
        self.stderr_drain = Some(stderr_drain);
        self.cfg = Some(cfg);
        self.last_idx = None;
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRGBA) -> FanfareResult<()> {
        let cfg = self
            .cfg
            .as_ref()
            .ok_or_else(|| FanfareError::encode("mp4 sink used before begin"))?;
        if let Some(last) = self.last_idx
            && idx <= last
        {
            return Err(FanfareError::encode(
                "mp4 sink got frames out of order",
            ));
        }
        check_frame_size(cfg, frame)?;
        self.last_idx = Some(idx);

        if frame.premultiplied {
            composite_onto_background(
                &mut self.scratch,
                &frame.data,
                self.opts.background,
            )?;
        } else {
            self.scratch.copy_from_slice(&frame.data);
        }

        let Some(stdin) = self.stdin.as_mut() else {
            return Err(FanfareError::encode("mp4 sink already ended"));
        };

        use std::io::Write as _;
        stdin.write_all(&self.scratch).map_err(|e| {
            FanfareError::encode(format!("piping frame to ffmpeg: {e}"))
        })?;
        Ok(())
    }

    fn end(&mut self) -> FanfareResult<()> {
        drop(self.stdin.take());
        let mut child = self
            .child
            .take()
            .ok_or_else(|| FanfareError::encode("mp4 sink used before begin"))?;

        let status = child.wait().map_err(|e| {
            FanfareError::encode(format!("waiting on ffmpeg: {e}"))
        })?;
        let stderr_bytes = match self.stderr_drain.take() {
            Some(handle) => handle
                .join()
                .map_err(|_| FanfareError::encode("ffmpeg stderr reader panicked"))?
                .map_err(|e| FanfareError::encode(format!("reading ffmpeg stderr: {e}")))?,
            None => Vec::new(),
        };

        if !status.success() {
            let stderr = String::from_utf8_lossy(&stderr_bytes);
            return Err(FanfareError::encode(format!(
                "ffmpeg failed ({}): {}",
                status,
                stderr.trim()
            )));
        }

        self.cfg = None;
        Ok(())
    }
}

fn push_input_fps(cmd: &mut Command, fps: Fps) {
    // Input option: must precede `-i`.
    cmd.args(["-r", &format!("{}/{}", fps.num, fps.den)]);
}

fn composite_onto_background(
    dst: &mut [u8],
    premul: &[u8],
    background: [u8; 4],
) -> FanfareResult<()> {
    if dst.len() != premul.len() || !dst.len().is_multiple_of(4) {
        return Err(FanfareError::validation(
            "background composite needs two rgba8 buffers of equal length",
        ));
    }

    let [br, bg, bb, _] = background.map(u16::from);
    for (out, px) in dst.chunks_exact_mut(4).zip(premul.chunks_exact(4)) {
        let cover = 255 - u16::from(px[3]);
        let over = |c: u8, b: u16| (u16::from(c) + mul_div255_u16(b, cover)).min(255) as u8;
        out[0] = over(px[0], br);
        out[1] = over(px[1], bg);
        out[2] = over(px[2], bb);
        out[3] = 255;
    }

    Ok(())
}

/// Create the directory `path` will be written into.
pub fn ensure_parent_dir(path: &Path) -> FanfareResult<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        use anyhow::Context as _;
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    Ok(())
}

/// `ffmpeg -version` runs successfully.
pub fn is_ffmpeg_on_path() -> bool {
    Command::new("ffmpeg")
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}
