use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand};
use fanfare::{
    CpuSurface, CpuSurfaceOpts, Driver, DriverOpts, FfmpegSink, FfmpegSinkOpts, FixedViewport,
    FontBytes, Fps, FrameIndex, FrameStats, GreetingOpts, NullSink, PngSequenceSink,
    RecordingSurface, Rng64, RunLimit, Scene, ScriptedViewport, Viewport, ViewportSource,
};

#[derive(Parser, Debug)]
#[command(name = "fanfare", version)]
struct Cli {
    /// Raise log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render a single frame as a PNG.
    Frame(FrameArgs),
    /// Render an MP4 video (requires `ffmpeg` on PATH) or a PNG sequence.
    Render(RenderArgs),
    /// Run headless and print per-frame entity counts.
    Stats(StatsArgs),
}

#[derive(Args, Debug)]
struct SceneArgs {
    /// Options JSON; missing fields keep their defaults.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Replace the configured text, one flag per line.
    #[arg(long = "line")]
    lines: Vec<String>,

    #[arg(long, default_value_t = 800)]
    width: u32,

    #[arg(long, default_value_t = 600)]
    height: u32,

    /// Seed for the random source; omit for a different run every time.
    #[arg(long)]
    seed: Option<u64>,
}

impl SceneArgs {
    fn opts(&self) -> anyhow::Result<GreetingOpts> {
        let mut opts = match &self.config {
            Some(path) => GreetingOpts::from_path(path)?,
            None => GreetingOpts::default(),
        };
        if !self.lines.is_empty() {
            opts.strings = self.lines.clone();
        }
        Ok(opts)
    }

    fn viewport(&self) -> Viewport {
        Viewport::new(f64::from(self.width), f64::from(self.height))
    }

    fn scene(&self) -> anyhow::Result<Scene> {
        let rng = match self.seed {
            Some(seed) => Rng64::new(seed),
            None => Rng64::from_entropy(),
        };
        Ok(Scene::new(self.opts()?, rng)?)
    }
}

#[derive(Parser, Debug)]
struct FrameArgs {
    #[command(flatten)]
    scene: SceneArgs,

    /// TTF/OTF font used for the letters.
    #[arg(long)]
    font: PathBuf,

    /// Frame index (0-based).
    #[arg(long)]
    frame: u64,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Parser, Debug)]
struct RenderArgs {
    #[command(flatten)]
    scene: SceneArgs,

    /// TTF/OTF font used for the letters.
    #[arg(long)]
    font: PathBuf,

    /// Output MP4 path, or a directory with `--png`.
    #[arg(long)]
    out: PathBuf,

    /// Write numbered PNG files instead of an MP4.
    #[arg(long, default_value_t = false)]
    png: bool,

    /// Fail instead of replacing an existing MP4.
    #[arg(long, default_value_t = false)]
    no_overwrite: bool,

    #[arg(long, default_value_t = 60)]
    fps: u32,

    /// Render exactly this many frames.
    #[arg(long, conflicts_with = "until_complete")]
    frames: Option<u64>,

    /// Stop once the last balloon has faded (the default).
    #[arg(long, default_value_t = false)]
    until_complete: bool,

    /// Safety cap for `--until-complete`.
    #[arg(long, default_value_t = 36_000)]
    max_frames: u64,
}

#[derive(Parser, Debug)]
struct StatsArgs {
    #[command(flatten)]
    scene: SceneArgs,

    /// Run exactly this many frames instead of until completion.
    #[arg(long)]
    frames: Option<u64>,

    /// Safety cap when running until completion.
    #[arg(long, default_value_t = 100_000)]
    max_frames: u64,

    /// Resize the viewport before a frame, as `FRAME:WIDTHxHEIGHT`. Repeatable.
    #[arg(long = "resize-at", value_parser = parse_resize)]
    resize_at: Vec<(FrameIndex, Viewport)>,

    /// Print a summary line every N frames.
    #[arg(long, default_value_t = 60)]
    every: u64,
}

fn parse_resize(s: &str) -> Result<(FrameIndex, Viewport), String> {
    let (frame, size) = s
        .split_once(':')
        .ok_or_else(|| format!("expected FRAME:WIDTHxHEIGHT, got '{s}'"))?;
    let (w, h) = size
        .split_once('x')
        .ok_or_else(|| format!("expected WIDTHxHEIGHT, got '{size}'"))?;
    let frame: u64 = frame.parse().map_err(|e| format!("bad frame '{frame}': {e}"))?;
    let w: u32 = w.parse().map_err(|e| format!("bad width '{w}': {e}"))?;
    let h: u32 = h.parse().map_err(|e| format!("bad height '{h}': {e}"))?;
    Ok((
        FrameIndex(frame),
        Viewport::new(f64::from(w), f64::from(h)),
    ))
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    match cli.cmd {
        Command::Frame(args) => cmd_frame(args),
        Command::Render(args) => cmd_render(args),
        Command::Stats(args) => cmd_stats(args),
    }
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        2 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(level)
        .with_target(false)
        .init();
}

fn cpu_surface(
    scene: &SceneArgs,
    font: &Path,
    opts: &GreetingOpts,
) -> anyhow::Result<CpuSurface> {
    let font = FontBytes::from_path(font)?;
    Ok(CpuSurface::new(
        scene.viewport(),
        CpuSurfaceOpts {
            font: Some(font),
            background: opts.background,
        },
    )?)
}

fn cmd_frame(args: FrameArgs) -> anyhow::Result<()> {
    let scene = args.scene.scene()?;
    let surface = cpu_surface(&args.scene, &args.font, scene.opts())?;
    let mut driver = Driver::new(
        scene,
        surface,
        Box::new(FixedViewport(args.scene.viewport())),
        DriverOpts::default(),
    )?;

    let mut last = None;
    for _ in 0..=args.frame {
        let (_, frame) = driver.step_frame()?;
        last = frame;
    }
    let frame = last.context("surface produced no frame")?;

    fanfare::write_png(&args.out, &frame)?;
    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let scene = args.scene.scene()?;
    let background = scene.opts().background.to_rgba8();
    let surface = cpu_surface(&args.scene, &args.font, scene.opts())?;

    let limit = match args.frames {
        Some(n) if !args.until_complete => RunLimit::Frames(n),
        _ => RunLimit::UntilComplete {
            max_frames: args.max_frames,
        },
    };
    let opts = DriverOpts {
        fps: Fps::new(args.fps, 1)?,
        limit,
        pace: false,
    };
    let mut driver = Driver::new(
        scene,
        surface,
        Box::new(FixedViewport(args.scene.viewport())),
        opts,
    )?;

    let stats = if args.png {
        let mut sink = PngSequenceSink::new(&args.out);
        driver.run(&mut sink)?
    } else {
        let mut sink = FfmpegSink::new(FfmpegSinkOpts {
            out_path: args.out.clone(),
            overwrite: !args.no_overwrite,
            background,
        });
        driver.run(&mut sink)?
    };

    if stats.frames_failed > 0 {
        eprintln!("{} frame(s) failed and were skipped", stats.frames_failed);
    }
    eprintln!("wrote {} ({} frames)", args.out.display(), stats.frames_emitted);
    Ok(())
}

fn cmd_stats(args: StatsArgs) -> anyhow::Result<()> {
    let scene = args.scene.scene()?;
    let viewports: Box<dyn ViewportSource> = if args.resize_at.is_empty() {
        Box::new(FixedViewport(args.scene.viewport()))
    } else {
        Box::new(ScriptedViewport::new(
            args.scene.viewport(),
            args.resize_at.clone(),
        ))
    };
    let limit = match args.frames {
        Some(n) => RunLimit::Frames(n),
        None => RunLimit::UntilComplete {
            max_frames: args.max_frames,
        },
    };
    let mut driver = Driver::new(
        scene,
        RecordingSurface::new(args.scene.viewport()),
        viewports,
        DriverOpts {
            limit,
            ..DriverOpts::default()
        },
    )?;
    println!("letters {}", driver.scene().letters().len());

    let every = args.every.max(1);
    let stats = driver.run_with(&mut NullSink::new(), |s: &FrameStats| {
        if s.frame % every == 0 {
            println!(
                "frame {}: pre_spawn={} traveling={} holding={} done={} balloons={}",
                s.frame, s.pre_spawn, s.traveling, s.holding, s.done, s.balloons_live
            );
        }
    })?;

    println!(
        "frames {} balloons {} draw_failures {}",
        stats.frames, stats.balloons_spawned, stats.draw_failures
    );
    match stats.completed_at {
        Some(frame) => println!("complete at frame {}", frame.0),
        None => println!("not complete after {} frames", stats.frames),
    }
    Ok(())
}
