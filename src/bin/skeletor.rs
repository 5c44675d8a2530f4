use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use skeletor::{
    Dimensions, Engine, Layer, LayerCompositor, Pose, Settings, StillSource, VideoFrame,
    VideoOptions,
    assets::{DecodedImage, read_image_file},
    engine::{FixedPose, PoseSequence},
    process_video,
    render::{FeatherParams, render_cutout},
};

#[derive(Parser, Debug)]
#[command(name = "skeletor", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render the four layers for one frame and print the overlap score.
    Frame(FrameArgs),
    /// Cut the subject out of a frame onto white, using the pose silhouette.
    Cutout(CutoutArgs),
    /// Cut the subject out of every frame of a video into a transparent WebM.
    Video(VideoArgs),
}

#[derive(Parser, Debug)]
struct FrameArgs {
    /// Reference mask image.
    #[arg(long)]
    mask: PathBuf,

    /// Pose JSON (`{"keypoints": [...]}` or `null`).
    #[arg(long)]
    pose: PathBuf,

    /// Video frame image. Defaults to a black frame at the configured resolution.
    #[arg(long = "frame")]
    frame_path: Option<PathBuf>,

    /// Settings JSON; missing fields take their defaults.
    #[arg(long)]
    settings: Option<PathBuf>,

    /// Directory receiving `<layer>.png` for every layer.
    #[arg(long)]
    out_dir: PathBuf,
}

#[derive(Parser, Debug)]
struct CutoutArgs {
    /// Video frame image.
    #[arg(long = "frame")]
    frame_path: PathBuf,

    /// Pose JSON in frame pixel coordinates.
    #[arg(long)]
    pose: PathBuf,

    #[arg(long)]
    settings: Option<PathBuf>,

    /// Dilation radius in pixels applied to the silhouette.
    #[arg(long, default_value_t = 10)]
    dilation: u32,

    /// Gaussian kernel width for edge feathering.
    #[arg(long, default_value_t = 21)]
    blur: u32,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Parser, Debug)]
struct VideoArgs {
    /// Input video, any format ffmpeg can decode.
    #[arg(long)]
    input: PathBuf,

    /// JSON array with one pose (or `null`) per frame, in input pixel coordinates.
    #[arg(long)]
    poses: PathBuf,

    /// Output path; the extension is replaced with `.webm`.
    #[arg(long)]
    out: PathBuf,

    #[arg(long)]
    settings: Option<PathBuf>,

    /// Downscale frames to this width before processing.
    #[arg(long)]
    processing_width: Option<u32>,

    #[arg(long, default_value_t = 10)]
    dilation: u32,

    #[arg(long, default_value_t = 21)]
    blur: u32,

    /// Worker threads; defaults to every core.
    #[arg(long)]
    threads: Option<usize>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Frame(args) => cmd_frame(args),
        Command::Cutout(args) => cmd_cutout(args),
        Command::Video(args) => cmd_video(args),
    }
}

fn load_settings(path: Option<&Path>) -> anyhow::Result<Settings> {
    let Some(path) = path else {
        return Ok(Settings::default());
    };
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("read settings '{}'", path.display()))?;
    Ok(Settings::from_json(&text)?)
}

fn load_pose(path: &Path) -> anyhow::Result<Option<Pose>> {
    let text =
        std::fs::read_to_string(path).with_context(|| format!("read pose '{}'", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parse pose '{}'", path.display()))
}

fn black_frame(dims: Dimensions) -> DecodedImage {
    DecodedImage {
        width: dims.width,
        height: dims.height,
        rgba8: std::sync::Arc::new([0, 0, 0, 255].repeat(dims.pixel_count())),
    }
}

fn write_png(path: &Path, rgba: &[u8], dims: Dimensions) -> anyhow::Result<()> {
    image::save_buffer_with_format(
        path,
        rgba,
        dims.width,
        dims.height,
        image::ColorType::Rgba8,
        image::ImageFormat::Png,
    )
    .with_context(|| format!("write png '{}'", path.display()))
}

fn cmd_frame(args: FrameArgs) -> anyhow::Result<()> {
    let settings = load_settings(args.settings.as_deref())?;
    let pose = load_pose(&args.pose)?;
    let image = match &args.frame_path {
        Some(p) => read_image_file(p)?,
        None => black_frame(settings.resolution.dimensions()),
    };

    let mut engine = Engine::new(StillSource::new(image), FixedPose(pose), settings.clone())?;
    if let Err(e) = engine.initialize(&args.mask, settings) {
        match e {
            skeletor::SkeletorError::AssetLoad(_) => eprintln!("warning: {e}"),
            other => return Err(other.into()),
        }
    }
    engine.start()?;
    let outcome = engine.tick();
    engine.stop();
    tracing::info!(?outcome, "frame rendered");

    let surfaces = engine
        .surfaces()
        .context("source produced no frame to render")?;
    std::fs::create_dir_all(&args.out_dir)
        .with_context(|| format!("create output dir '{}'", args.out_dir.display()))?;
    for layer in Layer::ALL {
        let surface = surfaces.layer(layer);
        let path = args.out_dir.join(format!("{}.png", layer.name()));
        write_png(&path, &surface.to_straight_rgba(), surface.dimensions())?;
        eprintln!("wrote {}", path.display());
    }

    let report = serde_json::json!({ "score": engine.latest_score() });
    println!("{report}");
    Ok(())
}

fn cmd_cutout(args: CutoutArgs) -> anyhow::Result<()> {
    let settings = load_settings(args.settings.as_deref())?;
    let pose = load_pose(&args.pose)?;
    let image = read_image_file(&args.frame_path)?;
    let dims = image.dimensions();
    let frame = VideoFrame {
        width: image.width,
        height: image.height,
        rgba8: image.rgba8,
    };

    let out = render_cutout(
        &mut LayerCompositor::new(),
        &frame,
        pose.as_ref(),
        dims,
        &settings,
        FeatherParams {
            dilation_iterations: args.dilation,
            blur_kernel_size: args.blur,
        },
    )?;

    if let Some(parent) = args.out.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    write_png(&args.out, &out, dims)?;
    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_video(args: VideoArgs) -> anyhow::Result<()> {
    let settings = load_settings(args.settings.as_deref())?;
    let text = std::fs::read_to_string(&args.poses)
        .with_context(|| format!("read poses '{}'", args.poses.display()))?;
    let mut poses = PoseSequence::from_json(&text)?;

    let opts = VideoOptions {
        settings,
        feather: FeatherParams {
            dilation_iterations: args.dilation,
            blur_kernel_size: args.blur,
        },
        processing_width: args.processing_width,
        threads: args.threads,
        ..VideoOptions::default()
    };
    let report = process_video(&args.input, &args.out, &mut poses, &opts)?;
    eprintln!("wrote {}", report.out_path.display());
    println!("{}", serde_json::to_string(&report)?);
    Ok(())
}
