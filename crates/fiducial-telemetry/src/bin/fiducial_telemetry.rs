//! fiducial-telemetry CLI: track a marker over a sequence of frames.

use clap::{Args, Parser, Subcommand};
use fiducial_telemetry::blobs::{split_channels, to_hsv, BlobDetector, BlobParams};
use fiducial_telemetry::pattern::ReferenceLayout;
use fiducial_telemetry::{FailureKind, Frame, Tracker, TrackerConfig};
use serde_json::json;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

type CliError = Box<dyn std::error::Error>;
type CliResult<T> = Result<T, CliError>;

#[derive(Parser)]
#[command(name = "fiducial-telemetry")]
#[command(about = "Track a 16-dot fiducial marker and report robot telemetry")]
#[command(version)]
struct Cli {
    /// Log debug messages (`RUST_LOG` takes precedence with `tracing`).
    #[arg(long, short, global = true)]
    verbose: bool,

    /// Emit structured JSON logs (requires the `tracing` feature).
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the tracker over image files in order.
    Track(TrackArgs),

    /// Write HSV planes and the color mask of one image for range tuning.
    Tune(TuneArgs),

    /// Print a marker layout as JSON.
    Layout {
        /// Ring radius in marker units (default layout when omitted).
        #[arg(long)]
        radius: Option<f64>,
    },
}

#[derive(Debug, Clone, Args)]
struct TrackArgs {
    /// Tracker configuration (JSON).
    #[arg(long)]
    config: PathBuf,

    /// Frame rate used to derive timestamps.
    #[arg(long, default_value = "30.0")]
    fps: f64,

    /// Write annotated frames into this directory.
    #[arg(long)]
    annotate_dir: Option<PathBuf>,

    /// One JSON object per frame instead of `[Tel]` lines.
    #[arg(long)]
    json: bool,

    /// Input frames.
    #[arg(required = true)]
    frames: Vec<PathBuf>,
}

#[derive(Debug, Clone, Args)]
struct TuneArgs {
    /// Tracker configuration (JSON); only the `blobs` section is used.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Output directory for the PNG planes.
    #[arg(long)]
    out_dir: PathBuf,

    /// Input image.
    image: PathBuf,
}

fn init_logging(verbose: bool, json: bool) -> CliResult<()> {
    let level = if verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };
    #[cfg(feature = "tracing")]
    {
        fiducial_telemetry::core::init_tracing(json, level);
        Ok(())
    }
    #[cfg(not(feature = "tracing"))]
    {
        if json {
            eprintln!("--log-json needs the `tracing` feature; using plain logs");
        }
        fiducial_telemetry::core::init_with_level(level)?;
        Ok(())
    }
}

fn main() -> CliResult<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.log_json)?;

    match cli.command {
        Commands::Track(args) => run_track(&args),
        Commands::Tune(args) => run_tune(&args),
        Commands::Layout { radius } => run_layout(radius),
    }
}

fn load_frame(path: &Path) -> CliResult<Frame> {
    let img = image::open(path)
        .map_err(|e| -> CliError { format!("failed to open {}: {e}", path.display()).into() })?;
    Ok(Frame::from_dynamic(img))
}

fn run_track(args: &TrackArgs) -> CliResult<()> {
    if !(args.fps.is_finite() && args.fps > 0.0) {
        return Err(format!("--fps must be positive, got {}", args.fps).into());
    }
    let mut config = TrackerConfig::load(&args.config)?;
    config.blobs.annotate = args.annotate_dir.is_some();
    if let Some(dir) = &args.annotate_dir {
        std::fs::create_dir_all(dir)?;
    }
    let mut tracker = Tracker::from_config(&config)?;
    log::info!("tracking {} frames", args.frames.len());

    let mut failures: BTreeMap<FailureKind, usize> = BTreeMap::new();
    let mut tracked = 0usize;
    let mut reported = 0usize;

    for (i, path) in args.frames.iter().enumerate() {
        let timestamp = i as f64 / args.fps;
        let frame = load_frame(path)?;
        match tracker.process(&frame, timestamp) {
            Ok(out) => {
                tracked += 1;
                if let Some(t) = &out.telemetry {
                    reported += 1;
                    if !args.json {
                        println!("{t}");
                    }
                }
                if args.json {
                    let line = json!({
                        "frame": i,
                        "timestamp": timestamp,
                        "telemetry": out.telemetry,
                        "failure": null,
                    });
                    println!("{line}");
                }
                if let (Some(dir), Some(img)) = (&args.annotate_dir, &out.annotated) {
                    let dst = dir.join(format!("frame_{i:05}.png"));
                    img.save(&dst)?;
                }
            }
            Err(e) => {
                log::debug!("frame {i} ({}) dropped: {e}", path.display());
                let kind = e.kind();
                *failures.entry(kind).or_default() += 1;
                if args.json {
                    let line = json!({
                        "frame": i,
                        "timestamp": timestamp,
                        "telemetry": null,
                        "failure": kind,
                    });
                    println!("{line}");
                }
            }
        }
    }

    let calibrator = tracker.calibrator();
    if !calibrator.is_calibrated() {
        log::warn!(
            "marker never settled: {} of {} calibration samples collected",
            calibrator.samples_collected(),
            calibrator.params().window
        );
    }

    if args.json {
        let summary = json!({
            "summary": {
                "frames": args.frames.len(),
                "tracked": tracked,
                "telemetry": reported,
                "calibrated": calibrator.is_calibrated(),
                "failures": failures,
            }
        });
        println!("{summary}");
    } else {
        log::info!(
            "tracked {tracked}/{} frames, {reported} with telemetry",
            args.frames.len()
        );
        for (kind, count) in &failures {
            log::info!("  {kind:?}: {count}");
        }
    }
    Ok(())
}

fn run_tune(args: &TuneArgs) -> CliResult<()> {
    let params = match &args.config {
        Some(path) => TrackerConfig::load(path)?.blobs,
        None => BlobParams::default(),
    };
    let frame = load_frame(&args.image)?;
    std::fs::create_dir_all(&args.out_dir)?;

    if let Frame::Rgb(rgb) = &frame {
        let planes = split_channels(&to_hsv(rgb));
        for (name, plane) in ["h", "s", "v"].iter().zip(planes.iter()) {
            plane.save(args.out_dir.join(format!("{name}.png")))?;
        }
    }

    let detector = BlobDetector::new(params);
    let mask = detector.mask(&frame)?;
    let dst = args.out_dir.join("mask.png");
    mask.save(&dst)?;
    log::info!("planes written to {}", args.out_dir.display());
    Ok(())
}

fn run_layout(radius: Option<f64>) -> CliResult<()> {
    let layout = match radius {
        Some(r) => ReferenceLayout::ring_marker(r)?,
        None => ReferenceLayout::default(),
    };
    println!("{}", serde_json::to_string_pretty(&layout)?);
    Ok(())
}
