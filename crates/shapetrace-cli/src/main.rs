//! Command-line interface for boundary tracing and shape description.

use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;

use shapetrace::enhance::{self, Stage};
use shapetrace::progress::{longest_chord_work, perpendicular_chord_work, trace_work_estimate};
use shapetrace::{AnalysisConfig, CountingSink, PixelCoord, ProgressSink, Region};

type CliError = Box<dyn std::error::Error>;
type CliResult<T> = Result<T, CliError>;

#[derive(Parser)]
#[command(name = "shapetrace")]
#[command(
    about = "Trace the boundary of a segmented pixel region and compute its shape descriptors"
)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute the full descriptor record for one region.
    Analyze(CliAnalyzeArgs),

    /// Run enhancement stages over a grayscale image and save the result.
    Enhance(CliEnhanceArgs),

    /// Trace a region boundary and emit the contour pixels.
    Trace(CliTraceArgs),
}

#[derive(Debug, Clone, Args)]
struct CliInputArgs {
    /// Path to a grayscale image; pixels at or above --cutoff are foreground.
    #[arg(long, conflicts_with = "pixels")]
    image: Option<PathBuf>,

    /// Path to a JSON array of [x, y] foreground pixel coordinates.
    #[arg(long)]
    pixels: Option<PathBuf>,

    /// Foreground threshold applied when reading --image.
    #[arg(long, default_value = "128")]
    cutoff: u8,

    /// Accept input that splits into several 8-connected components.
    #[arg(long)]
    allow_disconnected: bool,
}

impl CliInputArgs {
    fn to_config(&self, chord_axis_tolerance: f64) -> AnalysisConfig {
        AnalysisConfig {
            require_connected: !self.allow_disconnected,
            chord_axis_tolerance,
        }
    }
}

#[derive(Debug, Clone, Args)]
struct CliAnalyzeArgs {
    #[command(flatten)]
    input: CliInputArgs,

    /// Comma-separated enhancement stages applied before thresholding,
    /// e.g. smooth,kirsch:ne,threshold:96. Requires --image.
    #[arg(long)]
    enhance: Option<String>,

    /// Bucket width in pixels for the perpendicular-chord search.
    #[arg(long, default_value = "0.5")]
    chord_axis_tolerance: f64,

    /// Count elementary operations and log them against the planned totals.
    #[arg(long)]
    progress: bool,

    /// Path to write the descriptor record (JSON). Prints to stdout when omitted.
    #[arg(long)]
    out: Option<PathBuf>,
}

#[derive(Debug, Clone, Args)]
struct CliEnhanceArgs {
    /// Path to the input image.
    #[arg(long)]
    image: PathBuf,

    /// Comma-separated enhancement stages, e.g. smooth,highpass:110.
    #[arg(long)]
    stages: String,

    /// Path to write the enhanced image.
    #[arg(long)]
    out: PathBuf,

    /// Count elementary operations and log them against the planned total.
    #[arg(long)]
    progress: bool,
}

#[derive(Debug, Clone, Args)]
struct CliTraceArgs {
    #[command(flatten)]
    input: CliInputArgs,

    /// Path to write the traced contour (JSON). Prints to stdout when omitted.
    #[arg(long)]
    out: Option<PathBuf>,
}

/// Contour record emitted by the trace subcommand, in input-frame
/// coordinates.
#[derive(Debug, Serialize)]
struct TraceRecord {
    pixels: Vec<[i32; 2]>,
    perimeter: f64,
}

fn load_pixel_list(path: &PathBuf) -> CliResult<Vec<PixelCoord>> {
    let text = std::fs::read_to_string(path).map_err(|e| -> CliError {
        format!("failed to read pixel list {}: {}", path.display(), e).into()
    })?;
    let raw: Vec<[i32; 2]> = serde_json::from_str(&text)?;
    Ok(raw.iter().map(|&[x, y]| PixelCoord::new(x, y)).collect())
}

/// Builds the region from whichever input source was given, applying
/// `stages` to image input first. Returns the region together with the
/// planned enhancement step total (0 when no stages ran).
fn build_region(
    input: &CliInputArgs,
    stages: &[Stage],
    config: AnalysisConfig,
    sink: Option<&Arc<CountingSink>>,
) -> CliResult<(Region, u64)> {
    let progress = sink.map(|s| s.as_ref() as &dyn ProgressSink);
    let (mut region, enhance_planned) = match (&input.image, &input.pixels) {
        (Some(path), None) => {
            tracing::info!("Loading image: {}", path.display());
            let img = image::open(path).map_err(|e| -> CliError {
                format!("failed to open image {}: {}", path.display(), e).into()
            })?;
            let mut gray = img.to_luma8();
            let (w, h) = gray.dimensions();
            tracing::info!("Image size: {}x{}", w, h);

            let mut planned = 0;
            if !stages.is_empty() {
                planned = enhance::total_work(stages, w, h);
                gray = enhance::run_stages(&gray, stages, progress);
            }
            (Region::from_gray_image(&gray, input.cutoff, config)?, planned)
        }
        (None, Some(path)) => {
            if !stages.is_empty() {
                return Err("enhancement stages require --image input".into());
            }
            let pixels = load_pixel_list(path)?;
            tracing::info!("Loaded {} pixels from {}", pixels.len(), path.display());
            (Region::with_config(&pixels, config)?, 0)
        }
        _ => return Err("provide exactly one of --image or --pixels".into()),
    };
    if let Some(sink) = sink {
        region = region.with_progress(sink.clone() as Arc<dyn ProgressSink>);
    }
    Ok((region, enhance_planned))
}

fn write_json<T: Serialize>(value: &T, out: Option<&PathBuf>) -> CliResult<()> {
    let json = serde_json::to_string_pretty(value)?;
    match out {
        Some(path) => {
            std::fs::write(path, &json)?;
            tracing::info!("Results written to {}", path.display());
        }
        None => println!("{}", json),
    }
    Ok(())
}

fn main() -> CliResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Analyze(args) => run_analyze(&args),
        Commands::Enhance(args) => run_enhance(&args),
        Commands::Trace(args) => run_trace(&args),
    }
}

// ── analyze ────────────────────────────────────────────────────────────

fn run_analyze(args: &CliAnalyzeArgs) -> CliResult<()> {
    let stages = match &args.enhance {
        Some(spec) => enhance::parse_stage_list(spec)?,
        None => Vec::new(),
    };
    let config = args.input.to_config(args.chord_axis_tolerance);
    let sink = args.progress.then(|| Arc::new(CountingSink::new()));

    let (region, enhance_planned) = build_region(&args.input, &stages, config, sink.as_ref())?;
    let record = region.descriptors();

    tracing::info!(
        "Region: area {}, {} boundary pixels, perimeter {:.3}, compactness {:.3}",
        record.area,
        region.boundary().pixels.len(),
        record.perimeter,
        record.compactness,
    );
    match record.eccentricity {
        Some(ecc) => tracing::info!("Chords: eccentricity {:.3}", ecc),
        None => tracing::info!("Chords: eccentricity undefined (degenerate width)"),
    }

    if let Some(sink) = &sink {
        let n = region.boundary().pixels.len();
        let planned = enhance_planned
            + trace_work_estimate(region.mask().boundary_candidate_count())
            + longest_chord_work(n)
            + perpendicular_chord_work(n);
        tracing::info!("Elementary steps: {} observed, {} planned", sink.count(), planned);
    }

    write_json(record, args.out.as_ref())
}

// ── enhance ────────────────────────────────────────────────────────────

fn run_enhance(args: &CliEnhanceArgs) -> CliResult<()> {
    let stages = enhance::parse_stage_list(&args.stages)?;
    if stages.is_empty() {
        return Err("no enhancement stages given".into());
    }

    tracing::info!("Loading image: {}", args.image.display());
    let img = image::open(&args.image).map_err(|e| -> CliError {
        format!("failed to open image {}: {}", args.image.display(), e).into()
    })?;
    let gray = img.to_luma8();
    let (w, h) = gray.dimensions();
    tracing::info!("Image size: {}x{}, {} stages", w, h, stages.len());

    let sink = args.progress.then(|| Arc::new(CountingSink::new()));
    let progress = sink.as_ref().map(|s| s.as_ref() as &dyn ProgressSink);
    let enhanced = enhance::run_stages(&gray, &stages, progress);

    if let Some(sink) = &sink {
        let planned = enhance::total_work(&stages, w, h);
        tracing::info!("Elementary steps: {} observed, {} planned", sink.count(), planned);
    }

    enhanced.save(&args.out).map_err(|e| -> CliError {
        format!("failed to write image {}: {}", args.out.display(), e).into()
    })?;
    tracing::info!("Enhanced image written to {}", args.out.display());

    Ok(())
}

// ── trace ──────────────────────────────────────────────────────────────

fn run_trace(args: &CliTraceArgs) -> CliResult<()> {
    let config = args.input.to_config(AnalysisConfig::default().chord_axis_tolerance);
    let (region, _) = build_region(&args.input, &[], config, None)?;

    let boundary = region.boundary();
    tracing::info!(
        "Traced {} boundary pixels, perimeter {:.3}",
        boundary.pixels.len(),
        boundary.perimeter,
    );

    let record = TraceRecord {
        pixels: boundary.pixels.iter().map(|p| [p.x, p.y]).collect(),
        perimeter: boundary.perimeter,
    };
    write_json(&record, args.out.as_ref())
}
