use std::path::{Path, PathBuf};
use std::process;

use clap::Parser;

use colortrack_core::annotation::infrastructure::marker_annotator::MarkerAnnotator;
use colortrack_core::detection::domain::detection_config::{DetectionConfig, Thresholds};
use colortrack_core::detection::infrastructure::config_file;
use colortrack_core::detection::infrastructure::connected_component_extractor::{
    ConnectedComponentExtractor, Connectivity,
};
use colortrack_core::pipeline::frame_pipeline::FramePipeline;
use colortrack_core::pipeline::pipeline_logger::StatsPipelineLogger;
use colortrack_core::pipeline::track_colors_use_case::TrackColorsUseCase;
use colortrack_core::pipeline::track_image_use_case::TrackImageUseCase;
use colortrack_core::reporting::domain::detection_writer::DetectionWriter;
use colortrack_core::reporting::infrastructure::json_lines_writer::JsonLinesWriter;
use colortrack_core::shared::constants::IMAGE_EXTENSIONS;
use colortrack_core::video::domain::video_reader::VideoReader;
use colortrack_core::video::infrastructure::ffmpeg_reader::FfmpegReader;
use colortrack_core::video::infrastructure::ffmpeg_writer::FfmpegWriter;
use colortrack_core::video::infrastructure::image_file_reader::ImageFileReader;
use colortrack_core::video::infrastructure::image_file_writer::ImageFileWriter;

/// Track colored objects in videos, camera feeds and images.
#[derive(Parser)]
#[command(name = "colortrack")]
struct Cli {
    /// Input video, image, or capture device (with --device-format).
    #[arg(required_unless_present = "print_config")]
    input: Option<PathBuf>,

    /// Annotated output file. Omit to only analyse.
    output: Option<PathBuf>,

    /// JSON detection config (defaults to the per-user config, then built-ins).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Regions must be larger than this many pixels.
    #[arg(long)]
    min_area: Option<u64>,

    /// Regions must be smaller than this many pixels (default: frame area / 1.5).
    #[arg(long)]
    max_area: Option<u64>,

    /// A mask with this many regions or more is reported as too noisy.
    #[arg(long)]
    max_region_count: Option<usize>,

    /// Pixel adjacency for grouping regions: four or eight.
    #[arg(long, default_value = "eight")]
    connectivity: String,

    /// Write per-frame detections as JSON lines to this file.
    #[arg(long)]
    detections: Option<PathBuf>,

    /// Stop after this many processed frames.
    #[arg(long)]
    max_frames: Option<usize>,

    /// Open INPUT as a capture device through this ffmpeg input format (e.g. v4l2).
    #[arg(long)]
    device_format: Option<String>,

    /// Print the effective detection config as JSON and exit.
    #[arg(long)]
    print_config: bool,
}

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    validate(&cli)?;

    let config = build_config(&cli)?;
    if cli.print_config {
        println!("{}", config_file::to_json(&config));
        return Ok(());
    }

    let input = cli.input.as_deref().ok_or("Input is required")?;
    let pipeline = FramePipeline::new(
        config,
        Box::new(ConnectedComponentExtractor::new(parse_connectivity(
            &cli.connectivity,
        )?)),
        Box::new(MarkerAnnotator::default()),
    );
    let detection_writer: Option<Box<dyn DetectionWriter>> = match cli.detections.as_deref() {
        Some(path) => Some(Box::new(JsonLinesWriter::create(path)?)),
        None => None,
    };

    if cli.device_format.is_none() && is_image(input) {
        run_image(input, cli.output.as_deref(), pipeline, detection_writer)
    } else {
        run_stream(
            input,
            cli.output.as_deref(),
            cli.device_format.as_deref(),
            cli.max_frames,
            pipeline,
            detection_writer,
        )
    }
}

fn run_image(
    input: &Path,
    output: Option<&Path>,
    pipeline: FramePipeline,
    detection_writer: Option<Box<dyn DetectionWriter>>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut use_case = TrackImageUseCase::new(Box::new(ImageFileReader::new()), pipeline);
    if let Some(path) = output {
        use_case = use_case.with_image_writer(Box::new(ImageFileWriter::new()), path);
    }
    if let Some(writer) = detection_writer {
        use_case = use_case.with_detection_writer(writer);
    }

    use_case.execute(input)?;
    if let Some(path) = output {
        log::info!("Output written to {}", path.display());
    }
    Ok(())
}

fn run_stream(
    input: &Path,
    output: Option<&Path>,
    device_format: Option<&str>,
    max_frames: Option<usize>,
    pipeline: FramePipeline,
    detection_writer: Option<Box<dyn DetectionWriter>>,
) -> Result<(), Box<dyn std::error::Error>> {
    let reader: Box<dyn VideoReader> = match device_format {
        Some(format) => Box::new(FfmpegReader::with_device_format(format)),
        None => Box::new(FfmpegReader::new()),
    };

    let progress: Box<dyn Fn(usize, usize) -> bool + Send> = Box::new(|current, total| {
        if total > 0 {
            eprint!("\rProcessing frame {current}/{total}");
        } else {
            eprint!("\rProcessing frame {current}");
        }
        true
    });

    let mut use_case = TrackColorsUseCase::new(reader, pipeline)
        .with_logger(Box::new(StatsPipelineLogger::default()))
        .with_max_frames(max_frames)
        .with_progress(progress);
    if let Some(path) = output {
        use_case = use_case.with_video_writer(Box::new(FfmpegWriter::new()), path);
    }
    if let Some(writer) = detection_writer {
        use_case = use_case.with_detection_writer(writer);
    }

    let summary = use_case.execute(input);
    eprintln!();
    let summary = summary?;

    if let Some(path) = output {
        log::info!("Output written to {}", path.display());
    }
    if summary.frames_processed == 0 {
        log::warn!("No frames were processed");
    }
    Ok(())
}

/// Resolves the config file and applies command-line threshold overrides.
///
/// The result is validated once, before any frame is read.
fn build_config(cli: &Cli) -> Result<DetectionConfig, Box<dyn std::error::Error>> {
    let base = config_file::resolve(cli.config.as_deref())?;
    if cli.min_area.is_none() && cli.max_area.is_none() && cli.max_region_count.is_none() {
        return Ok(base);
    }

    let current = *base.thresholds();
    let thresholds = Thresholds {
        min_area: cli.min_area.unwrap_or(current.min_area),
        max_area: cli.max_area.or(current.max_area),
        max_region_count: cli.max_region_count.unwrap_or(current.max_region_count),
    };
    Ok(DetectionConfig::new(base.classes().to_vec(), thresholds)?)
}

fn validate(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    parse_connectivity(&cli.connectivity)?;
    if cli.print_config {
        return Ok(());
    }
    let Some(input) = cli.input.as_deref() else {
        return Err("Input is required".into());
    };
    if cli.device_format.is_none() && !input.exists() {
        return Err(format!("Input file not found: {}", input.display()).into());
    }
    if cli.max_frames == Some(0) {
        return Err("--max-frames must be at least 1".into());
    }
    if let Some(output) = cli.output.as_deref() {
        let image_input = cli.device_format.is_none() && is_image(input);
        if image_input && !is_image(output) {
            return Err(format!(
                "Image input needs an image output (one of {}), got {}",
                IMAGE_EXTENSIONS.join(", "),
                output.display()
            )
            .into());
        }
        if !image_input && is_image(output) {
            return Err(format!(
                "Video input needs a video output, got {}",
                output.display()
            )
            .into());
        }
    }
    Ok(())
}

fn parse_connectivity(value: &str) -> Result<Connectivity, Box<dyn std::error::Error>> {
    match value {
        "four" | "4" => Ok(Connectivity::Four),
        "eight" | "8" => Ok(Connectivity::Eight),
        other => Err(format!("Connectivity must be 'four' or 'eight', got '{other}'").into()),
    }
}

fn is_image(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| IMAGE_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}
