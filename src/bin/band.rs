use clap::{Args, Parser, Subcommand};
use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};

use band_assessment::analysis::{BandReport, analyze_record};
use band_assessment::config::BandConfig;
use band_assessment::plot_profile::{PlotRange, save_profile_plot};
use band_assessment::scan_file::ScanFile;
use band_assessment::scan_record::{ScanRecord, ScanValidation};
use band_assessment::synthetic::phantom_scan;

const PLOT_WIDTH: u32 = 640;
const PLOT_HEIGHT: u32 = 480;

#[derive(Parser, Debug)]
#[command(
    name = "band",
    about = "Measure ring/band artifacts in CT phantom scans",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Analyze one decoded scan file.
    Analyze(AnalyzeArgs),

    /// Write a synthetic disk phantom scan file.
    Synth(SynthArgs),
}

#[derive(Args, Debug)]
struct AnalyzeArgs {
    /// Decoded scan (JSON)
    #[arg(short = 's', long = "scan")]
    scan: PathBuf,

    /// Directory for the report and images
    #[arg(short = 'o', long = "out-dir", default_value = ".")]
    out_dir: PathBuf,

    /// Optional JSON config overriding the defaults
    #[arg(short = 'c', long = "config")]
    config: Option<PathBuf>,

    /// Save the windowed image with the detected phantom drawn on it
    #[arg(long = "image", short = 'i')]
    image: bool,

    /// Save a plot of the smoothed profile
    #[arg(long = "plot", short = 'p')]
    plot: bool,
}

#[derive(Args, Debug)]
struct SynthArgs {
    /// Output scan file
    #[arg(short = 'o', long = "out")]
    out: PathBuf,

    #[arg(long, default_value_t = 512)]
    size: usize,

    #[arg(long, default_value_t = 200)]
    radius: usize,

    /// Raw value inside the disk
    #[arg(long, default_value_t = 1000)]
    value: i32,

    #[arg(long, default_value_t = 0.5)]
    spacing: f64,
}

fn write_text_file(path: &Path, contents: &str) -> Result<(), Box<dyn Error>> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, contents)?;
    Ok(())
}

fn run_analyze(args: &AnalyzeArgs) -> Result<(), Box<dyn Error>> {
    let config = match &args.config {
        Some(path) => BandConfig::from_json_file(path)?,
        None => BandConfig::default(),
    };

    let (grid, metadata) = ScanFile::read(&args.scan)?.into_parts()?;
    let record = match ScanRecord::validate(grid, &metadata, &config.required_study_kind) {
        ScanValidation::Valid(record) => record,
        ScanValidation::Invalid(reason) => {
            tracing::warn!(scan = %args.scan.display(), %reason, "scan skipped");
            return Ok(());
        }
    };

    let analysis = analyze_record(&record, &config)?;
    let label = analysis.scan_mode_label.clone();
    fs::create_dir_all(&args.out_dir)?;

    let report = BandReport::new(&record, &analysis);
    let out_report = args.out_dir.join(format!("{label}.report.json"));
    write_text_file(&out_report, &serde_json::to_string_pretty(&report)?)?;
    tracing::info!(path = %out_report.display(), "wrote report");

    if args.image {
        let out_image = args.out_dir.join(format!("{label}.png"));
        if let Err(e) = analysis.annotated_image().save(&out_image) {
            tracing::error!(path = %out_image.display(), "failed to save image: {e}");
        }
    }

    if args.plot {
        let out_plot = args.out_dir.join(format!("{label}_fig.png"));
        let range = PlotRange {
            x_max: config.plot_x_max,
            y_min: config.plot_y_range.0,
            y_max: config.plot_y_range.1,
        };
        if let Err(e) = save_profile_plot(
            &out_plot,
            PLOT_WIDTH,
            PLOT_HEIGHT,
            &analysis.profile.smoothed_values,
            range,
        ) {
            tracing::error!(path = %out_plot.display(), "failed to save plot: {e}");
        }
    }

    Ok(())
}

fn run_synth(args: &SynthArgs) -> Result<(), Box<dyn Error>> {
    if args.radius * 2 >= args.size {
        return Err(format!("radius {} does not fit a {} grid", args.radius, args.size).into());
    }
    phantom_scan(args.size, args.radius, args.value, args.spacing).write(&args.out)?;
    tracing::info!(path = %args.out.display(), "wrote synthetic scan");
    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match &cli.command {
        Commands::Analyze(args) => run_analyze(args),
        Commands::Synth(args) => run_synth(args),
    }
}
