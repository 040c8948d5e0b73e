//! CLI application for goat body measurement and weight estimation.
//!
//! Usage:
//!   goat-gauge mask.png --calibration 155.42            # Human-readable output
//!   goat-gauge mask.png --calibration 155.42 --json     # JSON output
//!   goat-gauge a.png b.png --calibration 155.42 -o out.json --json

use clap::Parser;
use goat_gauge::{
    default_weight_model, ConvertOptions, Direction, FixedAngle, FixedDistance,
    LinearWeightModel, MaskFileDetector, MeasurementLog, MeasurementSession, Snapshot,
    DEFAULT_ANGLE_DEG, DEFAULT_DISTANCE_M,
};
use serde::Serialize;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "goat-gauge")]
#[command(author, version, about = "Goat body measurement and weight estimation", long_about = None)]
struct Args {
    /// Mask image files (white foreground on black background)
    #[arg(required = true)]
    masks: Vec<PathBuf>,

    /// Which way the animals face
    #[arg(short, long, default_value = "left")]
    direction: Direction,

    /// Camera distance in meters
    #[arg(long, default_value_t = DEFAULT_DISTANCE_M)]
    distance: f64,

    /// Camera tilt in degrees
    #[arg(long, default_value_t = DEFAULT_ANGLE_DEG)]
    angle: f64,

    /// Calibration constant for this camera setup, in pixels per centimeter
    #[arg(long)]
    calibration: f64,

    /// Distance of the calibration shot in centimeters
    #[arg(long, default_value_t = 20.0)]
    calibration_distance: f64,

    /// Original photo height in pixels
    #[arg(long, default_value_t = 640)]
    orig_height: usize,

    /// Original photo width in pixels
    #[arg(long, default_value_t = 640)]
    orig_width: usize,

    /// Weight model coefficient file (JSON); built-in coefficients when absent
    #[arg(short, long)]
    model: Option<PathBuf>,

    /// Write the measurement log to this file
    #[arg(long)]
    log: Option<PathBuf>,

    /// Output as JSON
    #[arg(short, long)]
    json: bool,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Show verbose output
    #[arg(short, long)]
    verbose: bool,
}

/// Output structure for JSON serialization
#[derive(Serialize)]
struct Output {
    measured: usize,
    skipped: Vec<String>,
    records: Vec<RecordOutput>,
}

#[derive(Serialize)]
struct RecordOutput {
    tag: String,
    body_length_cm: f64,
    shoulder_height_cm: f64,
    rump_height_cm: f64,
    body_height_cm: f64,
    weight_kg: f64,
    distance_m: f64,
    angle_deg: f64,
    /// The rump front edge fell back to the zone's leading column
    hill_fallback: bool,
}

fn main() {
    let args = Args::parse();

    if args.verbose {
        tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("goat_gauge=debug")),
            )
            .with_writer(std::io::stderr)
            .init();
    }

    if let Err(e) = run(&args) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(args: &Args) -> Result<(), Box<dyn std::error::Error>> {
    let model = match &args.model {
        Some(path) => {
            if args.verbose {
                eprintln!("Loading weight model from {:?}...", path);
            }
            LinearWeightModel::load(path)?
        }
        None => default_weight_model(),
    };

    let detector = MaskFileDetector::new();
    let distance = FixedDistance(args.distance);
    let angle = FixedAngle(args.angle);

    let mut log = MeasurementLog::new();
    let mut skipped = Vec::new();

    for path in &args.masks {
        if args.verbose {
            eprintln!("Measuring {:?}...", path);
        }
        let (mask_width, mask_height) = image::image_dimensions(path)?;

        let options = ConvertOptions::new(args.calibration, args.calibration_distance)
            .with_distance(args.distance)
            .with_angle(args.angle)
            .with_orig_shape(args.orig_height, args.orig_width)
            .with_mask_shape(mask_height as usize, mask_width as usize);

        let session = MeasurementSession::new(&detector, &distance, &angle, options, &model);
        let snapshot = Snapshot::new(path.clone());

        match session.measure(&snapshot, args.direction)? {
            Some(result) => log.push(snapshot.name(), result),
            None => {
                if args.verbose {
                    eprintln!("No animal found in {:?}", path);
                }
                skipped.push(path.display().to_string());
            }
        }
    }

    if let Some(ref path) = args.log {
        log.save(path)?;
        if args.verbose {
            eprintln!("Measurement log written to {:?}", path);
        }
    }

    let output = Output {
        measured: log.len(),
        skipped,
        records: log
            .records()
            .iter()
            .map(|r| RecordOutput {
                tag: r.tag.clone(),
                body_length_cm: r.result.body_length_cm,
                shoulder_height_cm: r.result.shoulder_height_cm,
                rump_height_cm: r.result.rump_height_cm,
                body_height_cm: r.result.body_height_cm,
                weight_kg: r.result.weight_kg,
                distance_m: r.result.distance_m,
                angle_deg: r.result.angle_deg,
                hill_fallback: r.result.hill_fallback,
            })
            .collect(),
    };

    // Generate output
    let output_str = if args.json {
        serde_json::to_string_pretty(&output)?
    } else {
        format_human_readable(&output)
    };

    // Write output
    if let Some(ref path) = args.output {
        std::fs::write(path, &output_str)?;
        if args.verbose {
            eprintln!("Output written to {:?}", path);
        }
    } else {
        println!("{}", output_str);
    }

    Ok(())
}

fn format_human_readable(output: &Output) -> String {
    let mut s = String::new();

    s.push_str(&format!("Masks measured: {}\n", output.measured));
    if !output.skipped.is_empty() {
        s.push_str(&format!("Skipped (no animal): {}\n", output.skipped.join(", ")));
    }

    if output.records.is_empty() {
        s.push_str("\nNothing measured.\n");
        return s;
    }

    for record in &output.records {
        s.push_str(&format!("\n--- {} ---\n", record.tag));
        s.push_str(&format!("Body length:      {:.1} cm\n", record.body_length_cm));
        s.push_str(&format!("Shoulder height:  {:.1} cm\n", record.shoulder_height_cm));
        s.push_str(&format!("Rump height:      {:.1} cm\n", record.rump_height_cm));
        s.push_str(&format!("Body height:      {:.1} cm\n", record.body_height_cm));
        s.push_str(&format!("Estimated weight: {:.1} kg\n", record.weight_kg));

        let mut context = format!(
            "(distance {:.2} m, tilt {:.1} deg",
            record.distance_m, record.angle_deg
        );
        if record.hill_fallback {
            context.push_str(", flat back line");
        }
        context.push_str(")\n");
        s.push_str(&context);
    }

    s
}
