// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Scanwerk — find the page in a photograph and flatten it.
//
// Entry point. Initialises logging, loads the detector configuration and
// dispatches to the `detect`, `rectify` and `config` subcommands.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::{error, info};

use scanwerk_core::human_errors::{HumanError, humanize_detection, humanize_error};
use scanwerk_core::{DetectionResult, DetectorConfig, Point2, ScanwerkError};
use scanwerk_document::{DetectionReport, DocumentDetector, ImageProcessor, rectify};

#[derive(Parser)]
#[command(name = "scanwerk")]
#[command(version, about = "Scanwerk - document boundary detection and perspective rectification", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Detect the page boundary and print the result as JSON
    Detect {
        /// Input image path
        image: PathBuf,

        /// Detector configuration file (JSON); defaults are used when absent
        #[arg(long)]
        config: Option<PathBuf>,

        /// Downscale so the longer side is at most this many pixels first
        #[arg(long)]
        max_dim: Option<u32>,

        /// Pretty-print the JSON output
        #[arg(long)]
        pretty: bool,

        /// Include per-pass and per-candidate diagnostics in the output
        #[arg(long)]
        report: bool,
    },

    /// Warp the page onto an upright rectangle and save it
    Rectify {
        /// Input image path
        image: PathBuf,

        /// Output image path; the format follows the extension
        output: PathBuf,

        /// Corners as x,y,x,y,x,y,x,y in pixels (top-left, top-right,
        /// bottom-right, bottom-left); detected when omitted
        #[arg(long, value_parser = parse_corners)]
        corners: Option<Corners>,

        /// Detector configuration file (JSON); defaults are used when absent
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Print the default detector configuration as JSON
    Config,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Corners([Point2; 4]);

/// Parse `x,y,x,y,x,y,x,y` into four points.
fn parse_corners(s: &str) -> Result<Corners, String> {
    let values = s
        .split(',')
        .map(|v| v.trim().parse::<f64>().map_err(|err| format!("invalid number '{v}': {err}")))
        .collect::<Result<Vec<f64>, String>>()?;
    if values.len() != 8 {
        return Err(format!("expected 8 comma-separated numbers, got {}", values.len()));
    }
    if values.iter().any(|v| !v.is_finite()) {
        return Err("corner coordinates must be finite".into());
    }
    let mut points = [Point2::default(); 4];
    for (slot, pair) in points.iter_mut().zip(values.chunks_exact(2)) {
        *slot = Point2::new(pair[0], pair[1]);
    }
    Ok(Corners(points))
}

#[derive(Serialize)]
struct DetectOutput<'a> {
    result: &'a DetectionResult,
    report: &'a DetectionReport,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let outcome = match cli.command {
        Command::Detect {
            image,
            config,
            max_dim,
            pretty,
            report,
        } => run_detect(&image, config.as_deref(), max_dim, pretty, report),
        Command::Rectify {
            image,
            output,
            corners,
            config,
        } => run_rectify(&image, &output, corners, config.as_deref()),
        Command::Config => print_json(&DetectorConfig::default(), true).map(|()| true),
    };

    match outcome {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(err) => {
            error!(error = %err, "scanwerk failed");
            explain(&humanize_error(&err));
            ExitCode::FAILURE
        }
    }
}

fn load_config(path: Option<&Path>) -> Result<DetectorConfig, ScanwerkError> {
    match path {
        Some(path) => {
            let config = DetectorConfig::load(path)?;
            info!(path = %path.display(), "Loaded detector configuration");
            Ok(config)
        }
        None => Ok(DetectorConfig::default()),
    }
}

/// Returns `Ok(false)` when no document was found.
fn run_detect(
    image: &Path,
    config: Option<&Path>,
    max_dim: Option<u32>,
    pretty: bool,
    report: bool,
) -> Result<bool, ScanwerkError> {
    let mut config = load_config(config)?;
    config.collect_diagnostics |= report;
    let detector = DocumentDetector::new(config);

    let mut frame = ImageProcessor::open(image)?;
    if let Some(max_dim) = max_dim {
        frame = frame.fit_within(max_dim);
    }

    let (result, diagnostics) = detector.detect_with_report(frame.as_dynamic());
    if report {
        print_json(
            &DetectOutput {
                result: &result,
                report: &diagnostics,
            },
            pretty,
        )?;
    } else {
        print_json(&result, pretty)?;
    }

    if let Some(human) = humanize_detection(&result) {
        explain(&human);
        return Ok(false);
    }
    Ok(true)
}

/// Returns `Ok(false)` when corners were not given and detection failed.
fn run_rectify(
    image: &Path,
    output: &Path,
    corners: Option<Corners>,
    config: Option<&Path>,
) -> Result<bool, ScanwerkError> {
    let source = ImageProcessor::open(image)?;

    let corners = match corners {
        Some(Corners(points)) => points,
        None => {
            let detector = DocumentDetector::new(load_config(config)?);
            let result = detector.detect(source.as_dynamic());
            match result.ordered_pixel_corners() {
                Some(points) => points,
                None => {
                    if let Some(human) = humanize_detection(&result) {
                        explain(&human);
                    }
                    return Ok(false);
                }
            }
        }
    };

    let page = rectify(source.as_dynamic(), &corners)?;
    ImageProcessor::from_dynamic(page).save(output)?;
    info!(output = %output.display(), "Rectified page written");
    Ok(true)
}

fn print_json<T: Serialize>(value: &T, pretty: bool) -> Result<(), ScanwerkError> {
    let text = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{text}");
    Ok(())
}

fn explain(human: &HumanError) {
    eprintln!("{}", human.message);
    eprintln!("{}", human.suggestion);
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn corners_parse_in_order() {
        let Corners(pts) = parse_corners("1,2, 3,4,5,6 ,7,8").unwrap();
        assert_eq!(pts[0], Point2::new(1.0, 2.0));
        assert_eq!(pts[3], Point2::new(7.0, 8.0));
    }

    #[test]
    fn corners_need_eight_finite_numbers() {
        assert!(parse_corners("1,2,3,4,5,6").is_err());
        assert!(parse_corners("1,2,3,4,5,6,7,x").is_err());
        assert!(parse_corners("1,2,3,4,5,6,7,NaN").is_err());
    }

    #[test]
    fn rectify_arguments_parse() {
        let cli = Cli::try_parse_from([
            "scanwerk",
            "rectify",
            "in.jpg",
            "out.png",
            "--corners",
            "0,0,10,0,10,20,0,20",
        ])
        .unwrap();
        match cli.command {
            Command::Rectify { corners, output, .. } => {
                assert_eq!(output, PathBuf::from("out.png"));
                assert_eq!(corners.unwrap().0[2], Point2::new(10.0, 20.0));
            }
            _ => panic!("expected rectify"),
        }
    }

    #[test]
    fn rectify_refuses_corners_far_outside_the_image() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.png");
        let output = dir.path().join("out.png");
        let blank = image::DynamicImage::ImageLuma8(image::GrayImage::new(10, 10));
        ImageProcessor::from_dynamic(blank).save(&input).unwrap();

        let corners = parse_corners("0,0,1e7,0,1e7,1e7,0,1e7").unwrap();
        let err = run_rectify(&input, &output, Some(corners), None).unwrap_err();
        assert!(matches!(err, ScanwerkError::DegenerateGeometry(_)));
        assert!(!output.exists());
    }

    #[test]
    fn missing_config_file_is_an_error() {
        assert!(load_config(Some(Path::new("/nonexistent/scanwerk.json"))).is_err());
    }
}
