// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// flatscan: turn a photograph of a page into a flat scan from the command line.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use flatscan_core::human_errors::{Severity, humanize_error};
use flatscan_core::{DocScanError, PaperSize, Result, ScanConfig, ThresholdConfig};
use flatscan_document::scan::annotate_corners;
use flatscan_document::{DocumentScanner, ImageProcessor, ScanEnhancer};
use image::{DynamicImage, GrayImage};
use tracing::{debug, info};

#[derive(Debug, Parser)]
#[command(name = "flatscan")]
#[command(about = "Find a paper page in a photograph and flatten it into an upright scan")]
#[command(version)]
struct Cli {
    /// Photograph of the page (JPEG, PNG, ...).
    #[arg(required_unless_present_any = ["print_config", "save_config"])]
    image: Option<PathBuf>,

    /// Where to write the rectified scan. The format follows the extension.
    #[arg(short, long, default_value = "scan.png")]
    output: PathBuf,

    /// JSON configuration file; missing fields take their defaults.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Output width in pixels (overrides the configuration).
    #[arg(long)]
    width: Option<u32>,

    /// Output height in pixels (overrides the configuration).
    #[arg(long)]
    height: Option<u32>,

    /// Also write a black-and-white thresholded copy of the scan here. This
    /// turns thresholding on and makes the PDF black-and-white too.
    #[arg(long)]
    threshold: Option<PathBuf>,

    /// Also write the scan as a single-page PDF here.
    #[arg(long)]
    pdf: Option<PathBuf>,

    /// Paper size for the PDF page (a4, a3, a5, letter, legal, tabloid).
    #[arg(long, value_parser = parse_paper_size)]
    paper: Option<PaperSize>,

    /// Write the working-resolution photo with the detected outline drawn on it.
    #[arg(long)]
    preview: Option<PathBuf>,

    /// Print the effective configuration as JSON and exit.
    #[arg(long)]
    print_config: bool,

    /// Write the effective configuration as JSON to this file and exit.
    #[arg(long)]
    save_config: Option<PathBuf>,

    /// Log debug detail (overridden by RUST_LOG).
    #[arg(short, long)]
    verbose: bool,
}

fn parse_paper_size(name: &str) -> std::result::Result<PaperSize, String> {
    PaperSize::from_name(name).ok_or_else(|| format!("unknown paper size '{name}'"))
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            debug!(error = %err, recoverable = err.is_recoverable(), "Scan failed");
            let human = humanize_error(&err);
            eprintln!("error: {}", human.message);
            eprintln!("  {}", human.suggestion);
            ExitCode::from(exit_code(human.severity))
        }
    }
}

/// Distinct exit codes let scripts tell a bad photo from a bad invocation.
fn exit_code(severity: Severity) -> u8 {
    match severity {
        Severity::Retake => 2,
        Severity::InvalidRequest => 3,
        Severity::Environment => 4,
    }
}

/// Merge the configuration file with command-line overrides.
fn effective_config(cli: &Cli) -> Result<ScanConfig> {
    let mut config = match &cli.config {
        Some(path) => ScanConfig::load(path)?,
        None => ScanConfig::default(),
    };
    if let Some(width) = cli.width {
        config.output.width = width;
    }
    if let Some(height) = cli.height {
        config.output.height = height;
    }
    if let Some(paper) = cli.paper {
        config.output.paper_size = paper;
    }
    if cli.threshold.is_some() && config.output.threshold.is_none() {
        config.output.threshold = Some(ThresholdConfig::default());
    }
    config.validate()?;
    Ok(config)
}

fn run(cli: &Cli) -> Result<()> {
    let config = effective_config(cli)?;

    if cli.print_config {
        println!("{}", serde_json::to_string_pretty(&config)?);
        return Ok(());
    }
    if let Some(path) = &cli.save_config {
        config.save(path)?;
        println!("{}", path.display());
        return Ok(());
    }
    let Some(input) = &cli.image else {
        return Err(DocScanError::InvalidInput("no input image given".into()));
    };

    let scanner = DocumentScanner::new(config)?;
    let config = scanner.config();

    let photo = ImageProcessor::open(input)?
        .resize_exact(config.working_width, config.working_height)
        .into_dynamic();

    let scan = scanner.scan(&photo)?;
    info!(corners = %scan.corners, area = scan.contour_area, "Page detected");

    ImageProcessor::from_dynamic(scan.rectified.clone()).save(&cli.output)?;
    println!("{}", cli.output.display());

    if let Some(path) = &cli.preview {
        let preview = annotate_corners(&photo, &scan.corners);
        ImageProcessor::from_dynamic(DynamicImage::ImageRgb8(preview)).save(path)?;
        println!("{}", path.display());
    }

    if let (Some(path), Some(thresholded)) = (&cli.threshold, &scan.thresholded) {
        ImageProcessor::from_dynamic(DynamicImage::ImageLuma8(thresholded.clone())).save(path)?;
        println!("{}", path.display());
    }

    if let Some(path) = &cli.pdf {
        let page = pdf_page(scan.rectified, scan.thresholded);
        ScanEnhancer::from_dynamic(page, config.output.paper_size).write_pdf(path)?;
        println!("{}", path.display());
    }

    Ok(())
}

/// The page that goes into the PDF: black-and-white when thresholding ran,
/// the rectified photo otherwise.
fn pdf_page(rectified: DynamicImage, thresholded: Option<GrayImage>) -> DynamicImage {
    match thresholded {
        Some(thresholded) => DynamicImage::ImageLuma8(thresholded),
        None => rectified,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use image::{Luma, Rgb, RgbImage};

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn overrides_apply_on_top_of_defaults() {
        let cli = Cli::parse_from([
            "flatscan", "photo.jpg", "--width", "800", "--height", "1100", "--paper", "letter",
        ]);
        let config = effective_config(&cli).expect("config");
        assert_eq!(config.output.width, 800);
        assert_eq!(config.output.height, 1100);
        assert_eq!(config.output.paper_size, PaperSize::Letter);
        assert_eq!(config.working_width, 960);
    }

    #[test]
    fn zero_width_is_rejected() {
        let cli = Cli::parse_from(["flatscan", "photo.jpg", "--width", "0"]);
        let err = effective_config(&cli).expect_err("invalid");
        assert!(matches!(err, DocScanError::Config(_)));
    }

    #[test]
    fn unknown_paper_size_fails_to_parse() {
        assert!(Cli::try_parse_from(["flatscan", "photo.jpg", "--paper", "b7"]).is_err());
    }

    #[test]
    fn image_is_optional_only_for_config_output() {
        assert!(Cli::try_parse_from(["flatscan"]).is_err());
        assert!(Cli::try_parse_from(["flatscan", "--print-config"]).is_ok());
        assert!(Cli::try_parse_from(["flatscan", "--save-config", "scan.json"]).is_ok());
    }

    #[test]
    fn thresholding_needs_the_threshold_flag() {
        let plain = Cli::parse_from(["flatscan", "photo.jpg", "--pdf", "scan.pdf"]);
        assert_eq!(effective_config(&plain).expect("config").output.threshold, None);

        let bw = Cli::parse_from(["flatscan", "photo.jpg", "--threshold", "bw.png"]);
        assert_eq!(
            effective_config(&bw).expect("config").output.threshold,
            Some(ThresholdConfig::default())
        );
    }

    #[test]
    fn pdf_page_is_colour_unless_thresholded() {
        let rectified = DynamicImage::ImageRgb8(RgbImage::from_pixel(8, 8, Rgb([200, 30, 30])));

        let colour = pdf_page(rectified.clone(), None);
        assert_eq!(colour.as_rgb8().map(|img| *img.get_pixel(4, 4)), Some(Rgb([200, 30, 30])));

        let bw = pdf_page(rectified, Some(GrayImage::from_pixel(8, 8, Luma([255u8]))));
        assert!(bw.as_luma8().is_some());
    }

    #[test]
    fn saved_config_loads_back_with_overrides() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("flatscan.json");
        let cli = Cli::parse_from([
            "flatscan".to_string(),
            "--save-config".to_string(),
            path.display().to_string(),
            "--width".to_string(),
            "700".to_string(),
        ]);
        run(&cli).expect("config written");

        let loaded = ScanConfig::load(&path).expect("load");
        assert_eq!(loaded.output.width, 700);
        assert_eq!(loaded.output.threshold, None);
    }

    #[test]
    fn scans_a_photo_end_to_end() {
        let dir = tempfile::tempdir().expect("tempdir");
        let input = dir.path().join("photo.png");
        let output = dir.path().join("scan.png");
        let pdf = dir.path().join("scan.pdf");

        // Page covering the middle of a dark 960x1280 frame.
        let photo = GrayImage::from_fn(960, 1280, |x, y| {
            let on_page = (180..780).contains(&x) && (200..1080).contains(&y);
            Luma([if on_page { 235u8 } else { 25 }])
        });
        photo.save(&input).expect("write input");

        let cli = Cli::parse_from([
            "flatscan".to_string(),
            input.display().to_string(),
            "-o".to_string(),
            output.display().to_string(),
            "--pdf".to_string(),
            pdf.display().to_string(),
        ]);
        run(&cli).expect("scan succeeds");

        let scanned = image::open(&output).expect("output readable");
        assert_eq!((scanned.width(), scanned.height()), (960, 1280));
        assert!(std::fs::read(&pdf).expect("pdf written").starts_with(b"%PDF"));
    }

    #[test]
    fn blank_photo_reports_no_document() {
        let dir = tempfile::tempdir().expect("tempdir");
        let input = dir.path().join("blank.png");
        GrayImage::from_pixel(96, 128, Luma([40u8])).save(&input).expect("write input");

        let cli = Cli::parse_from(["flatscan".to_string(), input.display().to_string()]);
        let err = run(&cli).expect_err("nothing to find");
        assert!(matches!(err, DocScanError::NoDocumentFound));
        assert_eq!(exit_code(humanize_error(&err).severity), 2);
    }
}
