//! Vital File Reader CLI Application
//!
//! Command-line front end for the vital-decoder library. It adds:
//! - Parallel decoding of several input files
//! - Track filtering and record windowing
//! - Text and JSON reports
//! - A reader parity check for diagnosing decoder differences

use anyhow::{Context, Result};
use clap::Parser;
use rayon::prelude::*;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use vital_decoder::parity;
use vital_decoder::{DecodeModel, DecodeStats, Decoder, DecoderConfig, ReaderKind};

mod config;
mod output;

use config::{AppConfig, OutputFormat};
use output::{FileReport, Selection, TrackType, View};

/// Vital File Reader - Decode and inspect vital recordings
#[derive(Parser, Debug)]
#[command(name = "vital-cli")]
#[command(about = "Decode and inspect gzip-compressed vital recordings", long_about = None)]
#[command(version)]
struct Args {
    /// Vital file(s) to decode
    #[arg(value_name = "FILE", required = true)]
    files: Vec<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum)]
    format: Option<OutputFormat>,

    /// Single-line JSON output
    #[arg(long)]
    compact: bool,

    /// Print file information only
    #[arg(long, group = "view")]
    info_only: bool,

    /// Print the track list only
    #[arg(long, group = "view")]
    list_tracks: bool,

    /// Print the device list only
    #[arg(long, group = "view")]
    list_devices: bool,

    /// Print file, device and track information without records
    #[arg(long, group = "view")]
    summary: bool,

    /// Comma-separated full track names to keep
    #[arg(long, value_delimiter = ',', value_name = "NAMES")]
    tracks: Vec<String>,

    /// Keep only tracks of this type
    #[arg(long, value_enum, ignore_case = true)]
    track_type: Option<TrackType>,

    /// Maximum number of tracks to print (0 = unlimited)
    #[arg(long, default_value_t = 0, value_name = "COUNT")]
    max_tracks: usize,

    /// Maximum records printed per track (0 = all)
    #[arg(long, value_name = "COUNT")]
    max_samples: Option<usize>,

    /// Skip records before this Unix time (0 = from the start)
    #[arg(long, default_value_t = 0.0, value_name = "SECS")]
    start_time: f64,

    /// Stop at records after this Unix time (0 = to the end)
    #[arg(long, default_value_t = 0.0, value_name = "SECS")]
    end_time: f64,

    /// Frame reader implementation
    #[arg(long, value_enum)]
    reader: Option<ReaderArg>,

    /// Decode each file with both readers and compare the results
    #[arg(long)]
    check_parity: bool,

    /// Path to configuration file (config.toml)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Verbosity level (can be repeated: -v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long)]
    quiet: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
enum ReaderArg {
    Simple,
    Buffered,
}

impl From<ReaderArg> for ReaderKind {
    fn from(arg: ReaderArg) -> Self {
        match arg {
            ReaderArg::Simple => ReaderKind::Simple,
            ReaderArg::Buffered => ReaderKind::Buffered,
        }
    }
}

/// Effective settings after merging the config file and the flags
#[derive(Debug, Clone)]
struct Settings {
    decoder: DecoderConfig,
    format: OutputFormat,
    compact: bool,
    view: View,
    selection: Selection,
    with_stats: bool,
}

impl Settings {
    fn resolve(args: &Args, app: AppConfig) -> Self {
        let mut decoder = app.decoder;
        if let Some(reader) = args.reader {
            decoder = decoder.with_reader(reader.into());
        }

        let view = if args.info_only {
            View::InfoOnly
        } else if args.list_tracks {
            View::ListTracks
        } else if args.list_devices {
            View::ListDevices
        } else if args.summary {
            View::Summary
        } else {
            View::Full
        };

        let selection = Selection {
            names: args
                .tracks
                .iter()
                .map(|n| n.trim().to_string())
                .filter(|n| !n.is_empty())
                .collect(),
            track_type: args.track_type,
            max_tracks: args.max_tracks,
            max_samples: args.max_samples.unwrap_or(app.output.max_samples),
            start_time: args.start_time,
            end_time: args.end_time,
        };

        Self {
            decoder,
            format: args.format.unwrap_or(app.output.format),
            compact: args.compact || app.output.compact,
            view,
            selection,
            with_stats: args.verbose > 0,
        }
    }
}

fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Initialize logging
    init_logging(args.verbose, args.quiet);

    log::info!("Vital File Reader CLI v{}", env!("CARGO_PKG_VERSION"));
    log::debug!("Using decoder library v{}", vital_decoder::VERSION);

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    run(&args, &mut out)?;
    out.flush()?;
    Ok(())
}

fn run<W: Write>(args: &Args, out: &mut W) -> Result<()> {
    let app = match &args.config {
        Some(path) => {
            log::info!("Loading configuration from: {:?}", path);
            config::load_config(path)?
        }
        None => AppConfig::default(),
    };
    let settings = Settings::resolve(args, app);
    log::debug!("Decoder configuration: {:?}", settings.decoder);

    if args.check_parity {
        return check_parity(&args.files, &settings.decoder, out);
    }

    let decoder = Decoder::with_config(settings.decoder.clone());
    let results: Vec<Result<(DecodeModel, DecodeStats)>> = args
        .files
        .par_iter()
        .map(|path| {
            decoder
                .decode_file_with_stats(path)
                .with_context(|| format!("Failed to decode {:?}", path))
        })
        .collect();

    let mut reports = Vec::with_capacity(results.len());
    let mut failed = 0;
    for (path, result) in args.files.iter().zip(&results) {
        match result {
            Ok((model, stats)) => reports.push(FileReport::build(
                path.display().to_string(),
                model,
                settings.view,
                &settings.selection,
                settings.with_stats.then_some(*stats),
            )),
            Err(e) => {
                log::error!("{:#}", e);
                failed += 1;
            }
        }
    }

    output::write_reports(out, &reports, settings.format, settings.compact, settings.view)
        .context("Failed to write output")?;

    if failed > 0 {
        anyhow::bail!("{} of {} files failed to decode", failed, args.files.len());
    }
    Ok(())
}

/// Run both frame readers over every file and report agreement
fn check_parity<W: Write>(files: &[PathBuf], config: &DecoderConfig, out: &mut W) -> Result<()> {
    let reports: Vec<Result<parity::ParityReport>> = files
        .par_iter()
        .map(|path| {
            parity::compare_file(path, config).with_context(|| format!("Failed to read {:?}", path))
        })
        .collect();

    let mut broken = 0;
    for (path, report) in files.iter().zip(reports) {
        let report = report?;
        if report.is_equivalent() {
            let packets = report.simple.map_or(0, |s| s.packets);
            writeln!(out, "{}: readers agree ({} packets)", path.display(), packets)?;
        } else {
            broken += 1;
            writeln!(out, "{}: {} mismatches", path.display(), report.mismatches.len())?;
            for mismatch in &report.mismatches {
                writeln!(out, "  - {}", mismatch)?;
            }
        }
    }

    if broken > 0 {
        anyhow::bail!("reader parity failed for {} of {} files", broken, files.len());
    }
    Ok(())
}

/// Initialize logging based on verbosity level
fn init_logging(verbose: u8, quiet: bool) {
    use env_logger::Builder;
    use log::LevelFilter;

    let level = if quiet {
        LevelFilter::Error
    } else {
        match verbose {
            0 => LevelFilter::Info,
            1 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    };

    Builder::new()
        .filter_level(level)
        .format(|buf, record| {
            writeln!(
                buf,
                "[{} {}] {}",
                record.level(),
                record.target(),
                record.args()
            )
        })
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::path::Path;

    fn lp(text: &str) -> Vec<u8> {
        let mut bytes = (text.len() as u32).to_le_bytes().to_vec();
        bytes.extend_from_slice(text.as_bytes());
        bytes
    }

    fn frame(out: &mut Vec<u8>, packet_type: u8, payload: &[u8]) {
        out.push(packet_type);
        out.extend_from_slice(&(payload.len() as u32).to_le_bytes());
        out.extend_from_slice(payload);
    }

    fn numeric_track(tid: u16, name: &str, did: u32) -> Vec<u8> {
        let mut p = tid.to_le_bytes().to_vec();
        p.extend_from_slice(&[2, 1]);
        p.extend(lp(name));
        p.extend(lp("bpm"));
        p.resize(p.len() + 12, 0);
        p.extend_from_slice(&0.0f32.to_le_bytes());
        p.extend_from_slice(&1.0f64.to_le_bytes());
        p.extend_from_slice(&0.0f64.to_le_bytes());
        p.push(0);
        p.extend_from_slice(&did.to_le_bytes());
        p
    }

    fn record(dt: f64, tid: u16, value: f32) -> Vec<u8> {
        let mut p = 12u16.to_le_bytes().to_vec();
        p.extend_from_slice(&dt.to_le_bytes());
        p.extend_from_slice(&tid.to_le_bytes());
        p.extend_from_slice(&value.to_le_bytes());
        p
    }

    /// Device BedA with tracks HR and RR, five records each
    fn write_sample(dir: &Path) -> PathBuf {
        let mut bytes = b"VITA".to_vec();
        bytes.extend_from_slice(&3u32.to_le_bytes());
        bytes.extend_from_slice(&2u16.to_le_bytes());
        bytes.extend_from_slice(&60i16.to_le_bytes());

        let mut device = 1u32.to_le_bytes().to_vec();
        device.extend(lp("MONITOR"));
        device.extend(lp("BedA"));
        device.extend(lp("COM1"));
        frame(&mut bytes, 9, &device);
        frame(&mut bytes, 0, &numeric_track(1, "HR", 1));
        frame(&mut bytes, 0, &numeric_track(2, "RR", 1));
        for i in 0..5 {
            let t = 1000.0 + i as f64;
            frame(&mut bytes, 1, &record(t, 1, 60.0 + i as f32));
            frame(&mut bytes, 1, &record(t, 2, 12.0));
        }

        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(&bytes).unwrap();
        let path = dir.join("sample.vital");
        std::fs::write(&path, encoder.finish().unwrap()).unwrap();
        path
    }

    fn run_to_string(argv: &[&str]) -> Result<String> {
        let args = Args::try_parse_from(argv.iter().copied())?;
        let mut out = Vec::new();
        run(&args, &mut out)?;
        Ok(String::from_utf8(out)?)
    }

    #[test]
    fn test_parse_defaults() {
        let args = Args::try_parse_from(["vital-cli", "a.vital", "b.vital"]).unwrap();
        assert_eq!(args.files.len(), 2);
        assert_eq!(args.format, None);
        assert_eq!(args.max_tracks, 0);
        assert_eq!(args.start_time, 0.0);

        let settings = Settings::resolve(&args, AppConfig::default());
        assert_eq!(settings.format, OutputFormat::Text);
        assert_eq!(settings.view, View::Full);
        assert_eq!(settings.selection.max_samples, 3);
        assert_eq!(settings.decoder.reader, ReaderKind::Buffered);
    }

    #[test]
    fn test_parse_filters() {
        let args = Args::try_parse_from([
            "vital-cli",
            "--tracks",
            "BedA/HR, BedA/RR",
            "--track-type",
            "NUMERIC",
            "--reader",
            "simple",
            "--max-samples",
            "0",
            "a.vital",
        ])
        .unwrap();
        let settings = Settings::resolve(&args, AppConfig::default());
        assert_eq!(settings.selection.names, vec!["BedA/HR", "BedA/RR"]);
        assert_eq!(settings.selection.track_type, Some(TrackType::Numeric));
        assert_eq!(settings.selection.max_samples, 0);
        assert_eq!(settings.decoder.reader, ReaderKind::Simple);
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        assert!(Args::try_parse_from(["vital-cli"]).is_err());
        assert!(Args::try_parse_from(["vital-cli", "--format", "csv", "a.vital"]).is_err());
        assert!(Args::try_parse_from(["vital-cli", "--info-only", "--summary", "a.vital"]).is_err());
    }

    #[test]
    fn test_flags_override_config_file() {
        let mut app = AppConfig::default();
        app.output.format = OutputFormat::Json;
        app.output.max_samples = 10;
        app.decoder = app.decoder.with_reader(ReaderKind::Simple);

        let args = Args::try_parse_from(["vital-cli", "--format", "text", "--reader", "buffered", "a.vital"]).unwrap();
        let settings = Settings::resolve(&args, app);
        assert_eq!(settings.format, OutputFormat::Text);
        assert_eq!(settings.selection.max_samples, 10);
        assert_eq!(settings.decoder.reader, ReaderKind::Buffered);
    }

    #[test]
    fn test_text_output_in_track_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_sample(dir.path());
        let text = run_to_string(&["vital-cli", path.to_str().unwrap()]).unwrap();

        assert!(text.contains("GMT Offset: 60"));
        assert!(text.contains("- BedA: MONITOR (Port: COM1)"));
        let hr = text.find("- BedA/HR").unwrap();
        let rr = text.find("- BedA/RR").unwrap();
        assert!(hr < rr);
        assert!(text.contains("    [3] Time: 1002.000000, Value: 62"));
        assert!(!text.contains("[4]"));
    }

    #[test]
    fn test_json_output_with_window() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_sample(dir.path());
        let text = run_to_string(&[
            "vital-cli",
            "--format",
            "json",
            "--tracks",
            "BedA/HR",
            "--start-time",
            "1001",
            "--end-time",
            "1002",
            path.to_str().unwrap(),
        ])
        .unwrap();

        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["file_info"]["gmt_offset"], 60);
        let tracks = value["tracks"].as_array().unwrap();
        assert_eq!(tracks.len(), 1);
        assert_eq!(tracks[0]["name"], "BedA/HR");
        assert_eq!(tracks[0]["type_name"], "NUMERIC");
        assert_eq!(tracks[0]["records_count"], 5);
        let records = tracks[0]["records"].as_array().unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0]["timestamp"], 1001.0);
        assert_eq!(records[1]["value"], 62.0);
    }

    #[test]
    fn test_list_views() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_sample(dir.path());
        let file = path.to_str().unwrap();

        let tracks = run_to_string(&["vital-cli", "--list-tracks", file]).unwrap();
        assert!(tracks.contains("=== Available Tracks ==="));
        assert!(tracks.contains("- BedA/HR: NUMERIC (bpm), Rate: 0.0 Hz"));
        assert!(!tracks.contains("File Information"));

        let info = run_to_string(&["vital-cli", "--info-only", file]).unwrap();
        assert!(info.contains("Number of Tracks: 2"));
        assert!(!info.contains("=== Tracks ==="));

        let limited = run_to_string(&["vital-cli", "--summary", "--max-tracks", "1", file]).unwrap();
        assert!(limited.contains("BedA/HR"));
        assert!(!limited.contains("BedA/RR"));
        assert!(!limited.contains("Sample data"));
    }

    #[test]
    fn test_multiple_files_and_failures() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_sample(dir.path());
        let file = path.to_str().unwrap();

        let text = run_to_string(&["vital-cli", "--info-only", file, file]).unwrap();
        assert_eq!(text.matches("==> ").count(), 2);

        let missing = dir.path().join("missing.vital");
        assert!(run_to_string(&["vital-cli", file, missing.to_str().unwrap()]).is_err());
    }

    #[test]
    fn test_check_parity() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_sample(dir.path());
        let text = run_to_string(&["vital-cli", "--check-parity", path.to_str().unwrap()]).unwrap();
        assert!(text.contains("readers agree (13 packets)"));
    }
}
