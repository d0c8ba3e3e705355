//! Standalone vital file inspector
//!
//! Decodes a vital file and prints per-track statistics: record counts,
//! sample counts and the value range of numeric tracks after calibration.
//!
//! Usage:
//!   inspect_vital <file.vital> [--simple]
//!
//! Set RUST_LOG=debug to see header values and command handling.

use std::env;
use std::path::PathBuf;
use vital_decoder::{Decoder, DecoderConfig, ReaderKind, RecordValue, Track};

struct TrackStats {
    records: usize,
    samples: usize,
    min: f64,
    max: f64,
}

impl TrackStats {
    fn collect(track: &Track) -> Self {
        let mut stats = Self {
            records: track.records.len(),
            samples: track.sample_count(),
            min: f64::INFINITY,
            max: f64::NEG_INFINITY,
        };
        for record in &track.records {
            if let RecordValue::Scalar(value) = &record.value {
                let v = track.physical(value);
                stats.min = stats.min.min(v);
                stats.max = stats.max.max(v);
            }
        }
        stats
    }
}

fn main() {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        println!("Usage: {} <file.vital> [--simple]", args[0]);
        return;
    }

    let path = PathBuf::from(&args[1]);
    let reader = if args.iter().any(|a| a == "--simple") {
        ReaderKind::Simple
    } else {
        ReaderKind::Buffered
    };

    let decoder = Decoder::with_config(DecoderConfig::new().with_reader(reader));
    let (model, stats) = match decoder.decode_file_with_stats(&path) {
        Ok(result) => result,
        Err(e) => {
            eprintln!("Error decoding {:?}: {}", path, e);
            std::process::exit(1);
        }
    };

    println!("File: {:?}", path);
    match (model.local_time(model.time_start()), model.local_time(model.time_end())) {
        (Some(start), Some(end)) => println!("Recorded {} to {}", start, end),
        _ => println!("Recorded {} to {}", model.time_start(), model.time_end()),
    }
    println!("Duration: {:.1} s", model.duration());
    println!(
        "Packets: {} ({} dropped, {} skipped){}",
        stats.packets,
        stats.dropped,
        stats.skipped_unknown,
        if stats.truncated { ", truncated" } else { "" }
    );

    println!("\n{:<32} {:<8} {:>10} {:>12}  range", "track", "type", "records", "samples");
    for track in model.tracks() {
        let s = TrackStats::collect(track);
        let range = if s.min <= s.max {
            format!("{:.2}..{:.2} {}", s.min, s.max, track.unit)
        } else {
            String::new()
        };
        println!(
            "{:<32} {:<8} {:>10} {:>12}  {}",
            track.full_name,
            track.kind_name(),
            s.records,
            s.samples,
            range
        );
    }
}
