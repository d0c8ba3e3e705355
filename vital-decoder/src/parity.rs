//! Differential check between the two frame readers
//!
//! Decodes the same decompressed bytes once with the read-exact reader and
//! once with the buffered reader, then compares the resulting models field by
//! field. Floats compare by bit pattern so NaN payloads and signed zeros count.

use crate::config::{DecoderConfig, ReaderKind};
use crate::decoder::{DecodeStats, Decoder};
use crate::model::DecodeModel;
use crate::types::{Record, RecordValue, Result, Samples, Scalar, Track};
use flate2::read::MultiGzDecoder;
use std::collections::BTreeSet;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

/// Outcome of a reader comparison
#[derive(Debug, Clone, Default)]
pub struct ParityReport {
    /// Counters from the read-exact reader, if it decoded successfully
    pub simple: Option<DecodeStats>,
    /// Counters from the buffered reader, if it decoded successfully
    pub buffered: Option<DecodeStats>,
    /// Human readable differences, empty when equivalent
    pub mismatches: Vec<String>,
}

impl ParityReport {
    pub fn is_equivalent(&self) -> bool {
        self.mismatches.is_empty()
    }
}

/// Compare both readers over a decompressed vital stream
pub fn compare_readers(decompressed: &[u8], config: &DecoderConfig) -> ParityReport {
    let simple = Decoder::with_config(config.clone().with_reader(ReaderKind::Simple))
        .decode_stream_with_stats(decompressed);
    let buffered = Decoder::with_config(config.clone().with_reader(ReaderKind::Buffered))
        .decode_stream_with_stats(decompressed);

    let mut report = ParityReport::default();
    match (simple, buffered) {
        (Ok((a, sa)), Ok((b, sb))) => {
            if sa != sb {
                report.mismatches.push(format!("stats differ: {:?} vs {:?}", sa, sb));
            }
            diff_models(&a, &b, &mut report.mismatches);
            report.simple = Some(sa);
            report.buffered = Some(sb);
        }
        (Err(a), Err(b)) => {
            // Same failure from both readers is agreement
            if a.to_string() != b.to_string() {
                report.mismatches.push(format!("errors differ: {} vs {}", a, b));
            }
        }
        (Ok(_), Err(e)) => report.mismatches.push(format!("only the buffered reader failed: {}", e)),
        (Err(e), Ok(_)) => report.mismatches.push(format!("only the read-exact reader failed: {}", e)),
    }

    if report.is_equivalent() {
        log::debug!("Reader parity holds over {} bytes", decompressed.len());
    } else {
        log::warn!("Reader parity broken: {} mismatches", report.mismatches.len());
    }
    report
}

/// Gunzip a file once and compare both readers over its contents
pub fn compare_file(path: &Path, config: &DecoderConfig) -> Result<ParityReport> {
    let mut bytes = Vec::new();
    MultiGzDecoder::new(BufReader::new(File::open(path)?)).read_to_end(&mut bytes)?;
    Ok(compare_readers(&bytes, config))
}

fn same_f64(a: f64, b: f64) -> bool {
    a.to_bits() == b.to_bits()
}

fn same_f32(a: f32, b: f32) -> bool {
    a.to_bits() == b.to_bits()
}

/// Compare two models, appending one line per difference
pub fn diff_models(a: &DecodeModel, b: &DecodeModel, out: &mut Vec<String>) {
    if a.gmt_offset() != b.gmt_offset() {
        out.push(format!("gmt offset {} vs {}", a.gmt_offset(), b.gmt_offset()));
    }
    if !same_f64(a.time_start(), b.time_start()) {
        out.push(format!("time_start {} vs {}", a.time_start(), b.time_start()));
    }
    if !same_f64(a.time_end(), b.time_end()) {
        out.push(format!("time_end {} vs {}", a.time_end(), b.time_end()));
    }
    if !a.devices().eq(b.devices()) {
        out.push("devices differ".to_string());
    }
    if a.order() != b.order() {
        out.push(format!("order {:?} vs {:?}", a.order(), b.order()));
    }
    if a.device_ids() != b.device_ids() {
        out.push("device id tables differ".to_string());
    }
    if a.track_ids() != b.track_ids() {
        out.push("track id tables differ".to_string());
    }

    let names: BTreeSet<&String> = a.track_map().keys().chain(b.track_map().keys()).collect();
    for name in names {
        match (a.track(name), b.track(name)) {
            (Some(ta), Some(tb)) => diff_tracks(ta, tb, out),
            _ => out.push(format!("track {} present in only one model", name)),
        }
    }
}

fn diff_tracks(a: &Track, b: &Track, out: &mut Vec<String>) {
    let same_meta = a.kind == b.kind
        && a.sample_format == b.sample_format
        && a.unit == b.unit
        && a.device_name == b.device_name
        && a.color == b.color
        && a.monitor_type == b.monitor_type
        && same_f32(a.sample_rate, b.sample_rate)
        && same_f32(a.display_min, b.display_min)
        && same_f32(a.display_max, b.display_max)
        && same_f64(a.gain, b.gain)
        && same_f64(a.offset, b.offset);
    if !same_meta {
        out.push(format!("track {} metadata differs", a.full_name));
    }

    if a.records.len() != b.records.len() {
        out.push(format!(
            "track {} has {} vs {} records",
            a.full_name,
            a.records.len(),
            b.records.len()
        ));
        return;
    }
    if let Some(i) = a.records.iter().zip(&b.records).position(|(ra, rb)| !same_record(ra, rb)) {
        out.push(format!("track {} record {} differs", a.full_name, i));
    }
}

fn same_record(a: &Record, b: &Record) -> bool {
    same_f64(a.timestamp, b.timestamp) && same_value(&a.value, &b.value)
}

fn same_value(a: &RecordValue, b: &RecordValue) -> bool {
    match (a, b) {
        (RecordValue::Scalar(x), RecordValue::Scalar(y)) => same_scalar(x, y),
        (RecordValue::Samples(Samples::F32(x)), RecordValue::Samples(Samples::F32(y))) => {
            x.len() == y.len() && x.iter().zip(y).all(|(p, q)| same_f32(*p, *q))
        }
        (RecordValue::Samples(Samples::F64(x)), RecordValue::Samples(Samples::F64(y))) => {
            x.len() == y.len() && x.iter().zip(y).all(|(p, q)| same_f64(*p, *q))
        }
        (RecordValue::Text(x), RecordValue::Text(y)) => x == y,
        _ => false,
    }
}

fn same_scalar(a: &Scalar, b: &Scalar) -> bool {
    match (*a, *b) {
        (Scalar::F32(x), Scalar::F32(y)) => same_f32(x, y),
        (Scalar::F64(x), Scalar::F64(y)) => same_f64(x, y),
        (x, y) => x == y,
    }
}
