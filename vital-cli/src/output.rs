//! Report building and rendering
//!
//! A decoded model is reduced to a [`FileReport`] according to the selected
//! view and filters, then written either as text or as JSON. Tracks always
//! appear in the model's display order.

use crate::config::OutputFormat;
use chrono::{DateTime, FixedOffset};
use serde::Serialize;
use std::io::{self, Write};
use vital_decoder::{DecodeModel, DecodeStats, Device, Record, Track, TrackKind};

/// Which sections of a report to produce
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum View {
    /// File information, devices, tracks and sample records
    #[default]
    Full,
    InfoOnly,
    ListTracks,
    ListDevices,
    /// Everything except the records themselves
    Summary,
}

impl View {
    fn file_info(self) -> bool {
        !matches!(self, View::ListTracks | View::ListDevices)
    }

    fn devices(self) -> bool {
        !matches!(self, View::InfoOnly | View::ListTracks)
    }

    fn tracks(self) -> bool {
        !matches!(self, View::InfoOnly | View::ListDevices)
    }

    fn records(self) -> bool {
        !matches!(self, View::Summary | View::ListTracks)
    }
}

/// Track kinds selectable from the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum TrackType {
    Wave,
    Numeric,
    String,
}

impl TrackType {
    pub fn matches(self, kind: TrackKind) -> bool {
        matches!(
            (self, kind),
            (TrackType::Wave, TrackKind::Wave)
                | (TrackType::Numeric, TrackKind::Numeric)
                | (TrackType::String, TrackKind::String)
        )
    }
}

/// Track filters and record window
#[derive(Debug, Clone, Default)]
pub struct Selection {
    /// Exact full names to keep; empty keeps every track
    pub names: Vec<String>,
    pub track_type: Option<TrackType>,
    /// 0 for no limit
    pub max_tracks: usize,
    /// 0 for no limit
    pub max_samples: usize,
    /// Records stamped earlier are skipped; 0 for unbounded
    pub start_time: f64,
    /// Records stamped later end the window; 0 for unbounded
    pub end_time: f64,
}

impl Selection {
    /// Tracks passing the filters, in display order
    pub fn tracks<'a>(&self, model: &'a DecodeModel) -> Vec<&'a Track> {
        let limit = if self.max_tracks == 0 { usize::MAX } else { self.max_tracks };
        model
            .tracks()
            .filter(|t| self.names.is_empty() || self.names.iter().any(|n| *n == t.full_name))
            .filter(|t| self.track_type.map_or(true, |ty| ty.matches(t.kind)))
            .take(limit)
            .collect()
    }

    /// Records inside the time window, at most `max_samples` of them
    ///
    /// Records are assumed to be in time order: the first one past the end
    /// closes the window.
    pub fn window<'a>(&self, records: &'a [Record]) -> Vec<&'a Record> {
        let limit = if self.max_samples == 0 { usize::MAX } else { self.max_samples };
        records
            .iter()
            .filter(|r| self.start_time <= 0.0 || r.timestamp >= self.start_time)
            .take_while(|r| self.end_time <= 0.0 || r.timestamp <= self.end_time)
            .take(limit)
            .collect()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct FileInfo {
    pub dt_start: f64,
    pub dt_end: f64,
    pub duration: f64,
    /// Minutes east of GMT
    pub gmt_offset: i16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub local_start: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub local_end: Option<String>,
    pub tracks_count: usize,
    pub devices_count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct TrackReport<'a> {
    pub name: &'a str,
    #[serde(rename = "type")]
    pub kind: u8,
    pub type_name: &'static str,
    pub fmt: u8,
    pub unit: &'a str,
    pub sample_rate: f32,
    pub gain: f64,
    pub offset: f64,
    pub min_display: f32,
    pub max_display: f32,
    pub color: u32,
    pub monitor_type: u8,
    pub device_name: &'a str,
    /// All records of the track, regardless of the window
    pub records_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub records: Option<Vec<&'a Record>>,
}

/// Everything printed for one input file
#[derive(Debug, Clone, Serialize)]
pub struct FileReport<'a> {
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_info: Option<FileInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub devices: Option<Vec<&'a Device>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tracks: Option<Vec<TrackReport<'a>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stats: Option<DecodeStats>,
}

fn format_local(time: Option<DateTime<FixedOffset>>) -> Option<String> {
    time.map(|t| t.format("%Y-%m-%d %H:%M:%S%.3f %:z").to_string())
}

impl<'a> FileReport<'a> {
    pub fn build(
        path: String,
        model: &'a DecodeModel,
        view: View,
        selection: &Selection,
        stats: Option<DecodeStats>,
    ) -> Self {
        let file_info = view.file_info().then(|| FileInfo {
            dt_start: model.time_start(),
            dt_end: model.time_end(),
            duration: model.duration(),
            gmt_offset: model.gmt_offset(),
            local_start: format_local(model.local_time(model.time_start())),
            local_end: format_local(model.local_time(model.time_end())),
            tracks_count: model.track_count(),
            devices_count: model.device_count(),
        });

        let devices = view.devices().then(|| model.devices().collect());

        let tracks = view.tracks().then(|| {
            selection
                .tracks(model)
                .into_iter()
                .map(|track| TrackReport {
                    name: &track.full_name,
                    kind: track.kind.code(),
                    type_name: track.kind_name(),
                    fmt: track.sample_format.code(),
                    unit: &track.unit,
                    sample_rate: track.sample_rate,
                    gain: track.gain,
                    offset: track.offset,
                    min_display: track.display_min,
                    max_display: track.display_max,
                    color: track.color,
                    monitor_type: track.monitor_type,
                    device_name: &track.device_name,
                    records_count: track.records.len(),
                    records: view.records().then(|| selection.window(&track.records)),
                })
                .collect()
        });

        Self {
            path,
            file_info,
            devices,
            tracks,
            stats,
        }
    }
}

/// Write all reports in the requested format
pub fn write_reports<W: Write>(
    out: &mut W,
    reports: &[FileReport<'_>],
    format: OutputFormat,
    compact: bool,
    view: View,
) -> io::Result<()> {
    match format {
        OutputFormat::Json => write_json(out, reports, compact),
        OutputFormat::Text => {
            for (i, report) in reports.iter().enumerate() {
                if reports.len() > 1 {
                    if i > 0 {
                        writeln!(out)?;
                    }
                    writeln!(out, "==> {} <==", report.path)?;
                }
                write_text(out, report, view)?;
            }
            Ok(())
        }
    }
}

fn write_json<W: Write>(out: &mut W, reports: &[FileReport<'_>], compact: bool) -> io::Result<()> {
    // A single input prints a bare object
    let result = match (reports, compact) {
        ([one], true) => serde_json::to_writer(&mut *out, one),
        ([one], false) => serde_json::to_writer_pretty(&mut *out, one),
        (all, true) => serde_json::to_writer(&mut *out, all),
        (all, false) => serde_json::to_writer_pretty(&mut *out, all),
    };
    result.map_err(io::Error::from)?;
    writeln!(out)
}

/// Plain text rendering of one report
pub fn write_text<W: Write>(out: &mut W, report: &FileReport<'_>, view: View) -> io::Result<()> {
    if let Some(info) = &report.file_info {
        writeln!(out, "=== File Information ===")?;
        write!(out, "Start Time: {:.6}", info.dt_start)?;
        match &info.local_start {
            Some(local) => writeln!(out, " ({})", local)?,
            None => writeln!(out)?,
        }
        write!(out, "End Time: {:.6}", info.dt_end)?;
        match &info.local_end {
            Some(local) => writeln!(out, " ({})", local)?,
            None => writeln!(out)?,
        }
        writeln!(out, "Duration: {:.2} seconds", info.duration)?;
        writeln!(out, "GMT Offset: {}", info.gmt_offset)?;
        writeln!(out, "Number of Tracks: {}", info.tracks_count)?;
        writeln!(out, "Number of Devices: {}", info.devices_count)?;
        writeln!(out)?;
    }

    if let Some(devices) = report.devices.as_ref().filter(|d| !d.is_empty()) {
        writeln!(out, "=== Devices ===")?;
        for device in devices {
            writeln!(out, "- {}: {} (Port: {})", device.name, device.type_name, device.port)?;
        }
        writeln!(out)?;
    }

    if let Some(tracks) = report.tracks.as_ref().filter(|t| !t.is_empty()) {
        if view == View::ListTracks {
            writeln!(out, "=== Available Tracks ===")?;
            for track in tracks {
                writeln!(
                    out,
                    "- {}: {} ({}), Rate: {:.1} Hz",
                    track.name, track.type_name, track.unit, track.sample_rate
                )?;
            }
        } else {
            writeln!(out, "=== Tracks ===")?;
            for track in tracks {
                writeln!(
                    out,
                    "- {}: {} {}, Rate: {:.1} Hz, Records: {}",
                    track.name, track.type_name, track.unit, track.sample_rate, track.records_count
                )?;
                let Some(records) = track.records.as_ref().filter(|r| !r.is_empty()) else {
                    continue;
                };
                writeln!(out, "  Sample data:")?;
                for (i, record) in records.iter().enumerate() {
                    writeln!(out, "    [{}] Time: {:.6}, Value: {}", i + 1, record.timestamp, record.value)?;
                }
            }
        }
    }

    if let Some(stats) = &report.stats {
        writeln!(out)?;
        writeln!(out, "=== Decode Statistics ===")?;
        writeln!(out, "Packets: {}", stats.packets)?;
        writeln!(out, "Dropped: {}", stats.dropped)?;
        writeln!(out, "Skipped: {}", stats.skipped_unknown)?;
        writeln!(out, "Truncated: {}", if stats.truncated { "yes" } else { "no" })?;
    }
    Ok(())
}
