//! The aggregate result of a decode
//!
//! [`DecodeModel`] owns every device and track seen in the stream. The
//! presentation order and the two id tables are indices over that data:
//! device ids map to device names and track ids to full track names. Both
//! tables are filled in packet arrival order, so a packet that references an
//! id before its defining packet arrives simply fails to resolve.
//!
//! Only the packet decoders mutate a model. Callers receive it complete and
//! read it through the accessors below.

use crate::formats::ContainerHeader;
use crate::types::{Device, Track};
use chrono::{DateTime, FixedOffset, TimeZone};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

/// Devices, tracks and time bounds decoded from one vital stream
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DecodeModel {
    devices: BTreeMap<String, Device>,
    tracks: HashMap<String, Track>,
    order: Vec<String>,
    time_start: f64,
    time_end: f64,
    gmt_offset: i16,
    #[serde(skip)]
    device_ids: HashMap<u32, String>,
    #[serde(skip)]
    track_ids: HashMap<u16, String>,
}

impl DecodeModel {
    /// Empty model seeded from the container header
    pub fn from_header(header: &ContainerHeader) -> Self {
        Self {
            time_start: header.time_start,
            time_end: header.time_end,
            gmt_offset: header.gmt_offset,
            ..Self::default()
        }
    }

    /// Devices sorted by name
    pub fn devices(&self) -> impl Iterator<Item = &Device> {
        self.devices.values()
    }

    pub fn device(&self, name: &str) -> Option<&Device> {
        self.devices.get(name)
    }

    pub fn device_count(&self) -> usize {
        self.devices.len()
    }

    /// Tracks in presentation order
    pub fn tracks(&self) -> impl Iterator<Item = &Track> {
        self.order.iter().filter_map(|name| self.tracks.get(name))
    }

    pub fn track(&self, full_name: &str) -> Option<&Track> {
        self.tracks.get(full_name)
    }

    pub fn track_count(&self) -> usize {
        self.tracks.len()
    }

    /// Full track names in presentation order
    pub fn order(&self) -> &[String] {
        &self.order
    }

    /// Earliest record time, seconds since the Unix epoch
    pub fn time_start(&self) -> f64 {
        self.time_start
    }

    /// Latest record time including wave durations
    pub fn time_end(&self) -> f64 {
        self.time_end
    }

    pub fn duration(&self) -> f64 {
        self.time_end - self.time_start
    }

    /// Offset from GMT in minutes
    pub fn gmt_offset(&self) -> i16 {
        self.gmt_offset
    }

    /// Convert an epoch timestamp to the recording's local time
    pub fn local_time(&self, secs: f64) -> Option<DateTime<FixedOffset>> {
        if !secs.is_finite() {
            return None;
        }
        let offset = FixedOffset::east_opt(i32::from(self.gmt_offset) * 60)?;
        let whole = secs.floor();
        let nanos = ((secs - whole) * 1e9).round().min(999_999_999.0) as u32;
        offset.timestamp_opt(whole as i64, nanos).single()
    }

    /// Device name registered for a device id
    pub fn device_name_for_id(&self, id: u32) -> Option<&str> {
        self.device_ids.get(&id).map(String::as_str)
    }

    /// Full track name registered for a track id
    pub fn track_name_for_id(&self, id: u16) -> Option<&str> {
        self.track_ids.get(&id).map(String::as_str)
    }

    pub(crate) fn insert_device(&mut self, id: u32, device: Device) {
        self.device_ids.insert(id, device.name.clone());
        self.devices.insert(device.name.clone(), device);
    }

    /// Register a track, replacing any track with the same full name
    ///
    /// A name already in the order keeps its position; a name missing from
    /// it, including one dropped by a track-order command, is appended.
    pub(crate) fn insert_track(&mut self, id: u16, track: Track) {
        let name = track.full_name.clone();
        if self.tracks.insert(name.clone(), track).is_some() {
            log::debug!("Track {} redefined, previous records discarded", name);
        }
        if !self.order.contains(&name) {
            self.order.push(name.clone());
        }
        self.track_ids.insert(id, name);
    }

    /// Mutable access to the track behind a track id
    pub(crate) fn track_by_id_mut(&mut self, id: u16) -> Option<&mut Track> {
        let name = self.track_ids.get(&id)?;
        self.tracks.get_mut(name)
    }

    /// Widen the global bounds for a record stamped `dt`
    pub(crate) fn observe_time(&mut self, dt: f64) {
        if self.time_start == 0.0 || (dt > 0.0 && dt < self.time_start) {
            self.time_start = dt;
        }
        self.extend_end(dt);
    }

    pub(crate) fn extend_end(&mut self, t: f64) {
        if t > self.time_end {
            self.time_end = t;
        }
    }

    pub(crate) fn set_order(&mut self, order: Vec<String>) {
        self.order = order;
    }

    pub(crate) fn device_ids(&self) -> &HashMap<u32, String> {
        &self.device_ids
    }

    pub(crate) fn track_ids(&self) -> &HashMap<u16, String> {
        &self.track_ids
    }

    pub(crate) fn track_map(&self) -> &HashMap<String, Track> {
        &self.tracks
    }
}
