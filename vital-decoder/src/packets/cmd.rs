//! Command packet (type 6)
//!
//! Starts with a u32 command code. Only the track-order command (code 1) is
//! acted on: a u16 count followed by that many u16 values, each a 1-based
//! index into the current order (not a track id).

use crate::formats::codec;
use crate::model::DecodeModel;
use crate::packets::PacketOutcome;
use std::collections::HashSet;

/// Command code for track reordering
pub const CMD_TRACK_ORDER: u32 = 1;

/// A parsed track-order command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackOrder {
    /// 1-based positions into the order at the time the command applies
    pub positions: Vec<u16>,
}

impl TrackOrder {
    /// Parse the body following the command code; a count larger than the
    /// values present reads what is there
    pub fn parse(body: &[u8]) -> Option<Self> {
        let count = codec::u16_at(body, 0)?;
        let positions = (0..count as usize)
            .map_while(|i| codec::u16_at(body, 2 + i * 2))
            .collect();
        Some(Self { positions })
    }

    /// Rebuild the order from the positions that resolve
    ///
    /// Out of range positions and repeats are skipped. An empty result leaves
    /// the order untouched. Returns whether the order was replaced.
    pub fn apply(&self, model: &mut DecodeModel) -> bool {
        let (reordered, total) = {
            let current = model.order();
            let mut seen = HashSet::new();
            let mut reordered = Vec::with_capacity(self.positions.len());
            for &position in &self.positions {
                // Position 0 wraps and resolves to nothing in practice
                let index = position.wrapping_sub(1) as usize;
                if let Some(name) = current.get(index) {
                    if seen.insert(name.as_str()) {
                        reordered.push(name.clone());
                    }
                }
            }
            (reordered, current.len())
        };
        if reordered.is_empty() {
            return false;
        }
        log::debug!("Track order replaced: {} of {} tracks listed", reordered.len(), total);
        model.set_order(reordered);
        true
    }
}

/// Decode a command packet
pub fn decode(payload: &[u8], model: &mut DecodeModel) -> PacketOutcome {
    let Some(code) = codec::u32_at(payload, 0) else {
        return PacketOutcome::Dropped("command shorter than its code");
    };
    match code {
        CMD_TRACK_ORDER => match TrackOrder::parse(&payload[4..]) {
            Some(order) => {
                order.apply(model);
                PacketOutcome::Applied
            }
            None => PacketOutcome::Dropped("track order without a count"),
        },
        other => {
            log::trace!("Ignoring command code {}", other);
            PacketOutcome::Ignored
        }
    }
}
