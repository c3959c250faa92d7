//! Image attachments and asynchronous decode tracking.
//!
//! Photos reach the core as base64 data URLs produced by the UI shell once a
//! file read completes. Reads may finish out of order relative to later user
//! actions, so each one is started with a ticket that captures its target;
//! only the newest ticket per target is allowed to write.

use std::collections::HashMap;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use tracing::debug;

use crate::fields::ImageTarget;

const DATA_PREFIX: &str = "data:";
const BASE64_MARKER: &str = ";base64,";

/// A binary image encoded as a `data:<mime>;base64,<payload>` URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageAsset(String);

impl ImageAsset {
    /// Accept only data URLs with a non-empty, decodable base64 payload.
    ///
    /// Empty slots, page URLs and truncated payloads are rejected so they are
    /// never stored as broken references.
    pub fn parse(url: &str) -> Option<Self> {
        let (mime, payload) = url.strip_prefix(DATA_PREFIX)?.split_once(BASE64_MARKER)?;
        if mime.is_empty() || payload.is_empty() {
            return None;
        }
        STANDARD.decode(payload).ok()?;
        Some(ImageAsset(url.to_string()))
    }

    /// Encode raw image bytes.
    pub fn from_bytes(mime: &str, bytes: &[u8]) -> Self {
        ImageAsset(format!(
            "{DATA_PREFIX}{mime}{BASE64_MARKER}{}",
            STANDARD.encode(bytes)
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn mime(&self) -> &str {
        self.0
            .strip_prefix(DATA_PREFIX)
            .and_then(|rest| rest.split_once(BASE64_MARKER))
            .map(|(mime, _)| mime)
            .unwrap_or_default()
    }

    pub fn decode(&self) -> Result<Vec<u8>, base64::DecodeError> {
        let payload = self
            .0
            .split_once(BASE64_MARKER)
            .map(|(_, payload)| payload)
            .unwrap_or_default();
        STANDARD.decode(payload)
    }
}

/// Identity of one in-flight image decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DecodeTicket(pub u64);

/// Generation tracking for image decodes.
#[derive(Debug, Default)]
pub struct DecodeTracker {
    next: u64,
    pending: HashMap<DecodeTicket, ImageTarget>,
    latest: HashMap<ImageTarget, DecodeTicket>,
}

impl DecodeTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a decode for `target`, superseding any earlier one for it.
    pub fn begin(&mut self, target: ImageTarget) -> DecodeTicket {
        self.next += 1;
        let ticket = DecodeTicket(self.next);
        if let Some(previous) = self.latest.insert(target, ticket) {
            self.pending.remove(&previous);
            debug!(
                superseded = previous.0,
                ticket = ticket.0,
                image = %target.key(),
                "image decode superseded"
            );
        }
        self.pending.insert(ticket, target);
        ticket
    }

    /// Resolve a finished decode to the target captured when it started.
    ///
    /// Returns `None` for unknown tickets and for decodes that a newer one
    /// for the same target has superseded. Superseded tickets are forgotten
    /// as soon as the newer decode begins.
    pub fn finish(&mut self, ticket: DecodeTicket) -> Option<ImageTarget> {
        let target = self.pending.remove(&ticket)?;
        if self.latest.get(&target) == Some(&ticket) {
            self.latest.remove(&target);
            Some(target)
        } else {
            debug!(ticket = ticket.0, image = %target.key(), "dropping stale image decode");
            None
        }
    }

    /// Number of targets still waiting on a decode.
    pub fn in_flight(&self) -> usize {
        self.latest.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::ImageSlot;
    use crate::measurement::RowId;

    #[test]
    fn test_parse_accepts_data_urls() {
        let asset = ImageAsset::parse("data:image/png;base64,iVBORw0KGgo=").unwrap();
        assert_eq!(asset.mime(), "image/png");
        assert_eq!(asset.decode().unwrap(), b"\x89PNG\r\n\x1a\n");
    }

    #[test]
    fn test_parse_rejects_non_assets() {
        assert!(ImageAsset::parse("").is_none());
        assert!(ImageAsset::parse("data:").is_none());
        assert!(ImageAsset::parse("https://example.com/laudo.html").is_none());
        assert!(ImageAsset::parse("data:image/png;base64,").is_none());
        assert!(ImageAsset::parse("data:;base64,AAAA").is_none());
        assert!(ImageAsset::parse("data:image/png;base64,@@@").is_none());
    }

    #[test]
    fn test_from_bytes_round_trips() {
        let asset = ImageAsset::from_bytes("image/jpeg", &[0xFF, 0xD8, 0xFF]);
        assert_eq!(asset.as_str(), "data:image/jpeg;base64,/9j/");
        assert_eq!(ImageAsset::parse(asset.as_str()), Some(asset.clone()));
        assert_eq!(asset.decode().unwrap(), vec![0xFF, 0xD8, 0xFF]);
    }

    #[test]
    fn test_tracker_applies_latest_decode() {
        let mut tracker = DecodeTracker::new();
        let target = ImageTarget::Slot(ImageSlot::Nameplate);

        let ticket = tracker.begin(target);
        assert_eq!(tracker.in_flight(), 1);
        assert_eq!(tracker.finish(ticket), Some(target));
        assert_eq!(tracker.in_flight(), 0);

        // finishing twice is a no-op
        assert_eq!(tracker.finish(ticket), None);
    }

    #[test]
    fn test_tracker_drops_superseded_decode() {
        let mut tracker = DecodeTracker::new();
        let target = ImageTarget::Slot(ImageSlot::PressureGauge);

        let first = tracker.begin(target);
        let second = tracker.begin(target);

        // the older read completes last but must not win
        assert_eq!(tracker.finish(second), Some(target));
        assert_eq!(tracker.finish(first), None);
    }

    #[test]
    fn test_tracker_forgets_superseded_tickets() {
        let mut tracker = DecodeTracker::new();
        let target = ImageTarget::Slot(ImageSlot::Record1);

        let first = tracker.begin(target);
        for _ in 0..50 {
            tracker.begin(target);
        }
        assert_eq!(tracker.pending.len(), 1);
        assert_eq!(tracker.in_flight(), 1);

        assert_eq!(tracker.finish(first), None);
        let last = tracker.begin(target);
        assert_eq!(tracker.finish(last), Some(target));
        assert!(tracker.pending.is_empty());
    }

    #[test]
    fn test_tracker_keeps_targets_independent() {
        let mut tracker = DecodeTracker::new();
        let slot = ImageTarget::Slot(ImageSlot::FrontPage);
        let row = ImageTarget::MeasurementPhoto(RowId(2));

        let a = tracker.begin(slot);
        let b = tracker.begin(row);

        assert_eq!(tracker.finish(b), Some(row));
        assert_eq!(tracker.finish(a), Some(slot));
        assert_eq!(tracker.finish(DecodeTicket(99)), None);
    }
}
