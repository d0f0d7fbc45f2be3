//! A segment: an ID-contiguous, compressed batch of events (spec.md §3,
//! "Segment"). Segments are append-only and content-addressed by UUID;
//! once built, a segment's bytes never change.

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use vast_types::Event;

use crate::error::ArchiveError;

/// The compression method a segment's payload was encoded with. Any
/// wire-compatible choice satisfies spec.md §6 — this picks `zstd`
/// because it is already present in the broader example pack's dependency
/// graph for exactly this purpose (see DESIGN.md).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Compression {
    None,
    Zstd { level: i32 },
}

impl Default for Compression {
    fn default() -> Self {
        Compression::Zstd { level: 3 }
    }
}

/// An ordered batch of events sharing encoding parameters, covering the
/// half-open id range `[lo, hi)`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Segment {
    pub id: Uuid,
    pub lo: u64,
    pub hi: u64,
    compression: Compression,
    payload: Vec<u8>,
}

impl Segment {
    /// Builds a segment from `events`, compressing their encoded form with
    /// `compression`. `events` must be sorted by id and contiguous;
    /// callers (the Receiver) are responsible for that invariant since it
    /// is established by construction from an Identifier-issued range.
    pub fn build(events: &[Event], compression: Compression) -> Result<Self, ArchiveError> {
        let id = Uuid::new_v4();
        let lo = events.first().map(|e| e.id).unwrap_or(0);
        let hi = events.last().map(|e| e.id + 1).unwrap_or(0);
        let encoded = bincode::serde::encode_to_vec(events, bincode::config::standard())
            .map_err(|e| ArchiveError::Encode(e, id))?;
        let payload = match compression {
            Compression::None => encoded,
            Compression::Zstd { level } => {
                zstd::encode_all(encoded.as_slice(), level).map_err(|source| ArchiveError::Write {
                    id,
                    path: "<in-memory compression>".to_string(),
                    source,
                })?
            }
        };
        Ok(Segment { id, lo, hi, compression, payload })
    }

    /// The half-open id range `[lo, hi)` this segment covers.
    pub fn range(&self) -> std::ops::Range<u64> {
        self.lo..self.hi
    }

    pub fn overlaps(&self, other: &std::ops::Range<u64>) -> bool {
        self.lo < other.end && other.start < self.hi
    }

    /// Size of the compressed payload in bytes, used against
    /// `max-segment-size` and cache-accounting.
    pub fn byte_size(&self) -> usize {
        self.payload.len()
    }

    /// Decompresses and decodes the events this segment holds.
    pub fn events(&self) -> Result<Vec<Event>, ArchiveError> {
        let decoded = match self.compression {
            Compression::None => self.payload.clone(),
            Compression::Zstd { .. } => {
                zstd::decode_all(self.payload.as_slice()).map_err(|source| ArchiveError::Read {
                    id: self.id,
                    path: "<in-memory decompression>".to_string(),
                    source,
                })?
            }
        };
        let (events, _) = bincode::serde::decode_from_slice(&decoded, bincode::config::standard())
            .map_err(|source| ArchiveError::Decode { id: self.id, source })?;
        Ok(events)
    }
}
