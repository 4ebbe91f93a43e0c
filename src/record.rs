//! Record - Fixed-layout binary codec for hero save records

use crate::{crc, Error, Result};
use serde::{Deserialize, Serialize};

/// Width of the zero-padded name field in bytes
pub const NAME_LEN: usize = 25;

/// Payload size: saved_at (8) + name (25) + four i32 stats (16)
pub const PAYLOAD_LEN: usize = 8 + NAME_LEN + 4 * 4;

/// Current format size: payload plus trailing CRC-32
pub const RECORD_LEN: usize = PAYLOAD_LEN + 4;

/// On-disk layout of a slot file, distinguished purely by byte length
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// Pre-checksum layout: bare payload, no corruption detection
    Legacy,
    /// Payload followed by a little-endian CRC-32 of the payload
    Current,
}

/// A serialized snapshot of one hero's progress.
///
/// The `name` is the unique key for upserts: two slots never decode to
/// the same name. Records are immutable once written; an update
/// replaces the whole record. All stats are non-negative by convention
/// only — the codec stores whatever it is given.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveRecord {
    /// Unix timestamp of the save, stamped by the repository on write
    pub saved_at: i64,
    pub name: String,
    pub health: i32,
    pub coins: i32,
    pub items: i32,
    pub quests_completed: i32,
}

impl SaveRecord {
    /// Create a record, truncating the name to fit the on-disk field.
    ///
    /// Truncation happens here, eagerly, so the in-memory name always
    /// matches what a round trip through the codec produces.
    pub fn new(name: &str, health: i32, coins: i32, items: i32, quests_completed: i32) -> Self {
        Self {
            saved_at: 0,
            name: bounded_name(name).to_string(),
            health,
            coins,
            items,
            quests_completed,
        }
    }

    /// Serialize to the current on-disk format (payload + CRC-32).
    pub fn encode(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(RECORD_LEN);
        buf.extend_from_slice(&self.saved_at.to_le_bytes());

        let mut name_field = [0u8; NAME_LEN];
        let name = bounded_name(&self.name).as_bytes();
        name_field[..name.len()].copy_from_slice(name);
        buf.extend_from_slice(&name_field);

        buf.extend_from_slice(&self.health.to_le_bytes());
        buf.extend_from_slice(&self.coins.to_le_bytes());
        buf.extend_from_slice(&self.items.to_le_bytes());
        buf.extend_from_slice(&self.quests_completed.to_le_bytes());

        let crc = crc::checksum(&buf);
        buf.extend_from_slice(&crc.to_le_bytes());
        buf
    }

    /// Deserialize a slot file's bytes, detecting the format by length.
    ///
    /// * exactly [`PAYLOAD_LEN`] bytes → legacy format, no checksum to
    ///   verify (the legacy layout cannot detect corruption at all);
    /// * exactly [`RECORD_LEN`] bytes → current format, the trailing
    ///   CRC must match a recomputation over the payload;
    /// * anything else → [`Error::UnrecognizedLength`].
    pub fn decode(bytes: &[u8]) -> Result<(Self, Format)> {
        let format = match bytes.len() {
            PAYLOAD_LEN => Format::Legacy,
            RECORD_LEN => Format::Current,
            other => return Err(Error::UnrecognizedLength(other)),
        };

        if format == Format::Current {
            let stored = read_u32(&bytes[PAYLOAD_LEN..]);
            let computed = crc::checksum(&bytes[..PAYLOAD_LEN]);
            if stored != computed {
                return Err(Error::Integrity { stored, computed });
            }
        }

        let saved_at = read_i64(&bytes[0..8]);
        let name_field = &bytes[8..8 + NAME_LEN];
        let name_end = name_field
            .iter()
            .position(|&b| b == 0)
            .unwrap_or(NAME_LEN);
        let name = String::from_utf8_lossy(&name_field[..name_end]).into_owned();

        let stats = &bytes[8 + NAME_LEN..];
        Ok((
            Self {
                saved_at,
                name,
                health: read_i32(&stats[0..4]),
                coins: read_i32(&stats[4..8]),
                items: read_i32(&stats[8..12]),
                quests_completed: read_i32(&stats[12..16]),
            },
            format,
        ))
    }
}

/// Longest prefix of `name` that fits the field on a char boundary
fn bounded_name(name: &str) -> &str {
    if name.len() <= NAME_LEN {
        return name;
    }
    let mut end = NAME_LEN;
    while !name.is_char_boundary(end) {
        end -= 1;
    }
    &name[..end]
}

fn read_i64(b: &[u8]) -> i64 {
    i64::from_le_bytes([b[0], b[1], b[2], b[3], b[4], b[5], b[6], b[7]])
}

fn read_i32(b: &[u8]) -> i32 {
    i32::from_le_bytes([b[0], b[1], b[2], b[3]])
}

fn read_u32(b: &[u8]) -> u32 {
    u32::from_le_bytes([b[0], b[1], b[2], b[3]])
}
