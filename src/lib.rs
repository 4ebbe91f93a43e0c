//! Herosave - Slot-based save system for a terminal adventure game
//!
//! This library persists hero profiles to numbered slot files
//! (`save1.dat`, `save2.dat`, ...) with CRC-32 integrity checking and
//! transparent migration of pre-checksum legacy files. The game layers
//! (hero stats, missions, cheats, menus) sit on top and only ever talk
//! to the [`SaveRepository`].

pub mod cheats;
pub mod crc;
pub mod hero;
pub mod menu;
pub mod missions;
pub mod record;
pub mod repository;
pub mod slots;

pub use cheats::{CheatCode, CheatState};
pub use hero::Hero;
pub use menu::Menu;
pub use missions::{Mission, MissionBook, MissionId};
pub use record::{Format, SaveRecord, NAME_LEN, PAYLOAD_LEN, RECORD_LEN};
pub use repository::{Loaded, Migration, SaveRepository, SlotEntry, SlotSummary, Upsert};
pub use slots::SlotDir;

/// Default saves directory relative to the working directory
pub const SAVE_DIR: &str = "saves";

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("save slot {0} not found")]
    NotFound(usize),

    #[error("unrecognized save data length: {0} bytes")]
    UnrecognizedLength(usize),

    #[error("checksum mismatch: stored {stored:#010x}, computed {computed:#010x}")]
    Integrity { stored: u32, computed: u32 },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
