//! Hero - The player character's in-memory state and stat arithmetic

use crate::record::SaveRecord;

/// Health a freshly created hero starts with
pub const STARTING_HEALTH: i32 = 20;

/// The player character.
///
/// Persistence goes through [`SaveRecord`]: a hero is converted to a
/// record on save and rebuilt from one on load. The `name` doubles as
/// the save-slot upsert key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hero {
    pub name: String,
    pub health: i32,
    pub coins: i32,
    pub items: i32,
    pub quests_completed: i32,
}

impl Hero {
    /// Create a hero with starting stats.
    pub fn new(name: &str) -> Self {
        Self {
            name: name.trim().to_string(),
            health: STARTING_HEALTH,
            coins: 0,
            items: 0,
            quests_completed: 0,
        }
    }

    /// Apply a signed health change, never dropping below zero.
    pub fn adjust_health(&mut self, delta: i32) {
        self.health = (self.health + delta).max(0);
    }

    /// Apply a signed coin change, never dropping below zero.
    pub fn adjust_coins(&mut self, delta: i32) {
        self.coins = (self.coins + delta).max(0);
    }

    /// Snapshot this hero as a save record.
    ///
    /// The timestamp is left unset; the repository stamps it on write.
    pub fn to_record(&self) -> SaveRecord {
        SaveRecord::new(
            &self.name,
            self.health,
            self.coins,
            self.items,
            self.quests_completed,
        )
    }

    /// Rebuild a hero from a loaded record (the timestamp is not part
    /// of the hero).
    pub fn from_record(record: &SaveRecord) -> Self {
        Self {
            name: record.name.clone(),
            health: record.health,
            coins: record.coins,
            items: record.items,
            quests_completed: record.quests_completed,
        }
    }

    /// ANSI-colored stat card for the terminal.
    pub fn stat_card(&self) -> String {
        format!(
            "\x1b[1;36m//---- HERO ----//\x1b[0m\n\
             \x1b[1;31mName:\x1b[0m {}\n\
             \x1b[1;31mHealth:\x1b[0m {}\n\
             \x1b[1;31mCoins:\x1b[0m {}\n\
             \x1b[1;31mItems:\x1b[0m {}\n\
             \x1b[1;31mQuests completed:\x1b[0m {}\n\
             \x1b[1;36m//--------------//\x1b[0m",
            self.name, self.health, self.coins, self.items, self.quests_completed
        )
    }
}
