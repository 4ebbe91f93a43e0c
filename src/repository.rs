//! Repository - The public save-game contract: upsert, read, delete,
//! count, enumerate

use crate::record::{Format, SaveRecord};
use crate::slots::SlotDir;
use crate::{Error, Result};
use std::fs;

/// Outcome of an upsert: whether an existing slot was overwritten or a
/// new one appended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Upsert {
    /// A new slot was appended at this index
    Created(usize),
    /// The slot at this index already held this name and was replaced
    Updated(usize),
}

impl Upsert {
    /// The slot index the record ended up in.
    pub fn index(&self) -> usize {
        match *self {
            Upsert::Created(index) | Upsert::Updated(index) => index,
        }
    }
}

/// What happened to the on-disk file during a read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Migration {
    /// The file was already in the current format
    None,
    /// A legacy file was rewritten in the current format
    Upgraded,
    /// A legacy file decoded fine but could not be rewritten; the
    /// record is still valid, the file stays stuck in legacy format
    Failed(String),
}

/// A successfully decoded record plus the migration status of its file.
///
/// A migration failure is a secondary warning, never a read failure:
/// the decoded record is good, the disk just could not be upgraded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Loaded {
    pub record: SaveRecord,
    pub migration: Migration,
}

/// One entry of an enumeration: either a readable record or a
/// corruption marker for that index.
#[derive(Debug)]
pub enum SlotEntry {
    Valid(Loaded),
    Corrupt(Error),
}

/// An index paired with what was found there.
#[derive(Debug)]
pub struct SlotSummary {
    pub index: usize,
    pub entry: SlotEntry,
}

/// Save repository over a slot directory.
///
/// All five operations assume exclusive access to the directory; there
/// is no file locking. External mutation during a scan surfaces as
/// transient decode errors, never as silently accepted corruption.
#[derive(Debug, Clone, Default)]
pub struct SaveRepository {
    slots: SlotDir,
}

impl SaveRepository {
    /// Create a repository over the given slot directory.
    pub fn new(slots: SlotDir) -> Self {
        Self { slots }
    }

    /// The underlying slot directory.
    pub fn slots(&self) -> &SlotDir {
        &self.slots
    }

    /// Number of save slots (contiguous-prefix rule).
    pub fn count(&self) -> usize {
        self.slots.count()
    }

    /// Save a record, updating the slot that already holds its name or
    /// appending a new one.
    ///
    /// The record's `saved_at` is stamped to now. The name scan decodes
    /// every slot (migrating legacy files along the way); slots that
    /// fail to decode are skipped rather than fatal, so one corrupt
    /// file never blocks saving. Repeated saves under one name never
    /// grow the slot count.
    pub fn upsert(&self, record: &SaveRecord) -> Result<Upsert> {
        self.slots.ensure_dir()?;

        let mut stamped = record.clone();
        stamped.saved_at = chrono::Utc::now().timestamp();
        let bytes = stamped.encode();

        let total = self.count();
        for index in 1..=total {
            let existing = match self.read(index) {
                Ok(loaded) => loaded.record,
                Err(_) => continue,
            };
            if existing.name == stamped.name {
                fs::write(self.slots.slot_path(index), &bytes)?;
                return Ok(Upsert::Updated(index));
            }
        }

        let index = total + 1;
        fs::write(self.slots.slot_path(index), &bytes)?;
        Ok(Upsert::Created(index))
    }

    /// Read the record at a 1-based index, upgrading legacy files.
    ///
    /// A legacy file that decodes successfully is rewritten in the
    /// current format best-effort: a rewrite failure is reported in
    /// [`Loaded::migration`] but never invalidates the returned record.
    pub fn read(&self, index: usize) -> Result<Loaded> {
        if index == 0 || !self.slots.exists(index) {
            return Err(Error::NotFound(index));
        }

        let path = self.slots.slot_path(index);
        let bytes = fs::read(&path)?;
        let (record, format) = SaveRecord::decode(&bytes)?;

        let migration = match format {
            Format::Current => Migration::None,
            Format::Legacy => match fs::write(&path, record.encode()) {
                Ok(()) => Migration::Upgraded,
                Err(e) => Migration::Failed(e.to_string()),
            },
        };

        Ok(Loaded { record, migration })
    }

    /// Delete the slot at `index` and shift every higher slot down one
    /// to keep the numbering gap-free.
    ///
    /// The shift renames lowest-first (`index+1` → `index`, and so on).
    /// Each rename is atomic on its own but the chain is not; a crash
    /// partway through leaves a gap that [`SaveRepository::repair`]
    /// closes on the next startup.
    pub fn delete(&self, index: usize) -> Result<()> {
        if index == 0 || !self.slots.exists(index) {
            return Err(Error::NotFound(index));
        }

        let total = self.count();
        fs::remove_file(self.slots.slot_path(index))?;

        for i in index + 1..=total {
            fs::rename(self.slots.slot_path(i), self.slots.slot_path(i - 1))?;
        }
        Ok(())
    }

    /// Lazily enumerate `1..=count()`, yielding each index with either
    /// its record or a corruption marker.
    ///
    /// One corrupt slot never aborts the enumeration. A fresh call
    /// rescans from scratch; the only mutation behind this is the
    /// read-triggered legacy upgrade.
    pub fn summaries(&self) -> impl Iterator<Item = SlotSummary> + '_ {
        let total = self.count();
        (1..=total).map(move |index| SlotSummary {
            index,
            entry: match self.read(index) {
                Ok(loaded) => SlotEntry::Valid(loaded),
                Err(error) => SlotEntry::Corrupt(error),
            },
        })
    }

    /// Close gaps left by an interrupted delete shift.
    ///
    /// Scans the directory for slot files stranded past the contiguous
    /// prefix and renames them down, preserving their relative order.
    /// Returns how many files were moved. This never runs implicitly:
    /// the five main operations keep the contiguous-prefix semantics
    /// observable, and callers opt into recovery at startup.
    pub fn repair(&self) -> Result<usize> {
        if !self.slots.root().is_dir() {
            return Ok(0);
        }

        let mut indices = Vec::new();
        for entry in fs::read_dir(self.slots.root())? {
            let entry = entry?;
            if let Some(index) = parse_slot_index(&entry.file_name().to_string_lossy()) {
                indices.push(index);
            }
        }
        indices.sort_unstable();

        let mut moved = 0;
        for (position, &index) in indices.iter().enumerate() {
            let target = position + 1;
            if index != target {
                fs::rename(self.slots.slot_path(index), self.slots.slot_path(target))?;
                moved += 1;
            }
        }
        Ok(moved)
    }
}

/// Parse `save<N>.dat` into `N`, rejecting anything else in the dir
fn parse_slot_index(file_name: &str) -> Option<usize> {
    let digits = file_name.strip_prefix("save")?.strip_suffix(".dat")?;
    let index: usize = digits.parse().ok()?;
    if index >= 1 {
        Some(index)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{PAYLOAD_LEN, RECORD_LEN};
    use tempfile::TempDir;

    fn repo() -> (TempDir, SaveRepository) {
        let tmp = TempDir::new().unwrap();
        let repo = SaveRepository::new(SlotDir::new(tmp.path().join("saves")));
        (tmp, repo)
    }

    fn record(name: &str, health: i32, coins: i32) -> SaveRecord {
        SaveRecord::new(name, health, coins, 0, 0)
    }

    #[test]
    fn upsert_appends_then_updates() {
        let (_tmp, repo) = repo();

        assert_eq!(
            repo.upsert(&record("Aria", 20, 0)).unwrap(),
            Upsert::Created(1)
        );
        assert_eq!(
            repo.upsert(&record("Bran", 15, 10)).unwrap(),
            Upsert::Created(2)
        );
        assert_eq!(repo.count(), 2);

        // Same name again: the slot is replaced, the count stays put
        assert_eq!(
            repo.upsert(&record("Aria", 7, 99)).unwrap(),
            Upsert::Updated(1)
        );
        assert_eq!(repo.count(), 2);

        let loaded = repo.read(1).unwrap();
        assert_eq!(loaded.record.health, 7);
        assert_eq!(loaded.record.coins, 99);
    }

    #[test]
    fn upsert_stamps_timestamp() {
        let (_tmp, repo) = repo();
        let stale = record("Aria", 20, 0);
        assert_eq!(stale.saved_at, 0);

        repo.upsert(&stale).unwrap();
        let loaded = repo.read(1).unwrap();
        assert!(loaded.record.saved_at > 0);
    }

    #[test]
    fn upsert_skips_corrupt_slots() {
        let (_tmp, repo) = repo();
        repo.slots().ensure_dir().unwrap();
        fs::write(repo.slots().slot_path(1), b"garbage").unwrap();

        // The corrupt slot still occupies index 1, so the new record
        // lands at 2; the name scan just could not look inside slot 1.
        assert_eq!(
            repo.upsert(&record("Aria", 20, 0)).unwrap(),
            Upsert::Created(2)
        );
    }

    #[test]
    fn read_missing_slot() {
        let (_tmp, repo) = repo();
        repo.slots().ensure_dir().unwrap();
        assert!(matches!(repo.read(0), Err(Error::NotFound(0))));
        assert!(matches!(repo.read(1), Err(Error::NotFound(1))));
    }

    #[test]
    fn read_surfaces_integrity_error() {
        let (_tmp, repo) = repo();
        repo.upsert(&record("Aria", 20, 0)).unwrap();

        let path = repo.slots().slot_path(1);
        let mut bytes = fs::read(&path).unwrap();
        bytes[10] ^= 0xFF;
        fs::write(&path, &bytes).unwrap();

        assert!(matches!(repo.read(1), Err(Error::Integrity { .. })));
    }

    #[test]
    fn legacy_file_grows_by_four_bytes_on_first_read() {
        let (_tmp, repo) = repo();
        repo.slots().ensure_dir().unwrap();

        let full = record("Aria", 20, 0).encode();
        let path = repo.slots().slot_path(1);
        fs::write(&path, &full[..PAYLOAD_LEN]).unwrap();

        let loaded = repo.read(1).unwrap();
        assert_eq!(loaded.migration, Migration::Upgraded);
        assert_eq!(loaded.record.name, "Aria");

        // Upgraded in place: now current format with a matching CRC
        assert_eq!(fs::metadata(&path).unwrap().len(), RECORD_LEN as u64);
        let reread = repo.read(1).unwrap();
        assert_eq!(reread.migration, Migration::None);
        assert_eq!(reread.record, loaded.record);
    }

    #[cfg(unix)]
    #[test]
    fn failed_migration_still_returns_the_record() {
        let (_tmp, repo) = repo();
        repo.slots().ensure_dir().unwrap();

        let full = record("Aria", 20, 0).encode();
        let path = repo.slots().slot_path(1);
        fs::write(&path, &full[..PAYLOAD_LEN]).unwrap();

        let mut perms = fs::metadata(&path).unwrap().permissions();
        perms.set_readonly(true);
        fs::set_permissions(&path, perms.clone()).unwrap();

        // Root ignores permission bits; nothing to assert in that case
        if fs::OpenOptions::new().write(true).open(&path).is_ok() {
            return;
        }

        let loaded = repo.read(1).unwrap();
        assert_eq!(loaded.record.name, "Aria");
        assert!(matches!(loaded.migration, Migration::Failed(_)));

        // Still legacy on disk
        assert_eq!(fs::metadata(&path).unwrap().len(), PAYLOAD_LEN as u64);

        perms.set_readonly(false);
        fs::set_permissions(&path, perms).unwrap();
    }

    #[test]
    fn delete_compacts_higher_slots() {
        let (_tmp, repo) = repo();
        for name in ["A", "B", "C", "D", "E"] {
            repo.upsert(&record(name, 1, 0)).unwrap();
        }

        repo.delete(3).unwrap();

        assert_eq!(repo.count(), 4);
        let names: Vec<String> = (1..=4)
            .map(|i| repo.read(i).unwrap().record.name)
            .collect();
        assert_eq!(names, ["A", "B", "D", "E"]);
    }

    #[test]
    fn delete_missing_slot() {
        let (_tmp, repo) = repo();
        repo.slots().ensure_dir().unwrap();
        assert!(matches!(repo.delete(0), Err(Error::NotFound(0))));
        assert!(matches!(repo.delete(2), Err(Error::NotFound(2))));
    }

    #[test]
    fn delete_first_of_two_promotes_the_second() {
        let (_tmp, repo) = repo();
        repo.upsert(&record("Aria", 20, 0)).unwrap();
        repo.upsert(&record("Bran", 15, 10)).unwrap();

        repo.delete(1).unwrap();

        assert_eq!(repo.count(), 1);
        assert_eq!(repo.read(1).unwrap().record.name, "Bran");
    }

    #[test]
    fn summaries_mark_corrupt_slots_without_aborting() {
        let (_tmp, repo) = repo();
        repo.upsert(&record("Aria", 20, 0)).unwrap();
        repo.upsert(&record("Bran", 15, 10)).unwrap();
        repo.upsert(&record("Cato", 9, 3)).unwrap();

        fs::write(repo.slots().slot_path(2), b"shredded").unwrap();

        let entries: Vec<SlotSummary> = repo.summaries().collect();
        assert_eq!(entries.len(), 3);
        assert!(matches!(entries[0].entry, SlotEntry::Valid(_)));
        assert!(matches!(
            entries[1].entry,
            SlotEntry::Corrupt(Error::UnrecognizedLength(8))
        ));
        assert!(matches!(entries[2].entry, SlotEntry::Valid(_)));
    }

    #[test]
    fn summaries_restart_from_scratch() {
        let (_tmp, repo) = repo();
        repo.upsert(&record("Aria", 20, 0)).unwrap();

        assert_eq!(repo.summaries().count(), 1);
        repo.upsert(&record("Bran", 15, 10)).unwrap();
        assert_eq!(repo.summaries().count(), 2);
    }

    #[test]
    fn repair_closes_gaps_in_order() {
        let (_tmp, repo) = repo();
        for name in ["A", "B", "C", "D", "E"] {
            repo.upsert(&record(name, 1, 0)).unwrap();
        }

        // Simulate a delete of slot 2 that crashed before its shift
        fs::remove_file(repo.slots().slot_path(2)).unwrap();
        assert_eq!(repo.count(), 1);

        let moved = repo.repair().unwrap();
        assert_eq!(moved, 3);
        assert_eq!(repo.count(), 4);

        let names: Vec<String> = (1..=4)
            .map(|i| repo.read(i).unwrap().record.name)
            .collect();
        assert_eq!(names, ["A", "C", "D", "E"]);
    }

    #[test]
    fn repair_is_a_no_op_on_contiguous_slots() {
        let (_tmp, repo) = repo();
        repo.upsert(&record("Aria", 20, 0)).unwrap();
        repo.upsert(&record("Bran", 15, 10)).unwrap();

        assert_eq!(repo.repair().unwrap(), 0);
        assert_eq!(repo.count(), 2);
    }

    #[test]
    fn repair_without_a_saves_directory() {
        let (_tmp, repo) = repo();
        assert_eq!(repo.repair().unwrap(), 0);
    }

    #[test]
    fn repair_ignores_foreign_files() {
        let (_tmp, repo) = repo();
        repo.upsert(&record("Aria", 20, 0)).unwrap();
        fs::write(repo.slots().root().join("notes.txt"), b"hi").unwrap();
        fs::write(repo.slots().root().join("save0.dat"), b"zero").unwrap();

        assert_eq!(repo.repair().unwrap(), 0);
        assert_eq!(repo.count(), 1);
    }
}
