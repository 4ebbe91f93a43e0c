//! Slots - Maps 1-based slot indices to files in the saves directory

use crate::{Result, SAVE_DIR};
use std::fs;
use std::path::{Path, PathBuf};

/// The directory holding numbered slot files.
///
/// Slots are addressed by 1-based index and live at
/// `<root>/save<index>.dat`. The directory enforces the contiguity
/// invariant observationally: [`SlotDir::count`] only ever sees the
/// unbroken run of files starting at index 1.
#[derive(Debug, Clone)]
pub struct SlotDir {
    root: PathBuf,
}

impl Default for SlotDir {
    fn default() -> Self {
        Self::new(SAVE_DIR)
    }
}

impl SlotDir {
    /// Create a slot directory handle rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The directory path itself.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Create the saves directory if it does not exist yet.
    ///
    /// Idempotent. On Unix the directory is created owner-only (0700),
    /// matching how the game has always treated its saves.
    pub fn ensure_dir(&self) -> Result<()> {
        if self.root.is_dir() {
            return Ok(());
        }

        let mut builder = fs::DirBuilder::new();
        builder.recursive(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::DirBuilderExt;
            builder.mode(0o700);
        }
        builder.create(&self.root)?;
        Ok(())
    }

    /// Path of the slot file for a 1-based index.
    pub fn slot_path(&self, index: usize) -> PathBuf {
        self.root.join(format!("save{}.dat", index))
    }

    /// Whether the slot file for `index` exists.
    pub fn exists(&self, index: usize) -> bool {
        index >= 1 && self.slot_path(index).is_file()
    }

    /// Number of slots, defined as the length of the contiguous run of
    /// files starting at index 1.
    ///
    /// Probes upward and stops at the first missing index. Files past
    /// a gap are invisible here even if they physically exist; closing
    /// such gaps is the repository's repair pass, not the counter's.
    pub fn count(&self) -> usize {
        let mut count = 0;
        while self.exists(count + 1) {
            count += 1;
        }
        count
    }
}
