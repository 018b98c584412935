//! Upgrades of the on-disk note layout.
//!
//! Layout v1 kept note content in `note.md`; v2 uses `README.md` so that
//! note directories render nicely in repository browsers.

use crate::error::Result;
use crate::note::{CONTENT_FILE, LEGACY_CONTENT_FILE};
use crate::store::NoteStore;
use std::fs;
use std::io;
use tracing::{info, warn};

pub const CURRENT_PERSISTENCE_VERSION: u32 = 2;

/// Rename `note.md` to `README.md` in every note directory that has no
/// `README.md` yet. Returns how many notes were migrated.
pub fn migrate_legacy_layout(store: &NoteStore) -> Result<usize> {
    let entries = match fs::read_dir(store.root()) {
        Ok(entries) => entries,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(0),
        Err(e) => return Err(e.into()),
    };

    let mut migrated = 0;
    for entry in entries {
        let entry = entry?;
        if !entry.file_type()?.is_dir() {
            continue;
        }
        let dir = entry.path();
        let legacy = dir.join(LEGACY_CONTENT_FILE);
        let current = dir.join(CONTENT_FILE);
        if !legacy.is_file() {
            continue;
        }
        if current.exists() {
            warn!(
                dir = %dir.display(),
                "both {LEGACY_CONTENT_FILE} and {CONTENT_FILE} present; leaving legacy file"
            );
            continue;
        }
        fs::rename(&legacy, &current)?;
        migrated += 1;
    }

    if migrated > 0 {
        info!(migrated, root = %store.root().display(), "migrated legacy notes");
    }
    Ok(migrated)
}

impl NoteStore {
    pub fn migrate_legacy_layout(&self) -> Result<usize> {
        migrate_legacy_layout(self)
    }
}
