//! Per-process context handed to every front-end handler.

use crate::config::{Config, ConfigStore};
use crate::error::{NoteError, Result};
use crate::note::Note;
use crate::render::load_stylesheet;
use crate::shared::migrate::CURRENT_PERSISTENCE_VERSION;
use crate::store::NoteStore;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

pub const NOTES_DIR: &str = "notes";

pub struct Session {
    config_store: ConfigStore,
    pub config: Config,
    pub store: NoteStore,
    base_path: PathBuf,
    css: String,
    selected: Option<String>,
}

impl Session {
    /// Load the config at `config_path` and open the note store below its
    /// base path (or `base_override` when given). Upgrades a legacy note
    /// layout on the way.
    pub fn open(config_path: &Path, base_override: Option<PathBuf>) -> Result<Self> {
        let config_store = ConfigStore::new(config_path);
        let mut config = config_store.load();
        let base_path =
            base_override.unwrap_or_else(|| config.resolved_base_path());
        let store = NoteStore::new(base_path.join(NOTES_DIR));

        if config.persistence_version < CURRENT_PERSISTENCE_VERSION {
            let migrated = store.migrate_legacy_layout()?;
            info!(
                from = config.persistence_version,
                to = CURRENT_PERSISTENCE_VERSION,
                migrated,
                "upgraded note layout"
            );
            config.persistence_version = CURRENT_PERSISTENCE_VERSION;
            config_store.save(&config)?;
        }

        let css = match load_stylesheet(&base_path) {
            Ok(css) => css,
            Err(e) => {
                warn!(error = %e, "stylesheet unavailable, using default");
                crate::render::DEFAULT_CSS.to_string()
            }
        };

        Ok(Self {
            config_store,
            config,
            store,
            base_path,
            css,
            selected: None,
        })
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    pub fn config_path(&self) -> &Path {
        self.config_store.path()
    }

    pub fn css(&self) -> &str {
        &self.css
    }

    pub fn select(&mut self, name: &str) -> Result<()> {
        if !self.store.exists(name) {
            return Err(NoteError::NotFound(name.to_string()));
        }
        self.selected = Some(name.to_string());
        Ok(())
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    pub fn selected_name(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    /// The selected note, read fresh from disk. A selection whose note has
    /// disappeared is dropped.
    pub fn selected(&mut self) -> Result<Option<Note>> {
        let Some(name) = self.selected.clone() else { return Ok(None) };
        match self.store.read_note(&name) {
            Ok(note) => Ok(Some(note)),
            Err(NoteError::NotFound(_)) => {
                self.selected = None;
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    /// Rename through the session so the selection follows the note.
    pub fn rename(&mut self, old_name: &str, new_name: &str) -> Result<()> {
        self.store.rename_note(old_name, new_name)?;
        if self.selected.as_deref() == Some(old_name) {
            self.selected = Some(new_name.to_string());
        }
        Ok(())
    }

    pub fn delete(&mut self, name: &str) -> Result<()> {
        self.store.delete_note(name)?;
        if self.selected.as_deref() == Some(name) {
            self.selected = None;
        }
        Ok(())
    }

    /// Persist the in-memory config.
    pub fn sync(&self) -> Result<()> {
        self.config_store.save(&self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn open(tmp: &tempfile::TempDir) -> Session {
        Session::open(
            &tmp.path().join("cfg.yml"),
            Some(tmp.path().join("base")),
        )
        .unwrap()
    }

    #[test]
    fn test_open_creates_config_and_stylesheet() {
        let tmp = tempdir().unwrap();
        let session = open(&tmp);
        assert!(tmp.path().join("cfg.yml").is_file());
        assert!(tmp.path().join("base").join("style.css").is_file());
        assert_eq!(session.store.root(), tmp.path().join("base").join("notes"));
        assert!(!session.css().is_empty());
    }

    #[test]
    fn test_base_path_from_config() {
        let tmp = tempdir().unwrap();
        let base = tmp.path().join("from-config");
        fs::write(
            tmp.path().join("cfg.yml"),
            format!("base_path: \"{}\"\n", base.display()),
        )
        .unwrap();
        let session = Session::open(&tmp.path().join("cfg.yml"), None).unwrap();
        assert_eq!(session.base_path(), base);
    }

    #[test]
    fn test_selection_follows_rename_and_delete() {
        let tmp = tempdir().unwrap();
        let mut session = open(&tmp);
        session.store.create_note("a").unwrap();
        assert!(session.select("missing").is_err());

        session.select("a").unwrap();
        session.rename("a", "b").unwrap();
        assert_eq!(session.selected_name(), Some("b"));
        assert_eq!(session.selected().unwrap().unwrap().name, "b");

        session.delete("b").unwrap();
        assert_eq!(session.selected_name(), None);
    }

    #[test]
    fn test_stale_selection_is_dropped() {
        let tmp = tempdir().unwrap();
        let mut session = open(&tmp);
        session.store.create_note("a").unwrap();
        session.select("a").unwrap();
        session.store.delete_note("a").unwrap();
        assert!(session.selected().unwrap().is_none());
        assert_eq!(session.selected_name(), None);
    }

    #[test]
    fn test_legacy_version_triggers_migration() {
        let tmp = tempdir().unwrap();
        let base = tmp.path().join("base");
        let legacy = base.join("notes").join("old-note");
        fs::create_dir_all(&legacy).unwrap();
        fs::write(legacy.join("note.md"), "Contents of old note").unwrap();
        fs::write(tmp.path().join("cfg.yml"), "persistence_version: 1\n").unwrap();

        let session = Session::open(&tmp.path().join("cfg.yml"), Some(base)).unwrap();
        assert_eq!(
            session.store.read_content("old-note").unwrap(),
            "Contents of old note"
        );
        assert_eq!(session.config.persistence_version, 2);
        let saved = fs::read_to_string(tmp.path().join("cfg.yml")).unwrap();
        assert!(saved.contains("persistence_version: 2"));
    }

    #[test]
    fn test_config_without_version_migrates_legacy_notes() {
        let tmp = tempdir().unwrap();
        let base = tmp.path().join("base");
        let legacy = base.join("notes").join("old-note");
        fs::create_dir_all(&legacy).unwrap();
        fs::write(legacy.join("note.md"), "from v1").unwrap();
        fs::write(
            tmp.path().join("cfg.yml"),
            "base_path: \"{home}/.notedir\"\ngeometry: 800x600\nfont_size: 20\n\
             screenshot_command: \"true {filename}\"\n",
        )
        .unwrap();

        let session = Session::open(&tmp.path().join("cfg.yml"), Some(base)).unwrap();
        let names: Vec<String> = session
            .store
            .list_notes("", None)
            .unwrap()
            .into_iter()
            .map(|n| n.name)
            .collect();
        assert_eq!(names, vec!["old-note"]);
        assert_eq!(session.config.persistence_version, 2);
        assert_eq!(session.config.screenshot_command, "true {filename}");
    }

    #[test]
    fn test_sync_persists_geometry() {
        let tmp = tempdir().unwrap();
        let mut session = open(&tmp);
        session.config.set("geometry", "640x480").unwrap();
        session.sync().unwrap();
        let reopened = open(&tmp);
        assert_eq!(reopened.config.geometry.to_string(), "640x480");
    }
}
