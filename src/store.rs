//! Filesystem-backed note repository.
//!
//! Every note is a directory under the notes root holding `README.md`,
//! an optional `tags.txt` and any number of attachments. The store keeps no
//! in-memory index; each call reads or writes the filesystem directly.

use crate::error::{NoteError, Result};
use crate::name::{decode_name, encode_name, validate_name};
use crate::note::{
    Note, NoteSummary, content_path, default_content, ensure_dir,
    is_reserved_file, preview_line, read_tags, write_content, write_tags,
};
use crate::tags::{TagSet, normalize_tag, normalize_tags};
use chrono::{DateTime, Local};
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

const UNTITLED: &str = "Untitled";

#[derive(Debug, Clone)]
pub struct NoteStore {
    root: PathBuf,
}

impl NoteStore {
    /// The root is created lazily on the first write.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory of a note, whether or not it exists yet.
    pub fn note_path(&self, name: &str) -> PathBuf {
        self.root.join(encode_name(name))
    }

    pub fn exists(&self, name: &str) -> bool {
        content_path(&self.note_path(name)).is_file()
    }

    fn existing_path(&self, name: &str) -> Result<PathBuf> {
        let path = self.note_path(name);
        if content_path(&path).is_file() {
            Ok(path)
        } else {
            Err(NoteError::NotFound(name.to_string()))
        }
    }

    /// Notes whose name or content contains `filter_text` (ignoring case) and,
    /// when `tag` is given, whose tag set contains it. Sorted by name.
    pub fn list_notes(
        &self,
        filter_text: &str,
        tag: Option<&str>,
    ) -> Result<Vec<NoteSummary>> {
        let query = filter_text.to_lowercase();
        let tag = tag.and_then(normalize_tag);
        let mut notes = Vec::new();

        for (name, dir) in self.note_dirs()? {
            let content_file = content_path(&dir);
            let bytes = match fs::read(&content_file) {
                Ok(bytes) => bytes,
                Err(e) => {
                    warn!(name = %name, error = %e, "skipping unreadable note");
                    continue;
                }
            };
            let content = String::from_utf8_lossy(&bytes);
            let tags = match read_tags(&dir) {
                Ok(tags) => tags,
                Err(e) => {
                    warn!(name = %name, error = %e, "ignoring unreadable tags");
                    TagSet::new()
                }
            };

            if let Some(t) = &tag {
                if !tags.contains(t) {
                    continue;
                }
            }
            if !query.is_empty()
                && !name.to_lowercase().contains(&query)
                && !content.to_lowercase().contains(&query)
            {
                continue;
            }

            let meta = fs::metadata(&content_file)?;
            notes.push(NoteSummary {
                preview: preview_line(&content),
                modified: meta.modified().ok().map(DateTime::<Local>::from),
                size_bytes: meta.len(),
                name,
                tags,
            });
        }

        notes.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(notes)
    }

    /// All tags in use with the number of notes carrying each.
    pub fn list_tags(&self) -> Result<BTreeMap<String, usize>> {
        let mut counts = BTreeMap::new();
        for (_, dir) in self.note_dirs()? {
            for tag in read_tags(&dir)? {
                *counts.entry(tag).or_insert(0) += 1;
            }
        }
        Ok(counts)
    }

    /// A directory at the target path that is not a note (no `README.md`)
    /// is adopted: the content file is written into it and its other files
    /// become attachments.
    pub fn create_note(&self, name: &str) -> Result<Note> {
        validate_name(name)?;
        if self.exists(name) {
            return Err(NoteError::DuplicateName(name.to_string()));
        }
        let dir = self.note_path(name);
        ensure_dir(&self.root)?;
        let created = match fs::create_dir(&dir) {
            Ok(()) => true,
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists && dir.is_dir() => {
                debug!(name, "adopting existing directory");
                false
            }
            Err(e) => return Err(e.into()),
        };
        let content = default_content(name);
        if let Err(e) = write_content(&dir, &content) {
            if created {
                if let Err(cleanup) = fs::remove_dir_all(&dir) {
                    warn!(name, error = %cleanup, "could not remove partial note");
                }
            }
            return Err(e.into());
        }
        debug!(name, path = %dir.display(), "created note");
        Ok(Note {
            name: name.to_string(),
            content,
            tags: TagSet::new(),
            path: dir,
        })
    }

    /// Create `Untitled`, or the first free `Untitled N`.
    pub fn create_untitled(&self) -> Result<Note> {
        let mut name = UNTITLED.to_string();
        let mut number = 0;
        while self.note_path(&name).exists() {
            number += 1;
            name = format!("{UNTITLED} {number}");
        }
        self.create_note(&name)
    }

    pub fn read_note(&self, name: &str) -> Result<Note> {
        let dir = self.existing_path(name)?;
        Ok(Note {
            name: name.to_string(),
            content: fs::read_to_string(content_path(&dir))?,
            tags: read_tags(&dir)?,
            path: dir,
        })
    }

    pub fn read_content(&self, name: &str) -> Result<String> {
        let dir = self.existing_path(name)?;
        Ok(fs::read_to_string(content_path(&dir))?)
    }

    pub fn rename_note(&self, old_name: &str, new_name: &str) -> Result<()> {
        let old_dir = self.existing_path(old_name)?;
        validate_name(new_name)?;
        if old_name == new_name {
            return Ok(());
        }
        let new_dir = self.note_path(new_name);
        if new_dir.exists() {
            return Err(NoteError::DuplicateName(new_name.to_string()));
        }
        fs::rename(&old_dir, &new_dir)?;
        debug!(from = old_name, to = new_name, "renamed note");
        Ok(())
    }

    /// Remove the note directory with all attachments.
    pub fn delete_note(&self, name: &str) -> Result<()> {
        let dir = self.existing_path(name)?;
        fs::remove_dir_all(&dir)?;
        debug!(name, "deleted note");
        Ok(())
    }

    pub fn save_content(&self, name: &str, text: &str) -> Result<()> {
        let dir = self.existing_path(name)?;
        write_content(&dir, text)?;
        debug!(name, bytes = text.len(), "saved note content");
        Ok(())
    }

    /// Store `bytes` next to the note and return the file name actually used.
    pub fn add_attachment(
        &self,
        name: &str,
        file_bytes: &[u8],
        suggested_filename: &str,
    ) -> Result<String> {
        let dir = self.existing_path(name)?;
        let stored = unique_attachment_name(&dir, suggested_filename);
        fs::write(dir.join(&stored), file_bytes)?;
        debug!(name, file = %stored, "added attachment");
        Ok(stored)
    }

    pub fn attachments(&self, name: &str) -> Result<Vec<String>> {
        let dir = self.existing_path(name)?;
        let mut files = Vec::new();
        for entry in fs::read_dir(&dir)? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            let file_name = entry.file_name().to_string_lossy().into_owned();
            if is_reserved_file(&file_name) || file_name.starts_with('.') {
                continue;
            }
            files.push(file_name);
        }
        files.sort();
        Ok(files)
    }

    pub fn set_tags<I, S>(&self, name: &str, tags: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let dir = self.existing_path(name)?;
        let tags = normalize_tags(tags)?;
        write_tags(&dir, &tags)?;
        debug!(name, count = tags.len(), "set tags");
        Ok(())
    }

    pub fn get_tags(&self, name: &str) -> Result<TagSet> {
        let dir = self.existing_path(name)?;
        Ok(read_tags(&dir)?)
    }

    /// Decoded names and paths of all note directories. A missing root is
    /// an empty collection; directories without a content file are skipped.
    pub(crate) fn note_dirs(&self) -> Result<Vec<(String, PathBuf)>> {
        let entries = match fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Ok(Vec::new());
            }
            Err(e) => return Err(e.into()),
        };
        let mut dirs = Vec::new();
        for entry in entries {
            let entry = entry?;
            if !entry.file_type()?.is_dir() {
                continue;
            }
            let path = entry.path();
            if !content_path(&path).is_file() {
                continue;
            }
            let name = decode_name(&entry.file_name().to_string_lossy());
            dirs.push((name, path));
        }
        Ok(dirs)
    }
}

/// Sanitize a suggested attachment name and suffix it until it is free:
/// `pic.png`, `pic-1.png`, `pic-2.png`, ...
fn unique_attachment_name(dir: &Path, suggested: &str) -> String {
    let base = Path::new(suggested)
        .file_name()
        .map(|f| f.to_string_lossy().into_owned())
        .filter(|f| !f.trim().is_empty())
        .unwrap_or_else(|| "attachment".to_string());
    let base = encode_name(&base);

    let (stem, ext) = match base.rfind('.') {
        Some(idx) if idx > 0 => (&base[..idx], &base[idx..]),
        _ => (base.as_str(), ""),
    };

    let mut candidate = base.clone();
    let mut n = 0;
    while is_reserved_file(&candidate) || dir.join(&candidate).exists() {
        n += 1;
        candidate = format!("{stem}-{n}{ext}");
    }
    candidate
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn store() -> (tempfile::TempDir, NoteStore) {
        let tmp = tempdir().unwrap();
        let store = NoteStore::new(tmp.path().join("notes"));
        (tmp, store)
    }

    fn names(notes: &[NoteSummary]) -> Vec<&str> {
        notes.iter().map(|n| n.name.as_str()).collect()
    }

    #[test]
    fn test_list_missing_root_is_empty() {
        let (_tmp, store) = store();
        assert!(store.list_notes("", None).unwrap().is_empty());
        assert!(store.list_tags().unwrap().is_empty());
        assert!(!store.root().exists());
    }

    #[test]
    fn test_create_writes_default_content() {
        let (_tmp, store) = store();
        let note = store.create_note("Alpha").unwrap();
        assert_eq!(note.content, "# Alpha\n");
        assert!(note.path.join("README.md").is_file());
        assert_eq!(store.read_content("Alpha").unwrap(), "# Alpha\n");
    }

    #[test]
    fn test_create_duplicate_leaves_note_untouched() {
        let (_tmp, store) = store();
        store.create_note("Alpha").unwrap();
        store.save_content("Alpha", "keep me").unwrap();
        let err = store.create_note("Alpha").unwrap_err();
        assert!(matches!(err, NoteError::DuplicateName(ref n) if n == "Alpha"));
        assert_eq!(store.read_content("Alpha").unwrap(), "keep me");
    }

    #[test]
    fn test_create_invalid_name() {
        let (_tmp, store) = store();
        assert!(matches!(
            store.create_note(" "),
            Err(NoteError::InvalidName(_))
        ));
    }

    #[test]
    fn test_create_untitled_numbers() {
        let (_tmp, store) = store();
        assert_eq!(store.create_untitled().unwrap().name, "Untitled");
        assert_eq!(store.create_untitled().unwrap().name, "Untitled 1");
        assert_eq!(store.create_untitled().unwrap().name, "Untitled 2");
    }

    #[test]
    fn test_list_sorted_by_name() {
        let (_tmp, store) = store();
        for name in ["gamma", "Beta", "alpha"] {
            store.create_note(name).unwrap();
        }
        let notes = store.list_notes("", None).unwrap();
        assert_eq!(names(&notes), vec!["Beta", "alpha", "gamma"]);
    }

    #[test]
    fn test_filter_by_text_matches_name_or_content() {
        let (_tmp, store) = store();
        store.create_note("Shopping").unwrap();
        store.create_note("Ideas").unwrap();
        store.save_content("Ideas", "buy a new KEYBOARD").unwrap();

        let by_name = store.list_notes("shop", None).unwrap();
        assert_eq!(names(&by_name), vec!["Shopping"]);
        let by_content = store.list_notes("keyboard", None).unwrap();
        assert_eq!(names(&by_content), vec!["Ideas"]);
        assert!(store.list_notes("nothing here", None).unwrap().is_empty());
    }

    #[test]
    fn test_filter_by_tag_and_text() {
        let (_tmp, store) = store();
        store.create_note("Alpha").unwrap();
        store.create_note("Beta").unwrap();
        store.set_tags("Alpha", ["work"]).unwrap();

        let tagged = store.list_notes("", Some("work")).unwrap();
        assert_eq!(names(&tagged), vec!["Alpha"]);
        let hashed = store.list_notes("", Some("#work")).unwrap();
        assert_eq!(names(&hashed), vec!["Alpha"]);
        assert!(store.list_notes("beta", Some("work")).unwrap().is_empty());
    }

    #[test]
    fn test_rename_carries_everything() {
        let (_tmp, store) = store();
        store.create_note("old").unwrap();
        store.save_content("old", "body").unwrap();
        store.set_tags("old", ["a"]).unwrap();
        store.add_attachment("old", b"png", "pic.png").unwrap();

        store.rename_note("old", "new").unwrap();
        assert!(!store.exists("old"));
        let note = store.read_note("new").unwrap();
        assert_eq!(note.content, "body");
        assert!(note.tags.contains("a"));
        assert_eq!(store.attachments("new").unwrap(), vec!["pic.png"]);
    }

    #[test]
    fn test_rename_collision_and_missing() {
        let (_tmp, store) = store();
        store.create_note("a").unwrap();
        store.create_note("b").unwrap();
        assert!(matches!(
            store.rename_note("a", "b"),
            Err(NoteError::DuplicateName(_))
        ));
        assert!(matches!(
            store.rename_note("zzz", "c"),
            Err(NoteError::NotFound(_))
        ));
        store.rename_note("a", "a").unwrap();
        assert!(store.exists("a"));
    }

    #[test]
    fn test_delete_removes_directory() {
        let (_tmp, store) = store();
        let note = store.create_note("gone").unwrap();
        store.add_attachment("gone", b"x", "file.bin").unwrap();
        store.delete_note("gone").unwrap();
        assert!(!note.path.exists());
        assert!(matches!(
            store.delete_note("gone"),
            Err(NoteError::NotFound(_))
        ));
    }

    #[test]
    fn test_save_content_requires_note() {
        let (_tmp, store) = store();
        assert!(matches!(
            store.save_content("nope", "x"),
            Err(NoteError::NotFound(_))
        ));
    }

    #[test]
    fn test_attachment_collisions_and_sanitizing() {
        let (_tmp, store) = store();
        store.create_note("n").unwrap();
        assert_eq!(store.add_attachment("n", b"1", "pic.png").unwrap(), "pic.png");
        assert_eq!(
            store.add_attachment("n", b"2", "/some/dir/pic.png").unwrap(),
            "pic-1.png"
        );
        assert_eq!(store.add_attachment("n", b"3", "README.md").unwrap(), "README-1.md");
        assert_eq!(store.add_attachment("n", b"4", "").unwrap(), "attachment");
        assert_eq!(store.add_attachment("n", b"5", "Makefile").unwrap(), "Makefile");
        assert_eq!(store.add_attachment("n", b"6", "Makefile").unwrap(), "Makefile-1");
        assert_eq!(store.add_attachment("n", b"7", ".env").unwrap(), "%2Eenv");

        let files = store.attachments("n").unwrap();
        assert_eq!(files.len(), 7);
        assert!(!files.contains(&"README.md".to_string()));
        let raw = fs::read(store.note_path("n").join("pic-1.png")).unwrap();
        assert_eq!(raw, b"2");
    }

    #[test]
    fn test_tags_set_get_and_count() {
        let (_tmp, store) = store();
        store.create_note("a").unwrap();
        store.create_note("b").unwrap();
        store.set_tags("a", ["work", "#info"]).unwrap();
        store.set_tags("b", ["info"]).unwrap();

        let tags = store.get_tags("a").unwrap();
        assert_eq!(tags.into_iter().collect::<Vec<_>>(), vec!["info", "work"]);
        let counts = store.list_tags().unwrap();
        assert_eq!(counts.get("info"), Some(&2));
        assert_eq!(counts.get("work"), Some(&1));

        store.set_tags("a", Vec::<String>::new()).unwrap();
        assert!(store.get_tags("a").unwrap().is_empty());
    }

    #[test]
    fn test_directories_without_content_are_ignored() {
        let (_tmp, store) = store();
        store.create_note("real").unwrap();
        fs::create_dir_all(store.root().join("stray")).unwrap();
        fs::write(store.root().join("loose.txt"), "x").unwrap();
        let notes = store.list_notes("", None).unwrap();
        assert_eq!(names(&notes), vec!["real"]);
    }

    #[test]
    fn test_legacy_content_name_is_reserved_for_attachments() {
        let (_tmp, store) = store();
        store.create_note("n").unwrap();
        assert_eq!(store.add_attachment("n", b"x", "note.md").unwrap(), "note-1.md");
        fs::write(store.note_path("n").join("note.md"), "left over").unwrap();
        assert_eq!(store.attachments("n").unwrap(), vec!["note-1.md"]);
    }

    #[test]
    fn test_non_utf8_note_does_not_hide_others() {
        let (_tmp, store) = store();
        store.create_note("Good").unwrap();
        store.create_note("Bad").unwrap();
        fs::write(
            content_path(&store.note_path("Bad")),
            b"\xff\xfe broken \xc3",
        )
        .unwrap();

        let notes = store.list_notes("", None).unwrap();
        assert_eq!(names(&notes), vec!["Bad", "Good"]);
        assert!(notes[0].preview.contains("broken"));
        assert_eq!(names(&store.list_notes("broken", None).unwrap()), vec!["Bad"]);
        assert!(store.read_content("Bad").is_err());
    }

    #[test]
    fn test_delete_leaves_foreign_directory() {
        let (_tmp, store) = store();
        let stray = store.root().join("scratch");
        fs::create_dir_all(&stray).unwrap();
        fs::write(stray.join("keep.txt"), "mine").unwrap();

        assert!(matches!(
            store.delete_note("scratch"),
            Err(NoteError::NotFound(_))
        ));
        assert!(stray.join("keep.txt").is_file());
    }

    #[test]
    fn test_create_adopts_directory_without_content() {
        let (_tmp, store) = store();
        let stray = store.root().join("scratch");
        fs::create_dir_all(&stray).unwrap();
        fs::write(stray.join("keep.txt"), "mine").unwrap();

        store.create_note("scratch").unwrap();
        assert_eq!(store.read_content("scratch").unwrap(), "# scratch\n");
        assert_eq!(store.attachments("scratch").unwrap(), vec!["keep.txt"]);
        assert!(matches!(
            store.create_note("scratch"),
            Err(NoteError::DuplicateName(_))
        ));
    }

    #[test]
    fn test_failed_create_leaves_no_trace() {
        let (_tmp, store) = store();
        // A directory where the content file should go makes the write fail.
        let stray = store.root().join("blocked");
        fs::create_dir_all(stray.join("README.md")).unwrap();

        assert!(store.create_note("blocked").is_err());
        assert!(stray.join("README.md").is_dir());
        assert!(!stray.join(".README.md.tmp").exists());
        assert!(store.list_notes("", None).unwrap().is_empty());
    }

    #[test]
    fn test_special_character_names_roundtrip() {
        let (_tmp, store) = store();
        let name = "new_note /!<>:\\ | ?*%";
        store.create_note(name).unwrap();
        store.set_tags(name, ["new", "note"]).unwrap();
        let notes = store.list_notes("", None).unwrap();
        assert_eq!(names(&notes), vec![name]);
        assert_eq!(store.get_tags(name).unwrap().len(), 2);
    }
}
