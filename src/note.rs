use crate::tags::{TagSet, format_tags_file, parse_tags_file};
use chrono::{DateTime, Local};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Canonical content file inside every note directory.
pub const CONTENT_FILE: &str = "README.md";
/// Content file name used by the first on-disk layout.
pub const LEGACY_CONTENT_FILE: &str = "note.md";
pub const TAGS_FILE: &str = "tags.txt";

#[derive(Debug, Clone)]
pub struct Note {
    pub name: String,
    pub content: String,
    pub tags: TagSet,
    pub path: PathBuf,
}

/// Listing entry: enough to show and filter without keeping file handles.
#[derive(Debug, Clone)]
pub struct NoteSummary {
    pub name: String,
    pub tags: TagSet,
    pub modified: Option<DateTime<Local>>,
    pub size_bytes: u64,
    pub preview: String,
}

/// Files that are never attachments. `note.md` stays reserved so a legacy
/// content file left behind by migration is not listed as an attachment.
pub fn is_reserved_file(file_name: &str) -> bool {
    matches!(file_name, CONTENT_FILE | TAGS_FILE | LEGACY_CONTENT_FILE)
}

pub fn content_path(note_dir: &Path) -> PathBuf {
    note_dir.join(CONTENT_FILE)
}

pub fn default_content(name: &str) -> String {
    format!("# {name}\n")
}

pub fn ensure_dir(path: &Path) -> io::Result<()> {
    if !path.exists() {
        fs::create_dir_all(path)?;
    }
    Ok(())
}

/// Replace the content file by writing a sibling and renaming it over.
pub fn write_content(note_dir: &Path, text: &str) -> io::Result<()> {
    let tmp = note_dir.join(format!(".{CONTENT_FILE}.tmp"));
    fs::write(&tmp, text)?;
    fs::rename(&tmp, content_path(note_dir)).inspect_err(|_| {
        let _ = fs::remove_file(&tmp);
    })
}

pub fn read_tags(note_dir: &Path) -> io::Result<TagSet> {
    match fs::read_to_string(note_dir.join(TAGS_FILE)) {
        Ok(raw) => Ok(parse_tags_file(&raw)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(TagSet::new()),
        Err(e) => Err(e),
    }
}

pub fn write_tags(note_dir: &Path, tags: &TagSet) -> io::Result<()> {
    let path = note_dir.join(TAGS_FILE);
    if tags.is_empty() {
        if path.exists() {
            fs::remove_file(path)?;
        }
        return Ok(());
    }
    fs::write(path, format_tags_file(tags))
}

/// First non-empty line of the content with leading heading marks removed.
pub fn preview_line(content: &str) -> String {
    content
        .lines()
        .map(str::trim)
        .find(|l| !l.is_empty())
        .map(|l| l.trim_start_matches('#').trim().to_string())
        .unwrap_or_default()
}
