use crate::error::{NoteError, Result};
use std::collections::BTreeSet;

pub type TagSet = BTreeSet<String>;

/// Normalize a tag: trim and drop a single leading `#`.
/// Returns `None` for tags that are empty after trimming.
pub fn normalize_tag(t: &str) -> Option<String> {
    let trimmed = t.trim();
    let trimmed = trimmed.strip_prefix('#').unwrap_or(trimmed).trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Normalize and deduplicate a list of tags. Tags are stored one per line,
/// so a tag with a line break is rejected instead of being split silently.
pub fn normalize_tags<I, S>(tags: I) -> Result<TagSet>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut set = TagSet::new();
    for tag in tags {
        let raw = tag.as_ref();
        if raw.contains(['\n', '\r']) {
            return Err(NoteError::InvalidTag(raw.to_string()));
        }
        if let Some(tag) = normalize_tag(raw) {
            set.insert(tag);
        }
    }
    Ok(set)
}

/// Parse the contents of a `tags.txt` file.
pub fn parse_tags_file(raw: &str) -> TagSet {
    raw.lines().filter_map(normalize_tag).collect()
}

pub fn format_tags_file(tags: &TagSet) -> String {
    let mut out = String::new();
    for tag in tags {
        out.push_str(tag);
        out.push('\n');
    }
    out
}

/// Hash a tag for deterministic color selection
pub fn hash_tag(tag: &str) -> u64 {
    let mut h: u64 = 5381;
    for b in tag.bytes() {
        h = (h.wrapping_shl(5)).wrapping_add(h) ^ u64::from(b);
    }
    h
}

pub fn color_for_tag(tag: &str) -> (u8, u8, u8) {
    const PALETTE: &[(u8, u8, u8)] = &[
        (137, 180, 250),
        (166, 227, 161),
        (249, 226, 175),
        (245, 194, 231),
        (255, 169, 167),
        (148, 226, 213),
        (198, 160, 246),
        (240, 198, 198),
        (181, 232, 224),
        (183, 189, 248),
        (255, 214, 165),
        (196, 222, 255),
    ];
    PALETTE[(hash_tag(tag) as usize) % PALETTE.len()]
}
