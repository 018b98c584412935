//! Mapping between note names and directory names.
//!
//! Names are free text; directory names must be legal on common filesystems.
//! Characters that are not are percent-encoded (`%2F` for `/`), and so is the
//! escape character itself, which keeps the mapping reversible.

use crate::error::{NoteError, Result};

const RESERVED: &[char] = &['%', '/', '\\', ':', '*', '?', '"', '<', '>', '|'];

/// Reject names that cannot identify a note.
pub fn validate_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(NoteError::InvalidName(
            "name must not be empty".to_string(),
        ));
    }
    if name.contains(['\n', '\r']) {
        return Err(NoteError::InvalidName(format!(
            "{name:?} contains a line break"
        )));
    }
    Ok(())
}

/// Encode a note name into a directory name.
pub fn encode_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for (i, ch) in name.chars().enumerate() {
        let escape = RESERVED.contains(&ch)
            || ch.is_control()
            || (i == 0 && ch == '.');
        if escape {
            let mut buf = [0u8; 4];
            for b in ch.encode_utf8(&mut buf).bytes() {
                out.push_str(&format!("%{b:02X}"));
            }
        } else {
            out.push(ch);
        }
    }
    out
}

/// Decode a directory name back into the note name. Malformed escapes are
/// kept literally so foreign directories still show up under some name.
pub fn decode_name(dir_name: &str) -> String {
    let bytes = dir_name.as_bytes();
    let mut out: Vec<u8> = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%'
            && i + 2 < bytes.len()
            && is_upper_hex(bytes[i + 1])
            && is_upper_hex(bytes[i + 2])
        {
            out.push(hex_value(bytes[i + 1]) << 4 | hex_value(bytes[i + 2]));
            i += 3;
            continue;
        }
        out.push(bytes[i]);
        i += 1;
    }
    String::from_utf8(out).unwrap_or_else(|_| dir_name.to_string())
}

/// `encode_name` only emits uppercase escapes, so `%2e` stays literal
/// instead of aliasing the `%2E` directory.
fn is_upper_hex(b: u8) -> bool {
    b.is_ascii_digit() || (b'A'..=b'F').contains(&b)
}

fn hex_value(b: u8) -> u8 {
    match b {
        b'0'..=b'9' => b - b'0',
        _ => b - b'A' + 10,
    }
}
