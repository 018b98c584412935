use crate::error::{NoteError, Result};
use std::path::Path;
use std::process::{Command, Stdio};
use tracing::debug;
use uuid::Uuid;

/// Run the capture command so it writes a new PNG into `note_dir`.
/// Returns the file name relative to the note directory.
pub fn take_screenshot(note_dir: &Path, command_template: &str) -> Result<String> {
    let filename = format!("screenshot_{}.png", Uuid::new_v4());
    let full_path = note_dir.join(&filename);
    let command =
        command_template.replace("{filename}", &full_path.to_string_lossy());
    debug!(%command, "running screenshot command");

    let status = Command::new("sh")
        .arg("-c")
        .arg(&command)
        .stdin(Stdio::null())
        .status()
        .map_err(|e| NoteError::Screenshot(format!("could not run `{command}`: {e}")))?;

    if !status.success() {
        return Err(NoteError::Screenshot(format!(
            "`{command}` exited with {status}"
        )));
    }
    if !full_path.is_file() {
        return Err(NoteError::Screenshot(format!(
            "`{command}` did not create {}",
            full_path.display()
        )));
    }
    Ok(filename)
}

/// Markdown snippet embedding a stored screenshot.
pub fn screenshot_markdown(filename: &str) -> String {
    format!("![screenshot]({filename})\n\n")
}
