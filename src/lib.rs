//! notedir keeps markdown notes as directories: `<notes>/<name>/README.md`
//! plus optional `tags.txt` and attachments. The library exposes the note
//! and config stores; `entry` drives them from the command line.

pub mod args;
pub mod config;
pub mod error;
pub mod formatting;
mod help;
pub mod name;
pub mod note;
pub mod render;
pub mod screenshot;
pub mod session;
pub mod shared;
pub mod store;
pub mod tags;

pub use config::{Config, ConfigStore, Geometry};
pub use error::{NoteError, Result};
pub use note::{Note, NoteSummary};
pub use session::Session;
pub use store::NoteStore;

use crate::args::{ArgParser, ListFlags, SortField, split_tags};
use crate::formatting::{FormatContext, TimeFormatter};
use crate::shared::table::{Table, terminal_columns, truncate_with_ellipsis};
use chrono::Local;
use std::env;
use std::error::Error;
use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;
use std::process::{Command, Stdio};
use tracing_subscriber::EnvFilter;

/// Run the CLI with the process arguments.
pub fn entry() -> std::result::Result<(), Box<dyn Error>> {
    init_tracing();

    let mut args: Vec<String> = env::args().skip(1).collect();
    if args.is_empty() {
        return help::run(Vec::new());
    }
    let cmd = args.remove(0);
    if matches!(cmd.as_str(), "help" | "-h" | "--help") {
        return help::run(args);
    }

    let mut session = open_session()?;
    match cmd.as_str() {
        "new" => new_note(args, &mut session),
        "list" | "ls" => list_notes(args, &mut session),
        "view" => view_note(args, &mut session),
        "html" => html_note(args, &mut session),
        "edit" => edit_note(args, &mut session),
        "save" => save_note(args, &mut session),
        "rename" | "mv" => rename_note(args, &mut session),
        "delete" | "rm" => delete_notes(args, &mut session),
        "tag" => tag_note(args, &mut session),
        "tags" => list_tags(args, &mut session),
        "attach" => attach_files(args, &mut session),
        "attachments" => list_attachments(args, &mut session),
        "screenshot" => screenshot_note(args, &mut session),
        "config" => config_cmd(args, &mut session),
        "path" => print_path(args, &mut session),
        other => Err(format!("Unknown command: {other}; see `notedir help`").into()),
    }
}

/// Logs go to stderr so stdout stays usable in pipes.
fn init_tracing() {
    let filter = EnvFilter::try_from_env("NOTEDIR_LOG")
        .unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .try_init();
}

fn open_session() -> std::result::Result<Session, Box<dyn Error>> {
    let config_path = config::default_config_path()?;
    let base_override = env::var("NOTEDIR_DIR").ok().map(PathBuf::from);
    Ok(Session::open(&config_path, base_override)?)
}

/// Positional words joined into one note name, so quoting is optional.
fn joined_name(words: Vec<String>, command: &str) -> std::result::Result<String, Box<dyn Error>> {
    let name = words.join(" ");
    if name.trim().is_empty() {
        return Err(format!("Provide a note name; see `notedir help {command}`").into());
    }
    Ok(name)
}

fn new_note(args: Vec<String>, session: &mut Session) -> std::result::Result<(), Box<dyn Error>> {
    let (tags, words) = split_tags(args, "new")?;
    let note = if words.is_empty() {
        session.store.create_untitled()?
    } else {
        session.store.create_note(&words.join(" "))?
    };
    if !tags.is_empty() {
        session.store.set_tags(&note.name, &tags)?;
    }
    session.select(&note.name)?;
    println!("Created note {}", note.name);
    Ok(())
}

fn list_notes(args: Vec<String>, session: &mut Session) -> std::result::Result<(), Box<dyn Error>> {
    let flags = ListFlags::parse(args)?;
    let mut notes = session.store.list_notes(&flags.search, flags.tag.as_deref())?;

    match flags.sort_field {
        SortField::Name => {}
        SortField::Updated => notes.sort_by(|a, b| a.modified.cmp(&b.modified)),
        SortField::Size => notes.sort_by(|a, b| a.size_bytes.cmp(&b.size_bytes)),
    }
    if !flags.ascending {
        notes.reverse();
    }

    let ctx = FormatContext::from_env(&session.config.theme);
    let times = TimeFormatter::new(flags.relative_time, Local::now());
    let query = Some(flags.search.as_str()).filter(|q| !q.is_empty());
    let preview_width = terminal_columns().saturating_sub(60).max(20);

    let mut table = header_table(&ctx, &["name", "updated", "tags", "preview"]);
    for n in &notes {
        let preview = truncate_with_ellipsis(&n.preview, preview_width);
        let (name, preview) = match query {
            Some(_) => (
                ctx.highlight_match(&n.name, query),
                ctx.highlight_match(&preview, query),
            ),
            None => (ctx.format_name(&n.name), ctx.format_muted(&preview)),
        };
        table.push_row(vec![
            name,
            ctx.format_timestamp(&times.format(n.modified)),
            ctx.format_tags(&n.tags),
            preview,
        ]);
    }
    if table.is_empty() {
        if flags.search.is_empty() && flags.tag.is_none() {
            println!("No notes yet. Try `notedir new <name>`.");
        } else {
            println!("No matching notes.");
        }
        return Ok(());
    }
    println!("{}", table.render());
    Ok(())
}

fn header_table(ctx: &FormatContext, headers: &[&str]) -> Table {
    Table::new(headers.iter().map(|h| ctx.format_header(h)))
}

fn view_note(args: Vec<String>, session: &mut Session) -> std::result::Result<(), Box<dyn Error>> {
    let mut render = false;
    let mut plain = false;
    let mut words = Vec::new();
    for arg in args {
        match arg.as_str() {
            "-r" | "--render" => render = true,
            "--plain" => plain = true,
            other if other.starts_with('-') => {
                return Err(format!("Unknown flag for view: {other}").into());
            }
            _ => words.push(arg),
        }
    }
    let name = joined_name(words, "view")?;
    let note = session.store.read_note(&name)?;
    session.select(&name)?;

    if !render {
        print!("{}", note.content);
        if !note.content.ends_with('\n') {
            println!();
        }
        return Ok(());
    }

    let ctx = FormatContext::new(
        !plain && env::var("NO_COLOR").is_err(),
        &session.config.theme,
    );
    println!("{}", crate::render::render_markdown(&note.content, ctx.use_color));
    if !note.tags.is_empty() {
        println!("\n{}", ctx.format_tags(&note.tags));
    }
    Ok(())
}

fn html_note(args: Vec<String>, session: &mut Session) -> std::result::Result<(), Box<dyn Error>> {
    let name = joined_name(args, "html")?;
    let note = session.store.read_note(&name)?;
    print!("{}", crate::render::render_html(&note.content, session.css(), &note.path));
    Ok(())
}

fn edit_note(args: Vec<String>, session: &mut Session) -> std::result::Result<(), Box<dyn Error>> {
    let name = joined_name(args, "edit")?;
    let note = session.store.read_note(&name)?;
    let path = crate::note::content_path(&note.path);

    let editor = env::var("EDITOR").unwrap_or_else(|_| "vi".to_string());
    let status = Command::new(&editor)
        .arg(&path)
        .stdin(Stdio::inherit())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .status()?;
    if !status.success() {
        return Err("Editor exited with non-zero status".into());
    }
    session.select(&name)?;
    println!("Updated {name}");
    Ok(())
}

fn save_note(args: Vec<String>, session: &mut Session) -> std::result::Result<(), Box<dyn Error>> {
    let mut parser = ArgParser::new(args, "save");
    let name = parser.require("the note name")?;
    let words = parser.collect_remaining();
    let text = if words.is_empty() {
        let mut buf = String::new();
        io::stdin().read_to_string(&mut buf)?;
        buf
    } else {
        let mut text = words.join(" ");
        text.push('\n');
        text
    };
    session.store.save_content(&name, &text)?;
    println!("Saved {name}");
    Ok(())
}

fn rename_note(args: Vec<String>, session: &mut Session) -> std::result::Result<(), Box<dyn Error>> {
    let mut parser = ArgParser::new(args, "rename");
    let old_name = parser.require("the current name")?;
    let new_name = joined_name(parser.collect_remaining(), "rename")?;
    session.rename(&old_name, &new_name)?;
    println!("Renamed {old_name} -> {new_name}");
    Ok(())
}

fn delete_notes(args: Vec<String>, session: &mut Session) -> std::result::Result<(), Box<dyn Error>> {
    if args.is_empty() {
        return Err("Usage: notedir delete <name>...".into());
    }
    let mut missing = 0;
    for name in args {
        match session.delete(&name) {
            Ok(()) => println!("Deleted {name}"),
            Err(NoteError::NotFound(_)) => {
                eprintln!("Note {name} not found");
                missing += 1;
            }
            Err(e) => return Err(e.into()),
        }
    }
    if missing > 0 {
        return Err(format!("{missing} note(s) not found").into());
    }
    Ok(())
}

fn tag_note(args: Vec<String>, session: &mut Session) -> std::result::Result<(), Box<dyn Error>> {
    let mut parser = ArgParser::new(args, "tag");
    let name = parser.require("the note name")?;
    let tags = parser.collect_remaining();
    session.store.set_tags(&name, &tags)?;

    let stored = session.store.get_tags(&name)?;
    if stored.is_empty() {
        println!("Cleared tags of {name}");
    } else {
        let ctx = FormatContext::from_env(&session.config.theme);
        println!("Tagged {name}: {}", ctx.format_tags(&stored));
    }
    Ok(())
}

fn list_tags(args: Vec<String>, session: &mut Session) -> std::result::Result<(), Box<dyn Error>> {
    let ctx = FormatContext::from_env(&session.config.theme);
    if !args.is_empty() {
        let name = joined_name(args, "tags")?;
        for tag in session.store.get_tags(&name)? {
            println!("{}", ctx.format_tag(&tag));
        }
        return Ok(());
    }

    let counts = session.store.list_tags()?;
    if counts.is_empty() {
        println!("No tags yet. Try `notedir tag <name> <tag>`.");
        return Ok(());
    }
    let mut table = header_table(&ctx, &["tag", "notes"]);
    for (tag, count) in counts {
        table.push_row(vec![ctx.format_tag(&tag), count.to_string()]);
    }
    println!("{}", table.render());
    Ok(())
}

fn attach_files(args: Vec<String>, session: &mut Session) -> std::result::Result<(), Box<dyn Error>> {
    let mut parser = ArgParser::new(args, "attach");
    let name = parser.require("the note name")?;
    let files = parser.collect_remaining();
    if files.is_empty() {
        return Err("Usage: notedir attach <name> <file>...".into());
    }
    for file in files {
        let bytes = fs::read(&file)
            .map_err(|e| format!("Cannot read {file}: {e}"))?;
        let stored = session.store.add_attachment(&name, &bytes, &file)?;
        println!("Attached {stored}");
    }
    Ok(())
}

fn list_attachments(args: Vec<String>, session: &mut Session) -> std::result::Result<(), Box<dyn Error>> {
    let name = joined_name(args, "attachments")?;
    let files = session.store.attachments(&name)?;
    if files.is_empty() {
        println!("No attachments.");
    }
    for file in files {
        println!("{file}");
    }
    Ok(())
}

fn screenshot_note(args: Vec<String>, session: &mut Session) -> std::result::Result<(), Box<dyn Error>> {
    let name = joined_name(args, "screenshot")?;
    let note = session.store.read_note(&name)?;
    let filename = crate::screenshot::take_screenshot(
        &note.path,
        &session.config.screenshot_command,
    )?;

    let mut content = note.content;
    if !content.is_empty() && !content.ends_with('\n') {
        content.push('\n');
    }
    content.push_str(&crate::screenshot::screenshot_markdown(&filename));
    session.store.save_content(&name, &content)?;
    println!("Added {filename}");
    Ok(())
}

fn config_cmd(args: Vec<String>, session: &mut Session) -> std::result::Result<(), Box<dyn Error>> {
    let mut parser = ArgParser::new(args, "config");
    if let Some(key) = parser.next() {
        let value = parser.collect_remaining().join(" ");
        if value.is_empty() {
            return Err(format!("Provide a value for {key}").into());
        }
        session.config.set(&key, &value)?;
        session.sync()?;
        println!("Set {key} = {value}");
        return Ok(());
    }

    let c = &session.config;
    let ctx = FormatContext::from_env(&c.theme);
    let mut table = header_table(&ctx, &["key", "value"]);
    for (key, value) in [
        ("config_file", session.config_path().display().to_string()),
        ("persistence_version", c.persistence_version.to_string()),
        ("base_path", c.base_path.clone()),
        ("theme", c.theme.clone()),
        ("screenshot_command", c.screenshot_command.clone()),
        ("geometry", c.geometry.to_string()),
        ("font_size", c.font_size.to_string()),
    ] {
        table.push_row(vec![key.to_string(), value]);
    }
    println!("{}", table.render());
    Ok(())
}

fn print_path(args: Vec<String>, session: &mut Session) -> std::result::Result<(), Box<dyn Error>> {
    if args.is_empty() {
        println!("{}", session.store.root().display());
        return Ok(());
    }
    let name = joined_name(args, "path")?;
    if !session.store.exists(&name) {
        return Err(NoteError::NotFound(name).into());
    }
    println!("{}", session.store.note_path(&name).display());
    Ok(())
}
