use pulldown_cmark::{
    Event, HeadingLevel, Options, Parser, Tag, TagEnd, html,
};
use std::fs;
use std::io;
use std::path::Path;
use tracing::debug;
use yansi::Paint;

pub const STYLE_FILE: &str = "style.css";

pub const DEFAULT_CSS: &str = "\
table, th, td {
    border: 1px solid black;
    border-collapse: collapse;
}

blockquote {
    background-color: #e0e0e0;
}

pre code {
    background-color: #e0e0e0;
    font-family: monospace;
    display: block;
}

p code {
    font-family: monospace;
    color: #c03030;
}
";

/// Read the user stylesheet from the base directory, creating it with the
/// default rules when it does not exist.
pub fn load_stylesheet(base_path: &Path) -> io::Result<String> {
    let path = base_path.join(STYLE_FILE);
    match fs::read_to_string(&path) {
        Ok(css) => Ok(css),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            fs::create_dir_all(base_path)?;
            fs::write(&path, DEFAULT_CSS)?;
            debug!(path = %path.display(), "wrote default stylesheet");
            Ok(DEFAULT_CSS.to_string())
        }
        Err(e) => Err(e),
    }
}

/// Render markdown as a standalone HTML page. Relative links (attachments)
/// resolve against `note_dir`.
pub fn render_html(markdown: &str, css: &str, note_dir: &Path) -> String {
    let mut body = String::new();
    html::push_html(&mut body, Parser::new_ext(markdown, Options::ENABLE_TABLES));
    format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n\
         <base href=\"file://{}/\">\n<style>\n{}</style>\n</head>\n\
         <body>\n{}</body>\n</html>\n",
        file_url_path(note_dir),
        css,
        body
    )
}

/// Percent-encode a filesystem path for use after `file://`. Only
/// unreserved characters and `/` pass through, so names like `100%` (stored
/// as `100%25`) or `C#` stay inside the note directory.
fn file_url_path(path: &Path) -> String {
    let raw = path.to_string_lossy();
    let mut out = String::with_capacity(raw.len());
    for b in raw.bytes() {
        if b.is_ascii_alphanumeric() || matches!(b, b'/' | b'-' | b'.' | b'_' | b'~') {
            out.push(b as char);
        } else {
            out.push_str(&format!("%{b:02X}"));
        }
    }
    out
}

/// Render markdown for the terminal. Structure (headings, bullets, rules) is
/// kept as text; color only adds styling on top.
pub fn render_markdown(input: &str, use_color: bool) -> String {
    let mut rendered = String::new();
    let mut list_depth: usize = 0;
    let mut in_code_block = false;

    for event in Parser::new_ext(input, Options::ENABLE_TABLES) {
        match event {
            Event::Start(Tag::Heading { level, .. }) => {
                rendered.push('\n');
                let mark = match level {
                    HeadingLevel::H1 => "# ",
                    HeadingLevel::H2 => "## ",
                    HeadingLevel::H3 => "### ",
                    _ => "#### ",
                };
                push_styled(&mut rendered, mark, Style::Heading, use_color);
            }
            Event::End(TagEnd::Heading(_)) => rendered.push('\n'),
            Event::End(TagEnd::Paragraph) => rendered.push_str("\n\n"),
            Event::Start(Tag::List(_)) => list_depth += 1,
            Event::End(TagEnd::List(_)) => {
                list_depth = list_depth.saturating_sub(1);
                if list_depth == 0 {
                    rendered.push('\n');
                }
            }
            Event::Start(Tag::Item) => {
                rendered.push_str(&"  ".repeat(list_depth.saturating_sub(1)));
                push_styled(&mut rendered, "- ", Style::Bullet, use_color);
            }
            Event::End(TagEnd::Item) => {
                if !rendered.ends_with('\n') {
                    rendered.push('\n');
                }
            }
            Event::Start(Tag::CodeBlock(_)) => {
                in_code_block = true;
                rendered.push('\n');
            }
            Event::End(TagEnd::CodeBlock) => {
                in_code_block = false;
                rendered.push('\n');
            }
            Event::Start(Tag::Image { dest_url, .. }) => {
                push_styled(
                    &mut rendered,
                    &format!("[image: {dest_url}] "),
                    Style::Link,
                    use_color,
                );
            }
            Event::Text(t) => {
                let style = if in_code_block { Style::Code } else { Style::Body };
                push_styled(&mut rendered, &t, style, use_color);
            }
            Event::Code(t) => push_styled(&mut rendered, &t, Style::Code, use_color),
            Event::SoftBreak | Event::HardBreak => rendered.push('\n'),
            Event::Rule => {
                push_styled(&mut rendered, "---\n", Style::Rule, use_color);
            }
            Event::Html(t) | Event::InlineHtml(t) => rendered.push_str(&t),
            Event::End(TagEnd::TableCell) => rendered.push_str(" | "),
            Event::End(TagEnd::TableHead) | Event::End(TagEnd::TableRow) => {
                rendered.push('\n')
            }
            _ => {}
        }
    }

    rendered.trim().to_string()
}

#[derive(Clone, Copy)]
enum Style {
    Heading,
    Bullet,
    Rule,
    Code,
    Link,
    Body,
}

fn push_styled(buf: &mut String, text: &str, style: Style, use_color: bool) {
    if !use_color {
        buf.push_str(text);
        return;
    }
    let painted = match style {
        Style::Heading => Paint::cyan(text).bold(),
        Style::Bullet => Paint::yellow(text).bold(),
        Style::Rule => Paint::new(text).dim(),
        Style::Code => Paint::blue(text),
        Style::Link => Paint::magenta(text).underline(),
        Style::Body => Paint::new(text),
    };
    buf.push_str(&painted.to_string());
}
