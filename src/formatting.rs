use chrono::{DateTime, Local};
use yansi::Paint;

/// Color palette for consistent theming
pub struct ColorPalette {
    pub name: (u8, u8, u8),      // note names
    pub secondary: (u8, u8, u8), // headers, emphasis
    pub timestamp: (u8, u8, u8),
    pub highlight: (u8, u8, u8), // filter matches
    pub muted: (u8, u8, u8),     // previews
}

impl ColorPalette {
    pub const LIGHT: Self = Self {
        name: (30, 102, 245),
        secondary: (23, 146, 153),
        timestamp: (114, 135, 253),
        highlight: (210, 15, 57),
        muted: (108, 111, 133),
    };

    pub const DARK: Self = Self {
        name: (137, 180, 250),
        secondary: (148, 226, 213),
        timestamp: (180, 190, 254),
        highlight: (243, 139, 168),
        muted: (147, 153, 178),
    };

    /// Palette for a configured theme name; unknown themes look light.
    pub fn for_theme(theme: &str) -> Self {
        if theme.to_lowercase().contains("dark") {
            Self::DARK
        } else {
            Self::LIGHT
        }
    }
}

/// Formatting context passed through the CLI output paths
pub struct FormatContext {
    pub use_color: bool,
    pub palette: ColorPalette,
}

impl FormatContext {
    pub fn new(use_color: bool, theme: &str) -> Self {
        Self { use_color, palette: ColorPalette::for_theme(theme) }
    }

    pub fn from_env(theme: &str) -> Self {
        Self::new(std::env::var("NO_COLOR").is_err(), theme)
    }

    fn paint(&self, text: &str, (r, g, b): (u8, u8, u8)) -> String {
        if self.use_color {
            Paint::rgb(text, r, g, b).to_string()
        } else {
            text.to_string()
        }
    }

    pub fn format_name(&self, name: &str) -> String {
        if self.use_color {
            let (r, g, b) = self.palette.name;
            Paint::rgb(name, r, g, b).bold().to_string()
        } else {
            name.to_string()
        }
    }

    pub fn format_header(&self, text: &str) -> String {
        self.paint(text, self.palette.secondary)
    }

    pub fn format_timestamp(&self, ts: &str) -> String {
        self.paint(ts, self.palette.timestamp)
    }

    pub fn format_muted(&self, text: &str) -> String {
        self.paint(text, self.palette.muted)
    }

    pub fn format_tag(&self, tag: &str) -> String {
        let label = format!("#{tag}");
        self.paint(&label, crate::tags::color_for_tag(tag))
    }

    pub fn format_tags<'a>(&self, tags: impl IntoIterator<Item = &'a String>) -> String {
        tags.into_iter()
            .map(|t| self.format_tag(t))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Color every case-insensitive occurrence of `query` in `text`.
    pub fn highlight_match(&self, text: &str, query: Option<&str>) -> String {
        let Some(q) = query else { return text.to_string() };
        if q.is_empty() || !self.use_color {
            return text.to_string();
        }

        let q_lower = q.to_lowercase();
        let mut out = String::new();
        let mut remaining = text;

        // Byte offsets from the lowercased copy are only reused when
        // lowercasing kept the length, which holds for ASCII input.
        while let Some(pos) = remaining.to_lowercase().find(&q_lower) {
            if remaining.to_lowercase().len() != remaining.len()
                || !remaining.is_char_boundary(pos)
                || !remaining.is_char_boundary(pos + q_lower.len())
            {
                break;
            }
            let (before, rest) = remaining.split_at(pos);
            let (matched, after) = rest.split_at(q_lower.len());
            out.push_str(before);
            out.push_str(&self.paint(matched, self.palette.highlight));
            remaining = after;
        }
        out.push_str(remaining);
        out
    }
}

/// Modification-time formatting with relative/absolute modes
pub struct TimeFormatter {
    relative_mode: bool,
    now: DateTime<Local>,
}

impl TimeFormatter {
    pub fn new(relative_mode: bool, now: DateTime<Local>) -> Self {
        Self { relative_mode, now }
    }

    pub fn format(&self, ts: Option<DateTime<Local>>) -> String {
        match ts {
            Some(dt) if self.relative_mode => self.format_relative(dt),
            Some(dt) => dt.format("%d%b%y %H:%M").to_string(),
            None => "-".to_string(),
        }
    }

    pub fn format_relative(&self, dt: DateTime<Local>) -> String {
        let dur = self.now.signed_duration_since(dt);
        let minutes = dur.num_minutes().max(0);
        let hours = dur.num_hours().max(0);
        let days = dur.num_days().max(0);

        if hours == 0 {
            if minutes == 0 {
                "just now".to_string()
            } else {
                format!("{minutes}m ago")
            }
        } else if days == 0 {
            format!("{hours}h ago")
        } else if days < 30 {
            format!("{days}d ago")
        } else if days < 365 {
            format!("{}mo ago", days / 30)
        } else {
            format!("{}y ago", days / 365)
        }
    }
}
