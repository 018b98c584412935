use std::error::Error;

/// Small cursor over a subcommand's arguments.
pub struct ArgParser {
    iter: std::vec::IntoIter<String>,
    command_name: String,
}

impl ArgParser {
    pub fn new(args: Vec<String>, command_name: &str) -> Self {
        Self { iter: args.into_iter(), command_name: command_name.to_string() }
    }

    /// Value following a flag such as `-t` or `--sort`.
    pub fn extract_value(&mut self, flag: &str) -> Result<String, Box<dyn Error>> {
        self.iter.next().ok_or_else(|| {
            format!("Provide a value after {} for {}", flag, self.command_name)
                .into()
        })
    }

    /// Next positional argument, or a usage error naming what is missing.
    pub fn require(&mut self, what: &str) -> Result<String, Box<dyn Error>> {
        self.iter.next().ok_or_else(|| {
            format!("Missing {} for {}; see `notedir help {}`", what, self.command_name, self.command_name)
                .into()
        })
    }

    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> Option<String> {
        self.iter.next()
    }

    pub fn collect_remaining(self) -> Vec<String> {
        self.iter.collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    Name,
    Updated,
    Size,
}

impl SortField {
    pub fn parse(value: &str) -> Result<Self, Box<dyn Error>> {
        match value {
            "name" => Ok(SortField::Name),
            "updated" | "modified" => Ok(SortField::Updated),
            "size" => Ok(SortField::Size),
            other => Err(format!(
                "Unknown sort field {other}; use name|updated|size"
            )
            .into()),
        }
    }
}

/// Flags accepted by `list`.
#[derive(Debug)]
pub struct ListFlags {
    pub search: String,
    pub tag: Option<String>,
    pub sort_field: SortField,
    pub ascending: bool,
    pub relative_time: bool,
}

impl Default for ListFlags {
    fn default() -> Self {
        Self {
            search: String::new(),
            tag: None,
            sort_field: SortField::Name,
            ascending: true,
            relative_time: true,
        }
    }
}

impl ListFlags {
    pub fn parse(args: Vec<String>) -> Result<Self, Box<dyn Error>> {
        let mut flags = ListFlags::default();
        let mut parser = ArgParser::new(args, "list");
        while let Some(arg) = parser.next() {
            match arg.as_str() {
                "-s" | "--search" => flags.search = parser.extract_value(&arg)?,
                "-t" | "--tag" => flags.tag = Some(parser.extract_value(&arg)?),
                "--sort" => {
                    flags.sort_field =
                        SortField::parse(&parser.extract_value(&arg)?)?
                }
                "--asc" => flags.ascending = true,
                "--desc" => flags.ascending = false,
                "--absolute" => flags.relative_time = false,
                other if other.starts_with('-') => {
                    return Err(format!("Unknown flag for list: {other}").into());
                }
                // A bare word is shorthand for --search.
                other => flags.search = other.to_string(),
            }
        }
        Ok(flags)
    }
}

/// Split `-t/--tag <tag>` pairs from positional arguments.
pub fn split_tags(
    args: Vec<String>,
    command_name: &str,
) -> Result<(Vec<String>, Vec<String>), Box<dyn Error>> {
    let mut tags = Vec::new();
    let mut rest = Vec::new();
    let mut parser = ArgParser::new(args, command_name);
    while let Some(arg) = parser.next() {
        match arg.as_str() {
            "-t" | "--tag" => tags.push(parser.extract_value(&arg)?),
            _ => rest.push(arg),
        }
    }
    Ok((tags, rest))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_list_flags_default() {
        let flags = ListFlags::parse(Vec::new()).unwrap();
        assert_eq!(flags.sort_field, SortField::Name);
        assert!(flags.ascending);
        assert!(flags.search.is_empty());
        assert!(flags.tag.is_none());
    }

    #[test]
    fn test_list_flags_parse_all() {
        let flags = ListFlags::parse(args(&[
            "-s", "draft", "-t", "work", "--sort", "size", "--desc",
        ]))
        .unwrap();
        assert_eq!(flags.search, "draft");
        assert_eq!(flags.tag.as_deref(), Some("work"));
        assert_eq!(flags.sort_field, SortField::Size);
        assert!(!flags.ascending);
    }

    #[test]
    fn test_list_flags_errors() {
        assert!(ListFlags::parse(args(&["--sort"])).is_err());
        assert!(ListFlags::parse(args(&["--sort", "color"])).is_err());
        assert!(ListFlags::parse(args(&["--bogus"])).is_err());
    }

    #[test]
    fn test_split_tags() {
        let (tags, rest) =
            split_tags(args(&["Plan", "-t", "work", "--tag", "#x"]), "new")
                .unwrap();
        assert_eq!(tags, vec!["work", "#x"]);
        assert_eq!(rest, vec!["Plan"]);
        assert!(split_tags(args(&["-t"]), "new").is_err());
    }

    #[test]
    fn test_require_names_command() {
        let mut parser = ArgParser::new(Vec::new(), "rename");
        let err = parser.require("the new name").unwrap_err();
        assert!(err.to_string().contains("rename"));
    }
}
