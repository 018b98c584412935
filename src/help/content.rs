use super::{HelpBook, HelpFlag, HelpTopic, Section};

pub(crate) fn book() -> HelpBook<'static> {
    HelpBook {
        title: "notedir: markdown notes, one directory each",
        usage: "notedir <command> [options]",
        topics: ALL_TOPICS,
        footer: &[
            "Use `notedir help <command>` for details, e.g. `notedir help list`.",
        ],
    }
}

const TAG_FLAG: HelpFlag<'static> = HelpFlag {
    name: "-t, --tag <tag>",
    desc: "Tag to attach or filter by; a leading # is optional.",
};

const ALL_TOPICS: &[HelpTopic<'static>] = &[
    HelpTopic {
        name: "new",
        summary: "Create a note; without a name it becomes \"Untitled N\".",
        usage: "notedir new [name] [-t tag...]",
        details: &[
            "Creates <notes>/<name>/README.md seeded with a heading. Fails when a note with that name exists.",
            "Words after the name are joined with spaces, so quoting is optional.",
        ],
        flags: &[TAG_FLAG],
        section: Section::Command,
        examples: &["notedir new Project plan -t work"],
    },
    HelpTopic {
        name: "list",
        summary: "List notes, filtered by text and tag.",
        usage: "notedir list [-s text] [-t tag] [--sort name|updated|size] [--asc|--desc]",
        details: &[
            "Text matches note names and contents, ignoring case. Sorted by name unless --sort is given.",
        ],
        flags: &[
            HelpFlag { name: "-s, --search <text>", desc: "Substring filter on name or content." },
            TAG_FLAG,
            HelpFlag { name: "--sort <field>", desc: "name|updated|size (default name)." },
            HelpFlag { name: "--asc / --desc", desc: "Sort direction (default ascending)." },
            HelpFlag { name: "--absolute", desc: "Show timestamps instead of relative ages." },
        ],
        section: Section::Command,
        examples: &["notedir list -t work", "notedir list --sort updated --desc"],
    },
    HelpTopic {
        name: "view",
        summary: "Print a note's markdown, optionally rendered.",
        usage: "notedir view <name> [--render|-r] [--plain]",
        details: &[],
        flags: &[
            HelpFlag { name: "-r, --render", desc: "Render markdown for the terminal." },
            HelpFlag { name: "--plain", desc: "Disable colors." },
        ],
        section: Section::Command,
        examples: &[],
    },
    HelpTopic {
        name: "html",
        summary: "Print a note as an HTML page using style.css.",
        usage: "notedir html <name>",
        details: &["Relative links such as screenshots resolve inside the note directory."],
        flags: &[],
        section: Section::Command,
        examples: &["notedir html Ideas > /tmp/ideas.html"],
    },
    HelpTopic {
        name: "edit",
        summary: "Open a note's README.md in $EDITOR.",
        usage: "notedir edit <name>",
        details: &[],
        flags: &[],
        section: Section::Command,
        examples: &[],
    },
    HelpTopic {
        name: "save",
        summary: "Replace a note's content with text or stdin.",
        usage: "notedir save <name> [text...]",
        details: &["Without text the new content is read from stdin."],
        flags: &[],
        section: Section::Command,
        examples: &["echo '# Ideas' | notedir save Ideas"],
    },
    HelpTopic {
        name: "rename",
        summary: "Rename a note, keeping content, tags and attachments.",
        usage: "notedir rename <old> <new>",
        details: &["Fails when <new> already exists."],
        flags: &[],
        section: Section::Command,
        examples: &[],
    },
    HelpTopic {
        name: "delete",
        summary: "Delete notes with all their attachments.",
        usage: "notedir delete <name>...",
        details: &["This cannot be undone."],
        flags: &[],
        section: Section::Command,
        examples: &[],
    },
    HelpTopic {
        name: "tag",
        summary: "Replace a note's tags; no tags clears them.",
        usage: "notedir tag <name> [tag...]",
        details: &[],
        flags: &[],
        section: Section::Command,
        examples: &["notedir tag Ideas work later"],
    },
    HelpTopic {
        name: "tags",
        summary: "Show all tags with counts, or the tags of one note.",
        usage: "notedir tags [name]",
        details: &[],
        flags: &[],
        section: Section::Command,
        examples: &[],
    },
    HelpTopic {
        name: "attach",
        summary: "Copy files into a note directory.",
        usage: "notedir attach <name> <file>...",
        details: &["Name clashes get a numeric suffix; the stored names are printed."],
        flags: &[],
        section: Section::Command,
        examples: &[],
    },
    HelpTopic {
        name: "attachments",
        summary: "List the attachments of a note.",
        usage: "notedir attachments <name>",
        details: &[],
        flags: &[],
        section: Section::Command,
        examples: &[],
    },
    HelpTopic {
        name: "screenshot",
        summary: "Capture a screenshot into a note and link it.",
        usage: "notedir screenshot <name>",
        details: &[
            "Runs screenshot_command from the config with {filename} replaced, then appends an image link to the note.",
        ],
        flags: &[],
        section: Section::Command,
        examples: &[],
    },
    HelpTopic {
        name: "config",
        summary: "Show settings, or change one and save.",
        usage: "notedir config [key value]",
        details: &["Keys: theme, screenshot_command, geometry (WxH), font_size, base_path."],
        flags: &[],
        section: Section::Command,
        examples: &["notedir config geometry 1024x768"],
    },
    HelpTopic {
        name: "path",
        summary: "Print the notes directory or a note's directory.",
        usage: "notedir path [name]",
        details: &[],
        flags: &[],
        section: Section::Command,
        examples: &[],
    },
    HelpTopic {
        name: "help",
        summary: "Show this overview or help for one command.",
        usage: "notedir help [command]",
        details: &[],
        flags: &[],
        section: Section::Command,
        examples: &[],
    },
    HelpTopic {
        name: "NOTEDIR_CONFIG",
        summary: "Config file path (default ~/.notedir.yml).",
        usage: "NOTEDIR_CONFIG",
        details: &[],
        flags: &[],
        section: Section::Environment,
        examples: &[],
    },
    HelpTopic {
        name: "NOTEDIR_DIR",
        summary: "Overrides base_path from the config.",
        usage: "NOTEDIR_DIR",
        details: &[],
        flags: &[],
        section: Section::Environment,
        examples: &[],
    },
    HelpTopic {
        name: "NOTEDIR_LOG",
        summary: "Log filter, e.g. debug or notedir=info (default warn).",
        usage: "NOTEDIR_LOG",
        details: &[],
        flags: &[],
        section: Section::Environment,
        examples: &[],
    },
    HelpTopic {
        name: "NO_COLOR",
        summary: "Disable colored output.",
        usage: "NO_COLOR",
        details: &[],
        flags: &[],
        section: Section::Environment,
        examples: &[],
    },
];
