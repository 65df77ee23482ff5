//! Help Rendering
//!
//! Builds the top-level help page of a CLI, the help text of a single
//! subcommand (with `{{name}}`, `{{cmd}}`, `{{usage}}` and `{{options}}`
//! placeholders), and the short usage text attached to option and usage
//! errors. Rendering is pure: every function returns a `String`.

use std::collections::HashSet;
use std::fmt::Write;

use serde::{Deserialize, Serialize};

use crate::error::{CmdlnError, CmdlnResult};
use crate::options::{format_options, options_synopsis, OptionSpec};
use crate::registry::{Registry, Subcommand, Target};

/// Layout settings for help output
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HelpOptions {
    /// Indentation of listed options and commands
    pub indent: usize,
    /// Wrap column
    pub max_col: usize,
    pub min_help_col: usize,
    pub max_help_col: usize,
}

impl Default for HelpOptions {
    fn default() -> Self {
        Self {
            indent: 4,
            max_col: 80,
            min_help_col: 20,
            max_help_col: 40,
        }
    }
}

impl HelpOptions {
    pub fn indent_str(&self) -> String {
        " ".repeat(self.indent)
    }
}

/// Section header labels. A `:` is appended when rendered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HelpStrings {
    pub usage: String,
    pub options: String,
    pub commands: String,
}

impl Default for HelpStrings {
    fn default() -> Self {
        Self {
            usage: "Usage".to_string(),
            options: "Options".to_string(),
            commands: "Commands".to_string(),
        }
    }
}

/// One entry of a grouped Commands listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CommandListItem {
    /// A canonical subcommand name
    Command(String),
    /// Starts a new group. An `unmatched` group collects every command not
    /// listed elsewhere.
    Group {
        #[serde(rename = "group")]
        label: String,
        #[serde(default)]
        unmatched: bool,
    },
}

impl CommandListItem {
    pub fn command(name: &str) -> Self {
        Self::Command(name.to_string())
    }

    pub fn group(label: &str) -> Self {
        Self::Group {
            label: label.to_string(),
            unmatched: false,
        }
    }

    pub fn unmatched(label: &str) -> Self {
        Self::Group {
            label: label.to_string(),
            unmatched: true,
        }
    }
}

/// Greedy word wrap; words longer than `width` stay on their own line
pub fn wrap_text(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    for paragraph in text.lines() {
        let mut current = String::new();
        for word in paragraph.split_whitespace() {
            if !current.is_empty() && current.len() + 1 + word.len() > width {
                lines.push(std::mem::take(&mut current));
            }
            if !current.is_empty() {
                current.push(' ');
            }
            current.push_str(word);
        }
        lines.push(current);
    }
    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}

/// Wrap pre-split words at `max_col`, continuation lines indented by `indent`
fn wrap_words(words: &[String], max_col: usize, indent: &str) -> String {
    let mut lines: Vec<String> = Vec::new();
    let mut current = String::new();
    for word in words {
        if !current.trim().is_empty() && current.len() + 1 + word.len() > max_col {
            lines.push(std::mem::take(&mut current));
            current.push_str(indent);
        } else if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }
    lines.push(current);
    lines.join("\n")
}

/// Top-level help page inputs
pub struct HelpPage<'a> {
    pub desc: Option<&'a str>,
    pub options: &'a [OptionSpec],
    pub registry: &'a Registry,
    pub groups: Option<&'a [CommandListItem]>,
    pub body: Option<&'a str>,
}

/// Renders help text for one CLI
pub struct HelpRenderer<'a> {
    name: &'a str,
    opts: &'a HelpOptions,
    strings: &'a HelpStrings,
}

impl<'a> HelpRenderer<'a> {
    pub fn new(name: &'a str, opts: &'a HelpOptions, strings: &'a HelpStrings) -> Self {
        Self { name, opts, strings }
    }

    fn substitute(&self, text: &str, cmd: &str) -> String {
        text.replace("{{name}}", self.name).replace("{{cmd}}", cmd)
    }

    /// The full top-level help page
    pub fn top_level(&self, page: &HelpPage<'_>) -> String {
        let indent = self.opts.indent_str();
        let mut out = String::new();

        if let Some(desc) = page.desc {
            out.push_str(&desc.replace("{{name}}", self.name));
            out.push('\n');
            if !desc.ends_with('\n') {
                out.push('\n');
            }
        }

        let _ = writeln!(out, "{}:", self.strings.usage);
        let _ = writeln!(out, "{}{} [OPTIONS] COMMAND [ARGS...]", indent, self.name);
        let _ = writeln!(out, "{}{} help COMMAND", indent, self.name);
        out.push('\n');

        if page.options.iter().any(|spec| !spec.hidden) {
            let _ = writeln!(out, "{}:", self.strings.options);
            let _ = writeln!(out, "{}", format_options(page.options, self.opts));
            out.push('\n');
        }

        let _ = writeln!(out, "{}:", self.strings.commands);
        out.push_str(&self.commands_block(page.registry, page.groups));

        if let Some(body) = page.body {
            out.push_str("\n\n");
            out.push_str(body);
        }

        out.trim_end().to_string()
    }

    /// One line per visible command, grouped when groups are declared
    fn commands_block(&self, registry: &Registry, groups: Option<&[CommandListItem]>) -> String {
        let Some(groups) = groups else {
            let lines: Vec<String> = registry.visible().map(|sub| self.command_line(sub)).collect();
            return lines.join("\n");
        };

        struct Section<'s> {
            label: Option<&'s str>,
            names: Vec<&'s str>,
            unmatched: bool,
        }

        // Commands listed before the first group form an implicit unlabeled one
        let mut sections = vec![Section {
            label: None,
            names: Vec::new(),
            unmatched: false,
        }];
        let mut listed: HashSet<&str> = HashSet::new();
        for item in groups {
            match item {
                CommandListItem::Command(name) => {
                    listed.insert(name.as_str());
                    if let Some(section) = sections.last_mut() {
                        section.names.push(name.as_str());
                    }
                }
                CommandListItem::Group { label, unmatched } => sections.push(Section {
                    label: Some(label.as_str()),
                    names: Vec::new(),
                    unmatched: *unmatched,
                }),
            }
        }

        let rest: Vec<&str> = registry
            .visible()
            .map(Subcommand::name)
            .filter(|name| !listed.contains(name))
            .collect();
        if !rest.is_empty() {
            match sections.iter_mut().find(|section| section.unmatched) {
                Some(section) => section.names.extend(rest),
                None => sections.insert(
                    0,
                    Section {
                        label: None,
                        names: rest,
                        unmatched: false,
                    },
                ),
            }
        }

        let label_indent = " ".repeat(self.opts.indent / 2);
        let mut blocks = Vec::new();
        for section in sections {
            let lines: Vec<String> = section
                .names
                .iter()
                .filter_map(|name| registry.get(name))
                .filter(|sub| !sub.is_hidden())
                .map(|sub| self.command_line(sub))
                .collect();
            if lines.is_empty() {
                continue;
            }
            let mut block = String::new();
            if let Some(label) = section.label.filter(|label| !label.is_empty()) {
                let _ = writeln!(block, "{}{}:", label_indent, label);
            }
            block.push_str(&lines.join("\n"));
            blocks.push(block);
        }
        blocks.join("\n\n")
    }

    fn command_line(&self, sub: &Subcommand) -> String {
        let indent = self.opts.indent_str();
        let mut names = sub.name().to_string();
        if !sub.visible_aliases().is_empty() {
            let _ = write!(names, " ({})", sub.visible_aliases().join(", "));
        }

        let summary = self.summary(sub);
        let width = self
            .opts
            .min_help_col
            .saturating_sub(self.opts.indent + 2);
        if summary.is_empty() {
            return format!("{}{}", indent, names);
        }
        if names.len() > width {
            return format!(
                "{}{}\n{}{}",
                indent,
                names,
                " ".repeat(self.opts.min_help_col),
                summary
            );
        }
        format!("{}{:<width$}  {}", indent, names, summary, width = width)
    }

    /// One-line summary of a subcommand for the Commands listing
    fn summary(&self, sub: &Subcommand) -> String {
        let first_line = sub
            .description()
            .or_else(|| sub.help_template())
            .and_then(|text| text.lines().next())
            .map(|line| self.substitute(line, sub.name()));
        if let Some(line) = first_line {
            return line;
        }

        // A nested CLI is summarized by its own description
        match sub.target() {
            Target::Delegate(factory) => factory()
                .ok()
                .and_then(|child| child.desc().and_then(|desc| desc.lines().next()).map(str::to_string))
                .unwrap_or_default(),
            Target::Leaf(_) => String::new(),
        }
    }

    /// Help text of a single subcommand
    pub fn subcommand(&self, sub: &Subcommand) -> CmdlnResult<String> {
        let Some(template) = sub.help_template() else {
            return match sub.description() {
                Some(desc) => Ok(self.substitute(desc, sub.name()).trim_end().to_string()),
                None => Err(CmdlnError::no_help(sub.name())),
            };
        };

        let mut text = self.substitute(template, sub.name());
        if text.contains("{{usage}}") {
            text = text.replace("{{usage}}", &self.usage_block(sub));
        }
        if text.contains("{{options}}") {
            text = text.replace("{{options}}", &self.options_block(sub));
        }
        Ok(text.trim_end().to_string())
    }

    fn synopsis_lines(&self, sub: &Subcommand) -> Vec<String> {
        if !sub.synopses().is_empty() {
            return sub
                .synopses()
                .iter()
                .map(|synopsis| self.substitute(synopsis, sub.name()))
                .collect();
        }
        let has_options = sub
            .option_specs()
            .map(|specs| specs.iter().any(|spec| !spec.hidden))
            .unwrap_or(false);
        if has_options {
            vec![format!("{} {} [OPTIONS] ...", self.name, sub.name())]
        } else {
            vec![format!("{} {} ...", self.name, sub.name())]
        }
    }

    /// `Usage:` header followed by one indented line per synopsis
    pub fn usage_block(&self, sub: &Subcommand) -> String {
        let indent = self.opts.indent_str();
        let mut block = format!("{}:", self.strings.usage);
        for line in self.synopsis_lines(sub) {
            let _ = write!(block, "\n{}{}", indent, line);
        }
        block
    }

    /// `Options:` header plus the formatted options, empty without options
    pub fn options_block(&self, sub: &Subcommand) -> String {
        match sub.option_specs() {
            Some(specs) if !specs.is_empty() => {
                format!("{}:\n{}", self.strings.options, format_options(specs, self.opts))
            }
            _ => String::new(),
        }
    }

    /// Error help for an option error: the option synopsis of the subcommand
    pub fn option_error_help(&self, sub: &Subcommand) -> String {
        let mut words = vec!["usage:".to_string(), self.name.to_string(), sub.name().to_string()];
        if let Some(specs) = sub.option_specs() {
            words.extend(options_synopsis(specs));
        }
        words.push("...".to_string());
        wrap_words(&words, self.opts.max_col, &self.opts.indent_str())
    }

    /// Error help for a usage error: the declared synopses
    pub fn usage_error_help(&self, sub: &Subcommand) -> String {
        if sub.synopses().is_empty() {
            return self.option_error_help(sub);
        }
        let indent = self.opts.indent_str();
        let mut help = "usage:".to_string();
        for line in self.synopsis_lines(sub) {
            let _ = write!(help, "\n{}{}", indent, line);
        }
        help
    }
}
