//! Declarative option specs and the clap-backed option parser
//!
//! Option specs are plain data. At parse time they are translated into a
//! dynamically built `clap::Command`, the raw arguments are parsed, and the
//! resulting `ArgMatches` are converted into a [`ParsedOptions`] value holding
//! option values plus the leftover positional arguments.

use std::collections::HashMap;

use clap::error::{ContextKind, ContextValue, ErrorKind};
use clap::{value_parser, Arg, ArgAction, ArgMatches, ColorChoice, Command};
use log::trace;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::help::{wrap_text, HelpOptions};

/// Internal id of the positional catch-all argument
const ARGS_ID: &str = "\u{0}args";

/// Value type of an option
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OptionType {
    Bool,
    String,
    ArrayOfString,
    Integer,
}

/// A single option declaration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionSpec {
    /// Option names. One-character names are short flags, longer names long flags.
    pub names: Vec<String>,

    #[serde(rename = "type")]
    pub kind: OptionType,

    #[serde(default)]
    pub help: Option<String>,

    /// Placeholder for the option value in help output (default `ARG`)
    #[serde(default)]
    pub help_arg: Option<String>,

    #[serde(default)]
    pub default: Option<String>,

    #[serde(default)]
    pub hidden: bool,
}

impl OptionSpec {
    fn new(names: &[&str], kind: OptionType) -> Self {
        Self {
            names: names.iter().map(|n| n.to_string()).collect(),
            kind,
            help: None,
            help_arg: None,
            default: None,
            hidden: false,
        }
    }

    /// Boolean flag
    pub fn bool(names: &[&str]) -> Self {
        Self::new(names, OptionType::Bool)
    }

    /// Option taking a single string value
    pub fn string(names: &[&str]) -> Self {
        Self::new(names, OptionType::String)
    }

    /// Repeatable option collecting string values
    pub fn array_of_string(names: &[&str]) -> Self {
        Self::new(names, OptionType::ArrayOfString)
    }

    /// Option taking an integer value
    pub fn integer(names: &[&str]) -> Self {
        Self::new(names, OptionType::Integer)
    }

    /// The standard `-h, --help` option
    pub fn help_flag() -> Self {
        Self::bool(&["help", "h"]).help("Show this help message and exit.")
    }

    pub fn help<S: Into<String>>(mut self, help: S) -> Self {
        self.help = Some(help.into());
        self
    }

    pub fn help_arg<S: Into<String>>(mut self, help_arg: S) -> Self {
        self.help_arg = Some(help_arg.into());
        self
    }

    pub fn default_value<S: Into<String>>(mut self, default: S) -> Self {
        self.default = Some(default.into());
        self
    }

    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }

    /// Primary name, used as the clap argument id
    pub fn key(&self) -> &str {
        self.names.first().map(String::as_str).unwrap_or("")
    }

    fn takes_value(&self) -> bool {
        self.kind != OptionType::Bool
    }

    fn value_name(&self) -> &str {
        self.help_arg.as_deref().unwrap_or("ARG")
    }

    fn shorts(&self) -> impl Iterator<Item = char> + '_ {
        self.names.iter().filter_map(|name| {
            let mut chars = name.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => Some(c),
                _ => None,
            }
        })
    }

    fn longs(&self) -> impl Iterator<Item = &str> + '_ {
        self.names
            .iter()
            .filter(|name| name.chars().count() > 1)
            .map(String::as_str)
    }

    /// Help label, e.g. `-w WEAPON, --weapon=WEAPON`
    pub fn label(&self) -> String {
        let mut parts = Vec::new();
        for short in self.shorts() {
            if self.takes_value() {
                parts.push(format!("-{} {}", short, self.value_name()));
            } else {
                parts.push(format!("-{}", short));
            }
        }
        for long in self.longs() {
            if self.takes_value() {
                parts.push(format!("--{}={}", long, self.value_name()));
            } else {
                parts.push(format!("--{}", long));
            }
        }
        parts.join(", ")
    }

    /// Synopsis fragment, e.g. `[ --file=FILE | -f FILE ]`
    pub fn synopsis(&self) -> String {
        let mut parts = Vec::new();
        for long in self.longs() {
            if self.takes_value() {
                parts.push(format!("--{}={}", long, self.value_name()));
            } else {
                parts.push(format!("--{}", long));
            }
        }
        for short in self.shorts() {
            if self.takes_value() {
                parts.push(format!("-{} {}", short, self.value_name()));
            } else {
                parts.push(format!("-{}", short));
            }
        }
        format!("[ {} ]", parts.join(" | "))
    }

    fn to_arg(&self) -> Arg {
        let mut arg = Arg::new(self.key().to_string());

        for (i, long) in self.longs().enumerate() {
            arg = if i == 0 {
                arg.long(long.to_string())
            } else {
                arg.alias(long.to_string())
            };
        }
        for (i, short) in self.shorts().enumerate() {
            arg = if i == 0 { arg.short(short) } else { arg.short_alias(short) };
        }

        arg = match self.kind {
            OptionType::Bool => arg.action(ArgAction::SetTrue),
            OptionType::String => arg
                .action(ArgAction::Set)
                .value_name(self.value_name().to_string())
                .value_parser(value_parser!(String)),
            OptionType::ArrayOfString => arg
                .action(ArgAction::Append)
                .value_name(self.value_name().to_string())
                .value_parser(value_parser!(String)),
            OptionType::Integer => arg
                .action(ArgAction::Set)
                .value_name(self.value_name().to_string())
                .value_parser(value_parser!(i64)),
        };

        if self.takes_value() {
            // The next token is the value, even when it looks like an option
            arg = arg.allow_hyphen_values(true);
        }
        if let (true, Some(default)) = (self.takes_value(), &self.default) {
            arg = arg.default_value(default.clone());
        }
        arg
    }

    /// Whether a name as clap renders it (`--weapon`, `-w`) belongs to this option
    fn answers_to(&self, rendered: &str) -> bool {
        match rendered.strip_prefix("--") {
            Some(long) => self.longs().any(|name| name == long),
            None => {
                let mut chars = rendered.strip_prefix('-').unwrap_or_default().chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => self.shorts().any(|short| short == c),
                    _ => false,
                }
            }
        }
    }

    /// This option's spelling in a raw token: `--long`, `--long=value`,
    /// `-s` or `-svalue`
    fn spelling_in(&self, token: &str) -> Option<String> {
        if let Some(long) = token.strip_prefix("--") {
            let name = long.split('=').next().unwrap_or_default();
            return self
                .longs()
                .any(|candidate| candidate == name)
                .then(|| format!("--{}", name));
        }
        let short = token.strip_prefix('-')?.chars().next()?;
        self.shorts()
            .any(|candidate| candidate == short)
            .then(|| format!("-{}", short))
    }

    fn extract(&self, matches: &ArgMatches) -> Option<OptionValue> {
        let id = self.key();
        match self.kind {
            OptionType::Bool => Some(OptionValue::Bool(matches.get_flag(id))),
            OptionType::String => matches
                .get_one::<String>(id)
                .map(|value| OptionValue::String(value.clone())),
            OptionType::ArrayOfString => matches
                .get_many::<String>(id)
                .map(|values| OptionValue::List(values.cloned().collect())),
            OptionType::Integer => matches.get_one::<i64>(id).map(|value| OptionValue::Integer(*value)),
        }
    }
}

/// A parsed option value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OptionValue {
    Bool(bool),
    String(String),
    List(Vec<String>),
    Integer(i64),
}

/// Option values plus the leftover positional arguments of one parse call
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ParsedOptions {
    values: HashMap<String, OptionValue>,
    args: Vec<String>,
}

fn normalize(name: &str) -> String {
    name.replace('_', "-")
}

impl ParsedOptions {
    /// Value of an option, looked up by any of its names.
    /// Underscores and hyphens are interchangeable.
    pub fn get(&self, name: &str) -> Option<&OptionValue> {
        self.values.get(&normalize(name))
    }

    /// Whether a boolean option was set
    pub fn get_flag(&self, name: &str) -> bool {
        matches!(self.get(name), Some(OptionValue::Bool(true)))
    }

    pub fn get_str(&self, name: &str) -> Option<&str> {
        match self.get(name) {
            Some(OptionValue::String(value)) => Some(value),
            _ => None,
        }
    }

    pub fn get_list(&self, name: &str) -> &[String] {
        match self.get(name) {
            Some(OptionValue::List(values)) => values,
            _ => &[],
        }
    }

    pub fn get_int(&self, name: &str) -> Option<i64> {
        match self.get(name) {
            Some(OptionValue::Integer(value)) => Some(*value),
            _ => None,
        }
    }

    /// Leftover positional arguments
    pub fn args(&self) -> &[String] {
        &self.args
    }
}

/// Option parsing failure
#[derive(Error, Debug)]
#[error("{message}")]
pub struct OptionParseError {
    pub message: String,
    /// The offending option token, when known
    pub token: Option<String>,
    #[source]
    pub source: clap::Error,
}

/// Parser over one option scope (global or per-subcommand)
pub struct OptionParser<'a> {
    specs: &'a [OptionSpec],
    interspersed: bool,
}

impl<'a> OptionParser<'a> {
    /// Create a parser. By default parsing is interspersed: options may follow
    /// positional arguments.
    pub fn new(specs: &'a [OptionSpec]) -> Self {
        Self {
            specs,
            interspersed: true,
        }
    }

    /// When not interspersed, the first positional argument ends option
    /// processing and every later token is left over verbatim.
    pub fn interspersed(mut self, interspersed: bool) -> Self {
        self.interspersed = interspersed;
        self
    }

    fn command(&self) -> Command {
        let mut cmd = Command::new("cmdln")
            .no_binary_name(true)
            .disable_help_flag(true)
            .disable_version_flag(true)
            .disable_help_subcommand(true)
            .args_override_self(true)
            .color(ColorChoice::Never);

        for spec in self.specs {
            cmd = cmd.arg(spec.to_arg());
        }

        let mut rest = Arg::new(ARGS_ID)
            .value_name("ARGS")
            .num_args(0..)
            .action(ArgAction::Append)
            .value_parser(value_parser!(String));
        if !self.interspersed {
            rest = rest.trailing_var_arg(true);
        }
        cmd.arg(rest)
    }

    /// Parse raw arguments
    pub fn parse(&self, argv: &[String]) -> Result<ParsedOptions, OptionParseError> {
        trace!("Parsing {:?} (interspersed={})", argv, self.interspersed);

        let matches = self
            .command()
            .try_get_matches_from(argv)
            .map_err(|err| describe_error(err, self.specs, argv))?;

        let mut values = HashMap::new();
        for spec in self.specs {
            if let Some(value) = spec.extract(&matches) {
                for name in &spec.names {
                    values.insert(normalize(name), value.clone());
                }
            }
        }

        let args = matches
            .get_many::<String>(ARGS_ID)
            .map(|values| values.cloned().collect())
            .unwrap_or_default();

        Ok(ParsedOptions { values, args })
    }
}

fn context_string(err: &clap::Error, kind: ContextKind) -> Option<String> {
    match err.get(kind) {
        Some(ContextValue::String(value)) => Some(value.clone()),
        _ => None,
    }
}

/// The option spelling the user wrote for the option clap reports as
/// `rendered`. Tokens after `--` are positional and never match.
fn typed_spelling(specs: &[OptionSpec], argv: &[String], rendered: &str) -> Option<String> {
    let spec = specs.iter().find(|spec| spec.answers_to(rendered))?;
    argv.iter()
        .take_while(|token| token.as_str() != "--")
        .filter_map(|token| spec.spelling_in(token))
        .last()
}

/// Convert a clap error into a dashdash-style message naming the offending token
fn describe_error(err: clap::Error, specs: &[OptionSpec], argv: &[String]) -> OptionParseError {
    // clap renders value-taking args by their long name, e.g. "--weapon <WEAPON>"
    let rendered = context_string(&err, ContextKind::InvalidArg)
        .map(|arg| arg.split([' ', '=']).next().unwrap_or_default().to_string());
    let typed = match err.kind() {
        ErrorKind::InvalidValue
        | ErrorKind::NoEquals
        | ErrorKind::WrongNumberOfValues
        | ErrorKind::ValueValidation => rendered
            .as_deref()
            .and_then(|rendered| typed_spelling(specs, argv, rendered)),
        _ => None,
    };
    let token = typed.or(rendered);
    let shown = token.clone().unwrap_or_default();

    let message = match err.kind() {
        ErrorKind::UnknownArgument => format!("unknown option: \"{}\"", shown),
        ErrorKind::InvalidValue | ErrorKind::NoEquals | ErrorKind::WrongNumberOfValues => {
            format!("do not have enough args for \"{}\"", shown)
        }
        ErrorKind::ValueValidation => {
            let value = context_string(&err, ContextKind::InvalidValue).unwrap_or_default();
            format!("arg for \"{}\" is not an integer: \"{}\"", shown, value)
        }
        _ => {
            let rendered = err.to_string();
            let first = rendered.lines().next().unwrap_or_default();
            first.trim_start_matches("error: ").to_string()
        }
    };

    OptionParseError {
        message,
        token,
        source: err,
    }
}

/// Render the options block: one aligned line per visible option
pub fn format_options(specs: &[OptionSpec], opts: &HelpOptions) -> String {
    let visible: Vec<&OptionSpec> = specs.iter().filter(|spec| !spec.hidden).collect();
    let indent = opts.indent_str();

    let widest = visible
        .iter()
        .map(|spec| spec.label().len())
        .max()
        .unwrap_or(0);
    let help_col = (opts.indent + widest + 2).clamp(opts.min_help_col, opts.max_help_col);
    let help_width = opts.max_col.saturating_sub(help_col).max(10);

    let mut lines = Vec::new();
    for spec in visible {
        let mut line = format!("{}{}", indent, spec.label());
        let help = spec.help.as_deref().unwrap_or("");
        if help.is_empty() {
            lines.push(line);
            continue;
        }

        let wrapped = wrap_text(help, help_width);
        let mut help_lines = wrapped.iter();
        if line.len() + 2 <= help_col {
            let pad = help_col - line.len();
            if let Some(first) = help_lines.next() {
                line.push_str(&" ".repeat(pad));
                line.push_str(first);
            }
            lines.push(line);
        } else {
            lines.push(line);
        }
        for rest in help_lines {
            lines.push(format!("{}{}", " ".repeat(help_col), rest));
        }
    }
    lines.join("\n")
}

/// Space separated synopsis of every visible option
pub fn options_synopsis(specs: &[OptionSpec]) -> Vec<String> {
    specs
        .iter()
        .filter(|spec| !spec.hidden)
        .map(OptionSpec::synopsis)
        .collect()
}
