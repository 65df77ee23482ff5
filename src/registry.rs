//! Command Registry
//!
//! Ordered table of subcommands plus the alias table used to resolve argv
//! tokens to canonical names. Registries are built once, explicitly, through
//! [`RegistryBuilder`]; a derived CLI composes its registry from a base one
//! with [`Registry::extend`].

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

use log::debug;

use crate::cli::Cli;
use crate::error::RegistryError;
use crate::handler::{Handler, HelpHandler};
use crate::options::OptionSpec;

/// Canonical name of the built-in help subcommand
pub const HELP_COMMAND: &str = "help";

/// Factory constructing a nested CLI for a delegating entry
pub type CliFactory = Arc<dyn Fn() -> Result<Cli, RegistryError> + Send + Sync>;

/// What a registry entry dispatches to
#[derive(Clone)]
pub enum Target {
    /// A single handler
    Leaf(Arc<dyn Handler>),
    /// A full nested CLI, constructed on dispatch
    Delegate(CliFactory),
}

impl fmt::Debug for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Target::Leaf(_) => f.write_str("Leaf"),
            Target::Delegate(_) => f.write_str("Delegate"),
        }
    }
}

/// Translate a handler-style name (`list_foo`) to its CLI form (`list-foo`)
pub fn cli_name(name: &str) -> String {
    name.replace('_', "-")
}

/// Translate a CLI name (`list-foo`) back to its handler-style form
pub fn handler_name(name: &str) -> String {
    name.replace('-', "_")
}

/// A registered subcommand and its metadata
#[derive(Debug, Clone)]
pub struct Subcommand {
    name: String,
    aliases: Vec<String>,
    hidden_aliases: Vec<String>,
    hidden: bool,
    desc: Option<String>,
    help: Option<String>,
    synopses: Vec<String>,
    options: Option<Vec<OptionSpec>>,
    target: Target,
}

impl Subcommand {
    fn with_target(name: &str, target: Target) -> Self {
        Self {
            name: cli_name(name),
            aliases: Vec::new(),
            hidden_aliases: Vec::new(),
            hidden: false,
            desc: None,
            help: None,
            synopses: Vec::new(),
            options: None,
            target,
        }
    }

    /// Subcommand dispatching to a handler. Underscores in `name` become hyphens.
    pub fn new<H: Handler + 'static>(name: &str, handler: H) -> Self {
        Self::with_target(name, Target::Leaf(Arc::new(handler)))
    }

    /// Subcommand dispatching to a nested CLI built by `factory`
    pub fn delegate<F>(name: &str, factory: F) -> Self
    where
        F: Fn() -> Result<Cli, RegistryError> + Send + Sync + 'static,
    {
        Self::with_target(name, Target::Delegate(Arc::new(factory)))
    }

    /// Visible alias, listed in the Commands section
    pub fn alias(mut self, alias: &str) -> Self {
        self.aliases.push(alias.to_string());
        self
    }

    pub fn aliases(mut self, aliases: &[&str]) -> Self {
        self.aliases.extend(aliases.iter().map(|a| a.to_string()));
        self
    }

    /// Alias that dispatches but is never listed
    pub fn hidden_alias(mut self, alias: &str) -> Self {
        self.hidden_aliases.push(alias.to_string());
        self
    }

    /// Dispatchable but never listed
    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }

    /// One-line description, used in the Commands listing
    pub fn desc<S: Into<String>>(mut self, desc: S) -> Self {
        self.desc = Some(desc.into());
        self
    }

    /// Help template, may use `{{name}}`, `{{cmd}}`, `{{usage}}` and `{{options}}`
    pub fn help<S: Into<String>>(mut self, help: S) -> Self {
        self.help = Some(help.into());
        self
    }

    pub fn synopsis<S: Into<String>>(mut self, synopsis: S) -> Self {
        self.synopses.push(synopsis.into());
        self
    }

    /// Declare an option spec. An empty list still turns option parsing on.
    pub fn options(mut self, options: Vec<OptionSpec>) -> Self {
        self.options = Some(options);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn visible_aliases(&self) -> &[String] {
        &self.aliases
    }

    pub fn hidden_aliases(&self) -> &[String] {
        &self.hidden_aliases
    }

    pub fn is_hidden(&self) -> bool {
        self.hidden
    }

    pub fn description(&self) -> Option<&str> {
        self.desc.as_deref()
    }

    pub fn help_template(&self) -> Option<&str> {
        self.help.as_deref()
    }

    pub fn synopses(&self) -> &[String] {
        &self.synopses
    }

    pub fn option_specs(&self) -> Option<&[OptionSpec]> {
        self.options.as_deref()
    }

    pub fn target(&self) -> &Target {
        &self.target
    }

    pub fn is_delegate(&self) -> bool {
        matches!(self.target, Target::Delegate(_))
    }

    /// Canonical name followed by every alias, visible and hidden
    fn all_names(&self) -> impl Iterator<Item = &String> {
        std::iter::once(&self.name)
            .chain(self.aliases.iter())
            .chain(self.hidden_aliases.iter())
    }
}

/// The built-in `help` entry, alias `?`
fn help_command() -> Subcommand {
    Subcommand::new(HELP_COMMAND, HelpHandler)
        .alias("?")
        .help("Help on a specific sub-command.")
}

fn valid_name(name: &str) -> bool {
    !name.is_empty() && !name.chars().any(char::is_whitespace)
}

/// Resolved subcommand table
#[derive(Debug, Clone)]
pub struct Registry {
    order: Vec<String>,
    commands: HashMap<String, Subcommand>,
    aliases: HashMap<String, String>,
}

impl Registry {
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::default()
    }

    /// Start a builder from a base registry. Registering a name the base
    /// already has replaces that entry in place; new names are appended.
    pub fn extend(base: &Registry) -> RegistryBuilder {
        RegistryBuilder {
            order: base.order.clone(),
            commands: base.commands.clone(),
            inherited: base.order.iter().cloned().collect(),
            errors: Vec::new(),
        }
    }

    /// Resolve a token (canonical name or any alias) to its entry
    pub fn resolve(&self, token: &str) -> Option<&Subcommand> {
        self.canonical(token).and_then(|name| self.commands.get(name))
    }

    /// Canonical name for a token
    pub fn canonical(&self, token: &str) -> Option<&str> {
        self.aliases.get(token).map(String::as_str)
    }

    /// Entry by canonical name
    pub fn get(&self, name: &str) -> Option<&Subcommand> {
        self.commands.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.commands.contains_key(name)
    }

    /// Canonical names in listing order
    pub fn names(&self) -> &[String] {
        &self.order
    }

    /// Entries in listing order
    pub fn iter(&self) -> impl Iterator<Item = &Subcommand> {
        self.order.iter().filter_map(|name| self.commands.get(name))
    }

    /// Entries that appear in help listings
    pub fn visible(&self) -> impl Iterator<Item = &Subcommand> {
        self.iter().filter(|sub| !sub.hidden)
    }

    /// Names offered as "did you mean" candidates: visible names and visible aliases
    pub fn suggestion_candidates(&self) -> Vec<String> {
        self.visible()
            .flat_map(|sub| std::iter::once(&sub.name).chain(sub.aliases.iter()))
            .cloned()
            .collect()
    }
}

/// Builder collecting subcommand registrations
#[derive(Default)]
pub struct RegistryBuilder {
    order: Vec<String>,
    commands: HashMap<String, Subcommand>,
    /// Base names not yet overridden by this layer
    inherited: HashSet<String>,
    errors: Vec<RegistryError>,
}

impl RegistryBuilder {
    /// Register a subcommand. Errors surface from [`build`](Self::build).
    pub fn command(mut self, sub: Subcommand) -> Self {
        let name = sub.name.clone();
        if !valid_name(&name) {
            self.errors.push(RegistryError::InvalidName { name });
            return self;
        }

        if self.commands.contains_key(&name) {
            if self.inherited.remove(&name) {
                debug!("Overriding subcommand '{}'", name);
                self.commands.insert(name, sub);
            } else {
                self.errors.push(RegistryError::DuplicateCommand { name });
            }
            return self;
        }

        debug!("Registering subcommand '{}'", name);
        self.order.push(name.clone());
        self.commands.insert(name, sub);
        self
    }

    /// Finish the registry: add the built-in help entry unless one is
    /// registered, and build the alias table.
    pub fn build(mut self) -> Result<Registry, RegistryError> {
        if let Some(err) = self.errors.into_iter().next() {
            return Err(err);
        }

        if !self.commands.contains_key(HELP_COMMAND) {
            self.order.insert(0, HELP_COMMAND.to_string());
            self.commands.insert(HELP_COMMAND.to_string(), help_command());
        }

        let mut aliases: HashMap<String, String> = HashMap::new();
        for name in &self.order {
            let Some(sub) = self.commands.get(name) else {
                continue;
            };
            for alias in sub.all_names() {
                if !valid_name(alias) {
                    return Err(RegistryError::InvalidName {
                        name: alias.clone(),
                    });
                }
                match aliases.get(alias) {
                    Some(existing) if existing != name => {
                        return Err(RegistryError::AliasCollision {
                            alias: alias.clone(),
                            command: name.clone(),
                            existing: existing.clone(),
                        });
                    }
                    _ => {
                        aliases.insert(alias.clone(), name.clone());
                    }
                }
            }
        }

        Ok(Registry {
            order: self.order,
            commands: self.commands,
            aliases,
        })
    }
}
