//! cmdln: a framework for command line tools with subcommands
//!
//! A tool is a [`Cli`] built from global options, a registry of
//! [`Subcommand`]s (leaf handlers or nested CLIs) and optional [`Hooks`].
//! [`runner::run`] drives it for the current process.

pub mod cli;
pub mod config;
pub mod context;
pub mod error;
pub mod handler;
pub mod help;
pub mod hooks;
pub mod logging;
pub mod options;
pub mod output;
pub mod registry;
pub mod runner;
pub mod suggestion;

pub use cli::{Cli, CliBuilder, Outcome};
pub use config::CliConfig;
pub use context::{CommandContext, ParentContext};
pub use error::{CmdlnError, CmdlnResult, ErrorKind, RegistryError};
pub use handler::Handler;
pub use help::{CommandListItem, HelpOptions, HelpStrings};
pub use hooks::{DefaultHooks, Hooks, InitOutcome};
pub use options::{OptionSpec, OptionType, OptionValue, ParsedOptions};
pub use output::Console;
pub use registry::{Registry, Subcommand};
pub use runner::{Finale, MainOptions};
