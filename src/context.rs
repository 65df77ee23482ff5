//! Handler invocation context

use std::sync::Arc;

use crate::cli::Cli;
use crate::error::{CmdlnError, CmdlnResult};
use crate::options::ParsedOptions;
use crate::output::Console;

/// Read-only view of an enclosing CLI, available to nested CLIs
#[derive(Debug, Clone)]
pub struct ParentContext {
    name: String,
    opts: Arc<ParsedOptions>,
    parent: Option<Arc<ParentContext>>,
}

impl ParentContext {
    pub(crate) fn new(
        name: String,
        opts: Arc<ParsedOptions>,
        parent: Option<Arc<ParentContext>>,
    ) -> Self {
        Self { name, opts, parent }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The enclosing CLI's global options
    pub fn opts(&self) -> &ParsedOptions {
        &self.opts
    }

    pub fn parent(&self) -> Option<&ParentContext> {
        self.parent.as_deref()
    }
}

/// Everything a handler receives for one dispatch
pub struct CommandContext<'a> {
    cli: &'a Cli,
    name: &'a str,
    opts: Option<ParsedOptions>,
    args: Vec<String>,
}

impl<'a> CommandContext<'a> {
    pub(crate) fn new(
        cli: &'a Cli,
        name: &'a str,
        opts: Option<ParsedOptions>,
        args: Vec<String>,
    ) -> Self {
        Self {
            cli,
            name,
            opts,
            args,
        }
    }

    pub fn cli(&self) -> &'a Cli {
        self.cli
    }

    /// Canonical subcommand name, whichever alias was typed
    pub fn name(&self) -> &str {
        self.name
    }

    /// Subcommand options; `None` when the subcommand declares no option spec
    pub fn opts(&self) -> Option<&ParsedOptions> {
        self.opts.as_ref()
    }

    /// Positional arguments after option parsing
    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// The CLI's global options from this invocation
    pub fn global_opts(&self) -> &ParsedOptions {
        self.cli.opts()
    }

    pub fn parent(&self) -> Option<&ParentContext> {
        self.cli.parent()
    }

    pub fn console(&self) -> &Console {
        self.cli.console()
    }

    pub fn println(&self, line: &str) {
        self.cli.console().println(line);
    }

    /// Whether the subcommand's own `--help` flag was given
    pub fn wants_help(&self) -> bool {
        self.opts.as_ref().is_some_and(|opts| opts.get_flag("help"))
    }

    /// Print this subcommand's help, exactly as `help <name>` would
    pub fn print_help(&self) -> CmdlnResult<()> {
        self.cli.help_command(&[self.name.to_string()])
    }

    /// A usage error; the dispatcher attaches this subcommand's synopses
    pub fn usage_error<S: Into<String>>(&self, message: S) -> CmdlnError {
        CmdlnError::usage(message)
    }
}
