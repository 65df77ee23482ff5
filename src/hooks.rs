//! Lifecycle hooks
//!
//! A CLI runs `init` after global option parsing, `empty_line` when no
//! subcommand token remains, and `fini` before returning its outcome.
//! Every hook has a default; override only what the tool needs.

use async_trait::async_trait;

use crate::cli::Cli;
use crate::error::{CmdlnError, CmdlnResult};
use crate::options::ParsedOptions;

/// Result of the init hook
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitOutcome {
    /// Proceed to dispatch
    Continue,
    /// Already handled (help, version); succeed without dispatching
    Stop,
}

#[async_trait]
pub trait Hooks: Send + Sync {
    /// Runs with the parsed global options. Returning an error aborts the
    /// invocation with that error.
    async fn init(
        &self,
        cli: &Cli,
        opts: &ParsedOptions,
        args: &[String],
    ) -> CmdlnResult<InitOutcome> {
        cli.default_init(opts, args)
    }

    /// Runs when no subcommand was given
    async fn empty_line(&self, cli: &Cli) -> CmdlnResult<()> {
        cli.default_empty_line()
    }

    /// Runs last. The returned error replaces the invocation's error.
    async fn fini(
        &self,
        _cli: &Cli,
        _subcmd: Option<&str>,
        error: Option<CmdlnError>,
    ) -> Option<CmdlnError> {
        error
    }
}

/// Hooks with every default
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultHooks;

impl Hooks for DefaultHooks {}
