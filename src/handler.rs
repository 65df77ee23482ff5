//! Subcommand handlers
//!
//! A handler receives a [`CommandContext`] and completes exactly once by
//! returning. Plain functions and closures taking `&CommandContext` are
//! handlers; types needing to await implement [`Handler`] directly.

use async_trait::async_trait;

use crate::context::CommandContext;
use crate::error::CmdlnResult;

#[async_trait]
pub trait Handler: Send + Sync {
    async fn call(&self, cx: &CommandContext<'_>) -> CmdlnResult<()>;
}

#[async_trait]
impl<F> Handler for F
where
    F: Fn(&CommandContext<'_>) -> CmdlnResult<()> + Send + Sync,
{
    async fn call(&self, cx: &CommandContext<'_>) -> CmdlnResult<()> {
        self(cx)
    }
}

/// The built-in `help` subcommand: `help [COMMAND...]`
pub struct HelpHandler;

#[async_trait]
impl Handler for HelpHandler {
    async fn call(&self, cx: &CommandContext<'_>) -> CmdlnResult<()> {
        cx.cli().help_command(cx.args())
    }
}
