//! CLI definition and lifecycle
//!
//! A [`Cli`] owns its global option spec, its subcommand [`Registry`] and its
//! [`Hooks`]. [`Cli::main`] drives one invocation:
//! global option parse, `init`, then `empty_line` or dispatch, then `fini`.
//! Dispatch to a delegating entry builds the nested CLI and recurses into its
//! own `main` with the remaining arguments.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use futures::future::BoxFuture;
use log::{debug, trace};

use crate::config::CliConfig;
use crate::context::{CommandContext, ParentContext};
use crate::error::{CmdlnError, CmdlnResult, ErrorKind, RegistryError};
use crate::handler::Handler;
use crate::help::{CommandListItem, HelpOptions, HelpPage, HelpRenderer, HelpStrings};
use crate::hooks::{DefaultHooks, Hooks, InitOutcome};
use crate::options::{OptionParser, OptionSpec, ParsedOptions};
use crate::output::Console;
use crate::registry::{CliFactory, Registry, Subcommand, Target};
use crate::suggestion::{SuggestionConfig, SuggestionEngine};

/// Result of one invocation: the error (if any) and the resolved command path
#[derive(Debug)]
pub struct Outcome {
    pub error: Option<CmdlnError>,
    /// Canonical names from this CLI downwards, e.g. `["sub", "bleep"]`
    pub path: Vec<String>,
}

impl Outcome {
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }

    /// 0 on success, otherwise the error's exit status
    pub fn exit_status(&self) -> i32 {
        self.error.as_ref().map_or(0, CmdlnError::exit_status)
    }

    /// The subcommand dispatched at this level
    pub fn subcmd(&self) -> Option<&str> {
        self.path.first().map(String::as_str)
    }
}

/// Builder for a [`Cli`]
pub struct CliBuilder {
    name: String,
    desc: Option<String>,
    options: Vec<OptionSpec>,
    base: Option<Registry>,
    commands: Vec<Subcommand>,
    hooks: Arc<dyn Hooks>,
    help_opts: HelpOptions,
    strings: HelpStrings,
    help_body: Option<String>,
    help_subcmds: Option<Vec<CommandListItem>>,
    console: Console,
}

impl CliBuilder {
    pub fn new<S: Into<String>>(name: S) -> Self {
        Self {
            name: name.into(),
            desc: None,
            options: vec![OptionSpec::help_flag()],
            base: None,
            commands: Vec::new(),
            hooks: Arc::new(DefaultHooks),
            help_opts: HelpOptions::default(),
            strings: HelpStrings::default(),
            help_body: None,
            help_subcmds: None,
            console: Console::default(),
        }
    }

    pub fn desc<S: Into<String>>(mut self, desc: S) -> Self {
        self.desc = Some(desc.into());
        self
    }

    /// Replace the global options. Without `help`/`h` in the list there is
    /// no global help flag.
    pub fn options(mut self, options: Vec<OptionSpec>) -> Self {
        self.options = options;
        self
    }

    pub fn command(mut self, sub: Subcommand) -> Self {
        self.commands.push(sub);
        self
    }

    /// Shorthand for a leaf subcommand with only a description
    pub fn handler<H: Handler + 'static>(self, name: &str, desc: &str, handler: H) -> Self {
        self.command(Subcommand::new(name, handler).desc(desc))
    }

    /// Start from a base CLI's registry: base order is kept, commands with a
    /// base name replace the base entry, others are appended.
    pub fn extends(mut self, base: &Registry) -> Self {
        self.base = Some(base.clone());
        self
    }

    pub fn hooks<H: Hooks + 'static>(mut self, hooks: H) -> Self {
        self.hooks = Arc::new(hooks);
        self
    }

    /// Group the Commands section of the top-level help
    pub fn help_subcmds(mut self, items: Vec<CommandListItem>) -> Self {
        self.help_subcmds = Some(items);
        self
    }

    /// Text appended after the Commands section
    pub fn help_body<S: Into<String>>(mut self, body: S) -> Self {
        self.help_body = Some(body.into());
        self
    }

    pub fn strings(mut self, strings: HelpStrings) -> Self {
        self.strings = strings;
        self
    }

    pub fn help_options(mut self, opts: HelpOptions) -> Self {
        self.help_opts = opts;
        self
    }

    /// Apply help layout and header strings from a loaded config
    pub fn config(mut self, config: &CliConfig) -> Self {
        self.help_opts = config.help.clone();
        self.strings = config.strings.clone();
        self
    }

    pub fn console(mut self, console: Console) -> Self {
        self.console = console;
        self
    }

    pub fn build(self) -> Result<Cli, RegistryError> {
        let builder = match &self.base {
            Some(base) => Registry::extend(base),
            None => Registry::builder(),
        };
        let registry = self
            .commands
            .into_iter()
            .fold(builder, |builder, sub| builder.command(sub))
            .build()?;

        if let Some(items) = &self.help_subcmds {
            for item in items {
                if let CommandListItem::Command(name) = item {
                    if !registry.contains(name) {
                        return Err(RegistryError::UnknownGroupCommand { name: name.clone() });
                    }
                }
            }
        }

        debug!(
            "Built CLI '{}' with {} subcommands",
            self.name,
            registry.names().len()
        );

        Ok(Cli {
            name: self.name,
            desc: self.desc,
            options: self.options,
            registry,
            hooks: self.hooks,
            help_opts: self.help_opts,
            strings: self.strings,
            help_body: self.help_body,
            help_subcmds: self.help_subcmds,
            console: self.console,
            parent: None,
            opts: Arc::new(ParsedOptions::default()),
            show_err_stack: AtomicBool::new(false),
        })
    }
}

/// A command line tool: global options, subcommands, hooks and help
pub struct Cli {
    name: String,
    desc: Option<String>,
    options: Vec<OptionSpec>,
    registry: Registry,
    hooks: Arc<dyn Hooks>,
    help_opts: HelpOptions,
    strings: HelpStrings,
    help_body: Option<String>,
    help_subcmds: Option<Vec<CommandListItem>>,
    console: Console,
    parent: Option<Arc<ParentContext>>,
    /// Global options of the current invocation
    opts: Arc<ParsedOptions>,
    show_err_stack: AtomicBool,
}

impl Cli {
    pub fn builder<S: Into<String>>(name: S) -> CliBuilder {
        CliBuilder::new(name)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn desc(&self) -> Option<&str> {
        self.desc.as_deref()
    }

    pub fn options(&self) -> &[OptionSpec] {
        &self.options
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Global options parsed by the current (or last) invocation
    pub fn opts(&self) -> &ParsedOptions {
        &self.opts
    }

    /// The enclosing CLI when this one runs as a delegating entry
    pub fn parent(&self) -> Option<&ParentContext> {
        self.parent.as_deref()
    }

    pub fn console(&self) -> &Console {
        &self.console
    }

    pub fn help_options(&self) -> &HelpOptions {
        &self.help_opts
    }

    pub fn strings(&self) -> &HelpStrings {
        &self.strings
    }

    /// Whether errors should be reported with their full trace
    pub fn show_err_stack(&self) -> bool {
        self.show_err_stack.load(Ordering::Relaxed)
    }

    /// Request full error traces, typically from `init` on `--verbose`
    pub fn set_show_err_stack(&self, show: bool) {
        self.show_err_stack.store(show, Ordering::Relaxed);
    }

    fn renderer(&self) -> HelpRenderer<'_> {
        HelpRenderer::new(&self.name, &self.help_opts, &self.strings)
    }

    /// Top-level help text
    pub fn help_text(&self) -> String {
        self.renderer().top_level(&HelpPage {
            desc: self.desc.as_deref(),
            options: &self.options,
            registry: &self.registry,
            groups: self.help_subcmds.as_deref(),
            body: self.help_body.as_deref(),
        })
    }

    pub fn print_help(&self) {
        self.console.println(&self.help_text());
    }

    /// Help text for one subcommand token
    pub fn subcommand_help(&self, token: &str) -> CmdlnResult<String> {
        self.help_for_path(&[token.to_string()])
    }

    /// Help text for a command path, following delegating entries.
    /// An empty path gives the top-level help.
    pub fn help_for_path(&self, path: &[String]) -> CmdlnResult<String> {
        let Some((token, rest)) = path.split_first() else {
            return Ok(self.help_text());
        };
        let sub = self
            .registry
            .resolve(token)
            .ok_or_else(|| self.unknown_command(token))?;

        match sub.target() {
            Target::Leaf(_) => self.renderer().subcommand(sub),
            Target::Delegate(factory) => self.spawn_child(sub.name(), factory)?.help_for_path(rest),
        }
    }

    /// Print help for `args` (a command path), or the top-level help
    pub fn help_command(&self, args: &[String]) -> CmdlnResult<()> {
        let text = self.help_for_path(args)?;
        self.console.println(&text);
        Ok(())
    }

    /// Default init: a set global `help` flag prints help for the remaining
    /// arguments (`tool -h sub` is `tool help sub`) and stops.
    pub fn default_init(&self, opts: &ParsedOptions, args: &[String]) -> CmdlnResult<InitOutcome> {
        if opts.get_flag("help") {
            self.help_command(args)?;
            return Ok(InitOutcome::Stop);
        }
        Ok(InitOutcome::Continue)
    }

    /// Default empty line: print help, then fail with `NoCommand`
    pub fn default_empty_line(&self) -> CmdlnResult<()> {
        self.print_help();
        Err(CmdlnError::no_command())
    }

    fn unknown_command(&self, token: &str) -> CmdlnError {
        let mut engine = SuggestionEngine::new(SuggestionConfig::default());
        engine.update_candidates(&self.registry.suggestion_candidates());
        CmdlnError::unknown_command(token, engine.suggest_names(token))
    }

    fn spawn_child(&self, entry: &str, factory: &CliFactory) -> CmdlnResult<Cli> {
        let mut child = factory().map_err(|err| CmdlnError::from(anyhow::Error::new(err)))?;
        child.name = format!("{} {}", self.name, entry);
        child.console = self.console.clone();
        child.parent = Some(Arc::new(ParentContext::new(
            self.name.clone(),
            Arc::clone(&self.opts),
            self.parent.clone(),
        )));
        Ok(child)
    }

    /// Run one invocation. `argv` starts at the tool's first argument.
    pub fn main(&mut self, argv: Vec<String>) -> BoxFuture<'_, Outcome> {
        Box::pin(async move {
            debug!("{}: main {:?}", self.name, argv);

            let parsed = OptionParser::new(&self.options)
                .interspersed(false)
                .parse(&argv);
            let args = match parsed {
                Ok(opts) => {
                    let args = opts.args().to_vec();
                    self.opts = Arc::new(opts);
                    Ok(args)
                }
                Err(err) => {
                    debug!("{}: global option error at {:?}: {}", self.name, err.token, err.message);
                    Err(CmdlnError::option_with_cause(err.message, None, err.source))
                }
            };

            let cli: &Cli = self;
            cli.run(args).await
        })
    }

    async fn run(&self, args: CmdlnResult<Vec<String>>) -> Outcome {
        let (error, path) = match args {
            Ok(args) => self.init_and_dispatch(args).await,
            Err(err) => (Some(err), Vec::new()),
        };

        let subcmd = path.first().cloned();
        trace!("{}: fini (subcmd={:?}, error={:?})", self.name, subcmd, error.as_ref().map(ToString::to_string));
        let error = self.hooks.fini(self, subcmd.as_deref(), error).await;
        Outcome { error, path }
    }

    async fn init_and_dispatch(&self, args: Vec<String>) -> (Option<CmdlnError>, Vec<String>) {
        match self.hooks.init(self, &self.opts, &args).await {
            Ok(InitOutcome::Continue) => {}
            Ok(InitOutcome::Stop) => {
                trace!("{}: init stopped the invocation", self.name);
                return (None, Vec::new());
            }
            Err(err) => return (Some(err), Vec::new()),
        }

        match args.split_first() {
            Some((token, tail)) => self.dispatch(token, tail).await,
            None => (self.hooks.empty_line(self).await.err(), Vec::new()),
        }
    }

    async fn dispatch(&self, token: &str, tail: &[String]) -> (Option<CmdlnError>, Vec<String>) {
        let Some(sub) = self.registry.resolve(token) else {
            debug!("{}: unknown command '{}'", self.name, token);
            return (Some(self.unknown_command(token)), Vec::new());
        };
        let name = sub.name().to_string();
        debug!("{}: dispatching '{}' to '{}'", self.name, token, name);

        match sub.target() {
            Target::Leaf(handler) => {
                let error = self.call_leaf(sub, handler.as_ref(), tail).await.err();
                (error, vec![name])
            }
            Target::Delegate(factory) => {
                let mut child = match self.spawn_child(&name, factory) {
                    Ok(child) => child,
                    Err(err) => return (Some(err), vec![name]),
                };
                let outcome = child.main(tail.to_vec()).await;
                let mut path = vec![name];
                path.extend(outcome.path);
                (outcome.error, path)
            }
        }
    }

    async fn call_leaf(&self, sub: &Subcommand, handler: &dyn Handler, tail: &[String]) -> CmdlnResult<()> {
        let (opts, args) = match sub.option_specs() {
            // No option spec: every token is positional, verbatim
            None => (None, tail.to_vec()),
            Some(specs) => match OptionParser::new(specs).parse(tail) {
                Ok(parsed) => {
                    let args = parsed.args().to_vec();
                    (Some(parsed), args)
                }
                Err(err) => {
                    debug!("{} {}: option error at {:?}: {}", self.name, sub.name(), err.token, err.message);
                    let help = self.renderer().option_error_help(sub);
                    return Err(CmdlnError::option_with_cause(
                        err.message,
                        Some(sub.name().to_string()),
                        err.source,
                    )
                    .with_err_help(help));
                }
            },
        };

        let cx = CommandContext::new(self, sub.name(), opts, args);
        handler.call(&cx).await.map_err(|err| {
            if err.kind() == ErrorKind::Usage && err.lacks_err_help() {
                err.with_err_help(self.renderer().usage_error_help(sub))
            } else {
                err
            }
        })
    }
}
