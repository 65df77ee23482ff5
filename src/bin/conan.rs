//! conan: what is best in life?
//!
//! Demonstration tool for the cmdln framework: custom global options, an init
//! hook handling `--version` and `--verbose`, aliases, hidden aliases and
//! per-subcommand options.

use std::env;
use std::process::ExitCode;

use async_trait::async_trait;
use log::debug;

use cmdln::logging::{init_logger, LogConfig};
use cmdln::runner;
use cmdln::{
    Cli, CliConfig, CmdlnResult, CommandContext, Handler, Hooks, InitOutcome,
    MainOptions, OptionSpec, ParsedOptions, RegistryError, Subcommand,
};

const VERSION: &str = "1.0.0";

struct ConanHooks;

#[async_trait]
impl Hooks for ConanHooks {
    async fn init(&self, cli: &Cli, opts: &ParsedOptions, args: &[String]) -> CmdlnResult<InitOutcome> {
        if let Some(setting) = opts.get_str("log-level") {
            let config = LogConfig::from_setting(setting)?;
            init_logger(config)?;
        }
        if opts.get_flag("version") {
            cli.console().println(&format!("{} {}", cli.name(), VERSION));
            return Ok(InitOutcome::Stop);
        }
        if opts.get_flag("verbose") {
            debug!("verbose: showing error traces");
            cli.set_show_err_stack(true);
        }
        // The framework handles --help
        cli.default_init(opts, args)
    }
}

fn excitement(cx: &CommandContext<'_>) -> &'static str {
    let local = cx.opts().is_some_and(|opts| opts.get_flag("x"));
    if cx.global_opts().get_flag("x") || local {
        " Yarg!"
    } else {
        ""
    }
}

struct Crush;

#[async_trait]
impl Handler for Crush {
    async fn call(&self, cx: &CommandContext<'_>) -> CmdlnResult<()> {
        if cx.wants_help() {
            return cx.print_help();
        }
        let x = excitement(cx);
        let weapon = cx
            .opts()
            .and_then(|opts| opts.get_str("weapon"))
            .unwrap_or("sword");

        if cx.args().is_empty() {
            cx.println(&format!("No enemies?{}", x));
        }
        for enemy in cx.args() {
            cx.println(&format!("Smite {} with a {}!{}", enemy, weapon, x));
        }
        Ok(())
    }
}

fn see(cx: &CommandContext<'_>) -> CmdlnResult<()> {
    let x = excitement(cx);
    if cx.args().is_empty() {
        cx.println(&format!("I see nothing.{}", x));
    }
    for arg in cx.args() {
        cx.println(&format!("I see {}.{}", arg, x));
    }
    Ok(())
}

fn hear(cx: &CommandContext<'_>) -> CmdlnResult<()> {
    cx.println(&format!("I hear {}.", cx.args().join(" ")));
    Ok(())
}

fn build_cli(config: &CliConfig) -> Result<Cli, RegistryError> {
    Cli::builder("conan")
        .desc("What is best in life?")
        .options(vec![
            OptionSpec::bool(&["help", "h"]).help("Print help and exit."),
            OptionSpec::bool(&["verbose", "v"]).help("Verbose output."),
            OptionSpec::bool(&["version"]).help("Print version and exit."),
            OptionSpec::bool(&["x"]).help("Be more excited about it."),
            OptionSpec::string(&["log-level"])
                .help_arg("LEVEL[,FORMAT]")
                .help("Enable logging, e.g. debug or trace,json.")
                .hidden(),
        ])
        .hooks(ConanHooks)
        .config(config)
        .command(
            Subcommand::new("crush", Crush)
                .alias("smash")
                .hidden_alias("pulverize")
                .options(vec![
                    OptionSpec::bool(&["help", "h"]).help("Show this help."),
                    OptionSpec::string(&["weapon", "w"])
                        .help_arg("WEAPON")
                        .default_value("sword")
                        .help("Weapon with which to smite."),
                ])
                .synopsis("{{name}} {{cmd}} [OPTIONS] [ENEMIES...]")
                .help("Crush your enemies.\n\n{{usage}}\n\n{{options}}"),
        )
        .command(
            Subcommand::new("see", see)
                .options(vec![OptionSpec::bool(&["x"]).help("Be more excited about it.")])
                .synopsis("{{name}} {{cmd}} [OPTIONS] [ENEMIES...]")
                .help("See them driven before you.\n\n{{usage}}\n\n{{options}}"),
        )
        .command(
            Subcommand::new("hear", hear)
                // Explicitly empty: option processing without options
                .options(Vec::new())
                .help("Hear the lamentation of their women."),
        )
        .build()
}

fn load_config() -> anyhow::Result<CliConfig> {
    match env::var_os("CONAN_CONFIG") {
        Some(path) => CliConfig::load_from_file(path),
        None => Ok(CliConfig::default()),
    }
}

fn main() -> ExitCode {
    let config = match load_config() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("conan: error: {:#}", e);
            return ExitCode::FAILURE;
        }
    };

    let cli = match build_cli(&config) {
        Ok(cli) => cli,
        Err(e) => {
            eprintln!("conan: error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let options: MainOptions = config.main.clone();
    runner::run(cli, &options)
}
