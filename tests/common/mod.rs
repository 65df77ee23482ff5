// Shared fixtures for integration tests: small CLIs with captured consoles
#![allow(dead_code)]

use async_trait::async_trait;

use cmdln::runner::{self, MainOptions};
use cmdln::{
    Cli, CmdlnResult, CommandContext, CommandListItem, Console, Handler, HelpStrings, Hooks,
    InitOutcome, OptionSpec, Outcome, ParsedOptions, RegistryError, Subcommand,
};

pub fn argv(args: &str) -> Vec<String> {
    args.split_whitespace().map(str::to_string).collect()
}

/// Captured result of one run through the process wrapper
pub struct Run {
    pub status: i32,
    pub path: Vec<String>,
    pub stdout: String,
    pub stderr: String,
}

pub async fn run(mut cli: Cli, args: &str) -> Run {
    run_with(&mut cli, args, &MainOptions::default()).await
}

pub async fn run_with(cli: &mut Cli, args: &str, options: &MainOptions) -> Run {
    let (status, path) = runner::main(cli, argv(args), options).await;
    Run {
        status,
        path,
        stdout: cli.console().stdout_contents(),
        stderr: cli.console().stderr_contents(),
    }
}

pub async fn outcome(cli: &mut Cli, args: &str) -> Outcome {
    cli.main(argv(args)).await
}

// ---- conan

struct ConanHooks;

#[async_trait]
impl Hooks for ConanHooks {
    async fn init(&self, cli: &Cli, opts: &ParsedOptions, args: &[String]) -> CmdlnResult<InitOutcome> {
        if opts.get_flag("version") {
            cli.console().println(&format!("{} 1.0.0", cli.name()));
            return Ok(InitOutcome::Stop);
        }
        if opts.get_flag("verbose") {
            cli.set_show_err_stack(true);
        }
        cli.default_init(opts, args)
    }
}

fn yarg(cx: &CommandContext<'_>) -> &'static str {
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
        let weapon = cx.opts().and_then(|opts| opts.get_str("weapon")).unwrap_or("sword");
        if cx.args().is_empty() {
            cx.println(&format!("No enemies?{}", yarg(cx)));
        }
        for enemy in cx.args() {
            cx.println(&format!("Smite {} with a {}!{}", enemy, weapon, yarg(cx)));
        }
        Ok(())
    }
}

fn see(cx: &CommandContext<'_>) -> CmdlnResult<()> {
    if cx.args().is_empty() {
        cx.println(&format!("I see nothing.{}", yarg(cx)));
    }
    for arg in cx.args() {
        cx.println(&format!("I see {}.{}", arg, yarg(cx)));
    }
    Ok(())
}

fn hear(cx: &CommandContext<'_>) -> CmdlnResult<()> {
    cx.println(&format!("I hear {}.", cx.args().join(" ")));
    Ok(())
}

pub fn conan() -> Cli {
    Cli::builder("conan")
        .desc("What is best in life?")
        .options(vec![
            OptionSpec::bool(&["help", "h"]).help("Print help and exit."),
            OptionSpec::bool(&["verbose", "v"]).help("Verbose output."),
            OptionSpec::bool(&["version"]).help("Print version and exit."),
            OptionSpec::bool(&["x"]).help("Be more excited about it."),
        ])
        .hooks(ConanHooks)
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
                .help("Crush your enemies.\n\nUsage:\n     {{name}} {{cmd}} [OPTIONS] [ENEMIES...]\n\n{{options}}"),
        )
        .command(
            Subcommand::new("see", see)
                .options(vec![OptionSpec::bool(&["x"]).help("Be more excited about it.")])
                .help("See them driven before you.\n\nUsage:\n     {{name}} {{cmd}} [OPTIONS] [ENEMIES...]\n\n{{options}}"),
        )
        .command(
            Subcommand::new("hear", hear)
                .options(Vec::new())
                .help("Hear the lamentation of their women."),
        )
        .console(Console::captured())
        .build()
        .unwrap()
}

// ---- top / sub (two-level subcommands)

struct SubHooks;

#[async_trait]
impl Hooks for SubHooks {
    async fn empty_line(&self, cli: &Cli) -> CmdlnResult<()> {
        let top_verbose = cli.parent().is_some_and(|top| top.opts().get_flag("verbose"));
        cli.console().println(&format!(
            "top sub: top.opts.verbose={} sub.opts.s={}",
            top_verbose,
            cli.opts().get_flag("s")
        ));
        Ok(())
    }
}

fn bleep(cx: &CommandContext<'_>) -> CmdlnResult<()> {
    let top_verbose = cx.parent().is_some_and(|top| top.opts().get_flag("verbose"));
    let t = cx.opts().and_then(|opts| opts.get_str("t")).unwrap_or("none");
    cx.println(&format!(
        "top sub bleep: top.opts.verbose={} sub.opts.s={} opts.t={} args={:?}",
        top_verbose,
        cx.global_opts().get_flag("s"),
        t,
        cx.args()
    ));
    Ok(())
}

fn bloop(cx: &CommandContext<'_>) -> CmdlnResult<()> {
    cx.println("top sub bloop");
    Ok(())
}

pub fn sub_cli() -> Result<Cli, RegistryError> {
    Cli::builder("sub")
        .desc("sub desc")
        .options(vec![OptionSpec::bool(&["s"]).help("hiss")])
        .hooks(SubHooks)
        .command(
            Subcommand::new("bleep", bleep)
                .options(vec![OptionSpec::string(&["t"]).help_arg("<t-arg>").help("choose your t")])
                .help("sub bleep help\n\n{{options}}"),
        )
        .command(Subcommand::new("bloop", bloop).help("sub bloop help").hidden())
        .build()
}

fn blah(cx: &CommandContext<'_>) -> CmdlnResult<()> {
    cx.println(&format!("top blah: args={:?}", cx.args()));
    Ok(())
}

fn completion(cx: &CommandContext<'_>) -> CmdlnResult<()> {
    cx.println("# completion");
    Ok(())
}

pub fn top() -> Cli {
    Cli::builder("top")
        .desc("top-level CLI")
        .options(vec![OptionSpec::bool(&["verbose", "v"])])
        .command(Subcommand::new("blah", blah).help("blah help"))
        .command(Subcommand::new("completion", completion).hidden())
        .command(Subcommand::delegate("sub", sub_cli))
        .console(Console::captured())
        .build()
        .unwrap()
}

// ---- grouped help

fn say(cx: &CommandContext<'_>) -> CmdlnResult<()> {
    cx.println(&format!("Do {}.", cx.name()));
    Ok(())
}

pub fn help_subcmds() -> Cli {
    Cli::builder("hs")
        .desc("Trying out helpSubcmds")
        .command(Subcommand::new("awesome", say).help("Do awesome things.\nblah blah\n"))
        .command(Subcommand::new("in_empty_group", say).help("Do in-empty-group things.\n"))
        .command(Subcommand::new("something_else", say).help("Do something-else things.\n"))
        .help_subcmds(vec![
            CommandListItem::command("help"),
            CommandListItem::group(""),
            CommandListItem::command("in-empty-group"),
            CommandListItem::group("Most Excellent Commands"),
            CommandListItem::command("awesome"),
            CommandListItem::unmatched("Other Commands"),
        ])
        .console(Console::captured())
        .build()
        .unwrap()
}

// ---- {{cmd}} template var

pub fn cmd_template_var() -> Cli {
    Cli::builder("cmd-template-var")
        .desc("Trying out {{cmd}} template var")
        .command(Subcommand::new("awesome", say).help("Usage: {{name}} {{cmd}} ..."))
        .command(Subcommand::new("lame", say).help("Usage: {{name}} {{cmd}} ..."))
        .console(Console::captured())
        .build()
        .unwrap()
}

// ---- synopses and error help

fn abc(cx: &CommandContext<'_>) -> CmdlnResult<()> {
    if cx.wants_help() {
        return cx.print_help();
    }
    if cx.args().len() != 2 {
        return Err(cx.usage_error("incorrect number of args"));
    }
    cx.println(&format!("abc: args={:?}", cx.args()));
    Ok(())
}

pub fn synopses() -> Cli {
    Cli::builder("synopses-and-errhelp")
        .desc("Testing synopses and errHelp")
        .command(
            Subcommand::new("abc", abc)
                .synopsis("{{name}} abc [OPTIONS] arg1 arg2")
                .synopsis("{{name}} abc --list-foo")
                .help("Do some abc.\n\n{{usage}}")
                .options(vec![
                    OptionSpec::bool(&["help", "h"]).help("Show this help."),
                    OptionSpec::string(&["file", "f"]).help_arg("FILE"),
                    OptionSpec::bool(&["list-foo"]),
                ]),
        )
        .console(Console::captured())
        .build()
        .unwrap()
}

// ---- header strings

fn tea(cx: &CommandContext<'_>) -> CmdlnResult<()> {
    cx.println("blah blah");
    Ok(())
}

pub fn header_style() -> Cli {
    Cli::builder("help-header-style")
        .options(vec![OptionSpec::bool(&["verbose", "v"])])
        .strings(HelpStrings {
            usage: "USAGE".into(),
            options: "OPTIONS".into(),
            commands: "COMMANDS".into(),
        })
        .command(
            Subcommand::new("blah", tea)
                .options(vec![OptionSpec::bool(&["t"]).help("have some tea")])
                .synopsis("{{name}} {{cmd}} [-t]")
                .help("Blah blah\n\n{{usage}}\n\n{{options}}"),
        )
        .console(Console::captured())
        .build()
        .unwrap()
}

// ---- init / fini

struct InitFini;

#[async_trait]
impl Hooks for InitFini {
    async fn init(&self, cli: &Cli, opts: &ParsedOptions, args: &[String]) -> CmdlnResult<InitOutcome> {
        cli.console().println("ran init");
        cli.default_init(opts, args)
    }

    async fn fini(
        &self,
        cli: &Cli,
        subcmd: Option<&str>,
        error: Option<cmdln::CmdlnError>,
    ) -> Option<cmdln::CmdlnError> {
        cli.console().println(&format!("ran fini: {}", subcmd.unwrap_or("none")));
        error
    }
}

fn hi(cx: &CommandContext<'_>) -> CmdlnResult<()> {
    cx.println("hi");
    Ok(())
}

pub fn init_fini() -> Cli {
    Cli::builder("init-fini")
        .hooks(InitFini)
        .command(Subcommand::new("hi", hi).desc("Say hi."))
        .console(Console::captured())
        .build()
        .unwrap()
}
