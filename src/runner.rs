//! Process wrapper
//!
//! Runs a [`Cli`] for the current process: reports a failed invocation on
//! stderr as `<tool>[ <path>]: error[ (<Code>)]: <message>` followed by any
//! error help, and turns the outcome into an exit status.

use std::env;
use std::process::{self, ExitCode};

use anyhow::{Context, Result};
use log::{debug, error};
use serde::{Deserialize, Serialize};

use crate::cli::Cli;
use crate::error::{CmdlnError, ErrorKind};

/// How the process ends after the invocation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Finale {
    /// Return the status to `main`, letting destructors and pending output finish
    #[default]
    SoftExit,
    /// Call `std::process::exit` immediately
    Exit,
}

/// Error reporting and exit options
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MainOptions {
    /// Append ` (<Code>)` after `error`
    pub show_code: bool,
    /// Report the full error trace instead of the message
    pub show_err_stack: bool,
    /// Also report `NoCommand`; off by default since help was already printed
    pub show_no_command_err: bool,
    pub finale: Finale,
}

/// Format an error report line plus any error help
pub fn format_error(cli: &Cli, path: &[String], err: &CmdlnError, options: &MainOptions) -> String {
    let mut prefix = cli.name().to_string();
    if !path.is_empty() {
        prefix.push(' ');
        prefix.push_str(&path.join(" "));
    }

    let code = match (options.show_code, err.code()) {
        (true, Some(code)) => format!(" ({})", code),
        _ => String::new(),
    };
    let message = if options.show_err_stack || cli.show_err_stack() {
        err.trace()
    } else {
        err.to_string()
    };

    let mut report = format!("{}: error{}: {}", prefix, code, message);
    if let Some(help) = err.err_help() {
        report.push('\n');
        report.push_str(&help);
    }
    report
}

/// Run one invocation, report any error on the CLI's console and return
/// `(exit status, resolved command path)`
pub async fn main(cli: &mut Cli, argv: Vec<String>, options: &MainOptions) -> (i32, Vec<String>) {
    let outcome = cli.main(argv).await;
    let status = outcome.exit_status();

    if let Some(err) = &outcome.error {
        let quiet = err.kind() == ErrorKind::NoCommand && !options.show_no_command_err;
        if !quiet {
            let report = format_error(cli, &outcome.path, err, options);
            cli.console().eprintln(&report);
        }
    }

    debug!("{}: exit status {} (path {:?})", cli.name(), status, outcome.path);
    (status, outcome.path)
}

/// Convert an exit status according to the finale
pub fn finish(status: i32, finale: Finale) -> ExitCode {
    match finale {
        Finale::Exit => process::exit(status),
        Finale::SoftExit => ExitCode::from(u8::try_from(status).unwrap_or(1)),
    }
}

/// Run `cli` with the process arguments on a single-threaded runtime
pub fn run(mut cli: Cli, options: &MainOptions) -> ExitCode {
    let argv: Vec<String> = env::args().skip(1).collect();
    match block_on_main(&mut cli, argv, options) {
        Ok(status) => finish(status, options.finale),
        Err(e) => {
            error!("{}: {:#}", cli.name(), e);
            cli.console().eprintln(&format!("{}: error: {:#}", cli.name(), e));
            finish(1, options.finale)
        }
    }
}

fn block_on_main(cli: &mut Cli, argv: Vec<String>, options: &MainOptions) -> Result<i32> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to create async runtime")?;
    let (status, _path) = runtime.block_on(main(cli, argv, options));
    Ok(status)
}
