//! Error Types
//!
//! The error taxonomy reported by a CLI invocation, plus the construction-time
//! errors raised while building a command registry.

use std::error::Error as StdError;
use thiserror::Error;

/// Result type for command handlers, hooks and help rendering
pub type CmdlnResult<T> = Result<T, CmdlnError>;

/// Boxed cause carried by option errors
pub type BoxedCause = Box<dyn StdError + Send + Sync + 'static>;

/// Default exit status for any reported error
pub const DEFAULT_EXIT_STATUS: i32 = 1;

/// Classification of a [`CmdlnError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Global or subcommand option parsing failed
    Option,
    /// A token did not resolve via the alias table
    UnknownCommand,
    /// No positional arguments were given
    NoCommand,
    /// Help was requested for a subcommand that declares none
    NoHelp,
    /// Wrong argument count or shape for a recognized subcommand
    Usage,
    /// Any other error reported by a handler or hook
    Handler,
}

/// Errors reported through the lifecycle of a CLI invocation
#[derive(Error, Debug)]
pub enum CmdlnError {
    /// Option parsing failed
    #[error("{message}")]
    Option {
        message: String,
        /// Subcommand whose option spec rejected the input, `None` for global options
        subcmd: Option<String>,
        err_help: Option<String>,
        #[source]
        cause: Option<BoxedCause>,
    },

    /// Unknown command token
    #[error("unknown command: \"{command}\"")]
    UnknownCommand {
        command: String,
        suggestions: Vec<String>,
    },

    /// Nothing to dispatch
    #[error("no command given")]
    NoCommand,

    /// No help declared for a subcommand
    #[error("no help for \"{command}\"")]
    NoHelp { command: String },

    /// Handler-raised usage error
    #[error("{message}")]
    Usage {
        message: String,
        err_help: Option<String>,
    },

    /// Handler error with an explicit code and exit status
    #[error("{message}")]
    Failed {
        message: String,
        code: Option<String>,
        exit_status: i32,
    },

    /// Arbitrary handler error
    #[error(transparent)]
    Handler(#[from] anyhow::Error),
}

impl CmdlnError {
    /// Create an option error
    pub fn option<S: Into<String>>(message: S, subcmd: Option<String>) -> Self {
        Self::Option {
            message: message.into(),
            subcmd,
            err_help: None,
            cause: None,
        }
    }

    /// Create an option error wrapping the parser's own error
    pub fn option_with_cause<S, E>(message: S, subcmd: Option<String>, cause: E) -> Self
    where
        S: Into<String>,
        E: StdError + Send + Sync + 'static,
    {
        Self::Option {
            message: message.into(),
            subcmd,
            err_help: None,
            cause: Some(Box::new(cause)),
        }
    }

    /// Create an unknown command error
    pub fn unknown_command<S: Into<String>>(command: S, suggestions: Vec<String>) -> Self {
        Self::UnknownCommand {
            command: command.into(),
            suggestions,
        }
    }

    /// Create a no command error
    pub fn no_command() -> Self {
        Self::NoCommand
    }

    /// Create a no help error
    pub fn no_help<S: Into<String>>(command: S) -> Self {
        Self::NoHelp { command: command.into() }
    }

    /// Create a usage error; the dispatcher fills in the subcommand's usage
    pub fn usage<S: Into<String>>(message: S) -> Self {
        Self::Usage {
            message: message.into(),
            err_help: None,
        }
    }

    /// Create a handler error with an explicit exit status
    pub fn failed<S: Into<String>>(message: S, exit_status: i32) -> Self {
        Self::Failed {
            message: message.into(),
            code: None,
            exit_status,
        }
    }

    /// Attach a CamelCase code to a `Failed` error
    pub fn with_code<S: Into<String>>(mut self, new_code: S) -> Self {
        if let Self::Failed { code, .. } = &mut self {
            *code = Some(new_code.into());
        }
        self
    }

    /// Attach error help text (usage lines printed after the error message).
    /// Only option and usage errors carry error help.
    pub fn with_err_help<S: Into<String>>(mut self, help: S) -> Self {
        match &mut self {
            Self::Option { err_help, .. } | Self::Usage { err_help, .. } => {
                *err_help = Some(help.into());
            }
            _ => {}
        }
        self
    }

    /// Whether this error accepts error help and has none yet
    pub fn lacks_err_help(&self) -> bool {
        matches!(
            self,
            Self::Option { err_help: None, .. } | Self::Usage { err_help: None, .. }
        )
    }

    /// Get the error kind
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Option { .. } => ErrorKind::Option,
            Self::UnknownCommand { .. } => ErrorKind::UnknownCommand,
            Self::NoCommand => ErrorKind::NoCommand,
            Self::NoHelp { .. } => ErrorKind::NoHelp,
            Self::Usage { .. } => ErrorKind::Usage,
            Self::Failed { .. } | Self::Handler(_) => ErrorKind::Handler,
        }
    }

    /// CamelCase code shown by the runner with `show_code`
    pub fn code(&self) -> Option<&str> {
        match self {
            Self::Option { .. } => Some("Option"),
            Self::UnknownCommand { .. } => Some("UnknownCommand"),
            Self::NoCommand => Some("NoCommand"),
            Self::NoHelp { .. } => Some("NoHelp"),
            Self::Usage { .. } => Some("Usage"),
            Self::Failed { code, .. } => code.as_deref(),
            Self::Handler(_) => None,
        }
    }

    /// Process exit status for this error
    pub fn exit_status(&self) -> i32 {
        match self {
            Self::Failed { exit_status, .. } => *exit_status,
            _ => DEFAULT_EXIT_STATUS,
        }
    }

    /// Subcommand an option error is tagged with
    pub fn subcmd(&self) -> Option<&str> {
        match self {
            Self::Option { subcmd, .. } => subcmd.as_deref(),
            _ => None,
        }
    }

    /// Error help printed after the error line
    pub fn err_help(&self) -> Option<String> {
        match self {
            Self::Option { err_help, .. } | Self::Usage { err_help, .. } => err_help.clone(),
            Self::UnknownCommand { suggestions, .. } if !suggestions.is_empty() => {
                Some(suggestion_block(suggestions))
            }
            _ => None,
        }
    }

    /// Check if the error was generated by the framework rather than a handler
    pub fn is_internal(&self) -> bool {
        matches!(
            self,
            Self::Option { .. } | Self::UnknownCommand { .. } | Self::NoCommand | Self::NoHelp { .. }
        )
    }

    /// Full diagnostic trace: the message followed by its cause chain
    pub fn trace(&self) -> String {
        if let Self::Handler(inner) = self {
            return format!("{:?}", inner);
        }
        let mut trace = format!("{:?}: {}", self.kind(), self);
        let mut source = self.source();
        while let Some(cause) = source {
            trace.push_str(&format!("\n    caused by: {}", cause));
            source = cause.source();
        }
        trace
    }
}

fn suggestion_block(suggestions: &[String]) -> String {
    let header = if suggestions.len() == 1 {
        "Did you mean this?"
    } else {
        "Did you mean one of these?"
    };
    let mut block = header.to_string();
    for suggestion in suggestions {
        block.push_str("\n    ");
        block.push_str(suggestion);
    }
    block
}

/// Construction-time registry errors. These are fatal.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// Two subcommands registered with the same canonical name
    #[error("duplicate subcommand: \"{name}\"")]
    DuplicateCommand { name: String },

    /// An alias already maps to another subcommand
    #[error("alias \"{alias}\" of \"{command}\" already maps to \"{existing}\"")]
    AliasCollision {
        alias: String,
        command: String,
        existing: String,
    },

    /// Empty or whitespace-containing subcommand name or alias
    #[error("invalid subcommand name: \"{name}\"")]
    InvalidName { name: String },

    /// A help group lists a subcommand that is not registered
    #[error("help group lists unknown subcommand: \"{name}\"")]
    UnknownGroupCommand { name: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(CmdlnError::option("boom", None).code(), Some("Option"));
        assert_eq!(
            CmdlnError::unknown_command("foo", vec![]).code(),
            Some("UnknownCommand")
        );
        assert_eq!(CmdlnError::no_command().code(), Some("NoCommand"));
        assert_eq!(CmdlnError::no_help("x").code(), Some("NoHelp"));
        assert_eq!(CmdlnError::usage("bad").code(), Some("Usage"));
        assert_eq!(CmdlnError::from(anyhow::anyhow!("oops")).code(), None);
    }

    #[test]
    fn test_error_display() {
        assert_eq!(
            CmdlnError::unknown_command("dance", vec![]).to_string(),
            "unknown command: \"dance\""
        );
        assert_eq!(CmdlnError::no_command().to_string(), "no command given");
        assert_eq!(CmdlnError::no_help("see").to_string(), "no help for \"see\"");
    }

    #[test]
    fn test_exit_status() {
        assert_eq!(CmdlnError::no_command().exit_status(), 1);
        assert_eq!(CmdlnError::usage("x").exit_status(), 1);
        assert_eq!(CmdlnError::failed("partial", 3).exit_status(), 3);
        assert_eq!(CmdlnError::from(anyhow::anyhow!("oops")).exit_status(), 1);
    }

    #[test]
    fn test_error_classification() {
        assert!(CmdlnError::no_command().is_internal());
        assert!(CmdlnError::option("x", Some("crush".into())).is_internal());
        assert!(!CmdlnError::usage("x").is_internal());
        assert_eq!(CmdlnError::usage("x").kind(), ErrorKind::Usage);
        assert_eq!(CmdlnError::failed("x", 2).kind(), ErrorKind::Handler);
    }

    #[test]
    fn test_err_help_attachment() {
        let err = CmdlnError::usage("incorrect number of args");
        assert!(err.lacks_err_help());
        let err = err.with_err_help("usage:\n    t a x y");
        assert!(!err.lacks_err_help());
        assert_eq!(err.err_help().as_deref(), Some("usage:\n    t a x y"));

        // Not every error carries help
        let err = CmdlnError::no_command().with_err_help("ignored");
        assert!(err.err_help().is_none());
    }

    #[test]
    fn test_suggestion_help() {
        let one = CmdlnError::unknown_command("abd", vec!["abc".to_string()]);
        assert_eq!(one.err_help().unwrap(), "Did you mean this?\n    abc");

        let many = CmdlnError::unknown_command("se", vec!["see".to_string(), "sea".to_string()]);
        assert!(many.err_help().unwrap().starts_with("Did you mean one of these?"));

        let none = CmdlnError::unknown_command("zzz", vec![]);
        assert!(none.err_help().is_none());
    }

    #[test]
    fn test_trace_includes_cause() {
        let cause = std::io::Error::new(std::io::ErrorKind::Other, "underlying");
        let err = CmdlnError::option_with_cause("unknown option: \"-q\"", None, cause);
        let trace = err.trace();
        assert!(trace.contains("unknown option"));
        assert!(trace.contains("caused by: underlying"));
    }

    #[test]
    fn test_failed_with_code() {
        let err = CmdlnError::failed("not found", 4).with_code("NotFound");
        assert_eq!(err.code(), Some("NotFound"));
        assert_eq!(err.exit_status(), 4);
    }

    #[test]
    fn test_registry_error_display() {
        let err = RegistryError::AliasCollision {
            alias: "s".into(),
            command: "see".into(),
            existing: "smash".into(),
        };
        assert_eq!(err.to_string(), "alias \"s\" of \"see\" already maps to \"smash\"");
    }
}
