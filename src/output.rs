//! Console output sink
//!
//! All framework output (help text, error reports) and handler output go
//! through a [`Console`], which writes to the process's stdout/stderr or
//! captures into in-memory buffers. Nested CLIs share their parent's console.

use std::io::{self, Write};
use std::sync::Arc;

use parking_lot::Mutex;

#[derive(Debug, Default)]
struct Captured {
    stdout: Mutex<String>,
    stderr: Mutex<String>,
}

#[derive(Debug, Clone)]
enum Sink {
    Stdio,
    Captured(Arc<Captured>),
}

/// Cloneable handle to stdout/stderr or to captured buffers
#[derive(Debug, Clone)]
pub struct Console {
    sink: Sink,
}

impl Default for Console {
    fn default() -> Self {
        Self::stdio()
    }
}

impl Console {
    /// Write to the process's standard streams
    pub fn stdio() -> Self {
        Self { sink: Sink::Stdio }
    }

    /// Capture all output in memory
    pub fn captured() -> Self {
        Self {
            sink: Sink::Captured(Arc::new(Captured::default())),
        }
    }

    pub fn print(&self, text: &str) {
        match &self.sink {
            Sink::Stdio => {
                let mut stdout = io::stdout().lock();
                // Write errors (e.g. a closed pipe) are ignored
                let _ = stdout.write_all(text.as_bytes());
                let _ = stdout.flush();
            }
            Sink::Captured(captured) => captured.stdout.lock().push_str(text),
        }
    }

    pub fn println(&self, line: &str) {
        self.print(&format!("{}\n", line));
    }

    pub fn eprint(&self, text: &str) {
        match &self.sink {
            Sink::Stdio => {
                let mut stderr = io::stderr().lock();
                let _ = stderr.write_all(text.as_bytes());
                let _ = stderr.flush();
            }
            Sink::Captured(captured) => captured.stderr.lock().push_str(text),
        }
    }

    pub fn eprintln(&self, line: &str) {
        self.eprint(&format!("{}\n", line));
    }

    /// Captured stdout; empty for a stdio console
    pub fn stdout_contents(&self) -> String {
        match &self.sink {
            Sink::Stdio => String::new(),
            Sink::Captured(captured) => captured.stdout.lock().clone(),
        }
    }

    /// Captured stderr; empty for a stdio console
    pub fn stderr_contents(&self) -> String {
        match &self.sink {
            Sink::Stdio => String::new(),
            Sink::Captured(captured) => captured.stderr.lock().clone(),
        }
    }
}
