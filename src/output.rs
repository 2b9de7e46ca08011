//! Serialized stdout/stderr writers shared across every stage thread.
//!
//! stdout carries wake-word trigger names (one per line, flushed
//! immediately); stderr carries `[LOG]` lines and, when `--debug` is set,
//! per-step probabilities. Each stream has its own lock so a log line never
//! blocks waiting for a trigger to print and vice versa.

use std::io::{self, Write};
use std::sync::Mutex;

pub struct Output {
    stdout: Mutex<io::Stdout>,
    stderr: Mutex<io::Stderr>,
}

impl Output {
    pub fn new() -> Self {
        Self {
            stdout: Mutex::new(io::stdout()),
            stderr: Mutex::new(io::stderr()),
        }
    }

    /// Emit a wake-word trigger: the model's display name, one line.
    pub fn emit_wakeword(&self, name: &str) {
        let mut out = self.stdout.lock().unwrap();
        let _ = writeln!(out, "{name}");
        let _ = out.flush();
    }

    /// A `[LOG] ...` line.
    pub fn log(&self, message: &str) {
        let mut err = self.stderr.lock().unwrap();
        let _ = writeln!(err, "[LOG] {message}");
    }

    /// A debug probability line: `<name> <probability>`.
    pub fn debug_probability(&self, name: &str, probability: f32) {
        let mut err = self.stderr.lock().unwrap();
        let _ = writeln!(err, "{name} {probability}");
    }
}

impl Default for Output {
    fn default() -> Self {
        Self::new()
    }
}
