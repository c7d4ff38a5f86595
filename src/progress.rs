//! Progress observers for long inserts.

use std::io::IsTerminal;

use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

/// Notified every N written records per table, and once at the end.
pub trait Progress {
    fn advance(&mut self, table: &str, written: u64);

    fn finish(&mut self, _table: &str, _written: u64) {}
}

impl<F: FnMut(&str, u64)> Progress for F {
    fn advance(&mut self, table: &str, written: u64) {
        self(table, written)
    }
}

pub struct NoProgress;

impl Progress for NoProgress {
    fn advance(&mut self, _table: &str, _written: u64) {}
}

pub struct LogProgress;

impl Progress for LogProgress {
    fn advance(&mut self, table: &str, written: u64) {
        info!("{}: {} rows written", table, written);
    }

    fn finish(&mut self, table: &str, written: u64) {
        info!("{}: done, {} rows", table, written);
    }
}

pub struct BarProgress {
    bar: ProgressBar,
}

impl BarProgress {
    pub fn new() -> Self {
        BarProgress { bar: spinner() }
    }
}

fn spinner() -> ProgressBar {
    let bar = ProgressBar::new_spinner();
    if let Ok(style) =
        ProgressStyle::default_spinner().template("{spinner:.green} [{elapsed_precise}] {msg} {pos} rows ({per_sec})")
    {
        bar.set_style(style);
    }
    bar
}

impl Default for BarProgress {
    fn default() -> Self {
        Self::new()
    }
}

impl Progress for BarProgress {
    fn advance(&mut self, table: &str, written: u64) {
        self.bar.set_message(table.to_string());
        self.bar.set_position(written);
    }

    fn finish(&mut self, table: &str, written: u64) {
        self.bar.finish_and_clear();
        info!("{}: {} rows", table, written);
        self.bar = spinner();
    }
}

/// A spinner on an interactive terminal, log lines otherwise.
pub fn for_stderr() -> Box<dyn Progress> {
    if std::io::stderr().is_terminal() {
        Box::new(BarProgress::new())
    } else {
        Box::new(LogProgress)
    }
}
