// src/progress.rs

//! Progress reporting for long-running commands
//!
//! Library code reports through [`ProgressTracker`] and never draws to the
//! terminal itself. The binary picks an implementation with [`tracker`]:
//! an indicatif bar or spinner on a terminal, `tracing` lines otherwise,
//! nothing with `--quiet`.

use indicatif::ProgressBar;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProgressStyle {
    /// Counted work (files linted, resources deleted)
    #[default]
    Bar,
    /// Open-ended waits such as onboarding polls
    Spinner,
}

/// Sink for progress updates; shared across rayon workers
pub trait ProgressTracker: Send + Sync {
    fn set_message(&self, message: &str);

    fn set_length(&self, length: u64);

    fn increment(&self, amount: u64);

    /// Units of work done so far
    fn position(&self) -> u64;

    fn finish_with_message(&self, message: &str);

    fn finish_with_error(&self, message: &str);

    fn is_finished(&self) -> bool;
}

/// Position, length and finished flag shared by the non-terminal trackers
#[derive(Debug, Default)]
struct Counts {
    position: AtomicU64,
    length: AtomicU64,
    finished: AtomicBool,
}

impl Counts {
    fn with_length(length: u64) -> Self {
        Self {
            length: AtomicU64::new(length),
            ..Default::default()
        }
    }

    /// Add `amount`; returns `(before, after)`
    fn add(&self, amount: u64) -> (u64, u64) {
        let before = self.position.fetch_add(amount, Ordering::Relaxed);
        (before, before + amount)
    }

    fn finish(&self) {
        self.finished.store(true, Ordering::Relaxed);
    }
}

/// Discards everything; only counts
#[derive(Debug, Default)]
pub struct SilentProgress {
    counts: Counts,
}

impl SilentProgress {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_length(length: u64) -> Self {
        Self {
            counts: Counts::with_length(length),
        }
    }

    pub fn length(&self) -> u64 {
        self.counts.length.load(Ordering::Relaxed)
    }
}

impl ProgressTracker for SilentProgress {
    fn set_message(&self, _message: &str) {}

    fn set_length(&self, length: u64) {
        self.counts.length.store(length, Ordering::Relaxed);
    }

    fn increment(&self, amount: u64) {
        self.counts.add(amount);
    }

    fn position(&self) -> u64 {
        self.counts.position.load(Ordering::Relaxed)
    }

    fn finish_with_message(&self, _message: &str) {
        self.counts.finish();
    }

    fn finish_with_error(&self, _message: &str) {
        self.counts.finish();
    }

    fn is_finished(&self) -> bool {
        self.counts.finished.load(Ordering::Relaxed)
    }
}

/// Reports through `tracing`, one line per tenth of the work
#[derive(Debug)]
pub struct LogProgress {
    name: String,
    counts: Counts,
}

impl LogProgress {
    pub fn new(name: impl Into<String>, length: u64) -> Self {
        Self {
            name: name.into(),
            counts: Counts::with_length(length),
        }
    }
}

impl ProgressTracker for LogProgress {
    fn set_message(&self, message: &str) {
        info!("{}: {}", self.name, message);
    }

    fn set_length(&self, length: u64) {
        self.counts.length.store(length, Ordering::Relaxed);
    }

    fn increment(&self, amount: u64) {
        let (before, after) = self.counts.add(amount);
        let length = self.counts.length.load(Ordering::Relaxed);
        if length == 0 {
            return;
        }
        let step = length.div_ceil(10);
        if after / step > before / step || after == length {
            info!("{}: {}/{} ({}%)", self.name, after.min(length), length, after.min(length) * 100 / length);
        }
    }

    fn position(&self) -> u64 {
        self.counts.position.load(Ordering::Relaxed)
    }

    fn finish_with_message(&self, message: &str) {
        self.counts.finish();
        info!("{}: {}", self.name, message);
    }

    fn finish_with_error(&self, message: &str) {
        self.counts.finish();
        warn!("{}: {}", self.name, message);
    }

    fn is_finished(&self) -> bool {
        self.counts.finished.load(Ordering::Relaxed)
    }
}

/// Terminal progress backed by an indicatif bar or spinner
pub struct CliProgress {
    bar: ProgressBar,
}

impl CliProgress {
    pub fn new(message: &str, length: u64, style: ProgressStyle) -> Self {
        let bar = match style {
            ProgressStyle::Bar => {
                let bar = ProgressBar::new(length);
                if let Ok(template) = indicatif::ProgressStyle::default_bar()
                    .template("{msg} ({pos}/{len}) [{bar:40.green/dim}] {percent}%")
                {
                    bar.set_style(template.progress_chars("##-"));
                }
                bar
            }
            ProgressStyle::Spinner => {
                let bar = ProgressBar::new_spinner();
                if let Ok(template) =
                    indicatif::ProgressStyle::default_spinner().template("{spinner:.green} {msg}")
                {
                    bar.set_style(template);
                }
                bar.enable_steady_tick(Duration::from_millis(100));
                bar
            }
        };
        bar.set_message(message.to_string());
        Self { bar }
    }
}

impl ProgressTracker for CliProgress {
    fn set_message(&self, message: &str) {
        self.bar.set_message(message.to_string());
    }

    fn set_length(&self, length: u64) {
        self.bar.set_length(length);
    }

    fn increment(&self, amount: u64) {
        self.bar.inc(amount);
    }

    fn position(&self) -> u64 {
        self.bar.position()
    }

    fn finish_with_message(&self, message: &str) {
        self.bar.finish_with_message(message.to_string());
    }

    fn finish_with_error(&self, message: &str) {
        self.bar.abandon_with_message(format!("ERROR: {}", message));
    }

    fn is_finished(&self) -> bool {
        self.bar.is_finished()
    }
}

/// Pick a tracker for the current output mode
pub fn tracker(name: &str, length: u64, style: ProgressStyle, quiet: bool) -> Box<dyn ProgressTracker> {
    if quiet {
        Box::new(SilentProgress::with_length(length))
    } else if std::io::IsTerminal::is_terminal(&std::io::stderr()) {
        Box::new(CliProgress::new(name, length, style))
    } else {
        Box::new(LogProgress::new(name, length))
    }
}
