#![deny(missing_docs)]
//! Shared logging utilities for the draftline workspace.
//!
//! This crate provides the `draft_*` logging macros used by every other crate
//! and the helpers that pick a level filter and install a test logger.

use log::LevelFilter;

/// Logs a trace-level message using the global logging facade.
#[macro_export]
macro_rules! draft_trace {
    ($($arg:tt)*) => {{
        log::trace!(target: "draftline", $($arg)*);
    }};
}

/// Logs a debug-level message using the global logging facade.
#[macro_export]
macro_rules! draft_debug {
    ($($arg:tt)*) => {{
        log::debug!(target: "draftline", $($arg)*);
    }};
}

/// Logs an info-level message using the global logging facade.
#[macro_export]
macro_rules! draft_info {
    ($($arg:tt)*) => {{
        log::info!(target: "draftline", $($arg)*);
    }};
}

/// Logs a warn-level message using the global logging facade.
#[macro_export]
macro_rules! draft_warn {
    ($($arg:tt)*) => {{
        log::warn!(target: "draftline", $($arg)*);
    }};
}

/// Logs an error-level message using the global logging facade.
#[macro_export]
macro_rules! draft_error {
    ($($arg:tt)*) => {{
        log::error!(target: "draftline", $($arg)*);
    }};
}

/// Maps a `-v` repetition count onto a level filter.
///
/// Zero keeps the default of `Warn`; every extra `v` lowers the threshold by one
/// level, saturating at `Trace`.
pub fn level_from_verbosity(verbosity: u8) -> LevelFilter {
    match verbosity {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

/// Initializes a simple terminal logger for use in tests.
///
/// This safely no-ops if another logger has already been initialized.
pub fn initialize_for_tests() {
    use simplelog::{ColorChoice, CombinedLogger, Config, TermLogger, TerminalMode};

    // Use debug level in debug builds, info in release builds.
    let level = if cfg!(debug_assertions) {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    // Ignore the error if a logger was already set by another test.
    let _ = CombinedLogger::init(vec![TermLogger::new(
        level,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )]);
}
