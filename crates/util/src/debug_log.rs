//! Contains tools for debug-mode logging.
//!
//! Logging cannot be enabled when `cfg!(debug_assertions)` is false, otherwise
//! it's enabled by default. Use [debug_log_info], [debug_log_warning], and
//! [debug_log_error].

pub mod panic_on_errors;

use std::panic::Location;
#[cfg(debug_assertions)]
use std::sync::atomic::{AtomicBool, Ordering};

use time::{OffsetDateTime, format_description::well_known::Rfc3339};

/// Log some info to stdout if both `cfg!(debug_assertions)` and [enabled] are
/// true.
#[macro_export]
macro_rules! debug_log_info {
    ($($arg:tt)*) => {{
        #[cfg(debug_assertions)]
        if $crate::debug_log::enabled() {
            $crate::debug_log::write_entry(
                $crate::debug_log::Level::Info,
                &::std::format!($($arg)*),
            );
        }
    }};
}

/// Log a warning to stderr if both `cfg!(debug_assertions)` and [enabled] are
/// true.
#[macro_export]
macro_rules! debug_log_warning {
    ($($arg:tt)*) => {{
        #[cfg(debug_assertions)]
        if $crate::debug_log::enabled() {
            $crate::debug_log::write_entry(
                $crate::debug_log::Level::Warning,
                &::std::format!($($arg)*),
            );
        }
    }};
}

/// Log an error to stderr if both `cfg!(debug_assertions)` and [enabled] are
/// true. Panics afterwards if [panic_on_errors::enabled] is also true.
#[macro_export]
macro_rules! debug_log_error {
    ($($arg:tt)*) => {{
        #[cfg(debug_assertions)]
        if $crate::debug_log::enabled() {
            $crate::debug_log::write_entry(
                $crate::debug_log::Level::Error,
                &::std::format!($($arg)*),
            );

            if $crate::debug_log::panic_on_errors::enabled() {
                panic!("Panicking on error logging enabled.");
            }
        }
    }};
}

/// How serious a log entry is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Info,
    Warning,
    Error,
}

impl Level {
    fn label(self) -> &'static str {
        match self {
            Level::Info => "INFO",
            Level::Warning => "WARNING",
            Level::Error => "ERROR",
        }
    }

    fn color(self) -> &'static str {
        match self {
            Level::Info => "\x1b[35m",
            Level::Warning => "\x1b[33m",
            Level::Error => "\x1b[31m",
        }
    }
}

/// Whether logging is enabled or not.
///
/// Logging cannot be enabled when `cfg!(debug_assertions)` is false, otherwise
/// it's enabled by default.
#[inline(always)]
pub fn enabled() -> bool {
    #[cfg(not(debug_assertions))]
    #[inline(always)]
    fn enabled_impl() -> bool {
        false
    }

    #[cfg(debug_assertions)]
    #[inline(always)]
    fn enabled_impl() -> bool {
        ENABLED.load(Ordering::Relaxed)
    }

    enabled_impl()
}

/// Disable logging.
#[inline(always)]
pub fn disable() {
    #[cfg(debug_assertions)]
    ENABLED.store(false, Ordering::Relaxed);
}

/// Enable logging.
///
/// Trying to manually enable logging when `cfg!(debug_assertions)` is false
/// will result in the program panicking.
#[inline(always)]
pub fn enable() {
    #[cfg(not(debug_assertions))]
    panic!("Debug logging cannot be enabled.");

    #[cfg(debug_assertions)]
    ENABLED.store(true, Ordering::Relaxed);
}

/// Writes one log entry (info goes to stdout, everything else to stderr).
///
/// This function gets called by the debug log macros (e.g. [debug_log_info])
/// and generally shouldn't be called directly.
#[track_caller]
pub fn write_entry(level: Level, msg: &str) {
    let to_stdout = level == Level::Info;
    let is_terminal = if to_stdout {
        std::io::IsTerminal::is_terminal(&std::io::stdout())
    } else {
        std::io::IsTerminal::is_terminal(&std::io::stderr())
    };

    let (blue, color, reset_color) = if is_terminal {
        ("\x1b[34m", level.color(), "\x1b[0m")
    } else {
        ("", "", "")
    };

    let entry = format!(
        "{blue}DEBUG LOG{reset_color} [{color}{}{reset_color}]: {msg}\n{}",
        level.label(),
        where_and_when(blue, reset_color),
    );

    if to_stdout {
        println!("{entry}");
    } else {
        eprintln!("{entry}");
    }
}

/// The location of the caller, the time this was called, and the thread it
/// was called from, all as strings.
#[track_caller]
fn where_and_when(color: &str, reset_color: &str) -> String {
    let now = OffsetDateTime::now_utc();

    let loc = Location::caller();
    let where_ = format!("{}:{}:{}", loc.file(), loc.line(), loc.column());

    let when = now
        .format(&Rfc3339)
        .unwrap_or_else(|e| format!("Unknown time: {e}"));

    let current = std::thread::current();
    let thread = current.name().unwrap_or("<unnamed>");

    format!("\tWhere:  {color}{where_}{reset_color}\n")
        + format!("\tTime:   {color}{when}{reset_color}\n").as_str()
        + format!("\tThread: {color}{thread}{reset_color}").as_str()
}

#[cfg(debug_assertions)]
static ENABLED: AtomicBool = AtomicBool::new(true);
