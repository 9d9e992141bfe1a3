//! Defines [eprintln_and_exit].

/// The equivalent to calling [eprintln], then calling [std::process::exit]
/// with an exit code of `1`.
///
/// Used for fatal startup errors (e.g. stop signals that can't be enabled),
/// where there is nothing to clean up yet.
#[macro_export]
macro_rules! eprintln_and_exit {
    ($($arg:tt)*) => {{
        eprintln!($($arg)*);
        ::std::process::exit(1);
    }};
}
