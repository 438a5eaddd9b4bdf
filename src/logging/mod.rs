//! # Logging Module
//!
//! licheck runs in one of three output modes, chosen once from the command
//! line:
//!
//! - **normal**: per-file lines for files that need attention, the summary,
//!   and [`info_log!`] messages such as "Generated JSON report at ...".
//! - **quiet** (`-q`): only the paths of files missing the license and
//!   errors. [`info_log!`] is silenced.
//! - **verbose** (`-v`): everything in normal mode plus licensed files and
//!   [`verbose_log!`] notes on stderr, such as which config file was loaded.
//!
//! Structured diagnostics from the engine go through `tracing` instead; see
//! [`init_tracing`].
//!
//! ## Example
//!
//! ```rust
//! use licheck::logging::{is_quiet, is_verbose, set_quiet, set_verbose};
//! use licheck::{info_log, verbose_log};
//!
//! // `-q`: report lines only
//! set_quiet();
//! assert!(is_quiet());
//! info_log!("Generated CSV report at {}", "licheck.csv"); // suppressed
//!
//! // `-v`: config discovery notes on stderr
//! set_verbose();
//! assert!(is_verbose() && !is_quiet());
//! verbose_log!("Using config: {}", ".licheck.toml");
//! ```

mod modes;

pub use modes::{ColorMode, init_tracing, is_quiet, is_verbose, set_quiet, set_verbose};
use owo_colors::{OwoColorize, Stream};

/// Prints to stderr in verbose mode only. Takes [`eprintln!`] arguments.
#[macro_export]
macro_rules! verbose_log {
    ($($arg:tt)*) => {
        if $crate::logging::is_verbose() {
            eprintln!($($arg)*);
        }
    };
}

/// Prints a highlighted note to stdout in normal and verbose modes. Takes
/// [`println!`] arguments.
#[macro_export]
macro_rules! info_log {
    ($($arg:tt)*) => {
        if !$crate::logging::is_quiet() {
            $crate::logging::print_info_log(&format!($($arg)*));
        }
    };
}

#[doc(hidden)]
pub fn print_info_log(message: &str) {
  println!("{}", message.if_supports_color(Stream::Stdout, |m| m.yellow()));
}
