//! blackpipe - Run the Black formatter over editor buffers
//!
//! The pipeline takes a buffer from a [`Host`], works out its encoding, runs
//! Black on it through stdin/stdout and reconciles the result: replace the
//! buffer, report "already formatted", surface the error, or show a diff.

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::struct_excessive_bools)]

pub mod apply;
pub mod cli;
pub mod command;
pub mod config;
pub mod encoding;
pub mod env;
pub mod error;
pub mod file_host;
pub mod host;
pub mod invoke;
pub mod outcome;
pub mod platform;
pub mod session;

// Re-export commonly used types
pub use apply::{apply_outcome, Applied};
pub use cli::{build_cli, parse_args, parse_args_from, CliArgs};
pub use command::build_command;
pub use config::{Config, StatusMarkers};
pub use error::{BlackpipeError, Result};
pub use host::{Buffer, Host, MemoryHost};
pub use outcome::{classify, Classification, Outcome};
pub use platform::Platform;
pub use session::Formatter;
