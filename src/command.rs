//! Formatter command line construction
//!
//! Argument order is fixed: executable, `-`, caller extras, then option flags in
//! the order below. Black does not care about the order, but tests and logs do.

use std::path::Path;

use crate::config::Config;

/// Tells Black to read source from stdin
pub const STDIN_MARKER: &str = "-";

/// Extension of Python stub files
const STUB_EXTENSION: &str = "pyi";

/// Ask Black for a unified diff instead of the formatted source
pub const DIFF_FLAG: &str = "--diff";

/// Build the argument vector for one invocation
///
/// `file_path` is the buffer's file (if any); stub files get `--pyi`.
/// `extra` is inserted right after the stdin marker.
#[must_use]
pub fn build_command(config: &Config, file_path: Option<&Path>, extra: &[String]) -> Vec<String> {
    let mut args = vec![config.command.clone(), STDIN_MARKER.to_string()];
    args.extend(extra.iter().cloned());

    if let Some(line_length) = config.line_length {
        args.push("-l".to_string());
        args.push(line_length.to_string());
    }
    if config.fast {
        args.push("--fast".to_string());
    }
    if config.skip_string_normalization {
        args.push("--skip-string-normalization".to_string());
    }
    if let Some(include) = &config.include {
        args.push("--include".to_string());
        args.push(include.clone());
    }
    if let Some(exclude) = &config.exclude {
        args.push("--exclude".to_string());
        args.push(exclude.clone());
    }
    if config.py36 {
        args.push("--py36".to_string());
    }
    if file_path.is_some_and(is_stub_file) {
        args.push("--pyi".to_string());
    }

    args
}

/// Check if a path is a `.pyi` stub
#[must_use]
pub fn is_stub_file(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == STUB_EXTENSION)
}
