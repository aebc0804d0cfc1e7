//! Command-line interface for blackpipe.
//!
//! Defines CLI arguments using clap builder API

use std::path::PathBuf;

use clap::{Arg, ArgAction, Command};

use crate::config::Config;

/// CLI arguments parsed from command line
#[derive(Debug, Clone, Default)]
pub struct CliArgs {
    /// Files or directories to format
    pub inputs: Vec<PathBuf>,

    /// Formatter executable
    pub black_command: Option<String>,

    /// Target line length
    pub line_length: Option<u32>,

    pub fast: bool,

    pub skip_string_normalization: bool,

    /// Regex passed through as `--include`
    pub include: Option<String>,

    /// Regex passed through as `--exclude`
    pub exclude: Option<String>,

    pub py36: bool,

    /// Fallback encoding when nothing else declares one
    pub default_encoding: Option<String>,

    /// Encoding of the input, as an editor would report it
    pub encoding: Option<String>,

    /// Show diff without modifying files
    pub diff: bool,

    /// Output to stdout instead of in-place
    pub stdout: bool,

    /// Config file path
    pub config: Option<PathBuf>,

    /// Recursive directory processing
    pub recursive: bool,

    /// Number of parallel jobs (0 = auto, 1 = sequential)
    pub jobs: Option<usize>,

    /// Enable debug output
    pub debug: bool,

    /// Silent mode (no status messages)
    pub silent: bool,
}

impl CliArgs {
    /// Override config values with the flags that were given
    pub fn apply_to(&self, config: &mut Config) {
        if let Some(command) = &self.black_command {
            config.command.clone_from(command);
        }
        if let Some(line_length) = self.line_length {
            config.line_length = Some(line_length);
        }
        if self.fast {
            config.fast = true;
        }
        if self.skip_string_normalization {
            config.skip_string_normalization = true;
        }
        if let Some(include) = &self.include {
            config.include = Some(include.clone());
        }
        if let Some(exclude) = &self.exclude {
            config.exclude = Some(exclude.clone());
        }
        if self.py36 {
            config.py36 = true;
        }
        if let Some(encoding) = &self.default_encoding {
            config.default_encoding.clone_from(encoding);
        }
        if self.debug {
            config.debug = true;
        }
    }
}

/// Build the clap Command for parsing CLI arguments
#[must_use]
pub fn build_cli() -> Command {
    Command::new("blackpipe")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Run the Black formatter over Python buffers through stdin/stdout")
        .arg(
            Arg::new("inputs")
                .help("Files or directories to format ('-' or nothing reads stdin)")
                .value_name("FILE")
                .num_args(1..)
                .required(false)
                .value_parser(clap::value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("black-command")
                .long("black-command")
                .help("Formatter executable [default: black]")
                .value_name("PATH"),
        )
        .arg(
            Arg::new("line-length")
                .short('l')
                .long("line-length")
                .help("Target line length, passed to Black as -l")
                .value_name("NUM")
                .value_parser(clap::value_parser!(u32).range(1..)),
        )
        .arg(
            Arg::new("fast")
                .long("fast")
                .help("Pass --fast (skip Black's AST safety checks)")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("skip-string-normalization")
                .long("skip-string-normalization")
                .help("Pass --skip-string-normalization")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("include")
                .long("include")
                .help("Regex passed to Black as --include")
                .value_name("REGEX"),
        )
        .arg(
            Arg::new("exclude")
                .long("exclude")
                .help("Regex passed to Black as --exclude")
                .value_name("REGEX"),
        )
        .arg(
            Arg::new("py36")
                .long("py36")
                .help("Pass --py36")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("default-encoding")
                .long("default-encoding")
                .help("Encoding used when the input declares none [default: utf-8]")
                .value_name("ENCODING"),
        )
        .arg(
            Arg::new("encoding")
                .long("encoding")
                .help("Encoding of the input; overrides any coding declaration")
                .value_name("ENCODING"),
        )
        .arg(
            Arg::new("diff")
                .short('d')
                .long("diff")
                .help("Show diff without modifying files")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("stdout")
                .short('s')
                .long("stdout")
                .help("Output to stdout instead of modifying files in-place")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .help("Path to configuration file (overrides auto-discovery)")
                .value_name("FILE")
                .value_parser(clap::value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("recursive")
                .short('r')
                .long("recursive")
                .help("Recursively format .py/.pyi files in directories")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("jobs")
                .short('j')
                .long("jobs")
                .help("Number of parallel jobs (0=auto, 1=sequential)")
                .value_name("NUM")
                .value_parser(clap::value_parser!(usize)),
        )
        .arg(
            Arg::new("debug")
                .short('D')
                .long("debug")
                .help("Enable debug logging (RUST_LOG overrides)")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("silent")
                .short('S')
                .long("silent")
                .help("Silent mode (no status messages, for editor integration)")
                .action(ArgAction::SetTrue),
        )
}

/// Parse CLI arguments from command line
#[must_use]
pub fn parse_args() -> CliArgs {
    args_from_matches(&build_cli().get_matches())
}

/// Parse CLI arguments from an iterator (for testing)
#[must_use]
pub fn parse_args_from<I, T>(args: I) -> CliArgs
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    args_from_matches(&build_cli().get_matches_from(args))
}

/// Convert clap `ArgMatches` to `CliArgs`
fn args_from_matches(matches: &clap::ArgMatches) -> CliArgs {
    CliArgs {
        inputs: matches
            .get_many::<PathBuf>("inputs")
            .map(|vals| vals.cloned().collect())
            .unwrap_or_default(),
        black_command: matches.get_one::<String>("black-command").cloned(),
        line_length: matches.get_one::<u32>("line-length").copied(),
        fast: matches.get_flag("fast"),
        skip_string_normalization: matches.get_flag("skip-string-normalization"),
        include: matches.get_one::<String>("include").cloned(),
        exclude: matches.get_one::<String>("exclude").cloned(),
        py36: matches.get_flag("py36"),
        default_encoding: matches.get_one::<String>("default-encoding").cloned(),
        encoding: matches.get_one::<String>("encoding").cloned(),
        diff: matches.get_flag("diff"),
        stdout: matches.get_flag("stdout"),
        config: matches.get_one::<PathBuf>("config").cloned(),
        recursive: matches.get_flag("recursive"),
        jobs: matches.get_one::<usize>("jobs").copied(),
        debug: matches.get_flag("debug"),
        silent: matches.get_flag("silent"),
    }
}
