//! blackpipe - run Black over Python files through stdin/stdout

#![warn(clippy::all)]
#![warn(clippy::pedantic)]

use std::io::{self, IsTerminal};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use blackpipe::file_host::{FileHost, Output};
use blackpipe::{parse_args, Applied, BlackpipeError, CliArgs, Config, Formatter, Platform, Result};
use rayon::prelude::*;
use tracing_subscriber::EnvFilter;
use walkdir::WalkDir;

/// Python source extensions to process
const PYTHON_EXTENSIONS: &[&str] = &["py", "pyi"];

/// Exit code when the formatter itself cannot be run
const EXIT_TOOL_UNAVAILABLE: u8 = 2;

/// Tally shared across (possibly parallel) file runs
#[derive(Default)]
struct Tally {
    reformatted: AtomicUsize,
    unchanged: AtomicUsize,
    failed: AtomicUsize,
    tool_unavailable: AtomicBool,
}

impl Tally {
    fn record(&self, name: &str, result: Result<Applied>, silent: bool) {
        match result {
            Ok(Applied::Reformatted | Applied::DiffShown) => {
                self.reformatted.fetch_add(1, Ordering::Relaxed);
            }
            Ok(Applied::Unchanged) => {
                self.unchanged.fetch_add(1, Ordering::Relaxed);
            }
            Ok(Applied::Rejected { .. }) => {
                self.failed.fetch_add(1, Ordering::Relaxed);
            }
            Err(e) => {
                self.failed.fetch_add(1, Ordering::Relaxed);
                if BlackpipeError::is_tool_unavailable(&e) {
                    // Report once; every other file would fail the same way
                    if !self.tool_unavailable.swap(true, Ordering::Relaxed) {
                        eprintln!("Error: {e}");
                    }
                } else if !silent {
                    eprintln!("Error formatting {name}: {e:#}");
                }
            }
        }
    }

    fn exit_code(&self) -> ExitCode {
        if self.tool_unavailable.load(Ordering::Relaxed) {
            ExitCode::from(EXIT_TOOL_UNAVAILABLE)
        } else if self.failed.load(Ordering::Relaxed) > 0 {
            ExitCode::FAILURE
        } else {
            ExitCode::SUCCESS
        }
    }
}

fn main() -> ExitCode {
    let args = parse_args();

    let use_stdin =
        args.inputs.is_empty() || (args.inputs.len() == 1 && args.inputs[0].as_os_str() == "-");

    if args.inputs.is_empty() && io::stdin().is_terminal() {
        if let Err(e) = blackpipe::build_cli().print_help() {
            eprintln!("Error: {e}");
            return ExitCode::FAILURE;
        }
        return ExitCode::SUCCESS;
    }

    // Config for the working directory decides the log level
    let base_config = match build_config(&args, None) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {e:#}");
            return ExitCode::FAILURE;
        }
    };
    init_logging(base_config.debug);

    let platform = Platform::current();
    let tally = Tally::default();

    if use_stdin {
        let result = process_stdin(&base_config, &args, platform);
        tally.record("stdin", result, args.silent);
        return tally.exit_code();
    }

    let use_per_file_config = args.config.is_none();

    if let Some(jobs) = args.jobs {
        if jobs > 0 {
            if let Err(e) = rayon::ThreadPoolBuilder::new()
                .num_threads(jobs)
                .build_global()
            {
                tracing::warn!("failed to configure thread pool: {e}");
            }
        }
    }

    let files = collect_files(&args);
    if files.is_empty() {
        if !args.silent {
            eprintln!("No Python files found to format.");
        }
        return ExitCode::SUCCESS;
    }

    let run = |path: &PathBuf| {
        let result = if use_per_file_config {
            build_config(&args, Some(path.as_path()))
                .and_then(|config| process_file(path, &config, &args, platform))
        } else {
            process_file(path, &base_config, &args, platform)
        };
        tally.record(&path.display().to_string(), result, args.silent);
    };

    // Diffs and stdout output must not interleave
    if args.stdout || args.diff || args.jobs == Some(1) {
        files.iter().for_each(run);
    } else {
        files.par_iter().for_each(run);
    }

    if !args.silent && !args.diff && !args.stdout {
        let reformatted = tally.reformatted.load(Ordering::Relaxed);
        let unchanged = tally.unchanged.load(Ordering::Relaxed);
        let failed = tally.failed.load(Ordering::Relaxed);
        eprintln!("{reformatted} reformatted, {unchanged} unchanged, {failed} failed.");
    }

    tally.exit_code()
}

/// Install the stderr log subscriber; `RUST_LOG` wins over `debug`
fn init_logging(debug: bool) {
    let default_level = if debug { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

/// Build configuration from CLI args and config files
///
/// If `for_path` is provided and no explicit config file is specified,
/// config files are discovered from that path's directory upward.
fn build_config(args: &CliArgs, for_path: Option<&Path>) -> Result<Config> {
    let mut config = if let Some(config_path) = &args.config {
        Config::from_toml_file(config_path)?
    } else if let Some(path) = for_path {
        Config::from_discovered_files(path)
    } else {
        Config::from_discovered_files(&std::env::current_dir().unwrap_or_default())
    };

    args.apply_to(&mut config);

    if let Some(error) = config.validate() {
        anyhow::bail!("Invalid configuration: {error}");
    }
    tracing::debug!(?config, "resolved configuration");

    Ok(config)
}

/// Collect all files to process, handling directories and recursive flag
fn collect_files(args: &CliArgs) -> Vec<PathBuf> {
    let mut files = Vec::new();

    for input in &args.inputs {
        if input.is_file() {
            files.push(input.clone());
        } else if input.is_dir() {
            let max_depth = if args.recursive { 256 } else { 1 };
            for entry in WalkDir::new(input)
                .follow_links(true)
                .max_depth(max_depth)
                .into_iter()
                .filter_map(std::result::Result::ok)
            {
                let path = entry.path();
                if path.is_file() && is_python_file(path) {
                    files.push(path.to_path_buf());
                }
            }
        } else if !args.silent {
            eprintln!("Skipping {}: no such file or directory", input.display());
        }
    }

    files
}

/// Check if a file has a Python source extension
fn is_python_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| PYTHON_EXTENSIONS.contains(&ext))
}

/// Format (or diff) a single file
fn process_file(
    path: &Path,
    config: &Config,
    args: &CliArgs,
    platform: Platform,
) -> Result<Applied> {
    let output = if args.stdout {
        Output::Stdout
    } else {
        Output::InPlace
    };
    let mut host = FileHost::open(path, args.encoding.as_deref(), &config.default_encoding, output)?
        .silent(args.silent);
    run_formatter(&mut host, config, args.diff, platform)
}

/// Filter stdin to stdout
fn process_stdin(config: &Config, args: &CliArgs, platform: Platform) -> Result<Applied> {
    let mut host =
        FileHost::stdin(args.encoding.as_deref(), &config.default_encoding)?.silent(args.silent);
    run_formatter(&mut host, config, args.diff, platform)
}

fn run_formatter(
    host: &mut FileHost,
    config: &Config,
    diff: bool,
    platform: Platform,
) -> Result<Applied> {
    let formatter = Formatter::new(config.clone(), platform);
    let applied = if diff {
        formatter.diff(host)?
    } else {
        formatter.format(host)?
    };
    if !diff {
        host.finish(applied)?;
    }
    Ok(applied)
}
