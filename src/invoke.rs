//! Formatter subprocess execution
//!
//! One call spawns the formatter, feeds the encoded buffer on stdin, collects
//! stdout/stderr in full and waits for exit. There is no timeout: a hung
//! formatter blocks the caller.
//!
//! A formatter that runs and rejects its input is an [`Outcome`], not an error.
//! The only failure class singled out is [`BlackpipeError::ToolUnavailable`].

use std::ffi::{OsStr, OsString};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use anyhow::{anyhow, Context};
use tracing::debug;

use crate::env::Environment;
use crate::error::BlackpipeError;
use crate::outcome::{Outcome, SIGNALLED_STATUS};
use crate::platform::Platform;
use crate::Result;

/// Windows fallback when `PATHEXT` is unset
const DEFAULT_PATHEXT: &str = ".COM;.EXE;.BAT;.CMD";

/// Everything needed to run the formatter once
#[derive(Debug, Clone)]
pub struct InvocationRequest {
    /// Executable followed by its arguments
    pub args: Vec<String>,
    pub env: Environment,
    /// Working directory; `None` inherits ours
    pub cwd: Option<PathBuf>,
    /// Encoded buffer contents
    pub input: Vec<u8>,
}

/// Resolved executable plus platform process flags
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Launch {
    pub program: PathBuf,
    pub creation_flags: Option<u32>,
}

/// Run the formatter and capture its result
pub fn invoke(request: &InvocationRequest, platform: Platform) -> Result<Outcome> {
    let (program, args) = request
        .args
        .split_first()
        .ok_or_else(|| anyhow!("formatter command line is empty"))?;
    let launch = prepare_launch(program, &request.env, platform)?;

    debug!(args = ?request.args, cwd = ?request.cwd, bytes = request.input.len(), "running formatter");

    let mut cmd = Command::new(&launch.program);
    cmd.args(args)
        .env_clear()
        .envs(&request.env)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());
    if let Some(dir) = &request.cwd {
        cmd.current_dir(dir);
    }
    apply_creation_flags(&mut cmd, launch.creation_flags);

    let mut child = cmd.spawn().map_err(|e| spawn_error(program, e))?;
    let mut stdin = child
        .stdin
        .take()
        .context("formatter stdin was not captured")?;

    // Feed stdin from its own thread so a chatty child cannot fill its stdout
    // pipe while we are still blocked writing.
    let (written, output) = std::thread::scope(|scope| {
        let writer = scope.spawn(move || {
            let result = stdin.write_all(&request.input);
            drop(stdin);
            result
        });
        let output = child.wait_with_output();
        let written = writer
            .join()
            .unwrap_or_else(|_| Err(io::Error::other("stdin writer panicked")));
        (written, output)
    });

    let output = output.with_context(|| format!("failed waiting for `{program}`"))?;
    match written {
        // The child may exit before reading everything, e.g. on a usage error
        Err(e) if e.kind() != io::ErrorKind::BrokenPipe => {
            return Err(e).with_context(|| format!("failed writing to `{program}`"));
        }
        _ => {}
    }

    let status = output.status.code().unwrap_or(SIGNALLED_STATUS);
    debug!(status, stdout = output.stdout.len(), stderr = output.stderr.len(), "formatter exited");

    Ok(Outcome {
        status,
        stdout: output.stdout,
        stderr: output.stderr,
    })
}

/// Platform-specific pre-launch step.
///
/// On Windows the executable is located on `PATH` up front (so a missing tool is
/// reported as such) and the no-console flag is set. Elsewhere this is a no-op.
pub fn prepare_launch(program: &str, env: &Environment, platform: Platform) -> Result<Launch> {
    let Some(flags) = platform.launch_flags() else {
        return Ok(Launch {
            program: PathBuf::from(program),
            creation_flags: None,
        });
    };

    let path_var = env_var(env, "PATH");
    let pathext = env_var(env, "PATHEXT")
        .map_or_else(|| DEFAULT_PATHEXT.to_string(), |v| v.to_string_lossy().into_owned());
    let extensions: Vec<&str> = pathext.split(';').filter(|e| !e.is_empty()).collect();

    let resolved = locate_executable(program, path_var, &extensions).ok_or_else(|| {
        BlackpipeError::ToolUnavailable {
            command: program.to_string(),
            reason: "not found on PATH".to_string(),
        }
    })?;

    Ok(Launch {
        program: resolved,
        creation_flags: Some(flags),
    })
}

/// Case-insensitive lookup, as Windows treats variable names
fn env_var<'a>(env: &'a Environment, name: &str) -> Option<&'a OsString> {
    env.iter()
        .find(|(key, _)| key.eq_ignore_ascii_case(name))
        .map(|(_, value)| value)
}

/// Find `program` the way a Windows shell would
///
/// A program with a directory component is checked in place; a bare name is
/// searched for in every `PATH` entry. Each candidate is tried as given, then
/// with every extension appended.
#[must_use]
pub fn locate_executable(
    program: &str,
    path_var: Option<&OsString>,
    extensions: &[&str],
) -> Option<PathBuf> {
    let program_path = Path::new(program);
    let dirs: Vec<PathBuf> = if program_path.components().count() > 1 {
        vec![PathBuf::new()]
    } else {
        path_var.map(std::env::split_paths).into_iter().flatten().collect()
    };

    dirs.iter().find_map(|dir| {
        let base = dir.join(program_path);
        std::iter::once(base.clone())
            .chain(extensions.iter().map(|ext| with_suffix(&base, ext)))
            .find(|candidate| candidate.is_file())
    })
}

fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut name: OsString = path.as_os_str().to_owned();
    name.push(OsStr::new(suffix));
    PathBuf::from(name)
}

#[cfg(windows)]
fn apply_creation_flags(cmd: &mut Command, flags: Option<u32>) {
    use std::os::windows::process::CommandExt;
    if let Some(flags) = flags {
        cmd.creation_flags(flags);
    }
}

#[cfg(not(windows))]
fn apply_creation_flags(_cmd: &mut Command, _flags: Option<u32>) {}

fn spawn_error(program: &str, err: io::Error) -> anyhow::Error {
    if err.kind() == io::ErrorKind::NotFound {
        BlackpipeError::ToolUnavailable {
            command: program.to_string(),
            reason: err.to_string(),
        }
        .into()
    } else {
        anyhow::Error::new(err).context(format!("failed to start `{program}`"))
    }
}

/// Directory the formatter should run in.
///
/// Black looks for `pyproject.toml` relative to its working directory, so use
/// the buffer's directory, else the first open project folder, else inherit.
#[must_use]
pub fn working_dir(file_path: Option<&Path>, folders: &[PathBuf]) -> Option<PathBuf> {
    file_path
        .and_then(Path::parent)
        .filter(|dir| !dir.as_os_str().is_empty())
        .map(Path::to_path_buf)
        .or_else(|| folders.first().cloned())
}
