#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;
use blackpipe::Config;
use tempfile::TempDir;

/// Stand-in for Black: strips the space after `(`, rejects `def (`, and
/// reports on stderr the way Black does. Each run logs its arguments and
/// working directory next to the script.
const FAKE_BLACK: &str = r#"#!/bin/sh
printf '%s\n' "$@" > "@LOG@/args.log"
pwd > "@LOG@/cwd.log"
want_diff=0
for arg in "$@"; do
    if [ "$arg" = "--diff" ]; then
        want_diff=1
    fi
done
src=$(mktemp)
out=$(mktemp)
cat > "$src"
if grep -q 'def (' "$src"; then
    echo "error: cannot format -: Cannot parse: 1:4: def (" >&2
    rm -f "$src" "$out"
    exit 123
fi
sed 's/( /(/g' "$src" > "$out"
if cmp -s "$src" "$out"; then
    if [ "$want_diff" -eq 1 ]; then
        echo "1 file would be left unchanged." >&2
    else
        cat "$src"
        echo "1 file left unchanged." >&2
    fi
else
    if [ "$want_diff" -eq 1 ]; then
        echo "--- STDIN"
        echo "+++ STDOUT"
        diff "$src" "$out" | sed -e 's/^< /-/' -e 's/^> /+/'
        printf "would reformat -\n1 file would be reformatted.\n" >&2
    else
        cat "$out"
        echo "reformatted -" >&2
    fi
fi
rm -f "$src" "$out"
exit 0
"#;

pub const UNBLACKED: &str = "def f( a):\n    return g( a)\n";
pub const BLACKED: &str = "def f(a):\n    return g(a)\n";

pub struct FakeBlack {
    _tmp: TempDir,
    pub root: PathBuf,
    pub script: PathBuf,
}

impl FakeBlack {
    pub fn new() -> Self {
        let tmp = TempDir::new().expect("create temp dir");
        let root = tmp.path().to_path_buf();
        let log_dir = root.join("log");
        fs::create_dir_all(&log_dir).expect("create log dir");

        let script = root.join("black");
        let body = FAKE_BLACK.replace("@LOG@", &log_dir.display().to_string());
        fs::write(&script, body).expect("write fake black");
        make_executable(&script);

        Self {
            _tmp: tmp,
            root,
            script,
        }
    }

    pub fn config(&self) -> Config {
        Config {
            command: self.script.display().to_string(),
            ..Config::default()
        }
    }

    /// Arguments of the most recent run, without the program name
    pub fn recorded_args(&self) -> Vec<String> {
        fs::read_to_string(self.root.join("log/args.log"))
            .expect("fake black never ran")
            .lines()
            .map(str::to_string)
            .collect()
    }

    /// Working directory of the most recent run
    pub fn recorded_cwd(&self) -> PathBuf {
        let cwd = fs::read_to_string(self.root.join("log/cwd.log")).expect("fake black never ran");
        PathBuf::from(cwd.trim_end())
    }

    /// Write a source file under a fresh project directory
    pub fn source(&self, name: &str, contents: &[u8]) -> PathBuf {
        let project = self.root.join("project");
        fs::create_dir_all(&project).expect("create project dir");
        let path = project.join(name);
        fs::write(&path, contents).expect("write source");
        path
    }

    /// The `blackpipe` binary with an isolated home so no user config leaks in
    pub fn cmd(&self) -> Command {
        let mut cmd = cargo_bin_cmd!("blackpipe");
        cmd.env("HOME", self.root.join("home"))
            .env_remove("RUST_LOG")
            .current_dir(&self.root);
        cmd
    }

    /// [`Self::cmd`] pointed at this fake formatter
    pub fn black_cmd(&self) -> Command {
        let mut cmd = self.cmd();
        cmd.arg("--black-command").arg(&self.script);
        cmd
    }
}

#[cfg(unix)]
fn make_executable(path: &Path) {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o755)).expect("chmod fake black");
}

#[cfg(not(unix))]
fn make_executable(_path: &Path) {}
