//! Host backed by a file on disk (or stdin), used by the `blackpipe` binary
//!
//! Loading decodes the file the way an editor would: an explicit encoding if
//! given, else the coding declaration, else the configured default. Writes go
//! back to the file in that same encoding, or to stdout.

use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use anyhow::Context;

use crate::apply::Applied;
use crate::encoding;
use crate::host::{Buffer, Host};
use crate::Result;

/// Where replaced text goes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Output {
    /// Rewrite the source file
    InPlace,
    /// Print to stdout, leaving the source alone
    Stdout,
}

#[derive(Debug)]
pub struct FileHost {
    path: Option<PathBuf>,
    text: String,
    encoding: String,
    output: Output,
    silent: bool,
    replaced: bool,
}

impl FileHost {
    /// Load a file
    pub fn open(
        path: &Path,
        declared: Option<&str>,
        default_encoding: &str,
        output: Output,
    ) -> Result<Self> {
        let bytes =
            std::fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
        Self::from_bytes(Some(path.to_path_buf()), &bytes, declared, default_encoding, output)
    }

    /// Load stdin; results always go to stdout
    pub fn stdin(declared: Option<&str>, default_encoding: &str) -> Result<Self> {
        let mut bytes = Vec::new();
        io::stdin().read_to_end(&mut bytes)?;
        Self::from_bytes(None, &bytes, declared, default_encoding, Output::Stdout)
    }

    /// Decode raw contents into a host
    pub fn from_bytes(
        path: Option<PathBuf>,
        bytes: &[u8],
        declared: Option<&str>,
        default_encoding: &str,
        output: Output,
    ) -> Result<Self> {
        // Coding declarations are ASCII, so a lossy view is enough to find one
        let probe = String::from_utf8_lossy(bytes);
        let label = encoding::negotiate(declared, &probe, default_encoding);
        let text = encoding::decode(bytes, &label)
            .with_context(|| match &path {
                Some(p) => format!("cannot decode {}", p.display()),
                None => "cannot decode stdin".to_string(),
            })?
            .into_owned();

        Ok(FileHost {
            path,
            text,
            encoding: label,
            output,
            silent: false,
            replaced: false,
        })
    }

    #[must_use]
    pub fn silent(mut self, silent: bool) -> Self {
        self.silent = silent;
        self
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub fn encoding(&self) -> &str {
        &self.encoding
    }

    /// Display name for messages
    #[must_use]
    pub fn name(&self) -> String {
        self.path
            .as_ref()
            .map_or_else(|| "stdin".to_string(), |p| p.display().to_string())
    }

    /// Finish a run: a stdout filter echoes untouched input so the pipe never
    /// comes back empty.
    pub fn finish(&self, applied: Applied) -> Result<()> {
        let untouched = matches!(applied, Applied::Unchanged | Applied::Rejected { .. });
        if self.output == Output::Stdout && !self.replaced && untouched {
            write_stdout(&encoding::encode(&self.text, &self.encoding)?)?;
        }
        Ok(())
    }
}

fn write_stdout(bytes: &[u8]) -> Result<()> {
    let mut stdout = io::stdout().lock();
    stdout.write_all(bytes)?;
    stdout.flush()?;
    Ok(())
}

impl Host for FileHost {
    fn read_buffer(&self) -> Result<Buffer> {
        Ok(Buffer {
            text: self.text.clone(),
            encoding: Some(self.encoding.clone()),
        })
    }

    fn replace_buffer(&mut self, text: &str) -> Result<()> {
        let bytes = encoding::encode(text, &self.encoding)?;
        match (&self.path, self.output) {
            (Some(path), Output::InPlace) => std::fs::write(path, &bytes)
                .with_context(|| format!("failed to write {}", path.display()))?,
            _ => write_stdout(&bytes)?,
        }
        text.clone_into(&mut self.text);
        self.replaced = true;
        Ok(())
    }

    fn notify(&mut self, message: &str) {
        if !self.silent {
            eprintln!("{}: {message}", self.name());
        }
    }

    fn open_diff_panel(&mut self, label: &str, diff: &str, _syntax: &str) -> Result<()> {
        let mut stdout = io::stdout().lock();
        if !self.silent {
            writeln!(stdout, "=== {label} ===")?;
        }
        stdout.write_all(diff.as_bytes())?;
        stdout.flush()?;
        Ok(())
    }

    fn file_path(&self) -> Option<PathBuf> {
        self.path.clone()
    }

    fn project_folders(&self) -> Vec<PathBuf> {
        std::env::current_dir().into_iter().collect()
    }
}
