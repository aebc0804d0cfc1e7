//! The editor side of a format run
//!
//! The pipeline never touches a buffer directly; it goes through [`Host`].
//! [`MemoryHost`] keeps everything in memory and records what the pipeline did,
//! which is what embedders without a real editor (and the tests) want.

use std::path::PathBuf;

use crate::Result;

/// Buffer contents as the host sees them
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Buffer {
    pub text: String,
    /// Encoding the host believes the buffer uses, if it knows
    pub encoding: Option<String>,
}

/// Services the pipeline needs from an editor
pub trait Host {
    fn read_buffer(&self) -> Result<Buffer>;

    /// Replace the whole buffer in one step
    fn replace_buffer(&mut self, text: &str) -> Result<()>;

    /// Show a status message
    fn notify(&mut self, message: &str);

    /// Show read-only text in a new panel, highlighted per `syntax`
    fn open_diff_panel(&mut self, label: &str, diff: &str, syntax: &str) -> Result<()>;

    /// File backing the buffer, if any
    fn file_path(&self) -> Option<PathBuf>;

    /// Folders open in the window, first one first
    fn project_folders(&self) -> Vec<PathBuf>;
}

/// A panel opened through [`Host::open_diff_panel`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Panel {
    pub label: String,
    pub text: String,
    pub syntax: String,
}

/// In-memory host
#[derive(Debug, Clone, Default)]
pub struct MemoryHost {
    pub buffer: Buffer,
    pub file_path: Option<PathBuf>,
    pub folders: Vec<PathBuf>,
    pub notifications: Vec<String>,
    pub panels: Vec<Panel>,
    /// Number of times the buffer was replaced
    pub replacements: usize,
}

impl MemoryHost {
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        MemoryHost {
            buffer: Buffer {
                text: text.into(),
                encoding: None,
            },
            ..Default::default()
        }
    }

    #[must_use]
    pub fn with_encoding(mut self, encoding: impl Into<String>) -> Self {
        self.buffer.encoding = Some(encoding.into());
        self
    }

    #[must_use]
    pub fn with_file_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.file_path = Some(path.into());
        self
    }

    #[must_use]
    pub fn with_folders(mut self, folders: Vec<PathBuf>) -> Self {
        self.folders = folders;
        self
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.buffer.text
    }

    #[must_use]
    pub fn last_notification(&self) -> Option<&str> {
        self.notifications.last().map(String::as_str)
    }
}

impl Host for MemoryHost {
    fn read_buffer(&self) -> Result<Buffer> {
        Ok(self.buffer.clone())
    }

    fn replace_buffer(&mut self, text: &str) -> Result<()> {
        self.buffer.text = text.to_string();
        self.replacements += 1;
        Ok(())
    }

    fn notify(&mut self, message: &str) {
        self.notifications.push(message.to_string());
    }

    fn open_diff_panel(&mut self, label: &str, diff: &str, syntax: &str) -> Result<()> {
        self.panels.push(Panel {
            label: label.to_string(),
            text: diff.to_string(),
            syntax: syntax.to_string(),
        });
        Ok(())
    }

    fn file_path(&self) -> Option<PathBuf> {
        self.file_path.clone()
    }

    fn project_folders(&self) -> Vec<PathBuf> {
        self.folders.clone()
    }
}
