//! Reconcile a formatter run with the host buffer

use tracing::{debug, warn};

use crate::config::StatusMarkers;
use crate::encoding;
use crate::host::Host;
use crate::outcome::{classify, Classification, Outcome};
use crate::Result;

pub const ALREADY_FORMATTED_MESSAGE: &str = "Black: already well formatted!";

/// Syntax hint handed to the host for diff panels
pub const DIFF_SYNTAX: &str = "Diff";

/// What happened to the buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    /// Buffer replaced with the formatted text
    Reformatted,
    /// Nothing to do; buffer untouched
    Unchanged,
    /// The formatter refused the input; buffer untouched
    Rejected { status: i32 },
    /// A diff panel was opened; buffer untouched
    DiffShown,
}

/// Per-invocation facts the applier needs besides the outcome
#[derive(Debug, Clone, Copy)]
pub struct ApplyContext<'a> {
    /// Resolved encoding, same one the input was encoded with
    pub encoding: &'a str,
    /// Bytes that were sent to the formatter
    pub input: &'a [u8],
    pub diff: bool,
    pub markers: &'a StatusMarkers,
}

/// Act on one outcome
pub fn apply_outcome<H: Host + ?Sized>(
    host: &mut H,
    outcome: &Outcome,
    ctx: &ApplyContext<'_>,
) -> Result<Applied> {
    if !outcome.success() {
        host.notify(&format!("Black: {}", outcome.stderr_text()));
        return Ok(Applied::Rejected {
            status: outcome.status,
        });
    }

    let changed = match classify(&outcome.stderr, ctx.markers) {
        Classification::Reformatted => true,
        Classification::Unchanged => false,
        Classification::Unrecognized => {
            warn!(
                stderr = %outcome.stderr_text(),
                "formatter stderr matches neither status marker, comparing output instead"
            );
            if ctx.diff {
                !outcome.stdout.iter().all(u8::is_ascii_whitespace)
            } else {
                outcome.stdout != ctx.input
            }
        }
    };

    if !changed {
        host.notify(ALREADY_FORMATTED_MESSAGE);
        return Ok(Applied::Unchanged);
    }

    if ctx.diff {
        let diff = render_diff(&outcome.stdout, ctx.encoding)?;
        let label = diff_label(host.file_path().as_deref());
        host.open_diff_panel(&label, &diff, DIFF_SYNTAX)?;
        return Ok(Applied::DiffShown);
    }

    let text = encoding::decode(&outcome.stdout, ctx.encoding)?;
    debug!(bytes = outcome.stdout.len(), "replacing buffer");
    host.replace_buffer(&text)?;
    Ok(Applied::Reformatted)
}

/// Turn the formatter's `--diff` output into panel text
///
/// Surrounding whitespace is stripped and exactly one trailing newline added.
pub fn render_diff(stdout: &[u8], encoding: &str) -> Result<String> {
    let text = encoding::decode(stdout, encoding)?;
    let mut diff = text.trim().to_string();
    diff.push('\n');
    Ok(diff)
}

fn diff_label(file_path: Option<&std::path::Path>) -> String {
    let name = file_path
        .and_then(|p| p.file_name())
        .map_or_else(|| "untitled".into(), |n| n.to_string_lossy());
    format!("Black diff: {name}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::MemoryHost;

    const UNBLACKED: &str = "def f( a):\n    return a\n";
    const BLACKED: &str = "def f(a):\n    return a\n";

    fn outcome(status: i32, stdout: &str, stderr: &str) -> Outcome {
        Outcome {
            status,
            stdout: stdout.as_bytes().to_vec(),
            stderr: stderr.as_bytes().to_vec(),
        }
    }

    fn run(host: &mut MemoryHost, outcome: &Outcome, diff: bool) -> Applied {
        let markers = StatusMarkers::default();
        let input = host.text().as_bytes().to_vec();
        let ctx = ApplyContext {
            encoding: "utf-8",
            input: &input,
            diff,
            markers: &markers,
        };
        apply_outcome(host, outcome, &ctx).unwrap()
    }

    #[test]
    fn test_reformatted_replaces_buffer() {
        let mut host = MemoryHost::new(UNBLACKED);
        let result = run(&mut host, &outcome(0, "hello\n", "reformatted -"), false);
        assert_eq!(result, Applied::Reformatted);
        assert_eq!(host.text(), "hello\n");
        assert_eq!(host.replacements, 1);
    }

    #[test]
    fn test_failure_leaves_buffer() {
        let mut host = MemoryHost::new(UNBLACKED);
        let result = run(&mut host, &outcome(1, "hello\n", "reformatted"), false);
        assert_eq!(result, Applied::Rejected { status: 1 });
        assert_eq!(host.text(), UNBLACKED);
        assert_eq!(host.replacements, 0);
        assert_eq!(host.last_notification(), Some("Black: reformatted"));
    }

    #[test]
    fn test_syntax_error_surfaces_stderr() {
        let mut host = MemoryHost::new("def (:\n");
        let stderr = "error: cannot format -: Cannot parse: 1:4: def (:\n";
        let result = run(&mut host, &outcome(123, "", stderr), false);
        assert_eq!(result, Applied::Rejected { status: 123 });
        assert_eq!(
            host.last_notification(),
            Some("Black: error: cannot format -: Cannot parse: 1:4: def (:")
        );
    }

    #[test]
    fn test_already_formatted() {
        let mut host = MemoryHost::new(BLACKED);
        let result = run(&mut host, &outcome(0, BLACKED, "1 file left unchanged."), false);
        assert_eq!(result, Applied::Unchanged);
        assert_eq!(host.text(), BLACKED);
        assert_eq!(host.replacements, 0);
        assert_eq!(host.last_notification(), Some(ALREADY_FORMATTED_MESSAGE));
    }

    #[test]
    fn test_already_formatted_with_diff() {
        let mut host = MemoryHost::new(BLACKED);
        let result = run(&mut host, &outcome(0, "", "1 file would be left unchanged."), true);
        assert_eq!(result, Applied::Unchanged);
        assert!(host.panels.is_empty());
        assert_eq!(host.last_notification(), Some(ALREADY_FORMATTED_MESSAGE));
    }

    #[test]
    fn test_diff_opens_panel() {
        let mut host = MemoryHost::new(UNBLACKED).with_file_path("/src/mod.py");
        let diff = "--- STDIN\n+++ STDOUT\n@@ -1,2 +1,2 @@\n-def f( a):\n+def f(a):\n     return a\n\n\n";
        let result = run(&mut host, &outcome(0, diff, "would reformat -\n1 file would be reformatted."), true);

        assert_eq!(result, Applied::DiffShown);
        assert_eq!(host.text(), UNBLACKED);
        assert_eq!(host.panels.len(), 1);
        let panel = &host.panels[0];
        assert_eq!(panel.label, "Black diff: mod.py");
        assert_eq!(panel.syntax, DIFF_SYNTAX);
        assert!(panel.text.ends_with("     return a\n"));
        assert!(!panel.text.ends_with("\n\n"));
    }

    #[test]
    fn test_unrecognized_stderr_same_output_is_unchanged() {
        let mut host = MemoryHost::new(BLACKED);
        let result = run(&mut host, &outcome(0, BLACKED, "All done!"), false);
        assert_eq!(result, Applied::Unchanged);
        assert_eq!(host.replacements, 0);
    }

    #[test]
    fn test_unrecognized_stderr_new_output_is_applied() {
        let mut host = MemoryHost::new(UNBLACKED);
        let result = run(&mut host, &outcome(0, BLACKED, ""), false);
        assert_eq!(result, Applied::Reformatted);
        assert_eq!(host.text(), BLACKED);
    }

    #[test]
    fn test_unrecognized_stderr_empty_diff_is_unchanged() {
        let mut host = MemoryHost::new(BLACKED);
        let result = run(&mut host, &outcome(0, "\n", "All done!"), true);
        assert_eq!(result, Applied::Unchanged);
    }

    #[test]
    fn test_replacement_decodes_with_resolved_encoding() {
        let mut host = MemoryHost::new("s = 'h\u{e9}llo'\n");
        let markers = StatusMarkers::default();
        let input = b"s = 'h\xe9llo'\n".to_vec();
        let out = Outcome {
            status: 0,
            stdout: b"s = \"h\xe9llo\"\n".to_vec(),
            stderr: b"reformatted -".to_vec(),
        };
        let ctx = ApplyContext {
            encoding: "latin-1",
            input: &input,
            diff: false,
            markers: &markers,
        };
        assert_eq!(apply_outcome(&mut host, &out, &ctx).unwrap(), Applied::Reformatted);
        assert_eq!(host.text(), "s = \"h\u{e9}llo\"\n");
    }

    #[test]
    fn test_render_diff_normalizes_trailing_whitespace() {
        assert_eq!(render_diff(b"\n@@ -1 +1 @@\n-a\n+b\n\n\n", "utf-8").unwrap(), "@@ -1 +1 @@\n-a\n+b\n");
    }

    #[test]
    fn test_diff_label_without_file() {
        assert_eq!(diff_label(None), "Black diff: untitled");
    }
}
