//! End-to-end runs of the pipeline against a fake Black
//!
//! The fake formatter is a shell script, so these only run on Unix.

#![cfg(unix)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod common;

use std::path::PathBuf;

use blackpipe::apply::{ALREADY_FORMATTED_MESSAGE, DIFF_SYNTAX};
use blackpipe::{Applied, Config, Formatter, MemoryHost, Platform};
use common::{FakeBlack, BLACKED, UNBLACKED};

fn formatter(config: Config) -> Formatter {
    Formatter::new(config, Platform::current())
}

#[test]
fn test_format_replaces_buffer() {
    let black = FakeBlack::new();
    let mut host = MemoryHost::new(UNBLACKED);

    let applied = formatter(black.config()).format(&mut host).unwrap();

    assert_eq!(applied, Applied::Reformatted);
    assert_eq!(host.text(), BLACKED);
    assert_eq!(host.replacements, 1);
    assert!(host.notifications.is_empty());
    assert_eq!(black.recorded_args(), ["-"]);
}

#[test]
fn test_second_run_is_already_formatted() {
    let black = FakeBlack::new();
    let formatter = formatter(black.config());
    let mut host = MemoryHost::new(UNBLACKED);

    assert_eq!(formatter.format(&mut host).unwrap(), Applied::Reformatted);
    assert_eq!(formatter.format(&mut host).unwrap(), Applied::Unchanged);

    assert_eq!(host.text(), BLACKED);
    assert_eq!(host.replacements, 1);
    assert_eq!(host.last_notification(), Some(ALREADY_FORMATTED_MESSAGE));
}

#[test]
fn test_syntax_error_keeps_buffer() {
    let black = FakeBlack::new();
    let mut host = MemoryHost::new("def (:\n    pass\n");

    let applied = formatter(black.config()).format(&mut host).unwrap();

    assert_eq!(applied, Applied::Rejected { status: 123 });
    assert_eq!(host.text(), "def (:\n    pass\n");
    assert_eq!(host.replacements, 0);
    assert_eq!(
        host.last_notification(),
        Some("Black: error: cannot format -: Cannot parse: 1:4: def (")
    );
}

#[test]
fn test_diff_opens_panel_and_keeps_buffer() {
    let black = FakeBlack::new();
    let mut host = MemoryHost::new(UNBLACKED).with_file_path(black.root.join("mod.py"));

    let applied = formatter(black.config()).diff(&mut host).unwrap();

    assert_eq!(applied, Applied::DiffShown);
    assert_eq!(host.text(), UNBLACKED);
    assert_eq!(host.replacements, 0);
    assert_eq!(host.panels.len(), 1);

    let panel = &host.panels[0];
    assert_eq!(panel.label, "Black diff: mod.py");
    assert_eq!(panel.syntax, DIFF_SYNTAX);
    assert!(panel.text.starts_with("--- STDIN\n+++ STDOUT\n"));
    assert!(panel.text.contains("-def f( a):\n"));
    assert!(panel.text.contains("+def f(a):\n"));
    assert!(panel.text.ends_with('\n') && !panel.text.ends_with("\n\n"));
    assert_eq!(black.recorded_args(), ["-", "--diff"]);
}

#[test]
fn test_diff_of_formatted_buffer_reports_unchanged() {
    let black = FakeBlack::new();
    let mut host = MemoryHost::new(BLACKED);

    let applied = formatter(black.config()).diff(&mut host).unwrap();

    assert_eq!(applied, Applied::Unchanged);
    assert!(host.panels.is_empty());
    assert_eq!(host.last_notification(), Some(ALREADY_FORMATTED_MESSAGE));
}

#[test]
fn test_options_and_stub_flag_reach_formatter() {
    let black = FakeBlack::new();
    let config = Config {
        line_length: Some(90),
        fast: true,
        skip_string_normalization: true,
        py36: true,
        ..black.config()
    };
    let mut host = MemoryHost::new("x: int\n").with_file_path(black.root.join("api.pyi"));

    formatter(config).format(&mut host).unwrap();

    assert_eq!(
        black.recorded_args(),
        ["-", "-l", "90", "--fast", "--skip-string-normalization", "--py36", "--pyi"]
    );
}

#[test]
fn test_runs_in_file_directory() {
    let black = FakeBlack::new();
    let path = black.source("mod.py", UNBLACKED.as_bytes());
    let mut host = MemoryHost::new(UNBLACKED)
        .with_file_path(&path)
        .with_folders(vec![black.root.clone()]);

    formatter(black.config()).format(&mut host).unwrap();

    let expected = path.parent().unwrap().canonicalize().unwrap();
    assert_eq!(black.recorded_cwd().canonicalize().unwrap(), expected);
}

#[test]
fn test_untitled_buffer_runs_in_first_folder() {
    let black = FakeBlack::new();
    let folder: PathBuf = black.root.join("log");
    let mut host = MemoryHost::new(UNBLACKED).with_folders(vec![folder.clone(), black.root.clone()]);

    formatter(black.config()).format(&mut host).unwrap();

    assert_eq!(
        black.recorded_cwd().canonicalize().unwrap(),
        folder.canonicalize().unwrap()
    );
}

#[test]
fn test_declared_encoding_round_trips() {
    let black = FakeBlack::new();
    let source = "# -*- coding: latin-1 -*-\ns = g( 'h\u{e9}llo')\n";
    let mut host = MemoryHost::new(source);

    let applied = formatter(black.config()).format(&mut host).unwrap();

    assert_eq!(applied, Applied::Reformatted);
    assert_eq!(host.text(), "# -*- coding: latin-1 -*-\ns = g('h\u{e9}llo')\n");
}
