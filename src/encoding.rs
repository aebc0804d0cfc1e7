//! Buffer encoding detection and conversion
//!
//! Python source may declare its encoding in a comment on one of its first two
//! lines (`# -*- coding: latin-1 -*-`). When the host cannot tell us how a buffer
//! is encoded we look for that declaration, then fall back to the configured
//! default. The resolved label is used for both directions of one invocation.

use std::borrow::Cow;
use std::sync::LazyLock;

use encoding_rs::{Encoding, UTF_16BE, UTF_16LE};
use regex::Regex;

use crate::error::BlackpipeError;
use crate::Result;

/// Coding declaration, as recognized by the Python tokenizer
static CODING_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"coding[:=]\s*([-\w.]+)").unwrap());

/// Hosts report this (any case) when they have no idea either.
const UNDEFINED_ENCODING: &str = "undefined";

/// Number of leading lines that may carry a coding declaration
const DECLARATION_LINES: usize = 2;

/// Extract the declared encoding from a single line
#[must_use]
pub fn encoding_from_line(line: &str) -> Option<String> {
    CODING_RE
        .captures(line)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Find a coding declaration on line 1 or, failing that, line 2
#[must_use]
pub fn encoding_from_text(text: &str) -> Option<String> {
    text.lines()
        .take(DECLARATION_LINES)
        .find_map(encoding_from_line)
}

/// Pick the encoding for one invocation.
///
/// The host's own report wins unless it is missing or "undefined"; then the
/// buffer's coding declaration; then `default`.
#[must_use]
pub fn negotiate(declared: Option<&str>, text: &str, default: &str) -> String {
    if let Some(enc) = declared.map(str::trim) {
        if !enc.is_empty() && !enc.eq_ignore_ascii_case(UNDEFINED_ENCODING) {
            return enc.to_string();
        }
    }
    encoding_from_text(text).unwrap_or_else(|| default.to_string())
}

/// Python codec spellings that are not WHATWG labels
fn python_alias(label: &str) -> Option<&'static str> {
    let normalized = label.to_ascii_lowercase().replace('_', "-");
    let alias = match normalized.as_str() {
        "latin-1" | "iso-latin-1" | "l1" => "latin1",
        "utf-8-sig" | "utf8-sig" | "u8" => "utf-8",
        "utf-16-le" => "utf-16le",
        "utf-16-be" => "utf-16be",
        "shift-jis" | "sjis" => "shift_jis",
        "cp936" => "gbk",
        "euc-kr" | "cp949" => "euc-kr",
        _ => return Encoding::for_label(normalized.as_bytes()).map(Encoding::name),
    };
    Some(alias)
}

/// Look up an encoding by label, accepting Python codec names
pub fn lookup(label: &str) -> Result<&'static Encoding> {
    let trimmed = label.trim();
    Encoding::for_label(trimmed.as_bytes())
        .or_else(|| python_alias(trimmed).and_then(|alias| Encoding::for_label(alias.as_bytes())))
        .ok_or_else(|| BlackpipeError::UnknownEncoding(trimmed.to_string()).into())
}

/// Encode buffer text for the formatter's stdin
pub fn encode(text: &str, label: &str) -> Result<Vec<u8>> {
    let encoding = lookup(label)?;

    // encoding_rs only decodes UTF-16; its encoder hands back UTF-8 for it
    if encoding == UTF_16LE {
        return Ok(text.encode_utf16().flat_map(u16::to_le_bytes).collect());
    }
    if encoding == UTF_16BE {
        return Ok(text.encode_utf16().flat_map(u16::to_be_bytes).collect());
    }

    let (bytes, _, had_unmappable) = encoding.encode(text);
    if had_unmappable {
        return Err(BlackpipeError::Encode {
            encoding: label.to_string(),
        }
        .into());
    }
    Ok(bytes.into_owned())
}

/// Decode formatter output using the same label the input was encoded with
pub fn decode<'a>(bytes: &'a [u8], label: &str) -> Result<Cow<'a, str>> {
    let encoding = lookup(label)?;
    encoding
        .decode_without_bom_handling_and_without_replacement(bytes)
        .ok_or_else(|| {
            BlackpipeError::Decode {
                encoding: label.to_string(),
            }
            .into()
        })
}
