//! Child process environment
//!
//! Black refuses to run when the locale cannot encode/decode UTF-8, and some
//! desktop sessions (notably GUI apps launched on macOS) start with no locale at
//! all. The child gets a copy of our environment plus a UTF-8 locale when needed.

use std::collections::BTreeMap;
use std::ffi::OsString;

use tracing::debug;

use crate::platform::Platform;

/// Environment handed to the formatter process
pub type Environment = BTreeMap<OsString, OsString>;

/// Locale variables in POSIX precedence order
const LOCALE_VARS: &[&str] = &["LC_ALL", "LC_CTYPE", "LANG", "LANGUAGE"];

/// Build the formatter environment from the current process environment
#[must_use]
pub fn build_env(need_locale: bool, platform: Platform) -> Environment {
    let base: Environment = std::env::vars_os().collect();
    build_env_with(base, need_locale, platform, default_locale())
}

/// Build the formatter environment from an explicit base and locale probe result
#[must_use]
pub fn build_env_with(
    mut base: Environment,
    need_locale: bool,
    platform: Platform,
    locale: Option<String>,
) -> Environment {
    if !need_locale || locale.is_some() {
        return base;
    }
    if let Some((key, value)) = platform.locale_override() {
        debug!(key, value, "no usable locale, injecting one");
        base.insert(key.into(), value.into());
    }
    base
}

/// The platform default locale, or `None` when it is unset or plain C/POSIX
#[must_use]
pub fn default_locale() -> Option<String> {
    probe_locale(|var| std::env::var(var).ok())
}

/// Resolve a locale from a variable lookup
pub fn probe_locale(lookup: impl Fn(&str) -> Option<String>) -> Option<String> {
    let value = LOCALE_VARS
        .iter()
        .find_map(|var| lookup(var).filter(|v| !v.is_empty()))?;
    // LANGUAGE may be a colon-separated priority list
    let first = value.split(':').next().unwrap_or_default().to_string();
    match first.as_str() {
        "" | "C" | "POSIX" => None,
        _ => Some(first),
    }
}
