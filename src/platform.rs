//! Host platform identity
//!
//! Resolved once at startup and passed down, so the invocation path switches on
//! an enum instead of comparing OS strings.

/// `CREATE_NO_WINDOW`: keeps a console from flashing up for the child
pub const CREATE_NO_WINDOW: u32 = 0x0800_0000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Windows,
    MacOs,
    /// Linux, the BSDs and every other Unix-like that is not macOS
    Unix,
}

impl Platform {
    /// Platform this binary was built for
    #[must_use]
    pub fn current() -> Self {
        Self::from_os(std::env::consts::OS)
    }

    /// Map a `std::env::consts::OS` value to a platform tag
    #[must_use]
    pub fn from_os(os: &str) -> Self {
        match os {
            "windows" => Self::Windows,
            "macos" | "ios" => Self::MacOs,
            _ => Self::Unix,
        }
    }

    /// Process creation flags applied before launching the formatter
    #[must_use]
    pub fn launch_flags(self) -> Option<u32> {
        match self {
            Self::Windows => Some(CREATE_NO_WINDOW),
            Self::MacOs | Self::Unix => None,
        }
    }

    /// Variable injected into the child environment when no usable locale exists
    #[must_use]
    pub fn locale_override(self) -> Option<(&'static str, &'static str)> {
        match self {
            Self::Unix => Some(("LANG", "en_US.UTF-8")),
            Self::MacOs => Some(("LC_CTYPE", "UTF-8")),
            Self::Windows => None,
        }
    }
}
