//! Target platform identification.
//!
//! A [`Platform`] pairs an operating-system family with the pointer width of
//! the interpreter that will consume the package. Richer target triples are
//! reduced to these two facts.
//!
//! Identifiers are accepted as `<os>` or `<os>-<width>`, where `<os>` is one
//! of `linux`, `darwin`/`macos`, `win32`/`windows`, and `<width>` is `32`,
//! `64`, or an architecture alias such as `x86`, `i686`, `x86_64`, `amd64`,
//! or `arm64`. A bare `<os>` means a 64-bit interpreter, matching the
//! interpreter's own `sys.platform` which reports `win32` for every Windows
//! build.

use crate::error::ContextError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Operating-system family of the target interpreter.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OsFamily {
    /// Linux distributions.
    Linux,
    /// macOS.
    Macos,
    /// Microsoft Windows.
    Windows,
    /// Any other operating system, by its lower-cased name.
    Other(String),
}

impl OsFamily {
    fn parse(token: &str) -> Self {
        match token {
            "linux" => Self::Linux,
            "darwin" | "macos" | "osx" => Self::Macos,
            "win32" | "windows" | "win" | "cygwin" => Self::Windows,
            other => Self::Other(other.to_owned()),
        }
    }

    /// Returns the canonical lower-case name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Linux => "linux",
            Self::Macos => "macos",
            Self::Windows => "windows",
            Self::Other(name) => name,
        }
    }
}

/// Pointer width of the target interpreter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PointerWidth {
    /// 32-bit (`sys.maxsize <= 2**32`).
    #[serde(rename = "32")]
    Bits32,
    /// 64-bit.
    #[serde(rename = "64")]
    Bits64,
}

impl PointerWidth {
    fn parse(token: &str) -> Option<Self> {
        match token {
            "32" | "x86" | "i386" | "i686" | "arm" | "armv7" => Some(Self::Bits32),
            "64" | "x86_64" | "amd64" | "aarch64" | "arm64" => Some(Self::Bits64),
            _ => None,
        }
    }

    /// Returns the width in bits.
    #[must_use]
    pub const fn bits(self) -> u8 {
        match self {
            Self::Bits32 => 32,
            Self::Bits64 => 64,
        }
    }
}

/// The platform a build is being prepared for.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Platform {
    os: OsFamily,
    width: PointerWidth,
}

impl Platform {
    /// Creates a platform from its parts.
    #[must_use]
    pub const fn new(os: OsFamily, width: PointerWidth) -> Self {
        Self { os, width }
    }

    /// 32-bit Windows, the platform several native dependencies do not
    /// publish wheels for.
    #[must_use]
    pub const fn windows_32() -> Self {
        Self::new(OsFamily::Windows, PointerWidth::Bits32)
    }

    /// 64-bit Linux.
    #[must_use]
    pub const fn linux_64() -> Self {
        Self::new(OsFamily::Linux, PointerWidth::Bits64)
    }

    /// Returns the operating-system family.
    #[must_use]
    pub const fn os(&self) -> &OsFamily {
        &self.os
    }

    /// Returns the pointer width.
    #[must_use]
    pub const fn width(&self) -> PointerWidth {
        self.width
    }

    /// Returns `true` for 32-bit Windows.
    #[must_use]
    pub fn is_windows_32(&self) -> bool {
        *self == Self::windows_32()
    }
}

impl FromStr for Platform {
    type Err = ContextError;

    /// Parses `<os>` or `<os>-<width>`.
    ///
    /// # Examples
    ///
    /// ```
    /// use common::platform::{Platform, PointerWidth};
    ///
    /// let win = "windows-32".parse::<Platform>()?;
    /// assert!(win.is_windows_32());
    ///
    /// let linux = "linux".parse::<Platform>()?;
    /// assert_eq!(linux.width(), PointerWidth::Bits64);
    /// # Ok::<(), common::ContextError>(())
    /// ```
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalised = value.trim().to_ascii_lowercase();
        let reject = |reason: &str| ContextError::InvalidPlatform {
            value: value.to_owned(),
            reason: reason.to_owned(),
        };

        let (os_token, width_token) = match normalised.split_once(['-', '_']) {
            Some((os, width)) => (os, Some(width)),
            None => (normalised.as_str(), None),
        };

        if os_token.is_empty() {
            return Err(reject("missing operating system"));
        }

        let width = match width_token {
            None => PointerWidth::Bits64,
            Some(token) => {
                PointerWidth::parse(token).ok_or_else(|| reject("unsupported pointer width"))?
            }
        };

        Ok(Self::new(OsFamily::parse(os_token), width))
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.os.as_str(), self.width.bits())
    }
}
