//! Interpreter version handling.
//!
//! Dependency markers only ever compare `MAJOR.MINOR`, so patch levels and
//! pre-release suffixes (`3.13.0rc1`) are accepted and dropped at parse time.

use crate::error::ContextError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A `MAJOR.MINOR` interpreter version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct InterpreterVersion {
    major: u32,
    minor: u32,
}

impl InterpreterVersion {
    /// Creates a version from its components.
    #[must_use]
    pub const fn new(major: u32, minor: u32) -> Self {
        Self { major, minor }
    }

    /// Returns the major component.
    #[must_use]
    pub const fn major(self) -> u32 {
        self.major
    }

    /// Returns the minor component.
    #[must_use]
    pub const fn minor(self) -> u32 {
        self.minor
    }

    /// The next minor release within the same major series.
    ///
    /// # Examples
    ///
    /// ```
    /// use common::InterpreterVersion;
    ///
    /// assert_eq!(
    ///     InterpreterVersion::new(3, 12).successor(),
    ///     InterpreterVersion::new(3, 13)
    /// );
    /// ```
    #[must_use]
    pub const fn successor(self) -> Self {
        Self::new(self.major, self.minor.saturating_add(1))
    }

    /// The previous minor release, or the open end of the previous major
    /// series when `minor` is zero. Returns `None` for `0.0`.
    #[must_use]
    pub const fn predecessor(self) -> Option<Self> {
        if self.minor > 0 {
            Some(Self::new(self.major, self.minor - 1))
        } else if self.major > 0 {
            Some(Self::new(self.major - 1, u32::MAX))
        } else {
            None
        }
    }
}

impl FromStr for InterpreterVersion {
    type Err = ContextError;

    /// Parses `MAJOR.MINOR`, ignoring any trailing patch or suffix.
    ///
    /// # Examples
    ///
    /// ```
    /// use common::InterpreterVersion;
    ///
    /// let version: InterpreterVersion = "3.13.0rc1".parse()?;
    /// assert_eq!(version, InterpreterVersion::new(3, 13));
    /// # Ok::<(), common::ContextError>(())
    /// ```
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let reject = |reason: &str| ContextError::InvalidInterpreterVersion {
            value: value.to_owned(),
            reason: reason.to_owned(),
        };

        let mut parts = value.trim().split('.');
        let major = parts
            .next()
            .filter(|part| !part.is_empty())
            .ok_or_else(|| reject("missing major version"))?
            .parse::<u32>()
            .map_err(|_| reject("major version is not a number"))?;
        let minor_token = parts.next().ok_or_else(|| reject("missing minor version"))?;
        let digits: String = minor_token
            .chars()
            .take_while(char::is_ascii_digit)
            .collect();
        let minor = digits
            .parse::<u32>()
            .map_err(|_| reject("minor version is not a number"))?;

        Ok(Self::new(major, minor))
    }
}

impl fmt::Display for InterpreterVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}
