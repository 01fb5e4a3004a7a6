//! Package version resolution.
//!
//! The version lives in a single declaration file (`apache_beam/version.py`)
//! as `__version__ = '<literal>'`. The file is read as text and the literal
//! extracted; it is never executed.

use crate::error::{PackagerError, Result};
use camino::Utf8Path;
use serde::Serialize;
use std::fmt;

/// A validated package version token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct VersionString(String);

impl VersionString {
    /// Validates `token` as a version string.
    ///
    /// Accepts tokens that start with a digit and contain only ASCII
    /// alphanumerics and `.`, `+`, `-`, `_`, `!`.
    ///
    /// # Errors
    ///
    /// Returns a human-readable reason when the token is rejected.
    ///
    /// # Examples
    ///
    /// ```
    /// use sdkprep::version::VersionString;
    ///
    /// assert!(VersionString::parse("2.61.0.dev").is_ok());
    /// assert!(VersionString::parse("latest").is_err());
    /// ```
    pub fn parse(token: &str) -> std::result::Result<Self, String> {
        if token.is_empty() {
            return Err("version literal is empty".to_owned());
        }
        if !token.starts_with(|c: char| c.is_ascii_digit()) {
            return Err(format!("version {token:?} must start with a digit"));
        }
        if let Some(bad) = token
            .chars()
            .find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '.' | '+' | '-' | '_' | '!')))
        {
            return Err(format!("version {token:?} contains invalid character {bad:?}"));
        }
        Ok(Self(token.to_owned()))
    }

    /// Returns the version as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VersionString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Reads the version declaration at `path`.
///
/// # Errors
///
/// Returns [`PackagerError::VersionDeclarationMissing`] when the file does
/// not exist and [`PackagerError::VersionDeclarationMalformed`] when it does
/// not contain exactly one `__version__` assignment to a valid string
/// literal.
pub fn resolve_version(path: &Utf8Path) -> Result<VersionString> {
    if !path.is_file() {
        return Err(PackagerError::VersionDeclarationMissing {
            path: path.to_owned(),
        });
    }
    let contents = std::fs::read_to_string(path)?;
    let version = parse_declaration(&contents).map_err(|reason| {
        PackagerError::VersionDeclarationMalformed {
            path: path.to_owned(),
            reason,
        }
    })?;
    log::debug!("resolved package version {version} from {path}");
    Ok(version)
}

/// Extracts the version from declaration source text.
///
/// # Errors
///
/// Returns a human-readable reason when the text holds zero or several
/// assignments, or when the assigned value is not a plain string literal.
pub fn parse_declaration(contents: &str) -> std::result::Result<VersionString, String> {
    let mut found = Vec::new();
    for (index, line) in contents.lines().enumerate() {
        let Some(rest) = line.strip_prefix("__version__") else {
            continue;
        };
        let rest = rest.trim_start();
        let Some(value) = rest.strip_prefix('=').filter(|v| !v.starts_with('=')) else {
            // `__version__ == x` or `__version__: str = x` are not the plain form.
            if rest.starts_with('=') || rest.starts_with(':') {
                return Err(format!("line {}: unsupported __version__ form", index + 1));
            }
            continue;
        };
        let literal = string_literal(value.trim())
            .ok_or_else(|| format!("line {}: __version__ is not a string literal", index + 1))?;
        found.push(literal);
    }

    match found.as_slice() {
        [] => Err("no __version__ assignment found".to_owned()),
        [single] => VersionString::parse(single),
        many => Err(format!("{} __version__ assignments found", many.len())),
    }
}

/// Parses a single- or double-quoted literal, allowing a trailing comment.
fn string_literal(value: &str) -> Option<&str> {
    let quote = value.chars().next().filter(|c| matches!(c, '\'' | '"'))?;
    let body = value.get(1..)?;
    let end = body.find(quote)?;
    let literal = body.get(..end)?;
    let trailer = body.get(end + 1..)?.trim();
    (trailer.is_empty() || trailer.starts_with('#')).then_some(literal)
}
