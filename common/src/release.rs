//! Lenient release numbers for tool version advisories.
//!
//! Tool versions reported by `pip` or `Cython` do not follow semantic
//! versioning (`24.2`, `3.1.0a1`), so only the leading dotted numeric
//! components are compared. Missing trailing components compare as zero.

use crate::error::ContextError;
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// The numeric release components of a version string.
#[derive(Debug, Clone)]
pub struct ReleaseNumber {
    components: Vec<u64>,
}

impl ReleaseNumber {
    /// Returns the parsed components.
    #[must_use]
    pub fn components(&self) -> &[u64] {
        &self.components
    }

    fn component(&self, index: usize) -> u64 {
        self.components.get(index).copied().unwrap_or(0)
    }
}

impl FromStr for ReleaseNumber {
    type Err = ContextError;

    /// Parses the leading numeric components of `value`.
    ///
    /// # Examples
    ///
    /// ```
    /// use common::ReleaseNumber;
    ///
    /// let cython: ReleaseNumber = "3.1.0a1".parse()?;
    /// let required: ReleaseNumber = "3.0".parse()?;
    /// assert!(cython >= required);
    /// # Ok::<(), common::ContextError>(())
    /// ```
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let mut components = Vec::new();
        for part in value.trim().split('.') {
            let digits: String = part.chars().take_while(char::is_ascii_digit).collect();
            let Ok(number) = digits.parse::<u64>() else {
                break;
            };
            components.push(number);
            if digits.len() != part.len() {
                break;
            }
        }

        if components.is_empty() {
            return Err(ContextError::InvalidReleaseNumber {
                value: value.to_owned(),
            });
        }
        Ok(Self { components })
    }
}

impl PartialEq for ReleaseNumber {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for ReleaseNumber {}

impl PartialOrd for ReleaseNumber {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ReleaseNumber {
    fn cmp(&self, other: &Self) -> Ordering {
        let len = self.components.len().max(other.components.len());
        (0..len)
            .map(|index| self.component(index).cmp(&other.component(index)))
            .find(|ordering| ordering.is_ne())
            .unwrap_or(Ordering::Equal)
    }
}

impl fmt::Display for ReleaseNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered: Vec<String> = self.components.iter().map(u64::to_string).collect();
        f.write_str(&rendered.join("."))
    }
}
