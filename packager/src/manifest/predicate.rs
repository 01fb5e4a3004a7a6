//! Platform and interpreter predicates on dependency specifications.

use common::{InterpreterVersion, Platform};
use std::fmt;

/// Which platforms a specification applies to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PlatformPredicate {
    /// Every platform.
    Any,
    /// Exactly one platform.
    Only(Platform),
    /// Every platform but one.
    Excluding(Platform),
}

impl PlatformPredicate {
    /// Returns `true` when the predicate holds on `platform`.
    #[must_use]
    pub fn matches(&self, platform: &Platform) -> bool {
        match self {
            Self::Any => true,
            Self::Only(only) => only == platform,
            Self::Excluding(excluded) => excluded != platform,
        }
    }

    /// Returns `true` for platforms not named by any predicate.
    #[must_use]
    pub fn matches_unnamed(&self) -> bool {
        !matches!(self, Self::Only(_))
    }

    /// Returns `true` when some platform satisfies both predicates.
    #[must_use]
    pub fn overlaps(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Any, _) | (_, Self::Any) | (Self::Excluding(_), Self::Excluding(_)) => true,
            (Self::Only(a), Self::Only(b)) => a == b,
            (Self::Only(only), Self::Excluding(excluded))
            | (Self::Excluding(excluded), Self::Only(only)) => only != excluded,
        }
    }

    /// The platform this predicate names, if any.
    #[must_use]
    pub fn named_platform(&self) -> Option<&Platform> {
        match self {
            Self::Any => None,
            Self::Only(platform) | Self::Excluding(platform) => Some(platform),
        }
    }
}

impl fmt::Display for PlatformPredicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Any => f.write_str("all platforms"),
            Self::Only(platform) => write!(f, "{platform} only"),
            Self::Excluding(platform) => write!(f, "all platforms except {platform}"),
        }
    }
}

/// An inclusive range of `MAJOR.MINOR` interpreter versions.
///
/// `None` bounds are open. `python_version < "3.12"` becomes `..=3.11`;
/// `python_version >= "3.13"` becomes `3.13..`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct InterpreterRange {
    min: Option<InterpreterVersion>,
    max: Option<InterpreterVersion>,
}

impl InterpreterRange {
    /// Every interpreter.
    #[must_use]
    pub const fn unbounded() -> Self {
        Self {
            min: None,
            max: None,
        }
    }

    /// Creates a range from inclusive bounds.
    #[must_use]
    pub const fn new(min: Option<InterpreterVersion>, max: Option<InterpreterVersion>) -> Self {
        Self { min, max }
    }

    /// Inclusive lower bound.
    #[must_use]
    pub const fn min(&self) -> Option<InterpreterVersion> {
        self.min
    }

    /// Inclusive upper bound.
    #[must_use]
    pub const fn max(&self) -> Option<InterpreterVersion> {
        self.max
    }

    /// Returns `true` when neither bound is set.
    #[must_use]
    pub const fn is_unbounded(&self) -> bool {
        self.min.is_none() && self.max.is_none()
    }

    /// Returns `true` when no version satisfies the range.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        matches!((self.min, self.max), (Some(min), Some(max)) if min > max)
    }

    /// Returns `true` when `version` lies within the range.
    #[must_use]
    pub fn contains(&self, version: InterpreterVersion) -> bool {
        self.min.is_none_or(|min| version >= min) && self.max.is_none_or(|max| version <= max)
    }

    /// Narrows the range by another; the result may be empty.
    #[must_use]
    pub fn intersect(&self, other: &Self) -> Self {
        let min = match (self.min, other.min) {
            (Some(a), Some(b)) => Some(a.max(b)),
            (a, b) => a.or(b),
        };
        let max = match (self.max, other.max) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        };
        Self { min, max }
    }

    /// Returns `true` when some version satisfies both ranges.
    #[must_use]
    pub fn overlaps(&self, other: &Self) -> bool {
        !self.intersect(other).is_empty()
    }
}

impl fmt::Display for InterpreterRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.min, self.max) {
            (None, None) => f.write_str("any interpreter"),
            (Some(min), None) => write!(f, "{min} and later"),
            (None, Some(max)) => write!(f, "{max} and earlier"),
            (Some(min), Some(max)) if min == max => write!(f, "{min}"),
            (Some(min), Some(max)) => write!(f, "{min} to {max}"),
        }
    }
}
