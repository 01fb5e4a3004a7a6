//! Package data discovery.
//!
//! Ancillary files that ship with the package are declared either as fixed
//! globs relative to the package root (`yaml/*.yaml`) or as recursive
//! searches below a base directory (`*.pyi` anywhere under
//! `portability/api`). Both resolve to paths relative to the package root,
//! merged into one sorted, de-duplicated set.

use crate::error::Notice;
use camino::{Utf8Path, Utf8PathBuf};
use glob::Pattern;
use log::{debug, warn};
use serde::Deserialize;
use std::collections::BTreeSet;
use walkdir::WalkDir;

/// One package-data declaration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PackageDataEntry {
    /// A glob resolved against the package root; `*` stays within one path
    /// component.
    Glob {
        /// Relative glob, e.g. `*/*.pxd`.
        pattern: String,
    },
    /// Every file below `base` whose name matches one of `patterns`.
    Recursive {
        /// Directory relative to the package root.
        base: Utf8PathBuf,
        /// File-name globs, e.g. `*.pyi`.
        patterns: Vec<String>,
    },
}

impl PackageDataEntry {
    /// Creates a glob entry.
    #[must_use]
    pub fn glob(pattern: &str) -> Self {
        Self::Glob {
            pattern: pattern.to_owned(),
        }
    }

    /// Creates a recursive entry.
    #[must_use]
    pub fn recursive(base: &str, patterns: &[&str]) -> Self {
        Self::Recursive {
            base: Utf8PathBuf::from(base),
            patterns: patterns.iter().map(|p| (*p).to_owned()).collect(),
        }
    }

    /// The declarations shipped with the Beam SDK.
    #[must_use]
    pub fn beam_defaults() -> Vec<Self> {
        let mut entries: Vec<Self> = [
            "*/*.pyx",
            "*/*/*.pyx",
            "*/*.pxd",
            "*/*/*.pxd",
            "*/*.h",
            "*/*/*.h",
            "testing/data/*.yaml",
            "yaml/*.yaml",
            "yaml/docs/*.md",
        ]
        .into_iter()
        .map(Self::glob)
        .collect();
        entries.push(Self::recursive("portability/api", &["*.pyi", "*.yaml"]));
        entries
    }
}

/// Result of a discovery pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiscoveredData {
    /// Sorted relative paths, using `/` separators.
    pub files: BTreeSet<String>,
    /// Non-fatal conditions met along the way.
    pub notices: Vec<Notice>,
}

/// Resolves `entries` against `package_root`.
///
/// Never fails: unreadable directories and invalid patterns are skipped, and
/// a recursive base that is missing or holds no matches yields
/// [`Notice::PackageDataDiscoveryEmpty`].
#[must_use]
pub fn discover(package_root: &Utf8Path, entries: &[PackageDataEntry]) -> DiscoveredData {
    let mut data = DiscoveredData::default();
    for entry in entries {
        match entry {
            PackageDataEntry::Glob { pattern } => {
                data.files.extend(expand_glob(package_root, pattern));
            }
            PackageDataEntry::Recursive { base, patterns } => {
                let found = walk_matching(package_root, base, patterns);
                if found.is_empty() {
                    data.notices.push(Notice::PackageDataDiscoveryEmpty {
                        base: package_root.join(base),
                    });
                }
                data.files.extend(found);
            }
        }
    }
    debug!(
        "discovered {} package data files under {package_root}",
        data.files.len()
    );
    data
}

fn expand_glob(package_root: &Utf8Path, pattern: &str) -> Vec<String> {
    let full = format!("{}/{pattern}", Pattern::escape(package_root.as_str()));
    let paths = match glob::glob(&full) {
        Ok(paths) => paths,
        Err(err) => {
            warn!("ignoring invalid package data pattern {pattern:?}: {err}");
            return Vec::new();
        }
    };
    paths
        .filter_map(std::result::Result::ok)
        .filter(|path| path.is_file())
        .filter_map(|path| relative_to(package_root, &path))
        .collect()
}

fn walk_matching(package_root: &Utf8Path, base: &Utf8Path, patterns: &[String]) -> Vec<String> {
    let compiled: Vec<Pattern> = patterns
        .iter()
        .filter_map(|raw| match Pattern::new(raw) {
            Ok(pattern) => Some(pattern),
            Err(err) => {
                warn!("ignoring invalid package data pattern {raw:?}: {err}");
                None
            }
        })
        .collect();
    let root = package_root.join(base);
    if !root.is_dir() {
        return Vec::new();
    }

    WalkDir::new(&root)
        .into_iter()
        .filter_map(|entry| entry.map_err(|err| debug!("skipping {err}")).ok())
        .filter(|entry| entry.file_type().is_file())
        .filter(|entry| {
            entry
                .file_name()
                .to_str()
                .is_some_and(|name| compiled.iter().any(|pattern| pattern.matches(name)))
        })
        .filter_map(|entry| relative_to(package_root, entry.path()))
        .collect()
}

fn relative_to(root: &Utf8Path, path: &std::path::Path) -> Option<String> {
    let relative = path.strip_prefix(root.as_std_path()).ok()?;
    let text = relative.to_str()?;
    Some(text.replace('\\', "/"))
}
