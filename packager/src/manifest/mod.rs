//! Dependency manifest assembly.
//!
//! [`assemble_manifest`] turns the declared [`Catalog`] into the concrete
//! install-time and extras lists for one `(platform, interpreter)` pair.
//! The whole catalogue is validated first, whatever the pair: every group,
//! after inclusions are resolved, must select exactly one variant of each
//! package for every platform and supported interpreter.

mod catalog;
mod extras;
mod predicate;
mod requirement;
mod validation;

pub use catalog::{Catalog, CatalogEntry, ExtraDecl, beam_catalog};
pub use predicate::{InterpreterRange, PlatformPredicate};
pub use requirement::{DependencySpec, normalise_name};

use crate::error::Result;
use common::{InterpreterVersion, Platform};
use log::debug;
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;

/// Group label used in diagnostics for install-time dependencies.
pub const INSTALL_GROUP: &str = "install";

/// One entry of an assembled dependency list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ManifestEntry {
    /// A requirement, rendered without its marker.
    Requirement(String),
    /// Stands in for a platform-gated bundle on its excluded platform;
    /// serialises as an empty string.
    Placeholder,
}

impl ManifestEntry {
    /// The requirement text; empty for a placeholder.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Requirement(text) => text,
            Self::Placeholder => "",
        }
    }
}

impl fmt::Display for ManifestEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for ManifestEntry {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Install-time and extras dependency lists for one context.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DependencyManifest {
    /// Always-installed entries, in declaration order.
    pub dependencies: Vec<ManifestEntry>,
    /// Extras groups by name.
    pub extras: BTreeMap<String, Vec<ManifestEntry>>,
}

impl DependencyManifest {
    /// Finds the install-time entry for `package`, by normalised name.
    #[must_use]
    pub fn dependency(&self, package: &str) -> Option<&str> {
        find_entry(&self.dependencies, package)
    }

    /// Finds the entry for `package` in extras group `group`.
    #[must_use]
    pub fn extra(&self, group: &str, package: &str) -> Option<&str> {
        self.extras
            .get(group)
            .and_then(|entries| find_entry(entries, package))
    }
}

fn find_entry<'a>(entries: &'a [ManifestEntry], package: &str) -> Option<&'a str> {
    let wanted = normalise_name(package);
    entries.iter().map(ManifestEntry::as_str).find(|text| {
        let name_len = text
            .find(|c: char| !(c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.')))
            .unwrap_or(text.len());
        text.get(..name_len)
            .is_some_and(|name| !name.is_empty() && normalise_name(name) == wanted)
    })
}

/// Assembles the SDK's manifest for `platform` and `interpreter`.
///
/// # Errors
///
/// Returns a configuration error when the declared catalogue is malformed,
/// ambiguous, incompletely covered, or has bad extras inclusions.
///
/// # Examples
///
/// ```
/// use common::{InterpreterVersion, Platform};
/// use sdkprep::manifest::assemble_manifest;
///
/// let manifest = assemble_manifest(&Platform::windows_32(), InterpreterVersion::new(3, 11))?;
/// assert!(manifest.dependencies.iter().any(|entry| entry.as_str().is_empty()));
/// assert_eq!(manifest.dependency("pyarrow"), None);
/// # Ok::<(), sdkprep::error::PackagerError>(())
/// ```
pub fn assemble_manifest(
    platform: &Platform,
    interpreter: InterpreterVersion,
) -> Result<DependencyManifest> {
    assemble_manifest_from(&beam_catalog(), platform, interpreter)
}

/// Assembles `catalog` for `platform` and `interpreter`.
///
/// # Errors
///
/// See [`assemble_manifest`].
pub fn assemble_manifest_from(
    catalog: &Catalog,
    platform: &Platform,
    interpreter: InterpreterVersion,
) -> Result<DependencyManifest> {
    let install = resolve_entries(&catalog.install, None)?;
    validate(INSTALL_GROUP, &install, catalog.floor)?;

    let mut resolved: BTreeMap<&str, Vec<ResolvedEntry>> = BTreeMap::new();
    for decl in extras::inclusion_order(&catalog.extras)? {
        let mut entries = resolve_entries(&decl.entries, Some(&decl.name))?;
        for included in &decl.includes {
            for entry in resolved.get(included.as_str()).into_iter().flatten() {
                if !entries.iter().any(|existing| existing.same_declaration(entry)) {
                    entries.push(entry.clone());
                }
            }
        }
        validate(&decl.name, &entries, catalog.floor)?;
        resolved.insert(decl.name.as_str(), entries);
    }

    let manifest = DependencyManifest {
        dependencies: select(&install, platform, interpreter),
        extras: resolved
            .into_iter()
            .map(|(name, entries)| (name.to_owned(), select(&entries, platform, interpreter)))
            .collect(),
    };
    debug!(
        "assembled manifest for {platform}, Python {interpreter}: {} dependencies, {} extras groups",
        manifest.dependencies.len(),
        manifest.extras.len()
    );
    Ok(manifest)
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum ResolvedEntry {
    Spec(DependencySpec),
    Bundle {
        excluded_on: Platform,
        specs: Vec<DependencySpec>,
    },
}

impl ResolvedEntry {
    fn specs(&self) -> &[DependencySpec] {
        match self {
            Self::Spec(spec) => std::slice::from_ref(spec),
            Self::Bundle { specs, .. } => specs,
        }
    }

    fn same_declaration(&self, other: &Self) -> bool {
        let key = |entry: &Self| -> Vec<(String, PlatformPredicate)> {
            entry
                .specs()
                .iter()
                .map(|spec| (spec.source().to_owned(), spec.platform().clone()))
                .collect()
        };
        key(self) == key(other)
    }
}

fn resolve_entries(entries: &[CatalogEntry], group: Option<&str>) -> Result<Vec<ResolvedEntry>> {
    entries
        .iter()
        .map(|entry| match entry {
            CatalogEntry::Requirement(text) => {
                DependencySpec::parse(text, PlatformPredicate::Any, group).map(ResolvedEntry::Spec)
            }
            CatalogEntry::Restricted {
                predicate,
                requirement,
            } => DependencySpec::parse(requirement, predicate.clone(), group)
                .map(ResolvedEntry::Spec),
            CatalogEntry::Bundle {
                excluded_on,
                requirements,
            } => requirements
                .iter()
                .map(|text| {
                    DependencySpec::parse(
                        text,
                        PlatformPredicate::Excluding(excluded_on.clone()),
                        group,
                    )
                })
                .collect::<Result<Vec<_>>>()
                .map(|specs| ResolvedEntry::Bundle {
                    excluded_on: excluded_on.clone(),
                    specs,
                }),
        })
        .collect()
}

fn validate(group: &str, entries: &[ResolvedEntry], floor: InterpreterVersion) -> Result<()> {
    let specs: Vec<&DependencySpec> = entries.iter().flat_map(ResolvedEntry::specs).collect();
    validation::validate_group(group, &specs, floor)
}

fn select(
    entries: &[ResolvedEntry],
    platform: &Platform,
    interpreter: InterpreterVersion,
) -> Vec<ManifestEntry> {
    let mut selected = Vec::new();
    for entry in entries {
        match entry {
            ResolvedEntry::Bundle { excluded_on, .. } if excluded_on == platform => {
                selected.push(ManifestEntry::Placeholder);
            }
            _ => selected.extend(
                entry
                    .specs()
                    .iter()
                    .filter(|spec| spec.applies_to(platform, interpreter))
                    .map(|spec| ManifestEntry::Requirement(spec.requirement())),
            ),
        }
    }
    selected
}
