//! Native extension selection.
//!
//! Performance-critical modules are compiled to native extensions, but only
//! when the build was asked to produce binaries (`bdist_wheel`, `build_ext`,
//! `editable_wheel`). Compilation needs the compiler front-end and the array
//! library's headers; both are located through a single interpreter query,
//! and their absence downgrades the build to pure-interpreter modules.

use crate::config::ExtensionsConfig;
use crate::error::Notice;
use crate::exec::{self, CommandRunner};
use camino::{Utf8Path, Utf8PathBuf};
use glob::Pattern;
use log::{debug, warn};
use serde::Serialize;

/// Interpreter snippet that fails unless both the compiler front-end and the
/// array library import, and prints the array library's include directory.
pub const CAPABILITY_QUERY: &str = "import Cython, numpy; print(numpy.get_include())";

/// One module to compile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExtensionDescriptor {
    /// Dotted module name, e.g. `apache_beam.coders.coder_impl`.
    pub name: String,
    /// Source path relative to the project root.
    pub source_path: Utf8PathBuf,
    /// Extra header directories.
    pub include_paths: Vec<Utf8PathBuf>,
}

/// Result of extension selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtensionSelection {
    /// Compile these modules.
    Compile(Vec<ExtensionDescriptor>),
    /// No requested command produces extensions; nothing was queried.
    NotRequested,
    /// Extensions were requested but the toolchain is unavailable.
    CapabilityUnavailable(Notice),
}

impl ExtensionSelection {
    /// The descriptors to compile, empty unless [`Self::Compile`].
    #[must_use]
    pub fn descriptors(&self) -> &[ExtensionDescriptor] {
        match self {
            Self::Compile(descriptors) => descriptors,
            Self::NotRequested | Self::CapabilityUnavailable(_) => &[],
        }
    }
}

/// Returns `true` when any requested command compiles extensions.
#[must_use]
pub fn requests_extensions(commands: &[String], extension_commands: &[String]) -> bool {
    commands
        .iter()
        .any(|command| extension_commands.contains(command))
}

/// Decides which modules to compile for `commands`.
///
/// The capability query runs only when a requested command compiles
/// extensions.
#[must_use]
pub fn select_extensions(
    commands: &[String],
    config: &ExtensionsConfig,
    root: &Utf8Path,
    runner: &dyn CommandRunner,
    python: &str,
) -> ExtensionSelection {
    if !requests_extensions(commands, &config.commands) {
        debug!("no extension-producing command requested");
        return ExtensionSelection::NotRequested;
    }

    let include_dir = match query_include_dir(runner, python) {
        Ok(dir) => dir,
        Err(reason) => {
            return ExtensionSelection::CapabilityUnavailable(
                Notice::ExtensionCapabilityUnavailable { reason },
            );
        }
    };

    let descriptors = expand_sources(root, &config.sources)
        .into_iter()
        .map(|source_path| ExtensionDescriptor {
            name: module_name(&source_path),
            source_path,
            include_paths: vec![include_dir.clone()],
        })
        .collect();
    ExtensionSelection::Compile(descriptors)
}

/// Asks the interpreter for the array library's include directory.
///
/// # Errors
///
/// Returns a readable reason when the query cannot run, exits unsuccessfully,
/// or prints nothing.
pub fn query_include_dir(
    runner: &dyn CommandRunner,
    python: &str,
) -> std::result::Result<Utf8PathBuf, String> {
    let stdout = exec::probe(runner, python, &exec::args(&["-c", CAPABILITY_QUERY]))?;
    let dir = stdout.lines().last().map(str::trim).unwrap_or_default();
    if dir.is_empty() {
        return Err("capability query printed no include directory".to_owned());
    }
    Ok(Utf8PathBuf::from(dir))
}

/// Expands glob sources against `root` and keeps literal sources verbatim.
///
/// Each glob's matches are sorted; order across sources follows the
/// declaration, and repeated paths are listed once.
#[must_use]
pub fn expand_sources(root: &Utf8Path, sources: &[String]) -> Vec<Utf8PathBuf> {
    let mut expanded: Vec<Utf8PathBuf> = Vec::new();
    for source in sources {
        let candidates = if is_glob(source) {
            expand_glob(root, source)
        } else {
            vec![Utf8PathBuf::from(source)]
        };
        for candidate in candidates {
            if !expanded.contains(&candidate) {
                expanded.push(candidate);
            }
        }
    }
    expanded
}

/// Derives the dotted module name from a relative source path.
///
/// # Examples
///
/// ```
/// use camino::Utf8Path;
/// use sdkprep::extensions::module_name;
///
/// assert_eq!(
///     module_name(Utf8Path::new("apache_beam/utils/windowed_value.py")),
///     "apache_beam.utils.windowed_value"
/// );
/// ```
#[must_use]
pub fn module_name(source: &Utf8Path) -> String {
    source
        .with_extension("")
        .components()
        .map(|component| component.as_str())
        .filter(|part| !matches!(*part, "." | "/" | "\\"))
        .collect::<Vec<_>>()
        .join(".")
}

fn is_glob(source: &str) -> bool {
    source.contains(['*', '?', '['])
}

fn expand_glob(root: &Utf8Path, pattern: &str) -> Vec<Utf8PathBuf> {
    let full = format!("{}/{pattern}", Pattern::escape(root.as_str()));
    let paths = match glob::glob(&full) {
        Ok(paths) => paths,
        Err(err) => {
            warn!("ignoring invalid extension source pattern {pattern:?}: {err}");
            return Vec::new();
        }
    };
    let mut matched: Vec<Utf8PathBuf> = paths
        .filter_map(std::result::Result::ok)
        .filter(|path| path.is_file())
        .filter_map(|path| {
            let relative = path.strip_prefix(root.as_std_path()).ok()?;
            let text = relative.to_str()?.replace('\\', "/");
            Some(Utf8PathBuf::from(text))
        })
        .collect();
    matched.sort();
    matched
}
