//! Build pipeline orchestration.
//!
//! [`run_build`] drives every preparation step for one invocation and
//! returns the package manifest. Steps run in a fixed order: version, then
//! the artifact gates (each must resolve before the next starts), then the
//! best-effort steps (documentation sync, extension selection, package-data
//! discovery, toolchain advisories), and finally metadata and dependency
//! assembly. A fatal error at any point returns before a manifest exists.
//!
//! [`plan_build`] computes the same decisions without running generators or
//! touching the filesystem, for `build --dry-run`.

use crate::advisories;
use crate::config::ProjectConfig;
use crate::docs::{self, DocSyncOutcome};
use crate::error::{Notice, PackagerError, Result};
use crate::exec::{self, CommandRunner};
use crate::extensions::{self, ExtensionDescriptor, ExtensionSelection};
use crate::generation::{self, ArtifactGenerationTask, GatePlan, GateReport};
use crate::manifest::{self, DependencyManifest, ManifestEntry};
use crate::metadata::{self, PackageMetadata};
use crate::output::write_stderr_line;
use crate::package_data;
use crate::version::{self, VersionString};
use camino::{Utf8Path, Utf8PathBuf};
use common::{InterpreterVersion, Platform};
use log::debug;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::io::Write;

/// Interpreter snippet printing `MAJOR.MINOR`.
pub const INTERPRETER_QUERY: &str = "import sys; print('%d.%d' % sys.version_info[:2])";

/// Interpreter snippet printing `sys.platform` and the pointer width, as
/// `<platform>-<bits>`.
pub const PLATFORM_QUERY: &str =
    "import sys; print('%s-%d' % (sys.platform, 64 if sys.maxsize > 2**32 else 32))";

/// Everything a build needs to know about the invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvocationContext {
    /// Requested build command tokens, e.g. `build_ext`.
    pub commands: Vec<String>,
    /// Target platform.
    pub platform: Platform,
    /// Target interpreter version.
    pub interpreter: InterpreterVersion,
    /// Project root.
    pub root: Utf8PathBuf,
    /// Interpreter used for generators and probes.
    pub python: String,
    /// Suppress progress lines.
    pub quiet: bool,
}

/// The manifest written at the end of a successful build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PackageManifest {
    /// Distribution name.
    pub name: String,
    /// Resolved version.
    pub version: VersionString,
    /// Install-time dependencies.
    pub dependencies: Vec<ManifestEntry>,
    /// Extras groups.
    pub extras: BTreeMap<String, Vec<ManifestEntry>>,
    /// Package data files, relative to the package directory.
    pub package_data: BTreeSet<String>,
    /// Native extensions to compile.
    pub ext_modules: Vec<ExtensionDescriptor>,
    /// Descriptive metadata.
    #[serde(flatten)]
    pub metadata: PackageMetadata,
}

/// Result of a successful build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildReport {
    /// The manifest to write.
    pub manifest: PackageManifest,
    /// How each artifact gate resolved, in order.
    pub gates: Vec<GateReport>,
    /// Every non-fatal condition met, in the order encountered.
    pub notices: Vec<Notice>,
}

/// A gate and what it would do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedGate {
    /// The gate.
    pub task: ArtifactGenerationTask,
    /// Its decision.
    pub plan: GatePlan,
}

/// Decisions a build would take, computed without side effects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildPlan {
    /// Resolved version.
    pub version: VersionString,
    /// Gate decisions, in order.
    pub gates: Vec<PlannedGate>,
    /// Extension selection for the requested commands.
    pub extensions: ExtensionSelection,
    /// Dependency manifest for the target context.
    pub dependencies: DependencyManifest,
}

impl BuildPlan {
    /// Fails with the first unresolvable gate, as a real build would.
    ///
    /// # Errors
    ///
    /// Returns [`PackagerError::MissingGeneratorAndArtifacts`] for the first
    /// gate whose plan is [`GatePlan::Unresolvable`].
    pub fn check(&self) -> Result<()> {
        self.gates.iter().try_for_each(|gate| match &gate.plan {
            GatePlan::Unresolvable { missing } => {
                Err(generation::missing_error(&gate.task, missing))
            }
            GatePlan::Skip | GatePlan::Invoke { .. } => Ok(()),
        })
    }
}

/// Asks `python` for its `MAJOR.MINOR` version.
///
/// # Errors
///
/// Returns [`PackagerError::InterpreterProbe`] when the interpreter cannot
/// run the query or prints something unparseable.
pub fn probe_interpreter(runner: &dyn CommandRunner, python: &str) -> Result<InterpreterVersion> {
    let reject = |reason: String| PackagerError::InterpreterProbe {
        program: python.to_owned(),
        reason,
    };
    let printed =
        exec::probe(runner, python, &exec::args(&["-c", INTERPRETER_QUERY])).map_err(reject)?;
    printed
        .parse()
        .map_err(|err: common::ContextError| reject(err.to_string()))
}

/// Asks `python` which platform and pointer width it was built for.
///
/// The pointer width is the interpreter's, which may differ from this
/// binary's.
///
/// # Errors
///
/// Returns [`PackagerError::InterpreterProbe`] when the interpreter cannot
/// run the query or prints something unparseable.
pub fn probe_platform(runner: &dyn CommandRunner, python: &str) -> Result<Platform> {
    let reject = |reason: String| PackagerError::InterpreterProbe {
        program: python.to_owned(),
        reason,
    };
    let printed =
        exec::probe(runner, python, &exec::args(&["-c", PLATFORM_QUERY])).map_err(reject)?;
    printed
        .parse()
        .map_err(|err: common::ContextError| reject(err.to_string()))
}

/// Runs the full preparation pipeline.
///
/// # Errors
///
/// Returns the first fatal error: a missing or malformed version
/// declaration, an unresolvable or failing artifact gate, or a defect in the
/// dependency catalogue.
pub fn run_build(
    context: &InvocationContext,
    config: &ProjectConfig,
    runner: &dyn CommandRunner,
    stderr: &mut dyn Write,
) -> Result<BuildReport> {
    let root = context.root.as_path();
    let mut notices = Vec::new();

    let version = version::resolve_version(&root.join(&config.version_file))?;
    progress(context, stderr, format!("Preparing {} {version}", config.name));

    let tasks = ArtifactGenerationTask::all_from_config(root, config);
    let gates = generation::resolve_all(&tasks, runner, &context.python)?;
    notices.extend(gates.iter().filter_map(GateReport::notice));

    match docs::sync_from_config(root, &config.docs) {
        DocSyncOutcome::Synced { files } => {
            progress(context, stderr, format!("Copied {} documentation examples", files.len()));
        }
        DocSyncOutcome::Unavailable(notice) => notices.push(notice),
    }

    let selection = extensions::select_extensions(
        &context.commands,
        &config.extensions,
        root,
        runner,
        &context.python,
    );
    let ext_modules = take_descriptors(selection, &mut notices);
    if !ext_modules.is_empty() {
        progress(
            context,
            stderr,
            format!("Selected {} native extension modules", ext_modules.len()),
        );
    }

    let discovered = package_data::discover(&root.join(&config.package_dir), &config.package_data);
    notices.extend(discovered.notices);

    notices.extend(advisories::collect(runner, &context.python, context.interpreter));

    let (metadata, readme_notice) = metadata::package_metadata(&root.join(&config.readme));
    notices.extend(readme_notice);

    let dependencies = manifest::assemble_manifest(&context.platform, context.interpreter)?;

    for notice in &notices {
        notice.log();
    }
    debug!(
        "build for {} on Python {} finished with {} notices",
        context.platform,
        context.interpreter,
        notices.len()
    );

    Ok(BuildReport {
        manifest: PackageManifest {
            name: config.name.clone(),
            version,
            dependencies: dependencies.dependencies,
            extras: dependencies.extras,
            package_data: discovered.files,
            ext_modules,
            metadata,
        },
        gates,
        notices,
    })
}

/// Computes what [`run_build`] would do.
///
/// Only the read-only capability query reaches `runner`.
///
/// # Errors
///
/// Returns version and dependency-catalogue errors. Unresolvable gates are
/// reported in the plan; see [`BuildPlan::check`].
pub fn plan_build(
    context: &InvocationContext,
    config: &ProjectConfig,
    runner: &dyn CommandRunner,
) -> Result<BuildPlan> {
    let root = context.root.as_path();
    let version = version::resolve_version(&root.join(&config.version_file))?;
    let gates = ArtifactGenerationTask::all_from_config(root, config)
        .into_iter()
        .map(|task| {
            let plan = generation::plan(&task);
            PlannedGate { task, plan }
        })
        .collect();
    let extensions = extensions::select_extensions(
        &context.commands,
        &config.extensions,
        root,
        runner,
        &context.python,
    );
    let dependencies = manifest::assemble_manifest(&context.platform, context.interpreter)?;
    Ok(BuildPlan {
        version,
        gates,
        extensions,
        dependencies,
    })
}

/// Writes `value` as pretty-printed JSON followed by a newline.
///
/// # Errors
///
/// Returns [`PackagerError::Serialise`] or [`PackagerError::WriteFailed`].
pub fn write_json<T: Serialize + ?Sized>(value: &T, out: &mut dyn Write) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    writeln!(out, "{json}").map_err(|source| PackagerError::WriteFailed { source })
}

/// Writes `value` as JSON to `path`, creating parent directories.
///
/// # Errors
///
/// See [`write_json`].
pub fn write_json_file<T: Serialize + ?Sized>(value: &T, path: &Utf8Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|source| PackagerError::WriteFailed { source })?;
    }
    let mut file =
        std::fs::File::create(path).map_err(|source| PackagerError::WriteFailed { source })?;
    write_json(value, &mut file)
}

fn take_descriptors(
    selection: ExtensionSelection,
    notices: &mut Vec<Notice>,
) -> Vec<ExtensionDescriptor> {
    match selection {
        ExtensionSelection::Compile(descriptors) => descriptors,
        ExtensionSelection::NotRequested => Vec::new(),
        ExtensionSelection::CapabilityUnavailable(notice) => {
            notices.push(notice);
            Vec::new()
        }
    }
}

fn progress(context: &InvocationContext, stderr: &mut dyn Write, message: impl std::fmt::Display) {
    if !context.quiet {
        write_stderr_line(stderr, message);
    }
}

#[cfg(test)]
#[path = "pipeline_tests.rs"]
mod tests;
