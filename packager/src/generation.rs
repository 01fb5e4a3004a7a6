//! Artifact generation gates.
//!
//! Each class of derived artifact (schema bindings, cross-language transform
//! wrappers) is guarded by a gate that decides whether to run the generator,
//! accept previously generated output, or fail the build. Planning is kept
//! separate from execution so `build --dry-run` can report decisions without
//! starting a generator.
//!
//! Gates resolve strictly in order; a failure stops the sequence.

use crate::config::{ProjectConfig, SchemaBindingsConfig, TransformWrappersConfig};
use crate::error::{Notice, PackagerError, Result};
use crate::exec::{CommandRunner, combined_output};
use camino::{Utf8Path, Utf8PathBuf};
use log::{debug, info};
use serde::Serialize;
use std::fmt;
use walkdir::WalkDir;

/// A class of derived artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactKind {
    /// Bindings generated from interface-definition schemas.
    SchemaBindings,
    /// Wrapper modules for cross-language transforms.
    TransformWrappers,
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::SchemaBindings => "schema bindings",
            Self::TransformWrappers => "external transform wrappers",
        })
    }
}

/// Test for previously generated output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArtifactPredicate {
    /// At least one file below `dir` (at any depth) ends with `suffix`.
    FilesWithSuffix {
        /// Directory searched recursively.
        dir: Utf8PathBuf,
        /// Required file-name suffix.
        suffix: String,
    },
    /// `dir` exists and holds at least `min_entries` direct entries.
    PopulatedDirectory {
        /// Directory inspected.
        dir: Utf8PathBuf,
        /// Minimum number of entries.
        min_entries: usize,
    },
}

impl ArtifactPredicate {
    /// Returns `true` when generated output is present.
    #[must_use]
    pub fn is_satisfied(&self) -> bool {
        match self {
            Self::FilesWithSuffix { dir, suffix } => WalkDir::new(dir)
                .into_iter()
                .filter_map(std::result::Result::ok)
                .any(|entry| {
                    entry.file_type().is_file()
                        && entry
                            .file_name()
                            .to_str()
                            .is_some_and(|name| name.ends_with(suffix.as_str()))
                }),
            Self::PopulatedDirectory { dir, min_entries } => dir
                .read_dir_utf8()
                .map(|entries| entries.filter_map(std::result::Result::ok).count() >= *min_entries)
                .unwrap_or(false),
        }
    }
}

/// One artifact-generation gate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactGenerationTask {
    /// The artifact class.
    pub kind: ArtifactKind,
    /// Generator script, run through the interpreter.
    pub generator: Utf8PathBuf,
    /// Companion inputs the generator needs besides itself.
    pub required_markers: Vec<Utf8PathBuf>,
    /// Test for output left by an earlier run or shipped in a source
    /// distribution.
    pub existing_artifacts: ArtifactPredicate,
    /// Arguments passed to the generator after its path.
    pub generator_args: Vec<String>,
}

impl ArtifactGenerationTask {
    /// The schema-binding gate, invoked with `--no-force`.
    #[must_use]
    pub fn schema_bindings(root: &Utf8Path, config: &SchemaBindingsConfig) -> Self {
        Self {
            kind: ArtifactKind::SchemaBindings,
            generator: root.join(&config.generator),
            required_markers: Vec::new(),
            existing_artifacts: ArtifactPredicate::FilesWithSuffix {
                dir: root.join(&config.output_dir),
                suffix: config.suffix.clone(),
            },
            generator_args: vec!["--no-force".to_owned()],
        }
    }

    /// The transform-wrapper gate, which also needs the standard external
    /// transforms configuration.
    #[must_use]
    pub fn transform_wrappers(root: &Utf8Path, config: &TransformWrappersConfig) -> Self {
        let transforms_config = root.join(&config.transforms_config);
        Self {
            kind: ArtifactKind::TransformWrappers,
            generator: root.join(&config.generator),
            required_markers: vec![transforms_config.clone()],
            existing_artifacts: ArtifactPredicate::PopulatedDirectory {
                dir: root.join(&config.output_dir),
                min_entries: config.min_entries,
            },
            generator_args: vec![
                "--cleanup".to_owned(),
                "--transforms-config-source".to_owned(),
                transforms_config.into_string(),
            ],
        }
    }

    /// Both gates, in the order they must run.
    #[must_use]
    pub fn all_from_config(root: &Utf8Path, config: &ProjectConfig) -> Vec<Self> {
        vec![
            Self::schema_bindings(root, &config.schema_bindings),
            Self::transform_wrappers(root, &config.transform_wrappers),
        ]
    }

    fn missing_inputs(&self) -> Vec<Utf8PathBuf> {
        std::iter::once(&self.generator)
            .chain(&self.required_markers)
            .filter(|path| !path.exists())
            .cloned()
            .collect()
    }
}

/// What a gate will do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatePlan {
    /// Inputs are missing but generated output exists.
    Skip,
    /// Run the interpreter with these arguments.
    Invoke {
        /// Generator path followed by its arguments.
        args: Vec<String>,
    },
    /// Inputs and generated output are both missing.
    Unresolvable {
        /// The missing inputs.
        missing: Vec<Utf8PathBuf>,
    },
}

/// How a gate resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateOutcome {
    /// The generator ran and exited successfully.
    Generated {
        /// Captured generator output.
        output: String,
    },
    /// Generated output was already present.
    Skipped,
}

/// A resolved gate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GateReport {
    /// The artifact class.
    pub kind: ArtifactKind,
    /// How it resolved.
    pub outcome: GateOutcome,
}

impl GateReport {
    /// The notice to surface for this report, if any.
    #[must_use]
    pub fn notice(&self) -> Option<Notice> {
        matches!(self.outcome, GateOutcome::Skipped)
            .then_some(Notice::ArtifactsPregenerated { kind: self.kind })
    }
}

/// Decides what `task` requires, inspecting only the filesystem.
#[must_use]
pub fn plan(task: &ArtifactGenerationTask) -> GatePlan {
    let missing = task.missing_inputs();
    if missing.is_empty() {
        let args = std::iter::once(task.generator.to_string())
            .chain(task.generator_args.iter().cloned())
            .collect();
        return GatePlan::Invoke { args };
    }
    if task.existing_artifacts.is_satisfied() {
        GatePlan::Skip
    } else {
        GatePlan::Unresolvable { missing }
    }
}

/// Carries out `plan` for `task`.
///
/// # Errors
///
/// Returns [`PackagerError::MissingGeneratorAndArtifacts`] for an
/// unresolvable plan, [`PackagerError::GeneratorProcessFailure`] when the
/// generator exits unsuccessfully, and [`PackagerError::ProcessLaunch`] when
/// the interpreter cannot be started.
pub fn execute(
    task: &ArtifactGenerationTask,
    plan: GatePlan,
    runner: &dyn CommandRunner,
    python: &str,
) -> Result<GateOutcome> {
    match plan {
        GatePlan::Skip => {
            debug!("{} already present; generator not run", task.kind);
            Ok(GateOutcome::Skipped)
        }
        GatePlan::Unresolvable { missing } => Err(missing_error(task, &missing)),
        GatePlan::Invoke { args } => {
            info!("generating {}", task.kind);
            let output = runner.run(python, &args)?;
            let captured = combined_output(&output);
            if output.status.success() {
                debug!("{} generator output: {captured}", task.kind);
                Ok(GateOutcome::Generated { output: captured })
            } else {
                Err(PackagerError::GeneratorProcessFailure {
                    kind: task.kind,
                    code: output.status.code(),
                    output: captured,
                })
            }
        }
    }
}

/// Plans and executes a single gate.
///
/// # Errors
///
/// See [`execute`].
pub fn resolve(
    task: &ArtifactGenerationTask,
    runner: &dyn CommandRunner,
    python: &str,
) -> Result<GateOutcome> {
    execute(task, plan(task), runner, python)
}

/// Resolves `tasks` in order, stopping at the first failure.
///
/// # Errors
///
/// Returns the first gate error.
pub fn resolve_all(
    tasks: &[ArtifactGenerationTask],
    runner: &dyn CommandRunner,
    python: &str,
) -> Result<Vec<GateReport>> {
    tasks
        .iter()
        .map(|task| {
            resolve(task, runner, python).map(|outcome| GateReport {
                kind: task.kind,
                outcome,
            })
        })
        .collect()
}

/// The error for `task` when `missing` inputs leave it unresolvable.
#[must_use]
pub fn missing_error(task: &ArtifactGenerationTask, missing: &[Utf8PathBuf]) -> PackagerError {
    PackagerError::MissingGeneratorAndArtifacts {
        kind: task.kind,
        missing: describe_missing(task, missing),
    }
}

fn describe_missing(task: &ArtifactGenerationTask, missing: &[Utf8PathBuf]) -> String {
    missing
        .iter()
        .map(|path| {
            let name = path.file_name().unwrap_or(path.as_str());
            if *path == task.generator {
                format!("the generation script `{name}`")
            } else {
                format!("the companion input `{name}`")
            }
        })
        .collect::<Vec<_>>()
        .join(" and ")
}
