//! Error and notice types for the packaging pipeline.
//!
//! Fatal conditions are [`PackagerError`] variants and abort the build.
//! Degraded-but-acceptable conditions are [`Notice`] values: they are logged,
//! collected into the build report, and never travel through a `Result`.

use crate::generation::ArtifactKind;
use camino::Utf8PathBuf;
use common::ContextError;
use std::fmt;
use thiserror::Error;

/// Errors that abort a build or an auxiliary command.
#[derive(Debug, Error)]
pub enum PackagerError {
    /// The version declaration file does not exist.
    #[error("version declaration not found at {path}")]
    VersionDeclarationMissing {
        /// Where the declaration was expected.
        path: Utf8PathBuf,
    },

    /// The version declaration exists but does not hold exactly one usable
    /// assignment.
    #[error("malformed version declaration in {path}: {reason}")]
    VersionDeclarationMalformed {
        /// The declaration file.
        path: Utf8PathBuf,
        /// What was wrong with it.
        reason: String,
    },

    /// Neither the generator nor previously generated output is available.
    #[error("{kind} have not been generated and {missing} could not be found")]
    MissingGeneratorAndArtifacts {
        /// The artefact class that could not be resolved.
        kind: ArtifactKind,
        /// Human-readable list of the missing inputs.
        missing: String,
    },

    /// A generator exited unsuccessfully.
    #[error("could not generate {kind}: generator exited with {}: {output}", describe_code(*.code))]
    GeneratorProcessFailure {
        /// The artefact class being generated.
        kind: ArtifactKind,
        /// Exit code, or `None` when terminated by a signal.
        code: Option<i32>,
        /// Captured stdout and stderr.
        output: String,
    },

    /// A generator or tool could not be started at all.
    #[error("failed to launch {program}: {source}")]
    ProcessLaunch {
        /// The program that failed to start.
        program: String,
        /// The underlying spawn error.
        #[source]
        source: std::io::Error,
    },

    /// An auxiliary command's external tool reported failure.
    #[error("{tool} exited with {}: {output}", describe_code(*.code))]
    AuxiliaryToolFailure {
        /// The external tool.
        tool: String,
        /// Exit code, or `None` when terminated by a signal.
        code: Option<i32>,
        /// Captured stdout and stderr.
        output: String,
    },

    /// No auxiliary command is registered under the requested name.
    #[error("unknown command {name}; registered commands: {available}")]
    UnknownCommand {
        /// The requested name.
        name: String,
        /// Comma-separated registered names.
        available: String,
    },

    /// Two specifications for one package can both apply to the same
    /// platform and interpreter.
    #[error("ambiguous dependency predicates for {package} in {group}: {first} overlaps {second}")]
    AmbiguousDependencyPredicate {
        /// The normalised package name.
        package: String,
        /// `install` or the extras group name.
        group: String,
        /// The first overlapping requirement.
        first: String,
        /// The second overlapping requirement.
        second: String,
    },

    /// Interpreter-gated variants of a package leave some supported
    /// interpreter versions without a selection.
    #[error("interpreter-gated variants of {package} in {group} do not cover {gap}")]
    IncompleteDependencyCoverage {
        /// The normalised package name.
        package: String,
        /// `install` or the extras group name.
        group: String,
        /// Description of the uncovered range.
        gap: String,
    },

    /// A requirement string in the dependency catalogue could not be parsed.
    #[error("malformed requirement {requirement:?}: {reason}")]
    MalformedRequirement {
        /// The offending requirement.
        requirement: String,
        /// Why it was rejected.
        reason: String,
    },

    /// An extras group includes a group that is not declared.
    #[error("extras group {group} includes undeclared group {included}")]
    UnknownExtrasGroup {
        /// The including group.
        group: String,
        /// The missing group.
        included: String,
    },

    /// Two extras groups share a name.
    #[error("extras group {group} is declared more than once")]
    DuplicateExtrasGroup {
        /// The repeated name.
        group: String,
    },

    /// Extras group inclusions form a cycle.
    #[error("extras group inclusion cycle through {group}")]
    CyclicExtrasInclusion {
        /// A group on the cycle.
        group: String,
    },

    /// The interpreter version could not be determined.
    #[error("could not determine interpreter version from {program}: {reason}")]
    InterpreterProbe {
        /// The interpreter that was queried.
        program: String,
        /// Why the probe failed.
        reason: String,
    },

    /// A platform or interpreter identifier was invalid.
    #[error(transparent)]
    Context(#[from] ContextError),

    /// The project configuration file could not be parsed.
    #[error("invalid configuration at {path}: {reason}")]
    InvalidConfig {
        /// The configuration file.
        path: Utf8PathBuf,
        /// Description of the parse error.
        reason: String,
    },

    /// The project root is not valid UTF-8.
    #[error("project root is not valid UTF-8: {path}")]
    NonUtf8Path {
        /// Lossy rendering of the path.
        path: String,
    },

    /// The manifest could not be serialised.
    #[error("failed to serialise manifest: {0}")]
    Serialise(#[from] serde_json::Error),

    /// Writing output failed.
    #[error("failed to write output")]
    WriteFailed {
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    /// An I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Test stub received an unexpected or mismatched command invocation.
    #[cfg(any(test, feature = "test-support"))]
    #[error("stub mismatch: {message}")]
    StubMismatch {
        /// Description of what was expected versus what was received.
        message: String,
    },
}

impl PackagerError {
    /// Returns `true` for errors that indicate a defect in the declared
    /// dependency data rather than in the build environment.
    #[must_use]
    pub fn is_configuration_defect(&self) -> bool {
        matches!(
            self,
            Self::AmbiguousDependencyPredicate { .. }
                | Self::IncompleteDependencyCoverage { .. }
                | Self::MalformedRequirement { .. }
                | Self::UnknownExtrasGroup { .. }
                | Self::DuplicateExtrasGroup { .. }
                | Self::CyclicExtrasInclusion { .. }
        )
    }
}

fn describe_code(code: Option<i32>) -> String {
    code.map_or_else(|| "no exit status".to_owned(), |code| format!("status {code}"))
}

/// Result type alias using [`PackagerError`].
pub type Result<T> = std::result::Result<T, PackagerError>;

/// Non-fatal conditions surfaced during a build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// Generated artefacts were found and the missing generator was skipped.
    ArtifactsPregenerated {
        /// The artefact class.
        kind: ArtifactKind,
    },
    /// The documentation example source directory does not exist.
    DocsSourceMissing {
        /// The directory that was looked for.
        path: Utf8PathBuf,
    },
    /// Copying documentation examples failed part-way.
    DocsSyncFailed {
        /// Description of the I/O failure.
        reason: String,
    },
    /// A package-data base directory produced no files.
    PackageDataDiscoveryEmpty {
        /// The base directory that was searched.
        base: Utf8PathBuf,
    },
    /// The native array library or compiler front-end is unavailable.
    ExtensionCapabilityUnavailable {
        /// Why the capability query failed.
        reason: String,
    },
    /// The interpreter is newer than the tested range.
    UntestedInterpreter {
        /// The interpreter version, as `MAJOR.MINOR`.
        version: String,
    },
    /// The interpreter is older than the declared floor.
    UnsupportedInterpreter {
        /// The interpreter version, as `MAJOR.MINOR`.
        version: String,
        /// The declared requirement, e.g. `>=3.9`.
        requires: String,
    },
    /// An installed build tool is older than recommended.
    OutdatedTool {
        /// The tool name.
        tool: String,
        /// The installed version.
        installed: String,
        /// The recommended minimum.
        recommended: String,
    },
    /// The README could not be read; the built-in description was used.
    LongDescriptionFallback {
        /// The README path that was looked for.
        path: Utf8PathBuf,
    },
}

impl Notice {
    /// Logs the notice at warning level (informational notices at info).
    pub fn log(&self) {
        match self {
            Self::ArtifactsPregenerated { .. } | Self::LongDescriptionFallback { .. } => {
                log::info!("{self}");
            }
            _ => log::warn!("{self}"),
        }
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ArtifactsPregenerated { kind } => {
                write!(f, "skipping {kind} generation as they are already generated")
            }
            Self::DocsSourceMissing { path } => write!(
                f,
                "could not locate documentation source directory {path}; skipping copying examples from docs"
            ),
            Self::DocsSyncFailed { reason } => {
                write!(f, "documentation examples were not copied: {reason}")
            }
            Self::PackageDataDiscoveryEmpty { base } => {
                write!(f, "no package data found under {base}")
            }
            Self::ExtensionCapabilityUnavailable { reason } => write!(
                f,
                "native extension compilation skipped: {reason}"
            ),
            Self::UntestedInterpreter { version } => write!(
                f,
                "this version of the SDK has not been sufficiently tested on Python {version}; you may encounter bugs or missing features"
            ),
            Self::UnsupportedInterpreter { version, requires } => write!(
                f,
                "Python {version} does not satisfy the declared requirement {requires}"
            ),
            Self::OutdatedTool {
                tool,
                installed,
                recommended,
            } => write!(
                f,
                "you are using version {installed} of {tool}; however, the recommended minimum version is {recommended}"
            ),
            Self::LongDescriptionFallback { path } => write!(
                f,
                "{path} not found; using the built-in long description"
            ),
        }
    }
}
