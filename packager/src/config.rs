//! Project layout configuration.
//!
//! The packager reads an optional `sdkprep.toml` from the project root.
//! Every field has a default describing the Apache Beam Python SDK layout, so
//! an absent file, or one that overrides a single key, both work. Paths are
//! relative to the project root unless noted otherwise.

use crate::error::{PackagerError, Result};
use crate::package_data::PackageDataEntry;
use camino::{Utf8Path, Utf8PathBuf};
use log::debug;
use serde::Deserialize;

/// Name of the configuration file looked up in the project root.
pub const CONFIG_FILE_NAME: &str = "sdkprep.toml";

/// Full project configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProjectConfig {
    /// Distribution name written to the manifest.
    pub name: String,
    /// Top-level package directory.
    pub package_dir: Utf8PathBuf,
    /// File holding the `__version__` declaration.
    pub version_file: Utf8PathBuf,
    /// README used as the long description.
    pub readme: Utf8PathBuf,
    /// Schema-binding generation.
    pub schema_bindings: SchemaBindingsConfig,
    /// Cross-language transform wrapper generation.
    pub transform_wrappers: TransformWrappersConfig,
    /// Documentation example mirroring.
    pub docs: DocsConfig,
    /// Native extension selection.
    pub extensions: ExtensionsConfig,
    /// Package data discovery, relative to `package_dir`.
    pub package_data: Vec<PackageDataEntry>,
    /// Static type-check auxiliary command.
    pub type_check: TypeCheckConfig,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            name: "apache-beam".to_owned(),
            package_dir: Utf8PathBuf::from("apache_beam"),
            version_file: Utf8PathBuf::from("apache_beam/version.py"),
            readme: Utf8PathBuf::from("README.md"),
            schema_bindings: SchemaBindingsConfig::default(),
            transform_wrappers: TransformWrappersConfig::default(),
            docs: DocsConfig::default(),
            extensions: ExtensionsConfig::default(),
            package_data: PackageDataEntry::beam_defaults(),
            type_check: TypeCheckConfig::default(),
        }
    }
}

/// Where the schema-binding generator lives and what it produces.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SchemaBindingsConfig {
    /// Generator script.
    pub generator: Utf8PathBuf,
    /// Directory searched (recursively) for previously generated bindings.
    pub output_dir: Utf8PathBuf,
    /// File-name suffix identifying a generated binding.
    pub suffix: String,
}

impl Default for SchemaBindingsConfig {
    fn default() -> Self {
        Self {
            generator: Utf8PathBuf::from("gen_protos.py"),
            output_dir: Utf8PathBuf::from("apache_beam/portability/api"),
            suffix: "_pb2.py".to_owned(),
        }
    }
}

/// Where the wrapper generator and its companion configuration live.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TransformWrappersConfig {
    /// Generator script.
    pub generator: Utf8PathBuf,
    /// Standard external transforms configuration passed to the generator.
    pub transforms_config: Utf8PathBuf,
    /// Directory holding generated wrapper modules.
    pub output_dir: Utf8PathBuf,
    /// Entries the output directory must hold to count as generated; the
    /// package initializer alone does not.
    pub min_entries: usize,
}

impl Default for TransformWrappersConfig {
    fn default() -> Self {
        Self {
            generator: Utf8PathBuf::from("gen_xlang_wrappers.py"),
            transforms_config: Utf8PathBuf::from("../standard_external_transforms.yaml"),
            output_dir: Utf8PathBuf::from("apache_beam/transforms/xlang"),
            min_entries: 2,
        }
    }
}

/// Documentation example mirroring.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DocsConfig {
    /// Externally authored documentation directory.
    pub source: Utf8PathBuf,
    /// File-name glob selecting example documents.
    pub pattern: String,
    /// Package directory that is cleared and repopulated.
    pub destination: Utf8PathBuf,
}

impl Default for DocsConfig {
    fn default() -> Self {
        Self {
            source: Utf8PathBuf::from("../../website/www/site/content/en/documentation/sdks"),
            pattern: "yaml*.md".to_owned(),
            destination: Utf8PathBuf::from("apache_beam/yaml/docs"),
        }
    }
}

/// Native extension selection.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExtensionsConfig {
    /// Build commands that compile extensions.
    pub commands: Vec<String>,
    /// Module sources; glob patterns are expanded, literal paths kept.
    pub sources: Vec<String>,
}

impl Default for ExtensionsConfig {
    fn default() -> Self {
        Self {
            commands: ["bdist_wheel", "build_ext", "editable_wheel"]
                .map(str::to_owned)
                .to_vec(),
            sources: [
                "apache_beam/**/*.pyx",
                "apache_beam/coders/coder_impl.py",
                "apache_beam/metrics/cells.py",
                "apache_beam/metrics/execution.py",
                "apache_beam/runners/common.py",
                "apache_beam/runners/worker/logger.py",
                "apache_beam/runners/worker/opcounters.py",
                "apache_beam/runners/worker/operations.py",
                "apache_beam/transforms/cy_combiners.py",
                "apache_beam/transforms/stats.py",
                "apache_beam/utils/counters.py",
                "apache_beam/utils/windowed_value.py",
            ]
            .map(str::to_owned)
            .to_vec(),
        }
    }
}

/// Static type-check auxiliary command.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TypeCheckConfig {
    /// Analysis tool executable.
    pub tool: String,
}

impl Default for TypeCheckConfig {
    fn default() -> Self {
        Self {
            tool: "mypy".to_owned(),
        }
    }
}

impl ProjectConfig {
    /// Parses configuration text.
    ///
    /// # Errors
    ///
    /// Returns [`PackagerError::InvalidConfig`] for TOML syntax errors and
    /// unknown keys.
    pub fn from_toml(path: &Utf8Path, contents: &str) -> Result<Self> {
        toml::from_str(contents).map_err(|err| PackagerError::InvalidConfig {
            path: path.to_owned(),
            reason: err.to_string(),
        })
    }

    /// Loads `sdkprep.toml` from `root`, falling back to defaults when the
    /// file does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error when the file exists but cannot be read or parsed.
    pub fn load_or_default(root: &Utf8Path) -> Result<Self> {
        let path = root.join(CONFIG_FILE_NAME);
        if !path.is_file() {
            debug!("no {CONFIG_FILE_NAME} in {root}; using default layout");
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(&path)?;
        let config = Self::from_toml(&path, &contents)?;
        debug!("loaded project configuration from {path}");
        Ok(config)
    }
}
