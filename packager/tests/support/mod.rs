//! Test support utilities for packager behaviour tests.
//!
//! Provides a throwaway Beam-shaped source tree and a scripted interpreter so
//! scenarios can drive the pipeline without a real toolchain.

#![allow(dead_code, reason = "each test binary uses a different subset")]

use camino::Utf8PathBuf;
use common::test_support::ProjectTree;
use sdkprep::config::{DocsConfig, ProjectConfig, TransformWrappersConfig};
use sdkprep::error::Result;
use sdkprep::extensions::CAPABILITY_QUERY;
use sdkprep::test_utils::{ScriptedRunner, failure_output, stdout_output, success_output};
use std::process::Output;

/// Files a previous generator run leaves behind.
pub const GENERATED_ARTIFACTS: &[&str] = &[
    "apache_beam/portability/api/beam_runner_api_pb2.py",
    "apache_beam/portability/api/beam_runner_api_pb2.pyi",
    "apache_beam/portability/api/standard_coders.yaml",
    "apache_beam/transforms/xlang/__init__.py",
    "apache_beam/transforms/xlang/io.py",
];

/// Generator scripts and their companion input.
pub const GENERATOR_INPUTS: &[&str] = &[
    "gen_protos.py",
    "gen_xlang_wrappers.py",
    "standard_external_transforms.yaml",
];

/// Include directory reported by the scripted capability query.
pub const NUMPY_INCLUDE: &str = "/opt/numpy/core/include";

/// Creates a source tree holding a version declaration and a README.
pub fn beam_tree() -> ProjectTree {
    let tree = ProjectTree::new().expect("failed to create project tree");
    tree.write("apache_beam/version.py", "__version__ = '2.61.0'\n")
        .expect("failed to write version declaration");
    tree.write("README.md", "# Apache Beam\n")
        .expect("failed to write README");
    tree
}

/// Configuration that keeps every input inside the tree.
pub fn tree_config() -> ProjectConfig {
    ProjectConfig {
        transform_wrappers: TransformWrappersConfig {
            transforms_config: Utf8PathBuf::from("standard_external_transforms.yaml"),
            ..TransformWrappersConfig::default()
        },
        docs: DocsConfig {
            source: Utf8PathBuf::from("website/sdks"),
            ..DocsConfig::default()
        },
        ..ProjectConfig::default()
    }
}

/// Writes the same `sdkprep.toml` overrides as [`tree_config`].
pub fn write_tree_config(tree: &ProjectTree) {
    tree.write(
        "sdkprep.toml",
        concat!(
            "[transform_wrappers]\n",
            "transforms_config = \"standard_external_transforms.yaml\"\n\n",
            "[docs]\n",
            "source = \"website/sdks\"\n",
        ),
    )
    .expect("failed to write sdkprep.toml");
}

/// Scripted interpreter behaviour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Interpreter {
    /// Whether the compiler front-end and array library import.
    pub capability: bool,
    /// Whether generators exit successfully.
    pub generators_succeed: bool,
}

impl Default for Interpreter {
    fn default() -> Self {
        Self {
            capability: true,
            generators_succeed: true,
        }
    }
}

/// A runner that answers like `interpreter` would.
pub fn scripted(
    interpreter: Interpreter,
) -> ScriptedRunner<impl Fn(&str, &[String]) -> Result<Output>> {
    ScriptedRunner::new(move |_, args| {
        let snippet = args.get(1).map(String::as_str).unwrap_or_default();
        if snippet == CAPABILITY_QUERY {
            return Ok(if interpreter.capability {
                stdout_output(NUMPY_INCLUDE)
            } else {
                failure_output("ModuleNotFoundError: No module named 'Cython'")
            });
        }
        if snippet.contains("importlib.metadata") {
            return Ok(failure_output("PackageNotFoundError"));
        }
        Ok(if interpreter.generators_succeed {
            success_output()
        } else {
            failure_output("grpc_tools not installed")
        })
    })
}
