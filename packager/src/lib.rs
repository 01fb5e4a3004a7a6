//! SDK packaging preparation library.
//!
//! This crate decides, for one invocation context (requested build commands,
//! target platform, interpreter version, and the state of the source tree),
//! which generation and compilation steps run and how the dependency
//! manifest is assembled. It is used by the `sdkprep` CLI binary and can be
//! consumed programmatically for testing or custom build front-ends.
//!
//! # Modules
//!
//! - [`advisories`] - Non-fatal toolchain warnings
//! - [`cli`] - Command-line argument definitions
//! - [`config`] - Project layout configuration (`sdkprep.toml`)
//! - [`dispatcher`] - Auxiliary command registry (`mypy`)
//! - [`docs`] - Documentation example mirroring
//! - [`error`] - Error and notice types
//! - [`exec`] - Subprocess abstraction
//! - [`extensions`] - Native extension selection
//! - [`generation`] - Artifact generation gates
//! - [`manifest`] - Platform- and interpreter-gated dependency assembly
//! - [`metadata`] - Distribution metadata
//! - [`output`] - Progress and dry-run formatting
//! - [`package_data`] - Package data discovery
//! - [`pipeline`] - Build pipeline orchestration
//! - [`version`] - Version declaration parsing

pub mod advisories;
pub mod cli;
pub mod config;
pub mod dispatcher;
pub mod docs;
pub mod error;
pub mod exec;
pub mod extensions;
pub mod generation;
pub mod manifest;
pub mod metadata;
pub mod output;
pub mod package_data;
pub mod pipeline;
pub mod version;

#[cfg(any(test, feature = "test-support"))]
pub mod test_utils;
