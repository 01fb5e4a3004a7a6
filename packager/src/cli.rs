//! CLI argument definitions for `sdkprep`.
//!
//! This module defines the command-line interface using clap. It is separated
//! from the main entrypoint to keep the binary small and focused on
//! orchestration.

use camino::Utf8PathBuf;
use clap::{Args, Parser, Subcommand};
use common::{InterpreterVersion, Platform};
use log::LevelFilter;

/// Prepare an SDK source tree for packaging.
#[derive(Parser, Debug)]
#[command(name = "sdkprep")]
#[command(version, about)]
#[command(long_about = concat!(
    "Prepare an SDK source tree for packaging.\n\n",
    "sdkprep resolves the package version, runs or skips the schema-binding and ",
    "cross-language wrapper generators, mirrors documentation examples, selects ",
    "native extension modules, discovers package data, and assembles the ",
    "platform- and interpreter-specific dependency manifest.\n\n",
    "The project layout is read from sdkprep.toml in the project root when ",
    "present; otherwise the Apache Beam Python SDK layout is assumed.",
))]
#[command(after_help = concat!(
    "EXAMPLES:\n",
    "  Prepare a wheel build and write the manifest:\n",
    "    $ sdkprep build bdist_wheel --output build/manifest.json\n\n",
    "  Show what a build would do:\n",
    "    $ sdkprep build build_ext --dry-run\n\n",
    "  Print the dependency manifest for 32-bit Windows on Python 3.11:\n",
    "    $ sdkprep manifest --platform windows-32 --python-version 3.11\n\n",
    "  Type-check the package:\n",
    "    $ sdkprep mypy\n",
))]
pub struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Command,

    /// Increase log verbosity (repeatable: -v, -vv).
    #[arg(
        short,
        long = "verbose",
        action = clap::ArgAction::Count,
        global = true,
        conflicts_with = "quiet"
    )]
    pub verbosity: u8,

    /// Suppress progress output and warnings (errors still shown).
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Project root [default: current directory].
    #[arg(long, value_name = "DIR", global = true)]
    pub project_root: Option<Utf8PathBuf>,

    /// Interpreter used to run generators and probes.
    #[arg(
        long,
        value_name = "PROGRAM",
        env = "SDKPREP_PYTHON",
        default_value = "python3",
        global = true
    )]
    pub python: String,
}

/// Available subcommands.
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Run the full preparation pipeline and emit the package manifest.
    Build(BuildArgs),

    /// Print the dependency manifest for a platform and interpreter.
    Manifest(ManifestArgs),

    /// List registered auxiliary commands.
    Commands,

    /// Run a registered auxiliary command, e.g. `mypy`.
    #[command(external_subcommand)]
    Auxiliary(Vec<String>),
}

/// Target platform and interpreter overrides.
#[derive(Args, Debug, Clone, Default, PartialEq, Eq)]
pub struct TargetArgs {
    /// Target platform, e.g. `linux-64` or `windows-32` [default: probed from --python].
    #[arg(long, value_name = "PLATFORM", env = "SDKPREP_PLATFORM")]
    pub platform: Option<Platform>,

    /// Target interpreter as `MAJOR.MINOR` [default: probed from --python].
    #[arg(long, value_name = "VERSION")]
    pub python_version: Option<InterpreterVersion>,
}

/// Arguments for the build command.
#[derive(Args, Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildArgs {
    /// Build commands being prepared for, e.g. `bdist_wheel` or `build_ext`.
    #[arg(value_name = "COMMAND")]
    pub commands: Vec<String>,

    /// Target overrides.
    #[command(flatten)]
    pub target: TargetArgs,

    /// Write the manifest here instead of stdout.
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<Utf8PathBuf>,

    /// Show the plan and exit without running generators.
    #[arg(long)]
    pub dry_run: bool,
}

/// Arguments for the manifest command.
#[derive(Args, Debug, Clone, Default, PartialEq, Eq)]
pub struct ManifestArgs {
    /// Target overrides.
    #[command(flatten)]
    pub target: TargetArgs,

    /// Write the manifest here instead of stdout.
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<Utf8PathBuf>,
}

impl Cli {
    /// Log level implied by `-v` and `-q`.
    ///
    /// # Examples
    ///
    /// ```
    /// use clap::Parser;
    /// use log::LevelFilter;
    /// use sdkprep::cli::Cli;
    ///
    /// let cli = Cli::parse_from(["sdkprep", "-vv", "commands"]);
    /// assert_eq!(cli.log_level(), LevelFilter::Debug);
    /// ```
    #[must_use]
    pub fn log_level(&self) -> LevelFilter {
        if self.quiet {
            return LevelFilter::Error;
        }
        match self.verbosity {
            0 => LevelFilter::Warn,
            1 => LevelFilter::Info,
            2 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    }
}

#[cfg(test)]
#[path = "cli_tests.rs"]
mod tests;
