//! `sdkprep` CLI entrypoint.
//!
//! This binary prepares an SDK source tree for packaging: it runs the
//! artifact gates and best-effort steps, then writes the package manifest as
//! JSON to stdout or a file. Auxiliary commands such as `mypy` are dispatched
//! by name.

use camino::{Utf8Path, Utf8PathBuf};
use clap::Parser;
use sdkprep::cli::{BuildArgs, Cli, Command, ManifestArgs, TargetArgs};
use sdkprep::config::ProjectConfig;
use sdkprep::dispatcher::{AuxiliaryContext, CommandRegistry};
use sdkprep::error::{PackagerError, Result};
use sdkprep::exec::{CommandRunner, SystemCommandRunner};
use sdkprep::manifest::assemble_manifest;
use sdkprep::output::{
    DryRunInfo, commands_listing, gate_lines, success_message, write_stderr_line,
};
use sdkprep::pipeline::{self, InvocationContext};
use std::io::Write;

fn main() {
    let cli = Cli::parse();
    env_logger::Builder::new()
        .filter_level(cli.log_level())
        .parse_env("SDKPREP_LOG")
        .format_timestamp(None)
        .init();

    let mut stderr = std::io::stderr();
    let run_result = run(&cli, &mut stderr);
    let exit_code = exit_code_for_run_result(run_result, &mut stderr);
    if exit_code != 0 {
        std::process::exit(exit_code);
    }
}

fn run(cli: &Cli, stderr: &mut dyn Write) -> Result<()> {
    let root = resolve_project_root(cli)?;
    let runner = SystemCommandRunner::in_dir(&root);

    match &cli.command {
        Command::Build(args) => run_build(cli, args, &root, &runner, stderr),
        Command::Manifest(args) => run_manifest(cli, args, &runner),
        Command::Commands => {
            let registry = CommandRegistry::with_defaults();
            write_stderr_line(stderr, commands_listing(&registry.describe()));
            Ok(())
        }
        Command::Auxiliary(argv) => run_auxiliary(cli, argv, &root, &runner),
    }
}

/// Runs the build pipeline, or shows its plan under `--dry-run`.
fn run_build(
    cli: &Cli,
    args: &BuildArgs,
    root: &Utf8Path,
    runner: &dyn CommandRunner,
    stderr: &mut dyn Write,
) -> Result<()> {
    let config = ProjectConfig::load_or_default(root)?;
    let context = InvocationContext {
        commands: args.commands.clone(),
        platform: resolve_platform(&args.target, runner, &cli.python)?,
        interpreter: resolve_interpreter(&args.target, runner, &cli.python)?,
        root: root.to_owned(),
        python: cli.python.clone(),
        quiet: cli.quiet,
    };

    if args.dry_run {
        let plan = pipeline::plan_build(&context, &config, runner)?;
        write_stderr_line(
            stderr,
            DryRunInfo {
                context: &context,
                plan: &plan,
            }
            .display_text(),
        );
        return plan.check();
    }

    let report = pipeline::run_build(&context, &config, runner, stderr)?;
    match &args.output {
        Some(path) => pipeline::write_json_file(&report.manifest, path)?,
        None => pipeline::write_json(&report.manifest, &mut std::io::stdout().lock())?,
    }

    if !cli.quiet {
        for line in gate_lines(&report.gates) {
            write_stderr_line(stderr, line);
        }
        write_stderr_line(stderr, success_message(&report));
    }
    Ok(())
}

/// Prints the dependency manifest alone.
fn run_manifest(cli: &Cli, args: &ManifestArgs, runner: &dyn CommandRunner) -> Result<()> {
    let platform = resolve_platform(&args.target, runner, &cli.python)?;
    let interpreter = resolve_interpreter(&args.target, runner, &cli.python)?;
    let manifest = assemble_manifest(&platform, interpreter)?;
    match &args.output {
        Some(path) => pipeline::write_json_file(&manifest, path),
        None => pipeline::write_json(&manifest, &mut std::io::stdout().lock()),
    }
}

/// Dispatches `argv[0]` to the registered auxiliary command.
fn run_auxiliary(
    cli: &Cli,
    argv: &[String],
    root: &Utf8Path,
    runner: &dyn CommandRunner,
) -> Result<()> {
    let name = argv.first().map_or("", String::as_str);
    let config = ProjectConfig::load_or_default(root)?;
    let context = AuxiliaryContext {
        root,
        config: &config,
        runner,
        python: &cli.python,
    };
    CommandRegistry::with_defaults().dispatch(name, &context)
}

fn resolve_project_root(cli: &Cli) -> Result<Utf8PathBuf> {
    if let Some(root) = &cli.project_root {
        return Ok(root.clone());
    }
    let cwd = std::env::current_dir()?;
    Utf8PathBuf::try_from(cwd).map_err(|err| PackagerError::NonUtf8Path {
        path: err.into_path_buf().to_string_lossy().into_owned(),
    })
}

fn resolve_platform(
    target: &TargetArgs,
    runner: &dyn CommandRunner,
    python: &str,
) -> Result<common::Platform> {
    match &target.platform {
        Some(platform) => Ok(platform.clone()),
        None => pipeline::probe_platform(runner, python),
    }
}

fn resolve_interpreter(
    target: &TargetArgs,
    runner: &dyn CommandRunner,
    python: &str,
) -> Result<common::InterpreterVersion> {
    match target.python_version {
        Some(version) => Ok(version),
        None => pipeline::probe_interpreter(runner, python),
    }
}

fn exit_code_for_run_result(result: Result<()>, stderr: &mut dyn Write) -> i32 {
    match result {
        Ok(()) => 0,
        Err(err) => {
            let prefix = if err.is_configuration_defect() {
                "error: dependency catalogue defect: "
            } else {
                "error: "
            };
            write_stderr_line(stderr, format!("{prefix}{err}"));
            1
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sdkprep::generation::ArtifactKind;

    #[test]
    fn exit_code_for_run_result_returns_zero_on_success() {
        let mut stderr = Vec::new();
        let exit_code = exit_code_for_run_result(Ok(()), &mut stderr);
        assert_eq!(exit_code, 0);
        assert!(stderr.is_empty());
    }

    #[test]
    fn exit_code_for_run_result_prints_error_and_returns_one() {
        let err = PackagerError::MissingGeneratorAndArtifacts {
            kind: ArtifactKind::SchemaBindings,
            missing: "the generation script `gen_protos.py`".to_owned(),
        };

        let mut stderr = Vec::new();
        let exit_code = exit_code_for_run_result(Err(err), &mut stderr);
        assert_eq!(exit_code, 1);

        let stderr_text = String::from_utf8(stderr).expect("stderr was not UTF-8");
        assert!(stderr_text.starts_with("error: schema bindings have not been generated"));
    }

    #[test]
    fn catalogue_defects_are_labelled() {
        let err = PackagerError::CyclicExtrasInclusion {
            group: "interactive".to_owned(),
        };
        let mut stderr = Vec::new();
        assert_eq!(exit_code_for_run_result(Err(err), &mut stderr), 1);
        let stderr_text = String::from_utf8(stderr).expect("stderr was not UTF-8");
        assert!(stderr_text.contains("dependency catalogue defect"));
    }

    #[test]
    fn platform_is_probed_from_the_target_interpreter() {
        let runner = sdkprep::test_utils::StubRunner::new(vec![
            sdkprep::test_utils::ExpectedCall::new(
                "python3",
                &["-c", pipeline::PLATFORM_QUERY],
                Ok(sdkprep::test_utils::stdout_output("win32-32\n")),
            ),
        ]);
        let platform =
            resolve_platform(&TargetArgs::default(), &runner, "python3").expect("platform");
        assert!(platform.is_windows_32());

        let manifest = assemble_manifest(&platform, common::InterpreterVersion::new(3, 11))
            .expect("manifest");
        assert!(manifest.dependencies.contains(&sdkprep::manifest::ManifestEntry::Placeholder));
        assert_eq!(manifest.dependency("pyarrow"), None);
        runner.assert_finished();
    }

    #[test]
    fn explicit_platform_skips_the_probe() {
        let target = TargetArgs {
            platform: Some(common::Platform::linux_64()),
            python_version: None,
        };
        let runner = sdkprep::test_utils::StubRunner::new(Vec::new());
        assert_eq!(
            resolve_platform(&target, &runner, "python3").expect("platform"),
            common::Platform::linux_64()
        );
    }

    #[test]
    fn explicit_python_version_skips_the_probe() {
        let target = TargetArgs {
            platform: None,
            python_version: Some(common::InterpreterVersion::new(3, 10)),
        };
        let runner = sdkprep::test_utils::StubRunner::new(Vec::new());
        assert_eq!(
            resolve_interpreter(&target, &runner, "python3").expect("version"),
            common::InterpreterVersion::new(3, 10)
        );
    }
}
