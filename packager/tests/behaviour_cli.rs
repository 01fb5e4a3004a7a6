//! Behaviour-driven tests for the `sdkprep` binary.
//!
//! Scenarios run the compiled binary against a temporary source tree and
//! inspect its exit status and output.

mod support;

use common::test_support::ProjectTree;
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use std::cell::RefCell;
use std::process::{Command, Output};
use support::{GENERATED_ARTIFACTS, beam_tree, write_tree_config};

struct CliWorld {
    tree: ProjectTree,
    output: RefCell<Option<Output>>,
}

#[fixture]
fn cli_world() -> CliWorld {
    let tree = beam_tree();
    write_tree_config(&tree);
    CliWorld {
        tree,
        output: RefCell::new(None),
    }
}

impl CliWorld {
    fn with_output<T>(&self, inspect: impl FnOnce(&Output) -> T) -> T {
        inspect(self.output.borrow().as_ref().expect("sdkprep should have run"))
    }

    fn stdout(&self) -> String {
        self.with_output(|output| String::from_utf8_lossy(&output.stdout).into_owned())
    }

    fn stderr(&self) -> String {
        self.with_output(|output| String::from_utf8_lossy(&output.stderr).into_owned())
    }
}

#[given("a checkout without generators or generated output")]
fn given_bare_checkout(cli_world: &CliWorld) {
    assert!(!cli_world.tree.path("gen_protos.py").exists());
}

#[given("a source distribution tree")]
fn given_source_distribution(cli_world: &CliWorld) {
    cli_world
        .tree
        .touch_all(GENERATED_ARTIFACTS)
        .expect("failed to write generated artifacts");
}

#[when("sdkprep runs \"{args}\"")]
fn when_sdkprep_runs(cli_world: &CliWorld, args: String) {
    let output = Command::new(env!("CARGO_BIN_EXE_sdkprep"))
        .arg("--project-root")
        .arg(cli_world.tree.root().as_str())
        .args(args.split_whitespace())
        .current_dir(cli_world.tree.root())
        .env_remove("SDKPREP_PLATFORM")
        .env_remove("SDKPREP_PYTHON")
        .env_remove("SDKPREP_LOG")
        .output()
        .expect("failed to run sdkprep");
    cli_world.output.replace(Some(output));
}

#[then("the command succeeds")]
fn then_succeeds(cli_world: &CliWorld) {
    cli_world.with_output(|output| {
        assert!(
            output.status.success(),
            "sdkprep failed: {}",
            String::from_utf8_lossy(&output.stderr)
        );
    });
}

#[then("the command fails")]
fn then_fails(cli_world: &CliWorld) {
    cli_world.with_output(|output| assert_eq!(output.status.code(), Some(1)));
}

#[then("stderr contains \"{text}\"")]
fn then_stderr_contains(cli_world: &CliWorld, text: String) {
    let stderr = cli_world.stderr();
    assert!(stderr.contains(&text), "stderr was: {stderr}");
}

#[then("the printed dependencies include an empty placeholder")]
fn then_printed_placeholder(cli_world: &CliWorld) {
    let manifest: serde_json::Value =
        serde_json::from_str(&cli_world.stdout()).expect("stdout should be JSON");
    let dependencies = manifest
        .get("dependencies")
        .and_then(serde_json::Value::as_array)
        .expect("dependencies should be an array");
    assert!(dependencies.iter().any(|entry| entry.as_str() == Some("")));
    assert!(
        !dependencies
            .iter()
            .filter_map(serde_json::Value::as_str)
            .any(|entry| entry.starts_with("pyarrow"))
    );
}

#[then("the manifest file \"{path}\" has version \"{version}\"")]
fn then_manifest_file_version(cli_world: &CliWorld, path: String, version: String) {
    let contents =
        std::fs::read_to_string(cli_world.tree.path(&path)).expect("manifest should be written");
    let manifest: serde_json::Value =
        serde_json::from_str(&contents).expect("manifest should be JSON");
    assert_eq!(
        manifest.get("version").and_then(serde_json::Value::as_str),
        Some(version.as_str())
    );
    assert!(cli_world.stdout().is_empty());
}

// Scenario bindings

#[scenario("tests/features/cli.feature", index = 0)]
fn scenario_manifest_for_windows_32(cli_world: CliWorld) {
    let _ = cli_world;
}

#[scenario("tests/features/cli.feature", index = 1)]
fn scenario_build_without_generators(cli_world: CliWorld) {
    let _ = cli_world;
}

#[scenario("tests/features/cli.feature", index = 2)]
fn scenario_build_writes_manifest_file(cli_world: CliWorld) {
    let _ = cli_world;
}

#[scenario("tests/features/cli.feature", index = 3)]
fn scenario_dry_run(cli_world: CliWorld) {
    let _ = cli_world;
}

#[scenario("tests/features/cli.feature", index = 4)]
fn scenario_list_commands(cli_world: CliWorld) {
    let _ = cli_world;
}

#[scenario("tests/features/cli.feature", index = 5)]
fn scenario_unknown_auxiliary(cli_world: CliWorld) {
    let _ = cli_world;
}
