//! Behaviour-driven tests for artifact generation gates.
//!
//! These scenarios drive each gate against a temporary source tree with a
//! scripted interpreter standing in for the real generators.

mod support;

use common::test_support::ProjectTree;
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use sdkprep::error::PackagerError;
use sdkprep::generation::{self, ArtifactGenerationTask, GateOutcome};
use std::cell::{Cell, RefCell};
use support::{GENERATED_ARTIFACTS, GENERATOR_INPUTS, Interpreter, scripted, tree_config};

struct GateWorld {
    tree: ProjectTree,
    generators_succeed: Cell<bool>,
    calls: RefCell<Vec<(String, Vec<String>)>>,
    outcome: RefCell<Option<sdkprep::error::Result<GateOutcome>>>,
}

#[fixture]
fn gate_world() -> GateWorld {
    GateWorld {
        tree: ProjectTree::new().expect("failed to create project tree"),
        generators_succeed: Cell::new(true),
        calls: RefCell::new(Vec::new()),
        outcome: RefCell::new(None),
    }
}

impl GateWorld {
    fn task(&self, kind: &str) -> ArtifactGenerationTask {
        let config = tree_config();
        match kind {
            "schema bindings" => {
                ArtifactGenerationTask::schema_bindings(self.tree.root(), &config.schema_bindings)
            }
            "transform wrappers" => ArtifactGenerationTask::transform_wrappers(
                self.tree.root(),
                &config.transform_wrappers,
            ),
            other => panic!("unknown gate {other}"),
        }
    }

    fn with_outcome<T>(
        &self,
        check: impl FnOnce(&sdkprep::error::Result<GateOutcome>) -> T,
    ) -> T {
        let outcome = self.outcome.borrow();
        check(outcome.as_ref().expect("gate should have resolved"))
    }
}

#[given("an empty source tree")]
fn given_empty_tree(gate_world: &GateWorld) {
    assert!(gate_world.tree.files_under(".").expect("list").is_empty());
}

#[given("previously generated artifacts")]
fn given_generated_artifacts(gate_world: &GateWorld) {
    gate_world
        .tree
        .touch_all(GENERATED_ARTIFACTS)
        .expect("failed to write artifacts");
}

#[given("the generator scripts")]
fn given_generator_scripts(gate_world: &GateWorld) {
    gate_world
        .tree
        .touch_all(GENERATOR_INPUTS)
        .expect("failed to write generators");
}

#[given("generators exit unsuccessfully")]
fn given_generators_fail(gate_world: &GateWorld) {
    gate_world.generators_succeed.set(false);
}

#[given("a wrapper directory holding only its package initialiser")]
fn given_initialiser_only(gate_world: &GateWorld) {
    gate_world
        .tree
        .touch_all(&["apache_beam/transforms/xlang/__init__.py"])
        .expect("failed to write initialiser");
}

#[when("the \"{kind}\" gate resolves")]
fn when_gate_resolves(gate_world: &GateWorld, kind: String) {
    let runner = scripted(Interpreter {
        generators_succeed: gate_world.generators_succeed.get(),
        ..Interpreter::default()
    });
    let outcome = generation::resolve(&gate_world.task(&kind), &runner, "python3");
    gate_world.calls.replace(runner.calls());
    gate_world.outcome.replace(Some(outcome));
}

#[then("the gate fails because \"{kind}\" are missing")]
fn then_gate_fails_missing(gate_world: &GateWorld, kind: String) {
    gate_world.with_outcome(|outcome| match outcome {
        Err(err @ PackagerError::MissingGeneratorAndArtifacts { .. }) => {
            assert!(err.to_string().starts_with(&kind), "unexpected message: {err}");
        }
        other => panic!("expected MissingGeneratorAndArtifacts, got {other:?}"),
    });
}

#[then("the gate is skipped as already generated")]
fn then_gate_skipped(gate_world: &GateWorld) {
    gate_world.with_outcome(|outcome| {
        assert!(matches!(outcome, Ok(GateOutcome::Skipped)));
    });
}

#[then("no process was started")]
fn then_no_process(gate_world: &GateWorld) {
    assert!(gate_world.calls.borrow().is_empty());
}

#[then("the generator was run with \"{flag}\"")]
fn then_generator_run_with(gate_world: &GateWorld, flag: String) {
    let calls = gate_world.calls.borrow();
    assert_eq!(calls.len(), 1);
    let (program, args) = calls.first().expect("one call");
    assert_eq!(program, "python3");
    assert!(args.contains(&flag), "arguments were {args:?}");
}

#[then("the gate reports generated output")]
fn then_gate_generated(gate_world: &GateWorld) {
    gate_world.with_outcome(|outcome| {
        assert!(matches!(outcome, Ok(GateOutcome::Generated { .. })));
    });
}

#[then("the gate fails with the generator diagnostics \"{diagnostics}\"")]
fn then_gate_fails_with_diagnostics(gate_world: &GateWorld, diagnostics: String) {
    gate_world.with_outcome(|outcome| match outcome {
        Err(PackagerError::GeneratorProcessFailure { code, output, .. }) => {
            assert_eq!(*code, Some(1));
            assert!(output.contains(&diagnostics));
        }
        other => panic!("expected GeneratorProcessFailure, got {other:?}"),
    });
}

// Do not reorder scenarios in tests/features/artifact_gates.feature; bindings
// are index-based.
#[scenario("tests/features/artifact_gates.feature", index = 0)]
fn scenario_schema_bindings_unresolvable(gate_world: GateWorld) {
    let _ = gate_world;
}

#[scenario("tests/features/artifact_gates.feature", index = 1)]
fn scenario_transform_wrappers_unresolvable(gate_world: GateWorld) {
    let _ = gate_world;
}

#[scenario("tests/features/artifact_gates.feature", index = 2)]
fn scenario_pregenerated_output_accepted(gate_world: GateWorld) {
    let _ = gate_world;
}

#[scenario("tests/features/artifact_gates.feature", index = 3)]
fn scenario_present_generator_runs(gate_world: GateWorld) {
    let _ = gate_world;
}

#[scenario("tests/features/artifact_gates.feature", index = 4)]
fn scenario_failing_generator(gate_world: GateWorld) {
    let _ = gate_world;
}

#[scenario("tests/features/artifact_gates.feature", index = 5)]
fn scenario_initialiser_only(gate_world: GateWorld) {
    let _ = gate_world;
}

#[test]
fn regenerating_a_fresh_tree_changes_nothing() {
    let tree = support::beam_tree();
    tree.touch_all(GENERATOR_INPUTS).expect("write generators");
    let bindings = tree.path("apache_beam/portability/api/beam_runner_api_pb2.py");
    let runner = sdkprep::test_utils::ScriptedRunner::new(|_, _| {
        std::fs::create_dir_all(bindings.parent().expect("parent")).expect("mkdir");
        std::fs::write(&bindings, "# generated\n").expect("write");
        Ok(sdkprep::test_utils::success_output())
    });
    let tasks = ArtifactGenerationTask::all_from_config(tree.root(), &tree_config());

    generation::resolve_all(&tasks, &runner, "python3").expect("first run");
    let first = tree.files_under(".").expect("list");
    generation::resolve_all(&tasks, &runner, "python3").expect("second run");

    assert_eq!(tree.files_under(".").expect("list"), first);
    assert_eq!(runner.calls().len(), 4);
}
