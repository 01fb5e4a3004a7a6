//! Behaviour-driven tests for extension selection and package data
//! discovery.

mod support;

use camino::Utf8PathBuf;
use common::test_support::ProjectTree;
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use sdkprep::config::ProjectConfig;
use sdkprep::error::Notice;
use sdkprep::extensions::{ExtensionSelection, select_extensions};
use sdkprep::package_data;
use std::cell::{Cell, RefCell};
use std::collections::BTreeSet;
use support::{Interpreter, NUMPY_INCLUDE, scripted};

struct ExtensionsWorld {
    tree: ProjectTree,
    capability: Cell<bool>,
    selection: RefCell<Option<ExtensionSelection>>,
    queries: Cell<usize>,
    package_data: RefCell<BTreeSet<String>>,
    notices: RefCell<Vec<Notice>>,
}

#[fixture]
fn extensions_world() -> ExtensionsWorld {
    ExtensionsWorld {
        tree: ProjectTree::new().expect("failed to create project tree"),
        capability: Cell::new(true),
        selection: RefCell::new(None),
        queries: Cell::new(0),
        package_data: RefCell::new(BTreeSet::new()),
        notices: RefCell::new(Vec::new()),
    }
}

impl ExtensionsWorld {
    fn descriptors(&self) -> Vec<sdkprep::extensions::ExtensionDescriptor> {
        self.selection
            .borrow()
            .as_ref()
            .expect("extensions should be selected")
            .descriptors()
            .to_vec()
    }
}

#[given("the source file \"{path}\"")]
fn given_source_file(extensions_world: &ExtensionsWorld, path: String) {
    extensions_world
        .tree
        .write(&path, "")
        .expect("failed to write source file");
}

#[given("the compiler front-end is not installed")]
fn given_no_compiler(extensions_world: &ExtensionsWorld) {
    extensions_world.capability.set(false);
}

#[when("extensions are selected for \"{command}\"")]
fn when_extensions_selected(extensions_world: &ExtensionsWorld, command: String) {
    let runner = scripted(Interpreter {
        capability: extensions_world.capability.get(),
        ..Interpreter::default()
    });
    let config = ProjectConfig::default();
    let selection = select_extensions(
        &[command],
        &config.extensions,
        extensions_world.tree.root(),
        &runner,
        "python3",
    );
    extensions_world.queries.set(runner.calls().len());
    if let ExtensionSelection::CapabilityUnavailable(notice) = &selection {
        extensions_world.notices.borrow_mut().push(notice.clone());
    }
    extensions_world.selection.replace(Some(selection));
}

#[when("package data is discovered")]
fn when_package_data_discovered(extensions_world: &ExtensionsWorld) {
    let config = ProjectConfig::default();
    let discovered = package_data::discover(
        &extensions_world.tree.path(config.package_dir.as_str()),
        &config.package_data,
    );
    extensions_world.package_data.replace(discovered.files);
    extensions_world.notices.replace(discovered.notices);
}

#[then("the module \"{name}\" is compiled")]
fn then_module_compiled(extensions_world: &ExtensionsWorld, name: String) {
    assert!(
        extensions_world
            .descriptors()
            .iter()
            .any(|descriptor| descriptor.name == name),
        "modules were {:?}",
        extensions_world.descriptors()
    );
}

#[then("every module includes the array library headers")]
fn then_headers_included(extensions_world: &ExtensionsWorld) {
    let descriptors = extensions_world.descriptors();
    assert!(!descriptors.is_empty());
    for descriptor in descriptors {
        assert_eq!(descriptor.include_paths, vec![Utf8PathBuf::from(NUMPY_INCLUDE)]);
    }
}

#[then("no modules are compiled")]
fn then_no_modules(extensions_world: &ExtensionsWorld) {
    assert!(extensions_world.descriptors().is_empty());
}

#[then("the toolchain was queried {count} times")]
fn then_queried(extensions_world: &ExtensionsWorld, count: usize) {
    assert_eq!(extensions_world.queries.get(), count);
}

#[then("a notice reads \"{text}\"")]
fn then_notice_reads(extensions_world: &ExtensionsWorld, text: String) {
    let notices = extensions_world.notices.borrow();
    assert!(
        notices.iter().any(|notice| notice.to_string().contains(&text)),
        "notices were {notices:?}"
    );
}

#[then("no notices were raised")]
fn then_no_notices(extensions_world: &ExtensionsWorld) {
    assert!(extensions_world.notices.borrow().is_empty());
}

#[then("the package data is \"{files}\"")]
fn then_package_data(extensions_world: &ExtensionsWorld, files: String) {
    let found: Vec<String> = extensions_world.package_data.borrow().iter().cloned().collect();
    let expected: Vec<String> = files.split(", ").map(str::to_owned).collect();
    assert_eq!(found, expected);
}

// Scenario bindings

#[scenario("tests/features/extensions.feature", index = 0)]
fn scenario_binary_build_compiles(extensions_world: ExtensionsWorld) {
    let _ = extensions_world;
}

#[scenario("tests/features/extensions.feature", index = 1)]
fn scenario_source_distribution(extensions_world: ExtensionsWorld) {
    let _ = extensions_world;
}

#[scenario("tests/features/extensions.feature", index = 2)]
fn scenario_missing_toolchain(extensions_world: ExtensionsWorld) {
    let _ = extensions_world;
}

#[scenario("tests/features/extensions.feature", index = 3)]
fn scenario_package_data_sorted(extensions_world: ExtensionsWorld) {
    let _ = extensions_world;
}

#[scenario("tests/features/extensions.feature", index = 4)]
fn scenario_missing_recursive_base(extensions_world: ExtensionsWorld) {
    let _ = extensions_world;
}
