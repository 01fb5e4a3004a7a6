//! Toolchain advisories.
//!
//! Warnings about the build environment that never stop a build: an
//! interpreter outside the tested range, or an installer or compiler
//! front-end older than recommended. Tools that are not installed are
//! skipped silently.

use crate::error::Notice;
use crate::exec::{self, CommandRunner};
use crate::metadata::{NEWEST_TESTED, PYTHON_REQUIRES, SUPPORTED_FLOOR};
use common::{InterpreterVersion, ReleaseNumber};
use log::debug;

/// Tools checked, with their recommended minimum versions.
pub const TOOL_MINIMUMS: &[(&str, &str)] = &[("pip", "19.3.0"), ("cython", "3.0.0")];

/// Advisories for the interpreter version alone.
#[must_use]
pub fn interpreter_advisories(interpreter: InterpreterVersion) -> Vec<Notice> {
    if interpreter > NEWEST_TESTED {
        vec![Notice::UntestedInterpreter {
            version: interpreter.to_string(),
        }]
    } else if interpreter < SUPPORTED_FLOOR {
        vec![Notice::UnsupportedInterpreter {
            version: interpreter.to_string(),
            requires: PYTHON_REQUIRES.to_owned(),
        }]
    } else {
        Vec::new()
    }
}

/// Advisories for installed build tools, queried through `python`.
#[must_use]
pub fn tool_advisories(runner: &dyn CommandRunner, python: &str) -> Vec<Notice> {
    TOOL_MINIMUMS
        .iter()
        .filter_map(|(tool, recommended)| check_tool(runner, python, tool, recommended))
        .collect()
}

/// All advisories for this environment.
#[must_use]
pub fn collect(
    runner: &dyn CommandRunner,
    python: &str,
    interpreter: InterpreterVersion,
) -> Vec<Notice> {
    let mut notices = interpreter_advisories(interpreter);
    notices.extend(tool_advisories(runner, python));
    notices
}

fn check_tool(
    runner: &dyn CommandRunner,
    python: &str,
    tool: &str,
    recommended: &str,
) -> Option<Notice> {
    let installed = installed_version(runner, python, tool)?;
    let installed_release: ReleaseNumber = installed.parse().ok()?;
    let recommended_release: ReleaseNumber = recommended.parse().ok()?;
    (installed_release < recommended_release).then(|| Notice::OutdatedTool {
        tool: tool.to_owned(),
        installed,
        recommended: recommended.to_owned(),
    })
}

/// Returns the installed distribution version, or `None` when absent.
fn installed_version(
    runner: &dyn CommandRunner,
    python: &str,
    distribution: &str,
) -> Option<String> {
    let snippet = format!("import importlib.metadata as m; print(m.version({distribution:?}))");
    match exec::probe(runner, python, &exec::args(&["-c", &snippet])) {
        Ok(version) if !version.is_empty() => Some(version),
        Ok(_) => None,
        Err(reason) => {
            debug!("{distribution} not found: {reason}");
            None
        }
    }
}
