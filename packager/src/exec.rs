//! External process execution.
//!
//! Every subprocess the packager starts (generators, capability probes,
//! toolchain advisories, auxiliary tools) goes through [`CommandRunner`] so
//! that callers can substitute fakes in tests.

use crate::error::{PackagerError, Result};
use camino::{Utf8Path, Utf8PathBuf};
use std::process::{Command, Output};

/// Abstraction for running external commands.
#[cfg_attr(test, mockall::automock)]
pub trait CommandRunner {
    /// Runs `program` with `args` and returns the captured output.
    ///
    /// A non-zero exit is not an error at this level; callers inspect
    /// [`Output::status`].
    ///
    /// # Errors
    ///
    /// Returns [`PackagerError::ProcessLaunch`] when the process cannot be
    /// started.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use sdkprep::exec::{CommandRunner, SystemCommandRunner};
    ///
    /// let runner = SystemCommandRunner::default();
    /// let output = runner.run("python3", &["--version".to_owned()])?;
    /// assert!(output.status.success());
    /// # Ok::<(), sdkprep::error::PackagerError>(())
    /// ```
    fn run(&self, program: &str, args: &[String]) -> Result<Output>;
}

/// Runs commands on the host system, optionally from a fixed directory.
///
/// Generators resolve their relative inputs against the project root, so the
/// pipeline runs them from there.
#[derive(Debug, Clone, Default)]
pub struct SystemCommandRunner {
    working_dir: Option<Utf8PathBuf>,
}

impl SystemCommandRunner {
    /// Creates a runner whose processes start in `dir`.
    #[must_use]
    pub fn in_dir(dir: &Utf8Path) -> Self {
        Self {
            working_dir: Some(dir.to_owned()),
        }
    }
}

impl CommandRunner for SystemCommandRunner {
    fn run(&self, program: &str, args: &[String]) -> Result<Output> {
        let mut command = Command::new(program);
        command.args(args);
        if let Some(dir) = &self.working_dir {
            command.current_dir(dir);
        }
        log::debug!("running {program} {}", args.join(" "));
        command
            .output()
            .map_err(|source| PackagerError::ProcessLaunch {
                program: program.to_owned(),
                source,
            })
    }
}

/// Returns stdout followed by stderr, lossily decoded and trimmed.
#[must_use]
pub fn combined_output(output: &Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    match (stdout.trim(), stderr.trim()) {
        ("", err) => err.to_owned(),
        (out, "") => out.to_owned(),
        (out, err) => format!("{out}\n{err}"),
    }
}

/// Returns the trimmed stdout of a command.
#[must_use]
pub fn stdout_text(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).trim().to_owned()
}

/// Runs a query command, returning its stdout only on a successful exit.
///
/// Launch failures and non-zero exits both yield `Err` with a readable
/// reason; probes treat either as "unavailable".
pub(crate) fn probe(
    runner: &dyn CommandRunner,
    program: &str,
    args: &[String],
) -> std::result::Result<String, String> {
    match runner.run(program, args) {
        Ok(output) if output.status.success() => Ok(stdout_text(&output)),
        Ok(output) => Err(format!(
            "{program} exited with {}: {}",
            output
                .status
                .code()
                .map_or_else(|| "no exit status".to_owned(), |code| code.to_string()),
            combined_output(&output)
        )),
        Err(err) => Err(err.to_string()),
    }
}

/// Converts string literals into owned arguments.
#[must_use]
pub fn args(values: &[&str]) -> Vec<String> {
    values.iter().map(|value| (*value).to_owned()).collect()
}
