//! Auxiliary build commands.
//!
//! Auxiliary commands are registered by name and run only on explicit
//! request (`sdkprep mypy`). Each wraps an external tool; a non-zero exit
//! from that tool becomes [`PackagerError::AuxiliaryToolFailure`].

use crate::config::ProjectConfig;
use crate::error::{PackagerError, Result};
use crate::exec::{CommandRunner, combined_output};
use crate::generation::{self, ArtifactGenerationTask};
use camino::Utf8Path;
use log::{debug, info};

/// Inputs available to an auxiliary command.
pub struct AuxiliaryContext<'a> {
    /// Project root.
    pub root: &'a Utf8Path,
    /// Project layout.
    pub config: &'a ProjectConfig,
    /// Process runner.
    pub runner: &'a dyn CommandRunner,
    /// Interpreter used for generators.
    pub python: &'a str,
}

/// A named auxiliary command.
pub trait AuxiliaryCommand {
    /// Name used on the command line.
    fn name(&self) -> &str;

    /// One-line description for `sdkprep commands`.
    fn about(&self) -> &str;

    /// Runs the command.
    ///
    /// # Errors
    ///
    /// Returns an error when a prerequisite step or the wrapped tool fails.
    fn run(&self, context: &AuxiliaryContext<'_>) -> Result<()>;
}

/// Registered auxiliary commands, in registration order.
#[derive(Default)]
pub struct CommandRegistry {
    commands: Vec<Box<dyn AuxiliaryCommand>>,
}

impl CommandRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry holding the built-in commands.
    #[must_use]
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(Box::new(TypeCheckCommand));
        registry
    }

    /// Registers `command`, replacing any command of the same name.
    pub fn register(&mut self, command: Box<dyn AuxiliaryCommand>) {
        if let Some(existing) = self
            .commands
            .iter_mut()
            .find(|existing| existing.name() == command.name())
        {
            debug!("replacing auxiliary command {}", command.name());
            *existing = command;
        } else {
            self.commands.push(command);
        }
    }

    /// Looks up a command by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&dyn AuxiliaryCommand> {
        self.commands
            .iter()
            .find(|command| command.name() == name)
            .map(Box::as_ref)
    }

    /// Names and descriptions of registered commands.
    #[must_use]
    pub fn describe(&self) -> Vec<(&str, &str)> {
        self.commands
            .iter()
            .map(|command| (command.name(), command.about()))
            .collect()
    }

    /// Runs the command registered as `name`.
    ///
    /// # Errors
    ///
    /// Returns [`PackagerError::UnknownCommand`] when nothing is registered
    /// under `name`, or the command's own error.
    pub fn dispatch(&self, name: &str, context: &AuxiliaryContext<'_>) -> Result<()> {
        let command = self.get(name).ok_or_else(|| PackagerError::UnknownCommand {
            name: name.to_owned(),
            available: self
                .commands
                .iter()
                .map(|command| command.name())
                .collect::<Vec<_>>()
                .join(", "),
        })?;
        info!("running auxiliary command {name}");
        command.run(context)
    }
}

/// Static type check of the package sources.
///
/// Generated sources are type-checked too, so the artifact gates run first.
#[derive(Debug, Clone, Copy, Default)]
pub struct TypeCheckCommand;

impl AuxiliaryCommand for TypeCheckCommand {
    fn name(&self) -> &str {
        "mypy"
    }

    fn about(&self) -> &str {
        "Generate artifacts, then type-check the package with mypy"
    }

    fn run(&self, context: &AuxiliaryContext<'_>) -> Result<()> {
        let tasks = ArtifactGenerationTask::all_from_config(context.root, context.config);
        for report in generation::resolve_all(&tasks, context.runner, context.python)? {
            if let Some(notice) = report.notice() {
                notice.log();
            }
        }

        let tool = context.config.type_check.tool.as_str();
        let target = context.root.join(&context.config.package_dir);
        let output = context.runner.run(tool, &[target.into_string()])?;
        let captured = combined_output(&output);
        if output.status.success() {
            if !captured.is_empty() {
                info!("{tool}: {captured}");
            }
            Ok(())
        } else {
            Err(PackagerError::AuxiliaryToolFailure {
                tool: tool.to_owned(),
                code: output.status.code(),
                output: captured,
            })
        }
    }
}
