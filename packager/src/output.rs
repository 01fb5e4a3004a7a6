//! Output formatting for the `sdkprep` CLI.
//!
//! Progress and summaries go to stderr so that stdout carries only the
//! manifest JSON.

use crate::extensions::ExtensionSelection;
use crate::generation::{GateOutcome, GatePlan, GateReport};
use crate::pipeline::{BuildPlan, BuildReport, InvocationContext};
use std::io::Write;

/// Writes `message` and a newline, ignoring write failures.
pub fn write_stderr_line(stderr: &mut dyn Write, message: impl std::fmt::Display) {
    if writeln!(stderr, "{message}").is_err() {
        // Best-effort logging; ignore write failures.
    }
}

/// Dry-run description of a build.
///
/// # Example
///
/// ```no_run
/// use sdkprep::output::DryRunInfo;
/// # fn show(context: &sdkprep::pipeline::InvocationContext, plan: &sdkprep::pipeline::BuildPlan) {
/// let text = DryRunInfo { context, plan }.display_text();
/// assert!(text.starts_with("Dry run"));
/// # }
/// ```
#[derive(Debug)]
pub struct DryRunInfo<'a> {
    /// The invocation being planned.
    pub context: &'a InvocationContext,
    /// The computed plan.
    pub plan: &'a BuildPlan,
}

impl DryRunInfo<'_> {
    /// Formats the plan for display.
    #[must_use]
    pub fn display_text(&self) -> String {
        let mut lines = vec![
            "Dry run - no generators will run and no files will be modified".to_owned(),
            String::new(),
            format!("Project root: {}", self.context.root),
            format!("Version: {}", self.plan.version),
            format!("Platform: {}", self.context.platform),
            format!("Python: {}", self.context.interpreter),
            format!("Commands: {}", describe_commands(&self.context.commands)),
            String::new(),
            "Artifact gates:".to_owned(),
        ];

        for gate in &self.plan.gates {
            lines.push(format!("  - {}: {}", gate.task.kind, describe_plan(&gate.plan)));
        }

        lines.push(String::new());
        lines.push(format!("Extensions: {}", describe_selection(&self.plan.extensions)));
        for descriptor in self.plan.extensions.descriptors() {
            lines.push(format!("  - {} ({})", descriptor.name, descriptor.source_path));
        }

        lines.push(String::new());
        lines.push(format!(
            "Dependencies: {} install-time, {} extras groups",
            self.plan.dependencies.dependencies.len(),
            self.plan.dependencies.extras.len()
        ));

        lines.join("\n")
    }
}

/// One-line summary of a finished build.
#[must_use]
pub fn success_message(report: &BuildReport) -> String {
    let generated = report
        .gates
        .iter()
        .filter(|gate| matches!(gate.outcome, GateOutcome::Generated { .. }))
        .count();
    let notices = match report.notices.len() {
        0 => String::new(),
        1 => ", 1 notice".to_owned(),
        count => format!(", {count} notices"),
    };
    format!(
        "Prepared {} {}: {} of {} artifact gates generated, {} extension modules, {} package data files{notices}",
        report.manifest.name,
        report.manifest.version,
        generated,
        report.gates.len(),
        report.manifest.ext_modules.len(),
        report.manifest.package_data.len(),
    )
}

/// Describes how each gate resolved.
#[must_use]
pub fn gate_lines(gates: &[GateReport]) -> Vec<String> {
    gates
        .iter()
        .map(|gate| match gate.outcome {
            GateOutcome::Generated { .. } => format!("  - {}: generated", gate.kind),
            GateOutcome::Skipped => format!("  - {}: already present", gate.kind),
        })
        .collect()
}

/// Lists registered auxiliary commands, aligned.
#[must_use]
pub fn commands_listing(commands: &[(&str, &str)]) -> String {
    let width = commands.iter().map(|(name, _)| name.len()).max().unwrap_or(0);
    let mut lines = vec!["Auxiliary commands:".to_owned()];
    lines.extend(
        commands
            .iter()
            .map(|(name, about)| format!("  {name:<width$}  {about}")),
    );
    lines.join("\n")
}

fn describe_commands(commands: &[String]) -> String {
    if commands.is_empty() {
        "(none)".to_owned()
    } else {
        commands.join(" ")
    }
}

fn describe_plan(plan: &GatePlan) -> String {
    match plan {
        GatePlan::Skip => "skip, generated output present".to_owned(),
        GatePlan::Invoke { args } => format!("run generator {}", args.join(" ")),
        GatePlan::Unresolvable { missing } => format!(
            "would fail, missing {}",
            missing
                .iter()
                .map(|path| path.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        ),
    }
}

fn describe_selection(selection: &ExtensionSelection) -> String {
    match selection {
        ExtensionSelection::Compile(descriptors) => format!("{} modules", descriptors.len()),
        ExtensionSelection::NotRequested => "not requested".to_owned(),
        ExtensionSelection::CapabilityUnavailable(notice) => notice.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ProjectConfig;
    use crate::generation::{ArtifactGenerationTask, ArtifactKind};
    use crate::manifest::DependencyManifest;
    use crate::pipeline::PlannedGate;
    use crate::version::VersionString;
    use camino::{Utf8Path, Utf8PathBuf};
    use common::{InterpreterVersion, Platform};
    use rstest::{fixture, rstest};

    #[fixture]
    fn context() -> InvocationContext {
        InvocationContext {
            commands: vec!["build_ext".to_owned()],
            platform: Platform::windows_32(),
            interpreter: InterpreterVersion::new(3, 11),
            root: Utf8PathBuf::from("/src/sdks/python"),
            python: "python3".to_owned(),
            quiet: false,
        }
    }

    fn plan(gates: Vec<PlannedGate>) -> BuildPlan {
        BuildPlan {
            version: VersionString::parse("2.61.0").expect("version"),
            gates,
            extensions: ExtensionSelection::NotRequested,
            dependencies: DependencyManifest::default(),
        }
    }

    #[rstest]
    fn dry_run_lists_context_and_gates(context: InvocationContext) {
        let root = Utf8Path::new("/src/sdks/python");
        let tasks = ArtifactGenerationTask::all_from_config(root, &ProjectConfig::default());
        let gates = tasks
            .into_iter()
            .zip([
                GatePlan::Skip,
                GatePlan::Unresolvable {
                    missing: vec![root.join("gen_xlang_wrappers.py")],
                },
            ])
            .map(|(task, plan)| PlannedGate { task, plan })
            .collect();
        let plan = plan(gates);

        let text = DryRunInfo {
            context: &context,
            plan: &plan,
        }
        .display_text();

        assert!(text.starts_with("Dry run"));
        assert!(text.contains("Platform: windows-32"));
        assert!(text.contains("Commands: build_ext"));
        assert!(text.contains("schema bindings: skip"));
        assert!(text.contains(
            "external transform wrappers: would fail, missing /src/sdks/python/gen_xlang_wrappers.py"
        ));
        assert!(text.contains("Extensions: not requested"));
    }

    #[rstest]
    fn dry_run_marks_empty_command_list(mut context: InvocationContext) {
        context.commands.clear();
        let plan = plan(Vec::new());
        let text = DryRunInfo {
            context: &context,
            plan: &plan,
        }
        .display_text();
        assert!(text.contains("Commands: (none)"));
    }

    #[test]
    fn gate_lines_describe_outcomes() {
        let lines = gate_lines(&[
            GateReport {
                kind: ArtifactKind::SchemaBindings,
                outcome: GateOutcome::Generated {
                    output: String::new(),
                },
            },
            GateReport {
                kind: ArtifactKind::TransformWrappers,
                outcome: GateOutcome::Skipped,
            },
        ]);
        assert_eq!(
            lines,
            vec![
                "  - schema bindings: generated",
                "  - external transform wrappers: already present"
            ]
        );
    }

    #[test]
    fn commands_are_aligned() {
        let text = commands_listing(&[("mypy", "type-check"), ("lint", "style")]);
        assert_eq!(
            text,
            "Auxiliary commands:\n  mypy  type-check\n  lint  style"
        );
    }

    #[test]
    fn write_failures_are_ignored() {
        struct Broken;
        impl Write for Broken {
            fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
                Err(std::io::Error::other("closed"))
            }
            fn flush(&mut self) -> std::io::Result<()> {
                Ok(())
            }
        }
        write_stderr_line(&mut Broken, "ignored");
    }
}
