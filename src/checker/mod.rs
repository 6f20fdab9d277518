//! Running a task (format, static analysis, clang-tidy) over the code base.
//!
//! Each tool enabled for the task goes through the same pipeline, one tool
//! at a time: resolve the executable, select its files, dispatch batches.
//! Per-tool errors end that tool in the `Failed` state and the run moves on,
//! so the final [`RunReport`] shows every tool's status.

mod dispatch;
mod select;

pub use dispatch::{
    ClangTidyHandler, DispatchContext, DispatchOutcome, ExecutableHandler, MAX_COMMAND_LINE,
    ToolHandler, batches, handler_for,
};
pub use select::{FileSet, accepts, relative_path, select};

use std::path::PathBuf;

use crate::config::{CONFIG_FILE_NAMES, GlobalConfig, ToolSpec};
use crate::report::{RunReport, ToolReport, ToolState};
use crate::tools::{Language, Mode, Resolver, Task, ToolDescription, registry};

/// Options of one task invocation
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub task: Task,
    /// Report issues instead of rewriting files
    pub dry_run: bool,
    pub languages: Vec<Language>,
    /// Files or directories to restrict the run to; the project root when empty
    pub paths: Vec<PathBuf>,
    pub compile_commands: Option<PathBuf>,
    pub quiet: bool,
}

impl RunOptions {
    pub fn new(task: Task) -> Self {
        Self {
            task,
            dry_run: false,
            languages: registry::supported_languages(task),
            paths: Vec::new(),
            compile_commands: None,
            quiet: false,
        }
    }
}

/// Run `options.task` with every enabled tool that provides it
pub fn run_task(config: &GlobalConfig, resolver: &Resolver, options: &RunOptions) -> RunReport {
    let mode = Mode::for_task(options.task, options.dry_run);
    let mut report = RunReport::new(options.task, mode);

    let tools: Vec<&'static ToolDescription> =
        registry::tools_for_task(options.task, &options.languages)
            .filter(|d| config.is_enabled(d.name))
            .collect();
    if tools.is_empty() {
        log::warn!(
            "no tool enabled for task {}; consider editing {} at the root of your project",
            options.task,
            CONFIG_FILE_NAMES[0]
        );
        return report;
    }

    let ctx = DispatchContext {
        task: options.task,
        mode,
        config,
        compile_commands: options.compile_commands.as_deref(),
        quiet: options.quiet,
    };

    for description in tools {
        if let Some(spec) = config.spec(description.name) {
            report.push(run_tool(description, spec, resolver, &ctx, &options.paths));
        }
    }
    report
}

fn run_tool(
    description: &'static ToolDescription,
    spec: &ToolSpec,
    resolver: &Resolver,
    ctx: &DispatchContext<'_>,
    paths: &[PathBuf],
) -> ToolReport {
    let handler = handler_for(description);
    let mut report = ToolReport::new(description.name);

    report.advance(ToolState::Resolving);
    let tool = match handler.resolve(spec, resolver, ctx.config) {
        Ok(tool) => tool,
        Err(e) => {
            log::error!("{e}");
            report.errors.push(e.to_string());
            report.advance(ToolState::Failed);
            return report;
        }
    };
    report.executable = Some(tool.executable.clone());
    report.version = Some(tool.version.to_string());

    report.advance(ToolState::Selecting);
    let files = handler.select_files(&tool, ctx.config, paths);
    report.files = files.len();
    if files.is_empty() {
        log::info!("{}: no files to process", description.name);
        report.advance(ToolState::Succeeded);
        return report;
    }

    report.advance(ToolState::Dispatching);
    let outcome = handler.invoke(&tool, &files, ctx);
    report.invocations = outcome.invocations;
    report.violations = outcome.violations;
    report.errors = outcome.failures;
    if let Some(e) = outcome.aborted {
        log::error!("{e}");
        report.errors.push(e.to_string());
    }

    let terminal = if !report.errors.is_empty() {
        ToolState::Failed
    } else if !report.violations.is_empty() {
        ToolState::Violated
    } else {
        ToolState::Succeeded
    };
    report.advance(terminal);
    report
}
