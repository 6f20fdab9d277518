//! Running resolved tools on their files.
//!
//! Files are passed in batches bounded both by the tool's `max_files` and by
//! [`MAX_COMMAND_LINE`] bytes of arguments. Invocations run one after the
//! other, each waiting for the previous process to exit, so a format pass of
//! one tool is complete before another tool touches the tree.

use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::process::Command;

use super::select::{self, FileSet};
use crate::config::{GlobalConfig, ToolSpec};
use crate::error::{Error, Result};
use crate::tools::{HandlerKind, Mode, ResolvedTool, Resolver, Task, ToolDescription};
use crate::ui;

/// Upper bound on the bytes of file arguments of a single invocation
pub const MAX_COMMAND_LINE: usize = 30_000;

/// What the dispatcher needs to know about the current run
pub struct DispatchContext<'a> {
    pub task: Task,
    pub mode: Mode,
    pub config: &'a GlobalConfig,
    /// `-p` given on the command line, takes precedence over the config
    pub compile_commands: Option<&'a Path>,
    /// Do not echo executed commands
    pub quiet: bool,
}

/// Result of running one tool over its file set
#[derive(Debug, Default)]
pub struct DispatchOutcome {
    /// Processes that were started
    pub invocations: usize,
    /// Files of the batches that reported issues in check mode
    pub violations: Vec<PathBuf>,
    /// Batches that failed in format mode
    pub failures: Vec<String>,
    /// Error that stopped the remaining batches
    pub aborted: Option<Error>,
}

/// Capability of a tool variant: find it, pick its files, run it.
pub trait ToolHandler {
    fn description(&self) -> &'static ToolDescription;

    fn resolve(
        &self,
        spec: &ToolSpec,
        resolver: &Resolver,
        config: &GlobalConfig,
    ) -> Result<ResolvedTool> {
        resolver.resolve(spec, self.description(), &config.root)
    }

    fn select_files(
        &self,
        tool: &ResolvedTool,
        config: &GlobalConfig,
        roots: &[PathBuf],
    ) -> FileSet {
        select::select(&tool.spec, config, roots)
    }

    /// Options placed between the user options and the files
    fn command_options(&self, ctx: &DispatchContext<'_>) -> Result<Vec<String>> {
        task_options(self.description(), ctx)
    }

    fn invoke(
        &self,
        tool: &ResolvedTool,
        files: &FileSet,
        ctx: &DispatchContext<'_>,
    ) -> DispatchOutcome {
        match self.command_options(ctx) {
            Ok(options) => run_batches(tool, &options, files.as_slice(), ctx),
            Err(e) => DispatchOutcome {
                aborted: Some(e),
                ..Default::default()
            },
        }
    }
}

/// Formatters and linters invoked as `tool [options] files...`
pub struct ExecutableHandler {
    description: &'static ToolDescription,
}

impl ToolHandler for ExecutableHandler {
    fn description(&self) -> &'static ToolDescription {
        self.description
    }
}

/// clang-tidy, pointed at a compilation database with `-p`
pub struct ClangTidyHandler {
    description: &'static ToolDescription,
}

impl ToolHandler for ClangTidyHandler {
    fn description(&self) -> &'static ToolDescription {
        self.description
    }

    fn command_options(&self, ctx: &DispatchContext<'_>) -> Result<Vec<String>> {
        let mut options = task_options(self.description, ctx)?;
        let database = ctx.compile_commands.map(Path::to_path_buf).or_else(|| {
            ctx.config
                .spec(self.description.name)
                .and_then(|s| s.compile_commands.clone())
        });
        match database {
            Some(path) => {
                options.push("-p".to_string());
                options.push(path.to_string_lossy().into_owned());
            }
            None => log::info!(
                "clang-tidy: no compilation database given, clang-tidy will look for one itself"
            ),
        }
        Ok(options)
    }
}

pub fn handler_for(description: &'static ToolDescription) -> Box<dyn ToolHandler> {
    match description.handler {
        HandlerKind::Executable => Box::new(ExecutableHandler { description }),
        HandlerKind::ClangTidy => Box::new(ClangTidyHandler { description }),
    }
}

fn task_options(description: &ToolDescription, ctx: &DispatchContext<'_>) -> Result<Vec<String>> {
    let task = description.task(ctx.task).ok_or_else(|| Error::Unsupported {
        tool: description.name.to_string(),
        message: format!("does not provide task '{}'", ctx.task),
    })?;
    let options = task.options_for(ctx.mode).ok_or_else(|| Error::Unsupported {
        tool: description.name.to_string(),
        message: "dry run is not supported".to_string(),
    })?;
    Ok(options.iter().map(|o| o.to_string()).collect())
}

/// Split `files` into consecutive batches of at most `max_files` entries and
/// `max_bytes` bytes of arguments. A single oversized file still gets a batch.
pub fn batches(files: &[PathBuf], max_files: usize, max_bytes: usize) -> Vec<&[PathBuf]> {
    let max_files = max_files.max(1);
    let mut out = Vec::new();
    let mut start = 0;
    let mut bytes = 0;
    for (i, file) in files.iter().enumerate() {
        let len = file.as_os_str().len() + 1;
        if i > start && (i - start >= max_files || bytes + len > max_bytes) {
            out.push(&files[start..i]);
            start = i;
            bytes = 0;
        }
        bytes += len;
    }
    if start < files.len() {
        out.push(&files[start..]);
    }
    out
}

fn run_batches(
    tool: &ResolvedTool,
    options: &[String],
    files: &[PathBuf],
    ctx: &DispatchContext<'_>,
) -> DispatchOutcome {
    let name = tool.name();
    let fixed_len: usize = tool
        .spec
        .options
        .iter()
        .chain(options)
        .map(|o| o.len() + 1)
        .sum::<usize>()
        + tool.executable.as_os_str().len();
    let budget = MAX_COMMAND_LINE.saturating_sub(fixed_len);
    let chunks = batches(files, tool.description.max_files, budget);

    let pb = ProgressBar::new(chunks.len() as u64);
    if let Ok(style) = ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
    {
        pb.set_style(style.progress_chars("#>-"));
    }
    pb.set_message(name.to_string());

    let languages = tool
        .description
        .task(ctx.task)
        .map(|t| {
            t.languages
                .iter()
                .map(|l| l.name())
                .collect::<Vec<_>>()
                .join("/")
        })
        .unwrap_or_default();

    let mut outcome = DispatchOutcome::default();
    for chunk in chunks {
        let mut cmd = Command::new(&tool.executable);
        cmd.args(&tool.spec.options)
            .args(options)
            .args(chunk)
            .current_dir(&ctx.config.root);

        let args: Vec<&std::ffi::OsStr> = cmd.get_args().collect();
        let line = ui::command_line(&tool.executable, &args);
        log::debug!("{line}");
        if !ctx.quiet {
            pb.suspend(|| println!("{}", line.dimmed()));
        }

        let output = match cmd.output() {
            Ok(output) => output,
            Err(source) => {
                outcome.aborted = Some(Error::Execution {
                    tool: name.to_string(),
                    command: line,
                    source,
                });
                break;
            }
        };
        outcome.invocations += 1;
        pb.inc(1);

        if output.status.success() {
            continue;
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);
        // tool diagnostics go to stderr, stdout is kept for the summary
        pb.suspend(|| {
            for text in [&stdout, &stderr] {
                if !text.trim().is_empty() {
                    eprintln!("{}", text.trim_end());
                }
            }
        });

        let listed = chunk
            .iter()
            .map(|f| f.to_string_lossy())
            .collect::<Vec<_>>()
            .join(" ");
        match ctx.mode {
            Mode::Check => {
                log::error!("{languages} | {name} reported issues (one or more): {listed}");
                outcome.violations.extend(chunk.iter().cloned());
            }
            Mode::Format => {
                log::error!("{name} failed ({}) on: {listed}", output.status);
                outcome
                    .failures
                    .push(format!("{} on {} file(s)", output.status, chunk.len()));
            }
        }
    }
    pb.finish_and_clear();

    outcome
}
