//! Per-tool outcome and the end-of-run summary.

use colored::*;
use serde::Serialize;
use std::path::PathBuf;

use crate::tools::{Mode, Task};
use crate::ui::Table;

/// Lifecycle of one tool within a run
///
/// `Idle → Resolving → Selecting → Dispatching → {Succeeded, Violated, Failed}`.
/// Resolution errors jump straight to `Failed`; an empty file set goes from
/// `Selecting` to `Succeeded`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolState {
    Idle,
    Resolving,
    Selecting,
    Dispatching,
    Succeeded,
    Violated,
    Failed,
}

impl ToolState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ToolState::Succeeded | ToolState::Violated | ToolState::Failed
        )
    }

    /// Severity used to pick the run status: `Failed > Violated > Succeeded`
    pub fn severity(&self) -> u8 {
        match self {
            ToolState::Failed => 2,
            ToolState::Violated => 1,
            _ => 0,
        }
    }

    pub fn can_advance_to(&self, next: ToolState) -> bool {
        use ToolState::*;
        matches!(
            (self, next),
            (Idle, Resolving)
                | (Resolving, Selecting)
                | (Resolving, Failed)
                | (Selecting, Dispatching)
                | (Selecting, Succeeded)
                | (Dispatching, Succeeded | Violated | Failed)
        )
    }

    pub fn label(&self) -> &'static str {
        match self {
            ToolState::Idle => "idle",
            ToolState::Resolving => "resolving",
            ToolState::Selecting => "selecting",
            ToolState::Dispatching => "dispatching",
            ToolState::Succeeded => "ok",
            ToolState::Violated => "violations",
            ToolState::Failed => "failed",
        }
    }
}

/// What happened to one tool
#[derive(Debug, Clone, Serialize)]
pub struct ToolReport {
    pub tool: String,
    pub state: ToolState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub executable: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    pub files: usize,
    pub invocations: usize,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub violations: Vec<PathBuf>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
}

impl ToolReport {
    pub fn new(tool: &str) -> Self {
        Self {
            tool: tool.to_string(),
            state: ToolState::Idle,
            executable: None,
            version: None,
            files: 0,
            invocations: 0,
            violations: Vec::new(),
            errors: Vec::new(),
        }
    }

    /// Move to `next`, logging the transition
    pub fn advance(&mut self, next: ToolState) {
        debug_assert!(
            self.state.can_advance_to(next),
            "{}: invalid transition {:?} -> {next:?}",
            self.tool,
            self.state
        );
        log::debug!("{}: {:?} -> {next:?}", self.tool, self.state);
        self.state = next;
    }

    fn detail(&self) -> String {
        match self.state {
            ToolState::Violated => format!(
                "issues reported in batch(es) covering {} file(s): {}",
                self.violations.len(),
                self.violations
                    .iter()
                    .map(|p| p.to_string_lossy())
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
            ToolState::Failed => self.errors.join("; "),
            _ => format!("{} file(s)", self.files),
        }
    }
}

/// Outcome of a whole task run
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub task: Task,
    pub mode: Mode,
    pub tools: Vec<ToolReport>,
}

impl RunReport {
    pub fn new(task: Task, mode: Mode) -> Self {
        Self {
            task,
            mode,
            tools: Vec::new(),
        }
    }

    pub fn push(&mut self, report: ToolReport) {
        debug_assert!(
            report.state.is_terminal(),
            "{}: pushed while not finished ({:?})",
            report.tool,
            report.state
        );
        self.tools.push(report);
    }

    /// Worst terminal state across tools, `Succeeded` when nothing ran
    pub fn status(&self) -> ToolState {
        self.tools
            .iter()
            .map(|t| t.state)
            .max_by_key(ToolState::severity)
            .filter(|s| s.severity() > 0)
            .unwrap_or(ToolState::Succeeded)
    }

    /// 0 when every tool succeeded, 1 on violations, 2 when a tool failed
    pub fn exit_code(&self) -> u8 {
        self.status().severity()
    }

    /// Tools that violated or failed
    pub fn problems(&self) -> impl Iterator<Item = &ToolReport> {
        self.tools.iter().filter(|t| t.state.severity() > 0)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Table of the tools that need attention, or a one-line success message
    pub fn summary_table(&self) -> Option<Table> {
        let mut table = Table::new(&["Tool", "Status", "Detail"]);
        for tool in self.problems() {
            let status = match tool.state {
                ToolState::Failed => tool.state.label().red().bold().to_string(),
                _ => tool.state.label().yellow().bold().to_string(),
            };
            table.add_row(vec![tool.tool.clone(), status, tool.detail()]);
        }
        (!table.is_empty()).then_some(table)
    }

    pub fn print_summary(&self) {
        match self.summary_table() {
            None => {
                let files: usize = self.tools.iter().map(|t| t.files).sum();
                println!(
                    "{} {}: {} tool(s) passed on {} file(s).",
                    "✓".green(),
                    self.task,
                    self.tools.len(),
                    files
                );
            }
            Some(table) => {
                println!();
                table.print();
                let failed = self.problems().count();
                println!(
                    "{} {}: {} of {} tool(s) need attention.",
                    "x".red(),
                    self.task,
                    failed,
                    self.tools.len()
                );
                if self.mode == Mode::Check && self.task.modifies_files() {
                    println!(
                        "\n   Run {} to fix formatting.",
                        format!("stylist {}", self.task).cyan().bold()
                    );
                }
            }
        }
    }
}
