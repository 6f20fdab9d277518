use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

use crate::config::ToolSpec;
use crate::version::ToolVersion;

/// Languages a tool can process
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Language {
    Cpp,
    CMake,
    Python,
}

impl Language {
    pub const ALL: [Language; 3] = [Language::Cpp, Language::CMake, Language::Python];

    pub fn name(&self) -> &'static str {
        match self {
            Language::Cpp => "C++",
            Language::CMake => "CMake",
            Language::Python => "Python",
        }
    }

    /// Case-insensitive lookup, accepts `c++`, `cpp`, `cmake`, `python`
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "c++" | "cpp" | "cxx" => Some(Language::Cpp),
            "cmake" => Some(Language::CMake),
            "python" | "py" => Some(Language::Python),
            _ => None,
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// User-facing operations, each provided by one or more tools
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Task {
    Format,
    StaticAnalysis,
    ClangTidy,
}

impl Task {
    pub fn name(&self) -> &'static str {
        match self {
            Task::Format => "format",
            Task::StaticAnalysis => "static-analysis",
            Task::ClangTidy => "clang-tidy",
        }
    }

    /// Whether the task rewrites files when not in dry-run
    pub fn modifies_files(&self) -> bool {
        matches!(self, Task::Format)
    }
}

impl fmt::Display for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// How a tool is invoked on its files
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Rewrite files in place
    Format,
    /// Report non-conformance without touching files
    Check,
}

impl Mode {
    pub fn for_task(task: Task, dry_run: bool) -> Self {
        if task.modifies_files() && !dry_run {
            Mode::Format
        } else {
            Mode::Check
        }
    }
}

/// Which [`crate::checker::ToolHandler`] variant drives a tool
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandlerKind {
    /// Plain executable taking options then files
    Executable,
    /// clang-tidy, which also needs a compilation database
    ClangTidy,
}

/// What a tool does for one task
#[derive(Debug)]
pub struct TaskOptions {
    pub task: Task,
    pub languages: &'static [Language],
    /// Options for [`Mode::Format`], or the only options of a check-only task
    pub cmd_opts: &'static [&'static str],
    /// Options for [`Mode::Check`] on a task that modifies files
    pub dry_run_opts: Option<&'static [&'static str]>,
}

impl TaskOptions {
    /// Command line options for a mode, `None` when the tool has no dry run
    pub fn options_for(&self, mode: Mode) -> Option<&'static [&'static str]> {
        match mode {
            Mode::Check if self.task.modifies_files() => self.dry_run_opts,
            _ => Some(self.cmd_opts),
        }
    }
}

/// Static description of a known tool, compiled into the binary
#[derive(Debug)]
pub struct ToolDescription {
    /// Canonical executable name, also the key in `.stylist.yaml`
    pub name: &'static str,
    /// File names accepted when scanning `PATH` (e.g. `clang-format-14`)
    pub names_regex: &'static str,
    pub version_opt: &'static [&'static str],
    /// First capture group holds the version
    pub version_re: &'static str,
    pub default_include: &'static [&'static str],
    /// Files passed per invocation
    pub max_files: usize,
    pub provides: &'static [TaskOptions],
    pub handler: HandlerKind,
}

impl ToolDescription {
    pub fn task(&self, task: Task) -> Option<&TaskOptions> {
        self.provides.iter().find(|t| t.task == task)
    }

    pub fn handles(&self, task: Task, languages: &[Language]) -> bool {
        self.task(task)
            .is_some_and(|t| t.languages.iter().any(|l| languages.contains(l)))
    }

    /// Environment variable overriding the executable, e.g. `CLANG_FORMAT`
    pub fn env_variable(&self) -> String {
        self.name
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() {
                    c.to_ascii_uppercase()
                } else {
                    '_'
                }
            })
            .collect()
    }
}

impl fmt::Display for ToolDescription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// A tool whose executable has been located and version-checked
#[derive(Debug, Clone)]
pub struct ResolvedTool {
    pub spec: ToolSpec,
    pub description: &'static ToolDescription,
    /// Absolute path to the executable
    pub executable: PathBuf,
    pub version: ToolVersion,
}

impl ResolvedTool {
    pub fn name(&self) -> &str {
        &self.spec.name
    }
}
