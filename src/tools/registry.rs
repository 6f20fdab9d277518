//! Fixed registry of the tools stylist knows how to drive.

use super::types::{HandlerKind, Language, Task, TaskOptions, ToolDescription};

pub const DEFAULT_VERSION_RE: &str = r"([0-9]+\.[0-9]+(\.[0-9]+)?[ab]?)";

const CLANG_FORMAT_DRY_RUN: &[&str] = &["--dry-run", "--ferror-limit", "1", "--Werror"];

/// Known tools in dispatch order
pub static TOOLS: &[ToolDescription] = &[
    ToolDescription {
        name: "clang-format",
        // clang-format, clang-format-14, clang-format-mp-14 but not clang-format-diff
        names_regex: r"^clang-format(-mp)?(-[0-9]+(\.[0-9]+)*)?(\.exe)?$",
        version_opt: &["--version"],
        version_re: DEFAULT_VERSION_RE,
        default_include: &[r".*\.(c|cc|cpp|cxx|h|hh|hpp|hxx|ipp|tpp)$"],
        max_files: 30,
        provides: &[TaskOptions {
            task: Task::Format,
            languages: &[Language::Cpp],
            cmd_opts: &["-i"],
            dry_run_opts: Some(CLANG_FORMAT_DRY_RUN),
        }],
        handler: HandlerKind::Executable,
    },
    ToolDescription {
        name: "cmake-format",
        names_regex: r"^cmake-format(\.exe)?$",
        version_opt: &["--version"],
        version_re: DEFAULT_VERSION_RE,
        default_include: &[r"(.*/)?CMakeLists\.txt$", r".*\.cmake$"],
        max_files: 30,
        provides: &[TaskOptions {
            task: Task::Format,
            languages: &[Language::CMake],
            cmd_opts: &["-i"],
            dry_run_opts: Some(&["--check"]),
        }],
        handler: HandlerKind::Executable,
    },
    ToolDescription {
        name: "clang-tidy",
        names_regex: r"^clang-tidy(-mp)?(-[0-9]+(\.[0-9]+)*)?(\.exe)?$",
        version_opt: &["--version"],
        version_re: DEFAULT_VERSION_RE,
        default_include: &[r".*\.(c|cc|cpp|cxx)$"],
        max_files: 30,
        provides: &[
            TaskOptions {
                task: Task::StaticAnalysis,
                languages: &[Language::Cpp],
                cmd_opts: &[],
                dry_run_opts: None,
            },
            TaskOptions {
                task: Task::ClangTidy,
                languages: &[Language::Cpp],
                cmd_opts: &[],
                dry_run_opts: None,
            },
        ],
        handler: HandlerKind::ClangTidy,
    },
    ToolDescription {
        name: "flake8",
        names_regex: r"^flake8(\.exe)?$",
        version_opt: &["--version"],
        version_re: DEFAULT_VERSION_RE,
        default_include: &[r".*\.py$"],
        max_files: 30,
        provides: &[TaskOptions {
            task: Task::StaticAnalysis,
            languages: &[Language::Python],
            cmd_opts: &[],
            dry_run_opts: None,
        }],
        handler: HandlerKind::Executable,
    },
    ToolDescription {
        name: "black",
        names_regex: r"^black(\.exe)?$",
        version_opt: &["--version"],
        version_re: DEFAULT_VERSION_RE,
        default_include: &[r".*\.py$"],
        max_files: 30,
        provides: &[TaskOptions {
            task: Task::Format,
            languages: &[Language::Python],
            cmd_opts: &[],
            dry_run_opts: Some(&["--check"]),
        }],
        handler: HandlerKind::Executable,
    },
];

pub fn find(name: &str) -> Option<&'static ToolDescription> {
    TOOLS.iter().find(|t| t.name == name)
}

/// Tools providing `task` for at least one of `languages`, in dispatch order
pub fn tools_for_task(
    task: Task,
    languages: &[Language],
) -> impl Iterator<Item = &'static ToolDescription> + '_ {
    TOOLS.iter().filter(move |t| t.handles(task, languages))
}

/// Languages at least one tool supports for `task`
pub fn supported_languages(task: Task) -> Vec<Language> {
    Language::ALL
        .into_iter()
        .filter(|lang| TOOLS.iter().any(|t| t.handles(task, &[*lang])))
        .collect()
}
