//! Locating tool executables and checking their versions.
//!
//! Lookup order for a tool:
//! 1. `path` from the tool's configuration,
//! 2. the environment variable named after the tool (`CLANG_FORMAT`, ...),
//! 3. every matching executable on the search path; the highest version
//!    satisfying the constraint wins.

use rayon::prelude::*;
use regex::Regex;
use std::collections::HashSet;
use std::env;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use super::types::{ResolvedTool, ToolDescription};
use crate::config::ToolSpec;
use crate::error::{Error, Result};
use crate::ui;
use crate::version::ToolVersion;

#[derive(Debug, Clone)]
pub struct Resolver {
    search_path: Option<OsString>,
    env_overrides: bool,
}

impl Resolver {
    /// Resolver reading `PATH` and the per-tool environment overrides
    pub fn from_env() -> Self {
        Self {
            search_path: env::var_os("PATH"),
            env_overrides: true,
        }
    }

    /// Resolver restricted to `search_path`, ignoring environment overrides
    pub fn with_search_path(search_path: impl Into<OsString>) -> Self {
        Self {
            search_path: Some(search_path.into()),
            env_overrides: false,
        }
    }

    pub fn resolve(
        &self,
        spec: &ToolSpec,
        description: &'static ToolDescription,
        root: &Path,
    ) -> Result<ResolvedTool> {
        let tool = description.name;

        if let Some(requested) = self.override_for(spec, description) {
            let executable = self.locate_override(tool, &requested, root)?;
            let version = probe_version(description, &executable)?;
            if !spec.version_constraint.matches(&version) {
                return Err(Error::VersionMismatch {
                    tool: tool.to_string(),
                    required: spec.version_constraint.to_string(),
                    found: format!("{version} at {}", executable.display()),
                });
            }
            log::info!(
                "{tool}: using {} ({version})",
                executable.display()
            );
            return Ok(ResolvedTool {
                spec: spec.clone(),
                description,
                executable,
                version,
            });
        }

        let candidates = self.search_candidates(description, root);
        if candidates.is_empty() {
            return Err(Error::ToolNotFound {
                tool: tool.to_string(),
                detail: "no executable found in PATH".to_string(),
            });
        }

        // Version probes only read, so they can run side by side
        let probed: Vec<(PathBuf, Result<ToolVersion>)> = candidates
            .into_par_iter()
            .map(|path| {
                let version = probe_version(description, &path);
                (path, version)
            })
            .collect();

        let mut found = Vec::new();
        let mut matching = Vec::new();
        for (path, version) in probed {
            match version {
                Ok(version) => {
                    log::debug!("{tool}: candidate {} ({version})", path.display());
                    found.push(version.to_string());
                    if spec.version_constraint.matches(&version) {
                        matching.push((path, version));
                    }
                }
                Err(e) => log::warn!("{e}"),
            }
        }

        if found.is_empty() {
            return Err(Error::ToolNotFound {
                tool: tool.to_string(),
                detail: "no candidate in PATH reported a usable version".to_string(),
            });
        }

        // max_by keeps the last maximum, so walk backwards to prefer PATH order on ties
        let Some((executable, version)) = matching
            .into_iter()
            .rev()
            .max_by(|a, b| a.1.cmp(&b.1))
        else {
            return Err(Error::VersionMismatch {
                tool: tool.to_string(),
                required: spec.version_constraint.to_string(),
                found: found.join(", "),
            });
        };

        log::info!(
            "{tool}: found {} ({version}) matching requirement {}",
            executable.display(),
            spec.version_constraint
        );
        Ok(ResolvedTool {
            spec: spec.clone(),
            description,
            executable,
            version,
        })
    }

    fn override_for(&self, spec: &ToolSpec, description: &ToolDescription) -> Option<String> {
        if let Some(path) = &spec.executable_path {
            return Some(path.clone());
        }
        if !self.env_overrides {
            return None;
        }
        env::var(description.env_variable())
            .ok()
            .filter(|value| !value.trim().is_empty())
    }

    fn locate_override(&self, tool: &str, requested: &str, root: &Path) -> Result<PathBuf> {
        let as_path = Path::new(requested);
        let is_bare_name = as_path.components().count() == 1 && !as_path.is_absolute();

        let located = if is_bare_name {
            which::which_in(requested, self.search_path.as_ref(), root).ok()
        } else {
            let full = if as_path.is_absolute() {
                as_path.to_path_buf()
            } else {
                root.join(as_path)
            };
            full.canonicalize().ok().filter(|p| p.is_file())
        };

        located.ok_or_else(|| Error::ToolNotFound {
            tool: tool.to_string(),
            detail: format!("configured executable '{requested}' does not exist"),
        })
    }

    /// Executables on the search path whose name matches the tool, in search order
    pub fn search_candidates(&self, description: &ToolDescription, cwd: &Path) -> Vec<PathBuf> {
        let mut seen = HashSet::new();
        let mut candidates = Vec::new();

        if let Some(search_path) = &self.search_path
            && let Ok(names_re) = Regex::new(description.names_regex)
        {
            for dir in env::split_paths(search_path) {
                let Ok(entries) = fs::read_dir(&dir) else {
                    continue;
                };
                let mut matches: Vec<PathBuf> = entries
                    .filter_map(|e| e.ok())
                    .map(|e| e.path())
                    .filter(|p| {
                        p.file_name()
                            .is_some_and(|n| names_re.is_match(&n.to_string_lossy()))
                    })
                    .filter(|p| is_executable(p))
                    .collect();
                matches.sort();
                for path in matches {
                    if seen.insert(path.clone()) {
                        candidates.push(path);
                    }
                }
            }
        }

        // which knows about PATHEXT and friends
        if let Ok(found) = which::which_in_all(description.name, self.search_path.as_ref(), cwd) {
            for path in found {
                if seen.insert(path.clone()) {
                    candidates.push(path);
                }
            }
        }

        candidates
    }
}

/// Run the tool's version flag and extract the version from its output
pub fn probe_version(description: &ToolDescription, path: &Path) -> Result<ToolVersion> {
    let tool = description.name;
    let command = ui::command_line(path, description.version_opt);
    log::debug!("{command}");

    let output = Command::new(path)
        .args(description.version_opt)
        .output()
        .map_err(|source| Error::Execution {
            tool: tool.to_string(),
            command: command.clone(),
            source,
        })?;

    let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
    text.push_str(&String::from_utf8_lossy(&output.stderr));

    let version_re = Regex::new(description.version_re)
        .map_err(|e| Error::config(format!("{tool}.version_re"), e.to_string()))?;
    version_re
        .captures(&text)
        .and_then(|caps| caps.get(1))
        .and_then(|m| ToolVersion::parse(m.as_str()))
        .ok_or_else(|| Error::VersionProbe {
            tool: tool.to_string(),
            path: path.to_path_buf(),
            output: text.trim().to_string(),
        })
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    fs::metadata(path).is_ok_and(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}
