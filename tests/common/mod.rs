//! Helpers shared by the CLI tests: temporary projects and fake tools.

#![allow(dead_code)]

use assert_cmd::Command;
use sha2::{Digest, Sha256};
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use walkdir::WalkDir;

/// Environment variables that would bypass the fake tools
const TOOL_OVERRIDES: &[&str] = &["CLANG_FORMAT", "CMAKE_FORMAT", "CLANG_TIDY", "FLAKE8", "BLACK"];

/// A project directory plus a directory of fake tools used as `PATH`
pub struct Sandbox {
    pub project: TempDir,
    pub bin: TempDir,
}

impl Sandbox {
    pub fn new(config: &str, files: &[(&str, &str)]) -> Self {
        let project = tempfile::tempdir().unwrap();
        let bin = tempfile::tempdir().unwrap();
        fs::write(project.path().join(".stylist.yaml"), config).unwrap();
        for (name, content) in files {
            let path = project.path().join(name);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, content).unwrap();
        }
        Self { project, bin }
    }

    pub fn root(&self) -> &Path {
        self.project.path()
    }

    pub fn read(&self, name: &str) -> String {
        fs::read_to_string(self.root().join(name)).unwrap()
    }

    /// `stylist` running in the project with only the fake tools on `PATH`
    #[allow(deprecated)]
    pub fn stylist(&self) -> Command {
        let mut cmd = Command::cargo_bin("stylist").unwrap();
        cmd.current_dir(self.root())
            .env("PATH", self.bin.path())
            .env_remove("RUST_LOG");
        for var in TOOL_OVERRIDES {
            cmd.env_remove(var);
        }
        cmd
    }

    /// Tool that prints `version` and logs its arguments, then runs `body`
    pub fn fake_tool(&self, name: &str, version: &str, body: &str) -> PathBuf {
        let path = self.bin.path().join(name);
        let script = format!(
            "#!/bin/sh\nPATH=/usr/bin:/bin\nexport PATH\nif [ \"$1\" = \"--version\" ]; then echo \"{name} version {version}\"; exit 0; fi\necho \"$@\" >> '{}'\n{body}\n",
            self.calls_file(name).display()
        );
        fs::write(&path, script).unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    /// Formatter stripping trailing whitespace; `check_flag` turns it into a checker
    pub fn fake_formatter(&self, name: &str, version: &str, check_flag: &str) -> PathBuf {
        let body = format!(
            r#"check=0
for arg in "$@"; do
  if [ "$arg" = "{check_flag}" ]; then check=1; fi
done
status=0
for f in "$@"; do
  case "$f" in -*) continue ;; esac
  if grep -q '[[:space:]]$' "$f"; then
    if [ $check = 1 ]; then
      echo "would reformat $f"
      status=1
    else
      tmp=$(mktemp)
      sed 's/[[:space:]]*$//' "$f" > "$tmp" && cat "$tmp" > "$f"
      rm -f "$tmp"
    fi
  fi
done
exit $status"#
        );
        self.fake_tool(name, version, &body)
    }

    fn calls_file(&self, name: &str) -> PathBuf {
        self.bin.path().join(format!("{name}.calls"))
    }

    /// Argument lists the fake tool was called with, one per invocation
    pub fn calls(&self, name: &str) -> Vec<String> {
        fs::read_to_string(self.calls_file(name))
            .map(|s| s.lines().map(str::to_string).collect())
            .unwrap_or_default()
    }

    /// Digest of every file path and content under the project
    pub fn tree_hash(&self) -> String {
        let mut hasher = Sha256::new();
        for entry in WalkDir::new(self.root()).sort_by_file_name() {
            let entry = entry.unwrap();
            if entry.file_type().is_file() {
                hasher.update(entry.path().to_string_lossy().as_bytes());
                hasher.update(fs::read(entry.path()).unwrap());
            }
        }
        format!("{:x}", hasher.finalize())
    }
}
