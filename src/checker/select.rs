//! Choosing the files a tool processes.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::config::{GlobalConfig, ToolSpec};

/// Files selected for one tool, in traversal order without duplicates
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FileSet {
    files: Vec<PathBuf>,
    seen: HashSet<PathBuf>,
}

impl FileSet {
    /// Append `path` unless already present; returns whether it was added
    pub fn insert(&mut self, path: PathBuf) -> bool {
        if self.seen.insert(path.clone()) {
            self.files.push(path);
            true
        } else {
            false
        }
    }

    pub fn as_slice(&self) -> &[PathBuf] {
        &self.files
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PathBuf> {
        self.files.iter()
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

impl<'a> IntoIterator for &'a FileSet {
    type Item = &'a PathBuf;
    type IntoIter = std::slice::Iter<'a, PathBuf>;

    fn into_iter(self) -> Self::IntoIter {
        self.files.iter()
    }
}

/// Whether `relative` (a `/`-separated path) belongs to the tool
pub fn accepts(spec: &ToolSpec, config: &GlobalConfig, relative: &str) -> bool {
    let included = spec.include_patterns.iter().any(|re| re.is_match(relative));
    included
        && !spec
            .exclude_patterns
            .iter()
            .chain(&config.exclude_patterns)
            .any(|re| re.is_match(relative))
}

/// Walk `roots` (the project root when empty) and keep the files `spec` accepts.
///
/// Roots may be files or directories. Symbolic links are followed and
/// directory cycles skipped; `.git` directories are never entered.
pub fn select(spec: &ToolSpec, config: &GlobalConfig, roots: &[PathBuf]) -> FileSet {
    let project_root = [config.root.clone()];
    let roots = if roots.is_empty() {
        &project_root[..]
    } else {
        roots
    };

    let mut files = FileSet::default();
    for root in roots {
        if root.is_file() {
            consider(spec, config, root, &mut files);
            continue;
        }

        let walker = WalkDir::new(root)
            .follow_links(true)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| !(e.file_type().is_dir() && e.file_name() == ".git"));
        for entry in walker {
            match entry {
                Ok(entry) if entry.file_type().is_file() => {
                    consider(spec, config, entry.path(), &mut files)
                }
                Ok(_) => {}
                Err(err) if err.loop_ancestor().is_some() => {
                    log::debug!("skipping directory cycle: {err}");
                }
                Err(err) => log::warn!("skipping unreadable entry: {err}"),
            }
        }
    }

    log::debug!("{}: selected {} file(s)", spec.name, files.len());
    files
}

fn consider(spec: &ToolSpec, config: &GlobalConfig, path: &Path, files: &mut FileSet) {
    let relative = relative_path(&config.root, path);
    if accepts(spec, config, &relative) {
        files.insert(PathBuf::from(relative));
    }
}

/// `path` relative to `root` with `/` separators, or as given when outside `root`
pub fn relative_path(root: &Path, path: &Path) -> String {
    let stripped = path.strip_prefix(root).ok().map(Path::to_path_buf).or_else(|| {
        let canonical = path.canonicalize().ok()?;
        let root = root.canonicalize().ok()?;
        canonical.strip_prefix(root).ok().map(Path::to_path_buf)
    });

    match stripped {
        Some(rel) => rel
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect::<Vec<_>>()
            .join("/"),
        None => path.to_string_lossy().into_owned(),
    }
}
