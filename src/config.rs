//! Project configuration (`.stylist.yaml` / `.stylist.toml`).
//!
//! ```yaml
//! global:
//!   exclude:
//!     match: ['(.*/)?third[-_]part(y|ies)/.*', 'vendor/.*']
//! tools:
//!   clang-format:
//!     version: ">=13, <17"
//!     option: -style=file
//!     include:
//!       match: ['src/.*\.[ch]pp$']
//!   cmake-format:
//!   clang-tidy:
//!     enable: false
//!     compile_commands_file: build/compile_commands.json
//! ```
//!
//! A tool that is mentioned is enabled unless `enable: false`. A tool that is
//! not mentioned is disabled. Patterns are matched from the beginning of the
//! root-relative, `/`-separated file path.

use regex::Regex;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::tools::registry;
use crate::version::VersionConstraint;

/// File names looked up, in order, in each directory
pub const CONFIG_FILE_NAMES: [&str; 3] = [".stylist.yaml", ".stylist.yml", ".stylist.toml"];

/// Vendored code is left alone unless the project says otherwise
pub const DEFAULT_GLOBAL_EXCLUDES: &[&str] = &[r"(.*/)?third[-_]part(y|ies)/.*"];

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
struct RawConfig {
    #[serde(default)]
    global: RawGlobal,
    // Kept untyped until the name is known to the registry, so entries of
    // unknown tools never reach `RawTool`'s field checks
    #[serde(default)]
    tools: BTreeMap<String, serde_yaml::Value>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
struct RawGlobal {
    exclude: Option<RawPatterns>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
struct RawPatterns {
    #[serde(rename = "match", default)]
    patterns: OneOrMany,
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
struct RawTool {
    enable: Option<bool>,
    version: Option<VersionText>,
    option: Option<OneOrMany>,
    include: Option<RawPatterns>,
    exclude: Option<RawPatterns>,
    path: Option<String>,
    compile_commands_file: Option<String>,
}

#[derive(Deserialize, Debug)]
#[serde(untagged)]
enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

impl Default for OneOrMany {
    fn default() -> Self {
        OneOrMany::Many(Vec::new())
    }
}

impl From<OneOrMany> for Vec<String> {
    fn from(value: OneOrMany) -> Self {
        match value {
            OneOrMany::One(s) => vec![s],
            OneOrMany::Many(v) => v,
        }
    }
}

// `version: 14` is an integer and `version: 0.6` a float in YAML
#[derive(Deserialize, Debug)]
#[serde(untagged)]
enum VersionText {
    Text(String),
    Integer(u64),
    Float(f64),
}

impl VersionText {
    /// Floats lose their spelling (`0.10` reads as `0.1`), so they must be quoted
    fn into_string(self, name: &str) -> Result<String> {
        match self {
            VersionText::Text(s) => Ok(s),
            VersionText::Integer(n) => Ok(n.to_string()),
            VersionText::Float(f) => Err(Error::config(
                format!("tools.{name}.version"),
                format!("{f} is read as a number, quote it: version: \"{f}\""),
            )),
        }
    }
}

/// Per-tool settings after validation
#[derive(Debug, Clone)]
pub struct ToolSpec {
    pub name: String,
    pub enabled: bool,
    pub version_constraint: VersionConstraint,
    /// Executable override, a path or a bare name looked up in `PATH`
    pub executable_path: Option<String>,
    pub options: Vec<String>,
    pub include_patterns: Vec<Regex>,
    pub exclude_patterns: Vec<Regex>,
    pub compile_commands: Option<PathBuf>,
}

impl ToolSpec {
    /// Enabled spec with registry defaults, as if `tools: {name: }` was written
    pub fn with_defaults(name: &str) -> Result<Self> {
        build_tool_spec(name, RawTool::default())
    }
}

/// Configuration of one invocation; immutable once loaded
#[derive(Debug, Clone)]
pub struct GlobalConfig {
    pub exclude_patterns: Vec<Regex>,
    pub tool_specs: BTreeMap<String, ToolSpec>,
    /// Directory file paths are reported relative to
    pub root: PathBuf,
    /// File the configuration was read from
    pub source: Option<PathBuf>,
}

impl GlobalConfig {
    /// Configuration with no tool enabled
    pub fn empty(root: impl Into<PathBuf>) -> Self {
        Self {
            exclude_patterns: default_global_excludes(),
            tool_specs: BTreeMap::new(),
            root: root.into(),
            source: None,
        }
    }

    /// Load `explicit` if given, else the first config file found walking up from `cwd`.
    pub fn discover(explicit: Option<&Path>, cwd: &Path) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }
        match find_config_file(cwd) {
            Some(path) => Self::load(&path),
            None => {
                log::info!(
                    "no {} found in {} or its parents",
                    CONFIG_FILE_NAMES[0],
                    cwd.display()
                );
                Ok(Self::empty(cwd))
            }
        }
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let root = path
            .canonicalize()
            .ok()
            .and_then(|p| p.parent().map(Path::to_path_buf))
            .unwrap_or_else(|| PathBuf::from("."));

        let is_toml = path.extension().is_some_and(|ext| ext == "toml");
        let mut config = if is_toml {
            Self::from_toml_str(&content, root)
        } else {
            Self::from_yaml_str(&content, root)
        }
        .map_err(|e| match e {
            Error::Config { key, message } if key.is_empty() => {
                Error::config(path.display().to_string(), message)
            }
            other => other,
        })?;
        config.source = Some(path.to_path_buf());
        log::debug!("loaded configuration from {}", path.display());
        Ok(config)
    }

    pub fn from_yaml_str(content: &str, root: impl Into<PathBuf>) -> Result<Self> {
        // An empty document is a valid, empty configuration
        let raw: Option<RawConfig> =
            serde_yaml::from_str(content).map_err(|e| Error::config("", e.to_string()))?;
        Self::from_raw(raw.unwrap_or_default(), root.into())
    }

    pub fn from_toml_str(content: &str, root: impl Into<PathBuf>) -> Result<Self> {
        let raw: RawConfig =
            toml::from_str(content).map_err(|e| Error::config("", e.to_string()))?;
        Self::from_raw(raw, root.into())
    }

    fn from_raw(raw: RawConfig, root: PathBuf) -> Result<Self> {
        let exclude_patterns = match raw.global.exclude {
            Some(exclude) => compile_patterns("global.exclude.match", exclude.patterns.into())?,
            None => default_global_excludes(),
        };

        let mut tool_specs = BTreeMap::new();
        for (name, entry) in raw.tools {
            if registry::find(&name).is_none() {
                log::warn!("ignoring unknown tool '{name}' in configuration");
                continue;
            }
            let entry: Option<RawTool> = serde_yaml::from_value(entry)
                .map_err(|e| Error::config(format!("tools.{name}"), e.to_string()))?;
            let spec = build_tool_spec(&name, entry.unwrap_or_default())?;
            tool_specs.insert(name, spec);
        }

        Ok(Self {
            exclude_patterns,
            tool_specs,
            root,
            source: None,
        })
    }

    pub fn spec(&self, name: &str) -> Option<&ToolSpec> {
        self.tool_specs.get(name)
    }

    pub fn is_enabled(&self, name: &str) -> bool {
        self.spec(name).is_some_and(|s| s.enabled)
    }
}

fn build_tool_spec(name: &str, raw: RawTool) -> Result<ToolSpec> {
    let description = registry::find(name)
        .ok_or_else(|| Error::config(format!("tools.{name}"), "unknown tool"))?;

    let version_constraint = match raw.version {
        Some(text) => VersionConstraint::parse(&text.into_string(name)?)
            .map_err(|e| Error::config(format!("tools.{name}.version"), e.to_string()))?,
        None => VersionConstraint::any(),
    };

    let include_patterns = match raw.include {
        Some(include) => compile_patterns(
            &format!("tools.{name}.include.match"),
            include.patterns.into(),
        )?,
        None => compile_patterns(
            &format!("tools.{name}.include.match"),
            description
                .default_include
                .iter()
                .map(|p| p.to_string())
                .collect(),
        )?,
    };
    let exclude_patterns = match raw.exclude {
        Some(exclude) => compile_patterns(
            &format!("tools.{name}.exclude.match"),
            exclude.patterns.into(),
        )?,
        None => Vec::new(),
    };

    let executable_path = raw.path.filter(|p| !p.trim().is_empty());

    Ok(ToolSpec {
        name: name.to_string(),
        enabled: raw.enable.unwrap_or(true),
        version_constraint,
        executable_path,
        options: raw.option.map(Vec::from).unwrap_or_default(),
        include_patterns,
        exclude_patterns,
        compile_commands: raw.compile_commands_file.map(PathBuf::from),
    })
}

/// Compile a pattern anchored at the start of the path, like Python's `re.match`
pub fn compile_pattern(key: &str, pattern: &str) -> Result<Regex> {
    Regex::new(&format!("^(?:{pattern})"))
        .map_err(|e| Error::config(key, format!("invalid pattern '{pattern}': {e}")))
}

fn compile_patterns(key: &str, patterns: Vec<String>) -> Result<Vec<Regex>> {
    patterns.iter().map(|p| compile_pattern(key, p)).collect()
}

fn default_global_excludes() -> Vec<Regex> {
    DEFAULT_GLOBAL_EXCLUDES
        .iter()
        .filter_map(|p| compile_pattern("global.exclude.match", p).ok())
        .collect()
}

/// Walk from `start` up to the filesystem root looking for a config file
pub fn find_config_file(start: &Path) -> Option<PathBuf> {
    start.ancestors().find_map(|dir| {
        CONFIG_FILE_NAMES
            .iter()
            .map(|name| dir.join(name))
            .find(|candidate| candidate.is_file())
    })
}
