//! `stylist tools`: which executable each known tool resolves to.

use anyhow::Result;
use colored::*;
use serde::Serialize;

use crate::config::{GlobalConfig, ToolSpec};
use crate::tools::{Resolver, registry};
use crate::ui::Table;

/// Resolution status of one registry tool
#[derive(Debug, Serialize)]
pub struct ToolStatus {
    pub tool: &'static str,
    pub enabled: bool,
    pub tasks: Vec<&'static str>,
    pub version_constraint: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub executable: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Resolve every known tool, configured or not
///
/// Tools missing from the configuration are resolved with their defaults so
/// the listing also shows what enabling them would pick up.
pub fn collect(config: &GlobalConfig, resolver: &Resolver) -> Result<Vec<ToolStatus>> {
    let mut statuses = Vec::new();
    for description in registry::TOOLS {
        let spec = match config.spec(description.name) {
            Some(spec) => spec.clone(),
            None => ToolSpec::with_defaults(description.name)?,
        };

        let mut status = ToolStatus {
            tool: description.name,
            enabled: config.is_enabled(description.name),
            tasks: description.provides.iter().map(|t| t.task.name()).collect(),
            version_constraint: spec.version_constraint.to_string(),
            executable: None,
            version: None,
            error: None,
        };
        match resolver.resolve(&spec, description, &config.root) {
            Ok(tool) => {
                status.executable = Some(tool.executable.display().to_string());
                status.version = Some(tool.version.to_string());
            }
            Err(e) => status.error = Some(e.to_string()),
        }
        statuses.push(status);
    }
    Ok(statuses)
}

pub fn render(statuses: &[ToolStatus]) -> Table {
    let mut table = Table::new(&["Tool", "Enabled", "Tasks", "Executable", "Version"]);
    for status in statuses {
        let enabled = if status.enabled {
            "yes".green().to_string()
        } else {
            "no".dimmed().to_string()
        };
        let (executable, version) = match (&status.executable, &status.version, &status.error) {
            (Some(path), Some(version), _) => (path.clone(), version.green().to_string()),
            (_, _, Some(error)) => ("-".to_string(), error.red().to_string()),
            _ => ("-".to_string(), "-".to_string()),
        };
        table.add_row(vec![
            status.tool.bold().to_string(),
            enabled,
            status.tasks.join(", "),
            executable,
            version,
        ]);
    }
    table
}

/// Handle the `stylist tools` command
pub fn handle_tools(config: &GlobalConfig, resolver: &Resolver, json: bool) -> Result<()> {
    let statuses = collect(config, resolver)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&statuses)?);
        return Ok(());
    }

    match &config.source {
        Some(path) => println!("{} Configuration: {}", "⚙".cyan(), path.display()),
        None => println!(
            "{} No configuration found, every tool is disabled",
            "!".yellow()
        ),
    }
    render(&statuses).print();
    Ok(())
}
