//! # stylist CLI Entry Point
//!
//! Parses the command line with clap, loads the project configuration and
//! hands the task to [`stylist::checker::run_task`].
//!
//! ## Commands
//!
//! - `format`, `static-analysis`, `clang-tidy`: run a task
//! - `tools`: show how each known tool resolves
//! - `completion`: shell completion scripts

use anyhow::{Context, Result, bail};
use clap::{Args, CommandFactory, Parser, Subcommand};
use clap_complete::{Shell, generate};
use colored::*;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use stylist::checker::{self, RunOptions};
use stylist::commands;
use stylist::config::GlobalConfig;
use stylist::tools::{Language, Mode, Resolver, Task, registry};

#[derive(Parser)]
#[command(name = "stylist")]
#[command(about = "Run formatters and linters over a C/C++ code base", version = env!("CARGO_PKG_VERSION"))]
#[command(long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Increase logging verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
    /// Do not echo the commands being run
    #[arg(short, long, global = true)]
    quiet: bool,
    /// Configuration file to use instead of searching for .stylist.yaml
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Print the summary as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct TaskArgs {
    /// Comma-separated languages to process (c++, cmake, python)
    #[arg(long, value_delimiter = ',', value_name = "LANGS")]
    lang: Vec<String>,
    /// Files or directories to process [default: project root]
    paths: Vec<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Format code in place
    Format {
        /// Report files that need formatting without modifying them
        #[arg(short = 'n', long)]
        dry_run: bool,
        #[command(flatten)]
        args: TaskArgs,
    },
    /// Run static analysis (clang-tidy, flake8)
    StaticAnalysis {
        /// Build directory containing compile_commands.json
        #[arg(short = 'p', value_name = "BUILD_PATH")]
        build_path: Option<PathBuf>,
        #[command(flatten)]
        args: TaskArgs,
    },
    /// Run clang-tidy only
    ClangTidy {
        /// Build directory containing compile_commands.json
        #[arg(short = 'p', value_name = "BUILD_PATH")]
        build_path: Option<PathBuf>,
        /// Files or directories to process [default: project root]
        paths: Vec<PathBuf>,
    },
    /// Show which executable and version each known tool resolves to
    Tools,
    /// Generate shell completion scripts
    Completion { shell: Shell },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(&cli) {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            eprintln!("{} {:#}", "error:".red().bold(), e);
            ExitCode::from(2)
        }
    }
}

/// `-v` raises the level; `RUST_LOG` still wins when set
fn init_logging(verbosity: u8) {
    let level = match verbosity {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        _ => log::LevelFilter::Debug,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .format_timestamp(None)
        .format_target(false)
        .parse_default_env()
        .init();
}

fn run(cli: &Cli) -> Result<u8> {
    let cwd = std::env::current_dir().context("Failed to read current directory")?;

    let mut options = match &cli.command {
        Commands::Completion { shell } => {
            let mut cmd = Cli::command();
            let bin_name = cmd.get_name().to_string();
            generate(*shell, &mut cmd, bin_name, &mut std::io::stdout());
            return Ok(0);
        }
        Commands::Tools => {
            let config = load_config(cli, &cwd)?;
            commands::tools::handle_tools(&config, &Resolver::from_env(), cli.json)?;
            return Ok(0);
        }
        Commands::Format { dry_run, args } => RunOptions {
            dry_run: *dry_run,
            ..task_options(Task::Format, &cwd, &args.lang, &args.paths, None)?
        },
        Commands::StaticAnalysis { build_path, args } => task_options(
            Task::StaticAnalysis,
            &cwd,
            &args.lang,
            &args.paths,
            build_path.as_deref(),
        )?,
        Commands::ClangTidy { build_path, paths } => {
            task_options(Task::ClangTidy, &cwd, &[], paths, build_path.as_deref())?
        }
    };
    options.quiet = cli.quiet || cli.json;
    let (task, dry_run) = (options.task, options.dry_run);

    let config = load_config(cli, &cwd)?;
    for path in &options.paths {
        if !path.exists() {
            bail!("No such file or directory: {}", path.display());
        }
    }

    let show_banner = !cli.quiet && !cli.json;
    if show_banner {
        let verb = match Mode::for_task(task, dry_run) {
            Mode::Format => "Formatting",
            Mode::Check => "Checking",
        };
        println!(
            "{} {} ({}) in {}",
            "🎨".magenta(),
            verb,
            task,
            config.root.display()
        );
    }

    let report = checker::run_task(&config, &Resolver::from_env(), &options);
    if cli.json {
        println!("{}", report.to_json()?);
    } else if !cli.quiet || report.exit_code() != 0 {
        report.print_summary();
    }
    Ok(report.exit_code())
}

fn load_config(cli: &Cli, cwd: &Path) -> Result<GlobalConfig> {
    let explicit = cli.config.as_ref().map(|p| absolute(cwd, p));
    let config = GlobalConfig::discover(explicit.as_deref(), cwd)
        .context("Failed to load configuration")?;
    if config.source.is_none() && !matches!(cli.command, Commands::Tools) {
        log::warn!(
            "no configuration file found, nothing to do (create .stylist.yaml at the root of your project)"
        );
    }
    Ok(config)
}

fn task_options(
    task: Task,
    cwd: &Path,
    lang: &[String],
    paths: &[PathBuf],
    build_path: Option<&Path>,
) -> Result<RunOptions> {
    Ok(RunOptions {
        languages: parse_languages(task, lang)?,
        paths: paths.iter().map(|p| absolute(cwd, p)).collect(),
        compile_commands: build_path.map(|p| absolute(cwd, p)),
        ..RunOptions::new(task)
    })
}

/// Languages from `--lang`, every language the task supports when empty
fn parse_languages(task: Task, requested: &[String]) -> Result<Vec<Language>> {
    let supported = registry::supported_languages(task);
    if requested.is_empty() {
        return Ok(supported);
    }

    let mut languages = Vec::new();
    for name in requested.iter().filter(|n| !n.trim().is_empty()) {
        let Some(lang) = Language::parse(name) else {
            bail!("Unknown language '{}'", name);
        };
        if !supported.contains(&lang) {
            let names: Vec<_> = supported.iter().map(|l| l.name()).collect();
            bail!(
                "{} does not support {} (supported: {})",
                task,
                lang,
                names.join(", ")
            );
        }
        if !languages.contains(&lang) {
            languages.push(lang);
        }
    }
    Ok(languages)
}

fn absolute(cwd: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        cwd.join(path)
    }
}
