//! # stylist - formatter and linter runner for C/C++ code bases
//!
//! stylist finds clang-format, cmake-format, clang-tidy, flake8 and black on
//! the machine, picks the files each of them owns according to
//! `.stylist.yaml`, and runs them in batches.
//!
//! ## Quick Start
//!
//! ```bash
//! # Rewrite every file in place
//! stylist format
//!
//! # CI: report files that need formatting, exit 1 if any
//! stylist format -n
//!
//! # clang-tidy and flake8
//! stylist static-analysis -p build
//! ```
//!
//! ## Module Organization
//!
//! - [`config`] - `.stylist.yaml` / `.stylist.toml` loading
//! - [`tools`] - known tools and executable resolution
//! - [`checker`] - file selection and dispatch of a task
//! - [`report`] - per-tool states and the end-of-run summary

/// Task orchestration: file selection and tool dispatch.
pub mod checker;

/// CLI command handlers.
pub mod commands;

/// Configuration file parsing.
pub mod config;

/// Error type shared by the library.
pub mod error;

/// Run outcome and exit code.
pub mod report;

/// Tool registry and resolution.
pub mod tools;

/// Terminal UI helpers (tables, command lines).
pub mod ui;

/// Tool versions and version constraints.
pub mod version;
