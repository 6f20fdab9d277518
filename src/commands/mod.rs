//! CLI command handlers
//!
//! Task commands go straight to [`crate::checker::run_task`]; the handlers
//! here cover the commands that do not run a task.

pub mod tools;
