//! External formatter and linter descriptions and their discovery
//!
//! [`registry`] lists the tools stylist knows (clang-format, cmake-format,
//! clang-tidy, flake8, black) with the tasks and languages each provides.
//! [`resolve`] finds an executable for an enabled tool and checks its version
//! against the configured constraint.

pub mod registry;
pub mod resolve;
pub mod types;

pub use resolve::{Resolver, probe_version};
pub use types::{HandlerKind, Language, Mode, ResolvedTool, Task, TaskOptions, ToolDescription};
