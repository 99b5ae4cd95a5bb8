/// Handles argument parsing and command dispatch.
pub mod cli;

/// Shared constants.
pub mod constants;

/// Defines custom error types.
pub mod error;

/// Extension traits for standard library types.
pub mod ext;

/// A set of helpers for reading templates and data.
pub mod ioutils;

/// Host-facing `execute` / `execute_file` entry points.
pub mod provider;

/// Function library, rendering engine and observer hooks.
pub mod renderer;

/// Template compilation and execution.
pub mod template;

/// Compile-only checks of template sources.
pub mod validation;

/// The dynamic data model.
pub mod value;

pub use error::{Error, Result};
pub use provider::{execute, execute_file, Data};
pub use value::Value;
