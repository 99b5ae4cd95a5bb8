//! Host-facing entry points.
//!
//! A host exposes two functions: `execute`, which takes template text, and
//! `execute_file`, which takes a template file path. Both take the data as a
//! second argument, either as an already decoded [`Value`] or as JSON text.
//! Before calling them, the host may run [`Provider::validate_argument`] on
//! each argument to reject bad input early.

use crate::{
    error::{Error, Result},
    renderer::{Engine, TemplateRenderer},
    validation::{validate_with, TemplateSource},
    value::Value,
};
use log::debug;
use std::{fmt, path::Path, sync::Arc};
use thiserror::Error;

/// Position of the template argument.
pub const TEMPLATE_ARGUMENT: usize = 0;
/// Position of the data argument.
pub const DATA_ARGUMENT: usize = 1;

/// Data handed to a template.
#[derive(Debug, Clone, PartialEq)]
pub enum Data {
    /// A value the host has already decoded
    Value(Value),
    /// JSON text, decoded before the template runs
    Json(String),
}

impl Data {
    /// Decodes the data. Malformed JSON is an [`Error::Argument`].
    pub fn into_value(self) -> Result<Value> {
        match self {
            Data::Value(value) => Ok(value),
            Data::Json(text) => Value::from_json_str(&text),
        }
    }
}

impl From<Value> for Data {
    fn from(value: Value) -> Self {
        Data::Value(value)
    }
}

impl From<&str> for Data {
    fn from(json: &str) -> Self {
        Data::Json(json.to_string())
    }
}

impl From<String> for Data {
    fn from(json: String) -> Self {
        Data::Json(json)
    }
}

/// The functions a host can call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostFunction {
    /// Executes inline template text
    Execute,
    /// Executes a template file
    ExecuteFile,
}

impl HostFunction {
    pub fn name(&self) -> &'static str {
        match self {
            HostFunction::Execute => "execute",
            HostFunction::ExecuteFile => "execute_file",
        }
    }

    /// Name of the template parameter.
    pub fn template_parameter(&self) -> &'static str {
        match self {
            HostFunction::Execute => "text",
            HostFunction::ExecuteFile => "file",
        }
    }

    pub fn description(&self) -> String {
        format!(
            "Executes a Go text/template from `{}` using the provided `data`",
            self.template_parameter()
        )
    }

    fn source(&self, arg: &str) -> TemplateSource {
        TemplateSource::from_arg(arg, *self == HostFunction::ExecuteFile)
    }
}

impl fmt::Display for HostFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A rejected argument, reported back to the host with its position.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("argument {position}: {message}")]
pub struct ArgumentFailure {
    pub position: usize,
    pub message: String,
}

impl ArgumentFailure {
    fn new(position: usize, message: impl fmt::Display) -> Self {
        Self { position, message: message.to_string() }
    }
}

/// Runs the host functions on top of an [`Engine`].
#[derive(Clone, Default)]
pub struct Provider {
    engine: Engine,
}

impl Provider {
    pub fn new(engine: Engine) -> Self {
        Self { engine }
    }

    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    /// Executes inline template text against `data`.
    pub fn execute(&self, text: &str, data: impl Into<Data>) -> Result<String> {
        let data = data.into().into_value()?;
        self.engine.render(text, &data)
    }

    /// Executes the template file at `path` against `data`.
    pub fn execute_file(&self, path: &Path, data: impl Into<Data>) -> Result<String> {
        let data = data.into().into_value()?;
        self.engine.render_path(path, &data)
    }

    /// Dispatches a call by function.
    pub fn call(&self, function: HostFunction, template: &str, data: impl Into<Data>) -> Result<String> {
        debug!("Calling {function}: {}", function.description());
        match function {
            HostFunction::Execute => self.execute(template, data),
            HostFunction::ExecuteFile => self.execute_file(Path::new(template), data),
        }
    }

    /// Checks one argument of a host function call without executing anything.
    ///
    /// The template argument is compiled (and for `execute_file`, the file is
    /// checked first); the data argument must be valid JSON.
    pub fn validate_argument(
        &self,
        function: HostFunction,
        position: usize,
        value: &str,
    ) -> Result<(), ArgumentFailure> {
        match position {
            TEMPLATE_ARGUMENT => {
                validate_with(&function.source(value), Arc::clone(self.engine.library()))
                    .map_err(|err| ArgumentFailure::new(position, err))
            }
            DATA_ARGUMENT => Value::from_json_str(value)
                .map(|_| ())
                .map_err(|err| ArgumentFailure::new(position, err)),
            _ => Err(ArgumentFailure::new(
                position,
                format!("{function} takes 2 arguments"),
            )),
        }
    }
}

/// Executes inline template text with the standard function library.
pub fn execute(text: &str, data: impl Into<Data>) -> Result<String> {
    Provider::default().execute(text, data)
}

/// Executes a template file with the standard function library.
pub fn execute_file(path: &Path, data: impl Into<Data>) -> Result<String> {
    Provider::default().execute_file(path, data)
}

/// Validates one argument of a host function call.
pub fn validate_argument(
    function: HostFunction,
    position: usize,
    value: &str,
) -> Result<(), ArgumentFailure> {
    Provider::default().validate_argument(function, position, value)
}

impl From<ArgumentFailure> for Error {
    fn from(failure: ArgumentFailure) -> Self {
        Error::Validation(failure.to_string())
    }
}
