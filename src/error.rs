use std::path::PathBuf;
use thiserror::Error;

/// Preconditions checked on a template file before it is read.
#[derive(Error, Debug)]
pub enum FileError {
    #[error("Template file '{}' does not exist.", path.display())]
    NotFound { path: PathBuf },

    #[error("'{}' is a directory.", path.display())]
    IsDirectory { path: PathBuf },

    #[error("'{}' is empty.", path.display())]
    Empty { path: PathBuf },
}

/// Failures reported by a library function called from a template.
#[derive(Error, Debug)]
pub enum FuncError {
    /// The pattern argument of a regex function did not compile.
    #[error("invalid pattern: {0}")]
    Pattern(#[from] regex::Error),

    /// The value could not be represented as JSON.
    #[error("cannot encode value as JSON: {0}")]
    Encoding(#[from] serde_json::Error),
}

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}.")]
    IoError(#[from] std::io::Error),

    /// Bad syntax or an unknown function, raised while compiling a template.
    #[error("template: {name}: {message}")]
    Parse { name: String, message: String },

    #[error("{0}")]
    File(#[from] FileError),

    /// Malformed input data, e.g. invalid JSON.
    #[error("Invalid data argument: {0}")]
    Argument(String),

    #[error("template: error calling {function}: {source}")]
    Pattern {
        function: String,
        #[source]
        source: regex::Error,
    },

    #[error("template: error calling {function}: {source}")]
    Function {
        function: String,
        #[source]
        source: FuncError,
    },

    /// Unresolved reference or type mismatch while walking the data.
    #[error("template: {name}: {message}")]
    Execution { name: String, message: String },

    /// The output sink refused further writes.
    #[error("Failed to write output: {0}")]
    Sink(#[source] std::io::Error),

    #[error("Validation error: {0}")]
    Validation(String),
}

impl Error {
    /// Wraps an error returned by the library function `function`.
    pub fn from_func(function: &str, err: FuncError) -> Self {
        match err {
            FuncError::Pattern(source) => {
                Error::Pattern { function: function.to_string(), source }
            }
            source => Error::Function { function: function.to_string(), source },
        }
    }
}

/// Convenience type alias for Results with gotter's Error as the error type.
///
/// # Type Parameters
/// * `T` - The type of the success value
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Default error handler that prints the error and exits the program.
///
/// # Arguments
/// * `err` - The Error to handle
///
/// # Behavior
/// Prints the error message to stderr and exits with status code 1
pub fn default_error_handler(err: Error) {
    eprintln!("{}", err);
    std::process::exit(crate::constants::exit_codes::FAILURE);
}
