use crate::{
    constants::INLINE_TEMPLATE_NAME,
    error::{Error, FileError, Result},
    renderer::FunctionLibrary,
    template,
};
use log::debug;
use std::{
    path::{Path, PathBuf},
    sync::Arc,
};
use thiserror::Error;

/// Where a template to validate comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateSource {
    /// Inline template text
    Text(String),
    /// Path to a template file
    File(PathBuf),
}

impl TemplateSource {
    /// Builds a source from a raw argument, treating it as a path when `is_file` is set.
    pub fn from_arg(arg: &str, is_file: bool) -> Self {
        if is_file {
            TemplateSource::File(PathBuf::from(arg))
        } else {
            TemplateSource::Text(arg.to_string())
        }
    }
}

#[derive(Error, Debug)]
pub enum ValidationError {
    /// A template file precondition failed; the file was not read.
    #[error("{0}")]
    File(#[from] FileError),
    /// The template was read but does not compile.
    #[error("{0}")]
    Template(Error),
}

impl From<Error> for ValidationError {
    fn from(err: Error) -> Self {
        match err {
            Error::File(err) => ValidationError::File(err),
            other => ValidationError::Template(other),
        }
    }
}

impl From<ValidationError> for Error {
    fn from(err: ValidationError) -> Self {
        Error::Validation(err.to_string())
    }
}

/// Checks that a template compiles against the standard function library,
/// without executing it.
pub fn validate(source: &TemplateSource) -> Result<(), ValidationError> {
    validate_with(source, Arc::new(FunctionLibrary::standard()))
}

/// Like [`validate`], compiling against `library`.
pub fn validate_with(
    source: &TemplateSource,
    library: Arc<FunctionLibrary>,
) -> Result<(), ValidationError> {
    match source {
        TemplateSource::Text(text) => {
            template::parse(INLINE_TEMPLATE_NAME, text, library)?;
        }
        TemplateSource::File(path) => validate_file(path, library)?,
    }
    debug!("Template source is valid");
    Ok(())
}

fn validate_file(path: &Path, library: Arc<FunctionLibrary>) -> Result<()> {
    template::parse_file(path, library).map(|_| ())
}
