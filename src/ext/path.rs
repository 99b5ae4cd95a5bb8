use std::path::Path;

use crate::error::{FileError, Result};

/// Extension trait for Path with the checks gotter runs on template files
pub trait PathExt {
    /// Verifies that the path can be used as a template file.
    ///
    /// The checks run in order: the path must exist, must not be a directory
    /// and must not be empty. Nothing is read from the file.
    ///
    /// # Returns
    /// * `Ok(())` - If every check passed
    /// * `Err(Error::File)` - The first precondition that failed
    ///
    /// # Examples
    /// ```
    /// use gotter::ext::PathExt;
    /// use std::path::Path;
    ///
    /// assert!(Path::new("does/not/exist.tmpl").check_template_file().is_err());
    /// ```
    fn check_template_file(&self) -> Result<()>;
}

impl PathExt for Path {
    fn check_template_file(&self) -> Result<()> {
        let metadata = match self.metadata() {
            Ok(metadata) => metadata,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Err(FileError::NotFound { path: self.to_path_buf() }.into());
            }
            Err(err) => return Err(err.into()),
        };
        if metadata.is_dir() {
            return Err(FileError::IsDirectory { path: self.to_path_buf() }.into());
        }
        if metadata.len() == 0 {
            return Err(FileError::Empty { path: self.to_path_buf() }.into());
        }
        Ok(())
    }
}
