use std::path::Path;

use crate::{
    constants::STDIN_INDICATOR,
    error::{Error, Result},
};

/// Reads a template file into a string.
pub fn read_template<P: AsRef<Path>>(path: P) -> Result<String> {
    std::fs::read_to_string(path.as_ref()).map_err(Error::IoError)
}

pub fn read_from(mut reader: impl std::io::Read) -> Result<String> {
    let mut buf = String::new();
    reader.read_to_string(&mut buf).map_err(Error::IoError)?;
    Ok(buf)
}

/// Resolves a command-line argument that may be `-` for standard input.
pub fn read_arg_or_stdin(arg: &str) -> Result<String> {
    if arg == STDIN_INDICATOR {
        read_from(std::io::stdin())
    } else {
        Ok(arg.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use tempfile::NamedTempFile;

    #[test]
    fn test_read_from() {
        assert_eq!(read_from(Cursor::new("{\"a\": 1}")).unwrap(), "{\"a\": 1}");
    }

    #[test]
    fn test_read_template() {
        let file = NamedTempFile::new().unwrap();
        std::fs::write(file.path(), "{{ . }}").unwrap();
        assert_eq!(read_template(file.path()).unwrap(), "{{ . }}");
    }

    #[test]
    fn test_read_arg_passthrough() {
        assert_eq!(read_arg_or_stdin("{}").unwrap(), "{}");
    }
}
