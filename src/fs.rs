use std::path::Path;

use crate::error::{Error, Result};

/// Read a file, treating a missing file as empty.
pub(crate) fn read_optional(path: &Path) -> Result<String> {
    match std::fs::read_to_string(path) {
        Ok(content) => Ok(content),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!(path = %path.display(), "file not found, treating as empty");
            Ok(String::new())
        }
        Err(e) => Err(Error::io(path, e)),
    }
}
