//! Plain file load/save.

use std::io::ErrorKind;
use std::path::Path;

use crate::error::{Error, Result};

/// Read a file as lines with their terminators stripped.
///
/// A path that does not exist yet yields no lines rather than an error.
/// Content that is not UTF-8 is refused so a later save cannot alter it.
pub fn load_lines(path: &Path) -> Result<Vec<String>> {
    let bytes = match std::fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(Error::io(path, e)),
    };

    let text = String::from_utf8(bytes).map_err(|_| Error::InvalidUtf8 {
        path: path.to_path_buf(),
    })?;
    Ok(text
        .split_terminator('\n')
        .map(|line| line.trim_end_matches('\r').to_string())
        .collect())
}

/// Write `content` to `path`, truncating it, and return the byte count
pub fn write_content(path: &Path, content: &str) -> Result<usize> {
    std::fs::write(path, content.as_bytes()).map_err(|e| Error::io(path, e))?;
    Ok(content.len())
}
