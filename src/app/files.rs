use crate::app::error::{BuildError, BuildResult};
use std::fs;
use std::path::Path;

pub fn read_source(path: &Path) -> BuildResult<String> {
    fs::read_to_string(path).map_err(|e| BuildError::io(path, e))
}

/// Writes `contents` to `dest`, creating missing parent directories.
pub fn write_output(dest: &Path, contents: impl AsRef<[u8]>) -> BuildResult<()> {
    ensure_parent(dest)?;
    fs::write(dest, contents).map_err(|e| BuildError::io(dest, e))
}

/// Byte-copies `source` to `dest`, creating missing parent directories.
pub fn copy_file(source: &Path, dest: &Path) -> BuildResult<()> {
    ensure_parent(dest)?;
    fs::copy(source, dest).map_err(|e| BuildError::io(source, e))?;
    Ok(())
}

/// `create_dir_all` already succeeds on existing directories, so
/// concurrent stages may race here safely.
fn ensure_parent(dest: &Path) -> BuildResult<()> {
    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent).map_err(|e| BuildError::io(parent, e))?;
    }
    Ok(())
}
