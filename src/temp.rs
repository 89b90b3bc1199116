use anyhow::{Context, Result};
use std::{io::Write, path::PathBuf};

/// Writes `contents` to a new, uniquely named file in the system temp
/// directory and returns its path. The caller owns the file afterwards.
///
/// Nothing is left behind if writing fails.
pub fn write_temp_file(suffix: &str, contents: &[u8]) -> Result<PathBuf> {
    let mut file = tempfile::Builder::new()
        .suffix(suffix)
        .tempfile()
        .context("Failed to create temporary file")?;

    file.write_all(contents)
        .with_context(|| format!("Failed to write {}", file.path().display()))?;
    file.flush()?;

    let (_, path) = file.keep().context("Failed to keep temporary file")?;
    Ok(path)
}
