//! Cross-platform filesystem helpers
//!
//! Descriptor files are replaced atomically: content is written to a sibling
//! temporary file and renamed over the target, so a crashed or cancelled run
//! never leaves a half-written descriptor behind.

use std::io;
use std::path::{Path, PathBuf};

/// Cross-platform atomic rename that handles Windows file replacement.
///
/// On Unix, `fs::rename` atomically replaces the target if it exists.
/// On Windows, `fs::rename` fails if the target exists, so the target is
/// deleted first.
pub fn atomic_rename(src: &Path, dst: &Path) -> io::Result<()> {
    #[cfg(windows)]
    {
        if dst.exists() {
            std::fs::remove_file(dst)?;
        }
    }
    std::fs::rename(src, dst)
}

/// Write `contents` to `path` via a sibling `.tmp` file and atomic rename.
pub fn write_atomic(path: &Path, contents: &[u8]) -> io::Result<()> {
    let tmp = sibling_tmp_path(path);
    std::fs::write(&tmp, contents)?;
    if let Err(e) = atomic_rename(&tmp, path) {
        let _ = std::fs::remove_file(&tmp);
        return Err(e);
    }
    Ok(())
}

fn sibling_tmp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_write_atomic_creates_file() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("CONTEXT.llm");
        write_atomic(&target, b"@component: X\n").unwrap();
        assert_eq!(std::fs::read_to_string(&target).unwrap(), "@component: X\n");
        // No stray temp file left behind
        assert!(!dir.path().join("CONTEXT.llm.tmp").exists());
    }

    #[test]
    fn test_write_atomic_replaces_existing() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("CONTEXT.llm");
        std::fs::write(&target, "old").unwrap();
        write_atomic(&target, b"new").unwrap();
        assert_eq!(std::fs::read_to_string(&target).unwrap(), "new");
    }
}
