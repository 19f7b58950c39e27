//! Whole-file replacement through a sibling temp file.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

/// Write `bytes` to a temp file next to `path`, then rename it into place.
/// Readers see either the old file or the complete new one. Missing parent
/// directories are created. Returns the size of the written file.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> io::Result<u64> {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };

    fs::create_dir_all(&parent)?;
    let mut tmp = NamedTempFile::new_in(&parent)?;
    tmp.write_all(bytes)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| e.error)?;

    Ok(fs::metadata(path)?.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn entries(dir: &Path) -> Vec<String> {
        let mut names: Vec<String> = fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    #[test]
    fn creates_missing_parents() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("a/b/out.json");

        let len = write_atomic(&path, b"{}\n").unwrap();

        assert_eq!(len, 3);
        assert_eq!(fs::read_to_string(&path).unwrap(), "{}\n");
    }

    #[test]
    fn replaces_existing_file_without_leftovers() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("out.json");
        fs::write(&path, "a much longer previous body").unwrap();

        write_atomic(&path, b"new").unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "new");
        assert_eq!(entries(tmp.path()), vec!["out.json"]);
    }

    #[test]
    fn failed_rename_leaves_target_alone() {
        let tmp = TempDir::new().unwrap();
        // a directory cannot be replaced by a file
        let path = tmp.path().join("taken");
        fs::create_dir(&path).unwrap();
        fs::write(path.join("keep"), "x").unwrap();

        assert!(write_atomic(&path, b"new").is_err());
        assert!(path.is_dir());
        assert_eq!(entries(tmp.path()), vec!["taken"]);
    }
}
