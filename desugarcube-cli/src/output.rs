//! File system side of a conversion
//!
//! Reading the export, naming the output and replacing it. The output file is only touched
//! once the JSON text exists in full: it is written to a temporary file in the target
//! directory and renamed over the old one, so a failed run leaves any previous output as it was.

use desugarcube_parser::{ConvertError, ConvertResult};
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Fail unless `path` is an existing regular file
pub fn ensure_file(path: impl AsRef<Path>) -> ConvertResult<PathBuf> {
    let path = path.as_ref();
    if !path.is_file() {
        let absolute = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());
        return Err(ConvertError::MissingInput(absolute));
    }
    Ok(path.to_path_buf())
}

pub fn read_source(path: &Path) -> ConvertResult<String> {
    std::fs::read_to_string(path).map_err(|e| ConvertError::io(path, e))
}

/// Sibling of `source` with the same stem and the given extension
pub fn json_path_for(source: &Path, extension: &str) -> PathBuf {
    source.with_extension(extension)
}

/// Replace the content of `path` with `text` in one step
pub fn write_replacing(path: &Path, text: &str) -> ConvertResult<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut file = NamedTempFile::new_in(dir).map_err(|e| ConvertError::io(dir, e))?;
    file.write_all(text.as_bytes())
        .and_then(|_| file.flush())
        .map_err(|e| ConvertError::io(path, e))?;
    file.persist(path).map_err(|e| ConvertError::io(path, e.error))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_path_for() {
        assert_eq!(
            json_path_for(Path::new("stories/tale.html"), "json"),
            PathBuf::from("stories/tale.json")
        );
        assert_eq!(
            json_path_for(Path::new("tale"), "json"),
            PathBuf::from("tale.json")
        );
    }

    #[test]
    fn test_ensure_file_rejects_directories() {
        let dir = tempfile::tempdir().unwrap();
        let err = ensure_file(dir.path()).unwrap_err();
        assert!(matches!(err, ConvertError::MissingInput(_)));
    }

    #[test]
    fn test_write_replacing_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("out.json");
        std::fs::write(&target, "old content that is longer").unwrap();

        write_replacing(&target, "{}").unwrap();
        assert_eq!(std::fs::read_to_string(&target).unwrap(), "{}");

        let leftovers = std::fs::read_dir(dir.path()).unwrap().count();
        assert_eq!(leftovers, 1);
    }
}
