//! Output file handling.

use crate::config::WriteMode;
use crate::error::{RenderError, RenderResult};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Writes rendered output to its destination.
///
/// The file handle lives only inside [`OutputWriter::write_with`] and is
/// closed on every return path.
pub struct OutputWriter {
    path: PathBuf,
    mode: WriteMode,
}

impl OutputWriter {
    pub fn new(path: impl Into<PathBuf>, mode: WriteMode) -> Self {
        Self {
            path: path.into(),
            mode,
        }
    }

    /// Open the destination and hand a writer to `render`.
    ///
    /// In [`WriteMode::Truncate`] a render failure leaves whatever was
    /// streamed so far in the destination. In [`WriteMode::Atomic`] the
    /// destination is only replaced once `render` and the flush succeed.
    pub fn write_with<F>(&self, render: F) -> RenderResult<()>
    where
        F: FnOnce(&mut dyn Write) -> RenderResult<()>,
    {
        match self.mode {
            WriteMode::Truncate => self.write_truncate(render),
            WriteMode::Atomic => self.write_atomic(render),
        }
    }

    fn write_truncate<F>(&self, render: F) -> RenderResult<()>
    where
        F: FnOnce(&mut dyn Write) -> RenderResult<()>,
    {
        let file = File::create(&self.path).map_err(|e| self.fs_error("create output file", e))?;
        let mut out = BufWriter::new(file);

        render(&mut out)?;

        out.flush()
            .map_err(|e| self.fs_error("write output file", e))
    }

    fn write_atomic<F>(&self, render: F) -> RenderResult<()>
    where
        F: FnOnce(&mut dyn Write) -> RenderResult<()>,
    {
        let mut temp = NamedTempFile::new_in(parent_dir(&self.path))
            .map_err(|e| self.fs_error("create output file", e))?;

        {
            let mut out = BufWriter::new(temp.as_file_mut());
            render(&mut out)?;
            out.flush()
                .map_err(|e| self.fs_error("write output file", e))?;
        }

        temp.persist(&self.path)
            .map_err(|e| self.fs_error("replace output file", e.error))?;

        Ok(())
    }

    fn fs_error(&self, action: &'static str, source: std::io::Error) -> RenderError {
        RenderError::FileSystem {
            action,
            path: self.path.clone(),
            source,
        }
    }
}

/// Directory the temporary file must live in so the final rename stays on one filesystem
fn parent_dir(path: &Path) -> &Path {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write_hello(out: &mut dyn Write) -> RenderResult<()> {
        out.write_all(b"hello").unwrap();
        Ok(())
    }

    fn fail_midway(out: &mut dyn Write) -> RenderResult<()> {
        out.write_all(b"partial").unwrap();
        Err(RenderError::TemplateRender {
            template: "t".to_string(),
            message: "boom".to_string(),
        })
    }

    #[test]
    fn test_truncate_creates_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("out.yaml");

        OutputWriter::new(&path, WriteMode::Truncate)
            .write_with(write_hello)
            .unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "hello");
    }

    #[test]
    fn test_truncate_replaces_existing_content() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("out.yaml");
        fs::write(&path, "old content that is longer").unwrap();

        OutputWriter::new(&path, WriteMode::Truncate)
            .write_with(write_hello)
            .unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "hello");
    }

    #[test]
    fn test_truncate_keeps_partial_output_on_failure() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("out.yaml");

        let err = OutputWriter::new(&path, WriteMode::Truncate)
            .write_with(fail_midway)
            .unwrap_err();

        assert!(matches!(err, RenderError::TemplateRender { .. }));
        assert!(path.exists());
    }

    #[test]
    fn test_missing_directory_is_file_system_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("no-such-dir").join("out.yaml");

        for mode in [WriteMode::Truncate, WriteMode::Atomic] {
            let mut called = false;
            let err = OutputWriter::new(&path, mode)
                .write_with(|out| {
                    called = true;
                    write_hello(out)
                })
                .unwrap_err();

            assert!(matches!(err, RenderError::FileSystem { .. }));
            assert!(!called);
            assert!(!path.exists());
        }
    }

    #[test]
    fn test_atomic_writes_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("out.yaml");

        OutputWriter::new(&path, WriteMode::Atomic)
            .write_with(write_hello)
            .unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "hello");
        assert_eq!(fs::read_dir(temp_dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_atomic_leaves_destination_untouched_on_failure() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("out.yaml");
        fs::write(&path, "previous").unwrap();

        OutputWriter::new(&path, WriteMode::Atomic)
            .write_with(fail_midway)
            .unwrap_err();

        assert_eq!(fs::read_to_string(&path).unwrap(), "previous");
        assert_eq!(fs::read_dir(temp_dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_parent_dir_of_bare_file_name() {
        assert_eq!(parent_dir(Path::new("out.yaml")), Path::new("."));
        assert_eq!(parent_dir(Path::new("conf/out.yaml")), Path::new("conf"));
    }
}
