use std::path::{Path, PathBuf};

use anyhow::Context as _;

use crate::foundation::error::{PimgError, PimgResult};

/// Name of the subdirectory [`StagingDir::at`] owns under its root.
pub const STAGING_SUBDIR: &str = "pimg-staging";

/// Scratch directory holding decompiler outputs for the current load.
///
/// Only a dedicated [`STAGING_SUBDIR`] under the chosen root is ever cleared: it is emptied
/// when the handle is created and removed when the handle is dropped. Other entries of the
/// root are never touched. A temporary directory created by [`StagingDir::temporary`] is
/// removed entirely on drop.
#[derive(Debug)]
pub struct StagingDir {
    root: PathBuf,
    temp: Option<tempfile::TempDir>,
}

impl StagingDir {
    /// Stage under `root/`[`STAGING_SUBDIR`], creating it if needed and clearing its contents.
    pub fn at(root: impl AsRef<Path>) -> PimgResult<Self> {
        let root = root.as_ref().join(STAGING_SUBDIR);
        std::fs::create_dir_all(&root)
            .with_context(|| format!("create staging directory '{}'", root.display()))?;
        let out = Self { root, temp: None };
        out.clear()?;
        Ok(out)
    }

    /// Create a fresh temporary staging directory.
    pub fn temporary() -> PimgResult<Self> {
        let temp = tempfile::Builder::new()
            .prefix("pimg-")
            .tempdir()
            .context("create temporary staging directory")?;
        Ok(Self {
            root: temp.path().to_path_buf(),
            temp: Some(temp),
        })
    }

    /// Staging directory path.
    pub fn path(&self) -> &Path {
        &self.root
    }

    /// Remove every file, symlink, and subdirectory inside the staging directory.
    pub fn clear(&self) -> PimgResult<()> {
        let entries = std::fs::read_dir(&self.root)
            .with_context(|| format!("list staging directory '{}'", self.root.display()))?;
        for entry in entries {
            let path = entry.context("read staging entry")?.path();
            let file_type = std::fs::symlink_metadata(&path)
                .with_context(|| format!("stat '{}'", path.display()))?
                .file_type();
            if file_type.is_dir() {
                std::fs::remove_dir_all(&path)
            } else {
                std::fs::remove_file(&path)
            }
            .with_context(|| format!("remove '{}'", path.display()))?;
        }
        Ok(())
    }

    /// Move `src` (file or directory) into the staging directory, keeping its file name.
    pub fn stage(&self, src: &Path) -> PimgResult<PathBuf> {
        let name = src.file_name().ok_or_else(|| {
            PimgError::validation(format!("cannot stage '{}': no file name", src.display()))
        })?;
        let dest = self.root.join(name);
        if std::fs::rename(src, &dest).is_err() {
            // Rename fails across filesystems; fall back to copy + remove.
            copy_recursive(src, &dest)?;
            if src.is_dir() {
                std::fs::remove_dir_all(src)
            } else {
                std::fs::remove_file(src)
            }
            .with_context(|| format!("remove '{}' after staging", src.display()))?;
        }
        tracing::debug!(from = %src.display(), to = %dest.display(), "staged");
        Ok(dest)
    }
}

impl Drop for StagingDir {
    fn drop(&mut self) {
        if self.temp.is_some() {
            return;
        }
        if let Err(e) = std::fs::remove_dir_all(&self.root) {
            tracing::warn!(dir = %self.root.display(), error = %e, "failed to remove staging directory");
        }
    }
}

fn copy_recursive(src: &Path, dest: &Path) -> PimgResult<()> {
    if src.is_dir() {
        std::fs::create_dir_all(dest)
            .with_context(|| format!("create '{}'", dest.display()))?;
        let entries =
            std::fs::read_dir(src).with_context(|| format!("list '{}'", src.display()))?;
        for entry in entries {
            let entry = entry.context("read directory entry")?;
            copy_recursive(&entry.path(), &dest.join(entry.file_name()))?;
        }
    } else {
        std::fs::copy(src, dest)
            .with_context(|| format!("copy '{}' to '{}'", src.display(), dest.display()))?;
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/load/staging.rs"]
mod tests;
