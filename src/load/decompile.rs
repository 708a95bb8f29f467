use std::path::{Path, PathBuf};
use std::process::Command;

use crate::foundation::error::{PimgError, PimgResult};

/// Default location of the external decompiler, relative to the working directory.
pub const DEFAULT_DECOMPILER: &str = "psbdecompile/PsbDecompile.exe";

#[derive(Clone, Debug, PartialEq, Eq)]
/// The three artifacts a decompile produces for one input stem.
pub struct DecompiledPaths {
    /// `<stem>.json` layer manifest.
    pub manifest: PathBuf,
    /// `<stem>.resx.json` container metadata.
    pub resx: PathBuf,
    /// `<stem>/` directory holding `<layer_id>.png` tiles.
    pub tiles: PathBuf,
}

impl DecompiledPaths {
    /// Artifact paths for `stem` inside `dir`.
    pub fn beside(dir: &Path, stem: &str) -> Self {
        Self {
            manifest: dir.join(format!("{stem}.json")),
            resx: dir.join(format!("{stem}.resx.json")),
            tiles: dir.join(stem),
        }
    }

    /// Derive the sibling artifacts from a `<stem>.json` manifest path.
    pub fn from_manifest(manifest: &Path) -> PimgResult<Self> {
        let stem = file_stem(manifest)?;
        if stem.ends_with(".resx") {
            return Err(PimgError::validation(format!(
                "'{}' is resx metadata, not a layer manifest",
                manifest.display()
            )));
        }
        Ok(Self::beside(&parent_dir(manifest), stem))
    }

    /// All three artifacts, manifest first.
    pub fn all(&self) -> [&Path; 3] {
        [&self.manifest, &self.resx, &self.tiles]
    }
}

/// Driver for the external PSB decompiler executable.
///
/// The tool is invoked as `<exe> <input>` and writes its artifacts next to the input file.
#[derive(Clone, Debug)]
pub struct PsbDecompiler {
    exe: PathBuf,
}

impl Default for PsbDecompiler {
    fn default() -> Self {
        Self::new(DEFAULT_DECOMPILER)
    }
}

impl PsbDecompiler {
    /// Use the executable at `exe`.
    pub fn new(exe: impl Into<PathBuf>) -> Self {
        Self { exe: exe.into() }
    }

    /// Configured executable path.
    pub fn exe(&self) -> &Path {
        &self.exe
    }

    /// Whether the configured executable exists.
    pub fn is_available(&self) -> bool {
        self.exe.is_file()
    }

    /// Decompile `input`, returning the paths of the artifacts written beside it.
    #[tracing::instrument(skip(self), fields(exe = %self.exe.display()))]
    pub fn run(&self, input: &Path) -> PimgResult<DecompiledPaths> {
        if !self.is_available() {
            return Err(PimgError::decompile(format!(
                "decompiler not found at '{}'",
                self.exe.display()
            )));
        }
        if !input.is_file() {
            return Err(PimgError::decompile(format!(
                "input file '{}' does not exist",
                input.display()
            )));
        }

        let out = Command::new(&self.exe)
            .arg(input)
            .output()
            .map_err(|e| PimgError::decompile(format!("failed to run decompiler: {e}")))?;

        let stdout = String::from_utf8_lossy(&out.stdout);
        let stderr = String::from_utf8_lossy(&out.stderr);
        if !stdout.trim().is_empty() {
            tracing::debug!(stdout = %stdout.trim(), "decompiler output");
        }
        if !stderr.trim().is_empty() {
            tracing::warn!(stderr = %stderr.trim(), "decompiler diagnostics");
        }

        let paths = DecompiledPaths::beside(&parent_dir(input), file_stem(input)?);
        let missing: Vec<String> = paths
            .all()
            .into_iter()
            .filter(|p| !p.exists())
            .map(|p| p.display().to_string())
            .collect();
        if !missing.is_empty() {
            return Err(PimgError::decompile(format!(
                "decompiler exited with {} without producing {}: {}",
                out.status,
                missing.join(", "),
                stderr.trim()
            )));
        }
        if !out.status.success() {
            tracing::warn!(status = %out.status, "decompiler exited unsuccessfully but produced its outputs");
        }
        Ok(paths)
    }
}

fn file_stem(path: &Path) -> PimgResult<&str> {
    path.file_stem()
        .and_then(|s| s.to_str())
        .ok_or_else(|| PimgError::validation(format!("'{}' has no usable file stem", path.display())))
}

fn parent_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/load/decompile.rs"]
mod tests;
