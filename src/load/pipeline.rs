use std::path::{Path, PathBuf};

use anyhow::Context as _;

use crate::{
    engine::compose::{ComposeOptions, CompositionResult, compose_all},
    foundation::error::{PimgError, PimgResult},
    load::decompile::{DEFAULT_DECOMPILER, DecompiledPaths, PsbDecompiler},
    load::staging::StagingDir,
    manifest::model::{Manifest, ResxMetadata},
    manifest::tiles::DirTileStore,
};

#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
/// Options for loading a `.pimg` container or a decompiled manifest from disk.
pub struct LoadOptions {
    /// Classification and composition options.
    pub compose: ComposeOptions,
    /// Path of the external decompiler executable.
    pub decompiler: PathBuf,
    /// Root under which a dedicated `pimg-staging` directory receives decompiler outputs.
    /// `None` uses a fresh temporary directory.
    pub staging_root: Option<PathBuf>,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            compose: ComposeOptions::default(),
            decompiler: PathBuf::from(DEFAULT_DECOMPILER),
            staging_root: None,
        }
    }
}

impl LoadOptions {
    /// Read options from a JSON file. Missing keys take their defaults.
    pub fn from_path(path: &Path) -> PimgResult<Self> {
        let s = std::fs::read_to_string(path)
            .with_context(|| format!("read config '{}'", path.display()))?;
        serde_json::from_str(&s).map_err(|e| {
            PimgError::serde(format!("parse config '{}': {e}", path.display()))
        })
    }
}

/// Load already-decompiled artifacts: check the container type, parse the manifest, compose.
#[tracing::instrument(skip(opts), fields(manifest = %paths.manifest.display()))]
pub fn load_decompiled(
    paths: &DecompiledPaths,
    opts: &ComposeOptions,
) -> PimgResult<CompositionResult> {
    ResxMetadata::from_path(&paths.resx)?.ensure_pimg()?;
    let manifest = Manifest::from_path(&paths.manifest)?;
    tracing::debug!(
        width = manifest.width,
        height = manifest.height,
        layers = manifest.layers.len(),
        "manifest parsed"
    );
    let tiles = DirTileStore::new(&paths.tiles);
    compose_all(&manifest, &tiles, opts)
}

/// Decompile a `.pimg` file into a staging directory and load the result.
///
/// The staging directory is cleared before the decompile and again once loading finishes,
/// whether or not it succeeded.
#[tracing::instrument(skip(opts))]
pub fn load_pimg(input: &Path, opts: &LoadOptions) -> PimgResult<CompositionResult> {
    let staging = match &opts.staging_root {
        Some(root) => StagingDir::at(root)?,
        None => StagingDir::temporary()?,
    };
    let produced = PsbDecompiler::new(&opts.decompiler).run(input)?;
    let staged = DecompiledPaths {
        manifest: staging.stage(&produced.manifest)?,
        resx: staging.stage(&produced.resx)?,
        tiles: staging.stage(&produced.tiles)?,
    };
    load_decompiled(&staged, &opts.compose)
}

/// Load `input`, dispatching on its extension: `.json` is a decompiled manifest, anything
/// else is decompiled first.
pub fn load_path(input: &Path, opts: &LoadOptions) -> PimgResult<CompositionResult> {
    let is_manifest = input
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    if is_manifest {
        load_decompiled(&DecompiledPaths::from_manifest(input)?, &opts.compose)
    } else {
        load_pimg(input, opts)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/load/pipeline.rs"]
mod tests;
