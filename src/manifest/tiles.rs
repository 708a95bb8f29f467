use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
};

use anyhow::Context;

use crate::foundation::error::{PimgError, PimgResult};

/// Source of per-layer encoded tile bytes, addressed by layer id.
pub trait TileStore: Sync {
    /// Read the encoded bytes of the tile for `layer_id`.
    ///
    /// Returns [`PimgError::MissingTile`] when no tile exists for the id.
    fn read(&self, layer_id: i64) -> PimgResult<Vec<u8>>;
}

#[derive(Clone, Debug)]
/// Tile store over a decompiler output directory holding `<layer_id>.png` files.
pub struct DirTileStore {
    root: PathBuf,
}

impl DirTileStore {
    /// Create a store reading tiles from `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Directory tiles are read from.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the tile file for `layer_id`.
    pub fn tile_path(&self, layer_id: i64) -> PathBuf {
        self.root.join(format!("{layer_id}.png"))
    }
}

impl TileStore for DirTileStore {
    fn read(&self, layer_id: i64) -> PimgResult<Vec<u8>> {
        let path = self.tile_path(layer_id);
        if !path.is_file() {
            return Err(PimgError::MissingTile { layer_id });
        }
        std::fs::read(&path)
            .with_context(|| format!("read tile bytes from '{}'", path.display()))
            .map_err(PimgError::from)
    }
}

#[derive(Clone, Debug, Default)]
/// In-memory tile store, mainly for tests and embedding.
pub struct MemoryTileStore {
    tiles: BTreeMap<i64, Vec<u8>>,
}

impl MemoryTileStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the tile for `layer_id`.
    pub fn insert(&mut self, layer_id: i64, bytes: Vec<u8>) {
        self.tiles.insert(layer_id, bytes);
    }

    /// Builder-style [`MemoryTileStore::insert`].
    pub fn with(mut self, layer_id: i64, bytes: Vec<u8>) -> Self {
        self.insert(layer_id, bytes);
        self
    }
}

impl TileStore for MemoryTileStore {
    fn read(&self, layer_id: i64) -> PimgResult<Vec<u8>> {
        self.tiles
            .get(&layer_id)
            .cloned()
            .ok_or(PimgError::MissingTile { layer_id })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/manifest/tiles.rs"]
mod tests;
