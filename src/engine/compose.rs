use std::{collections::HashMap, sync::Arc};

use rayon::prelude::*;

use crate::{
    codec::{DecodedImage, ImageCodec, png_codec::PngCodec},
    engine::classify::has_transparency,
    engine::composite,
    engine::resolve::{BaseFallback, ComposeLayer, FallbackPolicy, LayerRole, resolve_layers},
    foundation::error::{PimgError, PimgResult},
    foundation::names::DisplayName,
    manifest::model::{LayerRecord, Manifest},
    manifest::tiles::TileStore,
};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
/// Whether layers are classified and composed or exported as-is.
pub enum LoadMode {
    /// Classify bases and diffs and compose every diff onto its base.
    #[default]
    Compose,
    /// Return every tile verbatim under its original name.
    ///
    /// Two layers sharing a name fail with [`PimgError::DuplicateName`] rather than the later
    /// layer silently replacing the earlier one.
    Raw,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
/// Options controlling one [`compose_all`] run.
pub struct ComposeOptions {
    /// Compose or raw mode.
    pub mode: LoadMode,
    /// Strategy for diffs whose group has no base.
    pub fallback: FallbackPolicy,
    /// Compose diff layers on the rayon pool.
    pub parallel: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
/// One output image: encoded bytes plus its reported resolution.
pub struct ComposedImage {
    /// Display name.
    pub name: String,
    /// Encoded PNG bytes.
    pub bytes: Vec<u8>,
    /// Reported width in pixels.
    pub width: u32,
    /// Reported height in pixels.
    pub height: u32,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
/// Name-ordered output of one load.
pub struct CompositionResult {
    entries: Vec<ComposedImage>,
}

impl CompositionResult {
    /// Build a result from arbitrary entries, sorting by name. Names must be unique.
    pub fn from_entries(mut entries: Vec<ComposedImage>) -> PimgResult<Self> {
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        if let Some(w) = entries.windows(2).find(|w| w[0].name == w[1].name) {
            return Err(PimgError::validation(format!(
                "duplicate image name '{}'",
                w[0].name
            )));
        }
        Ok(Self { entries })
    }

    /// Lookup an image by display name.
    pub fn get(&self, name: &str) -> Option<&ComposedImage> {
        self.entries
            .binary_search_by(|e| e.name.as_str().cmp(name))
            .ok()
            .map(|i| &self.entries[i])
    }

    /// Images in ascending name order.
    pub fn iter(&self) -> impl Iterator<Item = &ComposedImage> {
        self.entries.iter()
    }

    /// Display names in ascending order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.name.as_str())
    }

    /// Number of images.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the result holds no images.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Consume into the ordered entries.
    pub fn into_entries(self) -> Vec<ComposedImage> {
        self.entries
    }
}

struct CachedTile {
    bytes: Vec<u8>,
    image: DecodedImage,
}

/// Stateless driver of classification and composition with a pluggable codec and fallback.
#[derive(Clone)]
pub struct Composer {
    codec: Arc<dyn ImageCodec>,
    fallback: Arc<dyn BaseFallback>,
    mode: LoadMode,
    parallel: bool,
}

impl std::fmt::Debug for Composer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Composer")
            .field("fallback", &self.fallback.name())
            .field("mode", &self.mode)
            .field("parallel", &self.parallel)
            .finish()
    }
}

impl Default for Composer {
    fn default() -> Self {
        Self::new(&ComposeOptions::default())
    }
}

impl Composer {
    /// Build a composer using [`PngCodec`] and the options' fallback policy.
    pub fn new(opts: &ComposeOptions) -> Self {
        Self {
            codec: Arc::new(PngCodec),
            fallback: Arc::new(opts.fallback),
            mode: opts.mode,
            parallel: opts.parallel,
        }
    }

    /// Replace the image codec.
    pub fn with_codec(mut self, codec: Arc<dyn ImageCodec>) -> Self {
        self.codec = codec;
        self
    }

    /// Replace the fallback strategy.
    pub fn with_fallback(mut self, fallback: Arc<dyn BaseFallback>) -> Self {
        self.fallback = fallback;
        self
    }

    /// Classify and compose every layer of `manifest`, or fail with the first fatal error.
    #[tracing::instrument(skip_all, fields(layers = manifest.layers.len(), mode = ?self.mode))]
    pub fn compose_all(
        &self,
        manifest: &Manifest,
        tiles: &dyn TileStore,
    ) -> PimgResult<CompositionResult> {
        ensure_unique_ids(manifest)?;
        let result = match self.mode {
            LoadMode::Raw => self.raw(manifest, tiles)?,
            LoadMode::Compose => self.compose(manifest, tiles)?,
        };
        tracing::info!(images = result.len(), "composition finished");
        Ok(result)
    }

    fn raw(&self, manifest: &Manifest, tiles: &dyn TileStore) -> PimgResult<CompositionResult> {
        let mut layers: Vec<(DisplayName, &LayerRecord)> = manifest
            .layers
            .iter()
            .map(|r| (DisplayName::raw(&r.name), r))
            .collect();
        layers.sort_by(|a, b| a.0.cmp(&b.0));
        ensure_unique_names(layers.iter().map(|(n, r)| (n, r.id)))?;

        let entries = layers
            .into_iter()
            .map(|(name, record)| {
                Ok(ComposedImage {
                    name: name.to_string(),
                    bytes: tiles.read(record.id)?,
                    width: record.width,
                    height: record.height,
                })
            })
            .collect::<PimgResult<Vec<_>>>()?;
        Ok(CompositionResult { entries })
    }

    fn compose(&self, manifest: &Manifest, tiles: &dyn TileStore) -> PimgResult<CompositionResult> {
        let mut layers = manifest
            .layers
            .iter()
            .map(ComposeLayer::new)
            .collect::<PimgResult<Vec<_>>>()?;
        layers.sort_by(|a, b| a.name.cmp(&b.name));
        ensure_unique_names(layers.iter().map(|l| (&l.name, l.record.id)))?;

        let (width, height) = (manifest.width, manifest.height);
        let mut cache: HashMap<i64, CachedTile> = HashMap::new();
        let plan = resolve_layers(
            &layers,
            |layer| {
                if !layer.record.fills(width, height) {
                    return Ok(false);
                }
                let tile = self.load_tile(tiles, layer.record.id)?;
                let opaque = !has_transparency(&tile.image);
                cache.insert(layer.record.id, tile);
                Ok(opaque)
            },
            self.fallback.as_ref(),
        )?;
        tracing::debug!(bases = plan.bases.len(), "bases discovered");

        let cache = &cache;
        let layers = &layers;
        let render = |i: usize| -> PimgResult<Vec<u8>> {
            let layer = &layers[i];
            let id = layer.record.id;
            match plan.roles[i] {
                LayerRole::Base => cached(cache, id).map(|t| t.bytes.clone()),
                LayerRole::Diff { base, .. } => {
                    let base = &cached(cache, layers[base].record.id)?.image;
                    let loaded;
                    let diff = match cache.get(&id) {
                        Some(t) => &t.image,
                        None => {
                            loaded = self.decode(id, &tiles.read(id)?)?;
                            &loaded
                        }
                    };
                    composite::compose(
                        self.codec.as_ref(),
                        &base.pixels,
                        &diff.pixels,
                        layer.record.left,
                        layer.record.top,
                    )
                    .map_err(|e| PimgError::decode_failure(id, format!("{e:#}")))
                }
            }
        };

        // Indexed collect keeps name order, so the first error below is the first failing layer.
        let rendered: Vec<PimgResult<Vec<u8>>> = if self.parallel {
            (0..layers.len()).into_par_iter().map(render).collect()
        } else {
            (0..layers.len()).map(render).collect()
        };

        let entries = layers
            .iter()
            .zip(rendered)
            .map(|(layer, bytes)| {
                Ok(ComposedImage {
                    name: layer.name.to_string(),
                    bytes: bytes?,
                    width,
                    height,
                })
            })
            .collect::<PimgResult<Vec<_>>>()?;
        Ok(CompositionResult { entries })
    }

    fn load_tile(&self, tiles: &dyn TileStore, id: i64) -> PimgResult<CachedTile> {
        let bytes = tiles.read(id)?;
        let image = self.decode(id, &bytes)?;
        Ok(CachedTile { bytes, image })
    }

    fn decode(&self, id: i64, bytes: &[u8]) -> PimgResult<DecodedImage> {
        self.codec
            .decode(bytes)
            .map_err(|e| PimgError::decode_failure(id, format!("{e:#}")))
    }
}

fn cached(cache: &HashMap<i64, CachedTile>, id: i64) -> PimgResult<&CachedTile> {
    cache
        .get(&id)
        .ok_or_else(|| PimgError::validation(format!("base layer {id} was not decoded")))
}

fn ensure_unique_ids(manifest: &Manifest) -> PimgResult<()> {
    let mut seen = std::collections::HashSet::new();
    for layer in &manifest.layers {
        if !seen.insert(layer.id) {
            return Err(PimgError::validation(format!(
                "duplicate layer id {}",
                layer.id
            )));
        }
    }
    Ok(())
}

// Expects names in sorted order so duplicates are adjacent.
fn ensure_unique_names<'a>(
    sorted: impl Iterator<Item = (&'a DisplayName, i64)>,
) -> PimgResult<()> {
    let mut prev: Option<(&DisplayName, i64)> = None;
    for (name, id) in sorted {
        if let Some((prev_name, prev_id)) = prev
            && prev_name == name
        {
            return Err(PimgError::DuplicateName {
                name: name.to_string(),
                first_id: prev_id,
                second_id: id,
            });
        }
        prev = Some((name, id));
    }
    Ok(())
}

/// Classify and compose `manifest` with a default [`Composer`] built from `opts`.
pub fn compose_all(
    manifest: &Manifest,
    tiles: &dyn TileStore,
    opts: &ComposeOptions,
) -> PimgResult<CompositionResult> {
    Composer::new(opts).compose_all(manifest, tiles)
}

#[cfg(test)]
#[path = "../../tests/unit/engine/compose.rs"]
mod tests;
