use std::path::Path;

use anyhow::Context;

use crate::foundation::error::{PimgError, PimgResult};

/// Container-type tag the resx metadata must carry for a PIMG file.
pub const PIMG_CONTAINER_TYPE: &str = "Pimg";

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
/// One layer entry of a decompiled PIMG manifest.
pub struct LayerRecord {
    /// Unique layer id; names the tile file and is the target of `diff_id`.
    #[serde(rename = "layer_id", alias = "layerId")]
    pub id: i64,
    /// Decompiler layer type, carried but unused.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layer_type: Option<i64>,
    /// Explicit base layer id for a diff layer.
    #[serde(
        default,
        rename = "diff_id",
        alias = "diffId",
        skip_serializing_if = "Option::is_none"
    )]
    pub diff_id: Option<i64>,
    /// Layer name as written by the decompiler.
    pub name: String,
    /// Decompiler type tag, carried but unused.
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<i64>,
    /// Tile width in pixels.
    pub width: u32,
    /// Tile height in pixels.
    pub height: u32,
    /// Horizontal anchor offset in canvas pixels.
    pub left: i64,
    /// Vertical anchor offset in canvas pixels.
    pub top: i64,
    /// Layer opacity; not applied during composition.
    #[serde(default = "default_opacity")]
    pub opacity: i64,
    /// Layer visibility flag; not applied during composition.
    #[serde(default = "default_visible")]
    pub visible: i64,
}

fn default_opacity() -> i64 {
    255
}

fn default_visible() -> i64 {
    1
}

impl LayerRecord {
    /// Whether the tile covers exactly `width` x `height`.
    pub fn fills(&self, width: u32, height: u32) -> bool {
        self.width == width && self.height == height
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
/// Top-level decompiled manifest: canvas size plus ordered layers.
pub struct Manifest {
    /// Canvas width in pixels.
    pub width: u32,
    /// Canvas height in pixels.
    pub height: u32,
    /// Layers in manifest order.
    pub layers: Vec<LayerRecord>,
}

impl Manifest {
    /// Parse a manifest from JSON text.
    pub fn from_json_str(s: &str) -> PimgResult<Self> {
        serde_json::from_str(s).map_err(|e| PimgError::serde(format!("parse manifest: {e}")))
    }

    /// Read and parse a manifest JSON file.
    pub fn from_path(path: &Path) -> PimgResult<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read manifest '{}'", path.display()))?;
        Self::from_json_str(&text)
    }

    /// Lookup a layer by id.
    pub fn layer(&self, id: i64) -> Option<&LayerRecord> {
        self.layers.iter().find(|l| l.id == id)
    }
}

#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
/// Sibling resx metadata document emitted next to the manifest.
pub struct ResxMetadata {
    /// Container-type tag; must equal [`PIMG_CONTAINER_TYPE`].
    #[serde(rename = "PsbType", default, skip_serializing_if = "Option::is_none")]
    pub psb_type: Option<String>,
}

impl ResxMetadata {
    /// Parse resx metadata from JSON text. Unknown fields are ignored.
    pub fn from_json_str(s: &str) -> PimgResult<Self> {
        serde_json::from_str(s).map_err(|e| PimgError::serde(format!("parse resx metadata: {e}")))
    }

    /// Read and parse a resx metadata JSON file.
    pub fn from_path(path: &Path) -> PimgResult<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read resx metadata '{}'", path.display()))?;
        Self::from_json_str(&text)
    }

    /// Fail with [`PimgError::InvalidContainer`] unless this is PIMG metadata.
    pub fn ensure_pimg(&self) -> PimgResult<()> {
        match self.psb_type.as_deref() {
            Some(PIMG_CONTAINER_TYPE) => Ok(()),
            Some(other) => Err(PimgError::invalid_container(format!(
                "expected PsbType '{PIMG_CONTAINER_TYPE}', found '{other}'"
            ))),
            None => Err(PimgError::invalid_container(
                "resx metadata has no PsbType field",
            )),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/manifest/model.rs"]
mod tests;
