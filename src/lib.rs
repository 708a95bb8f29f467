//! Layer classification and composition for PIMG sprite-diff containers.
//!
//! A PIMG container stores a character sprite as a few full-canvas base layers plus many small
//! diff patches (expressions, poses) that are pasted onto a base. This crate turns a decompiled
//! container into one complete image per layer:
//!
//! - Parse the [`Manifest`] and check the [`ResxMetadata`] container type
//! - Classify canvas-sized opaque layers as bases, everything else as diffs
//! - Resolve each diff to a base (explicit `diff_id`, own group, then [`FallbackPolicy`])
//! - Paste each diff onto its base with clipping and alpha blending
//!
//! [`load_path`] drives the whole pipeline from disk, including the external decompiler for
//! `.pimg` inputs. [`compose_all`] runs composition over any [`TileStore`].
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod codec;
mod engine;
mod export;
mod foundation;
mod load;
mod manifest;

pub use crate::foundation::error::{PimgError, PimgResult};
pub use crate::foundation::names::{DisplayName, GroupKey};

pub use crate::codec::png_codec::PngCodec;
pub use crate::codec::{AlphaSource, DecodedImage, ImageCodec, PixelBuffer, Rgba8};
pub use crate::manifest::model::{LayerRecord, Manifest, PIMG_CONTAINER_TYPE, ResxMetadata};
pub use crate::manifest::tiles::{DirTileStore, MemoryTileStore, TileStore};

pub use crate::engine::classify::has_transparency;
pub use crate::engine::compose::{
    ComposeOptions, ComposedImage, Composer, CompositionResult, LoadMode, compose_all,
};
pub use crate::engine::composite::{
    PasteRect, blend_pixel, clip_paste, compose as compose_diff, paste_with_clip,
};
pub use crate::engine::resolve::{
    BaseFallback, ComposeLayer, FallbackPolicy, GroupBaseIndex, LayerPlan, LayerRole,
    TargetSource, discover_bases, resolve_layers, resolve_targets,
};

pub use crate::export::{
    ensure_parent_dir, export_all, export_file_name, export_image, export_one,
};
pub use crate::load::decompile::{DEFAULT_DECOMPILER, DecompiledPaths, PsbDecompiler};
pub use crate::load::pipeline::{LoadOptions, load_decompiled, load_path, load_pimg};
pub use crate::load::staging::{STAGING_SUBDIR, StagingDir};
