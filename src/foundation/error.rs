/// Convenience result type used across the crate.
pub type PimgResult<T> = Result<T, PimgError>;

/// Top-level error taxonomy for loading and composing a PIMG manifest.
///
/// Every variant is terminal for the load that produced it: the engine never returns a partial
/// [`crate::CompositionResult`].
#[derive(thiserror::Error, Debug)]
pub enum PimgError {
    /// The resx metadata does not declare the expected container type.
    #[error("invalid container: {0}")]
    InvalidContainer(String),

    /// A layer name violates the two-letter alphabetic convention required in compose mode.
    #[error("malformed layer name '{name}' (layer {layer_id}): {reason}")]
    MalformedName {
        /// Offending layer id.
        layer_id: i64,
        /// Name as it appears in the manifest.
        name: String,
        /// What is wrong with it.
        reason: String,
    },

    /// Two layers share a display name.
    #[error("duplicate layer name '{name}' (layers {first_id} and {second_id})")]
    DuplicateName {
        /// Display name shared by both layers.
        name: String,
        /// Id of the first layer seen with this name.
        first_id: i64,
        /// Id of the second layer seen with this name.
        second_id: i64,
    },

    /// A group has two canvas-sized opaque layers.
    #[error("duplicate base in group '{group}': '{existing}' and '{candidate}'")]
    DuplicateBase {
        /// Group key.
        group: char,
        /// Base already recorded for the group.
        existing: String,
        /// Second candidate that triggered the failure.
        candidate: String,
    },

    /// A `diff_id` does not resolve to a recognized base layer.
    #[error("layer '{layer}' references diff id {diff_id}, which is not a base layer")]
    DanglingDiffReference {
        /// Diff layer display name.
        layer: String,
        /// Referenced layer id.
        diff_id: i64,
    },

    /// A diff layer has no base to be pasted onto.
    #[error("layer '{layer}' has no base to compose onto: {reason}")]
    UnresolvedDiff {
        /// Diff layer display name.
        layer: String,
        /// Why resolution failed.
        reason: String,
    },

    /// The tile store has no tile for a referenced layer id.
    #[error("missing tile for layer {layer_id}")]
    MissingTile {
        /// Layer id with no backing tile.
        layer_id: i64,
    },

    /// Tile bytes could not be decoded or a composite could not be encoded.
    #[error("image codec failure for layer {layer_id}: {reason}")]
    DecodeFailure {
        /// Layer id whose bytes failed.
        layer_id: i64,
        /// Codec message.
        reason: String,
    },

    /// The external decompiler could not be run or did not produce its outputs.
    #[error("decompile error: {0}")]
    Decompile(String),

    /// Invalid caller-provided data or options.
    #[error("validation error: {0}")]
    Validation(String),

    /// Errors when serializing or deserializing manifest documents.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl PimgError {
    /// Build a [`PimgError::InvalidContainer`] value.
    pub fn invalid_container(msg: impl Into<String>) -> Self {
        Self::InvalidContainer(msg.into())
    }

    /// Build a [`PimgError::Decompile`] value.
    pub fn decompile(msg: impl Into<String>) -> Self {
        Self::Decompile(msg.into())
    }

    /// Build a [`PimgError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`PimgError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }

    /// Build a [`PimgError::DecodeFailure`] value.
    pub fn decode_failure(layer_id: i64, reason: impl Into<String>) -> Self {
        Self::DecodeFailure {
            layer_id,
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
