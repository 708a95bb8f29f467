use std::collections::HashMap;

use crate::{
    foundation::error::{PimgError, PimgResult},
    foundation::names::{DisplayName, GroupKey},
    manifest::model::LayerRecord,
};

#[derive(Clone, Debug)]
/// Compose-mode view of a manifest layer with its validated name and group.
pub struct ComposeLayer<'m> {
    /// Case-folded display name.
    pub name: DisplayName,
    /// Group key (first character of `name`).
    pub group: GroupKey,
    /// Backing manifest record.
    pub record: &'m LayerRecord,
}

impl<'m> ComposeLayer<'m> {
    /// Validate `record.name` under the two-letter convention.
    pub fn new(record: &'m LayerRecord) -> PimgResult<Self> {
        let name = DisplayName::compose(record.id, &record.name)?;
        let group = name
            .group()
            .ok_or_else(|| PimgError::validation("compose-mode name without group key"))?;
        Ok(Self {
            name,
            group,
            record,
        })
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
/// Group key to base display name, remembering insertion order.
pub struct GroupBaseIndex {
    entries: Vec<(GroupKey, DisplayName)>,
}

impl GroupBaseIndex {
    /// Base recorded for `group`.
    pub fn get(&self, group: GroupKey) -> Option<&DisplayName> {
        self.entries
            .iter()
            .find(|(g, _)| *g == group)
            .map(|(_, name)| name)
    }

    /// Record `name` as the base of `group`.
    ///
    /// Fails with [`PimgError::DuplicateBase`] if the group already has one.
    pub fn insert(&mut self, group: GroupKey, name: DisplayName) -> PimgResult<()> {
        if let Some(existing) = self.get(group) {
            return Err(PimgError::DuplicateBase {
                group: group.as_char(),
                existing: existing.to_string(),
                candidate: name.to_string(),
            });
        }
        self.entries.push((group, name));
        Ok(())
    }

    /// The mapping inserted last.
    pub fn most_recent(&self) -> Option<(GroupKey, &DisplayName)> {
        self.entries.last().map(|(g, name)| (*g, name))
    }

    /// Whether `name` is a recorded base.
    pub fn contains_name(&self, name: &DisplayName) -> bool {
        self.entries.iter().any(|(_, n)| n == name)
    }

    /// Entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (GroupKey, &DisplayName)> {
        self.entries.iter().map(|(g, name)| (*g, name))
    }

    /// Number of groups with a base.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no base has been recorded.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Strategy choosing a base for a diff whose own group has none.
pub trait BaseFallback: Send + Sync {
    /// Short policy name used in logs.
    fn name(&self) -> &'static str;

    /// Pick a base for `layer` from the completed `index`, or `None` to refuse.
    fn fallback<'a>(
        &self,
        index: &'a GroupBaseIndex,
        layer: &DisplayName,
    ) -> Option<&'a DisplayName>;
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
/// Built-in fallback strategies.
pub enum FallbackPolicy {
    /// Use the base of whichever group was assigned a base most recently during discovery.
    ///
    /// Derived from sample data rather than a format guarantee.
    #[default]
    MostRecent,
    /// Never fall back; such diffs fail with [`PimgError::UnresolvedDiff`].
    Strict,
}

impl BaseFallback for FallbackPolicy {
    fn name(&self) -> &'static str {
        match self {
            Self::MostRecent => "most-recent",
            Self::Strict => "strict",
        }
    }

    fn fallback<'a>(
        &self,
        index: &'a GroupBaseIndex,
        _layer: &DisplayName,
    ) -> Option<&'a DisplayName> {
        match self {
            Self::MostRecent => index.most_recent().map(|(_, name)| name),
            Self::Strict => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
/// How a diff's target base was chosen.
pub enum TargetSource {
    /// The layer's explicit `diff_id`.
    Explicit,
    /// The base of the layer's own group.
    OwnGroup,
    /// The fallback strategy.
    Fallback,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
/// Classification of one layer.
pub enum LayerRole {
    /// Canvas-sized opaque layer, emitted verbatim.
    Base,
    /// Overlay composed onto the layer at position `base` of the sorted layer list.
    Diff {
        /// Position of the target base in the sorted layer list.
        base: usize,
        /// Which rule picked the target.
        source: TargetSource,
    },
}

#[derive(Clone, Debug)]
/// Output of both resolver passes.
pub struct LayerPlan {
    /// Group to base mapping from pass 1.
    pub bases: GroupBaseIndex,
    /// Role of each layer, parallel to the sorted layer list.
    pub roles: Vec<LayerRole>,
}

/// Pass 1: record every canvas-sized opaque layer as its group's base.
///
/// `layers` must be sorted by display name. `is_base` decides candidacy for one layer and is
/// called exactly once per layer, in order.
pub fn discover_bases(
    layers: &[ComposeLayer<'_>],
    mut is_base: impl FnMut(&ComposeLayer<'_>) -> PimgResult<bool>,
) -> PimgResult<(GroupBaseIndex, Vec<bool>)> {
    let mut index = GroupBaseIndex::default();
    let mut flags = Vec::with_capacity(layers.len());
    for layer in layers {
        let base = is_base(layer)?;
        if base {
            index.insert(layer.group, layer.name.clone())?;
        }
        tracing::debug!(layer = %layer.name, id = layer.record.id, base, "pass 1");
        flags.push(base);
    }
    Ok((index, flags))
}

/// Pass 2: resolve the target base of every non-base layer.
pub fn resolve_targets(
    layers: &[ComposeLayer<'_>],
    bases: &GroupBaseIndex,
    is_base: &[bool],
    fallback: &dyn BaseFallback,
) -> PimgResult<Vec<LayerRole>> {
    let by_id: HashMap<i64, usize> = layers
        .iter()
        .enumerate()
        .map(|(i, l)| (l.record.id, i))
        .collect();
    let by_name: HashMap<&DisplayName, usize> = layers
        .iter()
        .enumerate()
        .map(|(i, l)| (&l.name, i))
        .collect();

    let mut roles = Vec::with_capacity(layers.len());
    for (layer, &base) in layers.iter().zip(is_base) {
        if base {
            roles.push(LayerRole::Base);
            continue;
        }

        let (target, source) = if let Some(diff_id) = layer.record.diff_id {
            let dangling = || PimgError::DanglingDiffReference {
                layer: layer.name.to_string(),
                diff_id,
            };
            let pos = *by_id.get(&diff_id).ok_or_else(dangling)?;
            if !bases.contains_name(&layers[pos].name) {
                return Err(dangling());
            }
            (&layers[pos].name, TargetSource::Explicit)
        } else if let Some(name) = bases.get(layer.group) {
            (name, TargetSource::OwnGroup)
        } else {
            let name = fallback.fallback(bases, &layer.name).ok_or_else(|| {
                PimgError::UnresolvedDiff {
                    layer: layer.name.to_string(),
                    reason: format!(
                        "group '{}' has no base and fallback policy '{}' found none",
                        layer.group,
                        fallback.name()
                    ),
                }
            })?;
            tracing::warn!(
                layer = %layer.name,
                base = %name,
                policy = fallback.name(),
                "group has no base; using fallback"
            );
            (name, TargetSource::Fallback)
        };

        let pos = *by_name.get(target).ok_or_else(|| PimgError::UnresolvedDiff {
            layer: layer.name.to_string(),
            reason: format!("base '{target}' is not a manifest layer"),
        })?;
        tracing::debug!(layer = %layer.name, base = %target, ?source, "pass 2");
        roles.push(LayerRole::Diff { base: pos, source });
    }
    Ok(roles)
}

/// Run both passes over `layers` (sorted by display name).
pub fn resolve_layers(
    layers: &[ComposeLayer<'_>],
    is_base: impl FnMut(&ComposeLayer<'_>) -> PimgResult<bool>,
    fallback: &dyn BaseFallback,
) -> PimgResult<LayerPlan> {
    let (bases, flags) = discover_bases(layers, is_base)?;
    let roles = resolve_targets(layers, &bases, &flags, fallback)?;
    Ok(LayerPlan { bases, roles })
}

#[cfg(test)]
#[path = "../../tests/unit/engine/resolve.rs"]
mod tests;
