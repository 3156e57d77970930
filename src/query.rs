//! Helpers for feature hit testing against rendered tiles.
//!
//! Query geometry arrives in screen space; layers drawn with a
//! `*-translate` paint property are offset, so the query is shifted the
//! opposite way before it is tested against tile geometry.

use std::borrow::Cow;

use glam::Vec2;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

/// Frame of reference for a translate offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TranslateAnchor {
    /// Offset is relative to the map; it rotates with the map.
    #[default]
    Map,
    /// Offset is relative to the viewport; it stays screen-aligned.
    Viewport,
}

/// Shift every point of `rings` by `-offset`.
///
/// With [`TranslateAnchor::Viewport`] the offset is first rotated by
/// `-bearing` (radians). The offset is scaled by `pixels_to_tile_units`
/// once before it is applied. A zero offset borrows `rings` unchanged.
#[must_use]
pub fn translate<'a>(
    rings: &'a [Vec<Vec2>],
    offset: Vec2,
    anchor: TranslateAnchor,
    bearing: f32,
    pixels_to_tile_units: f32,
) -> Cow<'a, [Vec<Vec2>]> {
    if offset == Vec2::ZERO {
        return Cow::Borrowed(rings);
    }
    let oriented = match anchor {
        TranslateAnchor::Viewport => Vec2::from_angle(-bearing).rotate(offset),
        TranslateAnchor::Map => offset,
    };
    let shift = oriented * pixels_to_tile_units;
    Cow::Owned(
        rings
            .iter()
            .map(|ring| ring.iter().map(|&p| p - shift).collect())
            .collect(),
    )
}

/// Length of a translate offset.
#[must_use]
pub fn translate_distance(offset: Vec2) -> f32 {
    offset.length()
}

/// A layer's evaluated value for one paint property.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PaintValue {
    /// The same value for every feature.
    Constant(f32),
    /// Evaluated per feature; only its bucket statistics are known here.
    DataDriven,
}

/// Read access to a style layer's paint properties.
pub trait PaintLayer {
    /// Layer id, used to key per-bucket statistics.
    fn id(&self) -> &str;
    /// The evaluated value of `property`, or `None` if the layer has no
    /// such property.
    fn paint_value(&self, property: &str) -> Option<PaintValue>;
}

/// Per-bucket maxima of data-driven paint properties, keyed by layer id and
/// property name.
#[derive(Debug, Clone, Default)]
pub struct PaintPropertyStatistics {
    max: FxHashMap<String, FxHashMap<String, f32>>,
}

impl PaintPropertyStatistics {
    /// Empty statistics.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold `value` into the running maximum for `(layer_id, property)`.
    pub fn record(&mut self, layer_id: &str, property: &str, value: f32) {
        let max = self
            .max
            .entry(layer_id.to_owned())
            .or_default()
            .entry(property.to_owned())
            .or_insert(value);
        *max = max.max(value);
    }

    /// Maximum recorded for `(layer_id, property)`.
    #[must_use]
    pub fn max(&self, layer_id: &str, property: &str) -> Option<f32> {
        self.max.get(layer_id)?.get(property).copied()
    }
}

/// Upper bound of `property` across the features of one bucket: the
/// constant value if the property is feature-constant, otherwise the
/// bucket's recorded maximum.
#[must_use]
pub fn maximum_paint_value(
    property: &str,
    layer: &impl PaintLayer,
    statistics: &PaintPropertyStatistics,
) -> Option<f32> {
    match layer.paint_value(property)? {
        PaintValue::Constant(value) => Some(value),
        PaintValue::DataDriven => statistics.max(layer.id(), property),
    }
}
