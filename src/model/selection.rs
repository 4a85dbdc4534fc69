//! Selection sets, snapshots, and persisted selection records.

use std::collections::HashSet;
use std::fmt;

use chrono::{DateTime, Utc};
use image::Rgba;
use serde::{Deserialize, Deserializer, Serialize};

use super::pixel::{PixelColor, PixelKey, WorldPixel};

/// Working set of pixels chosen during one selection session.
///
/// Membership is a hash lookup, and inserting a pixel that is already present
/// leaves the set unchanged.
#[derive(Debug, Clone, Default)]
pub struct SelectionSet {
    pixels: HashSet<WorldPixel>,
}

impl SelectionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a pixel. Returns `true` if it was not selected before.
    pub fn insert(&mut self, pixel: WorldPixel) -> bool {
        self.pixels.insert(pixel)
    }

    pub fn contains(&self, pixel: WorldPixel) -> bool {
        self.pixels.contains(&pixel)
    }

    pub fn len(&self) -> usize {
        self.pixels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pixels.is_empty()
    }

    pub fn clear(&mut self) {
        self.pixels.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = WorldPixel> + '_ {
        self.pixels.iter().copied()
    }

    /// Canonical keys of all selected pixels.
    pub fn keys(&self) -> impl Iterator<Item = PixelKey> + '_ {
        self.pixels.iter().map(WorldPixel::key)
    }

    /// Inclusive bounding box, or `None` for an empty set.
    pub fn bounds(&self) -> Option<Bounds> {
        Bounds::enclosing(self.iter())
    }
}

/// Inclusive bounding box over a set of pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bounds {
    pub min_x: i32,
    pub max_x: i32,
    pub min_y: i32,
    pub max_y: i32,
}

impl Bounds {
    /// Coordinate-wise min/max over the given pixels.
    pub fn enclosing(pixels: impl IntoIterator<Item = WorldPixel>) -> Option<Self> {
        pixels.into_iter().fold(None, |acc, p| {
            Some(match acc {
                None => Bounds {
                    min_x: p.x,
                    max_x: p.x,
                    min_y: p.y,
                    max_y: p.y,
                },
                Some(b) => Bounds {
                    min_x: b.min_x.min(p.x),
                    max_x: b.max_x.max(p.x),
                    min_y: b.min_y.min(p.y),
                    max_y: b.max_y.max(p.y),
                },
            })
        })
    }

    pub fn width(&self) -> u32 {
        self.max_x.abs_diff(self.min_x) + 1
    }

    pub fn height(&self) -> u32 {
        self.max_y.abs_diff(self.min_y) + 1
    }
}

/// One pixel of a selection snapshot with its sampled colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectedPixel {
    pub x: i32,
    pub y: i32,
    pub color: PixelColor,
}

impl SelectedPixel {
    pub fn pixel(&self) -> WorldPixel {
        WorldPixel::new(self.x, self.y)
    }
}

/// Immutable snapshot of a selection, taken when the user commits it.
///
/// The backend keeps the timestamp as an arbitrary string, so a stored record
/// whose timestamp is missing or not RFC 3339 decodes with `timestamp: None`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingSelection {
    #[serde(
        default,
        deserialize_with = "lenient_timestamp",
        skip_serializing_if = "Option::is_none"
    )]
    pub timestamp: Option<DateTime<Utc>>,
    pub bounds: Bounds,
    pub pixels: Vec<SelectedPixel>,
}

impl PendingSelection {
    /// Snapshot a selection set, sampling each pixel's colour once.
    ///
    /// Returns `None` for an empty set. Pixels are ordered by row, then column.
    pub fn capture(
        set: &SelectionSet,
        timestamp: DateTime<Utc>,
        mut sample: impl FnMut(WorldPixel) -> Rgba<u8>,
    ) -> Option<Self> {
        let bounds = set.bounds()?;

        let mut ordered: Vec<WorldPixel> = set.iter().collect();
        ordered.sort_by_key(|p| (p.y, p.x));

        let pixels = ordered
            .into_iter()
            .map(|p| SelectedPixel {
                x: p.x,
                y: p.y,
                color: PixelColor::from_sample(sample(p)),
            })
            .collect();

        Some(Self {
            timestamp: Some(timestamp),
            bounds,
            pixels,
        })
    }

    pub fn len(&self) -> usize {
        self.pixels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pixels.is_empty()
    }

    /// Attach a name and description, producing the record sent to the backend.
    pub fn into_record(self, name: String, description: String) -> SelectionRecord {
        SelectionRecord {
            selection: self,
            name,
            description,
        }
    }
}

fn lenient_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.and_then(|raw| match DateTime::parse_from_rfc3339(&raw) {
        Ok(parsed) => Some(parsed.with_timezone(&Utc)),
        Err(e) => {
            log::warn!("Ignoring unreadable selection timestamp {:?}: {}", raw, e);
            None
        }
    }))
}

/// Create-request body: a snapshot plus its user-supplied name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectionRecord {
    #[serde(flatten)]
    pub selection: PendingSelection,
    pub name: String,
    pub description: String,
}

/// Opaque, server-assigned selection identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SelectionId(pub String);

impl SelectionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SelectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A selection as persisted by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredSelection {
    pub id: SelectionId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(flatten)]
    pub selection: PendingSelection,
}

impl StoredSelection {
    pub fn bounds(&self) -> Bounds {
        self.selection.bounds
    }

    pub fn pixels(&self) -> &[SelectedPixel] {
        &self.selection.pixels
    }
}

/// Response body of a successful create.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedSelection {
    pub id: SelectionId,
}
