//! Data models for the place atlas client.

mod pixel;
mod selection;

pub use pixel::{PixelColor, PixelKey, PixelKeyError, WorldPixel};
pub use selection::{
    Bounds, CreatedSelection, PendingSelection, SelectedPixel, SelectionId, SelectionRecord,
    SelectionSet, StoredSelection,
};
