//! World pixel coordinates and sampled colours.

use std::fmt;
use std::str::FromStr;

use image::{Rgb, Rgba};
use serde::{Deserialize, Serialize};

/// Integer grid coordinate on the shared canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WorldPixel {
    pub x: i32,
    pub y: i32,
}

impl WorldPixel {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Canonical `"x,y"` key for this pixel.
    pub fn key(&self) -> PixelKey {
        PixelKey(*self)
    }
}

impl From<(i32, i32)> for WorldPixel {
    fn from((x, y): (i32, i32)) -> Self {
        Self::new(x, y)
    }
}

/// Deterministic string form of a [`WorldPixel`]: `"x,y"`.
///
/// Two pixels have the same key exactly when they are equal, so keys are safe
/// to use for deduplication regardless of how the pixel was resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PixelKey(WorldPixel);

impl PixelKey {
    pub fn pixel(&self) -> WorldPixel {
        self.0
    }
}

impl fmt::Display for PixelKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.0.x, self.0.y)
    }
}

/// Error returned when a pixel key string is malformed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid pixel key: {0:?}")]
pub struct PixelKeyError(pub String);

impl FromStr for PixelKey {
    type Err = PixelKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (x, y) = s
            .split_once(',')
            .ok_or_else(|| PixelKeyError(s.to_string()))?;
        let x = x.trim().parse().map_err(|_| PixelKeyError(s.to_string()))?;
        let y = y.trim().parse().map_err(|_| PixelKeyError(s.to_string()))?;
        Ok(PixelKey(WorldPixel::new(x, y)))
    }
}

/// RGBA colour as stored in a selection record (`{"R":..,"G":..,"B":..,"A":..}`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PixelColor {
    #[serde(rename = "R")]
    pub r: u8,
    #[serde(rename = "G")]
    pub g: u8,
    #[serde(rename = "B")]
    pub b: u8,
    #[serde(rename = "A")]
    pub a: u8,
}

impl PixelColor {
    pub fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Opaque colour from RGB components.
    pub fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 255)
    }

    /// Convert a colour sampled from the viewport.
    ///
    /// The shared canvas has no transparency: a zero alpha is recorded as opaque.
    pub fn from_sample(sample: Rgba<u8>) -> Self {
        let [r, g, b, a] = sample.0;
        Self::new(r, g, b, if a == 0 { 255 } else { a })
    }

    pub fn to_rgb(&self) -> Rgb<u8> {
        Rgb([self.r, self.g, self.b])
    }
}
