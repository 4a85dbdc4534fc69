//! Place Atlas - pixel selection layer for a collaborative pixel canvas
//!
//! Lets a user select, name, persist, preview and delete multi-pixel regions
//! ("atlas" entries) of a pan/zoom pixel grid backed by a remote selection
//! store. The viewport engine and live pixel channel stay outside the crate,
//! behind the [`viewport::Viewport`] and [`viewport::Place`] traits.

pub mod app;
pub mod canvas;
pub mod color;
pub mod config;
pub mod constants;
pub mod coords;
pub mod driver;
pub mod dropdown;
pub mod keybindings;
pub mod message;
pub mod model;
pub mod naming;
pub mod overlay;
pub mod persistence;
pub mod selection;
pub mod viewport;
pub mod zoom_math;

#[cfg(test)]
mod testing;
#[cfg(test)]
mod tests;

pub use app::AtlasApp;
pub use driver::AtlasDriver;
