//! Terrain viewport viewer
//!
//! Renders a toroidal terrain world fetched from a simulation backend:
//! colour layers, overlays, a cached minimap and a single-flight viewport fetch.

pub mod cell;
pub mod color;
pub mod compositor;
pub mod config;
pub mod error;
pub mod font;
pub mod geometry;
pub mod layers;
pub mod minimap;
pub mod overlays;
pub mod session;
pub mod settings;
pub mod source;
pub mod surface;
pub mod tilemap;
pub mod viewer;
pub mod viewport;
