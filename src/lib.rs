//! Choropleth styling for a world map of per-country ecological statistics.
//!
//! Metric records are joined onto boundary features by country name (with an
//! alias table for mismatched spellings), and each feature is colored by the
//! selected metric using eight equal-width buckets over the observed range.

pub mod alias;
pub mod color;
pub mod config;
pub mod data;
pub mod join;
pub mod legend;
pub mod render;
pub mod scale;
pub mod server;
pub mod state;
pub mod style;
pub mod types;
