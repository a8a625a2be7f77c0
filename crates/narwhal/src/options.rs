//! Layout options.
//!
//! Strength and range options are "slider" values in `0..=100`, where `50` selects the built-in
//! default; [`transform_slider`] and [`transform_slider_bounded`] map them onto the constant used
//! by the simulation.

use serde::{Deserialize, Serialize};

use crate::constants::DEFAULT_RANDOM_SEED;
use crate::error::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Quality {
    /// Tighter convergence threshold and more iterations.
    Proof,
    #[default]
    Default,
    /// Looser convergence threshold and fewer iterations.
    Draft,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LayoutOptions {
    pub layout_quality: Quality,
    /// Start from the current positions instead of a fresh initial placement.
    pub incremental: bool,
    /// Give self-loops and multi-edges bend points and route them through dummy nodes.
    pub create_bends_as_needed: bool,
    /// Use center distances for leaf-to-leaf springs and repulsion.
    pub uniform_leaf_node_sizes: bool,
    pub animation_on_layout: bool,
    pub animation_during_layout: bool,
    /// Slider value; the animation hook fires every `transform_slider(period, 50)` iterations.
    pub animation_period: u32,
    pub ideal_edge_length: f64,
    pub smart_edge_length_calc: bool,
    pub use_multi_level_scaling: bool,
    pub spring_strength: u32,
    pub repulsion_strength: u32,
    pub gravity_strength: u32,
    pub compound_gravity_strength: u32,
    pub gravity_range: u32,
    pub compound_gravity_range: u32,
    pub random_seed: u64,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self {
            layout_quality: Quality::Default,
            incremental: false,
            create_bends_as_needed: false,
            uniform_leaf_node_sizes: false,
            animation_on_layout: true,
            animation_during_layout: false,
            animation_period: 50,
            ideal_edge_length: crate::constants::DEFAULT_EDGE_LENGTH,
            smart_edge_length_calc: true,
            use_multi_level_scaling: false,
            spring_strength: 50,
            repulsion_strength: 50,
            gravity_strength: 50,
            compound_gravity_strength: 50,
            gravity_range: 50,
            compound_gravity_range: 50,
            random_seed: DEFAULT_RANDOM_SEED,
        }
    }
}

impl LayoutOptions {
    /// Parses options from JSON; missing keys keep their defaults.
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RotationSelection {
    /// Every candidate process is equally likely.
    #[default]
    Uniform,
    /// Candidates are weighted by the magnitude of their net rotational force.
    RouletteWheel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Compaction {
    /// Row-based member packing.
    #[default]
    Tiling,
    /// Grid polyomino packing followed by a compaction sweep.
    Polyomino,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SbgnOptions {
    pub rotation_selection: RotationSelection,
    pub compaction: Compaction,
}

impl SbgnOptions {
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }
}

/// Maps a slider value onto `[default / 10, default * 10]`, with `50` mapping to `default`.
pub fn transform_slider(value: u32, default: f64) -> f64 {
    let v = f64::from(value);
    let (a, b) = if value <= 50 {
        (9.0 * default / 500.0, default / 10.0)
    } else {
        (9.0 * default / 50.0, -8.0 * default)
    };
    a * v + b
}

/// Maps a slider value linearly onto `[default / min_div, default * max_mul]`, with `50`
/// mapping to `default`.
pub fn transform_slider_bounded(value: u32, default: f64, min_div: f64, max_mul: f64) -> f64 {
    let v = f64::from(value);
    if value <= 50 {
        let min = default / min_div;
        default - ((default - min) / 50.0) * (50.0 - v)
    } else {
        let max = default * max_mul;
        default + ((max - default) / 50.0) * (v - 50.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slider_midpoint_is_the_default() {
        assert!((transform_slider(50, 0.4) - 0.4).abs() < 1e-12);
        assert!((transform_slider(0, 0.4) - 0.04).abs() < 1e-12);
        assert!((transform_slider(100, 0.4) - 4.0).abs() < 1e-12);
        assert!((transform_slider_bounded(50, 4500.0, 5.0, 5.0) - 4500.0).abs() < 1e-9);
        assert!((transform_slider_bounded(0, 4500.0, 5.0, 5.0) - 900.0).abs() < 1e-9);
        assert!((transform_slider_bounded(100, 4500.0, 5.0, 5.0) - 22500.0).abs() < 1e-9);
    }

    #[test]
    fn options_parse_from_camel_case_json() {
        let opts = LayoutOptions::from_json(
            r#"{"idealEdgeLength": 80, "layoutQuality": "proof", "useMultiLevelScaling": true}"#,
        )
        .unwrap();
        assert_eq!(opts.ideal_edge_length, 80.0);
        assert_eq!(opts.layout_quality, Quality::Proof);
        assert!(opts.use_multi_level_scaling);
        assert_eq!(opts.spring_strength, 50);

        let sbgn = SbgnOptions::from_json(r#"{"rotationSelection": "rouletteWheel"}"#).unwrap();
        assert_eq!(sbgn.rotation_selection, RotationSelection::RouletteWheel);
        assert_eq!(sbgn.compaction, Compaction::Tiling);
    }

    #[test]
    fn malformed_options_are_reported() {
        assert!(LayoutOptions::from_json(r#"{"idealEdgeLength": "far"}"#).is_err());
    }
}
