use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Geometry and viewport tuning for the graph engine.
///
/// Defaults match the spacing the rest of the client lays text out against,
/// so override them together if the host font size changes.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct GraphConfig {
    /// Vertical distance between row centers
    #[serde(default = "default_row_spacing")]
    pub row_spacing: f32,
    /// Horizontal distance between lane centers
    #[serde(default = "default_lane_spacing")]
    pub lane_spacing: f32,
    /// Left edge to lane 0 center
    #[serde(default = "default_offset")]
    pub x_offset: f32,
    /// Top edge to row 0 center
    #[serde(default = "default_offset")]
    pub y_offset: f32,
    /// Baseline offset of row text below the row center
    #[serde(default = "default_text_y_offset")]
    pub text_y_offset: f32,
    #[serde(default = "default_node_radius")]
    pub node_radius: f32,
    #[serde(default = "default_edge_width")]
    pub edge_width: f32,
    #[serde(default = "default_chip_height")]
    pub chip_height: f32,
    #[serde(default = "default_chip_corner_radius")]
    pub chip_corner_radius: f32,
    /// Horizontal padding inside a chip, each side
    #[serde(default = "default_chip_text_pad")]
    pub chip_text_pad: f32,
    /// Gap between consecutive chips and before the summary
    #[serde(default = "default_chip_spacing")]
    pub chip_spacing: f32,
    #[serde(default = "default_text_size")]
    pub text_size: f32,
    /// Pixels beyond the viewport kept materialized on each side
    #[serde(default = "default_render_margin")]
    pub render_margin: f32,
}

fn default_row_spacing() -> f32 { 24.0 }
fn default_lane_spacing() -> f32 { 15.0 }
fn default_offset() -> f32 { 20.0 }
fn default_text_y_offset() -> f32 { 5.0 }
fn default_node_radius() -> f32 { 5.0 }
fn default_edge_width() -> f32 { 2.0 }
fn default_chip_height() -> f32 { 18.0 }
fn default_chip_corner_radius() -> f32 { 10.0 }
fn default_chip_text_pad() -> f32 { 5.0 }
fn default_chip_spacing() -> f32 { 5.0 }
fn default_text_size() -> f32 { 13.0 }
fn default_render_margin() -> f32 { 200.0 }

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            row_spacing: default_row_spacing(),
            lane_spacing: default_lane_spacing(),
            x_offset: default_offset(),
            y_offset: default_offset(),
            text_y_offset: default_text_y_offset(),
            node_radius: default_node_radius(),
            edge_width: default_edge_width(),
            chip_height: default_chip_height(),
            chip_corner_radius: default_chip_corner_radius(),
            chip_text_pad: default_chip_text_pad(),
            chip_spacing: default_chip_spacing(),
            text_size: default_text_size(),
            render_margin: default_render_margin(),
        }
    }
}

impl GraphConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        let data = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        serde_json::from_str(&data)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }

    /// Pixel x of a lane center
    pub fn lane_x(&self, lane: usize) -> f32 {
        lane as f32 * self.lane_spacing + self.x_offset
    }

    /// Pixel y of a row center
    pub fn row_y(&self, row_index: usize) -> f32 {
        row_index as f32 * self.row_spacing + self.y_offset
    }

    /// Inverse of `row_y`, rounded to the nearest row and clamped
    pub fn row_at_y(&self, pixel_y: f32, row_count: usize) -> Option<usize> {
        if row_count == 0 {
            return None;
        }
        let raw = ((pixel_y - self.y_offset) / self.row_spacing).round();
        let clamped = raw.clamp(0.0, (row_count - 1) as f32);
        Some(clamped as usize)
    }
}
