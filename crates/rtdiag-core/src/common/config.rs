//! Panel style configuration.
//!
//! A `PlotStyle` is built once per invocation (defaults, or a JSON file) and
//! passed explicitly into the panel builders.

use crate::domain::AxisScale;
use crate::numerics::DEFAULT_Y_LIMIT_SCALE;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_LABEL_SIZE: f64 = 15.0;
pub const DEFAULT_LINE_ID_FONT_SIZE: f64 = 10.0;
pub const DEFAULT_LINE_ID_LABEL_Y: f64 = 0.93;
pub const DEFAULT_SMOOTH_WIDTH: usize = 5;

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct PlotStyle {
    #[serde(rename = "labelSize")]
    pub label_size: f64,
    #[serde(rename = "tickLabelSize")]
    pub tick_label_size: f64,
    #[serde(rename = "lineIdFontSize")]
    pub line_id_font_size: f64,
    /// Axes-fraction height of line-id labels.
    #[serde(rename = "lineIdLabelY")]
    pub line_id_label_y: f64,
    /// Shift subtracted from a line's x before its label is placed.
    #[serde(rename = "lineIdOffset")]
    pub line_id_offset: f64,
    #[serde(rename = "smoothWidth")]
    pub smooth_width: usize,
    #[serde(rename = "yLimitScale")]
    pub y_limit_scale: f64,
    pub scale: AxisScale,
}

impl Default for PlotStyle {
    fn default() -> Self {
        Self {
            label_size: DEFAULT_LABEL_SIZE,
            tick_label_size: DEFAULT_LABEL_SIZE,
            line_id_font_size: DEFAULT_LINE_ID_FONT_SIZE,
            line_id_label_y: DEFAULT_LINE_ID_LABEL_Y,
            line_id_offset: 0.0,
            smooth_width: DEFAULT_SMOOTH_WIDTH,
            y_limit_scale: DEFAULT_Y_LIMIT_SCALE,
            scale: AxisScale::default(),
        }
    }
}

impl PlotStyle {
    pub fn from_json(source: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(source)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PlotStyleError {
    #[error("failed to read plot style '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse plot style '{}': {source}", path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

pub fn load_plot_style(style_path: impl AsRef<Path>) -> Result<PlotStyle, PlotStyleError> {
    let style_path = style_path.as_ref();
    let source = fs::read_to_string(style_path).map_err(|source| PlotStyleError::Read {
        path: style_path.to_path_buf(),
        source,
    })?;
    PlotStyle::from_json(&source).map_err(|source| PlotStyleError::Parse {
        path: style_path.to_path_buf(),
        source,
    })
}
