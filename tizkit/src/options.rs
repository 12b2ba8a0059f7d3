//! Tunables for the TikZ codec and the LaTeX sync loop.
//!
//! Every struct deserializes with defaults so hosts can pass partial objects.

use serde::{Deserialize, Serialize};

pub const DEFAULT_CANVAS_WIDTH: f32 = 500.0;
pub const DEFAULT_CANVAS_HEIGHT: f32 = 350.0;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TikzOptions {
    /// Lower and upper edge of the square (in cm) node centers are fitted into.
    pub target_min: f32,
    pub target_max: f32,
    /// Upper bound for the px -> cm scale; keeps small diagrams from blowing up.
    pub max_scale: f32,
    /// Final coordinates are clamped to +/- this many cm.
    pub clamp_cm: f32,
}

impl Default for TikzOptions {
    fn default() -> Self {
        TikzOptions {
            target_min: -5.0,
            target_max: 5.0,
            max_scale: 1.0,
            clamp_cm: 15.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ImportOptions {
    pub canvas_width: f32,
    pub canvas_height: f32,
    pub pixels_per_cm: f32,
}

impl Default for ImportOptions {
    fn default() -> Self {
        ImportOptions {
            canvas_width: DEFAULT_CANVAS_WIDTH,
            canvas_height: DEFAULT_CANVAS_HEIGHT,
            pixels_per_cm: 50.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SyncOptions {
    pub debounce_ms: f64,
}

impl Default for SyncOptions {
    fn default() -> Self {
        SyncOptions { debounce_ms: 300.0 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_objects_fill_defaults() {
        let o: TikzOptions = serde_json::from_str(r#"{"clampCm": 8}"#).unwrap();
        assert_eq!(o.clamp_cm, 8.0);
        assert_eq!(o.target_min, -5.0);
        let s: SyncOptions = serde_json::from_str("{}").unwrap();
        assert_eq!(s.debounce_ms, 300.0);
    }
}
