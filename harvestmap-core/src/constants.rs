//! Fixed values shared across the map layers.

/// Harvest count bins: label and inclusive upper edge.
pub const HARVEST_BINS: [(&str, Option<f64>); 7] = [
    ("0-5", Some(5.0)),
    ("5-10", Some(10.0)),
    ("10-20", Some(20.0)),
    ("20-50", Some(50.0)),
    ("50-100", Some(100.0)),
    ("100-500", Some(500.0)),
    ("500+", None),
];

/// Harvest-per-hunter bins: label and inclusive upper edge.
pub const PER_HUNTER_BINS: [(&str, Option<f64>); 6] = [
    ("0-0.01", Some(0.01)),
    ("0.01-0.1", Some(0.1)),
    ("0.1-0.5", Some(0.5)),
    ("0.5-1", Some(1.0)),
    ("1-2", Some(2.0)),
    ("2+", None),
];

/// Gradient control colors, low to high.
pub const GRADIENT_STOPS: [&str; 4] = ["#FF0000", "#FF8C00", "#FFFF00", "#008000"];
pub const GRADIENT_STEPS: usize = 50;
pub const NO_DATA_COLOR: &str = "#808080";
pub const ZERO_COLOR: &str = "#FFFFCC";

pub const OUTLINE_COLOR: &str = "#666";
pub const OUTLINE_WEIGHT: f64 = 1.0;
pub const OUTLINE_OPACITY: f64 = 1.0;
pub const FILL_OPACITY: f64 = 0.7;
pub const HIGHLIGHT_COLOR: &str = "#0000FF";
pub const HIGHLIGHT_WEIGHT: f64 = 3.0;

pub const DEFAULT_YEAR: &str = "2024";
pub const BOUNDARIES_FILE: &str = "wmu-boundaries.json";
pub const LABEL_PROPERTY: &str = "OFFICIAL_NAME";
