//! Ontario WMU Harvest Map
//!
//! Platform-agnostic core for the wildlife harvest choropleth: table parsing,
//! per-unit aggregation, color classification, feature binding and trend series.
//! Fetching assets and drawing the map are left to the embedding front end.

pub mod aggregate;
pub mod boundaries;
pub mod config;
pub mod constants;
pub mod data;
pub mod metric;
pub mod numbers;
pub mod palette;
pub mod render;
pub mod trend;
pub mod unit_id;
pub mod view;

// Re-export commonly used types
pub use aggregate::{
    AggregatedDataset, Histogram, HistogramBin, UnitReading, UnitSummary, ValueRange, aggregate,
};
pub use boundaries::{Bounds, Feature, FeatureCollection};
pub use config::{
    AssetConfig, ConfigError, ExplorerConfig, PaletteConfig, SelectionDefaults, StyleConfig,
};
pub use data::{HarvestTables, RecordTable};
pub use metric::{Metric, MetricParseError, MetricSpec, Species};
pub use palette::{ColorClass, ColorMapper, Gradient, Lab, PaletteError, Rgb};
pub use render::{
    FeatureStyle, LookupKind, RenderedMap, StyledFeature, UnitLookup, render_map, tooltip_text,
};
pub use trend::{TrendPoint, TrendSeries, trend_series};
pub use unit_id::{matches_search, normalize_search, parent_unit_id};
pub use view::{Explorer, ViewAction, ViewState};
