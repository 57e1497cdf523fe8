//! Explorer configuration: asset names, palette, and layer styling.
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

use crate::constants::{
    BOUNDARIES_FILE, DEFAULT_YEAR, FILL_OPACITY, GRADIENT_STEPS, GRADIENT_STOPS, HIGHLIGHT_COLOR,
    HIGHLIGHT_WEIGHT, LABEL_PROPERTY, NO_DATA_COLOR, OUTLINE_COLOR, OUTLINE_OPACITY,
    OUTLINE_WEIGHT, ZERO_COLOR,
};
use crate::metric::{Metric, Species};
use crate::palette::{ColorMapper, Gradient, PaletteError, Rgb};

/// Errors raised when configuration invariants are violated.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("palette is invalid: {0}")]
    Palette(#[from] PaletteError),
    #[error("{field} is not a valid color: {value}")]
    InvalidColor { field: &'static str, value: String },
    #[error("{field} must be between 0 and 1 (got {value:.2})")]
    OpacityRange { field: &'static str, value: f64 },
    #[error("{field} must be positive (got {value:.2})")]
    WeightRange { field: &'static str, value: f64 },
    #[error("default year must not be empty")]
    EmptyYear,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ExplorerConfig {
    #[serde(default)]
    pub assets: AssetConfig,
    #[serde(default)]
    pub palette: PaletteConfig,
    #[serde(default)]
    pub style: StyleConfig,
    #[serde(default)]
    pub defaults: SelectionDefaults,
}

impl ExplorerConfig {
    /// Parse and validate a configuration document.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed or any invariant fails.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let cfg: Self = serde_json::from_str(json)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Check palette colors, opacities, weights, and the default year.
    ///
    /// # Errors
    ///
    /// Returns the first violated invariant.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.palette.validate()?;
        self.style.validate()?;
        if self.defaults.year.trim().is_empty() {
            return Err(ConfigError::EmptyYear);
        }
        Ok(())
    }

    /// Build the color mapper described by the palette section.
    ///
    /// # Errors
    ///
    /// Returns an error if the palette is invalid.
    pub fn color_mapper(&self) -> Result<ColorMapper, ConfigError> {
        self.palette.validate()?;
        let gradient = if self.palette.is_standard() {
            Gradient::standard().clone()
        } else {
            Gradient::lab(self.palette.stops.as_slice(), self.palette.steps)?
        };
        Ok(ColorMapper::new(
            gradient,
            self.palette.no_data.clone(),
            self.palette.zero.clone(),
        ))
    }
}

/// Where the static assets live, relative to the data directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetConfig {
    #[serde(default = "AssetConfig::default_tables")]
    pub tables: BTreeMap<Species, String>,
    #[serde(default = "AssetConfig::default_boundaries")]
    pub boundaries: String,
    /// Feature property holding the unit label.
    #[serde(default = "AssetConfig::default_label_property")]
    pub label_property: String,
}

impl AssetConfig {
    fn default_tables() -> BTreeMap<Species, String> {
        Species::ALL
            .into_iter()
            .map(|species| (species, species.default_file_name().to_string()))
            .collect()
    }

    fn default_boundaries() -> String {
        BOUNDARIES_FILE.to_string()
    }

    fn default_label_property() -> String {
        LABEL_PROPERTY.to_string()
    }

    /// File name for a species table, falling back to the published name.
    #[must_use]
    pub fn table_file(&self, species: Species) -> &str {
        self.tables
            .get(&species)
            .map_or_else(|| species.default_file_name(), String::as_str)
    }
}

impl Default for AssetConfig {
    fn default() -> Self {
        Self {
            tables: Self::default_tables(),
            boundaries: Self::default_boundaries(),
            label_property: Self::default_label_property(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaletteConfig {
    #[serde(default = "PaletteConfig::default_stops")]
    pub stops: Vec<String>,
    #[serde(default = "PaletteConfig::default_steps")]
    pub steps: usize,
    #[serde(default = "PaletteConfig::default_no_data")]
    pub no_data: String,
    #[serde(default = "PaletteConfig::default_zero")]
    pub zero: String,
}

impl PaletteConfig {
    fn default_stops() -> Vec<String> {
        GRADIENT_STOPS.iter().map(|s| (*s).to_string()).collect()
    }

    const fn default_steps() -> usize {
        GRADIENT_STEPS
    }

    fn default_no_data() -> String {
        NO_DATA_COLOR.to_string()
    }

    fn default_zero() -> String {
        ZERO_COLOR.to_string()
    }

    fn is_standard(&self) -> bool {
        self.steps == GRADIENT_STEPS
            && self.stops.len() == GRADIENT_STOPS.len()
            && self
                .stops
                .iter()
                .zip(GRADIENT_STOPS)
                .all(|(stop, standard)| stop.eq_ignore_ascii_case(standard))
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.stops.len() < 2 {
            return Err(PaletteError::TooFewStops(self.stops.len()).into());
        }
        if self.steps == 0 {
            return Err(PaletteError::NoSteps.into());
        }
        for stop in &self.stops {
            Rgb::from_hex(stop)?;
        }
        check_color("palette.no_data", &self.no_data)?;
        check_color("palette.zero", &self.zero)
    }
}

impl Default for PaletteConfig {
    fn default() -> Self {
        Self {
            stops: Self::default_stops(),
            steps: Self::default_steps(),
            no_data: Self::default_no_data(),
            zero: Self::default_zero(),
        }
    }
}

/// Outline and fill styling for boundary features.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StyleConfig {
    #[serde(default = "StyleConfig::default_outline_color")]
    pub outline_color: String,
    #[serde(default = "StyleConfig::default_weight")]
    pub weight: f64,
    #[serde(default = "StyleConfig::default_opacity")]
    pub opacity: f64,
    #[serde(default = "StyleConfig::default_fill_opacity")]
    pub fill_opacity: f64,
    #[serde(default = "StyleConfig::default_highlight_color")]
    pub highlight_color: String,
    #[serde(default = "StyleConfig::default_highlight_weight")]
    pub highlight_weight: f64,
}

impl StyleConfig {
    fn default_outline_color() -> String {
        OUTLINE_COLOR.to_string()
    }

    const fn default_weight() -> f64 {
        OUTLINE_WEIGHT
    }

    const fn default_opacity() -> f64 {
        OUTLINE_OPACITY
    }

    const fn default_fill_opacity() -> f64 {
        FILL_OPACITY
    }

    fn default_highlight_color() -> String {
        HIGHLIGHT_COLOR.to_string()
    }

    const fn default_highlight_weight() -> f64 {
        HIGHLIGHT_WEIGHT
    }

    fn validate(&self) -> Result<(), ConfigError> {
        check_color("style.outline_color", &self.outline_color)?;
        check_color("style.highlight_color", &self.highlight_color)?;
        check_opacity("style.opacity", self.opacity)?;
        check_opacity("style.fill_opacity", self.fill_opacity)?;
        check_weight("style.weight", self.weight)?;
        check_weight("style.highlight_weight", self.highlight_weight)
    }
}

impl Default for StyleConfig {
    fn default() -> Self {
        Self {
            outline_color: Self::default_outline_color(),
            weight: Self::default_weight(),
            opacity: Self::default_opacity(),
            fill_opacity: Self::default_fill_opacity(),
            highlight_color: Self::default_highlight_color(),
            highlight_weight: Self::default_highlight_weight(),
        }
    }
}

/// Selection shown before any user interaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionDefaults {
    #[serde(default)]
    pub metric: Metric,
    #[serde(default = "SelectionDefaults::default_year")]
    pub year: String,
    #[serde(default)]
    pub per_hunter: bool,
}

impl SelectionDefaults {
    fn default_year() -> String {
        DEFAULT_YEAR.to_string()
    }
}

impl Default for SelectionDefaults {
    fn default() -> Self {
        Self {
            metric: Metric::default(),
            year: Self::default_year(),
            per_hunter: false,
        }
    }
}

fn check_color(field: &'static str, value: &str) -> Result<(), ConfigError> {
    Rgb::from_hex(value)
        .map(|_| ())
        .map_err(|_| ConfigError::InvalidColor {
            field,
            value: value.to_string(),
        })
}

fn check_opacity(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::OpacityRange { field, value })
    }
}

fn check_weight(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::WeightRange { field, value })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_uses_published_defaults() {
        let cfg = ExplorerConfig::from_json("{}").unwrap();
        assert_eq!(cfg, ExplorerConfig::default());
        assert_eq!(cfg.assets.table_file(Species::Moose), "mooseHarvest2024.json");
        assert_eq!(cfg.assets.boundaries, "wmu-boundaries.json");
        assert_eq!(cfg.assets.label_property, "OFFICIAL_NAME");
        assert_eq!(cfg.defaults.year, "2024");
        assert_eq!(cfg.defaults.metric, Metric::DeerTotal);
    }

    #[test]
    fn partial_sections_keep_remaining_defaults() {
        let cfg = ExplorerConfig::from_json(
            r#"{ "style": { "fill_opacity": 0.5 }, "defaults": { "metric": "moose", "year": "2021" } }"#,
        )
        .unwrap();
        assert!((cfg.style.fill_opacity - 0.5).abs() < f64::EPSILON);
        assert_eq!(cfg.style.outline_color, "#666");
        assert_eq!(cfg.defaults.metric, Metric::Moose);
        assert_eq!(cfg.defaults.year, "2021");
    }

    #[test]
    fn invalid_values_are_rejected() {
        let err = ExplorerConfig::from_json(r#"{ "style": { "opacity": 1.5 } }"#).unwrap_err();
        assert!(matches!(err, ConfigError::OpacityRange { field: "style.opacity", .. }));

        let err = ExplorerConfig::from_json(r##"{ "palette": { "stops": ["#fff"] } }"##).unwrap_err();
        assert!(matches!(err, ConfigError::Palette(PaletteError::TooFewStops(1))));

        let err = ExplorerConfig::from_json(r#"{ "palette": { "zero": "yellowish" } }"#).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidColor { field: "palette.zero", .. }));

        let err = ExplorerConfig::from_json(r#"{ "defaults": { "year": " " } }"#).unwrap_err();
        assert!(matches!(err, ConfigError::EmptyYear));

        assert!(matches!(
            ExplorerConfig::from_json("{ not json"),
            Err(ConfigError::Json(_))
        ));
    }

    #[test]
    fn custom_palette_builds_its_own_gradient() {
        let cfg = ExplorerConfig::from_json(
            r##"{ "palette": { "stops": ["#000000", "#ffffff"], "steps": 3 } }"##,
        )
        .unwrap();
        let mapper = cfg.color_mapper().unwrap();
        assert_eq!(mapper.gradient().len(), 3);
        assert_eq!(mapper.gradient().get(0), Some("#000000"));
        assert_eq!(mapper.gradient().get(2), Some("#ffffff"));
    }

    #[test]
    fn standard_palette_reuses_shared_gradient() {
        let mapper = ExplorerConfig::default().color_mapper().unwrap();
        assert_eq!(mapper.gradient(), Gradient::standard());
    }
}
