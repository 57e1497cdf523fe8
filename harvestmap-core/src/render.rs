//! Binding aggregated values onto boundary features
//!
//! Each feature resolves its unit through exact label, then parent unit, then a
//! synthetic empty entry, and receives a fill style and tooltip for the current view.
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::borrow::Cow;

use crate::aggregate::{AggregatedDataset, UnitSummary, ValueRange};
use crate::boundaries::{Bounds, Feature, FeatureCollection};
use crate::config::StyleConfig;
use crate::palette::{ColorClass, ColorMapper};
use crate::unit_id::{UNKNOWN_UNIT, matches_search, parent_unit_id};
use crate::view::ViewState;

/// Property under which binding results are attached to exported features.
pub const HARVEST_PROPERTY: &str = "harvest";

/// Outcome of resolving a feature label against the aggregated units.
#[derive(Debug, Clone, PartialEq)]
pub enum UnitLookup<'a> {
    Found(&'a UnitSummary),
    FoundViaParent {
        parent: String,
        summary: &'a UnitSummary,
    },
    Missing {
        parent: String,
    },
}

impl<'a> UnitLookup<'a> {
    #[must_use]
    pub fn resolve(dataset: &'a AggregatedDataset, label: &str) -> Self {
        if let Some(summary) = dataset.get(label) {
            return Self::Found(summary);
        }
        let parent = parent_unit_id(Some(label));
        match dataset.get(&parent) {
            Some(summary) => Self::FoundViaParent { parent, summary },
            None => Self::Missing { parent },
        }
    }

    #[must_use]
    pub const fn kind(&self) -> LookupKind {
        match self {
            Self::Found(_) => LookupKind::Found,
            Self::FoundViaParent { .. } => LookupKind::FoundViaParent,
            Self::Missing { .. } => LookupKind::Missing,
        }
    }

    /// Summary to style with; missing units get a null entry named after the label.
    #[must_use]
    pub fn summary(&self, label: &str) -> Cow<'a, UnitSummary> {
        match self {
            Self::Found(summary) | Self::FoundViaParent { summary, .. } => Cow::Borrowed(*summary),
            Self::Missing { .. } => Cow::Owned(UnitSummary::missing(label)),
        }
    }

    /// Id shown to the user and used for the trend series: the exact label
    /// when it matched, otherwise the parent id.
    #[must_use]
    pub fn display_id<'l>(&'l self, label: &'l str) -> &'l str {
        match self {
            Self::Found(_) => label,
            Self::FoundViaParent { parent, .. } | Self::Missing { parent } => parent.as_str(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LookupKind {
    Found,
    FoundViaParent,
    Missing,
}

/// Path style in the shape map libraries accept.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeatureStyle {
    pub fill_color: String,
    pub color: String,
    pub weight: f64,
    pub opacity: f64,
    pub fill_opacity: f64,
}

/// One boundary feature after binding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StyledFeature {
    pub label: String,
    pub display_id: String,
    pub lookup: LookupKind,
    pub summary: UnitSummary,
    pub color_class: ColorClass,
    pub style: FeatureStyle,
    pub tooltip: String,
    pub highlighted: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bounds: Option<Bounds>,
}

/// Features of the current view, ready for a map layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderedMap {
    pub view: ViewState,
    pub features: Vec<StyledFeature>,
    /// Bounds of the last search hit, the area a map should zoom to.
    pub focus: Option<Bounds>,
}

impl RenderedMap {
    pub fn search_hits(&self) -> impl Iterator<Item = &StyledFeature> {
        self.features.iter().filter(|feature| feature.highlighted)
    }

    #[must_use]
    pub fn count(&self, kind: LookupKind) -> usize {
        self.features
            .iter()
            .filter(|feature| feature.lookup == kind)
            .count()
    }

    /// Copy of `source` with each feature's binding result under [`HARVEST_PROPERTY`].
    ///
    /// `source` must be the collection this map was rendered from.
    #[must_use]
    pub fn to_feature_collection(&self, source: &FeatureCollection) -> FeatureCollection {
        let features = source
            .features
            .iter()
            .zip(&self.features)
            .map(|(feature, styled)| {
                let mut feature = feature.clone();
                let binding = serde_json::to_value(styled).unwrap_or(Value::Null);
                feature
                    .properties
                    .insert(HARVEST_PROPERTY.to_string(), binding);
                feature
            })
            .collect();
        FeatureCollection::from_features(features)
    }
}

/// Tooltip text for a unit under the selected view.
#[must_use]
pub fn tooltip_text(
    summary: &UnitSummary,
    display_id: &str,
    year: &str,
    display_name: &str,
    per_hunter: bool,
) -> String {
    if summary.is_null(per_hunter) {
        return format!("Harvest data not available for {year}");
    }
    if per_hunter {
        format!(
            "WMU {display_id}: {:.2} {display_name} harvested per hunter",
            summary.per_hunter_value
        )
    } else {
        format!(
            "WMU {display_id}: {} {display_name} harvested",
            summary.raw_value
        )
    }
}

struct Binding<'a> {
    dataset: &'a AggregatedDataset,
    view: &'a ViewState,
    mapper: &'a ColorMapper,
    style: &'a StyleConfig,
    label_property: &'a str,
    range: ValueRange,
}

/// Bind every feature in `collection` to `dataset` under `view`.
#[must_use]
pub fn render_map(
    collection: &FeatureCollection,
    dataset: &AggregatedDataset,
    view: &ViewState,
    mapper: &ColorMapper,
    style: &StyleConfig,
    label_property: &str,
) -> RenderedMap {
    let binding = Binding {
        dataset,
        view,
        mapper,
        style,
        label_property,
        range: dataset.range(view.per_hunter),
    };
    let mut focus = None;

    let features = collection
        .features
        .iter()
        .map(|feature| {
            let styled = binding.style_feature(feature);
            if styled.highlighted {
                log::info!("search matched WMU {}", styled.label);
                focus = styled.bounds.or(focus);
            }
            styled
        })
        .collect();

    RenderedMap {
        view: view.clone(),
        features,
        focus,
    }
}

impl Binding<'_> {
    fn style_feature(&self, feature: &Feature) -> StyledFeature {
        let per_hunter = self.view.per_hunter;
        let source_label = feature.label(self.label_property);
        let label = source_label.unwrap_or(UNKNOWN_UNIT);
        let lookup = UnitLookup::resolve(self.dataset, label);
        let summary = lookup.summary(label).into_owned();
        let display_id = lookup.display_id(label).to_string();
        let color_class = self.mapper.classify(
            summary.value(per_hunter),
            summary.is_null(per_hunter),
            self.range,
        );
        let highlighted = matches_search(source_label.unwrap_or_default(), &self.view.search);
        let (outline, weight) = if highlighted {
            (self.style.highlight_color.clone(), self.style.highlight_weight)
        } else {
            (self.style.outline_color.clone(), self.style.weight)
        };

        StyledFeature {
            label: label.to_string(),
            tooltip: tooltip_text(
                &summary,
                &display_id,
                &self.view.year,
                self.view.metric.spec().display_name,
                per_hunter,
            ),
            display_id,
            lookup: lookup.kind(),
            color_class,
            style: FeatureStyle {
                fill_color: self.mapper.color(color_class).to_string(),
                color: outline,
                weight,
                opacity: self.style.opacity,
                fill_opacity: self.style.fill_opacity,
            },
            highlighted,
            bounds: if highlighted { feature.bounds() } else { None },
            summary,
        }
    }
}
