//! Selection state and the explorer that keeps the map in sync with it.
use serde::{Deserialize, Serialize};

use crate::aggregate::{AggregatedDataset, aggregate};
use crate::boundaries::FeatureCollection;
use crate::config::{ConfigError, ExplorerConfig, SelectionDefaults};
use crate::constants::DEFAULT_YEAR;
use crate::data::HarvestTables;
use crate::metric::Metric;
use crate::palette::ColorMapper;
use crate::render::{RenderedMap, render_map};
use crate::trend::{TrendSeries, trend_series};
use crate::unit_id::normalize_search;

/// What the user currently has selected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewState {
    pub metric: Metric,
    pub year: String,
    pub per_hunter: bool,
    /// Normalized search query; empty when no search is active.
    pub search: String,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            metric: Metric::default(),
            year: DEFAULT_YEAR.to_string(),
            per_hunter: false,
            search: String::new(),
        }
    }
}

impl ViewState {
    #[must_use]
    pub fn from_defaults(defaults: &SelectionDefaults) -> Self {
        Self {
            metric: defaults.metric,
            year: defaults.year.clone(),
            per_hunter: defaults.per_hunter,
            search: String::new(),
        }
    }

    #[must_use]
    pub fn with_search(mut self, query: &str) -> Self {
        self.search = normalize_search(query);
        self
    }

    /// Next state after `action`; the current state is left untouched.
    #[must_use]
    pub fn apply(&self, action: ViewAction) -> Self {
        let mut next = self.clone();
        match action {
            ViewAction::SelectMetric(metric) => next.metric = metric,
            ViewAction::SelectYear(year) => next.year = year,
            ViewAction::SetPerHunter(per_hunter) => next.per_hunter = per_hunter,
            ViewAction::Search(query) => return next.with_search(&query),
        }
        next
    }
}

/// User interactions that change the view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ViewAction {
    SelectMetric(Metric),
    SelectYear(String),
    SetPerHunter(bool),
    Search(String),
}

impl ViewAction {
    /// Whether the aggregated values depend on this action.
    #[must_use]
    pub const fn changes_data(&self) -> bool {
        matches!(self, Self::SelectMetric(_) | Self::SelectYear(_))
    }
}

/// Loaded tables plus the dataset for the current view.
///
/// Every data-changing action rebuilds the dataset from scratch, so nothing
/// from a previous metric or year survives a switch.
#[derive(Debug, Clone)]
pub struct Explorer {
    tables: HarvestTables,
    config: ExplorerConfig,
    mapper: ColorMapper,
    state: ViewState,
    dataset: AggregatedDataset,
}

impl Explorer {
    /// Build an explorer showing the configured default selection.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration fails validation.
    pub fn new(tables: HarvestTables, config: ExplorerConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let mapper = config.color_mapper()?;
        let state = ViewState::from_defaults(&config.defaults);
        if !tables.contains_year(&state.year) {
            log::warn!("default year {} has no harvest rows", state.year);
        }
        let dataset = build_dataset(&tables, &state);
        Ok(Self {
            tables,
            config,
            mapper,
            state,
            dataset,
        })
    }

    pub fn dispatch(&mut self, action: ViewAction) {
        let rebuild = action.changes_data();
        self.state = self.state.apply(action);
        if rebuild {
            self.dataset = build_dataset(&self.tables, &self.state);
        }
    }

    #[must_use]
    pub const fn state(&self) -> &ViewState {
        &self.state
    }

    #[must_use]
    pub const fn dataset(&self) -> &AggregatedDataset {
        &self.dataset
    }

    #[must_use]
    pub const fn tables(&self) -> &HarvestTables {
        &self.tables
    }

    #[must_use]
    pub const fn config(&self) -> &ExplorerConfig {
        &self.config
    }

    #[must_use]
    pub const fn mapper(&self) -> &ColorMapper {
        &self.mapper
    }

    /// Years for the year selector, newest first.
    #[must_use]
    pub fn years_descending(&self) -> Vec<String> {
        self.tables.years_descending()
    }

    #[must_use]
    pub fn render(&self, boundaries: &FeatureCollection) -> RenderedMap {
        render_map(
            boundaries,
            &self.dataset,
            &self.state,
            &self.mapper,
            &self.config.style,
            &self.config.assets.label_property,
        )
    }

    /// History of `unit_id` for the selected metric across all loaded years.
    #[must_use]
    pub fn trend(&self, unit_id: &str) -> Option<TrendSeries> {
        let species = self.state.metric.species();
        let Some(table) = self.tables.table(species) else {
            log::warn!("no {species} table loaded; trend for WMU {unit_id} unavailable");
            return None;
        };
        Some(trend_series(
            table,
            self.state.metric,
            unit_id,
            self.tables.available_years(),
            self.state.per_hunter,
        ))
    }
}

fn build_dataset(tables: &HarvestTables, state: &ViewState) -> AggregatedDataset {
    let species = state.metric.species();
    tables.table(species).map_or_else(
        || {
            log::warn!("no {species} table loaded; showing {} as empty", state.metric);
            AggregatedDataset::empty(state.metric, &state.year)
        },
        |table| aggregate(table, state.metric, &state.year),
    )
}
