//! Species and metric catalog
//!
//! Every selectable map layer resolves to one row of a fixed table describing
//! which record column carries the harvest count and how missing values are spelled.
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Column holding the wildlife management unit label.
pub const UNIT_COLUMN: usize = 1;
/// Column holding the harvest season year.
pub const YEAR_COLUMN: usize = 2;
/// Column holding the active hunter count.
pub const HUNTERS_COLUMN: usize = 3;
/// Unit label used by provincial summary rows.
pub const TOTAL_ROW_LABEL: &str = "Total";
/// Harvest value used by the deer tables when a unit did not report.
pub const NULL_SENTINEL: &str = "NULL";

/// Species with a published harvest table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Species {
    Deer,
    Bear,
    Turkey,
    Moose,
    Wolf,
}

impl Species {
    pub const ALL: [Self; 5] = [
        Self::Deer,
        Self::Bear,
        Self::Turkey,
        Self::Moose,
        Self::Wolf,
    ];

    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Deer => "deer",
            Self::Bear => "bear",
            Self::Turkey => "turkey",
            Self::Moose => "moose",
            Self::Wolf => "wolf",
        }
    }

    /// File name the table is published under.
    #[must_use]
    pub const fn default_file_name(self) -> &'static str {
        match self {
            Self::Deer => "deerHarvest2024.json",
            Self::Bear => "bearHarvest2024.json",
            Self::Turkey => "turkeyHarvest2024.json",
            Self::Moose => "mooseHarvest2024.json",
            Self::Wolf => "wolfHarvest2024.json",
        }
    }
}

impl fmt::Display for Species {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// A selectable map layer.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "kebab-case")]
pub enum Metric {
    #[default]
    DeerTotal,
    DeerDoe,
    DeerBuck,
    Bear,
    Turkey,
    Moose,
    Wolf,
}

/// Column layout and labels for one metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetricSpec {
    pub species: Species,
    pub harvest_column: usize,
    /// Whether the harvest column may carry [`NULL_SENTINEL`].
    pub uses_null_sentinel: bool,
    /// Noun used in tooltips and chart titles.
    pub display_name: &'static str,
    /// Header of the harvest column in the published table.
    pub column_label: &'static str,
}

const DEER_TOTAL: MetricSpec = MetricSpec {
    species: Species::Deer,
    harvest_column: 6,
    uses_null_sentinel: true,
    display_name: "deer",
    column_label: "Total Harvest",
};
const DEER_DOE: MetricSpec = MetricSpec {
    species: Species::Deer,
    harvest_column: 4,
    uses_null_sentinel: true,
    display_name: "does",
    column_label: "Antlerless",
};
const DEER_BUCK: MetricSpec = MetricSpec {
    species: Species::Deer,
    harvest_column: 5,
    uses_null_sentinel: true,
    display_name: "bucks",
    column_label: "Antlered",
};
const BEAR: MetricSpec = MetricSpec {
    species: Species::Bear,
    harvest_column: 4,
    uses_null_sentinel: false,
    display_name: "bears",
    column_label: "Harvest",
};
const TURKEY: MetricSpec = MetricSpec {
    species: Species::Turkey,
    harvest_column: 5,
    uses_null_sentinel: false,
    display_name: "turkeys",
    column_label: "Total Harvest",
};
const MOOSE: MetricSpec = MetricSpec {
    species: Species::Moose,
    harvest_column: 7,
    uses_null_sentinel: false,
    display_name: "moose",
    column_label: "Total Harvest",
};
const WOLF: MetricSpec = MetricSpec {
    species: Species::Wolf,
    harvest_column: 4,
    uses_null_sentinel: false,
    display_name: "wolves/coyotes",
    column_label: "Harvest",
};

impl Metric {
    pub const ALL: [Self; 7] = [
        Self::DeerTotal,
        Self::DeerDoe,
        Self::DeerBuck,
        Self::Bear,
        Self::Turkey,
        Self::Moose,
        Self::Wolf,
    ];

    #[must_use]
    pub const fn spec(self) -> &'static MetricSpec {
        match self {
            Self::DeerTotal => &DEER_TOTAL,
            Self::DeerDoe => &DEER_DOE,
            Self::DeerBuck => &DEER_BUCK,
            Self::Bear => &BEAR,
            Self::Turkey => &TURKEY,
            Self::Moose => &MOOSE,
            Self::Wolf => &WOLF,
        }
    }

    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::DeerTotal => "deer-total",
            Self::DeerDoe => "deer-doe",
            Self::DeerBuck => "deer-buck",
            Self::Bear => "bear",
            Self::Turkey => "turkey",
            Self::Moose => "moose",
            Self::Wolf => "wolf",
        }
    }

    #[must_use]
    pub const fn species(self) -> Species {
        self.spec().species
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown metric `{0}` (expected one of deer-total, deer-doe, deer-buck, bear, turkey, moose, wolf)")]
pub struct MetricParseError(pub String);

impl FromStr for Metric {
    type Err = MetricParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim();
        Self::ALL
            .into_iter()
            .find(|metric| metric.key().eq_ignore_ascii_case(needle))
            .ok_or_else(|| MetricParseError(s.to_string()))
    }
}
