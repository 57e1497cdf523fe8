//! Per-unit harvest aggregation
//!
//! Turns one species table into the per-unit summaries, value ranges and
//! histograms for a single metric and year.
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use crate::constants::{HARVEST_BINS, PER_HUNTER_BINS};
use crate::data::{RecordTable, field_number, field_text};
use crate::metric::{
    HUNTERS_COLUMN, Metric, MetricSpec, NULL_SENTINEL, TOTAL_ROW_LABEL, UNIT_COLUMN, YEAR_COLUMN,
};

/// Harvest and hunter counts read from one record.
///
/// Shared by the aggregator and the trend series so both read values the same way.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UnitReading {
    /// Harvest count; 0 when the null sentinel was present, NaN when malformed.
    pub harvest: f64,
    /// Active hunter count; NaN when malformed.
    pub hunters: f64,
    pub harvest_is_null: bool,
}

impl UnitReading {
    #[must_use]
    pub fn from_record(record: &[Value], spec: &MetricSpec) -> Self {
        let harvest_is_null = spec.uses_null_sentinel
            && field_text(record, spec.harvest_column).as_deref() == Some(NULL_SENTINEL);
        let harvest = if harvest_is_null {
            0.0
        } else {
            field_number(record, spec.harvest_column)
        };
        Self {
            harvest,
            hunters: field_number(record, HUNTERS_COLUMN),
            harvest_is_null,
        }
    }

    /// Whether a per-hunter ratio can be formed.
    #[must_use]
    pub fn has_hunters(&self) -> bool {
        self.hunters > 0.0
    }

    /// Null when the harvest is null or the hunter count is not a positive finite number.
    #[must_use]
    pub fn per_hunter_is_null(&self) -> bool {
        self.harvest_is_null || !self.has_hunters() || !self.hunters.is_finite()
    }
}

/// Aggregated values for one management unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitSummary {
    pub unit_id: String,
    pub raw_value: f64,
    pub per_hunter_value: f64,
    pub raw_is_null: bool,
    pub per_hunter_is_null: bool,
}

impl UnitSummary {
    /// Summary for a unit with no record: null in both views, value 0.
    #[must_use]
    pub fn missing(unit_id: &str) -> Self {
        Self {
            unit_id: unit_id.to_string(),
            raw_value: 0.0,
            per_hunter_value: 0.0,
            raw_is_null: true,
            per_hunter_is_null: true,
        }
    }

    #[must_use]
    pub fn from_reading(unit_id: String, reading: &UnitReading) -> Self {
        let per_hunter_is_null = reading.per_hunter_is_null();
        let per_hunter_value = if per_hunter_is_null {
            0.0
        } else {
            reading.harvest / reading.hunters
        };
        Self {
            unit_id,
            raw_value: reading.harvest,
            per_hunter_value,
            raw_is_null: reading.harvest_is_null,
            per_hunter_is_null,
        }
    }

    /// Value shown for the selected view.
    #[must_use]
    pub const fn value(&self, per_hunter: bool) -> f64 {
        if per_hunter {
            self.per_hunter_value
        } else {
            self.raw_value
        }
    }

    /// Null flag relevant to the selected view.
    #[must_use]
    pub const fn is_null(&self, per_hunter: bool) -> bool {
        if per_hunter {
            self.raw_is_null || self.per_hunter_is_null
        } else {
            self.raw_is_null
        }
    }
}

/// Running min/max over strictly positive values.
///
/// Starts at `+inf`/`-inf` and stays there until a positive value is observed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ValueRange {
    pub min: f64,
    pub max: f64,
}

impl Default for ValueRange {
    fn default() -> Self {
        Self {
            min: f64::INFINITY,
            max: f64::NEG_INFINITY,
        }
    }
}

impl ValueRange {
    pub fn observe(&mut self, value: f64) {
        self.min = self.min.min(value);
        self.max = self.max.max(value);
    }

    /// True until the first value has been observed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.min > self.max
    }

    #[must_use]
    pub fn bounds(&self) -> Option<(f64, f64)> {
        (!self.is_empty()).then_some((self.min, self.max))
    }

    /// Position of `value` inside the range; NaN or infinite for degenerate ranges.
    #[must_use]
    pub fn ratio(&self, value: f64) -> f64 {
        (value - self.min) / (self.max - self.min)
    }
}

/// Bucket of a frequency histogram, inclusive of its upper edge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistogramBin {
    pub label: String,
    /// `None` for the open-ended last bin.
    pub upper: Option<f64>,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Histogram {
    pub bins: Vec<HistogramBin>,
}

impl Histogram {
    /// Build empty bins from `(label, upper edge)` pairs.
    #[must_use]
    pub fn with_edges(edges: &[(&str, Option<f64>)]) -> Self {
        Self {
            bins: edges
                .iter()
                .map(|(label, upper)| HistogramBin {
                    label: (*label).to_string(),
                    upper: *upper,
                    count: 0,
                })
                .collect(),
        }
    }

    #[must_use]
    pub fn harvest() -> Self {
        Self::with_edges(&HARVEST_BINS)
    }

    #[must_use]
    pub fn per_hunter() -> Self {
        Self::with_edges(&PER_HUNTER_BINS)
    }

    pub fn record(&mut self, value: f64) {
        let slot = self
            .bins
            .iter()
            .position(|bin| bin.upper.is_none_or(|upper| value <= upper));
        if let Some(bin) = slot.and_then(|idx| self.bins.get_mut(idx)) {
            bin.count += 1;
        }
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.bins.iter().map(|bin| bin.count).sum()
    }

    #[must_use]
    pub fn count(&self, label: &str) -> Option<usize> {
        self.bins
            .iter()
            .find(|bin| bin.label == label)
            .map(|bin| bin.count)
    }
}

/// Everything the map needs for one metric and year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregatedDataset {
    pub metric: Metric,
    pub year: String,
    pub units: BTreeMap<String, UnitSummary>,
    pub harvest_range: ValueRange,
    pub per_hunter_range: ValueRange,
    pub harvest_histogram: Histogram,
    pub per_hunter_histogram: Histogram,
}

impl AggregatedDataset {
    #[must_use]
    pub fn empty(metric: Metric, year: &str) -> Self {
        Self {
            metric,
            year: year.to_string(),
            units: BTreeMap::new(),
            harvest_range: ValueRange::default(),
            per_hunter_range: ValueRange::default(),
            harvest_histogram: Histogram::harvest(),
            per_hunter_histogram: Histogram::per_hunter(),
        }
    }

    #[must_use]
    pub fn get(&self, unit_id: &str) -> Option<&UnitSummary> {
        self.units.get(unit_id)
    }

    #[must_use]
    pub const fn range(&self, per_hunter: bool) -> ValueRange {
        if per_hunter {
            self.per_hunter_range
        } else {
            self.harvest_range
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.units.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    fn absorb(&mut self, summary: UnitSummary) {
        if !summary.raw_is_null && summary.raw_value > 0.0 {
            self.harvest_range.observe(summary.raw_value);
            self.harvest_histogram.record(summary.raw_value);
        }
        if !summary.per_hunter_is_null && summary.per_hunter_value > 0.0 {
            self.per_hunter_range.observe(summary.per_hunter_value);
            self.per_hunter_histogram.record(summary.per_hunter_value);
        }
        self.units.insert(summary.unit_id.clone(), summary);
    }
}

/// Aggregate one species table for `metric` in `year`.
///
/// Rows are kept when their year field equals `year` as text and their unit
/// field is not the provincial `Total` row. A later row for the same unit
/// replaces the earlier summary, though both count toward ranges and bins.
/// Zero and null values never widen the ranges.
#[must_use]
pub fn aggregate(table: &RecordTable, metric: Metric, year: &str) -> AggregatedDataset {
    let spec = metric.spec();
    let mut dataset = AggregatedDataset::empty(metric, year);

    for record in table
        .records
        .iter()
        .filter(|record| field_text(record, YEAR_COLUMN).as_deref() == Some(year))
    {
        let Some(unit_field) = field_text(record, UNIT_COLUMN) else {
            log::warn!("skipping {metric} record without a unit label: {record:?}");
            continue;
        };
        if unit_field == TOTAL_ROW_LABEL {
            continue;
        }
        let reading = UnitReading::from_record(record, spec);
        dataset.absorb(UnitSummary::from_reading(
            unit_field.trim().to_string(),
            &reading,
        ));
    }

    log::debug!(
        "aggregated {} units for {metric} {year} (range {:?}, per hunter {:?})",
        dataset.len(),
        dataset.harvest_range.bounds(),
        dataset.per_hunter_range.bounds()
    );
    dataset
}
