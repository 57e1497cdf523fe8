//! Per-year history for a single unit, shown when the pointer rests on a feature.
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::aggregate::UnitReading;
use crate::data::{RecordTable, field_text};
use crate::metric::{Metric, UNIT_COLUMN, YEAR_COLUMN};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendPoint {
    pub year: String,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendSeries {
    pub unit_id: String,
    pub metric: Metric,
    pub per_hunter: bool,
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub points: Vec<TrendPoint>,
}

impl TrendSeries {
    #[must_use]
    pub fn values(&self) -> Vec<f64> {
        self.points.iter().map(|point| point.value).collect()
    }

    /// Largest plotted value, used to size a zero-based axis.
    #[must_use]
    pub fn peak(&self) -> Option<f64> {
        self.points
            .iter()
            .map(|point| point.value)
            .filter(|value| !value.is_nan())
            .reduce(f64::max)
    }
}

/// Value plotted for one year.
///
/// Unlike the map, the chart draws through gaps: unreported harvests count as 0
/// and a unit without hunters plots its raw harvest even in per-hunter mode.
#[must_use]
pub fn trend_value(reading: &UnitReading, per_hunter: bool) -> f64 {
    if per_hunter && reading.has_hunters() {
        reading.harvest / reading.hunters
    } else {
        reading.harvest
    }
}

/// Build the history of `unit_id` across `years` (ascending).
///
/// Rows match on the exact unit field; when a year has several rows the first
/// one wins, and a year with no row plots 0.
#[must_use]
pub fn trend_series(
    table: &RecordTable,
    metric: Metric,
    unit_id: &str,
    years: &BTreeSet<String>,
    per_hunter: bool,
) -> TrendSeries {
    let spec = metric.spec();
    let unit_rows: Vec<_> = table
        .records
        .iter()
        .filter(|record| field_text(record, UNIT_COLUMN).as_deref() == Some(unit_id))
        .collect();

    let points = years
        .iter()
        .map(|year| {
            let value = unit_rows
                .iter()
                .find(|record| field_text(record, YEAR_COLUMN).as_deref() == Some(year.as_str()))
                .map_or(0.0, |record| {
                    trend_value(&UnitReading::from_record(record, spec), per_hunter)
                });
            TrendPoint {
                year: year.clone(),
                value,
            }
        })
        .collect();

    let view_label = if per_hunter { "Per Hunter" } else { "Harvest" };
    TrendSeries {
        unit_id: unit_id.to_string(),
        metric,
        per_hunter,
        title: format!(
            "WMU {unit_id}: {} ({view_label})",
            capitalize(spec.display_name)
        ),
        x_label: "Year".to_string(),
        y_label: view_label.to_string(),
        points,
    }
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    fn table() -> RecordTable {
        RecordTable::from_records(vec![
            ["r", "31", "2022", "10", "NULL", "4", "6"].map(Value::from).to_vec(),
            ["r", "31", "2023", "0", "2", "3", "5"].map(Value::from).to_vec(),
            ["r", "31", "2024", "4", "1", "1", "8"].map(Value::from).to_vec(),
            ["r", "31", "2024", "2", "1", "1", "99"].map(Value::from).to_vec(),
            ["r", "32", "2021", "4", "1", "1", "3"].map(Value::from).to_vec(),
        ])
    }

    fn years() -> BTreeSet<String> {
        ["2021", "2022", "2023", "2024"]
            .into_iter()
            .map(String::from)
            .collect()
    }

    #[test]
    fn raw_series_fills_gaps_with_zero() {
        let series = trend_series(&table(), Metric::DeerTotal, "31", &years(), false);
        assert_eq!(series.values(), vec![0.0, 6.0, 5.0, 8.0]);
        assert_eq!(series.title, "WMU 31: Deer (Harvest)");
        assert_eq!(series.y_label, "Harvest");
    }

    #[test]
    fn per_hunter_series_falls_back_to_raw_without_hunters() {
        let series = trend_series(&table(), Metric::DeerTotal, "31", &years(), true);
        assert_eq!(series.values(), vec![0.0, 0.6, 5.0, 2.0]);
        assert_eq!(series.title, "WMU 31: Deer (Per Hunter)");
    }

    #[test]
    fn null_sentinel_plots_zero() {
        let series = trend_series(&table(), Metric::DeerDoe, "31", &years(), false);
        assert_eq!(series.values(), vec![0.0, 0.0, 2.0, 1.0]);
    }

    #[test]
    fn titles_capitalize_display_names() {
        let series = trend_series(&RecordTable::empty(), Metric::Wolf, "5", &years(), false);
        assert_eq!(series.title, "WMU 5: Wolves/coyotes (Harvest)");
        assert_eq!(series.peak(), Some(0.0));
    }
}
