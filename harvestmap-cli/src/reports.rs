use anyhow::Result;
use chrono::Utc;
use colored::Colorize;
use harvestmap_core::{
    Bounds, ColorClass, Explorer, FeatureCollection, Histogram, RenderedMap, TrendSeries,
    ViewState,
};
use serde::Serialize;
use std::io::Write;

/// One unit's value under the selected view.
#[derive(Debug, Clone, Serialize)]
pub struct UnitRow {
    pub unit_id: String,
    /// `None` when the unit has no data for this view.
    pub value: Option<f64>,
    pub color_class: ColorClass,
    pub fill_color: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchHit {
    pub label: String,
    pub display_id: String,
    pub tooltip: String,
}

/// Everything written by the console, JSON and Markdown reports.
#[derive(Debug, Clone, Serialize)]
pub struct MapReport {
    pub generated_at: String,
    pub view: ViewState,
    pub column_label: &'static str,
    pub years: Vec<String>,
    pub range: Option<(f64, f64)>,
    pub units: Vec<UnitRow>,
    pub histogram: Histogram,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub search_hits: Vec<SearchHit>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub focus: Option<Bounds>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trend: Option<TrendSeries>,
}

impl MapReport {
    pub fn build(
        explorer: &Explorer,
        rendered: Option<&RenderedMap>,
        trend: Option<TrendSeries>,
    ) -> Self {
        let view = explorer.state().clone();
        let dataset = explorer.dataset();
        let range = dataset.range(view.per_hunter);
        let units = dataset
            .units
            .values()
            .map(|summary| {
                let is_null = summary.is_null(view.per_hunter);
                let value = summary.value(view.per_hunter);
                let color_class = explorer.mapper().classify(value, is_null, range);
                UnitRow {
                    unit_id: summary.unit_id.clone(),
                    value: (!is_null).then_some(value),
                    color_class,
                    fill_color: explorer.mapper().color(color_class).to_string(),
                }
            })
            .collect();
        let histogram = if view.per_hunter {
            dataset.per_hunter_histogram.clone()
        } else {
            dataset.harvest_histogram.clone()
        };
        let search_hits = rendered
            .map(|map| {
                map.search_hits()
                    .map(|hit| SearchHit {
                        label: hit.label.clone(),
                        display_id: hit.display_id.clone(),
                        tooltip: hit.tooltip.clone(),
                    })
                    .collect()
            })
            .unwrap_or_default();

        Self {
            generated_at: Utc::now().to_rfc3339(),
            column_label: view.metric.spec().column_label,
            years: explorer.years_descending(),
            range: range.bounds(),
            units,
            histogram,
            search_hits,
            focus: rendered.and_then(|map| map.focus),
            trend,
            view,
        }
    }

    fn mode_label(&self) -> &'static str {
        if self.view.per_hunter {
            "per hunter"
        } else {
            "harvest"
        }
    }
}

pub fn generate_console_report(
    out: &mut impl Write,
    report: &MapReport,
    verbose: bool,
) -> Result<()> {
    writeln!(out)?;
    writeln!(
        out,
        "{}",
        format!(
            "🗺️  {} {} ({})",
            report.view.metric, report.view.year, report.mode_label()
        )
        .bright_cyan()
        .bold()
    )?;
    writeln!(out, "{}", "==============================".cyan())?;
    writeln!(out, "Column: {}", report.column_label)?;
    writeln!(out, "Units with data: {}", report.units.len())?;
    match report.range {
        Some((min, max)) => writeln!(out, "Range: {min} - {max}")?,
        None => writeln!(out, "Range: {}", "no positive values".yellow())?,
    }
    writeln!(out)?;

    writeln!(out, "{}", "📊 Distribution".bright_yellow().bold())?;
    for bin in &report.histogram.bins {
        writeln!(out, "   {:>10}: {}", bin.label, bin.count)?;
    }
    writeln!(out)?;

    if verbose {
        for row in &report.units {
            let value = row
                .value
                .map_or_else(|| "no data".dimmed().to_string(), |v| format_value(v, report));
            writeln!(out, "   WMU {:8} {value:>12}  {}", row.unit_id, row.fill_color)?;
        }
        writeln!(out)?;
    }

    if !report.view.search.is_empty() {
        if report.search_hits.is_empty() {
            writeln!(out, "Search '{}': {}", report.view.search, "no match".red())?;
        } else {
            for hit in &report.search_hits {
                writeln!(out, "🔎 {} {}", hit.label.green(), hit.tooltip)?;
            }
            if let Some(focus) = report.focus {
                writeln!(out, "   Zoom to: {}", format_bounds(focus))?;
            }
        }
        writeln!(out)?;
    }

    if let Some(trend) = &report.trend {
        write_console_trend(out, trend)?;
    }
    Ok(())
}

fn write_console_trend(out: &mut impl Write, trend: &TrendSeries) -> Result<()> {
    writeln!(out, "{}", format!("📈 {}", trend.title).bright_green().bold())?;
    let peak = trend.peak().unwrap_or(0.0);
    for point in &trend.points {
        let width = if peak > 0.0 {
            (point.value / peak * 30.0).round()
        } else {
            0.0
        };
        let bar = "█".repeat(bar_width(width));
        writeln!(out, "   {} {:>10.2} {}", point.year, point.value, bar.green())?;
    }
    writeln!(out)?;
    Ok(())
}

pub fn generate_json_report(out: &mut impl Write, report: &MapReport) -> Result<()> {
    let json_output = serde_json::to_string_pretty(report)?;
    writeln!(out, "{json_output}")?;
    Ok(())
}

pub fn generate_markdown_report(out: &mut impl Write, report: &MapReport) -> Result<()> {
    writeln!(
        out,
        "# WMU Harvest: {} {} ({})\n",
        report.view.metric,
        report.view.year,
        report.mode_label()
    )?;

    writeln!(out, "## Summary\n")?;
    writeln!(out, "- **Column**: {}", report.column_label)?;
    writeln!(out, "- **Units with data**: {}", report.units.len())?;
    match report.range {
        Some((min, max)) => writeln!(out, "- **Range**: {min} to {max}")?,
        None => writeln!(out, "- **Range**: no positive values")?,
    }
    writeln!(out, "- **Years available**: {}\n", report.years.join(", "))?;

    writeln!(out, "## Distribution\n")?;
    writeln!(out, "| Bin | Units |")?;
    writeln!(out, "|-----|-------|")?;
    for bin in &report.histogram.bins {
        writeln!(out, "| {} | {} |", bin.label, bin.count)?;
    }
    writeln!(out)?;

    writeln!(out, "## Units\n")?;
    writeln!(out, "| WMU | Value | Fill |")?;
    writeln!(out, "|-----|-------|------|")?;
    for row in &report.units {
        let value = row
            .value
            .map_or_else(|| "n/a".to_string(), |v| format_value(v, report));
        writeln!(out, "| {} | {value} | `{}` |", row.unit_id, row.fill_color)?;
    }
    writeln!(out)?;

    if !report.search_hits.is_empty() {
        writeln!(out, "## Search: {}\n", report.view.search)?;
        for hit in &report.search_hits {
            writeln!(out, "- **{}**: {}", hit.label, hit.tooltip)?;
        }
        writeln!(out)?;
    }

    if let Some(trend) = &report.trend {
        writeln!(out, "## {}\n", trend.title)?;
        writeln!(out, "| {} | {} |", trend.x_label, trend.y_label)?;
        writeln!(out, "|------|------|")?;
        for point in &trend.points {
            writeln!(out, "| {} | {:.2} |", point.year, point.value)?;
        }
        writeln!(out)?;
    }
    Ok(())
}

/// Write the styled boundary layer as a GeoJSON feature collection.
pub fn generate_geojson_report(
    out: &mut impl Write,
    rendered: &RenderedMap,
    source: &FeatureCollection,
) -> Result<()> {
    let collection = rendered.to_feature_collection(source);
    serde_json::to_writer_pretty(&mut *out, &collection)?;
    writeln!(out)?;
    Ok(())
}

fn format_value(value: f64, report: &MapReport) -> String {
    if report.view.per_hunter {
        format!("{value:.2}")
    } else {
        format!("{value}")
    }
}

fn format_bounds(bounds: Bounds) -> String {
    format!(
        "[{:.4}, {:.4}] - [{:.4}, {:.4}]",
        bounds.west, bounds.south, bounds.east, bounds.north
    )
}

fn bar_width(width: f64) -> usize {
    num_traits::cast::<f64, usize>(width).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use harvestmap_core::{ExplorerConfig, HarvestTables, RecordTable, Species, ViewAction};
    use serde_json::Value;

    fn explorer() -> Explorer {
        let tables = HarvestTables::new().with_table(
            Species::Deer,
            RecordTable::from_records(vec![
                ["r", "65", "2024", "100", "10", "20", "30"].map(Value::from).to_vec(),
                ["r", "12", "2024", "50", "NULL", "5", "5"].map(Value::from).to_vec(),
                ["r", "65", "2023", "90", "8", "12", "20"].map(Value::from).to_vec(),
            ]),
        );
        Explorer::new(tables, ExplorerConfig::default()).unwrap()
    }

    fn render(report: &MapReport, format: &str) -> String {
        let mut buf = Vec::new();
        match format {
            "json" => generate_json_report(&mut buf, report).unwrap(),
            "markdown" => generate_markdown_report(&mut buf, report).unwrap(),
            _ => generate_console_report(&mut buf, report, true).unwrap(),
        }
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn report_rows_follow_selected_view() {
        let mut explorer = explorer();
        explorer.dispatch(ViewAction::SelectMetric(harvestmap_core::Metric::DeerDoe));
        let report = MapReport::build(&explorer, None, None);
        assert_eq!(report.column_label, "Antlerless");
        let nulls: Vec<_> = report.units.iter().filter(|row| row.value.is_none()).collect();
        assert_eq!(nulls.len(), 1);
        assert_eq!(nulls[0].fill_color, "#808080");
        assert_eq!(report.years, vec!["2024", "2023"]);
    }

    #[test]
    fn json_report_carries_view_and_trend() {
        let explorer = explorer();
        let trend = explorer.trend("65");
        let report = MapReport::build(&explorer, None, trend);
        let parsed: Value = serde_json::from_str(&render(&report, "json")).unwrap();
        assert_eq!(parsed["view"]["metric"], "deer-total");
        assert_eq!(parsed["trend"]["points"][0]["value"], 20.0);
        assert!(parsed.get("search_hits").is_none());
    }

    #[test]
    fn markdown_report_lists_units_and_bins() {
        let explorer = explorer();
        let report = MapReport::build(&explorer, None, explorer.trend("65"));
        let content = render(&report, "markdown");
        assert!(content.contains("# WMU Harvest: deer-total 2024 (harvest)"));
        assert!(content.contains("| 20-50 | 1 |"));
        assert!(content.contains("| 65 | 30 |"));
        assert!(content.contains("## WMU 65: Deer (Harvest)"));
    }

    #[test]
    fn console_report_shows_distribution_and_trend() {
        colored::control::set_override(false);
        let explorer = explorer();
        let report = MapReport::build(&explorer, None, explorer.trend("65"));
        let content = render(&report, "console");
        assert!(content.contains("Distribution"));
        assert!(content.contains("WMU 65: Deer (Harvest)"));
        assert!(content.contains("Range: 5 - 30"));
    }

    #[test]
    fn geojson_report_embeds_binding() {
        let explorer = explorer();
        let source = FeatureCollection::from_features(vec![harvestmap_core::Feature::labelled(
            "OFFICIAL_NAME",
            "WMU65",
            Value::Null,
        )]);
        let rendered = explorer.render(&source);
        let mut buf = Vec::new();
        generate_geojson_report(&mut buf, &rendered, &source).unwrap();
        let parsed: Value = serde_json::from_slice(&buf).unwrap();
        assert_eq!(parsed["type"], "FeatureCollection");
        assert_eq!(
            parsed["features"][0]["properties"]["harvest"]["tooltip"],
            "WMU 65: 30 deer harvested"
        );
    }
}
