mod assets;
mod reports;

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use std::fs::File;
use std::io::{BufWriter, Write, stdout};
use std::path::PathBuf;
use std::time::Instant;

use assets::{AssetDir, load_config};
use harvestmap_core::{Explorer, FeatureCollection, Metric, RenderedMap, ViewAction};
use reports::MapReport;

#[derive(Debug, Parser)]
#[command(name = "harvestmap", version = "0.1.0")]
#[command(
    about = "Ontario wildlife management unit harvest map - aggregates harvest tables and writes styled map layers"
)]
struct Args {
    /// Directory holding the harvest tables and boundary file
    #[arg(long, default_value = "assets")]
    data_dir: PathBuf,

    /// Optional explorer configuration (JSON)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Metric to map (deer-total, deer-doe, deer-buck, bear, turkey, moose, wolf)
    #[arg(long)]
    metric: Option<Metric>,

    /// Harvest year; defaults to the configured year
    #[arg(long)]
    year: Option<String>,

    /// Show harvest per active hunter instead of raw harvest
    #[arg(long)]
    per_hunter: bool,

    /// Highlight units matching this id (e.g. 15A matches WMU15A)
    #[arg(long)]
    search: Option<String>,

    /// Include the per-year trend for this unit id
    #[arg(long)]
    trend: Option<String>,

    /// List the years present in the harvest tables and exit
    #[arg(long)]
    list_years: bool,

    /// List all available metrics and exit
    #[arg(long)]
    list_metrics: bool,

    /// Output report format
    #[arg(long, default_value = "console")]
    #[arg(value_parser = ["console", "json", "markdown", "geojson"])]
    report: String,

    /// Optional path to write the report output instead of stdout
    #[arg(long)]
    output: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    /// Selection changes requested on the command line, in dispatch order.
    fn view_actions(&self) -> Vec<ViewAction> {
        let mut actions = Vec::new();
        if let Some(metric) = self.metric {
            actions.push(ViewAction::SelectMetric(metric));
        }
        if let Some(year) = &self.year {
            actions.push(ViewAction::SelectYear(year.trim().to_string()));
        }
        if self.per_hunter {
            actions.push(ViewAction::SetPerHunter(true));
        }
        if let Some(query) = &self.search {
            actions.push(ViewAction::Search(query.clone()));
        }
        actions
    }

    /// Whether the boundary layer has to be loaded and bound.
    fn needs_boundaries(&self) -> bool {
        self.report == "geojson" || self.search.is_some()
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    if maybe_list_metrics(&args)? {
        return Ok(());
    }

    let start_time = Instant::now();
    let config = load_config(args.config.as_deref()).await?;
    let asset_dir = AssetDir::new(&args.data_dir, config.assets.clone());
    let tables = asset_dir.load_tables().await?;

    if maybe_list_years(&args, &tables.years_descending())? {
        return Ok(());
    }

    if args.report == "console" {
        announce_banner();
    }

    let mut explorer = Explorer::new(tables, config)?;
    for action in args.view_actions() {
        explorer.dispatch(action);
    }
    if !explorer.tables().contains_year(&explorer.state().year) {
        log::warn!(
            "year {} is not present in the harvest tables",
            explorer.state().year
        );
    }

    let boundaries = if args.needs_boundaries() {
        Some(asset_dir.load_boundaries().await?)
    } else {
        None
    };
    let rendered = boundaries
        .as_ref()
        .map(|collection| explorer.render(collection));
    let trend = args.trend.as_deref().and_then(|unit| explorer.trend(unit));

    write_reports(
        &args,
        &explorer,
        rendered.as_ref().zip(boundaries.as_ref()),
        trend,
        start_time,
    )
}

fn maybe_list_metrics(args: &Args) -> Result<bool> {
    if !args.list_metrics {
        return Ok(false);
    }
    let mut output_target = OutputTarget::new(args.output.clone())?;
    writeln!(output_target.writer(), "Available metrics:")?;
    for metric in Metric::ALL {
        let spec = metric.spec();
        writeln!(
            output_target.writer(),
            "  {:12} - {} {} ({})",
            metric.key(),
            spec.species,
            spec.column_label.to_lowercase(),
            spec.display_name
        )?;
    }
    output_target.flush_inner()?;
    Ok(true)
}

fn maybe_list_years(args: &Args, years: &[String]) -> Result<bool> {
    if !args.list_years {
        return Ok(false);
    }
    let mut output_target = OutputTarget::new(args.output.clone())?;
    writeln!(output_target.writer(), "Available years:")?;
    for year in years {
        writeln!(output_target.writer(), "  {year}")?;
    }
    output_target.flush_inner()?;
    Ok(true)
}

fn announce_banner() {
    println!("{}", "🦌 Ontario WMU Harvest Map".bright_cyan().bold());
    println!("{}", "================================".cyan());
}

fn write_reports(
    args: &Args,
    explorer: &Explorer,
    layer: Option<(&RenderedMap, &FeatureCollection)>,
    trend: Option<harvestmap_core::TrendSeries>,
    start_time: Instant,
) -> Result<()> {
    let mut output_target = OutputTarget::new(args.output.clone())?;
    let report = MapReport::build(explorer, layer.map(|(rendered, _)| rendered), trend);

    match args.report.as_str() {
        "json" => reports::generate_json_report(&mut output_target, &report)?,
        "markdown" => reports::generate_markdown_report(&mut output_target, &report)?,
        "geojson" => {
            let (rendered, source) = layer.context("boundary layer was not loaded")?;
            reports::generate_geojson_report(&mut output_target, rendered, source)?;
        }
        _ => {
            reports::generate_console_report(&mut output_target, &report, args.verbose)?;
            let duration = start_time.elapsed();
            writeln!(&mut output_target, "🏁 Total time: {duration:?}")?;
        }
    }

    output_target.flush_inner()?;
    Ok(())
}

enum OutputTarget {
    Stdout(BufWriter<std::io::Stdout>),
    File(BufWriter<File>),
}

impl OutputTarget {
    fn new(path: Option<PathBuf>) -> Result<Self> {
        if let Some(path) = path {
            let file = File::create(&path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            Ok(Self::File(BufWriter::new(file)))
        } else {
            Ok(Self::Stdout(BufWriter::new(stdout())))
        }
    }

    fn writer(&mut self) -> &mut dyn Write {
        match self {
            Self::Stdout(w) => w,
            Self::File(w) => w,
        }
    }

    fn flush_inner(&mut self) -> std::io::Result<()> {
        match self {
            Self::Stdout(w) => w.flush(),
            Self::File(w) => w.flush(),
        }
    }
}

impl Write for OutputTarget {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.writer().write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.flush_inner()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use harvestmap_core::{AssetConfig, ExplorerConfig};
    use std::path::Path;

    fn base_args() -> Args {
        Args {
            data_dir: Path::new(env!("CARGO_MANIFEST_DIR")).join("../assets"),
            config: None,
            metric: None,
            year: None,
            per_hunter: false,
            search: None,
            trend: None,
            list_years: false,
            list_metrics: false,
            report: "json".to_string(),
            output: None,
            verbose: false,
        }
    }

    fn sample_explorer(args: &Args) -> Explorer {
        let dir = AssetDir::new(&args.data_dir, AssetConfig::default());
        let tables = tokio_test::block_on(dir.load_tables()).unwrap();
        let mut explorer = Explorer::new(tables, ExplorerConfig::default()).unwrap();
        for action in args.view_actions() {
            explorer.dispatch(action);
        }
        explorer
    }

    #[test]
    fn flags_become_view_actions_in_order() {
        let args = Args {
            metric: Some(Metric::Moose),
            year: Some(" 2023 ".to_string()),
            per_hunter: true,
            search: Some("12a".to_string()),
            ..base_args()
        };
        assert_eq!(
            args.view_actions(),
            vec![
                ViewAction::SelectMetric(Metric::Moose),
                ViewAction::SelectYear("2023".to_string()),
                ViewAction::SetPerHunter(true),
                ViewAction::Search("12a".to_string()),
            ]
        );
        assert!(args.needs_boundaries());
        assert!(base_args().view_actions().is_empty());
        assert!(!base_args().needs_boundaries());
    }

    #[test]
    fn parses_metric_flag() {
        let args = Args::try_parse_from(["harvestmap", "--metric", "Deer-Doe", "--per-hunter"])
            .unwrap();
        assert_eq!(args.metric, Some(Metric::DeerDoe));
        assert!(args.per_hunter);
        assert!(Args::try_parse_from(["harvestmap", "--metric", "elk"]).is_err());
        assert!(Args::try_parse_from(["harvestmap", "--report", "csv"]).is_err());
    }

    #[test]
    fn maybe_list_metrics_writes_output() {
        let temp = std::env::temp_dir().join("harvestmap-metrics.txt");
        let args = Args {
            list_metrics: true,
            output: Some(temp.clone()),
            ..base_args()
        };
        assert!(maybe_list_metrics(&args).unwrap());
        let content = std::fs::read_to_string(temp).unwrap();
        assert!(content.contains("Available metrics"));
        assert!(content.contains("deer-doe"));
        assert!(content.contains("wolves/coyotes"));
    }

    #[test]
    fn maybe_list_years_returns_false_when_disabled() {
        assert!(!maybe_list_years(&base_args(), &[]).unwrap());
    }

    #[test]
    fn write_reports_emits_json_output() {
        let temp = std::env::temp_dir().join("harvestmap-report.json");
        let args = Args {
            output: Some(temp.clone()),
            trend: Some("65".to_string()),
            ..base_args()
        };
        let explorer = sample_explorer(&args);
        let trend = explorer.trend("65");
        write_reports(&args, &explorer, None, trend, Instant::now()).unwrap();
        let content = std::fs::read_to_string(temp).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&content).unwrap();
        assert_eq!(parsed["view"]["year"], "2024");
        assert_eq!(parsed["trend"]["title"], "WMU 65: Deer (Harvest)");
    }

    #[test]
    fn write_reports_emits_geojson_layer() {
        let temp = std::env::temp_dir().join("harvestmap-layer.geojson");
        let args = Args {
            report: "geojson".to_string(),
            output: Some(temp.clone()),
            ..base_args()
        };
        let explorer = sample_explorer(&args);
        let dir = AssetDir::new(&args.data_dir, AssetConfig::default());
        let boundaries = tokio_test::block_on(dir.load_boundaries()).unwrap();
        let rendered = explorer.render(&boundaries);
        write_reports(
            &args,
            &explorer,
            Some((&rendered, &boundaries)),
            None,
            Instant::now(),
        )
        .unwrap();
        let content = std::fs::read_to_string(temp).unwrap();
        assert!(content.contains("\"FeatureCollection\""));
        assert!(content.contains("fillColor"));
    }

    #[test]
    fn geojson_without_layer_is_an_error() {
        let args = Args {
            report: "geojson".to_string(),
            output: Some(std::env::temp_dir().join("harvestmap-missing-layer.geojson")),
            ..base_args()
        };
        let explorer = sample_explorer(&args);
        assert!(write_reports(&args, &explorer, None, None, Instant::now()).is_err());
    }

    #[test]
    fn write_reports_console_with_search() {
        let temp = std::env::temp_dir().join("harvestmap-report.txt");
        let args = Args {
            report: "console".to_string(),
            search: Some("99".to_string()),
            output: Some(temp.clone()),
            ..base_args()
        };
        let explorer = sample_explorer(&args);
        let dir = AssetDir::new(&args.data_dir, AssetConfig::default());
        let boundaries = tokio_test::block_on(dir.load_boundaries()).unwrap();
        let rendered = explorer.render(&boundaries);
        write_reports(
            &args,
            &explorer,
            Some((&rendered, &boundaries)),
            None,
            Instant::now(),
        )
        .unwrap();
        let content = std::fs::read_to_string(temp).unwrap();
        assert!(content.contains("WMU99"));
        assert!(content.contains("Harvest data not available for 2024"));
        assert!(content.contains("Total time"));
    }

    #[test]
    fn output_target_stdout_writes() {
        let mut target = OutputTarget::new(None).unwrap();
        target.write_all(b"ok").unwrap();
        target.flush().unwrap();
    }
}
