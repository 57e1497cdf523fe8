use anyhow::{Context, Result};
use harvestmap_core::{
    AssetConfig, ExplorerConfig, FeatureCollection, HarvestTables, RecordTable, Species,
};
use std::path::{Path, PathBuf};

/// Static asset files under one data directory.
#[derive(Debug, Clone)]
pub struct AssetDir {
    root: PathBuf,
    config: AssetConfig,
}

impl AssetDir {
    pub fn new(root: impl Into<PathBuf>, config: AssetConfig) -> Self {
        Self {
            root: root.into(),
            config,
        }
    }

    pub fn table_path(&self, species: Species) -> PathBuf {
        self.root.join(self.config.table_file(species))
    }

    pub fn boundaries_path(&self) -> PathBuf {
        self.root.join(&self.config.boundaries)
    }

    /// Fetch every species table concurrently; any failure aborts the whole load.
    pub async fn load_tables(&self) -> Result<HarvestTables> {
        let (deer, bear, turkey, moose, wolf) = tokio::try_join!(
            read_table(self.table_path(Species::Deer)),
            read_table(self.table_path(Species::Bear)),
            read_table(self.table_path(Species::Turkey)),
            read_table(self.table_path(Species::Moose)),
            read_table(self.table_path(Species::Wolf)),
        )
        .context("Failed to load harvest data")?;

        let tables = HarvestTables::new()
            .with_table(Species::Deer, deer)
            .with_table(Species::Bear, bear)
            .with_table(Species::Turkey, turkey)
            .with_table(Species::Moose, moose)
            .with_table(Species::Wolf, wolf);
        log::info!(
            "loaded harvest tables from {} covering {} years",
            self.root.display(),
            tables.available_years().len()
        );
        Ok(tables)
    }

    pub async fn load_boundaries(&self) -> Result<FeatureCollection> {
        let collection = read_boundaries(self.boundaries_path())
            .await
            .context("Failed to load WMU boundaries")?;
        log::info!("loaded {} boundary features", collection.features.len());
        Ok(collection)
    }
}

/// Read the explorer configuration, or the defaults when no file is given.
pub async fn load_config(path: Option<&Path>) -> Result<ExplorerConfig> {
    let Some(path) = path else {
        return Ok(ExplorerConfig::default());
    };
    let text = read_text(path).await?;
    ExplorerConfig::from_json(&text)
        .with_context(|| format!("invalid configuration in {}", path.display()))
}

async fn read_table(path: PathBuf) -> Result<RecordTable> {
    let text = read_text(&path).await?;
    let table = RecordTable::from_json(&text)
        .with_context(|| format!("failed to parse {}", path.display()))?;
    log::debug!("{}: {} records", path.display(), table.len());
    Ok(table)
}

async fn read_boundaries(path: PathBuf) -> Result<FeatureCollection> {
    let text = read_text(&path).await?;
    FeatureCollection::from_json(&text)
        .with_context(|| format!("failed to parse {}", path.display()))
}

async fn read_text(path: &Path) -> Result<String> {
    tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("failed to read {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_dir() -> AssetDir {
        AssetDir::new(
            Path::new(env!("CARGO_MANIFEST_DIR")).join("../assets"),
            AssetConfig::default(),
        )
    }

    #[test]
    fn loads_sample_tables_concurrently() {
        let tables = tokio_test::block_on(sample_dir().load_tables()).unwrap();
        for species in Species::ALL {
            assert!(tables.table(species).is_some_and(|table| !table.is_empty()));
        }
        assert_eq!(tables.years_descending(), vec!["2024", "2023", "2022"]);
    }

    #[test]
    fn loads_sample_boundaries() {
        let collection = tokio_test::block_on(sample_dir().load_boundaries()).unwrap();
        assert_eq!(collection.features.len(), 6);
    }

    #[test]
    fn missing_table_reports_generic_message() {
        let mut config = AssetConfig::default();
        config
            .tables
            .insert(Species::Wolf, "no-such-table.json".to_string());
        let dir = AssetDir::new(Path::new(env!("CARGO_MANIFEST_DIR")).join("../assets"), config);
        let err = tokio_test::block_on(dir.load_tables()).unwrap_err();
        assert_eq!(err.to_string(), "Failed to load harvest data");
        assert!(format!("{err:#}").contains("no-such-table.json"));
    }

    #[test]
    fn missing_boundaries_report_generic_message() {
        let dir = AssetDir::new(std::env::temp_dir().join("harvestmap-empty"), AssetConfig::default());
        let err = tokio_test::block_on(dir.load_boundaries()).unwrap_err();
        assert_eq!(err.to_string(), "Failed to load WMU boundaries");
    }

    #[test]
    fn config_defaults_without_file() {
        let cfg = tokio_test::block_on(load_config(None)).unwrap();
        assert_eq!(cfg, ExplorerConfig::default());
    }
}
