use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::borrow::Cow;
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};

use crate::metric::{Species, YEAR_COLUMN};
use crate::numbers::parse_leading_int;

/// One row of a published harvest table. Column meaning depends on the species.
pub type Record = Vec<Value>;

/// A species harvest table as published: `{ "records": [[...], ...] }`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct RecordTable {
    #[serde(default)]
    pub records: Vec<Record>,
}

impl RecordTable {
    /// Create an empty table (useful for tests)
    #[must_use]
    pub fn empty() -> Self {
        Self {
            records: Vec::new(),
        }
    }

    /// Load a table from JSON string
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON cannot be parsed into a record table.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    #[must_use]
    pub fn from_records(records: Vec<Record>) -> Self {
        Self { records }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Year strings of every record, duplicates included.
    pub fn years(&self) -> impl Iterator<Item = Cow<'_, str>> {
        self.records
            .iter()
            .filter_map(|record| field_text(record, YEAR_COLUMN))
    }
}

/// Text form of a record field, or `None` when the record is too short.
///
/// Strings pass through; numbers print without a trailing `.0`; other scalars
/// are spelled out so comparisons against year strings behave predictably.
#[must_use]
pub fn field_text(record: &[Value], index: usize) -> Option<Cow<'_, str>> {
    let value = record.get(index)?;
    Some(match value {
        Value::String(text) => Cow::Borrowed(text.as_str()),
        Value::Number(number) => Cow::Owned(number_text(number)),
        Value::Bool(flag) => Cow::Borrowed(if *flag { "true" } else { "false" }),
        Value::Null => Cow::Borrowed("null"),
        Value::Array(_) | Value::Object(_) => Cow::Owned(value.to_string()),
    })
}

fn number_text(number: &serde_json::Number) -> String {
    if let Some(int) = number.as_i64() {
        int.to_string()
    } else if let Some(uint) = number.as_u64() {
        uint.to_string()
    } else {
        number.as_f64().map_or_else(String::new, |float| float.to_string())
    }
}

/// Numeric value of a record field; missing or non-numeric fields read as NaN.
#[must_use]
pub fn field_number(record: &[Value], index: usize) -> f64 {
    field_text(record, index).map_or(f64::NAN, |text| parse_leading_int(&text))
}

/// Raw tables for every loaded species plus the distinct years they cover.
#[derive(Debug, Clone, Default)]
pub struct HarvestTables {
    tables: BTreeMap<Species, RecordTable>,
    years: BTreeSet<String>,
}

impl HarvestTables {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a species table and fold its years into the year set.
    pub fn insert(&mut self, species: Species, table: RecordTable) {
        self.years
            .extend(table.years().map(std::borrow::Cow::into_owned));
        self.tables.insert(species, table);
    }

    #[must_use]
    pub fn with_table(mut self, species: Species, table: RecordTable) -> Self {
        self.insert(species, table);
        self
    }

    #[must_use]
    pub fn table(&self, species: Species) -> Option<&RecordTable> {
        self.tables.get(&species)
    }

    /// Every year seen across all tables, in ascending string order.
    #[must_use]
    pub const fn available_years(&self) -> &BTreeSet<String> {
        &self.years
    }

    /// Years newest first, compared numerically.
    #[must_use]
    pub fn years_descending(&self) -> Vec<String> {
        let mut years: Vec<String> = self.years.iter().cloned().collect();
        years.sort_by(|a, b| compare_years_desc(a, b));
        years
    }

    #[must_use]
    pub fn contains_year(&self, year: &str) -> bool {
        self.years.contains(year)
    }
}

fn compare_years_desc(a: &str, b: &str) -> Ordering {
    let left = parse_leading_int(a);
    let right = parse_leading_int(b);
    match right.partial_cmp(&left) {
        Some(Ordering::Equal) | None => b.cmp(a),
        Some(order) => order,
    }
}
