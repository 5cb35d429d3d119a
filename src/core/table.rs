//! Canonical long-form energy table.

use std::collections::BTreeMap;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::EnergySeries;
use crate::error::EnergyError;

/// Which canonical schema a table follows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatasetKind {
    /// Appliance-level household data: `timestamp, appliance, energy_kwh`.
    Household,
    /// Multi-energy-type industrial data: `timestamp, energy_type, energy_value`.
    Industrial,
}

impl DatasetKind {
    /// Canonical name of the category column.
    pub fn category_column(&self) -> &'static str {
        match self {
            DatasetKind::Household => "appliance",
            DatasetKind::Industrial => "energy_type",
        }
    }

    /// Canonical name of the value column.
    pub fn value_column(&self) -> &'static str {
        match self {
            DatasetKind::Household => "energy_kwh",
            DatasetKind::Industrial => "energy_value",
        }
    }

    /// Lowercase label, used in artifact file names.
    pub fn as_str(&self) -> &'static str {
        match self {
            DatasetKind::Household => "household",
            DatasetKind::Industrial => "industrial",
        }
    }
}

impl FromStr for DatasetKind {
    type Err = EnergyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "household" => Ok(DatasetKind::Household),
            "industrial" => Ok(DatasetKind::Industrial),
            other => Err(EnergyError::InvalidParameter(format!(
                "unknown dataset kind '{other}'"
            ))),
        }
    }
}

/// One long-form observation: (timestamp, optional category, value).
///
/// `category` is the appliance or energy-type label; tables normalized from
/// a single unlabeled series carry `None`. `value` may be NaN only until a
/// series is extracted from the table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnergyRecord {
    pub timestamp: DateTime<Utc>,
    pub category: Option<String>,
    pub value: f64,
}

impl EnergyRecord {
    pub fn new(timestamp: DateTime<Utc>, category: Option<String>, value: f64) -> Self {
        Self {
            timestamp,
            category,
            value,
        }
    }
}

/// Canonical long-form table: each row is one (timestamp, category, value)
/// observation of the schema given by [`DatasetKind`].
#[derive(Debug, Clone, PartialEq)]
pub struct EnergyTable {
    kind: DatasetKind,
    records: Vec<EnergyRecord>,
}

impl EnergyTable {
    /// Create an empty table of the given kind.
    pub fn new(kind: DatasetKind) -> Self {
        Self {
            kind,
            records: Vec::new(),
        }
    }

    /// Create a table from existing records.
    pub fn from_records(kind: DatasetKind, records: Vec<EnergyRecord>) -> Self {
        Self { kind, records }
    }

    /// Append one observation.
    pub fn push(&mut self, record: EnergyRecord) {
        self.records.push(record);
    }

    /// Schema kind of this table.
    pub fn kind(&self) -> DatasetKind {
        self.kind
    }

    /// All observations, in insertion order.
    pub fn records(&self) -> &[EnergyRecord] {
        &self.records
    }

    /// Number of observations.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Check if the table is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Whether any observation carries a category label.
    pub fn has_categories(&self) -> bool {
        self.records.iter().any(|r| r.category.is_some())
    }

    /// Distinct category labels in first-appearance order.
    pub fn categories(&self) -> Vec<String> {
        let mut seen = Vec::new();
        for record in &self.records {
            if let Some(cat) = &record.category {
                if !seen.iter().any(|s: &String| s == cat) {
                    seen.push(cat.clone());
                }
            }
        }
        seen
    }

    /// Observations belonging to one category.
    pub fn category_records(&self, category: &str) -> Vec<&EnergyRecord> {
        self.records
            .iter()
            .filter(|r| r.category.as_deref() == Some(category))
            .collect()
    }

    /// Extract the whole table as one series (sorted, NaN dropped).
    pub fn series(&self) -> EnergySeries {
        EnergySeries::from_points(self.records.iter().map(|r| (r.timestamp, r.value)).collect())
    }

    /// Extract one category's observations as a series.
    pub fn category_series(&self, category: &str) -> EnergySeries {
        EnergySeries::from_points(
            self.records
                .iter()
                .filter(|r| r.category.as_deref() == Some(category))
                .map(|r| (r.timestamp, r.value))
                .collect(),
        )
    }

    /// Sum values across categories per timestamp, skipping NaN.
    ///
    /// A timestamp whose values are all NaN still contributes a zero row.
    pub fn aggregated_series(&self) -> EnergySeries {
        let mut sums: BTreeMap<DateTime<Utc>, f64> = BTreeMap::new();
        for record in &self.records {
            let slot = sums.entry(record.timestamp).or_insert(0.0);
            if !record.value.is_nan() {
                *slot += record.value;
            }
        }
        EnergySeries::from_points(sums.into_iter().collect())
    }

    /// Total of all finite values in the table.
    pub fn total_value(&self) -> f64 {
        self.records
            .iter()
            .map(|r| r.value)
            .filter(|v| !v.is_nan())
            .sum()
    }
}
