//! Flat-file persistence of canonical tables.
//!
//! The normalized table round-trips through a delimited text file between
//! the upload phase and the analysis phases. Files are addressed through
//! explicit [`ArtifactHandle`]s handed from the normalizer to downstream
//! calls; nothing here scans or shares directory state. Existence checks
//! are the caller's job and nothing is retried.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::SecondsFormat;
use serde::{Deserialize, Serialize};

use crate::core::{DatasetKind, EnergyRecord, EnergyTable};
use crate::error::{EnergyError, Result};
use crate::ingest::parse_timestamp;

/// Write a canonical table as CSV.
///
/// The header shape encodes the schema: `timestamp,appliance,energy_kwh`,
/// `timestamp,energy_kwh`, `timestamp,energy_type,energy_value`, or
/// `timestamp,energy_value`. Timestamps are RFC 3339; values use the
/// shortest exact float representation, so a round trip is lossless.
pub fn write_table(path: &Path, table: &EnergyTable) -> Result<()> {
    let mut writer = csv::Writer::from_path(path).map_err(storage_err)?;
    let kind = table.kind();
    let with_category = table.has_categories();

    if with_category {
        writer
            .write_record([
                "timestamp",
                kind.category_column(),
                kind.value_column(),
            ])
            .map_err(storage_err)?;
    } else {
        writer
            .write_record(["timestamp", kind.value_column()])
            .map_err(storage_err)?;
    }

    for record in table.records() {
        let timestamp = record
            .timestamp
            .to_rfc3339_opts(SecondsFormat::Secs, true);
        let value = record.value.to_string();
        if with_category {
            let category = record.category.as_deref().unwrap_or("");
            writer
                .write_record([timestamp.as_str(), category, value.as_str()])
                .map_err(storage_err)?;
        } else {
            writer
                .write_record([timestamp.as_str(), value.as_str()])
                .map_err(storage_err)?;
        }
    }
    writer.flush().map_err(storage_err)
}

/// Read a canonical table back from CSV.
///
/// Only the four canonical header shapes are accepted; anything else is
/// [`EnergyError::NoEnergyColumn`]. Rows with unparseable timestamps are
/// dropped, unparseable values become NaN.
pub fn read_table(path: &Path) -> Result<EnergyTable> {
    let mut reader = csv::Reader::from_path(path).map_err(storage_err)?;
    let headers: Vec<String> = reader
        .headers()
        .map_err(storage_err)?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let position = |name: &str| headers.iter().position(|h| h == name);
    let ts_col = position("timestamp")
        .ok_or_else(|| EnergyError::Storage("missing timestamp column".to_string()))?;

    let (kind, category_col, value_col) =
        if let (Some(cat), Some(val)) = (position("appliance"), position("energy_kwh")) {
            (DatasetKind::Household, Some(cat), val)
        } else if let Some(val) = position("energy_kwh") {
            (DatasetKind::Household, None, val)
        } else if let (Some(cat), Some(val)) = (position("energy_type"), position("energy_value")) {
            (DatasetKind::Industrial, Some(cat), val)
        } else if let Some(val) = position("energy_value") {
            (DatasetKind::Industrial, None, val)
        } else {
            return Err(EnergyError::NoEnergyColumn);
        };

    let mut table = EnergyTable::new(kind);
    for record in reader.records() {
        let record = record.map_err(storage_err)?;
        let Some(timestamp) = record.get(ts_col).and_then(parse_timestamp) else {
            continue;
        };
        let category = category_col
            .and_then(|c| record.get(c))
            .filter(|c| !c.is_empty())
            .map(|c| c.to_string());
        let value = record
            .get(value_col)
            .and_then(|v| v.trim().parse::<f64>().ok())
            .unwrap_or(f64::NAN);
        table.push(EnergyRecord::new(timestamp, category, value));
    }
    Ok(table)
}

/// Opaque key addressing one persisted table within a store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactHandle(String);

impl ArtifactHandle {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// File name within the store.
    pub fn name(&self) -> &str {
        &self.0
    }
}

/// Directory-backed store for normalized tables.
pub struct ArtifactStore {
    root: PathBuf,
}

impl ArtifactStore {
    /// Open (creating if needed) a store rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root).map_err(storage_err)?;
        Ok(Self { root })
    }

    /// Persist a table under `<stem>_cleaned_<kind>.csv`.
    pub fn store(&self, stem: &str, table: &EnergyTable) -> Result<ArtifactHandle> {
        let stem: String = stem
            .chars()
            .map(|c| if matches!(c, '/' | '\\') { '_' } else { c })
            .collect();
        let name = format!("{stem}_cleaned_{}.csv", table.kind().as_str());
        write_table(&self.root.join(&name), table)?;
        Ok(ArtifactHandle(name))
    }

    /// Load a previously stored table.
    pub fn load(&self, handle: &ArtifactHandle) -> Result<EnergyTable> {
        read_table(&self.path(handle))
    }

    /// Filesystem path behind a handle.
    pub fn path(&self, handle: &ArtifactHandle) -> PathBuf {
        self.root.join(handle.name())
    }
}

fn storage_err(err: impl std::fmt::Display) -> EnergyError {
    EnergyError::Storage(err.to_string())
}
