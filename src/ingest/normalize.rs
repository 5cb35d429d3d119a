//! Column discovery and melting into the canonical long form.

use chrono::{DateTime, Duration, Timelike, Utc};
use tracing::{debug, warn};

use crate::core::{DatasetKind, EnergyRecord, EnergyTable};
use crate::ingest::{parse_timestamp, RawTable};

/// Substrings that mark an industrial energy column.
const INDUSTRIAL_MARKERS: [&str; 7] = ["kwh", "energy", "gas", "fuel", "therm", "liters", "mwh"];

/// Normalize a raw table into the canonical long form for `kind`.
///
/// Column discovery follows a fixed priority and never fails: ambiguities
/// resolve silently, and a table with no recognizable energy column degrades
/// to a zero-valued series. The timestamp column is the first whose name
/// contains "time" or "date"; without one, an hourly sequence ending at the
/// current time is synthesized. Rows whose timestamp cannot be parsed are
/// dropped after melting, so one bad cell never discards a whole upload.
pub fn normalize(raw: &RawTable, kind: DatasetKind) -> EnergyTable {
    let lower: Vec<String> = raw.headers().iter().map(|h| h.to_lowercase()).collect();
    let ts_index = lower
        .iter()
        .position(|h| h.contains("time") || h.contains("date"));
    match ts_index {
        Some(idx) => debug!(column = %raw.headers()[idx], "using timestamp column"),
        None => debug!("no timestamp column, synthesizing hourly sequence"),
    }
    let timestamps = row_timestamps(raw, ts_index);

    match kind {
        DatasetKind::Household => normalize_household(raw, &lower, ts_index, &timestamps),
        DatasetKind::Industrial => normalize_industrial(raw, &lower, ts_index, &timestamps),
    }
}

/// Per-row timestamps: parsed from the discovered column, or an hourly
/// sequence ending at the current time when the table has none.
fn row_timestamps(raw: &RawTable, ts_index: Option<usize>) -> Vec<Option<DateTime<Utc>>> {
    match ts_index {
        Some(idx) => raw
            .rows()
            .iter()
            .map(|row| parse_timestamp(&row[idx]))
            .collect(),
        None => {
            let now = Utc::now();
            let now = now.with_nanosecond(0).unwrap_or(now);
            let n = raw.row_count() as i64;
            (0..n)
                .map(|i| Some(now - Duration::hours(n - 1 - i)))
                .collect()
        }
    }
}

fn normalize_household(
    raw: &RawTable,
    lower: &[String],
    ts_index: Option<usize>,
    timestamps: &[Option<DateTime<Utc>>],
) -> EnergyTable {
    let mut table = EnergyTable::new(DatasetKind::Household);

    // Wide appliance columns: fridge_kwh, hvac_kwh, appliance_garage, ...
    // The literal `appliance` label column is not itself a series.
    let wide: Vec<(usize, String)> = raw
        .headers()
        .iter()
        .enumerate()
        .filter(|(i, _)| Some(*i) != ts_index)
        .filter_map(|(i, header)| {
            if let Some(stem) = strip_kwh_suffix(header) {
                Some((i, stem.to_string()))
            } else if lower[i].contains("appliance")
                && header != "appliances"
                && lower[i] != "appliance"
            {
                Some((i, header.clone()))
            } else {
                None
            }
        })
        .collect();

    if !wide.is_empty() {
        for (row_idx, row) in raw.rows().iter().enumerate() {
            let Some(ts) = timestamps[row_idx] else { continue };
            for (col, label) in &wide {
                table.push(EnergyRecord::new(
                    ts,
                    Some(label.clone()),
                    parse_value(&row[*col]),
                ));
            }
        }
        return table;
    }

    let energy: Vec<usize> = (0..raw.headers().len())
        .filter(|i| Some(*i) != ts_index)
        .filter(|&i| lower[i].contains("kwh") || lower[i].contains("energy"))
        .collect();
    let appliance_col = raw.headers().iter().position(|h| h == "appliance");

    // Long format: explicit appliance label plus one energy column.
    if let (Some(label_col), Some(&value_col)) = (appliance_col, energy.first()) {
        for (row_idx, row) in raw.rows().iter().enumerate() {
            let Some(ts) = timestamps[row_idx] else { continue };
            table.push(EnergyRecord::new(
                ts,
                Some(row[label_col].clone()),
                parse_value(&row[value_col]),
            ));
        }
        return table;
    }

    // Single unlabeled series.
    if let Some(&value_col) = energy.first() {
        for (row_idx, row) in raw.rows().iter().enumerate() {
            let Some(ts) = timestamps[row_idx] else { continue };
            table.push(EnergyRecord::new(ts, None, parse_value(&row[value_col])));
        }
        return table;
    }

    warn!("no energy column recognized, emitting zero series");
    for (row_idx, _) in raw.rows().iter().enumerate() {
        let Some(ts) = timestamps[row_idx] else { continue };
        table.push(EnergyRecord::new(ts, None, 0.0));
    }
    table
}

fn normalize_industrial(
    raw: &RawTable,
    lower: &[String],
    ts_index: Option<usize>,
    timestamps: &[Option<DateTime<Utc>>],
) -> EnergyTable {
    let mut table = EnergyTable::new(DatasetKind::Industrial);

    // Every energy-bearing column becomes its own type; the unit suffix
    // stays in the label (electricity_kwh, gas_therms, ...).
    let energy: Vec<usize> = (0..raw.headers().len())
        .filter(|i| Some(*i) != ts_index)
        .filter(|&i| INDUSTRIAL_MARKERS.iter().any(|m| lower[i].contains(m)))
        .collect();

    if energy.is_empty() {
        warn!("no energy column recognized, emitting zero series");
        for (row_idx, _) in raw.rows().iter().enumerate() {
            let Some(ts) = timestamps[row_idx] else { continue };
            table.push(EnergyRecord::new(ts, None, 0.0));
        }
        return table;
    }

    for (row_idx, row) in raw.rows().iter().enumerate() {
        let Some(ts) = timestamps[row_idx] else { continue };
        for &col in &energy {
            table.push(EnergyRecord::new(
                ts,
                Some(raw.headers()[col].clone()),
                parse_value(&row[col]),
            ));
        }
    }
    table
}

/// Numeric cell parsing; anything unparseable becomes NaN and is dropped
/// once a series is extracted.
fn parse_value(cell: &str) -> f64 {
    cell.trim().parse::<f64>().unwrap_or(f64::NAN)
}

/// Appliance stem of a `*_kwh` column name, any suffix casing.
fn strip_kwh_suffix(header: &str) -> Option<&str> {
    let cut = header.len().checked_sub(4)?;
    if header.is_char_boundary(cut) && header[cut..].eq_ignore_ascii_case("_kwh") {
        Some(&header[..cut])
    } else {
        None
    }
}
