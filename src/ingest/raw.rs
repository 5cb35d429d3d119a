//! Raw delimited-text table parsing.
//!
//! Uploads arrive as loosely formatted CSV-like text: the delimiter is
//! unknown, rows may be ragged, and the encoding is not guaranteed to be
//! UTF-8. Parsing sniffs the delimiter and squares rows off against the
//! header, leaving all cells as strings for the normalizer to interpret.

use crate::error::{EnergyError, Result};

const CANDIDATE_DELIMITERS: [u8; 3] = [b',', b';', b'\t'];

/// An untyped table: trimmed header names plus string cells.
#[derive(Debug, Clone, PartialEq)]
pub struct RawTable {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl RawTable {
    /// Parse delimited text, trying `,`, `;`, and tab in that order.
    ///
    /// The first delimiter that produces at least two columns wins; if none
    /// does, the input is read as single-column comma-separated text.
    pub fn from_str(text: &str) -> Result<Self> {
        for delimiter in CANDIDATE_DELIMITERS {
            if let Ok(table) = Self::parse_with(text, delimiter) {
                if table.headers.len() >= 2 {
                    return Ok(table);
                }
            }
        }
        Self::parse_with(text, b',')
    }

    /// Parse raw bytes, decoding UTF-8 first and falling back to Latin-1.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        match std::str::from_utf8(bytes) {
            Ok(text) => Self::from_str(text),
            Err(_) => {
                let text: String = bytes.iter().map(|&b| b as char).collect();
                Self::from_str(&text)
            }
        }
    }

    fn parse_with(text: &str, delimiter: u8) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(delimiter)
            .flexible(true)
            .from_reader(text.as_bytes());

        let headers: Vec<String> = reader
            .headers()
            .map_err(|e| EnergyError::InputFormat(e.to_string()))?
            .iter()
            .map(|h| h.trim().to_string())
            .collect();
        if headers.is_empty() || headers.iter().all(|h| h.is_empty()) {
            return Err(EnergyError::InputFormat("empty input".to_string()));
        }

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record.map_err(|e| EnergyError::InputFormat(e.to_string()))?;
            let mut row: Vec<String> = record.iter().map(|c| c.to_string()).collect();
            // Square ragged rows off against the header.
            row.resize(headers.len(), String::new());
            rows.push(row);
        }

        Ok(Self { headers, rows })
    }

    /// Trimmed header names.
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// Data rows, each exactly `headers().len()` cells wide.
    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    /// Number of data rows.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Cell accessor.
    pub fn cell(&self, row: usize, column: usize) -> &str {
        &self.rows[row][column]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_comma_separated() {
        let table = RawTable::from_str("timestamp,fridge_kwh\n2024-01-01 00:00:00,1.5\n").unwrap();

        assert_eq!(table.headers(), &["timestamp", "fridge_kwh"]);
        assert_eq!(table.row_count(), 1);
        assert_eq!(table.cell(0, 1), "1.5");
    }

    #[test]
    fn sniffs_semicolon_delimiter() {
        let table = RawTable::from_str("timestamp;fridge_kwh\n2024-01-01;1.5\n").unwrap();

        assert_eq!(table.headers(), &["timestamp", "fridge_kwh"]);
        assert_eq!(table.cell(0, 0), "2024-01-01");
    }

    #[test]
    fn sniffs_tab_delimiter() {
        let table = RawTable::from_str("timestamp\tfridge_kwh\n2024-01-01\t1.5\n").unwrap();

        assert_eq!(table.headers(), &["timestamp", "fridge_kwh"]);
    }

    #[test]
    fn single_column_falls_back_to_comma() {
        let table = RawTable::from_str("reading\n1.0\n2.0\n").unwrap();

        assert_eq!(table.headers(), &["reading"]);
        assert_eq!(table.row_count(), 2);
    }

    #[test]
    fn trims_header_whitespace() {
        let table = RawTable::from_str(" timestamp , fridge_kwh \n2024-01-01,1.0\n").unwrap();

        assert_eq!(table.headers(), &["timestamp", "fridge_kwh"]);
    }

    #[test]
    fn pads_ragged_rows() {
        let table = RawTable::from_str("timestamp,a,b\n2024-01-01,1.0\n").unwrap();

        assert_eq!(table.rows()[0], vec!["2024-01-01", "1.0", ""]);
    }

    #[test]
    fn empty_input_is_an_error() {
        assert!(matches!(
            RawTable::from_str(""),
            Err(EnergyError::InputFormat(_))
        ));
    }

    #[test]
    fn latin1_bytes_decode() {
        // "température,kwh" with a Latin-1 encoded 'é' (0xE9).
        let bytes = b"temp\xe9rature,kwh\n2024-01-01,1.0\n";
        let table = RawTable::from_bytes(bytes).unwrap();

        assert_eq!(table.headers()[0], "température");
    }
}
