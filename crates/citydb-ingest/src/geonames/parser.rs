//! GeoNames dump parser
//!
//! Reads the tab-delimited `cities*.txt` dumps:
//! - UTF-8 text, no header line
//! - 19 fields per line, see [`GEONAME_FIELDS`](super::GEONAME_FIELDS)
//! - last field is the modification date, `YYYY-MM-DD`
//!
//! Fields are never quoted in the dump, so `"` is treated as data. The
//! `csv` reader grows its buffers on demand, so very long
//! `alternatenames` values need no field size limit.
//!
//! Every problem is fatal and stops the parse with the offending line
//! number: invalid UTF-8, a wrong field count, an empty `geonameid` or a bad
//! date.

use chrono::NaiveDate;
use csv::{ReaderBuilder, StringRecord};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info};

use super::models::{GeoRecord, FIELD_COUNT};
use super::{GeonamesError, Result, DATE_FORMAT};

/// All records of one dump, in file order
#[derive(Debug, Clone, Default)]
pub struct ParsedCities {
    pub records: Vec<GeoRecord>,
}

impl ParsedCities {
    /// Number of records parsed
    pub fn count(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Parser for GeoNames cities dumps
#[derive(Debug, Clone, Default)]
pub struct GeonamesParser;

impl GeonamesParser {
    pub fn new() -> Self {
        Self
    }

    /// Parse a dump file from disk
    pub fn parse_file(&self, path: impl AsRef<Path>) -> Result<ParsedCities> {
        let path = path.as_ref();
        debug!(path = %path.display(), "Opening GeoNames dump");

        let file = File::open(path)?;
        let parsed = self.parse_reader(file)?;

        info!(
            path = %path.display(),
            count = parsed.count(),
            "Parsed GeoNames dump"
        );
        Ok(parsed)
    }

    /// Parse a dump from any reader
    ///
    /// Blank lines are skipped.
    pub fn parse_reader<R: Read>(&self, reader: R) -> Result<ParsedCities> {
        let mut reader = ReaderBuilder::new()
            .delimiter(b'\t')
            .has_headers(false)
            .quoting(false)
            .flexible(true)
            .from_reader(reader);

        let mut records = Vec::new();
        let mut row = StringRecord::new();

        while reader.read_record(&mut row)? {
            let line = row.position().map(|p| p.line()).unwrap_or(0);
            let fields: Vec<&str> = row.iter().collect();
            records.push(build_record(&fields, line)?);
        }

        debug!("Read {} lines", records.len());
        Ok(ParsedCities { records })
    }

    /// Parse a single dump line
    ///
    /// A trailing line terminator is ignored.
    pub fn parse_line(&self, line: &str, line_num: u64) -> Result<GeoRecord> {
        let line = line.trim_end_matches(['\r', '\n']);
        let fields: Vec<&str> = line.split('\t').collect();
        build_record(&fields, line_num)
    }
}

fn build_record(fields: &[&str], line: u64) -> Result<GeoRecord> {
    if fields.len() != FIELD_COUNT {
        return Err(GeonamesError::malformed(
            line,
            format!(
                "expected {} tab-separated fields, got {}",
                FIELD_COUNT,
                fields.len()
            ),
        ));
    }

    // An INTEGER PRIMARY KEY column aliases the rowid, so a NULL id would be
    // replaced by a generated one instead of failing NOT NULL
    if fields[0].is_empty() {
        return Err(GeonamesError::malformed(line, "empty geonameid"));
    }

    let raw_date = fields[FIELD_COUNT - 1];
    let modification_date = NaiveDate::parse_from_str(raw_date, DATE_FORMAT).map_err(|e| {
        GeonamesError::malformed(line, format!("invalid modification_date '{}': {}", raw_date, e))
    })?;

    let values = std::array::from_fn(|i| absent_if_empty(fields[i]));
    Ok(GeoRecord::from_values(values, modification_date))
}

/// Empty strings become `None` so integer and float columns receive NULL
fn absent_if_empty(raw: &str) -> Option<String> {
    if raw.is_empty() {
        None
    } else {
        Some(raw.to_string())
    }
}
