//! GeoNames record shape
//!
//! One [`GeoRecord`] per line of the dump. Column order in the file, in
//! [`GEONAME_FIELDS`] and in the `city` table is identical.

use chrono::NaiveDate;

/// Number of tab-separated fields on every line
pub const FIELD_COUNT: usize = 19;

/// Field names in file order; also the `city` column names
pub const GEONAME_FIELDS: [&str; FIELD_COUNT] = [
    "geonameid",
    "name",
    "asciiname",
    "alternatenames",
    "latitude",
    "longitude",
    "feature_class",
    "feature_code",
    "country_code",
    "cc2",
    "admin1",
    "admin2",
    "admin3",
    "admin4",
    "population",
    "elevation",
    "dem",
    "timezone",
    "modification_date",
];

/// A populated place from the GeoNames dump
///
/// Values are kept as raw text; the store coerces numeric columns on insert.
/// An empty field in the file is `None`, never `Some("")`.
#[derive(Debug, Clone, PartialEq)]
pub struct GeoRecord {
    /// Integer id, primary key of `city`; the parser rejects lines without one
    pub geonameid: Option<String>,
    pub name: Option<String>,
    pub asciiname: Option<String>,
    /// Comma-separated alternate names, can be very long
    pub alternatenames: Option<String>,
    /// Decimal degrees (WGS84)
    pub latitude: Option<String>,
    pub longitude: Option<String>,
    /// Single letter class, e.g. "P" for populated place
    pub feature_class: Option<String>,
    pub feature_code: Option<String>,
    /// ISO-3166 2-letter code
    pub country_code: Option<String>,
    /// Alternate country codes, comma separated
    pub cc2: Option<String>,
    pub admin1: Option<String>,
    pub admin2: Option<String>,
    pub admin3: Option<String>,
    pub admin4: Option<String>,
    pub population: Option<String>,
    /// Metres
    pub elevation: Option<String>,
    /// Digital elevation model value, metres
    pub dem: Option<String>,
    /// IANA timezone id
    pub timezone: Option<String>,
    pub modification_date: NaiveDate,
}

impl GeoRecord {
    /// Build a record from the first 18 fields (already normalised to
    /// `None` when empty) and the parsed modification date.
    pub fn from_values(
        values: [Option<String>; FIELD_COUNT - 1],
        modification_date: NaiveDate,
    ) -> Self {
        let [
            geonameid,
            name,
            asciiname,
            alternatenames,
            latitude,
            longitude,
            feature_class,
            feature_code,
            country_code,
            cc2,
            admin1,
            admin2,
            admin3,
            admin4,
            population,
            elevation,
            dem,
            timezone,
        ] = values;

        Self {
            geonameid,
            name,
            asciiname,
            alternatenames,
            latitude,
            longitude,
            feature_class,
            feature_code,
            country_code,
            cc2,
            admin1,
            admin2,
            admin3,
            admin4,
            population,
            elevation,
            dem,
            timezone,
            modification_date,
        }
    }
}
