//! Parsing of `YYYYMMDD_description.sql` migration filenames.

use std::cmp::Ordering;
use std::fmt;

use jiff::civil::Date;

use crate::error::{Result, StoreError};

/// Required extension of every migration script.
const MIGRATION_EXTENSION: &str = ".sql";

/// Number of digits in the date prefix.
const DATE_PREFIX_LEN: usize = 8;

/// A validated migration filename together with its embedded date.
///
/// Ordering is by full filename, which sorts by date first and breaks
/// same-date ties by description.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MigrationName {
    filename: String,
    date: Date,
}

impl MigrationName {
    /// Parses `filename`, rejecting anything that is not
    /// `<8-digit-date>_<description>.sql` with a real calendar date.
    pub fn parse(filename: &str) -> Result<Self> {
        let invalid = |reason: &str| {
            StoreError::invalid_input("migration").with_reason(format!("'{filename}' {reason}"))
        };

        let stem = filename
            .strip_suffix(MIGRATION_EXTENSION)
            .ok_or_else(|| invalid("does not end in .sql"))?;

        let (prefix, description) = stem
            .split_once('_')
            .ok_or_else(|| invalid("has no '_' after the date prefix"))?;

        if prefix.len() != DATE_PREFIX_LEN || !prefix.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid("must start with an 8-digit date"));
        }
        if description.is_empty() {
            return Err(invalid("has an empty description"));
        }

        let number = |range: std::ops::Range<usize>| {
            prefix[range]
                .parse::<i16>()
                .map_err(|_| invalid("has a malformed date prefix"))
        };
        let (year, month, day) = (number(0..4)?, number(4..6)?, number(6..8)?);

        let month = i8::try_from(month).map_err(|_| invalid("has an out-of-range month"))?;
        let day = i8::try_from(day).map_err(|_| invalid("has an out-of-range day"))?;
        let date =
            Date::new(year, month, day).map_err(|_| invalid("is not dated on a calendar day"))?;

        Ok(Self {
            filename: filename.to_string(),
            date,
        })
    }

    /// Whether `filename` would parse.
    pub fn is_valid(filename: &str) -> bool {
        Self::parse(filename).is_ok()
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub fn date(&self) -> Date {
        self.date
    }
}

impl Ord for MigrationName {
    fn cmp(&self, other: &Self) -> Ordering {
        self.filename.cmp(&other.filename)
    }
}

impl PartialOrd for MigrationName {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for MigrationName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.filename)
    }
}
