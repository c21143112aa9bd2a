//! Station name tables.
//!
//! Decoders record stations as numeric codes within a named system. Names
//! are resolved through a [`StationLookup`] supplied with the session, so
//! the same decoded data can be presented against different databases.

use alloc::collections::BTreeMap;
use alloc::string::String;

#[cfg(feature = "serde")]
use serde::Serialize;

/// A named stop or station.
#[cfg_attr(feature = "serde", derive(Serialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Station {
    pub name: String,
    pub short_name: Option<String>,
    pub line: Option<String>,
}

impl Station {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            short_name: None,
            line: None,
        }
    }
}

/// A source of station names.
pub trait StationLookup: Send + Sync {
    /// Find a station by code. `None` means the station is unknown.
    fn lookup(&self, system: &str, code: u32) -> Option<Station>;
}

/// A lookup knowing no stations at all.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoStations;

impl StationLookup for NoStations {
    fn lookup(&self, _system: &str, _code: u32) -> Option<Station> {
        None
    }
}

/// An in-memory station table, keyed by system and code.
#[derive(Debug, Clone, Default)]
pub struct StationTable {
    systems: BTreeMap<String, BTreeMap<u32, Station>>,
}

impl StationTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, system: &str, code: u32, station: Station) {
        self.systems
            .entry(system.into())
            .or_default()
            .insert(code, station);
    }

    pub fn len(&self) -> usize {
        self.systems.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Load stations for `system` from CSV with a header row.
    ///
    /// Columns are `code,name[,short_name[,line]]`; codes may be decimal or
    /// `0x`-prefixed hexadecimal. Rows with an unreadable code are skipped.
    /// Returns the number of stations loaded.
    #[cfg(feature = "std")]
    pub fn read_csv<R: std::io::Read>(&mut self, system: &str, reader: R) -> Result<usize, csv::Error> {
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let mut count = 0;

        for record in reader.records() {
            let record = record?;

            let (Some(code), Some(name)) = (record.get(0).and_then(parse_code), record.get(1)) else {
                log::warn!("Skipping unreadable station row {:?}.", record.position());
                continue;
            };

            let optional = |i| record.get(i).filter(|s: &&str| !s.is_empty()).map(String::from);

            let station = Station {
                name: name.into(),
                short_name: optional(2),
                line: optional(3),
            };

            self.insert(system, code, station);
            count += 1;
        }

        Ok(count)
    }
}

#[cfg(feature = "std")]
fn parse_code(field: &str) -> Option<u32> {
    match field.strip_prefix("0x") {
        Some(hex) => u32::from_str_radix(hex, 16).ok(),
        None => field.parse().ok(),
    }
}

impl StationLookup for StationTable {
    fn lookup(&self, system: &str, code: u32) -> Option<Station> {
        self.systems.get(system)?.get(&code).cloned()
    }
}
