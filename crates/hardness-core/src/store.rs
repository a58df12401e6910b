//! Reference data loaded from the offline-compiled JSON files.
//!
//! Two files feed the store:
//!
//! - the hardness file, a JSON object mapping postal code to
//!   `{ "ppm": number | null, "city": string }`
//! - the city file, a JSON object mapping postal code to city name
//!
//! Both objects are read in file order and that order is kept. The
//! same-city tier breaks ties by first occurrence and the any-record tier
//! returns the first truthy reading, so the order of the source files is
//! part of the observable behavior.

use std::collections::HashMap;
use std::fmt;
use std::marker::PhantomData;
use std::path::Path;

use serde::de::{Deserialize, Deserializer, MapAccess, Visitor};

/// Errors that can occur while loading the reference data.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A reference file could not be read from disk.
    #[error("failed to read {path}: {source}")]
    Io {
        /// Path of the file that failed to load.
        path: String,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// A reference file is not the expected JSON shape.
    #[error("failed to parse {what}: {source}")]
    Json {
        /// Which of the two reference files was being parsed.
        what: &'static str,
        /// The underlying JSON error.
        source: serde_json::Error,
    },

    /// A record carries a reading that is negative or not finite.
    #[error("invalid ppm {ppm} for postal code {postal_code}")]
    InvalidReading {
        /// Postal code of the offending record.
        postal_code: String,
        /// The rejected reading.
        ppm: f64,
    },

    /// No record carries a reading, so population statistics are undefined.
    #[error("hardness data contains no non-null ppm readings")]
    EmptyPopulation,
}

/// A single hardness reading keyed by postal code.
#[derive(Debug, Clone, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct HardnessRecord {
    /// Hardness in parts per million, or `None` when no reading exists.
    #[serde(default)]
    pub ppm: Option<f64>,
    /// City the postal code belongs to.
    pub city: String,
}

/// JSON object decoded into `(key, value)` pairs in document order.
struct OrderedEntries<V>(Vec<(String, V)>);

impl<'de, V: Deserialize<'de>> Deserialize<'de> for OrderedEntries<V> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct EntriesVisitor<V>(PhantomData<V>);

        impl<'de, V: Deserialize<'de>> Visitor<'de> for EntriesVisitor<V> {
            type Value = OrderedEntries<V>;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a JSON object keyed by postal code")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
                let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some((key, value)) = map.next_entry::<String, V>()? {
                    entries.push((key, value));
                }
                Ok(OrderedEntries(entries))
            }
        }

        deserializer.deserialize_map(EntriesVisitor(PhantomData))
    }
}

/// Immutable lookup tables for the resolver and the population statistics.
#[derive(Debug, Clone, Default)]
pub struct ReferenceStore {
    /// Hardness records in file order.
    records: Vec<(String, HardnessRecord)>,
    /// Postal code to position in `records`.
    record_positions: HashMap<String, usize>,
    /// Postal code to city, from the city file.
    postal_cities: HashMap<String, String>,
    /// City to postal codes, in city-file order.
    city_postal_codes: HashMap<String, Vec<String>>,
}

impl ReferenceStore {
    /// Load both reference files from disk.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Io`] if either file is unreadable,
    /// [`StoreError::Json`] if either is malformed, or
    /// [`StoreError::InvalidReading`] for a negative reading.
    pub fn load(hardness_path: &Path, city_index_path: &Path) -> Result<Self, StoreError> {
        let hardness_json = read_file(hardness_path)?;
        let city_json = read_file(city_index_path)?;
        Self::from_json(&hardness_json, &city_json)
    }

    /// Build the store from the raw contents of the two reference files.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Json`] for malformed input or
    /// [`StoreError::InvalidReading`] for a negative reading.
    pub fn from_json(hardness_json: &str, city_json: &str) -> Result<Self, StoreError> {
        let OrderedEntries(records) = serde_json::from_str(hardness_json)
            .map_err(|source| StoreError::Json { what: "hardness data", source })?;
        let OrderedEntries(postal_cities) = serde_json::from_str(city_json)
            .map_err(|source| StoreError::Json { what: "postal code city index", source })?;
        Self::from_entries(records, postal_cities)
    }

    /// Build the store from already-decoded entries, preserving their order.
    ///
    /// A postal code repeated within one input keeps its first position and
    /// takes the last value, the same way a JSON object decoded into an
    /// insertion-ordered map behaves.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::InvalidReading`] when a reading is negative or
    /// not finite.
    pub fn from_entries(
        records: Vec<(String, HardnessRecord)>,
        postal_cities: Vec<(String, String)>,
    ) -> Result<Self, StoreError> {
        let mut store = Self::default();

        for (postal_code, record) in records {
            if let Some(ppm) = record.ppm {
                if !ppm.is_finite() || ppm < 0.0 {
                    return Err(StoreError::InvalidReading { postal_code, ppm });
                }
            }
            match store.record_positions.get(&postal_code) {
                Some(&pos) => {
                    if let Some(slot) = store.records.get_mut(pos) {
                        slot.1 = record;
                    }
                }
                None => {
                    store.record_positions.insert(postal_code.clone(), store.records.len());
                    store.records.push((postal_code, record));
                }
            }
        }

        let mut ordered_cities: Vec<(String, String)> = Vec::with_capacity(postal_cities.len());
        let mut city_positions: HashMap<String, usize> = HashMap::new();
        for (postal_code, city) in postal_cities {
            match city_positions.get(&postal_code) {
                Some(&pos) => {
                    if let Some(slot) = ordered_cities.get_mut(pos) {
                        slot.1 = city;
                    }
                }
                None => {
                    city_positions.insert(postal_code.clone(), ordered_cities.len());
                    ordered_cities.push((postal_code, city));
                }
            }
        }

        for (postal_code, city) in ordered_cities {
            store
                .city_postal_codes
                .entry(city.clone())
                .or_default()
                .push(postal_code.clone());
            store.postal_cities.insert(postal_code, city);
        }

        Ok(store)
    }

    /// Look up the hardness record for an exact postal code.
    pub fn record(&self, postal_code: &str) -> Option<&HardnessRecord> {
        self.entry(postal_code).map(|(_, record)| record)
    }

    /// Like [`record`](Self::record), also returning the stored key.
    pub fn entry(&self, postal_code: &str) -> Option<(&str, &HardnessRecord)> {
        self.record_positions
            .get(postal_code)
            .and_then(|&pos| self.records.get(pos))
            .map(|(code, record)| (code.as_str(), record))
    }

    /// City for a postal code according to the city file.
    pub fn city_of(&self, postal_code: &str) -> Option<&str> {
        self.postal_cities.get(postal_code).map(String::as_str)
    }

    /// Postal codes sharing `city`, in city-file order.
    pub fn postal_codes_in(&self, city: &str) -> &[String] {
        self.city_postal_codes.get(city).map_or(&[], Vec::as_slice)
    }

    /// All hardness records in file order.
    pub fn records(&self) -> impl Iterator<Item = (&str, &HardnessRecord)> {
        self.records.iter().map(|(code, record)| (code.as_str(), record))
    }

    /// Every non-null reading in file order.
    pub fn readings(&self) -> impl Iterator<Item = f64> + '_ {
        self.records.iter().filter_map(|(_, record)| record.ppm)
    }

    /// Number of hardness records.
    pub fn record_count(&self) -> usize {
        self.records.len()
    }

    /// Number of postal codes in the city file.
    pub fn postal_code_count(&self) -> usize {
        self.postal_cities.len()
    }

    /// Number of distinct cities in the city index.
    pub fn city_count(&self) -> usize {
        self.city_postal_codes.len()
    }
}

fn read_file(path: &Path) -> Result<String, StoreError> {
    std::fs::read_to_string(path).map_err(|source| StoreError::Io {
        path: path.display().to_string(),
        source,
    })
}
