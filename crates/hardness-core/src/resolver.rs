//! Three-tier resolution of a postal code to a hardness reading.
//!
//! Tiers are tried in strict order:
//!
//! 1. **Exact** -- the postal code has its own record.
//! 2. **Same city** -- the postal code is in the city index; the highest
//!    reading among that city's postal codes is used.
//! 3. **Any record** -- the first record in file order whose reading is
//!    non-null and non-zero.
//!
//! Tier 3 returns a value unrelated to the requested location. The
//! endpoint answers every unknown code with it rather than failing.

use crate::store::ReferenceStore;

/// Which tier produced a [`Resolution`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionTier {
    /// The postal code had its own record.
    Exact,
    /// Highest reading among postal codes of the same city.
    SameCity,
    /// First truthy reading in the store.
    AnyRecord,
}

impl ResolutionTier {
    /// Short label used in log fields.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Exact => "exact",
            Self::SameCity => "same_city",
            Self::AnyRecord => "any_record",
        }
    }
}

/// A resolved reading, borrowed from the store.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Resolution<'a> {
    /// Hardness in ppm.
    pub ppm: f64,
    /// City reported for the request.
    pub city: &'a str,
    /// Postal code whose record supplied the reading.
    pub source_postal_code: &'a str,
    /// Tier that produced the reading.
    pub tier: ResolutionTier,
}

/// Reasons a postal code could not be resolved.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResolveError {
    /// No tier produced a reading.
    #[error("no reading available for postal code {0}")]
    NotFound(String),

    /// The postal code has its own record but the reading is null.
    ///
    /// An exact match ends the lookup, so the fallback tiers are not tried.
    #[error("postal code {0} has a record without a reading")]
    NullReading(String),
}

/// Resolve `postal_code` against the store.
///
/// # Errors
///
/// Returns [`ResolveError::NullReading`] when the exact record has no
/// reading, or [`ResolveError::NotFound`] when every tier is exhausted.
pub fn resolve<'a>(
    store: &'a ReferenceStore,
    postal_code: &str,
) -> Result<Resolution<'a>, ResolveError> {
    if let Some((code, record)) = store.entry(postal_code) {
        return record.ppm.map_or_else(
            || Err(ResolveError::NullReading(postal_code.to_owned())),
            |ppm| {
                Ok(Resolution {
                    ppm,
                    city: record.city.as_str(),
                    source_postal_code: code,
                    tier: ResolutionTier::Exact,
                })
            },
        );
    }

    if let Some(resolution) = same_city_maximum(store, postal_code) {
        return Ok(resolution);
    }

    first_truthy_record(store).ok_or_else(|| ResolveError::NotFound(postal_code.to_owned()))
}

/// Highest reading among the postal codes sharing `postal_code`'s city.
///
/// Ties keep the first postal code in city-index order. A reading of zero
/// is a valid candidate here.
fn same_city_maximum<'a>(store: &'a ReferenceStore, postal_code: &str) -> Option<Resolution<'a>> {
    let city = store.city_of(postal_code)?;
    let mut best: Option<(f64, &'a str)> = None;

    for candidate in store.postal_codes_in(city) {
        let Some(ppm) = store.record(candidate).and_then(|record| record.ppm) else {
            continue;
        };
        if best.is_none_or(|(best_ppm, _)| ppm > best_ppm) {
            best = Some((ppm, candidate.as_str()));
        }
    }

    best.map(|(ppm, source_postal_code)| Resolution {
        ppm,
        city,
        source_postal_code,
        tier: ResolutionTier::SameCity,
    })
}

/// First record in file order with a non-null, non-zero reading.
fn first_truthy_record(store: &ReferenceStore) -> Option<Resolution<'_>> {
    store.records().find_map(|(code, record)| match record.ppm {
        Some(ppm) if ppm != 0.0 => Some(Resolution {
            ppm,
            city: record.city.as_str(),
            source_postal_code: code,
            tier: ResolutionTier::AnyRecord,
        }),
        _ => None,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;

    fn store() -> ReferenceStore {
        ReferenceStore::from_json(
            r#"{
                "110001": {"ppm": 300, "city": "Delhi"},
                "110002": {"ppm": 420, "city": "Delhi"},
                "110003": {"ppm": null, "city": "Delhi"},
                "560001": {"ppm": 0, "city": "Bengaluru"},
                "560002": {"ppm": 0, "city": "Bengaluru"},
                "400002": {"ppm": 180, "city": "Mumbai"}
            }"#,
            r#"{
                "110001": "Delhi",
                "110002": "Delhi",
                "110003": "Delhi",
                "110099": "Delhi",
                "560001": "Bengaluru",
                "560002": "Bengaluru",
                "560099": "Bengaluru",
                "700099": "Kolkata"
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn exact_match_returns_own_record() {
        let store = store();
        let res = resolve(&store, "110001").unwrap();
        assert_eq!(res.ppm, 300.0);
        assert_eq!(res.city, "Delhi");
        assert_eq!(res.source_postal_code, "110001");
        assert_eq!(res.tier, ResolutionTier::Exact);
    }

    #[test]
    fn exact_match_with_zero_reading_is_kept() {
        let store = store();
        let res = resolve(&store, "560001").unwrap();
        assert_eq!(res.ppm, 0.0);
        assert_eq!(res.tier, ResolutionTier::Exact);
    }

    #[test]
    fn exact_match_with_null_reading_does_not_fall_through() {
        let store = store();
        assert_eq!(
            resolve(&store, "110003"),
            Err(ResolveError::NullReading("110003".to_owned()))
        );
    }

    #[test]
    fn same_city_picks_maximum() {
        let store = store();
        let res = resolve(&store, "110099").unwrap();
        assert_eq!(res.ppm, 420.0);
        assert_eq!(res.city, "Delhi");
        assert_eq!(res.source_postal_code, "110002");
        assert_eq!(res.tier, ResolutionTier::SameCity);
    }

    #[test]
    fn same_city_accepts_zero_readings_and_first_wins_ties() {
        let store = store();
        let res = resolve(&store, "560099").unwrap();
        assert_eq!(res.ppm, 0.0);
        assert_eq!(res.city, "Bengaluru");
        assert_eq!(res.source_postal_code, "560001");
        assert_eq!(res.tier, ResolutionTier::SameCity);
    }

    #[test]
    fn same_city_reports_indexed_city_name() {
        let store = ReferenceStore::from_json(
            r#"{"1": {"ppm": 50, "city": "Old Name"}}"#,
            r#"{"1": "New Name", "2": "New Name"}"#,
        )
        .unwrap();
        let res = resolve(&store, "2").unwrap();
        assert_eq!(res.city, "New Name");
        assert_eq!(res.ppm, 50.0);
    }

    #[test]
    fn city_without_readings_falls_to_any_record() {
        let store = store();
        let res = resolve(&store, "700099").unwrap();
        assert_eq!(res.ppm, 300.0);
        assert_eq!(res.city, "Delhi");
        assert_eq!(res.tier, ResolutionTier::AnyRecord);
    }

    #[test]
    fn unknown_code_uses_first_truthy_record() {
        let store = ReferenceStore::from_json(
            r#"{
                "1": {"ppm": null, "city": "A"},
                "2": {"ppm": 0, "city": "B"},
                "3": {"ppm": 75.5, "city": "C"},
                "4": {"ppm": 900, "city": "D"}
            }"#,
            "{}",
        )
        .unwrap();
        let res = resolve(&store, "999999").unwrap();
        assert_eq!(res.ppm, 75.5);
        assert_eq!(res.city, "C");
        assert_eq!(res.tier, ResolutionTier::AnyRecord);
    }

    #[test]
    fn nothing_truthy_is_not_found() {
        let store = ReferenceStore::from_json(
            r#"{"1": {"ppm": 0, "city": "A"}, "2": {"ppm": null, "city": "B"}}"#,
            "{}",
        )
        .unwrap();
        assert_eq!(
            resolve(&store, "999999"),
            Err(ResolveError::NotFound("999999".to_owned()))
        );
    }
}
