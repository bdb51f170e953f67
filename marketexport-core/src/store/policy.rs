//! Update policies: append-if-new-date for price series, whole-file replace
//! for snapshots.
//!
//! Both are plain read-modify-write sequences over a [`DocumentStore`]. They
//! are not atomic across files and not safe against a concurrent writer.

use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;
use std::path::Path;

use super::{layout, DocumentStore, StoreError};
use crate::domain::{ExchangeCode, ListedCompany, PricePoint};

/// Result of appending a single point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppendOutcome {
    Appended,
    /// A point for that date already existed; nothing was written.
    Duplicate,
}

/// Read and decode a JSON document. `None` if the file does not exist.
pub fn read_json<T: DeserializeOwned>(
    store: &dyn DocumentStore,
    path: &Path,
) -> Result<Option<T>, StoreError> {
    let Some(bytes) = store.read(path)? else {
        return Ok(None);
    };
    serde_json::from_slice(&bytes)
        .map(Some)
        .map_err(|e| StoreError::Malformed {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
}

/// Encode `value` as pretty-printed JSON (2-space indent) and write it.
pub fn write_json<T: Serialize + ?Sized>(
    store: &dyn DocumentStore,
    path: &Path,
    value: &T,
) -> Result<(), StoreError> {
    let bytes = serde_json::to_vec_pretty(value).map_err(|e| StoreError::Serialize {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    store.write(path, &bytes)
}

/// The stored price series at `path`; empty if the file is absent.
pub fn read_price_series(
    store: &dyn DocumentStore,
    path: &Path,
) -> Result<Vec<PricePoint>, StoreError> {
    Ok(read_json(store, path)?.unwrap_or_default())
}

/// Append `point` unless the series already has a point for its date.
///
/// The point is inserted at its date position, so the written series is
/// ascending. A duplicate performs no write at all, leaving the file
/// byte-for-byte unchanged.
pub fn append_price_point(
    store: &dyn DocumentStore,
    path: &Path,
    point: PricePoint,
) -> Result<AppendOutcome, StoreError> {
    let added = append_price_points(store, path, std::slice::from_ref(&point))?;
    Ok(if added == 0 {
        AppendOutcome::Duplicate
    } else {
        AppendOutcome::Appended
    })
}

/// Append every point whose date is not yet in the series, writing the file
/// once. Later duplicates within `points` are dropped too.
///
/// Stored rows are kept as they are, including any columns beyond `Date` and
/// `Price`. A series stored out of date order is sorted before the new
/// points go in.
///
/// Returns the number of points added; zero means nothing was written.
pub fn append_price_points(
    store: &dyn DocumentStore,
    path: &Path,
    points: &[PricePoint],
) -> Result<usize, StoreError> {
    let mut series = read_dated_rows(store, path)?;
    let mut dates: HashSet<_> = series.iter().map(|(date, _)| *date).collect();
    let mut added = 0;

    for point in points {
        if !dates.insert(point.date) {
            continue;
        }
        if added == 0 {
            series.sort_by_key(|(date, _)| *date);
        }
        let row = serde_json::to_value(point).map_err(|e| StoreError::Serialize {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        let at = series.partition_point(|(date, _)| *date < point.date);
        series.insert(at, (point.date, row));
        added += 1;
    }

    if added > 0 {
        let rows: Vec<&Value> = series.iter().map(|(_, row)| row).collect();
        write_json(store, path, &rows)?;
        tracing::debug!(path = %path.display(), added, "appended price points");
    }
    Ok(added)
}

/// Raw rows of a stored series, each paired with its parsed date.
fn read_dated_rows(
    store: &dyn DocumentStore,
    path: &Path,
) -> Result<Vec<(NaiveDate, Value)>, StoreError> {
    let rows: Vec<Value> = read_json(store, path)?.unwrap_or_default();
    rows.into_iter()
        .map(|row| {
            let point = PricePoint::deserialize(&row).map_err(|e| StoreError::Malformed {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;
            Ok((point.date, row))
        })
        .collect()
}

/// Overwrite `path` with `payload`, discarding whatever was there.
pub fn replace_section<T: Serialize + ?Sized>(
    store: &dyn DocumentStore,
    path: &Path,
    payload: &T,
) -> Result<(), StoreError> {
    write_json(store, path, payload)?;
    tracing::debug!(path = %path.display(), "replaced section");
    Ok(())
}

/// The stored listed-companies snapshot of an exchange; empty if absent.
pub fn read_listed_companies(
    store: &dyn DocumentStore,
    exchange: &ExchangeCode,
) -> Result<Vec<ListedCompany>, StoreError> {
    Ok(read_json(store, &layout::listed_companies(exchange))?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use chrono::NaiveDate;
    use proptest::prelude::*;
    use serde_json::json;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn path() -> &'static Path {
        Path::new("stocks/jse/NPN_price.json")
    }

    #[test]
    fn append_to_missing_file_creates_series() {
        let store = MemoryStore::new();
        let outcome = append_price_point(&store, path(), PricePoint::new(d(2025, 10, 30), 344.36)).unwrap();
        assert_eq!(outcome, AppendOutcome::Appended);
        assert_eq!(read_price_series(&store, path()).unwrap().len(), 1);
    }

    #[test]
    fn documented_scenario() {
        let store = MemoryStore::new();
        store.insert(path(), r#"[{"Date":"2025-10-30","Price":344.36}]"#);

        let next = PricePoint::new(d(2025, 10, 31), 347.12);
        assert_eq!(
            append_price_point(&store, path(), next).unwrap(),
            AppendOutcome::Appended
        );

        let expected = json!([
            {"Date": "2025-10-30", "Price": 344.36},
            {"Date": "2025-10-31", "Price": 347.12}
        ]);
        let stored: serde_json::Value = read_json(&store, path()).unwrap().unwrap();
        assert_eq!(stored, expected);

        assert_eq!(
            append_price_point(&store, path(), next).unwrap(),
            AppendOutcome::Duplicate
        );
        let stored: serde_json::Value = read_json(&store, path()).unwrap().unwrap();
        assert_eq!(stored, expected);
    }

    #[test]
    fn duplicate_leaves_bytes_untouched() {
        let store = MemoryStore::new();
        // Deliberately not in our own formatting
        let original = br#"[{"Date":"2025-10-30","Price":344.36}]"#.to_vec();
        store.insert(path(), original.clone());

        let outcome =
            append_price_point(&store, path(), PricePoint::new(d(2025, 10, 30), 999.0)).unwrap();

        assert_eq!(outcome, AppendOutcome::Duplicate);
        assert_eq!(store.get(path()).unwrap(), original);
        assert_eq!(store.write_count(), 0);
    }

    #[test]
    fn out_of_order_point_is_inserted_by_date() {
        let store = MemoryStore::new();
        append_price_points(
            &store,
            path(),
            &[
                PricePoint::new(d(2025, 10, 28), 1.0),
                PricePoint::new(d(2025, 10, 31), 4.0),
            ],
        )
        .unwrap();
        append_price_point(&store, path(), PricePoint::new(d(2025, 10, 29), 2.0)).unwrap();

        let dates: Vec<_> = read_price_series(&store, path())
            .unwrap()
            .into_iter()
            .map(|p| p.date)
            .collect();
        assert_eq!(dates, vec![d(2025, 10, 28), d(2025, 10, 29), d(2025, 10, 31)]);
    }

    #[test]
    fn extra_row_fields_survive_an_append() {
        let store = MemoryStore::new();
        store.insert(path(), r#"[{"Date":"2025-10-30","Price":3.0,"Volume":1200}]"#);

        append_price_point(&store, path(), PricePoint::new(d(2025, 10, 31), 4.0)).unwrap();

        let stored: serde_json::Value = read_json(&store, path()).unwrap().unwrap();
        assert_eq!(
            stored,
            json!([
                {"Date": "2025-10-30", "Price": 3.0, "Volume": 1200},
                {"Date": "2025-10-31", "Price": 4.0}
            ])
        );
    }

    #[test]
    fn descending_series_is_sorted_when_appended_to() {
        let store = MemoryStore::new();
        store.insert(
            path(),
            r#"[{"Date":"2025-10-30","Price":2.0},{"Date":"2025-10-29","Price":1.0}]"#,
        );

        append_price_point(&store, path(), PricePoint::new(d(2025, 10, 31), 3.0)).unwrap();

        let dates: Vec<_> = read_price_series(&store, path())
            .unwrap()
            .into_iter()
            .map(|p| p.date)
            .collect();
        assert_eq!(dates, vec![d(2025, 10, 29), d(2025, 10, 30), d(2025, 10, 31)]);
    }

    #[test]
    fn duplicate_in_unsorted_series_writes_nothing() {
        let store = MemoryStore::new();
        let original = br#"[{"Date":"2025-10-30","Price":2.0},{"Date":"2025-10-29","Price":1.0}]"#.to_vec();
        store.insert(path(), original.clone());

        let outcome =
            append_price_point(&store, path(), PricePoint::new(d(2025, 10, 29), 9.0)).unwrap();

        assert_eq!(outcome, AppendOutcome::Duplicate);
        assert_eq!(store.get(path()).unwrap(), original);
    }

    #[test]
    fn row_without_a_price_is_malformed() {
        let store = MemoryStore::new();
        store.insert(path(), r#"[{"Date":"2025-10-30"}]"#);
        let err = append_price_point(&store, path(), PricePoint::new(d(2025, 10, 31), 1.0)).unwrap_err();
        assert!(matches!(err, StoreError::Malformed { .. }), "got {err:?}");
    }

    #[test]
    fn batch_append_counts_only_new_dates() {
        let store = MemoryStore::new();
        store.insert(path(), r#"[{"Date":"2025-10-30","Price":1.0}]"#);

        let added = append_price_points(
            &store,
            path(),
            &[
                PricePoint::new(d(2025, 10, 30), 9.0),
                PricePoint::new(d(2025, 10, 31), 2.0),
                PricePoint::new(d(2025, 10, 31), 3.0),
            ],
        )
        .unwrap();

        assert_eq!(added, 1);
        let series = read_price_series(&store, path()).unwrap();
        assert_eq!(series[0].price, 1.0);
        assert_eq!(series[1].price, 2.0);
    }

    #[test]
    fn unparseable_series_is_malformed_and_not_overwritten() {
        let store = MemoryStore::new();
        store.insert(path(), "{not json");

        let err = append_price_point(&store, path(), PricePoint::new(d(2025, 1, 2), 1.0)).unwrap_err();

        assert!(matches!(err, StoreError::Malformed { .. }), "got {err:?}");
        assert_eq!(store.get(path()).unwrap(), b"{not json".to_vec());
    }

    #[test]
    fn wrong_shape_is_malformed() {
        let store = MemoryStore::new();
        store.insert(path(), r#"{"Date":"2025-10-30","Price":1.0}"#);
        assert!(matches!(
            read_price_series(&store, path()),
            Err(StoreError::Malformed { .. })
        ));
    }

    #[test]
    fn replace_discards_previous_contents() {
        let store = MemoryStore::new();
        let p = Path::new("stocks/jse/NPN_competitors.json");

        replace_section(&store, p, &json!([{"name": "A"}, {"name": "B"}])).unwrap();
        replace_section(&store, p, &json!([{"name": "C"}])).unwrap();

        let stored: serde_json::Value = read_json(&store, p).unwrap().unwrap();
        assert_eq!(stored, json!([{"name": "C"}]));
    }

    #[test]
    fn replace_into_denied_location_fails() {
        let store = MemoryStore::new();
        store.deny_writes_under("stocks");
        let err = replace_section(&store, Path::new("stocks/jse/NPN_performance.json"), &json!([]))
            .unwrap_err();
        assert!(matches!(err, StoreError::Io { .. }));
    }

    #[test]
    fn written_json_is_indented() {
        let store = MemoryStore::new();
        append_price_point(&store, path(), PricePoint::new(d(2025, 10, 30), 344.36)).unwrap();
        let text = String::from_utf8(store.get(path()).unwrap()).unwrap();
        assert_eq!(
            text,
            "[\n  {\n    \"Date\": \"2025-10-30\",\n    \"Price\": 344.36\n  }\n]"
        );
    }

    proptest! {
        #[test]
        fn increasing_dates_are_kept_in_order(offsets in prop::collection::btree_set(0i64..3650, 1..40)) {
            let store = MemoryStore::new();
            let base = d(2015, 1, 1);
            let points: Vec<PricePoint> = offsets
                .iter()
                .map(|o| PricePoint::new(base + chrono::Duration::days(*o), *o as f64))
                .collect();

            for p in &points {
                prop_assert_eq!(append_price_point(&store, path(), *p).unwrap(), AppendOutcome::Appended);
            }

            let series = read_price_series(&store, path()).unwrap();
            prop_assert_eq!(series, points.clone());

            // Re-appending any of them is a no-op
            let before = store.get(path()).unwrap();
            for p in &points {
                prop_assert_eq!(append_price_point(&store, path(), *p).unwrap(), AppendOutcome::Duplicate);
            }
            prop_assert_eq!(store.get(path()).unwrap(), before);
        }
    }
}
