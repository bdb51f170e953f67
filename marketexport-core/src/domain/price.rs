//! PricePoint: one dated price in an index or stock series.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A single `{Date, Price}` observation.
///
/// A series holds at most one point per date; see
/// [`crate::store::policy::append_price_point`] for how that is enforced.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    #[serde(rename = "Date", with = "date_format")]
    pub date: NaiveDate,
    #[serde(rename = "Price")]
    pub price: f64,
}

impl PricePoint {
    pub fn new(date: NaiveDate, price: f64) -> Self {
        Self { date, price }
    }
}

/// The point with the greatest date, regardless of input order.
pub fn latest_point(points: &[PricePoint]) -> Option<PricePoint> {
    points.iter().copied().max_by_key(|p| p.date)
}

/// Dates are written as `YYYY-MM-DD`. Older exports sometimes carried a
/// midnight time component, so reads also accept `YYYY-MM-DD HH:MM:SS` and
/// the `T`-separated form.
mod date_format {
    use chrono::{NaiveDate, NaiveDateTime};
    use serde::{de, Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%Y-%m-%d";

    pub fn serialize<S: Serializer>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&date.format(FORMAT))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDate, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).ok_or_else(|| de::Error::custom(format!("invalid date: {raw}")))
    }

    fn parse(raw: &str) -> Option<NaiveDate> {
        let raw = raw.trim();
        if let Ok(date) = NaiveDate::parse_from_str(raw, FORMAT) {
            return Some(date);
        }
        ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"]
            .iter()
            .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
            .map(|dt| dt.date())
    }
}
