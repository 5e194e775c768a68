//! Validity windows and human-readable durations.
//!
//! Timestamps are UTC with whole-second precision. A window is half-open:
//! a license is valid from `not_before` (inclusive) until `not_after`
//! (exclusive). Either bound may be absent.
//!
//! Durations use the compact `1y2w3d4h5m6s` notation. A year is 365.25
//! days so that year arithmetic never leaves odd remainders.

use crate::error::{LicenseError, LicenseResult};
use chrono::{DateTime, Duration, SecondsFormat, SubsecRound, Utc};
use serde::{Serialize, Serializer};

const YEAR_SECS: i64 = 31_557_600;
const WEEK_SECS: i64 = 604_800;
const DAY_SECS: i64 = 86_400;
const HOUR_SECS: i64 = 3_600;
const MINUTE_SECS: i64 = 60;

const UNITS: [(char, i64); 6] = [
    ('y', YEAR_SECS),
    ('w', WEEK_SECS),
    ('d', DAY_SECS),
    ('h', HOUR_SECS),
    ('m', MINUTE_SECS),
    ('s', 1),
];

/// The period during which a license may be used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Validity {
    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "serialize_timestamp"
    )]
    not_before: Option<DateTime<Utc>>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "serialize_timestamp"
    )]
    not_after: Option<DateTime<Utc>>,
}

impl Validity {
    /// Creates a window from optional bounds, truncated to whole seconds.
    ///
    /// # Errors
    ///
    /// Returns [`LicenseError::Parse`] if `not_before` is after `not_after`.
    pub fn new(
        not_before: Option<DateTime<Utc>>,
        not_after: Option<DateTime<Utc>>,
    ) -> LicenseResult<Self> {
        let not_before = not_before.map(|t| t.trunc_subsecs(0));
        let not_after = not_after.map(|t| t.trunc_subsecs(0));
        if let (Some(start), Some(end)) = (not_before, not_after) {
            if start > end {
                return Err(LicenseError::Parse(format!(
                    "validity starts at {} after it ends at {}",
                    format_timestamp(&start),
                    format_timestamp(&end)
                )));
            }
        }
        Ok(Self {
            not_before,
            not_after,
        })
    }

    /// A window of `length` beginning at `start`.
    pub fn starting(start: DateTime<Utc>, length: Duration) -> LicenseResult<Self> {
        let end = start
            .checked_add_signed(length)
            .ok_or_else(|| LicenseError::InvalidDuration("validity end overflows".to_string()))?;
        Self::new(Some(start), Some(end))
    }

    /// A window with no start that ends at `not_after`.
    #[must_use]
    pub fn until(not_after: DateTime<Utc>) -> Self {
        Self {
            not_before: None,
            not_after: Some(not_after.trunc_subsecs(0)),
        }
    }

    /// A window that opens at `not_before` and never closes.
    #[must_use]
    pub fn since(not_before: DateTime<Utc>) -> Self {
        Self {
            not_before: Some(not_before.trunc_subsecs(0)),
            not_after: None,
        }
    }

    /// An unconstrained window.
    #[must_use]
    pub fn always() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn not_before(&self) -> Option<DateTime<Utc>> {
        self.not_before
    }

    #[must_use]
    pub fn not_after(&self) -> Option<DateTime<Utc>> {
        self.not_after
    }

    /// Length of the window, if both bounds are set.
    #[must_use]
    pub fn length(&self) -> Option<Duration> {
        Some(self.not_after? - self.not_before?)
    }

    /// True if `now` falls inside the window.
    #[must_use]
    pub fn contains(&self, now: DateTime<Utc>) -> bool {
        self.not_before.is_none_or(|start| now >= start)
            && self.not_after.is_none_or(|end| now < end)
    }

    /// The overlap of two windows: the later start and the earlier end.
    ///
    /// The result may be empty; check with [`Validity::is_empty`].
    #[must_use]
    pub fn intersect(&self, other: &Self) -> Self {
        let not_before = match (self.not_before, other.not_before) {
            (Some(a), Some(b)) => Some(a.max(b)),
            (a, b) => a.or(b),
        };
        let not_after = match (self.not_after, other.not_after) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        };
        Self {
            not_before,
            not_after,
        }
    }

    /// True if no instant lies inside the window.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        matches!((self.not_before, self.not_after), (Some(start), Some(end)) if start >= end)
    }

    /// Time left before the window closes, or `None` if it never closes.
    #[must_use]
    pub fn remaining(&self, now: DateTime<Utc>) -> Option<Duration> {
        self.not_after.map(|end| (end - now).max(Duration::zero()))
    }

    pub(crate) fn from_wire(
        not_before: Option<&str>,
        not_after: Option<&str>,
    ) -> LicenseResult<Self> {
        Self::new(
            not_before.map(parse_timestamp).transpose()?,
            not_after.map(parse_timestamp).transpose()?,
        )
    }
}

/// Parses an RFC 3339 timestamp with whole-second precision.
///
/// Fractional seconds are rejected rather than truncated, so a document never
/// changes meaning between parse and canonical encoding.
pub fn parse_timestamp(text: &str) -> LicenseResult<DateTime<Utc>> {
    let parsed = DateTime::parse_from_rfc3339(text)
        .map_err(|e| LicenseError::Parse(format!("invalid timestamp {text:?}: {e}")))?
        .with_timezone(&Utc);
    if parsed.timestamp_subsec_nanos() != 0 {
        return Err(LicenseError::Parse(format!(
            "timestamp {text:?} has sub-second precision"
        )));
    }
    Ok(parsed)
}

/// Formats a timestamp as RFC 3339 with a `Z` suffix and second precision.
#[must_use]
pub fn format_timestamp(at: &DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Secs, true)
}

fn serialize_timestamp<S: Serializer>(
    at: &Option<DateTime<Utc>>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match at {
        Some(t) => serializer.serialize_str(&format_timestamp(t)),
        None => serializer.serialize_none(),
    }
}

/// Parses a compact duration such as `1y`, `2w3d` or `1h30m`.
///
/// Units must appear at most once and in descending order (`y w d h m s`).
///
/// # Errors
///
/// Returns [`LicenseError::InvalidDuration`] on empty input, unknown units,
/// out-of-order units or overflow.
pub fn parse_duration(text: &str) -> LicenseResult<Duration> {
    let invalid = |why: &str| LicenseError::InvalidDuration(format!("{text:?}: {why}"));

    let mut total: i64 = 0;
    let mut next_unit = 0;
    let mut digits = String::new();
    let mut seen_any = false;

    for c in text.chars().filter(|c| !c.is_whitespace()) {
        if c.is_ascii_digit() {
            digits.push(c);
            continue;
        }
        let unit = c.to_ascii_lowercase();
        let pos = UNITS[next_unit..]
            .iter()
            .position(|(u, _)| *u == unit)
            .ok_or_else(|| invalid(&format!("unexpected unit '{c}'")))?;
        if digits.is_empty() {
            return Err(invalid(&format!("unit '{c}' has no count")));
        }
        let count: i64 = digits.parse().map_err(|_| invalid("count too large"))?;
        let (_, secs) = UNITS[next_unit + pos];
        total = count
            .checked_mul(secs)
            .and_then(|s| total.checked_add(s))
            .ok_or_else(|| invalid("duration overflows"))?;
        next_unit += pos + 1;
        digits.clear();
        seen_any = true;
    }

    if !digits.is_empty() {
        return Err(invalid("trailing count without unit"));
    }
    if !seen_any {
        return Err(invalid("empty duration"));
    }
    Duration::try_seconds(total).ok_or_else(|| invalid("duration overflows"))
}

/// Formats a duration in the notation accepted by [`parse_duration`].
///
/// Sub-second parts are dropped; a zero duration formats as `0s`.
#[must_use]
pub fn format_duration(duration: Duration) -> String {
    let mut secs = duration.num_seconds();
    if secs <= 0 {
        return "0s".to_string();
    }
    let mut out = String::new();
    for (unit, size) in UNITS {
        let count = secs / size;
        if count > 0 {
            out.push_str(&format!("{count}{unit}"));
            secs %= size;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_every_unit() {
        let d = parse_duration("1w1d1h1m1s").unwrap();
        assert_eq!(d.num_seconds(), 694_861);
    }

    #[test]
    fn year_is_a_quarter_day_longer() {
        assert_eq!(parse_duration("1y").unwrap().num_seconds(), 365 * DAY_SECS + 6 * HOUR_SECS);
    }

    #[test]
    fn rejects_out_of_order_units() {
        assert!(parse_duration("1d1w").is_err());
        assert!(parse_duration("1h1h").is_err());
    }

    #[test]
    fn rejects_garbage() {
        for bad in ["", "  ", "5", "d", "1x", "1.5h"] {
            assert!(parse_duration(bad).is_err(), "{bad:?}");
        }
    }

    #[test]
    fn format_roundtrips() {
        for text in ["1y", "2w3d", "1h30m", "45s", "1y1w1d1h1m1s"] {
            let d = parse_duration(text).unwrap();
            assert_eq!(format_duration(d), text);
        }
    }

    #[test]
    fn starting_window_has_requested_length() {
        let start = parse_timestamp("2024-01-01T00:00:00Z").unwrap();
        let window = Validity::starting(start, parse_duration("1w").unwrap()).unwrap();
        assert_eq!(window.length(), Some(Duration::weeks(1)));
        assert!(window.contains(start));
        assert!(!window.contains(start + Duration::weeks(1)));
        assert_eq!(window.remaining(start), Some(Duration::weeks(1)));
    }

    #[test]
    fn disjoint_windows_intersect_empty() {
        let jan = Validity::new(
            Some(parse_timestamp("2024-01-01T00:00:00Z").unwrap()),
            Some(parse_timestamp("2024-02-01T00:00:00Z").unwrap()),
        )
        .unwrap();
        let mar = Validity::since(parse_timestamp("2024-03-01T00:00:00Z").unwrap());
        assert!(jan.intersect(&mar).is_empty());
        assert!(!jan.intersect(&Validity::always()).is_empty());
    }

    #[test]
    fn timestamp_rejects_fractional_seconds() {
        assert!(parse_timestamp("2024-01-01T00:00:00.5Z").is_err());
        assert!(parse_timestamp("2024-01-01T00:00:00Z").is_ok());
    }

    #[test]
    fn timestamp_normalizes_offsets_to_utc() {
        let t = parse_timestamp("2021-09-30T11:22:33-06:00").unwrap();
        assert_eq!(format_timestamp(&t), "2021-09-30T17:22:33Z");
    }
}
