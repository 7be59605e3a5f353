use std::fmt;

use chrono::Duration;
use serde::{Deserialize, Serialize};

/// Logical bar interval accepted by the history endpoint.
///
/// The string forms follow the batch provider's vocabulary (`1min`, `1day`, ...);
/// the per-symbol provider gets a resolution code via [`Interval::resolution`].
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, Serialize, Deserialize)]
pub enum Interval {
    #[serde(rename = "1min")]
    OneMinute,
    #[serde(rename = "5min")]
    FiveMinutes,
    #[serde(rename = "15min")]
    FifteenMinutes,
    #[serde(rename = "30min")]
    ThirtyMinutes,
    #[serde(rename = "45min")]
    FortyFiveMinutes,
    #[serde(rename = "1h")]
    OneHour,
    #[serde(rename = "2h")]
    TwoHours,
    #[serde(rename = "4h")]
    FourHours,
    #[default]
    #[serde(rename = "1day")]
    OneDay,
    #[serde(rename = "1week")]
    OneWeek,
    #[serde(rename = "1month")]
    OneMonth,
}

impl Interval {
    pub const ALL: [Interval; 11] = [
        Interval::OneMinute,
        Interval::FiveMinutes,
        Interval::FifteenMinutes,
        Interval::ThirtyMinutes,
        Interval::FortyFiveMinutes,
        Interval::OneHour,
        Interval::TwoHours,
        Interval::FourHours,
        Interval::OneDay,
        Interval::OneWeek,
        Interval::OneMonth,
    ];

    /// Parse a logical interval string. Returns `None` for unknown values.
    pub fn parse(value: &str) -> Option<Self> {
        let needle = value.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|i| i.as_str().eq_ignore_ascii_case(needle))
    }

    /// Parse a logical interval string, falling back to daily bars.
    pub fn parse_or_default(value: Option<&str>) -> Self {
        value.and_then(Self::parse).unwrap_or_default()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Interval::OneMinute => "1min",
            Interval::FiveMinutes => "5min",
            Interval::FifteenMinutes => "15min",
            Interval::ThirtyMinutes => "30min",
            Interval::FortyFiveMinutes => "45min",
            Interval::OneHour => "1h",
            Interval::TwoHours => "2h",
            Interval::FourHours => "4h",
            Interval::OneDay => "1day",
            Interval::OneWeek => "1week",
            Interval::OneMonth => "1month",
        }
    }

    /// Resolution code for candle endpoints that take `1,5,15,30,60,D,W,M`.
    ///
    /// Intervals without an exact code map to the nearest finer one.
    pub fn resolution(&self) -> &'static str {
        match self {
            Interval::OneMinute => "1",
            Interval::FiveMinutes => "5",
            Interval::FifteenMinutes => "15",
            Interval::ThirtyMinutes | Interval::FortyFiveMinutes => "30",
            Interval::OneHour | Interval::TwoHours | Interval::FourHours => "60",
            Interval::OneDay => "D",
            Interval::OneWeek => "W",
            Interval::OneMonth => "M",
        }
    }

    /// Whether bars of this interval cover whole sessions or longer.
    pub fn is_daily_or_longer(&self) -> bool {
        matches!(
            self,
            Interval::OneDay | Interval::OneWeek | Interval::OneMonth
        )
    }

    /// Calendar window requested from range-based providers: one day per bar.
    pub fn lookback(&self, output_size: u32) -> Duration {
        Duration::days(i64::from(output_size))
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_known_intervals() {
        assert_eq!(Interval::parse("1min"), Some(Interval::OneMinute));
        assert_eq!(Interval::parse("1day"), Some(Interval::OneDay));
        assert_eq!(Interval::parse("1DAY"), Some(Interval::OneDay));
        assert_eq!(Interval::parse(" 1week "), Some(Interval::OneWeek));
        assert_eq!(Interval::parse("2d"), None);
    }

    #[test]
    fn test_parse_or_default() {
        assert_eq!(Interval::parse_or_default(None), Interval::OneDay);
        assert_eq!(Interval::parse_or_default(Some("bogus")), Interval::OneDay);
        assert_eq!(Interval::parse_or_default(Some("1h")), Interval::OneHour);
    }

    #[test]
    fn test_resolution_mapping() {
        assert_eq!(Interval::OneMinute.resolution(), "1");
        assert_eq!(Interval::FiveMinutes.resolution(), "5");
        assert_eq!(Interval::FortyFiveMinutes.resolution(), "30");
        assert_eq!(Interval::FourHours.resolution(), "60");
        assert_eq!(Interval::OneDay.resolution(), "D");
        assert_eq!(Interval::OneWeek.resolution(), "W");
        assert_eq!(Interval::OneMonth.resolution(), "M");
    }

    #[test]
    fn test_string_round_trip_for_every_interval() {
        for interval in Interval::ALL {
            assert_eq!(Interval::parse(interval.as_str()), Some(interval));
        }
    }

    #[test]
    fn test_lookback_is_one_day_per_bar() {
        assert_eq!(Interval::OneDay.lookback(30), Duration::days(30));
        assert_eq!(Interval::OneMonth.lookback(12), Duration::days(12));
        assert_eq!(Interval::FiveMinutes.lookback(1), Duration::days(1));
    }
}
