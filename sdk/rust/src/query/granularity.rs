//! Query granularity

use std::str::FromStr;

use serde::Serialize;

use crate::error::QueryError;

/// Time zone used when none is given
pub const DEFAULT_TIME_ZONE: &str = "UTC";

/// Granularities the broker accepts by name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SimpleGranularity {
    None,
    All,
    Second,
    Minute,
    FifteenMinute,
    ThirtyMinute,
    Hour,
}

impl FromStr for SimpleGranularity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "none" => Ok(Self::None),
            "all" => Ok(Self::All),
            "second" => Ok(Self::Second),
            "minute" => Ok(Self::Minute),
            "fifteen_minute" => Ok(Self::FifteenMinute),
            "thirty_minute" => Ok(Self::ThirtyMinute),
            "hour" => Ok(Self::Hour),
            _ => Err(format!("not a simple granularity: {}", s)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase", rename_all_fields = "camelCase")]
pub enum GranularitySpec {
    Period { period: String, time_zone: String },
    Duration { duration: u64, time_zone: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Granularity {
    Simple(SimpleGranularity),
    Spec(GranularitySpec),
}

impl Default for Granularity {
    fn default() -> Self {
        Self::Simple(SimpleGranularity::All)
    }
}

impl Granularity {
    /// Granularity from a name.
    ///
    /// Simple names pass through; `day` becomes the `P1D` period; anything
    /// else is taken as an ISO-8601 period in `time_zone`.
    pub fn parse(granularity: &str, time_zone: Option<&str>) -> Result<Self, QueryError> {
        if let Ok(simple) = granularity.parse::<SimpleGranularity>() {
            return Ok(Self::Simple(simple));
        }

        let period = match granularity {
            "day" => "P1D".to_string(),
            other => other.to_string(),
        };
        Ok(Self::Spec(GranularitySpec::Period {
            period,
            time_zone: resolve_time_zone(time_zone)?,
        }))
    }

    /// Fixed-length buckets of `duration_ms` milliseconds
    pub fn duration(duration_ms: u64, time_zone: Option<&str>) -> Result<Self, QueryError> {
        Ok(Self::Spec(GranularitySpec::Duration {
            duration: duration_ms,
            time_zone: resolve_time_zone(time_zone)?,
        }))
    }
}

/// Validate a time zone name, `UTC` when none is given. `CEST` is not
/// understood by the broker and is mapped to `Europe/Berlin`.
pub fn resolve_time_zone(time_zone: Option<&str>) -> Result<String, QueryError> {
    let tz = match time_zone.unwrap_or(DEFAULT_TIME_ZONE) {
        "CEST" => "Europe/Berlin",
        other => other,
    };
    tz.parse::<chrono_tz::Tz>()
        .map_err(|_| QueryError::InvalidTimeZone(tz.to_string()))?;
    Ok(tz.to_string())
}
