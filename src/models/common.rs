use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

/// Layout used for anything a person reads: option labels, summaries, acks.
pub const READABLE_LAYOUT: &str = "%Y-%m-%d %H:%M";

/// RFC 3339 with a numeric offset and whole seconds, e.g. `2019-01-07T10:00:00+09:00`.
pub const VALUE_LAYOUT: &str = "%Y-%m-%dT%H:%M:%S%:z";

pub fn format_readable(instant: &DateTime<FixedOffset>) -> String {
    instant.format(READABLE_LAYOUT).to_string()
}

pub fn format_value(instant: &DateTime<FixedOffset>) -> String {
    instant.format(VALUE_LAYOUT).to_string()
}

// Garoon's `{ "dateTime": ..., "timeZone": ... }` pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventTime {
    #[serde(with = "rfc3339")]
    pub date_time: DateTime<FixedOffset>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub time_zone: String,
}

impl EventTime {
    pub fn new(date_time: DateTime<FixedOffset>) -> Self {
        Self {
            date_time,
            time_zone: String::new(),
        }
    }
}

/// Serializes instants in [`VALUE_LAYOUT`] and accepts any RFC 3339 input.
pub mod rfc3339 {
    use chrono::{DateTime, FixedOffset};
    use serde::{Deserialize, Deserializer, Serializer};

    use super::format_value;

    pub fn serialize<S>(instant: &DateTime<FixedOffset>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&format_value(instant))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<FixedOffset>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(&raw).map_err(serde::de::Error::custom)
    }
}
