// PocketBase timestamp handling.
//
// PocketBase stores UTC datetimes as `YYYY-MM-DD HH:MM:SS.mmmZ` — note the
// space separator, which RFC 3339 parsers reject. Reads accept both that
// format and RFC 3339; writes always produce the PocketBase format.
// An empty string is PocketBase's encoding of an unset date field.

use chrono::{DateTime, NaiveDateTime, Utc};

/// The datetime format PocketBase expects on write.
const PB_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3fZ";

/// Render a datetime in PocketBase's storage format.
pub fn format_timestamp(value: &DateTime<Utc>) -> String {
    value.format(PB_FORMAT).to_string()
}

/// Parse a PocketBase or RFC 3339 timestamp.
pub fn parse_timestamp(s: &str) -> Result<DateTime<Utc>, String> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(s.trim_end_matches('Z'), "%Y-%m-%d %H:%M:%S%.f")
        .map(|naive| naive.and_utc())
        .map_err(|e| format!("unrecognized timestamp `{s}`: {e}"))
}

/// Serde module for required datetime fields.
pub mod pb_date {
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        value: &DateTime<Utc>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&super::format_timestamp(value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<DateTime<Utc>, D::Error> {
        let s = String::deserialize(deserializer)?;
        super::parse_timestamp(&s).map_err(serde::de::Error::custom)
    }
}

/// Serde module for optional datetime fields.
///
/// `None`, `null` and the empty string all read as absent.
pub mod pb_date_opt {
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        value: &Option<DateTime<Utc>>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(v) => serializer.serialize_str(&super::format_timestamp(v)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<DateTime<Utc>>, D::Error> {
        match Option::<String>::deserialize(deserializer)? {
            None => Ok(None),
            Some(s) if s.is_empty() => Ok(None),
            Some(s) => super::parse_timestamp(&s)
                .map(Some)
                .map_err(serde::de::Error::custom),
        }
    }
}
