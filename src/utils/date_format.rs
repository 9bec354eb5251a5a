use serde::{self, Deserialize, Deserializer, Serializer};
use time::{
    Date, OffsetDateTime, PrimitiveDateTime, format_description::well_known::Rfc3339,
    macros::format_description,
};

/// Formats a date the way Fiken expects it in bodies and query strings (`YYYY-MM-DD`).
pub fn format_date(date: Date) -> Result<String, time::error::Format> {
    date.format(&format_description!("[year]-[month]-[day]"))
}

// Accepts plain ISO dates, and datetimes of which only the date part is kept
pub fn parse_date(date_str: &str) -> Result<Date, String> {
    let format = format_description!("[year]-[month]-[day]");
    let date_part = date_str.split('T').next().unwrap_or(date_str);
    Date::parse(date_part, &format).map_err(|e| format!("Failed to parse date '{date_str}': {e}"))
}

// Fiken sends RFC 3339 timestamps, but some older endpoints leave out the offset
pub fn parse_datetime(datetime_str: &str) -> Result<OffsetDateTime, String> {
    if let Ok(dt) = OffsetDateTime::parse(datetime_str, &Rfc3339) {
        return Ok(dt);
    }

    let format = format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]");
    let without_fraction = datetime_str.split('.').next().unwrap_or(datetime_str);
    PrimitiveDateTime::parse(without_fraction, &format)
        .map(PrimitiveDateTime::assume_utc)
        .map_err(|e| format!("Failed to parse datetime '{datetime_str}': {e}"))
}

// Serialization module for time::Date
pub mod fiken_date {
    use super::{Date, Deserialize, Deserializer, Serializer, format_date, parse_date, serde};

    pub fn serialize<S>(date: &Date, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let formatted = format_date(*date).map_err(serde::ser::Error::custom)?;
        serializer.serialize_str(&formatted)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Date, D::Error>
    where
        D: Deserializer<'de>,
    {
        let date_str = String::deserialize(deserializer)?;
        parse_date(&date_str).map_err(serde::de::Error::custom)
    }
}

// Optional date serialization module
pub mod fiken_date_option {
    use super::{Date, Deserialize, Deserializer, Serializer, format_date, parse_date, serde};

    #[allow(clippy::ref_option)]
    pub fn serialize<S>(date: &Option<Date>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match date {
            Some(date) => {
                let formatted = format_date(*date).map_err(serde::ser::Error::custom)?;
                serializer.serialize_str(&formatted)
            }
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Date>, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Option::<String>::deserialize(deserializer)? {
            Some(s) if !s.is_empty() => parse_date(&s).map(Some).map_err(serde::de::Error::custom),
            _ => Ok(None),
        }
    }
}

// Optional OffsetDateTime serialization
pub mod fiken_datetime_option {
    use super::{Deserialize, Deserializer, OffsetDateTime, Rfc3339, Serializer, parse_datetime, serde};

    #[allow(clippy::ref_option)]
    pub fn serialize<S>(datetime: &Option<OffsetDateTime>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match datetime {
            Some(dt) => {
                let formatted = dt.format(&Rfc3339).map_err(serde::ser::Error::custom)?;
                serializer.serialize_str(&formatted)
            }
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<OffsetDateTime>, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Option::<String>::deserialize(deserializer)? {
            Some(s) if !s.is_empty() => parse_datetime(&s)
                .map(Some)
                .map_err(serde::de::Error::custom),
            _ => Ok(None),
        }
    }
}
