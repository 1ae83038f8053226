//! Serde support for RFC 3339 timestamps.
//!
//! The backend speaks RFC 3339 strings for every timestamp field; this
//! module adapts them to and from [`time::OffsetDateTime`] for use with
//! `#[serde(with = "crate::utils::time")]`.

use serde::{Deserialize, Deserializer, Serializer};
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

/// Deserialize an RFC 3339 formatted string into an OffsetDateTime.
pub fn deserialize<'de, D>(deserializer: D) -> Result<OffsetDateTime, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    OffsetDateTime::parse(&s, &Rfc3339).map_err(serde::de::Error::custom)
}

/// Serialize an OffsetDateTime into an RFC 3339 formatted string.
pub fn serialize<S>(datetime: &OffsetDateTime, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    let s = datetime
        .format(&Rfc3339)
        .map_err(serde::ser::Error::custom)?;
    serializer.serialize_str(&s)
}

#[cfg(test)]
mod tests {
    use serde::{Deserialize, Serialize};
    use time::OffsetDateTime;
    use time::macros::datetime;

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct Stamped {
        #[serde(with = "crate::utils::time")]
        at: OffsetDateTime,
    }

    #[test]
    fn round_trip() {
        let stamped = Stamped {
            at: datetime!(2024-05-01 12:34:56 UTC),
        };
        let json = serde_json::to_string(&stamped).unwrap();
        assert_eq!(json, r#"{"at":"2024-05-01T12:34:56Z"}"#);
        let parsed: Stamped = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, stamped);
    }

    #[test]
    fn rejects_non_rfc3339() {
        let err = serde_json::from_str::<Stamped>(r#"{"at":"May 1st"}"#);
        assert!(err.is_err());
    }
}
