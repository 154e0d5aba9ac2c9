use lazy_static::lazy_static;
use regex::Regex;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use time::format_description::well_known::{Iso8601, Rfc3339};
use time::{Date, OffsetDateTime, PrimitiveDateTime};

use crate::error::ApiError;

lazy_static! {
    static ref EMAIL_RE: Regex = Regex::new(r"^\S+@\S+\.\S+$").unwrap();
    static ref DATETIME_RE: Regex = Regex::new(
        r"^(\d{4})-(\d{2})-(\d{2})T(\d{2}):(\d{2}):(\d{2}(?:\.\d*)?)((-(\d{2}):(\d{2})|Z)?)$"
    )
    .unwrap();
}

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

/// Decodes an already-parsed JSON body into a typed payload. Shape errors
/// (missing required fields, wrong types, unknown fields) are the client's
/// fault and map to 400, unlike the transport-level 422 axum would produce.
pub fn decode<T: DeserializeOwned>(value: serde_json::Value) -> Result<T, ApiError> {
    serde_json::from_value(value).map_err(|_| ApiError::invalid_data())
}

/// ISO 8601 date-time, with or without a UTC offset. Offset-less values are
/// taken as UTC.
pub fn parse_datetime(s: &str) -> Result<OffsetDateTime, ApiError> {
    if !DATETIME_RE.is_match(s) {
        return Err(ApiError::invalid_data());
    }
    OffsetDateTime::parse(s, &Rfc3339)
        .or_else(|_| PrimitiveDateTime::parse(s, &Iso8601::DEFAULT).map(|dt| dt.assume_utc()))
        .map_err(|_| ApiError::invalid_data())
}

/// Birth dates arrive in the same date-time format; only the date part is kept.
pub fn parse_birth_date(s: &str) -> Result<Date, ApiError> {
    parse_datetime(s).map(|dt| dt.date())
}

/// Path ids are opaque to clients: anything that is not one of our generated
/// ids behaves exactly like an id that matches nothing.
pub fn parse_resource_id(s: &str) -> Result<uuid::Uuid, ApiError> {
    s.parse::<uuid::Uuid>().map_err(|_| ApiError::NotFound)
}

/// Deserializes a field that distinguishes "absent" from "present but null":
/// wrap the target in `Option<Option<T>>` and mark it
/// `#[serde(default, deserialize_with = "double_option")]`.
pub fn double_option<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    T::deserialize(deserializer).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn accepts_plain_and_offset_datetimes() {
        let naive = parse_datetime("2023-11-19T15:43:00").expect("naive datetime");
        assert_eq!(naive.offset(), time::UtcOffset::UTC);
        parse_datetime("2023-11-19T15:43:00Z").expect("zulu datetime");
        parse_datetime("2023-11-19T15:43:00-05:00").expect("offset datetime");
    }

    #[test]
    fn rejects_malformed_datetimes() {
        assert!(parse_datetime("19/11/2023").is_err());
        assert!(parse_datetime("2023-11-19").is_err());
        assert!(parse_datetime("not a date").is_err());
    }

    #[test]
    fn birth_date_keeps_date_part() {
        let d = parse_birth_date("1955-02-24T00:00:00").expect("birth date");
        assert_eq!(d.to_string(), "1955-02-24");
    }

    #[test]
    fn malformed_resource_id_reads_as_not_found() {
        let id = uuid::Uuid::new_v4();
        assert_eq!(parse_resource_id(&id.to_string()).unwrap(), id);

        let err = parse_resource_id("not-a-uuid").unwrap_err();
        assert_eq!(err.status(), axum::http::StatusCode::NOT_FOUND);
    }

    #[test]
    fn email_pattern() {
        assert!(is_valid_email("sjobs@apple.com"));
        assert!(!is_valid_email("sjobs@apple"));
        assert!(!is_valid_email("not-an-email"));
    }

    #[derive(Debug, serde::Deserialize)]
    #[serde(deny_unknown_fields)]
    struct Probe {
        #[serde(default, deserialize_with = "double_option")]
        note: Option<Option<String>>,
    }

    #[test]
    fn double_option_distinguishes_absent_and_null() {
        let absent: Probe = decode(json!({})).unwrap();
        assert_eq!(absent.note, None);

        let null: Probe = decode(json!({ "note": null })).unwrap();
        assert_eq!(null.note, Some(None));

        let set: Probe = decode(json!({ "note": "coffee" })).unwrap();
        assert_eq!(set.note, Some(Some("coffee".into())));
    }

    #[test]
    fn decode_rejects_unknown_fields() {
        assert!(decode::<Probe>(json!({ "bogus": 1 })).is_err());
    }
}
