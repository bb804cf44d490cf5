use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::ValidationError;

use crate::error::ApiError;

pub const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// Largest amount a single subscription or installment may carry.
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(3567587328, 232, 0, false, 0);

/// Full English month name for a 1-based month number.
pub fn month_name(month: u32) -> &'static str {
    MONTH_NAMES
        .get(month.wrapping_sub(1) as usize)
        .copied()
        .unwrap_or("Unknown")
}

pub fn validate_amount(amount: &Decimal) -> Result<(), ValidationError> {
    if *amount < Decimal::ZERO {
        let mut error = ValidationError::new("negative_amount");
        error.message = Some("Amount cannot be negative".into());
        return Err(error);
    }
    if *amount > MAX_AMOUNT {
        let mut error = ValidationError::new("amount_too_large");
        error.message = Some("Amount is too large".into());
        return Err(error);
    }
    Ok(())
}

/// Rejects names that are empty once surrounding whitespace is trimmed.
pub fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut error = ValidationError::new("blank");
        error.message = Some("Name cannot be blank".into());
        return Err(error);
    }
    Ok(())
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }
}

/// `?month&year` query shared by the reporting endpoints.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PeriodQuery {
    pub month: Option<u32>,
    pub year: Option<i32>,
}

impl PeriodQuery {
    /// Fills omitted fields from `today` and rejects months outside 1..=12.
    pub fn resolve(&self, today: NaiveDate) -> Result<(u32, i32), ApiError> {
        let month = self.month.unwrap_or_else(|| today.month());
        let year = self.year.unwrap_or_else(|| today.year());

        if !(1..=12).contains(&month) {
            return Err(ApiError::Validation(format!(
                "Month must be between 1 and 12, got {}",
                month
            )));
        }

        Ok((month, year))
    }
}

/// Serde adapter for calendar dates stored as `YYYY-MM-DD`.
///
/// Deserialization also accepts RFC 3339 timestamps (as sent by browser date
/// pickers) and keeps their UTC date.
pub mod calendar_date {
    use chrono::{DateTime, NaiveDate};
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%Y-%m-%d";

    pub fn serialize<S>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(&date.format(FORMAT))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).map_err(D::Error::custom)
    }

    pub fn parse(raw: &str) -> Result<NaiveDate, String> {
        let raw = raw.trim();
        NaiveDate::parse_from_str(raw, FORMAT)
            .or_else(|_| DateTime::parse_from_rfc3339(raw).map(|dt| dt.naive_utc().date()))
            .map_err(|_| format!("invalid date '{}', expected YYYY-MM-DD", raw))
    }

    /// Same format for optional fields; use with `#[serde(default)]`.
    pub mod option {
        use chrono::NaiveDate;
        use serde::{de::Error, Deserialize, Deserializer, Serializer};

        pub fn serialize<S>(date: &Option<NaiveDate>, serializer: S) -> Result<S::Ok, S::Error>
        where
            S: Serializer,
        {
            match date {
                Some(date) => super::serialize(date, serializer),
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
        where
            D: Deserializer<'de>,
        {
            Option::<String>::deserialize(deserializer)?
                .map(|raw| super::parse(&raw).map_err(D::Error::custom))
                .transpose()
        }
    }
}
