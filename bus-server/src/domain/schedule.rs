//! Bus schedules: one trip offering on a route and date.

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use super::error::DomainError;
use super::id::RecordId;

/// Storage format of `busDate`.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Storage format of `departureTime`.
pub const TIME_FORMAT: &str = "%H:%M";

/// A stored bus trip.
///
/// Text fields are kept exactly as submitted; search relies on byte-for-byte
/// equality of `bus_start_location`, `bus_end_location` and `bus_date`.
/// Documents written by older versions may lack fields, so every field
/// falls back to its empty value on load.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Schedule {
    #[serde(rename = "_id")]
    pub id: RecordId,
    pub bus_name: String,
    /// Zero-padded `HH:MM`
    pub departure_time: String,
    /// `YYYY-MM-DD`
    pub bus_date: String,
    pub bus_start_location: String,
    pub bus_end_location: String,
    /// Free text, e.g. "6h 30m"
    pub time_duration: String,
    /// Free-text category, e.g. "AC Sleeper"
    pub bus_type: String,
    pub bus_price: f64,
    pub stops: Vec<String>,
}

impl Schedule {
    /// Attach a store-assigned id to a validated draft.
    pub fn from_draft(id: RecordId, draft: ScheduleDraft) -> Self {
        Self {
            id,
            bus_name: draft.bus_name,
            departure_time: draft.departure_time,
            bus_date: draft.bus_date,
            bus_start_location: draft.bus_start_location,
            bus_end_location: draft.bus_end_location,
            time_duration: draft.time_duration,
            bus_type: draft.bus_type,
            bus_price: draft.bus_price,
            stops: draft.stops,
        }
    }

    /// Name shown to travellers, with a placeholder for unnamed buses.
    pub fn display_name(&self) -> &str {
        if self.bus_name.is_empty() {
            "Unknown"
        } else {
            &self.bus_name
        }
    }
}

/// Price as submitted: the admin console sends a string, API clients a number.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum PriceInput {
    Number(f64),
    Text(String),
}

impl PriceInput {
    fn value(&self) -> Option<f64> {
        let price = match self {
            PriceInput::Number(n) => *n,
            PriceInput::Text(s) => s.trim().parse().ok()?,
        };
        (price.is_finite() && price > 0.0).then_some(price)
    }
}

/// Unvalidated schedule creation input.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSchedule {
    pub bus_name: Option<String>,
    pub departure_time: Option<String>,
    pub bus_date: Option<String>,
    pub bus_start_location: Option<String>,
    pub bus_end_location: Option<String>,
    pub time_duration: Option<String>,
    pub bus_type: Option<String>,
    pub bus_price: Option<PriceInput>,
    pub stops: Option<Vec<String>>,
}

/// A schedule that passed validation and is ready to be stored.
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduleDraft {
    pub bus_name: String,
    pub departure_time: String,
    pub bus_date: String,
    pub bus_start_location: String,
    pub bus_end_location: String,
    pub time_duration: String,
    pub bus_type: String,
    pub bus_price: f64,
    pub stops: Vec<String>,
}

fn required(field: Option<String>) -> Result<String, DomainError> {
    match field {
        Some(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(DomainError::MissingScheduleFields),
    }
}

impl NewSchedule {
    /// Check presence of every field and the business rules.
    ///
    /// `today` is the creation day; a bus date equal to it is accepted.
    /// `stops` must be present but may be empty.
    pub fn validate(self, today: NaiveDate) -> Result<ScheduleDraft, DomainError> {
        let bus_name = required(self.bus_name)?;
        let departure_time = required(self.departure_time)?;
        let bus_date = required(self.bus_date)?;
        let bus_start_location = required(self.bus_start_location)?;
        let bus_end_location = required(self.bus_end_location)?;
        let time_duration = required(self.time_duration)?;
        let bus_type = required(self.bus_type)?;
        let price = self.bus_price.ok_or(DomainError::MissingScheduleFields)?;
        let stops = self.stops.ok_or(DomainError::MissingScheduleFields)?;

        let bus_price = price.value().ok_or(DomainError::InvalidPrice)?;

        let date = parse_bus_date(&bus_date)?;
        if date < today {
            return Err(DomainError::PastDate);
        }

        parse_departure_time(&departure_time)?;

        Ok(ScheduleDraft {
            bus_name,
            departure_time,
            bus_date,
            bus_start_location,
            bus_end_location,
            time_duration,
            bus_type,
            bus_price,
            stops,
        })
    }
}

/// Parse a `YYYY-MM-DD` bus date.
///
/// Only the fully zero-padded form is accepted so that the stored text stays
/// canonical for exact-match search.
pub fn parse_bus_date(s: &str) -> Result<NaiveDate, DomainError> {
    if s.len() != 10 {
        return Err(DomainError::InvalidDate(s.to_string()));
    }
    NaiveDate::parse_from_str(s, DATE_FORMAT).map_err(|_| DomainError::InvalidDate(s.to_string()))
}

/// Parse a zero-padded `HH:MM` departure time.
pub fn parse_departure_time(s: &str) -> Result<NaiveTime, DomainError> {
    if s.len() != 5 {
        return Err(DomainError::InvalidTime(s.to_string()));
    }
    NaiveTime::parse_from_str(s, TIME_FORMAT).map_err(|_| DomainError::InvalidTime(s.to_string()))
}

/// Split the admin console's comma-separated stop list.
///
/// Blank entries are dropped, so an empty input yields no stops.
pub fn split_stops(s: &str) -> Vec<String> {
    s.split(',')
        .map(str::trim)
        .filter(|stop| !stop.is_empty())
        .map(str::to_string)
        .collect()
}
