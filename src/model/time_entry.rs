use chrono::{NaiveDate, NaiveTime};
use serde::{Serialize, Serializer};
use strum_macros::Display;
use utoipa::ToSchema;

const CLOCK_FORMAT: &str = "%H:%M";

/// Where an employee stands in the working day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display, ToSchema)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum TimeEntryStatus {
    CheckedIn,
    OnBreak,
    CheckedOut,
}

/// One clocked shift. An employee may have several per day, each opened
/// after the previous one was closed.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[schema(
    example = json!({
        "id": "0b6f3c7e-6a52-4d8e-9a8e-2f1f0c7d5b11",
        "employee_id": "6650f1c2a1b2c3d4e5f60718",
        "date": "2025-06-18",
        "clock_in": "08:00",
        "clock_out": "17:30",
        "break_start": "12:00",
        "break_end": "13:00",
        "total_hours": 8.5,
        "extra_hours": 0.5,
        "status": "checked-out"
    })
)]
pub struct TimeEntry {
    pub id: String,
    pub employee_id: String,
    #[schema(value_type = String, format = "date")]
    pub date: NaiveDate,
    #[serde(serialize_with = "clock")]
    #[schema(value_type = Option<String>, example = "08:00")]
    pub clock_in: Option<NaiveTime>,
    #[serde(serialize_with = "clock")]
    #[schema(value_type = Option<String>, example = "17:30")]
    pub clock_out: Option<NaiveTime>,
    #[serde(serialize_with = "clock")]
    #[schema(value_type = Option<String>, example = "12:00")]
    pub break_start: Option<NaiveTime>,
    #[serde(serialize_with = "clock")]
    #[schema(value_type = Option<String>, example = "13:00")]
    pub break_end: Option<NaiveTime>,
    /// Worked hours net of the break, set on clock-out.
    pub total_hours: f64,
    pub extra_hours: f64,
    pub status: TimeEntryStatus,
}

fn clock<S: Serializer>(time: &Option<NaiveTime>, serializer: S) -> Result<S::Ok, S::Error> {
    match time {
        Some(t) => serializer.serialize_str(&t.format(CLOCK_FORMAT).to_string()),
        None => serializer.serialize_none(),
    }
}

pub fn parse_clock(raw: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(raw.trim(), CLOCK_FORMAT).ok()
}
