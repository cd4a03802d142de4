use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use thiserror::Error;
use utoipa::ToSchema;

/// Daily presence status.
///
/// The remote API speaks single-letter codes (`V`, `X`, `M`, `NAO_MARCADO`);
/// both those and the long names are accepted on input.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    ToSchema,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(ascii_case_insensitive)]
pub enum PresenceStatus {
    #[serde(alias = "V")]
    #[strum(to_string = "PRESENT", serialize = "V")]
    Present,
    #[serde(alias = "X")]
    #[strum(to_string = "ABSENT", serialize = "X")]
    Absent,
    #[serde(alias = "M")]
    #[strum(to_string = "HALF_DAY", serialize = "M")]
    HalfDay,
    #[default]
    #[serde(alias = "NAO_MARCADO")]
    #[strum(to_string = "UNMARKED", serialize = "NAO_MARCADO")]
    Unmarked,
}

impl PresenceStatus {
    /// Code used by the remote presence API.
    pub fn wire_code(self) -> &'static str {
        match self {
            PresenceStatus::Present => "V",
            PresenceStatus::Absent => "X",
            PresenceStatus::HalfDay => "M",
            PresenceStatus::Unmarked => "NAO_MARCADO",
        }
    }

    pub fn counts_as_present(self) -> bool {
        matches!(self, PresenceStatus::Present | PresenceStatus::HalfDay)
    }
}

/// Canonical saved presence row. At most one per (employee, date).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[schema(
    example = json!({
        "id": "6651a0f3b4c5d6e7f8091a2b",
        "employee_id": "6650f1c2a1b2c3d4e5f60718",
        "date": "2025-06-18",
        "status": "PRESENT",
        "overtime_hours": 2.0,
        "absence_reason": null,
        "justified": null,
        "note": null,
        "clock_in": "08:00",
        "clock_out": "17:00"
    })
)]
pub struct PresenceRecord {
    pub id: String,
    pub employee_id: String,
    pub date: NaiveDate,
    pub status: PresenceStatus,
    #[serde(default)]
    pub overtime_hours: f64,
    pub absence_reason: Option<String>,
    pub justified: Option<bool>,
    pub note: Option<String>,
    /// `HH:MM`, 24h.
    pub clock_in: Option<String>,
    /// `HH:MM`, 24h.
    pub clock_out: Option<String>,
}

#[derive(Debug, Error, PartialEq)]
pub enum InvalidPresence {
    #[error("employee_id must not be empty")]
    MissingEmployee,
    #[error("overtime_hours must be a non-negative number, got {0}")]
    Overtime(f64),
}

/// Submission for the (employee, date) upsert. A resubmission fully
/// supersedes the previous entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[schema(
    example = json!({
        "employee_id": "6650f1c2a1b2c3d4e5f60718",
        "date": "2025-06-18",
        "status": "PRESENT",
        "overtime_hours": 2.0
    })
)]
pub struct PresenceUpsert {
    pub employee_id: String,
    pub date: NaiveDate,
    #[serde(default = "default_submit_status")]
    pub status: PresenceStatus,
    #[serde(default)]
    pub overtime_hours: f64,
    #[serde(default)]
    pub absence_reason: Option<String>,
    #[serde(default)]
    pub justified: Option<bool>,
    #[serde(default)]
    pub note: Option<String>,
    #[serde(default)]
    pub clock_in: Option<String>,
    #[serde(default)]
    pub clock_out: Option<String>,
}

fn default_submit_status() -> PresenceStatus {
    PresenceStatus::Present
}

impl PresenceUpsert {
    pub fn validate(&self) -> Result<(), InvalidPresence> {
        if self.employee_id.trim().is_empty() {
            return Err(InvalidPresence::MissingEmployee);
        }
        if !self.overtime_hours.is_finite() || self.overtime_hours < 0.0 {
            return Err(InvalidPresence::Overtime(self.overtime_hours));
        }
        Ok(())
    }

    pub fn into_record(self, id: String) -> PresenceRecord {
        PresenceRecord {
            id,
            employee_id: self.employee_id,
            date: self.date,
            status: self.status,
            overtime_hours: self.overtime_hours,
            absence_reason: self.absence_reason,
            justified: self.justified,
            note: self.note,
            clock_in: self.clock_in,
            clock_out: self.clock_out,
        }
    }
}
