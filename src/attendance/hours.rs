//! Per-day presence weight and regular-hours credit.

use chrono::NaiveTime;

use crate::model::presence::PresenceStatus;

pub const FULL_DAY_HOURS: f64 = 8.0;
pub const HALF_DAY_HOURS: f64 = 4.0;

const CLOCK_FORMAT: &str = "%H:%M";

/// Weight of a day's status in the "days present" total.
pub fn day_fraction(status: PresenceStatus) -> f64 {
    match status {
        PresenceStatus::Present => 1.0,
        PresenceStatus::HalfDay => 0.5,
        PresenceStatus::Absent | PresenceStatus::Unmarked => 0.0,
    }
}

/// Regular hours credited for one day.
///
/// A present day with both clock times counts the whole hours between them
/// (minutes are dropped, never negative). A missing or unparseable clock
/// time falls back to the full-day credit.
pub fn regular_hours(
    status: PresenceStatus,
    clock_in: Option<&str>,
    clock_out: Option<&str>,
) -> f64 {
    match status {
        PresenceStatus::Absent | PresenceStatus::Unmarked => 0.0,
        PresenceStatus::HalfDay => HALF_DAY_HOURS,
        PresenceStatus::Present => match (non_blank(clock_in), non_blank(clock_out)) {
            (Some(clock_in), Some(clock_out)) => {
                whole_hours_between(clock_in, clock_out).unwrap_or(FULL_DAY_HOURS)
            }
            _ => FULL_DAY_HOURS,
        },
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn whole_hours_between(clock_in: &str, clock_out: &str) -> Option<f64> {
    let start = NaiveTime::parse_from_str(clock_in, CLOCK_FORMAT).ok()?;
    let end = NaiveTime::parse_from_str(clock_out, CLOCK_FORMAT).ok()?;
    let hours = end.signed_duration_since(start).num_hours().max(0);
    Some(hours as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use PresenceStatus::*;

    #[test]
    fn fraction_depends_on_status_only() {
        assert_eq!(day_fraction(Present), 1.0);
        assert_eq!(day_fraction(HalfDay), 0.5);
        assert_eq!(day_fraction(Absent), 0.0);
        assert_eq!(day_fraction(Unmarked), 0.0);
    }

    #[test]
    fn present_counts_whole_hours_between_clock_times() {
        assert_eq!(regular_hours(Present, Some("08:00"), Some("17:00")), 9.0);
        assert_eq!(regular_hours(Present, Some("08:30"), Some("17:00")), 8.0);
        assert_eq!(regular_hours(Present, Some("17:00"), Some("08:00")), 0.0);
    }

    #[test]
    fn present_falls_back_to_full_day() {
        assert_eq!(regular_hours(Present, None, None), 8.0);
        assert_eq!(regular_hours(Present, Some("08:00"), None), 8.0);
        assert_eq!(regular_hours(Present, Some("8h"), Some("17:00")), 8.0);
        assert_eq!(regular_hours(Present, Some(""), Some("")), 8.0);
    }

    #[test]
    fn half_day_and_absences_ignore_clock_times() {
        assert_eq!(regular_hours(HalfDay, Some("08:00"), Some("17:00")), 4.0);
        assert_eq!(regular_hours(HalfDay, None, None), 4.0);
        assert_eq!(regular_hours(Absent, Some("08:00"), Some("17:00")), 0.0);
        assert_eq!(regular_hours(Unmarked, None, None), 0.0);
    }
}
