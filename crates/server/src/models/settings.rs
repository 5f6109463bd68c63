//! Per-store settings.

use chrono::{DateTime, FixedOffset, NaiveDateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use mise_core::dashboard::ChecklistDeadlines;

/// Largest accepted UTC offset, in minutes (UTC+14).
const MAX_UTC_OFFSET_MINUTES: i32 = 14 * 60;

/// Store settings, stored as one JSON document per store.
///
/// Missing fields fall back to their defaults, so documents written before a
/// field existed still load.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StoreSettings {
    pub checklist_deadlines: ChecklistDeadlines,
    /// Offset of store-local time from UTC.
    pub utc_offset_minutes: i32,
    /// Daily waste cost above which the dashboard flags the day.
    pub daily_waste_budget: Option<Decimal>,
}

impl StoreSettings {
    /// Check ranges.
    ///
    /// # Errors
    ///
    /// Returns a message for an out-of-range offset or a negative budget.
    pub fn validate(&self) -> Result<(), String> {
        let allowed = -MAX_UTC_OFFSET_MINUTES..=MAX_UTC_OFFSET_MINUTES;
        if !allowed.contains(&self.utc_offset_minutes) {
            return Err(format!(
                "utcOffsetMinutes must be within ±{MAX_UTC_OFFSET_MINUTES}"
            ));
        }
        if self.daily_waste_budget.is_some_and(|b| b < Decimal::ZERO) {
            return Err("dailyWasteBudget cannot be negative".to_owned());
        }
        Ok(())
    }

    /// Store-local wall clock time for an instant.
    ///
    /// An offset outside chrono's range reads as UTC.
    #[must_use]
    pub fn local_time(&self, at: DateTime<Utc>) -> NaiveDateTime {
        self.utc_offset_minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
            .map_or_else(|| at.naive_utc(), |offset| at.with_timezone(&offset).naive_local())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::{NaiveTime, TimeZone};

    #[test]
    fn test_defaults_fill_missing_fields() {
        let settings: StoreSettings = serde_json::from_str(r#"{"utcOffsetMinutes": -300}"#).unwrap();
        assert_eq!(settings.utc_offset_minutes, -300);
        assert_eq!(settings.checklist_deadlines, ChecklistDeadlines::default());
        assert_eq!(settings.daily_waste_budget, None);
    }

    #[test]
    fn test_local_time() {
        let settings = StoreSettings {
            utc_offset_minutes: -300,
            ..StoreSettings::default()
        };
        let at = Utc.with_ymd_and_hms(2025, 6, 4, 2, 30, 0).unwrap();
        let local = settings.local_time(at);
        assert_eq!(local.date().to_string(), "2025-06-03");
        assert_eq!(local.time(), NaiveTime::from_hms_opt(21, 30, 0).unwrap());
    }

    #[test]
    fn test_extreme_offsets() {
        for offset in [i32::MIN, i32::MAX, MAX_UTC_OFFSET_MINUTES + 1] {
            let settings: StoreSettings =
                serde_json::from_str(&format!(r#"{{"utcOffsetMinutes": {offset}}}"#)).unwrap();
            assert!(settings.validate().is_err(), "offset {offset} accepted");

            let at = Utc.with_ymd_and_hms(2025, 6, 4, 2, 30, 0).unwrap();
            assert_eq!(settings.local_time(at), at.naive_utc());
        }
        let edge = StoreSettings {
            utc_offset_minutes: -MAX_UTC_OFFSET_MINUTES,
            ..StoreSettings::default()
        };
        assert!(edge.validate().is_ok());
    }

    #[test]
    fn test_validate() {
        assert!(StoreSettings::default().validate().is_ok());
        let bad = StoreSettings {
            utc_offset_minutes: 15 * 60,
            ..StoreSettings::default()
        };
        assert!(bad.validate().is_err());
        let negative = StoreSettings {
            daily_waste_budget: Some(Decimal::new(-1, 0)),
            ..StoreSettings::default()
        };
        assert!(negative.validate().is_err());
    }
}
