//! Sunday to Saturday weeks.
//!
//! Setup sheets are planned one week at a time and a store has at most one
//! sheet per week, so every date range coming from a client is snapped onto
//! the Sunday that starts its week before it is stored.

use chrono::{Datelike, Days, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

/// Errors from week arithmetic.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WeekError {
    #[error("end date {end} is before start date {start}")]
    EndBeforeStart { start: NaiveDate, end: NaiveDate },

    #[error("date {0} is outside the supported calendar range")]
    OutOfRange(NaiveDate),
}

/// An inclusive Sunday..=Saturday range.
///
/// ```
/// use chrono::NaiveDate;
/// use mise_core::week::WeekRange;
///
/// // Wednesday 2024-03-13 belongs to the week of Sunday 2024-03-10.
/// let date = NaiveDate::from_ymd_opt(2024, 3, 13).unwrap();
/// let week = WeekRange::containing(date).unwrap();
/// assert_eq!(week.start(), NaiveDate::from_ymd_opt(2024, 3, 10).unwrap());
/// assert_eq!(week.end(), NaiveDate::from_ymd_opt(2024, 3, 16).unwrap());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeekRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl WeekRange {
    /// Number of days in a week.
    pub const LENGTH: u64 = 7;

    /// The week that contains `date`.
    ///
    /// # Errors
    ///
    /// Returns [`WeekError::OutOfRange`] at the edges of chrono's calendar.
    pub fn containing(date: NaiveDate) -> Result<Self, WeekError> {
        let back = u64::from(date.weekday().num_days_from_sunday());
        let start = date
            .checked_sub_days(Days::new(back))
            .ok_or(WeekError::OutOfRange(date))?;
        let end = start
            .checked_add_days(Days::new(Self::LENGTH - 1))
            .ok_or(WeekError::OutOfRange(date))?;
        Ok(Self { start, end })
    }

    /// Snap a client supplied range onto a week.
    ///
    /// The start moves back to the Sunday on or before it and the end is
    /// always the following Saturday; a longer range is truncated to its
    /// first week.
    ///
    /// # Errors
    ///
    /// Returns [`WeekError::EndBeforeStart`] if `end < start`.
    pub fn snap(start: NaiveDate, end: Option<NaiveDate>) -> Result<Self, WeekError> {
        if let Some(end) = end
            && end < start
        {
            return Err(WeekError::EndBeforeStart { start, end });
        }
        Self::containing(start)
    }

    /// First day (a Sunday).
    #[must_use]
    pub const fn start(&self) -> NaiveDate {
        self.start
    }

    /// Last day (a Saturday).
    #[must_use]
    pub const fn end(&self) -> NaiveDate {
        self.end
    }

    /// Whether `date` falls inside this week.
    #[must_use]
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// The seven dates of the week, Sunday first.
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> + use<> {
        self.start.iter_days().take(7)
    }

    /// The date of `weekday` within this week.
    #[must_use]
    pub fn date_of(&self, weekday: Weekday) -> Option<NaiveDate> {
        self.start
            .checked_add_days(Days::new(u64::from(weekday.num_days_from_sunday())))
    }

    /// The week after this one.
    ///
    /// # Errors
    ///
    /// Returns [`WeekError::OutOfRange`] at the end of chrono's calendar.
    pub fn next(&self) -> Result<Self, WeekError> {
        let start = self
            .start
            .checked_add_days(Days::new(Self::LENGTH))
            .ok_or(WeekError::OutOfRange(self.start))?;
        Self::containing(start)
    }

    /// The week before this one.
    ///
    /// # Errors
    ///
    /// Returns [`WeekError::OutOfRange`] at the start of chrono's calendar.
    pub fn previous(&self) -> Result<Self, WeekError> {
        let start = self
            .start
            .checked_sub_days(Days::new(Self::LENGTH))
            .ok_or(WeekError::OutOfRange(self.start))?;
        Self::containing(start)
    }
}
