//! Setup templates and weekly setup sheets.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use mise_core::setup::{SetupDay, assignment_count, unfilled_positions, validate_days};
use mise_core::week::WeekRange;
use mise_core::{EmployeeId, SetupSheetId, SetupTemplateId, StoreId};

use super::{clean_optional, require_text};

/// A reusable week layout.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SetupTemplate {
    pub id: SetupTemplateId,
    pub store_id: StoreId,
    pub name: String,
    pub description: Option<String>,
    pub days: Vec<SetupDay>,
    pub created_by: Option<EmployeeId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Body of a template create or update request.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetupTemplateInput {
    pub name: String,
    pub description: Option<String>,
    #[serde(default)]
    pub days: Vec<SetupDay>,
}

impl SetupTemplateInput {
    /// Trim text and validate the day layout.
    ///
    /// # Errors
    ///
    /// Returns a message for a blank name or an invalid layout.
    pub fn normalize(self) -> Result<Self, String> {
        Ok(Self {
            name: require_text(&self.name, "name")?,
            description: clean_optional(self.description),
            days: validate_days(self.days).map_err(|e| e.to_string())?,
        })
    }
}

/// A week of positions and assignments for one store.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SetupSheet {
    pub id: SetupSheetId,
    pub store_id: StoreId,
    pub template_id: Option<SetupTemplateId>,
    pub name: String,
    /// Always a Sunday.
    pub week_start: NaiveDate,
    /// Always the Saturday after `week_start`.
    pub week_end: NaiveDate,
    pub days: Vec<SetupDay>,
    pub notes: Option<String>,
    pub created_by: Option<EmployeeId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl SetupSheet {
    /// The day schedule for a date inside this sheet's week.
    #[must_use]
    pub fn day_for(&self, date: NaiveDate) -> Option<&SetupDay> {
        use chrono::Datelike;
        if date < self.week_start || date > self.week_end {
            return None;
        }
        self.days.iter().find(|day| day.day == date.weekday())
    }
}

/// Sheet plus the counts shown in list views.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SetupSheetView {
    #[serde(flatten)]
    pub sheet: SetupSheet,
    pub assignment_count: usize,
    pub unfilled_positions: usize,
}

impl From<SetupSheet> for SetupSheetView {
    fn from(sheet: SetupSheet) -> Self {
        Self {
            assignment_count: assignment_count(&sheet.days),
            unfilled_positions: unfilled_positions(&sheet.days),
            sheet,
        }
    }
}

/// Body of a sheet create or update request.
///
/// The dates are snapped onto the Sunday to Saturday week containing
/// `week_start`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetupSheetInput {
    pub name: Option<String>,
    pub week_start: NaiveDate,
    pub week_end: Option<NaiveDate>,
    /// Copy the layout from this template when `days` is empty.
    pub template_id: Option<SetupTemplateId>,
    #[serde(default)]
    pub days: Vec<SetupDay>,
    pub notes: Option<String>,
}

/// A sheet input after validation.
#[derive(Debug, Clone)]
pub struct ValidSetupSheet {
    pub name: String,
    pub week: WeekRange,
    pub template_id: Option<SetupTemplateId>,
    pub days: Vec<SetupDay>,
    pub notes: Option<String>,
}

impl SetupSheetInput {
    /// Snap the week and validate the day layout.
    ///
    /// # Errors
    ///
    /// Returns a message for an inverted date range or an invalid layout.
    pub fn normalize(self) -> Result<ValidSetupSheet, String> {
        let week = WeekRange::snap(self.week_start, self.week_end).map_err(|e| e.to_string())?;
        let name = clean_optional(self.name)
            .unwrap_or_else(|| format!("Week of {}", week.start().format("%b %-d, %Y")));
        Ok(ValidSetupSheet {
            name,
            week,
            template_id: self.template_id,
            days: validate_days(self.days).map_err(|e| e.to_string())?,
            notes: clean_optional(self.notes),
        })
    }
}
