//! Waste tracking domain types.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use mise_core::{EmployeeId, StoreId, WasteEntryId, WasteReason};

use super::{clean_optional, require_text};

/// Longest accepted item name.
const MAX_ITEM_NAME_LENGTH: usize = 120;

/// A recorded piece of food waste.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct WasteEntry {
    pub id: WasteEntryId,
    pub store_id: StoreId,
    pub shift_date: NaiveDate,
    pub item_name: String,
    pub quantity: Decimal,
    pub unit: String,
    /// Cost of the wasted product in store currency.
    pub cost: Decimal,
    pub reason: WasteReason,
    pub notes: Option<String>,
    pub recorded_by: EmployeeId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Body of a create or update request.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WasteEntryInput {
    /// Defaults to the store's current date.
    pub shift_date: Option<NaiveDate>,
    pub item_name: String,
    pub quantity: Decimal,
    #[serde(default = "default_unit")]
    pub unit: String,
    pub cost: Decimal,
    pub reason: WasteReason,
    pub notes: Option<String>,
}

fn default_unit() -> String {
    "each".to_owned()
}

impl WasteEntryInput {
    /// Trim text and check amounts.
    ///
    /// # Errors
    ///
    /// Returns a message for a blank or overlong item name, a quantity that
    /// is not positive, or a negative cost.
    pub fn normalize(self) -> Result<Self, String> {
        let item_name = require_text(&self.item_name, "itemName")?;
        if item_name.chars().count() > MAX_ITEM_NAME_LENGTH {
            return Err(format!(
                "itemName cannot exceed {MAX_ITEM_NAME_LENGTH} characters"
            ));
        }
        if self.quantity <= Decimal::ZERO {
            return Err("quantity must be greater than zero".to_owned());
        }
        if self.cost < Decimal::ZERO {
            return Err("cost cannot be negative".to_owned());
        }
        let unit = require_text(&self.unit, "unit")?;

        Ok(Self {
            item_name,
            unit,
            notes: clean_optional(self.notes),
            quantity: self.quantity.round_dp(2),
            cost: self.cost.round_dp(2),
            ..self
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn input(json: &str) -> WasteEntryInput {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_input_defaults_and_trims() {
        let entry = input(
            r#"{"itemName": " Nuggets ", "quantity": "12", "cost": "4.499", "reason": "dropped"}"#,
        )
        .normalize()
        .unwrap();
        assert_eq!(entry.item_name, "Nuggets");
        assert_eq!(entry.unit, "each");
        assert_eq!(entry.cost, Decimal::new(450, 2));
        assert!(entry.shift_date.is_none());
    }

    #[test]
    fn test_input_rejects_bad_amounts() {
        let zero = input(r#"{"itemName": "Fries", "quantity": "0", "cost": "1", "reason": "other"}"#);
        assert!(zero.normalize().is_err());

        let negative =
            input(r#"{"itemName": "Fries", "quantity": "1", "cost": "-1", "reason": "other"}"#);
        assert!(negative.normalize().is_err());
    }

    #[test]
    fn test_input_rejects_unknown_reason() {
        let parsed: Result<WasteEntryInput, _> = serde_json::from_str(
            r#"{"itemName": "Fries", "quantity": "1", "cost": "1", "reason": "stolen"}"#,
        );
        assert!(parsed.is_err());
    }
}
