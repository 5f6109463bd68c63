//! Store (restaurant location).

use chrono::{DateTime, Utc};
use serde::Serialize;

use mise_core::StoreId;

/// A restaurant location. Every other record belongs to exactly one store.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Store {
    pub id: StoreId,
    pub name: String,
    /// Operator facing store number, unique across the system.
    pub number: String,
    pub created_at: DateTime<Utc>,
}
