//! Store management.

use mise_core::StoreId;
use mise_server::db::StoreRepository;

use super::{CliError, connect};

/// Create a store.
///
/// # Errors
///
/// Returns an error if the name or number is blank, or the number is taken.
pub async fn create(name: &str, number: &str) -> Result<StoreId, CliError> {
    let (name, number) = (name.trim(), number.trim());
    if name.is_empty() || number.is_empty() {
        return Err(CliError::Invalid(
            "store name and number are required".to_owned(),
        ));
    }

    let pool = connect().await?;
    let store = StoreRepository::new(&pool).create(name, number).await?;

    tracing::info!(store_id = %store.id, number = %store.number, "Store created: {}", store.name);
    Ok(store.id)
}
