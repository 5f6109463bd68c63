//! Seed shift checklists from YAML.
//!
//! ```yaml
//! opening:
//!   - label: Temp check walk-in cooler
//!     isRequired: true
//!   - label: Stock sauce station
//! closing:
//!   - label: Filter fryers
//!     isRequired: true
//! ```
//!
//! Each listed checklist type is replaced the same way a leader replaces it
//! through the API. Types missing from the file are left alone.

use std::collections::BTreeMap;

use mise_core::checklist::{ChecklistItemDraft, normalize_drafts};
use mise_core::{ChecklistType, StoreId};
use mise_server::db::{ChecklistRepository, StoreRepository};

use super::{CliError, connect};

/// Checklists keyed by type.
pub type ChecklistFile = BTreeMap<ChecklistType, Vec<ChecklistItemDraft>>;

/// Parse and validate a checklist file.
///
/// # Errors
///
/// Returns an error for malformed YAML or an invalid item list.
pub fn parse_checklists(content: &str) -> Result<ChecklistFile, CliError> {
    let file: ChecklistFile = serde_yaml::from_str(content)?;
    if file.is_empty() {
        return Err(CliError::Invalid("no checklists in file".to_owned()));
    }
    file.into_iter()
        .map(|(checklist_type, drafts)| {
            normalize_drafts(drafts)
                .map(|drafts| (checklist_type, drafts))
                .map_err(|e| CliError::Invalid(format!("{checklist_type}: {e}")))
        })
        .collect()
}

/// Replace a store's checklists with the ones in `path`.
///
/// # Errors
///
/// Returns an error if the file is unreadable or invalid, or the store does
/// not exist.
pub async fn checklists(store: StoreId, path: &str) -> Result<(), CliError> {
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| CliError::Io {
            path: path.to_owned(),
            source,
        })?;

    // Validate everything before touching the database
    let file = parse_checklists(&content)?;
    tracing::info!(path = %path, checklists = file.len(), "Parsed checklist file");

    let pool = connect().await?;
    if StoreRepository::new(&pool).get(store).await?.is_none() {
        return Err(CliError::Invalid(format!("store {store} does not exist")));
    }

    let repo = ChecklistRepository::new(&pool);
    for (checklist_type, drafts) in &file {
        let items = repo.replace_items(store, *checklist_type, drafts, None).await?;
        tracing::info!("  {checklist_type}: {} items", items.len());
    }

    tracing::info!("Seeding complete!");
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bundled_file() {
        let file = parse_checklists(include_str!("../../seed/checklists.yaml")).unwrap();
        assert_eq!(file.len(), ChecklistType::ALL.len());
        assert!(file.values().all(|items| items.iter().any(|i| i.is_required)));
    }

    #[test]
    fn test_parse_trims_labels() {
        let file = parse_checklists("opening:\n  - label: '  Count drawer '\n").unwrap();
        let opening = file.get(&ChecklistType::Opening).unwrap();
        assert_eq!(opening.first().unwrap().label, "Count drawer");
        assert!(!opening.first().unwrap().is_required);
    }

    #[test]
    fn test_parse_rejects_duplicates() {
        let yaml = "closing:\n  - label: Mop\n  - label: mop\n";
        assert!(matches!(parse_checklists(yaml), Err(CliError::Invalid(_))));
    }

    #[test]
    fn test_parse_rejects_unknown_type() {
        assert!(matches!(
            parse_checklists("brunch:\n  - label: Mimosas\n"),
            Err(CliError::Yaml(_))
        ));
    }

    #[test]
    fn test_parse_rejects_empty_file() {
        assert!(parse_checklists("{}").is_err());
    }
}
