//! Suggestion filtering.

use super::model::QuickAction;

/// Returns the quick actions to display for `composer_text`.
///
/// Text that does not start with `/` shows the whole registry. Slash text
/// narrows the registry to commands that start with it, compared
/// case-insensitively. Registry order is preserved in both cases.
pub fn filter_suggestions(registry: &[QuickAction], composer_text: &str) -> Vec<QuickAction> {
    if !composer_text.starts_with('/') {
        return registry.to_vec();
    }

    let prefix = composer_text.to_lowercase();
    registry
        .iter()
        .filter(|action| action.command.to_lowercase().starts_with(&prefix))
        .cloned()
        .collect()
}
