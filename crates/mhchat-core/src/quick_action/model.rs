//! Quick Action domain models.

use serde::{Deserialize, Serialize};

use super::filter::filter_suggestions;

/// A single quick action shortcut.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuickAction {
    /// Slash-prefixed literal inserted into the composer (e.g. `/calc `).
    pub command: String,
    /// Human-readable description.
    pub label: String,
}

impl QuickAction {
    pub fn new(command: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            label: label.into(),
        }
    }
}

/// The static, ordered set of quick actions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuickActionRegistry {
    actions: Vec<QuickAction>,
}

impl QuickActionRegistry {
    pub fn new(actions: Vec<QuickAction>) -> Self {
        Self { actions }
    }

    /// All registered actions in registry order.
    pub fn all(&self) -> &[QuickAction] {
        &self.actions
    }

    /// Actions to show for the given composer text.
    pub fn suggestions_for(&self, composer_text: &str) -> Vec<QuickAction> {
        filter_suggestions(&self.actions, composer_text)
    }
}

impl Default for QuickActionRegistry {
    fn default() -> Self {
        Self::new(vec![
            QuickAction::new("/calc ", "Calculator"),
            QuickAction::new("/products ", "Products"),
            QuickAction::new("/outlets ", "Outlets"),
            QuickAction::new("/reset", "Reset conversation"),
        ])
    }
}
