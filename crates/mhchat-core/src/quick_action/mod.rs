//! Quick Action registry and suggestion filtering.
//!
//! Quick Actions are slash-command shortcuts displayed above the composer.
//! The registry is fixed at startup; the visible subset is recomputed from
//! the composer text on every edit and on every quick-action click.

mod filter;
mod model;

pub use filter::filter_suggestions;
pub use model::{QuickAction, QuickActionRegistry};
