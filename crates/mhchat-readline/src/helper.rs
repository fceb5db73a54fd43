use std::borrow::Cow::{self, Borrowed, Owned};

use colored::Colorize;
use mhchat_core::quick_action::QuickActionRegistry;
use rustyline::completion::{Completer, Pair};
use rustyline::highlight::Highlighter;
use rustyline::hint::{Hint, Hinter};
use rustyline::validate::Validator;
use rustyline::{Context, Helper};

/// Inline hint for a partially typed quick action.
pub struct CommandHint {
    display: String,
    completion: String,
}

impl Hint for CommandHint {
    fn display(&self) -> &str {
        &self.display
    }

    fn completion(&self) -> Option<&str> {
        Some(&self.completion)
    }
}

/// CLI helper for rustyline that completes and hints quick actions.
#[derive(Clone)]
pub struct CliHelper {
    registry: QuickActionRegistry,
}

impl CliHelper {
    pub fn new(registry: QuickActionRegistry) -> Self {
        Self { registry }
    }
}

impl Helper for CliHelper {}

impl Completer for CliHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let line = &line[..pos];

        if !line.starts_with('/') {
            return Ok((0, vec![]));
        }

        let candidates = self
            .registry
            .suggestions_for(line)
            .into_iter()
            .map(|action| Pair {
                display: format!("{:<12}{}", action.command.trim_end(), action.label),
                replacement: action.command,
            })
            .collect();

        Ok((0, candidates))
    }
}

impl Highlighter for CliHelper {
    fn highlight<'l>(&self, line: &'l str, _pos: usize) -> Cow<'l, str> {
        if line.starts_with('/') {
            Owned(line.bright_cyan().to_string())
        } else {
            Borrowed(line)
        }
    }

    fn highlight_hint<'h>(&self, hint: &'h str) -> Cow<'h, str> {
        Owned(hint.bright_black().to_string())
    }

    fn highlight_char(&self, _line: &str, _pos: usize, _forced: bool) -> bool {
        true
    }
}

impl Hinter for CliHelper {
    type Hint = CommandHint;

    fn hint(&self, line: &str, pos: usize, _ctx: &Context<'_>) -> Option<CommandHint> {
        let line = &line[..pos];

        if !line.starts_with('/') || line.contains(' ') {
            return None;
        }

        self.registry
            .suggestions_for(line)
            .into_iter()
            .find(|action| action.command.trim_end().len() > line.len())
            .map(|action| {
                let rest = action.command[line.len()..].to_string();
                CommandHint {
                    display: format!("{}  {}", rest.trim_end(), action.label),
                    completion: rest,
                }
            })
    }
}

impl Validator for CliHelper {}

#[cfg(test)]
mod tests {
    use super::*;
    use rustyline::history::DefaultHistory;

    fn helper() -> CliHelper {
        CliHelper::new(QuickActionRegistry::default())
    }

    #[test]
    fn test_completes_matching_commands() {
        let history = DefaultHistory::new();
        let ctx = Context::new(&history);

        let (start, candidates) = helper().complete("/p", 2, &ctx).unwrap();

        assert_eq!(start, 0);
        let replacements: Vec<&str> = candidates.iter().map(|c| c.replacement.as_str()).collect();
        assert_eq!(replacements, vec!["/products "]);
    }

    #[test]
    fn test_plain_text_has_no_completions() {
        let history = DefaultHistory::new();
        let ctx = Context::new(&history);

        let (_, candidates) = helper().complete("hello", 5, &ctx).unwrap();
        assert!(candidates.is_empty());
    }

    #[test]
    fn test_hint_shows_rest_and_label() {
        let history = DefaultHistory::new();
        let ctx = Context::new(&history);

        let hint = helper().hint("/ou", 3, &ctx).unwrap();

        assert_eq!(hint.completion(), Some("tlets "));
        assert!(hint.display().starts_with("tlets"));
        assert!(hint.display().ends_with("Outlets"));
    }

    #[test]
    fn test_no_hint_for_complete_command() {
        let history = DefaultHistory::new();
        let ctx = Context::new(&history);

        assert!(helper().hint("/reset", 6, &ctx).is_none());
        assert!(helper().hint("/calc 2+2", 9, &ctx).is_none());
    }
}
