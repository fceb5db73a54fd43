//! Slash-command interpretation of composer input.
//!
//! Only `/reset` is handled locally. Every other input, including other
//! slash-prefixed text such as `/calc 2+2`, is chat text for the remote
//! service and is forwarded unchanged.

/// Literal that clears the conversation.
pub const RESET_COMMAND: &str = "/reset";

/// A command handled by the client itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Reset,
}

/// Classification of one raw input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParsedInput {
    pub command: Option<Command>,
}

impl ParsedInput {
    pub fn is_command(&self) -> bool {
        self.command.is_some()
    }
}

/// Classifies `raw` as a local command or ordinary chat text.
///
/// Matching is exact after trimming: `/reset` is a command, `/reset now`
/// and `/RESET` are chat text.
pub fn parse(raw: &str) -> ParsedInput {
    let command = match raw.trim() {
        RESET_COMMAND => Some(Command::Reset),
        _ => None,
    };

    ParsedInput { command }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reset_is_command() {
        let parsed = parse("/reset");
        assert!(parsed.is_command());
        assert_eq!(parsed.command, Some(Command::Reset));
    }

    #[test]
    fn test_reset_with_surrounding_whitespace() {
        assert_eq!(parse("  /reset \n").command, Some(Command::Reset));
    }

    #[test]
    fn test_other_slash_input_is_chat_text() {
        for input in ["/calc 2+2", "/products ", "/reset now", "/RESET", "reset", ""] {
            let parsed = parse(input);
            assert!(!parsed.is_command(), "{input:?} should not be a command");
            assert_eq!(parsed.command, None);
        }
    }
}
