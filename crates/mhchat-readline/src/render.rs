//! Terminal rendering of session snapshots.

use colored::Colorize;
use mhchat_core::quick_action::QuickActionRegistry;
use mhchat_core::session::{Message, SessionSnapshot};

const PLACEHOLDER: &str = "–";

/// Formats one message, including its meta line and slots.
pub fn format_message(message: &Message) -> String {
    let mut lines = Vec::new();

    if message.is_user() {
        lines.push(format!("{} {}", "you ›".green().bold(), indent_tail(&message.text)));
        lines.push(format!("      {}", message.time.bright_black()));
        return lines.join("\n");
    }

    lines.push(format!(
        "{} {}",
        "bot ›".bright_blue().bold(),
        indent_tail(&message.text).bright_blue()
    ));

    match message.meta.as_ref().filter(|meta| meta.has_annotations()) {
        Some(meta) => {
            let mut line = format!(
                "{} · intent: {} / tool: {}",
                message.time,
                meta.intent.as_deref().unwrap_or(PLACEHOLDER),
                meta.tool.as_deref().unwrap_or(PLACEHOLDER)
            )
            .bright_black()
            .to_string();

            if let Some(error) = &meta.error {
                line.push_str(&format!(" / {}", format!("error: {error}").red()));
            }
            lines.push(format!("      {line}"));
        }
        None => lines.push(format!("      {}", message.time.bright_black())),
    }

    if let Some(slots) = message.meta.as_ref().and_then(|meta| meta.slots.as_ref()) {
        if let Ok(pretty) = serde_json::to_string_pretty(slots) {
            lines.push(format!("      {}", format!("slots: {}", indent_tail(&pretty)).bright_black()));
        }
    }

    lines.join("\n")
}

/// Shown when the conversation is empty.
pub fn empty_hint(registry: &QuickActionRegistry) -> String {
    let commands: Vec<&str> = registry
        .all()
        .iter()
        .map(|action| action.command.trim_end())
        .collect();

    format!(
        "Start the conversation, or try a quick action: {}",
        commands.join(", ")
    )
    .bright_black()
    .to_string()
}

fn indent_tail(text: &str) -> String {
    text.replace('\n', "\n      ")
}

/// Tracks what has been printed and turns each snapshot into new output.
#[derive(Debug, Default)]
pub struct Transcript {
    last_shown: Option<i64>,
    pending: bool,
    started: bool,
}

impl Transcript {
    /// Lines to print for `snapshot`, given everything printed so far.
    pub fn update(&mut self, snapshot: &SessionSnapshot, registry: &QuickActionRegistry) -> Vec<String> {
        let mut out = Vec::new();
        let mut cleared = false;

        let start = match self.last_shown {
            Some(last) => match snapshot.messages.iter().position(|m| m.id == last) {
                Some(pos) => pos + 1,
                None => {
                    cleared = true;
                    out.push("Conversation cleared.".yellow().to_string());
                    0
                }
            },
            None => 0,
        };

        if snapshot.messages.is_empty() && (cleared || !self.started) {
            out.push(empty_hint(registry));
        }

        for message in &snapshot.messages[start..] {
            out.push(format_message(message));
        }

        if snapshot.pending && !self.pending {
            out.push("… waiting for reply".bright_black().to_string());
        }

        self.last_shown = snapshot.messages.last().map(|m| m.id);
        self.pending = snapshot.pending;
        self.started = true;

        out
    }
}
