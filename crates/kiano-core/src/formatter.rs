//! Channel formatting: one plain answer, three emphasis dialects.
//!
//! Authors mark emphasis with `bold_start` … `bold_end` or with `**…**`. Discord keeps
//! Markdown; Telegram (HTML parse mode) and the web widget get tags over escaped text.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

pub const BOLD_OPEN: &str = "bold_start";
pub const BOLD_CLOSE: &str = "bold_end";
/// Splits one answer into several chat messages.
pub const MESSAGE_SEPARATOR: &str = "|||";

static MARKDOWN_BOLD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)\*\*(.+?)\*\*").expect("static markdown bold regex"));

/// Target channel of a formatted variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    Raw,
    Discord,
    Telegram,
    Web,
}

/// The same answer rendered for every channel. Variants differ only in emphasis syntax.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelResponse {
    pub raw: String,
    pub discord: String,
    pub telegram: String,
    pub web: String,
}

impl ChannelResponse {
    pub fn variant(&self, channel: Channel) -> &str {
        match channel {
            Channel::Raw => &self.raw,
            Channel::Discord => &self.discord,
            Channel::Telegram => &self.telegram,
            Channel::Web => &self.web,
        }
    }

    /// Messages to send on `channel`: split on `|||`, trimmed, empties dropped.
    pub fn segments(&self, channel: Channel) -> Vec<String> {
        self.variant(channel)
            .split(MESSAGE_SEPARATOR)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect()
    }
}

/// Unescape literal `\n` / `\"`, then produce each channel's variant.
pub fn format_response(text: &str) -> ChannelResponse {
    let text = text.replace("\\n", "\n").replace("\\\"", "\"");
    ChannelResponse {
        discord: text.replace(BOLD_OPEN, "**").replace(BOLD_CLOSE, "**"),
        telegram: html_emphasis(&text, "<b>", "</b>"),
        web: html_emphasis(&text, "<strong>", "</strong>"),
        raw: text,
    }
}

fn html_emphasis(text: &str, open: &str, close: &str) -> String {
    let escaped = html_escape(text);
    let paired = MARKDOWN_BOLD.replace_all(&escaped, |caps: &regex::Captures<'_>| {
        format!("{}{}{}", open, &caps[1], close)
    });
    paired
        .replace("**", "")
        .replace(BOLD_OPEN, open)
        .replace(BOLD_CLOSE, close)
}

fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
