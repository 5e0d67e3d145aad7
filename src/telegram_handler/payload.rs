//! `sendMessage` payload and message shaping.

use serde::Serialize;

/// Rich-text mode understood by the Bot API.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum ParseMode {
    #[serde(rename = "HTML")]
    Html,
}

/// JSON body of a `sendMessage` call. Built per attempt and never stored.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SendMessagePayload<'a> {
    pub chat_id: &'a str,
    pub text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parse_mode: Option<ParseMode>,
    pub disable_web_page_preview: bool,
}

impl<'a> SendMessagePayload<'a> {
    /// Payload with HTML markup enabled and link previews disabled.
    pub fn html(chat_id: &'a str, text: &'a str) -> Self {
        Self {
            chat_id,
            text,
            parse_mode: Some(ParseMode::Html),
            disable_web_page_preview: true,
        }
    }

    /// The same message with markup parsing switched off.
    pub fn without_markup(&self) -> Self {
        Self {
            parse_mode: None,
            ..self.clone()
        }
    }
}

pub(crate) const ELLIPSIS: &str = "...";

/// Cut `text` to at most `max_chars` characters, replacing the tail with
/// `...` when anything was removed.
pub fn truncate_chars(text: String, max_chars: usize) -> String {
    if text.char_indices().nth(max_chars).is_none() {
        return text;
    }
    let keep = max_chars.saturating_sub(ELLIPSIS.len());
    let end = text
        .char_indices()
        .nth(keep)
        .map_or(text.len(), |(idx, _)| idx);
    let mut out = String::with_capacity(end + ELLIPSIS.len());
    out.push_str(&text[..end]);
    out.push_str(ELLIPSIS);
    out
}

/// Apply the service prefix, then the length cap.
pub fn compose_text(message: String, service_name: Option<&str>, max_chars: usize) -> String {
    let text = match service_name {
        Some(name) if !name.is_empty() => format!("<b>[{name}]</b>\n{message}"),
        _ => message,
    };
    truncate_chars(text, max_chars)
}
