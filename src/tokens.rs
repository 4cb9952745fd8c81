//! Token estimation and per-model context limits.
//!
//! Estimation follows the chat-format accounting used by OpenAI-style
//! endpoints: a fixed per-message overhead (which changed with the
//! `gpt-3.5-turbo-0301` watershed), content estimated at ~4 characters
//! per token, plus a constant for reply priming. The estimate is a pure
//! function of the model id and message list.

use tracing::warn;

use crate::error::{CatapultError, Result};
use crate::transcript::Message;

/// Characters per token estimate (conservative average for GPT models).
const CHARS_PER_TOKEN: usize = 4;

/// Tokens added after the final message to prime the assistant's reply.
const REPLY_PRIMING_TOKENS: usize = 3;

/// Per-message overhead for the pre-watershed chat format
/// (`<|start|>role\ncontent<|end|>\n`).
const TOKENS_PER_MESSAGE_LEGACY: usize = 4;

/// Per-message overhead for every model after the 0301 watershed.
const TOKENS_PER_MESSAGE: usize = 3;

/// Static context-window table. Prefix entries act as pattern fallbacks
/// and are checked after exact matches, longest prefix first.
const CONTEXT_WINDOWS: &[(&str, u32)] = &[
    ("gpt-3.5-turbo-0301", 4_096),
    ("gpt-3.5-turbo-0613", 4_096),
    ("gpt-3.5-turbo-16k", 16_384),
    ("gpt-3.5-turbo", 16_385),
    ("gpt-4-32k", 32_768),
    ("gpt-4-turbo", 128_000),
    ("gpt-4o-mini", 128_000),
    ("gpt-4o", 128_000),
    ("gpt-4", 8_192),
];

/// Estimate token count for a raw string.
#[inline]
pub fn estimate_text(text: &str) -> usize {
    if text.is_empty() {
        return 0;
    }
    (text.len() + CHARS_PER_TOKEN - 1) / CHARS_PER_TOKEN
}

/// Estimate the token count of a chat-formatted message list for `model`.
///
/// Pure function: identical inputs always produce identical counts.
/// Unrecognized model names are presumed to use the post-watershed format;
/// a warning is emitted rather than failing the call.
pub fn estimate_messages(model: &str, messages: &[Message]) -> usize {
    let per_message = match model {
        "gpt-3.5-turbo-0301" => TOKENS_PER_MESSAGE_LEGACY,
        m if m.starts_with("gpt-3.5") || m.starts_with("gpt-4") => TOKENS_PER_MESSAGE,
        _ => {
            warn!(
                model,
                "unrecognized model, assuming current chat format for token estimation"
            );
            TOKENS_PER_MESSAGE
        }
    };

    let mut total = REPLY_PRIMING_TOKENS;
    for msg in messages {
        total += per_message;
        total += estimate_text(msg.role.as_str());
        total += estimate_text(&msg.content);
    }
    total
}

/// Look up the maximum context length for `model`.
///
/// Exact table match first, then longest-prefix fallback so dated
/// snapshots (`gpt-4o-2024-08-06`) resolve to their family. Unknown
/// identifiers are a configuration error.
pub fn context_window(model: &str) -> Result<u32> {
    if let Some((_, limit)) = CONTEXT_WINDOWS.iter().find(|(name, _)| *name == model) {
        return Ok(*limit);
    }
    if let Some((_, limit)) = CONTEXT_WINDOWS
        .iter()
        .filter(|(name, _)| model.starts_with(name))
        .max_by_key(|(name, _)| name.len())
    {
        return Ok(*limit);
    }
    Err(CatapultError::Config(format!(
        "unknown model '{}': no context window configured",
        model
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transcript::Message;

    #[test]
    fn test_estimate_text_empty() {
        assert_eq!(estimate_text(""), 0);
    }

    #[test]
    fn test_estimate_text_rounds_up() {
        assert_eq!(estimate_text("abcd"), 1);
        assert_eq!(estimate_text("abcde"), 2);
    }

    #[test]
    fn test_estimate_messages_is_pure() {
        let messages = vec![
            Message::system("You are an interviewer."),
            Message::user("Tell me about the role."),
        ];
        let a = estimate_messages("gpt-4o", &messages);
        let b = estimate_messages("gpt-4o", &messages);
        assert_eq!(a, b);
        assert!(a > 0);
    }

    #[test]
    fn test_estimate_messages_empty_list() {
        assert_eq!(estimate_messages("gpt-4o", &[]), REPLY_PRIMING_TOKENS);
    }

    #[test]
    fn test_estimate_messages_grows_with_content() {
        let short = vec![Message::user("Hi")];
        let long = vec![Message::user(&"word ".repeat(100))];
        assert!(estimate_messages("gpt-4o", &long) > estimate_messages("gpt-4o", &short));
    }

    #[test]
    fn test_legacy_watershed_overhead() {
        // The 0301 format carries one extra token per message.
        let messages = vec![Message::user("Hello"), Message::assistant("Hi")];
        let legacy = estimate_messages("gpt-3.5-turbo-0301", &messages);
        let current = estimate_messages("gpt-3.5-turbo-0613", &messages);
        assert_eq!(legacy, current + messages.len());
    }

    #[test]
    fn test_unknown_model_estimates_anyway() {
        let messages = vec![Message::user("Hello")];
        // Does not panic or error; falls back to the current format.
        let n = estimate_messages("mistral-large", &messages);
        assert_eq!(n, estimate_messages("gpt-4o", &messages));
    }

    #[test]
    fn test_context_window_exact() {
        assert_eq!(context_window("gpt-3.5-turbo-0301").unwrap(), 4_096);
        assert_eq!(context_window("gpt-4").unwrap(), 8_192);
        assert_eq!(context_window("gpt-4o").unwrap(), 128_000);
    }

    #[test]
    fn test_context_window_prefix_fallback() {
        // Dated snapshots resolve via longest prefix.
        assert_eq!(context_window("gpt-4o-2024-08-06").unwrap(), 128_000);
        assert_eq!(context_window("gpt-4o-mini-2024-07-18").unwrap(), 128_000);
        assert_eq!(context_window("gpt-4-32k-0613").unwrap(), 32_768);
    }

    #[test]
    fn test_context_window_prefers_longest_prefix() {
        // "gpt-4-turbo-preview" must match gpt-4-turbo (128k), not gpt-4 (8k).
        assert_eq!(context_window("gpt-4-turbo-preview").unwrap(), 128_000);
    }

    #[test]
    fn test_context_window_unknown_model() {
        let err = context_window("claude-sonnet").unwrap_err();
        assert!(err.to_string().contains("unknown model"));
    }
}
