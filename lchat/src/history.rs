//! Conversation history bounding and sanitizing before a model call.

use lmodel::ChatMessage;

/// Returns the suffix of `messages` that fits the limits. The final message
/// is always kept; a limit of 0 is disabled.
///
/// ```rust
/// use lchat::truncate_history;
/// use lmodel::{ChatMessage, Role};
///
/// let messages: Vec<ChatMessage> = (0..5)
///     .map(|i| ChatMessage::text(i.to_string(), Role::User, "hello"))
///     .collect();
///
/// let kept = truncate_history(&messages, 0, 3);
/// assert_eq!(kept.len(), 3);
/// assert_eq!(kept[0].id, "2");
/// ```
pub fn truncate_history(
    messages: &[ChatMessage],
    max_bytes: usize,
    max_messages: usize,
) -> Vec<ChatMessage> {
    let Some((last, prior)) = messages.split_last() else {
        return Vec::new();
    };

    let mut candidates = prior;
    if max_messages > 0 {
        let keep = max_messages - 1;
        candidates = &prior[prior.len().saturating_sub(keep)..];
    }

    let mut start = candidates.len();
    if max_bytes > 0 {
        let mut total = last.serialized_len();
        for (index, message) in candidates.iter().enumerate().rev() {
            let size = message.serialized_len();
            if total + size > max_bytes {
                break;
            }
            total += size;
            start = index;
        }
    } else {
        start = 0;
    }

    let mut kept = candidates[start..].to_vec();
    kept.push(last.clone());
    kept
}

/// Drops blank text and empty images, then messages left with no parts.
pub fn sanitize_history(messages: Vec<ChatMessage>) -> Vec<ChatMessage> {
    messages
        .iter()
        .filter_map(ChatMessage::sanitized)
        .collect()
}

#[cfg(test)]
mod tests {
    use lmodel::{ContentPart, Role};

    use super::*;

    fn message(id: usize, text: &str) -> ChatMessage {
        ChatMessage::text(id.to_string(), Role::User, text)
    }

    fn ids(messages: &[ChatMessage]) -> Vec<String> {
        messages.iter().map(|message| message.id.clone()).collect()
    }

    #[test]
    fn empty_history_stays_empty() {
        assert!(truncate_history(&[], 100, 3).is_empty());
    }

    #[test]
    fn last_message_survives_even_when_over_budget() {
        let messages = vec![message(0, "short"), message(1, &"x".repeat(500))];
        let kept = truncate_history(&messages, 10, 0);
        assert_eq!(ids(&kept), vec!["1"]);
    }

    #[test]
    fn byte_budget_stops_at_first_message_that_does_not_fit() {
        let messages = vec![
            message(0, "a"),
            message(1, &"b".repeat(400)),
            message(2, "c"),
            message(3, "d"),
        ];
        let per_message = messages[0].serialized_len();
        let budget = per_message * 3;

        let kept = truncate_history(&messages, budget, 0);
        assert_eq!(ids(&kept), vec!["2", "3"]);
    }

    #[test]
    fn message_cap_counts_the_final_message() {
        let messages: Vec<ChatMessage> = (0..6).map(|i| message(i, "hi")).collect();
        assert_eq!(ids(&truncate_history(&messages, 0, 1)), vec!["5"]);
        assert_eq!(ids(&truncate_history(&messages, 0, 2)), vec!["4", "5"]);
        assert_eq!(truncate_history(&messages, 0, 0).len(), 6);
    }

    #[test]
    fn both_limits_apply_together() {
        let messages: Vec<ChatMessage> = (0..10).map(|i| message(i, "hi")).collect();
        let per_message = messages[0].serialized_len();
        let kept = truncate_history(&messages, per_message * 2, 5);
        assert_eq!(ids(&kept), vec!["8", "9"]);
    }

    #[test]
    fn shrinking_limits_never_keep_more_messages() {
        let messages: Vec<ChatMessage> = (0..12)
            .map(|i| message(i, &"z".repeat(10 + i * 7)))
            .collect();
        let total: usize = messages.iter().map(ChatMessage::serialized_len).sum();

        let mut previous = usize::MAX;
        for budget in (1..=total + 1).rev().step_by(13) {
            let kept = truncate_history(&messages, budget, 0).len();
            assert!(kept >= 1);
            assert!(kept <= previous, "budget {budget} kept {kept} > {previous}");
            previous = kept;
        }

        let mut previous = usize::MAX;
        for cap in (1..=messages.len() + 1).rev() {
            let kept = truncate_history(&messages, 0, cap).len();
            assert!(kept <= previous, "cap {cap} kept {kept} > {previous}");
            previous = kept;
        }
    }

    #[test]
    fn sanitize_removes_messages_without_renderable_parts() {
        let messages = vec![
            ChatMessage::new("0", Role::User, vec![ContentPart::text("  ")]),
            ChatMessage::new(
                "1",
                Role::Assistant,
                vec![ContentPart::image(""), ContentPart::text("ok")],
            ),
        ];

        let cleaned = sanitize_history(messages);
        assert_eq!(ids(&cleaned), vec!["1"]);
        assert_eq!(cleaned[0].content.len(), 1);
    }
}
