//! System prompt rendering.
//!
//! Activity prompts are small templates. Rendering runs in three passes:
//! `{{#if var}}…{{else}}…{{/if}}` blocks, then plain `{{#if var}}…{{/if}}`
//! blocks, then `{{var}}` substitution. A variable is truthy when it is
//! present and non-empty. Unknown variables are left in place.
//!
//! ```rust
//! use lchat::{PromptRenderer, TemplateContext, TemplateRenderer};
//!
//! let context = TemplateContext::default()
//!     .with("userId", "alice")
//!     .with("userCountry", "NO");
//!
//! let rendered = TemplateRenderer::new().render(
//!     "Hi {{userId}}{{#if userCountry}} from {{userCountry}}{{/if}}. {{unknown}}",
//!     &context,
//! );
//! assert_eq!(rendered, "Hi alice from NO. {{unknown}}");
//! ```

use std::collections::BTreeMap;
use std::sync::LazyLock;

use chrono::{SecondsFormat, Utc};
use lcommon::UserId;
use ltooling::{MemoryState, format_memory_for_prompt};
use regex::{Captures, Regex};

use crate::CallerContext;

pub const MESSAGE_HANDLING_INSTRUCTIONS: &str = "IMPORTANT INSTRUCTIONS FOR MESSAGE HANDLING:
- The conversation history is provided in the messages array
- The LAST message in the array is ALWAYS the current user's input that you need to respond to
- Previous messages provide context but focus your response on addressing the latest user message
- When you see tool results, they are responses to YOUR previous tool calls, not new user requests";

static IF_ELSE_BLOCK: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r"\{\{#if\s+(\w+)\}\}([\s\S]*?)\{\{else\}\}([\s\S]*?)\{\{/if\}\}").ok()
});
static IF_BLOCK: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"\{\{#if\s+(\w+)\}\}([\s\S]*?)\{\{/if\}\}").ok());
static VARIABLE: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r"\{\{(\w+)\}\}").ok());

/// Named values available to a template.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TemplateContext {
    values: BTreeMap<String, String>,
}

impl TemplateContext {
    /// Builds the standard context for one turn.
    pub fn for_turn(user_id: &UserId, caller: &CallerContext, memory: Option<&MemoryState>) -> Self {
        let server_time = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);
        let mut context = Self::default()
            .with("userId", user_id.as_str())
            .with("serverTime", server_time);

        let optional = [
            ("userIp", &caller.ip),
            ("userCountry", &caller.country),
            ("userTimezone", &caller.timezone),
            ("userLocale", &caller.locale),
        ];
        for (name, value) in optional {
            if let Some(value) = value {
                context = context.with(name, value.as_str());
            }
        }

        if let Some(locale) = &caller.locale {
            let mut parts = locale.split('-');
            if let Some(language) = parts.next().filter(|part| !part.is_empty()) {
                context = context.with("userLanguage", language);
            }
            if let Some(region) = parts.next().filter(|part| !part.is_empty()) {
                context = context.with("userRegion", region);
            }
        }

        if let Some(memory) = memory {
            context = context.with("formattedMemory", format_memory_for_prompt(memory));
        }

        context
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(name.into(), value.into());
        self
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    pub fn is_truthy(&self, name: &str) -> bool {
        self.get(name).is_some_and(|value| !value.is_empty())
    }
}

pub trait PromptRenderer: Send + Sync {
    fn render(&self, template: &str, context: &TemplateContext) -> String;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct TemplateRenderer;

impl TemplateRenderer {
    pub fn new() -> Self {
        Self
    }
}

impl PromptRenderer for TemplateRenderer {
    fn render(&self, template: &str, context: &TemplateContext) -> String {
        let mut rendered = template.to_string();

        if let Some(regex) = IF_ELSE_BLOCK.as_ref() {
            rendered = regex
                .replace_all(&rendered, |captures: &Captures<'_>| {
                    if context.is_truthy(&captures[1]) {
                        captures[2].to_string()
                    } else {
                        captures[3].to_string()
                    }
                })
                .into_owned();
        }

        if let Some(regex) = IF_BLOCK.as_ref() {
            rendered = regex
                .replace_all(&rendered, |captures: &Captures<'_>| {
                    if context.is_truthy(&captures[1]) {
                        captures[2].to_string()
                    } else {
                        String::new()
                    }
                })
                .into_owned();
        }

        if let Some(regex) = VARIABLE.as_ref() {
            rendered = regex
                .replace_all(&rendered, |captures: &Captures<'_>| {
                    match context.get(&captures[1]) {
                        Some(value) => value.to_string(),
                        None => captures[0].to_string(),
                    }
                })
                .into_owned();
        }

        rendered
    }
}

/// Rendered activity prompt followed by the fixed message-handling rules.
pub fn build_system_prompt(
    renderer: &dyn PromptRenderer,
    template: &str,
    context: &TemplateContext,
) -> String {
    format!(
        "{}\n\n{}",
        renderer.render(template, context),
        MESSAGE_HANDLING_INSTRUCTIONS
    )
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn render(template: &str, context: &TemplateContext) -> String {
        TemplateRenderer::new().render(template, context)
    }

    #[test]
    fn if_else_picks_branch_by_truthiness() {
        let template = "{{#if userLocale}}Locale {{userLocale}}{{else}}No locale{{/if}}";
        let with_locale = TemplateContext::default().with("userLocale", "en-US");
        let blank_locale = TemplateContext::default().with("userLocale", "");

        assert_eq!(render(template, &with_locale), "Locale en-US");
        assert_eq!(render(template, &blank_locale), "No locale");
        assert_eq!(render(template, &TemplateContext::default()), "No locale");
    }

    #[test]
    fn plain_if_blocks_span_lines() {
        let template = "Start\n{{#if formattedMemory}}\nMemory:\n{{formattedMemory}}\n{{/if}}End";
        let context = TemplateContext::default().with("formattedMemory", "- a: 1");

        assert_eq!(render(template, &context), "Start\n\nMemory:\n- a: 1\nEnd");
        assert_eq!(render(template, &TemplateContext::default()), "Start\nEnd");
    }

    #[test]
    fn turn_context_splits_locale_and_formats_memory() {
        let caller = CallerContext {
            ip: Some("203.0.113.9".to_string()),
            country: None,
            timezone: Some("Europe/Oslo".to_string()),
            locale: Some("nb-NO".to_string()),
        };
        let memory = MemoryState::new();
        memory.set("team", json!("Rosenborg"));

        let context = TemplateContext::for_turn(&UserId::from("u1"), &caller, Some(&memory));

        assert_eq!(context.get("userLanguage"), Some("nb"));
        assert_eq!(context.get("userRegion"), Some("NO"));
        assert_eq!(context.get("userCountry"), None);
        assert!(context.get("serverTime").is_some_and(|time| time.ends_with('Z')));
        assert!(
            context
                .get("formattedMemory")
                .is_some_and(|text| text.contains("team"))
        );
    }

    #[test]
    fn system_prompt_ends_with_message_handling_rules() {
        let prompt = build_system_prompt(
            &TemplateRenderer,
            "You are {{userId}}'s guide.",
            &TemplateContext::default().with("userId", "bo"),
        );
        assert!(prompt.starts_with("You are bo's guide.\n\nIMPORTANT INSTRUCTIONS"));
        assert!(prompt.ends_with("not new user requests"));
    }
}
