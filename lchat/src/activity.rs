//! Activity configuration: which model, prompt, tools and limits a
//! conversation runs with.
//!
//! ```rust
//! use lchat::{ActivityConfig, LocalTool, ProviderFailurePolicy};
//!
//! let activity: ActivityConfig = serde_json::from_str(r#"{
//!     "id": "trivia",
//!     "name": "Trivia Night",
//!     "systemPrompt": "You host a trivia game for {{userId}}.",
//!     "llm": { "provider": "openai", "model": "gpt-4o-mini" },
//!     "mcpServers": [{ "name": "trivia", "url": "http://localhost:8003/mcp" }],
//!     "localTools": ["memory"]
//! }"#).expect("activity json");
//!
//! assert_eq!(activity.model.temperature, 0.7);
//! assert_eq!(activity.max_history_bytes, 30_000);
//! assert!(activity.has_local_tool(LocalTool::Memory));
//! assert_eq!(activity.provider_failure, ProviderFailurePolicy::Abort);
//! assert_eq!(activity.provider_names(), vec!["trivia".to_string()]);
//! ```

use std::collections::BTreeSet;
use std::sync::Arc;

use lcommon::{GenerationOptions, Registry};
use lpool::ProviderIdentity;
use serde::{Deserialize, Serialize};

use crate::ChatError;

pub const DEFAULT_MAX_HISTORY_BYTES: usize = 30_000;
pub const DEFAULT_TEMPERATURE: f32 = 0.7;

fn default_max_history_bytes() -> usize {
    DEFAULT_MAX_HISTORY_BYTES
}

fn default_temperature() -> f32 {
    DEFAULT_TEMPERATURE
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
    pub model: String,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

impl ModelSettings {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            provider: None,
            model: model.into(),
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: None,
        }
    }

    pub fn generation_options(&self) -> GenerationOptions {
        let options = GenerationOptions::default().with_temperature(self.temperature);
        match self.max_tokens {
            Some(max_tokens) => options.with_max_tokens(max_tokens),
            None => options,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LocalTool {
    Memory,
}

/// What a turn does when a declared provider cannot be connected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderFailurePolicy {
    /// End the turn with a single error event.
    #[default]
    Abort,
    /// Continue with local tools only.
    Degrade,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityConfig {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub system_prompt: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub greeting_message: Option<String>,
    #[serde(alias = "llm")]
    pub model: ModelSettings,
    #[serde(default, alias = "mcpServers")]
    pub providers: Vec<ProviderIdentity>,
    #[serde(default)]
    pub local_tools: Vec<LocalTool>,
    /// Serialized history budget; 0 disables the limit.
    #[serde(default = "default_max_history_bytes")]
    pub max_history_bytes: usize,
    /// History message cap including the current message; 0 disables it.
    #[serde(default)]
    pub max_history_messages: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_round_trips: Option<u32>,
    #[serde(default)]
    pub provider_failure: ProviderFailurePolicy,
}

impl ActivityConfig {
    pub fn new(
        id: impl Into<String>,
        system_prompt: impl Into<String>,
        model: ModelSettings,
    ) -> Self {
        let id = id.into();
        Self {
            name: id.clone(),
            id,
            description: String::new(),
            system_prompt: system_prompt.into(),
            greeting_message: None,
            model,
            providers: Vec::new(),
            local_tools: Vec::new(),
            max_history_bytes: DEFAULT_MAX_HISTORY_BYTES,
            max_history_messages: 0,
            max_round_trips: None,
            provider_failure: ProviderFailurePolicy::default(),
        }
    }

    pub fn with_provider(mut self, provider: ProviderIdentity) -> Self {
        self.providers.push(provider);
        self
    }

    pub fn with_local_tool(mut self, tool: LocalTool) -> Self {
        if !self.local_tools.contains(&tool) {
            self.local_tools.push(tool);
        }
        self
    }

    pub fn with_history_limits(mut self, max_bytes: usize, max_messages: usize) -> Self {
        self.max_history_bytes = max_bytes;
        self.max_history_messages = max_messages;
        self
    }

    pub fn with_max_round_trips(mut self, max_round_trips: u32) -> Self {
        self.max_round_trips = Some(max_round_trips);
        self
    }

    pub fn with_provider_failure(mut self, policy: ProviderFailurePolicy) -> Self {
        self.provider_failure = policy;
        self
    }

    pub fn has_local_tool(&self, tool: LocalTool) -> bool {
        self.local_tools.contains(&tool)
    }

    pub fn provider_names(&self) -> Vec<String> {
        self.providers
            .iter()
            .map(|provider| provider.name.clone())
            .collect()
    }

    pub fn validate(&self) -> Result<(), ChatError> {
        if self.id.trim().is_empty() {
            return Err(ChatError::invalid_request("activity id must not be empty"));
        }
        if self.model.model.trim().is_empty() {
            return Err(ChatError::invalid_request(format!(
                "activity '{}' does not name a model",
                self.id
            )));
        }

        let mut seen = BTreeSet::new();
        for provider in &self.providers {
            if provider.name.contains('_') {
                tracing::warn!(
                    activity = %self.id,
                    provider = %provider.name,
                    "provider name contains '_'; qualified tool names may be ambiguous"
                );
            }
            if !seen.insert(provider.name.as_str()) {
                return Err(ChatError::invalid_request(format!(
                    "activity '{}' declares provider '{}' twice",
                    self.id, provider.name
                )));
            }
        }
        Ok(())
    }
}

/// Activities keyed by id.
#[derive(Debug, Clone, Default)]
pub struct ActivityCatalog {
    activities: Registry<String, Arc<ActivityConfig>>,
}

impl ActivityCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a JSON array of activities, validating each one.
    pub fn from_json(json: &str) -> Result<Self, ChatError> {
        let activities: Vec<ActivityConfig> = serde_json::from_str(json)
            .map_err(|err| ChatError::invalid_request(format!("invalid activity config: {err}")))?;

        let mut catalog = Self::new();
        for activity in activities {
            catalog.insert(activity)?;
        }
        Ok(catalog)
    }

    pub fn insert(&mut self, activity: ActivityConfig) -> Result<(), ChatError> {
        activity.validate()?;
        self.activities
            .insert(activity.id.clone(), Arc::new(activity));
        Ok(())
    }

    pub fn get(&self, id: &str) -> Option<Arc<ActivityConfig>> {
        self.activities.get(id).cloned()
    }

    pub fn ids(&self) -> Vec<String> {
        self.activities.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.activities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.activities.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_loads_and_validates_activities() {
        let catalog = ActivityCatalog::from_json(
            r#"[
                { "id": "sports", "name": "Sports", "systemPrompt": "p", "llm": { "model": "m" } },
                { "id": "merch", "name": "Merch", "systemPrompt": "p", "llm": { "model": "m" },
                  "providerFailure": "degrade", "maxHistoryMessages": 6, "maxRoundTrips": 4 }
            ]"#,
        )
        .expect("catalog");

        assert_eq!(catalog.ids(), vec!["merch".to_string(), "sports".to_string()]);
        let merch = catalog.get("merch").expect("merch");
        assert_eq!(merch.provider_failure, ProviderFailurePolicy::Degrade);
        assert_eq!(merch.max_history_messages, 6);
        assert_eq!(merch.max_round_trips, Some(4));
    }

    #[test]
    fn duplicate_provider_names_are_rejected() {
        let activity = ActivityConfig::new("games", "p", ModelSettings::new("m"))
            .with_provider(ProviderIdentity::new("web", "http://a"))
            .with_provider(ProviderIdentity::new("web", "http://b"));

        let error = activity.validate().expect_err("duplicate");
        assert!(error.message.contains("'web' twice"));
    }

    #[test]
    fn empty_model_is_rejected() {
        let activity = ActivityConfig::new("ama", "p", ModelSettings::new(" "));
        assert!(activity.validate().is_err());
    }

    #[test]
    fn generation_options_carry_temperature() {
        let mut settings = ModelSettings::new("m");
        settings.max_tokens = Some(256);
        let options = settings.generation_options();
        assert_eq!(options.temperature, Some(0.7));
        assert_eq!(options.max_tokens, Some(256));
    }
}
