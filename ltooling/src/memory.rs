//! Per-turn key/value memory exposed to the model as the `memory` tool.
//!
//! The state is seeded from the client, mutated by tool calls during the
//! turn and handed back once the turn finishes.
//!
//! ```rust
//! use ltooling::{MemoryState, format_memory_for_prompt};
//! use serde_json::json;
//!
//! let state = MemoryState::new();
//! state.set("favorite_team", json!("Lakers"));
//!
//! assert_eq!(state.get("favorite_team"), Some(json!("Lakers")));
//! assert!(format_memory_for_prompt(&state).contains("favorite_team: \"Lakers\""));
//! ```

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use lmodel::{ToolContent, ToolDefinition};
use serde_json::{Map, Value, json};

use crate::{
    ArgumentSchema, Tool, ToolError, ToolExecutionContext, ToolFuture, ToolOutput, argument_object,
    error_output, optional_string, required_string,
};

pub const MEMORY_TOOL_NAME: &str = "memory";

#[derive(Debug, Clone, Default)]
pub struct MemoryState {
    entries: Arc<Mutex<Map<String, Value>>>,
}

impl MemoryState {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Map<String, Value>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn get(&self, key: &str) -> Option<Value> {
        self.lock().get(key).cloned()
    }

    pub fn set(&self, key: impl Into<String>, value: Value) -> Option<Value> {
        self.lock().insert(key.into(), value)
    }

    pub fn delete(&self, key: &str) -> Option<Value> {
        self.lock().remove(key)
    }

    pub fn keys(&self) -> Vec<String> {
        self.lock().keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn snapshot(&self) -> Map<String, Value> {
        self.lock().clone()
    }
}

impl From<Map<String, Value>> for MemoryState {
    fn from(entries: Map<String, Value>) -> Self {
        Self {
            entries: Arc::new(Mutex::new(entries)),
        }
    }
}

/// Renders the memory as a prompt fragment; empty memory renders as `""` so
/// `{{#if formattedMemory}}` blocks stay hidden.
pub fn format_memory_for_prompt(state: &MemoryState) -> String {
    let entries = state.snapshot();
    if entries.is_empty() {
        return String::new();
    }

    let mut rendered = String::from("Known facts about the user:");
    for (key, value) in &entries {
        rendered.push_str(&format!("\n- {key}: {value}"));
    }
    rendered
}

#[derive(Debug, Clone)]
pub struct MemoryTool {
    state: MemoryState,
}

impl MemoryTool {
    pub fn new(state: MemoryState) -> Self {
        Self { state }
    }

    pub fn state(&self) -> &MemoryState {
        &self.state
    }

    fn apply(&self, arguments: &Value) -> Result<Vec<ToolContent>, ToolError> {
        let args = argument_object(arguments)?;
        let action = required_string(args, "action")?;
        let message = match action.as_str() {
            "set" => {
                let key = required_string(args, "key")?;
                let value = args.get("value").cloned().ok_or_else(|| {
                    ToolError::invalid_arguments("missing required argument 'value'")
                })?;
                self.state.set(key.clone(), value);
                format!("Stored '{key}'.")
            }
            "get" => {
                let key = required_string(args, "key")?;
                match self.state.get(&key) {
                    Some(value) => value.to_string(),
                    None => format!("No value stored for '{key}'."),
                }
            }
            "delete" => {
                let key = required_string(args, "key")?;
                match self.state.delete(&key) {
                    Some(_) => format!("Deleted '{key}'."),
                    None => format!("No value stored for '{key}'."),
                }
            }
            "list" => {
                let prefix = optional_string(args, "prefix").unwrap_or_default();
                let keys: Vec<String> = self
                    .state
                    .keys()
                    .into_iter()
                    .filter(|key| key.starts_with(&prefix))
                    .collect();
                json!(keys).to_string()
            }
            other => {
                return Err(ToolError::invalid_arguments(format!(
                    "invalid value for argument 'action': expected one of set, get, delete, list, got '{other}'"
                )));
            }
        };
        Ok(vec![ToolContent::text(message)])
    }
}

impl Tool for MemoryTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: MEMORY_TOOL_NAME.to_string(),
            description: "Remember facts about the user across the conversation. \
                          Actions: set (key, value), get (key), delete (key), list (optional prefix)."
                .to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "action": { "type": "string", "enum": ["set", "get", "delete", "list"] },
                    "key": { "type": "string" },
                    "value": { "description": "Any JSON value to store" },
                    "prefix": { "type": "string" }
                },
                "required": ["action"]
            }),
        }
    }

    fn invoke<'a>(
        &'a self,
        arguments: &'a Value,
        _context: &'a ToolExecutionContext,
    ) -> ToolFuture<'a, ToolOutput> {
        Box::pin(async move {
            let schema = ArgumentSchema::from_json_schema(&self.definition().input_schema);
            match schema.validate(arguments).and_then(|_| self.apply(arguments)) {
                Ok(content) => ToolOutput::Content(content),
                Err(error) => error_output(MEMORY_TOOL_NAME, &error),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ToolFailureKind;

    async fn call(tool: &MemoryTool, arguments: Value) -> ToolOutput {
        tool.invoke(&arguments, &ToolExecutionContext::new("s1")).await
    }

    #[tokio::test]
    async fn set_get_delete_cycle_mutates_shared_state() {
        let state = MemoryState::new();
        let tool = MemoryTool::new(state.clone());

        call(&tool, json!({ "action": "set", "key": "city", "value": "Oslo" })).await;
        assert_eq!(state.get("city"), Some(json!("Oslo")));

        let fetched = call(&tool, json!({ "action": "get", "key": "city" })).await;
        assert_eq!(fetched.to_text(), "\"Oslo\"");

        call(&tool, json!({ "action": "delete", "key": "city" })).await;
        assert!(state.is_empty());
    }

    #[tokio::test]
    async fn list_filters_by_prefix() {
        let mut seed = Map::new();
        seed.insert("pref_color".to_string(), json!("blue"));
        seed.insert("pref_size".to_string(), json!("L"));
        seed.insert("name".to_string(), json!("Ada"));
        let tool = MemoryTool::new(MemoryState::from(seed));

        let listed = call(&tool, json!({ "action": "list", "prefix": "pref_" })).await;
        assert_eq!(listed.to_text(), r#"["pref_color","pref_size"]"#);
    }

    #[tokio::test]
    async fn bad_arguments_become_failure_content() {
        let tool = MemoryTool::new(MemoryState::new());

        let missing = call(&tool, json!({ "key": "x" })).await;
        assert_eq!(missing.failure_kind(), Some(ToolFailureKind::InvalidArguments));
        assert!(missing.to_text().contains("'action'"));

        let unknown = call(&tool, json!({ "action": "merge" })).await;
        assert!(unknown.to_text().contains("'merge'"));
    }

    #[test]
    fn empty_memory_formats_to_empty_string() {
        assert_eq!(format_memory_for_prompt(&MemoryState::new()), "");
    }
}
