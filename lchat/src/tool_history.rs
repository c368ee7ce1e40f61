//! Per-turn record of tool invocations used to spot repeated calls.

use lmodel::ToolCall;

#[derive(Debug, Clone, Default)]
pub struct ToolCallHistory {
    entries: Vec<(String, String)>,
}

impl ToolCallHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Counts identical earlier `(name, args)` pairs, then appends this one.
    ///
    /// ```rust
    /// use lchat::ToolCallHistory;
    ///
    /// let mut history = ToolCallHistory::new();
    /// assert_eq!(history.record("web_search", r#"{"q":"rust"}"#), 0);
    /// assert_eq!(history.record("web_search", r#"{"q":"rust"}"#), 1);
    /// assert_eq!(history.record("web_search", r#"{"q":"go"}"#), 0);
    /// ```
    pub fn record(&mut self, name: &str, serialized_arguments: &str) -> usize {
        let previous = self
            .entries
            .iter()
            .filter(|(seen_name, seen_args)| seen_name == name && seen_args == serialized_arguments)
            .count();
        self.entries
            .push((name.to_string(), serialized_arguments.to_string()));
        previous
    }

    pub fn record_call(&mut self, call: &ToolCall) -> usize {
        self.record(&call.name, &call.serialized_arguments())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
