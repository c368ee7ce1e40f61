//! Tool registry keyed by qualified tool name.

use std::future::Future;
use std::sync::Arc;

use lcommon::Registry;
use lmodel::{ToolContent, ToolDefinition};
use serde_json::Value;

use crate::{FunctionTool, Tool, ToolError, ToolExecutionContext};

#[derive(Default, Clone)]
pub struct ToolRegistry {
    tools: Registry<String, Arc<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<T>(&mut self, tool: T)
    where
        T: Tool + 'static,
    {
        self.register_arc(Arc::new(tool));
    }

    /// Later registrations replace earlier ones with the same name.
    pub fn register_arc(&mut self, tool: Arc<dyn Tool>) {
        let name = tool.definition().name;
        self.tools.insert(name, tool);
    }

    pub fn register_fn<F, Fut>(&mut self, definition: ToolDefinition, handler: F)
    where
        F: Fn(Value, ToolExecutionContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Vec<ToolContent>, ToolError>> + Send + 'static,
    {
        self.register(FunctionTool::new(definition, handler));
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    pub fn remove(&mut self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.remove(name)
    }

    pub fn names(&self) -> Vec<String> {
        self.tools.keys().cloned().collect()
    }

    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.tools.values().map(|tool| tool.definition()).collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

impl Extend<Arc<dyn Tool>> for ToolRegistry {
    fn extend<I: IntoIterator<Item = Arc<dyn Tool>>>(&mut self, iter: I) {
        for tool in iter {
            self.register_arc(tool);
        }
    }
}
