//! Tool trait contract and a closure-backed implementation for local tools.
//!
//! ```rust
//! use lmodel::{ToolContent, ToolDefinition};
//! use ltooling::{FunctionTool, Tool};
//! use serde_json::json;
//!
//! let tool = FunctionTool::new(
//!     ToolDefinition {
//!         name: "echo".to_string(),
//!         description: "Echoes input".to_string(),
//!         input_schema: json!({ "type": "object" }),
//!     },
//!     |args, _ctx| async move { Ok(vec![ToolContent::text(args.to_string())]) },
//! );
//!
//! assert_eq!(tool.definition().name, "echo");
//! ```

use std::future::Future;
use std::sync::Arc;

use lcommon::BoxFuture;
use lmodel::{ToolContent, ToolDefinition};
use serde_json::Value;

use crate::{ToolError, ToolErrorKind, ToolExecutionContext, ToolFailureKind, ToolOutput};

pub type ToolFuture<'a, T> = BoxFuture<'a, T>;

/// A uniformly invocable tool. `invoke` never fails: every failure mode is
/// returned as [`ToolOutput::Failure`] content.
pub trait Tool: Send + Sync {
    fn definition(&self) -> ToolDefinition;

    fn invoke<'a>(
        &'a self,
        arguments: &'a Value,
        context: &'a ToolExecutionContext,
    ) -> ToolFuture<'a, ToolOutput>;
}

type ToolHandler = dyn Fn(Value, ToolExecutionContext) -> ToolFuture<'static, Result<Vec<ToolContent>, ToolError>>
    + Send
    + Sync;

pub struct FunctionTool {
    definition: ToolDefinition,
    handler: Arc<ToolHandler>,
}

impl FunctionTool {
    pub fn new<F, Fut>(definition: ToolDefinition, handler: F) -> Self
    where
        F: Fn(Value, ToolExecutionContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Vec<ToolContent>, ToolError>> + Send + 'static,
    {
        let handler: Arc<ToolHandler> =
            Arc::new(move |arguments, context| Box::pin(handler(arguments, context)));

        Self {
            definition,
            handler,
        }
    }
}

impl Tool for FunctionTool {
    fn definition(&self) -> ToolDefinition {
        self.definition.clone()
    }

    fn invoke<'a>(
        &'a self,
        arguments: &'a Value,
        context: &'a ToolExecutionContext,
    ) -> ToolFuture<'a, ToolOutput> {
        let pending = (self.handler)(arguments.clone(), context.clone());
        Box::pin(async move {
            match pending.await {
                Ok(content) => ToolOutput::Content(content),
                Err(error) => error_output(&self.definition.name, &error),
            }
        })
    }
}

/// Renders a tool error as failure content addressed to the model.
pub fn error_output(tool_name: &str, error: &ToolError) -> ToolOutput {
    let kind = match error.kind {
        ToolErrorKind::NotFound => ToolFailureKind::NotFound,
        ToolErrorKind::InvalidArguments => ToolFailureKind::InvalidArguments,
        ToolErrorKind::Timeout => ToolFailureKind::Timeout,
        ToolErrorKind::Execution | ToolErrorKind::Transport | ToolErrorKind::Other => {
            ToolFailureKind::Exception
        }
    };

    ToolOutput::failure(
        kind,
        format!(
            "Error executing tool '{tool_name}': {}\n\nPlease review the error and try again with corrected arguments.",
            error.message
        ),
    )
}
