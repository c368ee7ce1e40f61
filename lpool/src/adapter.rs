//! Adapts a provider-advertised tool to the uniform [`ltooling::Tool`]
//! contract.
//!
//! Whatever happens remotely, the model receives content: provider errors
//! become instructive messages, transport failures become "try again"
//! notes, images are moved into the resource cache and oversize payloads are
//! replaced by a request to narrow the query.

use std::sync::Arc;
use std::time::Instant;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use lmodel::{ToolContent, ToolDefinition, flatten_text, serialized_size};
use lresource::ResourceCache;
use ltooling::{
    ArgumentSchema, Tool, ToolExecutionContext, ToolFailureKind, ToolFuture, ToolOutput,
};
use serde_json::{Value, json};

use crate::{AdapterConfig, ProviderIdentity, ProviderSession, RemoteToolSpec};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteErrorCategory {
    MissingArgument,
    TypeMismatch,
    Validation,
    Generic,
}

/// Buckets a provider error message by the first matching substring group,
/// checked in a fixed order.
pub fn classify_tool_error(message: &str) -> RemoteErrorCategory {
    if message.contains("required") || message.contains("missing") {
        RemoteErrorCategory::MissingArgument
    } else if message.contains("type") || message.contains("expected") {
        RemoteErrorCategory::TypeMismatch
    } else if message.contains("validation") || message.contains("invalid") {
        RemoteErrorCategory::Validation
    } else {
        RemoteErrorCategory::Generic
    }
}

/// Error text addressed to the model, naming the tool and what to fix.
pub fn instructive_error(tool_name: &str, message: &str) -> String {
    match classify_tool_error(message) {
        RemoteErrorCategory::MissingArgument => format!(
            "Error: Missing required argument for tool '{tool_name}'.\n\n\
             Error details: {message}\n\n\
             Please check the tool schema and provide all required arguments."
        ),
        RemoteErrorCategory::TypeMismatch => format!(
            "Error: Invalid argument type for tool '{tool_name}'.\n\n\
             Error details: {message}\n\n\
             Please check the expected types in the tool schema and convert your arguments accordingly."
        ),
        RemoteErrorCategory::Validation => format!(
            "Error: Argument validation failed for tool '{tool_name}'.\n\n\
             Error details: {message}\n\n\
             Please review the argument constraints and provide valid values."
        ),
        RemoteErrorCategory::Generic => format!(
            "Error executing tool '{tool_name}': {message}\n\n\
             Please review the error and try again with corrected arguments."
        ),
    }
}

pub struct RemoteTool {
    provider: String,
    qualified_name: String,
    spec: RemoteToolSpec,
    schema: ArgumentSchema,
    session: Arc<dyn ProviderSession>,
    resources: Arc<ResourceCache>,
    config: Arc<AdapterConfig>,
}

impl RemoteTool {
    pub fn new(
        identity: &ProviderIdentity,
        spec: RemoteToolSpec,
        session: Arc<dyn ProviderSession>,
        resources: Arc<ResourceCache>,
        config: Arc<AdapterConfig>,
    ) -> Self {
        Self {
            provider: identity.name.clone(),
            qualified_name: identity.qualify(&spec.name),
            schema: ArgumentSchema::from_json_schema(&spec.input_schema),
            spec,
            session,
            resources,
            config,
        }
    }

    pub fn provider(&self) -> &str {
        &self.provider
    }

    pub fn qualified_name(&self) -> &str {
        &self.qualified_name
    }

    pub fn remote_name(&self) -> &str {
        &self.spec.name
    }

    pub fn schema(&self) -> &ArgumentSchema {
        &self.schema
    }

    fn store_image(&self, data: &str, mime_type: String) -> ToolContent {
        match STANDARD.decode(data.trim()) {
            Ok(bytes) => {
                let id = self.resources.store(bytes, mime_type);
                let url = self.config.urls.url_for(&id);
                tracing::debug!(tool = %self.qualified_name, resource_id = %id, "stored tool image");
                ToolContent::text(format!("![Image]({url})"))
            }
            Err(error) => {
                tracing::warn!(tool = %self.qualified_name, error = %error, "tool image is not valid base64");
                ToolContent::text(format!(
                    "[Tool '{}' returned an image that could not be decoded: {error}]",
                    self.spec.name
                ))
            }
        }
    }

    fn process_content(&self, content: Vec<ToolContent>) -> Vec<ToolContent> {
        content
            .into_iter()
            .map(|item| match item {
                ToolContent::Image { data, mime_type } if !data.is_empty() => {
                    self.store_image(&data, mime_type)
                }
                other => other,
            })
            .collect()
    }

    fn payload_too_large(&self, size: usize) -> ToolOutput {
        let limit = self.config.max_payload_bytes;
        ToolOutput::failure(
            ToolFailureKind::PayloadTooLarge,
            format!(
                "Error: Tool '{}' returned too much data ({}kb). Limit is {}kb. \
                 Please refine your query to request less data or be more specific.",
                self.spec.name,
                rounded_kib(size),
                rounded_kib(limit)
            ),
        )
    }
}

fn rounded_kib(bytes: usize) -> usize {
    (bytes + 512) / 1024
}

impl Tool for RemoteTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: self.qualified_name.clone(),
            description: self.spec.description.clone().unwrap_or_default(),
            input_schema: self.schema.to_json_schema(),
        }
    }

    fn invoke<'a>(
        &'a self,
        arguments: &'a Value,
        context: &'a ToolExecutionContext,
    ) -> ToolFuture<'a, ToolOutput> {
        Box::pin(async move {
            let tool_name = self.spec.name.as_str();
            if let Err(error) = self.schema.validate(arguments) {
                tracing::debug!(tool = %self.qualified_name, error = %error.message, "rejected tool arguments");
                return ToolOutput::failure(
                    ToolFailureKind::InvalidArguments,
                    instructive_error(tool_name, &error.message),
                );
            }

            let arguments = match arguments {
                Value::Null => json!({}),
                other => other.clone(),
            };

            let started = Instant::now();
            let outcome = self
                .session
                .call_tool(tool_name, arguments, &context.caller)
                .await;

            match outcome {
                Err(error) => {
                    tracing::warn!(
                        provider = %self.provider,
                        tool = %tool_name,
                        error = %error,
                        "tool call failed in transport"
                    );
                    ToolOutput::failure(
                        ToolFailureKind::Exception,
                        format!(
                            "Tool execution failed for '{tool_name}': {error}\n\n\
                             This may be a temporary issue. Please try again or use different arguments."
                        ),
                    )
                }
                Ok(result) if result.is_error => {
                    let message = flatten_text(&result.content);
                    tracing::info!(
                        provider = %self.provider,
                        tool = %tool_name,
                        "provider reported tool error; returning it to the model"
                    );
                    ToolOutput::failure(
                        ToolFailureKind::RemoteError,
                        instructive_error(tool_name, &message),
                    )
                }
                Ok(result) => {
                    let processed = self.process_content(result.content);
                    let size = serialized_size(&processed);
                    if size > self.config.max_payload_bytes {
                        tracing::warn!(
                            tool = %tool_name,
                            size,
                            limit = self.config.max_payload_bytes,
                            "tool payload over limit"
                        );
                        return self.payload_too_large(size);
                    }

                    tracing::debug!(
                        tool = %tool_name,
                        elapsed_ms = started.elapsed().as_millis() as u64,
                        "tool call completed"
                    );
                    ToolOutput::Content(processed)
                }
            }
        })
    }
}
