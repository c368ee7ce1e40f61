//! Turn orchestration: tool preparation, history bounding, prompt rendering
//! and the model/tool round-trip loop, streamed as [`TurnEvent`]s.

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_stream::stream;
use futures_core::Stream;
use futures_util::StreamExt;
use futures_util::future::join_all;
use lcommon::{SessionId, TraceId};
use lmodel::{ModelClient, ModelEvent, ModelRequest, StopReason, ToolCall, ToolExchange};
use lpool::{ConnectionPool, PoolError};
use ltooling::{
    DefaultToolRuntime, MemoryTool, NoopToolRuntimeHooks, ToolExecutionContext, ToolRegistry,
    ToolRuntime, ToolRuntimeHooks,
};
use serde_json::Value;

use crate::{
    ChatError, KeepAlive, LocalTool, NoopTurnHooks, OrchestratorConfig, PromptRenderer,
    ProviderFailurePolicy, TemplateContext, TemplateRenderer, ToolCallHistory, TurnEvent,
    TurnEventStream, TurnHooks, TurnRequest, TurnSummary, build_system_prompt, sanitize_history,
    truncate_history,
};

#[derive(Clone)]
pub struct TurnOrchestrator {
    model: Arc<dyn ModelClient>,
    pool: ConnectionPool,
    config: OrchestratorConfig,
    hooks: Arc<dyn TurnHooks>,
    tool_hooks: Arc<dyn ToolRuntimeHooks>,
    renderer: Arc<dyn PromptRenderer>,
}

pub struct TurnOrchestratorBuilder {
    model: Arc<dyn ModelClient>,
    pool: ConnectionPool,
    config: OrchestratorConfig,
    hooks: Arc<dyn TurnHooks>,
    tool_hooks: Arc<dyn ToolRuntimeHooks>,
    renderer: Arc<dyn PromptRenderer>,
}

impl TurnOrchestratorBuilder {
    pub fn new(model: Arc<dyn ModelClient>, pool: ConnectionPool) -> Self {
        Self {
            model,
            pool,
            config: OrchestratorConfig::default(),
            hooks: Arc::new(NoopTurnHooks),
            tool_hooks: Arc::new(NoopToolRuntimeHooks),
            renderer: Arc::new(TemplateRenderer),
        }
    }

    pub fn config(mut self, config: OrchestratorConfig) -> Self {
        self.config = config;
        self
    }

    pub fn hooks(mut self, hooks: Arc<dyn TurnHooks>) -> Self {
        self.hooks = hooks;
        self
    }

    pub fn tool_hooks(mut self, hooks: Arc<dyn ToolRuntimeHooks>) -> Self {
        self.tool_hooks = hooks;
        self
    }

    pub fn renderer(mut self, renderer: Arc<dyn PromptRenderer>) -> Self {
        self.renderer = renderer;
        self
    }

    pub fn tool_timeout(mut self, timeout: Duration) -> Self {
        self.config.tool_timeout = Some(timeout);
        self
    }

    pub fn build(self) -> TurnOrchestrator {
        TurnOrchestrator {
            model: self.model,
            pool: self.pool,
            config: self.config,
            hooks: self.hooks,
            tool_hooks: self.tool_hooks,
            renderer: self.renderer,
        }
    }
}

impl TurnOrchestrator {
    pub fn new(model: Arc<dyn ModelClient>, pool: ConnectionPool) -> Self {
        Self::builder(model, pool).build()
    }

    pub fn builder(model: Arc<dyn ModelClient>, pool: ConnectionPool) -> TurnOrchestratorBuilder {
        TurnOrchestratorBuilder::new(model, pool)
    }

    pub fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    pub fn pool(&self) -> &ConnectionPool {
        &self.pool
    }

    /// Runs one turn. The stream always ends with [`TurnEvent::Done`];
    /// failures surface as [`TurnEvent::Error`] items, never as a stream
    /// error. Dropping the stream cancels the turn.
    pub fn run_turn(&self, request: TurnRequest) -> TurnEventStream<'_> {
        let inner: TurnEventStream<'_> = Box::pin(self.turn_events(request));
        Box::pin(KeepAlive::new(inner, self.config.keep_alive_interval))
    }

    fn turn_events(&self, request: TurnRequest) -> impl Stream<Item = TurnEvent> + Send + '_ {
        stream! {
            let started = Instant::now();
            let activity = Arc::clone(&request.activity);
            let session_id = SessionId::from(format!("{}:{}", activity.id, request.user_id));
            let request_id = request.request_id.clone();
            let mut summary = TurnSummary::default();

            self.hooks.on_turn_start(&activity.id, &session_id);
            tracing::debug!(
                activity = %activity.id,
                session_id = %session_id,
                request_id = request_id.as_ref().map(TraceId::as_str),
                messages = request.messages.len(),
                "turn started"
            );

            'turn: {
                let mut registry = ToolRegistry::new();
                let memory = if activity.has_local_tool(LocalTool::Memory) {
                    let state = request.memory_state.clone().unwrap_or_default();
                    registry.register(MemoryTool::new(state.clone()));
                    Some(state)
                } else {
                    None
                };

                if !activity.providers.is_empty() {
                    let provider_names = activity.provider_names();
                    if let Err(error) = self.pool.ensure_connected(&activity.providers).await {
                        self.hooks.on_connect_failure(&activity.id, &provider_names, &error);
                        match activity.provider_failure {
                            ProviderFailurePolicy::Abort => {
                                tracing::error!(
                                    activity = %activity.id,
                                    provider = %error.provider,
                                    request_id = request_id.as_ref().map(TraceId::as_str),
                                    error = %error,
                                    "tool provider connection failed; aborting turn"
                                );
                                summary.failed = true;
                                yield TurnEvent::error(
                                    connect_failure_message(&provider_names, &error, request_id.as_ref()),
                                    request_id.as_ref(),
                                );
                                break 'turn;
                            }
                            ProviderFailurePolicy::Degrade => {
                                tracing::warn!(
                                    activity = %activity.id,
                                    provider = %error.provider,
                                    error = %error,
                                    "tool provider connection failed; continuing with available tools"
                                );
                            }
                        }
                    }
                    registry.extend(self.pool.list_tools(&provider_names));
                }

                let messages = sanitize_history(truncate_history(
                    &request.messages,
                    activity.max_history_bytes,
                    activity.max_history_messages,
                ));

                let context = TemplateContext::for_turn(&request.user_id, &request.caller, memory.as_ref());
                let system_prompt =
                    build_system_prompt(self.renderer.as_ref(), &activity.system_prompt, &context);

                let mut runtime = DefaultToolRuntime::new(Arc::new(registry))
                    .with_hooks(Arc::clone(&self.tool_hooks));
                if let Some(timeout) = self.config.tool_timeout {
                    runtime = runtime.with_timeout(timeout);
                }
                let tools = runtime.registry().definitions();

                let mut tool_context = ToolExecutionContext::new(session_id.clone())
                    .with_caller(request.caller_metadata())
                    .with_metadata("activity", activity.id.clone());
                if let Some(id) = &request_id {
                    tool_context = tool_context.with_trace_id(id.clone());
                }

                let base_request = match ModelRequest::builder(activity.model.model.clone())
                    .system_prompt(system_prompt)
                    .messages(messages)
                    .tools(tools)
                    .options(activity.model.generation_options())
                    .metadata("activity", activity.id.clone())
                    .metadata("user_id", request.user_id.to_string())
                    .build()
                {
                    Ok(model_request) => model_request,
                    Err(error) => {
                        let error = ChatError::from(error);
                        yield self.failure_event(&activity.id, &session_id, &error, request_id.as_ref());
                        summary.failed = true;
                        break 'turn;
                    }
                };

                let max_round_trips = activity
                    .max_round_trips
                    .filter(|limit| *limit > 0)
                    .unwrap_or(self.config.max_round_trips);
                let mut exchanges: Vec<ToolExchange> = Vec::new();
                let mut history = ToolCallHistory::new();
                let mut failure: Option<ChatError> = None;
                let mut reported_error = false;

                'rounds: while summary.round_trips < max_round_trips {
                    summary.round_trips += 1;
                    let round_request = base_request.clone().with_exchanges(exchanges.clone());

                    let mut events = match self.model.stream(round_request).await {
                        Ok(events) => events,
                        Err(error) => {
                            failure = Some(ChatError::from(error));
                            break 'rounds;
                        }
                    };

                    let mut pending_calls: Vec<ToolCall> = Vec::new();
                    while let Some(event) = events.next().await {
                        match event {
                            Err(error) => {
                                failure = Some(ChatError::from(error));
                                break 'rounds;
                            }
                            Ok(ModelEvent::TextDelta(text)) => {
                                summary.generated_chars += text.chars().count();
                                yield TurnEvent::TextDelta { text };
                            }
                            Ok(ModelEvent::ReasoningDelta(text)) => {
                                yield TurnEvent::Reasoning { text };
                            }
                            Ok(ModelEvent::ToolCallStarted(call)) => {
                                pending_calls.push(call);
                            }
                            Ok(ModelEvent::ToolCallResult(result)) => {
                                let call = ToolCall::new(
                                    result.tool_call_id.clone(),
                                    result.tool_name.clone(),
                                    Value::Null,
                                );
                                exchanges.push(ToolExchange { call, result });
                            }
                            Ok(ModelEvent::Error(error)) => {
                                let error = ChatError::from(error);
                                reported_error = true;
                                summary.failed = true;
                                yield self.failure_event(&activity.id, &session_id, &error, request_id.as_ref());
                            }
                            Ok(ModelEvent::Finish { stop_reason, usage }) => {
                                summary.stop_reason = Some(stop_reason);
                                summary.usage.accumulate(usage);
                            }
                            Ok(ModelEvent::Unknown(kind)) => {
                                tracing::trace!(activity = %activity.id, kind = %kind, "ignoring unknown model event");
                            }
                        }
                    }

                    if reported_error || pending_calls.is_empty() {
                        break 'rounds;
                    }

                    for call in &pending_calls {
                        let previous = history.record_call(call);
                        if self.config.detect_repeated_calls && previous >= self.config.max_tool_retries {
                            tracing::warn!(
                                activity = %activity.id,
                                session_id = %session_id,
                                tool_name = %call.name,
                                previous_calls = previous,
                                "possible tool hallucination: identical call repeated"
                            );
                            self.hooks.on_hallucination_signal(&activity.id, &session_id, call, previous);
                        }
                    }

                    summary.tool_calls += pending_calls.len();
                    let results = join_all(
                        pending_calls
                            .into_iter()
                            .map(|call| runtime.execute(call, tool_context.clone())),
                    )
                    .await;

                    for result in results {
                        let call = result.call.clone();
                        exchanges.push(ToolExchange {
                            call,
                            result: result.into_tool_result(),
                        });
                    }

                    if summary.round_trips == max_round_trips {
                        tracing::warn!(
                            activity = %activity.id,
                            session_id = %session_id,
                            max_round_trips,
                            "tool round-trip limit reached"
                        );
                    }
                }

                if let Some(error) = failure {
                    summary.failed = true;
                    yield self.failure_event(&activity.id, &session_id, &error, request_id.as_ref());
                } else if summary.generated_chars == 0 && !reported_error {
                    let reason = summary
                        .stop_reason
                        .map(|reason| reason.as_str())
                        .unwrap_or("unknown");
                    tracing::warn!(
                        activity = %activity.id,
                        session_id = %session_id,
                        finish_reason = reason,
                        round_trips = summary.round_trips,
                        "model returned no content"
                    );
                    self.hooks.on_empty_output(&activity.id, &session_id, reason);
                    yield TurnEvent::text(empty_output_message(summary.stop_reason, request_id.as_ref()));
                }

                // Memory edits from earlier rounds survive a failed later round.
                if let Some(memory) = memory {
                    yield TurnEvent::MemoryUpdate { state: memory.snapshot() };
                }
            }

            let elapsed = started.elapsed();
            self.hooks.on_turn_finish(&activity.id, &session_id, &summary, elapsed);
            tracing::info!(
                activity = %activity.id,
                session_id = %session_id,
                round_trips = summary.round_trips,
                tool_calls = summary.tool_calls,
                failed = summary.failed,
                elapsed_ms = elapsed.as_millis() as u64,
                "turn finished"
            );
            yield TurnEvent::Done;
        }
    }

    fn failure_event(
        &self,
        activity_id: &str,
        session_id: &SessionId,
        error: &ChatError,
        request_id: Option<&TraceId>,
    ) -> TurnEvent {
        tracing::error!(
            activity = %activity_id,
            session_id = %session_id,
            request_id = request_id.map(TraceId::as_str),
            category = ?error.category,
            error = %error,
            "turn failed"
        );
        self.hooks.on_model_error(activity_id, session_id, error);
        TurnEvent::error(error.user_message(request_id), request_id)
    }
}

fn request_id_suffix(request_id: Option<&TraceId>) -> String {
    request_id
        .map(|id| format!(" Request ID: {id}"))
        .unwrap_or_default()
}

fn connect_failure_message(
    providers: &[String],
    error: &PoolError,
    request_id: Option<&TraceId>,
) -> String {
    format!(
        "_Failed to connect to required tools: {}. Error: {}.{}_",
        providers.join(", "),
        error,
        request_id_suffix(request_id)
    )
}

fn empty_output_message(stop_reason: Option<StopReason>, request_id: Option<&TraceId>) -> String {
    format!(
        "_The AI model returned no content. Finish reason: {}.{}_",
        stop_reason.map(|reason| reason.as_str()).unwrap_or("unknown"),
        request_id_suffix(request_id)
    )
}

#[cfg(test)]
mod tests {
    use lpool::ProtocolError;

    use super::*;

    #[test]
    fn connect_failure_message_names_providers_and_request() {
        let error = PoolError::connect("web", ProtocolError::connect("connection refused"));
        let message = connect_failure_message(
            &["web".to_string(), "trivia".to_string()],
            &error,
            Some(&TraceId::from("req-9")),
        );

        assert!(message.starts_with("_Failed to connect to required tools: web, trivia. Error: "));
        assert!(message.contains("connection refused"));
        assert!(message.ends_with(". Request ID: req-9_"));
    }

    #[test]
    fn empty_output_message_reports_finish_reason() {
        assert_eq!(
            empty_output_message(Some(StopReason::MaxTokens), None),
            "_The AI model returned no content. Finish reason: length._"
        );
        assert_eq!(
            empty_output_message(None, Some(&TraceId::from("r1"))),
            "_The AI model returned no content. Finish reason: unknown. Request ID: r1_"
        );
    }
}
