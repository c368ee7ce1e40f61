//! Streamable-HTTP JSON-RPC transport for tool providers.
//!
//! A session is opened with an `initialize` request (the server may assign a
//! session id through the `mcp-session-id` header), acknowledged with
//! `notifications/initialized`, and then serves `tools/list` and
//! `tools/call`. Replies arrive either as plain JSON or as a server-sent
//! event stream carrying the JSON-RPC response.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use ltooling::CallerMetadata;
use reqwest::header::{ACCEPT, CONTENT_TYPE, HeaderMap};
use reqwest::{Client, Response};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::{
    CallToolResult, PoolFuture, ProtocolError, ProviderConnector, ProviderIdentity,
    ProviderSession, RemoteToolSpec,
};

const SESSION_HEADER: &str = "mcp-session-id";
const PROTOCOL_VERSION: &str = "2025-03-26";
const ACCEPT_VALUE: &str = "application/json, text/event-stream";

#[derive(Debug, Clone)]
pub struct HttpProviderConnector {
    client: Client,
    client_name: String,
}

impl Default for HttpProviderConnector {
    fn default() -> Self {
        Self::new(Client::new())
    }
}

impl HttpProviderConnector {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            client_name: "lattice".to_string(),
        }
    }

    /// Builds a client whose every request is bounded by `timeout`.
    pub fn with_timeout(timeout: Duration) -> Result<Self, ProtocolError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| ProtocolError::connect(err.to_string()))?;
        Ok(Self::new(client))
    }

    pub fn with_client_name(mut self, client_name: impl Into<String>) -> Self {
        self.client_name = client_name.into();
        self
    }
}

impl ProviderConnector for HttpProviderConnector {
    fn connect<'a>(
        &'a self,
        identity: &'a ProviderIdentity,
    ) -> PoolFuture<'a, Result<Arc<dyn ProviderSession>, ProtocolError>> {
        Box::pin(async move {
            let mut session = HttpProviderSession {
                client: self.client.clone(),
                endpoint: identity.endpoint.clone(),
                api_key: identity.api_key.clone(),
                session_id: None,
                next_id: AtomicU64::new(1),
            };

            let params = json!({
                "protocolVersion": PROTOCOL_VERSION,
                "capabilities": {},
                "clientInfo": {
                    "name": self.client_name,
                    "version": env!("CARGO_PKG_VERSION"),
                }
            });
            let (headers, _) = session
                .request("initialize", Some(params))
                .await
                .map_err(|err| ProtocolError::connect(err.message))?;

            session.session_id = headers
                .get(SESSION_HEADER)
                .and_then(|value| value.to_str().ok())
                .map(ToString::to_string);

            session
                .notify("notifications/initialized")
                .await
                .map_err(|err| ProtocolError::connect(err.message))?;

            Ok(Arc::new(session) as Arc<dyn ProviderSession>)
        })
    }
}

#[derive(Debug, Serialize)]
struct RpcRequest<'a> {
    jsonrpc: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<u64>,
    method: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    params: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct RpcResponse {
    #[serde(default)]
    id: Option<Value>,
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<RpcErrorBody>,
}

#[derive(Debug, Deserialize)]
struct RpcErrorBody {
    code: i64,
    message: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListToolsPage {
    #[serde(default)]
    tools: Vec<RemoteToolSpec>,
    #[serde(default)]
    next_cursor: Option<String>,
}

#[derive(Debug)]
pub struct HttpProviderSession {
    client: Client,
    endpoint: String,
    api_key: Option<String>,
    session_id: Option<String>,
    next_id: AtomicU64,
}

impl HttpProviderSession {
    pub fn session_id(&self) -> Option<&str> {
        self.session_id.as_deref()
    }

    fn post(&self) -> reqwest::RequestBuilder {
        let mut builder = self
            .client
            .post(&self.endpoint)
            .header(ACCEPT, ACCEPT_VALUE)
            .header(CONTENT_TYPE, "application/json");
        if let Some(api_key) = &self.api_key {
            builder = builder.bearer_auth(api_key);
        }
        if let Some(session_id) = &self.session_id {
            builder = builder.header(SESSION_HEADER, session_id);
        }
        builder
    }

    async fn send(&self, body: &RpcRequest<'_>) -> Result<Response, ProtocolError> {
        let response = self
            .post()
            .json(body)
            .send()
            .await
            .map_err(|err| ProtocolError::http(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(ProtocolError::http(format!(
                "{} returned {status}: {}",
                body.method,
                text.trim()
            )));
        }
        Ok(response)
    }

    async fn request(
        &self,
        method: &str,
        params: Option<Value>,
    ) -> Result<(HeaderMap, Value), ProtocolError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let response = self
            .send(&RpcRequest {
                jsonrpc: "2.0",
                id: Some(id),
                method,
                params,
            })
            .await?;

        let headers = response.headers().clone();
        let is_event_stream = headers
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .is_some_and(|value| value.starts_with("text/event-stream"));
        let body = response
            .text()
            .await
            .map_err(|err| ProtocolError::http(err.to_string()))?;

        let reply = if is_event_stream {
            find_sse_reply(&body, id)?
        } else {
            serde_json::from_str::<RpcResponse>(&body)
                .map_err(|err| ProtocolError::decode(format!("{method}: {err}")))?
        };

        if let Some(error) = reply.error {
            return Err(ProtocolError::rpc(format!(
                "{} (code {})",
                error.message, error.code
            )));
        }
        Ok((headers, reply.result.unwrap_or(Value::Null)))
    }

    async fn notify(&self, method: &str) -> Result<(), ProtocolError> {
        self.send(&RpcRequest {
            jsonrpc: "2.0",
            id: None,
            method,
            params: None,
        })
        .await?;
        Ok(())
    }
}

/// Extracts the JSON-RPC response with the given id from an event stream
/// body. Notifications and unrelated messages are skipped.
fn find_sse_reply(body: &str, id: u64) -> Result<RpcResponse, ProtocolError> {
    for payload in sse_data_payloads(body) {
        let Ok(reply) = serde_json::from_str::<RpcResponse>(&payload) else {
            continue;
        };
        if reply.id.as_ref().and_then(Value::as_u64) == Some(id) {
            return Ok(reply);
        }
    }
    Err(ProtocolError::decode(format!(
        "event stream ended without a response to request {id}"
    )))
}

/// Joins the `data:` lines of each event; events are separated by blank lines.
fn sse_data_payloads(body: &str) -> Vec<String> {
    let mut payloads = Vec::new();
    let mut current: Vec<&str> = Vec::new();

    for line in body.lines() {
        let line = line.trim_end_matches('\r');
        if line.is_empty() {
            if !current.is_empty() {
                payloads.push(current.join("\n"));
                current.clear();
            }
            continue;
        }
        if let Some(data) = line.strip_prefix("data:") {
            current.push(data.trim_start());
        }
    }
    if !current.is_empty() {
        payloads.push(current.join("\n"));
    }
    payloads
}

impl ProviderSession for HttpProviderSession {
    fn list_tools<'a>(&'a self) -> PoolFuture<'a, Result<Vec<RemoteToolSpec>, ProtocolError>> {
        Box::pin(async move {
            let mut tools = Vec::new();
            let mut cursor: Option<String> = None;
            loop {
                let params = cursor.as_ref().map(|cursor| json!({ "cursor": cursor }));
                let (_, result) = self.request("tools/list", params).await?;
                let page: ListToolsPage = serde_json::from_value(result)
                    .map_err(|err| ProtocolError::decode(format!("tools/list: {err}")))?;
                tools.extend(page.tools);
                match page.next_cursor {
                    Some(next) if !next.is_empty() => cursor = Some(next),
                    _ => break,
                }
            }
            Ok(tools)
        })
    }

    fn call_tool<'a>(
        &'a self,
        name: &'a str,
        arguments: Value,
        meta: &'a CallerMetadata,
    ) -> PoolFuture<'a, Result<CallToolResult, ProtocolError>> {
        Box::pin(async move {
            let mut params = json!({ "name": name, "arguments": arguments });
            if !meta.is_empty() {
                params["_meta"] = serde_json::to_value(meta)
                    .map_err(|err| ProtocolError::decode(err.to_string()))?;
            }

            let (_, result) = self.request("tools/call", Some(params)).await?;
            serde_json::from_value(result)
                .map_err(|err| ProtocolError::decode(format!("tools/call: {err}")))
        })
    }

    fn close<'a>(&'a self) -> PoolFuture<'a, ()> {
        Box::pin(async move {
            let Some(session_id) = &self.session_id else {
                return;
            };
            let outcome = self
                .client
                .delete(&self.endpoint)
                .header(SESSION_HEADER, session_id)
                .send()
                .await;
            if let Err(error) = outcome {
                tracing::debug!(endpoint = %self.endpoint, error = %error, "session close failed");
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sse_payloads_are_split_on_blank_lines() {
        let body = "event: message\ndata: {\"a\":1}\n\ndata: {\"b\":\ndata: 2}\n\n";
        assert_eq!(
            sse_data_payloads(body),
            vec!["{\"a\":1}".to_string(), "{\"b\":\n2}".to_string()]
        );
    }

    #[test]
    fn sse_reply_matches_request_id() {
        let body = concat!(
            "data: {\"jsonrpc\":\"2.0\",\"method\":\"notifications/progress\"}\n\n",
            "data: {\"jsonrpc\":\"2.0\",\"id\":7,\"result\":{\"content\":[]}}\n\n"
        );
        let reply = find_sse_reply(body, 7).expect("reply");
        assert_eq!(reply.result, Some(json!({ "content": [] })));
        assert!(find_sse_reply(body, 8).is_err());
    }

    #[test]
    fn call_result_decodes_content_and_error_flag() {
        let result: CallToolResult = serde_json::from_value(json!({
            "content": [
                { "type": "text", "text": "hello" },
                { "type": "image", "data": "aGk=", "mimeType": "image/png" },
                { "type": "audio", "data": "..." }
            ],
            "isError": true
        }))
        .expect("call result");

        assert!(result.is_error);
        assert_eq!(result.content.len(), 3);
        assert!(result.content[1].is_image());
    }

    #[test]
    fn list_page_reads_cursor() {
        let page: ListToolsPage = serde_json::from_value(json!({
            "tools": [{ "name": "fetch", "inputSchema": { "type": "object" } }],
            "nextCursor": "page-2"
        }))
        .expect("page");
        assert_eq!(page.tools[0].name, "fetch");
        assert_eq!(page.next_cursor.as_deref(), Some("page-2"));
    }
}
