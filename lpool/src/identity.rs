use std::fmt::{Debug, Formatter};

use serde::{Deserialize, Serialize};

/// Identity of a remote tool provider. The name doubles as the pool key and
/// the prefix of every tool it exposes.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderIdentity {
    pub name: String,
    #[serde(alias = "url")]
    pub endpoint: String,
    #[serde(default, alias = "apiKey", skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
}

impl ProviderIdentity {
    pub fn new(name: impl Into<String>, endpoint: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            endpoint: endpoint.into(),
            api_key: None,
        }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// `{provider}_{tool}`, the name the model sees.
    pub fn qualify(&self, tool_name: &str) -> String {
        qualified_tool_name(&self.name, tool_name)
    }
}

impl Debug for ProviderIdentity {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderIdentity")
            .field("name", &self.name)
            .field("endpoint", &self.endpoint)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

pub fn qualified_tool_name(provider: &str, tool_name: &str) -> String {
    format!("{provider}_{tool_name}")
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn deserializes_activity_style_aliases() {
        let identity: ProviderIdentity = serde_json::from_value(json!({
            "name": "web",
            "url": "http://localhost:8001/mcp",
            "apiKey": "secret"
        }))
        .expect("identity");

        assert_eq!(identity.endpoint, "http://localhost:8001/mcp");
        assert_eq!(identity.api_key.as_deref(), Some("secret"));
        assert_eq!(identity.qualify("fetch"), "web_fetch");
    }

    #[test]
    fn debug_output_hides_api_key() {
        let identity = ProviderIdentity::new("web", "http://x").with_api_key("secret");
        let rendered = format!("{identity:?}");
        assert!(!rendered.contains("secret"));
        assert!(rendered.contains("<redacted>"));
    }
}
