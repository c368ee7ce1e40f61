use lresource::ResourceUrls;

pub const MAX_TOOL_PAYLOAD_BYTES_ENV: &str = "MAX_TOOL_PAYLOAD_BYTES";
pub const DEFAULT_MAX_PAYLOAD_BYTES: usize = 50 * 1024;

/// Settings shared by every remote tool descriptor built by one pool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdapterConfig {
    /// Serialized result size above which content is replaced by an error.
    pub max_payload_bytes: usize,
    pub urls: ResourceUrls,
}

impl Default for AdapterConfig {
    fn default() -> Self {
        Self {
            max_payload_bytes: DEFAULT_MAX_PAYLOAD_BYTES,
            urls: ResourceUrls::default(),
        }
    }
}

impl AdapterConfig {
    /// Reads `MAX_TOOL_PAYLOAD_BYTES` and `API_BASE_URL`; unset or
    /// unparsable values keep their defaults.
    pub fn from_env() -> Self {
        let max_payload_bytes = std::env::var(MAX_TOOL_PAYLOAD_BYTES_ENV)
            .ok()
            .and_then(|value| value.trim().parse().ok())
            .unwrap_or(DEFAULT_MAX_PAYLOAD_BYTES);

        Self {
            max_payload_bytes,
            urls: ResourceUrls::from_env(),
        }
    }

    pub fn with_max_payload_bytes(mut self, max_payload_bytes: usize) -> Self {
        self.max_payload_bytes = max_payload_bytes;
        self
    }

    pub fn with_urls(mut self, urls: ResourceUrls) -> Self {
        self.urls = urls;
        self
    }
}
