use crate::ResourceId;

pub const API_BASE_URL_ENV: &str = "API_BASE_URL";
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:5173";
const RESOURCE_PATH: &str = "/api/images/";

/// Mints and resolves public URLs for cached resources.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceUrls {
    base_url: String,
}

impl Default for ResourceUrls {
    fn default() -> Self {
        Self::new(DEFAULT_API_BASE_URL)
    }
}

impl ResourceUrls {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Reads `API_BASE_URL`, falling back to the local development origin.
    pub fn from_env() -> Self {
        match std::env::var(API_BASE_URL_ENV) {
            Ok(value) if !value.trim().is_empty() => Self::new(value.trim()),
            _ => Self::default(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn url_for(&self, id: &ResourceId) -> String {
        format!("{}{RESOURCE_PATH}{id}", self.base_url)
    }

    pub fn resolve(&self, url: &str) -> Option<ResourceId> {
        url.strip_prefix(&self.base_url)?
            .strip_prefix(RESOURCE_PATH)?
            .parse()
            .ok()
    }
}
