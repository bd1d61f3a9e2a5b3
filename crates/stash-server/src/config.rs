//! Server configuration

use serde::{Deserialize, Serialize};

/// Gateway server configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// Object store endpoint URL
    pub store_endpoint: String,
    /// Object store region
    pub store_region: String,
    /// Access key for the store
    pub access_key: String,
    /// Secret key for the store
    pub secret_key: String,
    /// Bucket used when an upload names none
    pub default_bucket: String,
    /// Teardown batch pack size used when a request supplies none
    pub teardown_pack_size: usize,
    /// Maximum request body size (bytes)
    pub max_body_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            store_endpoint: "http://localhost:9000".to_string(),
            store_region: "us-east-1".to_string(),
            access_key: "minioadmin".to_string(),
            secret_key: "minioadmin".to_string(),
            default_bucket: "uploads".to_string(),
            teardown_pack_size: 500,
            max_body_size: 1024 * 1024 * 1024, // 1 GB
        }
    }
}

impl ServerConfig {
    /// Get the bind address
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
