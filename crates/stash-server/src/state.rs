//! Application state

use crate::config::ServerConfig;
use stash_gateway::{GatewayService, S3Config, S3ObjectStore, ServiceConfig};
use std::sync::Arc;

/// Application state shared across handlers
pub struct AppState {
    /// Server configuration
    pub config: ServerConfig,
    /// The gateway service this server fronts
    pub service: GatewayService,
}

impl AppState {
    /// Create a new application state over an S3-compatible store
    pub fn new(config: ServerConfig) -> Self {
        let store = S3ObjectStore::connect(S3Config {
            endpoint: config.store_endpoint.clone(),
            region: config.store_region.clone(),
            access_key: config.access_key.clone(),
            secret_key: config.secret_key.clone(),
        });

        let service = GatewayService::new(
            Arc::new(store),
            ServiceConfig {
                default_bucket: config.default_bucket.clone(),
                teardown_pack_size: config.teardown_pack_size,
            },
        );

        Self { config, service }
    }
}
