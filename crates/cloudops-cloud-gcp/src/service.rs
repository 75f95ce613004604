//! Cloud Run service definition

use serde::{Deserialize, Serialize};

/// Tag pushed and deployed on every run
pub const IMAGE_TAG: &str = "latest";

/// Artifact Registry image reference for a service
///
/// `{region}-docker.pkg.dev/{project}/{registry}/{service}:latest`
pub fn image_reference(region: &str, project: &str, registry: &str, service: &str) -> String {
    format!("{region}-docker.pkg.dev/{project}/{registry}/{service}:{IMAGE_TAG}")
}

/// Resource and scaling profile applied on every deploy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceProfile {
    pub memory: String,
    pub cpu: String,
    /// 0 means scale-to-zero
    pub min_instances: u32,
    pub max_instances: u32,
    /// Concurrent requests per instance
    pub concurrency: u32,
    /// Request timeout ceiling in seconds
    pub timeout_secs: u32,
    /// CPU only allocated during request processing
    pub cpu_throttling: bool,
    /// Container port; Cloud Run passes it to the container as `PORT`
    pub port: u16,
    pub env: Vec<(String, String)>,
}

impl Default for ServiceProfile {
    fn default() -> Self {
        Self {
            memory: "1Gi".to_string(),
            cpu: "1".to_string(),
            min_instances: 0,
            max_instances: 10,
            concurrency: 80,
            timeout_secs: 300,
            cpu_throttling: true,
            port: 8080,
            env: vec![("ENVIRONMENT".to_string(), "production".to_string())],
        }
    }
}

/// Service to deploy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunService {
    pub name: String,
    pub region: String,
    pub image: String,
    pub profile: ServiceProfile,
}
