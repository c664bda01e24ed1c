use crate::error::PortError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// What a verification service returns for one step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionResponse {
    pub success: bool,
    pub data: Value,
    pub timestamp: String,
    pub processing_time_ms: u64,
    pub node_id: String,
    pub endpoint: String,
}

/// The remote (or simulated) backend that performs a single verification step.
///
/// The executor awaits one call at a time; implementations never see two calls
/// from the same run in flight together.
#[async_trait::async_trait]
pub trait ExecutionPort: Send + Sync {
    async fn execute(
        &self,
        endpoint: &str,
        payload: &Map<String, Value>,
        node_id: &str,
    ) -> Result<ExecutionResponse, PortError>;
}
