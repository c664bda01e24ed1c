use super::port::{ExecutionPort, ExecutionResponse};
use crate::error::PortError;
use ahash::{AHashMap, AHashSet};
use chrono::Utc;
use serde_json::{Map, Value, json};
use std::time::{Duration, Instant};
use tracing::debug;
use uuid::Uuid;

/// The canned payload an endpoint answers with.
#[derive(Debug, Clone)]
enum Canned {
    Liveness,
    CardCapture,
    Scanner,
    Fixed(Value),
}

impl Canned {
    fn render(&self, payload: &Map<String, Value>) -> Value {
        match self {
            Canned::Liveness => json!({
                "isLive": true,
                "confidence": 0.97,
                "livenessScore": 0.95,
                "checks": {
                    "blink": true,
                    "headMovement": true,
                    "textureAnalysis": true,
                },
            }),
            Canned::CardCapture => json!({
                "captureId": Uuid::new_v4().to_string(),
                "cardType": "national_id",
                "imageQuality": "high",
                "frontImage": "captured",
                "backImage": "captured",
            }),
            Canned::Scanner => {
                let capture_id = payload
                    .get("previousResult")
                    .and_then(|p| p.get("captureId"))
                    .cloned()
                    .unwrap_or(Value::Null);
                json!({
                    "documentNumber": "X1234567",
                    "fullName": "JANE DOE",
                    "dateOfBirth": "1990-01-01",
                    "expiryDate": "2030-01-01",
                    "nationality": "USA",
                    "mrzValid": true,
                    "sourceCaptureId": capture_id,
                })
            }
            Canned::Fixed(value) => value.clone(),
        }
    }
}

/// An in-process stand-in for the verification services.
///
/// Recognises the default `/api/liveness`, `/api/card-capture` and `/api/scanner`
/// endpoints plus any registered with [`SimulatedBackendBuilder::with_endpoint`].
/// Any other endpoint fails with [`PortError::UnknownEndpoint`].
pub struct SimulatedBackend {
    latency: Duration,
    endpoints: AHashMap<String, Canned>,
    failing: AHashSet<String>,
}

pub struct SimulatedBackendBuilder {
    latency: Duration,
    endpoints: AHashMap<String, Canned>,
    failing: AHashSet<String>,
}

impl SimulatedBackendBuilder {
    pub fn new() -> Self {
        let mut endpoints = AHashMap::new();
        endpoints.insert("/api/liveness".to_string(), Canned::Liveness);
        endpoints.insert("/api/card-capture".to_string(), Canned::CardCapture);
        endpoints.insert("/api/scanner".to_string(), Canned::Scanner);
        Self {
            latency: Duration::ZERO,
            endpoints,
            failing: AHashSet::new(),
        }
    }

    /// Artificial delay applied to every call.
    pub fn latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Registers an extra endpoint that always answers with `data`.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>, data: Value) -> Self {
        self.endpoints.insert(endpoint.into(), Canned::Fixed(data));
        self
    }

    /// Makes calls to `endpoint` fail as if the service were down.
    pub fn fail_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.failing.insert(endpoint.into());
        self
    }

    pub fn build(self) -> SimulatedBackend {
        SimulatedBackend {
            latency: self.latency,
            endpoints: self.endpoints,
            failing: self.failing,
        }
    }
}

impl Default for SimulatedBackendBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl Default for SimulatedBackend {
    fn default() -> Self {
        SimulatedBackendBuilder::new().build()
    }
}

impl SimulatedBackend {
    pub fn builder() -> SimulatedBackendBuilder {
        SimulatedBackendBuilder::new()
    }

    pub fn knows(&self, endpoint: &str) -> bool {
        self.endpoints.contains_key(endpoint)
    }
}

#[async_trait::async_trait]
impl ExecutionPort for SimulatedBackend {
    async fn execute(
        &self,
        endpoint: &str,
        payload: &Map<String, Value>,
        node_id: &str,
    ) -> Result<ExecutionResponse, PortError> {
        let started = Instant::now();
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        let canned = self
            .endpoints
            .get(endpoint)
            .ok_or_else(|| PortError::UnknownEndpoint(endpoint.to_string()))?;
        if self.failing.contains(endpoint) {
            return Err(PortError::Request {
                endpoint: endpoint.to_string(),
                message: "service unavailable".to_string(),
            });
        }

        let processing_time_ms = started.elapsed().as_millis() as u64;
        debug!(endpoint, node_id, processing_time_ms, "Simulated call answered");
        Ok(ExecutionResponse {
            success: true,
            data: canned.render(payload),
            timestamp: Utc::now().to_rfc3339(),
            processing_time_ms,
            node_id: node_id.to_string(),
            endpoint: endpoint.to_string(),
        })
    }
}
