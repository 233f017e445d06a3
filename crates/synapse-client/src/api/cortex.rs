//! Cortex API: status, data model and ingest.

use serde::de::IgnoredAny;
use serde::Deserialize;
use serde_json::Value;

use crate::client::SynapseClient;
use crate::error::Result;
use crate::types::{CortexModel, FeedRequest, NormRequest, NormResult};

#[derive(Deserialize)]
struct ActiveResult {
    active: bool,
}

/// Cortex API client.
pub struct CortexApi {
    client: SynapseClient,
}

impl CortexApi {
    pub(crate) fn new(client: SynapseClient) -> Self {
        Self { client }
    }

    /// Whether this Cortex is the active member of its mirror set.
    pub async fn active(&self) -> Result<bool> {
        let result: ActiveResult = self.client.get("active").await?;
        Ok(result.active)
    }

    /// Cortex version and build information.
    pub async fn core_info(&self) -> Result<Value> {
        self.client.get("core/info").await
    }

    /// The full data model.
    pub async fn model(&self) -> Result<CortexModel> {
        self.client.get("model").await
    }

    /// Normalize a value for a property, e.g. `inet:ipv4` and `"1.2.3.4"`.
    pub async fn model_norm(&self, prop: &str, value: impl Into<Value>) -> Result<NormResult> {
        let request = NormRequest {
            prop: prop.to_string(),
            value: value.into(),
        };
        self.client.post("model/norm", &request).await
    }

    /// Add packed nodes.
    pub async fn feed(&self, request: &FeedRequest) -> Result<()> {
        let _: IgnoredAny = self.client.post("feed", request).await?;
        Ok(())
    }
}
