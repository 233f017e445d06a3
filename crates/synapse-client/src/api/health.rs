//! Health API.
//!
//! Checks run in order and stop at the first failure: the Cortex must be
//! active, must evaluate a trivial Storm call in the configured view, and
//! must answer a streaming Storm lookup.

use futures::StreamExt;
use serde_json::Value;

use crate::client::SynapseClient;
use crate::error::{Error, Result};
use crate::types::{HealthReport, StormOpts, StormRequest};

/// Lookup used to probe the streaming Storm endpoint.
pub const MD5_PROBE_QUERY: &str = r#"[ hash:md5="ac46297df513b5afaceb9109fa986abe" ]"#;

/// Health API client.
pub struct HealthApi {
    client: SynapseClient,
}

impl HealthApi {
    pub(crate) fn new(client: SynapseClient) -> Self {
        Self { client }
    }

    /// Run every check in `view`.
    pub async fn run(&self, view: &str) -> Result<HealthReport> {
        let mut report = HealthReport::default();

        report.active = self.check_active().await?;
        if !report.active {
            tracing::error!("/active reported inactive");
            return Ok(report);
        }

        report.storm_call = self.check_storm_call(view).await?;
        if !report.storm_call {
            tracing::error!("/storm/call failed");
            return Ok(report);
        }

        report.storm_stream = self.check_storm_stream(view).await?;
        if !report.storm_stream {
            tracing::error!("/storm MD5 lookup failed");
        }

        Ok(report)
    }

    /// Check that `/active` reports the Cortex as active.
    ///
    /// Accepts both `{"active": ..}` and the usual response envelope.
    pub async fn check_active(&self) -> Result<bool> {
        let body = self.client.get_value("active").await?;

        if let Some(active) = body.get("active").and_then(Value::as_bool) {
            return Ok(active);
        }
        if body.get("status").and_then(Value::as_str) == Some("ok") {
            if let Some(active) = body
                .get("result")
                .and_then(|r| r.get("active"))
                .and_then(Value::as_bool)
            {
                return Ok(active);
            }
        }

        Err(Error::UnexpectedResponse {
            endpoint: "/active".to_string(),
            body: body.to_string(),
        })
    }

    /// Check that `return(1)` evaluates to `1` in `view`.
    pub async fn check_storm_call(&self, view: &str) -> Result<bool> {
        let result = self
            .client
            .storm()
            .call("return(1)", Some(StormOpts::in_view(view)))
            .await?;

        let value = match &result {
            Value::Number(n) => n.as_i64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        };

        match value {
            Some(value) => Ok(value == 1),
            None => Err(Error::UnexpectedResponse {
                endpoint: "/storm/call".to_string(),
                body: result.to_string(),
            }),
        }
    }

    /// Check that a streaming Storm lookup returns any content.
    pub async fn check_storm_stream(&self, view: &str) -> Result<bool> {
        let request = StormRequest::new(MD5_PROBE_QUERY).with_opts(StormOpts::in_view(view));
        let response = self.client.post_stream("storm", &request).await?;

        let mut chunks = response.bytes_stream();
        while let Some(chunk) = chunks.next().await {
            let chunk = chunk?;
            if chunk.iter().any(|b| !b.is_ascii_whitespace()) {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Simple connectivity check - returns true if the Cortex is reachable and active.
    pub async fn is_healthy(&self) -> bool {
        self.check_active().await.unwrap_or(false)
    }
}
