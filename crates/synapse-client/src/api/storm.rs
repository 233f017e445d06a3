//! Storm API.

use futures::StreamExt;
use serde_json::Value;
use tokio_stream::Stream;

use crate::client::SynapseClient;
use crate::error::{Error, Result};
use crate::storm::{self, LineBuffer, SchemaPolicy, StormMessage, StormResults};
use crate::types::{StormCallRequest, StormOpts, StormRequest};

/// Storm API client.
pub struct StormApi {
    client: SynapseClient,
}

impl StormApi {
    pub(crate) fn new(client: SynapseClient) -> Self {
        Self { client }
    }

    /// Run a query and decode the whole response.
    pub async fn query(&self, query: &str, opts: Option<StormOpts>) -> Result<StormResults> {
        let request = StormRequest::new(query).with_opts(opts.unwrap_or_default());
        self.run(&request, SchemaPolicy::Skip).await
    }

    /// Run a query request with an explicit schema policy.
    pub async fn run(&self, request: &StormRequest, policy: SchemaPolicy) -> Result<StormResults> {
        let response = self.client.post_stream("storm", request).await?;
        let body = response.bytes().await?;
        tracing::debug!(bytes = body.len(), "Storm response body received");

        let results = storm::decode_with(&body, policy)?;
        if results.skipped > 0 {
            tracing::debug!(skipped = results.skipped, "Storm response had skipped lines");
        }
        Ok(results)
    }

    /// Stream messages as the Cortex emits them.
    ///
    /// Lines that fail to decode are logged and skipped, the same as
    /// [`storm::decode`].
    pub async fn stream(
        &self,
        request: StormRequest,
    ) -> Result<impl Stream<Item = Result<StormMessage>> + use<>> {
        let response = self.client.post_stream("storm", &request).await?;

        Ok(async_stream::stream! {
            let mut lines = LineBuffer::new();
            let mut chunks = response.bytes_stream();

            while let Some(chunk) = chunks.next().await {
                let chunk = match chunk {
                    Ok(chunk) => chunk,
                    Err(e) => {
                        yield Err(Error::Stream(e.to_string()));
                        return;
                    }
                };
                match lines.push(&chunk) {
                    Ok(complete) => {
                        for line in complete {
                            for message in decode_logged(&line) {
                                yield Ok(message);
                            }
                        }
                    }
                    Err(e) => {
                        yield Err(e);
                        return;
                    }
                }
            }

            match lines.finish() {
                Ok(Some(line)) => {
                    for message in decode_logged(&line) {
                        yield Ok(message);
                    }
                }
                Ok(None) => {}
                Err(e) => {
                    yield Err(e);
                }
            }
        })
    }

    /// Evaluate a query and return the value it `return()`s.
    pub async fn call(&self, query: &str, opts: Option<StormOpts>) -> Result<Value> {
        let request = StormCallRequest {
            query: query.to_string(),
            opts: opts.unwrap_or_default(),
        };
        self.client.post("storm/call", &request).await
    }

    /// Export the nodes a query yields, as the raw export body.
    pub async fn export(&self, query: &str, opts: Option<StormOpts>) -> Result<Vec<u8>> {
        let request = StormCallRequest {
            query: query.to_string(),
            opts: opts.unwrap_or_default(),
        };
        let response = self.client.post_stream("storm/export", &request).await?;
        Ok(response.bytes().await?.to_vec())
    }
}

fn decode_logged(line: &str) -> Vec<StormMessage> {
    storm::decode_line(line)
        .into_iter()
        .filter_map(|decoded| match decoded {
            Ok(message) => Some(message),
            Err(e) => {
                tracing::debug!(error = %e, "Skipping storm message");
                None
            }
        })
        .collect()
}
