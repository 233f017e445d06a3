//! Axon API: blob storage addressed by SHA-256.

use crate::client::SynapseClient;
use crate::error::Result;
use crate::types::{AxonDeleteRequest, AxonDeleteResult, AxonPutResult};

/// Axon API client.
pub struct AxonApi {
    client: SynapseClient,
}

impl AxonApi {
    pub(crate) fn new(client: SynapseClient) -> Self {
        Self { client }
    }

    /// Upload a blob.
    pub async fn put(&self, bytes: Vec<u8>) -> Result<AxonPutResult> {
        self.client.post_bytes("axon/files/put", bytes).await
    }

    /// Whether the Axon holds a blob.
    pub async fn has(&self, sha256: &str) -> Result<bool> {
        self.client
            .get(&format!("axon/files/has/sha256/{}", sha256))
            .await
    }

    /// Download a blob.
    pub async fn get(&self, sha256: &str) -> Result<Vec<u8>> {
        self.client
            .get_bytes(&format!("axon/files/by/sha256/{}", sha256))
            .await
    }

    /// Delete blobs. Returns whether each one existed.
    pub async fn delete(&self, sha256s: &[String]) -> Result<AxonDeleteResult> {
        let request = AxonDeleteRequest {
            sha256s: sha256s.to_vec(),
        };
        self.client.post("axon/files/del", &request).await
    }
}
