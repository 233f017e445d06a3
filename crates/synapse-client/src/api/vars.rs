//! Vars API: global Cortex variables.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::client::SynapseClient;
use crate::error::Result;
use crate::types::NameRequest;

/// Vars API client.
pub struct VarsApi {
    client: SynapseClient,
}

impl VarsApi {
    pub(crate) fn new(client: SynapseClient) -> Self {
        Self { client }
    }

    /// All variables.
    pub async fn get(&self) -> Result<Map<String, Value>> {
        self.client.get("vars/get").await
    }

    /// Set variables from a map of name to value.
    pub async fn set<B: Serialize + ?Sized>(&self, vars: &B) -> Result<Value> {
        self.client.post("vars/set", vars).await
    }

    /// Remove a variable and return its last value.
    pub async fn pop(&self, name: &str) -> Result<Value> {
        let request = NameRequest {
            name: name.to_string(),
        };
        self.client.post("vars/pop", &request).await
    }
}
