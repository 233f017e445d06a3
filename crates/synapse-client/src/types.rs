//! Request and response types for the Cortex API.
//!
//! These types mirror the Cortex HTTP API contract. Response types are
//! lenient: fields the server may omit default to empty values.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

// ─────────────────────────────────────────────────────────────────────────────
// Auth
// ─────────────────────────────────────────────────────────────────────────────

/// Login credentials.
#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub user: String,
    pub passwd: String,
}

/// Request body naming a user or role.
#[derive(Debug, Clone, Serialize)]
pub struct NameRequest {
    pub name: String,
}

/// New password for a user.
#[derive(Debug, Clone, Serialize)]
pub struct PasswordRequest {
    pub passwd: String,
}

/// Grant or revoke a role.
#[derive(Debug, Clone, Serialize)]
pub struct GrantRequest {
    /// User iden.
    pub user: String,
    /// Role iden.
    pub role: String,
}

/// A Cortex user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserInfo {
    pub iden: String,
    pub name: String,
    #[serde(default, rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub admin: bool,
    #[serde(default)]
    pub locked: bool,
    #[serde(default)]
    pub archived: bool,
    /// Roles, either as idens or as expanded role objects.
    #[serde(default)]
    pub roles: Vec<Value>,
    #[serde(default)]
    pub rules: Vec<Value>,
    #[serde(default)]
    pub authgates: Map<String, Value>,
}

/// A Cortex role.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoleInfo {
    pub iden: String,
    pub name: String,
    #[serde(default, rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub rules: Vec<Value>,
    #[serde(default)]
    pub authgates: Map<String, Value>,
}

/// Changes to apply to a user. Unset fields are left alone.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserMod {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub admin: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locked: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub archived: Option<bool>,
    /// Role idens, replacing the current set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub roles: Option<Vec<String>>,
}

impl UserMod {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn with_admin(mut self, admin: bool) -> Self {
        self.admin = Some(admin);
        self
    }

    pub fn with_locked(mut self, locked: bool) -> Self {
        self.locked = Some(locked);
        self
    }

    pub fn with_archived(mut self, archived: bool) -> Self {
        self.archived = Some(archived);
        self
    }

    pub fn with_roles(mut self, roles: Vec<String>) -> Self {
        self.roles = Some(roles);
        self
    }
}

/// Changes to apply to a role.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RoleMod {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rules: Option<Vec<Value>>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Storm
// ─────────────────────────────────────────────────────────────────────────────

/// Storm runtime options.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StormOpts {
    /// View iden to run the query in.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub view: Option<String>,
    /// Variables made available to the query.
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub vars: Map<String, Value>,
    /// Any other runtime option, passed through verbatim.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl StormOpts {
    /// Options that run the query in a view.
    pub fn in_view(view: impl Into<String>) -> Self {
        Self {
            view: Some(view.into()),
            ..Default::default()
        }
    }

    /// Add a query variable.
    pub fn with_var(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.vars.insert(name.into(), value.into());
        self
    }
}

/// Request to run a Storm query.
#[derive(Debug, Clone, Serialize)]
pub struct StormRequest {
    pub query: String,
    pub opts: StormOpts,
    /// Response framing; always `jsonlines` for the decoder.
    pub stream: String,
}

impl StormRequest {
    /// A query using JSON-lines framing.
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            opts: StormOpts::default(),
            stream: "jsonlines".to_string(),
        }
    }

    /// Set the runtime options.
    pub fn with_opts(mut self, opts: StormOpts) -> Self {
        self.opts = opts;
        self
    }
}

/// Request to call or export a Storm query.
#[derive(Debug, Clone, Serialize)]
pub struct StormCallRequest {
    pub query: String,
    pub opts: StormOpts,
}

// ─────────────────────────────────────────────────────────────────────────────
// Cortex
// ─────────────────────────────────────────────────────────────────────────────

/// Cortex data model definition.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CortexModel {
    #[serde(default)]
    pub types: Map<String, Value>,
    #[serde(default)]
    pub forms: Map<String, Value>,
    #[serde(default)]
    pub tagprops: Map<String, Value>,
}

/// Request to normalize a value for a property.
#[derive(Debug, Clone, Serialize)]
pub struct NormRequest {
    pub prop: String,
    pub value: Value,
}

/// Normalized value and its info.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NormResult {
    pub norm: Value,
    #[serde(default)]
    pub info: Map<String, Value>,
}

/// Packed nodes to add to a view.
#[derive(Debug, Clone, Default, Serialize)]
pub struct FeedRequest {
    pub items: Vec<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub view: Option<String>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Axon
// ─────────────────────────────────────────────────────────────────────────────

/// Blobs to delete, by SHA-256.
#[derive(Debug, Clone, Serialize)]
pub struct AxonDeleteRequest {
    #[serde(rename = "sha256")]
    pub sha256s: Vec<String>,
}

/// Per-blob outcome of a delete, keyed by SHA-256.
pub type AxonDeleteResult = BTreeMap<String, bool>;

/// Size and hashes of an uploaded blob.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AxonPutResult {
    pub size: u64,
    pub sha256: String,
    #[serde(default)]
    pub md5: Option<String>,
    #[serde(default)]
    pub sha1: Option<String>,
    #[serde(default)]
    pub sha512: Option<String>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Health
// ─────────────────────────────────────────────────────────────────────────────

/// Outcome of each health check.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct HealthReport {
    /// `/active` reported the Cortex as active.
    pub active: bool,
    /// `/storm/call` evaluated `return(1)` to `1`.
    pub storm_call: bool,
    /// The streaming `/storm` lookup returned content.
    pub storm_stream: bool,
}

impl HealthReport {
    /// True if every check passed.
    pub fn is_healthy(&self) -> bool {
        self.active && self.storm_call && self.storm_stream
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storm_request_wire_shape() {
        let request = StormRequest::new("inet:fqdn")
            .with_opts(StormOpts::in_view("abc").with_var("limit", 10));
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            serde_json::json!({
                "query": "inet:fqdn",
                "opts": {"view": "abc", "vars": {"limit": 10}},
                "stream": "jsonlines",
            })
        );
    }

    #[test]
    fn test_user_mod_skips_unset_fields() {
        let user_mod = UserMod::new().with_admin(true).with_email("a@b.c");
        assert_eq!(
            serde_json::to_value(&user_mod).unwrap(),
            serde_json::json!({"admin": true, "email": "a@b.c"})
        );
    }

    #[test]
    fn test_user_info_tolerates_missing_fields() {
        let user: UserInfo =
            serde_json::from_str(r#"{"iden": "u1", "name": "root", "admin": true}"#).unwrap();
        assert!(user.admin);
        assert!(user.roles.is_empty());
        assert_eq!(user.email, None);
    }
}
