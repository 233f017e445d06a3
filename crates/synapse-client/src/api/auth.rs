//! Auth API: session login and user/role administration.

use serde::de::IgnoredAny;

use crate::client::SynapseClient;
use crate::error::Result;
use crate::types::{
    GrantRequest, LoginRequest, NameRequest, PasswordRequest, RoleInfo, RoleMod, UserInfo,
    UserMod,
};

/// Auth API client.
pub struct AuthApi {
    client: SynapseClient,
}

impl AuthApi {
    pub(crate) fn new(client: SynapseClient) -> Self {
        Self { client }
    }

    /// Log in with a username and password.
    ///
    /// The session cookie is kept by the client and sent with later requests.
    pub async fn login(&self, user: &str, passwd: &str) -> Result<UserInfo> {
        let request = LoginRequest {
            user: user.to_string(),
            passwd: passwd.to_string(),
        };
        let info: UserInfo = self.client.post("login", &request).await?;
        tracing::debug!(user = %info.name, iden = %info.iden, "Logged in");
        Ok(info)
    }

    /// End the current session.
    pub async fn logout(&self) -> Result<()> {
        let _: IgnoredAny = self.client.get("logout").await?;
        Ok(())
    }

    /// List all users.
    pub async fn users(&self) -> Result<Vec<UserInfo>> {
        self.client.get("auth/users").await
    }

    /// List all roles.
    pub async fn roles(&self) -> Result<Vec<RoleInfo>> {
        self.client.get("auth/roles").await
    }

    /// Create a user.
    pub async fn add_user(&self, name: &str) -> Result<UserInfo> {
        self.client.post("auth/adduser", &name_request(name)).await
    }

    /// Create a role.
    pub async fn add_role(&self, name: &str) -> Result<RoleInfo> {
        self.client.post("auth/addrole", &name_request(name)).await
    }

    /// Delete a role by name.
    pub async fn delete_role(&self, name: &str) -> Result<()> {
        let _: IgnoredAny = self.client.post("auth/delrole", &name_request(name)).await?;
        Ok(())
    }

    /// Apply changes to a user.
    pub async fn modify_user(&self, iden: &str, changes: &UserMod) -> Result<UserInfo> {
        self.client
            .post(&format!("auth/user/{}", iden), changes)
            .await
    }

    /// Apply changes to a role.
    pub async fn modify_role(&self, iden: &str, changes: &RoleMod) -> Result<RoleInfo> {
        self.client
            .post(&format!("auth/role/{}", iden), changes)
            .await
    }

    /// Set a user's password.
    pub async fn change_password(&self, iden: &str, passwd: &str) -> Result<UserInfo> {
        let request = PasswordRequest {
            passwd: passwd.to_string(),
        };
        self.client
            .post(&format!("auth/password/{}", iden), &request)
            .await
    }

    /// Grant a role to a user.
    pub async fn grant(&self, user: &str, role: &str) -> Result<UserInfo> {
        self.client.post("auth/grant", &grant_request(user, role)).await
    }

    /// Revoke a role from a user.
    pub async fn revoke(&self, user: &str, role: &str) -> Result<UserInfo> {
        self.client
            .post("auth/revoke", &grant_request(user, role))
            .await
    }
}

fn name_request(name: &str) -> NameRequest {
    NameRequest {
        name: name.to_string(),
    }
}

fn grant_request(user: &str, role: &str) -> GrantRequest {
    GrantRequest {
        user: user.to_string(),
        role: role.to_string(),
    }
}
