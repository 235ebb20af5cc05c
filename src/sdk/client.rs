//! HTTP client for the dashboard backend

use crate::auth::permission::PermissionAction;
use crate::auth::rbac::TeamRole;
use crate::core::models::*;
use crate::sdk::{config::ClientConfig, errors::*, services::TeamService};
use async_trait::async_trait;
use parking_lot::RwLock;
use reqwest::header::{COOKIE, SET_COOKIE};
use reqwest::{Method, RequestBuilder};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::json;
use tracing::{debug, error, info};
use url::Url;

/// REST client
#[derive(Debug)]
pub struct ApiClient {
    config: ClientConfig,
    base_url: Url,
    http_client: reqwest::Client,
    cookie: RwLock<Option<String>>,
}

impl ApiClient {
    /// Build a client; fails on a base URL that cannot carry paths
    pub fn new(config: ClientConfig) -> Result<Self> {
        let base_url = Url::parse(&config.base_url)
            .map_err(|e| ApiError::Config(format!("Invalid base URL {}: {}", config.base_url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(ApiError::Config(format!(
                "Base URL cannot carry a path: {}",
                config.base_url
            )));
        }

        let mut builder = reqwest::Client::builder().timeout(config.timeout_duration());
        if let Some(user_agent) = &config.user_agent {
            builder = builder.user_agent(user_agent.clone());
        }
        let http_client = builder
            .build()
            .map_err(|e| ApiError::Config(format!("Failed to create HTTP client: {}", e)))?;

        debug!("ApiClient created for {}", base_url);

        Ok(Self {
            cookie: RwLock::new(config.cookie.clone()),
            config,
            base_url,
            http_client,
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Attach a session cookie to every following request
    pub fn set_cookie(&self, cookie: impl Into<String>) {
        *self.cookie.write() = Some(cookie.into());
    }

    pub fn clear_cookie(&self) {
        *self.cookie.write() = None;
    }

    pub fn cookie(&self) -> Option<String> {
        self.cookie.read().clone()
    }

    // ---------------------------------------------------------------------
    // Session
    // ---------------------------------------------------------------------

    /// `POST /user/auth`; keeps the session cookie the backend hands out
    pub async fn login(&self, payload: &LoginPayload) -> Result<()> {
        let response = self
            .request(Method::POST, &["user", "auth"])?
            .json(payload)
            .send()
            .await?;
        let response = check_status(response).await?;

        if let Some(cookie) = response
            .headers()
            .get(SET_COOKIE)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.split(';').next())
        {
            self.set_cookie(cookie.trim());
        }

        info!("Logged in as {}", payload.email);
        Ok(())
    }

    /// `POST /user`
    pub async fn register(&self, payload: &RegisterPayload) -> Result<()> {
        self.send_empty(self.request(Method::POST, &["user"])?.json(payload))
            .await
    }

    pub async fn logout(&self) -> Result<()> {
        let result = self
            .send_empty(self.request(Method::POST, &["user", "logout"])?)
            .await;
        self.clear_cookie();
        result
    }

    // ---------------------------------------------------------------------
    // Servers and processes
    // ---------------------------------------------------------------------

    pub async fn list_servers(&self) -> Result<ServerResponse> {
        self.send(self.request(Method::GET, &["server"])?).await
    }

    /// Register a server; the returned secret is shown once
    pub async fn create_server(&self, payload: &CreateServerPayload) -> Result<CreateServerResponse> {
        self.send(self.request(Method::POST, &["server"])?.json(payload))
            .await
    }

    /// Dispatch a PM2 command to the agent identified by `clientId`
    pub async fn send_command(&self, command: &CommandRequest) -> Result<ProcessInfo> {
        debug!(
            "Sending {} to {}",
            command.command.as_str(),
            command.client_id
        );
        self.send(self.request(Method::POST, &["server", "command"])?.json(command))
            .await
    }

    /// Live process list through the command channel
    pub async fn list_processes(&self, client_id: &str) -> Result<ProcessInfo> {
        self.send_command(&CommandRequest {
            command: ProcessCommand::Pm2List,
            client_id: client_id.to_string(),
            payload: None,
        })
        .await
    }

    /// Last process snapshot the backend stored for a server
    pub async fn get_processes(&self, client_id: &str) -> Result<ProcessInfo> {
        self.send(self.request(Method::GET, &["server", client_id, "processes"])?)
            .await
    }

    // ---------------------------------------------------------------------
    // Server-level RBAC administration
    // ---------------------------------------------------------------------

    pub async fn list_roles(&self) -> Result<Vec<Role>> {
        let envelope: DataEnvelope<Vec<Role>> =
            self.send(self.request(Method::GET, &["role"])?).await?;
        Ok(envelope.data)
    }

    pub async fn create_role(&self, name: &str) -> Result<()> {
        self.send_empty(
            self.request(Method::POST, &["role"])?
                .json(&json!({ "name": name })),
        )
        .await
    }

    pub async fn delete_role(&self, role_id: &str) -> Result<()> {
        self.send_empty(self.request(Method::DELETE, &["role", role_id])?)
            .await
    }

    pub async fn list_resources(&self) -> Result<ResourceResponse> {
        self.send(self.request(Method::GET, &["resource"])?).await
    }

    /// Create one resource entry per action
    pub async fn create_resource(
        &self,
        name: &str,
        actions: &[ResourceAction],
    ) -> Result<ResourceResponse> {
        let payload = ResourceActionPayload::expand(name, actions);
        self.send(self.request(Method::POST, &["resource"])?.json(&payload))
            .await
    }

    pub async fn delete_resource(&self, resource_id: &str) -> Result<()> {
        self.send_empty(self.request(Method::DELETE, &["resource", resource_id])?)
            .await
    }

    /// Replace the roles attached to a resource
    pub async fn update_resource_roles(&self, resource_id: &str, role_ids: &[String]) -> Result<()> {
        self.send_empty(
            self.request(Method::PUT, &["resource", resource_id, "roles"])?
                .json(&json!({ "roleIds": role_ids })),
        )
        .await
    }

    pub async fn add_role_to_resource(&self, resource_id: &str, role_id: &str) -> Result<()> {
        self.send_empty(self.request(Method::POST, &["resource", resource_id, "roles", role_id])?)
            .await
    }

    pub async fn remove_role_from_resource(&self, resource_id: &str, role_id: &str) -> Result<()> {
        self.send_empty(self.request(
            Method::DELETE,
            &["resource", resource_id, "roles", role_id],
        )?)
        .await
    }

    pub async fn list_users(&self) -> Result<Vec<User>> {
        let envelope: DataEnvelope<Vec<User>> =
            self.send(self.request(Method::GET, &["user", "list"])?).await?;
        Ok(envelope.data)
    }

    pub async fn add_role_to_user(&self, user_id: &str, role_id: &str) -> Result<()> {
        self.send_empty(self.request(Method::POST, &["user", user_id, "roles", role_id])?)
            .await
    }

    pub async fn remove_role_from_user(&self, user_id: &str, role_id: &str) -> Result<()> {
        self.send_empty(self.request(Method::DELETE, &["user", user_id, "roles", role_id])?)
            .await
    }

    // ---------------------------------------------------------------------
    // Plumbing
    // ---------------------------------------------------------------------

    fn url(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ApiError::Config(format!("Invalid base URL {}", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn request(&self, method: Method, segments: &[&str]) -> Result<RequestBuilder> {
        let url = self.url(segments)?;
        debug!("{} {}", method, url);

        let mut builder = self.http_client.request(method, url);
        if let Some(cookie) = self.cookie.read().as_deref() {
            builder = builder.header(COOKIE, cookie);
        }
        Ok(builder)
    }

    async fn send<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T> {
        let response = check_status(builder.send().await?).await?;
        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| {
            error!("Failed to decode response: {}", e);
            ApiError::Parse(e.to_string())
        })
    }

    async fn send_empty(&self, builder: RequestBuilder) -> Result<()> {
        check_status(builder.send().await?).await?;
        Ok(())
    }

    async fn send_json<B, T>(&self, method: Method, segments: &[&str], body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.send(self.request(method, segments)?.json(body)).await
    }
}

async fn check_status(response: reqwest::Response) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    error!("API error: {} - {}", status, body);
    Err(ApiError::from_status(status.as_u16(), &body))
}

#[async_trait]
impl TeamService for ApiClient {
    async fn list_teams(&self) -> Result<TeamsResponse> {
        self.send(self.request(Method::GET, &["teams"])?).await
    }

    async fn get_team(&self, team_id: &str) -> Result<TeamDetails> {
        self.send(self.request(Method::GET, &["teams", team_id])?)
            .await
    }

    async fn create_team(&self, payload: &CreateTeamPayload) -> Result<Team> {
        self.send_json(Method::POST, &["teams"], payload).await
    }

    async fn update_team(&self, team_id: &str, payload: &UpdateTeamPayload) -> Result<Team> {
        self.send_json(Method::PUT, &["teams", team_id], payload)
            .await
    }

    async fn delete_team(&self, team_id: &str) -> Result<()> {
        self.send_empty(self.request(Method::DELETE, &["teams", team_id])?)
            .await
    }

    async fn list_members(&self, team_id: &str) -> Result<Vec<TeamMember>> {
        self.send(self.request(Method::GET, &["teams", team_id, "members"])?)
            .await
    }

    async fn update_member(
        &self,
        team_id: &str,
        member_id: &str,
        payload: &UpdateMemberPayload,
    ) -> Result<TeamMember> {
        self.send_json(
            Method::PUT,
            &["teams", team_id, "members", member_id],
            payload,
        )
        .await
    }

    async fn update_member_role(
        &self,
        team_id: &str,
        member_id: &str,
        role: TeamRole,
    ) -> Result<TeamMember> {
        self.send_json(
            Method::POST,
            &["teams", team_id, "members", member_id, "role"],
            &json!({ "role": role }),
        )
        .await
    }

    async fn update_member_permissions(
        &self,
        team_id: &str,
        member_id: &str,
        permissions: &[PermissionAction],
    ) -> Result<TeamMember> {
        self.send_json(
            Method::PUT,
            &["teams", team_id, "members", member_id, "permissions"],
            &json!({ "permissions": permissions }),
        )
        .await
    }

    async fn remove_member(&self, team_id: &str, member_id: &str) -> Result<()> {
        self.send_empty(self.request(
            Method::DELETE,
            &["teams", team_id, "members", member_id],
        )?)
        .await
    }

    async fn leave_team(&self, team_id: &str) -> Result<()> {
        self.send_empty(self.request(Method::POST, &["teams", team_id, "leave"])?)
            .await
    }

    async fn list_invitations(&self, team_id: &str) -> Result<Vec<TeamInvitation>> {
        self.send(self.request(Method::GET, &["teams", team_id, "invitations"])?)
            .await
    }

    async fn create_invitation(
        &self,
        payload: &CreateInvitationPayload,
    ) -> Result<InvitationResponse> {
        self.send_json(Method::POST, &["team-invitations"], payload)
            .await
    }

    async fn revoke_invitation(&self, invitation_id: &str) -> Result<()> {
        self.send_empty(self.request(Method::DELETE, &["team-invitations", invitation_id])?)
            .await
    }

    async fn resend_invitation(&self, invitation_id: &str) -> Result<InvitationResponse> {
        self.send(self.request(
            Method::POST,
            &["team-invitations", invitation_id, "resend"],
        )?)
        .await
    }

    async fn get_invitation(&self, token: &str) -> Result<TeamInvitation> {
        self.send(self.request(Method::GET, &["invitations", token])?)
            .await
    }

    async fn accept_invitation(&self, token: &str) -> Result<AcceptInvitationResponse> {
        self.send(self.request(Method::POST, &["invitations", token, "accept"])?)
            .await
    }
}
