use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::ACCEPT;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder, StatusCode, Url};
use serde::de::DeserializeOwned;
use ticketdesk_common::models::{Profile, Project, Ticket, TicketStatus, User};
use ticketdesk_config::AppConfig;

use crate::api::{PageRequest, TicketApi};
use crate::error::ApiClientError;
use crate::forms::{NewComment, ValidTicket};
use crate::requests::{AssignRequest, GoogleLoginRequest, LoginRequest, RegisterRequest, StatusUpdate};
use crate::responses::{
    LoginResponse, ProfileEnvelope, ProjectsEnvelope, TicketEnvelope, TicketsEnvelope,
    UserEnvelope, UsersEnvelope,
};

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: String,
    pub files_url: String,
    pub max_retries: u32,
    pub timeout_secs: u64,
}

impl From<&AppConfig> for ClientConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            base_url: config.api_url.clone(),
            files_url: config.files_url.clone(),
            max_retries: config.max_retries,
            timeout_secs: config.timeout_secs,
        }
    }
}

/// REST gateway client. Cheap to clone; carries at most one bearer token.
#[derive(Clone)]
pub struct TicketingClient {
    client: Client,
    config: ClientConfig,
    token: Option<String>,
}

impl TicketingClient {
    pub fn new(config: ClientConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            client,
            config,
            token: None,
        })
    }

    /// For testing: create a client pointing at a specific base URL (e.g., wiremock).
    #[cfg(test)]
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.config.base_url = base_url.to_string();
        self
    }

    /// A copy of this client that authenticates with `token`.
    pub fn with_token(&self, token: impl Into<String>) -> Self {
        Self {
            token: Some(token.into()),
            ..self.clone()
        }
    }

    pub fn has_token(&self) -> bool {
        self.token.is_some()
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url, path)
    }

    fn bearer(&self) -> Result<&str, ApiClientError> {
        self.token.as_deref().ok_or(ApiClientError::MissingToken)
    }

    fn authorized(&self, builder: RequestBuilder) -> Result<RequestBuilder, ApiClientError> {
        Ok(builder.bearer_auth(self.bearer()?))
    }

    // ── auth ────────────────────────────────────────────────────

    /// Exchange credentials for a bearer token. `Ok(None)` when rejected.
    pub async fn login(&self, identity: &str, password: &str) -> Result<Option<String>, ApiClientError> {
        let body = LoginRequest {
            identity: identity.to_owned(),
            password: password.to_owned(),
        };
        self.token_exchange("/auth/login", &body).await
    }

    /// Exchange a Google OAuth access token for a bearer token.
    pub async fn login_with_google(&self, access_token: &str) -> Result<Option<String>, ApiClientError> {
        let body = GoogleLoginRequest {
            access_token: access_token.to_owned(),
        };
        self.token_exchange("/auth/google", &body).await
    }

    async fn token_exchange<B: serde::Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<Option<String>, ApiClientError> {
        let response = self.client.post(self.url(path)).json(body).send().await?;
        let status = response.status();
        let text = response.text().await?;

        if status.is_success() {
            let parsed: LoginResponse = decode("login response", &text)?;
            if parsed.access_token.is_none() {
                tracing::warn!(path, "login succeeded without a token");
            }
            return Ok(parsed.access_token);
        }
        if matches!(
            status,
            StatusCode::BAD_REQUEST | StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN
        ) {
            tracing::info!(path, %status, "credentials rejected");
            return Ok(None);
        }
        Err(ApiClientError::HttpError { status, body: text })
    }

    pub async fn logout(&self) -> Result<(), ApiClientError> {
        let request = self.authorized(self.client.post(self.url("/auth/logout")))?;
        self.send_once(request).await.map(|_| ())
    }

    /// Create an account. 400 and 409 surface as `HttpError`.
    pub async fn register(&self, request: &RegisterRequest) -> Result<Option<User>, ApiClientError> {
        let builder = self.client.post(self.url("/auth/register")).json(request);
        let body = self.send_once(builder).await?;
        Ok(serde_json::from_str::<UserEnvelope>(&body)
            .ok()
            .and_then(|env| env.user))
    }

    // ── reads ───────────────────────────────────────────────────

    pub async fn fetch_profile(&self) -> Result<Profile, ApiClientError> {
        let env: ProfileEnvelope = self.get_json(&self.url("/profile"), "profile").await?;
        env.profile.ok_or(ApiClientError::MissingField("profile"))
    }

    pub async fn fetch_projects(&self) -> Result<Vec<Project>, ApiClientError> {
        let env: ProjectsEnvelope = self.get_json(&self.url("/projects"), "projects").await?;
        Ok(env.projects)
    }

    pub async fn fetch_projects_by_company(&self, company_id: &str) -> Result<Vec<Project>, ApiClientError> {
        let url = self.url(&format!("/projects/company/{company_id}"));
        let env: ProjectsEnvelope = self.get_json(&url, "company projects").await?;
        Ok(env.projects)
    }

    pub async fn fetch_users(&self) -> Result<Vec<User>, ApiClientError> {
        let env: UsersEnvelope = self.get_json(&self.url("/users"), "users").await?;
        Ok(env.users)
    }

    pub async fn fetch_user(&self, user_id: &str) -> Result<User, ApiClientError> {
        let env: UserEnvelope = self
            .get_json(&self.url(&format!("/users/{user_id}")), "user")
            .await?;
        env.user.ok_or(ApiClientError::MissingField("user"))
    }

    pub async fn fetch_ticket_page(&self, request: &PageRequest) -> Result<Option<Vec<Ticket>>, ApiClientError> {
        let mut params = vec![
            ("page", request.page.to_string()),
            ("limit", request.limit.to_string()),
            ("status", request.status.as_str().to_owned()),
        ];
        if let Some(company) = &request.company {
            params.push(("company", company.clone()));
        }
        if let Some(priority) = request.priority {
            params.push(("priority", priority.as_str().to_owned()));
        }
        let url = Url::parse_with_params(&self.url("/tickets"), &params)
            .map_err(|e| ApiClientError::InvalidUrl(e.to_string()))?;

        tracing::debug!(page = request.page, status = %request.status, "fetching ticket page");
        let env: TicketsEnvelope = self.get_json(url.as_str(), "ticket page").await?;
        Ok(env.into_page())
    }

    pub async fn fetch_ticket(&self, ticket_id: &str) -> Result<Ticket, ApiClientError> {
        let env: TicketEnvelope = self
            .get_json(&self.url(&format!("/tickets/{ticket_id}")), "ticket")
            .await?;
        env.ticket.ok_or(ApiClientError::MissingField("ticket"))
    }

    // ── mutations (never retried) ───────────────────────────────

    pub async fn create_ticket(&self, ticket: &ValidTicket) -> Result<Ticket, ApiClientError> {
        let mut form = Form::new()
            .text("title", ticket.title.clone())
            .text("description", ticket.description.clone())
            .text("priority", ticket.priority.as_str())
            .text("project", ticket.project.clone());
        for attachment in &ticket.attachments {
            let part = Part::bytes(attachment.bytes.clone())
                .file_name(attachment.file_name.clone())
                .mime_str(&attachment.mime_type)?;
            form = form.part("files", part);
        }

        let request = self.authorized(self.client.post(self.url("/tickets")).multipart(form))?;
        let body = self.send_once(request).await?;
        let env: TicketEnvelope = decode("created ticket", &body)?;
        let created = env.ticket.ok_or(ApiClientError::MissingField("ticket"))?;
        tracing::info!(ticket_id = %created.id, "ticket created");
        Ok(created)
    }

    pub async fn delete_ticket(&self, ticket_id: &str) -> Result<(), ApiClientError> {
        let request = self.authorized(self.client.delete(self.url(&format!("/tickets/{ticket_id}"))))?;
        self.send_once(request).await?;
        tracing::info!(ticket_id, "ticket deleted");
        Ok(())
    }

    pub async fn update_status(&self, ticket_id: &str, status: TicketStatus) -> Result<(), ApiClientError> {
        let request = self.authorized(
            self.client
                .patch(self.url(&format!("/tickets/{ticket_id}/status")))
                .json(&StatusUpdate { status }),
        )?;
        self.send_once(request).await?;
        tracing::info!(ticket_id, %status, "ticket status updated");
        Ok(())
    }

    pub async fn close_ticket(&self, ticket_id: &str) -> Result<(), ApiClientError> {
        self.update_status(ticket_id, TicketStatus::Closed).await
    }

    pub async fn assign_ticket(&self, ticket_id: &str, user_id: &str) -> Result<(), ApiClientError> {
        let request = self.authorized(
            self.client
                .post(self.url(&format!("/tickets/{ticket_id}/assign")))
                .json(&AssignRequest {
                    user_id: user_id.to_owned(),
                }),
        )?;
        self.send_once(request).await?;
        tracing::info!(ticket_id, user_id, "ticket assigned");
        Ok(())
    }

    pub async fn post_comment(&self, comment: &NewComment) -> Result<(), ApiClientError> {
        let form = Form::new()
            .text("ticket_id", comment.ticket_id.clone())
            .text("content", comment.content.clone());
        let request = self.authorized(self.client.post(self.url("/comments")).multipart(form))?;
        self.send_once(request).await?;
        tracing::info!(ticket_id = %comment.ticket_id, "comment posted");
        Ok(())
    }

    // ── transport ───────────────────────────────────────────────

    async fn get_json<T: DeserializeOwned>(&self, url: &str, context: &str) -> Result<T, ApiClientError> {
        let body = self.request_with_retry(url).await?;
        decode(context, &body)
    }

    async fn send_once(&self, request: RequestBuilder) -> Result<String, ApiClientError> {
        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        if status.is_success() {
            Ok(body)
        } else {
            Err(ApiClientError::HttpError { status, body })
        }
    }

    /// Authenticated GET, retrying transient errors.
    async fn request_with_retry(&self, url: &str) -> Result<String, ApiClientError> {
        let token = self.bearer()?;
        let mut last_error = String::new();

        for attempt in 0..=self.config.max_retries {
            if attempt > 0 {
                let backoff_secs = backoff_secs(attempt);
                tracing::warn!(attempt, backoff_secs, "retrying after backoff");
                tokio::time::sleep(Duration::from_secs(backoff_secs)).await;
            }

            let response = match self
                .client
                .get(url)
                .bearer_auth(token)
                .header(ACCEPT, "application/json")
                .send()
                .await
            {
                Ok(resp) => resp,
                Err(e) => {
                    last_error = e.to_string();
                    if e.is_timeout() || e.is_connect() {
                        continue;
                    }
                    return Err(ApiClientError::RequestError(e));
                }
            };

            let status = response.status();

            if status.is_success() {
                return response.text().await.map_err(ApiClientError::RequestError);
            }

            // Honor Retry-After header for 429
            if status == StatusCode::TOO_MANY_REQUESTS {
                if let Some(retry_after) = response
                    .headers()
                    .get("retry-after")
                    .and_then(|v| v.to_str().ok())
                    .and_then(|v| v.parse::<u64>().ok())
                {
                    let wait = std::cmp::min(retry_after, 60);
                    tracing::warn!(wait, "rate-limited, waiting Retry-After");
                    tokio::time::sleep(Duration::from_secs(wait)).await;
                }
                last_error = "429 Too Many Requests".to_string();
                continue;
            }

            // Retry on 5xx
            if status.is_server_error() {
                let body = response.text().await.unwrap_or_default();
                last_error = format!("{status}: {body}");
                continue;
            }

            // Fail fast on 4xx (except 429 handled above)
            let body = response.text().await.unwrap_or_default();
            return Err(ApiClientError::HttpError { status, body });
        }

        Err(ApiClientError::MaxRetriesExceeded {
            attempts: self.config.max_retries.saturating_add(1),
            last_error,
        })
    }
}

/// Exponential backoff in seconds, capped at 30.
fn backoff_secs(attempt: u32) -> u64 {
    1u64.checked_shl(attempt).unwrap_or(u64::MAX).min(30)
}

fn decode<T: DeserializeOwned>(context: &str, body: &str) -> Result<T, ApiClientError> {
    serde_json::from_str(body).map_err(|source| ApiClientError::Decode {
        context: context.to_owned(),
        source,
    })
}

#[async_trait]
impl TicketApi for TicketingClient {
    async fn fetch_profile(&self) -> Result<Profile, ApiClientError> {
        TicketingClient::fetch_profile(self).await
    }

    async fn fetch_projects(&self) -> Result<Vec<Project>, ApiClientError> {
        TicketingClient::fetch_projects(self).await
    }

    async fn fetch_projects_by_company(&self, company_id: &str) -> Result<Vec<Project>, ApiClientError> {
        TicketingClient::fetch_projects_by_company(self, company_id).await
    }

    async fn fetch_users(&self) -> Result<Vec<User>, ApiClientError> {
        TicketingClient::fetch_users(self).await
    }

    async fn fetch_ticket_page(&self, request: &PageRequest) -> Result<Option<Vec<Ticket>>, ApiClientError> {
        TicketingClient::fetch_ticket_page(self, request).await
    }
}
