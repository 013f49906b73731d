//! Backend SPI implementation for GitLab-style forges.
//!
//! Maps the abstract `RemoteStore` operations onto the repository-files and
//! commits endpoints. Each bookmark operation is a single call; the one
//! multi-action shape ever sent is the lone `move` action that renames a
//! file and replaces its content in the same commit. A 400 answer whose
//! body mentions `"name already exists"` is the distinguished conflict
//! signal for renames; everything else non-2xx is a generic failure
//! carrying status and body.

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};

use crate::managers::sync_manager::{CreateOutcome, MoveOutcome, RemoteStore};
use crate::types::errors::BackendError;
use crate::types::remote::{
    AccessToken, CommitAction, CommitPayload, DeletePayload, FilePayload, RemoteConfig, RepoFile,
};

/// `RemoteStore` implementation talking to a GitLab-style REST API.
pub struct GitLabStore {
    client: Client,
    config: RemoteConfig,
}

impl GitLabStore {
    pub fn new(config: RemoteConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    fn file_url(&self, path: &str) -> String {
        format!(
            "{}/projects/{}/repository/files/{}",
            self.config.api_url,
            self.config.project_id,
            encode_repo_path(path)
        )
    }

    fn commits_url(&self) -> String {
        format!(
            "{}/projects/{}/repository/commits",
            self.config.api_url, self.config.project_id
        )
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<Response, BackendError> {
        request
            .header("Private-Token", self.config.token.trim())
            .send()
            .await
            .map_err(|e| BackendError::Network(e.to_string()))
    }

    fn file_payload(&self, blob: &str, message: &str) -> FilePayload {
        FilePayload {
            branch: self.config.branch.clone(),
            encoding: "base64".to_string(),
            content: blob.to_string(),
            commit_message: message.to_string(),
        }
    }

    /// Checks whether a personal access token is usable for write access:
    /// the token listing must answer 200 and contain at least one entry
    /// carrying the `api` scope. Any other answer means "not usable", not
    /// an error — that is all the endpoint can tell us.
    pub async fn validate_token(&self, token: &str) -> Result<bool, BackendError> {
        let url = format!("{}/personal_access_tokens", self.config.api_url);
        let response = self
            .client
            .get(&url)
            .header("Private-Token", token.trim())
            .send()
            .await
            .map_err(|e| BackendError::Network(e.to_string()))?;
        if response.status() != StatusCode::OK {
            tracing::debug!(status = %response.status(), "validate_token: rejected");
            return Ok(false);
        }
        match response.json::<Vec<AccessToken>>().await {
            Ok(tokens) => Ok(grants_api_scope(&tokens)),
            Err(e) => {
                tracing::warn!(error = %e, "validate_token: unexpected response shape");
                Ok(false)
            }
        }
    }
}

#[async_trait]
impl RemoteStore for GitLabStore {
    async fn fetch(&self, path: &str) -> Result<String, BackendError> {
        let url = format!("{}?ref={}", self.file_url(path), self.config.branch);
        let response = self.send(self.client.get(&url)).await?;
        let status = response.status();
        if status != StatusCode::OK {
            let body = read_body(response).await;
            tracing::error!(%status, path, "fetch: unexpected HTTP return code");
            return Err(BackendError::Http {
                status: status.as_u16(),
                body,
            });
        }
        let file: RepoFile = response
            .json()
            .await
            .map_err(|e| BackendError::Protocol(format!("malformed file response: {}", e)))?;
        if file.encoding != "base64" {
            tracing::error!(encoding = %file.encoding, path, "fetch: result not base64-encoded");
            return Err(BackendError::Protocol(format!(
                "unexpected content encoding: {}",
                file.encoding
            )));
        }
        tracing::debug!(path, "fetch: done");
        Ok(file.content)
    }

    async fn create(
        &self,
        path: &str,
        blob: &str,
        message: &str,
    ) -> Result<CreateOutcome, BackendError> {
        let payload = self.file_payload(blob, message);
        let response = self
            .send(self.client.post(self.file_url(path)).json(&payload))
            .await?;
        let status = response.status();
        if status == StatusCode::CREATED {
            tracing::debug!(path, "create: done");
            return Ok(CreateOutcome::Created);
        }
        let body = read_body(response).await;
        if is_exists_conflict(status, &body) {
            tracing::debug!(path, "create: target already present");
            return Ok(CreateOutcome::AlreadyExists);
        }
        tracing::error!(%status, path, "create: unexpected HTTP return code");
        Err(BackendError::Http {
            status: status.as_u16(),
            body,
        })
    }

    async fn update(&self, path: &str, blob: &str, message: &str) -> Result<(), BackendError> {
        let payload = self.file_payload(blob, message);
        let response = self
            .send(self.client.put(self.file_url(path)).json(&payload))
            .await?;
        let status = response.status();
        if status != StatusCode::OK {
            let body = read_body(response).await;
            tracing::error!(%status, path, "update: unexpected HTTP return code");
            return Err(BackendError::Http {
                status: status.as_u16(),
                body,
            });
        }
        tracing::debug!(path, "update: done");
        Ok(())
    }

    async fn delete(&self, path: &str, message: &str) -> Result<(), BackendError> {
        let payload = DeletePayload {
            branch: self.config.branch.clone(),
            commit_message: message.to_string(),
        };
        let response = self
            .send(self.client.delete(self.file_url(path)).json(&payload))
            .await?;
        let status = response.status();
        if status != StatusCode::NO_CONTENT {
            let body = read_body(response).await;
            tracing::error!(%status, path, "delete: unexpected HTTP return code");
            return Err(BackendError::Http {
                status: status.as_u16(),
                body,
            });
        }
        tracing::debug!(path, "delete: done");
        Ok(())
    }

    async fn move_with_content(
        &self,
        from: &str,
        to: &str,
        blob: &str,
        message: &str,
    ) -> Result<MoveOutcome, BackendError> {
        let payload = CommitPayload {
            branch: self.config.branch.clone(),
            commit_message: message.to_string(),
            actions: vec![CommitAction {
                action: "move".to_string(),
                file_path: to.to_string(),
                previous_path: from.to_string(),
                encoding: "base64".to_string(),
                content: blob.to_string(),
            }],
        };
        let response = self
            .send(self.client.post(self.commits_url()).json(&payload))
            .await?;
        let status = response.status();
        if status == StatusCode::CREATED {
            tracing::debug!(from, to, "move: done");
            return Ok(MoveOutcome::Moved);
        }
        let body = read_body(response).await;
        if is_exists_conflict(status, &body) {
            tracing::debug!(from, to, "move: target name already exists");
            return Ok(MoveOutcome::TargetExists);
        }
        tracing::error!(%status, from, to, "move: unexpected HTTP return code");
        Err(BackendError::Http {
            status: status.as_u16(),
            body,
        })
    }
}

/// Percent-encodes a repository path for use as a single URL segment of the
/// files endpoint: `07/abc.json` becomes `07%2Fabc%2Ejson`.
pub fn encode_repo_path(path: &str) -> String {
    path.replace('/', "%2F").replace('.', "%2E")
}

/// True if a failed write is the distinguished "target path already
/// occupied" signal rather than a generic error.
pub fn is_exists_conflict(status: StatusCode, body: &str) -> bool {
    status == StatusCode::BAD_REQUEST && body.contains("name already exists")
}

/// True if the token listing contains at least one token carrying the
/// `api` scope.
pub fn grants_api_scope(tokens: &[AccessToken]) -> bool {
    tokens
        .iter()
        .any(|t| t.scopes.iter().any(|s| s == "api"))
}

async fn read_body(response: Response) -> String {
    response.text().await.unwrap_or_default()
}
