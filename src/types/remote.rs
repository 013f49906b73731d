use serde::{Deserialize, Serialize};

/// Connection settings for a GitLab-style forge backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteConfig {
    /// Base URL of the REST API, e.g. `https://gitlab.example.org/api/v4`.
    pub api_url: String,
    /// Numeric id of the project hosting the bookmark repository.
    pub project_id: u64,
    /// Branch the collection lives on.
    pub branch: String,
    /// Personal access token; needs the `api` scope for write access.
    pub token: String,
}

/// A repository file as returned by the files endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct RepoFile {
    pub content: String,
    pub encoding: String,
}

/// Request body for single-file create and update calls.
#[derive(Debug, Clone, Serialize)]
pub struct FilePayload {
    pub branch: String,
    pub encoding: String,
    pub content: String,
    pub commit_message: String,
}

/// Request body for file deletion.
#[derive(Debug, Clone, Serialize)]
pub struct DeletePayload {
    pub branch: String,
    pub commit_message: String,
}

/// Request body for the commits endpoint. Only ever carries the single
/// `move` action that renames a bookmark file and replaces its content in
/// one commit.
#[derive(Debug, Clone, Serialize)]
pub struct CommitPayload {
    pub branch: String,
    pub commit_message: String,
    pub actions: Vec<CommitAction>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CommitAction {
    pub action: String,
    pub file_path: String,
    pub previous_path: String,
    pub encoding: String,
    pub content: String,
}

/// One entry of the personal access token listing.
#[derive(Debug, Clone, Deserialize)]
pub struct AccessToken {
    #[serde(default)]
    pub scopes: Vec<String>,
}
