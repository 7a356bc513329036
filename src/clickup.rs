use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Method, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::fmt;
use std::time::Instant;
use thiserror::Error;

/// Public ClickUp v2 API root.
pub const DEFAULT_BASE_URL: &str = "https://api.clickup.com/api/v2";

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Base URL cannot take path segments: {0}")]
    InvalidBaseUrl(String),
}

pub type Result<T> = std::result::Result<T, ClientError>;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Tag {
    pub name: String,
    #[serde(default)]
    pub tag_fg: String,
    #[serde(default)]
    pub tag_bg: String,
}

impl Tag {
    /// A tag drawn with the same foreground and background color.
    pub fn new(name: impl Into<String>, color: &str) -> Self {
        Self {
            name: name.into(),
            tag_fg: color.to_string(),
            tag_bg: color.to_string(),
        }
    }
}

/// Request body of the create and edit calls: `{"tag": {...}}`.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TagBody {
    pub tag: Tag,
}

#[derive(Debug, Deserialize, Clone)]
pub struct TagList {
    pub tags: Vec<Tag>,
}

impl TagList {
    /// ClickUp normalizes tag names to lower case, so lookups ignore ASCII case.
    pub fn contains(&self, name: &str) -> bool {
        self.tags.iter().any(|t| t.name.eq_ignore_ascii_case(name))
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct Task {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    pub tags: Vec<Tag>,
}

impl Task {
    pub fn has_tag(&self, name: &str) -> bool {
        self.tags.iter().any(|t| t.name.eq_ignore_ascii_case(name))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    ListSpaceTags,
    CreateSpaceTag,
    EditSpaceTag,
    DeleteSpaceTag,
    AddTaskTag,
    RemoveTaskTag,
    GetTask,
}

impl Endpoint {
    pub fn method(&self) -> Method {
        match self {
            Endpoint::ListSpaceTags | Endpoint::GetTask => Method::GET,
            Endpoint::CreateSpaceTag | Endpoint::AddTaskTag => Method::POST,
            Endpoint::EditSpaceTag => Method::PUT,
            Endpoint::DeleteSpaceTag | Endpoint::RemoveTaskTag => Method::DELETE,
        }
    }

    /// Path template as written in the API reference, used in diagnostics.
    pub fn template(&self) -> &'static str {
        match self {
            Endpoint::ListSpaceTags | Endpoint::CreateSpaceTag => "/space/{space_id}/tag",
            Endpoint::EditSpaceTag | Endpoint::DeleteSpaceTag => "/space/{space_id}/tag/{tag_name}",
            Endpoint::AddTaskTag | Endpoint::RemoveTaskTag => "/task/{task_id}/tag/{tag_name}",
            Endpoint::GetTask => "/task/{task_id}",
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method(), self.template())
    }
}

/// Status and raw body of one call. Bodies are kept as text so a failed
/// check can quote whatever the service sent back.
#[derive(Debug, Clone)]
pub struct ApiReply {
    pub endpoint: Endpoint,
    pub status: StatusCode,
    pub body: String,
}

impl ApiReply {
    pub fn json<T: DeserializeOwned>(&self) -> serde_json::Result<T> {
        serde_json::from_str(&self.body)
    }
}

#[derive(Clone)]
pub struct Client {
    http: reqwest::Client,
    base_url: Url,
    api_key: String,
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("base_url", &self.base_url.as_str())
            .finish_non_exhaustive()
    }
}

impl Client {
    pub fn new(base_url: Url, api_key: impl Into<String>) -> Result<Self> {
        if base_url.cannot_be_a_base() {
            return Err(ClientError::InvalidBaseUrl(base_url.to_string()));
        }
        let http = reqwest::Client::builder()
            .user_agent(concat!("tagcheck/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            base_url,
            api_key: api_key.into(),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub async fn list_space_tags(&self, space_id: &str) -> Result<ApiReply> {
        let url = self.url(&["space", space_id, "tag"])?;
        self.send(Endpoint::ListSpaceTags, url, None).await
    }

    pub async fn create_space_tag(&self, space_id: &str, tag: &Tag) -> Result<ApiReply> {
        let url = self.url(&["space", space_id, "tag"])?;
        self.send(Endpoint::CreateSpaceTag, url, Some(json!({ "tag": tag })))
            .await
    }

    /// Renames and recolors the space tag currently called `tag_name`.
    pub async fn edit_space_tag(&self, space_id: &str, tag_name: &str, tag: &Tag) -> Result<ApiReply> {
        let url = self.url(&["space", space_id, "tag", tag_name])?;
        self.send(Endpoint::EditSpaceTag, url, Some(json!({ "tag": tag })))
            .await
    }

    pub async fn delete_space_tag(&self, space_id: &str, tag_name: &str) -> Result<ApiReply> {
        let url = self.url(&["space", space_id, "tag", tag_name])?;
        self.send(Endpoint::DeleteSpaceTag, url, None).await
    }

    pub async fn add_task_tag(&self, task_id: &str, tag_name: &str) -> Result<ApiReply> {
        let url = self.url(&["task", task_id, "tag", tag_name])?;
        self.send(Endpoint::AddTaskTag, url, Some(json!({}))).await
    }

    pub async fn remove_task_tag(&self, task_id: &str, tag_name: &str) -> Result<ApiReply> {
        let url = self.url(&["task", task_id, "tag", tag_name])?;
        self.send(Endpoint::RemoveTaskTag, url, None).await
    }

    pub async fn get_task(&self, task_id: &str) -> Result<ApiReply> {
        let url = self.url(&["task", task_id])?;
        self.send(Endpoint::GetTask, url, None).await
    }

    /// Appends each segment percent-encoded, so ids and tag names never
    /// change the shape of the path.
    fn url(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ClientError::InvalidBaseUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn send(&self, endpoint: Endpoint, url: Url, body: Option<Value>) -> Result<ApiReply> {
        let mut request = self
            .http
            .request(endpoint.method(), url.clone())
            .header(AUTHORIZATION, self.api_key.as_str())
            .header(CONTENT_TYPE, "application/json");
        if let Some(body) = &body {
            request = request.body(body.to_string());
        }

        tracing::debug!("-> {} {}", endpoint.method(), url);
        let started = Instant::now();
        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;
        tracing::debug!(
            "<- {} latency={}",
            status.as_u16(),
            crate::format_latency(started.elapsed())
        );

        Ok(ApiReply {
            endpoint,
            status,
            body,
        })
    }
}
