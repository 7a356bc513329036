use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use axum::Router;
use axum::http::{Request, Response};
use axum::routing::{get, post, put};
use block_id::{Alphabet, BlockId};
use tower_http::trace::TraceLayer;
use tracing::Span;

use crate::clickup::Tag;
use crate::error::{AppError, AppResult};
use crate::handlers;

/// Color given to tags that are attached to a task without a space definition.
pub const DEFAULT_TAG_COLOR: &str = "#000000";

#[derive(Debug, Clone)]
pub struct StubTask {
    pub name: String,
    pub tags: Vec<Tag>,
}

/// In-memory spaces and tasks served by the stub.
#[derive(Debug, Default, Clone)]
pub struct Store {
    spaces: HashMap<String, Vec<Tag>>,
    tasks: HashMap<String, StubTask>,
}

impl Store {
    pub fn with_space(mut self, space_id: impl Into<String>, tags: impl IntoIterator<Item = Tag>) -> Self {
        self.spaces.insert(space_id.into(), tags.into_iter().collect());
        self
    }

    pub fn with_task(mut self, task_id: impl Into<String>, name: impl Into<String>) -> Self {
        self.tasks.insert(
            task_id.into(),
            StubTask {
                name: name.into(),
                tags: Vec::new(),
            },
        );
        self
    }

    pub fn space_tags(&self, space_id: &str) -> AppResult<&[Tag]> {
        self.spaces
            .get(space_id)
            .map(Vec::as_slice)
            .ok_or_else(|| AppError::NotFound(format!("Space {}", space_id)))
    }

    pub fn create_space_tag(&mut self, space_id: &str, tag: Tag) -> AppResult<()> {
        let tags = self.space_mut(space_id)?;
        if tags.iter().any(|t| t.name == tag.name) {
            return Err(AppError::DuplicateTag(tag.name));
        }
        tags.push(tag);
        Ok(())
    }

    pub fn edit_space_tag(&mut self, space_id: &str, tag_name: &str, tag: Tag) -> AppResult<Tag> {
        let tags = self.space_mut(space_id)?;
        if tag.name != tag_name && tags.iter().any(|t| t.name == tag.name) {
            return Err(AppError::DuplicateTag(tag.name));
        }
        let existing = tags
            .iter_mut()
            .find(|t| t.name == tag_name)
            .ok_or_else(|| AppError::NotFound(format!("Tag {}", tag_name)))?;
        *existing = tag;
        Ok(existing.clone())
    }

    pub fn delete_space_tag(&mut self, space_id: &str, tag_name: &str) -> AppResult<()> {
        let tags = self.space_mut(space_id)?;
        let before = tags.len();
        tags.retain(|t| t.name != tag_name);
        if tags.len() == before {
            return Err(AppError::NotFound(format!("Tag {}", tag_name)));
        }
        Ok(())
    }

    pub fn task(&self, task_id: &str) -> AppResult<&StubTask> {
        self.tasks
            .get(task_id)
            .ok_or_else(|| AppError::NotFound(format!("Task {}", task_id)))
    }

    /// Attaching a tag twice is a no-op.
    pub fn add_task_tag(&mut self, task_id: &str, tag_name: &str) -> AppResult<()> {
        let task = self.task_mut(task_id)?;
        if !task.tags.iter().any(|t| t.name == tag_name) {
            task.tags.push(Tag::new(tag_name, DEFAULT_TAG_COLOR));
        }
        Ok(())
    }

    pub fn remove_task_tag(&mut self, task_id: &str, tag_name: &str) -> AppResult<()> {
        let task = self.task_mut(task_id)?;
        task.tags.retain(|t| t.name != tag_name);
        Ok(())
    }

    fn space_mut(&mut self, space_id: &str) -> AppResult<&mut Vec<Tag>> {
        self.spaces
            .get_mut(space_id)
            .ok_or_else(|| AppError::NotFound(format!("Space {}", space_id)))
    }

    fn task_mut(&mut self, task_id: &str) -> AppResult<&mut StubTask> {
        self.tasks
            .get_mut(task_id)
            .ok_or_else(|| AppError::NotFound(format!("Task {}", task_id)))
    }
}

pub struct StubState {
    api_key: String,
    store: Mutex<Store>,
}

pub type SharedStubState = Arc<StubState>;

impl StubState {
    pub fn new(api_key: impl Into<String>, store: Store) -> Self {
        Self {
            api_key: api_key.into(),
            store: Mutex::new(store),
        }
    }

    /// Requests must carry the key verbatim, as ClickUp personal tokens do.
    pub fn authorize(&self, header: Option<&str>) -> AppResult<()> {
        match header {
            Some(key) if key == self.api_key => Ok(()),
            _ => Err(AppError::Unauthorized),
        }
    }

    pub fn store(&self) -> AppResult<MutexGuard<'_, Store>> {
        self.store.lock().map_err(|_| AppError::Internal)
    }

    /// Copy of the current store, for inspection after a run.
    pub fn snapshot(&self) -> AppResult<Store> {
        Ok(self.store()?.clone())
    }
}

/// Per-app request counter rendered through `block-id`, so log lines of one
/// request share a short opaque id.
#[derive(Debug, Clone)]
struct RequestIds {
    counter: Arc<AtomicU64>,
    encoder: Arc<BlockId<char>>,
}

impl RequestIds {
    fn new() -> Self {
        Self {
            counter: Arc::new(AtomicU64::new(1)),
            encoder: Arc::new(BlockId::new(Alphabet::alphanumeric(), 1234, 5)),
        }
    }

    fn next_id(&self) -> String {
        let n = self.counter.fetch_add(1, Ordering::Relaxed);
        self.encoder.encode_string(n).unwrap_or_else(|| n.to_string())
    }
}

pub fn create_app(state: SharedStubState) -> Router {
    let api = Router::new()
        .route(
            "/space/:space_id/tag",
            get(handlers::list_space_tags).post(handlers::create_space_tag),
        )
        .route(
            "/space/:space_id/tag/:tag_name",
            put(handlers::edit_space_tag).delete(handlers::delete_space_tag),
        )
        .route("/task/:task_id", get(handlers::get_task))
        .route(
            "/task/:task_id/tag/:tag_name",
            post(handlers::add_task_tag).delete(handlers::remove_task_tag),
        );

    let ids = RequestIds::new();
    let trace = TraceLayer::new_for_http()
        .make_span_with(move |request: &Request<_>| {
            tracing::info_span!(
                "request",
                id = %ids.next_id(),
                method = %request.method(),
                path = %request.uri().path(),
            )
        })
        .on_request(|request: &Request<_>, _span: &Span| {
            tracing::info!("-> {} {}", request.method(), request.uri());
        })
        .on_response(|response: &Response<_>, latency: Duration, _span: &Span| {
            tracing::info!(
                "<- {} latency={}",
                response.status().as_u16(),
                crate::format_latency(latency)
            );
        });

    Router::new()
        .nest("/api/v2", api)
        .route("/health", get(handlers::health_check))
        .with_state(state)
        .layer(trace)
}
