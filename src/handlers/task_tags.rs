use axum::{
    Json,
    extract::{Path, State},
    http::HeaderMap,
};
use serde_json::{Value, json};

use crate::stub::SharedStubState;

use super::authorize;

pub async fn get_task(
    State(state): State<SharedStubState>,
    headers: HeaderMap,
    Path(task_id): Path<String>,
) -> crate::AppResult<Json<Value>> {
    authorize(&state, &headers)?;
    let store = state.store()?;
    let task = store.task(&task_id)?;
    Ok(Json(json!({
        "id": task_id,
        "name": task.name,
        "tags": task.tags,
    })))
}

// ClickUp sends an empty JSON object here; the body is not read.
pub async fn add_task_tag(
    State(state): State<SharedStubState>,
    headers: HeaderMap,
    Path((task_id, tag_name)): Path<(String, String)>,
) -> crate::AppResult<Json<Value>> {
    authorize(&state, &headers)?;
    state.store()?.add_task_tag(&task_id, &tag_name)?;
    Ok(Json(json!({})))
}

pub async fn remove_task_tag(
    State(state): State<SharedStubState>,
    headers: HeaderMap,
    Path((task_id, tag_name)): Path<(String, String)>,
) -> crate::AppResult<Json<Value>> {
    authorize(&state, &headers)?;
    state.store()?.remove_task_tag(&task_id, &tag_name)?;
    Ok(Json(json!({})))
}
