use axum::{
    Json,
    extract::{Path, State},
    http::HeaderMap,
};
use serde_json::{Value, json};

use crate::clickup::TagBody;
use crate::stub::SharedStubState;

use super::authorize;

pub async fn list_space_tags(
    State(state): State<SharedStubState>,
    headers: HeaderMap,
    Path(space_id): Path<String>,
) -> crate::AppResult<Json<Value>> {
    authorize(&state, &headers)?;
    let store = state.store()?;
    let tags = store.space_tags(&space_id)?;
    Ok(Json(json!({ "tags": tags })))
}

pub async fn create_space_tag(
    State(state): State<SharedStubState>,
    headers: HeaderMap,
    Path(space_id): Path<String>,
    Json(body): Json<TagBody>,
) -> crate::AppResult<Json<Value>> {
    authorize(&state, &headers)?;
    if body.tag.name.trim().is_empty() {
        return Err(crate::AppError::BadRequest("Tag name is required".to_string()));
    }
    state.store()?.create_space_tag(&space_id, body.tag)?;
    Ok(Json(json!({})))
}

pub async fn edit_space_tag(
    State(state): State<SharedStubState>,
    headers: HeaderMap,
    Path((space_id, tag_name)): Path<(String, String)>,
    Json(body): Json<TagBody>,
) -> crate::AppResult<Json<Value>> {
    authorize(&state, &headers)?;
    if body.tag.name.trim().is_empty() {
        return Err(crate::AppError::BadRequest("Tag name is required".to_string()));
    }
    let tag = state
        .store()?
        .edit_space_tag(&space_id, &tag_name, body.tag)?;
    Ok(Json(json!({ "tag": tag })))
}

pub async fn delete_space_tag(
    State(state): State<SharedStubState>,
    headers: HeaderMap,
    Path((space_id, tag_name)): Path<(String, String)>,
) -> crate::AppResult<Json<Value>> {
    authorize(&state, &headers)?;
    state.store()?.delete_space_tag(&space_id, &tag_name)?;
    Ok(Json(json!({})))
}
