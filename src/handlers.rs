pub mod general;
pub mod space_tags;
pub mod task_tags;

pub use general::health_check;
pub use space_tags::{create_space_tag, delete_space_tag, edit_space_tag, list_space_tags};
pub use task_tags::{add_task_tag, get_task, remove_task_tag};

use axum::http::{HeaderMap, header};

use crate::AppResult;
use crate::stub::StubState;

/// Checks the `Authorization` header against the stub's key.
pub(crate) fn authorize(state: &StubState, headers: &HeaderMap) -> AppResult<()> {
    let key = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok());
    state.authorize(key)
}
