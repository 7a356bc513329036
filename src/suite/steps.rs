use reqwest::StatusCode;
use std::fmt;

use crate::clickup::{Endpoint, Tag, TagList, Task};

use super::{CheckError, CheckResult, RunContext, Suite, expect_status};

pub const CREATED_TAG_NAME: &str = "MyTagTest";
pub const RENAMED_TAG_NAME: &str = "UpdatedMyTagTest";
pub const TASK_TAG_NAME: &str = "Tag2";

pub const CREATE_COLOR: &str = "#000000";
pub const EDIT_COLOR: &str = "#FFFFFF";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Step {
    ListSpaceTags,
    CreateSpaceTag,
    VerifySpaceTagCreated,
    EditSpaceTag,
    DeleteSpaceTag,
    VerifySpaceTagDeleted,
    AddTagToTask,
    RemoveTagFromTask,
    VerifyTaskTagRemoved,
}

impl Step {
    /// Execution order. Every requirement appears before the step needing it.
    pub const ALL: [Step; 9] = [
        Step::ListSpaceTags,
        Step::CreateSpaceTag,
        Step::VerifySpaceTagCreated,
        Step::EditSpaceTag,
        Step::DeleteSpaceTag,
        Step::VerifySpaceTagDeleted,
        Step::AddTagToTask,
        Step::RemoveTagFromTask,
        Step::VerifyTaskTagRemoved,
    ];

    pub fn requires(&self) -> &'static [Step] {
        match self {
            Step::ListSpaceTags | Step::AddTagToTask => &[],
            Step::CreateSpaceTag => &[Step::ListSpaceTags],
            Step::VerifySpaceTagCreated => &[Step::CreateSpaceTag],
            Step::EditSpaceTag => &[Step::VerifySpaceTagCreated],
            Step::DeleteSpaceTag => &[Step::EditSpaceTag],
            Step::VerifySpaceTagDeleted => &[Step::DeleteSpaceTag],
            Step::RemoveTagFromTask => &[Step::AddTagToTask],
            Step::VerifyTaskTagRemoved => &[Step::RemoveTagFromTask],
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Step::ListSpaceTags => "list_space_tags",
            Step::CreateSpaceTag => "create_space_tag",
            Step::VerifySpaceTagCreated => "verify_space_tag_created",
            Step::EditSpaceTag => "edit_space_tag",
            Step::DeleteSpaceTag => "delete_space_tag",
            Step::VerifySpaceTagDeleted => "verify_space_tag_deleted",
            Step::AddTagToTask => "add_tag_to_task",
            Step::RemoveTagFromTask => "remove_tag_from_task",
            Step::VerifyTaskTagRemoved => "verify_task_tag_removed",
        }
    }

    /// The call this step checks.
    pub fn endpoint(&self) -> Endpoint {
        match self {
            Step::ListSpaceTags | Step::VerifySpaceTagCreated | Step::VerifySpaceTagDeleted => {
                Endpoint::ListSpaceTags
            }
            Step::CreateSpaceTag => Endpoint::CreateSpaceTag,
            Step::EditSpaceTag => Endpoint::EditSpaceTag,
            Step::DeleteSpaceTag => Endpoint::DeleteSpaceTag,
            Step::AddTagToTask => Endpoint::AddTaskTag,
            Step::RemoveTagFromTask => Endpoint::RemoveTaskTag,
            Step::VerifyTaskTagRemoved => Endpoint::GetTask,
        }
    }

    /// Prefix of the failure line, naming the endpoint that failed.
    pub fn diagnostic(&self) -> String {
        match self {
            Step::VerifySpaceTagCreated => {
                format!("Verification after {} failed", Endpoint::CreateSpaceTag)
            }
            Step::VerifySpaceTagDeleted => {
                format!("Verification after {} failed", Endpoint::DeleteSpaceTag)
            }
            Step::VerifyTaskTagRemoved => {
                format!("Verification after {} failed", Endpoint::RemoveTaskTag)
            }
            _ => format!("Test for {} failed", self.endpoint()),
        }
    }

    pub(crate) async fn execute(&self, suite: &Suite, ctx: &mut RunContext) -> CheckResult {
        match self {
            Step::ListSpaceTags => list_space_tags(suite).await,
            Step::CreateSpaceTag => create_space_tag(suite, ctx).await,
            Step::VerifySpaceTagCreated => verify_space_tag_created(suite, ctx).await,
            Step::EditSpaceTag => edit_space_tag(suite, ctx).await,
            Step::DeleteSpaceTag => delete_space_tag(suite, ctx).await,
            Step::VerifySpaceTagDeleted => verify_space_tag_deleted(suite, ctx).await,
            Step::AddTagToTask => add_tag_to_task(suite).await,
            Step::RemoveTagFromTask => remove_tag_from_task(suite).await,
            Step::VerifyTaskTagRemoved => verify_task_tag_removed(suite).await,
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

async fn fetch_space_tags(suite: &Suite) -> CheckResult<TagList> {
    let reply = suite.client().list_space_tags(suite.space_id()).await?;
    expect_status(&reply, StatusCode::OK)?;
    Ok(reply.json()?)
}

async fn list_space_tags(suite: &Suite) -> CheckResult {
    let list = fetch_space_tags(suite).await?;
    if list.tags.is_empty() {
        return Err(CheckError::EmptyTagList);
    }
    Ok(())
}

async fn create_space_tag(suite: &Suite, ctx: &mut RunContext) -> CheckResult {
    let tag = Tag::new(CREATED_TAG_NAME, CREATE_COLOR);
    let reply = suite.client().create_space_tag(suite.space_id(), &tag).await?;
    expect_status(&reply, StatusCode::OK)?;

    ctx.track_space_tag(tag.name);
    ctx.expect_space_tag(CREATED_TAG_NAME)
}

async fn verify_space_tag_created(suite: &Suite, ctx: &RunContext) -> CheckResult {
    let name = ctx.tracked_space_tag()?;
    let list = fetch_space_tags(suite).await?;
    if !list.contains(name) {
        return Err(CheckError::MissingTag(name.to_string()));
    }
    Ok(())
}

async fn edit_space_tag(suite: &Suite, ctx: &mut RunContext) -> CheckResult {
    let current = ctx.tracked_space_tag()?.to_string();
    let renamed = Tag::new(RENAMED_TAG_NAME, EDIT_COLOR);
    let reply = suite
        .client()
        .edit_space_tag(suite.space_id(), &current, &renamed)
        .await?;
    expect_status(&reply, StatusCode::OK)?;

    ctx.track_space_tag(renamed.name);
    ctx.expect_space_tag(RENAMED_TAG_NAME)
}

async fn delete_space_tag(suite: &Suite, ctx: &RunContext) -> CheckResult {
    let name = ctx.tracked_space_tag()?;
    let reply = suite.client().delete_space_tag(suite.space_id(), name).await?;
    expect_status(&reply, StatusCode::OK)
}

async fn verify_space_tag_deleted(suite: &Suite, ctx: &RunContext) -> CheckResult {
    let name = ctx.tracked_space_tag()?;
    let list = fetch_space_tags(suite).await?;
    if list.contains(name) {
        return Err(CheckError::UnexpectedTag(name.to_string()));
    }
    Ok(())
}

async fn add_tag_to_task(suite: &Suite) -> CheckResult {
    let reply = suite.client().add_task_tag(suite.task_id(), TASK_TAG_NAME).await?;
    expect_status(&reply, StatusCode::OK)
}

async fn remove_tag_from_task(suite: &Suite) -> CheckResult {
    let reply = suite
        .client()
        .remove_task_tag(suite.task_id(), TASK_TAG_NAME)
        .await?;
    expect_status(&reply, StatusCode::OK)
}

async fn verify_task_tag_removed(suite: &Suite) -> CheckResult {
    let reply = suite.client().get_task(suite.task_id()).await?;
    expect_status(&reply, StatusCode::OK)?;
    let task: Task = reply.json()?;
    if task.has_tag(TASK_TAG_NAME) {
        return Err(CheckError::UnexpectedTag(TASK_TAG_NAME.to_string()));
    }
    Ok(())
}
