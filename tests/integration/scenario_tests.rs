//! Full scenario runs against the stub.
//!
//! Covers the happy path, the skip-on-failed-requirement chain, the
//! independence of the space and task branches, and services that answer 200
//! without doing the work.

use tagcheck::clickup::Tag;
use tagcheck::suite::steps::{CREATED_TAG_NAME, RENAMED_TAG_NAME, TASK_TAG_NAME};
use tagcheck::suite::{Outcome, Summary};
use tagcheck::{Step, Store};

use crate::common::{
    API_KEY, Fault, SPACE_ID, TASK_ID, seeded_store, spawn_faulty_stub, spawn_stub, suite,
};

fn failure_message(outcome: Option<&Outcome>) -> String {
    match outcome {
        Some(Outcome::Failed { message }) => message.clone(),
        other => panic!("expected a failure, got {:?}", other),
    }
}

#[tokio::test]
async fn test_full_scenario_passes() {
    let (state, base_url) = spawn_stub(seeded_store()).await;

    let report = suite(base_url, API_KEY, SPACE_ID, TASK_ID).run().await;

    assert!(report.all_passed(), "{}", report);
    assert_eq!(report.steps().len(), Step::ALL.len());
    let order: Vec<Step> = report.steps().iter().map(|r| r.step).collect();
    assert_eq!(order, Step::ALL.to_vec());

    // The run cleans up after itself.
    let store = state.snapshot().unwrap();
    let names: Vec<&str> = store
        .space_tags(SPACE_ID)
        .unwrap()
        .iter()
        .map(|t| t.name.as_str())
        .collect();
    assert_eq!(names, vec!["backlog"]);
    assert!(store.task(TASK_ID).unwrap().tags.is_empty());
}

#[tokio::test]
async fn test_empty_space_skips_space_chain_only() {
    let store = Store::default()
        .with_space(SPACE_ID, Vec::<Tag>::new())
        .with_task(TASK_ID, "Integration task");
    let (state, base_url) = spawn_stub(store).await;

    let report = suite(base_url, API_KEY, SPACE_ID, TASK_ID).run().await;

    let message = failure_message(report.outcome(Step::ListSpaceTags));
    assert!(message.starts_with("Test for GET /space/{space_id}/tag failed"));
    assert!(message.contains("non-empty"));

    assert_eq!(
        report.outcome(Step::CreateSpaceTag),
        Some(&Outcome::Skipped {
            blocked_by: Step::ListSpaceTags
        })
    );
    assert_eq!(
        report.outcome(Step::VerifySpaceTagDeleted),
        Some(&Outcome::Skipped {
            blocked_by: Step::DeleteSpaceTag
        })
    );
    assert!(report.passed(Step::AddTagToTask));
    assert!(report.passed(Step::VerifyTaskTagRemoved));
    assert!(!report.all_passed());

    // Skipped steps never reached the service.
    assert!(state.snapshot().unwrap().space_tags(SPACE_ID).unwrap().is_empty());
}

#[tokio::test]
async fn test_wrong_token_fails_both_roots() {
    let (_state, base_url) = spawn_stub(seeded_store()).await;

    let report = suite(base_url, "pk_wrong", SPACE_ID, TASK_ID).run().await;

    assert_eq!(
        report.summary(),
        Summary {
            passed: 0,
            failed: 2,
            skipped: 7
        }
    );
    let message = failure_message(report.outcome(Step::AddTagToTask));
    assert!(message.starts_with("Test for POST /task/{task_id}/tag/{tag_name} failed"));
    assert!(message.contains("401"));
}

#[tokio::test]
async fn test_unknown_task_leaves_space_chain_green() {
    let (_state, base_url) = spawn_stub(seeded_store()).await;

    let report = suite(base_url, API_KEY, SPACE_ID, "no-such-task").run().await;

    for step in &Step::ALL[..6] {
        assert!(report.passed(*step), "{} should pass:\n{}", step, report);
    }
    assert!(!report.passed(Step::AddTagToTask));
    assert_eq!(
        report.outcome(Step::RemoveTagFromTask),
        Some(&Outcome::Skipped {
            blocked_by: Step::AddTagToTask
        })
    );
}

#[tokio::test]
async fn test_existing_tag_blocks_create() {
    let store = Store::default()
        .with_space(SPACE_ID, [Tag::new(CREATED_TAG_NAME, "#111111")])
        .with_task(TASK_ID, "Integration task");
    let (state, base_url) = spawn_stub(store).await;

    let report = suite(base_url, API_KEY, SPACE_ID, TASK_ID).run().await;

    let message = failure_message(report.outcome(Step::CreateSpaceTag));
    assert!(message.contains("400"));
    assert!(!report.passed(Step::EditSpaceTag));

    // The pre-existing tag must not be renamed or deleted by a failed run.
    let store = state.snapshot().unwrap();
    let tags = store.space_tags(SPACE_ID).unwrap();
    assert_eq!(tags.len(), 1);
    assert_eq!(tags[0].name, CREATED_TAG_NAME);
    assert_eq!(tags[0].tag_fg, "#111111");
}

#[tokio::test]
async fn test_unreachable_service_is_a_failure_not_a_panic() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    let base_url = reqwest::Url::parse(&format!("http://{}/api/v2", addr)).unwrap();

    let report = suite(base_url, API_KEY, SPACE_ID, TASK_ID).run().await;

    assert_eq!(report.summary().failed, 2);
    assert_eq!(report.summary().skipped, 7);
    let message = failure_message(report.outcome(Step::ListSpaceTags));
    assert!(message.contains("Request failed"));
}

#[tokio::test]
async fn test_renamed_tag_is_what_gets_deleted() {
    let (state, base_url) = spawn_stub(seeded_store()).await;
    let suite = suite(base_url, API_KEY, SPACE_ID, TASK_ID);

    let report = suite.run().await;
    assert!(report.passed(Step::DeleteSpaceTag));

    let store = state.snapshot().unwrap();
    let tags = store.space_tags(SPACE_ID).unwrap();
    assert!(!tags.iter().any(|t| t.name == CREATED_TAG_NAME));
    assert!(!tags.iter().any(|t| t.name == RENAMED_TAG_NAME));
    assert!(!store.task(TASK_ID).unwrap().tags.iter().any(|t| t.name == TASK_TAG_NAME));
}

#[tokio::test]
async fn test_acknowledged_delete_that_keeps_the_tag_fails() {
    let (state, base_url) = spawn_faulty_stub(seeded_store(), Fault::DeleteKeepsTag).await;

    let report = suite(base_url, API_KEY, SPACE_ID, TASK_ID).run().await;

    assert!(report.passed(Step::DeleteSpaceTag));
    let message = failure_message(report.outcome(Step::VerifySpaceTagDeleted));
    assert!(message.starts_with(
        "Verification after DELETE /space/{space_id}/tag/{tag_name} failed"
    ));
    assert!(message.contains(&format!("`{}` is still present", RENAMED_TAG_NAME)));
    assert_eq!(
        report.summary(),
        Summary {
            passed: 8,
            failed: 1,
            skipped: 0
        }
    );
    assert!(!report.all_passed());

    let store = state.snapshot().unwrap();
    assert!(store.space_tags(SPACE_ID).unwrap().iter().any(|t| t.name == RENAMED_TAG_NAME));
}

#[tokio::test]
async fn test_acknowledged_create_that_stores_nothing_fails() {
    let (state, base_url) = spawn_faulty_stub(seeded_store(), Fault::CreateDropsTag).await;

    let report = suite(base_url, API_KEY, SPACE_ID, TASK_ID).run().await;

    assert!(report.passed(Step::CreateSpaceTag));
    let message = failure_message(report.outcome(Step::VerifySpaceTagCreated));
    assert!(message.starts_with("Verification after POST /space/{space_id}/tag failed"));
    assert!(message.contains(&format!("expected tag `{}`", CREATED_TAG_NAME)));

    assert_eq!(
        report.outcome(Step::EditSpaceTag),
        Some(&Outcome::Skipped {
            blocked_by: Step::VerifySpaceTagCreated
        })
    );
    assert_eq!(
        report.outcome(Step::DeleteSpaceTag),
        Some(&Outcome::Skipped {
            blocked_by: Step::EditSpaceTag
        })
    );
    assert!(report.passed(Step::VerifyTaskTagRemoved));

    // Neither edit nor delete reached the service.
    let store = state.snapshot().unwrap();
    let names: Vec<&str> = store
        .space_tags(SPACE_ID)
        .unwrap()
        .iter()
        .map(|t| t.name.as_str())
        .collect();
    assert_eq!(names, vec!["backlog"]);
}

#[tokio::test]
async fn test_acknowledged_task_tag_removal_that_keeps_the_tag_fails() {
    let (state, base_url) = spawn_faulty_stub(seeded_store(), Fault::TaskRemoveKeepsTag).await;

    let report = suite(base_url, API_KEY, SPACE_ID, TASK_ID).run().await;

    for step in &Step::ALL[..6] {
        assert!(report.passed(*step), "{} should pass:\n{}", step, report);
    }
    assert!(report.passed(Step::RemoveTagFromTask));
    let message = failure_message(report.outcome(Step::VerifyTaskTagRemoved));
    assert!(message.starts_with(
        "Verification after DELETE /task/{task_id}/tag/{tag_name} failed"
    ));
    assert!(message.contains(&format!("`{}` is still present", TASK_TAG_NAME)));

    let store = state.snapshot().unwrap();
    assert!(store.task(TASK_ID).unwrap().tags.iter().any(|t| t.name == TASK_TAG_NAME));
}

#[tokio::test]
async fn test_tag_list_that_is_not_json_fails() {
    let (_state, base_url) = spawn_faulty_stub(seeded_store(), Fault::ListNotJson).await;

    let report = suite(base_url, API_KEY, SPACE_ID, TASK_ID).run().await;

    let message = failure_message(report.outcome(Step::ListSpaceTags));
    assert!(message.starts_with("Test for GET /space/{space_id}/tag failed"));
    assert!(message.contains("malformed response body"));
    assert_eq!(
        report.outcome(Step::CreateSpaceTag),
        Some(&Outcome::Skipped {
            blocked_by: Step::ListSpaceTags
        })
    );
    assert_eq!(
        report.summary(),
        Summary {
            passed: 3,
            failed: 1,
            skipped: 5
        }
    );
}
