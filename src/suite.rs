//! Ordered tag scenario.
//!
//! Steps form a small graph: each [`Step`] names the steps it requires, and
//! the runner executes them in declaration order, skipping any step whose
//! requirement did not pass. State shared between steps lives in a
//! [`RunContext`] handed to each step explicitly.

pub mod report;
pub mod steps;

pub use report::{Outcome, RunReport, StepReport, Summary};
pub use steps::Step;

use reqwest::StatusCode;
use std::time::Instant;
use thiserror::Error;

use crate::clickup::{self, ApiReply, Client, ClientError};
use crate::config::SuiteConfig;

/// Longest slice of a response body quoted in a failure message.
const BODY_EXCERPT_CHARS: usize = 200;

#[derive(Error, Debug)]
pub enum CheckError {
    #[error("expected status {expected}, got {actual}: {body}")]
    UnexpectedStatus {
        expected: StatusCode,
        actual: StatusCode,
        body: String,
    },

    #[error("expected a non-empty tag list")]
    EmptyTagList,

    #[error("expected tag `{0}` in the response")]
    MissingTag(String),

    #[error("tag `{0}` is still present")]
    UnexpectedTag(String),

    #[error("tracked tag name is `{actual}`, expected `{expected}`")]
    TrackedNameMismatch { expected: &'static str, actual: String },

    #[error("no space tag has been recorded for this run")]
    NoTrackedTag,

    #[error("malformed response body: {0}")]
    MalformedBody(#[from] serde_json::Error),

    #[error(transparent)]
    Client(#[from] ClientError),
}

pub type CheckResult<T = ()> = Result<T, CheckError>;

/// Values carried from one step to the next.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunContext {
    space_tag: Option<String>,
}

impl RunContext {
    /// Name of the space tag this run created, after any rename.
    pub fn space_tag(&self) -> Option<&str> {
        self.space_tag.as_deref()
    }

    pub(crate) fn track_space_tag(&mut self, name: impl Into<String>) {
        self.space_tag = Some(name.into());
    }

    pub(crate) fn tracked_space_tag(&self) -> CheckResult<&str> {
        self.space_tag().ok_or(CheckError::NoTrackedTag)
    }

    pub(crate) fn expect_space_tag(&self, expected: &'static str) -> CheckResult {
        let actual = self.tracked_space_tag()?;
        if actual != expected {
            return Err(CheckError::TrackedNameMismatch {
                expected,
                actual: actual.to_string(),
            });
        }
        Ok(())
    }
}

pub(crate) fn expect_status(reply: &ApiReply, expected: StatusCode) -> CheckResult {
    if reply.status != expected {
        return Err(CheckError::UnexpectedStatus {
            expected,
            actual: reply.status,
            body: excerpt(&reply.body),
        });
    }
    Ok(())
}

fn excerpt(body: &str) -> String {
    let mut chars = body.chars();
    let head: String = chars.by_ref().take(BODY_EXCERPT_CHARS).collect();
    if chars.next().is_some() {
        format!("{}…", head)
    } else {
        head
    }
}

/// The scenario bound to one client and one pair of ids.
#[derive(Debug, Clone)]
pub struct Suite {
    client: Client,
    space_id: String,
    task_id: String,
}

impl Suite {
    pub fn new(client: Client, space_id: impl Into<String>, task_id: impl Into<String>) -> Self {
        Self {
            client,
            space_id: space_id.into(),
            task_id: task_id.into(),
        }
    }

    pub fn from_config(config: &SuiteConfig) -> clickup::Result<Self> {
        let client = Client::new(config.base_url.clone(), config.api_key.clone())?;
        Ok(Self::new(client, &config.space_id, &config.task_id))
    }

    /// Runs every step in order. Never short-circuits: failures are recorded
    /// and their dependents skipped, independent steps still run.
    pub async fn run(&self) -> RunReport {
        let mut ctx = RunContext::default();
        let mut report = RunReport::new();

        tracing::info!(
            base_url = %self.client.base_url(),
            space_id = %self.space_id,
            task_id = %self.task_id,
            "starting tag scenario"
        );

        for step in Step::ALL {
            if let Some(blocker) = step.requires().iter().find(|r| !report.passed(**r)) {
                tracing::warn!("{} skipped: requires {}", step, blocker);
                report.record(StepReport {
                    step,
                    outcome: Outcome::Skipped { blocked_by: *blocker },
                    elapsed: Default::default(),
                });
                continue;
            }

            tracing::info!("{} running", step);
            let started = Instant::now();
            let outcome = match step.execute(self, &mut ctx).await {
                Ok(()) => {
                    tracing::info!("{} passed", step);
                    Outcome::Passed
                }
                Err(err) => {
                    let message = format!("{}: {}", step.diagnostic(), err);
                    tracing::error!("{}", message);
                    Outcome::Failed { message }
                }
            };
            report.record(StepReport {
                step,
                outcome,
                elapsed: started.elapsed(),
            });
        }

        let summary = report.summary();
        tracing::info!(
            passed = summary.passed,
            failed = summary.failed,
            skipped = summary.skipped,
            "tag scenario finished"
        );
        report
    }

    pub(crate) fn client(&self) -> &Client {
        &self.client
    }

    pub(crate) fn space_id(&self) -> &str {
        &self.space_id
    }

    pub(crate) fn task_id(&self) -> &str {
        &self.task_id
    }
}
