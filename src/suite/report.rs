use std::fmt;
use std::time::Duration;
use time::OffsetDateTime;
use time::macros::format_description;

use super::Step;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Passed,
    Failed { message: String },
    /// Not executed because a required step did not pass.
    Skipped { blocked_by: Step },
}

impl Outcome {
    pub fn label(&self) -> &'static str {
        match self {
            Outcome::Passed => "PASS",
            Outcome::Failed { .. } => "FAIL",
            Outcome::Skipped { .. } => "SKIP",
        }
    }
}

#[derive(Debug, Clone)]
pub struct StepReport {
    pub step: Step,
    pub outcome: Outcome,
    pub elapsed: Duration,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Summary {
    pub passed: usize,
    pub failed: usize,
    pub skipped: usize,
}

#[derive(Debug, Clone)]
pub struct RunReport {
    started_at: OffsetDateTime,
    steps: Vec<StepReport>,
}

impl Default for RunReport {
    fn default() -> Self {
        Self::new()
    }
}

impl RunReport {
    pub fn new() -> Self {
        Self {
            started_at: OffsetDateTime::now_utc(),
            steps: Vec::new(),
        }
    }

    pub fn record(&mut self, report: StepReport) {
        self.steps.push(report);
    }

    pub fn steps(&self) -> &[StepReport] {
        &self.steps
    }

    pub fn outcome(&self, step: Step) -> Option<&Outcome> {
        self.steps
            .iter()
            .find(|r| r.step == step)
            .map(|r| &r.outcome)
    }

    /// A step that never ran has not passed.
    pub fn passed(&self, step: Step) -> bool {
        matches!(self.outcome(step), Some(Outcome::Passed))
    }

    /// Skipped steps count against the run.
    pub fn all_passed(&self) -> bool {
        !self.steps.is_empty() && self.steps.iter().all(|r| r.outcome == Outcome::Passed)
    }

    pub fn summary(&self) -> Summary {
        let mut summary = Summary::default();
        for report in &self.steps {
            match report.outcome {
                Outcome::Passed => summary.passed += 1,
                Outcome::Failed { .. } => summary.failed += 1,
                Outcome::Skipped { .. } => summary.skipped += 1,
            }
        }
        summary
    }

    pub fn failures(&self) -> impl Iterator<Item = &StepReport> {
        self.steps
            .iter()
            .filter(|r| matches!(r.outcome, Outcome::Failed { .. }))
    }
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let stamp = self
            .started_at
            .format(format_description!(
                "[year]-[month]-[day] [hour]:[minute]:[second] UTC"
            ))
            .map_err(|_| fmt::Error)?;
        writeln!(f, "tag scenario started {}", stamp)?;

        for report in &self.steps {
            write!(f, "  {} {}", report.outcome.label(), report.step)?;
            match &report.outcome {
                Outcome::Passed => writeln!(f, " ({})", crate::format_latency(report.elapsed))?,
                Outcome::Failed { message } => writeln!(f, ": {}", message)?,
                Outcome::Skipped { blocked_by } => writeln!(f, " (requires {})", blocked_by)?,
            }
        }

        let summary = self.summary();
        write!(
            f,
            "{} passed, {} failed, {} skipped",
            summary.passed, summary.failed, summary.skipped
        )
    }
}
