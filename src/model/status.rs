//! Job status enumeration and its transition rules

use serde::{Deserialize, Serialize};

/// Lifecycle status of a scraping job as reported by the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    #[default]
    #[serde(alias = "queued")]
    Pending,
    Running,
    Paused,
    Completed,
    #[serde(alias = "error")]
    Failed,
    #[serde(alias = "canceled")]
    Cancelled,
}

impl JobStatus {
    /// Completed, failed and cancelled jobs never change again
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            JobStatus::Completed | JobStatus::Failed | JobStatus::Cancelled
        )
    }

    /// Whether a job in this status may move to `next`.
    ///
    /// Re-reporting the same status is always allowed. Pending jobs may
    /// jump straight to a terminal status since the backend can finish
    /// between two polls.
    pub fn can_transition_to(&self, next: JobStatus) -> bool {
        if *self == next {
            return true;
        }
        match self {
            JobStatus::Pending => true,
            JobStatus::Running => matches!(
                next,
                JobStatus::Paused | JobStatus::Completed | JobStatus::Failed | JobStatus::Cancelled
            ),
            JobStatus::Paused => matches!(
                next,
                JobStatus::Running | JobStatus::Failed | JobStatus::Cancelled
            ),
            JobStatus::Completed | JobStatus::Failed | JobStatus::Cancelled => false,
        }
    }

    /// Pause is offered while running, resume while paused
    pub fn can_pause(&self) -> bool {
        *self == JobStatus::Running
    }

    pub fn can_resume(&self) -> bool {
        *self == JobStatus::Paused
    }

    pub fn can_cancel(&self) -> bool {
        matches!(self, JobStatus::Pending | JobStatus::Running | JobStatus::Paused)
    }

    pub fn icon(&self) -> &'static str {
        match self {
            JobStatus::Pending => "○",
            JobStatus::Running => "⏳",
            JobStatus::Paused => "⏸",
            JobStatus::Completed => "✓",
            JobStatus::Failed => "✗",
            JobStatus::Cancelled => "■",
        }
    }
}
