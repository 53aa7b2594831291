//! Job-lifecycle tracker
//!
//! Holds every job started during the session, which one is selected, and
//! the selection token used to discard responses for a superseded selection.

use super::job::JobProjection;
use super::response::JobStatusResponse;
use super::status::JobStatus;
use std::time::Duration;

/// Identifies the selection a job poll was issued for
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollTicket {
    pub job_id: String,
    pub token: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    /// Merged into the selected projection
    Applied,
    /// Issued for a selection that is no longer current
    Stale,
    /// The reported status is not reachable from the local one
    Rejected { from: JobStatus, to: JobStatus },
}

#[derive(Debug, Default)]
pub struct JobTracker {
    jobs: Vec<JobProjection>,
    selected: Option<usize>,
    token: u64,
}

impl JobTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Select a freshly started job, parking the current one
    pub fn select_new(&mut self, projection: JobProjection) -> PollTicket {
        if let Some(idx) = self.jobs.iter().position(|j| j.job_id == projection.job_id) {
            self.jobs[idx] = projection;
            return self.select_index(idx);
        }
        self.jobs.push(projection);
        self.select_index(self.jobs.len() - 1)
    }

    /// Cycle through known jobs; `forward` moves to the next one started
    pub fn switch(&mut self, forward: bool) -> Option<PollTicket> {
        let len = self.jobs.len();
        if len < 2 {
            return None;
        }
        let current = self.selected.unwrap_or(0);
        let next = if forward {
            (current + 1) % len
        } else {
            (current + len - 1) % len
        };
        Some(self.select_index(next))
    }

    fn select_index(&mut self, idx: usize) -> PollTicket {
        self.selected = Some(idx);
        self.token += 1;
        PollTicket {
            job_id: self.jobs[idx].job_id.clone(),
            token: self.token,
        }
    }

    pub fn current(&self) -> Option<&JobProjection> {
        self.selected.and_then(|idx| self.jobs.get(idx))
    }

    pub fn ticket(&self) -> Option<PollTicket> {
        self.current().map(|job| PollTicket {
            job_id: job.job_id.clone(),
            token: self.token,
        })
    }

    pub fn is_current(&self, ticket: &PollTicket) -> bool {
        ticket.token == self.token
            && self
                .current()
                .is_some_and(|job| job.job_id == ticket.job_id)
    }

    /// Reconcile a poll response with the selected projection
    pub fn apply(&mut self, ticket: &PollTicket, resp: &JobStatusResponse) -> PollOutcome {
        if !self.is_current(ticket) {
            return PollOutcome::Stale;
        }
        let Some(job) = self.selected.and_then(|idx| self.jobs.get_mut(idx)) else {
            return PollOutcome::Stale;
        };
        if !job.status.can_transition_to(resp.status) {
            return PollOutcome::Rejected {
                from: job.status,
                to: resp.status,
            };
        }
        job.merge_response(resp);
        PollOutcome::Applied
    }

    /// Interval for polling the selected job; only running jobs are polled
    pub fn poll_interval(&self, every: Duration) -> Option<Duration> {
        match self.current() {
            Some(job) if job.status == JobStatus::Running => Some(every),
            _ => None,
        }
    }

    pub fn jobs(&self) -> &[JobProjection] {
        &self.jobs
    }

    /// 1-based position of the selection, for the "job 2/3" indicator
    pub fn position(&self) -> Option<(usize, usize)> {
        self.selected.map(|idx| (idx + 1, self.jobs.len()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::job::ScrapeConfig;

    fn job(id: &str) -> JobProjection {
        JobProjection::pending(id, "California", None, ScrapeConfig::default())
    }

    fn resp(status: JobStatus) -> JobStatusResponse {
        JobStatusResponse {
            status,
            ..Default::default()
        }
    }

    #[test]
    fn test_no_polling_unless_running() {
        let every = Duration::from_secs(5);
        let mut tracker = JobTracker::new();
        assert_eq!(tracker.poll_interval(every), None);

        let ticket = tracker.select_new(job("job-1"));
        assert_eq!(tracker.poll_interval(every), None);

        tracker.apply(&ticket, &resp(JobStatus::Running));
        assert_eq!(tracker.poll_interval(every), Some(every));

        for status in [JobStatus::Paused, JobStatus::Completed] {
            tracker.apply(&ticket, &resp(status));
            assert_eq!(tracker.poll_interval(every), None, "{:?}", status);
        }
    }

    #[test]
    fn test_stale_ticket_is_discarded() {
        let mut tracker = JobTracker::new();
        let first = tracker.select_new(job("job-1"));
        let second = tracker.select_new(job("job-2"));
        assert_eq!(
            tracker.apply(&first, &resp(JobStatus::Completed)),
            PollOutcome::Stale
        );
        assert_eq!(tracker.current().unwrap().status, JobStatus::Pending);
        assert_eq!(
            tracker.apply(&second, &resp(JobStatus::Running)),
            PollOutcome::Applied
        );
    }

    #[test]
    fn test_reselecting_same_job_invalidates_old_ticket() {
        let mut tracker = JobTracker::new();
        tracker.select_new(job("a"));
        let old = tracker.select_new(job("b"));
        tracker.switch(true);
        tracker.switch(true);
        assert_eq!(tracker.current().unwrap().job_id, "b");
        assert!(!tracker.is_current(&old));
    }

    #[test]
    fn test_terminal_projection_rejects_changes() {
        let mut tracker = JobTracker::new();
        let ticket = tracker.select_new(job("job-1"));
        tracker.apply(&ticket, &resp(JobStatus::Failed));
        assert_eq!(
            tracker.apply(&ticket, &resp(JobStatus::Running)),
            PollOutcome::Rejected {
                from: JobStatus::Failed,
                to: JobStatus::Running
            }
        );
        assert_eq!(tracker.current().unwrap().status, JobStatus::Failed);
    }

    #[test]
    fn test_switch_parks_and_restores() {
        let mut tracker = JobTracker::new();
        assert!(tracker.switch(true).is_none());

        let a = tracker.select_new(job("a"));
        tracker.apply(&a, &resp(JobStatus::Running));
        tracker.select_new(job("b"));
        assert_eq!(tracker.position(), Some((2, 2)));

        let back = tracker.switch(false).unwrap();
        assert_eq!(back.job_id, "a");
        assert_eq!(tracker.current().unwrap().status, JobStatus::Running);
        assert_eq!(tracker.position(), Some((1, 2)));
    }
}
