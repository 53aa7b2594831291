//! Domain state - business/data state separate from UI concerns
//!
//! Every change to the tracked jobs, statistics, notifications and
//! connection state goes through one of the `apply_*` reducers below. The
//! reducers never perform I/O; they return a [`FollowUp`] telling the caller
//! which requests to issue next.

use super::connection::{ConnectionMonitor, QueryKind};
use super::job::{JobControl, JobProjection, ScrapeConfig};
use super::notification::{NotificationLog, Severity};
use super::response::{ControlResponse, DatabaseStatsResponse, InfoRequestResponse, JobStatusResponse};
use super::stats::DatabaseStats;
use super::status::JobStatus;
use super::tracker::{JobTracker, PollOutcome, PollTicket};
use crate::format::{format_job_message, format_number};
use chrono::Local;
use std::path::PathBuf;

/// Client-side part of a start request, kept for the synthesised projection
#[derive(Debug, Clone, PartialEq)]
pub struct StartDraft {
    pub state: String,
    pub city: Option<String>,
    pub config: ScrapeConfig,
}

/// Requests a reducer wants issued after it ran
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FollowUp {
    /// Refetch database statistics now
    pub refetch_stats: bool,
    /// Fetch the selected job's status now
    pub refetch_job: Option<PollTicket>,
    /// Fetch the selected job's status once, after the job poll interval
    pub recheck_job: Option<PollTicket>,
}

/// Domain state containing all business data
#[derive(Debug, Default)]
pub struct DomainState {
    pub tracker: JobTracker,
    pub stats: Option<DatabaseStats>,
    pub notifications: NotificationLog,
    pub connection: ConnectionMonitor,
}

impl DomainState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current_job(&self) -> Option<&JobProjection> {
        self.tracker.current()
    }

    /// Mark a query request as issued
    pub fn begin_query(&mut self, kind: QueryKind) {
        self.connection.request_started(kind);
    }

    pub fn apply_started(&mut self, draft: StartDraft, result: Result<String, String>) -> FollowUp {
        match result {
            Ok(job_id) => {
                let projection =
                    JobProjection::pending(job_id.clone(), draft.state, draft.city, draft.config);
                let target = projection.target_label();
                let ticket = self.tracker.select_new(projection);
                self.connection.reset(QueryKind::JobStatus);
                tracing::info!(job_id = %job_id, "scraping job started");
                self.notifications.push(
                    format!("Scraping job {} started for {}", job_id, target),
                    Severity::Success,
                );
                FollowUp {
                    refetch_stats: true,
                    refetch_job: Some(ticket),
                    recheck_job: None,
                }
            }
            Err(err) => {
                tracing::warn!(error = %err, "failed to start scraping job");
                self.notifications
                    .push(format!("Failed to start scraping: {}", err), Severity::Error);
                FollowUp::default()
            }
        }
    }

    pub fn apply_job_poll(
        &mut self,
        ticket: &PollTicket,
        result: Result<JobStatusResponse, String>,
    ) -> FollowUp {
        if !self.tracker.is_current(ticket) {
            tracing::debug!(job_id = %ticket.job_id, token = ticket.token, "discarding stale job poll");
            return FollowUp::default();
        }

        let resp = match result {
            Ok(resp) => resp,
            Err(err) => {
                tracing::warn!(job_id = %ticket.job_id, error = %err, "job poll failed");
                self.connection.request_failed(QueryKind::JobStatus, err);
                let pending = self.tracker.current().map(|j| j.status) == Some(JobStatus::Pending);
                return FollowUp {
                    recheck_job: pending.then(|| ticket.clone()),
                    ..Default::default()
                };
            }
        };
        self.connection.request_succeeded(QueryKind::JobStatus);

        let previous = self.tracker.current().map(|j| j.status);
        match self.tracker.apply(ticket, &resp) {
            PollOutcome::Applied => {}
            PollOutcome::Stale => return FollowUp::default(),
            PollOutcome::Rejected { from, to } => {
                tracing::warn!(job_id = %ticket.job_id, ?from, ?to, "rejected job status transition");
                return FollowUp::default();
            }
        }

        if let Some(ref nested) = resp.db_stats {
            self.replace_stats(nested);
        }

        if previous != Some(resp.status) {
            self.notify_status_change(ticket, resp.status);
        }

        FollowUp {
            recheck_job: (resp.status == JobStatus::Pending).then(|| ticket.clone()),
            ..Default::default()
        }
    }

    fn notify_status_change(&mut self, ticket: &PollTicket, status: JobStatus) {
        let count = self.tracker.current().map(|j| j.results_count);
        let severity = match status {
            JobStatus::Completed => Severity::Success,
            JobStatus::Failed => Severity::Error,
            JobStatus::Cancelled | JobStatus::Paused => Severity::Warning,
            JobStatus::Pending | JobStatus::Running => Severity::Info,
        };
        tracing::info!(job_id = %ticket.job_id, ?status, "job status changed");
        self.notifications
            .push(format_job_message(&ticket.job_id, status, count), severity);
    }

    pub fn apply_stats(&mut self, result: Result<DatabaseStatsResponse, String>) {
        let resp = match result {
            Ok(resp) => resp,
            Err(err) => {
                tracing::warn!(error = %err, "database stats request failed");
                self.connection.request_failed(QueryKind::DatabaseStats, err);
                return;
            }
        };
        if let Some(err) = resp.error.clone() {
            tracing::warn!(error = %err, "backend reported a database stats error");
            self.connection.request_failed(QueryKind::DatabaseStats, err);
            return;
        }
        self.connection.request_succeeded(QueryKind::DatabaseStats);
        self.replace_stats(&resp);
    }

    fn replace_stats(&mut self, resp: &DatabaseStatsResponse) {
        if resp.error.is_some() {
            return;
        }
        self.stats = Some(DatabaseStats::from_response(resp, Local::now()));
    }

    pub fn apply_control(
        &mut self,
        job_id: &str,
        control: JobControl,
        result: Result<ControlResponse, String>,
    ) -> FollowUp {
        let failure = match result {
            Ok(resp) if resp.success => {
                tracing::info!(job_id = %job_id, action = control.verb(), "job control accepted");
                self.notifications.push(
                    format!("Job {} {}", job_id, control.past_tense()),
                    Severity::Success,
                );
                let refetch_job = self
                    .tracker
                    .ticket()
                    .filter(|ticket| ticket.job_id == job_id);
                return FollowUp {
                    refetch_job,
                    ..Default::default()
                };
            }
            Ok(resp) => resp
                .message
                .unwrap_or_else(|| "request was not accepted".to_string()),
            Err(err) => err,
        };
        tracing::warn!(job_id = %job_id, action = control.verb(), error = %failure, "job control failed");
        self.notifications.push(
            format!("Failed to {} job {}: {}", control.verb(), job_id, failure),
            Severity::Error,
        );
        FollowUp::default()
    }

    /// Returns the inline error to show in the dialog, if any
    pub fn apply_info_request(&mut self, result: Result<InfoRequestResponse, String>) -> Option<String> {
        let failure = match result {
            Ok(resp) if resp.status == "success" => {
                let message = if resp.message.is_empty() {
                    "Information request sent".to_string()
                } else {
                    resp.message
                };
                self.notifications.push(message, Severity::Success);
                return None;
            }
            Ok(resp) => resp.message,
            Err(err) => err,
        };
        tracing::warn!(error = %failure, "information request failed");
        self.notifications
            .push(format!("Information request failed: {}", failure), Severity::Error);
        Some(failure)
    }

    pub fn apply_download(&mut self, job_id: &str, result: Result<(PathBuf, usize), String>) {
        match result {
            Ok((path, rows)) => {
                tracing::info!(job_id = %job_id, path = %path.display(), rows, "results downloaded");
                self.notifications.push(
                    format!(
                        "Saved {} postcodes to {}",
                        format_number(rows as u64),
                        path.display()
                    ),
                    Severity::Success,
                );
            }
            Err(err) => {
                tracing::warn!(job_id = %job_id, error = %err, "download failed");
                self.notifications
                    .push(format!("Download failed: {}", err), Severity::Error);
            }
        }
    }
}
