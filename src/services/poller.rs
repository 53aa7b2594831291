//! Background request scheduler
//!
//! Requests run as tasks on a tokio runtime and report back over a channel.
//! The UI loop drains the channel on every tick, so results are applied in
//! arrival order on the UI thread.

use super::api::ApiClient;
use super::download::{save_results, DownloadSummary};
use super::error::ClientError;
use crate::model::response::{
    ControlResponse, DatabaseStatsResponse, InfoRequest, InfoRequestResponse, JobStatusResponse,
    ScrapeRequest,
};
use crate::model::{JobControl, PollTicket, QueryKind, StartDraft};
use std::future::Future;
use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};

/// Results delivered to the UI loop
#[derive(Debug)]
pub enum ApiEvent {
    /// A polled query is about to hit the network
    QueryStarted(QueryKind),
    Started {
        draft: StartDraft,
        result: Result<String, ClientError>,
    },
    JobPolled {
        ticket: PollTicket,
        result: Result<JobStatusResponse, ClientError>,
    },
    StatsPolled(Result<DatabaseStatsResponse, ClientError>),
    Controlled {
        job_id: String,
        control: JobControl,
        result: Result<ControlResponse, ClientError>,
    },
    InfoRequested(Result<InfoRequestResponse, ClientError>),
    Downloaded {
        job_id: String,
        result: Result<DownloadSummary, ClientError>,
    },
}

/// A spawned task that is aborted when dropped
#[derive(Debug)]
pub struct PollTask {
    handle: JoinHandle<()>,
}

impl PollTask {
    fn spawn<F>(runtime: &Handle, fut: F) -> Self
    where
        F: Future<Output = ()> + Send + 'static,
    {
        Self {
            handle: runtime.spawn(fut),
        }
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl Drop for PollTask {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Interval poll of the selected job
#[derive(Debug)]
struct JobPoll {
    ticket: PollTicket,
    every: Duration,
    _task: PollTask,
}

pub struct Poller {
    runtime: Handle,
    api: ApiClient,
    download_dir: PathBuf,
    tx: Sender<ApiEvent>,
    rx: Receiver<ApiEvent>,
    stats_task: Option<(Duration, PollTask)>,
    job_poll: Option<JobPoll>,
    recheck_task: Option<PollTask>,
}

impl Poller {
    pub fn new(runtime: Handle, api: ApiClient, download_dir: PathBuf) -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            runtime,
            api,
            download_dir,
            tx,
            rx,
            stats_task: None,
            job_poll: None,
            recheck_task: None,
        }
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    /// Take every event that has arrived so far
    pub fn drain(&self) -> Vec<ApiEvent> {
        let mut events = Vec::new();
        loop {
            match self.rx.try_recv() {
                Ok(event) => events.push(event),
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }
        events
    }

    /// Poll database statistics every `every`, starting immediately
    pub fn poll_stats(&mut self, every: Duration) {
        if matches!(self.stats_task, Some((current, ref task)) if current == every && !task.is_finished())
        {
            return;
        }
        let api = self.api.clone();
        let tx = self.tx.clone();
        let task = PollTask::spawn(&self.runtime, async move {
            let mut ticker = time::interval(every);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                if fetch_stats(&api, &tx).await.is_err() {
                    break;
                }
            }
        });
        self.stats_task = Some((every, task));
    }

    /// Enable, keep or disable interval polling of a job.
    ///
    /// Called after every state update; an unchanged request leaves the
    /// running task alone so its schedule is not reset.
    pub fn set_job_polling(&mut self, wanted: Option<(PollTicket, Duration)>) {
        let Some((ticket, every)) = wanted else {
            if self.job_poll.take().is_some() {
                tracing::debug!("job polling disabled");
            }
            return;
        };
        if let Some(ref current) = self.job_poll {
            if current.ticket == ticket && current.every == every {
                return;
            }
        }

        tracing::debug!(job_id = %ticket.job_id, ?every, "job polling enabled");
        let api = self.api.clone();
        let tx = self.tx.clone();
        let task_ticket = ticket.clone();
        let task = PollTask::spawn(&self.runtime, async move {
            let mut ticker = time::interval_at(Instant::now() + every, every);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                if fetch_job(&api, &tx, task_ticket.clone()).await.is_err() {
                    break;
                }
            }
        });
        self.job_poll = Some(JobPoll {
            ticket,
            every,
            _task: task,
        });
    }

    pub fn is_polling_job(&self) -> bool {
        self.job_poll.is_some()
    }

    pub fn fetch_job_now(&self, ticket: PollTicket) {
        let api = self.api.clone();
        let tx = self.tx.clone();
        self.runtime.spawn(async move {
            let _ = fetch_job(&api, &tx, ticket).await;
        });
    }

    /// One deferred fetch; replaces any pending re-check
    pub fn schedule_job_recheck(&mut self, ticket: PollTicket, after: Duration) {
        let api = self.api.clone();
        let tx = self.tx.clone();
        self.recheck_task = Some(PollTask::spawn(&self.runtime, async move {
            time::sleep(after).await;
            let _ = fetch_job(&api, &tx, ticket).await;
        }));
    }

    pub fn fetch_stats_now(&self) {
        let api = self.api.clone();
        let tx = self.tx.clone();
        self.runtime.spawn(async move {
            let _ = fetch_stats(&api, &tx).await;
        });
    }

    pub fn start_scraping(&self, draft: StartDraft, req: ScrapeRequest) {
        let api = self.api.clone();
        let tx = self.tx.clone();
        self.runtime.spawn(async move {
            let result = api.start_scraping(&req).await;
            let _ = tx.send(ApiEvent::Started { draft, result });
        });
    }

    pub fn control_job(&self, job_id: String, control: JobControl) {
        let api = self.api.clone();
        let tx = self.tx.clone();
        self.runtime.spawn(async move {
            let result = api.control_job(&job_id, control).await;
            let _ = tx.send(ApiEvent::Controlled {
                job_id,
                control,
                result,
            });
        });
    }

    pub fn request_info(&self, req: InfoRequest) {
        let api = self.api.clone();
        let tx = self.tx.clone();
        self.runtime.spawn(async move {
            let result = api.request_info(&req).await;
            let _ = tx.send(ApiEvent::InfoRequested(result));
        });
    }

    /// Fetch a job's CSV and save it as `file_name` in the download directory
    pub fn download(&self, job_id: String, file_name: String) {
        let api = self.api.clone();
        let tx = self.tx.clone();
        let dir = self.download_dir.clone();
        self.runtime.spawn(async move {
            let result = match api.download_results(&job_id).await {
                Ok(bytes) => save_results(&bytes, &dir, &file_name),
                Err(e) => Err(e),
            };
            let _ = tx.send(ApiEvent::Downloaded { job_id, result });
        });
    }
}

/// Send errors mean the UI loop is gone; callers stop polling
async fn fetch_job(
    api: &ApiClient,
    tx: &Sender<ApiEvent>,
    ticket: PollTicket,
) -> Result<(), mpsc::SendError<ApiEvent>> {
    tx.send(ApiEvent::QueryStarted(QueryKind::JobStatus))?;
    let result = api.job_status(&ticket.job_id).await;
    tx.send(ApiEvent::JobPolled { ticket, result })
}

async fn fetch_stats(api: &ApiClient, tx: &Sender<ApiEvent>) -> Result<(), mpsc::SendError<ApiEvent>> {
    tx.send(ApiEvent::QueryStarted(QueryKind::DatabaseStats))?;
    let result = api.database_stats().await;
    tx.send(ApiEvent::StatsPolled(result))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn poller(server: &MockServer) -> Poller {
        let api = ApiClient::new(&server.uri(), Duration::from_secs(5));
        Poller::new(Handle::current(), api, std::env::temp_dir())
    }

    fn ticket(id: &str) -> PollTicket {
        PollTicket {
            job_id: id.to_string(),
            token: 1,
        }
    }

    /// Drain until `done` holds for the collected events or the deadline passes
    async fn collect_until(poller: &Poller, done: impl Fn(&[ApiEvent]) -> bool) -> Vec<ApiEvent> {
        let deadline = std::time::Instant::now() + Duration::from_secs(5);
        let mut events = Vec::new();
        while std::time::Instant::now() < deadline {
            events.extend(poller.drain());
            if done(&events) {
                break;
            }
            time::sleep(Duration::from_millis(20)).await;
        }
        events
    }

    fn count_job_polls(events: &[ApiEvent]) -> usize {
        events
            .iter()
            .filter(|e| matches!(e, ApiEvent::JobPolled { .. }))
            .count()
    }

    async fn mount_running_job(server: &MockServer) {
        Mock::given(method("GET"))
            .and(path("/job/job-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "running"})))
            .mount(server)
            .await;
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_fetch_reports_start_then_result() {
        let server = MockServer::start().await;
        mount_running_job(&server).await;

        let poller = poller(&server);
        poller.fetch_job_now(ticket("job-1"));
        let events = collect_until(&poller, |e| count_job_polls(e) == 1).await;

        assert!(matches!(events[0], ApiEvent::QueryStarted(QueryKind::JobStatus)));
        match &events[1] {
            ApiEvent::JobPolled { ticket, result } => {
                assert_eq!(ticket.job_id, "job-1");
                assert!(result.is_ok());
            }
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_job_polling_repeats_until_disabled() {
        let server = MockServer::start().await;
        mount_running_job(&server).await;

        let mut poller = poller(&server);
        poller.set_job_polling(Some((ticket("job-1"), Duration::from_millis(50))));
        let events = collect_until(&poller, |e| count_job_polls(e) >= 2).await;
        assert!(count_job_polls(&events) >= 2);

        poller.set_job_polling(None);
        assert!(!poller.is_polling_job());
        time::sleep(Duration::from_millis(100)).await;
        poller.drain();
        time::sleep(Duration::from_millis(200)).await;
        assert_eq!(count_job_polls(&poller.drain()), 0);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_recheck_fires_once() {
        let server = MockServer::start().await;
        mount_running_job(&server).await;

        let mut poller = poller(&server);
        poller.schedule_job_recheck(ticket("job-1"), Duration::from_millis(30));
        let events = collect_until(&poller, |e| count_job_polls(e) == 1).await;
        assert_eq!(count_job_polls(&events), 1);

        time::sleep(Duration::from_millis(150)).await;
        assert_eq!(count_job_polls(&poller.drain()), 0);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_stats_failure_is_delivered() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/database-stats"))
            .respond_with(ResponseTemplate::new(500).set_body_string("Internal Server Error"))
            .mount(&server)
            .await;

        let mut poller = poller(&server);
        poller.poll_stats(Duration::from_secs(30));
        let events = collect_until(&poller, |e| {
            e.iter().any(|ev| matches!(ev, ApiEvent::StatsPolled(_)))
        })
        .await;
        let failed = events.iter().any(|ev| {
            matches!(ev, ApiEvent::StatsPolled(Err(ClientError::Api { status: 500, .. })))
        });
        assert!(failed);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_download_saves_file() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/download/job-1"))
            .respond_with(
                ResponseTemplate::new(200).set_body_string("Post-Code,City/Town\n90001,Los Angeles\n"),
            )
            .mount(&server)
            .await;

        let dir = std::env::temp_dir().join(format!("postcode-tui-poller-{}", std::process::id()));
        let api = ApiClient::new(&server.uri(), Duration::from_secs(5));
        let poller = Poller::new(Handle::current(), api, dir.clone());
        poller.download("job-1".to_string(), "postcodes_california.csv".to_string());

        let events = collect_until(&poller, |e| !e.is_empty()).await;
        match &events[0] {
            ApiEvent::Downloaded { job_id, result } => {
                assert_eq!(job_id, "job-1");
                let summary = result.as_ref().unwrap();
                assert_eq!(summary.rows, 1);
                assert_eq!(summary.path, dir.join("postcodes_california.csv"));
            }
            other => panic!("unexpected event: {:?}", other),
        }
        let _ = std::fs::remove_dir_all(&dir);
    }
}
