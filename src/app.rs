//! Root application component
//!
//! The App struct implements the Component trait, acting as the root component
//! that delegates event handling and rendering to child components.
//! App is intentionally lean - it routes keys, hands background results to
//! the domain reducers and issues the follow-up requests they ask for.

use crate::action::Action;
use crate::component::Component;
use crate::components::{
    draw_dashboard, ConfirmDialog, ConnectionDetailsDialog, DashboardContext, HelpDialog,
    InfoRequestDialog, NotificationsDialog, ResultsPreviewTable, ScrapeFormDialog,
    SetupComponent,
};
use crate::config::Config;
use crate::format::format_status;
use crate::model::domain::DomainState;
use crate::model::modal::{Modal, ModalStack};
use crate::model::ui::AppMode;
use crate::model::{FollowUp, JobControl, JobStatus, QueryKind};
use crate::services::{ApiClient, ApiEvent, Poller};
use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseEvent, MouseEventKind};
use ratatui::{layout::Rect, Frame};
use std::path::PathBuf;
use std::time::Duration;
use tokio::runtime::Handle;

// ═══════════════════════════════════════════════════════════════════════════════
// App Struct
// ═══════════════════════════════════════════════════════════════════════════════

/// Main application state - coordinates between components
pub struct App {
    /// Current application mode
    pub mode: AppMode,

    /// Domain state (business data)
    pub domain: DomainState,

    /// Modal overlay stack
    pub modals: ModalStack,

    /// Background request scheduler, present once a backend is configured
    pub poller: Option<Poller>,

    /// Runtime the poller spawns its tasks on
    runtime: Handle,

    /// Active configuration
    pub config: Config,

    /// Flag to indicate the app should quit
    pub should_quit: bool,

    /// Error message to display
    pub error: Option<String>,

    /// Status message to display
    pub status_message: Option<String>,

    // ─────────────────────────────────────────────────────────────────────────
    // Child Components
    // ─────────────────────────────────────────────────────────────────────────
    pub setup: SetupComponent,
    pub results: ResultsPreviewTable,
    pub scrape_form: ScrapeFormDialog,
    pub info_dialog: InfoRequestDialog,
    pub confirm_dialog: ConfirmDialog,
    pub notifications_dialog: NotificationsDialog,
    pub connection_dialog: ConnectionDetailsDialog,
    pub help_dialog: HelpDialog,
}

// ═══════════════════════════════════════════════════════════════════════════════
// App Implementation
// ═══════════════════════════════════════════════════════════════════════════════

impl App {
    /// Create a new App instance, running the setup wizard when no config exists
    pub fn new(runtime: Handle) -> App {
        match Config::load() {
            Some(config) => Self::with_config(runtime, config),
            None => {
                tracing::info!("no config found, starting setup wizard");
                Self::create_app(runtime, AppMode::Setup, Config::default())
            }
        }
    }

    /// Create an App connected to the backend named in `config`
    pub fn with_config(runtime: Handle, config: Config) -> App {
        let mut app = Self::create_app(runtime, AppMode::Running, config.clone());
        app.connect(config);
        app
    }

    fn create_app(runtime: Handle, mode: AppMode, config: Config) -> App {
        App {
            mode,
            domain: DomainState::new(),
            modals: ModalStack::new(),
            poller: None,
            runtime,
            config,
            should_quit: false,
            error: None,
            status_message: None,
            // Components
            setup: SetupComponent::new(),
            results: ResultsPreviewTable::new(),
            scrape_form: ScrapeFormDialog::default(),
            info_dialog: InfoRequestDialog::default(),
            confirm_dialog: ConfirmDialog::quit(),
            notifications_dialog: NotificationsDialog::default(),
            connection_dialog: ConnectionDetailsDialog::default(),
            help_dialog: HelpDialog::default(),
        }
    }

    /// Build the API client and poller and start the statistics poll
    fn connect(&mut self, config: Config) {
        tracing::info!(base_url = %config.base_url, "connecting to scraping backend");
        let api = ApiClient::new(&config.base_url, config.request_timeout());
        let mut poller = Poller::new(
            self.runtime.clone(),
            api,
            PathBuf::from(&config.download_dir),
        );
        poller.poll_stats(config.stats_poll_interval());
        self.poller = Some(poller);
        self.config = config;
    }

    fn job_poll_interval(&self) -> Duration {
        self.config.job_poll_interval()
    }

    /// Apply everything the background tasks delivered since the last tick
    fn process_events(&mut self) {
        let events = match self.poller {
            Some(ref poller) => poller.drain(),
            None => return,
        };
        for event in events {
            let follow_up = self.apply_event(event);
            self.run_follow_up(follow_up);
        }
    }

    fn apply_event(&mut self, event: ApiEvent) -> FollowUp {
        match event {
            ApiEvent::QueryStarted(kind) => {
                self.domain.begin_query(kind);
                FollowUp::default()
            }
            ApiEvent::Started { draft, result } => {
                let result = result.map_err(|e| e.user_message());
                self.scrape_form.finish(result.as_ref().err().cloned());
                if result.is_ok() && self.modals.top() == Some(&Modal::ScrapeForm) {
                    self.modals.pop();
                }
                self.domain.apply_started(draft, result)
            }
            ApiEvent::JobPolled { ticket, result } => self
                .domain
                .apply_job_poll(&ticket, result.map_err(|e| e.user_message())),
            ApiEvent::StatsPolled(result) => {
                self.domain.apply_stats(result.map_err(|e| e.user_message()));
                FollowUp::default()
            }
            ApiEvent::Controlled {
                job_id,
                control,
                result,
            } => self
                .domain
                .apply_control(&job_id, control, result.map_err(|e| e.user_message())),
            ApiEvent::InfoRequested(result) => {
                let inline = self
                    .domain
                    .apply_info_request(result.map_err(|e| e.user_message()));
                let sent = inline.is_none();
                self.info_dialog.finish(inline);
                if sent && self.modals.top() == Some(&Modal::InfoRequest) {
                    self.modals.pop();
                }
                FollowUp::default()
            }
            ApiEvent::Downloaded { job_id, result } => {
                self.status_message = None;
                self.domain.apply_download(
                    &job_id,
                    result
                        .map(|summary| (summary.path, summary.rows))
                        .map_err(|e| e.user_message()),
                );
                FollowUp::default()
            }
        }
    }

    fn run_follow_up(&mut self, follow_up: FollowUp) {
        let every = self.job_poll_interval();
        let Some(ref mut poller) = self.poller else {
            return;
        };
        if follow_up.refetch_stats {
            poller.fetch_stats_now();
        }
        if let Some(ticket) = follow_up.refetch_job {
            poller.fetch_job_now(ticket);
        }
        if let Some(ticket) = follow_up.recheck_job {
            poller.schedule_job_recheck(ticket, every);
        }
    }

    /// Interval polling runs only while the selected job is running
    fn sync_job_polling(&mut self) {
        let every = self.job_poll_interval();
        let tracker = &self.domain.tracker;
        let wanted = tracker.ticket().zip(tracker.poll_interval(every));
        if let Some(ref mut poller) = self.poller {
            poller.set_job_polling(wanted);
        }
    }

    fn switch_job(&mut self, forward: bool) {
        let Some(ticket) = self.domain.tracker.switch(forward) else {
            self.status_message = Some("No other jobs started this session".to_string());
            return;
        };
        self.domain.connection.reset(QueryKind::JobStatus);
        self.status_message = Some(format!("Viewing job {}", ticket.job_id));
        if let Some(ref poller) = self.poller {
            poller.fetch_job_now(ticket);
        }
        self.sync_job_polling();
    }

    fn send_control(&mut self, control: JobControl) {
        let Some(job) = self.domain.current_job() else {
            self.status_message = Some("No job selected".to_string());
            return;
        };
        if !control.allowed_for(job.status) {
            self.status_message = Some(format!(
                "Cannot {} a {} job",
                control.verb(),
                format_status(job.status).to_lowercase()
            ));
            return;
        }
        let job_id = job.job_id.clone();
        tracing::info!(job_id = %job_id, action = control.verb(), "sending job control");
        if let Some(ref poller) = self.poller {
            poller.control_job(job_id, control);
        }
    }

    fn download_results(&mut self) {
        let Some(job) = self.domain.current_job() else {
            self.status_message = Some("No job selected".to_string());
            return;
        };
        if job.status != JobStatus::Completed || job.results_count == 0 {
            self.status_message =
                Some("Results can be downloaded once the job completes".to_string());
            return;
        }
        let job_id = job.job_id.clone();
        let file_name = job.download_file_name();
        if let Some(ref poller) = self.poller {
            self.status_message = Some(format!("Downloading {}...", poller.api().download_url(&job_id)));
            poller.download(job_id, file_name);
        }
    }

    fn refresh_all(&mut self) {
        let Some(ref poller) = self.poller else {
            return;
        };
        poller.fetch_stats_now();
        if let Some(ticket) = self.domain.tracker.ticket() {
            poller.fetch_job_now(ticket);
        }
        self.status_message = Some("Refreshing...".to_string());
    }

    fn endpoint(&self) -> &str {
        self.poller
            .as_ref()
            .map(|p| p.api().endpoint())
            .unwrap_or(self.config.base_url.as_str())
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Component Implementation
// ═══════════════════════════════════════════════════════════════════════════════

impl Component for App {
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            return Ok(Some(Action::ForceQuit));
        }

        match self.mode {
            AppMode::Setup => self.setup.handle_key_event(key),
            AppMode::Running => {
                if let Some(modal) = self.modals.top().cloned() {
                    self.handle_modal_key_event(&modal, key)
                } else {
                    self.handle_dashboard_key_event(key)
                }
            }
        }
    }

    fn handle_mouse_event(&mut self, mouse: MouseEvent) -> Result<Option<Action>> {
        if self.mode != AppMode::Running || !self.modals.is_empty() {
            return Ok(None);
        }
        let action = match mouse.kind {
            MouseEventKind::ScrollDown => Some(Action::ScrollDown),
            MouseEventKind::ScrollUp => Some(Action::ScrollUp),
            _ => None,
        };
        Ok(action)
    }

    fn update(&mut self, action: Action) -> Result<Option<Action>> {
        if action != Action::Tick {
            tracing::debug!(action = %action, "update");
        }
        match action {
            // ─────────────────────────────────────────────────────────────────
            // App Lifecycle
            // ─────────────────────────────────────────────────────────────────
            Action::Tick => {
                self.process_events();
                self.sync_job_polling();
            }
            Action::ForceQuit => {
                self.should_quit = true;
            }
            Action::Resize(_, _) => {}

            // ─────────────────────────────────────────────────────────────────
            // Navigation
            // ─────────────────────────────────────────────────────────────────
            Action::ScrollUp | Action::ScrollDown => {
                self.results.update(action)?;
            }
            Action::PrevJob => self.switch_job(false),
            Action::NextJob => self.switch_job(true),

            // ─────────────────────────────────────────────────────────────────
            // Modals
            // ─────────────────────────────────────────────────────────────────
            Action::OpenQuitDialog => {
                self.confirm_dialog = ConfirmDialog::quit();
                self.modals.push(Modal::QuitConfirm);
            }
            Action::OpenScrapeForm => {
                if !self.scrape_form.is_submitting() {
                    self.scrape_form.reset();
                }
                self.modals.push(Modal::ScrapeForm);
            }
            Action::OpenInfoRequest => {
                if !self.info_dialog.is_submitting() {
                    self.info_dialog.reset();
                }
                self.modals.push(Modal::InfoRequest);
            }
            Action::OpenNotifications => {
                self.notifications_dialog.scroll_offset = 0;
                self.modals.push(Modal::Notifications { scroll_offset: 0 });
            }
            Action::OpenConnectionDetails => {
                self.modals.push(Modal::ConnectionDetails);
            }
            Action::OpenHelp => {
                self.help_dialog.scroll_offset = 0;
                self.modals.push(Modal::Help { scroll_offset: 0 });
            }
            Action::CloseModal => {
                self.modals.pop();
            }
            Action::ConfirmModal => {
                if let Some(modal) = self.modals.top().cloned() {
                    match modal {
                        Modal::QuitConfirm => {
                            self.should_quit = true;
                        }
                        Modal::CancelConfirm { job_id } => {
                            self.modals.pop();
                            if self.domain.current_job().map(|j| j.job_id.as_str())
                                == Some(job_id.as_str())
                            {
                                self.send_control(JobControl::Cancel);
                            }
                        }
                        Modal::ScrapeForm => {
                            if let Some((draft, request)) = self.scrape_form.submit() {
                                tracing::info!(state = %request.state, city = ?request.city, "starting scraping job");
                                match self.poller {
                                    Some(ref poller) => poller.start_scraping(draft, request),
                                    None => self
                                        .scrape_form
                                        .finish(Some("No backend configured".to_string())),
                                }
                            }
                        }
                        Modal::InfoRequest => {
                            if let Some(request) = self.info_dialog.submit() {
                                match self.poller {
                                    Some(ref poller) => poller.request_info(request),
                                    None => self
                                        .info_dialog
                                        .finish(Some("No backend configured".to_string())),
                                }
                            }
                        }
                        _ => {}
                    }
                }
            }

            // ─────────────────────────────────────────────────────────────────
            // Job Control
            // ─────────────────────────────────────────────────────────────────
            Action::PauseJob => self.send_control(JobControl::Pause),
            Action::ResumeJob => self.send_control(JobControl::Resume),
            Action::CancelJob => match self.domain.current_job() {
                Some(job) if job.status.can_cancel() => {
                    let job_id = job.job_id.clone();
                    self.confirm_dialog = ConfirmDialog::cancel_job(&job_id);
                    self.modals.push(Modal::CancelConfirm { job_id });
                }
                _ => self.send_control(JobControl::Cancel),
            },
            Action::DownloadResults => self.download_results(),

            // ─────────────────────────────────────────────────────────────────
            // Data
            // ─────────────────────────────────────────────────────────────────
            Action::RefreshAll => self.refresh_all(),
            Action::ClearNotifications => {
                self.domain.notifications.clear();
                self.notifications_dialog.set_entries(&[]);
            }

            // ─────────────────────────────────────────────────────────────────
            // Setup
            // ─────────────────────────────────────────────────────────────────
            Action::SetupConfirm => {
                // Setup complete, connect with the saved config and switch to Running mode
                if let Some(config) = self.setup.get_config().cloned() {
                    self.connect(config);
                    self.mode = AppMode::Running;
                }
            }
        }

        Ok(None)
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect) -> Result<()> {
        match self.mode {
            AppMode::Setup => self.setup.draw(frame, area)?,
            AppMode::Running => {
                let ctx = DashboardContext {
                    domain: &self.domain,
                    error: self.error.as_deref(),
                    status_message: self.status_message.as_deref(),
                };
                draw_dashboard(frame, area, &mut self.results, &ctx)?;

                // Draw modal overlay if active
                if let Some(modal) = self.modals.top().cloned() {
                    self.draw_modal(frame, area, &modal)?;
                }
            }
        }
        Ok(())
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Helper Methods
// ═══════════════════════════════════════════════════════════════════════════════

impl App {
    fn handle_dashboard_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        let action = match key.code {
            KeyCode::Char('q') | KeyCode::Esc => Some(Action::OpenQuitDialog),
            KeyCode::Char('s') => Some(Action::OpenScrapeForm),
            KeyCode::Char('p') => Some(Action::PauseJob),
            KeyCode::Char('u') => Some(Action::ResumeJob),
            KeyCode::Char('x') => Some(Action::CancelJob),
            KeyCode::Char('d') => Some(Action::DownloadResults),
            KeyCode::Char('n') => Some(Action::OpenNotifications),
            KeyCode::Char('c') => Some(Action::OpenConnectionDetails),
            KeyCode::Char('i') => Some(Action::OpenInfoRequest),
            KeyCode::Char('r') => Some(Action::RefreshAll),
            KeyCode::Char('[') => Some(Action::PrevJob),
            KeyCode::Char(']') => Some(Action::NextJob),
            KeyCode::Char('?') => Some(Action::OpenHelp),
            _ => return self.results.handle_key_event(key),
        };
        Ok(action)
    }

    fn handle_modal_key_event(&mut self, modal: &Modal, key: KeyEvent) -> Result<Option<Action>> {
        match modal {
            Modal::QuitConfirm | Modal::CancelConfirm { .. } => {
                self.confirm_dialog.handle_key_event(key)
            }
            Modal::ScrapeForm => self.scrape_form.handle_key_event(key),
            Modal::InfoRequest => self.info_dialog.handle_key_event(key),
            Modal::Notifications { .. } => {
                let action = self.notifications_dialog.handle_key_event(key)?;
                if let Some(Modal::Notifications { scroll_offset }) = self.modals.top_mut() {
                    *scroll_offset = self.notifications_dialog.scroll_offset;
                }
                Ok(action)
            }
            Modal::ConnectionDetails => self.connection_dialog.handle_key_event(key),
            Modal::Help { .. } => self.help_dialog.handle_key_event(key),
        }
    }

    fn draw_modal(&mut self, frame: &mut Frame, area: Rect, modal: &Modal) -> Result<()> {
        match modal {
            Modal::QuitConfirm | Modal::CancelConfirm { .. } => {
                self.confirm_dialog.draw(frame, area)?;
            }
            Modal::ScrapeForm => self.scrape_form.draw(frame, area)?,
            Modal::InfoRequest => self.info_dialog.draw(frame, area)?,
            Modal::Notifications { .. } => {
                self.notifications_dialog
                    .set_entries(self.domain.notifications.entries());
                self.notifications_dialog.draw(frame, area)?;
            }
            Modal::ConnectionDetails => {
                let endpoint = self.endpoint().to_string();
                self.connection_dialog
                    .set_monitor(&self.domain.connection, &endpoint);
                self.connection_dialog.draw(frame, area)?;
            }
            Modal::Help { .. } => {
                self.help_dialog.draw(frame, area)?;
            }
        }
        Ok(())
    }
}
