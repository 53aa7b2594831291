//! Action enum - All possible application actions
//!
//! Actions are discrete operations that the application can perform.
//! Components emit Actions in response to events, and the App processes
//! them to update state.

use std::fmt;

/// All possible actions in the application
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    // ─────────────────────────────────────────────────────────────────────────
    // App Lifecycle
    // ─────────────────────────────────────────────────────────────────────────
    /// Regular tick: drain background results, re-evaluate polling
    Tick,
    /// Terminal was resized
    Resize(u16, u16),
    /// Force quit without confirmation
    ForceQuit,

    // ─────────────────────────────────────────────────────────────────────────
    // Navigation
    // ─────────────────────────────────────────────────────────────────────────
    /// Scroll the results preview up one row
    ScrollUp,
    /// Scroll the results preview down one row
    ScrollDown,
    /// Select the previously started job
    PrevJob,
    /// Select the next started job
    NextJob,

    // ─────────────────────────────────────────────────────────────────────────
    // Modals
    // ─────────────────────────────────────────────────────────────────────────
    /// Open quit confirmation dialog
    OpenQuitDialog,
    /// Open the start-scraping form
    OpenScrapeForm,
    /// Open the information request form
    OpenInfoRequest,
    /// Open the notification log
    OpenNotifications,
    /// Open per-endpoint connection details
    OpenConnectionDetails,
    /// Open help dialog showing all keyboard shortcuts
    OpenHelp,
    /// Close the current modal
    CloseModal,
    /// Confirm the current modal action
    ConfirmModal,

    // ─────────────────────────────────────────────────────────────────────────
    // Job Control
    // ─────────────────────────────────────────────────────────────────────────
    /// Pause the selected job
    PauseJob,
    /// Resume the selected job
    ResumeJob,
    /// Ask for confirmation, then cancel the selected job
    CancelJob,
    /// Save the selected job's CSV to the download directory
    DownloadResults,

    // ─────────────────────────────────────────────────────────────────────────
    // Data
    // ─────────────────────────────────────────────────────────────────────────
    /// Refetch every query now
    RefreshAll,
    /// Empty the notification log
    ClearNotifications,

    // ─────────────────────────────────────────────────────────────────────────
    // Setup Wizard
    // ─────────────────────────────────────────────────────────────────────────
    /// Confirm setup configuration
    SetupConfirm,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Tick => write!(f, "Tick"),
            Action::Resize(w, h) => write!(f, "Resize({}, {})", w, h),
            Action::ForceQuit => write!(f, "ForceQuit"),
            Action::ScrollUp => write!(f, "ScrollUp"),
            Action::ScrollDown => write!(f, "ScrollDown"),
            Action::PrevJob => write!(f, "PrevJob"),
            Action::NextJob => write!(f, "NextJob"),
            Action::OpenQuitDialog => write!(f, "OpenQuitDialog"),
            Action::OpenScrapeForm => write!(f, "OpenScrapeForm"),
            Action::OpenInfoRequest => write!(f, "OpenInfoRequest"),
            Action::OpenNotifications => write!(f, "OpenNotifications"),
            Action::OpenConnectionDetails => write!(f, "OpenConnectionDetails"),
            Action::OpenHelp => write!(f, "OpenHelp"),
            Action::CloseModal => write!(f, "CloseModal"),
            Action::ConfirmModal => write!(f, "ConfirmModal"),
            Action::PauseJob => write!(f, "PauseJob"),
            Action::ResumeJob => write!(f, "ResumeJob"),
            Action::CancelJob => write!(f, "CancelJob"),
            Action::DownloadResults => write!(f, "DownloadResults"),
            Action::RefreshAll => write!(f, "RefreshAll"),
            Action::ClearNotifications => write!(f, "ClearNotifications"),
            Action::SetupConfirm => write!(f, "SetupConfirm"),
        }
    }
}
