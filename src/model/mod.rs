//! Model layer - centralized state management
//!
//! This module contains all state-related types:
//! - `DomainState` - Business/data state (jobs, statistics, notifications, connection)
//! - `ModalStack` - Modal overlay management
//! - wire types exchanged with the backend and the form drafts that produce them

pub mod connection;
pub mod domain;
pub mod form;
pub mod job;
pub mod modal;
pub mod notification;
pub mod response;
pub mod stats;
pub mod status;
pub mod tracker;
pub mod ui;

// Re-export commonly used types
pub use connection::{ConnectionState, QueryKind};
pub use domain::{DomainState, FollowUp, StartDraft};
pub use job::{ExportFormat, JobControl, JobProjection, PostcodeEntry, ScrapeConfig};
pub use notification::{Notification, Severity};
pub use status::JobStatus;
pub use tracker::PollTicket;
