//! UI Components
//!
//! Each component encapsulates its own state, event handling, and rendering logic.
//! Components communicate through Actions rather than direct state mutation.

pub mod confirm_dialog;
pub mod connection_status;
pub mod contact_section;
pub mod dashboard;
pub mod database_stats_card;
pub mod header;
pub mod help_dialog;
pub mod info_request_dialog;
pub mod job_status_card;
pub mod layout;
pub mod notifications_dialog;
pub mod results_table;
pub mod scraping_form;
pub mod setup;
pub mod status_badge;

pub use confirm_dialog::ConfirmDialog;
pub use connection_status::ConnectionDetailsDialog;
pub use dashboard::{draw_dashboard, DashboardContext};
pub use help_dialog::HelpDialog;
pub use info_request_dialog::InfoRequestDialog;
pub use layout::{calculate_dashboard_layout, centered_popup};
pub use notifications_dialog::NotificationsDialog;
pub use results_table::ResultsPreviewTable;
pub use scraping_form::ScrapeFormDialog;
pub use setup::SetupComponent;
