//! External service interactions
//!
//! This module contains services for interacting with the scraping backend:
//! - REST client and its error type
//! - Background request scheduling (interval polls and one-shot requests)
//! - Saving downloaded result files

pub mod api;
pub mod download;
pub mod error;
pub mod poller;

pub use api::ApiClient;
pub use download::DownloadSummary;
pub use error::ClientError;
pub use poller::{ApiEvent, Poller};
