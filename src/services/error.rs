use thiserror::Error;

/// Errors raised while talking to the scraping backend
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },
    #[error("Deserialization error: {0}")]
    Deserialize(String),
    /// The backend answered 2xx but refused the request
    #[error("Request rejected: {0}")]
    Rejected(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl ClientError {
    /// Message suitable for a notification, without the variant prefix
    pub fn user_message(&self) -> String {
        match self {
            ClientError::Api { status, message } if message.is_empty() => {
                format!("server returned HTTP {}", status)
            }
            ClientError::Api { message, .. } => message.clone(),
            ClientError::Rejected(message) => message.clone(),
            ClientError::Http(e) if e.is_timeout() => "request timed out".to_string(),
            ClientError::Http(e) if e.is_connect() => "could not reach the server".to_string(),
            other => other.to_string(),
        }
    }
}
