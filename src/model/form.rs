//! Form drafts and their validation rules

use super::job::ScrapeConfig;
use super::response::{InfoRequest, ScrapeRequest};
use regex::Regex;
use std::sync::LazyLock;

/// States offered by the scraping form
pub const STATES: [&str; 50] = [
    "Alabama", "Alaska", "Arizona", "Arkansas", "California", "Colorado", "Connecticut",
    "Delaware", "Florida", "Georgia", "Hawaii", "Idaho", "Illinois", "Indiana", "Iowa",
    "Kansas", "Kentucky", "Louisiana", "Maine", "Maryland", "Massachusetts", "Michigan",
    "Minnesota", "Mississippi", "Missouri", "Montana", "Nebraska", "Nevada", "New Hampshire",
    "New Jersey", "New Mexico", "New York", "North Carolina", "North Dakota", "Ohio", "Oklahoma",
    "Oregon", "Pennsylvania", "Rhode Island", "South Carolina", "South Dakota", "Tennessee",
    "Texas", "Utah", "Vermont", "Virginia", "Washington", "West Virginia", "Wisconsin", "Wyoming",
];

static COUNTRY_CODE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z]{2}$").unwrap());

static EMAIL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap()
});

/// States whose name contains `query`, ignoring case
pub fn filter_states(query: &str) -> Vec<&'static str> {
    let needle = query.trim().to_lowercase();
    STATES
        .iter()
        .copied()
        .filter(|s| s.to_lowercase().contains(&needle))
        .collect()
}

/// Resolve user input to the canonical state name
pub fn canonical_state(input: &str) -> Option<&'static str> {
    let input = input.trim();
    STATES.iter().copied().find(|s| s.eq_ignore_ascii_case(input))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    State,
    City,
    CountryCode,
    BatchSize,
    Delay,
    MaxRetries,
}

impl FormField {
    pub fn label(&self) -> &'static str {
        match self {
            FormField::State => "State",
            FormField::City => "City",
            FormField::CountryCode => "Country code",
            FormField::BatchSize => "Batch size",
            FormField::Delay => "Delay (ms)",
            FormField::MaxRetries => "Max retries",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: FormField,
    pub message: String,
}

impl FieldError {
    fn new(field: FormField, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// Draft of a scraping job
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScrapeForm {
    pub state: String,
    pub city: String,
    pub config: ScrapeConfig,
}

impl ScrapeForm {
    pub fn validate(&self) -> Vec<FieldError> {
        let mut errors = Vec::new();

        if self.state.trim().is_empty() {
            errors.push(FieldError::new(FormField::State, "State is required"));
        } else if canonical_state(&self.state).is_none() {
            errors.push(FieldError::new(FormField::State, "Unknown state"));
        }

        if !COUNTRY_CODE_REGEX.is_match(&self.config.country_code) {
            errors.push(FieldError::new(
                FormField::CountryCode,
                "Country code must be two upper-case letters",
            ));
        }
        if !(1..=1000).contains(&self.config.batch_size) {
            errors.push(FieldError::new(
                FormField::BatchSize,
                "Batch size must be between 1 and 1000",
            ));
        }
        if !(100..=10000).contains(&self.config.delay_ms) {
            errors.push(FieldError::new(
                FormField::Delay,
                "Delay must be between 100 and 10000 ms",
            ));
        }
        if self.config.max_retries > 10 {
            errors.push(FieldError::new(
                FormField::MaxRetries,
                "Max retries must be between 0 and 10",
            ));
        }

        errors
    }

    pub fn is_valid(&self) -> bool {
        self.validate().is_empty()
    }

    /// Request body, or the validation errors blocking submission
    pub fn to_request(&self) -> Result<ScrapeRequest, Vec<FieldError>> {
        let errors = self.validate();
        if !errors.is_empty() {
            return Err(errors);
        }
        let state = canonical_state(&self.state).unwrap_or_default();
        Ok(ScrapeRequest::new(state, Some(&self.city)))
    }
}

/// Draft of the contact form
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InfoRequestForm {
    pub name: String,
    pub email: String,
    pub message: String,
}

impl InfoRequestForm {
    pub fn validate(&self) -> Option<String> {
        if self.message.trim().is_empty() {
            return Some("Message is required".to_string());
        }
        let email = self.email.trim();
        if !email.is_empty() && !EMAIL_REGEX.is_match(email) {
            return Some("Email address looks invalid".to_string());
        }
        None
    }

    pub fn to_request(&self) -> Result<InfoRequest, String> {
        if let Some(err) = self.validate() {
            return Err(err);
        }
        Ok(InfoRequest {
            name: self.name.trim().to_string(),
            email: self.email.trim().to_string(),
            message: self.message.trim().to_string(),
        })
    }
}
