//! Error types for A2P onboarding.

use std::time::Duration;

use crate::a2p::state::Stage;

/// Top-level error type for the crate.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    #[error("Onboarding error: {0}")]
    Onboarding(#[from] OnboardingError),

    #[error("Monitor error: {0}")]
    Monitor(#[from] MonitorError),
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// Failures reported by a registration provider call.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("Request to {endpoint} failed: {reason}")]
    Transport { endpoint: String, reason: String },

    #[error("Provider returned HTTP {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Invalid response from {endpoint}: {reason}")]
    InvalidResponse { endpoint: String, reason: String },

    #[error("No phone number found for {phone_number}")]
    PhoneNumberNotFound { phone_number: String },
}

/// A prerequisite that must exist before onboarding can touch the provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Prerequisite {
    Subaccount,
    PurchasedPhoneNumber,
    PurchasedPhoneNumberSid,
    SubaccountUsername,
    SubaccountPassword,
    MessagingService,
}

impl std::fmt::Display for Prerequisite {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Subaccount => "create a subaccount first before proceeding",
            Self::PurchasedPhoneNumber => "purchase a phone number first before proceeding",
            Self::PurchasedPhoneNumberSid => {
                "get the purchased phone number SID first before proceeding"
            }
            Self::SubaccountUsername => "get the subaccount username first before proceeding",
            Self::SubaccountPassword => "get the subaccount password first before proceeding",
            Self::MessagingService => "create a messaging service first before proceeding",
        };
        write!(f, "{s}")
    }
}

/// Errors from the Apply / Complete pipelines.
#[derive(Debug, thiserror::Error)]
pub enum OnboardingError {
    #[error("Precondition failed: {0}")]
    Precondition(Prerequisite),

    #[error("stage {} ({}) failed: {source}", .stage.number(), .stage)]
    Stage {
        stage: Stage,
        #[source]
        source: ProviderError,
    },

    #[error("No phone number found for {phone_number}")]
    PhoneNumberNotFound { phone_number: String },

    #[error("stage {} ({}) tried to overwrite a recorded SID", .stage.number(), .stage)]
    SidAlreadyRecorded { stage: Stage },

    #[error("Validation failed: {}", .fields.join("; "))]
    Validation { fields: Vec<String> },
}

impl OnboardingError {
    /// The stage this error is attributed to, if any.
    pub fn stage(&self) -> Option<Stage> {
        match self {
            Self::Stage { stage, .. } | Self::SidAlreadyRecorded { stage } => Some(*stage),
            Self::PhoneNumberNotFound { .. } => Some(Stage::LookupPhoneNumber),
            Self::Precondition(_) | Self::Validation { .. } => None,
        }
    }
}

/// Terminal failures of the registration status monitor.
#[derive(Debug, thiserror::Error)]
pub enum MonitorError {
    #[error("checking brand registration timed out after {after:?}")]
    TimedOut { after: Duration },

    #[error("brand registration monitor was cancelled")]
    Cancelled,

    #[error("completing onboarding failed: {0}")]
    Completion(#[from] OnboardingError),
}

/// A non-fatal failure observed during one monitor tick.
#[derive(Debug, thiserror::Error)]
pub enum TickError {
    #[error("status fetch failed: {0}")]
    Fetch(#[from] ProviderError),

    #[error("status fetch timed out after {0:?}")]
    FetchTimedOut(Duration),

    #[error("unknown status: {0}")]
    UnknownStatus(String),
}

/// Result type alias for the crate.
pub type Result<T> = std::result::Result<T, Error>;
