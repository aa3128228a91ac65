//! Brand registration monitor — polls status until approval or deadline.
//!
//! State machine:
//!
//! ```text
//! Polling ──APPROVED──▶ Done (runs Complete exactly once)
//!    │ ▲
//!    │ └── PENDING / IN_REVIEW / FAILED / DELETED, unknown status, fetch error
//!    │
//!    ├──deadline──▶ TimedOut
//!    └──shutdown──▶ Cancelled
//! ```
//!
//! The first fetch happens at start, then one per tick interval. A fetch
//! races both its own timeout and the deadline, so a slow provider can never
//! hold the monitor past the deadline. When a tick and the deadline are due
//! together the deadline wins.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, watch};
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{info, warn};

use super::model::{OnboardingRequest, OnboardingResult};
use super::orchestrator::Onboarding;
use crate::config::MonitorConfig;
use crate::error::{MonitorError, TickError};
use crate::provider::RegistrationProvider;

/// Brand registration status as reported by the provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RegistrationStatus {
    Approved,
    Failed,
    InReview,
    Pending,
    Deleted,
    Unrecognized(String),
}

impl RegistrationStatus {
    pub fn parse(raw: &str) -> Self {
        match raw {
            "APPROVED" => Self::Approved,
            "FAILED" => Self::Failed,
            "IN_REVIEW" => Self::InReview,
            "PENDING" => Self::Pending,
            "DELETED" => Self::Deleted,
            other => Self::Unrecognized(other.to_string()),
        }
    }

    /// Only approval ends polling; every other known status is revisited.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Approved)
    }
}

impl std::fmt::Display for RegistrationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Approved => write!(f, "APPROVED"),
            Self::Failed => write!(f, "FAILED"),
            Self::InReview => write!(f, "IN_REVIEW"),
            Self::Pending => write!(f, "PENDING"),
            Self::Deleted => write!(f, "DELETED"),
            Self::Unrecognized(raw) => write!(f, "{raw}"),
        }
    }
}

/// What one tick observed.
#[derive(Debug)]
pub enum TickOutcome {
    /// A known, non-terminal status. Polling continues.
    Waiting {
        status: RegistrationStatus,
        message: String,
    },
    /// Fetch failure or unrecognized status. Recorded, polling continues.
    Tolerated(TickError),
    /// Approval observed; Complete is about to run.
    Approved,
}

/// Sent to the observer after every tick.
#[derive(Debug)]
pub struct TickReport {
    /// 1-based tick count.
    pub tick: u32,
    pub outcome: TickOutcome,
}

/// Polls one brand registration and completes onboarding on approval.
pub struct RegistrationMonitor {
    provider: Arc<dyn RegistrationProvider>,
    onboarding: Arc<Onboarding>,
    config: MonitorConfig,
    observer: Option<mpsc::Sender<TickReport>>,
    shutdown: Option<watch::Receiver<bool>>,
}

impl RegistrationMonitor {
    pub fn new(
        provider: Arc<dyn RegistrationProvider>,
        onboarding: Arc<Onboarding>,
        config: MonitorConfig,
    ) -> Self {
        Self {
            provider,
            onboarding,
            config,
            observer: None,
            shutdown: None,
        }
    }

    /// Receive a [`TickReport`] after every tick. Reports are dropped if the
    /// channel is full.
    pub fn with_observer(mut self, observer: mpsc::Sender<TickReport>) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Stop with [`MonitorError::Cancelled`] once `true` is sent.
    pub fn with_shutdown(mut self, shutdown: watch::Receiver<bool>) -> Self {
        self.shutdown = Some(shutdown);
        self
    }

    /// Poll until approved (then run Complete), cancelled, or timed out.
    pub async fn run(
        mut self,
        brand_registration_sid: &str,
        request: &OnboardingRequest,
    ) -> Result<OnboardingResult, MonitorError> {
        let started = Instant::now();
        let deadline = tokio::time::sleep(self.config.deadline);
        tokio::pin!(deadline);

        let mut ticker = tokio::time::interval(self.config.tick_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut shutdown = self.shutdown.take();
        let mut tick: u32 = 0;

        info!(
            brand_registration_sid,
            interval = ?self.config.tick_interval,
            deadline = ?self.config.deadline,
            "Brand registration monitor started"
        );

        loop {
            tokio::select! {
                biased;
                _ = &mut deadline => {
                    return Err(self.timed_out(brand_registration_sid, started));
                }
                _ = cancelled(&mut shutdown) => {
                    info!(brand_registration_sid, "Brand registration monitor cancelled");
                    return Err(MonitorError::Cancelled);
                }
                _ = ticker.tick() => {}
            }

            tick += 1;
            let fetched = tokio::select! {
                biased;
                _ = &mut deadline => {
                    return Err(self.timed_out(brand_registration_sid, started));
                }
                fetched = tokio::time::timeout(
                    self.config.fetch_timeout,
                    self.provider.fetch_registration_status(brand_registration_sid),
                ) => fetched,
            };

            let outcome = match fetched {
                Err(_) => TickOutcome::Tolerated(TickError::FetchTimedOut(self.config.fetch_timeout)),
                Ok(Err(e)) => TickOutcome::Tolerated(TickError::Fetch(e)),
                Ok(Ok(raw)) => classify(&raw),
            };

            match &outcome {
                TickOutcome::Approved => {
                    info!(brand_registration_sid, tick, "Brand registration approved");
                }
                TickOutcome::Waiting { status, .. } => {
                    info!(brand_registration_sid, tick, status = %status, "Brand registration not yet approved");
                }
                TickOutcome::Tolerated(error) => {
                    warn!(brand_registration_sid, tick, error = %error, "Brand registration check failed");
                }
            }

            let approved = matches!(outcome, TickOutcome::Approved);
            self.report(tick, outcome);
            if approved {
                let result = self
                    .onboarding
                    .complete(request, brand_registration_sid)
                    .await?;
                return Ok(result);
            }
        }
    }

    fn report(&self, tick: u32, outcome: TickOutcome) {
        if let Some(observer) = &self.observer {
            let _ = observer.try_send(TickReport { tick, outcome });
        }
    }

    fn timed_out(&self, brand_registration_sid: &str, started: Instant) -> MonitorError {
        warn!(
            brand_registration_sid,
            elapsed = ?started.elapsed(),
            "Brand registration checking timed out"
        );
        MonitorError::TimedOut {
            after: self.config.deadline,
        }
    }
}

/// Dispatch a fetched status string.
fn classify(raw: &str) -> TickOutcome {
    match RegistrationStatus::parse(raw) {
        status if status.is_terminal() => TickOutcome::Approved,
        RegistrationStatus::Unrecognized(raw) => {
            TickOutcome::Tolerated(TickError::UnknownStatus(raw))
        }
        status => TickOutcome::Waiting {
            message: format!("Brand registration is {status}"),
            status,
        },
    }
}

/// Resolves when shutdown is signalled; never resolves without a receiver
/// or after the sender is gone.
async fn cancelled(shutdown: &mut Option<watch::Receiver<bool>>) {
    match shutdown {
        Some(rx) => {
            let stopped = rx.wait_for(|stop| *stop).await.is_ok();
            if !stopped {
                std::future::pending::<()>().await;
            }
        }
        None => std::future::pending::<()>().await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_closed_status_set() {
        assert_eq!(RegistrationStatus::parse("APPROVED"), RegistrationStatus::Approved);
        assert_eq!(RegistrationStatus::parse("FAILED"), RegistrationStatus::Failed);
        assert_eq!(RegistrationStatus::parse("IN_REVIEW"), RegistrationStatus::InReview);
        assert_eq!(RegistrationStatus::parse("PENDING"), RegistrationStatus::Pending);
        assert_eq!(RegistrationStatus::parse("DELETED"), RegistrationStatus::Deleted);
        assert_eq!(
            RegistrationStatus::parse("approved"),
            RegistrationStatus::Unrecognized("approved".into())
        );
    }

    #[test]
    fn only_approval_is_terminal() {
        assert!(RegistrationStatus::Approved.is_terminal());
        for raw in ["FAILED", "IN_REVIEW", "PENDING", "DELETED", "SUSPENDED"] {
            assert!(!RegistrationStatus::parse(raw).is_terminal(), "{raw}");
        }
    }

    #[test]
    fn display_round_trips() {
        for raw in ["APPROVED", "FAILED", "IN_REVIEW", "PENDING", "DELETED", "WHATEVER"] {
            assert_eq!(RegistrationStatus::parse(raw).to_string(), raw);
        }
    }

    #[test]
    fn classify_rejection_keeps_waiting() {
        match classify("FAILED") {
            TickOutcome::Waiting { status, message } => {
                assert_eq!(status, RegistrationStatus::Failed);
                assert_eq!(message, "Brand registration is FAILED");
            }
            other => panic!("expected Waiting, got {other:?}"),
        }
    }

    #[test]
    fn classify_unknown_is_tolerated_error() {
        match classify("SUSPENDED") {
            TickOutcome::Tolerated(TickError::UnknownStatus(raw)) => assert_eq!(raw, "SUSPENDED"),
            other => panic!("expected unknown status, got {other:?}"),
        }
    }
}
