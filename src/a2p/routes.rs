//! REST endpoints for A2P onboarding.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use tracing::{error, info};

use super::model::OnboardingRequest;
use super::monitor::RegistrationMonitor;
use super::orchestrator::Onboarding;
use crate::config::{A2pConfig, MonitorConfig, TwilioEndpoints};
use crate::error::{OnboardingError, Prerequisite, ProviderError};
use crate::provider::{RegistrationProvider, TwilioProvider};

/// Builds a provider bound to the request's sub-account.
pub type ProviderFactory = Arc<
    dyn Fn(&OnboardingRequest) -> Result<Arc<dyn RegistrationProvider>, ProviderError>
        + Send
        + Sync,
>;

/// Factory for the Twilio REST provider.
pub fn twilio_factory(endpoints: TwilioEndpoints) -> ProviderFactory {
    Arc::new(move |request: &OnboardingRequest| {
        let credentials = request
            .credentials()
            .ok_or_else(|| ProviderError::Transport {
                endpoint: endpoints.api.clone(),
                reason: "sub-account credentials missing".into(),
            })?;
        let provider: Arc<dyn RegistrationProvider> =
            Arc::new(TwilioProvider::new(endpoints.clone(), credentials)?);
        Ok::<_, ProviderError>(provider)
    })
}

/// Shared state for A2P routes.
#[derive(Clone)]
pub struct A2pRouteState {
    pub config: A2pConfig,
    pub monitor: MonitorConfig,
    pub providers: ProviderFactory,
}

#[derive(Debug, Deserialize)]
struct CompleteBody {
    request: OnboardingRequest,
    brand_registration_sid: String,
}

/// POST /api/a2p/onboard
///
/// Validates the request, runs Apply, and leaves a monitor running in the
/// background that completes onboarding once the brand is approved.
async fn onboard(
    State(state): State<A2pRouteState>,
    Json(request): Json<OnboardingRequest>,
) -> Response {
    if let Err(e) = request.validate() {
        return error_response(&e);
    }
    if let Some(missing) = request.missing_prerequisite() {
        return error_response(&OnboardingError::Precondition(missing));
    }

    let provider = match (state.providers)(&request) {
        Ok(p) => p,
        Err(e) => return provider_unavailable(&e),
    };
    let onboarding = Arc::new(Onboarding::new(Arc::clone(&provider), state.config.clone()));

    let result = match onboarding.apply(&request).await {
        Ok(result) => result,
        Err(e) => return error_response(&e),
    };

    if let (Some(brand_sid), Some(service_sid)) = (
        result.sids.brand_registration_sid.clone(),
        result.sids.messaging_service_sid.clone(),
    ) {
        let monitor = RegistrationMonitor::new(provider, onboarding, state.monitor.clone());
        let request = request.with_messaging_service_sid(service_sid);
        tokio::spawn(async move {
            match monitor.run(&brand_sid, &request).await {
                Ok(done) => info!(
                    brand_registration_sid = %brand_sid,
                    campaign_sid = done.sids.a2p_message_campaign_sid.as_deref().unwrap_or_default(),
                    "Onboarding completed"
                ),
                Err(e) => error!(
                    brand_registration_sid = %brand_sid,
                    error = %e,
                    "Brand registration monitor ended without completing onboarding"
                ),
            }
        });
    }

    Json(result).into_response()
}

/// POST /api/a2p/complete
///
/// Runs Complete directly for an already approved brand registration.
async fn complete(State(state): State<A2pRouteState>, Json(body): Json<CompleteBody>) -> Response {
    if let Some(missing) = body.request.missing_prerequisite() {
        return error_response(&OnboardingError::Precondition(missing));
    }

    let provider = match (state.providers)(&body.request) {
        Ok(p) => p,
        Err(e) => return provider_unavailable(&e),
    };
    let onboarding = Onboarding::new(provider, state.config.clone());
    match onboarding
        .complete(&body.request, &body.brand_registration_sid)
        .await
    {
        Ok(result) => Json(result).into_response(),
        Err(e) => error_response(&e),
    }
}

/// GET /api/a2p/health
async fn health() -> impl IntoResponse {
    Json(serde_json::json!({"status": "ok"}))
}

fn error_response(e: &OnboardingError) -> Response {
    let status = match e {
        OnboardingError::Validation { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        OnboardingError::Precondition(_) => StatusCode::PRECONDITION_FAILED,
        OnboardingError::PhoneNumberNotFound { .. } => StatusCode::NOT_FOUND,
        OnboardingError::Stage { .. } | OnboardingError::SidAlreadyRecorded { .. } => {
            StatusCode::BAD_GATEWAY
        }
    };
    let mut body = serde_json::json!({ "error": e.to_string() });
    if let Some(stage) = e.stage() {
        body["stage"] = serde_json::json!(stage);
        body["stage_number"] = serde_json::json!(stage.number());
    }
    if let OnboardingError::Precondition(missing) = e {
        body["missing"] = serde_json::json!(prerequisite_key(*missing));
    }
    (status, Json(body)).into_response()
}

fn provider_unavailable(e: &ProviderError) -> Response {
    (
        StatusCode::BAD_GATEWAY,
        Json(serde_json::json!({ "error": e.to_string() })),
    )
        .into_response()
}

fn prerequisite_key(missing: Prerequisite) -> &'static str {
    match missing {
        Prerequisite::Subaccount => "subaccount_id",
        Prerequisite::PurchasedPhoneNumber => "purchased_phone_number",
        Prerequisite::PurchasedPhoneNumberSid => "purchased_phone_number_sid",
        Prerequisite::SubaccountUsername => "subaccount_username",
        Prerequisite::SubaccountPassword => "subaccount_password",
        Prerequisite::MessagingService => "messaging_service_sid",
    }
}

/// Build the A2P REST routes.
pub fn a2p_routes(state: A2pRouteState) -> Router {
    Router::new()
        .route("/api/a2p/onboard", post(onboard))
        .route("/api/a2p/complete", post(complete))
        .route("/api/a2p/health", get(health))
        .with_state(state)
}
