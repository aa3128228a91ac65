//! REST contract of the A2P routes, served on a random port with a stub
//! provider behind the factory.

mod common;

use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tokio::net::TcpListener;

use a2p_onboard::a2p::{A2pRouteState, OnboardingRequest, ProviderFactory, a2p_routes};
use a2p_onboard::config::{A2pConfig, MonitorConfig};
use a2p_onboard::error::ProviderError;
use a2p_onboard::provider::RegistrationProvider;

use common::{FetchReply, StubProvider, request_json};

/// Maximum time any background assertion waits.
const TEST_TIMEOUT: Duration = Duration::from_secs(5);

async fn start_server(stub: &Arc<StubProvider>, monitor: MonitorConfig) -> String {
    let provider: Arc<dyn RegistrationProvider> = stub.clone();
    let providers: ProviderFactory =
        Arc::new(move |_: &OnboardingRequest| Ok::<_, ProviderError>(Arc::clone(&provider)));
    let app = a2p_routes(A2pRouteState {
        config: A2pConfig::default(),
        monitor,
        providers,
    });

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("http://127.0.0.1:{port}/api/a2p")
}

async fn post(url: String, body: &Value) -> (u16, Value) {
    let resp = reqwest::Client::new()
        .post(url)
        .json(body)
        .send()
        .await
        .unwrap();
    let status = resp.status().as_u16();
    (status, resp.json().await.unwrap())
}

#[tokio::test]
async fn health_reports_ok() {
    let stub = Arc::new(StubProvider::new());
    let base = start_server(&stub, MonitorConfig::default()).await;

    let body: Value = reqwest::get(format!("{base}/health"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn invalid_request_is_rejected_before_any_call() {
    let stub = Arc::new(StubProvider::new());
    let base = start_server(&stub, MonitorConfig::default()).await;

    let mut body = request_json();
    body["customer_email"] = Value::from("");
    body["representative"]["phone"] = Value::from("555-0100");

    let (status, resp) = post(format!("{base}/onboard"), &body).await;
    assert_eq!(status, 422);
    let error = resp["error"].as_str().unwrap();
    assert!(error.contains("customer_email is required"), "{error}");
    assert!(error.contains("representative.phone must be in E.164 format"), "{error}");
    assert!(stub.calls().is_empty());
}

#[tokio::test]
async fn missing_subaccount_is_a_failed_precondition() {
    let stub = Arc::new(StubProvider::new());
    let base = start_server(&stub, MonitorConfig::default()).await;

    let mut body = request_json();
    body.as_object_mut().unwrap().remove("subaccount_id");

    let (status, resp) = post(format!("{base}/onboard"), &body).await;
    assert_eq!(status, 412);
    assert_eq!(resp["missing"], "subaccount_id");
    assert!(stub.calls().is_empty());
}

#[tokio::test]
async fn stage_failure_names_the_stage() {
    let stub = Arc::new(StubProvider::new().failing_on_call(6));
    let base = start_server(&stub, MonitorConfig::default()).await;

    let (status, resp) = post(format!("{base}/onboard"), &request_json()).await;
    assert_eq!(status, 502);
    assert_eq!(resp["stage"], "create_address");
    assert_eq!(resp["stage_number"], 6);
    assert_eq!(stub.count("create_supporting_document"), 0);
}

#[tokio::test]
async fn onboard_applies_then_completes_in_background() {
    let stub = Arc::new(StubProvider::new().with_statuses(|n| match n {
        0 => FetchReply::Status("PENDING"),
        _ => FetchReply::Status("APPROVED"),
    }));
    let monitor = MonitorConfig::new(
        Duration::from_millis(50),
        Duration::from_secs(5),
        Duration::from_millis(20),
    )
    .unwrap();
    let base = start_server(&stub, monitor).await;

    let (status, resp) = post(format!("{base}/onboard"), &request_json()).await;
    assert_eq!(status, 200);
    assert_eq!(resp["message"], "Brand Registration Created Successfully");
    assert_eq!(resp["applied_for_brand_registration"], true);
    assert!(resp["sids"]["brand_registration_sid"].is_string());
    assert!(resp.get("subaccount_password").is_none());

    tokio::time::timeout(TEST_TIMEOUT, async {
        while stub.count("create_campaign") == 0 {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("monitor should complete onboarding after approval");

    assert_eq!(stub.fetch_count(), 2);
    assert_eq!(stub.count("associate_phone_number"), 1);
    assert_eq!(stub.count("create_campaign"), 1);
}

#[tokio::test]
async fn complete_reports_unknown_phone_number() {
    let stub = Arc::new(StubProvider::new().with_empty_inventory());
    let base = start_server(&stub, MonitorConfig::default()).await;

    let mut request = request_json();
    request["messaging_service_sid"] = Value::from("MG9000");
    let body = serde_json::json!({
        "request": request,
        "brand_registration_sid": "BN9000",
    });

    let (status, resp) = post(format!("{base}/complete"), &body).await;
    assert_eq!(status, 404);
    assert_eq!(resp["stage"], "lookup_phone_number");
    assert_eq!(stub.count("associate_phone_number"), 0);
}

#[tokio::test]
async fn complete_without_credentials_is_a_failed_precondition() {
    let stub = Arc::new(StubProvider::new());
    let base = start_server(&stub, MonitorConfig::default()).await;

    let mut request = request_json();
    request["messaging_service_sid"] = Value::from("MG9000");
    request.as_object_mut().unwrap().remove("subaccount_password");
    let body = serde_json::json!({
        "request": request,
        "brand_registration_sid": "BN9000",
    });

    let (status, resp) = post(format!("{base}/complete"), &body).await;
    assert_eq!(status, 412);
    assert_eq!(resp["missing"], "subaccount_password");
    assert!(stub.calls().is_empty());
}
