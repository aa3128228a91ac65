//! Shared stub provider and request fixtures for integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use secrecy::SecretString;

use a2p_onboard::a2p::{AuthorizedRepresentative, OnboardingRequest};
use a2p_onboard::error::ProviderError;
use a2p_onboard::provider::*;

pub const PURCHASED_NUMBER: &str = "+15005550008";

/// What the stub answers for the n-th status fetch (0-based).
pub type StatusScript = Box<dyn Fn(usize) -> FetchReply + Send + Sync>;

pub enum FetchReply {
    Status(&'static str),
    Error,
    Hang,
}

/// Deterministic provider that records every call.
///
/// SIDs are unique across calls, so two runs never share resources.
pub struct StubProvider {
    calls: Mutex<Vec<&'static str>>,
    next_sid: AtomicUsize,
    fetches: AtomicUsize,
    /// 1-based index of the mutation call that should fail.
    fail_on_call: Option<usize>,
    inventory: HashMap<String, String>,
    status_script: StatusScript,
}

impl StubProvider {
    pub fn new() -> Self {
        let mut inventory = HashMap::new();
        inventory.insert(PURCHASED_NUMBER.to_string(), "PN0001".to_string());
        Self {
            calls: Mutex::new(Vec::new()),
            next_sid: AtomicUsize::new(1),
            fetches: AtomicUsize::new(0),
            fail_on_call: None,
            inventory,
            status_script: Box::new(|_| FetchReply::Status("PENDING")),
        }
    }

    pub fn failing_on_call(mut self, n: usize) -> Self {
        self.fail_on_call = Some(n);
        self
    }

    pub fn with_empty_inventory(mut self) -> Self {
        self.inventory.clear();
        self
    }

    pub fn with_statuses(mut self, script: impl Fn(usize) -> FetchReply + Send + Sync + 'static) -> Self {
        self.status_script = Box::new(script);
        self
    }

    /// Mutation and lookup calls, in order. Status fetches are counted separately.
    pub fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, name: &str) -> usize {
        self.calls().iter().filter(|c| **c == name).count()
    }

    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    fn record(&self, name: &'static str) -> Result<(), ProviderError> {
        let mut calls = self.calls.lock().unwrap();
        calls.push(name);
        if self.fail_on_call == Some(calls.len()) {
            return Err(ProviderError::Status {
                status: 400,
                message: format!("{name} rejected"),
            });
        }
        Ok(())
    }

    fn sid(&self, prefix: &str) -> String {
        format!("{prefix}{:04}", self.next_sid.fetch_add(1, Ordering::SeqCst))
    }

    fn create(&self, name: &'static str, prefix: &str) -> Result<String, ProviderError> {
        self.record(name)?;
        Ok(self.sid(prefix))
    }
}

#[async_trait]
impl RegistrationProvider for StubProvider {
    async fn create_profile(&self, _: &CustomerProfileFields) -> Result<String, ProviderError> {
        self.create("create_profile", "BU")
    }

    async fn create_business_info(&self, _: &BusinessInfoFields) -> Result<String, ProviderError> {
        self.create("create_business_info", "IT")
    }

    async fn create_representative(
        &self,
        _: &RepresentativeFields,
    ) -> Result<String, ProviderError> {
        self.create("create_representative", "IT")
    }

    async fn create_address(&self, _: &AddressFields) -> Result<String, ProviderError> {
        self.create("create_address", "AD")
    }

    async fn create_supporting_document(
        &self,
        _address_sid: &str,
        _: &SupportingDocumentFields,
    ) -> Result<String, ProviderError> {
        self.create("create_supporting_document", "RD")
    }

    async fn attach_to_profile(&self, _: &str, _: &str) -> Result<(), ProviderError> {
        self.record("attach_to_profile")
    }

    async fn evaluate_profile(&self, _: &str, _: &str) -> Result<(), ProviderError> {
        self.record("evaluate_profile")
    }

    async fn submit_profile_for_review(&self, _: &str) -> Result<(), ProviderError> {
        self.record("submit_profile_for_review")
    }

    async fn create_trust_product(&self, _: &TrustProductFields) -> Result<String, ProviderError> {
        self.create("create_trust_product", "BU")
    }

    async fn create_messaging_profile(
        &self,
        _: &MessagingProfileFields,
    ) -> Result<String, ProviderError> {
        self.create("create_messaging_profile", "IT")
    }

    async fn attach_to_trust_product(&self, _: &str, _: &str) -> Result<(), ProviderError> {
        self.record("attach_to_trust_product")
    }

    async fn evaluate_trust_product(&self, _: &str, _: &str) -> Result<(), ProviderError> {
        self.record("evaluate_trust_product")
    }

    async fn submit_trust_product_for_review(&self, _: &str) -> Result<(), ProviderError> {
        self.record("submit_trust_product_for_review")
    }

    async fn create_brand_registration(
        &self,
        _: &str,
        _: &str,
    ) -> Result<BrandRegistration, ProviderError> {
        self.record("create_brand_registration")?;
        Ok(BrandRegistration {
            sid: self.sid("BN"),
            status: "PENDING".to_string(),
        })
    }

    async fn fetch_registration_status(&self, _: &str) -> Result<String, ProviderError> {
        let n = self.fetches.fetch_add(1, Ordering::SeqCst);
        match (self.status_script)(n) {
            FetchReply::Status(status) => Ok(status.to_string()),
            FetchReply::Error => Err(ProviderError::Transport {
                endpoint: "stub".into(),
                reason: "connection reset".into(),
            }),
            FetchReply::Hang => std::future::pending().await,
        }
    }

    async fn create_messaging_service(
        &self,
        _: &MessagingServiceFields,
    ) -> Result<String, ProviderError> {
        self.create("create_messaging_service", "MG")
    }

    async fn associate_phone_number(&self, _: &str, _: &str) -> Result<(), ProviderError> {
        self.record("associate_phone_number")
    }

    async fn create_campaign(
        &self,
        _: &str,
        _: &str,
        _: &CampaignFields,
    ) -> Result<String, ProviderError> {
        self.create("create_campaign", "QE")
    }

    async fn lookup_phone_number_sid(&self, phone_number: &str) -> Result<String, ProviderError> {
        self.record("lookup_phone_number_sid")?;
        self.inventory
            .get(phone_number)
            .cloned()
            .ok_or_else(|| ProviderError::PhoneNumberNotFound {
                phone_number: phone_number.to_string(),
            })
    }
}

/// A request that passes validation and every prerequisite check.
pub fn request() -> OnboardingRequest {
    OnboardingRequest {
        location_id: "loc-1".into(),
        subaccount_id: "sub-1".into(),
        subaccount_username: "AC0001".into(),
        subaccount_password: Some(SecretString::from("auth-token")),
        customer_name: "Acme".into(),
        email: "ops@acme.test".into(),
        phone_number: "+15005550006".into(),
        street: "1 Main St".into(),
        city: "Springfield".into(),
        region: "IL".into(),
        postal_code: "62701".into(),
        iso_country: "US".into(),
        friendly_name: "Acme Messaging".into(),
        website_url: "https://acme.test".into(),
        social_media_profile_urls: "https://social.test/acme".into(),
        business_name: "Acme Inc".into(),
        business_industry: "RETAIL".into(),
        business_type: "Corporation".into(),
        business_registration_id: "EIN".into(),
        business_identity: "direct_customer".into(),
        business_registration_number: "12-3456789".into(),
        region_of_operation: "USA_AND_CANADA".into(),
        representative: AuthorizedRepresentative {
            first_name: "Ada".into(),
            last_name: "Lovelace".into(),
            email: "ada@acme.test".into(),
            phone: "+15005550007".into(),
            position: "CEO".into(),
            business_title: "Founder".into(),
        },
        purchased_phone_number: PURCHASED_NUMBER.into(),
        purchased_phone_number_sid: "PN0001".into(),
        use_case: "MIXED".into(),
        area_code: "217".into(),
        messaging_service_sid: None,
    }
}

/// The JSON a client would post for [`request`].
pub fn request_json() -> serde_json::Value {
    serde_json::json!({
        "location_id": "loc-1",
        "subaccount_id": "sub-1",
        "subaccount_username": "AC0001",
        "subaccount_password": "auth-token",
        "customer_name": "Acme",
        "customer_email": "ops@acme.test",
        "customer_phone_number": "+15005550006",
        "street": "1 Main St",
        "city": "Springfield",
        "region": "IL",
        "postal_code": "62701",
        "iso_country": "US",
        "friendly_name": "Acme Messaging",
        "website_url": "https://acme.test",
        "social_media_profile_urls": "https://social.test/acme",
        "business_name": "Acme Inc",
        "business_industry": "RETAIL",
        "business_type": "Corporation",
        "business_registration_identifier": "EIN",
        "business_identity": "direct_customer",
        "business_registration_number": "12-3456789",
        "region_of_operation": "USA_AND_CANADA",
        "representative": {
            "first_name": "Ada",
            "last_name": "Lovelace",
            "email": "ada@acme.test",
            "phone": "+15005550007",
            "position": "CEO",
            "business_title": "Founder"
        },
        "purchased_phone_number": PURCHASED_NUMBER,
        "purchased_phone_number_sid": "PN0001",
        "use_case": "MIXED",
        "area_code": "217"
    })
}
