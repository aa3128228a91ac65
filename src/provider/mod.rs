//! Registration provider capability.
//!
//! Every remote operation the onboarding pipeline and the status monitor
//! depend on. Creation and attachment calls are remote mutations and are
//! never retried by callers; calling one twice creates two resources.

pub mod model;
pub mod twilio;

pub use model::*;
pub use twilio::{TwilioCredentials, TwilioProvider};

use async_trait::async_trait;

use crate::error::ProviderError;

/// Remote compliance / registration service.
#[async_trait]
pub trait RegistrationProvider: Send + Sync {
    // ── Customer profile ────────────────────────────────────────────

    /// Create a secondary customer profile. Returns its SID.
    async fn create_profile(&self, fields: &CustomerProfileFields) -> Result<String, ProviderError>;

    /// Create the business information end-user. Returns its SID.
    async fn create_business_info(
        &self,
        fields: &BusinessInfoFields,
    ) -> Result<String, ProviderError>;

    /// Create the authorized representative end-user. Returns its SID.
    async fn create_representative(
        &self,
        fields: &RepresentativeFields,
    ) -> Result<String, ProviderError>;

    /// Create the business address. Returns its SID.
    async fn create_address(&self, fields: &AddressFields) -> Result<String, ProviderError>;

    /// Create a supporting document referencing `address_sid`. Returns its SID.
    async fn create_supporting_document(
        &self,
        address_sid: &str,
        fields: &SupportingDocumentFields,
    ) -> Result<String, ProviderError>;

    /// Assign an end-user, document, or bundle to a customer profile.
    async fn attach_to_profile(
        &self,
        profile_sid: &str,
        object_sid: &str,
    ) -> Result<(), ProviderError>;

    async fn evaluate_profile(&self, profile_sid: &str, policy_sid: &str)
    -> Result<(), ProviderError>;

    async fn submit_profile_for_review(&self, profile_sid: &str) -> Result<(), ProviderError>;

    // ── Trust product ───────────────────────────────────────────────

    /// Create an A2P trust product. Returns its SID.
    async fn create_trust_product(
        &self,
        fields: &TrustProductFields,
    ) -> Result<String, ProviderError>;

    /// Create the A2P messaging profile end-user. Returns its SID.
    async fn create_messaging_profile(
        &self,
        fields: &MessagingProfileFields,
    ) -> Result<String, ProviderError>;

    /// Assign an end-user or customer profile to a trust product.
    async fn attach_to_trust_product(
        &self,
        trust_product_sid: &str,
        object_sid: &str,
    ) -> Result<(), ProviderError>;

    async fn evaluate_trust_product(
        &self,
        trust_product_sid: &str,
        policy_sid: &str,
    ) -> Result<(), ProviderError>;

    async fn submit_trust_product_for_review(
        &self,
        trust_product_sid: &str,
    ) -> Result<(), ProviderError>;

    // ── Brand registration and messaging ────────────────────────────

    async fn create_brand_registration(
        &self,
        profile_sid: &str,
        trust_product_sid: &str,
    ) -> Result<BrandRegistration, ProviderError>;

    /// Current status string of a brand registration, as reported.
    async fn fetch_registration_status(
        &self,
        brand_registration_sid: &str,
    ) -> Result<String, ProviderError>;

    /// Create a messaging service. Returns its SID.
    async fn create_messaging_service(
        &self,
        fields: &MessagingServiceFields,
    ) -> Result<String, ProviderError>;

    async fn associate_phone_number(
        &self,
        messaging_service_sid: &str,
        phone_number_sid: &str,
    ) -> Result<(), ProviderError>;

    /// Create the A2P campaign. Returns its SID.
    async fn create_campaign(
        &self,
        messaging_service_sid: &str,
        brand_registration_sid: &str,
        fields: &CampaignFields,
    ) -> Result<String, ProviderError>;

    // ── Inventory ───────────────────────────────────────────────────

    /// Resolve an owned phone number to its SID.
    ///
    /// Fails with [`ProviderError::PhoneNumberNotFound`] when nothing matches.
    async fn lookup_phone_number_sid(&self, phone_number: &str) -> Result<String, ProviderError>;
}
