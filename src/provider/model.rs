//! Field records handed to a [`RegistrationProvider`](super::RegistrationProvider).

use serde::Serialize;

/// End-user type for the business information record.
pub const BUSINESS_INFORMATION_TYPE: &str = "customer_profile_business_information";
/// End-user type for the first authorized representative.
pub const AUTHORIZED_REPRESENTATIVE_TYPE: &str = "authorized_representative_1";
/// End-user type for the A2P messaging profile record.
pub const MESSAGING_PROFILE_TYPE: &str = "us_a2p_messaging_profile_information";
/// Supporting document type that proves the business address.
pub const ADDRESS_DOCUMENT_TYPE: &str = "customer_profile_address";

/// Secondary customer profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomerProfileFields {
    pub friendly_name: String,
    pub email: String,
    pub policy_sid: String,
    pub status_callback: String,
}

/// Business information end-user. Serialized as the record's attributes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BusinessInfoFields {
    pub business_name: String,
    pub social_media_profile_urls: String,
    pub website_url: String,
    pub business_regions_of_operation: String,
    pub business_type: String,
    pub business_registration_identifier: String,
    pub business_identity: String,
    pub business_industry: String,
    pub business_registration_number: String,
}

/// Authorized representative end-user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RepresentativeFields {
    #[serde(skip)]
    pub friendly_name: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone_number: String,
    pub job_position: String,
    pub business_title: String,
}

/// Business address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddressFields {
    /// Account that owns the address resource.
    pub account_sid: String,
    pub customer_name: String,
    pub street: String,
    pub city: String,
    pub region: String,
    pub postal_code: String,
    pub iso_country: String,
    pub friendly_name: String,
}

/// Supporting document; the address SID is passed separately.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SupportingDocumentFields {
    pub friendly_name: String,
}

/// A2P trust product.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrustProductFields {
    pub friendly_name: String,
    pub email: String,
    pub policy_sid: String,
    pub status_callback: String,
}

/// A2P messaging profile end-user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MessagingProfileFields {
    pub company_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stock_exchange: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stock_ticker: Option<String>,
}

/// Messaging service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessagingServiceFields {
    pub friendly_name: String,
    pub inbound_request_url: String,
    pub fallback_url: String,
}

/// A2P campaign content; the messaging service and brand SIDs are passed separately.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CampaignFields {
    pub description: String,
    pub use_case: String,
    pub message_flow: String,
    pub message_samples: Vec<String>,
    pub has_embedded_links: bool,
    pub has_embedded_phone: bool,
}

/// A newly created brand registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrandRegistration {
    pub sid: String,
    pub status: String,
}
