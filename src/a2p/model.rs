//! Onboarding input and output records.

use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

use super::state::WorkflowState;
use crate::error::{OnboardingError, Prerequisite};
use crate::provider::TwilioCredentials;

static E164: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\+[1-9][0-9]{6,14}$").expect("E.164 pattern compiles"));

/// Campaign status reported before the campaign exists.
pub const CAMPAIGN_NOT_SUBMITTED: &str = "not submitted";

/// The business's first authorized representative.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AuthorizedRepresentative {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub position: String,
    pub business_title: String,
}

/// Everything needed to onboard one business. Never mutated once built.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct OnboardingRequest {
    pub location_id: String,
    pub subaccount_id: String,
    pub subaccount_username: String,
    #[serde(deserialize_with = "deserialize_secret")]
    pub subaccount_password: Option<SecretString>,

    pub customer_name: String,
    #[serde(rename = "customer_email")]
    pub email: String,
    #[serde(rename = "customer_phone_number")]
    pub phone_number: String,
    pub street: String,
    pub city: String,
    pub region: String,
    pub postal_code: String,
    pub iso_country: String,

    pub friendly_name: String,
    pub website_url: String,
    pub social_media_profile_urls: String,
    pub business_name: String,
    pub business_industry: String,
    pub business_type: String,
    #[serde(rename = "business_registration_identifier")]
    pub business_registration_id: String,
    pub business_identity: String,
    pub business_registration_number: String,
    pub region_of_operation: String,

    pub representative: AuthorizedRepresentative,

    pub purchased_phone_number: String,
    pub purchased_phone_number_sid: String,
    pub use_case: String,
    pub area_code: String,

    /// Set once Apply has created the messaging service; Complete needs it.
    pub messaging_service_sid: Option<String>,
}

fn deserialize_secret<'de, D>(deserializer: D) -> Result<Option<SecretString>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.map(SecretString::from))
}

impl OnboardingRequest {
    /// A copy of this request carrying the messaging service Apply created.
    pub fn with_messaging_service_sid(&self, sid: impl Into<String>) -> Self {
        Self {
            messaging_service_sid: Some(sid.into()),
            ..self.clone()
        }
    }

    /// The first missing provisioning prerequisite, checked in a fixed order.
    pub fn missing_prerequisite(&self) -> Option<Prerequisite> {
        let password_missing = self
            .subaccount_password
            .as_ref()
            .is_none_or(|p| p.expose_secret().is_empty());

        if self.subaccount_id.is_empty() {
            Some(Prerequisite::Subaccount)
        } else if self.purchased_phone_number.is_empty() {
            Some(Prerequisite::PurchasedPhoneNumber)
        } else if self.purchased_phone_number_sid.is_empty() {
            Some(Prerequisite::PurchasedPhoneNumberSid)
        } else if self.subaccount_username.is_empty() {
            Some(Prerequisite::SubaccountUsername)
        } else if password_missing {
            Some(Prerequisite::SubaccountPassword)
        } else {
            None
        }
    }

    /// Sub-account credentials, if both halves are present.
    pub fn credentials(&self) -> Option<TwilioCredentials> {
        let token = self.subaccount_password.clone()?;
        if self.subaccount_username.is_empty() || token.expose_secret().is_empty() {
            return None;
        }
        Some(TwilioCredentials {
            account_sid: self.subaccount_username.clone(),
            auth_token: token,
        })
    }

    /// Check every required business field, reporting all problems at once.
    pub fn validate(&self) -> Result<(), OnboardingError> {
        let rep = &self.representative;
        let required = [
            ("customer_name", &self.customer_name),
            ("customer_email", &self.email),
            ("customer_phone_number", &self.phone_number),
            ("street", &self.street),
            ("city", &self.city),
            ("region", &self.region),
            ("postal_code", &self.postal_code),
            ("iso_country", &self.iso_country),
            ("social_media_profile_urls", &self.social_media_profile_urls),
            ("website_url", &self.website_url),
            ("business_name", &self.business_name),
            ("business_industry", &self.business_industry),
            ("business_type", &self.business_type),
            ("business_registration_identifier", &self.business_registration_id),
            ("business_identity", &self.business_identity),
            ("business_registration_number", &self.business_registration_number),
            ("region_of_operation", &self.region_of_operation),
            ("purchased_phone_number", &self.purchased_phone_number),
            ("representative.first_name", &rep.first_name),
            ("representative.last_name", &rep.last_name),
            ("representative.email", &rep.email),
            ("representative.phone", &rep.phone),
            ("representative.position", &rep.position),
            ("representative.business_title", &rep.business_title),
            ("friendly_name", &self.friendly_name),
            ("use_case", &self.use_case),
            ("area_code", &self.area_code),
        ];

        let mut problems: Vec<String> = required
            .iter()
            .filter(|(_, value)| value.trim().is_empty())
            .map(|(name, _)| format!("{name} is required"))
            .collect();

        for (name, value) in [
            ("purchased_phone_number", &self.purchased_phone_number),
            ("representative.phone", &rep.phone),
        ] {
            if !value.trim().is_empty() && !E164.is_match(value.trim()) {
                problems.push(format!("{name} must be in E.164 format"));
            }
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(OnboardingError::Validation { fields: problems })
        }
    }
}

/// SIDs reported back to the caller.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SidSnapshot {
    pub profile_sid: Option<String>,
    pub business_info_sid: Option<String>,
    pub representative_sid: Option<String>,
    pub address_sid: Option<String>,
    pub supporting_document_sid: Option<String>,
    pub trust_product_sid: Option<String>,
    pub messaging_profile_sid: Option<String>,
    pub brand_registration_sid: Option<String>,
    pub messaging_service_sid: Option<String>,
    pub phone_number_sid: Option<String>,
    pub a2p_message_campaign_sid: Option<String>,
}

impl From<&WorkflowState> for SidSnapshot {
    fn from(state: &WorkflowState) -> Self {
        Self {
            profile_sid: state.profile_sid.clone(),
            business_info_sid: state.business_info_sid.clone(),
            representative_sid: state.representative_sid.clone(),
            address_sid: state.address_sid.clone(),
            supporting_document_sid: state.supporting_document_sid.clone(),
            trust_product_sid: state.trust_product_sid.clone(),
            messaging_profile_sid: state.messaging_profile_sid.clone(),
            brand_registration_sid: state.brand_registration_sid.clone(),
            messaging_service_sid: state.messaging_service_sid.clone(),
            phone_number_sid: state.phone_number_sid.clone(),
            a2p_message_campaign_sid: state.campaign_sid.clone(),
        }
    }
}

/// Outcome of an onboarding phase. Built once, never modified.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OnboardingResult {
    pub id: Uuid,
    pub message: String,
    pub location_id: String,
    pub subaccount_id: String,
    pub subaccount_username: String,
    pub phone_number: String,
    pub phone_number_sid: String,
    pub sids: SidSnapshot,
    pub applied_for_brand_registration: bool,
    pub applied_for_messaging_service: bool,
    pub applied_for_a2p_message_campaign: bool,
    pub brand_registration_status: String,
    pub messaging_service_status: String,
    pub a2p_message_campaign_status: String,
    pub created_at: DateTime<Utc>,
}

impl OnboardingResult {
    /// Result shell for `request`, before phase-specific fields are set.
    pub(crate) fn for_request(
        request: &OnboardingRequest,
        message: impl Into<String>,
        state: &WorkflowState,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            message: message.into(),
            location_id: request.location_id.clone(),
            subaccount_id: request.subaccount_id.clone(),
            subaccount_username: request.subaccount_username.clone(),
            phone_number: request.purchased_phone_number.clone(),
            phone_number_sid: request.purchased_phone_number_sid.clone(),
            sids: SidSnapshot::from(state),
            applied_for_brand_registration: false,
            applied_for_messaging_service: false,
            applied_for_a2p_message_campaign: false,
            brand_registration_status: String::new(),
            messaging_service_status: String::new(),
            a2p_message_campaign_status: String::new(),
            created_at: Utc::now(),
        }
    }
}
