//! Stage identity and the SIDs threaded through the onboarding pipeline.

use serde::{Deserialize, Serialize};

use crate::error::OnboardingError;

/// One step of the Apply or Complete pipeline, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    CreateProfile,
    CreateBusinessInfo,
    AttachBusinessInfo,
    CreateRepresentative,
    AttachRepresentative,
    CreateAddress,
    CreateSupportingDocument,
    AttachSupportingDocument,
    ReviewProfile,
    CreateTrustProduct,
    CreateMessagingProfile,
    AttachMessagingProfile,
    AttachProfileToTrustProduct,
    ReviewTrustProduct,
    CreateBrandRegistration,
    CreateMessagingService,
    LookupPhoneNumber,
    AssociatePhoneNumber,
    CreateCampaign,
}

impl Stage {
    /// 1-based position across Apply followed by Complete.
    pub fn number(&self) -> u8 {
        *self as u8 + 1
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::CreateProfile => "create_profile",
            Self::CreateBusinessInfo => "create_business_info",
            Self::AttachBusinessInfo => "attach_business_info",
            Self::CreateRepresentative => "create_representative",
            Self::AttachRepresentative => "attach_representative",
            Self::CreateAddress => "create_address",
            Self::CreateSupportingDocument => "create_supporting_document",
            Self::AttachSupportingDocument => "attach_supporting_document",
            Self::ReviewProfile => "review_profile",
            Self::CreateTrustProduct => "create_trust_product",
            Self::CreateMessagingProfile => "create_messaging_profile",
            Self::AttachMessagingProfile => "attach_messaging_profile",
            Self::AttachProfileToTrustProduct => "attach_profile_to_trust_product",
            Self::ReviewTrustProduct => "review_trust_product",
            Self::CreateBrandRegistration => "create_brand_registration",
            Self::CreateMessagingService => "create_messaging_service",
            Self::LookupPhoneNumber => "lookup_phone_number",
            Self::AssociatePhoneNumber => "associate_phone_number",
            Self::CreateCampaign => "create_campaign",
        };
        write!(f, "{s}")
    }
}

/// A SID-bearing slot of [`WorkflowState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sid {
    Profile,
    BusinessInfo,
    Representative,
    Address,
    SupportingDocument,
    TrustProduct,
    MessagingProfile,
    BrandRegistration,
    MessagingService,
    PhoneNumber,
    Campaign,
}

/// SIDs produced by completed stages.
///
/// Each slot starts empty and is written once by the stage that creates the
/// resource. Owned by a single orchestrator invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowState {
    pub profile_sid: Option<String>,
    pub business_info_sid: Option<String>,
    pub representative_sid: Option<String>,
    pub address_sid: Option<String>,
    pub supporting_document_sid: Option<String>,
    pub trust_product_sid: Option<String>,
    pub messaging_profile_sid: Option<String>,
    pub brand_registration_sid: Option<String>,
    pub brand_registration_status: Option<String>,
    pub messaging_service_sid: Option<String>,
    pub phone_number_sid: Option<String>,
    pub campaign_sid: Option<String>,
}

impl WorkflowState {
    pub fn new() -> Self {
        Self::default()
    }

    fn slot_mut(&mut self, sid: Sid) -> &mut Option<String> {
        match sid {
            Sid::Profile => &mut self.profile_sid,
            Sid::BusinessInfo => &mut self.business_info_sid,
            Sid::Representative => &mut self.representative_sid,
            Sid::Address => &mut self.address_sid,
            Sid::SupportingDocument => &mut self.supporting_document_sid,
            Sid::TrustProduct => &mut self.trust_product_sid,
            Sid::MessagingProfile => &mut self.messaging_profile_sid,
            Sid::BrandRegistration => &mut self.brand_registration_sid,
            Sid::MessagingService => &mut self.messaging_service_sid,
            Sid::PhoneNumber => &mut self.phone_number_sid,
            Sid::Campaign => &mut self.campaign_sid,
        }
    }

    /// Read a recorded SID.
    pub fn get(&self, sid: Sid) -> Option<&str> {
        let slot = match sid {
            Sid::Profile => &self.profile_sid,
            Sid::BusinessInfo => &self.business_info_sid,
            Sid::Representative => &self.representative_sid,
            Sid::Address => &self.address_sid,
            Sid::SupportingDocument => &self.supporting_document_sid,
            Sid::TrustProduct => &self.trust_product_sid,
            Sid::MessagingProfile => &self.messaging_profile_sid,
            Sid::BrandRegistration => &self.brand_registration_sid,
            Sid::MessagingService => &self.messaging_service_sid,
            Sid::PhoneNumber => &self.phone_number_sid,
            Sid::Campaign => &self.campaign_sid,
        };
        slot.as_deref()
    }

    /// Record the SID `stage` produced. A slot already holding a value is
    /// never overwritten.
    pub fn record(&mut self, stage: Stage, sid: Sid, value: String) -> Result<(), OnboardingError> {
        let slot = self.slot_mut(sid);
        if slot.is_some() {
            return Err(OnboardingError::SidAlreadyRecorded { stage });
        }
        *slot = Some(value);
        Ok(())
    }

    /// Take a SID supplied from outside the pipeline. An empty slot is
    /// filled, the same value is accepted, and a different value is rejected
    /// without touching the slot.
    pub fn adopt(&mut self, stage: Stage, sid: Sid, value: &str) -> Result<(), OnboardingError> {
        match self.get(sid) {
            Some(existing) if existing == value => Ok(()),
            Some(_) => Err(OnboardingError::SidAlreadyRecorded { stage }),
            None => self.record(stage, sid, value.to_string()),
        }
    }
}
