//! Onboarding orchestrator — the Apply and Complete phases.
//!
//! Apply builds the customer profile, the A2P trust product, the brand
//! registration and the messaging service. Complete runs once the brand is
//! approved: it attaches the purchased number to the messaging service and
//! registers the campaign.
//!
//! Neither phase deduplicates. Re-running Apply after a mid-pipeline failure
//! creates a fresh set of upstream resources.

use std::sync::Arc;

use tracing::{info, warn};

use super::model::{CAMPAIGN_NOT_SUBMITTED, OnboardingRequest, OnboardingResult};
use super::pipeline::StageRunner;
use super::state::{Sid, Stage, WorkflowState};
use crate::config::A2pConfig;
use crate::error::{OnboardingError, Prerequisite};
use crate::provider::{
    AddressFields, BusinessInfoFields, CampaignFields, CustomerProfileFields,
    MessagingProfileFields, MessagingServiceFields, RegistrationProvider, RepresentativeFields,
    SupportingDocumentFields, TrustProductFields,
};

pub const APPLY_MESSAGE: &str = "Brand Registration Created Successfully";
pub const COMPLETE_MESSAGE: &str = "A2P campaign created";
/// Brand status reported by Complete, which only runs after approval.
pub const APPROVED_STATUS: &str = "APPROVED";

/// Runs the onboarding phases against one provider.
pub struct Onboarding {
    provider: Arc<dyn RegistrationProvider>,
    config: A2pConfig,
}

impl Onboarding {
    pub fn new(provider: Arc<dyn RegistrationProvider>, config: A2pConfig) -> Self {
        Self { provider, config }
    }

    /// Apply for brand registration and create the messaging service.
    ///
    /// Prerequisites are checked before any provider call. On a stage
    /// failure the partially built state is dropped and only the error is
    /// returned.
    pub async fn apply(
        &self,
        request: &OnboardingRequest,
    ) -> Result<OnboardingResult, OnboardingError> {
        if let Some(missing) = request.missing_prerequisite() {
            warn!(subaccount_id = %request.subaccount_id, %missing, "Onboarding prerequisite missing");
            return Err(OnboardingError::Precondition(missing));
        }

        info!(
            friendly_name = %request.friendly_name,
            subaccount_id = %request.subaccount_id,
            "Starting A2P onboarding"
        );

        let mut state = WorkflowState::new();
        self.apply_into(request, &mut state).await?;

        let brand_status = state.brand_registration_status.clone().unwrap_or_default();
        info!(
            brand_registration_sid = state.brand_registration_sid.as_deref().unwrap_or_default(),
            brand_registration_status = %brand_status,
            messaging_service_sid = state.messaging_service_sid.as_deref().unwrap_or_default(),
            "Brand registration created"
        );

        let mut result = OnboardingResult::for_request(request, APPLY_MESSAGE, &state);
        result.applied_for_brand_registration = true;
        result.applied_for_messaging_service = false;
        result.applied_for_a2p_message_campaign = false;
        result.brand_registration_status = brand_status;
        result.messaging_service_status = "created".to_string();
        result.a2p_message_campaign_status = CAMPAIGN_NOT_SUBMITTED.to_string();
        Ok(result)
    }

    /// The Apply pipeline over caller-owned state, without prerequisite checks.
    ///
    /// After a failure at stage k, `state` holds exactly the SIDs of the
    /// stages before k.
    pub async fn apply_into(
        &self,
        request: &OnboardingRequest,
        state: &mut WorkflowState,
    ) -> Result<(), OnboardingError> {
        let provider = self.provider.as_ref();
        let config = &self.config;
        let mut runner = StageRunner::new(state);

        // ── Secondary customer profile ──────────────────────────────
        let profile = CustomerProfileFields {
            friendly_name: request.friendly_name.clone(),
            email: request.email.clone(),
            policy_sid: config.policy_sid.clone(),
            status_callback: config.status_callback.clone(),
        };
        let profile_sid = runner
            .create(Stage::CreateProfile, Sid::Profile, provider.create_profile(&profile))
            .await?;

        let business = BusinessInfoFields {
            business_name: request.business_name.clone(),
            social_media_profile_urls: request.social_media_profile_urls.clone(),
            website_url: request.website_url.clone(),
            business_regions_of_operation: request.region_of_operation.clone(),
            business_type: request.business_type.clone(),
            business_registration_identifier: request.business_registration_id.clone(),
            business_identity: request.business_identity.clone(),
            business_industry: request.business_industry.clone(),
            business_registration_number: request.business_registration_number.clone(),
        };
        let business_sid = runner
            .create(
                Stage::CreateBusinessInfo,
                Sid::BusinessInfo,
                provider.create_business_info(&business),
            )
            .await?;
        runner
            .call(
                Stage::AttachBusinessInfo,
                provider.attach_to_profile(&profile_sid, &business_sid),
            )
            .await?;

        let rep = &request.representative;
        let representative = RepresentativeFields {
            friendly_name: format!("{} - Authorized Representative 1", request.customer_name),
            first_name: rep.first_name.clone(),
            last_name: rep.last_name.clone(),
            email: rep.email.clone(),
            phone_number: rep.phone.clone(),
            job_position: rep.position.clone(),
            business_title: rep.business_title.clone(),
        };
        let representative_sid = runner
            .create(
                Stage::CreateRepresentative,
                Sid::Representative,
                provider.create_representative(&representative),
            )
            .await?;
        runner
            .call(
                Stage::AttachRepresentative,
                provider.attach_to_profile(&profile_sid, &representative_sid),
            )
            .await?;

        let address = AddressFields {
            account_sid: request.subaccount_username.clone(),
            customer_name: request.customer_name.clone(),
            street: request.street.clone(),
            city: request.city.clone(),
            region: request.region.clone(),
            postal_code: request.postal_code.clone(),
            iso_country: request.iso_country.clone(),
            friendly_name: format!("{} - Address Resource", request.customer_name),
        };
        let address_sid = runner
            .create(Stage::CreateAddress, Sid::Address, provider.create_address(&address))
            .await?;

        let document = SupportingDocumentFields {
            friendly_name: format!("{} - Business License Document", request.customer_name),
        };
        let document_sid = runner
            .create(
                Stage::CreateSupportingDocument,
                Sid::SupportingDocument,
                provider.create_supporting_document(&address_sid, &document),
            )
            .await?;
        runner
            .call(
                Stage::AttachSupportingDocument,
                provider.attach_to_profile(&profile_sid, &document_sid),
            )
            .await?;

        // Submission is only attempted once evaluation has succeeded.
        runner
            .call(Stage::ReviewProfile, async {
                provider
                    .evaluate_profile(&profile_sid, &config.policy_sid)
                    .await?;
                provider.submit_profile_for_review(&profile_sid).await
            })
            .await?;

        // ── A2P trust product ───────────────────────────────────────
        let trust_product = TrustProductFields {
            friendly_name: request.friendly_name.clone(),
            email: request.email.clone(),
            policy_sid: config.policy_sid.clone(),
            status_callback: config.status_callback.clone(),
        };
        let trust_product_sid = runner
            .create(
                Stage::CreateTrustProduct,
                Sid::TrustProduct,
                provider.create_trust_product(&trust_product),
            )
            .await?;

        let messaging_profile = MessagingProfileFields {
            company_type: request.business_type.clone(),
            stock_exchange: None,
            stock_ticker: None,
        };
        let messaging_profile_sid = runner
            .create(
                Stage::CreateMessagingProfile,
                Sid::MessagingProfile,
                provider.create_messaging_profile(&messaging_profile),
            )
            .await?;
        runner
            .call(
                Stage::AttachMessagingProfile,
                provider.attach_to_trust_product(&trust_product_sid, &messaging_profile_sid),
            )
            .await?;
        runner
            .call(
                Stage::AttachProfileToTrustProduct,
                provider.attach_to_trust_product(&trust_product_sid, &profile_sid),
            )
            .await?;
        runner
            .call(Stage::ReviewTrustProduct, async {
                provider
                    .evaluate_trust_product(&trust_product_sid, &config.policy_sid)
                    .await?;
                provider
                    .submit_trust_product_for_review(&trust_product_sid)
                    .await
            })
            .await?;

        // ── Brand registration and messaging service ────────────────
        let brand = runner
            .call(
                Stage::CreateBrandRegistration,
                provider.create_brand_registration(&profile_sid, &trust_product_sid),
            )
            .await?;
        runner.record(Stage::CreateBrandRegistration, Sid::BrandRegistration, brand.sid)?;
        runner.state_mut().brand_registration_status = Some(brand.status);

        let service = MessagingServiceFields {
            friendly_name: request.friendly_name.clone(),
            inbound_request_url: config.inbound_request_url.clone(),
            fallback_url: config.fallback_url.clone(),
        };
        runner
            .create(
                Stage::CreateMessagingService,
                Sid::MessagingService,
                provider.create_messaging_service(&service),
            )
            .await?;

        info!(stages = runner.completed().len(), "Apply pipeline finished");
        Ok(())
    }

    /// Attach the purchased number and create the A2P campaign.
    ///
    /// The caller is responsible for only calling this with an approved
    /// brand registration; approval is not re-checked here.
    pub async fn complete(
        &self,
        request: &OnboardingRequest,
        brand_registration_sid: &str,
    ) -> Result<OnboardingResult, OnboardingError> {
        let mut state = WorkflowState::new();
        self.complete_into(request, brand_registration_sid, &mut state)
            .await?;

        info!(
            brand_registration_sid,
            campaign_sid = state.campaign_sid.as_deref().unwrap_or_default(),
            "A2P campaign created"
        );

        let mut result = OnboardingResult::for_request(request, COMPLETE_MESSAGE, &state);
        result.applied_for_brand_registration = true;
        result.applied_for_messaging_service = true;
        result.applied_for_a2p_message_campaign = true;
        result.brand_registration_status = APPROVED_STATUS.to_string();
        result.messaging_service_status = "phone number associated".to_string();
        result.a2p_message_campaign_status = "submitted".to_string();
        Ok(result)
    }

    /// The Complete pipeline over caller-owned state.
    ///
    /// A state Apply already filled is reused only if it names the same brand
    /// registration and messaging service; otherwise nothing is called.
    pub async fn complete_into(
        &self,
        request: &OnboardingRequest,
        brand_registration_sid: &str,
        state: &mut WorkflowState,
    ) -> Result<(), OnboardingError> {
        let messaging_service_sid = request
            .messaging_service_sid
            .clone()
            .filter(|sid| !sid.is_empty())
            .ok_or(OnboardingError::Precondition(Prerequisite::MessagingService))?;

        // A state Apply already filled must name the same brand and service.
        state.adopt(
            Stage::LookupPhoneNumber,
            Sid::BrandRegistration,
            brand_registration_sid,
        )?;
        state.adopt(
            Stage::LookupPhoneNumber,
            Sid::MessagingService,
            &messaging_service_sid,
        )?;

        let provider = self.provider.as_ref();
        let mut runner = StageRunner::new(state);

        let phone_sid = runner
            .create(
                Stage::LookupPhoneNumber,
                Sid::PhoneNumber,
                provider.lookup_phone_number_sid(&request.purchased_phone_number),
            )
            .await?;
        runner
            .call(
                Stage::AssociatePhoneNumber,
                provider.associate_phone_number(&messaging_service_sid, &phone_sid),
            )
            .await?;

        let campaign = &self.config.campaign;
        let fields = CampaignFields {
            description: campaign.description.clone(),
            use_case: request.use_case.clone(),
            message_flow: campaign.message_flow.clone(),
            message_samples: campaign.message_samples.clone(),
            has_embedded_links: campaign.has_embedded_links,
            has_embedded_phone: campaign.has_embedded_phone,
        };
        runner
            .create(
                Stage::CreateCampaign,
                Sid::Campaign,
                provider.create_campaign(&messaging_service_sid, brand_registration_sid, &fields),
            )
            .await?;
        Ok(())
    }
}
