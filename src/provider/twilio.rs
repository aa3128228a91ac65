//! Twilio REST implementation of [`RegistrationProvider`].
//!
//! Talks to three APIs: Trust Hub (profiles, end-users, documents, trust
//! products), Messaging (brand registrations, services, campaigns) and the
//! core account API (addresses, incoming phone numbers). Requests are
//! form-encoded and authenticated with the sub-account's credentials.

use std::time::Duration;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;
use tracing::debug;

use super::RegistrationProvider;
use super::model::*;
use crate::config::TwilioEndpoints;
use crate::error::ProviderError;

/// Upper bound on any single REST call.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Status a profile or trust product is moved to when submitted.
const PENDING_REVIEW: &str = "pending-review";

/// Sub-account credentials used for basic auth.
#[derive(Debug, Clone)]
pub struct TwilioCredentials {
    pub account_sid: String,
    pub auth_token: SecretString,
}

pub struct TwilioProvider {
    client: reqwest::Client,
    endpoints: TwilioEndpoints,
    credentials: TwilioCredentials,
}

impl TwilioProvider {
    pub fn new(
        endpoints: TwilioEndpoints,
        credentials: TwilioCredentials,
    ) -> Result<Self, ProviderError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| ProviderError::Transport {
                endpoint: "client".into(),
                reason: e.to_string(),
            })?;
        Ok(Self {
            client,
            endpoints,
            credentials,
        })
    }

    fn trusthub(&self, path: &str) -> String {
        format!("{}/v1/{path}", self.endpoints.trusthub.trim_end_matches('/'))
    }

    fn messaging(&self, path: &str) -> String {
        format!("{}/v1/{path}", self.endpoints.messaging.trim_end_matches('/'))
    }

    fn account(&self, path: &str) -> String {
        format!(
            "{}/2010-04-01/Accounts/{}/{path}",
            self.endpoints.api.trim_end_matches('/'),
            self.credentials.account_sid
        )
    }

    async fn post_form(&self, url: String, form: &[(&str, String)]) -> Result<Value, ProviderError> {
        let request = self.client.post(&url).form(form);
        self.send(request, &url).await
    }

    async fn get(&self, url: String, query: &[(&str, &str)]) -> Result<Value, ProviderError> {
        let request = self.client.get(&url).query(query);
        self.send(request, &url).await
    }

    async fn send(
        &self,
        request: reqwest::RequestBuilder,
        endpoint: &str,
    ) -> Result<Value, ProviderError> {
        let resp = request
            .basic_auth(
                &self.credentials.account_sid,
                Some(self.credentials.auth_token.expose_secret()),
            )
            .send()
            .await
            .map_err(|e| ProviderError::Transport {
                endpoint: endpoint.to_string(),
                reason: e.to_string(),
            })?;

        let status = resp.status();
        let body = resp.text().await.map_err(|e| ProviderError::Transport {
            endpoint: endpoint.to_string(),
            reason: e.to_string(),
        })?;

        if !status.is_success() {
            let message = serde_json::from_str::<Value>(&body)
                .ok()
                .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(String::from))
                .unwrap_or(body);
            return Err(ProviderError::Status {
                status: status.as_u16(),
                message,
            });
        }

        if body.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&body).map_err(|e| ProviderError::InvalidResponse {
            endpoint: endpoint.to_string(),
            reason: e.to_string(),
        })
    }

    async fn create_end_user(
        &self,
        friendly_name: String,
        end_user_type: &str,
        attributes: Value,
    ) -> Result<String, ProviderError> {
        let url = self.trusthub("EndUsers");
        let body = self
            .post_form(
                url.clone(),
                &[
                    ("FriendlyName", friendly_name),
                    ("Type", end_user_type.to_string()),
                    ("Attributes", attributes.to_string()),
                ],
            )
            .await?;
        string_field(&body, "sid", &url)
    }
}

fn string_field(body: &Value, field: &str, endpoint: &str) -> Result<String, ProviderError> {
    body.get(field)
        .and_then(|v| v.as_str())
        .filter(|s| !s.is_empty())
        .map(String::from)
        .ok_or_else(|| ProviderError::InvalidResponse {
            endpoint: endpoint.to_string(),
            reason: format!("missing '{field}'"),
        })
}

fn attributes_of<T: serde::Serialize>(fields: &T) -> Result<Value, ProviderError> {
    serde_json::to_value(fields).map_err(|e| ProviderError::InvalidResponse {
        endpoint: "EndUsers".into(),
        reason: format!("could not encode attributes: {e}"),
    })
}

#[async_trait]
impl RegistrationProvider for TwilioProvider {
    async fn create_profile(&self, fields: &CustomerProfileFields) -> Result<String, ProviderError> {
        let url = self.trusthub("CustomerProfiles");
        let body = self
            .post_form(
                url.clone(),
                &[
                    ("FriendlyName", fields.friendly_name.clone()),
                    ("Email", fields.email.clone()),
                    ("PolicySid", fields.policy_sid.clone()),
                    ("StatusCallback", fields.status_callback.clone()),
                ],
            )
            .await?;
        string_field(&body, "sid", &url)
    }

    async fn create_business_info(
        &self,
        fields: &BusinessInfoFields,
    ) -> Result<String, ProviderError> {
        self.create_end_user(
            format!("{} - Business Information", fields.business_name),
            BUSINESS_INFORMATION_TYPE,
            attributes_of(fields)?,
        )
        .await
    }

    async fn create_representative(
        &self,
        fields: &RepresentativeFields,
    ) -> Result<String, ProviderError> {
        self.create_end_user(
            fields.friendly_name.clone(),
            AUTHORIZED_REPRESENTATIVE_TYPE,
            attributes_of(fields)?,
        )
        .await
    }

    async fn create_address(&self, fields: &AddressFields) -> Result<String, ProviderError> {
        let url = format!(
            "{}/2010-04-01/Accounts/{}/Addresses.json",
            self.endpoints.api.trim_end_matches('/'),
            fields.account_sid
        );
        let body = self
            .post_form(
                url.clone(),
                &[
                    ("CustomerName", fields.customer_name.clone()),
                    ("Street", fields.street.clone()),
                    ("City", fields.city.clone()),
                    ("Region", fields.region.clone()),
                    ("PostalCode", fields.postal_code.clone()),
                    ("IsoCountry", fields.iso_country.clone()),
                    ("FriendlyName", fields.friendly_name.clone()),
                ],
            )
            .await?;
        string_field(&body, "sid", &url)
    }

    async fn create_supporting_document(
        &self,
        address_sid: &str,
        fields: &SupportingDocumentFields,
    ) -> Result<String, ProviderError> {
        let url = self.trusthub("SupportingDocuments");
        let attributes = serde_json::json!({ "address_sids": address_sid });
        let body = self
            .post_form(
                url.clone(),
                &[
                    ("FriendlyName", fields.friendly_name.clone()),
                    ("Type", ADDRESS_DOCUMENT_TYPE.to_string()),
                    ("Attributes", attributes.to_string()),
                ],
            )
            .await?;
        string_field(&body, "sid", &url)
    }

    async fn attach_to_profile(
        &self,
        profile_sid: &str,
        object_sid: &str,
    ) -> Result<(), ProviderError> {
        let url = self.trusthub(&format!("CustomerProfiles/{profile_sid}/EntityAssignments"));
        self.post_form(url, &[("ObjectSid", object_sid.to_string())])
            .await?;
        Ok(())
    }

    async fn evaluate_profile(
        &self,
        profile_sid: &str,
        policy_sid: &str,
    ) -> Result<(), ProviderError> {
        let url = self.trusthub(&format!("CustomerProfiles/{profile_sid}/Evaluations"));
        let body = self
            .post_form(url, &[("PolicySid", policy_sid.to_string())])
            .await?;
        debug!(
            profile_sid,
            evaluation = body.get("status").and_then(|s| s.as_str()).unwrap_or("unknown"),
            "Customer profile evaluated"
        );
        Ok(())
    }

    async fn submit_profile_for_review(&self, profile_sid: &str) -> Result<(), ProviderError> {
        let url = self.trusthub(&format!("CustomerProfiles/{profile_sid}"));
        self.post_form(url, &[("Status", PENDING_REVIEW.to_string())])
            .await?;
        Ok(())
    }

    async fn create_trust_product(
        &self,
        fields: &TrustProductFields,
    ) -> Result<String, ProviderError> {
        let url = self.trusthub("TrustProducts");
        let body = self
            .post_form(
                url.clone(),
                &[
                    ("FriendlyName", fields.friendly_name.clone()),
                    ("Email", fields.email.clone()),
                    ("PolicySid", fields.policy_sid.clone()),
                    ("StatusCallback", fields.status_callback.clone()),
                ],
            )
            .await?;
        string_field(&body, "sid", &url)
    }

    async fn create_messaging_profile(
        &self,
        fields: &MessagingProfileFields,
    ) -> Result<String, ProviderError> {
        self.create_end_user(
            format!("{} - Messaging Profile", fields.company_type),
            MESSAGING_PROFILE_TYPE,
            attributes_of(fields)?,
        )
        .await
    }

    async fn attach_to_trust_product(
        &self,
        trust_product_sid: &str,
        object_sid: &str,
    ) -> Result<(), ProviderError> {
        let url = self.trusthub(&format!("TrustProducts/{trust_product_sid}/EntityAssignments"));
        self.post_form(url, &[("ObjectSid", object_sid.to_string())])
            .await?;
        Ok(())
    }

    async fn evaluate_trust_product(
        &self,
        trust_product_sid: &str,
        policy_sid: &str,
    ) -> Result<(), ProviderError> {
        let url = self.trusthub(&format!("TrustProducts/{trust_product_sid}/Evaluations"));
        let body = self
            .post_form(url, &[("PolicySid", policy_sid.to_string())])
            .await?;
        debug!(
            trust_product_sid,
            evaluation = body.get("status").and_then(|s| s.as_str()).unwrap_or("unknown"),
            "Trust product evaluated"
        );
        Ok(())
    }

    async fn submit_trust_product_for_review(
        &self,
        trust_product_sid: &str,
    ) -> Result<(), ProviderError> {
        let url = self.trusthub(&format!("TrustProducts/{trust_product_sid}"));
        self.post_form(url, &[("Status", PENDING_REVIEW.to_string())])
            .await?;
        Ok(())
    }

    async fn create_brand_registration(
        &self,
        profile_sid: &str,
        trust_product_sid: &str,
    ) -> Result<BrandRegistration, ProviderError> {
        let url = self.messaging("a2p/BrandRegistrations");
        let body = self
            .post_form(
                url.clone(),
                &[
                    ("CustomerProfileBundleSid", profile_sid.to_string()),
                    ("A2PProfileBundleSid", trust_product_sid.to_string()),
                ],
            )
            .await?;
        Ok(BrandRegistration {
            sid: string_field(&body, "sid", &url)?,
            status: string_field(&body, "status", &url)?,
        })
    }

    async fn fetch_registration_status(
        &self,
        brand_registration_sid: &str,
    ) -> Result<String, ProviderError> {
        let url = self.messaging(&format!("a2p/BrandRegistrations/{brand_registration_sid}"));
        let body = self.get(url.clone(), &[]).await?;
        string_field(&body, "status", &url)
    }

    async fn create_messaging_service(
        &self,
        fields: &MessagingServiceFields,
    ) -> Result<String, ProviderError> {
        let url = self.messaging("Services");
        let body = self
            .post_form(
                url.clone(),
                &[
                    ("FriendlyName", fields.friendly_name.clone()),
                    ("InboundRequestUrl", fields.inbound_request_url.clone()),
                    ("FallbackUrl", fields.fallback_url.clone()),
                ],
            )
            .await?;
        string_field(&body, "sid", &url)
    }

    async fn associate_phone_number(
        &self,
        messaging_service_sid: &str,
        phone_number_sid: &str,
    ) -> Result<(), ProviderError> {
        let url = self.messaging(&format!("Services/{messaging_service_sid}/PhoneNumbers"));
        self.post_form(url, &[("PhoneNumberSid", phone_number_sid.to_string())])
            .await?;
        Ok(())
    }

    async fn create_campaign(
        &self,
        messaging_service_sid: &str,
        brand_registration_sid: &str,
        fields: &CampaignFields,
    ) -> Result<String, ProviderError> {
        let url = self.messaging(&format!(
            "Services/{messaging_service_sid}/Compliance/Usa2p"
        ));
        let mut form = vec![
            ("BrandRegistrationSid", brand_registration_sid.to_string()),
            ("Description", fields.description.clone()),
            ("MessageFlow", fields.message_flow.clone()),
            ("UsAppToPersonUsecase", fields.use_case.clone()),
            ("HasEmbeddedLinks", fields.has_embedded_links.to_string()),
            ("HasEmbeddedPhone", fields.has_embedded_phone.to_string()),
        ];
        form.extend(
            fields
                .message_samples
                .iter()
                .map(|sample| ("MessageSamples", sample.clone())),
        );
        let body = self.post_form(url.clone(), &form).await?;
        string_field(&body, "sid", &url)
    }

    async fn lookup_phone_number_sid(&self, phone_number: &str) -> Result<String, ProviderError> {
        let url = self.account("IncomingPhoneNumbers.json");
        let body = self.get(url.clone(), &[("PhoneNumber", phone_number)]).await?;
        let first = body
            .get("incoming_phone_numbers")
            .and_then(|v| v.as_array())
            .and_then(|numbers| numbers.first());
        match first {
            Some(number) => string_field(number, "sid", &url),
            None => Err(ProviderError::PhoneNumberNotFound {
                phone_number: phone_number.to_string(),
            }),
        }
    }
}
