//! Google Sign-In assertion verification for Wicket.
//!
//! Implements [`wicket_auth::IdentityVerifier`] for Google:
//! - ID-token introspection via Google's `tokeninfo` endpoint
//! - audience / `issued_to` / remaining-lifetime checks against the client ID
//! - company-domain policy on the verified email
//!
//! Checks short-circuit in that order; the first failure is the one reported.

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use serde::Deserialize;

use wicket_auth::{DomainPolicy, IdentityVerifier, VerificationError, VerifiedIdentity};

/// Google's token-introspection endpoint.
pub const GOOGLE_TOKENINFO_URL: &str = "https://www.googleapis.com/oauth2/v2/tokeninfo";

/// Response from Google's tokeninfo endpoint. Absent fields default to empty
/// so that they fail the corresponding check instead of the parse.
#[derive(Debug, Default, Deserialize)]
struct TokenInfoResponse {
    #[serde(default)]
    audience: String,
    #[serde(default)]
    issued_to: String,
    #[serde(default)]
    expires_in: i64,
    #[serde(default)]
    email: String,
}

/// Verifies Google ID tokens for one OAuth client.
pub struct GoogleIdentityVerifier {
    client_id: String,
    policy: DomainPolicy,
    tokeninfo_url: String,
    http_client: reqwest::Client,
}

impl GoogleIdentityVerifier {
    /// Create a verifier accepting tokens minted for `client_id` whose email
    /// satisfies `policy`.
    pub fn new(client_id: impl Into<String>, policy: DomainPolicy) -> Self {
        Self {
            client_id: client_id.into(),
            policy,
            tokeninfo_url: GOOGLE_TOKENINFO_URL.to_string(),
            http_client: reqwest::Client::new(),
        }
    }

    /// Point the verifier at another introspection endpoint.
    pub fn with_tokeninfo_url(mut self, url: impl Into<String>) -> Self {
        self.tokeninfo_url = url.into();
        self
    }

    /// Verify a Google ID token, giving up after `deadline`.
    async fn verify_assertion(
        &self,
        assertion: &str,
        deadline: Duration,
    ) -> Result<VerifiedIdentity, VerificationError> {
        if assertion.is_empty() {
            return Err(VerificationError::InvalidAssertion(
                "empty credential".to_string(),
            ));
        }

        let info = tokio::time::timeout(deadline, self.fetch_token_info(assertion))
            .await
            .map_err(|_| {
                VerificationError::UpstreamUnreachable(format!(
                    "tokeninfo did not answer within {deadline:?}"
                ))
            })??;

        let identity = self.check(info)?;
        log::info!("Google token verified for {}", identity.email);
        Ok(identity)
    }

    async fn fetch_token_info(&self, assertion: &str) -> Result<TokenInfoResponse, VerificationError> {
        let url = reqwest::Url::parse_with_params(&self.tokeninfo_url, &[("id_token", assertion)])
            .map_err(|e| {
                VerificationError::UpstreamUnreachable(format!("invalid tokeninfo URL: {e}"))
            })?;

        let response = self.http_client.get(url).send().await.map_err(|e| {
            VerificationError::UpstreamUnreachable(format!("tokeninfo request failed: {e}"))
        })?;

        let status = response.status();
        if status.is_server_error() {
            return Err(VerificationError::UpstreamUnreachable(format!(
                "tokeninfo unavailable (HTTP {status})"
            )));
        }
        if !status.is_success() {
            return Err(VerificationError::InvalidAssertion(format!(
                "Google tokeninfo rejected token (HTTP {status})"
            )));
        }

        response.json().await.map_err(|e| {
            VerificationError::UpstreamUnreachable(format!("tokeninfo response parse failed: {e}"))
        })
    }

    /// Apply the local checks to an introspection result.
    fn check(&self, info: TokenInfoResponse) -> Result<VerifiedIdentity, VerificationError> {
        if info.audience != self.client_id {
            return Err(VerificationError::InvalidAudience {
                got: info.audience,
                expected: self.client_id.clone(),
            });
        }

        if info.issued_to != self.client_id {
            return Err(VerificationError::InvalidIssuer {
                got: info.issued_to,
                expected: self.client_id.clone(),
            });
        }

        if info.expires_in <= 0 {
            return Err(VerificationError::Expired);
        }

        if info.email.is_empty() {
            return Err(VerificationError::MissingEmail);
        }

        if !self.policy.admits(&info.email) {
            return Err(VerificationError::InvalidDomain { email: info.email });
        }

        Ok(VerifiedIdentity {
            email: info.email,
            audience: info.audience,
            issued_to: info.issued_to,
            expires_in: info.expires_in,
        })
    }
}

impl IdentityVerifier for GoogleIdentityVerifier {
    fn verify(
        &self,
        assertion: &str,
        deadline: Duration,
    ) -> Pin<Box<dyn Future<Output = Result<VerifiedIdentity, VerificationError>> + Send + '_>> {
        let assertion = assertion.to_string();
        Box::pin(async move { self.verify_assertion(&assertion, deadline).await })
    }
}
