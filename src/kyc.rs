use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::errors::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct KycResult {
    pub success: bool,
}

/// Checks a browser credential assertion with an identity provider.
#[async_trait]
pub trait KycVerifier: Send + Sync {
    async fn verify(&self, assertion: &serde_json::Value) -> Result<KycResult, AppError>;
}

/// Forwards the assertion unchanged and reads `{success}` back.
pub struct HostedKycVerifier {
    http: reqwest::Client,
    url: String,
}

impl HostedKycVerifier {
    pub fn new(http: reqwest::Client, url: impl Into<String>) -> Self {
        Self {
            http,
            url: url.into(),
        }
    }
}

#[async_trait]
impl KycVerifier for HostedKycVerifier {
    async fn verify(&self, assertion: &serde_json::Value) -> Result<KycResult, AppError> {
        let res = self.http.post(&self.url).json(assertion).send().await?;
        if !res.status().is_success() {
            tracing::warn!("KYC provider rejected assertion with {}", res.status());
            return Ok(KycResult { success: false });
        }
        res.json::<KycResult>()
            .await
            .map_err(|e| AppError::Deserialization(e.to_string()))
    }
}

/// Used when no provider is configured. Never verifies anyone.
pub struct OfflineKycVerifier;

#[async_trait]
impl KycVerifier for OfflineKycVerifier {
    async fn verify(&self, _assertion: &serde_json::Value) -> Result<KycResult, AppError> {
        Ok(KycResult { success: false })
    }
}
