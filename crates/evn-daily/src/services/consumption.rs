//! Consumption Fetcher
//!
//! Tries info endpoint × consumption endpoint pairs with a credential.
//! A pair counts only when both legs succeed, so customer and
//! consumption data always come from the same API generation.

use chrono::{Duration as ChronoDuration, NaiveDate};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;

use crate::catalog::RegionProfile;
use crate::domain::{Credential, PipelineError, PORTAL_DATE_FORMAT};
use crate::ports::{HttpRequest, HttpTransport, RequestBody};

/// Lookback window ending on a given day (inclusive)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchWindow {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

impl FetchWindow {
    pub fn ending(today: NaiveDate, lookback_days: u32) -> Self {
        Self {
            from: today - ChronoDuration::days(i64::from(lookback_days)),
            to: today,
        }
    }

    pub fn from_label(&self) -> String {
        self.from.format(PORTAL_DATE_FORMAT).to_string()
    }

    pub fn to_label(&self) -> String {
        self.to.format(PORTAL_DATE_FORMAT).to_string()
    }
}

/// Raw payloads of the first accepted pair
#[derive(Debug, Clone, PartialEq)]
pub struct FetchedData {
    pub info: Value,
    pub consumption: Value,
    pub info_endpoint: String,
    pub consumption_endpoint: String,
}

impl FetchedData {
    /// Diagnostic label recorded in the output document
    pub fn endpoint_label(&self) -> String {
        format!("{} + {}", self.info_endpoint, self.consumption_endpoint)
    }
}

/// Data retrieval search over one authenticated domain
pub struct ConsumptionFetcher {
    transport: Arc<dyn HttpTransport>,
    data_timeout: Duration,
}

impl ConsumptionFetcher {
    pub fn new(transport: Arc<dyn HttpTransport>, data_timeout: Duration) -> Self {
        Self {
            transport,
            data_timeout,
        }
    }

    pub async fn fetch(
        &self,
        credential: &Credential,
        profile: &RegionProfile,
        customer_id: &str,
        window: FetchWindow,
    ) -> Option<FetchedData> {
        let base = credential.domain.trim_end_matches('/');
        let info_body = json!({ "ma_khachhang": customer_id });
        let consumption_body = json!({
            "ma_khachhang": customer_id,
            "tu_ngay": window.from_label(),
            "den_ngay": window.to_label(),
        });

        for info_path in &profile.info_endpoints {
            let info_url = format!("{}{}", base, info_path);

            // A failed info leg rejects every pair built on it
            let info = match self.call(credential, &info_url, &info_body).await {
                Ok(info) => info,
                Err(e) => {
                    tracing::warn!("⚠️  [{}] {}", e.stage(), e);
                    continue;
                }
            };

            for consumption_path in &profile.consumption_endpoints {
                let consumption_url = format!("{}{}", base, consumption_path);
                tracing::info!("🔍 Trying data pair {} + {}", info_url, consumption_path);

                match self
                    .call(credential, &consumption_url, &consumption_body)
                    .await
                {
                    Ok(consumption) => {
                        tracing::info!("✅ Data retrieved from {} + {}", info_url, consumption_path);
                        return Some(FetchedData {
                            info,
                            consumption,
                            info_endpoint: info_url,
                            consumption_endpoint: consumption_url,
                        });
                    }
                    Err(e) => {
                        tracing::warn!(
                            "⚠️  Partial data rejected ({} ok, consumption failed): {}",
                            info_path,
                            e
                        );
                    }
                }
            }
        }

        tracing::warn!("❌ No endpoint pair on {} returned complete data", base);
        None
    }

    async fn call(
        &self,
        credential: &Credential,
        url: &str,
        body: &Value,
    ) -> Result<Value, PipelineError> {
        let request = HttpRequest::post(url, RequestBody::Json(body.clone()), self.data_timeout)
            .header("Authorization", credential.bearer())
            .header("Content-Type", "application/json");

        let response = self
            .transport
            .send(request)
            .await
            .map_err(|e| PipelineError::Transport {
                url: url.to_string(),
                message: e.message,
            })?;

        if !response.is_success() {
            return Err(PipelineError::Transport {
                url: url.to_string(),
                message: format!("HTTP {}", response.status),
            });
        }

        response.json().map_err(|e| PipelineError::malformed(url, e))
    }
}
