//! Acquisition Pipeline
//!
//! RegionResolver → EndpointNegotiator → AuthNegotiator →
//! ConsumptionFetcher → ResultAssembler, walking the region fallback
//! chain. When every live path fails the run degrades to synthetic data,
//! so a document is always produced unless synthesis itself is
//! misconfigured.

use chrono::NaiveDate;
use std::sync::Arc;

use crate::catalog::CandidateCatalog;
use crate::config::{AccountConfig, HouseholdConfig, Settings};
use crate::domain::{CustomerInfo, PipelineError, Region, ResultDocument};
use crate::ports::{HttpTransport, JitterSource};
use crate::services::assembler::{records_from_raw, Provenance, ResultAssembler};
use crate::services::auth::AuthNegotiator;
use crate::services::consumption::{ConsumptionFetcher, FetchWindow};
use crate::services::endpoint::{EndpointNegotiator, ReachabilityPolicy};
use crate::services::region::RegionResolver;
use crate::services::synthetic::SyntheticDataGenerator;

pub struct AcquisitionPipeline {
    resolver: RegionResolver,
    catalog: CandidateCatalog,
    endpoints: EndpointNegotiator,
    auth: AuthNegotiator,
    fetcher: ConsumptionFetcher,
    generator: SyntheticDataGenerator,
    assembler: ResultAssembler,
    account: AccountConfig,
    household: HouseholdConfig,
    synthetic_days: u32,
    lookback_days: u32,
}

impl AcquisitionPipeline {
    pub fn new(
        settings: &Settings,
        transport: Arc<dyn HttpTransport>,
        jitter: Box<dyn JitterSource>,
    ) -> Self {
        let catalog = settings.catalog();
        let network = &settings.network;

        Self {
            resolver: RegionResolver::new(settings.regions.clone()),
            endpoints: EndpointNegotiator::new(
                transport.clone(),
                ReachabilityPolicy::new(network.reachable_statuses.clone()),
                network.probe_timeout(),
            ),
            auth: AuthNegotiator::new(
                transport.clone(),
                catalog.encodings.clone(),
                network.login_timeout(),
            ),
            fetcher: ConsumptionFetcher::new(transport, network.data_timeout()),
            generator: SyntheticDataGenerator::new(
                jitter,
                settings.pricing.seasonal_factor,
                settings.pricing.unit_price,
            ),
            assembler: ResultAssembler::new(),
            catalog,
            account: settings.account.clone(),
            household: settings.household.clone(),
            synthetic_days: settings.pricing.synthetic_days,
            lookback_days: network.lookback_days,
        }
    }

    /// Region tried first: the configured hint, else prefix detection
    pub fn primary_region(&self) -> Region {
        self.resolver
            .resolve_with_hint(&self.account.customer_id, self.account.region)
    }

    /// Live retrieval with synthetic fallback
    pub async fn run(&mut self, today: NaiveDate) -> Result<ResultDocument, PipelineError> {
        let primary = self.primary_region();
        tracing::info!(
            "🔍 Customer {} resolved to region {}",
            self.account.customer_id,
            primary
        );

        if self.account.has_credentials() {
            for region in self.catalog.region_chain(primary) {
                match self.acquire_live(region, today).await {
                    Ok(document) => return Ok(document),
                    Err(e) => {
                        tracing::warn!(stage = e.stage(), %region, "⚠️  Live retrieval failed: {}", e);
                    }
                }
            }
        } else {
            tracing::warn!("⚠️  No portal credentials configured, skipping live retrieval");
        }

        tracing::warn!("⚠️  Falling back to generated data");
        let provenance = Provenance::fallback(primary, &self.account.customer_id);
        self.synthesize(provenance, today)
    }

    /// Synthetic document without touching the network.
    ///
    /// `pinned` tags the document as a reproducible mock series.
    pub fn run_demo(
        &mut self,
        today: NaiveDate,
        pinned: bool,
    ) -> Result<ResultDocument, PipelineError> {
        let provenance =
            Provenance::demo(self.primary_region(), &self.account.customer_id, pinned);
        self.synthesize(provenance, today)
    }

    /// One region, end to end. Every error here is recoverable.
    pub async fn acquire_live(
        &self,
        region: Region,
        today: NaiveDate,
    ) -> Result<ResultDocument, PipelineError> {
        let unreachable = || PipelineError::Unreachable {
            region: region.to_string(),
        };
        let profile = self.catalog.profile(region).ok_or_else(unreachable)?;

        let domain = self
            .endpoints
            .find_reachable_domain(&profile.domains)
            .await
            .ok_or_else(unreachable)?;

        let credential = self
            .auth
            .authenticate(
                &domain,
                profile,
                &self.account.username,
                &self.account.password,
            )
            .await
            .ok_or_else(|| PipelineError::AuthRejected {
                domain: domain.clone(),
            })?;

        let customer_id = &self.account.customer_id;
        let fetched = self
            .fetcher
            .fetch(
                &credential,
                profile,
                customer_id,
                FetchWindow::ending(today, self.lookback_days),
            )
            .await
            .ok_or_else(|| PipelineError::PartialDataRejected {
                domain: domain.clone(),
            })?;

        let records = records_from_raw(
            &fetched.consumption,
            self.generator.unit_price(),
            &fetched.consumption_endpoint,
        )?;
        if records.is_empty() {
            return Err(PipelineError::malformed(
                &fetched.consumption_endpoint,
                "empty record list",
            ));
        }

        let info = CustomerInfo::from_raw(&fetched.info, customer_id);
        let document = self.assembler.assemble(
            Provenance::live(region, customer_id, fetched.endpoint_label()),
            info,
            records,
        )?;

        tracing::info!(
            "✅ Live data: {} days from {}",
            document.summary.days_count,
            fetched.endpoint_label()
        );
        Ok(document)
    }

    fn synthesize(
        &mut self,
        provenance: Provenance,
        today: NaiveDate,
    ) -> Result<ResultDocument, PipelineError> {
        let records = self.generator.generate(today, self.synthetic_days)?;
        let info = self.household_info();
        let document = self.assembler.assemble(provenance, info, records)?;

        tracing::info!(
            "🎲 Generated {} days ({} kWh total)",
            document.summary.days_count,
            document.summary.total_consumption_kwh
        );
        Ok(document)
    }

    fn household_info(&self) -> CustomerInfo {
        CustomerInfo {
            customer_code: self.account.customer_id.clone(),
            name: self
                .household
                .name
                .as_ref()
                .map(|name| format!("{} (Demo)", name)),
            address: self.household.address.clone(),
            meter_code: self.household.meter_code.clone(),
            phone: self.household.phone.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{round1, DataSource, RunStatus};
    use crate::ports::{HttpResponse, Method, MockHttpTransport, TransportError};
    use crate::services::synthetic::{FixedJitter, RandomJitter};

    fn settings() -> Settings {
        let mut settings = Settings::default();
        settings.account = AccountConfig {
            username: "0906658599".to_string(),
            password: "secret".to_string(),
            customer_id: "PE0400065097".to_string(),
            region: None,
        };
        settings.household.name = Some("Nguyen Van Minh".to_string());
        settings
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 7, 7).unwrap()
    }

    fn offline_transport(expected_calls: usize) -> MockHttpTransport {
        let mut mock = MockHttpTransport::new();
        mock.expect_send()
            .times(expected_calls)
            .returning(|req| Err(TransportError::timeout(format!("{} timed out", req.url))));
        mock
    }

    #[tokio::test]
    async fn test_offline_run_falls_back_to_synthetic_week() {
        // three HCMC domains, then three HANOI domains
        let mut pipeline = AcquisitionPipeline::new(
            &settings(),
            Arc::new(offline_transport(6)),
            Box::new(RandomJitter::seeded(2025)),
        );
        assert_eq!(pipeline.primary_region(), Region::EvnHcmc);

        let document = pipeline.run(today()).await.unwrap();

        assert_eq!(document.source, DataSource::Synthetic);
        assert_eq!(document.status, RunStatus::Mock);
        assert_eq!(document.region, Region::EvnHcmc);
        assert_eq!(document.daily_data.len(), 7);
        let sum: f64 = document.daily_data.iter().map(|r| r.consumption_kwh).sum();
        assert_eq!(document.summary.total_consumption_kwh, round1(sum));
        assert_eq!(
            document.customer_info.name.as_deref(),
            Some("Nguyen Van Minh (Demo)")
        );
        assert!(document.endpoint.is_none());
    }

    #[tokio::test]
    async fn test_fixed_jitter_fallback_is_still_synthetic() {
        let mut pipeline = AcquisitionPipeline::new(
            &settings(),
            Arc::new(offline_transport(6)),
            Box::new(FixedJitter::neutral()),
        );
        let document = pipeline.run(today()).await.unwrap();
        assert_eq!(document.status, RunStatus::Mock);
        assert_eq!(document.source, DataSource::Synthetic);
        assert_eq!(document.daily_data.len(), 7);
        assert_eq!(document.daily_data[0].consumption_kwh, 18.2);
    }

    #[tokio::test]
    async fn test_missing_credentials_skip_network() {
        let mut settings = settings();
        settings.account.password.clear();

        let mut pipeline = AcquisitionPipeline::new(
            &settings,
            Arc::new(offline_transport(0)),
            Box::new(FixedJitter::neutral()),
        );
        let document = pipeline.run(today()).await.unwrap();
        assert_eq!(document.status, RunStatus::Mock);
    }

    #[tokio::test]
    async fn test_live_path_produces_success_document() {
        let mut mock = MockHttpTransport::new();
        mock.expect_send().returning(|req| match (req.method, req.url.as_str()) {
            (Method::Get, "https://cskh.evnhcmc.vn/") => Ok(HttpResponse::new(200, "<html>")),
            (Method::Post, "https://cskh.evnhcmc.vn/api/token") => {
                Ok(HttpResponse::new(200, r#"{"access_token":"live-token"}"#))
            }
            (Method::Post, "https://cskh.evnhcmc.vn/api/customer/info") => Ok(HttpResponse::new(
                200,
                r#"{"ten_khachhang":"Nguyen Van Minh","ma_congto":"CT065097"}"#,
            )),
            (Method::Post, "https://cskh.evnhcmc.vn/api/consumption/daily") => {
                Ok(HttpResponse::new(
                    200,
                    r#"{"data":[{"ngay":"06/07/2025","san_luong":12.0},{"ngay":"07/07/2025","san_luong":14.0}]}"#,
                ))
            }
            _ => Ok(HttpResponse::new(404, "")),
        });

        let mut pipeline = AcquisitionPipeline::new(
            &settings(),
            Arc::new(mock),
            Box::new(FixedJitter::neutral()),
        );
        let document = pipeline.run(today()).await.unwrap();

        assert_eq!(document.status, RunStatus::Success);
        assert_eq!(document.source, DataSource::Live);
        assert_eq!(document.customer_info.name.as_deref(), Some("Nguyen Van Minh"));
        assert_eq!(document.daily_data.len(), 2);
        assert_eq!(document.daily_data[0].date, today());
        assert_eq!(document.summary.total_consumption_kwh, 26.0);
        assert_eq!(
            document.endpoint.as_deref(),
            Some("https://cskh.evnhcmc.vn/api/customer/info + https://cskh.evnhcmc.vn/api/consumption/daily")
        );
    }

    #[tokio::test]
    async fn test_demo_never_touches_network() {
        let mut pipeline = AcquisitionPipeline::new(
            &settings(),
            Arc::new(offline_transport(0)),
            Box::new(RandomJitter::seeded(1)),
        );
        let document = pipeline.run_demo(today(), false).unwrap();
        assert_eq!(document.status, RunStatus::Demo);
        assert_eq!(document.source, DataSource::Synthetic);
    }

    #[tokio::test]
    async fn test_pinned_demo_is_tagged_mock() {
        let mut pipeline = AcquisitionPipeline::new(
            &settings(),
            Arc::new(offline_transport(0)),
            Box::new(FixedJitter::neutral()),
        );
        let document = pipeline.run_demo(today(), true).unwrap();
        assert_eq!(document.status, RunStatus::Demo);
        assert_eq!(document.source, DataSource::Mock);
        assert_eq!(document.daily_data[0].consumption_kwh, 18.2);
    }

    #[tokio::test]
    async fn test_invalid_synthetic_settings_are_fatal() {
        let mut settings = settings();
        settings.pricing.synthetic_days = 0;

        let mut pipeline = AcquisitionPipeline::new(
            &settings,
            Arc::new(offline_transport(6)),
            Box::new(FixedJitter::neutral()),
        );
        let err = pipeline.run(today()).await.unwrap_err();
        assert!(matches!(err, PipelineError::SynthesisFailure(_)));
        assert!(err.is_fatal());
    }
}
