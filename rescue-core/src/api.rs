//! Simulated backend.
//!
//! [`MockRescueApi`] serves the built-in fixtures after a configurable delay
//! and accepts every well-formed report, notifying all partner shelters.

use async_trait::async_trait;
use uuid::Uuid;

use crate::catalog::{
    Campaign, CampaignRepository, CatalogResult, Pet, PetRepository, Shelter, ShelterDirectory,
};
use crate::config::{ApiConfig, RescueConfig};
use crate::delay;
use crate::fixtures;
use crate::report::{InjuryReport, ReportSubmitter, SubmissionError, SubmissionReceipt};

/// Message returned with every accepted report.
pub const REPORT_ACCEPTED_MESSAGE: &str = "Report submitted successfully";

/// In-process stand-in for the rescue backend.
#[derive(Debug, Clone)]
pub struct MockRescueApi {
    config: ApiConfig,
    shelters: Vec<Shelter>,
    pets: Vec<Pet>,
    campaigns: Vec<Campaign>,
}

impl MockRescueApi {
    /// Backend serving the built-in fixtures.
    #[must_use]
    pub fn new(config: ApiConfig) -> Self {
        Self {
            config,
            shelters: fixtures::shelters(),
            pets: fixtures::pets(),
            campaigns: fixtures::campaigns(),
        }
    }

    /// Backend configured from the `api` section.
    #[must_use]
    pub fn from_config(config: &RescueConfig) -> Self {
        Self::new(config.api.clone())
    }

    /// Replace the shelter list.
    #[must_use]
    pub fn with_shelters(mut self, shelters: Vec<Shelter>) -> Self {
        self.shelters = shelters;
        self
    }

    /// Active configuration.
    #[must_use]
    pub fn config(&self) -> &ApiConfig {
        &self.config
    }
}

impl Default for MockRescueApi {
    fn default() -> Self {
        Self::new(ApiConfig::default())
    }
}

#[async_trait(?Send)]
impl ReportSubmitter for MockRescueApi {
    async fn submit_report(
        &self,
        report: &InjuryReport,
    ) -> Result<SubmissionReceipt, SubmissionError> {
        delay::sleep(self.config.report_latency()).await;

        if self.config.fail_reports {
            tracing::warn!("report service configured to reject submissions");
            return Err(SubmissionError::Rejected(
                "report service unavailable".to_string(),
            ));
        }

        let report_id = Uuid::new_v4();
        tracing::info!(
            %report_id,
            location = %report.location,
            contact_phone = %report.contact_phone,
            image_bytes = report.image.len(),
            "Injury report submitted"
        );
        Ok(SubmissionReceipt {
            success: true,
            message: REPORT_ACCEPTED_MESSAGE.to_string(),
            shelters_notified: u32::try_from(self.shelters.len()).unwrap_or(u32::MAX),
            report_id,
        })
    }
}

#[async_trait(?Send)]
impl PetRepository for MockRescueApi {
    async fn pets_for_adoption(&self) -> CatalogResult<Vec<Pet>> {
        delay::sleep(self.config.listing_latency()).await;
        Ok(self.pets.iter().filter(|p| p.for_adoption).cloned().collect())
    }
}

#[async_trait(?Send)]
impl CampaignRepository for MockRescueApi {
    async fn campaigns(&self) -> CatalogResult<Vec<Campaign>> {
        delay::sleep(self.config.listing_latency()).await;
        Ok(self.campaigns.clone())
    }
}

impl ShelterDirectory for MockRescueApi {
    fn shelters(&self) -> &[Shelter] {
        &self.shelters
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::catalog::{CatalogError, PetKind, PetQuery};
    use crate::geolocation::Coordinate;
    use crate::media::CapturedImage;

    fn report() -> InjuryReport {
        InjuryReport {
            image: CapturedImage::from_data_url("data:image/jpeg;base64,AAA").unwrap(),
            description: "Limping near the beach road".into(),
            contact_name: String::new(),
            contact_phone: "9876543210".into(),
            location: Coordinate::new(17.6868, 83.2185).unwrap(),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn report_resolves_after_latency() {
        let api = MockRescueApi::default();
        let start = tokio::time::Instant::now();
        let receipt = api.submit_report(&report()).await.unwrap();
        assert!(start.elapsed() >= Duration::from_secs(2));
        assert!(receipt.success);
        assert_eq!(receipt.shelters_notified, 3);
        assert_eq!(receipt.message, REPORT_ACCEPTED_MESSAGE);
    }

    #[tokio::test]
    async fn report_ids_are_unique() {
        let api = MockRescueApi::new(ApiConfig::instant());
        let a = api.submit_report(&report()).await.unwrap();
        let b = api.submit_report(&report()).await.unwrap();
        assert_ne!(a.report_id, b.report_id);
    }

    #[tokio::test]
    async fn shelter_count_follows_directory() {
        let api = MockRescueApi::new(ApiConfig::instant())
            .with_shelters(fixtures::shelters().into_iter().take(1).collect());
        let receipt = api.submit_report(&report()).await.unwrap();
        assert_eq!(receipt.shelters_notified, 1);
    }

    #[tokio::test]
    async fn failing_config_rejects() {
        let api = MockRescueApi::new(ApiConfig {
            fail_reports: true,
            ..ApiConfig::instant()
        });
        assert!(matches!(
            api.submit_report(&report()).await,
            Err(SubmissionError::Rejected(_))
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn listings_resolve_after_latency() {
        let api = MockRescueApi::default();
        let start = tokio::time::Instant::now();
        assert_eq!(api.pets_for_adoption().await.unwrap().len(), 6);
        assert_eq!(api.campaigns().await.unwrap().len(), 4);
        assert!(start.elapsed() >= Duration::from_secs(2));
    }

    #[tokio::test]
    async fn default_repository_methods() {
        let api = MockRescueApi::new(ApiConfig::instant());
        assert_eq!(api.featured_pets(3).await.unwrap().len(), 3);
        assert_eq!(api.featured_campaigns(2).await.unwrap()[1].title, "Shelter Expansion Project");
        assert_eq!(api.pet("5").await.unwrap().name, "Oliver");
        assert_eq!(
            api.pet("99").await,
            Err(CatalogError::NotFound("99".into()))
        );
        let cats = api.search_pets(&PetQuery::new("", PetKind::Cat)).await.unwrap();
        assert_eq!(cats.len(), 2);
    }
}
