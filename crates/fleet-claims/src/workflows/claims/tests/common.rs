use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::response::Response;
use chrono::NaiveDate;
use rust_decimal_macros::dec;
use serde_json::Value;

use crate::workflows::claims::catalog::PricingCatalog;
use crate::workflows::claims::domain::{
    ClaimId, ClaimStatus, ClaimSubmission, ComponentAssessment, DamageAssessment, DamageSection,
    VehicleDescriptor, VehicleValuation,
};
use crate::workflows::claims::pricing::{EstimateEngine, PricingConfig};
use crate::workflows::claims::repository::{
    ClaimNotice, ClaimNotifier, ClaimRecord, ClaimRepository, NotifierError, RepositoryError,
};
use crate::workflows::claims::{claims_router, ClaimAssessmentService};

pub(super) fn pricing_config() -> PricingConfig {
    PricingConfig::standard()
}

pub(super) fn engine() -> EstimateEngine {
    EstimateEngine::new(pricing_config()).expect("standard tables are valid")
}

pub(super) fn as_of() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 10, 1).expect("valid date")
}

pub(super) fn exterior_light_damage() -> ComponentAssessment {
    ComponentAssessment::new()
        .with("hood", "light")
        .with("front_bumper", "light")
}

pub(super) fn engine_failure() -> ComponentAssessment {
    ComponentAssessment::new().with("engine_block", "failed")
}

/// Exterior light damage only: grand total 1693.71.
pub(super) fn cosmetic_assessment() -> DamageAssessment {
    DamageAssessment::new().with_section(DamageSection::Exterior, exterior_light_damage())
}

/// Exterior light damage plus a failed engine: grand total 18254.43.
pub(super) fn major_assessment() -> DamageAssessment {
    cosmetic_assessment().with_section(DamageSection::Mechanical, engine_failure())
}

pub(super) fn valuation() -> VehicleValuation {
    VehicleValuation {
        market_value: Some(dec!(20000)),
        manufacture_year: 2021,
        salvage_value: Some(dec!(2500)),
        deductible: None,
    }
}

pub(super) fn vehicle() -> VehicleDescriptor {
    VehicleDescriptor {
        registration: "AB21 CDE".to_string(),
        make: "Ford".to_string(),
        model: "Transit Custom".to_string(),
    }
}

pub(super) fn submission() -> ClaimSubmission {
    ClaimSubmission {
        vehicle: vehicle(),
        valuation: valuation(),
        assessment: cosmetic_assessment(),
    }
}

pub(super) fn total_loss_submission() -> ClaimSubmission {
    ClaimSubmission {
        assessment: major_assessment(),
        ..submission()
    }
}

pub(super) fn invalid_severity_submission() -> ClaimSubmission {
    let mut submission = submission();
    submission
        .assessment
        .section_mut(DamageSection::Exterior)
        .set("roof", "crumpled");
    submission
}

pub(super) fn unvalued_submission() -> ClaimSubmission {
    let mut submission = submission();
    submission.valuation.market_value = None;
    submission
}

#[derive(Default, Clone)]
pub(super) struct MemoryRepository {
    records: Arc<Mutex<HashMap<ClaimId, ClaimRecord>>>,
}

impl MemoryRepository {
    pub(super) fn len(&self) -> usize {
        self.records.lock().expect("repository mutex poisoned").len()
    }
}

impl ClaimRepository for MemoryRepository {
    fn insert(&self, record: ClaimRecord) -> Result<ClaimRecord, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        if guard.contains_key(&record.claim_id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(record.claim_id.clone(), record.clone());
        Ok(record)
    }

    fn update(&self, record: ClaimRecord) -> Result<(), RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        if guard.contains_key(&record.claim_id) {
            guard.insert(record.claim_id.clone(), record);
            Ok(())
        } else {
            Err(RepositoryError::NotFound)
        }
    }

    fn fetch(&self, id: &ClaimId) -> Result<Option<ClaimRecord>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn with_status(
        &self,
        status: ClaimStatus,
        limit: usize,
    ) -> Result<Vec<ClaimRecord>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard
            .values()
            .filter(|record| record.status == status)
            .take(limit)
            .cloned()
            .collect())
    }
}

#[derive(Default, Clone)]
pub(super) struct MemoryNotifier {
    events: Arc<Mutex<Vec<ClaimNotice>>>,
}

impl ClaimNotifier for MemoryNotifier {
    fn publish(&self, notice: ClaimNotice) -> Result<(), NotifierError> {
        self.events
            .lock()
            .expect("notifier mutex poisoned")
            .push(notice);
        Ok(())
    }
}

impl MemoryNotifier {
    pub(super) fn events(&self) -> Vec<ClaimNotice> {
        self.events.lock().expect("notifier mutex poisoned").clone()
    }
}

pub(super) struct OfflineNotifier;

impl ClaimNotifier for OfflineNotifier {
    fn publish(&self, _notice: ClaimNotice) -> Result<(), NotifierError> {
        Err(NotifierError::Transport("mail relay offline".to_string()))
    }
}

pub(super) struct ConflictRepository;

impl ClaimRepository for ConflictRepository {
    fn insert(&self, _record: ClaimRecord) -> Result<ClaimRecord, RepositoryError> {
        Err(RepositoryError::Conflict)
    }

    fn update(&self, _record: ClaimRecord) -> Result<(), RepositoryError> {
        Err(RepositoryError::Conflict)
    }

    fn fetch(&self, _id: &ClaimId) -> Result<Option<ClaimRecord>, RepositoryError> {
        Ok(None)
    }

    fn with_status(
        &self,
        _status: ClaimStatus,
        _limit: usize,
    ) -> Result<Vec<ClaimRecord>, RepositoryError> {
        Ok(Vec::new())
    }
}

pub(super) struct UnavailableRepository;

impl ClaimRepository for UnavailableRepository {
    fn insert(&self, _record: ClaimRecord) -> Result<ClaimRecord, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn update(&self, _record: ClaimRecord) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn fetch(&self, _id: &ClaimId) -> Result<Option<ClaimRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn with_status(
        &self,
        _status: ClaimStatus,
        _limit: usize,
    ) -> Result<Vec<ClaimRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

pub(super) fn build_service() -> (
    ClaimAssessmentService<MemoryRepository, MemoryNotifier>,
    Arc<MemoryRepository>,
    Arc<MemoryNotifier>,
) {
    let repository = Arc::new(MemoryRepository::default());
    let notifier = Arc::new(MemoryNotifier::default());
    let service = ClaimAssessmentService::new(
        repository.clone(),
        notifier.clone(),
        Arc::new(PricingCatalog::standard()),
    );
    (service, repository, notifier)
}

pub(super) fn claims_router_with_service(
    service: ClaimAssessmentService<MemoryRepository, MemoryNotifier>,
) -> axum::Router {
    claims_router(Arc::new(service))
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 16 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
