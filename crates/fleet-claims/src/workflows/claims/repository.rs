use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::domain::{ClaimId, ClaimStatus, ClaimSubmission};
use super::health::HealthReport;
use super::pricing::CostBreakdown;
use super::settlement::SettlementResult;
use super::views::money;

/// Repository record holding the submission and every derived result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClaimRecord {
    pub claim_id: ClaimId,
    pub submission: ClaimSubmission,
    pub status: ClaimStatus,
    pub estimate: Option<CostBreakdown>,
    pub health: Option<HealthReport>,
    pub settlement: Option<SettlementResult>,
}

impl ClaimRecord {
    pub fn status_view(&self) -> ClaimStatusView {
        ClaimStatusView {
            claim_id: self.claim_id.clone(),
            registration: self.submission.vehicle.registration.clone(),
            status: self.status.label(),
            grand_total: self
                .estimate
                .as_ref()
                .map(|estimate| money(estimate.grand_total)),
            health_index: self
                .health
                .as_ref()
                .map(|health| health.index.round_dp(1)),
            settlement_amount: self
                .settlement
                .as_ref()
                .map(|settlement| money(settlement.settlement_amount)),
            recommendation: self
                .settlement
                .as_ref()
                .map(|settlement| settlement.recommendation.label()),
        }
    }
}

/// Storage abstraction so the service module can be exercised in isolation.
pub trait ClaimRepository: Send + Sync {
    fn insert(&self, record: ClaimRecord) -> Result<ClaimRecord, RepositoryError>;
    fn update(&self, record: ClaimRecord) -> Result<(), RepositoryError>;
    fn fetch(&self, id: &ClaimId) -> Result<Option<ClaimRecord>, RepositoryError>;
    fn with_status(
        &self,
        status: ClaimStatus,
        limit: usize,
    ) -> Result<Vec<ClaimRecord>, RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

/// Outbound hook for claims-handling notifications (e-mail, policy admin system).
pub trait ClaimNotifier: Send + Sync {
    fn publish(&self, notice: ClaimNotice) -> Result<(), NotifierError>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimNotice {
    pub template: String,
    pub claim_id: ClaimId,
    pub details: BTreeMap<String, String>,
}

#[derive(Debug, thiserror::Error)]
pub enum NotifierError {
    #[error("notification transport unavailable: {0}")]
    Transport(String),
}

/// Presentation summary of a claim, amounts rounded for display.
#[derive(Debug, Clone, Serialize)]
pub struct ClaimStatusView {
    pub claim_id: ClaimId,
    pub registration: String,
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grand_total: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub health_index: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub settlement_amount: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recommendation: Option<&'static str>,
}
