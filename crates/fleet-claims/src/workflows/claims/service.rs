use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::NaiveDate;
use tracing::{info, warn};

use super::catalog::PricingCatalog;
use super::domain::{ClaimId, ClaimStatus, ClaimSubmission};
use super::pricing::{CostBreakdown, EstimateEngine, EstimateError};
use super::repository::{ClaimNotice, ClaimNotifier, ClaimRecord, ClaimRepository, RepositoryError};
use super::settlement::{SettlementError, SettlementResult};
use super::views::money;

/// Service composing the pricing catalog, repository, and notifier.
pub struct ClaimAssessmentService<R, N> {
    catalog: Arc<PricingCatalog>,
    repository: Arc<R>,
    notifier: Arc<N>,
}

static CLAIM_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_claim_id() -> ClaimId {
    let id = CLAIM_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    ClaimId(format!("clm-{id:06}"))
}

impl<R, N> ClaimAssessmentService<R, N>
where
    R: ClaimRepository + 'static,
    N: ClaimNotifier + 'static,
{
    pub fn new(repository: Arc<R>, notifier: Arc<N>, catalog: Arc<PricingCatalog>) -> Self {
        Self {
            catalog,
            repository,
            notifier,
        }
    }

    pub fn catalog(&self) -> &Arc<PricingCatalog> {
        &self.catalog
    }

    /// Register a new claim. Severities are checked against the active tables up front.
    pub fn submit(&self, submission: ClaimSubmission) -> Result<ClaimRecord, ClaimServiceError> {
        let engine = self.catalog.engine();
        engine.breakdown(&submission.assessment)?;

        let claim_id = next_claim_id();
        let record = ClaimRecord {
            claim_id: claim_id.clone(),
            submission,
            status: ClaimStatus::Submitted,
            estimate: None,
            health: None,
            settlement: None,
        };

        let stored = self.repository.insert(record)?;
        info!(
            claim_id = %claim_id,
            registration = %stored.submission.vehicle.registration,
            "claim submitted"
        );
        Ok(stored)
    }

    /// Price an open claim with the current catalog snapshot and persist the estimate.
    pub fn estimate(&self, claim_id: &ClaimId) -> Result<CostBreakdown, ClaimServiceError> {
        let mut record = self.fetch_open(claim_id)?;
        let breakdown = apply_estimate(&self.catalog.engine(), &mut record)?;
        self.repository.update(record)?;
        Ok(breakdown)
    }

    /// Settle an open claim as of `as_of`, estimating first when needed.
    pub fn settle(
        &self,
        claim_id: &ClaimId,
        as_of: NaiveDate,
    ) -> Result<SettlementResult, ClaimServiceError> {
        let mut record = self.fetch_open(claim_id)?;
        let engine = self.catalog.engine();

        let breakdown = match record.estimate.clone() {
            Some(breakdown) => breakdown,
            None => apply_estimate(&engine, &mut record)?,
        };
        let settlement = engine.settle(&breakdown, &record.submission.valuation, as_of)?;

        record.status = if settlement.is_total_loss {
            ClaimStatus::TotalLoss
        } else {
            ClaimStatus::Settled
        };
        record.settlement = Some(settlement.clone());
        self.repository.update(record)?;

        info!(
            claim_id = %claim_id,
            total_loss = settlement.is_total_loss,
            amount = %money(settlement.settlement_amount),
            "claim settled"
        );

        if settlement.is_total_loss {
            let mut details = BTreeMap::new();
            details.insert(
                "settlement_amount".to_string(),
                money(settlement.settlement_amount).to_string(),
            );
            details.insert(
                "repair_cost".to_string(),
                money(settlement.repair_cost).to_string(),
            );
            // The claim is already closed, so a lost notice must not fail the settlement.
            if let Err(err) = self.notifier.publish(ClaimNotice {
                template: "total_loss_declared".to_string(),
                claim_id: claim_id.clone(),
                details,
            }) {
                warn!(claim_id = %claim_id, error = %err, "total loss notice not delivered");
            }
        }

        Ok(settlement)
    }

    /// Fetch a claim and its current status for API responses.
    pub fn get(&self, claim_id: &ClaimId) -> Result<ClaimRecord, ClaimServiceError> {
        let record = self
            .repository
            .fetch(claim_id)?
            .ok_or(RepositoryError::NotFound)?;
        Ok(record)
    }

    fn fetch_open(&self, claim_id: &ClaimId) -> Result<ClaimRecord, ClaimServiceError> {
        let record = self.get(claim_id)?;
        if record.status.is_closed() {
            warn!(claim_id = %claim_id, status = record.status.label(), "claim already closed");
            return Err(ClaimServiceError::InvalidTransition {
                claim_id: claim_id.clone(),
                status: record.status,
            });
        }
        Ok(record)
    }
}

fn apply_estimate(
    engine: &EstimateEngine,
    record: &mut ClaimRecord,
) -> Result<CostBreakdown, ClaimServiceError> {
    let breakdown = engine.breakdown(&record.submission.assessment)?;
    let health = engine.health(&record.submission.assessment)?;

    info!(
        claim_id = %record.claim_id,
        grand_total = %money(breakdown.grand_total),
        health_index = %health.index.round_dp(1),
        "claim estimated"
    );

    record.status = ClaimStatus::Estimated;
    record.estimate = Some(breakdown.clone());
    record.health = Some(health);
    Ok(breakdown)
}

/// Error raised by the claim assessment service.
#[derive(Debug, thiserror::Error)]
pub enum ClaimServiceError {
    #[error(transparent)]
    Estimate(#[from] EstimateError),
    #[error(transparent)]
    Settlement(#[from] SettlementError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error("claim {claim_id} is already {status:?} and cannot change")]
    InvalidTransition {
        claim_id: ClaimId,
        status: ClaimStatus,
    },
}
