use super::common::*;
use rust_decimal_macros::dec;
use std::sync::Arc;

use crate::workflows::claims::catalog::PricingCatalog;
use crate::workflows::claims::domain::{ClaimId, ClaimStatus};
use crate::workflows::claims::pricing::{EstimateError, PricingConfig};
use crate::workflows::claims::repository::{ClaimRepository, RepositoryError};
use crate::workflows::claims::settlement::{SettlementError, SettlementRecommendation};
use crate::workflows::claims::{ClaimAssessmentService, ClaimServiceError};

#[test]
fn submit_rejects_unknown_severity_before_storing() {
    let (service, repository, _) = build_service();

    match service.submit(invalid_severity_submission()) {
        Err(ClaimServiceError::Estimate(EstimateError::InvalidSeverity { component, .. })) => {
            assert_eq!(component, "roof")
        }
        other => panic!("expected invalid severity, got {other:?}"),
    }
    assert_eq!(repository.len(), 0);
}

#[test]
fn submit_assigns_sequential_ids() {
    let (service, repository, _) = build_service();

    let first = service.submit(submission()).expect("first claim");
    let second = service.submit(submission()).expect("second claim");

    assert_ne!(first.claim_id, second.claim_id);
    assert!(first.claim_id.0.starts_with("clm-"));
    assert_eq!(first.status, ClaimStatus::Submitted);
    assert!(first.estimate.is_none());
    assert_eq!(repository.len(), 2);
}

#[test]
fn estimate_stores_breakdown_and_health() {
    let (service, repository, _) = build_service();
    let record = service.submit(submission()).expect("submits");

    let breakdown = service.estimate(&record.claim_id).expect("estimates");
    assert_eq!(breakdown.grand_total, dec!(1693.71));

    let stored = repository
        .fetch(&record.claim_id)
        .expect("fetch")
        .expect("record exists");
    assert_eq!(stored.status, ClaimStatus::Estimated);
    assert_eq!(stored.estimate, Some(breakdown));
    let health = stored.health.expect("health stored");
    assert_eq!(health.index, dec!(97.5));
}

#[test]
fn settle_repairable_claim_without_notice() {
    let (service, repository, notifier) = build_service();
    let record = service.submit(submission()).expect("submits");

    let settlement = service
        .settle(&record.claim_id, as_of())
        .expect("settles");

    assert_eq!(settlement.recommendation, SettlementRecommendation::Repair);
    assert_eq!(settlement.settlement_amount, dec!(1193.71));
    assert!(notifier.events().is_empty());

    let stored = repository
        .fetch(&record.claim_id)
        .expect("fetch")
        .expect("record exists");
    assert_eq!(stored.status, ClaimStatus::Settled);
    assert!(stored.estimate.is_some());
    assert_eq!(stored.settlement, Some(settlement));
}

#[test]
fn settle_total_loss_publishes_notice() {
    let (service, repository, notifier) = build_service();
    let record = service.submit(total_loss_submission()).expect("submits");
    service.estimate(&record.claim_id).expect("estimates");

    let settlement = service
        .settle(&record.claim_id, as_of())
        .expect("settles");
    assert!(settlement.is_total_loss);
    assert_eq!(settlement.settlement_amount, dec!(18800));

    let events = notifier.events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].template, "total_loss_declared");
    assert_eq!(events[0].claim_id, record.claim_id);
    assert_eq!(
        events[0].details.get("settlement_amount").map(String::as_str),
        Some("18800.00")
    );

    let closed = repository
        .with_status(ClaimStatus::TotalLoss, 10)
        .expect("query by status");
    assert_eq!(closed.len(), 1);
}

#[test]
fn total_loss_settles_even_when_notice_delivery_fails() {
    let repository = Arc::new(MemoryRepository::default());
    let service = ClaimAssessmentService::new(
        repository.clone(),
        Arc::new(OfflineNotifier),
        Arc::new(PricingCatalog::standard()),
    );
    let record = service.submit(total_loss_submission()).expect("submits");

    let settlement = service
        .settle(&record.claim_id, as_of())
        .expect("settlement survives notifier outage");
    assert!(settlement.is_total_loss);
    assert_eq!(settlement.settlement_amount, dec!(18800));

    let stored = repository
        .fetch(&record.claim_id)
        .expect("fetch succeeds")
        .expect("claim stored");
    assert_eq!(stored.status, ClaimStatus::TotalLoss);
    assert_eq!(stored.settlement, Some(settlement));
}

#[test]
fn closed_claims_reject_further_transitions() {
    let (service, _, _) = build_service();
    let record = service.submit(submission()).expect("submits");
    service
        .settle(&record.claim_id, as_of())
        .expect("settles");

    match service.settle(&record.claim_id, as_of()) {
        Err(ClaimServiceError::InvalidTransition { status, .. }) => {
            assert_eq!(status, ClaimStatus::Settled)
        }
        other => panic!("expected invalid transition, got {other:?}"),
    }
    assert!(matches!(
        service.estimate(&record.claim_id),
        Err(ClaimServiceError::InvalidTransition { .. })
    ));
}

#[test]
fn settlement_without_market_value_leaves_claim_open() {
    let (service, repository, _) = build_service();
    let record = service.submit(unvalued_submission()).expect("submits");

    match service.settle(&record.claim_id, as_of()) {
        Err(ClaimServiceError::Settlement(SettlementError::MissingValuation { field })) => {
            assert_eq!(field, "market_value")
        }
        other => panic!("expected missing valuation, got {other:?}"),
    }

    let stored = repository
        .fetch(&record.claim_id)
        .expect("fetch")
        .expect("record exists");
    assert_eq!(stored.status, ClaimStatus::Submitted);
    assert!(stored.settlement.is_none());
}

#[test]
fn get_reports_missing_claims() {
    let (service, _, _) = build_service();
    assert!(matches!(
        service.get(&ClaimId("clm-missing".to_string())),
        Err(ClaimServiceError::Repository(RepositoryError::NotFound))
    ));
}

#[test]
fn estimates_use_the_catalog_snapshot_at_call_time() {
    let (service, _, _) = build_service();
    let record = service.submit(submission()).expect("submits");

    let mut tax_free = PricingConfig::standard();
    tax_free.rates.tax_rate = dec!(0);
    service
        .catalog()
        .replace(tax_free)
        .expect("revised tables are valid");

    let breakdown = service.estimate(&record.claim_id).expect("estimates");
    assert_eq!(breakdown.grand_total, dec!(1411.425));
}

#[test]
fn repository_outage_surfaces_as_repository_error() {
    let service = ClaimAssessmentService::new(
        Arc::new(UnavailableRepository),
        Arc::new(MemoryNotifier::default()),
        Arc::new(PricingCatalog::standard()),
    );

    assert!(matches!(
        service.submit(submission()),
        Err(ClaimServiceError::Repository(RepositoryError::Unavailable(_)))
    ));
}
