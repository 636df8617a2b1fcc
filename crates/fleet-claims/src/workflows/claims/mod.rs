//! Repair cost estimation and settlement for fleet insurance claims.
//!
//! A damage inspection is priced section by section against immutable cost tables,
//! aggregated with materials, supplies, and tax, and then tested against the vehicle's
//! market value to decide between a repair settlement and a total loss.

pub mod catalog;
pub mod checklist;
pub mod domain;
pub mod health;
pub mod pricing;
pub mod repository;
pub mod router;
pub mod service;
pub mod settlement;
pub mod views;

#[cfg(test)]
mod tests;

pub use catalog::PricingCatalog;
pub use checklist::{ChecklistImportError, ChecklistImporter};
pub use domain::{
    ClaimId, ClaimStatus, ClaimSubmission, ComponentAssessment, DamageAssessment, DamageClass,
    DamageSection, VehicleDescriptor, VehicleValuation,
};
pub use health::{score_vehicle_health, HealthGrade, HealthReport, SectionHealth};
pub use pricing::{
    calculate_detailed_cost_breakdown, calculate_section_cost, ComponentLine, ConfigurationError,
    CostBreakdown, EstimateEngine, EstimateError, PricingConfig, RateConfig, SectionCost,
    SectionTable, SettlementConfig, SeverityLevel,
};
pub use repository::{
    ClaimNotice, ClaimNotifier, ClaimRecord, ClaimRepository, ClaimStatusView, NotifierError,
    RepositoryError,
};
pub use router::claims_router;
pub use service::{ClaimAssessmentService, ClaimServiceError};
pub use settlement::{
    calculate_settlement_details, SettlementError, SettlementRecommendation, SettlementResult,
};
pub use views::{EstimateView, HealthView, SectionView, SettlementView};
