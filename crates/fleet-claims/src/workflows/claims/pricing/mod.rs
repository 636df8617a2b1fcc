mod config;
mod rules;
mod tables;

pub use config::{
    ConfigurationError, PricingConfig, RateConfig, SectionTable, SettlementConfig, SeverityLevel,
};

use std::sync::Arc;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::domain::{
    ComponentAssessment, DamageAssessment, DamageClass, DamageSection, VehicleValuation,
};
use super::health::{score_vehicle_health, HealthReport};
use super::settlement::{calculate_settlement_details, SettlementError, SettlementResult};

/// Raised when an assessment cannot be priced against the configured tables.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EstimateError {
    #[error("{section} component '{component}' has unknown severity '{value}'")]
    InvalidSeverity {
        section: DamageSection,
        component: String,
        value: String,
    },
    /// Only reachable through the free functions with a config that skipped
    /// [`PricingConfig::validate`]; an [`EstimateEngine`] always holds a full table set.
    #[error("no cost table configured for section {0}")]
    MissingCostTable(DamageSection),
    #[error("{stage} is out of range for estimate arithmetic")]
    Overflow { stage: &'static str },
}

/// Parts cost for one section: sum of `base_cost * multiplier` over assessed components.
pub fn calculate_section_cost(
    section: DamageSection,
    assessment: &ComponentAssessment,
    config: &PricingConfig,
) -> Result<Decimal, EstimateError> {
    let table = rules::section_table(section, config)?;
    rules::price_section(section, Some(assessment), table, &config.rates)
        .map(|priced| priced.parts_cost)
}

/// Full estimate across all eight sections, including add-ons and tax.
pub fn calculate_detailed_cost_breakdown(
    assessment: &DamageAssessment,
    config: &PricingConfig,
) -> Result<CostBreakdown, EstimateError> {
    rules::price_assessment(assessment, config)
}

/// Stateless calculator bound to one validated pricing snapshot.
#[derive(Debug, Clone)]
pub struct EstimateEngine {
    config: Arc<PricingConfig>,
}

impl EstimateEngine {
    pub fn new(config: PricingConfig) -> Result<Self, ConfigurationError> {
        config.validate()?;
        Ok(Self {
            config: Arc::new(config),
        })
    }

    pub(crate) fn from_snapshot(config: Arc<PricingConfig>) -> Self {
        Self { config }
    }

    pub fn standard() -> Self {
        Self::from_snapshot(Arc::new(PricingConfig::standard()))
    }

    pub fn config(&self) -> &PricingConfig {
        &self.config
    }

    pub fn section_cost(
        &self,
        section: DamageSection,
        assessment: &ComponentAssessment,
    ) -> Result<Decimal, EstimateError> {
        calculate_section_cost(section, assessment, &self.config)
    }

    pub fn breakdown(&self, assessment: &DamageAssessment) -> Result<CostBreakdown, EstimateError> {
        calculate_detailed_cost_breakdown(assessment, &self.config)
    }

    pub fn health(&self, assessment: &DamageAssessment) -> Result<HealthReport, EstimateError> {
        score_vehicle_health(assessment, &self.config)
    }

    pub fn settle(
        &self,
        breakdown: &CostBreakdown,
        valuation: &VehicleValuation,
        as_of: NaiveDate,
    ) -> Result<SettlementResult, SettlementError> {
        calculate_settlement_details(
            breakdown.grand_total,
            valuation,
            breakdown.damage_classification,
            as_of,
            &self.config.settlement,
        )
    }
}

/// Priced line for a single damaged component.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentLine {
    pub component: String,
    pub severity: String,
    pub base_cost: Decimal,
    pub multiplier: Decimal,
    pub cost: Decimal,
}

/// Per-section result. Sections without damage are still reported with zero costs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionCost {
    pub section: DamageSection,
    /// Worst severity observed, or the section's no-damage level.
    pub severity: String,
    pub classification: Option<DamageClass>,
    pub parts_cost: Decimal,
    pub labor_cost: Decimal,
    pub section_total: Decimal,
    pub components: Vec<ComponentLine>,
}

/// Unrounded estimate totals. Round only when presenting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostBreakdown {
    pub sections: Vec<SectionCost>,
    pub subtotal: Decimal,
    pub paint_materials: Decimal,
    pub shop_supplies: Decimal,
    pub pre_tax_total: Decimal,
    pub tax: Decimal,
    pub grand_total: Decimal,
    pub damage_classification: Option<DamageClass>,
}

impl CostBreakdown {
    pub fn section(&self, section: DamageSection) -> Option<&SectionCost> {
        self.sections.iter().find(|entry| entry.section == section)
    }

    /// Rebuilds the aggregate lines from a known subtotal.
    pub fn from_subtotal(subtotal: Decimal, rates: &RateConfig) -> Result<Self, EstimateError> {
        rules::aggregate(Vec::new(), subtotal, rates)
    }
}
