use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;

use super::domain::{DamageClass, DamageSection};
use super::health::{HealthGrade, HealthReport};
use super::pricing::{CostBreakdown, SectionCost};
use super::settlement::{SettlementRecommendation, SettlementResult};

/// Rounds a currency amount to exactly two decimal places for display.
pub fn money(value: Decimal) -> Decimal {
    let mut rounded = value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(2);
    rounded
}

#[derive(Debug, Clone, Serialize)]
pub struct SectionView {
    pub section: DamageSection,
    pub section_label: &'static str,
    pub severity: String,
    pub damaged_components: usize,
    pub parts_cost: Decimal,
    pub labor_cost: Decimal,
    pub section_total: Decimal,
}

impl From<&SectionCost> for SectionView {
    fn from(section: &SectionCost) -> Self {
        Self {
            section: section.section,
            section_label: section.section.label(),
            severity: section.severity.clone(),
            damaged_components: section.components.len(),
            parts_cost: money(section.parts_cost),
            labor_cost: money(section.labor_cost),
            section_total: money(section.section_total),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct EstimateView {
    pub sections: Vec<SectionView>,
    pub subtotal: Decimal,
    pub paint_materials: Decimal,
    pub shop_supplies: Decimal,
    pub pre_tax_total: Decimal,
    pub tax: Decimal,
    pub grand_total: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub damage_classification: Option<DamageClass>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub damage_label: Option<&'static str>,
}

impl From<&CostBreakdown> for EstimateView {
    fn from(breakdown: &CostBreakdown) -> Self {
        Self {
            sections: breakdown.sections.iter().map(SectionView::from).collect(),
            subtotal: money(breakdown.subtotal),
            paint_materials: money(breakdown.paint_materials),
            shop_supplies: money(breakdown.shop_supplies),
            pre_tax_total: money(breakdown.pre_tax_total),
            tax: money(breakdown.tax),
            grand_total: money(breakdown.grand_total),
            damage_classification: breakdown.damage_classification,
            damage_label: breakdown.damage_classification.map(DamageClass::label),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SettlementView {
    pub repair_cost: Decimal,
    pub market_value: Decimal,
    pub total_loss_threshold: Decimal,
    pub vehicle_age: u32,
    pub depreciation_amount: Decimal,
    pub deductible: Decimal,
    pub salvage_value: Decimal,
    pub is_total_loss: bool,
    pub settlement_amount: Decimal,
    pub recommendation: SettlementRecommendation,
    pub recommendation_label: &'static str,
}

impl From<&SettlementResult> for SettlementView {
    fn from(result: &SettlementResult) -> Self {
        Self {
            repair_cost: money(result.repair_cost),
            market_value: money(result.market_value),
            total_loss_threshold: money(result.total_loss_threshold),
            vehicle_age: result.vehicle_age,
            depreciation_amount: money(result.depreciation_amount),
            deductible: money(result.deductible),
            salvage_value: money(result.salvage_value),
            is_total_loss: result.is_total_loss,
            settlement_amount: money(result.settlement_amount),
            recommendation: result.recommendation,
            recommendation_label: result.recommendation.label(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthView {
    pub index: Decimal,
    pub grade: HealthGrade,
    pub grade_label: &'static str,
}

impl From<&HealthReport> for HealthView {
    fn from(report: &HealthReport) -> Self {
        Self {
            index: report
                .index
                .round_dp_with_strategy(1, RoundingStrategy::MidpointAwayFromZero),
            grade: report.grade,
            grade_label: report.grade.label(),
        }
    }
}
