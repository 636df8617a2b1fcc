use rust_decimal::Decimal;

use super::super::domain::{ComponentAssessment, DamageAssessment, DamageSection};
use super::config::{PricingConfig, RateConfig, SectionTable};
use super::{ComponentLine, CostBreakdown, EstimateError, SectionCost};

pub(crate) fn section_table(
    section: DamageSection,
    config: &PricingConfig,
) -> Result<&SectionTable, EstimateError> {
    config
        .section(section)
        .ok_or(EstimateError::MissingCostTable(section))
}

/// Prices every assessed component in one section and derives labor from parts.
pub(crate) fn price_section(
    section: DamageSection,
    assessment: Option<&ComponentAssessment>,
    table: &SectionTable,
    rates: &RateConfig,
) -> Result<SectionCost, EstimateError> {
    let mut components = Vec::new();
    let mut parts_cost = Decimal::ZERO;
    let mut worst: Option<usize> = None;

    for (component, severity) in assessment.into_iter().flat_map(|entry| entry.assessed()) {
        let (position, level) =
            table
                .level(severity)
                .ok_or_else(|| EstimateError::InvalidSeverity {
                    section,
                    component: component.to_string(),
                    value: severity.to_string(),
                })?;

        worst = worst.max(Some(position));
        if position == 0 {
            continue;
        }

        let multiplier = table.multiplier(component);
        let cost = level
            .base_cost
            .checked_mul(multiplier)
            .ok_or(EstimateError::Overflow {
                stage: "component cost",
            })?;
        parts_cost = checked_add(parts_cost, cost, "parts cost")?;
        components.push(ComponentLine {
            component: component.to_string(),
            severity: level.key.clone(),
            base_cost: level.base_cost,
            multiplier,
            cost,
        });
    }

    let worst_level = worst
        .and_then(|position| table.levels.get(position))
        .or_else(|| table.baseline());
    let severity = worst_level
        .map(|level| level.key.clone())
        .unwrap_or_default();
    let classification = worst_level.and_then(|level| level.classification);

    let labor_cost = checked_mul(parts_cost, rates.labor_rate, "labor cost")?;

    Ok(SectionCost {
        section,
        severity,
        classification,
        parts_cost,
        labor_cost,
        section_total: checked_add(parts_cost, labor_cost, "section total")?,
        components,
    })
}

pub(crate) fn price_assessment(
    assessment: &DamageAssessment,
    config: &PricingConfig,
) -> Result<CostBreakdown, EstimateError> {
    let mut sections = Vec::with_capacity(DamageSection::ordered().len());
    for section in DamageSection::ordered() {
        let table = section_table(section, config)?;
        sections.push(price_section(
            section,
            assessment.section(section),
            table,
            &config.rates,
        )?);
    }

    let subtotal = sections
        .iter()
        .try_fold(Decimal::ZERO, |total, section| {
            checked_add(total, section.section_total, "subtotal")
        })?;
    aggregate(sections, subtotal, &config.rates)
}

/// Applies the materials, supplies, and tax add-ons to a subtotal.
pub(crate) fn aggregate(
    sections: Vec<SectionCost>,
    subtotal: Decimal,
    rates: &RateConfig,
) -> Result<CostBreakdown, EstimateError> {
    let paint_materials = checked_mul(subtotal, rates.paint_rate, "paint materials")?;
    let shop_supplies = checked_mul(subtotal, rates.supplies_rate, "shop supplies")?;
    let pre_tax_total = checked_add(
        checked_add(subtotal, paint_materials, "pre-tax total")?,
        shop_supplies,
        "pre-tax total",
    )?;
    let tax = checked_mul(pre_tax_total, rates.tax_rate, "tax")?;
    let damage_classification = sections
        .iter()
        .filter_map(|section| section.classification)
        .max();

    Ok(CostBreakdown {
        sections,
        subtotal,
        paint_materials,
        shop_supplies,
        pre_tax_total,
        tax,
        grand_total: checked_add(pre_tax_total, tax, "grand total")?,
        damage_classification,
    })
}

pub(crate) fn checked_add(
    left: Decimal,
    right: Decimal,
    stage: &'static str,
) -> Result<Decimal, EstimateError> {
    left.checked_add(right).ok_or(EstimateError::Overflow { stage })
}

pub(crate) fn checked_mul(
    left: Decimal,
    right: Decimal,
    stage: &'static str,
) -> Result<Decimal, EstimateError> {
    left.checked_mul(right).ok_or(EstimateError::Overflow { stage })
}
