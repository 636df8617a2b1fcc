//! Weighted-checklist health index.
//!
//! Every assessed component scores by its position on the section scale (100 at the
//! no-damage level, 0 at the worst level). Sections average their components and the
//! overall index is the weight-averaged section score.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use super::domain::{DamageAssessment, DamageSection};
use super::pricing::{EstimateError, PricingConfig, SectionTable};

const FULL_SCORE: Decimal = dec!(100);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthGrade {
    Excellent,
    Good,
    Fair,
    Poor,
    Critical,
}

impl HealthGrade {
    pub fn from_index(index: Decimal) -> Self {
        if index >= dec!(90) {
            Self::Excellent
        } else if index >= dec!(75) {
            Self::Good
        } else if index >= dec!(50) {
            Self::Fair
        } else if index >= dec!(25) {
            Self::Poor
        } else {
            Self::Critical
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Excellent => "Excellent",
            Self::Good => "Good",
            Self::Fair => "Fair",
            Self::Poor => "Poor",
            Self::Critical => "Critical",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionHealth {
    pub section: DamageSection,
    pub score: Decimal,
    pub weight: Decimal,
    pub assessed_components: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthReport {
    pub sections: Vec<SectionHealth>,
    pub index: Decimal,
    pub grade: HealthGrade,
}

impl HealthReport {
    pub fn section(&self, section: DamageSection) -> Option<&SectionHealth> {
        self.sections.iter().find(|entry| entry.section == section)
    }
}

pub fn score_vehicle_health(
    assessment: &DamageAssessment,
    config: &PricingConfig,
) -> Result<HealthReport, EstimateError> {
    let mut sections = Vec::with_capacity(DamageSection::ordered().len());
    let mut weighted = Decimal::ZERO;
    let mut total_weight = Decimal::ZERO;

    for section in DamageSection::ordered() {
        let table = config
            .section(section)
            .ok_or(EstimateError::MissingCostTable(section))?;
        let mut sum = Decimal::ZERO;
        let mut assessed_components = 0usize;

        for (component, severity) in assessment
            .section(section)
            .into_iter()
            .flat_map(|entry| entry.assessed())
        {
            let (position, _) =
                table
                    .level(severity)
                    .ok_or_else(|| EstimateError::InvalidSeverity {
                        section,
                        component: component.to_string(),
                        value: severity.to_string(),
                    })?;
            sum += component_score(position, table);
            assessed_components += 1;
        }

        let score = if assessed_components == 0 {
            FULL_SCORE
        } else {
            sum / Decimal::from(assessed_components)
        };
        let weight = config
            .health_weights
            .get(&section)
            .copied()
            .unwrap_or(Decimal::ZERO);

        weighted = score
            .checked_mul(weight)
            .and_then(|contribution| weighted.checked_add(contribution))
            .ok_or(EstimateError::Overflow {
                stage: "health weighting",
            })?;
        total_weight = total_weight
            .checked_add(weight)
            .ok_or(EstimateError::Overflow {
                stage: "health weighting",
            })?;
        sections.push(SectionHealth {
            section,
            score,
            weight,
            assessed_components,
        });
    }

    let index = if total_weight.is_zero() {
        FULL_SCORE
    } else {
        weighted / total_weight
    };

    Ok(HealthReport {
        sections,
        index,
        grade: HealthGrade::from_index(index),
    })
}

fn component_score(position: usize, table: &SectionTable) -> Decimal {
    let steps = table.levels.len().saturating_sub(1);
    if steps == 0 {
        return FULL_SCORE;
    }
    FULL_SCORE - FULL_SCORE * Decimal::from(position) / Decimal::from(steps)
}
