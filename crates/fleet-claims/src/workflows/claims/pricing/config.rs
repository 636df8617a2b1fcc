use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::super::domain::{DamageClass, DamageSection};
use super::tables;

/// Configuration problems detected when pricing tables are loaded.
#[derive(Debug, thiserror::Error)]
pub enum ConfigurationError {
    #[error("no cost table configured for section {0}")]
    MissingSection(DamageSection),
    #[error("section {0} has an empty severity scale")]
    EmptyScale(DamageSection),
    #[error("section {section} lists severity '{level}' more than once")]
    DuplicateLevel {
        section: DamageSection,
        level: String,
    },
    #[error("section {section} no-damage level '{level}' must cost 0 (found {cost})")]
    NonZeroBaseline {
        section: DamageSection,
        level: String,
        cost: Decimal,
    },
    #[error("section {section} no-damage level '{level}' must not carry a damage classification")]
    ClassifiedBaseline {
        section: DamageSection,
        level: String,
    },
    #[error("section {section} severity '{level}' is missing a damage classification")]
    UnclassifiedLevel {
        section: DamageSection,
        level: String,
    },
    #[error("section {section} severity '{level}' costs less than the level below it")]
    DecreasingCost {
        section: DamageSection,
        level: String,
    },
    #[error("section {section} severity '{level}' is classified below the level below it")]
    DecreasingClassification {
        section: DamageSection,
        level: String,
    },
    #[error("section {section} component '{component}' multiplier {multiplier} is below 1.0")]
    InvalidMultiplier {
        section: DamageSection,
        component: String,
        multiplier: Decimal,
    },
    #[error("section {section} severity '{level}' prices beyond the representable range")]
    CostOutOfRange {
        section: DamageSection,
        level: String,
    },
    #[error("rate {name} is out of range (found {value})")]
    InvalidRate { name: &'static str, value: Decimal },
    #[error("no depreciation rate configured for damage class {0:?}")]
    MissingDamageRate(DamageClass),
    #[error("health weights must be non-negative and sum above zero")]
    InvalidHealthWeights,
    #[error("unable to read pricing configuration: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid pricing configuration: {0}")]
    Parse(#[from] serde_json::Error),
}

/// One rung of a section's severity scale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeverityLevel {
    pub key: String,
    pub base_cost: Decimal,
    #[serde(default)]
    pub classification: Option<DamageClass>,
}

/// Cost table and component multipliers for a single section.
///
/// `levels` is ordered from the no-damage level upwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionTable {
    pub levels: Vec<SeverityLevel>,
    #[serde(default)]
    pub multipliers: BTreeMap<String, Decimal>,
}

impl SectionTable {
    pub fn baseline(&self) -> Option<&SeverityLevel> {
        self.levels.first()
    }

    /// Looks up a severity by key, ignoring case. Returns its position on the scale.
    pub fn level(&self, severity: &str) -> Option<(usize, &SeverityLevel)> {
        let severity = severity.trim();
        self.levels
            .iter()
            .enumerate()
            .find(|(_, level)| level.key.eq_ignore_ascii_case(severity))
    }

    pub fn multiplier(&self, component: &str) -> Decimal {
        self.multipliers
            .get(component)
            .copied()
            .unwrap_or(Decimal::ONE)
    }

    /// Rejects tables whose dearest level, at the largest multiplier and with every
    /// add-on applied, cannot be computed.
    fn validate_range(
        &self,
        section: DamageSection,
        rates: &RateConfig,
    ) -> Result<(), ConfigurationError> {
        let Some(top) = self.levels.last() else {
            return Err(ConfigurationError::EmptyScale(section));
        };
        let multiplier = self
            .multipliers
            .values()
            .copied()
            .fold(Decimal::ONE, Decimal::max);

        let priced = top
            .base_cost
            .checked_mul(multiplier)
            .and_then(|cost| cost.checked_mul(Decimal::ONE.checked_add(rates.labor_rate)?))
            .and_then(|cost| {
                let add_ons = Decimal::ONE
                    .checked_add(rates.paint_rate)?
                    .checked_add(rates.supplies_rate)?;
                cost.checked_mul(add_ons)
            })
            .and_then(|cost| cost.checked_mul(Decimal::ONE.checked_add(rates.tax_rate)?));

        match priced {
            Some(_) => Ok(()),
            None => Err(ConfigurationError::CostOutOfRange {
                section,
                level: top.key.clone(),
            }),
        }
    }

    fn validate(&self, section: DamageSection) -> Result<(), ConfigurationError> {
        let Some(baseline) = self.baseline() else {
            return Err(ConfigurationError::EmptyScale(section));
        };

        if !baseline.base_cost.is_zero() {
            return Err(ConfigurationError::NonZeroBaseline {
                section,
                level: baseline.key.clone(),
                cost: baseline.base_cost,
            });
        }
        if baseline.classification.is_some() {
            return Err(ConfigurationError::ClassifiedBaseline {
                section,
                level: baseline.key.clone(),
            });
        }

        for (index, level) in self.levels.iter().enumerate().skip(1) {
            if self.levels[..index]
                .iter()
                .any(|earlier| earlier.key.eq_ignore_ascii_case(&level.key))
            {
                return Err(ConfigurationError::DuplicateLevel {
                    section,
                    level: level.key.clone(),
                });
            }

            let previous = &self.levels[index - 1];
            if level.base_cost < previous.base_cost {
                return Err(ConfigurationError::DecreasingCost {
                    section,
                    level: level.key.clone(),
                });
            }
            if level.classification.is_none() {
                return Err(ConfigurationError::UnclassifiedLevel {
                    section,
                    level: level.key.clone(),
                });
            }
            if level.classification < previous.classification {
                return Err(ConfigurationError::DecreasingClassification {
                    section,
                    level: level.key.clone(),
                });
            }
        }

        for (component, multiplier) in &self.multipliers {
            if *multiplier < Decimal::ONE {
                return Err(ConfigurationError::InvalidMultiplier {
                    section,
                    component: component.clone(),
                    multiplier: *multiplier,
                });
            }
        }

        Ok(())
    }
}

/// Percentages applied on top of parts cost. Values are fractions (0.70 = 70%).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateConfig {
    pub labor_rate: Decimal,
    pub paint_rate: Decimal,
    pub supplies_rate: Decimal,
    pub tax_rate: Decimal,
}

impl Default for RateConfig {
    fn default() -> Self {
        tables::standard_rates()
    }
}

/// Total-loss and depreciation policy dials.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SettlementConfig {
    pub total_loss_ratio: Decimal,
    pub age_depreciation_per_year: Decimal,
    pub max_age_depreciation: Decimal,
    pub damage_depreciation: BTreeMap<DamageClass, Decimal>,
    pub default_deductible: Decimal,
}

impl SettlementConfig {
    pub fn damage_rate(&self, class: Option<DamageClass>) -> Decimal {
        class
            .and_then(|class| self.damage_depreciation.get(&class).copied())
            .unwrap_or(Decimal::ZERO)
    }
}

impl Default for SettlementConfig {
    fn default() -> Self {
        tables::standard_settlement()
    }
}

/// Complete, immutable pricing snapshot: cost tables, rates, and settlement policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricingConfig {
    #[serde(default)]
    pub rates: RateConfig,
    #[serde(default)]
    pub settlement: SettlementConfig,
    #[serde(default = "tables::standard_health_weights")]
    pub health_weights: BTreeMap<DamageSection, Decimal>,
    pub sections: BTreeMap<DamageSection, SectionTable>,
}

impl PricingConfig {
    /// Built-in tables for the UK fleet market.
    pub fn standard() -> Self {
        Self {
            rates: tables::standard_rates(),
            settlement: tables::standard_settlement(),
            health_weights: tables::standard_health_weights(),
            sections: tables::standard_sections(),
        }
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, ConfigurationError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, ConfigurationError> {
        let config: Self = serde_json::from_reader(reader)?;
        config.validate()?;
        Ok(config)
    }

    pub fn section(&self, section: DamageSection) -> Option<&SectionTable> {
        self.sections.get(&section)
    }

    pub fn validate(&self) -> Result<(), ConfigurationError> {
        for section in DamageSection::ordered() {
            self.section(section)
                .ok_or(ConfigurationError::MissingSection(section))?
                .validate(section)?;
        }

        let rates = [
            ("labor_rate", self.rates.labor_rate),
            ("paint_rate", self.rates.paint_rate),
            ("supplies_rate", self.rates.supplies_rate),
            ("tax_rate", self.rates.tax_rate),
            (
                "age_depreciation_per_year",
                self.settlement.age_depreciation_per_year,
            ),
            ("default_deductible", self.settlement.default_deductible),
        ];
        for (name, value) in rates {
            if value < Decimal::ZERO {
                return Err(ConfigurationError::InvalidRate { name, value });
            }
        }

        for (section, table) in &self.sections {
            table.validate_range(*section, &self.rates)?;
        }

        let ratio = self.settlement.total_loss_ratio;
        if ratio <= Decimal::ZERO || ratio > Decimal::ONE {
            return Err(ConfigurationError::InvalidRate {
                name: "total_loss_ratio",
                value: ratio,
            });
        }

        let ceiling = self.settlement.max_age_depreciation;
        if ceiling < Decimal::ZERO || ceiling > Decimal::ONE {
            return Err(ConfigurationError::InvalidRate {
                name: "max_age_depreciation",
                value: ceiling,
            });
        }

        for class in DamageClass::ordered() {
            let rate = self
                .settlement
                .damage_depreciation
                .get(&class)
                .copied()
                .ok_or(ConfigurationError::MissingDamageRate(class))?;
            if rate < Decimal::ZERO || rate > Decimal::ONE {
                return Err(ConfigurationError::InvalidRate {
                    name: "damage_depreciation",
                    value: rate,
                });
            }
        }

        let weight_total = self
            .health_weights
            .values()
            .try_fold(Decimal::ZERO, |total, weight| total.checked_add(*weight));
        let weights_valid = self
            .health_weights
            .values()
            .all(|weight| *weight >= Decimal::ZERO)
            && weight_total.is_some_and(|total| total > Decimal::ZERO);
        if !weights_valid {
            return Err(ConfigurationError::InvalidHealthWeights);
        }

        Ok(())
    }
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self::standard()
    }
}
