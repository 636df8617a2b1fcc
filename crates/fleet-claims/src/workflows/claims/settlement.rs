use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::domain::{DamageClass, VehicleValuation};
use super::pricing::SettlementConfig;

/// Errors raised when a settlement cannot be determined from the supplied valuation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SettlementError {
    #[error("valuation is missing a usable {field}")]
    MissingValuation { field: &'static str },
    #[error("{field} cannot be negative (found {value})")]
    NegativeAmount { field: &'static str, value: Decimal },
    #[error("{field} is out of range for settlement arithmetic")]
    Overflow { field: &'static str },
}

/// Branch taken by the settlement engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SettlementRecommendation {
    TotalLoss,
    Repair,
}

impl SettlementRecommendation {
    pub const fn label(self) -> &'static str {
        match self {
            Self::TotalLoss => "Total loss — settle at adjusted market value",
            Self::Repair => "Repair — settlement after deductible",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SettlementResult {
    pub repair_cost: Decimal,
    pub market_value: Decimal,
    pub total_loss_threshold: Decimal,
    pub vehicle_age: u32,
    pub age_depreciation_rate: Decimal,
    pub damage_depreciation_rate: Decimal,
    pub depreciation_amount: Decimal,
    pub deductible: Decimal,
    pub salvage_value: Decimal,
    pub is_total_loss: bool,
    pub settlement_amount: Decimal,
    pub recommendation: SettlementRecommendation,
}

/// Decides repair versus total loss and computes the payable amount.
///
/// A claim is a total loss only when `repair_cost` is strictly above
/// `market_value * total_loss_ratio`. Both branches floor the payout at zero.
pub fn calculate_settlement_details(
    repair_cost: Decimal,
    valuation: &VehicleValuation,
    damage_class: Option<DamageClass>,
    as_of: NaiveDate,
    config: &SettlementConfig,
) -> Result<SettlementResult, SettlementError> {
    let market_value = valuation
        .market_value
        .filter(|value| *value > Decimal::ZERO)
        .ok_or(SettlementError::MissingValuation {
            field: "market_value",
        })?;
    let repair_cost = non_negative("repair_cost", repair_cost)?;
    let deductible = non_negative(
        "deductible",
        valuation.deductible.unwrap_or(config.default_deductible),
    )?;
    let salvage_value = non_negative(
        "salvage_value",
        valuation.salvage_value.unwrap_or(Decimal::ZERO),
    )?;

    let total_loss_threshold = market_value
        .checked_mul(config.total_loss_ratio)
        .ok_or(SettlementError::Overflow {
            field: "total_loss_threshold",
        })?;
    let is_total_loss = repair_cost > total_loss_threshold;

    let vehicle_age = vehicle_age(valuation.manufacture_year, as_of)?;
    let age_depreciation_rate = age_depreciation_rate(vehicle_age, config);
    let damage_depreciation_rate = config.damage_rate(damage_class);
    let depreciation_amount = age_depreciation_rate
        .checked_add(damage_depreciation_rate)
        .and_then(|rate| market_value.checked_mul(rate))
        .ok_or(SettlementError::Overflow {
            field: "depreciation_amount",
        })?;

    let (settlement_amount, recommendation) = if is_total_loss {
        (
            market_value
                .checked_sub(depreciation_amount)
                .and_then(|value| value.checked_sub(deductible))
                .and_then(|value| value.checked_add(salvage_value)),
            SettlementRecommendation::TotalLoss,
        )
    } else {
        (
            repair_cost.checked_sub(deductible),
            SettlementRecommendation::Repair,
        )
    };
    let settlement_amount = settlement_amount.ok_or(SettlementError::Overflow {
        field: "settlement_amount",
    })?;

    Ok(SettlementResult {
        repair_cost,
        market_value,
        total_loss_threshold,
        vehicle_age,
        age_depreciation_rate,
        damage_depreciation_rate,
        depreciation_amount,
        deductible,
        salvage_value,
        is_total_loss,
        settlement_amount: settlement_amount.max(Decimal::ZERO),
        recommendation,
    })
}

/// Whole calendar years since manufacture. Future model years count as new.
pub(crate) fn vehicle_age(
    manufacture_year: i32,
    as_of: NaiveDate,
) -> Result<u32, SettlementError> {
    let years = as_of
        .year()
        .checked_sub(manufacture_year)
        .ok_or(SettlementError::Overflow {
            field: "manufacture_year",
        })?;
    Ok(u32::try_from(years).unwrap_or(0))
}

pub(crate) fn age_depreciation_rate(vehicle_age: u32, config: &SettlementConfig) -> Decimal {
    config
        .age_depreciation_per_year
        .checked_mul(Decimal::from(vehicle_age))
        .map_or(config.max_age_depreciation, |rate| {
            rate.min(config.max_age_depreciation)
        })
}

fn non_negative(field: &'static str, value: Decimal) -> Result<Decimal, SettlementError> {
    if value < Decimal::ZERO {
        Err(SettlementError::NegativeAmount { field, value })
    } else {
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn config() -> SettlementConfig {
        SettlementConfig::default()
    }

    #[test]
    fn future_manufacture_year_counts_as_new() {
        let as_of = NaiveDate::from_ymd_opt(2025, 6, 1).expect("valid date");
        assert_eq!(vehicle_age(2026, as_of), Ok(0));
        assert_eq!(vehicle_age(2019, as_of), Ok(6));
    }

    #[test]
    fn unrepresentable_manufacture_year_is_rejected() {
        let as_of = NaiveDate::from_ymd_opt(2025, 6, 1).expect("valid date");
        assert_eq!(
            vehicle_age(i32::MIN, as_of),
            Err(SettlementError::Overflow {
                field: "manufacture_year"
            })
        );
    }

    #[test]
    fn age_depreciation_is_capped() {
        assert_eq!(age_depreciation_rate(3, &config()), dec!(0.06));
        assert_eq!(age_depreciation_rate(7, &config()), dec!(0.14));
        assert_eq!(age_depreciation_rate(8, &config()), dec!(0.15));
        assert_eq!(age_depreciation_rate(30, &config()), dec!(0.15));
    }
}
