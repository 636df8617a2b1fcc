use std::collections::BTreeMap;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::super::domain::{DamageClass, DamageSection};
use super::config::{RateConfig, SectionTable, SettlementConfig, SeverityLevel};

use DamageClass::{Cosmetic, Major, Minor, Moderate, TotalLoss};

pub(crate) fn standard_rates() -> RateConfig {
    RateConfig {
        labor_rate: dec!(0.70),
        paint_rate: dec!(0.15),
        supplies_rate: dec!(0.08),
        tax_rate: dec!(0.20),
    }
}

pub(crate) fn standard_settlement() -> SettlementConfig {
    SettlementConfig {
        total_loss_ratio: dec!(0.70),
        age_depreciation_per_year: dec!(0.02),
        max_age_depreciation: dec!(0.15),
        damage_depreciation: BTreeMap::from([
            (Cosmetic, dec!(0.02)),
            (Minor, dec!(0.03)),
            (Moderate, dec!(0.05)),
            (Major, dec!(0.08)),
            (TotalLoss, dec!(0.15)),
        ]),
        default_deductible: dec!(500),
    }
}

pub(crate) fn standard_health_weights() -> BTreeMap<DamageSection, Decimal> {
    BTreeMap::from([
        (DamageSection::Exterior, dec!(10)),
        (DamageSection::Wheels, dec!(10)),
        (DamageSection::Interior, dec!(5)),
        (DamageSection::Mechanical, dec!(25)),
        (DamageSection::Electrical, dec!(10)),
        (DamageSection::Safety, dec!(20)),
        (DamageSection::Structural, dec!(15)),
        (DamageSection::Fluids, dec!(5)),
    ])
}

pub(crate) fn standard_sections() -> BTreeMap<DamageSection, SectionTable> {
    BTreeMap::from([
        (
            DamageSection::Exterior,
            section(
                "none",
                &[
                    ("light", dec!(250), Cosmetic),
                    ("moderate", dec!(600), Minor),
                    ("severe", dec!(1200), Moderate),
                    ("destroyed", dec!(2500), Major),
                ],
                &[
                    ("hood", dec!(1.5)),
                    ("front_bumper", dec!(1.2)),
                    ("rear_bumper", dec!(1.2)),
                    ("roof", dec!(2.0)),
                    ("front_doors", dec!(1.3)),
                    ("rear_doors", dec!(1.3)),
                    ("tailgate", dec!(1.4)),
                    ("windshield", dec!(1.1)),
                ],
            ),
        ),
        (
            DamageSection::Wheels,
            section(
                "none",
                &[
                    ("worn", dec!(120), Cosmetic),
                    ("damaged", dec!(350), Minor),
                    ("severe", dec!(800), Moderate),
                    ("destroyed", dec!(1500), Major),
                ],
                &[
                    ("alloy_wheels", dec!(1.4)),
                    ("suspension", dec!(2.5)),
                    ("brake_discs", dec!(1.3)),
                    ("steering_rack", dec!(2.0)),
                ],
            ),
        ),
        (
            DamageSection::Interior,
            section(
                "none",
                &[
                    ("light", dec!(150), Cosmetic),
                    ("moderate", dec!(400), Minor),
                    ("severe", dec!(900), Moderate),
                    ("destroyed", dec!(1800), Major),
                ],
                &[
                    ("dashboard", dec!(1.6)),
                    ("seats", dec!(1.3)),
                    ("headliner", dec!(1.1)),
                    ("infotainment", dec!(1.8)),
                ],
            ),
        ),
        (
            DamageSection::Mechanical,
            section(
                "excellent",
                &[
                    ("good", dec!(150), Cosmetic),
                    ("fair", dec!(500), Minor),
                    ("poor", dec!(1200), Moderate),
                    ("failed", dec!(2200), Major),
                ],
                &[
                    ("engine_block", dec!(3.0)),
                    ("transmission", dec!(2.5)),
                    ("turbocharger", dec!(1.8)),
                    ("cooling_system", dec!(1.3)),
                    ("exhaust", dec!(1.1)),
                ],
            ),
        ),
        (
            DamageSection::Electrical,
            section(
                "working",
                &[
                    ("intermittent", dec!(200), Minor),
                    ("faulty", dec!(600), Moderate),
                    ("failed", dec!(1500), Major),
                ],
                &[
                    ("ecu", dec!(2.5)),
                    ("wiring_harness", dec!(1.8)),
                    ("alternator", dec!(1.3)),
                    ("headlights", dec!(1.2)),
                ],
            ),
        ),
        (
            DamageSection::Safety,
            section(
                "operational",
                &[
                    ("degraded", dec!(300), Minor),
                    ("compromised", dec!(900), Moderate),
                    ("failed", dec!(2000), Major),
                ],
                &[
                    ("airbags", dec!(2.0)),
                    ("abs_system", dec!(1.8)),
                    ("seatbelts", dec!(1.2)),
                    ("parking_sensors", dec!(1.1)),
                ],
            ),
        ),
        (
            DamageSection::Structural,
            section(
                "intact",
                &[
                    ("minor", dec!(500), Minor),
                    ("moderate", dec!(1500), Moderate),
                    ("severe", dec!(4000), Major),
                    ("compromised", dec!(8000), TotalLoss),
                ],
                &[
                    ("chassis", dec!(3.0)),
                    ("frame_rails", dec!(2.5)),
                    ("a_pillars", dec!(2.0)),
                    ("crumple_zones", dec!(1.8)),
                ],
            ),
        ),
        (
            DamageSection::Fluids,
            section(
                "normal",
                &[
                    ("low", dec!(50), Cosmetic),
                    ("contaminated", dec!(200), Minor),
                    ("leaking", dec!(500), Moderate),
                ],
                &[
                    ("brake_fluid", dec!(1.2)),
                    ("transmission_fluid", dec!(1.3)),
                ],
            ),
        ),
    ])
}

fn section(
    baseline: &str,
    levels: &[(&str, Decimal, DamageClass)],
    multipliers: &[(&str, Decimal)],
) -> SectionTable {
    let mut scale = vec![SeverityLevel {
        key: baseline.to_string(),
        base_cost: Decimal::ZERO,
        classification: None,
    }];
    scale.extend(
        levels
            .iter()
            .map(|(key, base_cost, classification)| SeverityLevel {
                key: key.to_string(),
                base_cost: *base_cost,
                classification: Some(*classification),
            }),
    );

    SectionTable {
        levels: scale,
        multipliers: multipliers
            .iter()
            .map(|(component, multiplier)| (component.to_string(), *multiplier))
            .collect(),
    }
}
