use super::common::*;
use rust_decimal_macros::dec;
use std::sync::Arc;
use std::thread;

use crate::workflows::claims::catalog::PricingCatalog;
use crate::workflows::claims::domain::DamageSection;
use crate::workflows::claims::pricing::{ConfigurationError, PricingConfig};

#[test]
fn replace_swaps_tables_for_new_readers_only() {
    let catalog = PricingCatalog::standard();
    let before = catalog.snapshot();

    let mut revised = PricingConfig::standard();
    revised.rates.labor_rate = dec!(0.85);
    catalog.replace(revised).expect("revised tables are valid");

    assert_eq!(before.rates.labor_rate, dec!(0.70));
    assert_eq!(catalog.snapshot().rates.labor_rate, dec!(0.85));

    let labor = catalog
        .engine()
        .breakdown(&cosmetic_assessment())
        .expect("prices")
        .section(DamageSection::Exterior)
        .map(|section| section.labor_cost);
    assert_eq!(labor, Some(dec!(573.75)));
}

#[test]
fn invalid_replacement_keeps_current_tables() {
    let catalog = PricingCatalog::standard();

    let mut broken = PricingConfig::standard();
    broken.sections.remove(&DamageSection::Safety);
    match catalog.replace(broken) {
        Err(ConfigurationError::MissingSection(DamageSection::Safety)) => {}
        other => panic!("expected missing section, got {other:?}"),
    }

    assert_eq!(*catalog.snapshot(), PricingConfig::standard());
}

#[test]
fn new_rejects_invalid_tables() {
    let mut broken = PricingConfig::standard();
    broken.health_weights.clear();
    assert!(matches!(
        PricingCatalog::new(broken),
        Err(ConfigurationError::InvalidHealthWeights)
    ));
}

#[test]
fn replacement_with_unpriceable_tables_is_refused() {
    let catalog = PricingCatalog::standard();
    let mut broken = PricingConfig::standard();
    broken
        .sections
        .get_mut(&DamageSection::Exterior)
        .expect("exterior table")
        .levels
        .last_mut()
        .expect("destroyed level")
        .base_cost = rust_decimal::Decimal::MAX;

    assert!(matches!(
        catalog.replace(broken),
        Err(ConfigurationError::CostOutOfRange { .. })
    ));
    let hood = catalog
        .engine()
        .section_cost(
            DamageSection::Exterior,
            &crate::workflows::claims::domain::ComponentAssessment::new()
                .with("hood", "destroyed"),
        )
        .expect("current tables still price");
    assert_eq!(hood, dec!(3750));
}

#[test]
fn concurrent_readers_always_see_a_complete_snapshot() {
    let catalog = Arc::new(PricingCatalog::standard());
    let mut revised = PricingConfig::standard();
    revised.rates.labor_rate = dec!(0.90);
    revised.rates.tax_rate = dec!(0.25);

    thread::scope(|scope| {
        for _ in 0..4 {
            let catalog = Arc::clone(&catalog);
            scope.spawn(move || {
                for _ in 0..200 {
                    let snapshot = catalog.snapshot();
                    let pair = (snapshot.rates.labor_rate, snapshot.rates.tax_rate);
                    assert!(
                        pair == (dec!(0.70), dec!(0.20)) || pair == (dec!(0.90), dec!(0.25)),
                        "torn snapshot {pair:?}"
                    );
                }
            });
        }
        catalog.replace(revised).expect("revised tables are valid");
    });

    assert_eq!(catalog.snapshot().rates.labor_rate, dec!(0.90));
}
