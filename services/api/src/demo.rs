use crate::infra::{InMemoryClaimNotifier, InMemoryClaimRepository};
use chrono::{Datelike, Local, NaiveDate};
use clap::Args;
use fleet_claims::config::AppConfig;
use fleet_claims::error::AppError;
use fleet_claims::workflows::claims::views::money;
use fleet_claims::workflows::claims::{
    ChecklistImporter, ClaimAssessmentService, ClaimRepository, ClaimServiceError, ClaimStatus,
    ClaimSubmission,
    ComponentAssessment, CostBreakdown, DamageAssessment, DamageSection, EstimateView,
    HealthReport, HealthView, PricingCatalog, SettlementResult, SettlementView,
    VehicleDescriptor, VehicleValuation,
};
use rust_decimal::Decimal;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Args, Debug, Default)]
pub(crate) struct EstimateArgs {
    /// JSON damage assessment keyed by section then component.
    #[arg(long, conflicts_with = "checklist")]
    pub(crate) assessment: Option<PathBuf>,
    /// Inspection checklist CSV with Section,Component,Severity columns.
    #[arg(long)]
    pub(crate) checklist: Option<PathBuf>,
    /// Current market value. Enables the settlement section of the output.
    #[arg(long)]
    pub(crate) market_value: Option<Decimal>,
    /// Year of manufacture (defaults to the settlement year).
    #[arg(long)]
    pub(crate) manufacture_year: Option<i32>,
    /// Salvage value recovered on a total loss.
    #[arg(long)]
    pub(crate) salvage_value: Option<Decimal>,
    /// Policy deductible (defaults to the configured amount).
    #[arg(long)]
    pub(crate) deductible: Option<Decimal>,
    /// Settlement date (YYYY-MM-DD). Defaults to today.
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) as_of: Option<NaiveDate>,
}

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Settlement date for the demo claims (YYYY-MM-DD). Defaults to today.
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) as_of: Option<NaiveDate>,
    /// Print the per-section breakdown for every claim.
    #[arg(long)]
    pub(crate) show_sections: bool,
}

pub(crate) fn run_estimate(args: EstimateArgs) -> Result<(), AppError> {
    let EstimateArgs {
        assessment,
        checklist,
        market_value,
        manufacture_year,
        salvage_value,
        deductible,
        as_of,
    } = args;

    let config = AppConfig::load()?;
    let catalog = PricingCatalog::new(config.pricing.resolve()?)?;
    let engine = catalog.engine();

    // Omitting both sources prices an undamaged vehicle.
    let assessment = match (assessment, checklist) {
        (Some(path), _) => load_assessment(&path)?,
        (None, Some(path)) => ChecklistImporter::from_path(path)?,
        (None, None) => DamageAssessment::new(),
    };

    let breakdown = engine.breakdown(&assessment)?;
    let health = engine.health(&assessment)?;
    render_estimate(&breakdown, &health, true);

    if let Some(market_value) = market_value {
        let as_of = as_of.unwrap_or_else(|| Local::now().date_naive());
        let valuation = VehicleValuation {
            market_value: Some(market_value),
            manufacture_year: manufacture_year.unwrap_or_else(|| as_of.year()),
            salvage_value,
            deductible,
        };
        let settlement = engine.settle(&breakdown, &valuation, as_of)?;
        render_settlement(&settlement, as_of);
    }

    Ok(())
}

fn load_assessment(path: &Path) -> Result<DamageAssessment, AppError> {
    let file = File::open(path)?;
    let assessment = serde_json::from_reader(file).map_err(std::io::Error::from)?;
    Ok(assessment)
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs {
        as_of,
        show_sections,
    } = args;
    let as_of = as_of.unwrap_or_else(|| Local::now().date_naive());

    let repository = Arc::new(InMemoryClaimRepository::default());
    let notifier = Arc::new(InMemoryClaimNotifier::default());
    let service = ClaimAssessmentService::new(
        repository.clone(),
        notifier.clone(),
        Arc::new(PricingCatalog::standard()),
    );

    println!("Fleet claims demo (settling as of {as_of})");

    for submission in demo_submissions() {
        let registration = submission.vehicle.registration.clone();
        let record = service.submit(submission)?;
        println!("\nClaim {} for {}", record.claim_id, registration);

        let breakdown = service.estimate(&record.claim_id)?;
        let estimated = service.get(&record.claim_id)?;
        if let Some(health) = estimated.health.as_ref() {
            render_estimate(&breakdown, health, show_sections);
        }

        let settlement = service.settle(&record.claim_id, as_of)?;
        render_settlement(&settlement, as_of);
    }

    println!("\nClaim ledger");
    for status in ClaimStatus::ordered() {
        let records = repository
            .with_status(status, 50)
            .map_err(ClaimServiceError::from)?;
        for record in records {
            let view = record.status_view();
            let amount = view
                .settlement_amount
                .map(|amount| amount.to_string())
                .unwrap_or_else(|| "-".to_string());
            println!(
                "- {} | {} | {} | settlement {}",
                view.claim_id, view.registration, view.status, amount
            );
        }
    }

    let events = notifier.events();
    if !events.is_empty() {
        println!("\nNotifications");
        for event in events {
            let details = event
                .details
                .iter()
                .map(|(key, value)| format!("{key}={value}"))
                .collect::<Vec<_>>()
                .join(", ");
            println!("- {} for {} ({})", event.template, event.claim_id, details);
        }
    }

    Ok(())
}

fn render_estimate(breakdown: &CostBreakdown, health: &HealthReport, show_sections: bool) {
    let view = EstimateView::from(breakdown);

    if show_sections {
        println!("Section breakdown");
        for section in &view.sections {
            println!(
                "- {:<16} {:<12} parts {:>10} | labor {:>10} | total {:>10}",
                section.section_label,
                section.severity,
                section.parts_cost,
                section.labor_cost,
                section.section_total
            );
        }
    }

    println!("Subtotal:        {}", view.subtotal);
    println!("Paint materials: {}", view.paint_materials);
    println!("Shop supplies:   {}", view.shop_supplies);
    println!("Pre-tax total:   {}", view.pre_tax_total);
    println!("Tax:             {}", view.tax);
    println!("Grand total:     {}", view.grand_total);
    if let Some(label) = view.damage_label {
        println!("Damage class:    {label}");
    }

    let health = HealthView::from(health);
    println!("Health index:    {} ({})", health.index, health.grade_label);
}

fn render_settlement(settlement: &SettlementResult, as_of: NaiveDate) {
    let view = SettlementView::from(settlement);
    println!("Settlement as of {as_of}");
    println!(
        "- repair {} vs threshold {} (market value {})",
        view.repair_cost, view.total_loss_threshold, view.market_value
    );
    if view.is_total_loss {
        println!(
            "- vehicle age {} | depreciation {} | deductible {} | salvage {}",
            view.vehicle_age, view.depreciation_amount, view.deductible, view.salvage_value
        );
    } else {
        println!("- deductible {}", view.deductible);
    }
    println!(
        "- {}: {}",
        view.recommendation_label,
        money(settlement.settlement_amount)
    );
}

fn demo_submissions() -> Vec<ClaimSubmission> {
    let car_park_scrape = DamageAssessment::new()
        .with_section(
            DamageSection::Exterior,
            ComponentAssessment::new()
                .with("front_bumper", "moderate")
                .with("front_doors", "light"),
        )
        .with_section(
            DamageSection::Electrical,
            ComponentAssessment::new().with("headlights", "faulty"),
        );

    let motorway_collision = DamageAssessment::new()
        .with_section(
            DamageSection::Exterior,
            ComponentAssessment::new()
                .with("hood", "severe")
                .with("front_bumper", "destroyed")
                .with("windshield", "moderate"),
        )
        .with_section(
            DamageSection::Mechanical,
            ComponentAssessment::new()
                .with("engine_block", "poor")
                .with("cooling_system", "failed"),
        )
        .with_section(
            DamageSection::Safety,
            ComponentAssessment::new().with("airbags", "failed"),
        )
        .with_section(
            DamageSection::Structural,
            ComponentAssessment::new().with("crumple_zones", "moderate"),
        );

    vec![
        ClaimSubmission {
            vehicle: VehicleDescriptor {
                registration: "LK22 VXR".to_string(),
                make: "Vauxhall".to_string(),
                model: "Vivaro".to_string(),
            },
            valuation: VehicleValuation {
                market_value: Some(Decimal::from(18500)),
                manufacture_year: 2022,
                salvage_value: None,
                deductible: None,
            },
            assessment: car_park_scrape,
        },
        ClaimSubmission {
            vehicle: VehicleDescriptor {
                registration: "MA17 FTR".to_string(),
                make: "Ford".to_string(),
                model: "Transit".to_string(),
            },
            valuation: VehicleValuation {
                market_value: Some(Decimal::from(14000)),
                manufacture_year: 2017,
                salvage_value: Some(Decimal::from(1800)),
                deductible: Some(Decimal::from(750)),
            },
            assessment: motorway_collision,
        },
    ]
}
