use std::collections::BTreeMap;
use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};

/// Vehicle subsystem assessed independently during a damage inspection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DamageSection {
    Exterior,
    Wheels,
    Interior,
    Mechanical,
    Electrical,
    Safety,
    Structural,
    Fluids,
}

impl DamageSection {
    pub const fn ordered() -> [Self; 8] {
        [
            Self::Exterior,
            Self::Wheels,
            Self::Interior,
            Self::Mechanical,
            Self::Electrical,
            Self::Safety,
            Self::Structural,
            Self::Fluids,
        ]
    }

    pub const fn key(self) -> &'static str {
        match self {
            Self::Exterior => "exterior",
            Self::Wheels => "wheels",
            Self::Interior => "interior",
            Self::Mechanical => "mechanical",
            Self::Electrical => "electrical",
            Self::Safety => "safety",
            Self::Structural => "structural",
            Self::Fluids => "fluids",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Exterior => "Exterior & Bodywork",
            Self::Wheels => "Wheels & Tyres",
            Self::Interior => "Interior",
            Self::Mechanical => "Mechanical",
            Self::Electrical => "Electrical",
            Self::Safety => "Safety Systems",
            Self::Structural => "Structural",
            Self::Fluids => "Fluids",
        }
    }

    pub fn from_key(value: &str) -> Option<Self> {
        let normalized = value.trim().to_ascii_lowercase();
        Self::ordered()
            .into_iter()
            .find(|section| section.key() == normalized)
    }
}

impl fmt::Display for DamageSection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Common damage scale shared across sections, used for depreciation and reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DamageClass {
    Cosmetic,
    Minor,
    Moderate,
    Major,
    TotalLoss,
}

impl DamageClass {
    pub const fn ordered() -> [Self; 5] {
        [
            Self::Cosmetic,
            Self::Minor,
            Self::Moderate,
            Self::Major,
            Self::TotalLoss,
        ]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Cosmetic => "Cosmetic",
            Self::Minor => "Minor",
            Self::Moderate => "Moderate",
            Self::Major => "Major",
            Self::TotalLoss => "Total Loss",
        }
    }
}

/// Component name to severity for a single section. `None` or blank means not assessed.
///
/// Component names are normalised on the way in, so "Front Bumper" and
/// "front-bumper" both land on `front_bumper`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ComponentAssessment {
    components: BTreeMap<String, Option<String>>,
}

impl ComponentAssessment {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, component: impl Into<String>, severity: impl Into<String>) -> Self {
        self.set(component, severity);
        self
    }

    pub fn set(&mut self, component: impl Into<String>, severity: impl Into<String>) {
        self.components
            .insert(normalize_key(&component.into()), Some(severity.into()));
    }

    /// Assessed components with trimmed severities, in component-name order.
    pub fn assessed(&self) -> impl Iterator<Item = (&str, &str)> + '_ {
        self.components.iter().filter_map(|(component, severity)| {
            severity
                .as_deref()
                .map(str::trim)
                .filter(|value| !value.is_empty())
                .map(|value| (component.as_str(), value))
        })
    }

    pub fn is_empty(&self) -> bool {
        self.assessed().next().is_none()
    }
}

// Spellings that collapse to one key keep the first non-blank severity.
impl<'de> Deserialize<'de> for ComponentAssessment {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = BTreeMap::<String, Option<String>>::deserialize(deserializer)?;
        let mut components: BTreeMap<String, Option<String>> = BTreeMap::new();
        for (component, severity) in raw {
            let entry = components.entry(normalize_key(&component)).or_default();
            let assessed = entry
                .as_deref()
                .is_some_and(|value| !value.trim().is_empty());
            if !assessed {
                *entry = severity;
            }
        }
        Ok(Self { components })
    }
}

/// "Engine Block" and "engine-block" both become `engine_block`.
pub(crate) fn normalize_key(value: &str) -> String {
    let cleaned = value.replace(['\u{feff}', '\u{200b}'], "");
    cleaned
        .split(|c: char| c.is_whitespace() || c == '-')
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("_")
        .to_ascii_lowercase()
}

/// A full inspection: one component assessment per section that was inspected.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DamageAssessment {
    sections: BTreeMap<DamageSection, ComponentAssessment>,
}

impl DamageAssessment {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_section(mut self, section: DamageSection, assessment: ComponentAssessment) -> Self {
        self.sections.insert(section, assessment);
        self
    }

    pub fn section(&self, section: DamageSection) -> Option<&ComponentAssessment> {
        self.sections.get(&section)
    }

    pub fn section_mut(&mut self, section: DamageSection) -> &mut ComponentAssessment {
        self.sections.entry(section).or_default()
    }

    /// Every assessed (section, component, severity) triple.
    pub fn triples(&self) -> impl Iterator<Item = AssessedComponent<'_>> + '_ {
        self.sections.iter().flat_map(|(section, assessment)| {
            assessment
                .assessed()
                .map(move |(component, severity)| AssessedComponent {
                    section: *section,
                    component,
                    severity,
                })
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AssessedComponent<'a> {
    pub section: DamageSection,
    pub component: &'a str,
    pub severity: &'a str,
}

/// Valuation details supplied by the policy and vehicle records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VehicleValuation {
    #[serde(default)]
    pub market_value: Option<Decimal>,
    pub manufacture_year: i32,
    #[serde(default)]
    pub salvage_value: Option<Decimal>,
    #[serde(default)]
    pub deductible: Option<Decimal>,
}

/// Identifying details of the vehicle under claim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VehicleDescriptor {
    pub registration: String,
    pub make: String,
    pub model: String,
}

/// Identifier wrapper for submitted claims.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ClaimId(pub String);

impl fmt::Display for ClaimId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Intake payload combining the inspection with the valuation record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClaimSubmission {
    pub vehicle: VehicleDescriptor,
    pub valuation: VehicleValuation,
    pub assessment: DamageAssessment,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClaimStatus {
    Submitted,
    Estimated,
    Settled,
    TotalLoss,
}

impl ClaimStatus {
    pub const fn ordered() -> [Self; 4] {
        [Self::Submitted, Self::Estimated, Self::Settled, Self::TotalLoss]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Submitted => "Submitted",
            Self::Estimated => "Estimated",
            Self::Settled => "Settled",
            Self::TotalLoss => "Total Loss",
        }
    }

    pub const fn is_closed(self) -> bool {
        matches!(self, Self::Settled | Self::TotalLoss)
    }
}
