use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Event taxonomy, listed in matching priority order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    RegulatoryInvestigation,
    CriminalCharge,
    LegalProceedings,
    AdministrativePenalty,
    FinancialMisconduct,
    TrafficViolation,
    #[default]
    #[serde(other)]
    Other,
}

impl EventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::RegulatoryInvestigation => "regulatory_investigation",
            EventType::CriminalCharge => "criminal_charge",
            EventType::LegalProceedings => "legal_proceedings",
            EventType::AdministrativePenalty => "administrative_penalty",
            EventType::FinancialMisconduct => "financial_misconduct",
            EventType::TrafficViolation => "traffic_violation",
            EventType::Other => "other",
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl From<&str> for EventType {
    fn from(s: &str) -> Self {
        match s.trim().to_lowercase().replace([' ', '-'], "_").as_str() {
            "regulatory_investigation" => EventType::RegulatoryInvestigation,
            "criminal_charge" => EventType::CriminalCharge,
            "legal_proceedings" => EventType::LegalProceedings,
            "administrative_penalty" => EventType::AdministrativePenalty,
            "financial_misconduct" => EventType::FinancialMisconduct,
            "traffic_violation" => EventType::TrafficViolation,
            _ => EventType::Other,
        }
    }
}

/// Gender inferred from pronouns and relationship words
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
    #[default]
    Unknown,
}

impl Gender {
    pub fn is_known(&self) -> bool {
        *self != Gender::Unknown
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Gender::Male => write!(f, "male"),
            Gender::Female => write!(f, "female"),
            Gender::Unknown => write!(f, "unknown"),
        }
    }
}

/// Structured summary of a finding's text used for comparison.
///
/// All string sets are lowercase. Identity fields are always present and simply
/// empty (or `Unknown`/`false`) when nothing matched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct Fingerprint {
    pub event_type: EventType,
    pub entities: BTreeSet<String>,
    // Ascending, deduplicated
    pub years: Vec<i32>,
    pub keywords: BTreeSet<String>,
    pub content_words: BTreeSet<String>,

    // Identity signals
    pub companies: BTreeSet<String>,
    pub titles: BTreeSet<String>,
    pub locations: BTreeSet<String>,
    pub gender: Gender,
    pub is_victim: bool,
}

impl Fingerprint {
    /// True when both fingerprints name at least one identical entity.
    pub fn shares_entity_with(&self, other: &Fingerprint) -> bool {
        self.entities.intersection(&other.entities).next().is_some()
    }
}
