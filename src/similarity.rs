//! Pairwise similarity between finding fingerprints
//!
//! Scoring runs in two stages. Identity-conflict vetoes come first and force a score
//! of zero whenever the two findings look like different people who share a name.
//! Only when no veto fires are the weighted topical signals summed and clamped.

use std::collections::BTreeSet;
use std::fmt;
use tracing::{debug, info};

use crate::fingerprint::{EventType, Fingerprint};
use crate::TARGET_SIMILARITY;

const EVENT_TYPE_WEIGHT: f64 = 0.4;
const ENTITY_WEIGHT: f64 = 0.3;
const SAME_YEAR_WEIGHT: f64 = 0.2;
const ADJACENT_YEAR_WEIGHT: f64 = 0.1;
const SHARED_KEYWORDS_WEIGHT: f64 = 0.1;
const MIN_SHARED_KEYWORDS: usize = 2;
const COMPANY_WEIGHT: f64 = 0.2;
const DATE_RANGE_WEIGHT: f64 = 0.2;
const STRONG_CONTENT_WEIGHT: f64 = 0.15;
const WEAK_CONTENT_WEIGHT: f64 = 0.08;
const STRONG_CONTENT_JACCARD: f64 = 0.5;
const WEAK_CONTENT_JACCARD: f64 = 0.3;

/// Maximum distance in years for two findings to count as temporally close
pub const MAX_YEAR_GAP: i32 = 1;

/// Reason two fingerprints were judged to describe different people
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentityConflict {
    /// One finding frames the subject as a victim, the other does not
    VictimMismatch,
    /// Both genders are known and differ
    GenderMismatch,
    /// Both name companies and none of them overlap
    CompanyMismatch,
    /// Both name titles and companies and neither overlaps
    TitleAndCompanyMismatch,
}

impl fmt::Display for IdentityConflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IdentityConflict::VictimMismatch => write!(f, "victim/perpetrator mismatch"),
            IdentityConflict::GenderMismatch => write!(f, "gender mismatch"),
            IdentityConflict::CompanyMismatch => write!(f, "no company overlap"),
            IdentityConflict::TitleAndCompanyMismatch => {
                write!(f, "no title or company overlap")
            }
        }
    }
}

/// Two company sets overlap when some name in one contains some name in the other.
pub fn companies_overlap(a: &BTreeSet<String>, b: &BTreeSet<String>) -> bool {
    a.iter()
        .any(|c1| b.iter().any(|c2| c1.contains(c2.as_str()) || c2.contains(c1.as_str())))
}

fn titles_overlap(a: &BTreeSet<String>, b: &BTreeSet<String>) -> bool {
    a.intersection(b).next().is_some()
}

/// Smallest absolute difference between any year in `a` and any year in `b`.
fn min_year_gap(a: &[i32], b: &[i32]) -> Option<i32> {
    a.iter()
        .flat_map(|y1| b.iter().map(move |y2| (y1 - y2).abs()))
        .min()
}

/// True if the two year lists share a year or come within `MAX_YEAR_GAP` of each other.
pub fn years_within_range(a: &[i32], b: &[i32]) -> bool {
    matches!(min_year_gap(a, b), Some(gap) if gap <= MAX_YEAR_GAP)
}

/// Jaccard index of two word sets; 0 when both are empty.
pub fn jaccard(a: &BTreeSet<String>, b: &BTreeSet<String>) -> f64 {
    let union = a.union(b).count();
    if union == 0 {
        return 0.0;
    }
    a.intersection(b).count() as f64 / union as f64
}

/// Checks the identity-conflict rules in order and returns the first that fires.
pub fn detect_identity_conflict(a: &Fingerprint, b: &Fingerprint) -> Option<IdentityConflict> {
    if a.is_victim != b.is_victim {
        return Some(IdentityConflict::VictimMismatch);
    }

    if a.gender.is_known() && b.gender.is_known() && a.gender != b.gender {
        return Some(IdentityConflict::GenderMismatch);
    }

    let both_have_companies = !a.companies.is_empty() && !b.companies.is_empty();
    let company_overlap = companies_overlap(&a.companies, &b.companies);

    if both_have_companies && !company_overlap {
        return Some(IdentityConflict::CompanyMismatch);
    }

    // Never wins under this ordering: a disjoint company pair has already returned above
    if both_have_companies
        && !a.titles.is_empty()
        && !b.titles.is_empty()
        && !titles_overlap(&a.titles, &b.titles)
        && !company_overlap
    {
        return Some(IdentityConflict::TitleAndCompanyMismatch);
    }

    None
}

/// Similarity in `[0, 1]` between two fingerprints. Symmetric in its arguments.
pub fn calculate_similarity(a: &Fingerprint, b: &Fingerprint) -> f64 {
    if let Some(conflict) = detect_identity_conflict(a, b) {
        info!(
            target: TARGET_SIMILARITY,
            "Identity conflict ({}): keeping findings apart (companies {:?} vs {:?}, titles {:?} vs {:?}, gender {} vs {}, victim {} vs {})",
            conflict,
            a.companies,
            b.companies,
            a.titles,
            b.titles,
            a.gender,
            b.gender,
            a.is_victim,
            b.is_victim
        );
        return 0.0;
    }

    let mut score = 0.0;

    if a.event_type == b.event_type && a.event_type != EventType::Other {
        score += EVENT_TYPE_WEIGHT;
    }

    let shared_entities = a.entities.intersection(&b.entities).count();
    let entity_denominator = a.entities.len().max(b.entities.len()).max(1);
    score += ENTITY_WEIGHT * shared_entities as f64 / entity_denominator as f64;

    let year_gap = min_year_gap(&a.years, &b.years);
    match year_gap {
        Some(0) => score += SAME_YEAR_WEIGHT,
        Some(gap) if gap <= MAX_YEAR_GAP => score += ADJACENT_YEAR_WEIGHT,
        _ => {}
    }

    if a.keywords.intersection(&b.keywords).count() >= MIN_SHARED_KEYWORDS {
        score += SHARED_KEYWORDS_WEIGHT;
    }

    if !a.companies.is_empty()
        && !b.companies.is_empty()
        && companies_overlap(&a.companies, &b.companies)
    {
        score += COMPANY_WEIGHT;
    }

    // Deliberately counted on top of the year term above
    if years_within_range(&a.years, &b.years) {
        score += DATE_RANGE_WEIGHT;
    }

    let content = jaccard(&a.content_words, &b.content_words);
    if content > STRONG_CONTENT_JACCARD {
        score += STRONG_CONTENT_WEIGHT;
    } else if content > WEAK_CONTENT_JACCARD {
        score += WEAK_CONTENT_WEIGHT;
    }

    let score = score.clamp(0.0, 1.0);
    debug!(
        target: TARGET_SIMILARITY,
        "Similarity {:.3} (type {} vs {}, shared entities {}, year gap {:?}, content jaccard {:.2})",
        score,
        a.event_type,
        b.event_type,
        shared_entities,
        year_gap,
        content
    );
    score
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fingerprint::{extract_fingerprint, Gender};

    fn set(items: &[&str]) -> BTreeSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn base() -> Fingerprint {
        Fingerprint {
            event_type: EventType::RegulatoryInvestigation,
            entities: set(&["icac"]),
            years: vec![2019],
            keywords: set(&["probe", "investigation"]),
            content_words: set(&["icac", "probe", "wang"]),
            ..Fingerprint::default()
        }
    }

    #[test]
    fn test_identical_findings_score_high() {
        let a = extract_fingerprint("ICAC probe into Wang", "Opened in 2019.");
        let b = extract_fingerprint("ICAC probe into Wang", "Opened in 2019.");
        let score = calculate_similarity(&a, &b);
        assert!(score >= 0.9, "score was {}", score);
        assert!(score <= 1.0);
    }

    #[test]
    fn test_victim_veto_overrides_everything() {
        let a = Fingerprint {
            is_victim: true,
            ..base()
        };
        let b = base();
        assert_eq!(
            detect_identity_conflict(&a, &b),
            Some(IdentityConflict::VictimMismatch)
        );
        assert_eq!(calculate_similarity(&a, &b), 0.0);
        assert_eq!(calculate_similarity(&b, &a), 0.0);
    }

    #[test]
    fn test_both_victims_do_not_conflict() {
        let a = Fingerprint {
            is_victim: true,
            ..base()
        };
        let b = a.clone();
        assert_eq!(detect_identity_conflict(&a, &b), None);
        assert!(calculate_similarity(&a, &b) > 0.0);
    }

    #[test]
    fn test_gender_veto_requires_both_known() {
        let male = Fingerprint {
            gender: Gender::Male,
            ..base()
        };
        let female = Fingerprint {
            gender: Gender::Female,
            ..base()
        };
        let unknown = base();
        assert_eq!(
            detect_identity_conflict(&male, &female),
            Some(IdentityConflict::GenderMismatch)
        );
        assert_eq!(detect_identity_conflict(&male, &unknown), None);
        assert_eq!(calculate_similarity(&male, &female), 0.0);
    }

    #[test]
    fn test_company_veto_uses_substring_overlap() {
        let a = Fingerprint {
            companies: set(&["acme holdings"]),
            ..base()
        };
        let b = Fingerprint {
            companies: set(&["acme holdings limited"]),
            ..base()
        };
        let c = Fingerprint {
            companies: set(&["globex corporation"]),
            ..base()
        };
        assert_eq!(detect_identity_conflict(&a, &b), None);
        assert_eq!(
            detect_identity_conflict(&a, &c),
            Some(IdentityConflict::CompanyMismatch)
        );
        // A one-sided company mention is not a conflict
        assert_eq!(detect_identity_conflict(&a, &base()), None);
    }

    #[test]
    fn test_disjoint_titles_and_companies_report_company_mismatch() {
        let a = Fingerprint {
            companies: set(&["acme holdings"]),
            titles: set(&["director"]),
            ..base()
        };
        let b = Fingerprint {
            companies: set(&["globex corporation"]),
            titles: set(&["chairman"]),
            ..base()
        };
        assert_eq!(
            detect_identity_conflict(&a, &b),
            Some(IdentityConflict::CompanyMismatch)
        );
        assert_eq!(
            detect_identity_conflict(&b, &a),
            Some(IdentityConflict::CompanyMismatch)
        );
        assert_eq!(calculate_similarity(&a, &b), 0.0);

        // Overlapping companies clear both company vetoes even when titles differ
        let c = Fingerprint {
            companies: set(&["acme holdings limited"]),
            titles: set(&["chairman"]),
            ..base()
        };
        assert_eq!(detect_identity_conflict(&a, &c), None);
    }

    #[test]
    fn test_company_overlap_adds_weight() {
        let a = Fingerprint {
            companies: set(&["acme holdings"]),
            ..Fingerprint::default()
        };
        let b = Fingerprint {
            companies: set(&["acme holdings limited"]),
            ..Fingerprint::default()
        };
        assert!((calculate_similarity(&a, &b) - COMPANY_WEIGHT).abs() < 1e-9);
    }

    #[test]
    fn test_score_components() {
        // Same event type only
        let a = Fingerprint {
            event_type: EventType::CriminalCharge,
            ..Fingerprint::default()
        };
        assert!((calculate_similarity(&a, &a.clone()) - 0.4).abs() < 1e-9);

        // "other" never earns the event type weight
        let other = Fingerprint::default();
        assert_eq!(calculate_similarity(&other, &other.clone()), 0.0);

        // Adjacent years: 0.1 from the year term plus 0.2 from the range term
        let y1 = Fingerprint {
            years: vec![2018],
            ..Fingerprint::default()
        };
        let y2 = Fingerprint {
            years: vec![2019],
            ..Fingerprint::default()
        };
        assert!((calculate_similarity(&y1, &y2) - 0.3).abs() < 1e-9);

        // Same year: 0.2 plus 0.2
        assert!((calculate_similarity(&y1, &y1.clone()) - 0.4).abs() < 1e-9);

        // Years further apart earn nothing
        let y3 = Fingerprint {
            years: vec![2015],
            ..Fingerprint::default()
        };
        assert_eq!(calculate_similarity(&y1, &y3), 0.0);
    }

    #[test]
    fn test_entity_overlap_is_proportional() {
        let a = Fingerprint {
            entities: set(&["icac", "high court"]),
            ..Fingerprint::default()
        };
        let b = Fingerprint {
            entities: set(&["icac"]),
            ..Fingerprint::default()
        };
        assert!((calculate_similarity(&a, &b) - 0.15).abs() < 1e-9);
    }

    #[test]
    fn test_keyword_and_content_terms() {
        let a = Fingerprint {
            keywords: set(&["fraud", "probe"]),
            content_words: set(&["alpha", "beta", "gamma"]),
            ..Fingerprint::default()
        };
        let b = Fingerprint {
            keywords: set(&["fraud", "probe", "arrest"]),
            content_words: set(&["alpha", "beta", "delta"]),
            ..Fingerprint::default()
        };
        // Jaccard 2/4 = 0.5 is not strictly above 0.5, so the weak weight applies
        assert!((calculate_similarity(&a, &b) - (0.1 + 0.08)).abs() < 1e-9);
    }

    #[test]
    fn test_similarity_is_symmetric_and_bounded() {
        let texts = [
            ("ICAC probe into Wang", "The ICAC investigation began in 2019."),
            ("Wang charged with fraud", "He was charged in 2020 by police."),
            (
                "Acme Holdings director fined",
                "The SFC fined Wang, director of Acme Holdings, in 2018.",
            ),
            ("Wang was killed by her former boyfriend", "Hong Kong, 2019."),
            ("王某被廉政公署调查", "2019年廉政公署对其展开调查"),
            ("", ""),
        ];
        let fps: Vec<Fingerprint> = texts
            .iter()
            .map(|(h, s)| extract_fingerprint(h, s))
            .collect();
        for a in &fps {
            for b in &fps {
                let ab = calculate_similarity(a, b);
                let ba = calculate_similarity(b, a);
                assert!((0.0..=1.0).contains(&ab));
                assert!((ab - ba).abs() < 1e-12);
            }
        }
    }

    #[test]
    fn test_jaccard_and_year_helpers() {
        assert_eq!(jaccard(&BTreeSet::new(), &BTreeSet::new()), 0.0);
        assert!((jaccard(&set(&["a", "b"]), &set(&["b", "c"])) - 1.0 / 3.0).abs() < 1e-9);
        assert!(years_within_range(&[2018, 2022], &[2019]));
        assert!(!years_within_range(&[2015], &[2019]));
        assert!(!years_within_range(&[], &[2019]));
    }
}
