use tracing::debug;

use crate::finding::RawFinding;
use crate::fingerprint::Fingerprint;
use crate::similarity::calculate_similarity;
use crate::TARGET_CONSOLIDATION;

use super::{DEFAULT_SAME_PERSON_THRESHOLD, DEFAULT_SIMILARITY_THRESHOLD};

/// Similarity cut-offs used by the grouper
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GroupingThresholds {
    /// Required similarity when the seed and candidate share no entity
    pub threshold: f64,
    /// Lower bar applied when they share at least one entity
    pub same_person_threshold: f64,
}

impl Default for GroupingThresholds {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_SIMILARITY_THRESHOLD,
            same_person_threshold: DEFAULT_SAME_PERSON_THRESHOLD,
        }
    }
}

impl GroupingThresholds {
    fn effective(&self, seed: &Fingerprint, candidate: &Fingerprint) -> f64 {
        if seed.shares_entity_with(candidate) {
            self.same_person_threshold
        } else {
            self.threshold
        }
    }
}

/// Greedy single-link grouping seeded in input order.
///
/// Each unassigned fingerprint opens a group and claims every later unassigned
/// fingerprint whose similarity to the seed (not to other members) reaches the
/// effective threshold. Returns groups of indices into `fingerprints`; together they
/// partition `0..fingerprints.len()`.
pub fn group_by_similarity(
    fingerprints: &[Fingerprint],
    thresholds: &GroupingThresholds,
) -> Vec<Vec<usize>> {
    let mut assigned = vec![false; fingerprints.len()];
    let mut groups = Vec::new();

    for seed in 0..fingerprints.len() {
        if assigned[seed] {
            continue;
        }
        assigned[seed] = true;
        let mut group = vec![seed];

        for candidate in (seed + 1)..fingerprints.len() {
            if assigned[candidate] {
                continue;
            }
            let seed_fp = &fingerprints[seed];
            let candidate_fp = &fingerprints[candidate];
            let score = calculate_similarity(seed_fp, candidate_fp);
            let required = thresholds.effective(seed_fp, candidate_fp);
            if score >= required {
                debug!(
                    target: TARGET_CONSOLIDATION,
                    "Grouping finding {} with seed {} (similarity {:.3} >= {:.2})",
                    candidate,
                    seed,
                    score,
                    required
                );
                assigned[candidate] = true;
                group.push(candidate);
            }
        }

        groups.push(group);
    }

    groups
}

/// Groups findings that appear to describe the same incident.
///
/// Uses each finding's precomputed fingerprint when present.
pub fn group_findings_by_similarity<'a>(
    findings: &'a [RawFinding],
    thresholds: &GroupingThresholds,
) -> Vec<Vec<&'a RawFinding>> {
    if findings.len() <= 1 {
        return findings.iter().map(|f| vec![f]).collect();
    }

    let fingerprints: Vec<Fingerprint> = findings
        .iter()
        .map(|finding| finding.fingerprint().into_owned())
        .collect();

    group_by_similarity(&fingerprints, thresholds)
        .into_iter()
        .map(|group| group.into_iter().map(|i| &findings[i]).collect())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::finding::Severity;
    use crate::fingerprint::EventType;
    use std::collections::BTreeSet;

    fn finding(url: &str, headline: &str, summary: &str) -> RawFinding {
        RawFinding::new(url, url, Severity::Amber, headline, summary)
    }

    fn fp_with_entities(event_type: EventType, entities: &[&str]) -> Fingerprint {
        Fingerprint {
            event_type,
            entities: entities.iter().map(|s| s.to_string()).collect::<BTreeSet<_>>(),
            ..Fingerprint::default()
        }
    }

    #[test]
    fn test_empty_and_single_inputs() {
        let none: Vec<RawFinding> = Vec::new();
        assert!(group_findings_by_similarity(&none, &GroupingThresholds::default()).is_empty());

        let one = vec![finding("u1", "ICAC probe into Wang", "")];
        let groups = group_findings_by_similarity(&one, &GroupingThresholds::default());
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].len(), 1);
        assert_eq!(groups[0][0].url, "u1");
    }

    #[test]
    fn test_same_incident_is_grouped() {
        let findings = vec![
            finding("u1", "ICAC probe into Wang", "The probe began in 2019."),
            finding("u2", "Wang opens a bakery", "Nothing adverse here."),
            finding("u3", "ICAC probe into Wang", "Investigators visited in 2019."),
        ];
        let groups = group_findings_by_similarity(&findings, &GroupingThresholds::default());
        assert_eq!(groups.len(), 2);
        let urls: Vec<&str> = groups[0].iter().map(|f| f.url.as_str()).collect();
        assert_eq!(urls, vec!["u1", "u3"]);
        assert_eq!(groups[1][0].url, "u2");
    }

    #[test]
    fn test_victim_finding_stays_apart() {
        let findings = vec![
            finding(
                "u1",
                "Wang was killed by her former boyfriend",
                "Police in Hong Kong investigated the 2019 death.",
            ),
            finding(
                "u2",
                "Wang investigated by police",
                "Police in Hong Kong investigated Wang in 2019.",
            ),
        ];
        let groups = group_findings_by_similarity(&findings, &GroupingThresholds::default());
        assert_eq!(groups.len(), 2);
    }

    #[test]
    fn test_shared_entity_lowers_threshold() {
        // One shared entity out of two scores 0.15, below both default thresholds
        let a = fp_with_entities(EventType::Other, &["icac", "sfc"]);
        let b = fp_with_entities(EventType::Other, &["icac"]);
        let groups = group_by_similarity(&[a.clone(), b.clone()], &GroupingThresholds::default());
        assert_eq!(groups.len(), 2);

        let relaxed = GroupingThresholds {
            threshold: 0.9,
            same_person_threshold: 0.1,
        };
        // Shared entity means the 0.1 bar applies instead of 0.9
        assert_eq!(group_by_similarity(&[a, b], &relaxed).len(), 1);
    }

    #[test]
    fn test_comparison_is_against_seed_only() {
        let thresholds = GroupingThresholds {
            threshold: 0.3,
            same_person_threshold: 0.3,
        };
        // seed ~ middle through years; middle ~ last through years; seed and last are
        // two years apart and share nothing else
        let seed = Fingerprint {
            years: vec![2018],
            ..Fingerprint::default()
        };
        let middle = Fingerprint {
            years: vec![2019],
            ..Fingerprint::default()
        };
        let last = Fingerprint {
            years: vec![2020],
            ..Fingerprint::default()
        };
        let groups = group_by_similarity(&[seed, middle, last], &thresholds);
        assert_eq!(groups, vec![vec![0, 1], vec![2]]);
    }

    #[test]
    fn test_precomputed_fingerprints_are_used() {
        // The texts share nothing, but the precomputed fingerprints describe one incident
        let incident = Fingerprint {
            event_type: EventType::CriminalCharge,
            entities: ["icac".to_string()].into_iter().collect(),
            years: vec![2019],
            ..Fingerprint::default()
        };
        let findings = vec![
            finding("u1", "Wang opens a bakery", "2005").with_fingerprint(incident.clone()),
            finding("u2", "Harbour ferry timetable", "").with_fingerprint(incident.clone()),
            // Identical text to u1, but its fingerprint marks a victim
            finding("u3", "Wang opens a bakery", "2005").with_fingerprint(Fingerprint {
                is_victim: true,
                ..incident
            }),
        ];
        let groups = group_findings_by_similarity(&findings, &GroupingThresholds::default());
        let urls: Vec<Vec<&str>> = groups
            .iter()
            .map(|g| g.iter().map(|f| f.url.as_str()).collect())
            .collect();
        assert_eq!(urls, vec![vec!["u1", "u2"], vec!["u3"]]);
    }

    #[test]
    fn test_groups_partition_input() {
        let findings = vec![
            finding("u1", "ICAC probe into Wang", "2019"),
            finding("u2", "SFC fines Acme Holdings", "2017"),
            finding("u3", "ICAC probe into Wang", "2019"),
            finding("u4", "Wang was killed by her former boyfriend", "2019"),
            finding("u5", "SFC fines Acme Holdings", "2017 penalty"),
            finding("u6", "", ""),
        ];
        let groups = group_findings_by_similarity(&findings, &GroupingThresholds::default());
        let mut urls: Vec<&str> = groups.iter().flatten().map(|f| f.url.as_str()).collect();
        urls.sort();
        assert_eq!(urls, vec!["u1", "u2", "u3", "u4", "u5", "u6"]);
        assert!(groups.iter().all(|g| !g.is_empty()));
    }
}
