use anyhow::{anyhow, Result};
use std::collections::HashMap;
use tokio::time::Instant;
use tracing::{error, info};

use crate::finding::{ConsolidatedFinding, ParkedArticle, RawFinding};
use crate::fingerprint::Fingerprint;
use crate::TARGET_CONSOLIDATION;

use super::consolidate::{format_date_range, Consolidator};
use super::grouping::group_by_similarity;

/// Parked articles indexed by the cluster they belong to. Articles without a cluster
/// id cannot be attributed and are left out.
fn parked_by_cluster(parked: &[ParkedArticle]) -> HashMap<&str, Vec<&ParkedArticle>> {
    let mut map: HashMap<&str, Vec<&ParkedArticle>> = HashMap::new();
    for article in parked {
        if let Some(cluster_id) = article.cluster_id.as_deref() {
            map.entry(cluster_id).or_default().push(article);
        }
    }
    map
}

/// Groups the given finding indices by cluster id, in order of first appearance.
fn group_by_cluster_id(findings: &[RawFinding], indices: &[usize]) -> Vec<Vec<usize>> {
    let mut positions: HashMap<&str, usize> = HashMap::new();
    let mut groups: Vec<Vec<usize>> = Vec::new();
    for &i in indices {
        let Some(cluster_id) = findings[i].cluster_id.as_deref() else {
            continue;
        };
        match positions.get(cluster_id) {
            Some(&position) => groups[position].push(i),
            None => {
                positions.insert(cluster_id, groups.len());
                groups.push(vec![i]);
            }
        }
    }
    groups
}

/// Every finding index must appear in exactly one group.
fn verify_partition(groups: &[Vec<usize>], total: usize) -> Result<()> {
    let mut seen = vec![false; total];
    for &i in groups.iter().flatten() {
        if i >= total {
            return Err(anyhow!(
                "group refers to finding {} but only {} findings were given",
                i,
                total
            ));
        }
        if seen[i] {
            return Err(anyhow!("finding {} assigned to more than one group", i));
        }
        seen[i] = true;
    }
    match seen.iter().position(|assigned| !assigned) {
        Some(missing) => Err(anyhow!("finding {} was not assigned to any group", missing)),
        None => Ok(()),
    }
}

/// A single-member group needs no merging.
fn consolidate_single(finding: &RawFinding) -> ConsolidatedFinding {
    let fingerprint = finding.fingerprint();
    ConsolidatedFinding {
        headline: finding.headline.clone(),
        summary: finding.summary.clone(),
        severity: finding.severity,
        event_type: fingerprint.event_type,
        date_range: format_date_range(&fingerprint.years),
        source_count: 1,
        sources: vec![finding.source()],
        cluster_id: finding.cluster_id.clone(),
        cluster_label: finding.cluster_label.clone(),
        article_contents: finding.article_content.iter().cloned().collect(),
        fetch_failed: finding.fetch_failed,
    }
}

/// Most severe first, then best sourced. The sort is stable, so equal findings keep
/// their grouping order.
pub fn sort_consolidated(findings: &mut [ConsolidatedFinding]) {
    findings.sort_by(|a, b| {
        b.severity
            .rank()
            .cmp(&a.severity.rank())
            .then_with(|| b.source_count.cmp(&a.source_count))
    });
}

impl Consolidator {
    /// Turn raw per-article findings into deduplicated, cited incidents.
    ///
    /// Findings carrying an upstream cluster id are grouped by that id without any
    /// similarity scoring; the rest are fingerprinted and grouped heuristically.
    /// Parked articles add sources to the cluster they belong to. Provider failures
    /// are handled per group and never abort the run.
    ///
    /// # Errors
    /// Only if grouping loses or duplicates a finding, which is an internal bug.
    pub async fn consolidate_findings(
        &self,
        findings: &[RawFinding],
        subject_name: &str,
        parked_articles: &[ParkedArticle],
    ) -> Result<Vec<ConsolidatedFinding>> {
        if findings.is_empty() {
            return Ok(Vec::new());
        }
        let start = Instant::now();

        let parked = parked_by_cluster(parked_articles);

        let (clustered, unclustered): (Vec<usize>, Vec<usize>) =
            (0..findings.len()).partition(|&i| findings[i].cluster_id.is_some());

        let mut groups = group_by_cluster_id(findings, &clustered);
        let cluster_group_count = groups.len();

        let fingerprints: Vec<Fingerprint> = unclustered
            .iter()
            .map(|&i| findings[i].fingerprint().into_owned())
            .collect();
        groups.extend(
            group_by_similarity(&fingerprints, self.thresholds())
                .into_iter()
                .map(|group| group.into_iter().map(|j| unclustered[j]).collect::<Vec<_>>()),
        );

        info!(
            target: TARGET_CONSOLIDATION,
            "Consolidating {} findings about '{}': {} cluster group(s), {} similarity group(s), {} parked article(s)",
            findings.len(),
            subject_name,
            cluster_group_count,
            groups.len() - cluster_group_count,
            parked_articles.len()
        );

        if let Err(e) = verify_partition(&groups, findings.len()) {
            error!(target: TARGET_CONSOLIDATION, "Grouping invariant violated: {}", e);
            return Err(e.context("consolidation grouping lost or duplicated a finding"));
        }

        let mut consolidated = Vec::with_capacity(groups.len());
        for group in &groups {
            let members: Vec<&RawFinding> = group.iter().map(|&i| &findings[i]).collect();

            let mut merged = if members.len() == 1 {
                consolidate_single(members[0])
            } else {
                self.consolidate_group_with_llm(&members, subject_name).await
            };

            if let Some(extra) = merged
                .cluster_id
                .as_deref()
                .and_then(|cluster_id| parked.get(cluster_id))
            {
                if merged.cluster_label.is_none() {
                    merged.cluster_label = extra.iter().find_map(|a| a.cluster_label.clone());
                }
                merged.append_sources(extra.iter().map(|article| article.source()));
            }

            consolidated.push(merged);
        }

        sort_consolidated(&mut consolidated);

        info!(
            target: TARGET_CONSOLIDATION,
            "Consolidated {} findings into {} incident(s) in {:?}",
            findings.len(),
            consolidated.len(),
            start.elapsed()
        );

        Ok(consolidated)
    }
}
