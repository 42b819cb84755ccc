use serde::Deserialize;
use std::collections::BTreeSet;
use std::sync::Arc;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::finding::{distinct_sources, ConsolidatedFinding, RawFinding, Severity};
use crate::fingerprint::EventType;
use crate::llm::{build_providers, CompletionProvider, ConsolidatorConfig};
use crate::prompt::consolidation_prompt;
use crate::util::extract_json_object;
use crate::{TARGET_CONSOLIDATION, TARGET_LLM_REQUEST};

use super::grouping::GroupingThresholds;

/// Separator used when summaries are concatenated without an LLM
pub const FALLBACK_SUMMARY_SEPARATOR: &str = " | ";

/// Consolidates findings into cited incidents, using an ordered chain of LLM providers
/// to write merged narratives.
pub struct Consolidator {
    providers: Vec<Arc<dyn CompletionProvider>>,
    thresholds: GroupingThresholds,
}

/// The fields an LLM must return for a merged group
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MergedNarrative {
    headline: String,
    summary: String,
    #[serde(default, alias = "event_type")]
    event_type: String,
    #[serde(default, alias = "date_range")]
    date_range: String,
}

fn parse_merged_narrative(response: &str) -> Option<MergedNarrative> {
    let value = extract_json_object(response)?;
    let narrative: MergedNarrative = serde_json::from_value(value).ok()?;
    if narrative.headline.trim().is_empty() || narrative.summary.trim().is_empty() {
        return None;
    }
    Some(narrative)
}

/// Formats a sorted year list as "", "2019" or "2017-2020".
pub fn format_date_range(years: &[i32]) -> String {
    match (years.first(), years.last()) {
        (Some(first), Some(last)) if first == last => first.to_string(),
        (Some(first), Some(last)) => format!("{}-{}", first, last),
        _ => String::new(),
    }
}

impl Consolidator {
    pub fn new(providers: Vec<Arc<dyn CompletionProvider>>, thresholds: GroupingThresholds) -> Self {
        Self {
            providers,
            thresholds,
        }
    }

    pub fn from_config(config: &ConsolidatorConfig) -> Self {
        Self::new(
            build_providers(config),
            GroupingThresholds {
                threshold: config.threshold,
                same_person_threshold: config.same_person_threshold,
            },
        )
    }

    pub fn thresholds(&self) -> &GroupingThresholds {
        &self.thresholds
    }

    /// Tries each provider in order and returns the first usable merge.
    async fn merge_with_providers(&self, prompt: &str) -> Option<MergedNarrative> {
        for provider in &self.providers {
            let start = Instant::now();
            match provider.complete(prompt).await {
                Ok(response) => match parse_merged_narrative(&response) {
                    Some(narrative) => {
                        info!(
                            target: TARGET_LLM_REQUEST,
                            "{} merged group in {:?}",
                            provider.name(),
                            start.elapsed()
                        );
                        return Some(narrative);
                    }
                    None => {
                        warn!(
                            target: TARGET_LLM_REQUEST,
                            "{} returned no usable JSON; trying next provider. Raw response: {}",
                            provider.name(),
                            response.chars().take(500).collect::<String>()
                        );
                    }
                },
                Err(e) => {
                    warn!(
                        target: TARGET_LLM_REQUEST,
                        "{} failed after {:?}: {:#}; trying next provider",
                        provider.name(),
                        start.elapsed(),
                        e
                    );
                }
            }
        }
        None
    }

    /// Merge a group of two or more findings about one incident into a single finding.
    ///
    /// Never fails: when every provider fails (or none are configured) the result is
    /// the first headline with all summaries joined by `" | "`.
    pub async fn consolidate_group_with_llm(
        &self,
        findings: &[&RawFinding],
        subject_name: &str,
    ) -> ConsolidatedFinding {
        let severity = findings
            .iter()
            .map(|f| f.severity)
            .fold(Severity::Review, Severity::max);
        let sources = distinct_sources(findings);

        let prompt = consolidation_prompt(findings, subject_name);
        let (headline, summary, event_type, date_range) =
            match self.merge_with_providers(&prompt).await {
                Some(narrative) => {
                    let date_range = if narrative.date_range.trim().is_empty() {
                        let years: BTreeSet<i32> = findings
                            .iter()
                            .flat_map(|f| f.fingerprint().years.clone())
                            .collect();
                        format_date_range(&years.into_iter().collect::<Vec<_>>())
                    } else {
                        narrative.date_range.trim().to_string()
                    };
                    (
                        narrative.headline.trim().to_string(),
                        narrative.summary.trim().to_string(),
                        EventType::from(narrative.event_type.as_str()),
                        date_range,
                    )
                }
                None => {
                    warn!(
                        target: TARGET_CONSOLIDATION,
                        "All {} provider(s) failed for a group of {} findings; using textual merge",
                        self.providers.len(),
                        findings.len()
                    );
                    (
                        findings
                            .first()
                            .map(|f| f.headline.clone())
                            .unwrap_or_default(),
                        findings
                            .iter()
                            .map(|f| f.summary.as_str())
                            .collect::<Vec<_>>()
                            .join(FALLBACK_SUMMARY_SEPARATOR),
                        EventType::Other,
                        String::new(),
                    )
                }
            };

        debug!(
            target: TARGET_CONSOLIDATION,
            "Consolidated {} findings into '{}' ({}, {} sources)",
            findings.len(),
            headline,
            severity,
            sources.len()
        );

        ConsolidatedFinding {
            headline,
            summary,
            severity,
            event_type,
            date_range,
            source_count: sources.len(),
            sources,
            cluster_id: findings.iter().find_map(|f| f.cluster_id.clone()),
            cluster_label: findings.iter().find_map(|f| f.cluster_label.clone()),
            article_contents: findings
                .iter()
                .filter_map(|f| f.article_content.clone())
                .collect(),
            fetch_failed: !findings.is_empty() && findings.iter().all(|f| f.fetch_failed),
        }
    }
}
