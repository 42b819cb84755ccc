use regex::Regex;
use std::collections::BTreeSet;
use tracing::debug;
use unicode_normalization::UnicodeNormalization;

use super::patterns::{
    is_stopword, keyword_vocabulary, location_vocabulary, COMPANY_PATTERNS, DIGIT_RUN,
    ENGLISH_WORD, ENTITY_PATTERNS, EVENT_PATTERNS, FEMALE_PATTERNS, HAN_RUN, MALE_PATTERNS,
    TITLE_PATTERNS, VICTIM_PATTERNS,
};
use super::types::{EventType, Fingerprint, Gender};
use crate::TARGET_FINGERPRINT;

/// Extract a comparison fingerprint from a finding's headline and summary.
///
/// Pure and total: the same text always yields the same fingerprint, and text that
/// matches nothing yields empty sets with `EventType::Other`.
pub fn extract_fingerprint(headline: &str, summary: &str) -> Fingerprint {
    // NFKC folds full-width digits and letters common in Chinese-language press
    let text: String = format!("{} {}", headline, summary).nfkc().collect();
    let lowered = text.to_lowercase();

    let fingerprint = Fingerprint {
        event_type: detect_event_type(&text),
        entities: collect_matches(&ENTITY_PATTERNS, &text),
        years: extract_years(&text),
        keywords: vocabulary_hits(keyword_vocabulary(), &lowered),
        content_words: extract_content_words(&lowered),
        companies: collect_matches(&COMPANY_PATTERNS, &text),
        titles: collect_matches(&TITLE_PATTERNS, &text),
        locations: vocabulary_hits(location_vocabulary(), &lowered),
        gender: detect_gender(&text),
        is_victim: any_match(&VICTIM_PATTERNS, &text),
    };

    debug!(
        target: TARGET_FINGERPRINT,
        "Fingerprint for '{}': type={}, entities={:?}, years={:?}, companies={:?}, titles={:?}, gender={}, victim={}",
        headline,
        fingerprint.event_type,
        fingerprint.entities,
        fingerprint.years,
        fingerprint.companies,
        fingerprint.titles,
        fingerprint.gender,
        fingerprint.is_victim
    );

    fingerprint
}

fn detect_event_type(text: &str) -> EventType {
    EVENT_PATTERNS
        .iter()
        .find(|(_, patterns)| any_match(patterns, text))
        .map(|(event_type, _)| *event_type)
        .unwrap_or(EventType::Other)
}

/// Four-digit runs from 1900 to 2099. Longer digit runs (amounts, phone numbers) are
/// not treated as years.
fn extract_years(text: &str) -> Vec<i32> {
    let years: BTreeSet<i32> = DIGIT_RUN
        .find_iter(text)
        .map(|m| m.as_str())
        .filter(|run| run.len() == 4 && (run.starts_with("19") || run.starts_with("20")))
        .filter_map(|run| run.parse().ok())
        .collect();
    years.into_iter().collect()
}

fn collect_matches(patterns: &[Regex], text: &str) -> BTreeSet<String> {
    patterns
        .iter()
        .flat_map(|pattern| pattern.find_iter(text))
        .map(|m| m.as_str().trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .collect()
}

fn vocabulary_hits(vocabulary: &[&str], lowered: &str) -> BTreeSet<String> {
    vocabulary
        .iter()
        .filter(|term| lowered.contains(*term))
        .map(|term| term.to_string())
        .collect()
}

fn any_match(patterns: &[Regex], text: &str) -> bool {
    patterns.iter().any(|pattern| pattern.is_match(text))
}

fn detect_gender(text: &str) -> Gender {
    if any_match(&FEMALE_PATTERNS, text) {
        Gender::Female
    } else if any_match(&MALE_PATTERNS, text) {
        Gender::Male
    } else {
        Gender::Unknown
    }
}

fn extract_content_words(lowered: &str) -> BTreeSet<String> {
    ENGLISH_WORD
        .find_iter(lowered)
        .chain(HAN_RUN.find_iter(lowered))
        .map(|m| m.as_str())
        .filter(|word| !is_stopword(word))
        .map(str::to_string)
        .collect()
}
