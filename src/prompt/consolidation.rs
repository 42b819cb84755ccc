use crate::finding::RawFinding;
use crate::prompt::common::{current_date, DONT_TELL_ME, JSON_ONLY};

/// Build the prompt asking an LLM to merge several findings about one incident into a
/// single narrative.
pub fn consolidation_prompt(findings: &[&RawFinding], subject_name: &str) -> String {
    let mut finding_list = String::new();
    for (i, finding) in findings.iter().enumerate() {
        finding_list.push_str(&format!(
            "Finding {}: [{}] {}\n{}\nSource: {} ({})\n\n",
            i + 1,
            finding.severity,
            finding.headline,
            finding.summary,
            if finding.title.is_empty() {
                "Untitled"
            } else {
                finding.title.as_str()
            },
            finding.url
        ));
    }

    format!(
        r#"You are assisting with a due-diligence screening of "{subject}".
The findings below were extracted from different articles and have been judged to describe the SAME real-world incident involving {subject}.

FINDINGS:
{findings}
Merge them into one consolidated finding:
1. Write a single factual headline of no more than 15 words.
2. Write a summary of 2-4 sentences that combines every distinct fact (dates, amounts, authorities, outcomes) reported across the findings. Do not invent facts.
3. Choose "eventType" from exactly one of: regulatory_investigation, criminal_charge, legal_proceedings, administrative_penalty, financial_misconduct, traffic_violation, other.
4. Set "dateRange" to the year or span of years the incident covers (for example "2019" or "2017-2020"), or "" if no date is known.
5. Write in clear English. Keep names of people and companies exactly as reported.

Return JSON with exactly these keys:
{{"headline": "...", "summary": "...", "eventType": "...", "dateRange": "..."}}
{json_only}{dont_tell_me}
Today's date: {date}
"#,
        subject = subject_name,
        findings = finding_list,
        json_only = JSON_ONLY,
        dont_tell_me = DONT_TELL_ME,
        date = current_date()
    )
}
