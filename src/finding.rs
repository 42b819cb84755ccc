use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;

use crate::fingerprint::{extract_fingerprint, EventType, Fingerprint};

/// Severity assigned to an adverse finding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    Red,
    Amber,
    Review,
}

impl Severity {
    /// Ordering weight used when ranking findings, higher is more severe.
    pub fn rank(self) -> u8 {
        match self {
            Severity::Red => 2,
            Severity::Amber => 1,
            Severity::Review => 0,
        }
    }

    /// Returns the more severe of the two.
    pub fn max(self, other: Severity) -> Severity {
        if other.rank() > self.rank() {
            other
        } else {
            self
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Red => write!(f, "RED"),
            Severity::Amber => write!(f, "AMBER"),
            Severity::Review => write!(f, "REVIEW"),
        }
    }
}

impl From<&str> for Severity {
    fn from(s: &str) -> Self {
        match s.trim().to_uppercase().as_str() {
            "RED" => Severity::Red,
            "AMBER" => Severity::Amber,
            _ => Severity::Review,
        }
    }
}

/// A cited source page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceRef {
    pub url: String,
    pub title: String,
}

/// One adverse claim extracted from one article by the analysis stage
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawFinding {
    pub url: String,
    #[serde(default)]
    pub title: String,
    pub severity: Severity,
    pub headline: String,
    #[serde(default)]
    pub summary: String,

    // Precomputed by an earlier pass, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fingerprint: Option<Fingerprint>,

    // Assigned by the upstream incident-clustering pass
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cluster_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cluster_label: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub article_content: Option<String>,
    #[serde(default)]
    pub fetch_failed: bool,
}

impl RawFinding {
    pub fn new(url: &str, title: &str, severity: Severity, headline: &str, summary: &str) -> Self {
        RawFinding {
            url: url.to_string(),
            title: title.to_string(),
            severity,
            headline: headline.to_string(),
            summary: summary.to_string(),
            fingerprint: None,
            cluster_id: None,
            cluster_label: None,
            article_content: None,
            fetch_failed: false,
        }
    }

    pub fn with_cluster(mut self, cluster_id: &str, cluster_label: Option<&str>) -> Self {
        self.cluster_id = Some(cluster_id.to_string());
        self.cluster_label = cluster_label.map(str::to_string);
        self
    }

    pub fn with_article_content(mut self, content: &str) -> Self {
        self.article_content = Some(content.to_string());
        self
    }

    pub fn with_fingerprint(mut self, fingerprint: Fingerprint) -> Self {
        self.fingerprint = Some(fingerprint);
        self
    }

    /// Returns the precomputed fingerprint, or derives one from headline and summary.
    pub fn fingerprint(&self) -> Cow<'_, Fingerprint> {
        match &self.fingerprint {
            Some(fp) => Cow::Borrowed(fp),
            None => Cow::Owned(extract_fingerprint(&self.headline, &self.summary)),
        }
    }

    pub fn source(&self) -> SourceRef {
        SourceRef {
            url: self.url.clone(),
            title: self.title.clone(),
        }
    }
}

/// A duplicate or low-value page already known to belong to a cluster
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParkedArticle {
    pub url: String,
    #[serde(default)]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cluster_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cluster_label: Option<String>,
}

impl ParkedArticle {
    pub fn source(&self) -> SourceRef {
        SourceRef {
            url: self.url.clone(),
            title: self.title.clone(),
        }
    }
}

/// One consolidated, cited incident handed to report rendering
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsolidatedFinding {
    pub headline: String,
    pub summary: String,
    pub severity: Severity,
    pub event_type: EventType,
    pub date_range: String,
    pub source_count: usize,
    pub sources: Vec<SourceRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cluster_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cluster_label: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub article_contents: Vec<String>,
    #[serde(default)]
    pub fetch_failed: bool,
}

impl ConsolidatedFinding {
    /// Adds sources whose URL is not already cited and refreshes `source_count`.
    pub fn append_sources<I>(&mut self, extra: I)
    where
        I: IntoIterator<Item = SourceRef>,
    {
        for source in extra {
            if !self.sources.iter().any(|s| s.url == source.url) {
                self.sources.push(source);
            }
        }
        self.source_count = self.sources.len();
    }
}

/// Collects the distinct sources of a set of findings, in member order.
pub fn distinct_sources(findings: &[&RawFinding]) -> Vec<SourceRef> {
    let mut sources: Vec<SourceRef> = Vec::with_capacity(findings.len());
    for finding in findings {
        if !sources.iter().any(|s| s.url == finding.url) {
            sources.push(finding.source());
        }
    }
    sources
}
