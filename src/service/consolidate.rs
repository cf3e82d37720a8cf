//! Finding consolidation into a short, readable reason list

use std::collections::HashSet;
use url::Url;

use crate::model::{Finding, FindingCategory};

/// Sole reason reported when nothing was found
pub const NO_INDICATORS_REASON: &str = "No strong phishing indicators";

const URL_PREFIX: &str = "URL: ";
const URL_SEPARATOR: &str = " - ";

#[derive(Debug, Clone)]
pub struct FindingConsolidator {
    max_reasons: usize,
}

impl FindingConsolidator {
    pub fn new(max_reasons: usize) -> Self {
        Self { max_reasons }
    }

    /// Collapse repeated cues, tidy URL messages, de-duplicate, rank and truncate
    pub fn consolidate(&self, findings: &[Finding]) -> Vec<String> {
        if findings.is_empty() {
            return vec![NO_INDICATORS_REASON.to_string()];
        }

        let mut summaries: Vec<String> = Vec::new();
        let mut summarised: Vec<FindingCategory> = Vec::new();
        for finding in findings {
            let category = finding.category;
            if !category.is_cue() || summarised.contains(&category) {
                continue;
            }
            let count = findings.iter().filter(|f| f.category == category).count();
            if count >= 2 {
                summarised.push(category);
                summaries.push(format!("{} cues detected ({} instances)", category, count));
            }
        }

        let multi_url = distinct_urls(findings) > 1;
        let mut remaining: Vec<(i32, String)> = findings
            .iter()
            .filter(|f| !summarised.contains(&f.category))
            .map(|f| (f.weight, display_message(f, multi_url)))
            .collect();
        // Stable: equal weights keep their original order
        remaining.sort_by(|a, b| b.0.cmp(&a.0));

        let mut seen = HashSet::new();
        let reasons: Vec<String> = summaries
            .into_iter()
            .chain(remaining.into_iter().map(|(_, message)| message))
            .filter(|message| seen.insert(message.clone()))
            .take(self.max_reasons)
            .collect();

        if reasons.is_empty() {
            vec![NO_INDICATORS_REASON.to_string()]
        } else {
            reasons
        }
    }
}

/// Split `URL: <url> - <detail>` into its URL and detail
fn split_url_message(message: &str) -> Option<(&str, &str)> {
    message
        .strip_prefix(URL_PREFIX)?
        .split_once(URL_SEPARATOR)
}

fn distinct_urls(findings: &[Finding]) -> usize {
    findings
        .iter()
        .filter(|f| f.category == FindingCategory::Url)
        .filter_map(|f| split_url_message(&f.message).map(|(url, _)| url))
        .collect::<HashSet<_>>()
        .len()
}

fn display_message(finding: &Finding, multi_url: bool) -> String {
    if finding.category != FindingCategory::Url {
        return finding.message.clone();
    }
    match split_url_message(&finding.message) {
        Some((url, detail)) if multi_url => {
            let host = Url::parse(url)
                .ok()
                .and_then(|u| u.host_str().map(str::to_string))
                .unwrap_or_else(|| url.to_string());
            format!("{}: {}", host, detail)
        }
        Some((_, detail)) => detail.to_string(),
        None => finding.message.clone(),
    }
}
