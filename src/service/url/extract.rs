//! Candidate URL extraction and normalisation

use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;

use crate::model::DomainLists;

/// Permissive pattern: explicit schemes, `www.` prefixes and bare domain tokens
static URL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r#"(?i)https?://[^\s<>"'`]+|www\.[^\s<>"'`]+|"#,
        r#"\b(?:[a-z0-9](?:[a-z0-9-]{0,61}[a-z0-9])?\.)+[a-z]{2,24}\b(?:/[^\s<>"'`]*)?"#,
    ))
    .expect("URL pattern is valid")
});

const TRAILING_PUNCTUATION: &[char] = &[
    '.', ',', ';', ':', '!', '?', ')', ']', '}', '\'', '"', '>',
];
const LEADING_PUNCTUATION: &[char] = &['(', '[', '{', '<', '\'', '"'];

/// A link found in the message, normalised to carry a scheme
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedUrl {
    /// Normalised form, always with a scheme
    pub normalized: String,
}

impl ExtractedUrl {
    /// Normalise one candidate token; returns `None` when nothing is left after trimming
    pub fn from_candidate(candidate: &str) -> Option<Self> {
        let trimmed = candidate
            .trim_start_matches(LEADING_PUNCTUATION)
            .trim_end_matches(TRAILING_PUNCTUATION);
        if trimmed.is_empty() {
            return None;
        }

        let lower = trimmed.to_ascii_lowercase();
        let normalized = if lower.starts_with("http://") || lower.starts_with("https://") {
            trimmed.to_string()
        } else {
            format!("http://{}", trimmed)
        };
        Some(Self { normalized })
    }

    fn dedup_key(&self) -> String {
        self.normalized.trim_end_matches('/').to_ascii_lowercase()
    }
}

/// Extract, normalise and de-duplicate candidate URLs in first-seen order
pub fn extract_urls(text: &str, lists: &DomainLists) -> Vec<ExtractedUrl> {
    let mut seen = HashSet::new();
    let mut urls = Vec::new();

    for m in URL_PATTERN.find_iter(text) {
        // The domain half of an email address is not a link
        if text[..m.start()].ends_with('@') {
            continue;
        }

        let candidate = m.as_str();
        let has_scheme = candidate.to_ascii_lowercase().starts_with("http");
        let has_www = candidate.to_ascii_lowercase().starts_with("www.");
        if !has_scheme && !has_www && !is_plausible_bare_domain(candidate, lists) {
            continue;
        }

        if let Some(url) = ExtractedUrl::from_candidate(candidate)
            && seen.insert(url.dedup_key())
        {
            urls.push(url);
        }
    }

    tracing::debug!(count = urls.len(), "Extracted candidate URLs from text");
    urls
}

/// Merge additional URLs (e.g. HTML link targets) keeping the first occurrence
pub fn merge_urls(mut base: Vec<ExtractedUrl>, extra: Vec<ExtractedUrl>) -> Vec<ExtractedUrl> {
    let mut seen: HashSet<String> = base.iter().map(ExtractedUrl::dedup_key).collect();
    for url in extra {
        if seen.insert(url.dedup_key()) {
            base.push(url);
        }
    }
    base
}

fn is_plausible_bare_domain(candidate: &str, lists: &DomainLists) -> bool {
    let host = candidate
        .split('/')
        .next()
        .unwrap_or(candidate)
        .trim_end_matches(TRAILING_PUNCTUATION);
    host.rsplit('.')
        .next()
        .map(|tld| lists.is_known_tld(tld))
        .unwrap_or(false)
}
