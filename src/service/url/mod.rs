//! URL / domain heuristic evaluator
//!
//! Extracts links from the message text and scores each one with
//! [`checks::UrlChecks`]. The component score is that of the worst link; the
//! findings are the union over all links.

pub mod checks;
pub mod domain;
pub mod extract;

use std::collections::HashSet;
use std::sync::Arc;

use crate::model::policy::UrlWeights;
use crate::model::{ComponentResult, DomainLists, Finding};

pub use checks::{TextContext, UrlAssessment, UrlChecks};
pub use extract::{ExtractedUrl, extract_urls, merge_urls};

/// Outcome of evaluating every link in a message
#[derive(Debug, Clone, Default)]
pub struct UrlEvaluation {
    pub result: ComponentResult,
    /// Normalised links in first-seen order
    pub urls: Vec<String>,
    /// Lowercase hosts of the links that parsed
    pub domains: Vec<String>,
    pub ip_literal: bool,
}

impl UrlEvaluation {
    pub fn has_urls(&self) -> bool {
        !self.urls.is_empty()
    }
}

#[derive(Clone)]
pub struct UrlEvaluator {
    lists: Arc<DomainLists>,
    weights: UrlWeights,
}

impl UrlEvaluator {
    pub fn new(lists: Arc<DomainLists>, weights: UrlWeights) -> Self {
        Self { lists, weights }
    }

    pub fn extract(&self, text: &str) -> Vec<ExtractedUrl> {
        extract_urls(text, &self.lists)
    }

    /// Score `urls` in the context of the message `text`
    pub fn evaluate(&self, text: &str, urls: &[ExtractedUrl]) -> UrlEvaluation {
        self.evaluate_with(text, urls, &[])
    }

    /// As [`evaluate`](Self::evaluate), adding externally found per-URL
    /// findings (`URL: <url> - ...`) to the link they name
    pub fn evaluate_with(
        &self,
        text: &str,
        urls: &[ExtractedUrl],
        extra: &[Finding],
    ) -> UrlEvaluation {
        if urls.is_empty() {
            return UrlEvaluation::default();
        }

        let text_lower = text.to_lowercase();
        let context = TextContext {
            brands_mentioned: domain::mentioned_brands(&text_lower, &self.lists),
            has_sensitive_keywords: self
                .lists
                .sensitive_keywords
                .iter()
                .any(|k| domain::contains_word(&text_lower, k)),
        };

        let checks = UrlChecks::new(&self.lists, &self.weights);
        let assessments: Vec<UrlAssessment> = urls
            .iter()
            .map(|u| {
                let mut assessment = checks.assess(u, &context);
                let prefix = format!("URL: {} - ", assessment.url);
                let attached: Vec<Finding> = extra
                    .iter()
                    .filter(|f| f.message.starts_with(&prefix))
                    .cloned()
                    .collect();
                if !attached.is_empty() {
                    let mut findings = assessment.result.into_findings();
                    findings.extend(attached);
                    assessment.result = ComponentResult::from_findings(findings);
                }
                assessment
            })
            .collect();

        let score = assessments
            .iter()
            .map(|a| a.result.score())
            .max()
            .unwrap_or(0);
        let ip_literal = assessments.iter().any(|a| a.ip_literal);

        let mut seen = HashSet::new();
        let mut findings: Vec<Finding> = Vec::new();
        let mut domains = Vec::new();
        for assessment in &assessments {
            for finding in assessment.result.findings() {
                if seen.insert(finding.message.clone()) {
                    findings.push(finding.clone());
                }
            }
            if let Some(host) = &assessment.host
                && !domains.contains(host)
            {
                domains.push(host.clone());
            }
        }

        tracing::debug!(
            urls = assessments.len(),
            score,
            ip_literal,
            "Evaluated message links"
        );

        UrlEvaluation {
            result: ComponentResult::new(i64::from(score), findings),
            urls: assessments.into_iter().map(|a| a.url).collect(),
            domains,
            ip_literal,
        }
    }

    /// Extract and evaluate in one step
    pub fn analyze(&self, text: &str) -> UrlEvaluation {
        let urls = self.extract(text);
        self.evaluate(text, &urls)
    }
}
