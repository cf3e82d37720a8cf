//! Risk aggregator
//!
//! Runs every analysis component for one request and blends their scores into
//! a [`Verdict`]. Holds no per-request state, so one instance is shared across
//! all requests behind an `Arc`.

use std::sync::Arc;

use crate::model::policy::RegimeWeights;
use crate::model::{
    AnalysisRequest, CompiledCueRules, ComponentResult, Config, DomainLists, ExtractedUrls,
    Prediction, ScoringPolicy, Verdict, clamp_score,
};
use crate::service::consolidate::FindingConsolidator;
use crate::service::html::HtmlInspector;
use crate::service::lexical::LexicalAnalyzer;
use crate::service::profile::profile_multiplier;
use crate::service::reputation::{ReputationLookup, ReputationProvider};
use crate::service::semantic::{SemanticAnalyzer, TextClassifier};
use crate::service::signature::threat_signature;
use crate::service::url::{UrlEvaluator, merge_urls};

/// Why a request could not be scored
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum AnalysisError {
    #[error("Text must not be empty")]
    EmptyText,

    #[error("Text is {length} characters long, the limit is {limit}")]
    TextTooLong { length: usize, limit: usize },

    #[error("Analysis failed: {0}")]
    Internal(String),
}

/// Which blending regime a request fell into
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Regime {
    NoUrl,
    UrlDominant,
    Balanced,
}

pub struct RiskAggregator {
    policy: ScoringPolicy,
    lexical: LexicalAnalyzer,
    html: HtmlInspector,
    urls: UrlEvaluator,
    semantic: SemanticAnalyzer,
    reputation: ReputationLookup,
    consolidator: FindingConsolidator,
    max_text_chars: usize,
}

impl RiskAggregator {
    /// Wire up every component from configuration
    ///
    /// `classifier` is `None` when the semantic signal is disabled.
    pub fn new(
        config: &Config,
        rules: CompiledCueRules,
        classifier: Option<Arc<dyn TextClassifier>>,
        provider: Arc<dyn ReputationProvider>,
    ) -> Self {
        let policy = config.scoring.clone();
        let lists: Arc<DomainLists> = Arc::new(config.lists.clone());

        let semantic = match classifier {
            Some(classifier) => {
                SemanticAnalyzer::new(classifier, policy.semantic.clone(), &config.semantic)
            }
            None => SemanticAnalyzer::disabled(policy.semantic.clone()),
        };

        Self {
            lexical: LexicalAnalyzer::new(Arc::new(rules), lists.clone(), policy.lexical.clone()),
            html: HtmlInspector::new(policy.url.anchor_mismatch, policy.lexical.hidden_html_text),
            urls: UrlEvaluator::new(lists.clone(), policy.url.clone()),
            semantic,
            reputation: ReputationLookup::new(provider, lists, policy.reputation.clone()),
            consolidator: FindingConsolidator::new(policy.max_reasons),
            max_text_chars: config.max_text_chars,
            policy,
        }
    }

    pub fn semantic(&self) -> &SemanticAnalyzer {
        &self.semantic
    }

    pub async fn analyze(&self, request: &AnalysisRequest) -> Result<Verdict, AnalysisError> {
        let text = request.text.as_str();
        self.validate(text)?;

        // Lexical, with any hidden-text tricks from the HTML body
        let html = request
            .html
            .as_deref()
            .filter(|h| !h.trim().is_empty())
            .map(|h| self.html.inspect(h))
            .unwrap_or_default();
        let lexical = {
            let mut findings = self.lexical.analyze(text).into_findings();
            findings.extend(html.lexical_findings);
            ComponentResult::from_findings(findings)
        };

        let urls = merge_urls(self.urls.extract(text), html.links);
        let url_eval = self.urls.evaluate_with(text, &urls, &html.url_findings);

        let (semantic, reputation) = tokio::join!(
            self.semantic.analyze(text),
            self.reputation
                .assess(request.sender.as_deref(), &url_eval.domains)
        );

        let tiers = &self.policy.tiers;
        let regime = self.regime(url_eval.has_urls(), url_eval.result.score());
        let blended = self
            .regime_weights(regime)
            .blend(lexical.score(), semantic.score(), url_eval.result.score());

        let multiplier = profile_multiplier(
            request.profile.as_ref(),
            text,
            self.policy.max_profile_multiplier,
        );
        let mut raw = blended * multiplier
            + f64::from(reputation.result.score())
            + f64::from(reputation.trust_adjustment);
        if url_eval.ip_literal {
            raw = raw.max(f64::from(self.policy.ip_literal_floor));
        }
        let score = clamp_score(raw.round() as i64);

        let risk_level = tiers.level_for(score);
        let (prediction, confidence) = if score >= tiers.phishing {
            (Prediction::Phishing, f64::from(score) / 100.0)
        } else {
            (Prediction::Safe, 1.0 - f64::from(score) / 100.0)
        };

        tracing::debug!(
            lexical = lexical.score(),
            url = url_eval.result.score(),
            semantic = semantic.score(),
            reputation = reputation.result.score(),
            trust_adjustment = reputation.trust_adjustment,
            profile_multiplier = multiplier,
            regime = ?regime,
            "Component scores"
        );

        let findings: Vec<_> = lexical
            .into_findings()
            .into_iter()
            .chain(url_eval.result.into_findings())
            .chain(semantic.into_findings())
            .chain(reputation.result.into_findings())
            .collect();
        let reasons = self.consolidator.consolidate(&findings);
        let signature = threat_signature(text, reputation.sender_domain, &reasons);

        tracing::info!(
            score,
            risk_level = ?risk_level,
            prediction = prediction.as_str(),
            urls = url_eval.urls.len(),
            "Analysis complete"
        );

        Ok(Verdict {
            score,
            risk_level,
            reasons,
            extracted_urls: ExtractedUrls::from_urls(url_eval.urls),
            prediction,
            confidence: round_two_places(confidence),
            signature,
        })
    }

    fn validate(&self, text: &str) -> Result<(), AnalysisError> {
        if text.trim().is_empty() {
            return Err(AnalysisError::EmptyText);
        }
        let length = text.chars().count();
        if length > self.max_text_chars {
            return Err(AnalysisError::TextTooLong {
                length,
                limit: self.max_text_chars,
            });
        }
        Ok(())
    }

    fn regime(&self, has_urls: bool, url_score: u32) -> Regime {
        if !has_urls {
            Regime::NoUrl
        } else if url_score >= self.policy.blend.high_confidence_url_score {
            Regime::UrlDominant
        } else {
            Regime::Balanced
        }
    }

    fn regime_weights(&self, regime: Regime) -> &RegimeWeights {
        match regime {
            Regime::NoUrl => &self.policy.blend.no_url,
            Regime::UrlDominant => &self.policy.blend.url_dominant,
            Regime::Balanced => &self.policy.blend.balanced,
        }
    }
}

fn round_two_places(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{
        CueRuleSet, NO_URLS_SENTINEL, RecipientProfile, ReputationLists, RiskLevel,
    };
    use crate::service::consolidate::NO_INDICATORS_REASON;
    use crate::service::reputation::StaticReputationProvider;
    use crate::service::reputation::testing::MemoryReputationProvider;
    use crate::service::semantic::testing::{FailingClassifier, StaticClassifier};

    fn rules() -> CompiledCueRules {
        CueRuleSet::builtin().unwrap().compile().unwrap()
    }

    fn aggregator_with(
        classifier: Option<Arc<dyn TextClassifier>>,
        provider: Arc<dyn ReputationProvider>,
    ) -> RiskAggregator {
        RiskAggregator::new(&Config::default(), rules(), classifier, provider)
    }

    fn aggregator() -> RiskAggregator {
        aggregator_with(
            None,
            Arc::new(StaticReputationProvider::new(ReputationLists::default())),
        )
    }

    #[tokio::test]
    async fn test_rejects_empty_and_oversized_text() {
        let aggregator = aggregator();
        let err = aggregator.analyze(&AnalysisRequest::new("   \n")).await.unwrap_err();
        assert!(matches!(err, AnalysisError::EmptyText));

        let config = Config {
            max_text_chars: 10,
            ..Config::default()
        };
        let small = RiskAggregator::new(
            &config,
            rules(),
            None,
            Arc::new(StaticReputationProvider::new(ReputationLists::default())),
        );
        let err = small
            .analyze(&AnalysisRequest::new("this text is too long"))
            .await
            .unwrap_err();
        assert!(matches!(err, AnalysisError::TextTooLong { limit: 10, .. }));
    }

    #[tokio::test]
    async fn test_benign_message() {
        let verdict = aggregator()
            .analyze(&AnalysisRequest::new("Are we still on for lunch on Friday?"))
            .await
            .unwrap();
        assert_eq!(verdict.score, 0);
        assert_eq!(verdict.risk_level, RiskLevel::Low);
        assert_eq!(verdict.prediction, Prediction::Safe);
        assert_eq!(verdict.confidence, 1.0);
        assert_eq!(verdict.reasons, vec![NO_INDICATORS_REASON]);
    }

    #[tokio::test]
    async fn test_no_urls_reports_sentinel() {
        let verdict = aggregator()
            .analyze(&AnalysisRequest::new("Your account is locked, act now"))
            .await
            .unwrap();
        assert_eq!(verdict.extracted_urls, ExtractedUrls::NoneDetected);
        let json = serde_json::to_value(&verdict).unwrap();
        assert_eq!(json["extracted_urls"], NO_URLS_SENTINEL);
    }

    #[tokio::test]
    async fn test_trusted_sender_scores_lower_than_failing_sender() {
        let text = "Your account has been locked. Verify your password immediately.";
        let aggregator = aggregator();

        let trusted = aggregator
            .analyze(&AnalysisRequest::new(text).with_sender("service@paypal.com"))
            .await
            .unwrap();
        let blacklisted = aggregator
            .analyze(&AnalysisRequest::new(text).with_sender("alerts@badsite.tk"))
            .await
            .unwrap();
        assert!(blacklisted.score >= trusted.score + 30);

        let memory = aggregator_with(
            None,
            Arc::new(MemoryReputationProvider {
                trusted_domains: vec![],
            }),
        );
        let neutral = memory
            .analyze(&AnalysisRequest::new(text).with_sender("support@example.com"))
            .await
            .unwrap();
        let failing = memory
            .analyze(&AnalysisRequest::new(text).with_sender("fail@example.com"))
            .await
            .unwrap();
        assert_eq!(failing.score, neutral.score + 30);
        assert_eq!(failing.signature.sender_domain.as_deref(), Some("example.com"));
    }

    #[tokio::test]
    async fn test_ip_literal_floor() {
        let verdict = aggregator()
            .analyze(&AnalysisRequest::new("Login at http://1.2.3.4/login"))
            .await
            .unwrap();
        assert!(verdict.score >= 30);
        assert!(verdict.risk_level >= RiskLevel::Medium);
        assert!(
            verdict
                .reasons
                .iter()
                .any(|r| r.contains("IP address instead of domain"))
        );
        assert_eq!(verdict.extracted_urls.as_slice(), ["http://1.2.3.4/login"]);
    }

    #[tokio::test]
    async fn test_brand_lookalike_reaches_high() {
        let verdict = aggregator()
            .analyze(&AnalysisRequest::new(
                "Your Microsoft account will be suspended. \
                 Verify immediately at http://micros0ft-security.top",
            ))
            .await
            .unwrap();
        assert_eq!(verdict.risk_level, RiskLevel::High);
        assert_eq!(verdict.prediction, Prediction::Phishing);
        assert!(verdict.reasons.iter().any(|r| r.contains("Brand 'microsoft'")));
        assert!(verdict.reasons.iter().any(|r| r.contains("Suspicious TLD: .top")));
        assert_eq!(verdict.confidence, f64::from(verdict.score) / 100.0);
    }

    #[tokio::test]
    async fn test_reasons_are_bounded() {
        let text = "URGENT!!! FINAL NOTICE NOW. Dear Customer, \
                    your acount is suspended and locked. \
                    Unauthorized login, legal action. \
                    Verify your password, confirm, update, click. \
                    You won a prize in the lottery, \
                    claim your reward via wire transfer or gift card. \
                    The CEO and IT support insist. \
                    http://paypa1-login.tk/verify http://1.2.3.4/x.exe \
                    bit.ly/abc http://a.b.c.d.e.secure-update.xyz/webscr";
        let verdict = aggregator()
            .analyze(&AnalysisRequest::new(text).with_sender("PayPal <x@badsite.tk>"))
            .await
            .unwrap();
        assert!(verdict.reasons.len() <= 6);
        assert!(verdict.score <= 100);
        assert_eq!(verdict.risk_level, RiskLevel::High);
    }

    #[tokio::test]
    async fn test_semantic_signal_is_blended() {
        let text = "Please review the attached document before our meeting";
        let without = aggregator()
            .analyze(&AnalysisRequest::new(text))
            .await
            .unwrap();

        let classifier = StaticClassifier::new(&[("authority", 0.9), ("financial scam", 0.8)]);
        let with = aggregator_with(
            Some(Arc::new(classifier)),
            Arc::new(StaticReputationProvider::new(ReputationLists::default())),
        )
        .analyze(&AnalysisRequest::new(text))
        .await
        .unwrap();

        // no-URL regime: 0.45 * min(100, 0.9 * 70 + 0.8 * 90)
        assert_eq!(without.score, 0);
        assert_eq!(with.score, 45);
        assert_eq!(with.risk_level, RiskLevel::Medium);
    }

    #[tokio::test]
    async fn test_failing_classifier_degrades() {
        let aggregator = aggregator_with(
            Some(Arc::new(FailingClassifier)),
            Arc::new(StaticReputationProvider::new(ReputationLists::default())),
        );
        let verdict = aggregator
            .analyze(&AnalysisRequest::new("Quarterly report attached"))
            .await
            .unwrap();
        assert_eq!(verdict.score, 0);
        assert!(
            verdict
                .reasons
                .iter()
                .any(|r| r.starts_with("Semantic analysis unavailable"))
        );
    }

    #[tokio::test]
    async fn test_html_links_are_evaluated() {
        let request = AnalysisRequest::new("Your PayPal statement is ready")
            .with_html(r#"<a href="http://paypal-statements.tk/view">https://www.paypal.com</a>"#);
        let verdict = aggregator().analyze(&request).await.unwrap();
        assert_eq!(
            verdict.extracted_urls.as_slice(),
            ["http://paypal-statements.tk/view"]
        );
        assert!(verdict.reasons.iter().any(|r| r.contains("Link text shows")));
        assert!(verdict.score >= 30);
    }

    #[tokio::test]
    async fn test_profile_raises_score() {
        let text = "Urgent payment needed: wire transfer the invoice amount today";
        let base = aggregator()
            .analyze(&AnalysisRequest::new(text))
            .await
            .unwrap();
        let targeted = aggregator()
            .analyze(&AnalysisRequest::new(text).with_profile(RecipientProfile {
                job_role: Some("CFO".to_string()),
                department: Some("finance".to_string()),
            }))
            .await
            .unwrap();
        assert!(targeted.score > base.score);
    }

    #[tokio::test]
    async fn test_identical_requests_yield_identical_verdicts() {
        let aggregator = aggregator_with(
            Some(Arc::new(StaticClassifier::new(&[("urgent", 0.6)]))),
            Arc::new(StaticReputationProvider::new(ReputationLists::default())),
        );
        let request = AnalysisRequest::new("Verify now at http://secure-login.xyz")
            .with_sender("noreply@secure-login.xyz");
        let first = aggregator.analyze(&request).await.unwrap();
        let second = aggregator.analyze(&request).await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_shared_across_tasks() {
        let aggregator = Arc::new(aggregator());
        let request = AnalysisRequest::new("Act now: http://evil.tk/login");
        let expected = aggregator.analyze(&request).await.unwrap();

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let aggregator = aggregator.clone();
                let request = request.clone();
                tokio::spawn(async move { aggregator.analyze(&request).await.unwrap() })
            })
            .collect();
        for handle in handles {
            assert_eq!(handle.await.unwrap(), expected);
        }
    }

    #[tokio::test]
    async fn test_score_bounds_and_monotonic_tiers() {
        let aggregator = aggregator();
        let texts = [
            "hello",
            "Verify your account",
            "URGENT: your account is locked, verify at http://1.2.3.4/login",
            "You won the lottery! Claim your prize via wire transfer at http://prize.tk",
        ];
        let mut verdicts = Vec::new();
        for text in texts {
            verdicts.push(aggregator.analyze(&AnalysisRequest::new(text)).await.unwrap());
        }
        for verdict in &verdicts {
            assert!(verdict.score <= 100);
            assert_eq!(
                verdict.risk_level,
                Config::default().scoring.tiers.level_for(verdict.score)
            );
        }
        verdicts.sort_by_key(|v| v.score);
        assert!(verdicts.windows(2).all(|w| w[0].risk_level <= w[1].risk_level));
        assert!(
            verdicts
                .iter()
                .flat_map(|v| v.reasons.iter())
                .all(|r| !r.is_empty())
        );
    }
}
