//! Lexical cue matcher
//!
//! Scores raw message text against the compiled cue rule table plus a handful
//! of fixed structural checks (shouting, obfuscation tricks, brand mentions).

use regex::Regex;
use std::sync::{Arc, LazyLock};
use url::Url;

use crate::model::policy::LexicalWeights;
use crate::model::{CompiledCueRules, ComponentResult, DomainLists, Finding, FindingCategory};
use crate::service::url::domain::mentioned_brands;
use crate::service::url::extract_urls;

/// Three or more consecutive all-caps words
static ALL_CAPS_RUN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b[A-Z]{2,}(?:[ \t]+[A-Z]{2,}){2,}\b").expect("all-caps pattern is valid")
});

static SYMBOL_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[*~^%]{5,}").expect("symbol-run pattern is valid"));

const EXCLAMATION_LIMIT: usize = 5;

#[derive(Clone)]
pub struct LexicalAnalyzer {
    rules: Arc<CompiledCueRules>,
    lists: Arc<DomainLists>,
    weights: LexicalWeights,
}

impl LexicalAnalyzer {
    pub fn new(
        rules: Arc<CompiledCueRules>,
        lists: Arc<DomainLists>,
        weights: LexicalWeights,
    ) -> Self {
        Self {
            rules,
            lists,
            weights,
        }
    }

    pub fn analyze(&self, text: &str) -> ComponentResult {
        let mut findings = self.cue_findings(text);
        findings.extend(self.spelling_findings(text));
        findings.extend(self.greeting_finding(text));
        findings.extend(self.brand_finding(text));
        findings.extend(self.emphasis_findings(text));
        findings.extend(self.obfuscation_findings(text));

        let result = ComponentResult::from_findings(findings);
        tracing::debug!(
            score = result.score(),
            findings = result.findings().len(),
            rules_version = self.rules.version,
            "Lexical analysis complete"
        );
        result
    }

    /// Rule-table cues; each category total is capped, so a finding's weight is
    /// what it added before the cap was reached (possibly zero)
    fn cue_findings(&self, text: &str) -> Vec<Finding> {
        let mut findings = Vec::new();
        for category in &self.rules.categories {
            let mut total = 0;
            for pattern in &category.patterns {
                if !pattern.regex.is_match(text) {
                    continue;
                }
                let contribution = pattern.weight.min(category.cap - total).max(0);
                total += contribution;
                findings.push(Finding::new(
                    category.category,
                    format!("{} cue: '{}'", category.category, pattern.label),
                    contribution,
                ));
            }
        }
        findings
    }

    fn spelling_findings(&self, text: &str) -> Vec<Finding> {
        self.rules
            .misspellings
            .iter()
            .filter(|(_, regex)| regex.is_match(text))
            .map(|(word, _)| {
                Finding::new(
                    FindingCategory::Spelling,
                    format!("Misspelled word: '{}'", word),
                    self.weights.misspelling,
                )
            })
            .collect()
    }

    fn greeting_finding(&self, text: &str) -> Option<Finding> {
        self.rules
            .salutations
            .iter()
            .find_map(|regex| regex.find(text))
            .map(|m| {
                Finding::new(
                    FindingCategory::Greeting,
                    format!("Generic greeting: '{}'", m.as_str()),
                    self.weights.generic_greeting,
                )
            })
    }

    /// A brand is named but none of the message's links belong to it
    fn brand_finding(&self, text: &str) -> Option<Finding> {
        let hosts: Vec<String> = extract_urls(text, &self.lists)
            .iter()
            .filter_map(|u| Url::parse(&u.normalized).ok())
            .filter_map(|u| u.host_str().map(str::to_ascii_lowercase))
            .collect();
        if hosts.is_empty() {
            return None;
        }

        mentioned_brands(&text.to_lowercase(), &self.lists)
            .into_iter()
            .find(|brand| !hosts.iter().any(|h| brand.owns(h)))
            .map(|brand| {
                Finding::new(
                    FindingCategory::Authority,
                    format!("Mentions {} but links to other domains", brand.name),
                    self.weights.brand_without_domain,
                )
            })
    }

    fn emphasis_findings(&self, text: &str) -> Vec<Finding> {
        let mut findings = Vec::new();
        if ALL_CAPS_RUN.is_match(text) {
            findings.push(Finding::new(
                FindingCategory::Urgency,
                "Shouting: run of all-caps words",
                self.weights.all_caps_run,
            ));
        }

        if text.contains("!!!") || text.matches('!').count() >= EXCLAMATION_LIMIT {
            findings.push(Finding::new(
                FindingCategory::Urgency,
                "Excessive exclamation marks",
                self.weights.excessive_exclamation,
            ));
        }
        findings
    }

    fn obfuscation_findings(&self, text: &str) -> Vec<Finding> {
        let mut findings = Vec::new();

        let zero_width = text.chars().filter(|c| is_zero_width(*c)).count();
        if zero_width > 0 {
            findings.push(Finding::new(
                FindingCategory::Obfuscation,
                format!("Hidden zero-width characters ({})", zero_width),
                self.weights.zero_width,
            ));
        }

        if SYMBOL_RUN.is_match(text) {
            findings.push(Finding::new(
                FindingCategory::Obfuscation,
                "Runs of filler symbols",
                self.weights.symbol_run,
            ));
        }

        if let Some(word) = text.split_whitespace().find(|w| is_mixed_script(w)) {
            findings.push(Finding::new(
                FindingCategory::Obfuscation,
                format!("Word mixes Latin with Cyrillic or Greek letters: '{}'", word),
                self.weights.mixed_script,
            ));
        }

        if text.chars().any(is_math_alphanumeric) {
            findings.push(Finding::new(
                FindingCategory::Obfuscation,
                "Mathematical alphanumeric symbols used as letters",
                self.weights.math_symbols,
            ));
        }

        findings
    }
}

fn is_zero_width(c: char) -> bool {
    matches!(c, '\u{200B}'..='\u{200D}' | '\u{FEFF}')
}

fn is_math_alphanumeric(c: char) -> bool {
    ('\u{1D400}'..='\u{1D7FF}').contains(&c)
}

fn is_mixed_script(word: &str) -> bool {
    let latin = word.chars().any(|c| c.is_ascii_alphabetic());
    let lookalike = word
        .chars()
        .any(|c| matches!(c, '\u{0370}'..='\u{03FF}' | '\u{0400}'..='\u{04FF}'));
    latin && lookalike
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::CueRuleSet;

    fn analyzer() -> LexicalAnalyzer {
        let rules = CueRuleSet::builtin().unwrap().compile().unwrap();
        LexicalAnalyzer::new(
            Arc::new(rules),
            Arc::new(DomainLists::default()),
            LexicalWeights::default(),
        )
    }

    fn categories(result: &ComponentResult) -> Vec<FindingCategory> {
        result.findings().iter().map(|f| f.category).collect()
    }

    #[test]
    fn test_benign_text_scores_zero() {
        let result = analyzer().analyze("Hi Sam, lunch on Thursday still works for me.");
        assert_eq!(result.score(), 0);
        assert!(result.findings().is_empty());
    }

    #[test]
    fn test_category_cap_limits_contribution() {
        let text =
            "URGENT: act now, respond immediately, within 24 hours, final notice, limited time";
        let result = analyzer().analyze(text);
        let urgency: i32 = result
            .findings()
            .iter()
            .filter(|f| f.category == FindingCategory::Urgency && f.message.contains("cue"))
            .map(|f| f.weight)
            .sum();
        assert_eq!(urgency, 30);
        assert!(
            result
                .findings()
                .iter()
                .any(|f| f.category == FindingCategory::Urgency && f.weight == 0)
        );
    }

    #[test]
    fn test_misspellings_and_greeting() {
        let result = analyzer().analyze("Dear Customer, please verfy your acount.");
        let cats = categories(&result);
        assert_eq!(cats.iter().filter(|c| **c == FindingCategory::Spelling).count(), 2);
        assert!(cats.contains(&FindingCategory::Greeting));
    }

    #[test]
    fn test_brand_without_matching_link() {
        let result = analyzer().analyze("Your PayPal payment failed, see http://pay-check.xyz/now");
        assert!(
            result
                .findings()
                .iter()
                .any(|f| f.message.contains("Mentions paypal"))
        );

        let clean = analyzer().analyze("Your PayPal receipt is at https://www.paypal.com/activity");
        assert!(
            !clean
                .findings()
                .iter()
                .any(|f| f.message.contains("Mentions paypal"))
        );
    }

    #[test]
    fn test_shouting_and_exclamations() {
        let result = analyzer().analyze("YOU HAVE WON BIG!!! Reply today");
        let messages: Vec<&str> = result.findings().iter().map(|f| f.message.as_str()).collect();
        assert!(messages.contains(&"Shouting: run of all-caps words"));
        assert!(messages.contains(&"Excessive exclamation marks"));
    }

    #[test]
    fn test_obfuscation_tricks() {
        let analyzer = analyzer();
        let zero_width = analyzer.analyze("pass\u{200B}word reset");
        assert!(categories(&zero_width).contains(&FindingCategory::Obfuscation));

        let mixed = analyzer.analyze("Log in to your \u{0410}pple account");
        assert!(
            mixed
                .findings()
                .iter()
                .any(|f| f.message.contains("mixes Latin"))
        );

        let math = analyzer.analyze("Claim your \u{1D41F}\u{1D42B}\u{1D41E}\u{1D41E} gift");
        assert!(
            math.findings()
                .iter()
                .any(|f| f.message.contains("Mathematical"))
        );

        let symbols = analyzer.analyze("Offer ***** ends");
        assert!(
            symbols
                .findings()
                .iter()
                .any(|f| f.message == "Runs of filler symbols")
        );
    }

    #[test]
    fn test_score_is_clamped() {
        let text = "URGENT!!! FINAL NOTICE NOW. Dear Customer, \
                    your account is suspended and locked. \
                    Unauthorized login, legal action. \
                    Verify your password, confirm, update, click. \
                    You won a prize in the lottery, \
                    claim your reward via wire transfer or gift card. \
                    The CEO and IT support and the government insist. \
                    recieve acount passwrod securty \
                    \u{200B} ***** \u{1D41F}";
        let result = analyzer().analyze(text);
        assert_eq!(result.score(), 100);
    }
}
