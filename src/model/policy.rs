//! Scoring policy: every tunable weight, threshold and cutoff in one place
//!
//! These values are deployment policy rather than protocol. Each section can be
//! overridden from the `scoring` block of the YAML configuration; anything left
//! out keeps the defaults below.

use serde::Deserialize;

use crate::model::RiskLevel;

/// Scores at or above this value are `High` risk
pub const HIGH_RISK_CUTOFF: u32 = 60;
/// Scores at or above this value are `Medium` risk
pub const MEDIUM_RISK_CUTOFF: u32 = 30;
/// Scores at or above this value are reported as `phishing`
pub const PHISHING_PREDICTION_CUTOFF: u32 = 50;
/// URL scores at or above this value let the URL signal dominate the blend
pub const HIGH_CONFIDENCE_URL_SCORE: u32 = 60;
/// Upper bound on the number of reasons in a verdict
pub const MAX_REASONS: usize = 6;

/// Risk tier cutoffs and the phishing/safe prediction threshold
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RiskTiers {
    pub high: u32,
    pub medium: u32,
    pub phishing: u32,
}

impl Default for RiskTiers {
    fn default() -> Self {
        Self {
            high: HIGH_RISK_CUTOFF,
            medium: MEDIUM_RISK_CUTOFF,
            phishing: PHISHING_PREDICTION_CUTOFF,
        }
    }
}

impl RiskTiers {
    pub fn level_for(&self, score: u32) -> RiskLevel {
        if score >= self.high {
            RiskLevel::High
        } else if score >= self.medium {
            RiskLevel::Medium
        } else {
            RiskLevel::Low
        }
    }
}

/// Component weights for one blending regime
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct RegimeWeights {
    pub lexical: f64,
    pub semantic: f64,
    pub url: f64,
}

impl RegimeWeights {
    pub fn blend(&self, lexical: u32, semantic: u32, url: u32) -> f64 {
        f64::from(lexical) * self.lexical
            + f64::from(semantic) * self.semantic
            + f64::from(url) * self.url
    }
}

/// Weighting regimes used by the aggregator
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BlendWeights {
    /// Applied when the message has no links
    pub no_url: RegimeWeights,
    /// Applied when the URL score reaches `high_confidence_url_score`
    pub url_dominant: RegimeWeights,
    /// Applied otherwise
    pub balanced: RegimeWeights,
    pub high_confidence_url_score: u32,
}

impl Default for BlendWeights {
    fn default() -> Self {
        Self {
            no_url: RegimeWeights {
                lexical: 0.55,
                semantic: 0.45,
                url: 0.0,
            },
            url_dominant: RegimeWeights {
                lexical: 0.2,
                semantic: 0.1,
                url: 0.7,
            },
            balanced: RegimeWeights {
                lexical: 0.4,
                semantic: 0.25,
                url: 0.35,
            },
            high_confidence_url_score: HIGH_CONFIDENCE_URL_SCORE,
        }
    }
}

/// Fixed penalties for the lexical checks outside the rule table
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LexicalWeights {
    pub misspelling: i32,
    pub generic_greeting: i32,
    pub brand_without_domain: i32,
    pub all_caps_run: i32,
    pub excessive_exclamation: i32,
    pub zero_width: i32,
    pub symbol_run: i32,
    pub mixed_script: i32,
    pub math_symbols: i32,
    pub hidden_html_text: i32,
}

impl Default for LexicalWeights {
    fn default() -> Self {
        Self {
            misspelling: 10,
            generic_greeting: 10,
            brand_without_domain: 15,
            all_caps_run: 10,
            excessive_exclamation: 10,
            zero_width: 20,
            symbol_run: 20,
            mixed_script: 20,
            math_symbols: 20,
            hidden_html_text: 10,
        }
    }
}

/// Per-check weights for the URL heuristics
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UrlWeights {
    pub invalid_url: i32,
    pub non_https: i32,
    pub non_https_sensitive: i32,
    pub suspicious_tld: i32,
    pub ip_literal: i32,
    pub long_domain: i32,
    pub deep_subdomains: i32,
    pub keyword_in_domain: i32,
    pub random_label: i32,
    pub digit_interleave: i32,
    pub brand_impersonation: i32,
    pub typosquat: i32,
    pub typosquat_substring: i32,
    pub shortener: i32,
    pub suspicious_path: i32,
    pub suspicious_extension: i32,
    pub userinfo: i32,
    pub punycode: i32,
    pub anchor_mismatch: i32,
    pub max_host_length: usize,
    pub max_label_length: usize,
    pub max_subdomain_depth: usize,
    pub typosquat_similarity: f64,
    pub entropy_threshold: f64,
    pub entropy_min_length: usize,
    pub consonant_run: usize,
}

impl Default for UrlWeights {
    fn default() -> Self {
        Self {
            invalid_url: 10,
            non_https: 15,
            non_https_sensitive: 25,
            suspicious_tld: 20,
            ip_literal: 30,
            long_domain: 10,
            deep_subdomains: 10,
            keyword_in_domain: 15,
            random_label: 10,
            digit_interleave: 15,
            brand_impersonation: 30,
            typosquat: 30,
            typosquat_substring: 25,
            shortener: 15,
            suspicious_path: 10,
            suspicious_extension: 20,
            userinfo: 20,
            punycode: 20,
            anchor_mismatch: 20,
            max_host_length: 50,
            max_label_length: 30,
            max_subdomain_depth: 3,
            typosquat_similarity: 0.8,
            entropy_threshold: 3.5,
            entropy_min_length: 12,
            consonant_run: 5,
        }
    }
}

/// Semantic label thresholds and score factors
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SemanticWeights {
    pub confidence_threshold: f64,
    pub urgent: f64,
    pub fear: f64,
    pub authority: f64,
    pub financial_scam: f64,
    pub latin_multiplier: f64,
    pub non_latin_multiplier: f64,
}

impl Default for SemanticWeights {
    fn default() -> Self {
        Self {
            confidence_threshold: 0.3,
            urgent: 80.0,
            fear: 80.0,
            authority: 70.0,
            financial_scam: 90.0,
            latin_multiplier: 1.1,
            non_latin_multiplier: 1.15,
        }
    }
}

/// Penalties and trust offsets derived from reputation signals
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ReputationWeights {
    pub trusted_sender: i32,
    pub trusted_links: i32,
    pub blacklisted_sender: i32,
    pub blacklisted_domain: i32,
    pub malformed_sender: i32,
    pub display_name_spoof: i32,
}

impl Default for ReputationWeights {
    fn default() -> Self {
        Self {
            trusted_sender: -20,
            trusted_links: -10,
            blacklisted_sender: 30,
            blacklisted_domain: 40,
            malformed_sender: 10,
            display_name_spoof: 20,
        }
    }
}

/// The complete scoring policy
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ScoringPolicy {
    pub tiers: RiskTiers,
    pub blend: BlendWeights,
    pub lexical: LexicalWeights,
    pub url: UrlWeights,
    pub semantic: SemanticWeights,
    pub reputation: ReputationWeights,
    /// Minimum final score when any link uses a bare IP address
    pub ip_literal_floor: u32,
    pub max_reasons: usize,
    /// Upper bound for recipient-profile multipliers
    pub max_profile_multiplier: f64,
}

impl Default for ScoringPolicy {
    fn default() -> Self {
        Self {
            tiers: RiskTiers::default(),
            blend: BlendWeights::default(),
            lexical: LexicalWeights::default(),
            url: UrlWeights::default(),
            semantic: SemanticWeights::default(),
            reputation: ReputationWeights::default(),
            ip_literal_floor: 30,
            max_reasons: MAX_REASONS,
            max_profile_multiplier: 1.5,
        }
    }
}
