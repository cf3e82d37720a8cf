//! Privacy-preserving threat signature
//!
//! The fingerprint hashes a normalised slice of the message so two copies of
//! the same campaign correlate without the text itself leaving the process.

use sha2::{Digest, Sha256};

use crate::model::{ThreatSignature, ThreatType};

const FINGERPRINT_WORDS: usize = 20;
const MIN_WORD_LEN: usize = 4;

/// Checked in order; the first type with a keyword in the reasons wins
const THREAT_KEYWORDS: &[(ThreatType, &[&str])] = &[
    (
        ThreatType::Financial,
        &["financial", "money", "payment", "invoice", "bank"],
    ),
    (
        ThreatType::Credential,
        &["password", "login", "verify", "account", "security"],
    ),
    (
        ThreatType::Executive,
        &["ceo", "urgent", "confidential", "board"],
    ),
    (
        ThreatType::Technical,
        &["system", "update", "maintenance", "server"],
    ),
];

pub fn threat_signature(
    text: &str,
    sender_domain: Option<String>,
    reasons: &[String],
) -> ThreatSignature {
    ThreatSignature {
        fingerprint: content_fingerprint(text),
        sender_domain,
        threat_type: classify_threat_type(reasons),
    }
}

/// SHA-256 over the first twenty letters-only words longer than three characters
pub fn content_fingerprint(text: &str) -> String {
    let cleaned: String = text
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_whitespace())
        .collect();
    let words = cleaned
        .split_whitespace()
        .filter(|w| w.len() >= MIN_WORD_LEN)
        .take(FINGERPRINT_WORDS)
        .collect::<Vec<_>>()
        .join(" ");

    let mut hasher = Sha256::new();
    hasher.update(words.as_bytes());
    format!("{:x}", hasher.finalize())
}

pub fn classify_threat_type(reasons: &[String]) -> ThreatType {
    let reason_text = reasons.join(" ").to_lowercase();
    THREAT_KEYWORDS
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|k| reason_text.contains(k)))
        .map(|(threat_type, _)| *threat_type)
        .unwrap_or(ThreatType::General)
}
