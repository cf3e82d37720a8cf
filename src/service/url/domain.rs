//! Host-name helpers shared by the URL heuristics and the lexical matcher

use std::collections::HashMap;

use crate::model::{BrandDomains, DomainLists};

/// Second-level labels that sit under a country-code TLD (`co.uk`, `com.au`)
const SECOND_LEVEL_SUFFIXES: &[&str] = &["co", "com", "org", "net", "gov", "ac", "edu"];

/// Registrable part of a host: `login.paypal.co.uk` -> `paypal.co.uk`
pub fn registrable_domain(host: &str) -> String {
    let host = host.trim_end_matches('.').to_ascii_lowercase();
    let labels: Vec<&str> = host.split('.').collect();
    if labels.len() <= 2 {
        return host;
    }

    let tld = labels[labels.len() - 1];
    let second = labels[labels.len() - 2];
    let keep = if tld.len() == 2 && SECOND_LEVEL_SUFFIXES.contains(&second) {
        3
    } else {
        2
    };
    labels[labels.len() - keep..].join(".")
}

/// First label of the registrable domain: `paypal` for `www.paypal.co.uk`
pub fn registrable_label(host: &str) -> String {
    registrable_domain(host)
        .split('.')
        .next()
        .unwrap_or_default()
        .to_string()
}

pub fn top_level_domain(host: &str) -> &str {
    host.trim_end_matches('.').rsplit('.').next().unwrap_or(host)
}

/// Number of labels in front of the registrable domain
pub fn subdomain_depth(host: &str) -> usize {
    let total = host.trim_end_matches('.').split('.').count();
    let registrable = registrable_domain(host).split('.').count();
    total.saturating_sub(registrable)
}

/// Undo common character substitutions (`paypa1` -> `paypal`, `micros0ft` -> `microsoft`)
pub fn deleet(value: &str) -> String {
    value
        .chars()
        .map(|c| match c {
            '0' => 'o',
            '1' => 'l',
            '3' => 'e',
            '4' => 'a',
            '5' => 's',
            '7' => 't',
            '$' => 's',
            '@' => 'a',
            other => other.to_ascii_lowercase(),
        })
        .collect()
}

/// Shannon entropy in bits per character
pub fn shannon_entropy(value: &str) -> f64 {
    let mut counts: HashMap<char, usize> = HashMap::new();
    let mut total = 0usize;
    for c in value.chars() {
        *counts.entry(c).or_default() += 1;
        total += 1;
    }
    if total == 0 {
        return 0.0;
    }

    counts
        .values()
        .map(|&count| {
            let p = count as f64 / total as f64;
            -p * p.log2()
        })
        .sum()
}

/// Longest run of consecutive ASCII consonants
pub fn longest_consonant_run(value: &str) -> usize {
    let mut longest = 0;
    let mut current = 0;
    for c in value.chars() {
        let c = c.to_ascii_lowercase();
        if c.is_ascii_alphabetic() && !"aeiouy".contains(c) {
            current += 1;
            longest = longest.max(current);
        } else {
            current = 0;
        }
    }
    longest
}

/// Letters on both sides of a digit run (`micros0ft`, `amaz0n`)
pub fn has_digit_interleave(label: &str) -> bool {
    let chars: Vec<char> = label.chars().collect();
    let mut i = 0;
    while i < chars.len() {
        if chars[i].is_ascii_digit() {
            let start = i;
            while i < chars.len() && chars[i].is_ascii_digit() {
                i += 1;
            }
            let before = start > 0 && chars[start - 1].is_ascii_alphabetic();
            let after = i < chars.len() && chars[i].is_ascii_alphabetic();
            if before && after {
                return true;
            }
        } else {
            i += 1;
        }
    }
    false
}

/// Whether `needle` occurs in `haystack` delimited by non-alphanumeric characters
pub fn contains_word(haystack: &str, needle: &str) -> bool {
    if needle.is_empty() {
        return false;
    }
    haystack.match_indices(needle).any(|(idx, _)| {
        let before = haystack[..idx].chars().next_back();
        let after = haystack[idx + needle.len()..].chars().next();
        !before.is_some_and(char::is_alphanumeric) && !after.is_some_and(char::is_alphanumeric)
    })
}

/// Brands named in the (lowercased) message text
pub fn mentioned_brands<'a>(text_lower: &str, lists: &'a DomainLists) -> Vec<&'a BrandDomains> {
    lists
        .brands
        .iter()
        .filter(|b| contains_word(text_lower, &b.name))
        .collect()
}
