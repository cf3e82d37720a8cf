//! Per-URL heuristic checks
//!
//! Each check is independent and additive. Nothing here touches the network:
//! hosts are judged by their text alone.

use url::{Host, Url};

use crate::model::policy::UrlWeights;
use crate::model::{BrandDomains, ComponentResult, DomainLists, Finding, FindingCategory};
use crate::service::url::domain::{
    deleet, has_digit_interleave, longest_consonant_run, registrable_domain, registrable_label,
    shannon_entropy, subdomain_depth, top_level_domain,
};
use crate::service::url::extract::ExtractedUrl;

/// Dictionary words rarely drop below this share of vowels
const MIN_VOWEL_RATIO: f64 = 0.25;

/// Facts about the surrounding message that some checks depend on
pub struct TextContext<'a> {
    pub brands_mentioned: Vec<&'a BrandDomains>,
    pub has_sensitive_keywords: bool,
}

/// Outcome for a single URL
#[derive(Debug, Clone)]
pub struct UrlAssessment {
    pub url: String,
    pub host: Option<String>,
    pub ip_literal: bool,
    pub result: ComponentResult,
}

pub struct UrlChecks<'a> {
    lists: &'a DomainLists,
    weights: &'a UrlWeights,
}

impl<'a> UrlChecks<'a> {
    pub fn new(lists: &'a DomainLists, weights: &'a UrlWeights) -> Self {
        Self { lists, weights }
    }

    pub fn assess(&self, url: &ExtractedUrl, context: &TextContext<'_>) -> UrlAssessment {
        let mut findings = Vec::new();
        let mut add = |detail: String, weight: i32| {
            findings.push(Finding::new(
                FindingCategory::Url,
                format!("URL: {} - {}", url.normalized, detail),
                weight,
            ));
        };

        let parsed = match Url::parse(&url.normalized) {
            Ok(parsed) if parsed.host().is_some() => parsed,
            Ok(_) | Err(_) => {
                tracing::debug!(url = %url.normalized, "Failed to parse URL");
                add("Invalid URL format".to_string(), self.weights.invalid_url);
                return UrlAssessment {
                    url: url.normalized.clone(),
                    host: None,
                    ip_literal: false,
                    result: ComponentResult::from_findings(findings),
                };
            }
        };

        if !parsed.username().is_empty() || parsed.password().is_some() {
            add(
                "URL hides its destination behind an '@' (embedded credentials)".to_string(),
                self.weights.userinfo,
            );
        }

        if parsed.scheme() != "https" {
            if context.has_sensitive_keywords {
                add(
                    "Non-HTTPS link in a message asking for credentials or payment".to_string(),
                    self.weights.non_https_sensitive,
                );
            } else {
                add("URL is not HTTPS".to_string(), self.weights.non_https);
            }
        }

        let mut ip_literal = false;
        let mut host_name = None;
        match parsed.host() {
            Some(Host::Ipv4(_)) | Some(Host::Ipv6(_)) => {
                ip_literal = true;
                add(
                    "URL uses IP address instead of domain".to_string(),
                    self.weights.ip_literal,
                );
            }
            Some(Host::Domain(domain)) => {
                let host = domain.to_ascii_lowercase();
                for (detail, weight) in self.domain_findings(&host, context) {
                    add(detail, weight);
                }
                host_name = Some(host);
            }
            None => {}
        }

        for (detail, weight) in self.path_findings(&parsed) {
            add(detail, weight);
        }

        let result = ComponentResult::from_findings(findings);
        tracing::debug!(
            url = %url.normalized,
            score = result.score(),
            findings = result.findings().len(),
            "Assessed URL"
        );

        UrlAssessment {
            url: url.normalized.clone(),
            host: host_name.or_else(|| parsed.host_str().map(str::to_string)),
            ip_literal,
            result,
        }
    }

    fn domain_findings(&self, host: &str, context: &TextContext<'_>) -> Vec<(String, i32)> {
        let w = self.weights;
        let mut out = Vec::new();
        let registrable = registrable_domain(host);
        let label = registrable_label(host);
        let tld = top_level_domain(host);
        let trusted = self.lists.is_trusted_domain(host);

        if self.lists.is_suspicious_tld(tld) {
            out.push((format!("Suspicious TLD: .{}", tld), w.suspicious_tld));
        }

        if host.split('.').any(|l| l.starts_with("xn--")) {
            out.push((
                "Domain uses punycode (possible look-alike characters)".to_string(),
                w.punycode,
            ));
        }

        if host.len() > w.max_host_length || label.len() > w.max_label_length {
            out.push((
                format!("Unusually long domain name ({} characters)", host.len()),
                w.long_domain,
            ));
        }

        let depth = subdomain_depth(host);
        if depth > w.max_subdomain_depth {
            out.push((
                format!("Excessive subdomain depth ({} levels)", depth),
                w.deep_subdomains,
            ));
        }

        if self.lists.is_shortener(host) {
            out.push(("URL uses a known shortener".to_string(), w.shortener));
        }

        if trusted {
            return out;
        }

        if let Some(keyword) = self
            .lists
            .domain_keywords
            .iter()
            .find(|k| host.contains(k.as_str()))
        {
            out.push((
                format!("Domain contains sensitive keyword '{}'", keyword),
                w.keyword_in_domain,
            ));
        }

        if longest_consonant_run(&label) >= w.consonant_run
            || (label.len() >= w.entropy_min_length
                && shannon_entropy(&label) > w.entropy_threshold
                && vowel_ratio(&label) < MIN_VOWEL_RATIO)
        {
            out.push(("Domain name looks randomly generated".to_string(), w.random_label));
        }

        if has_digit_interleave(&label) {
            out.push((
                "Domain mixes digits into words (possible character substitution)".to_string(),
                w.digit_interleave,
            ));
        }

        let host_plain = deleet(host);
        if let Some(brand) = context
            .brands_mentioned
            .iter()
            .copied()
            .chain(
                self.lists
                    .brands
                    .iter()
                    .filter(|b| host_plain.contains(&b.compact_name())),
            )
            .find(|b| !b.owns(host))
        {
            out.push((
                format!(
                    "Brand '{}' referenced but link points to unaffiliated domain {}",
                    brand.name, registrable
                ),
                w.brand_impersonation,
            ));
        }

        if let Some(finding) = self.typosquat_finding(&registrable, &label) {
            out.push(finding);
        }

        out
    }

    fn typosquat_finding(&self, registrable: &str, label: &str) -> Option<(String, i32)> {
        let w = self.weights;
        let candidates = self
            .lists
            .trusted_domains
            .iter()
            .chain(self.lists.brands.iter().flat_map(|b| b.domains.iter()));

        let plain = deleet(registrable);
        let plain_label = deleet(label);
        let mut embedded: Option<String> = None;

        for trusted in candidates {
            let trusted = trusted.to_ascii_lowercase();
            if trusted == registrable {
                continue;
            }

            let similarity = strsim::normalized_levenshtein(registrable, &trusted);
            if plain == trusted || similarity >= w.typosquat_similarity {
                return Some((
                    format!(
                        "Possible typosquatting: {} vs {} (similarity {:.0}%)",
                        registrable,
                        trusted,
                        similarity * 100.0
                    ),
                    w.typosquat,
                ));
            }

            let trusted_label = registrable_label(&trusted);
            if embedded.is_none()
                && trusted_label.len() >= 4
                && plain_label != trusted_label
                && plain_label.contains(&trusted_label)
            {
                embedded = Some(trusted);
            }
        }

        embedded.map(|trusted| {
            (
                format!("Domain {} embeds trusted name {}", registrable, trusted),
                w.typosquat_substring,
            )
        })
    }

    fn path_findings(&self, parsed: &Url) -> Vec<(String, i32)> {
        let mut out = Vec::new();
        let segments: Vec<String> = parsed
            .path_segments()
            .map(|s| s.filter(|seg| !seg.is_empty()).map(str::to_ascii_lowercase).collect())
            .unwrap_or_default();

        if let Some(segment) = segments.iter().find(|seg| {
            let stem = seg.split('.').next().unwrap_or_default();
            self.lists.suspicious_paths.iter().any(|p| p == stem)
        }) {
            out.push((
                format!("Suspicious path segment '/{}'", segment),
                self.weights.suspicious_path,
            ));
        }

        if let Some(extension) = segments
            .last()
            .and_then(|last| last.rsplit_once('.'))
            .map(|(_, ext)| ext)
            .filter(|ext| self.lists.suspicious_extensions.iter().any(|e| e == ext))
        {
            out.push((
                format!("Link points to a '.{}' file", extension),
                self.weights.suspicious_extension,
            ));
        }

        out
    }
}

fn vowel_ratio(label: &str) -> f64 {
    let letters = label.chars().filter(char::is_ascii_alphabetic).count();
    if letters == 0 {
        return 0.0;
    }
    let vowels = label
        .chars()
        .filter(|c| "aeiouy".contains(c.to_ascii_lowercase()))
        .count();
    vowels as f64 / letters as f64
}
