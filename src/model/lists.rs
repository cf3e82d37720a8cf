//! Static domain, brand and keyword lists used by the heuristics

use serde::Deserialize;

/// A brand and the domains it legitimately sends mail and links from
#[derive(Debug, Clone, Deserialize)]
pub struct BrandDomains {
    /// Lowercase brand name as it appears in text
    pub name: String,
    pub domains: Vec<String>,
}

impl BrandDomains {
    fn new(name: &str, domains: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            domains: domains.iter().map(|d| d.to_string()).collect(),
        }
    }

    /// Whether `domain` is one of the brand's domains or a subdomain of one
    pub fn owns(&self, domain: &str) -> bool {
        self.domains.iter().any(|d| domain_matches(domain, d))
    }

    /// Brand name with spaces and punctuation removed, as it would appear in a host
    pub fn compact_name(&self) -> String {
        self.name.chars().filter(|c| c.is_ascii_alphanumeric()).collect()
    }
}

/// Exact or dot-suffix domain match (`mail.paypal.com` matches `paypal.com`)
pub fn domain_matches(domain: &str, listed: &str) -> bool {
    let domain = domain.trim_end_matches('.').to_ascii_lowercase();
    let listed = listed.trim_end_matches('.').to_ascii_lowercase();
    domain == listed || domain.ends_with(&format!(".{}", listed))
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DomainLists {
    pub trusted_domains: Vec<String>,
    pub brands: Vec<BrandDomains>,
    pub suspicious_tlds: Vec<String>,
    pub shorteners: Vec<String>,
    /// TLDs accepted for bare `example.com` style tokens in text
    pub known_tlds: Vec<String>,
    /// Words in surrounding text that make plain HTTP links more alarming
    pub sensitive_keywords: Vec<String>,
    pub domain_keywords: Vec<String>,
    pub suspicious_paths: Vec<String>,
    pub suspicious_extensions: Vec<String>,
}

impl DomainLists {
    pub fn is_trusted_domain(&self, domain: &str) -> bool {
        self.trusted_domains.iter().any(|d| domain_matches(domain, d))
            || self.brands.iter().any(|b| b.owns(domain))
    }

    pub fn is_shortener(&self, host: &str) -> bool {
        self.shorteners.iter().any(|s| domain_matches(host, s))
    }

    pub fn is_suspicious_tld(&self, tld: &str) -> bool {
        self.suspicious_tlds
            .iter()
            .any(|t| t.trim_start_matches('.').eq_ignore_ascii_case(tld))
    }

    pub fn is_known_tld(&self, tld: &str) -> bool {
        self.known_tlds.iter().any(|t| t.eq_ignore_ascii_case(tld))
            || self.is_suspicious_tld(tld)
    }
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

impl Default for DomainLists {
    fn default() -> Self {
        Self {
            trusted_domains: strings(&[
                "google.com",
                "paypal.com",
                "microsoft.com",
                "amazon.com",
                "facebook.com",
                "apple.com",
                "github.com",
                "linkedin.com",
                "netflix.com",
            ]),
            brands: vec![
                BrandDomains::new("paypal", &["paypal.com", "paypal.me", "paypalobjects.com"]),
                BrandDomains::new(
                    "microsoft",
                    &[
                        "microsoft.com",
                        "live.com",
                        "outlook.com",
                        "office.com",
                        "microsoftonline.com",
                    ],
                ),
                BrandDomains::new("google", &["google.com", "gmail.com", "youtube.com", "goo.gl"]),
                BrandDomains::new(
                    "amazon",
                    &["amazon.com", "amazon.co.uk", "amazon.de", "aws.amazon.com"],
                ),
                BrandDomains::new("apple", &["apple.com", "icloud.com"]),
                BrandDomains::new("facebook", &["facebook.com", "fb.com", "meta.com"]),
                BrandDomains::new("netflix", &["netflix.com"]),
                BrandDomains::new("instagram", &["instagram.com"]),
                BrandDomains::new("linkedin", &["linkedin.com"]),
                BrandDomains::new("dhl", &["dhl.com", "dhl.de"]),
                BrandDomains::new("fedex", &["fedex.com"]),
                BrandDomains::new("wells fargo", &["wellsfargo.com"]),
                BrandDomains::new("bank of america", &["bankofamerica.com"]),
                BrandDomains::new("chase", &["chase.com"]),
            ],
            suspicious_tlds: strings(&[
                "tk", "ml", "ga", "cf", "gq", "xyz", "top", "club", "work", "support", "click",
                "link", "loan", "win", "bid", "review", "country", "kim", "pw", "rest",
            ]),
            shorteners: strings(&[
                "bit.ly",
                "tinyurl.com",
                "goo.gl",
                "t.co",
                "ow.ly",
                "is.gd",
                "buff.ly",
                "rebrand.ly",
                "cutt.ly",
                "shorturl.at",
                "tiny.cc",
            ]),
            known_tlds: strings(&[
                "com", "net", "org", "io", "co", "info", "biz", "edu", "gov", "me", "app", "dev",
                "online", "site", "store", "shop", "ly", "gl", "us", "uk", "de", "fr", "es",
                "it", "nl", "ru", "cn", "in", "br", "au", "ca", "jp",
            ]),
            sensitive_keywords: strings(&[
                "login", "log in", "sign in", "verify", "password", "account", "bank",
                "credit card", "ssn", "confirm",
            ]),
            domain_keywords: strings(&[
                "login", "signin", "verify", "secure", "security", "account", "update",
                "banking", "confirm", "support", "wallet", "webscr",
            ]),
            suspicious_paths: strings(&[
                "login", "signin", "sign-in", "verify", "verification", "account", "update",
                "secure", "webscr", "wp-admin", "banking", "confirm", "password",
            ]),
            suspicious_extensions: strings(&[
                "exe", "scr", "zip", "rar", "js", "bat", "cmd", "apk", "msi", "vbs", "jar",
                "iso", "hta",
            ]),
        }
    }
}
