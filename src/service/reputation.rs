//! Sender and link-domain reputation
//!
//! A [`ReputationProvider`] answers trusted / neutral / blacklisted for a sender
//! address or a domain. [`ReputationLookup`] turns those answers, plus a few
//! checks on the sender header itself, into penalty findings and a separate
//! (negative) trust adjustment.

use async_trait::async_trait;
use futures::future::join_all;
use std::sync::Arc;

use crate::model::policy::ReputationWeights;
use crate::model::{
    ComponentResult, DomainLists, Finding, FindingCategory, ReputationLists, domain_matches,
};
use crate::service::url::domain::contains_word;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReputationSignal {
    Trusted,
    Neutral,
    Blacklisted(String),
}

#[async_trait]
pub trait ReputationProvider: Send + Sync {
    async fn sender_reputation(&self, sender: &str) -> ReputationSignal;

    async fn domain_reputation(&self, domain: &str) -> ReputationSignal;

    fn name(&self) -> &str;
}

/// Provider backed by the configured allow and block lists
pub struct StaticReputationProvider {
    lists: ReputationLists,
}

impl StaticReputationProvider {
    pub fn new(lists: ReputationLists) -> Self {
        tracing::info!(
            trusted_senders = lists.trusted_senders.len(),
            trusted_domains = lists.trusted_domains.len(),
            blacklisted_senders = lists.blacklisted_senders.len(),
            blacklisted_domains = lists.blacklisted_domains.len(),
            "Static reputation provider initialized"
        );
        Self { lists }
    }

    fn blacklisted_domain(&self, domain: &str) -> Option<&str> {
        self.lists
            .blacklisted_domains
            .iter()
            .find(|d| domain_matches(domain, d))
            .map(String::as_str)
    }
}

#[async_trait]
impl ReputationProvider for StaticReputationProvider {
    async fn sender_reputation(&self, sender: &str) -> ReputationSignal {
        let sender = sender.trim().to_ascii_lowercase();
        if self
            .lists
            .blacklisted_senders
            .iter()
            .any(|s| s.eq_ignore_ascii_case(&sender))
        {
            return ReputationSignal::Blacklisted(format!("Sender {} is blacklisted", sender));
        }

        if let Some((_, domain)) = sender.rsplit_once('@')
            && let Some(listed) = self.blacklisted_domain(domain)
        {
            return ReputationSignal::Blacklisted(format!(
                "Sender domain {} is blacklisted ({})",
                domain, listed
            ));
        }

        if self
            .lists
            .trusted_senders
            .iter()
            .any(|s| s.eq_ignore_ascii_case(&sender))
        {
            return ReputationSignal::Trusted;
        }

        ReputationSignal::Neutral
    }

    async fn domain_reputation(&self, domain: &str) -> ReputationSignal {
        if let Some(listed) = self.blacklisted_domain(domain) {
            return ReputationSignal::Blacklisted(format!(
                "Link domain {} is blacklisted ({})",
                domain, listed
            ));
        }
        if self
            .lists
            .trusted_domains
            .iter()
            .any(|d| domain_matches(domain, d))
        {
            return ReputationSignal::Trusted;
        }
        ReputationSignal::Neutral
    }

    fn name(&self) -> &str {
        "static"
    }
}

/// A parsed `From` value: `Display Name <local@domain>` or a bare address
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SenderAddress {
    pub display_name: Option<String>,
    pub address: String,
    pub domain: String,
}

impl SenderAddress {
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        let (display_name, address) = match (raw.rfind('<'), raw.rfind('>')) {
            (Some(open), Some(close)) if open < close => {
                let name = raw[..open].trim().trim_matches('"').trim();
                let name = (!name.is_empty()).then(|| name.to_string());
                (name, raw[open + 1..close].trim())
            }
            (None, None) => (None, raw),
            _ => return None,
        };

        let (local, domain) = address.split_once('@')?;
        let valid = !local.is_empty()
            && !domain.is_empty()
            && !domain.contains('@')
            && domain.contains('.')
            && !domain.starts_with('.')
            && !domain.ends_with('.')
            && !address.chars().any(char::is_whitespace);
        if !valid {
            return None;
        }

        Some(Self {
            display_name,
            address: address.to_ascii_lowercase(),
            domain: domain.to_ascii_lowercase(),
        })
    }
}

/// Reputation penalties plus the trust adjustment applied after blending
#[derive(Debug, Clone, Default)]
pub struct ReputationAssessment {
    pub result: ComponentResult,
    /// Zero or negative
    pub trust_adjustment: i32,
    pub sender_domain: Option<String>,
}

#[derive(Clone)]
pub struct ReputationLookup {
    provider: Arc<dyn ReputationProvider>,
    lists: Arc<DomainLists>,
    weights: ReputationWeights,
}

impl ReputationLookup {
    pub fn new(
        provider: Arc<dyn ReputationProvider>,
        lists: Arc<DomainLists>,
        weights: ReputationWeights,
    ) -> Self {
        Self {
            provider,
            lists,
            weights,
        }
    }

    /// Judge the sender header and the hosts of the message's links
    pub async fn assess(&self, sender: Option<&str>, domains: &[String]) -> ReputationAssessment {
        let w = &self.weights;
        let mut findings = Vec::new();
        let mut trust_adjustment = 0;
        let mut sender_domain = None;

        match sender.map(str::trim).filter(|s| !s.is_empty()) {
            None => {}
            Some(raw) => match SenderAddress::parse(raw) {
                None => findings.push(Finding::new(
                    FindingCategory::Sender,
                    format!("Malformed sender address: {}", raw),
                    w.malformed_sender,
                )),
                Some(parsed) => {
                    match self.provider.sender_reputation(&parsed.address).await {
                        ReputationSignal::Trusted => trust_adjustment += w.trusted_sender,
                        ReputationSignal::Blacklisted(reason) => findings.push(Finding::new(
                            FindingCategory::Sender,
                            reason,
                            w.blacklisted_sender,
                        )),
                        ReputationSignal::Neutral => {}
                    }
                    findings.extend(self.display_name_finding(&parsed));
                    sender_domain = Some(parsed.domain);
                }
            },
        }

        let mut unique: Vec<&String> = Vec::new();
        for domain in domains {
            if !unique.contains(&domain) {
                unique.push(domain);
            }
        }
        let signals = join_all(unique.iter().map(|d| self.provider.domain_reputation(d))).await;

        let mut all_trusted = !signals.is_empty();
        for signal in signals {
            match signal {
                ReputationSignal::Blacklisted(reason) => {
                    all_trusted = false;
                    findings.push(Finding::new(
                        FindingCategory::Reputation,
                        reason,
                        w.blacklisted_domain,
                    ));
                }
                ReputationSignal::Neutral => all_trusted = false,
                ReputationSignal::Trusted => {}
            }
        }
        if all_trusted {
            trust_adjustment += w.trusted_links;
        }

        let result = ComponentResult::from_findings(findings);
        tracing::debug!(
            provider = self.provider.name(),
            score = result.score(),
            trust_adjustment,
            domains = unique.len(),
            "Reputation lookup complete"
        );

        ReputationAssessment {
            result,
            trust_adjustment,
            sender_domain,
        }
    }

    /// Display name invokes a brand the address does not belong to
    fn display_name_finding(&self, sender: &SenderAddress) -> Option<Finding> {
        let name = sender.display_name.as_deref()?.to_lowercase();
        let brand = self
            .lists
            .brands
            .iter()
            .find(|b| contains_word(&name, &b.name) && !b.owns(&sender.domain))?;
        Some(Finding::new(
            FindingCategory::Sender,
            format!(
                "Sender name claims {} but address is from {}",
                brand.name, sender.domain
            ),
            self.weights.display_name_spoof,
        ))
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;

    /// Blacklists any sender containing "fail"; trusts the listed domains
    pub struct MemoryReputationProvider {
        pub trusted_domains: Vec<String>,
    }

    #[async_trait]
    impl ReputationProvider for MemoryReputationProvider {
        async fn sender_reputation(&self, sender: &str) -> ReputationSignal {
            if sender.contains("fail") {
                ReputationSignal::Blacklisted(format!("Sender {} failed reputation check", sender))
            } else {
                ReputationSignal::Neutral
            }
        }

        async fn domain_reputation(&self, domain: &str) -> ReputationSignal {
            if self.trusted_domains.iter().any(|d| domain_matches(domain, d)) {
                ReputationSignal::Trusted
            } else {
                ReputationSignal::Neutral
            }
        }

        fn name(&self) -> &str {
            "memory"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lookup() -> ReputationLookup {
        ReputationLookup::new(
            Arc::new(StaticReputationProvider::new(ReputationLists::default())),
            Arc::new(DomainLists::default()),
            ReputationWeights::default(),
        )
    }

    #[test]
    fn test_parse_sender_forms() {
        let bare = SenderAddress::parse("Service@PayPal.com").unwrap();
        assert_eq!(bare.address, "service@paypal.com");
        assert_eq!(bare.domain, "paypal.com");
        assert!(bare.display_name.is_none());

        let named = SenderAddress::parse("\"PayPal Support\" <help@pay-pal.xyz>").unwrap();
        assert_eq!(named.display_name.as_deref(), Some("PayPal Support"));
        assert_eq!(named.domain, "pay-pal.xyz");

        assert!(SenderAddress::parse("not an address").is_none());
        assert!(SenderAddress::parse("a@@b.com").is_none());
        assert!(SenderAddress::parse("user@localhost").is_none());
        assert!(SenderAddress::parse("Name <user@example.com").is_none());
    }

    #[tokio::test]
    async fn test_trusted_sender_lowers_trust_adjustment() {
        let assessment = lookup().assess(Some("service@paypal.com"), &[]).await;
        assert_eq!(assessment.trust_adjustment, -20);
        assert_eq!(assessment.result.score(), 0);
        assert_eq!(assessment.sender_domain.as_deref(), Some("paypal.com"));
    }

    #[tokio::test]
    async fn test_blacklisted_link_domains_add_per_domain() {
        let domains = vec![
            "badsite.tk".to_string(),
            "www.phishingsite.com".to_string(),
            "badsite.tk".to_string(),
        ];
        let assessment = lookup().assess(None, &domains).await;
        assert_eq!(assessment.result.score(), 80);
        assert_eq!(assessment.result.findings().len(), 2);
        assert_eq!(assessment.trust_adjustment, 0);
    }

    #[tokio::test]
    async fn test_all_trusted_links() {
        let domains = vec!["www.paypal.com".to_string(), "github.com".to_string()];
        let assessment = lookup().assess(None, &domains).await;
        assert_eq!(assessment.trust_adjustment, -10);

        let mixed = vec!["www.paypal.com".to_string(), "example.org".to_string()];
        assert_eq!(lookup().assess(None, &mixed).await.trust_adjustment, 0);
    }

    #[tokio::test]
    async fn test_malformed_sender() {
        let assessment = lookup().assess(Some("paypal security team"), &[]).await;
        assert_eq!(assessment.result.score(), 10);
        assert_eq!(assessment.result.findings()[0].category, FindingCategory::Sender);
        assert!(assessment.sender_domain.is_none());
    }

    #[tokio::test]
    async fn test_display_name_brand_spoof() {
        let assessment = lookup()
            .assess(Some("Microsoft Account Team <alerts@ms-support.top>"), &[])
            .await;
        assert_eq!(assessment.result.score(), 20);

        let sender = "Microsoft <account-security-noreply@accountprotection.microsoft.com>";
        let genuine = lookup().assess(Some(sender), &[]).await;
        assert_eq!(genuine.result.score(), 0);
        assert_eq!(genuine.trust_adjustment, -20);
    }

    #[tokio::test]
    async fn test_blacklisted_sender_domain() {
        let assessment = lookup().assess(Some("win@badsite.tk"), &[]).await;
        assert_eq!(assessment.result.score(), 30);
    }

    #[tokio::test]
    async fn test_memory_double_fails_named_senders() {
        let lookup = ReputationLookup::new(
            Arc::new(testing::MemoryReputationProvider {
                trusted_domains: vec![],
            }),
            Arc::new(DomainLists::default()),
            ReputationWeights::default(),
        );
        let assessment = lookup.assess(Some("fail@example.com"), &[]).await;
        assert_eq!(assessment.result.score(), 30);
    }
}
