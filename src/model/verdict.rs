use serde::{Deserialize, Serialize, Serializer};

/// Sentinel reported when a message carries no links
pub const NO_URLS_SENTINEL: &str = "none detected";

/// Optional context about the person receiving the message
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipientProfile {
    #[serde(default)]
    pub job_role: Option<String>,
    #[serde(default)]
    pub department: Option<String>,
}

/// A single scoring request
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisRequest {
    pub text: String,
    #[serde(default)]
    pub sender: Option<String>,
    /// HTML rendering of the same message, when the caller has one
    #[serde(default)]
    pub html: Option<String>,
    #[serde(default)]
    pub profile: Option<RecipientProfile>,
}

impl AnalysisRequest {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    pub fn with_sender(mut self, sender: impl Into<String>) -> Self {
        self.sender = Some(sender.into());
        self
    }

    pub fn with_html(mut self, html: impl Into<String>) -> Self {
        self.html = Some(html.into());
        self
    }

    pub fn with_profile(mut self, profile: RecipientProfile) -> Self {
        self.profile = Some(profile);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Prediction {
    Phishing,
    Safe,
}

impl Prediction {
    pub fn as_str(self) -> &'static str {
        match self {
            Prediction::Phishing => "phishing",
            Prediction::Safe => "safe",
        }
    }
}

/// Links found in the message, or the "none detected" sentinel
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtractedUrls {
    Found(Vec<String>),
    NoneDetected,
}

impl ExtractedUrls {
    pub fn from_urls(urls: Vec<String>) -> Self {
        if urls.is_empty() {
            ExtractedUrls::NoneDetected
        } else {
            ExtractedUrls::Found(urls)
        }
    }

    pub fn as_slice(&self) -> &[String] {
        match self {
            ExtractedUrls::Found(urls) => urls,
            ExtractedUrls::NoneDetected => &[],
        }
    }
}

impl Serialize for ExtractedUrls {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            ExtractedUrls::Found(urls) => urls.serialize(serializer),
            ExtractedUrls::NoneDetected => serializer.serialize_str(NO_URLS_SENTINEL),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThreatType {
    Financial,
    Credential,
    Executive,
    Technical,
    General,
}

/// Privacy-preserving description of the message used for correlation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ThreatSignature {
    pub fingerprint: String,
    pub sender_domain: Option<String>,
    pub threat_type: ThreatType,
}

/// Final scoring outcome for one request
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Verdict {
    pub score: u32,
    pub risk_level: RiskLevel,
    pub reasons: Vec<String>,
    pub extracted_urls: ExtractedUrls,
    pub prediction: Prediction,
    pub confidence: f64,
    pub signature: ThreatSignature,
}
