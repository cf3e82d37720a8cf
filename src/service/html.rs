//! HTML body inspection
//!
//! Pulls link targets out of `a[href]` so they reach the URL evaluator, and
//! flags two presentation tricks the plain-text rendering hides: anchors whose
//! visible text names a different host than the link, and styled-away text.

use scraper::{ElementRef, Html, Selector};
use url::Url;

use crate::model::{Finding, FindingCategory};
use crate::service::url::ExtractedUrl;

const HIDDEN_STYLE_MARKERS: &[&str] = &[
    "display:none",
    "visibility:hidden",
    "font-size:0",
    "opacity:0",
];
const WHITE_COLOURS: &[&str] = &["#fff", "#ffffff", "white", "rgb(255,255,255)"];

/// Links and findings recovered from an HTML body
#[derive(Debug, Clone, Default)]
pub struct HtmlInspection {
    pub links: Vec<ExtractedUrl>,
    /// Anchor text / target mismatches, reported with the URL findings
    pub url_findings: Vec<Finding>,
    /// Hidden-text tricks, reported with the lexical findings
    pub lexical_findings: Vec<Finding>,
}

#[derive(Debug, Clone)]
pub struct HtmlInspector {
    anchor_mismatch_weight: i32,
    hidden_text_weight: i32,
}

impl HtmlInspector {
    pub fn new(anchor_mismatch_weight: i32, hidden_text_weight: i32) -> Self {
        Self {
            anchor_mismatch_weight,
            hidden_text_weight,
        }
    }

    pub fn inspect(&self, html: &str) -> HtmlInspection {
        let document = Html::parse_document(html);
        let mut inspection = HtmlInspection::default();

        if let Ok(selector) = Selector::parse("a[href]") {
            for anchor in document.select(&selector) {
                let Some(href) = anchor.value().attr("href").map(str::trim) else {
                    continue;
                };
                let Ok(target) = Url::parse(href) else {
                    continue;
                };
                if !matches!(target.scheme(), "http" | "https") {
                    continue;
                }

                if let Some(url) = ExtractedUrl::from_candidate(href) {
                    inspection.links.push(url);
                }

                let visible = anchor.text().collect::<String>();
                if let Some(finding) = self.anchor_mismatch(&visible, href, &target) {
                    inspection.url_findings.push(finding);
                }
            }
        }

        if let Ok(selector) = Selector::parse("[style]") {
            let hidden = document
                .select(&selector)
                .filter(|el| is_hidden(el))
                .map(|el| el.text().collect::<Vec<_>>().join(" "))
                .find(|text| text.split_whitespace().any(|w| w.chars().any(char::is_alphabetic)));

            if let Some(text) = hidden {
                let preview: String = text.split_whitespace().take(8).collect::<Vec<_>>().join(" ");
                inspection.lexical_findings.push(Finding::new(
                    FindingCategory::Obfuscation,
                    format!("Hidden text in HTML body: '{}'", preview),
                    self.hidden_text_weight,
                ));
            }
        }

        tracing::debug!(
            links = inspection.links.len(),
            mismatches = inspection.url_findings.len(),
            hidden_text = !inspection.lexical_findings.is_empty(),
            "Inspected HTML body"
        );
        inspection
    }

    /// Visible text that itself looks like a URL on another host than the href
    fn anchor_mismatch(&self, visible: &str, href: &str, target: &Url) -> Option<Finding> {
        let visible = visible.trim();
        let shown = ExtractedUrl::from_candidate(visible.split_whitespace().next()?)?;
        let shown_host = Url::parse(&shown.normalized).ok()?.host_str()?.to_ascii_lowercase();
        if !shown_host.contains('.') {
            return None;
        }

        let target_host = target.host_str()?.to_ascii_lowercase();
        let same = shown_host == target_host
            || shown_host.trim_start_matches("www.") == target_host.trim_start_matches("www.");
        if same {
            return None;
        }

        Some(Finding::new(
            FindingCategory::Url,
            format!(
                "URL: {} - Link text shows {} but points to {}",
                href, shown_host, target_host
            ),
            self.anchor_mismatch_weight,
        ))
    }
}

fn is_hidden(element: &ElementRef<'_>) -> bool {
    let Some(style) = element.value().attr("style") else {
        return false;
    };
    let style: String = style
        .to_ascii_lowercase()
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect();

    if HIDDEN_STYLE_MARKERS.iter().any(|m| style.contains(m)) {
        return true;
    }

    // White text on a white (or unset) background
    let declarations: Vec<(&str, &str)> = style
        .split(';')
        .filter_map(|d| d.split_once(':'))
        .collect();
    let colour_white = declarations
        .iter()
        .any(|(k, v)| *k == "color" && WHITE_COLOURS.contains(v));
    let background_dark = declarations.iter().any(|(k, v)| {
        (*k == "background" || *k == "background-color") && !WHITE_COLOURS.contains(v)
    });
    colour_white && !background_dark
}
