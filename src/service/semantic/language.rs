//! Script and stop-word based language guess
//!
//! Only needs to be good enough to pick a sensitivity multiplier: models are
//! less reliable outside English, so non-English text is weighted up a little.

use crate::model::policy::SemanticWeights;

/// Share of letters a non-Latin script needs before it decides the language
const SCRIPT_SHARE: f64 = 0.3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Language {
    English,
    Spanish,
    French,
    German,
    Portuguese,
    Hindi,
    Chinese,
    Arabic,
    Russian,
}

impl Language {
    pub fn code(self) -> &'static str {
        match self {
            Language::English => "en",
            Language::Spanish => "es",
            Language::French => "fr",
            Language::German => "de",
            Language::Portuguese => "pt",
            Language::Hindi => "hi",
            Language::Chinese => "zh",
            Language::Arabic => "ar",
            Language::Russian => "ru",
        }
    }

    pub fn is_latin_script(self) -> bool {
        matches!(
            self,
            Language::English
                | Language::Spanish
                | Language::French
                | Language::German
                | Language::Portuguese
        )
    }

    pub fn sensitivity_multiplier(self, weights: &SemanticWeights) -> f64 {
        match self {
            Language::English => 1.0,
            lang if lang.is_latin_script() => weights.latin_multiplier,
            _ => weights.non_latin_multiplier,
        }
    }
}

const STOP_WORDS: &[(Language, &[&str])] = &[
    (
        Language::English,
        &["the", "and", "your", "you", "is", "to", "of", "please", "account", "with"],
    ),
    (
        Language::Spanish,
        &["el", "la", "los", "su", "usted", "cuenta", "por", "para", "que", "es"],
    ),
    (
        Language::French,
        &["le", "la", "les", "votre", "vous", "compte", "est", "pour", "des", "et"],
    ),
    (
        Language::German,
        &["der", "die", "das", "und", "ihr", "ihre", "sie", "konto", "ist", "nicht"],
    ),
    (
        Language::Portuguese,
        &["o", "os", "sua", "seu", "você", "conta", "para", "não", "com", "uma"],
    ),
];

pub fn detect_language(text: &str) -> Language {
    let mut letters = 0usize;
    let mut devanagari = 0usize;
    let mut cjk = 0usize;
    let mut arabic = 0usize;
    let mut cyrillic = 0usize;

    for c in text.chars().filter(|c| c.is_alphabetic()) {
        letters += 1;
        match c {
            '\u{0900}'..='\u{097F}' => devanagari += 1,
            '\u{4E00}'..='\u{9FFF}' | '\u{3400}'..='\u{4DBF}' => cjk += 1,
            '\u{0600}'..='\u{06FF}' => arabic += 1,
            '\u{0400}'..='\u{04FF}' => cyrillic += 1,
            _ => {}
        }
    }

    if letters > 0 {
        let scripts = [
            (Language::Hindi, devanagari),
            (Language::Chinese, cjk),
            (Language::Arabic, arabic),
            (Language::Russian, cyrillic),
        ];
        if let Some((language, _)) = scripts
            .into_iter()
            .filter(|(_, count)| *count as f64 / letters as f64 >= SCRIPT_SHARE)
            .max_by_key(|(_, count)| *count)
        {
            return language;
        }
    }

    let lower = text.to_lowercase();
    let words: Vec<&str> = lower
        .split(|c: char| !c.is_alphabetic())
        .filter(|w| !w.is_empty())
        .collect();

    STOP_WORDS
        .iter()
        .map(|(language, stops)| {
            let hits = words.iter().filter(|w| stops.contains(*w)).count();
            (*language, hits)
        })
        .filter(|(_, hits)| *hits > 0)
        // Ties keep the earlier entry, so English wins them
        .fold(None, |best: Option<(Language, usize)>, candidate| match best {
            Some(b) if b.1 >= candidate.1 => Some(b),
            _ => Some(candidate),
        })
        .map(|(language, _)| language)
        .unwrap_or(Language::English)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detects_scripts() {
        assert_eq!(detect_language("आपका खाता निलंबित कर दिया गया है"), Language::Hindi);
        assert_eq!(detect_language("您的账户已被冻结"), Language::Chinese);
        assert_eq!(detect_language("تم تعليق حسابك"), Language::Arabic);
        assert_eq!(detect_language("Ваш аккаунт заблокирован"), Language::Russian);
    }

    #[test]
    fn test_detects_latin_languages_by_stop_words() {
        assert_eq!(
            detect_language("Please verify your account with the bank"),
            Language::English
        );
        assert_eq!(
            detect_language("Su cuenta ha sido suspendida, por favor verifique los datos"),
            Language::Spanish
        );
        assert_eq!(
            detect_language("Votre compte est bloqué, veuillez confirmer vous-même"),
            Language::French
        );
    }

    #[test]
    fn test_defaults_to_english() {
        assert_eq!(detect_language(""), Language::English);
        assert_eq!(detect_language("12345 !!!"), Language::English);
    }

    #[test]
    fn test_multipliers() {
        let weights = SemanticWeights::default();
        assert_eq!(Language::English.sensitivity_multiplier(&weights), 1.0);
        assert_eq!(Language::German.sensitivity_multiplier(&weights), 1.1);
        assert_eq!(Language::Arabic.sensitivity_multiplier(&weights), 1.15);
    }

    #[test]
    fn test_a_few_latin_loanwords_do_not_flip_script() {
        assert_eq!(
            detect_language("Ваш аккаунт PayPal заблокирован, войдите"),
            Language::Russian
        );
    }
}
