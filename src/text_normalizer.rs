//! Turns reduced page text into a single line of canonical-language prose.
//!
//! Pipeline: join lines, detect language, translate when needed, then strip
//! search-engine boilerplate and collapse whitespace until neither changes
//! anything. Only detection may fail; a failed translation keeps the
//! original text.

use regex::Regex;
use std::sync::OnceLock;
use log::{debug, warn};

use crate::error::Result;
use crate::exclusion_patterns::ExclusionSet;
use crate::language::{LanguageDetector, Translator};

fn whitespace_run() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s+").expect("whitespace pattern is valid"))
}

/// Collapses every whitespace run to one space and trims the ends.
pub fn collapse_whitespace(text: &str) -> String {
    whitespace_run().replace_all(text, " ").trim().to_string()
}

pub struct TextNormalizer {
    detector: Box<dyn LanguageDetector>,
    translator: Option<Box<dyn Translator>>,
    exclusions: ExclusionSet,
    canonical_language: String,
}

impl TextNormalizer {
    pub fn new(
        detector: Box<dyn LanguageDetector>,
        translator: Option<Box<dyn Translator>>,
        exclusions: ExclusionSet,
        canonical_language: impl Into<String>,
    ) -> Self {
        TextNormalizer {
            detector,
            translator,
            exclusions,
            canonical_language: canonical_language.into(),
        }
    }

    pub fn normalize(&self, text: &str) -> Result<String> {
        let joined = text.split('\n').collect::<Vec<_>>().join(" ");

        let detected = self.detector.detect(&joined)?;
        let text = if detected == self.canonical_language {
            joined
        } else {
            self.translate_or_keep(joined, &detected)
        };

        Ok(self.strip_boilerplate(&text))
    }

    /// Strips and collapses repeatedly: removing one span can expose another
    /// (a second trailing number, or two words joined into a phrase).
    /// Every changing pass shortens the text, so this terminates.
    fn strip_boilerplate(&self, text: &str) -> String {
        let mut current = collapse_whitespace(text);
        while self.exclusions.matches(&current) {
            let next = collapse_whitespace(&self.exclusions.strip(&current));
            if next == current {
                break;
            }
            current = next;
        }
        current
    }

    /// What survives when detection fails: line joining and whitespace
    /// collapsing only, so the text is still single-line.
    pub fn fallback(&self, text: &str) -> String {
        collapse_whitespace(text)
    }

    fn translate_or_keep(&self, text: String, detected: &str) -> String {
        let translator = match &self.translator {
            Some(t) => t,
            None => {
                warn!(
                    "Text detected as '{}' but no translator is configured; keeping original",
                    detected
                );
                return text;
            }
        };

        debug!("Translating {} chars from {} to {}", text.len(), detected, self.canonical_language);
        match translator.translate(&text, detected, &self.canonical_language) {
            Ok(translated) => translated,
            Err(e) => {
                warn!("Translation failed: {}", e);
                text
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EnrichError;
    use crate::testing::{FixedDetector, RecordingTranslator};

    fn normalizer(language: Option<&str>, translator: Option<RecordingTranslator>) -> TextNormalizer {
        TextNormalizer::new(
            Box::new(FixedDetector::new(language)),
            translator.map(|t| Box::new(t) as Box<dyn Translator>),
            ExclusionSet::builtin().unwrap(),
            "en",
        )
    }

    #[test]
    fn joins_lines_and_collapses_whitespace() {
        let n = normalizer(Some("en"), None);
        let out = n.normalize("Acme Corp\nmakes   anvils\n\n  and rockets ").unwrap();
        assert_eq!(out, "Acme Corp makes anvils and rockets");
    }

    #[test]
    fn strips_boilerplate_spans() {
        let n = normalizer(Some("en"), None);
        let out = n
            .normalize("About 2,000 results (0.31 seconds)\nAcme Corp sales@acme.example\nhttps://acme.example/contact\nPeople also ask\nFeedback")
            .unwrap();
        assert_eq!(out, "Acme Corp sales@acme.example");
    }

    #[test]
    fn canonical_text_is_not_translated() {
        let translator = RecordingTranslator::returning("SHOULD NOT APPEAR");
        let calls = translator.calls();
        let n = normalizer(Some("en"), Some(translator));
        assert_eq!(n.normalize("hello there").unwrap(), "hello there");
        assert!(calls.lock().unwrap().is_empty());
    }

    #[test]
    fn foreign_text_is_translated_from_detected_language() {
        let translator = RecordingTranslator::returning("Contact the company");
        let calls = translator.calls();
        let n = normalizer(Some("de"), Some(translator));
        assert_eq!(n.normalize("Kontakt\ndie Firma").unwrap(), "Contact the company");
        assert_eq!(
            calls.lock().unwrap().as_slice(),
            &[("Kontakt die Firma".to_string(), "de".to_string(), "en".to_string())]
        );
    }

    #[test]
    fn translation_failure_keeps_original_text() {
        let n = normalizer(Some("fr"), Some(RecordingTranslator::failing()));
        assert_eq!(n.normalize("Bonjour\n  le monde").unwrap(), "Bonjour le monde");
    }

    #[test]
    fn missing_translator_keeps_original_text() {
        let n = normalizer(Some("fr"), None);
        assert_eq!(n.normalize("Bonjour le monde").unwrap(), "Bonjour le monde");
    }

    #[test]
    fn detection_failure_propagates() {
        let n = normalizer(None, None);
        let err = n.normalize("???").unwrap_err();
        assert!(matches!(err, EnrichError::LanguageDetection(_)));
    }

    #[test]
    fn normalizing_twice_is_a_no_op() {
        let n = normalizer(Some("en"), Some(RecordingTranslator::returning("unused")));
        let inputs = [
            "Acme Corp\n  builds\tanvils for   coyotes",
            "  Globex is a company in Cypress Creek  ",
            "Initech\n\nmakes TPS reports",
            "Call us at 555 1234 ",
            "Acme Corp founded 1999 42",
            "Google Feedback Search",
            "Search the More web",
        ];
        for input in inputs {
            let once = n.normalize(input).unwrap();
            assert_eq!(n.normalize(&once).unwrap(), once);
        }
    }

    #[test]
    fn stripping_repeats_until_nothing_matches() {
        let n = normalizer(Some("en"), None);
        assert_eq!(n.normalize("Call us at 555 1234 ").unwrap(), "Call us at");
        assert_eq!(n.normalize("Acme Corp founded 1999 42").unwrap(), "Acme Corp founded");
        assert_eq!(n.normalize("Google Feedback Search").unwrap(), "");
        assert_eq!(n.normalize("Acme Search the More web").unwrap(), "Acme");
    }

    #[test]
    fn output_has_no_double_spaces_or_newlines() {
        let n = normalizer(Some("en"), None);
        let out = n.normalize("a \n\n b\t\tc  Google Search  d").unwrap();
        assert!(!out.contains("  "));
        assert!(!out.contains('\n'));
        assert_eq!(out, "a b c d");
    }

    #[test]
    fn fallback_only_collapses_whitespace() {
        let n = normalizer(None, None);
        assert_eq!(n.fallback("About 3 results\n  x"), "About 3 results x");
    }
}
