//! Language identification and the translation provider client.

use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use log::debug;
use whatlang::Lang;

use crate::error::{EnrichError, Result};

pub trait LanguageDetector: Send + Sync {
    /// ISO 639-1 code of the dominant language (639-3 where no two-letter code exists).
    fn detect(&self, text: &str) -> Result<String>;
}

pub trait Translator: Send + Sync {
    fn translate(&self, text: &str, src: &str, dest: &str) -> Result<String>;
}

/// Trigram-based detection via `whatlang`.
///
/// Fails on blank input and on text with no recognisable script. Otherwise
/// the best guess is returned even when whatlang flags it as unreliable.
#[derive(Debug, Default, Clone, Copy)]
pub struct WhatlangDetector;

impl LanguageDetector for WhatlangDetector {
    fn detect(&self, text: &str) -> Result<String> {
        if text.trim().is_empty() {
            return Err(EnrichError::LanguageDetection("no features in text".to_string()));
        }

        let info = whatlang::detect(text).ok_or_else(|| {
            EnrichError::LanguageDetection("language could not be identified".to_string())
        })?;

        debug!(
            "Detected language {} (confidence {:.2}, reliable: {})",
            info.lang().code(),
            info.confidence(),
            info.is_reliable()
        );
        Ok(iso_639_1(info.lang()).to_string())
    }
}

/// Maps whatlang's ISO 639-3 languages onto the two-letter codes translation APIs expect.
pub fn iso_639_1(lang: Lang) -> &'static str {
    match lang {
        Lang::Eng => "en",
        Lang::Fra => "fr",
        Lang::Deu => "de",
        Lang::Spa => "es",
        Lang::Por => "pt",
        Lang::Ita => "it",
        Lang::Nld => "nl",
        Lang::Rus => "ru",
        Lang::Ukr => "uk",
        Lang::Pol => "pl",
        Lang::Ces => "cs",
        Lang::Slk => "sk",
        Lang::Slv => "sl",
        Lang::Hrv => "hr",
        Lang::Srp => "sr",
        Lang::Bul => "bg",
        Lang::Ron => "ro",
        Lang::Hun => "hu",
        Lang::Fin => "fi",
        Lang::Swe => "sv",
        Lang::Dan => "da",
        Lang::Nob => "no",
        Lang::Est => "et",
        Lang::Lav => "lv",
        Lang::Lit => "lt",
        Lang::Ell => "el",
        Lang::Tur => "tr",
        Lang::Ara => "ar",
        Lang::Heb => "he",
        Lang::Pes => "fa",
        Lang::Hin => "hi",
        Lang::Ben => "bn",
        Lang::Urd => "ur",
        Lang::Tam => "ta",
        Lang::Tel => "te",
        Lang::Mar => "mr",
        Lang::Guj => "gu",
        Lang::Jpn => "ja",
        Lang::Kor => "ko",
        Lang::Cmn => "zh-cn",
        Lang::Vie => "vi",
        Lang::Tha => "th",
        Lang::Ind => "id",
        Lang::Tgl => "tl",
        Lang::Cat => "ca",
        Lang::Afr => "af",
        Lang::Lat => "la",
        Lang::Epo => "eo",
        other => other.code(),
    }
}

#[derive(Serialize)]
struct TranslationRequest<'a> {
    text: &'a str,
    src: &'a str,
    dest: &'a str,
}

#[derive(Deserialize)]
struct TranslationResponse {
    #[serde(alias = "translatedText", alias = "text", alias = "translation")]
    translated_text: String,
}

/// JSON translation endpoint: POST `{text, src, dest}`, reads the translated text field.
pub struct HttpTranslator {
    client: Client,
    api_url: String,
}

impl HttpTranslator {
    pub fn new(api_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(HttpTranslator { client, api_url: api_url.into() })
    }
}

impl Translator for HttpTranslator {
    fn translate(&self, text: &str, src: &str, dest: &str) -> Result<String> {
        let resp = self
            .client
            .post(&self.api_url)
            .json(&TranslationRequest { text, src, dest })
            .send()?;

        let status = resp.status();
        if !status.is_success() {
            return Err(EnrichError::Translation(format!("provider returned status {}", status)));
        }

        let body: TranslationResponse = resp
            .json()
            .map_err(|e| EnrichError::Translation(format!("unreadable response: {}", e)))?;
        Ok(body.translated_text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_english_prose() {
        let text = "The company was founded in Ohio and now sells industrial equipment to \
                    customers across the entire world, with offices in several large cities.";
        assert_eq!(WhatlangDetector.detect(text).unwrap(), "en");
    }

    #[test]
    fn detects_german_prose() {
        let text = "Das Unternehmen wurde in Berlin gegründet und verkauft heute Maschinen \
                    an Kunden auf der ganzen Welt, mit Büros in mehreren großen Städten.";
        assert_eq!(WhatlangDetector.detect(text).unwrap(), "de");
    }

    #[test]
    fn empty_text_fails_detection() {
        let err = WhatlangDetector.detect("   ").unwrap_err();
        assert!(matches!(err, EnrichError::LanguageDetection(_)));
    }

    #[test]
    fn two_letter_codes_for_common_languages() {
        assert_eq!(iso_639_1(Lang::Eng), "en");
        assert_eq!(iso_639_1(Lang::Jpn), "ja");
        assert_eq!(iso_639_1(Lang::Zul), "zul");
    }

    #[test]
    fn translation_response_accepts_provider_field_names() {
        let a: TranslationResponse = serde_json::from_str(r#"{"translated_text":"hi"}"#).unwrap();
        let b: TranslationResponse = serde_json::from_str(r#"{"translatedText":"hi"}"#).unwrap();
        let c: TranslationResponse = serde_json::from_str(r#"{"text":"hi"}"#).unwrap();
        assert_eq!(a.translated_text, "hi");
        assert_eq!(b.translated_text, "hi");
        assert_eq!(c.translated_text, "hi");
    }

    #[test]
    fn unreachable_translator_reports_an_error() {
        let translator = HttpTranslator::new("http://127.0.0.1:9/translate", Duration::from_secs(2)).unwrap();
        assert!(translator.translate("Hallo", "de", "en").is_err());
    }
}
