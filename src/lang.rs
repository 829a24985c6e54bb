//! Language detection and word-substitution translation.
//!
//! Detection is a static dispatch table: rules are tried in priority order
//! and the first rule with any pattern contained in the text wins.
//! Translation swaps known words through a small bilingual dictionary and
//! leaves everything else untouched.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Languages the detector and translator know about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Language {
    #[serde(rename = "en")]
    English,
    #[serde(rename = "ru")]
    Russian,
}

impl Language {
    /// ISO 639-1 code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::English => "en",
            Self::Russian => "ru",
        }
    }

    /// The other language of the pair.
    pub fn other(&self) -> Self {
        match self {
            Self::English => Self::Russian,
            Self::Russian => Self::English,
        }
    }
}

/// One row of the detection table.
#[derive(Debug, Clone)]
pub struct DetectionRule {
    patterns: Vec<String>,
    language: Language,
}

impl DetectionRule {
    /// A rule matching when any of `patterns` occurs in the lowercased text.
    pub fn new<I, S>(patterns: I, language: Language) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            patterns: patterns.into_iter().map(|p| p.into().to_lowercase()).collect(),
            language,
        }
    }

    fn matches(&self, text: &str) -> bool {
        self.patterns.iter().any(|p| text.contains(p.as_str()))
    }
}

/// Ordered (pattern -> language) table.
#[derive(Debug, Clone)]
pub struct LanguageDetector {
    rules: Vec<DetectionRule>,
    fallback: Language,
}

impl Default for LanguageDetector {
    fn default() -> Self {
        let cyrillic = ('а'..='я').chain(std::iter::once('ё')).map(String::from);
        Self::new(
            vec![DetectionRule::new(cyrillic, Language::Russian)],
            Language::English,
        )
    }
}

impl LanguageDetector {
    /// Creates a detector from rules in priority order.
    pub fn new(rules: Vec<DetectionRule>, fallback: Language) -> Self {
        Self { rules, fallback }
    }

    /// Language of the first matching rule, or the fallback.
    pub fn detect(&self, text: &str) -> Language {
        let text = text.to_lowercase();
        self.rules
            .iter()
            .find(|rule| rule.matches(&text))
            .map_or(self.fallback, |rule| rule.language)
    }
}

const DICTIONARY: &[(&str, &str)] = &[
    ("hello", "привет"),
    ("world", "мир"),
    ("the", ""),
    ("cat", "кот"),
    ("dog", "собака"),
    ("fox", "лиса"),
    ("quick", "быстрый"),
    ("brown", "коричневый"),
    ("lazy", "ленивый"),
    ("and", "и"),
    ("is", "это"),
    ("a", ""),
    ("good", "хороший"),
    ("day", "день"),
    ("friend", "друг"),
    ("thank", "спасибо"),
    ("yes", "да"),
    ("no", "нет"),
    ("computer", "компьютер"),
    ("program", "программа"),
    ("language", "язык"),
    ("data", "данные"),
    ("network", "сеть"),
    ("neural", "нейронная"),
    ("learning", "обучение"),
    ("machine", "машина"),
    ("text", "текст"),
    ("word", "слово"),
    ("time", "время"),
    ("people", "люди"),
    ("future", "будущее"),
    ("code", "код"),
];

/// Bilingual word-substitution dictionary.
#[derive(Debug, Clone)]
pub struct Translator {
    en_ru: HashMap<String, String>,
    ru_en: HashMap<String, String>,
}

impl Default for Translator {
    fn default() -> Self {
        Self::new(DICTIONARY.iter().copied())
    }
}

impl Translator {
    /// Builds a translator from (english, russian) pairs. An empty side
    /// means the word is dropped when translating in that direction.
    pub fn new<'a, I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut en_ru = HashMap::new();
        let mut ru_en = HashMap::new();
        for (en, ru) in pairs {
            en_ru.insert(en.to_lowercase(), ru.to_lowercase());
            if !ru.is_empty() {
                ru_en.insert(ru.to_lowercase(), en.to_lowercase());
            }
        }
        Self { en_ru, ru_en }
    }

    /// Translates `text` word by word into `target`.
    ///
    /// Lookup is case-insensitive and ignores surrounding punctuation, which
    /// is kept around the substituted word. Unknown words pass through.
    pub fn translate(&self, text: &str, target: Language) -> String {
        let table = match target {
            Language::Russian => &self.en_ru,
            Language::English => &self.ru_en,
        };
        let words: Vec<String> = text
            .split_whitespace()
            .filter_map(|word| substitute(table, word))
            .collect();
        words.join(" ")
    }
}

/// Swaps the alphabetic core of `word`; `None` if it translates to nothing.
fn substitute(table: &HashMap<String, String>, word: &str) -> Option<String> {
    let core = word.trim_matches(|c: char| !c.is_alphanumeric());
    if core.is_empty() {
        return Some(word.to_string());
    }
    let Some(replacement) = table.get(&core.to_lowercase()) else {
        return Some(word.to_string());
    };
    let start = word.find(core).unwrap_or(0);
    let (prefix, rest) = word.split_at(start);
    let suffix = &rest[core.len()..];
    if replacement.is_empty() {
        let punctuation = format!("{prefix}{suffix}");
        return (!punctuation.is_empty()).then_some(punctuation);
    }
    Some(format!("{prefix}{replacement}{suffix}"))
}
