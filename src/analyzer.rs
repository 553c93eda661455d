//! Query-side text analysis
//!
//! The analyzer breaks managed-query text into the terms a full-text field
//! matches on. It can legitimately consume every token (stopwords, length
//! bounds); callers treat an empty term list as "nothing to match", not as an
//! error.

use std::collections::HashSet;
use std::fmt;

use rust_stemmers::{Algorithm, Stemmer};
use stop_words::{get, LANGUAGE};
use unicode_segmentation::UnicodeSegmentation;

use crate::config::AnalyzerConfig;

/// Text analyzer used by the full-text value type
pub struct Analyzer {
    config: AnalyzerConfig,
    stemmer: Option<Stemmer>,
    stopwords: HashSet<String>,
}

impl Analyzer {
    /// Create a new analyzer from configuration
    pub fn new(config: &AnalyzerConfig) -> Self {
        let stemmer = if config.stem {
            Some(Stemmer::create(Algorithm::English))
        } else {
            None
        };

        let stopwords = if config.remove_stopwords {
            get(LANGUAGE::English)
                .into_iter()
                .map(|s| s.to_lowercase())
                .collect()
        } else {
            HashSet::new()
        };

        Self {
            config: config.clone(),
            stemmer,
            stopwords,
        }
    }

    /// Analyze text into query terms
    ///
    /// Returns an empty vector when every token was filtered out.
    pub fn analyze(&self, text: &str) -> Vec<String> {
        let mut terms: Vec<String> = text
            .unicode_words()
            .map(|word| {
                if self.config.lowercase {
                    word.to_lowercase()
                } else {
                    word.to_string()
                }
            })
            .filter(|term| {
                term.len() >= self.config.min_token_length
                    && term.len() <= self.config.max_token_length
                    && !self.stopwords.contains(term)
            })
            .collect();

        if let Some(stemmer) = &self.stemmer {
            terms = terms
                .into_iter()
                .map(|term| stemmer.stem(&term).to_string())
                .collect();
        }

        terms
    }
}

impl Default for Analyzer {
    fn default() -> Self {
        Self::new(&AnalyzerConfig::default())
    }
}

impl fmt::Debug for Analyzer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Analyzer")
            .field("config", &self.config)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_analyze_lowercases() {
        let analyzer = Analyzer::default();
        let terms = analyzer.analyze("Rust Programming");
        assert_eq!(terms, vec!["rust", "programming"]);
    }

    #[test]
    fn test_analyze_removes_stopwords() {
        let analyzer = Analyzer::default();
        let terms = analyzer.analyze("the quick fox");
        assert_eq!(terms, vec!["quick", "fox"]);
    }

    #[test]
    fn test_analyze_can_consume_everything() {
        let analyzer = Analyzer::default();
        // Stopwords plus a single character: nothing survives
        let terms = analyzer.analyze("the a an");
        assert!(terms.is_empty());
    }

    #[test]
    fn test_analyze_without_stopword_removal() {
        let config = AnalyzerConfig {
            remove_stopwords: false,
            ..Default::default()
        };
        let analyzer = Analyzer::new(&config);
        let terms = analyzer.analyze("the fox");
        assert_eq!(terms, vec!["the", "fox"]);
    }

    #[test]
    fn test_analyze_stemming() {
        let config = AnalyzerConfig {
            stem: true,
            ..Default::default()
        };
        let analyzer = Analyzer::new(&config);
        let terms = analyzer.analyze("running");
        assert_eq!(terms, vec!["run"]);
    }
}
