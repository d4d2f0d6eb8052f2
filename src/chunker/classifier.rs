use crate::config::ClassifierConfig;

/// Keyword pre-filter deciding whether a page is worth chunking
///
/// A page passes when at least `min_matches` distinct keywords occur in its
/// title or text, compared case-insensitively. Pages that fail are still
/// crawled for links; they just emit no chunks.
#[derive(Debug, Clone)]
pub struct KeywordClassifier {
    keywords: Vec<String>,
    min_matches: usize,
}

impl KeywordClassifier {
    pub fn new<I, S>(keywords: I, min_matches: usize) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut keywords: Vec<String> = keywords
            .into_iter()
            .map(|k| k.as_ref().trim().to_lowercase())
            .filter(|k| !k.is_empty())
            .collect();
        keywords.sort();
        keywords.dedup();

        Self {
            keywords,
            min_matches: min_matches.max(1),
        }
    }

    pub fn from_config(config: &ClassifierConfig) -> Self {
        Self::new(&config.keywords, config.min_matches)
    }

    /// Returns true if the page should be chunked
    pub fn is_relevant(&self, title: Option<&str>, text: &str) -> bool {
        let title = title.unwrap_or_default().to_lowercase();
        let text = text.to_lowercase();

        let matches = self
            .keywords
            .iter()
            .filter(|k| title.contains(k.as_str()) || text.contains(k.as_str()))
            .count();

        matches >= self.min_matches
    }
}
