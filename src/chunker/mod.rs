//! Sliding-window chunking of page text
//!
//! A page's text is cut into overlapping windows of at most `max_len`
//! characters. Each window after the first starts `overlap` characters before
//! the end of the previous one, so neighbouring chunks share context. Windows
//! are measured in characters (Unicode scalar values) and never split a
//! character, but they do split words: boundary alignment is left to the
//! embedding side, which tolerates it.

mod classifier;

pub use classifier::KeywordClassifier;

use crate::config::ChunkingConfig;
use crate::extract::PageText;
use crate::ConfigError;
use serde::Serialize;

/// A bounded segment of one page's text, ready for indexing
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Chunk {
    /// Page the text came from
    #[serde(rename = "url")]
    pub source_url: String,

    /// Title of that page, when it has one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// At most `max_len` characters of page text
    pub content: String,

    /// Index in global emission order across the whole run
    pub position: u64,
}

/// Validated chunking parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Chunker {
    max_len: usize,
    overlap: usize,
}

impl Chunker {
    /// Creates a chunker
    ///
    /// # Returns
    ///
    /// * `Err(ConfigError::Validation)` - `max_len` is zero or `overlap >= max_len`
    pub fn new(max_len: usize, overlap: usize) -> Result<Self, ConfigError> {
        if max_len == 0 {
            return Err(ConfigError::Validation(
                "max_chunk_length must be greater than 0".to_string(),
            ));
        }
        if overlap >= max_len {
            return Err(ConfigError::Validation(format!(
                "overlap_length must be less than max_chunk_length ({}), got {}",
                max_len, overlap
            )));
        }
        Ok(Self { max_len, overlap })
    }

    pub fn from_config(config: &ChunkingConfig) -> Result<Self, ConfigError> {
        Self::new(config.max_chunk_length, config.overlap_length)
    }

    pub fn max_len(&self) -> usize {
        self.max_len
    }

    pub fn overlap(&self) -> usize {
        self.overlap
    }

    /// Character windows covering a text of `char_len` characters
    pub fn windows(&self, char_len: usize) -> ChunkWindows {
        ChunkWindows::new(char_len, self.max_len, self.overlap)
    }

    /// Splits text into window slices
    ///
    /// # Example
    ///
    /// ```
    /// use chunk_crawler::Chunker;
    ///
    /// let chunker = Chunker::new(4, 1).unwrap();
    /// assert_eq!(chunker.split("abcdefghij"), vec!["abcd", "defg", "ghij"]);
    /// assert!(chunker.split("").is_empty());
    /// ```
    pub fn split<'a>(&self, text: &'a str) -> Vec<&'a str> {
        // Byte offset of every character start, plus the end of the string
        let offsets: Vec<usize> = text
            .char_indices()
            .map(|(i, _)| i)
            .chain(std::iter::once(text.len()))
            .collect();
        let char_len = offsets.len() - 1;

        self.windows(char_len)
            .map(|(start, end)| &text[offsets[start]..offsets[end]])
            .collect()
    }

    /// Chunks one page, numbering chunks from `first_position`
    ///
    /// Empty text produces no chunks.
    pub fn chunk_page(
        &self,
        text: &PageText,
        source_url: &str,
        title: Option<&str>,
        first_position: u64,
    ) -> Vec<Chunk> {
        self.split(text.as_str())
            .into_iter()
            .zip(first_position..)
            .map(|(content, position)| Chunk {
                source_url: source_url.to_string(),
                title: title.map(str::to_string),
                content: content.to_string(),
                position,
            })
            .collect()
    }
}

impl Default for Chunker {
    fn default() -> Self {
        Self {
            max_len: 1000,
            overlap: 100,
        }
    }
}

/// Iterator over `(start, end)` character offsets of successive chunks
///
/// The first window starts at 0 and every window ends at
/// `min(start + max_len, len)`. The window reaching `len` is the last one.
/// Otherwise the next window starts at `end - overlap`, or at `start + 1` if
/// that would not move forward, so iteration always terminates.
#[derive(Debug, Clone)]
pub struct ChunkWindows {
    len: usize,
    max_len: usize,
    overlap: usize,
    next_start: Option<usize>,
}

impl ChunkWindows {
    pub fn new(len: usize, max_len: usize, overlap: usize) -> Self {
        Self {
            len,
            max_len: max_len.max(1),
            overlap,
            next_start: (len > 0).then_some(0),
        }
    }
}

impl Iterator for ChunkWindows {
    type Item = (usize, usize);

    fn next(&mut self) -> Option<Self::Item> {
        let start = self.next_start?;
        let end = start.saturating_add(self.max_len).min(self.len);

        self.next_start = if end == self.len {
            None
        } else {
            let candidate = end.saturating_sub(self.overlap);
            Some(if candidate <= start { start + 1 } else { candidate })
        };

        Some((start, end))
    }
}
