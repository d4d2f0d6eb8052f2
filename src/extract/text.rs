//! DOM walk producing the linear text stream of one page

use scraper::{ElementRef, Node};

/// Elements whose subtrees never contribute text
pub const EXCLUDED_TAGS: &[&str] = &["script", "style", "noscript"];

/// Text accumulated during the walk of a single page
///
/// A `PageText` is created empty for each page, filled only by
/// [`extract_text`], and consumed once by the chunker. It is owned by the
/// task processing that page and is never shared between pages.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageText {
    text: String,
}

impl PageText {
    /// Creates an empty accumulator
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends one text leaf
    ///
    /// The fragment is trimmed; empty fragments are ignored and non-empty ones
    /// are separated from previous text by exactly one space.
    pub fn push_fragment(&mut self, fragment: &str) {
        let fragment = fragment.trim();
        if fragment.is_empty() {
            return;
        }
        if !self.text.is_empty() {
            self.text.push(' ');
        }
        self.text.push_str(fragment);
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Length in characters, the unit chunk boundaries are measured in
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }

    pub fn into_string(self) -> String {
        self.text
    }
}

impl From<&str> for PageText {
    fn from(text: &str) -> Self {
        let mut page = Self::new();
        page.push_fragment(text);
        page
    }
}

/// Walks a subtree depth-first and collects its visible text
///
/// Pre-order traversal in document order. `script`, `style` and `noscript`
/// subtrees are pruned without visiting their descendants; comments and other
/// non-text nodes contribute nothing. A subtree with no text yields an empty
/// `PageText`.
///
/// # Example
///
/// ```
/// use chunk_crawler::extract::extract_text;
/// use scraper::{Html, Selector};
///
/// let html = Html::parse_document(
///     "<body><script>x</script><p> hello </p><p>world</p></body>",
/// );
/// let body = html.select(&Selector::parse("body").unwrap()).next().unwrap();
/// assert_eq!(extract_text(body).as_str(), "hello world");
/// ```
pub fn extract_text(root: ElementRef<'_>) -> PageText {
    let mut text = PageText::new();

    if is_excluded(root.value().name()) {
        return text;
    }

    // Explicit stack so deeply nested markup cannot exhaust the call stack
    let mut stack: Vec<_> = root.children().rev().collect();

    while let Some(node) = stack.pop() {
        match node.value() {
            Node::Text(leaf) => text.push_fragment(leaf),
            Node::Element(element) if !is_excluded(element.name()) => {
                stack.extend(node.children().rev());
            }
            _ => {}
        }
    }

    text
}

fn is_excluded(name: &str) -> bool {
    EXCLUDED_TAGS.iter().any(|tag| tag.eq_ignore_ascii_case(name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::{Html, Selector};

    fn body_text(html: &str) -> String {
        let document = Html::parse_document(html);
        let selector = Selector::parse("body").unwrap();
        let body = document.select(&selector).next().unwrap();
        extract_text(body).into_string()
    }

    #[test]
    fn test_script_pruned_and_leaves_joined() {
        let text = body_text("<body><script>x</script><p> hello </p><p>world</p></body>");
        assert_eq!(text, "hello world");
    }

    #[test]
    fn test_style_noscript_and_comments_skipped() {
        let text = body_text(
            "<body><style>p { color: red }</style><!-- hidden --><noscript>enable js</noscript><div>kept</div></body>",
        );
        assert_eq!(text, "kept");
    }

    #[test]
    fn test_nested_elements_in_document_order() {
        let text = body_text(
            "<body><div>one <span>two <b>three</b></span> four</div><ul><li>five</li></ul></body>",
        );
        assert_eq!(text, "one two three four five");
    }

    #[test]
    fn test_descendants_of_excluded_never_visited() {
        let text = body_text("<body><noscript><p>inner</p></noscript><p>outer</p></body>");
        assert_eq!(text, "outer");
    }

    #[test]
    fn test_whitespace_only_leaves_contribute_nothing() {
        let text = body_text("<body>\n   <p>   </p>\n\t<p>a</p>  \n</body>");
        assert_eq!(text, "a");
    }

    #[test]
    fn test_page_without_text_is_empty() {
        let text = body_text("<body><img src=\"x.png\"><script>var a = 1;</script></body>");
        assert!(text.is_empty());
    }

    #[test]
    fn test_inner_whitespace_of_a_leaf_is_kept() {
        let text = body_text("<body><p>  two  words </p></body>");
        assert_eq!(text, "two  words");
    }

    #[test]
    fn test_push_fragment_spacing() {
        let mut text = PageText::new();
        text.push_fragment("  ");
        text.push_fragment(" first ");
        text.push_fragment("");
        text.push_fragment("second");
        assert_eq!(text.as_str(), "first second");
        assert_eq!(text.char_len(), 12);
    }

    #[test]
    fn test_separate_walks_do_not_share_text() {
        let first = body_text("<body><p>page one</p></body>");
        let second = body_text("<body><p>page two</p></body>");
        assert_eq!(first, "page one");
        assert_eq!(second, "page two");
    }
}
