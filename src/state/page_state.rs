/// Outcome tracking for individual URLs
use std::fmt;

/// Terminal state of one admitted URL whose fetch was started
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PageState {
    // ===== Success States =====
    /// Fetched, parsed and its chunks committed
    Processed,

    /// Fetched and parsed, but the keyword classifier declined to chunk it
    Filtered,

    /// Answered with a redirect; the target was offered to admission
    Redirected,

    // ===== Error States =====
    /// HTTP 404 or 410
    DeadLink,

    /// Connection refused, DNS failure, TLS error or timeout
    Unreachable,

    /// Any other non-2xx status or body read failure
    Failed,

    /// Content-Type is not HTML
    ContentMismatch,

    /// Fetch abandoned because the run was cancelled
    Abandoned,
}

impl PageState {
    /// Returns true if the page was fetched and parsed
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Processed | Self::Filtered)
    }

    /// Returns true if the fetch failed
    pub fn is_error(&self) -> bool {
        matches!(
            self,
            Self::DeadLink | Self::Unreachable | Self::Failed | Self::ContentMismatch
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Processed => "processed",
            Self::Filtered => "filtered",
            Self::DeadLink => "dead_link",
            Self::Unreachable => "unreachable",
            Self::Failed => "failed",
            Self::ContentMismatch => "content_mismatch",
            Self::Redirected => "redirected",
            Self::Abandoned => "abandoned",
        }
    }
}

impl fmt::Display for PageState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
