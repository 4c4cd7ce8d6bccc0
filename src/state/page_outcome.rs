use crate::crawler::FetchError;
use std::fmt;

/// What happened to a single processed page
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageOutcome {
    /// Score met the threshold (or the page is a seed); links were offered to the frontier
    Accepted,

    /// Fetched, but the score was below the threshold
    Rejected,

    /// The fetch failed; the page scores zero and has no links
    SoftFailed(FetchError),
}

impl fmt::Display for PageOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Accepted => f.write_str("accepted"),
            Self::Rejected => f.write_str("rejected"),
            Self::SoftFailed(err) => write!(f, "soft failure ({})", err),
        }
    }
}
