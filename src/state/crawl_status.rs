/// Crawl engine state definitions
///
/// An engine starts `Idle`, moves to `Running` when a crawl starts, and ends in
/// exactly one of the terminal states.
use std::fmt;

/// Represents the lifecycle state of a crawl engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CrawlStatus {
    /// Engine constructed, no crawl started yet
    Idle,

    /// A crawl is in progress
    Running,

    // ===== Terminal States =====
    /// The last crawl finished normally (frontier empty or limit reached)
    Completed,

    /// The last crawl halted on a systemic fault
    Failed,
}

impl CrawlStatus {
    /// Returns true if this is a terminal state
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }

    /// Returns true if the transition `self -> next` is allowed
    ///
    /// Terminal states may move back to `Running`, since calling `crawl()`
    /// again starts a fresh run on the same engine.
    pub fn can_transition_to(&self, next: CrawlStatus) -> bool {
        matches!(
            (self, next),
            (Self::Idle, Self::Running)
                | (Self::Completed, Self::Running)
                | (Self::Failed, Self::Running)
                | (Self::Running, Self::Completed)
                | (Self::Running, Self::Failed)
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for CrawlStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
