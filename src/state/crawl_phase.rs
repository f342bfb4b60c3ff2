/// Crawl phase definitions for tracking controller progress
///
/// A crawl moves strictly forward through these phases; a finished crawl is never
/// restarted.
use std::fmt;

/// Represents the lifecycle phase of one crawl
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CrawlPhase {
    /// Controller created, nothing started
    Idle,

    /// Seed normalized, base domain computed, robots policy being loaded
    Initializing,

    /// Workers are processing the frontier
    Running,

    /// Waiting for the frontier to drain, then shutting workers down
    Draining,

    /// All workers joined; report available
    Stopped,
}

impl CrawlPhase {
    /// Returns true if this is the terminal phase
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Stopped)
    }

    /// Returns true while workers may be alive
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Running | Self::Draining)
    }

    /// Checks whether moving from this phase to `next` is legal
    ///
    /// Phases advance one step at a time. Any non-terminal phase may also jump to
    /// `Stopped`, which is how a failed initialization or a cancelled crawl ends.
    pub fn can_transition_to(&self, next: CrawlPhase) -> bool {
        match (self, next) {
            (Self::Idle, Self::Initializing)
            | (Self::Initializing, Self::Running)
            | (Self::Running, Self::Draining) => true,
            (Self::Stopped, _) => false,
            (_, Self::Stopped) => true,
            _ => false,
        }
    }

    /// Short lowercase name used in log lines
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Initializing => "initializing",
            Self::Running => "running",
            Self::Draining => "draining",
            Self::Stopped => "stopped",
        }
    }
}

impl Default for CrawlPhase {
    fn default() -> Self {
        Self::Idle
    }
}

impl fmt::Display for CrawlPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
