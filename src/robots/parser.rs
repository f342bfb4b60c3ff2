//! Robots.txt parser implementation
//!
//! This module provides functionality for parsing robots.txt content using the robotstxt crate.

use robotstxt::DefaultMatcher;

/// The only user-agent group the archiver obeys
pub const WILDCARD_AGENT: &str = "*";

#[derive(Debug, Clone, PartialEq, Eq)]
enum Rules {
    AllowAll,
    DisallowAll,
    Content(String),
}

/// Parsed robots.txt data
///
/// This is a wrapper around the robotstxt crate's matcher, evaluated against the
/// wildcard (`*`) group only; groups for named agents are ignored.
#[derive(Debug, Clone)]
pub struct ParsedRobots {
    rules: Rules,
}

impl ParsedRobots {
    /// Creates a new ParsedRobots from raw robots.txt content
    pub fn from_content(content: &str) -> Self {
        Self {
            rules: Rules::Content(content.to_string()),
        }
    }

    /// Creates a permissive ParsedRobots that allows everything
    ///
    /// This is used as the default when robots.txt cannot be fetched.
    pub fn allow_all() -> Self {
        Self {
            rules: Rules::AllowAll,
        }
    }

    /// Creates a ParsedRobots that denies everything
    ///
    /// Used when the site answers the robots.txt request with 401 or 403.
    pub fn disallow_all() -> Self {
        Self {
            rules: Rules::DisallowAll,
        }
    }

    /// Returns true if no rule can ever deny a URL
    pub fn is_permissive(&self) -> bool {
        match &self.rules {
            Rules::AllowAll => true,
            Rules::DisallowAll => false,
            Rules::Content(content) => content.trim().is_empty(),
        }
    }

    /// Checks if a URL is allowed for the wildcard user agent
    ///
    /// # Arguments
    ///
    /// * `url` - Absolute URL or path to check (e.g., "/page.html")
    pub fn is_allowed(&self, url: &str) -> bool {
        match &self.rules {
            Rules::AllowAll => true,
            Rules::DisallowAll => false,
            Rules::Content(content) if content.trim().is_empty() => true,
            Rules::Content(content) => {
                let mut matcher = DefaultMatcher::default();
                matcher.one_agent_allowed_by_robots(content, WILDCARD_AGENT, url)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allow_all() {
        let robots = ParsedRobots::allow_all();
        assert!(robots.is_permissive());
        assert!(robots.is_allowed("/any/path"));
        assert!(robots.is_allowed("/admin"));
    }

    #[test]
    fn test_disallow_all() {
        let robots = ParsedRobots::disallow_all();
        assert!(!robots.is_permissive());
        assert!(!robots.is_allowed("/"));
        assert!(!robots.is_allowed("http://example.com/page"));
    }

    #[test]
    fn test_parse_disallow_everything() {
        let content = "User-agent: *\nDisallow: /";
        let robots = ParsedRobots::from_content(content);
        assert!(!robots.is_allowed("/"));
        assert!(!robots.is_allowed("/page"));
    }

    #[test]
    fn test_parse_disallow_specific() {
        let content = "User-agent: *\nDisallow: /admin";
        let robots = ParsedRobots::from_content(content);
        assert!(robots.is_allowed("/"));
        assert!(robots.is_allowed("/page"));
        assert!(!robots.is_allowed("/admin"));
        assert!(!robots.is_allowed("/admin/users"));
    }

    #[test]
    fn test_full_urls() {
        let content = "User-agent: *\nDisallow: /private";
        let robots = ParsedRobots::from_content(content);
        assert!(robots.is_allowed("http://example.com/public"));
        assert!(!robots.is_allowed("http://example.com/private/doc.html"));
    }

    #[test]
    fn test_parse_allow_and_disallow() {
        let content = "User-agent: *\nDisallow: /private\nAllow: /private/public";
        let robots = ParsedRobots::from_content(content);
        assert!(robots.is_allowed("/"));
        assert!(!robots.is_allowed("/private"));
        assert!(robots.is_allowed("/private/public"));
    }

    #[test]
    fn test_named_agent_groups_ignored() {
        let content = "User-agent: BadBot\nDisallow: /\n\nUser-agent: *\nAllow: /";
        let robots = ParsedRobots::from_content(content);
        assert!(robots.is_allowed("/page"));
    }

    #[test]
    fn test_only_named_group_allows_everything() {
        let content = "User-agent: SomeBot\nDisallow: /";
        let robots = ParsedRobots::from_content(content);
        assert!(robots.is_allowed("/page"));
    }

    #[test]
    fn test_invalid_robots_txt() {
        let content = "This is not valid robots.txt {{{";
        let robots = ParsedRobots::from_content(content);
        assert!(robots.is_allowed("/any/path"));
    }

    #[test]
    fn test_empty_robots_txt() {
        let robots = ParsedRobots::from_content("");
        assert!(robots.is_permissive());
        assert!(robots.is_allowed("/any/path"));
    }
}
