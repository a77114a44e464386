// src/crawl/robots.rs
// =============================================================================
// robots.txt rules for the crawl host.
//
// Parsing and matching are done by texting_robots (Google's matching rules:
// user-agent groups, Allow/Disallow, `*` and `$`, longest match wins).
// This wrapper adds the "allow everything" case for when there is no
// robots.txt or the crawler is told to ignore it.
// =============================================================================

use anyhow::{Context, Result};
use texting_robots::Robot;
use url::Url;

pub struct RobotsRules {
    robot: Option<Robot>,
}

impl RobotsRules {
    /// Rules that allow everything (no robots.txt, or not respecting it).
    pub fn allow_all() -> Self {
        Self { robot: None }
    }

    // Parses a robots.txt body for our user agent
    pub fn parse(body: &str, user_agent: &str) -> Result<Self> {
        let robot = Robot::new(product_token(user_agent), body.as_bytes())
            .context("parsing robots.txt")?;
        Ok(Self { robot: Some(robot) })
    }

    pub fn is_allowed(&self, url: &Url) -> bool {
        self.robot
            .as_ref()
            .map_or(true, |robot| robot.allowed(url.as_str()))
    }
}

// Groups are matched on the product token, the part before the version:
// "site-auditor/0.1.0" -> "site-auditor"
fn product_token(user_agent: &str) -> &str {
    user_agent
        .split('/')
        .next()
        .unwrap_or(user_agent)
        .trim()
}

#[cfg(test)]
mod tests {
    use super::*;

    const ROBOTS: &str = "\
# comment line
User-agent: *
Disallow: /private/
Disallow: /tmp
Allow: /private/public-page

User-agent: site-auditor
User-agent: other-bot
Disallow: /no-audits/
";

    fn url(path: &str) -> Url {
        Url::parse("https://example.com/").unwrap().join(path).unwrap()
    }

    #[test]
    fn test_product_token() {
        assert_eq!(product_token("site-auditor/0.1.0"), "site-auditor");
        assert_eq!(product_token("plainbot"), "plainbot");
    }

    #[test]
    fn test_wildcard_group() {
        let rules = RobotsRules::parse(ROBOTS, "some-browser/1.0").unwrap();
        assert!(rules.is_allowed(&url("/")));
        assert!(rules.is_allowed(&url("/blog/post")));
        assert!(!rules.is_allowed(&url("/private/secret")));
        assert!(!rules.is_allowed(&url("/tmp/file")));
        assert!(!rules.is_allowed(&url("/tmpfile")));
        assert!(rules.is_allowed(&url("/private/public-page")));
    }

    #[test]
    fn test_specific_group_replaces_wildcard() {
        let rules = RobotsRules::parse(ROBOTS, "site-auditor/0.1.0").unwrap();
        assert!(!rules.is_allowed(&url("/no-audits/x")));
        // The `*` group does not apply once a specific group matched
        assert!(rules.is_allowed(&url("/private/secret")));
    }

    #[test]
    fn test_matched_group_with_empty_disallow_allows_all() {
        let body = "User-agent: *\nDisallow: /\n\nUser-agent: site-auditor\nDisallow:\n";
        let rules = RobotsRules::parse(body, "site-auditor/0.1.0").unwrap();
        assert!(rules.is_allowed(&url("/blog")));

        let others = RobotsRules::parse(body, "some-browser/1.0").unwrap();
        assert!(!others.is_allowed(&url("/blog")));
    }

    #[test]
    fn test_empty_disallow_allows_all() {
        let rules = RobotsRules::parse("User-agent: *\nDisallow:\n", "site-auditor").unwrap();
        assert!(rules.is_allowed(&url("/anything")));
    }

    #[test]
    fn test_wildcards_and_anchor() {
        let rules = RobotsRules::parse("User-agent: *\nDisallow: /*.php$\n", "bot").unwrap();
        assert!(!rules.is_allowed(&url("/index.php")));
        assert!(rules.is_allowed(&url("/index.php/extra")));
        assert!(rules.is_allowed(&url("/index.html")));
    }

    #[test]
    fn test_longer_allow_beats_disallow() {
        let rules =
            RobotsRules::parse("User-agent: *\nDisallow: /docs\nAllow: /docs/public\n", "bot")
                .unwrap();
        assert!(!rules.is_allowed(&url("/docs/internal")));
        assert!(rules.is_allowed(&url("/docs/public/page")));
    }

    #[test]
    fn test_allow_all() {
        assert!(RobotsRules::allow_all().is_allowed(&url("/private/")));
    }
}
