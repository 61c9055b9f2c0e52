//! Git hosting platforms and the page paths each one serves.

use std::fmt;
use std::str::FromStr;

use crate::error::OlinkError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Platform {
    Github,
    Gitlab,
    Bitbucket,
}

impl Platform {
    pub const ALL: [Self; 3] = [Self::Github, Self::Gitlab, Self::Bitbucket];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Github => "github",
            Self::Gitlab => "gitlab",
            Self::Bitbucket => "bitbucket",
        }
    }

    /// Exact lookup for the public hosts, then a substring heuristic for
    /// self-hosted and enterprise instances.
    pub fn from_host(host: &str) -> Option<Self> {
        let host = host.to_ascii_lowercase();
        match host.as_str() {
            "github.com" | "www.github.com" => return Some(Self::Github),
            "gitlab.com" | "www.gitlab.com" => return Some(Self::Gitlab),
            "bitbucket.org" | "www.bitbucket.org" => return Some(Self::Bitbucket),
            _ => {}
        }

        if host.contains("gitlab") {
            Some(Self::Gitlab)
        } else if host.contains("github") {
            Some(Self::Github)
        } else if host.contains("bitbucket") {
            Some(Self::Bitbucket)
        } else {
            None
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Platform {
    type Err = OlinkError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|platform| platform.as_str() == raw)
            .ok_or_else(|| OlinkError::UnknownPlatform(format!("unknown platform '{raw}'")))
    }
}

/// Logical repository pages, named after their GitHub terminology.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Page {
    Issues,
    Pulls,
    Actions,
    Wiki,
    Releases,
    Branches,
    Commits,
    Security,
    Discussions,
}

impl Page {
    pub const ALL: [Self; 9] = [
        Self::Issues,
        Self::Pulls,
        Self::Actions,
        Self::Wiki,
        Self::Releases,
        Self::Branches,
        Self::Commits,
        Self::Security,
        Self::Discussions,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Issues => "issues",
            Self::Pulls => "pulls",
            Self::Actions => "actions",
            Self::Wiki => "wiki",
            Self::Releases => "releases",
            Self::Branches => "branches",
            Self::Commits => "commits",
            Self::Security => "security",
            Self::Discussions => "discussions",
        }
    }
}

impl fmt::Display for Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Page {
    type Err = OlinkError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|page| page.as_str() == raw)
            .ok_or_else(|| {
                let available = Self::ALL.map(Page::as_str).join(", ");
                OlinkError::UnsupportedFeature(format!(
                    "unknown page '{raw}'. Available: {available}"
                ))
            })
    }
}

fn lookup(platform: Platform, page: Page) -> Option<&'static str> {
    use Page::*;

    match platform {
        Platform::Github => Some(match page {
            Issues => "/issues",
            Pulls => "/pulls",
            Actions => "/actions",
            Wiki => "/wiki",
            Releases => "/releases",
            Branches => "/branches",
            Commits => "/commits",
            Security => "/security",
            Discussions => "/discussions",
        }),
        Platform::Gitlab => match page {
            Issues => Some("/-/issues"),
            Pulls => Some("/-/merge_requests"),
            Actions => Some("/-/pipelines"),
            Wiki => Some("/-/wikis"),
            Releases => Some("/-/releases"),
            Branches => Some("/-/branches"),
            Commits => Some("/-/commits"),
            Security => Some("/-/security/dashboard"),
            Discussions => None,
        },
        Platform::Bitbucket => match page {
            Issues => Some("/issues"),
            Pulls => Some("/pull-requests"),
            Actions => Some("/pipelines"),
            Wiki => Some("/wiki"),
            Releases => Some("/downloads"),
            Branches => Some("/branches"),
            Commits => Some("/commits"),
            Security | Discussions => None,
        },
    }
}

/// Path suffix for `page` on `platform`, appended to a repository base URL.
pub fn page_path(platform: Platform, page: Page) -> Result<&'static str, OlinkError> {
    lookup(platform, page).ok_or_else(|| {
        OlinkError::UnsupportedFeature(format!("'{page}' is not available on {platform}"))
    })
}

/// String-keyed variant of [`page_path`] for callers holding raw names.
pub fn page_path_by_name(platform: &str, page: &str) -> Result<&'static str, OlinkError> {
    let platform: Platform = platform.parse()?;
    let page: Page = page.parse()?;
    page_path(platform, page)
}
