//! Target descriptors and the URL each kind of target produces.

use std::path::Path;

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use tracing::debug;

use crate::ecosystem::{Ecosystem, EcosystemRegistry};
use crate::error::{MetadataError, OlinkError};
use crate::git::parsed_remote;
use crate::platform::{Page, Platform, page_path};
use crate::remote::ParsedRemote;

/// Characters never escaped, matching RFC 3986 unreserved.
const UNRESERVED: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// Package names keep `@` and `/` so scoped npm names stay readable.
const PACKAGE_NAME: &AsciiSet = &UNRESERVED.remove(b'@').remove(b'/');

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameEncoding {
    /// Path segment with the `@`/`/` allow-list.
    Path,
    /// Form-encoded query value.
    Query,
}

impl NameEncoding {
    pub fn encode(self, name: &str) -> String {
        match self {
            Self::Path => utf8_percent_encode(name, PACKAGE_NAME).to_string(),
            Self::Query => utf8_percent_encode(name, UNRESERVED)
                .to_string()
                .replace("%20", "+"),
        }
    }
}

fn encode_segment(raw: &str) -> String {
    utf8_percent_encode(raw, UNRESERVED).to_string()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoverageService {
    Codecov,
    Coveralls,
}

impl CoverageService {
    fn url(self, remote: &ParsedRemote) -> String {
        let owner = encode_segment(&remote.owner);
        let repo = encode_segment(&remote.repo);
        match self {
            Self::Codecov => {
                let code = match remote.platform {
                    Platform::Github => "gh",
                    Platform::Gitlab => "gl",
                    Platform::Bitbucket => "bb",
                };
                format!("https://codecov.io/{code}/{owner}/{repo}")
            }
            Self::Coveralls => format!("https://coveralls.io/{}/{owner}/{repo}", remote.platform),
        }
    }
}

/// What a git-remote target shows for the parsed remote.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GitView {
    Repository,
    Page(Page),
    Coverage(CoverageService),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PackageUrl {
    pub prefix: &'static str,
    pub suffix: &'static str,
    pub encoding: NameEncoding,
}

impl PackageUrl {
    pub const fn path(prefix: &'static str, suffix: &'static str) -> Self {
        Self {
            prefix,
            suffix,
            encoding: NameEncoding::Path,
        }
    }

    pub const fn query(prefix: &'static str) -> Self {
        Self {
            prefix,
            suffix: "",
            encoding: NameEncoding::Query,
        }
    }

    pub fn render(&self, name: &str) -> String {
        format!("{}{}{}", self.prefix, self.encoding.encode(name), self.suffix)
    }
}

/// `{prefix}{segment}{infix}{name}` where the segment depends on ecosystem.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EcosystemUrl {
    pub prefix: &'static str,
    pub infix: &'static str,
    pub segments: &'static [(Ecosystem, &'static str)],
}

impl EcosystemUrl {
    pub fn supports(&self, ecosystem: Ecosystem) -> bool {
        self.segment(ecosystem).is_some()
    }

    pub fn segment(&self, ecosystem: Ecosystem) -> Option<&'static str> {
        self.segments
            .iter()
            .find(|(candidate, _)| *candidate == ecosystem)
            .map(|(_, segment)| *segment)
    }

    pub fn supported(&self) -> Vec<Ecosystem> {
        self.segments.iter().map(|(ecosystem, _)| *ecosystem).collect()
    }

    fn render(&self, segment: &str, name: &str) -> String {
        format!(
            "{}{segment}{}{}",
            self.prefix,
            self.infix,
            NameEncoding::Path.encode(name)
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetKind {
    GitPage {
        remote: &'static str,
        view: GitView,
    },
    SingleEcosystem {
        ecosystem: Ecosystem,
        url: PackageUrl,
    },
    MultiEcosystem(EcosystemUrl),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TargetDescriptor {
    pub name: &'static str,
    pub description: &'static str,
    pub kind: TargetKind,
}

impl TargetDescriptor {
    pub fn is_multi_ecosystem(&self) -> bool {
        matches!(self.kind, TargetKind::MultiEcosystem(_))
    }

    /// Ecosystems accepted as a `name:ecosystem` suffix; empty for targets
    /// that take no suffix.
    pub fn supported_ecosystems(&self) -> Vec<Ecosystem> {
        match &self.kind {
            TargetKind::MultiEcosystem(url) => url.supported(),
            _ => Vec::new(),
        }
    }
}

pub(crate) fn resolve_git_page(
    directory: &Path,
    remote_name: &str,
    view: GitView,
) -> Result<String, OlinkError> {
    let remote = parsed_remote(directory, remote_name)?;
    match view {
        GitView::Repository => Ok(remote.base_url()),
        GitView::Page(page) => {
            let suffix = page_path(remote.platform, page)?;
            Ok(format!("{}{suffix}", remote.base_url()))
        }
        GitView::Coverage(service) => Ok(service.url(&remote)),
    }
}

pub(crate) fn resolve_single_ecosystem(
    registry: &EcosystemRegistry,
    directory: &Path,
    ecosystem: Ecosystem,
    url: &PackageUrl,
) -> Result<String, OlinkError> {
    let name = registry.extract_name(directory, ecosystem)?;
    Ok(url.render(&name))
}

/// Picks the ecosystem for a multi-ecosystem target. An explicit choice must
/// be supported; otherwise exactly one detected, supported ecosystem must
/// exist. Ambiguity is reported, never guessed.
pub(crate) fn select_ecosystem(
    registry: &EcosystemRegistry,
    directory: &Path,
    target: &str,
    url: &EcosystemUrl,
    explicit: Option<Ecosystem>,
) -> Result<Ecosystem, MetadataError> {
    if let Some(ecosystem) = explicit {
        if url.supports(ecosystem) {
            return Ok(ecosystem);
        }
        return Err(MetadataError::UnsupportedEcosystem {
            target: target.to_string(),
            ecosystem,
            supported: url.supported(),
        });
    }

    let candidates: Vec<Ecosystem> = registry
        .detect(directory)
        .into_iter()
        .filter(|ecosystem| url.supports(*ecosystem))
        .collect();

    match candidates.as_slice() {
        [] => Err(MetadataError::NoSupportedEcosystem {
            target: target.to_string(),
            supported: url.supported(),
        }),
        [only] => {
            debug!(target_name = target, ecosystem = %only, "auto-detected ecosystem");
            Ok(*only)
        }
        _ => Err(MetadataError::AmbiguousEcosystem {
            target: target.to_string(),
            candidates,
        }),
    }
}

pub(crate) fn resolve_multi_ecosystem(
    registry: &EcosystemRegistry,
    directory: &Path,
    target: &str,
    url: &EcosystemUrl,
    explicit: Option<Ecosystem>,
) -> Result<String, OlinkError> {
    let ecosystem = select_ecosystem(registry, directory, target, url, explicit)?;
    let name = registry.extract_name(directory, ecosystem)?;
    let segment = url.segment(ecosystem).unwrap_or(ecosystem.id());
    Ok(url.render(segment, &name))
}
