//! Reads remote URLs straight from a repository's `config` file.
//!
//! No `git` process is spawned. Known limitations: `[url "..."].insteadOf`
//! rewrites and `[include]` directives are not applied.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::OlinkError;
use crate::remote::{ParsedRemote, parse_remote_url};

const GITDIR_PREFIX: &str = "gitdir:";

/// Resolves the git directory for `directory`, following the `gitdir:`
/// pointer file used by worktrees and submodules.
pub fn git_dir(directory: &Path) -> Option<PathBuf> {
    let dot_git = directory.join(".git");

    if dot_git.is_dir() {
        return Some(dot_git);
    }
    if !dot_git.is_file() {
        return None;
    }

    let content = fs::read_to_string(&dot_git).ok()?;
    let pointer = content.trim().strip_prefix(GITDIR_PREFIX)?.trim();
    if pointer.is_empty() {
        return None;
    }

    let pointer = PathBuf::from(pointer);
    if pointer.is_absolute() {
        Some(pointer)
    } else {
        Some(directory.join(pointer))
    }
}

fn config_path(git_dir: &Path) -> Option<PathBuf> {
    let config = git_dir.join("config");
    if config.is_file() {
        return Some(config);
    }

    // Linked worktrees keep their config in the shared common directory.
    let common = fs::read_to_string(git_dir.join("commondir")).ok()?;
    let common = PathBuf::from(common.trim());
    let common = if common.is_absolute() {
        common
    } else {
        git_dir.join(common)
    };

    let config = common.join("config");
    config.is_file().then_some(config)
}

pub fn read_git_config(directory: &Path) -> Result<GitConfig, OlinkError> {
    let not_a_repo = || OlinkError::NotARepository(directory.to_path_buf());

    let git_dir = git_dir(directory).ok_or_else(not_a_repo)?;
    let path = config_path(&git_dir).ok_or_else(not_a_repo)?;
    let content = fs::read_to_string(&path).map_err(|_| not_a_repo())?;

    Ok(GitConfig::parse(&content))
}

/// URL of `remote_name`, or `None` when the repository has no such remote.
pub fn read_remote_url(directory: &Path, remote_name: &str) -> Result<Option<String>, OlinkError> {
    let config = read_git_config(directory)?;
    Ok(config
        .get("remote", Some(remote_name), "url")
        .map(str::to_string))
}

/// Reads and parses `remote_name`, treating a missing remote as an error.
pub fn parsed_remote(directory: &Path, remote_name: &str) -> Result<ParsedRemote, OlinkError> {
    let url = read_remote_url(directory, remote_name)?
        .filter(|url| !url.trim().is_empty())
        .ok_or_else(|| OlinkError::NoRemoteConfigured(remote_name.to_string()))?;
    parse_remote_url(&url)
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct ConfigEntry {
    section: String,
    subsection: Option<String>,
    key: String,
    value: String,
}

/// Flat view of an INI-style git config file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GitConfig {
    entries: Vec<ConfigEntry>,
}

impl GitConfig {
    pub fn parse(content: &str) -> Self {
        let mut entries = Vec::new();
        let mut current: Option<(String, Option<String>)> = None;

        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
                continue;
            }

            if let Some(header) = line.strip_prefix('[') {
                current = header.split_once(']').map(|(inner, _)| parse_header(inner));
                continue;
            }

            let Some((section, subsection)) = &current else {
                continue;
            };
            let (key, value) = match line.split_once('=') {
                Some((key, value)) => (key.trim(), unquote(value.trim())),
                None => (line, "true"),
            };
            if key.is_empty() {
                continue;
            }

            entries.push(ConfigEntry {
                section: section.clone(),
                subsection: subsection.clone(),
                key: key.to_ascii_lowercase(),
                value: value.to_string(),
            });
        }

        Self { entries }
    }

    /// First value of `key` in `[section "subsection"]`. Section and key
    /// names are case-insensitive; the subsection is not.
    pub fn get(&self, section: &str, subsection: Option<&str>, key: &str) -> Option<&str> {
        let section = section.to_ascii_lowercase();
        let key = key.to_ascii_lowercase();
        self.entries
            .iter()
            .find(|entry| {
                entry.section == section
                    && entry.subsection.as_deref() == subsection
                    && entry.key == key
            })
            .map(|entry| entry.value.as_str())
    }
}

fn parse_header(inner: &str) -> (String, Option<String>) {
    let inner = inner.trim();
    match inner.split_once(char::is_whitespace) {
        Some((section, rest)) => {
            let subsection = unquote(rest.trim()).to_string();
            (section.to_ascii_lowercase(), Some(subsection))
        }
        None => match inner.split_once('.') {
            // Legacy `[remote.origin]` form.
            Some((section, subsection)) => {
                (section.to_ascii_lowercase(), Some(subsection.to_string()))
            }
            None => (inner.to_ascii_lowercase(), None),
        },
    }
}

fn unquote(raw: &str) -> &str {
    raw.strip_prefix('"')
        .and_then(|rest| rest.strip_suffix('"'))
        .unwrap_or(raw)
}
