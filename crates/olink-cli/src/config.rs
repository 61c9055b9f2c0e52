use std::collections::HashMap;
use std::path::PathBuf;

pub const HOME_ENV: &str = "HOME";
pub const OLINK_LOG_ENV: &str = "OLINK_LOG";
pub const RUST_LOG_ENV: &str = "RUST_LOG";
pub const OLINK_PROJECT_DIR_ENV: &str = "OLINK_PROJECT_DIR";
pub const OLINK_DRY_RUN_ENV: &str = "OLINK_DRY_RUN";
pub const DEFAULT_LOG_FILTER: &str = "warn";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeConfig {
    pub log_filter: String,
    /// Project directory used when `--directory` is absent.
    pub project_dir: Option<PathBuf>,
    pub dry_run: bool,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            log_filter: DEFAULT_LOG_FILTER.to_string(),
            project_dir: None,
            dry_run: false,
        }
    }
}

impl RuntimeConfig {
    pub fn from_env() -> Self {
        Self::from_pairs(std::env::vars())
    }

    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let map: HashMap<String, String> = pairs
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();

        Self {
            log_filter: resolve_log_filter(&map),
            project_dir: resolve_project_dir(&map),
            dry_run: map
                .get(OLINK_DRY_RUN_ENV)
                .is_some_and(|value| is_truthy(value)),
        }
    }
}

fn non_empty<'a>(map: &'a HashMap<String, String>, key: &str) -> Option<&'a str> {
    map.get(key)
        .map(String::as_str)
        .map(str::trim)
        .filter(|value| !value.is_empty())
}

fn resolve_log_filter(map: &HashMap<String, String>) -> String {
    non_empty(map, OLINK_LOG_ENV)
        .or_else(|| non_empty(map, RUST_LOG_ENV))
        .unwrap_or(DEFAULT_LOG_FILTER)
        .to_string()
}

fn resolve_project_dir(map: &HashMap<String, String>) -> Option<PathBuf> {
    let home = map.get(HOME_ENV).map(String::as_str).unwrap_or_default();
    non_empty(map, OLINK_PROJECT_DIR_ENV)
        .map(|raw| expand_home_tokens(raw, home))
        .filter(|expanded| !expanded.is_empty())
        .map(PathBuf::from)
}

fn is_truthy(raw: &str) -> bool {
    matches!(
        raw.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

pub fn expand_home_tokens(raw: &str, home: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return String::new();
    }

    let mut expanded = trimmed.replace("$HOME", home);

    if expanded == "~" {
        expanded = home.to_string();
    } else if let Some(rest) = expanded.strip_prefix("~/") {
        expanded = format!("{home}/{rest}");
    }

    expanded
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_defaults_without_environment() {
        let config = RuntimeConfig::from_pairs(Vec::<(String, String)>::new());
        assert_eq!(config, RuntimeConfig::default());
    }

    #[test]
    fn config_prefers_olink_log_over_rust_log() {
        let config = RuntimeConfig::from_pairs(vec![
            (RUST_LOG_ENV, "info"),
            (OLINK_LOG_ENV, "olink_core=debug"),
        ]);
        assert_eq!(config.log_filter, "olink_core=debug");

        let config = RuntimeConfig::from_pairs(vec![(RUST_LOG_ENV, "info"), (OLINK_LOG_ENV, " ")]);
        assert_eq!(config.log_filter, "info");
    }

    #[test]
    fn config_expands_home_in_project_dir() {
        let config = RuntimeConfig::from_pairs(vec![
            (HOME_ENV, "/tmp/home"),
            (OLINK_PROJECT_DIR_ENV, "~/code/app"),
        ]);
        assert_eq!(config.project_dir, Some(PathBuf::from("/tmp/home/code/app")));

        let config = RuntimeConfig::from_pairs(vec![
            (HOME_ENV, "/tmp/home"),
            (OLINK_PROJECT_DIR_ENV, "$HOME/app"),
        ]);
        assert_eq!(config.project_dir, Some(PathBuf::from("/tmp/home/app")));
    }

    #[test]
    fn config_reads_truthy_dry_run_values() {
        for value in ["1", "true", "YES", " on "] {
            let config = RuntimeConfig::from_pairs(vec![(OLINK_DRY_RUN_ENV, value)]);
            assert!(config.dry_run, "{value}");
        }
        for value in ["0", "false", "", "maybe"] {
            let config = RuntimeConfig::from_pairs(vec![(OLINK_DRY_RUN_ENV, value)]);
            assert!(!config.dry_run, "{value}");
        }
    }
}
