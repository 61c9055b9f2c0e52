mod config;
mod logging;
mod output;

use std::io;
use std::path::{Path, PathBuf};

use clap::{Parser, ValueEnum};
use olink_core::{AvailableTarget, OlinkError, Resolver};
use serde::Serialize;
use tracing::debug;

use crate::config::RuntimeConfig;
use crate::output::{
    ErrorDetails, OutputMode, build_error_envelope, build_success_envelope, redact_sensitive,
    render_row, select_output_mode,
};

#[derive(Debug, Parser)]
#[command(
    name = "olink",
    author,
    version,
    about = "Open external URLs related to your project."
)]
struct Cli {
    /// Target to open, optionally as `target:ecosystem` (e.g. `deps:npm`).
    target: Option<String>,
    /// Project directory (defaults to `OLINK_PROJECT_DIR`, then the current directory).
    #[arg(long, short)]
    directory: Option<PathBuf>,
    /// Print the URL without opening it.
    #[arg(long, short = 'n')]
    dry_run: bool,
    /// List targets available for the current project.
    #[arg(long, short)]
    list: bool,
    /// List all targets.
    #[arg(long, short = 'a')]
    list_all: bool,
    /// Explicit output mode (`human`, `json`).
    #[arg(long, value_enum)]
    output: Option<OutputModeArg>,
    /// Shorthand for `--output json`.
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputModeArg {
    Human,
    Json,
}

impl From<OutputModeArg> for OutputMode {
    fn from(value: OutputModeArg) -> Self {
        match value {
            OutputModeArg::Human => OutputMode::Human,
            OutputModeArg::Json => OutputMode::Json,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Action {
    ListAvailable,
    ListAll,
    Open(String),
}

impl Cli {
    /// `--list` wins over `--list-all`, which wins over a target. With none
    /// of them the available targets are listed.
    fn action(&self) -> Action {
        if self.list {
            Action::ListAvailable
        } else if self.list_all {
            Action::ListAll
        } else if let Some(target) = &self.target {
            Action::Open(target.clone())
        } else {
            Action::ListAvailable
        }
    }

    fn command_name(&self) -> &'static str {
        match self.action() {
            Action::ListAvailable => "olink.list",
            Action::ListAll => "olink.list-all",
            Action::Open(_) => "olink.open",
        }
    }

    fn output_mode_hint(&self) -> OutputMode {
        if self.json {
            OutputMode::Json
        } else if let Some(mode) = self.output {
            mode.into()
        } else {
            OutputMode::Human
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ErrorKind {
    User,
    Runtime,
}

#[derive(Debug)]
struct AppError {
    kind: ErrorKind,
    code: &'static str,
    message: String,
}

impl AppError {
    fn user(code: &'static str, message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::User,
            code,
            message: message.into(),
        }
    }

    fn runtime(code: &'static str, message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::Runtime,
            code,
            message: message.into(),
        }
    }

    fn exit_code(&self) -> i32 {
        match self.kind {
            ErrorKind::User => 2,
            ErrorKind::Runtime => 1,
        }
    }
}

const ERROR_CODE_USER_UNKNOWN_TARGET: &str = "user.unknown_target";
const ERROR_CODE_USER_INVALID_PATH: &str = "user.invalid_path";
const ERROR_CODE_USER_OUTPUT_MODE_CONFLICT: &str = "user.output_mode_conflict";
const ERROR_CODE_RUNTIME_NOT_A_REPOSITORY: &str = "runtime.not_a_repository";
const ERROR_CODE_RUNTIME_NO_REMOTE: &str = "runtime.no_remote";
const ERROR_CODE_RUNTIME_UNKNOWN_PLATFORM: &str = "runtime.unknown_platform";
const ERROR_CODE_RUNTIME_PROJECT_METADATA: &str = "runtime.project_metadata";
const ERROR_CODE_RUNTIME_UNSUPPORTED_FEATURE: &str = "runtime.unsupported_feature";
const ERROR_CODE_RUNTIME_OPEN: &str = "runtime.open_failed";
const ERROR_CODE_RUNTIME_SERIALIZE: &str = "runtime.serialize_failed";

#[derive(Debug, Serialize)]
struct OpenResult<'a> {
    target: &'a str,
    url: &'a str,
    opened: bool,
}

#[derive(Debug, Serialize)]
struct TargetRow<'a> {
    name: &'a str,
    description: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    ecosystem: Option<&'static str>,
}

#[derive(Debug, Serialize)]
struct TargetList<'a> {
    targets: Vec<TargetRow<'a>>,
}

fn main() {
    let cli = Cli::parse();
    let command = cli.command_name();
    let output_mode = cli.output_mode_hint();
    let config = RuntimeConfig::from_env();
    logging::init(&config);

    match run_with_config(cli, &config, |url| open::that(url)) {
        Ok(stdout) => {
            println!("{stdout}");
        }
        Err(err) => {
            emit_error(command, output_mode, &err);
            std::process::exit(err.exit_code());
        }
    }
}

fn run_with_config<F>(cli: Cli, config: &RuntimeConfig, open_url: F) -> Result<String, AppError>
where
    F: FnOnce(&str) -> io::Result<()>,
{
    let output_mode = select_output_mode(cli.output.map(Into::into), cli.json)
        .map_err(|error| AppError::user(ERROR_CODE_USER_OUTPUT_MODE_CONFLICT, error.to_string()))?;

    let directory = match (&cli.directory, &config.project_dir) {
        (Some(directory), _) | (None, Some(directory)) => directory.clone(),
        (None, None) => std::env::current_dir().map_err(|error| {
            AppError::user(
                ERROR_CODE_USER_INVALID_PATH,
                format!("cannot read current directory: {error}"),
            )
        })?,
    };
    validate_project_path(&directory)?;

    let resolver = Resolver::builtin();
    let command = cli.command_name();
    let action = cli.action();
    debug!(command, directory = %directory.display(), ?action, "dispatching");

    match action {
        Action::ListAvailable => {
            let rows = resolver.list_available(&directory);
            match output_mode {
                OutputMode::Human => Ok(render_available_human(&rows)),
                OutputMode::Json => {
                    let descriptions: Vec<String> =
                        rows.iter().map(AvailableTarget::display_description).collect();
                    let targets = rows
                        .iter()
                        .zip(&descriptions)
                        .map(|(row, description)| TargetRow {
                            name: &row.name,
                            description,
                            ecosystem: row.ecosystem.map(|ecosystem| ecosystem.id()),
                        })
                        .collect();
                    serialize_success(command, &TargetList { targets })
                }
            }
        }
        Action::ListAll => {
            let rows = resolver.list_all();
            match output_mode {
                OutputMode::Human => Ok(render_all_human(&rows)),
                OutputMode::Json => {
                    let targets = rows
                        .iter()
                        .map(|(name, description)| TargetRow {
                            name,
                            description,
                            ecosystem: None,
                        })
                        .collect();
                    serialize_success(command, &TargetList { targets })
                }
            }
        }
        Action::Open(target) => {
            let url = resolver
                .resolve(&target, &directory)
                .map_err(map_olink_error)?;
            let dry_run = cli.dry_run || config.dry_run;

            if !dry_run {
                open_url(&url).map_err(|error| {
                    AppError::runtime(
                        ERROR_CODE_RUNTIME_OPEN,
                        format!("failed to open {url}: {error}"),
                    )
                })?;
            }

            match output_mode {
                OutputMode::Human if dry_run => Ok(url),
                OutputMode::Human => Ok(format!("Opening: {url}")),
                OutputMode::Json => serialize_success(
                    command,
                    &OpenResult {
                        target: &target,
                        url: &url,
                        opened: !dry_run,
                    },
                ),
            }
        }
    }
}

fn serialize_success<T: Serialize>(command: &str, result: &T) -> Result<String, AppError> {
    build_success_envelope(command, result).map_err(|error| {
        AppError::runtime(
            ERROR_CODE_RUNTIME_SERIALIZE,
            format!("failed to serialize {command} output: {error}"),
        )
    })
}

fn render_available_human(rows: &[AvailableTarget]) -> String {
    if rows.is_empty() {
        return "No targets available for this project.".to_string();
    }

    let mut lines = vec!["Available targets for this project:".to_string(), String::new()];
    for row in rows {
        lines.push(render_row(&row.name, &row.display_description()));
    }
    lines.push(String::new());
    lines.push(format!("({} targets available)", rows.len()));
    lines.join("\n")
}

fn render_all_human(rows: &[(&str, &str)]) -> String {
    let mut lines = vec!["All targets:".to_string(), String::new()];
    for (name, description) in rows {
        lines.push(render_row(name, description));
    }
    lines.join("\n")
}

fn emit_error(command: &str, output_mode: OutputMode, error: &AppError) {
    match output_mode {
        OutputMode::Json => {
            let details = ErrorDetails {
                kind: error_kind_label(error.kind),
                exit_code: error.exit_code(),
            };
            println!(
                "{}",
                build_error_envelope(command, error.code, &error.message, details)
            );
        }
        OutputMode::Human => {
            eprintln!(
                "error[{}]: {}",
                error.code,
                redact_sensitive(&error.message),
            );
        }
    }
}

fn error_kind_label(kind: ErrorKind) -> &'static str {
    match kind {
        ErrorKind::User => "user",
        ErrorKind::Runtime => "runtime",
    }
}

fn validate_project_path(path: &Path) -> Result<(), AppError> {
    if !path.exists() {
        return Err(AppError::user(
            ERROR_CODE_USER_INVALID_PATH,
            format!("directory does not exist: {}", path.to_string_lossy()),
        ));
    }

    if !path.is_dir() {
        return Err(AppError::user(
            ERROR_CODE_USER_INVALID_PATH,
            format!("not a directory: {}", path.to_string_lossy()),
        ));
    }

    Ok(())
}

fn map_olink_error(error: OlinkError) -> AppError {
    let message = error.to_string();
    match error {
        OlinkError::UnknownTarget(_) | OlinkError::UnknownEcosystem { .. } => {
            AppError::user(ERROR_CODE_USER_UNKNOWN_TARGET, message)
        }
        OlinkError::NotARepository(_) => {
            AppError::runtime(ERROR_CODE_RUNTIME_NOT_A_REPOSITORY, message)
        }
        OlinkError::NoRemoteConfigured(_) => {
            AppError::runtime(ERROR_CODE_RUNTIME_NO_REMOTE, message)
        }
        OlinkError::UnknownPlatform(_) => {
            AppError::runtime(ERROR_CODE_RUNTIME_UNKNOWN_PLATFORM, message)
        }
        OlinkError::ProjectMetadataMissing(_) => {
            AppError::runtime(ERROR_CODE_RUNTIME_PROJECT_METADATA, message)
        }
        OlinkError::UnsupportedFeature(_) => {
            AppError::runtime(ERROR_CODE_RUNTIME_UNSUPPORTED_FEATURE, message)
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::fs;

    use tempfile::tempdir;

    use super::*;

    fn cli(target: Option<&str>, directory: &Path) -> Cli {
        Cli {
            target: target.map(str::to_string),
            directory: Some(directory.to_path_buf()),
            dry_run: false,
            list: false,
            list_all: false,
            output: None,
            json: false,
        }
    }

    fn never_open(url: &str) -> io::Result<()> {
        panic!("browser must not be launched for {url}");
    }

    fn write_origin(directory: &Path, url: &str) {
        fs::create_dir_all(directory.join(".git")).expect("create .git");
        fs::write(
            directory.join(".git/config"),
            format!("[remote \"origin\"]\n\turl = {url}\n"),
        )
        .expect("write git config");
    }

    #[test]
    fn dry_run_prints_bare_url() {
        let temp = tempdir().expect("create temp dir");
        write_origin(temp.path(), "git@github.com:owner/repo.git");

        let mut args = cli(Some("issues"), temp.path());
        args.dry_run = true;
        let output = run_with_config(args, &RuntimeConfig::default(), never_open)
            .expect("issues should resolve");

        assert_eq!(output, "https://github.com/owner/repo/issues");
    }

    #[test]
    fn dispatch_runs_with_debug_logging_enabled() {
        let temp = tempdir().expect("create temp dir");
        write_origin(temp.path(), "git@gitlab.com:group/sub/repo.git");
        let config = RuntimeConfig {
            log_filter: "debug".to_string(),
            dry_run: true,
            ..RuntimeConfig::default()
        };
        logging::init(&config);

        let output = run_with_config(cli(Some("issues"), temp.path()), &config, never_open)
            .expect("issues should resolve");
        assert_eq!(output, "https://gitlab.com/group/sub/repo/-/issues");
    }

    #[test]
    fn dry_run_can_come_from_environment() {
        let temp = tempdir().expect("create temp dir");
        write_origin(temp.path(), "git@github.com:owner/repo.git");
        let config = RuntimeConfig {
            dry_run: true,
            ..RuntimeConfig::default()
        };

        let output = run_with_config(cli(Some("origin"), temp.path()), &config, never_open)
            .expect("origin should resolve");
        assert_eq!(output, "https://github.com/owner/repo");
    }

    #[test]
    fn open_launches_browser_and_reports_url() {
        let temp = tempdir().expect("create temp dir");
        write_origin(temp.path(), "git@github.com:owner/repo.git");
        let opened = RefCell::new(Vec::new());

        let output = run_with_config(
            cli(Some("pulls"), temp.path()),
            &RuntimeConfig::default(),
            |url| {
                opened.borrow_mut().push(url.to_string());
                Ok(())
            },
        )
        .expect("pulls should resolve");

        assert_eq!(output, "Opening: https://github.com/owner/repo/pulls");
        assert_eq!(
            opened.into_inner(),
            vec!["https://github.com/owner/repo/pulls"]
        );
    }

    #[test]
    fn launcher_failure_is_runtime_error() {
        let temp = tempdir().expect("create temp dir");
        write_origin(temp.path(), "git@github.com:owner/repo.git");

        let err = run_with_config(
            cli(Some("origin"), temp.path()),
            &RuntimeConfig::default(),
            |_| Err(io::Error::other("no browser")),
        )
        .expect_err("launcher failure should surface");

        assert_eq!(err.kind, ErrorKind::Runtime);
        assert_eq!(err.code, ERROR_CODE_RUNTIME_OPEN);
    }

    #[test]
    fn core_errors_map_to_stable_codes() {
        let temp = tempdir().expect("create temp dir");
        let config = RuntimeConfig::default();

        let err = run_with_config(cli(Some("bogus"), temp.path()), &config, never_open)
            .expect_err("unknown target");
        assert_eq!(err.kind, ErrorKind::User);
        assert_eq!(err.code, ERROR_CODE_USER_UNKNOWN_TARGET);

        let err = run_with_config(cli(Some("issues"), temp.path()), &config, never_open)
            .expect_err("not a repository");
        assert_eq!(err.code, ERROR_CODE_RUNTIME_NOT_A_REPOSITORY);

        let err = run_with_config(cli(Some("pypi"), temp.path()), &config, never_open)
            .expect_err("no pyproject");
        assert_eq!(err.code, ERROR_CODE_RUNTIME_PROJECT_METADATA);
        assert_eq!(err.exit_code(), 1);

        write_origin(temp.path(), "git@bitbucket.org:owner/repo.git");
        let err = run_with_config(cli(Some("security"), temp.path()), &config, never_open)
            .expect_err("bitbucket has no security page");
        assert_eq!(err.code, ERROR_CODE_RUNTIME_UNSUPPORTED_FEATURE);

        let err = run_with_config(cli(Some("upstream"), temp.path()), &config, never_open)
            .expect_err("no upstream");
        assert_eq!(err.code, ERROR_CODE_RUNTIME_NO_REMOTE);
    }

    #[test]
    fn invalid_directory_is_user_error() {
        let temp = tempdir().expect("create temp dir");
        let missing = temp.path().join("missing-project");

        let err = run_with_config(
            cli(Some("origin"), &missing),
            &RuntimeConfig::default(),
            never_open,
        )
        .expect_err("missing directory");
        assert_eq!(err.kind, ErrorKind::User);
        assert_eq!(err.code, ERROR_CODE_USER_INVALID_PATH);
        assert!(err.message.contains(missing.to_string_lossy().as_ref()));
    }

    #[test]
    fn bare_invocation_lists_available_targets() {
        let temp = tempdir().expect("create temp dir");
        fs::write(
            temp.path().join("pyproject.toml"),
            "[project]\nname = \"test-project\"\n",
        )
        .expect("write pyproject");

        let output = run_with_config(cli(None, temp.path()), &RuntimeConfig::default(), never_open)
            .expect("listing succeeds");

        assert!(output.starts_with("Available targets for this project:\n\n"));
        assert!(output.contains("  pypi             - Open the PyPI page"));
        assert!(output.contains("  snyk             - Open the Snyk security advisor (pypi)"));
        assert!(output.ends_with("(13 targets available)"));
    }

    #[test]
    fn empty_project_lists_nothing() {
        let temp = tempdir().expect("create temp dir");
        let mut args = cli(None, temp.path());
        args.list = true;

        let output = run_with_config(args, &RuntimeConfig::default(), never_open)
            .expect("listing succeeds");
        assert_eq!(output, "No targets available for this project.");
    }

    #[test]
    fn list_all_ignores_directory_contents() {
        let temp = tempdir().expect("create temp dir");
        let mut args = cli(None, temp.path());
        args.list_all = true;

        let output = run_with_config(args, &RuntimeConfig::default(), never_open)
            .expect("list-all succeeds");
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines[0], "All targets:");
        assert_eq!(lines.len(), 2 + 37);
        assert_eq!(
            lines[2],
            "  actions          - Open the CI/CD page (Actions, Pipelines)"
        );
    }

    #[test]
    fn json_output_wraps_open_result() {
        let temp = tempdir().expect("create temp dir");
        fs::write(
            temp.path().join("package.json"),
            r#"{"name": "@myorg/test-project"}"#,
        )
        .expect("write package.json");

        let mut args = cli(Some("npm"), temp.path());
        args.json = true;
        args.dry_run = true;
        let output = run_with_config(args, &RuntimeConfig::default(), never_open)
            .expect("npm should resolve");

        let json: serde_json::Value = serde_json::from_str(&output).expect("valid JSON");
        assert_eq!(json["schema_version"], "v1");
        assert_eq!(json["command"], "olink.open");
        assert_eq!(json["ok"], true);
        assert_eq!(
            json["result"]["url"],
            "https://www.npmjs.com/package/@myorg/test-project"
        );
        assert_eq!(json["result"]["opened"], false);
    }

    #[test]
    fn conflicting_output_flags_are_rejected() {
        let temp = tempdir().expect("create temp dir");
        let mut args = cli(Some("origin"), temp.path());
        args.json = true;
        args.output = Some(OutputModeArg::Human);

        let err = run_with_config(args, &RuntimeConfig::default(), never_open)
            .expect_err("must fail");
        assert_eq!(err.kind, ErrorKind::User);
        assert_eq!(err.code, ERROR_CODE_USER_OUTPUT_MODE_CONFLICT);
    }

    #[test]
    fn action_precedence_matches_flags() {
        let temp = tempdir().expect("create temp dir");
        let mut args = cli(Some("pypi"), temp.path());
        assert_eq!(args.action(), Action::Open("pypi".to_string()));
        args.list_all = true;
        assert_eq!(args.action(), Action::ListAll);
        args.list = true;
        assert_eq!(args.action(), Action::ListAvailable);
        assert_eq!(args.command_name(), "olink.list");
    }
}
