use std::path::PathBuf;

use thiserror::Error;

use crate::ecosystem::Ecosystem;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OlinkError {
    #[error("'{}' is not inside a git repository", .0.display())]
    NotARepository(PathBuf),
    #[error("no '{0}' remote configured")]
    NoRemoteConfigured(String),
    #[error("unknown git hosting platform: {0}")]
    UnknownPlatform(String),
    #[error("{0}")]
    UnknownTarget(String),
    #[error("unknown ecosystem: '{id}'. Available: {available}")]
    UnknownEcosystem { id: String, available: String },
    #[error(transparent)]
    ProjectMetadataMissing(#[from] MetadataError),
    #[error("{0}")]
    UnsupportedFeature(String),
}

/// Why a project's package identity could not be determined.
///
/// The manifest variants let callers tell "not this ecosystem" apart from
/// "this ecosystem, but its manifest is broken".
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MetadataError {
    #[error("No {manifest} found")]
    ManifestAbsent { manifest: &'static str },
    #[error("Invalid {manifest}: {message}")]
    Malformed { manifest: String, message: String },
    #[error("No '{field}' in {manifest}")]
    FieldMissing {
        manifest: String,
        field: &'static str,
    },
    #[error("No supported ecosystem found for '{target}'. Supported: {}", join_ids(.supported))]
    NoSupportedEcosystem {
        target: String,
        supported: Vec<Ecosystem>,
    },
    #[error(
        "Multiple ecosystems detected ({}). Use: {}",
        join_ids(.candidates),
        join_variants(.target, .candidates)
    )]
    AmbiguousEcosystem {
        target: String,
        candidates: Vec<Ecosystem>,
    },
    #[error("'{target}' doesn't support ecosystem '{ecosystem}'. Supported: {}", join_ids(.supported))]
    UnsupportedEcosystem {
        target: String,
        ecosystem: Ecosystem,
        supported: Vec<Ecosystem>,
    },
}

impl MetadataError {
    /// The `name:ecosystem` forms a caller can use to disambiguate.
    pub fn suggested_variants(&self) -> Vec<String> {
        match self {
            Self::AmbiguousEcosystem { target, candidates } => candidates
                .iter()
                .map(|ecosystem| format!("{target}:{ecosystem}"))
                .collect(),
            _ => Vec::new(),
        }
    }
}

fn join_ids(ecosystems: &[Ecosystem]) -> String {
    let mut ids: Vec<&str> = ecosystems.iter().map(|ecosystem| ecosystem.id()).collect();
    ids.sort_unstable();
    ids.join(", ")
}

fn join_variants(target: &str, ecosystems: &[Ecosystem]) -> String {
    let mut ids: Vec<&str> = ecosystems.iter().map(|ecosystem| ecosystem.id()).collect();
    ids.sort_unstable();
    ids.iter()
        .map(|id| format!("{target}:{id}"))
        .collect::<Vec<_>>()
        .join(", ")
}
