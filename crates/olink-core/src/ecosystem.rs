//! Package ecosystems: manifest detection and package-name extraction.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use tracing::warn;

use crate::error::{MetadataError, OlinkError};

static GO_MODULE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^module\s+(\S+)").expect("Invalid regex"));
static GEMSPEC_NAME_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"\w+\.name\s*=\s*['"]([^'"]+)['"]"#).expect("Invalid regex"));
static PUBSPEC_NAME_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?m)^name:\s*['"]?([^\s'"]+)['"]?"#).expect("Invalid regex")
});
static MIX_APP_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"app:\s*:(\w+)").expect("Invalid regex"));
static CSPROJ_PACKAGE_ID_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<PackageId>([^<]+)</PackageId>").expect("Invalid regex"));

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Ecosystem {
    Pypi,
    Npm,
    Cargo,
    Go,
    Gems,
    Packagist,
    Pub,
    Hex,
    Nuget,
}

impl Ecosystem {
    /// Detection order.
    pub const ALL: [Self; 9] = [
        Self::Pypi,
        Self::Npm,
        Self::Cargo,
        Self::Go,
        Self::Gems,
        Self::Packagist,
        Self::Pub,
        Self::Hex,
        Self::Nuget,
    ];

    pub fn id(self) -> &'static str {
        match self {
            Self::Pypi => "pypi",
            Self::Npm => "npm",
            Self::Cargo => "cargo",
            Self::Go => "go",
            Self::Gems => "gems",
            Self::Packagist => "packagist",
            Self::Pub => "pub",
            Self::Hex => "hex",
            Self::Nuget => "nuget",
        }
    }
}

impl fmt::Display for Ecosystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for Ecosystem {
    type Err = OlinkError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|ecosystem| ecosystem.id() == raw)
            .ok_or_else(|| {
                let mut ids = Self::ALL.map(Ecosystem::id);
                ids.sort_unstable();
                OlinkError::UnknownEcosystem {
                    id: raw.to_string(),
                    available: ids.join(", "),
                }
            })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManifestPattern {
    File(&'static str),
    Glob(&'static str),
}

impl ManifestPattern {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::File(name) | Self::Glob(name) => name,
        }
    }

    /// First manifest in `directory` matching this pattern. Glob matches are
    /// taken in file-name order so repeated lookups agree.
    pub fn locate(self, directory: &Path) -> Option<PathBuf> {
        match self {
            Self::File(name) => {
                let path = directory.join(name);
                path.is_file().then_some(path)
            }
            Self::Glob(pattern) => {
                let pattern = glob::Pattern::new(pattern).ok()?;
                let mut matches: Vec<PathBuf> = fs::read_dir(directory)
                    .ok()?
                    .filter_map(Result::ok)
                    .filter(|entry| entry.path().is_file())
                    .filter(|entry| pattern.matches(&entry.file_name().to_string_lossy()))
                    .map(|entry| entry.path())
                    .collect();
                matches.sort();
                matches.into_iter().next()
            }
        }
    }
}

type Extractor = fn(&Path) -> Result<String, MetadataError>;

#[derive(Debug, Clone, Copy)]
pub struct EcosystemDescriptor {
    pub ecosystem: Ecosystem,
    pub display_name: &'static str,
    pub manifest: ManifestPattern,
    extract: Extractor,
}

impl EcosystemDescriptor {
    const fn new(
        ecosystem: Ecosystem,
        display_name: &'static str,
        manifest: ManifestPattern,
        extract: Extractor,
    ) -> Self {
        Self {
            ecosystem,
            display_name,
            manifest,
            extract,
        }
    }

    pub fn manifest_exists(&self, directory: &Path) -> bool {
        self.manifest.locate(directory).is_some()
    }

    pub fn extract_name(&self, directory: &Path) -> Result<String, MetadataError> {
        (self.extract)(directory)
    }
}

/// The fixed set of supported ecosystems, built once and shared read-only.
#[derive(Debug, Clone)]
pub struct EcosystemRegistry {
    descriptors: Vec<EcosystemDescriptor>,
}

impl EcosystemRegistry {
    pub fn builtin() -> Self {
        use ManifestPattern::{File, Glob};

        Self {
            descriptors: vec![
                EcosystemDescriptor::new(
                    Ecosystem::Pypi,
                    "Python",
                    File("pyproject.toml"),
                    pypi_name,
                ),
                EcosystemDescriptor::new(Ecosystem::Npm, "npm", File("package.json"), npm_name),
                EcosystemDescriptor::new(Ecosystem::Cargo, "Rust", File("Cargo.toml"), cargo_name),
                EcosystemDescriptor::new(Ecosystem::Go, "Go", File("go.mod"), go_name),
                EcosystemDescriptor::new(Ecosystem::Gems, "Ruby", Glob("*.gemspec"), gems_name),
                EcosystemDescriptor::new(
                    Ecosystem::Packagist,
                    "PHP",
                    File("composer.json"),
                    packagist_name,
                ),
                EcosystemDescriptor::new(Ecosystem::Pub, "Dart", File("pubspec.yaml"), pub_name),
                EcosystemDescriptor::new(Ecosystem::Hex, "Elixir", File("mix.exs"), hex_name),
                EcosystemDescriptor::new(Ecosystem::Nuget, ".NET", Glob("*.csproj"), nuget_name),
            ],
        }
    }

    pub fn descriptors(&self) -> &[EcosystemDescriptor] {
        &self.descriptors
    }

    pub fn descriptor(&self, ecosystem: Ecosystem) -> Option<&EcosystemDescriptor> {
        self.descriptors
            .iter()
            .find(|descriptor| descriptor.ecosystem == ecosystem)
    }

    /// Ecosystems whose manifest exists in `directory` and yields a name.
    ///
    /// A manifest that is present but unreadable is logged and skipped so
    /// one broken file never hides the others.
    pub fn detect(&self, directory: &Path) -> Vec<Ecosystem> {
        let mut detected = Vec::new();
        for descriptor in &self.descriptors {
            if !descriptor.manifest_exists(directory) {
                continue;
            }
            match descriptor.extract_name(directory) {
                Ok(_) => detected.push(descriptor.ecosystem),
                Err(error) => warn!(
                    manifest = descriptor.manifest.as_str(),
                    %error,
                    "manifest found but skipped"
                ),
            }
        }
        detected
    }

    pub fn extract_name(
        &self,
        directory: &Path,
        ecosystem: Ecosystem,
    ) -> Result<String, OlinkError> {
        let descriptor = self.descriptor(ecosystem).ok_or_else(|| {
            OlinkError::UnknownEcosystem {
                id: ecosystem.id().to_string(),
                available: self.available_ids(),
            }
        })?;
        Ok(descriptor.extract_name(directory)?)
    }

    pub fn extract_name_by_id(&self, directory: &Path, id: &str) -> Result<String, OlinkError> {
        let ecosystem: Ecosystem = id.parse()?;
        self.extract_name(directory, ecosystem)
    }

    fn available_ids(&self) -> String {
        let mut ids: Vec<&str> = self
            .descriptors
            .iter()
            .map(|descriptor| descriptor.ecosystem.id())
            .collect();
        ids.sort_unstable();
        ids.join(", ")
    }
}

impl Default for EcosystemRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

fn read_manifest(path: &Path) -> Result<String, MetadataError> {
    fs::read_to_string(path).map_err(|error| MetadataError::Malformed {
        manifest: manifest_label(path),
        message: error.to_string(),
    })
}

fn manifest_label(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| path.to_string_lossy().to_string())
}

fn required_file(directory: &Path, name: &'static str) -> Result<PathBuf, MetadataError> {
    ManifestPattern::File(name)
        .locate(directory)
        .ok_or(MetadataError::ManifestAbsent { manifest: name })
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

fn toml_table_name(
    directory: &Path,
    manifest: &'static str,
    table: &str,
    field: &'static str,
) -> Result<String, MetadataError> {
    let path = required_file(directory, manifest)?;
    let document: toml::Table =
        read_manifest(&path)?
            .parse()
            .map_err(|error: toml::de::Error| MetadataError::Malformed {
                manifest: manifest.to_string(),
                message: error.message().to_string(),
            })?;

    let name = document
        .get(table)
        .and_then(|section| section.get("name"))
        .and_then(toml::Value::as_str);
    non_empty(name).ok_or(MetadataError::FieldMissing {
        manifest: manifest.to_string(),
        field,
    })
}

fn json_name(directory: &Path, manifest: &'static str) -> Result<String, MetadataError> {
    let path = required_file(directory, manifest)?;
    let document: serde_json::Value =
        serde_json::from_str(&read_manifest(&path)?).map_err(|error| MetadataError::Malformed {
            manifest: manifest.to_string(),
            message: error.to_string(),
        })?;

    non_empty(document.get("name").and_then(serde_json::Value::as_str)).ok_or(
        MetadataError::FieldMissing {
            manifest: manifest.to_string(),
            field: "name",
        },
    )
}

fn pattern_name(path: &Path, pattern: &Regex) -> Result<Option<String>, MetadataError> {
    let content = read_manifest(path)?;
    let name = pattern
        .captures(&content)
        .and_then(|captures| captures.get(1))
        .map(|capture| capture.as_str());
    Ok(non_empty(name))
}

fn pypi_name(directory: &Path) -> Result<String, MetadataError> {
    toml_table_name(directory, "pyproject.toml", "project", "project.name")
}

fn npm_name(directory: &Path) -> Result<String, MetadataError> {
    json_name(directory, "package.json")
}

fn cargo_name(directory: &Path) -> Result<String, MetadataError> {
    toml_table_name(directory, "Cargo.toml", "package", "package.name")
}

fn go_name(directory: &Path) -> Result<String, MetadataError> {
    let path = required_file(directory, "go.mod")?;
    pattern_name(&path, &GO_MODULE_PATTERN)?.ok_or(MetadataError::FieldMissing {
        manifest: "go.mod".to_string(),
        field: "module",
    })
}

fn gems_name(directory: &Path) -> Result<String, MetadataError> {
    let path = ManifestPattern::Glob("*.gemspec")
        .locate(directory)
        .ok_or(MetadataError::ManifestAbsent {
            manifest: ".gemspec file",
        })?;
    pattern_name(&path, &GEMSPEC_NAME_PATTERN)?.ok_or_else(|| {
        MetadataError::FieldMissing {
            manifest: manifest_label(&path),
            field: "name",
        }
    })
}

fn packagist_name(directory: &Path) -> Result<String, MetadataError> {
    json_name(directory, "composer.json")
}

fn pub_name(directory: &Path) -> Result<String, MetadataError> {
    let path = required_file(directory, "pubspec.yaml")?;
    pattern_name(&path, &PUBSPEC_NAME_PATTERN)?.ok_or(MetadataError::FieldMissing {
        manifest: "pubspec.yaml".to_string(),
        field: "name",
    })
}

fn hex_name(directory: &Path) -> Result<String, MetadataError> {
    let path = required_file(directory, "mix.exs")?;
    pattern_name(&path, &MIX_APP_PATTERN)?.ok_or(MetadataError::FieldMissing {
        manifest: "mix.exs".to_string(),
        field: "app",
    })
}

fn nuget_name(directory: &Path) -> Result<String, MetadataError> {
    let path = ManifestPattern::Glob("*.csproj")
        .locate(directory)
        .ok_or(MetadataError::ManifestAbsent {
            manifest: ".csproj file",
        })?;
    if let Some(package_id) = pattern_name(&path, &CSPROJ_PACKAGE_ID_PATTERN)? {
        return Ok(package_id);
    }

    non_empty(path.file_stem().and_then(|stem| stem.to_str())).ok_or_else(|| {
        MetadataError::FieldMissing {
            manifest: manifest_label(&path),
            field: "PackageId",
        }
    })
}
