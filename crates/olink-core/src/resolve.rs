//! Resolution facade: target names in, URLs out.

use std::path::Path;

use tracing::debug;

use crate::catalog::Catalog;
use crate::ecosystem::{Ecosystem, EcosystemRegistry};
use crate::error::OlinkError;
use crate::target::{
    TargetDescriptor, TargetKind, resolve_git_page, resolve_multi_ecosystem,
    resolve_single_ecosystem,
};

/// Splits `target` or `target:ecosystem` on the first `:`.
pub fn split_target_name(name: &str) -> (&str, Option<&str>) {
    match name.split_once(':') {
        Some((base, suffix)) => (base, Some(suffix)),
        None => (name, None),
    }
}

/// One row of [`Resolver::list_available`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AvailableTarget {
    /// Either the bare target name or a `name:ecosystem` variant.
    pub name: String,
    pub description: &'static str,
    /// Set for multi-ecosystem rows.
    pub ecosystem: Option<Ecosystem>,
}

impl AvailableTarget {
    pub fn is_variant(&self) -> bool {
        self.name.contains(':')
    }

    /// Description with the auto-detected ecosystem appended, as listings
    /// show it. Variant rows already carry the ecosystem in their name.
    pub fn display_description(&self) -> String {
        match self.ecosystem {
            Some(ecosystem) if !self.is_variant() => {
                format!("{} ({ecosystem})", self.description)
            }
            _ => self.description.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Resolver {
    catalog: Catalog,
    ecosystems: EcosystemRegistry,
}

impl Resolver {
    pub fn new(catalog: Catalog, ecosystems: EcosystemRegistry) -> Self {
        Self {
            catalog,
            ecosystems,
        }
    }

    pub fn builtin() -> Self {
        Self::new(Catalog::builtin(), EcosystemRegistry::builtin())
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn ecosystems(&self) -> &EcosystemRegistry {
        &self.ecosystems
    }

    /// Resolves `name` (optionally suffixed with `:ecosystem`) against the
    /// project in `directory`.
    pub fn resolve(&self, name: &str, directory: &Path) -> Result<String, OlinkError> {
        let (base, suffix) = split_target_name(name);
        let descriptor = self.lookup(base)?;

        let explicit = match suffix {
            Some(suffix) => Some(self.validate_suffix(descriptor, suffix)?),
            None => None,
        };

        self.resolve_descriptor(descriptor, explicit, directory)
    }

    /// Target-level resolution. An ecosystem the target does not support
    /// fails with `ProjectMetadataMissing` here; [`Resolver::resolve`]
    /// rejects it earlier as an unknown target.
    pub fn resolve_descriptor(
        &self,
        descriptor: &TargetDescriptor,
        ecosystem: Option<Ecosystem>,
        directory: &Path,
    ) -> Result<String, OlinkError> {
        match &descriptor.kind {
            TargetKind::GitPage { remote, view } => resolve_git_page(directory, remote, *view),
            TargetKind::SingleEcosystem { ecosystem, url } => {
                resolve_single_ecosystem(&self.ecosystems, directory, *ecosystem, url)
            }
            TargetKind::MultiEcosystem(url) => resolve_multi_ecosystem(
                &self.ecosystems,
                directory,
                descriptor.name,
                url,
                ecosystem,
            ),
        }
    }

    /// Every catalog entry, directory independent.
    pub fn list_all(&self) -> Vec<(&'static str, &'static str)> {
        self.catalog
            .iter()
            .map(|descriptor| (descriptor.name, descriptor.description))
            .collect()
    }

    /// Targets that resolve for `directory`. Resolution failures only mean
    /// "not available here" and are never reported.
    pub fn list_available(&self, directory: &Path) -> Vec<AvailableTarget> {
        let detected = self.ecosystems.detect(directory);
        let mut available = Vec::new();

        for descriptor in self.catalog.iter() {
            let TargetKind::MultiEcosystem(url) = &descriptor.kind else {
                if self.probe(descriptor, None, directory) {
                    available.push(AvailableTarget {
                        name: descriptor.name.to_string(),
                        description: descriptor.description,
                        ecosystem: None,
                    });
                }
                continue;
            };

            let candidates: Vec<Ecosystem> = url
                .supported()
                .into_iter()
                .filter(|ecosystem| detected.contains(ecosystem))
                .collect();

            match candidates.as_slice() {
                [] => {}
                [only] => {
                    if self.probe(descriptor, Some(*only), directory) {
                        available.push(AvailableTarget {
                            name: descriptor.name.to_string(),
                            description: descriptor.description,
                            ecosystem: Some(*only),
                        });
                    }
                }
                _ => {
                    let mut ordered = candidates;
                    ordered.sort_unstable_by_key(|ecosystem| ecosystem.id());
                    for ecosystem in ordered {
                        if self.probe(descriptor, Some(ecosystem), directory) {
                            available.push(AvailableTarget {
                                name: format!("{}:{ecosystem}", descriptor.name),
                                description: descriptor.description,
                                ecosystem: Some(ecosystem),
                            });
                        }
                    }
                }
            }
        }

        available
    }

    fn probe(
        &self,
        descriptor: &TargetDescriptor,
        ecosystem: Option<Ecosystem>,
        directory: &Path,
    ) -> bool {
        match self.resolve_descriptor(descriptor, ecosystem, directory) {
            Ok(_) => true,
            Err(err) => {
                debug!(target_name = descriptor.name, error = %err, "target unavailable");
                false
            }
        }
    }

    fn lookup(&self, base: &str) -> Result<&TargetDescriptor, OlinkError> {
        self.catalog.get(base).ok_or_else(|| {
            let available = self.catalog.names().collect::<Vec<_>>().join(", ");
            OlinkError::UnknownTarget(format!(
                "Unknown target: '{base}'. Available targets: {available}"
            ))
        })
    }

    fn validate_suffix(
        &self,
        descriptor: &TargetDescriptor,
        suffix: &str,
    ) -> Result<Ecosystem, OlinkError> {
        let name = descriptor.name;
        if !descriptor.is_multi_ecosystem() {
            return Err(OlinkError::UnknownTarget(format!(
                "Target '{name}' doesn't support ecosystem suffix. Use '{name}' without suffix."
            )));
        }

        let supported = descriptor.supported_ecosystems();
        suffix
            .parse::<Ecosystem>()
            .ok()
            .filter(|ecosystem| supported.contains(ecosystem))
            .ok_or_else(|| {
                let mut ids: Vec<&str> = supported.iter().map(|ecosystem| ecosystem.id()).collect();
                ids.sort_unstable();
                OlinkError::UnknownTarget(format!(
                    "Target '{name}' doesn't support ecosystem '{suffix}'. Supported: {}",
                    ids.join(", ")
                ))
            })
    }
}
