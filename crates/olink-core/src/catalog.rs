use std::collections::BTreeMap;

use crate::ecosystem::Ecosystem;
use crate::platform::Page;
use crate::target::{
    CoverageService, EcosystemUrl, GitView, PackageUrl, TargetDescriptor, TargetKind,
};

const SNYK_SEGMENTS: &[(Ecosystem, &str)] = &[
    (Ecosystem::Cargo, "rust"),
    (Ecosystem::Go, "golang"),
    (Ecosystem::Npm, "npm-package"),
    (Ecosystem::Pypi, "python"),
];

const IDENTITY_SEGMENTS: &[(Ecosystem, &str)] = &[
    (Ecosystem::Cargo, "cargo"),
    (Ecosystem::Go, "go"),
    (Ecosystem::Npm, "npm"),
    (Ecosystem::Pypi, "pypi"),
];

const ECOSYSTEMS_SEGMENTS: &[(Ecosystem, &str)] = &[
    (Ecosystem::Cargo, "crates.io"),
    (Ecosystem::Go, "proxy.golang.org"),
    (Ecosystem::Npm, "npmjs.org"),
    (Ecosystem::Pypi, "pypi.org"),
];

const fn repository(
    name: &'static str,
    description: &'static str,
    remote: &'static str,
) -> TargetDescriptor {
    TargetDescriptor {
        name,
        description,
        kind: TargetKind::GitPage {
            remote,
            view: GitView::Repository,
        },
    }
}

const fn page(name: &'static str, description: &'static str, page: Page) -> TargetDescriptor {
    TargetDescriptor {
        name,
        description,
        kind: TargetKind::GitPage {
            remote: "origin",
            view: GitView::Page(page),
        },
    }
}

const fn coverage(
    name: &'static str,
    description: &'static str,
    service: CoverageService,
) -> TargetDescriptor {
    TargetDescriptor {
        name,
        description,
        kind: TargetKind::GitPage {
            remote: "origin",
            view: GitView::Coverage(service),
        },
    }
}

const fn package(
    name: &'static str,
    description: &'static str,
    ecosystem: Ecosystem,
    url: PackageUrl,
) -> TargetDescriptor {
    TargetDescriptor {
        name,
        description,
        kind: TargetKind::SingleEcosystem { ecosystem, url },
    }
}

const fn multi(
    name: &'static str,
    description: &'static str,
    prefix: &'static str,
    infix: &'static str,
    segments: &'static [(Ecosystem, &'static str)],
) -> TargetDescriptor {
    TargetDescriptor {
        name,
        description,
        kind: TargetKind::MultiEcosystem(EcosystemUrl {
            prefix,
            infix,
            segments,
        }),
    }
}

const BUILTIN_TARGETS: &[TargetDescriptor] = &[
    // Repository
    repository("origin", "Open the remote origin URL", "origin"),
    repository("upstream", "Open the upstream remote URL", "upstream"),
    page("issues", "Open the issues page", Page::Issues),
    page("pulls", "Open the pull/merge requests page", Page::Pulls),
    page("actions", "Open the CI/CD page (Actions, Pipelines)", Page::Actions),
    page("wiki", "Open the wiki page", Page::Wiki),
    page("releases", "Open the releases page", Page::Releases),
    page("branches", "Open the branches page", Page::Branches),
    page("commits", "Open the commit history", Page::Commits),
    page("security", "Open the security page", Page::Security),
    page("discussions", "Open the discussions page", Page::Discussions),
    coverage("codecov", "Open the Codecov page", CoverageService::Codecov),
    coverage("coveralls", "Open the Coveralls page", CoverageService::Coveralls),
    // Python
    package(
        "pypi",
        "Open the PyPI page",
        Ecosystem::Pypi,
        PackageUrl::path("https://pypi.org/project/", "/"),
    ),
    package(
        "inspector",
        "Open the PyPI Inspector page",
        Ecosystem::Pypi,
        PackageUrl::path("https://inspector.pypi.io/project/", "/"),
    ),
    package(
        "pypi-json",
        "Open the PyPI JSON API",
        Ecosystem::Pypi,
        PackageUrl::path("https://pypi.org/pypi/", "/json"),
    ),
    package(
        "pepy",
        "Open the PePy download stats",
        Ecosystem::Pypi,
        PackageUrl::path("https://www.pepy.tech/projects/", ""),
    ),
    package(
        "pypistats",
        "Open the PyPI Stats page",
        Ecosystem::Pypi,
        PackageUrl::path("https://pypistats.org/packages/", ""),
    ),
    package(
        "piwheels",
        "Open the piwheels project page",
        Ecosystem::Pypi,
        PackageUrl::path("https://www.piwheels.org/project/", "/"),
    ),
    package(
        "piptrends",
        "Open the Pip Trends page",
        Ecosystem::Pypi,
        PackageUrl::path("https://piptrends.com/package/", ""),
    ),
    package(
        "clickpy",
        "Open the ClickPy stats (ClickHouse)",
        Ecosystem::Pypi,
        PackageUrl::path("https://clickpy.clickhouse.com/dashboard/", ""),
    ),
    package(
        "safety-db",
        "Open the Safety DB page",
        Ecosystem::Pypi,
        PackageUrl::path("https://data.safetycli.com/packages/pypi/", ""),
    ),
    // Multi-ecosystem
    multi(
        "snyk",
        "Open the Snyk security advisor",
        "https://snyk.io/advisor/",
        "/",
        SNYK_SEGMENTS,
    ),
    multi(
        "libraries-io",
        "Open the Libraries.io page",
        "https://libraries.io/",
        "/",
        IDENTITY_SEGMENTS,
    ),
    multi(
        "deps",
        "Open deps.dev (Google Open Source Insights)",
        "https://deps.dev/",
        "/",
        IDENTITY_SEGMENTS,
    ),
    multi(
        "ecosystems",
        "Open the ecosyste.ms page",
        "https://packages.ecosyste.ms/registries/",
        "/packages/",
        ECOSYSTEMS_SEGMENTS,
    ),
    // npm
    package(
        "npm",
        "Open the npm page",
        Ecosystem::Npm,
        PackageUrl::path("https://www.npmjs.com/package/", ""),
    ),
    package(
        "bundlephobia",
        "Open Bundlephobia (bundle size)",
        Ecosystem::Npm,
        PackageUrl::path("https://bundlephobia.com/package/", ""),
    ),
    package(
        "packagephobia",
        "Open Packagephobia (install size)",
        Ecosystem::Npm,
        PackageUrl::query("https://packagephobia.com/result?p="),
    ),
    package(
        "npm-stat",
        "Open npm-stat download charts",
        Ecosystem::Npm,
        PackageUrl::query("https://npm-stat.com/charts.html?package="),
    ),
    // Rust
    package(
        "crates",
        "Open the crates.io page",
        Ecosystem::Cargo,
        PackageUrl::path("https://crates.io/crates/", ""),
    ),
    package(
        "librs",
        "Open lib.rs (alternative crates browser)",
        Ecosystem::Cargo,
        PackageUrl::path("https://lib.rs/crates/", ""),
    ),
    // Other registries
    package(
        "gems",
        "Open the RubyGems page",
        Ecosystem::Gems,
        PackageUrl::path("https://rubygems.org/gems/", ""),
    ),
    package(
        "packagist",
        "Open the Packagist page (PHP)",
        Ecosystem::Packagist,
        PackageUrl::path("https://packagist.org/packages/", ""),
    ),
    package(
        "pub",
        "Open the pub.dev page (Dart/Flutter)",
        Ecosystem::Pub,
        PackageUrl::path("https://pub.dev/packages/", ""),
    ),
    package(
        "hex",
        "Open the hex.pm page (Elixir)",
        Ecosystem::Hex,
        PackageUrl::path("https://hex.pm/packages/", ""),
    ),
    package(
        "nuget",
        "Open the NuGet page (.NET)",
        Ecosystem::Nuget,
        PackageUrl::path("https://www.nuget.org/packages/", ""),
    ),
];

/// Immutable name → descriptor table. Iteration is in name byte order.
#[derive(Debug, Clone)]
pub struct Catalog {
    targets: BTreeMap<&'static str, TargetDescriptor>,
}

impl Catalog {
    pub fn builtin() -> Self {
        Self::from_descriptors(BUILTIN_TARGETS.iter().copied())
    }

    pub fn from_descriptors(descriptors: impl IntoIterator<Item = TargetDescriptor>) -> Self {
        let targets = descriptors
            .into_iter()
            .map(|descriptor| (descriptor.name, descriptor))
            .collect();
        Self { targets }
    }

    pub fn get(&self, name: &str) -> Option<&TargetDescriptor> {
        self.targets.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.targets.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = &TargetDescriptor> {
        self.targets.values()
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::builtin()
    }
}
