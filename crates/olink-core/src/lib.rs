//! Project link resolution: from a working directory to the URLs of its
//! hosting, registry and analytics pages.
//!
//! - `remote`: git remote URL parsing and platform inference.
//! - `git`: `.git/config` reader (worktrees and submodules included).
//! - `ecosystem`: manifest detection and package-name extraction.
//! - `platform`: per-platform repository page paths.
//! - `target` / `catalog`: target descriptors and the builtin table.
//! - `resolve`: the `resolve` / `list_all` / `list_available` facade.

pub mod catalog;
pub mod ecosystem;
pub mod error;
pub mod git;
pub mod platform;
pub mod remote;
pub mod resolve;
pub mod target;

pub use catalog::Catalog;
pub use ecosystem::{Ecosystem, EcosystemDescriptor, EcosystemRegistry, ManifestPattern};
pub use error::{MetadataError, OlinkError};
pub use git::{GitConfig, read_remote_url};
pub use platform::{Page, Platform, page_path, page_path_by_name};
pub use remote::{ParsedRemote, parse_remote_url};
pub use resolve::{AvailableTarget, Resolver, split_target_name};
pub use target::{TargetDescriptor, TargetKind};
