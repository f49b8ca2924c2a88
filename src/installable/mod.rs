//! Install strategies and the name-indexed registry.
//!
//! An [`Installable`] is a fully resolved installation strategy for one
//! manifest entry. The variant set is closed: tools are provisioned by
//! building from a Go module, downloading an archive, downloading a raw
//! binary, or installing an npm package.

mod go_binary;
mod http_archive;
mod http_binary;
mod npm_binary;

pub use go_binary::{GoBinary, GoBinaryOption};
pub use http_archive::{HttpArchive, HttpArchiveOption};
pub use http_binary::{HttpBinary, HttpBinaryOption};
pub use npm_binary::{NpmBinary, NpmBinaryOption};

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{Error, Result};
use crate::platform::Platform;

/// Environment every install runs against: whether a CI system is driving
/// the process, the host platform, and the shared HTTP client. Threaded
/// explicitly instead of read from globals so tests and embedders can pin it.
#[derive(Debug, Clone)]
pub struct InstallContext {
    pub ci: bool,
    pub platform: Platform,
    pub client: reqwest::Client,
}

impl InstallContext {
    /// Detects the host platform and the `CI=true` environment signal.
    pub fn detect() -> Self {
        InstallContext {
            ci: std::env::var("CI").map(|v| v == "true").unwrap_or(false),
            platform: Platform::host(),
            client: reqwest::Client::new(),
        }
    }
}

/// How the already-installed check behaves on CI. `skip` lets pipelines that
/// restore a warm cache bypass the directory scan entirely.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CiPolicy {
    #[default]
    Check,
    Skip,
}

/// A resolved installation strategy for one tool.
#[derive(Debug, Clone, PartialEq)]
pub enum Installable {
    GoBinary(GoBinary),
    HttpArchive(HttpArchive),
    HttpBinary(HttpBinary),
    NpmBinary(NpmBinary),
}

impl Installable {
    /// Materializes the tool under `dest` and returns the directory holding
    /// its executables. Installing an already-present version is a no-op
    /// that returns the same path.
    pub async fn install(&self, cx: &InstallContext, dest: &Path) -> Result<PathBuf> {
        match self {
            Installable::GoBinary(i) => i.install(cx, dest).await,
            Installable::HttpArchive(i) => i.install(cx, dest).await,
            Installable::HttpBinary(i) => i.install(cx, dest).await,
            Installable::NpmBinary(i) => i.install(cx, dest).await,
        }
    }

    /// The installable that must be installed before this one, if any.
    pub fn runtime(&self) -> Option<&Installable> {
        match self {
            Installable::NpmBinary(i) => i.runtime(),
            _ => None,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Installable::GoBinary(i) => &i.name,
            Installable::HttpArchive(i) => &i.name,
            Installable::HttpBinary(i) => &i.name,
            Installable::NpmBinary(i) => &i.name,
        }
    }

    /// The `name@version` string doubling as directory name and
    /// installed-state marker.
    pub fn versioned(&self) -> &str {
        match self {
            Installable::GoBinary(i) => &i.versioned,
            Installable::HttpArchive(i) => &i.versioned,
            Installable::HttpBinary(i) => &i.versioned,
            Installable::NpmBinary(i) => &i.versioned,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Installable::GoBinary(_) => "go:binary",
            Installable::HttpArchive(_) => "http:archive",
            Installable::HttpBinary(_) => "http:binary",
            Installable::NpmBinary(_) => "npm:binary",
        }
    }
}

/// Name-indexed collection of resolved strategies. Built once at load time,
/// read-only afterwards.
#[derive(Debug, Default)]
pub struct Installables(HashMap<String, Installable>);

impl Installables {
    pub(crate) fn insert(&mut self, name: String, installable: Installable) -> Result<()> {
        if self.0.insert(name.clone(), installable).is_some() {
            return Err(Error::EntryInvalid(format!("duplicate entry name: {name}")));
        }
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&Installable> {
        self.0.get(name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Resolves a possibly-qualified tool reference into the ordered chain
    /// of installers to run and the binary name to invoke. `key:binary`
    /// picks a differently-named executable out of a registered tool, e.g.
    /// `buf:protoc-gen-buf` for an archive bundling several binaries.
    pub fn resolve_info(&self, name: &str) -> Result<Info<'_>> {
        let (key, binary) = match name.split_once(':') {
            None => (name, name),
            Some((key, binary)) => {
                if key.is_empty() || binary.is_empty() || binary.contains(':') {
                    return Err(Error::EntryInvalid(format!("name: {name}")));
                }
                (key, binary)
            }
        };

        let installer = self
            .0
            .get(key)
            .ok_or_else(|| Error::EntryNotFound(name.to_string()))?;

        let mut installers = Vec::new();
        if let Some(runtime) = installer.runtime() {
            installers.push(runtime);
        }
        installers.push(installer);

        Ok(Info {
            key: key.to_string(),
            binary: binary.to_string(),
            installers,
        })
    }
}

/// Resolution result for one tool reference: the registry key, the binary
/// to execute, and the installers to run in order (runtime first).
#[derive(Debug)]
pub struct Info<'a> {
    pub key: String,
    pub binary: String,
    pub installers: Vec<&'a Installable>,
}

/// The idempotence and staleness gate run before any network or build work.
///
/// States of `dir` with respect to one tool: absent, stale-version-present,
/// current-version-present. A child named exactly `current` reports the
/// already-installed sentinel; a stale `prefix@...` directory is removed so
/// the caller installs fresh; otherwise the caller installs fresh.
pub(crate) fn check_installed(
    dir: &Path,
    prefix: &str,
    current: &str,
    policy: CiPolicy,
    on_ci: bool,
) -> Result<()> {
    if policy == CiPolicy::Skip && on_ci {
        return Err(Error::AlreadyInstalled);
    }

    let stale_prefix = format!("{prefix}@");
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let file_name = entry.file_name();
        let name = file_name.to_string_lossy();

        if name == current {
            return Err(Error::AlreadyInstalled);
        }

        if entry.file_type()?.is_dir() && name.starts_with(&stale_prefix) {
            // Only one installed version of a tool is kept at a time.
            tracing::debug!("removing stale install {}", name);
            fs::remove_dir_all(entry.path())?;
            return Ok(());
        }
    }
    Ok(())
}
