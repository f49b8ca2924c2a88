//! Installs a tool from an npm package into a versioned project directory;
//! the executables land under `node_modules/.bin`. The only strategy with a
//! runtime dependency: the manifest can name another entry (typically a
//! `node` archive) that must be installed first.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use tokio::process::Command;

use super::{check_installed, CiPolicy, InstallContext, Installable};
use crate::error::{Error, Result};

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct NpmBinaryOption {
    /// Name of the manifest entry providing the runtime, empty for none.
    pub runtime: String,
    pub ci: CiPolicy,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NpmBinary {
    pub(crate) name: String,
    pub(crate) version: String,
    pub(crate) versioned: String,
    pub(crate) source: String,
    pub(crate) runtime: Option<Box<Installable>>,
    pub(crate) option: NpmBinaryOption,
}

impl NpmBinary {
    pub(crate) async fn install(&self, cx: &InstallContext, dest: &Path) -> Result<PathBuf> {
        let project_dir = dest.join(&self.versioned);
        let installed = project_dir.join("node_modules").join(".bin");

        match check_installed(dest, &self.name, &self.versioned, self.option.ci, cx.ci) {
            Err(Error::AlreadyInstalled) => return Ok(installed),
            Err(err) => return Err(err),
            Ok(()) => {}
        }
        tracing::info!("installing {}", self.versioned);

        let target = format!("{}@{}", self.source, self.version);
        let status = Command::new("npm")
            .arg("install")
            .arg("--prefix")
            .arg(&project_dir)
            .arg(&target)
            .kill_on_drop(true)
            .status()
            .await?;
        if !status.success() {
            return Err(Error::CommandFailed {
                program: "npm".to_string(),
                code: status.code(),
                stderr: String::new(),
            });
        }
        Ok(installed)
    }

    pub(crate) fn runtime(&self) -> Option<&Installable> {
        self.runtime.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::Manifest;
    use std::fs;
    use tempfile::TempDir;

    #[tokio::test]
    async fn already_installed_returns_dot_bin_without_npm() {
        let yaml = r#"
tools:
  - name: protoc-gen-es
    version: v1.6.0
    source: "@bufbuild/protoc-gen-es"
    type: npm:binary
"#;
        let installables = Manifest::parse(yaml.as_bytes())
            .unwrap()
            .installables()
            .unwrap();
        let installer = installables.get("protoc-gen-es").unwrap();

        let dest = TempDir::new().unwrap();
        fs::create_dir(dest.path().join("protoc-gen-es@v1.6.0")).unwrap();

        let cx = InstallContext {
            ci: false,
            platform: crate::platform::Platform::host(),
            client: reqwest::Client::new(),
        };
        let installed = installer.install(&cx, dest.path()).await.unwrap();
        assert_eq!(
            installed,
            dest.path().join("protoc-gen-es@v1.6.0/node_modules/.bin")
        );
    }

    #[test]
    fn runtime_is_none_without_configuration() {
        let yaml = r#"
tools:
  - name: protoc-gen-es
    version: v1.6.0
    source: "@bufbuild/protoc-gen-es"
    type: npm:binary
"#;
        let installables = Manifest::parse(yaml.as_bytes())
            .unwrap()
            .installables()
            .unwrap();
        assert!(installables.get("protoc-gen-es").unwrap().runtime().is_none());
    }
}
