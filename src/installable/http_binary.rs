//! Installs a tool whose download is the executable itself: same templating
//! and digest flow as archives, but the payload is written straight to
//! `bin/<name>` with no extraction.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use super::{check_installed, CiPolicy, InstallContext};
use crate::error::{Error, Result};
use crate::template::{self, Overrides};
use crate::{digest, download};

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct HttpBinaryOption {
    pub overrides: Overrides,
    /// `<algorithm>:<hex>` digests keyed by `<os>-<arch>`.
    pub shas: HashMap<String, String>,
    pub ci: CiPolicy,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HttpBinary {
    pub(crate) name: String,
    pub(crate) version: String,
    pub(crate) versioned: String,
    pub(crate) source: String,
    pub(crate) option: HttpBinaryOption,
}

impl HttpBinary {
    pub(crate) async fn install(&self, cx: &InstallContext, dest: &Path) -> Result<PathBuf> {
        let versioned_dir = dest.join(&self.versioned);
        let installed = versioned_dir.join("bin");

        match check_installed(dest, &self.name, &self.versioned, self.option.ci, cx.ci) {
            Err(Error::AlreadyInstalled) => return Ok(installed),
            Err(err) => return Err(err),
            Ok(()) => {}
        }
        tracing::info!("installing {}", self.versioned);

        let url = template::expand(
            &format!("{}:url", self.name),
            &self.source,
            &self.version,
            &cx.platform,
            &self.option.overrides,
        )?;
        let data = download::fetch(&cx.client, &url, &self.versioned, cx.ci).await?;
        digest::verify(&self.name, &data, &self.option.shas, &cx.platform)?;

        fs::create_dir_all(&installed)?;
        let binary = installed.join(&self.name);
        fs::write(&binary, &data)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&binary, fs::Permissions::from_mode(0o755))?;
        }

        Ok(installed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::Manifest;
    use tempfile::TempDir;

    #[tokio::test]
    async fn already_installed_returns_bin_dir_without_network() {
        let yaml = r#"
tools:
  - name: kubectl
    version: v1.28.4
    source: https://dl.k8s.io/release/{{.Version}}/bin/{{.OS}}/{{.Arch}}/kubectl
    type: http:binary
"#;
        let installables = Manifest::parse(yaml.as_bytes())
            .unwrap()
            .installables()
            .unwrap();
        let installer = installables.get("kubectl").unwrap();

        let dest = TempDir::new().unwrap();
        fs::create_dir_all(dest.path().join("kubectl@v1.28.4/bin")).unwrap();

        let cx = InstallContext {
            ci: false,
            platform: crate::platform::Platform::host(),
            client: reqwest::Client::new(),
        };
        let installed = installer.install(&cx, dest.path()).await.unwrap();
        assert_eq!(installed, dest.path().join("kubectl@v1.28.4/bin"));
    }
}
