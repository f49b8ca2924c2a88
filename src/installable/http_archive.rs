//! Installs a tool from a downloaded archive: expand the URL template,
//! verify the digest, extract with the configured prefix stripped, and
//! normalize the tree to a `bin/` layout.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use super::{check_installed, CiPolicy, InstallContext};
use crate::error::{Error, Result};
use crate::template::{self, Overrides};
use crate::{digest, download, extract};

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct HttpArchiveOption {
    /// Template-expanded path prefix removed from every archive entry, e.g.
    /// `node-{{.Version}}-{{.OS}}-{{.Arch}}/` for archives nesting their
    /// content under a release directory.
    #[serde(rename = "stripPrefix")]
    pub strip_prefix: String,
    pub overrides: Overrides,
    /// `<algorithm>:<hex>` digests keyed by `<os>-<arch>`.
    pub shas: HashMap<String, String>,
    pub ci: CiPolicy,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HttpArchive {
    pub(crate) name: String,
    pub(crate) version: String,
    pub(crate) versioned: String,
    pub(crate) source: String,
    pub(crate) option: HttpArchiveOption,
}

impl HttpArchive {
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

        let prefix = template::expand(
            &format!("{}:stripPrefix", self.name),
            &self.option.strip_prefix,
            &self.version,
            &cx.platform,
            &self.option.overrides,
        )?;
        extract::extract_archive(&self.name, &data, &versioned_dir, &prefix)?;
        extract::ensure_bin_dir(&versioned_dir)?;

        Ok(installed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::Manifest;
    use std::fs;
    use tempfile::TempDir;

    #[tokio::test]
    async fn already_installed_returns_bin_dir_without_network() {
        let yaml = r#"
tools:
  - name: helm
    version: v3.12.3
    source: https://get.helm.sh/helm-{{.Version}}-{{.OS}}-{{.Arch}}{{.Ext}}
    type: http:archive
    option:
      stripPrefix: "{{.OS}}-{{.Arch}}/"
"#;
        let installables = Manifest::parse(yaml.as_bytes())
            .unwrap()
            .installables()
            .unwrap();
        let installer = installables.get("helm").unwrap();

        let dest = TempDir::new().unwrap();
        fs::create_dir_all(dest.path().join("helm@v3.12.3/bin")).unwrap();

        let cx = InstallContext {
            ci: false,
            platform: crate::platform::Platform::host(),
            client: reqwest::Client::new(),
        };
        let installed = installer.install(&cx, dest.path()).await.unwrap();
        assert_eq!(installed, dest.path().join("helm@v3.12.3/bin"));
    }
}
