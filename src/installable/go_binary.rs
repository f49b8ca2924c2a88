//! Installs a tool with `go install`, pointing `GOBIN` at the versioned
//! directory so the built binary lands there.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use tokio::process::Command;

use super::{check_installed, CiPolicy, InstallContext};
use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct GoBinaryOption {
    pub ci: CiPolicy,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GoBinary {
    pub(crate) name: String,
    pub(crate) version: String,
    pub(crate) versioned: String,
    pub(crate) source: String,
    pub(crate) option: GoBinaryOption,
}

impl GoBinary {
    pub(crate) async fn install(&self, cx: &InstallContext, dest: &Path) -> Result<PathBuf> {
        let installed = dest.join(&self.versioned);
        match check_installed(dest, &self.name, &self.versioned, self.option.ci, cx.ci) {
            Err(Error::AlreadyInstalled) => return Ok(installed),
            Err(err) => return Err(err),
            Ok(()) => {}
        }
        tracing::info!("installing {}", self.versioned);

        let target = format!("{}@{}", self.source, self.version);
        let status = Command::new("go")
            .args(["install", &target])
            .env("GOBIN", &installed)
            .kill_on_drop(true)
            .status()
            .await?;
        if !status.success() {
            return Err(Error::CommandFailed {
                program: "go".to_string(),
                code: status.code(),
                stderr: String::new(),
            });
        }
        Ok(installed)
    }
}
