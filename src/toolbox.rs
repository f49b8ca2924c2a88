//! The facade owning the output directory and the registry.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use tokio::process::Command;

use crate::error::{Error, Result};
use crate::installable::{InstallContext, Installables};
use crate::manifest::Manifest;
use crate::util::dedupe;

/// Manifest file looked up in the working directory by [`Toolbox::load`].
pub const MANIFEST_FILE: &str = ".toolbox.yaml";

/// Holds everything the manifest declared: the output directory, the entry
/// names in manifest order, and the resolved registry.
pub struct Toolbox {
    dir: PathBuf,
    names: Vec<String>,
    installables: Installables,
    cx: InstallContext,
}

/// Options for running a tool: extra tools to install onto the composed
/// `PATH` first, and extra environment variables for the subprocess.
#[derive(Debug, Clone, Default)]
pub struct RunWithOption {
    pub deps: Vec<String>,
    pub env: HashMap<String, String>,
}

impl Toolbox {
    /// Loads `.toolbox.yaml` from the working directory, installing into
    /// `dir`.
    pub fn load(dir: impl AsRef<Path>) -> Result<Toolbox> {
        Self::load_from_file(dir, MANIFEST_FILE)
    }

    pub fn load_from_file(dir: impl AsRef<Path>, file: impl AsRef<Path>) -> Result<Toolbox> {
        let data = fs::read(file)?;
        Self::load_from_data(dir, &data)
    }

    pub fn load_from_data(dir: impl AsRef<Path>, data: &[u8]) -> Result<Toolbox> {
        let manifest = Manifest::parse(data)?;
        let installables = manifest.installables()?;

        let dir = dir.as_ref();
        let dir = if dir.is_absolute() {
            dir.to_path_buf()
        } else {
            std::env::current_dir()?.join(dir)
        };
        fs::create_dir_all(&dir)?;

        Ok(Toolbox {
            dir,
            names: manifest.names(),
            installables,
            cx: InstallContext::detect(),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Manifest entry names, in manifest order.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn installables(&self) -> &Installables {
        &self.installables
    }

    /// Installs each name in order and returns the colon-joined,
    /// de-duplicated executable paths. The first failing installer aborts
    /// the call; its partially-created versioned directory is best-effort
    /// removed, and the error carries the paths collected so far.
    pub async fn install<S: AsRef<str>>(&self, names: &[S]) -> Result<String> {
        let mut paths: Vec<String> = Vec::new();
        for name in names {
            let name = name.as_ref();
            let info = self
                .installables
                .resolve_info(name)
                .map_err(|err| Error::Install {
                    paths: paths.join(":"),
                    source: Box::new(err),
                })?;

            for installer in &info.installers {
                match installer.install(&self.cx, &self.dir).await {
                    Ok(path) => paths.push(path.to_string_lossy().into_owned()),
                    Err(err) => {
                        if let Some(base) = installed_base_dir(&self.dir.join(installer.versioned()))
                        {
                            // Cleanup failures are swallowed so the install
                            // error stays the reported cause.
                            let _ = fs::remove_dir_all(base);
                        }
                        return Err(Error::Install {
                            paths: paths.join(":"),
                            source: Box::new(err),
                        });
                    }
                }
            }
        }
        Ok(dedupe(&paths).join(":"))
    }

    /// Installs every manifest-registered tool.
    pub async fn install_all(&self) -> Result<()> {
        self.install(&self.names).await?;
        Ok(())
    }

    /// Installs `name` (and its chain) if needed, then executes it with
    /// inherited stdio.
    pub async fn run<S: AsRef<str>>(&self, name: &str, args: &[S]) -> Result<()> {
        self.run_with(RunWithOption::default(), name, args).await
    }

    pub async fn run_with<S: AsRef<str>>(
        &self,
        opt: RunWithOption,
        name: &str,
        args: &[S],
    ) -> Result<()> {
        let (binary, path) = self.prepare(name, &opt.deps).await?;
        tracing::debug!("running {} with PATH={}", binary, path);

        let status = Command::new(&binary)
            .args(args.iter().map(AsRef::as_ref))
            .env("PATH", &path)
            .envs(&opt.env)
            .kill_on_drop(true)
            .status()
            .await?;
        if !status.success() {
            return Err(Error::CommandFailed {
                program: binary,
                code: status.code(),
                stderr: String::new(),
            });
        }
        Ok(())
    }

    /// Like [`Toolbox::run`], but captures and returns trimmed stdout.
    pub async fn output<S: AsRef<str>>(&self, name: &str, args: &[S]) -> Result<String> {
        self.output_with(RunWithOption::default(), name, args).await
    }

    pub async fn output_with<S: AsRef<str>>(
        &self,
        opt: RunWithOption,
        name: &str,
        args: &[S],
    ) -> Result<String> {
        let (binary, path) = self.prepare(name, &opt.deps).await?;

        let output = Command::new(&binary)
            .args(args.iter().map(AsRef::as_ref))
            .env("PATH", &path)
            .envs(&opt.env)
            .kill_on_drop(true)
            .output()
            .await?;
        if !output.status.success() {
            return Err(Error::CommandFailed {
                program: binary,
                code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            });
        }
        Ok(String::from_utf8_lossy(&output.stdout).trim_end().to_string())
    }

    /// Installs `deps` plus `name` and composes the execution `PATH`:
    /// installer output directories first, then the current `PATH`.
    async fn prepare(&self, name: &str, deps: &[String]) -> Result<(String, String)> {
        let mut targets: Vec<String> = deps.to_vec();
        targets.push(name.to_string());
        let installed = self.install(&targets).await?;

        let info = self.installables.resolve_info(name)?;
        let path = match std::env::var("PATH") {
            Ok(current) if !current.is_empty() => format!("{installed}:{current}"),
            _ => installed,
        };
        Ok((info.binary, path))
    }
}

/// Walks up from an installer output path to the versioned directory it
/// lives in, identified by an `@v` marker in the final path segment.
/// `.../tool@v1/bin` and `.../tool@v1/node_modules/.bin` both map to
/// `.../tool@v1`; paths with no `@v` segment map to nothing.
fn installed_base_dir(installed: &Path) -> Option<PathBuf> {
    if !installed.to_string_lossy().contains("@v") {
        return None;
    }
    let file_name = installed.file_name()?.to_string_lossy().into_owned();
    if file_name.contains("@v") {
        return Some(installed.to_path_buf());
    }
    installed_base_dir(installed.parent()?)
}
