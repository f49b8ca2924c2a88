//! Declarative tool provisioning for build scripts.
//!
//! A `.toolbox.yaml` manifest names the external tools a repository needs
//! (compilers, linters, codegen binaries). Each entry resolves to one of
//! four install strategies, is fetched or built exactly once into
//! `<dir>/<name>@<version>/`, and the composed executable paths are handed
//! back as a `PATH` fragment so callers can invoke tools by name.
//!
//! ```no_run
//! # async fn demo() -> toolbox::Result<()> {
//! let toolbox = toolbox::Toolbox::load("toolbox")?;
//! toolbox.install_all().await?;
//! toolbox.run("buf", &["lint"]).await?;
//! # Ok(())
//! # }
//! ```

mod digest;
mod download;
mod extract;
mod template;
mod util;

pub mod error;
pub mod installable;
pub mod manifest;
pub mod platform;
pub mod toolbox;

pub use error::{Error, Result};
pub use installable::{
    CiPolicy, GoBinary, GoBinaryOption, HttpArchive, HttpArchiveOption, HttpBinary,
    HttpBinaryOption, Info, InstallContext, Installable, Installables, NpmBinary, NpmBinaryOption,
};
pub use manifest::{Entry, Manifest};
pub use platform::Platform;
pub use template::Overrides;
pub use toolbox::{RunWithOption, Toolbox, MANIFEST_FILE};
