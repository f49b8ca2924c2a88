//! Manifest parsing and entry resolution.
//!
//! A manifest is a YAML document with a top-level `tools:` list. Each entry
//! carries a `type` discriminator and a strategy-shaped `option` block; the
//! resolver decodes the discriminator first and then binds the option block
//! directly to the matching strategy's typed options.

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_yaml::Value;

use crate::error::{Error, Result};
use crate::installable::{
    GoBinary, GoBinaryOption, HttpArchive, HttpArchiveOption, HttpBinary, HttpBinaryOption,
    Installable, Installables, NpmBinary, NpmBinaryOption,
};

pub const GO_BINARY: &str = "go:binary";
pub const HTTP_ARCHIVE: &str = "http:archive";
pub const HTTP_BINARY: &str = "http:binary";
pub const NPM_BINARY: &str = "npm:binary";

/// One raw manifest record. Consumed by [`Entry::resolve`]; its data lives
/// on in the resolved strategy.
#[derive(Debug, Clone, Deserialize)]
pub struct Entry {
    pub name: String,
    pub version: String,
    #[serde(default)]
    pub source: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub option: Value,
}

impl Entry {
    /// The `name@version` key used as directory name and installed-state
    /// marker.
    pub fn versioned(&self) -> String {
        format!("{}@{}", self.name, self.version)
    }

    /// Resolves this entry into the strategy its `type` names. `all` is
    /// consulted to resolve an npm entry's runtime reference; passing `None`
    /// keeps the resolution to one level, so a runtime's own runtime is
    /// never followed.
    pub fn resolve(&self, all: Option<&Manifest>) -> Result<Installable> {
        match self.kind.as_str() {
            GO_BINARY => {
                let option: GoBinaryOption = typed_option(&self.option)?;
                Ok(Installable::GoBinary(GoBinary {
                    name: self.name.clone(),
                    version: self.version.clone(),
                    versioned: self.versioned(),
                    source: self.source.clone(),
                    option,
                }))
            }
            HTTP_ARCHIVE => {
                let option: HttpArchiveOption = typed_option(&self.option)?;
                Ok(Installable::HttpArchive(HttpArchive {
                    name: self.name.clone(),
                    version: self.version.clone(),
                    versioned: self.versioned(),
                    source: self.source.clone(),
                    option,
                }))
            }
            HTTP_BINARY => {
                let option: HttpBinaryOption = typed_option(&self.option)?;
                Ok(Installable::HttpBinary(HttpBinary {
                    name: self.name.clone(),
                    version: self.version.clone(),
                    versioned: self.versioned(),
                    source: self.source.clone(),
                    option,
                }))
            }
            NPM_BINARY => {
                let option: NpmBinaryOption = typed_option(&self.option)?;
                let runtime = match all {
                    Some(all) if !option.runtime.is_empty() => {
                        Some(Box::new(all.resolve(&option.runtime)?))
                    }
                    _ => None,
                };
                Ok(Installable::NpmBinary(NpmBinary {
                    name: self.name.clone(),
                    version: self.version.clone(),
                    versioned: self.versioned(),
                    source: self.source.clone(),
                    runtime,
                    option,
                }))
            }
            other => Err(Error::EntryInvalid(format!(
                "{}: unknown type {other}",
                self.name
            ))),
        }
    }
}

/// The decoded manifest: the flat list of tool entries.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Manifest {
    #[serde(default)]
    pub tools: Vec<Entry>,
}

impl Manifest {
    pub fn parse(data: &[u8]) -> Result<Manifest> {
        Ok(serde_yaml::from_slice(data)?)
    }

    /// Resolves the entry named `name`; used for runtime references.
    /// The resolved installable does not follow further runtime references.
    pub fn resolve(&self, name: &str) -> Result<Installable> {
        self.tools
            .iter()
            .find(|entry| entry.name == name)
            .ok_or_else(|| Error::EntryNotFound(name.to_string()))?
            .resolve(None)
    }

    /// Resolves every entry into the registry. Duplicate names are a hard
    /// error: two entries claiming one name would silently shadow each
    /// other at lookup time.
    pub fn installables(&self) -> Result<Installables> {
        let mut installables = Installables::default();
        for entry in &self.tools {
            let resolved = entry.resolve(Some(self))?;
            installables.insert(entry.name.clone(), resolved)?;
        }
        Ok(installables)
    }

    /// Entry names in manifest order.
    pub fn names(&self) -> Vec<String> {
        self.tools.iter().map(|entry| entry.name.clone()).collect()
    }
}

fn typed_option<T: DeserializeOwned + Default>(value: &Value) -> Result<T> {
    if value.is_null() {
        return Ok(T::default());
    }
    Ok(serde_yaml::from_value(value.clone())?)
}
