//! Expansion of download URL and strip-prefix templates.
//!
//! Sources in the manifest are written against the host platform, e.g.
//! `https://get.helm.sh/helm-{{ .Version }}-{{ .OS }}-{{ .Arch }}{{ .Ext }}`.
//! Each variable can be overridden per platform through the entry's
//! `overrides` maps, and the `trimV` filter turns `v1.2.3` into `1.2.3`.

use std::collections::HashMap;

use regex::Regex;
use serde::Deserialize;

use crate::error::{Error, Result};
use crate::platform::Platform;

/// Per-platform overrides for template variables. `os`, `arch` and `ext` are
/// keyed by the host OS or architecture identifier, `osArch` by the combined
/// `<os>-<arch>` pair.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Overrides {
    pub os: HashMap<String, String>,
    pub arch: HashMap<String, String>,
    #[serde(rename = "osArch")]
    pub os_arch: HashMap<String, String>,
    pub ext: HashMap<String, String>,
}

/// Renders `text` with the variables derived from `version`, the host
/// platform, and `overrides`. `context` names the template in errors,
/// e.g. `helm:url`.
pub fn expand(
    context: &str,
    text: &str,
    version: &str,
    platform: &Platform,
    overrides: &Overrides,
) -> Result<String> {
    let mut vars = HashMap::new();
    vars.insert("Version", version.to_string());
    vars.insert("OS", infer(&overrides.os, &platform.os, &platform.os));
    vars.insert("Arch", infer(&overrides.arch, &platform.arch, &platform.arch));
    vars.insert(
        "OSArch",
        infer(&overrides.os_arch, &platform.key(), &platform.key()),
    );
    // .tar.gz is by far the most common packaging, so it is the default.
    vars.insert("Ext", infer(&overrides.ext, &platform.os, ".tar.gz"));

    let token = Regex::new(r"\{\{\s*(?:(trimV)\s+)?\.([A-Za-z]+)\s*\}\}").unwrap();

    let mut unknown = None;
    let rendered = token.replace_all(text, |caps: &regex::Captures| match vars.get(&caps[2]) {
        Some(value) if caps.get(1).is_some() => trim_v(value).to_string(),
        Some(value) => value.clone(),
        None => {
            unknown = Some(caps[2].to_string());
            String::new()
        }
    });

    if let Some(name) = unknown {
        return Err(Error::EntryInvalid(format!(
            "{context}: unknown template variable .{name}"
        )));
    }
    Ok(rendered.into_owned())
}

fn trim_v(version: &str) -> &str {
    version.strip_prefix('v').unwrap_or(version)
}

fn infer(overrides: &HashMap<String, String>, key: &str, fallback: &str) -> String {
    overrides
        .get(key)
        .cloned()
        .unwrap_or_else(|| fallback.to_string())
}
