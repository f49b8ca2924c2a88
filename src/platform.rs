//! Host platform identification.
//!
//! Identifiers follow the convention release URLs and checksum maps use:
//! `linux`/`darwin`/`windows` for the OS and `amd64`/`arm64`/`arm` for the
//! architecture.

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Platform {
    pub os: String,
    pub arch: String,
}

impl Platform {
    pub fn host() -> Self {
        let os = match std::env::consts::OS {
            "macos" => "darwin".to_string(),
            other => other.to_string(),
        };

        let arch = match std::env::consts::ARCH {
            "x86_64" => "amd64".to_string(),
            "aarch64" => "arm64".to_string(),
            other => other.to_string(),
        };

        Platform { os, arch }
    }

    /// The `<os>-<arch>` pair used as the checksum map key and as the default
    /// `{{.OSArch}}` template value.
    pub fn key(&self) -> String {
        format!("{}-{}", self.os, self.arch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn host_is_normalized() {
        let platform = Platform::host();
        assert!(!platform.os.is_empty());
        assert!(!platform.arch.is_empty());
        assert_ne!(platform.os, "macos");
        assert_ne!(platform.arch, "x86_64");
        assert_ne!(platform.arch, "aarch64");
    }

    #[test]
    fn key_joins_os_and_arch() {
        let platform = Platform {
            os: "linux".to_string(),
            arch: "amd64".to_string(),
        };
        assert_eq!(platform.key(), "linux-amd64");
    }
}
