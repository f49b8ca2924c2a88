use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// Unknown entry type, malformed option, bad template variable, or a
    /// digest map that does not cover the host platform.
    #[error("invalid entry: {0}")]
    EntryInvalid(String),

    /// A tool name (or npm runtime reference) that no manifest entry provides.
    #[error("entry not found: {0}")]
    EntryNotFound(String),

    /// Sentinel returned by the already-installed check. Every strategy
    /// converts this into a successful no-op; it never reaches callers.
    #[error("already installed")]
    AlreadyInstalled,

    #[error("checksum mismatch for {name}: computed {computed}, expected {expected}")]
    ChecksumMismatch {
        name: String,
        computed: String,
        expected: String,
    },

    #[error("unexpected status code while reading {url}: {status}")]
    HttpStatus { url: String, status: u16 },

    #[error(
        "{program} exited with {}{}",
        code.map_or_else(|| "signal".to_string(), |c| format!("code {c}")),
        if stderr.is_empty() { String::new() } else { format!(": {stderr}") }
    )]
    CommandFailed {
        program: String,
        code: Option<i32>,
        stderr: String,
    },

    /// Install aborted partway through a chain; `paths` holds the
    /// colon-joined installer outputs collected before the failure.
    #[error("{source}")]
    Install {
        paths: String,
        #[source]
        source: Box<Error>,
    },

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Zip(#[from] zip::result::ZipError),

    #[error("unsupported archive format for {0}")]
    UnsupportedArchive(String),
}
