use std::path::PathBuf;
use std::process::{Command, Output};
use tempfile::TempDir;

/// An isolated workspace with its own manifest and output directory; every
/// command runs the toolbox binary against it.
#[allow(dead_code)]
pub struct TestContext {
    pub temp_dir: TempDir,
    pub manifest_path: PathBuf,
    pub tools_dir: PathBuf,
    pub bin_path: PathBuf,
}

#[allow(dead_code)]
impl TestContext {
    pub fn new(manifest: &str) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let manifest_path = temp_dir.path().join(".toolbox.yaml");
        std::fs::write(&manifest_path, manifest).expect("Failed to write manifest");
        let tools_dir = temp_dir.path().join("toolbox");

        let bin_path = PathBuf::from(env!("CARGO_BIN_EXE_toolbox"));

        Self {
            temp_dir,
            manifest_path,
            tools_dir,
            bin_path,
        }
    }

    pub fn cmd(&self) -> Command {
        let mut cmd = Command::new(&self.bin_path);
        cmd.current_dir(self.temp_dir.path());
        cmd.arg("--manifest").arg(&self.manifest_path);
        cmd.arg("--dir").arg(&self.tools_dir);
        // Keep the host's CI signal from flipping install behavior.
        cmd.env_remove("CI");
        cmd
    }

    /// Pre-creates a versioned install so commands stay offline.
    pub fn preinstall(&self, versioned: &str) -> PathBuf {
        let bin_dir = self.tools_dir.join(versioned).join("bin");
        std::fs::create_dir_all(&bin_dir).expect("Failed to create install dir");
        bin_dir
    }
}

#[allow(dead_code)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
    pub status: std::process::ExitStatus,
}

impl From<Output> for CommandOutput {
    fn from(output: Output) -> Self {
        Self {
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            status: output.status,
        }
    }
}

#[allow(dead_code)]
impl CommandOutput {
    pub fn assert_success(&self) -> &Self {
        if !self.status.success() {
            panic!(
                "Command failed with status {:?}\nstdout: {}\nstderr: {}",
                self.status.code(),
                self.stdout,
                self.stderr
            );
        }
        self
    }

    pub fn assert_failure(&self) -> &Self {
        assert!(
            !self.status.success(),
            "Command unexpectedly succeeded\nstdout: {}\nstderr: {}",
            self.stdout,
            self.stderr
        );
        self
    }

    pub fn assert_stdout_contains(&self, text: &str) -> &Self {
        assert!(
            self.stdout.contains(text),
            "Stdout did not contain '{}'\nActual stdout: {}",
            text,
            self.stdout
        );
        self
    }

    pub fn assert_stderr_contains(&self, text: &str) -> &Self {
        assert!(
            self.stderr.contains(text),
            "Stderr did not contain '{}'\nActual stderr: {}",
            text,
            self.stderr
        );
        self
    }
}
