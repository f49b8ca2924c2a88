use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "toolbox")]
#[command(about = "Declarative tool provisioning for build scripts")]
#[command(version, propagate_version = true)]
pub struct Cli {
    /// Increase verbosity (use multiple times for more detail)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Reduce output to errors only
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Manifest file listing the tools to provision
    #[arg(long, default_value = toolbox::MANIFEST_FILE, global = true)]
    pub manifest: String,

    /// Directory tools are installed into
    #[arg(long, default_value = "toolbox", global = true)]
    pub dir: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Install the named tools, or every manifest tool when none are given
    Install {
        /// Tool names, optionally qualified as 'key:binary'
        names: Vec<String>,
    },

    /// Install a tool (and its runtime) if needed, then run it
    #[command(
        allow_hyphen_values = true,
        disable_help_flag = true,
        disable_version_flag = true,
        after_help = "Examples:\n  toolbox run buf lint\n  toolbox run buf:protoc-gen-buf --version\n\nTo see help for this command, use 'toolbox help run'."
    )]
    Run {
        /// Tool name, optionally qualified as 'key:binary'
        name: String,
        /// Arguments passed through to the tool
        #[arg(trailing_var_arg = true)]
        args: Vec<String>,
    },

    /// List the tools the manifest provides
    List,
}
