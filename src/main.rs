mod cli;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands};
use toolbox::{Error, Toolbox};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    setup_logging(&cli)?;

    let toolbox = Toolbox::load_from_file(&cli.dir, &cli.manifest)?;

    match cli.command {
        Commands::Install { names } => {
            if names.is_empty() {
                toolbox.install_all().await?;
            } else {
                toolbox.install(&names).await?;
            }
        }

        Commands::Run { name, args } => {
            if let Err(err) = toolbox.run(&name, &args).await {
                // The tool already wrote its own diagnostics to the
                // inherited stderr; just forward its exit code.
                if let Error::CommandFailed {
                    code: Some(code), ..
                } = err
                {
                    std::process::exit(code);
                }
                return Err(err.into());
            }
        }

        Commands::List => {
            list_tools(&toolbox);
        }
    }

    Ok(())
}

fn setup_logging(cli: &Cli) -> Result<()> {
    use tracing_subscriber::{fmt, EnvFilter};

    let level = if cli.quiet {
        "error"
    } else if cli.verbose == 0 {
        "warn"
    } else if cli.verbose == 1 {
        "info"
    } else {
        "debug"
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_thread_names(false)
        .init();

    Ok(())
}

fn list_tools(toolbox: &Toolbox) {
    if toolbox.names().is_empty() {
        println!("No tools in manifest.");
        return;
    }

    for name in toolbox.names() {
        if let Some(installable) = toolbox.installables().get(name) {
            println!("  - {} [{}]", installable.versioned(), installable.kind());
        }
    }
}
