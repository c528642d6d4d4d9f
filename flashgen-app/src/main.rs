use anyhow::Result;
use clap::Parser; // needed for Cli::parse()
use tokio::runtime::Runtime;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use flashgen_app::cli::commands::{run_cli, run_review};
use flashgen_app::cli::opts::{Cli, Command};

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let args = Cli::parse();

    match &args.cmd {
        // TUI owns the terminal; no subscriber writing over it
        Command::Review(cmd) => run_review(&args, cmd),
        _ => {
            tracing_subscriber::registry()
                .with(
                    tracing_subscriber::EnvFilter::try_from_default_env()
                        .unwrap_or_else(|_| "flashgen=info,tower_http=info".into()),
                )
                .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
                .init();

            let rt = Runtime::new()?;
            rt.block_on(run_cli(args))
        }
    }
}
