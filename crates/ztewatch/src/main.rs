mod cli;
mod commands;
mod config;
mod error;
mod output;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Command};
use crate::error::CliError;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    init_tracing(cli.global.verbose);

    if let Err(err) = run(&cli).await {
        let code = err.exit_code();
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(code);
    }
}

fn init_tracing(verbosity: u8) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    // stderr keeps stdout clean for JSON/YAML output.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: &Cli) -> Result<(), CliError> {
    match &cli.command {
        // Config commands don't need a router
        Command::Config(args) => commands::config_cmd::handle(args, &cli.global),

        Command::Completions(args) => {
            use clap::CommandFactory;
            use clap_complete::generate;

            let mut cmd = Cli::command();
            generate(args.shell, &mut cmd, "ztewatch", &mut std::io::stdout());
            Ok(())
        }

        Command::Poll(args) => {
            let router = router_config(&cli.global)?;
            commands::poll::handle(args, &router, &cli.global).await
        }

        Command::Watch(args) => {
            let router = router_config(&cli.global)?;
            commands::watch::handle(args, &router, &cli.global).await
        }
    }
}

/// Build a `RouterConfig` from the config file, profile, and CLI overrides.
fn router_config(global: &cli::GlobalOpts) -> Result<ztewatch_core::RouterConfig, CliError> {
    let path = config::config_path(global);
    let cfg = config::load_config(&path)?;
    config::resolve(global, &cfg)
}
