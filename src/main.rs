mod cli;
mod commands;
mod formatting;
mod settings;

use std::process::ExitCode;

use cli::Commands;
use commands::{run_get, run_images, run_simplify};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const DEFAULT_LOG_FILTER: &str = "dctx=info,dctx_lib=info";
const VERBOSE_LOG_FILTER: &str = "dctx=debug,dctx_lib=debug";

#[tokio::main]
async fn main() -> ExitCode {
    run().await
}

async fn run() -> ExitCode {
    let args = cli::parse();
    init_tracing(args.verbose);

    match args.command {
        Commands::Get { target, render } => run_get(args.config, target, render).await,
        Commands::Simplify {
            input,
            node_ids,
            render,
        } => run_simplify(args.config, input, node_ids, render),
        Commands::Images {
            target,
            dir,
            render,
        } => run_images(args.config, target, dir, render).await,
    }
}

/// Logs go to stderr so stdout stays machine-readable.
fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new(VERBOSE_LOG_FILTER)
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER))
    };

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .try_init();
}
