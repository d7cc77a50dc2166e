//! savecache CLI entry point.

use clap::Parser;
use savecache::cli::{Cli, CliError, EXIT_FAILURE, EXIT_OK, render_error};
use savecache::config::Config;
use savecache::step;
use savecache_keytemplate::BuildContext;
use tracing_subscriber::EnvFilter;

fn main() {
    std::process::exit(run());
}

fn run() -> i32 {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = match Config::from_cli(cli) {
        Ok(config) => config,
        Err(err) => {
            render_error(&err);
            return EXIT_FAILURE;
        }
    };
    config.log_summary();

    let rt = match tokio::runtime::Builder::new_multi_thread().enable_all().build() {
        Ok(rt) => rt,
        Err(e) => {
            render_error(&CliError::save(format!(
                "failed to create async runtime: {e}"
            )));
            return EXIT_FAILURE;
        }
    };

    // The build context is sampled once; the key is never re-evaluated
    // mid-run.
    let ctx = BuildContext::from_env();
    match rt.block_on(step::run(config, ctx)) {
        Ok(()) => EXIT_OK,
        Err(err) => {
            render_error(&err);
            EXIT_FAILURE
        }
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
