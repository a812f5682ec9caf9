pub mod handlers;

use crate::presentation::cli::{Cli, Commands};
use clap::Parser;
use dvpl_core::error::Result;
use tracing_subscriber::EnvFilter;

/// Process exit status chosen by a handler.
pub type ExitCode = i32;

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

pub fn run() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Pack {
            path,
            out,
            compression,
            keep_originals,
            skip_existing,
            fast,
            json,
        } => handlers::handle_pack(
            path,
            out,
            compression.into(),
            keep_originals,
            skip_existing,
            fast,
            json,
        ),
        Commands::Extract {
            path,
            out,
            keep_originals,
            skip_existing,
            fast,
            verify,
            json,
        } => handlers::handle_extract(path, out, keep_originals, skip_existing, fast, verify, json),
        Commands::Info { file, json } => handlers::handle_info(file, json),
        Commands::Scan { dir, json } => handlers::handle_scan(dir, json),
        Commands::Verify { path } => handlers::handle_verify(path),
    }
}
