//! qcdash CLI - sequencing QC dashboard.

mod cli;
mod commands;
mod server;

use clap::Parser;
use cli::{Cli, Commands};

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Serve {
            file,
            overlay,
            port,
            max_upload_mb,
            load,
        } => commands::serve::run(file, overlay, port, max_upload_mb, &load),

        Commands::Summary {
            file,
            overlay,
            select,
            json,
            load,
        } => commands::summary::run(file, overlay, &select, json, &load),

        Commands::Query {
            file,
            overlay,
            select,
            limit,
            json,
            load,
        } => commands::query::run(file, overlay, &select, limit, json, &load),

        Commands::Breakdown {
            file,
            by,
            select,
            json,
            load,
        } => commands::breakdown::run(file, &by, &select, json, &load),

        Commands::Correlation {
            file,
            select,
            json,
            load,
        } => commands::correlation::run(file, &select, json, &load),

        Commands::Packages { assay_type, json } => commands::packages::run(assay_type, json),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

/// `RUST_LOG` wins; otherwise `info`, or `debug` with `--verbose`.
fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default))
        .format_timestamp(None)
        .init();
}
