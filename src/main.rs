use clap::Parser;

use ledger_config::cli::{Cli, build_loader, execute_command, init_logger_from_cli};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logger_from_cli(&cli)?;

    tracing::debug!(version = ledger_config::pkg_version(), "starting ledger-config");

    let result = build_loader(&cli)
        .map_err(Into::into)
        .and_then(|loader| execute_command(&cli, &loader, &mut std::io::stdout().lock()));

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    Ok(())
}
