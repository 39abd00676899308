//! ZeroPass command-line client
//!
//! Talks to a ZeroPass firewall simulator backend as an anonymous, persistent
//! identity. State (identity, session record, cached listings) lives in one
//! JSON file under the data directory, so consecutive invocations share an
//! identity while each invocation is its own session.
//!
//! ```bash
//! zeropass health --probe
//! zeropass rules create --name "Office only" --cidr 10.0.0.0/8 --ip-action allow --default-action block
//! zeropass simulate --rule-set rs-1 --ip 10.1.2.3 --path /admin
//! zeropass scenarios test sqli --rule-set rs-1
//! ```

mod args;
mod commands;
mod console;
mod context;
mod logging;
mod router;

use clap::Parser;
use console::CliConsole;
use zeropass_core::{UnifiedError, ZeroPassError};

use args::Cli;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let console = CliConsole::new(cli.json);

    let config = match context::load_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            report_error(&console, &e);
            std::process::exit(2);
        }
    };

    // RUST_LOG takes precedence over the configured level
    logging::init(&config.logging);

    if let Err(e) = router::route(cli, config, &console).await {
        report_error(&console, &e);
        std::process::exit(1);
    }
}

fn report_error(console: &CliConsole, error: &anyhow::Error) {
    console.error(&format!("{:#}", error));
    if let Some(hint) = error
        .downcast_ref::<ZeroPassError>()
        .and_then(|e| e.hint())
    {
        console.hint(hint);
    }
}
