//! Zoho CRM publisher plugin
//!
//! Prints the handshake line on stdout, then serves until the agent writes
//! a line to stdin, closes it, or the process is interrupted.

use clap::Parser;
use std::io::Write;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{error, info};
use zoho_crm_publisher::cli::{bind, handshake_line, router, serve, Cli};
use zoho_crm_publisher::{logging, Publisher, Result, ZohoPublisher};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        error!("Plugin failed: {e}");
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    logging::init(cli.log_level, cli.log_file.as_deref())?;

    let config = cli.resolve_config()?;
    let publisher = Arc::new(ZohoPublisher::new(config));

    let listener = bind(&cli.bind_addr()).await?;
    let addr = listener.local_addr()?;

    let mut stdout = std::io::stdout();
    writeln!(stdout, "{}", handshake_line(addr))?;
    stdout.flush()?;

    let app = router(publisher.clone());
    let shutdown = async move {
        released().await;
        // Ends held sessions and open streams so the server can drain
        publisher.disconnect().await;
    };

    serve(listener, app, shutdown).await
}

/// Resolves when the agent releases the plugin
async fn released() {
    let stdin = async {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        match lines.next_line().await {
            Ok(Some(_)) => info!("Shutdown requested"),
            Ok(None) => info!("Stdin closed"),
            Err(e) => error!("Failed to read stdin: {e}"),
        }
    };

    tokio::select! {
        () = stdin => {}
        result = tokio::signal::ctrl_c() => match result {
            Ok(()) => info!("Interrupted"),
            Err(e) => error!("Failed to listen for Ctrl-C: {e}"),
        },
    }
}
