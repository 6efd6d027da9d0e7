pub mod instruments;
pub mod quote;
pub mod shared;
pub mod watch;

use clap::{Parser, Subcommand};
use instruments::instruments;
use quote::quote;
use watch::watch;

use crate::{api, services::config::PollerConfig};

#[derive(Parser, Debug)]
#[command(about = "Live FX and gold rates from FreeForexAPI")]
struct Args {
    #[clap(subcommand)]
    cmd: Command,
}

#[derive(Debug, Subcommand, PartialEq)]
enum Command {
    /// Poll one instrument and redraw the dashboard on every refresh.
    Watch {
        /// Provider code or label, e.g. EURUSD or "EUR/USD". Prompts when omitted.
        #[arg(short, long)]
        instrument: Option<String>,
        /// Stop after this many polls.
        #[arg(short, long)]
        ticks: Option<u64>,
    },
    /// Fetch a single quote and exit.
    Quote { instrument: String },
    /// List the known instruments.
    Instruments,
    /// Poll in the background and serve the dashboard as JSON.
    Api {
        #[arg(short, long)]
        port: Option<u16>,
    },
}

pub async fn cli(config: PollerConfig) -> anyhow::Result<()> {
    let args = Args::parse();

    match args.cmd {
        Command::Watch { instrument, ticks } => {
            watch(&config, instrument, ticks).await?;
        }
        Command::Quote { instrument } => {
            quote(&config, &instrument).await?;
        }
        Command::Instruments => {
            instruments(&config);
        }
        Command::Api { port } => {
            let port = port.unwrap_or(config.api_port);
            println!("Starting web server on port {}...", port);
            api(config, port).await?;
        }
    }
    Ok(())
}
