mod api;
mod cli;
mod services;

use api::api;
use cli::cli;
use services::{
    config::PollerConfig,
    shared::{env::check_for_env_variables, logger::init_logger},
};

async fn run_forexwatch() -> anyhow::Result<()> {
    init_logger();
    let config = PollerConfig::from_env();
    check_for_env_variables(&config);
    cli(config).await?;
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    run_forexwatch().await?;
    Ok(())
}
