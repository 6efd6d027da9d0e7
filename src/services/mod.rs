pub mod config;
pub mod history;
pub mod instruments;
pub mod market_data;
pub mod poller;
pub mod session;
pub mod shared;
