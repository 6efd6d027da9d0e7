pub mod env;
pub mod logger;
