pub mod ai;
pub mod assistant;
pub mod cli;
pub mod config;
pub mod mentor;
pub mod metrics;
pub mod resilience;
pub mod server;
