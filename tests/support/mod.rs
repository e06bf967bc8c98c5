//! Shared test collaborators: a miniature expression evaluator and an
//! in-memory gateway over JSON fixtures.
#![allow(dead_code)]

pub mod gateway;
pub mod script;

pub use gateway::MemoryGateway;
pub use script::MiniEvaluator;

pub fn init_tracing() {
    use tracing_subscriber::EnvFilter;
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .try_init();
}
