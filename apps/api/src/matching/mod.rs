pub mod handlers;
pub mod models;
pub mod orchestrator;
pub mod parsing;
