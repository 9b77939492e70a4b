pub mod bot;
pub mod chat;
pub mod config;
pub mod error;
pub mod orchestrator;
pub mod prediction;
pub mod session;
pub mod types;

#[cfg(test)]
mod test_support;

pub use bot::run;
