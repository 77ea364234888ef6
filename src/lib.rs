pub mod app;
pub mod auth;
pub mod config;
pub mod dates;
pub mod error;
pub mod generation;
pub mod memory;
pub mod metrics;
pub mod plans;
pub mod state;
pub mod validation;
pub mod water;

#[cfg(test)]
mod test_support;
