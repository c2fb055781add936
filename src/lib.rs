pub mod config;
pub mod error;
pub mod fetch;
pub mod logging;
pub mod pipeline;
pub mod process;
pub mod secrets;
pub mod server;
pub mod store;

#[cfg(test)]
pub(crate) mod testing;
