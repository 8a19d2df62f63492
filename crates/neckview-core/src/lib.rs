//! Core neckview library (session model, live store, server access, config).

pub mod config;
pub mod logging;
pub mod model;
pub mod single_flight;
pub mod source;
pub mod store;
