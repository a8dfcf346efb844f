//! Port traits decoupling the domain from data and configuration sources.

pub mod config_port;
pub mod data_port;
