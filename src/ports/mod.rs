//! Port traits the simulation loop talks to.

pub mod broker_port;
pub mod config_port;
pub mod data_port;
pub mod journal_port;
