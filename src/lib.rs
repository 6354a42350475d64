//! Connection settings: a typed store of named remote-service connection
//! profiles (server URL + access token) with persistence and connectivity
//! checks, plus HTTP and console front ends.

pub mod config;
pub mod connections;
pub mod error;
pub mod settings;
