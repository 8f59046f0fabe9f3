//! Core library for the FixIt QC admin console
//!
//! This crate contains:
//! - Entity models (organizations, stations, equipment, users)
//! - The backend abstraction with in-memory and Firebase implementations
//! - The service façade returning uniform responses
//! - The admin console controller (auth gate, scoping, guards, commands)

pub mod backend;
pub mod config;
pub mod console;
pub mod error;
pub mod model;
pub mod service;

pub use error::Error;
pub type Result<T> = std::result::Result<T, Error>;
