//! Core plugin modules.
//!
//! This module provides the main components of the volume plugin:
//!
//! - `constants`: Plugin constants and default values
//! - `volume`: Volume data model and creation-option parsing
//! - `mountpoint`: Deterministic mountpoint derivation
//! - `command`: External client argument construction
//! - `state`: Durable registry snapshots
//! - `executor`: External mount client invocation
//! - `driver`: Reference-counted volume lifecycle driver
//! - `dispatch`: Plugin-protocol request/response boundary
//! - `error`: Driver error types

pub mod command;
pub mod constants;
pub mod dispatch;
pub mod driver;
pub mod error;
pub mod executor;
pub mod mountpoint;
pub mod state;
pub mod volume;
