//! Core engine for the seasonal market stand service.
//!
//! The interesting logic lives under [`market`]: the vendor application
//! lifecycle state machine, per-edition pricing and revenue aggregation, and
//! the paced geocoding pipeline that feeds the stand map. Everything around it
//! (persistence, mail transport, rendering) is consumed through narrow traits
//! so the engine can be exercised with zero I/O.

pub mod config;
pub mod error;
pub mod market;
pub mod telemetry;
