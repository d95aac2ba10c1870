//! # Chatline Shared
//!
//! The message pipeline shared by the two Chatline services:
//!
//! - `ingress` and `routes`: the HTTP side that validates and publishes
//! - `kafka`: producer, consumer and the seams the processors use
//! - `delivery_worker`: the loop that persists records and marks them
//!   delivered
//! - `auth`, `context`, `metrics`, `telemetry`, `shutdown`: plumbing

pub mod auth;
pub mod context;
pub mod delivery_worker;
pub mod ingress;
pub mod kafka;
pub mod metrics;
pub mod routes;
pub mod shutdown;
pub mod telemetry;
