//! Lease-based distributed locking.
//!
//! The server side (`bootstrap`, `application`, `infrastructure`) keeps an
//! in-memory lease table, reclaims leases whose holder stopped sending
//! heartbeats, and exposes acquire/heartbeat/release/status over HTTP.
//! The client side (`client`) acquires leases and keeps them alive from a
//! background task until they are released or dropped.

pub mod application;
pub mod bootstrap;
pub mod client;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod models;
pub mod shared;

pub use client::{ClientError, LeaseClient, LeaseHandle};
pub use config::*;
pub use models::*;
