#![allow(dead_code)]
pub mod counting_store;
pub mod manual_clock;
pub mod test_server;

pub use test_server::*;
