pub mod lease_table;

pub use lease_table::*;
