//! Client library for the lease service.
//!
//! ```no_run
//! # async fn run() -> Result<(), leasekeeper::ClientError> {
//! let client = leasekeeper::LeaseClient::new("http://127.0.0.1:5000")?;
//! if let Some(lease) = client.acquire("nightly-report", None).await? {
//!     // ... exclusive work ...
//!     lease.release().await;
//! }
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod lease_client;
pub mod lease_handle;
mod transport;

pub use error::*;
pub use lease_client::*;
pub use lease_handle::*;
