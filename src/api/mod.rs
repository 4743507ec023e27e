//! postcodes.io API access
//!
//! [`PostcodeClient`] performs the lookups, [`HttpTransport`] is the seam to
//! the network, and [`PostcodeError`] classifies what went wrong.

mod client;
mod error;
#[cfg(test)]
pub(crate) mod mock;
mod transport;

pub use client::{normalize_key, PostcodeClient, DEFAULT_BASE_URL, MAX_BULK_POSTCODES};
pub use error::{ErrorKind, PostcodeError};
pub use transport::{HttpResponse, HttpTransport, ReqwestTransport};
