//! DNS MX resolution for the verification pipeline.
//!
//! [`ResolverClient`] performs asynchronous lookups through the system
//! resolver and returns the exchangers sorted by ascending priority. Missing
//! or failing records are reported as [`ResolutionError::NoRoute`].

mod client;
mod error;
mod types;

pub use client::{ResolveExchangers, ResolverClient};
pub use error::{ResolutionError, ResolverInitError};
pub use types::MailExchanger;
