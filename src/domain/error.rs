//! Domain validation errors for core domain types.
//!
//! These errors are returned when an address string cannot be parsed or a
//! port range has been used up.
//!
//! # Examples
//!
//! ```
//! use hatchery::domain::error::DomainError;
//! use hatchery::domain::Address;
//!
//! let result: Result<Address, _> = "no-port-here".parse();
//! assert!(matches!(result, Err(DomainError::InvalidAddress { .. })));
//! ```

use thiserror::Error;

use super::role::Role;

/// Errors that occur when domain invariants are violated.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Address string is not of the form `host:port`.
    #[error("invalid address '{input}': {reason}")]
    InvalidAddress {
        /// The rejected input.
        input: String,
        /// Why it was rejected.
        reason: &'static str,
    },

    /// A role's port counter would step past the last valid port.
    #[error("no ports left in the {role} range")]
    PortsExhausted {
        /// The role whose counter ran out.
        role: Role,
    },
}
