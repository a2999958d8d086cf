//! Errors raised while constructing and manipulating automorphisms.

use std::error::Error;
use std::fmt;

/// An enumerated type for the failures of automorphism computations.
///
/// All validation happens eagerly when a value is constructed, so every error is fatal to the
/// operation that raised it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AutomorphismError {
    /// Variant for a domain that is not a finite abelian group.
    UnsupportedDomain(String),

    /// Variant for a value that cannot be coerced into the expected domain, *e.g.* an exponent
    /// vector of the wrong length or a module with mismatched invariants.
    DomainError(String),

    /// Variant for a matrix or homomorphism that does not define a bijective endomorphism of the
    /// domain.
    NotAutomorphism(String),
}

impl fmt::Display for AutomorphismError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnsupportedDomain(msg) => write!(f, "Unsupported domain: {msg}"),
            Self::DomainError(msg) => write!(f, "Domain error: {msg}"),
            Self::NotAutomorphism(msg) => write!(f, "Not an automorphism: {msg}"),
        }
    }
}

impl Error for AutomorphismError {}
