//! Error types for the Selkie sealing library.
//!
//! Each subsystem has its own error enum; the root [`Error`] wraps all of
//! them for uniform handling at the top level. Every failure is reported as
//! a value to the immediate caller; nothing is logged and swallowed inside
//! the library.

use crate::otype::Otype;
use crate::perms::Perms;
use thiserror::Error;

/// Root error type for the Selkie system.
#[derive(Debug, Error)]
pub enum Error {
    /// The host platform could not supply the root sealing authority.
    #[error("Platform error: {0}")]
    Platform(#[from] PlatformError),

    /// Type-namespace allocation errors.
    #[error("Type allocation error: {0}")]
    Alloc(#[from] AllocError),

    /// Sealing and unsealing errors.
    #[error("Sealing error: {0}")]
    Seal(#[from] SealError),

    /// Capability derivation errors.
    #[error("Derivation error: {0}")]
    Derive(#[from] DeriveError),
}

/// Errors from the external root-authority query.
///
/// These are fatal to the whole subsystem: without a root there is no
/// sealing hierarchy to derive from.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PlatformError {
    /// The host security policy did not hand out a root sealing authority.
    #[error("Root sealing authority unavailable: {0}")]
    RootUnavailable(String),
}

/// Errors from the type allocator.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AllocError {
    /// The namespace cannot hold the requested range. The counter has
    /// already been advanced; the failed range is permanently forfeited and
    /// retrying will fail deterministically.
    #[error("Type namespace exhausted: {requested} slot(s) requested at {next:#06x}, namespace ends at {max:#06x}")]
    Exhausted {
        /// Number of slots the caller asked for.
        requested: u64,

        /// The base the failed allocation claimed.
        next: u64,

        /// Largest identifier in the namespace.
        max: u64,
    },

    /// A range of zero slots was requested.
    #[error("Requested type range must not be empty")]
    ZeroSize,
}

/// Errors from the sealing primitive.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SealError {
    /// The supplied token cannot authorize the operation: it lacks the
    /// required right, is itself sealed, its cursor points outside its
    /// claimed range, or the target is not in a sealable state.
    #[error("Invalid sealing authority: {0}")]
    InvalidAuthority(String),

    /// An unseal was attempted with an authority encoding a different type
    /// than the one the capability was sealed with. The sealed capability
    /// is returned to the caller unchanged.
    #[error("Type mismatch: authority encodes {authority}, capability is sealed with {sealed}")]
    TypeMismatch {
        /// Type the unsealing authority encodes.
        authority: Otype,

        /// Type the capability was sealed with.
        sealed: Otype,
    },
}

/// Errors from the capability derivation funnel.
///
/// All derivations are narrowing-only; these report attempts to amplify.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DeriveError {
    /// The derived permission set is not a subset of the source's.
    #[error("Derived permissions {requested:?} exceed source permissions {held:?}")]
    PermsEscalation {
        /// Permissions the caller asked for.
        requested: Perms,

        /// Permissions the source capability holds.
        held: Perms,
    },

    /// The derived window is not contained in the source window.
    #[error("Derived window {base:#x}+{length:#x} falls outside the source window")]
    BoundsWidened {
        /// Requested window base.
        base: u64,

        /// Requested window length.
        length: u64,
    },

    /// A window was described with its end at or before its base.
    #[error("Invalid window: end {end:#x} does not follow base {base:#x}")]
    InvalidBounds {
        /// Window base address.
        base: u64,

        /// Window end address.
        end: u64,
    },

    /// A sealed capability was used where an unsealed one is required.
    #[error("Sealed capabilities cannot be exercised or derived")]
    Sealed,
}

/// Result type used throughout the Selkie system.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_conversion() {
        let alloc_err = AllocError::ZeroSize;
        let error: Error = alloc_err.into();
        assert!(matches!(error, Error::Alloc(_)));

        let seal_err = SealError::InvalidAuthority("no SEAL right".into());
        let error: Error = seal_err.into();
        assert!(matches!(error, Error::Seal(_)));

        let derive_err = DeriveError::Sealed;
        let error: Error = derive_err.into();
        assert!(matches!(error, Error::Derive(_)));
    }

    #[test]
    fn test_error_display() {
        let err = AllocError::Exhausted {
            requested: 2,
            next: 0x3FFF,
            max: 0x3FFF,
        };
        let display = format!("{}", err);
        assert!(display.contains("exhausted"));
        assert!(display.contains("0x3fff"));

        let err = SealError::TypeMismatch {
            authority: Otype::new(5),
            sealed: Otype::new(7),
        };
        let display = format!("{}", err);
        assert!(display.contains("0x0005"));
        assert!(display.contains("0x0007"));
    }

    #[test]
    fn test_platform_error_display() {
        let err: Error = PlatformError::RootUnavailable("sysctl failed".into()).into();
        assert!(format!("{}", err).contains("sysctl failed"));
    }
}
