//! Root sealing authority acquisition.
//!
//! The root of the sealing hierarchy comes from outside the library: on
//! real hardware it is a privileged platform query answered once per
//! process by the host security policy. That seam is modeled as the
//! [`RootAuthority`] trait so the rest of the system never cares where the
//! root came from. Without a root no sealing is possible at all, so a
//! failure here is fatal to the whole subsystem.

use tracing::info;

use selkie_core::error::PlatformError;
use selkie_core::{Capability, OtypeRange, Perms};

/// Source of the process's root sealing authority.
///
/// Implementations fetch the unique capability at the root of the sealing
/// hierarchy: unsealed, carrying [`Perms::ROOT`], windowed over the whole
/// type namespace. It is acquired once, held for the process lifetime, and
/// only ever consumed by a [`TypeAllocator`](crate::TypeAllocator), never
/// used to seal application data directly.
pub trait RootAuthority: Send + Sync {
    /// Fetch the platform root sealing authority.
    fn fetch_root(&self) -> Result<Capability, PlatformError>;
}

/// A deterministic in-process root source.
///
/// Stands in for the host security policy in tests and demonstrations:
/// hands out a root with full sealing rights over a chosen namespace.
pub struct SyntheticRoot {
    range: OtypeRange,
}

impl SyntheticRoot {
    /// A root source over `range`.
    pub fn new(range: OtypeRange) -> Self {
        SyntheticRoot { range }
    }

    /// A root source over the full user namespace.
    pub fn user() -> Self {
        SyntheticRoot {
            range: OtypeRange::USER,
        }
    }
}

impl RootAuthority for SyntheticRoot {
    fn fetch_root(&self) -> Result<Capability, PlatformError> {
        let root = Capability::new(
            self.range.min().value(),
            self.range.count(),
            Perms::ROOT,
        );
        info!(range = %self.range, "issued synthetic root sealing authority");
        Ok(root)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_synthetic_root_shape() {
        let root = SyntheticRoot::user().fetch_root().unwrap();
        assert!(!root.is_sealed());
        assert!(root.has_perms(Perms::ROOT));
        assert_eq!(root.base(), 4);
        assert_eq!(root.end(), 0x4000);
    }

    #[test]
    fn test_custom_range() {
        let range = OtypeRange::new(
            selkie_core::Otype::new(8),
            selkie_core::Otype::new(15),
        )
        .unwrap();
        let root = SyntheticRoot::new(range).fetch_root().unwrap();
        assert_eq!(root.base(), 8);
        assert_eq!(root.length(), 8);
    }
}
