//! Object-capability construction.
//!
//! An object capability is a matched pair of sealed references, one
//! executable entry window and one private data window, stamped with the
//! same object type. The pair is the software analogue of a class instance whose
//! method table and state cannot be separated or mixed with another
//! instance's.

use tracing::debug;

use selkie_core::error::{DeriveError, Result};
use selkie_core::seal::seal_preserving;
use selkie_core::{Capability, Otype, Perms};

/// An executable region: entry point and one-past-the-end bound.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CodeRegion {
    /// Entry address; becomes the window base.
    pub entry: u64,

    /// One past the last executable address.
    pub end: u64,
}

/// A data region: base and one-past-the-end bound.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DataRegion {
    /// Window base address.
    pub base: u64,

    /// One past the last addressable byte.
    pub end: u64,
}

fn span(base: u64, end: u64) -> Result<u64> {
    match end.checked_sub(base) {
        Some(length) if length > 0 => Ok(length),
        _ => Err(DeriveError::InvalidBounds { base, end }.into()),
    }
}

/// Build the unsealed code window for a region: `[entry, end)` with
/// [`Perms::CODE`].
pub fn code_window(region: CodeRegion) -> Result<Capability> {
    let length = span(region.entry, region.end)?;
    Ok(Capability::new(region.entry, length, Perms::CODE))
}

/// Build the unsealed data window for a region: `[base, end)` with
/// [`Perms::DATA`].
pub fn data_window(region: DataRegion) -> Result<Capability> {
    let length = span(region.base, region.end)?;
    Ok(Capability::new(region.base, length, Perms::DATA))
}

/// A matched pair of sealed code and data capabilities sharing one type.
///
/// Invariants guaranteed by construction:
/// - both halves are sealed with the same object type;
/// - the code half carries `EXECUTE` and none of the data rights;
/// - the data half carries the data rights and not `EXECUTE`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ObjectCap {
    code: Capability,
    data: Capability,
    otype: Otype,
}

impl ObjectCap {
    /// Seal a code window and a data window under one authority.
    ///
    /// Both halves inherit the authority's encoded type; the code half
    /// keeps only `EXECUTE` of its class rights, the data half only the
    /// data rights. Any failure from the underlying seal operations
    /// propagates unchanged.
    pub fn build(
        code: CodeRegion,
        data: DataRegion,
        authority: &Capability,
    ) -> Result<Self> {
        let code_cap = seal_preserving(&code_window(code)?, authority, Perms::EXECUTE)?;
        let data_cap = seal_preserving(&data_window(data)?, authority, Perms::DATA_RIGHTS)?;

        // Both halves were stamped by the same authority in one call, so
        // the shared type is whatever it encoded at that moment.
        let otype = Otype::new(authority.address());
        debug!(%otype, "built object capability pair");
        Ok(ObjectCap {
            code: code_cap,
            data: data_cap,
            otype,
        })
    }

    /// The sealed, executable-only half.
    pub fn code(&self) -> &Capability {
        &self.code
    }

    /// The sealed, data-rights-only half.
    pub fn data(&self) -> &Capability {
        &self.data
    }

    /// The object type both halves are stamped with.
    pub fn otype(&self) -> Otype {
        self.otype
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use selkie_core::error::{Error, SealError};

    fn authority(otype: u64) -> Capability {
        Capability::new(otype, 1, Perms::GLOBAL | Perms::SEAL)
    }

    #[test]
    fn test_build_pair_shares_type_with_disjoint_rights() {
        let obj = ObjectCap::build(
            CodeRegion { entry: 0x1000, end: 0x1400 },
            DataRegion { base: 0x2000, end: 0x2400 },
            &authority(5),
        )
        .unwrap();

        assert!(obj.code().is_sealed());
        assert!(obj.data().is_sealed());
        assert_eq!(obj.code().otype(), Some(Otype::new(5)));
        assert_eq!(obj.data().otype(), Some(Otype::new(5)));
        assert_eq!(obj.otype(), Otype::new(5));

        // Code executes but cannot store; data stores but cannot execute.
        assert!(obj.code().has_perms(Perms::EXECUTE));
        assert!(!obj.code().has_perms(Perms::STORE));
        assert!(obj.data().has_perms(Perms::STORE));
        assert!(!obj.data().has_perms(Perms::EXECUTE));
        assert_eq!(
            obj.code().perms() & obj.data().perms() & Perms::CLASS_RIGHTS,
            Perms::empty()
        );
    }

    #[test]
    fn test_window_bounds_follow_regions() {
        let obj = ObjectCap::build(
            CodeRegion { entry: 0x1000, end: 0x1400 },
            DataRegion { base: 0x2000, end: 0x2400 },
            &authority(5),
        )
        .unwrap();

        assert_eq!(obj.code().base(), 0x1000);
        assert_eq!(obj.code().end(), 0x1400);
        assert_eq!(obj.data().base(), 0x2000);
        assert_eq!(obj.data().end(), 0x2400);
    }

    #[test]
    fn test_inverted_region_rejected() {
        let bad = ObjectCap::build(
            CodeRegion { entry: 0x1400, end: 0x1000 },
            DataRegion { base: 0x2000, end: 0x2400 },
            &authority(5),
        );
        assert!(matches!(
            bad,
            Err(Error::Derive(DeriveError::InvalidBounds { .. }))
        ));

        let empty = ObjectCap::build(
            CodeRegion { entry: 0x1000, end: 0x1400 },
            DataRegion { base: 0x2400, end: 0x2400 },
            &authority(5),
        );
        assert!(empty.is_err());
    }

    #[test]
    fn test_invalid_authority_propagates() {
        let no_seal = Capability::new(5, 1, Perms::GLOBAL);
        let err = ObjectCap::build(
            CodeRegion { entry: 0x1000, end: 0x1400 },
            DataRegion { base: 0x2000, end: 0x2400 },
            &no_seal,
        )
        .unwrap_err();
        assert!(matches!(err, Error::Seal(SealError::InvalidAuthority(_))));
    }
}
