//! The type allocator.
//!
//! Issues sealing authorities over globally-unique ranges of the object-type
//! namespace. The only shared mutable state is one atomic counter; a single
//! fetch-and-add claims a range, so concurrent callers can never observe
//! overlapping ranges and no external locking is required.

use std::sync::atomic::{AtomicU64, Ordering};

use tracing::{debug, trace};

use selkie_core::error::{AllocError, Result, SealError};
use selkie_core::{Capability, OtypeRange, Perms};

/// Allocates unique object-type ranges and mints the matching authorities.
///
/// Construct one per process from the platform root authority, or one per
/// test from a private range. Exhaustion is terminal: a failed allocation
/// forfeits its range and every later call fails the same way.
pub struct TypeAllocator {
    root: Capability,
    next: AtomicU64,
    range: OtypeRange,
}

impl TypeAllocator {
    /// Build an allocator over the full user namespace.
    pub fn new(root: Capability) -> Result<Self> {
        Self::with_range(root, OtypeRange::USER)
    }

    /// Build an allocator over a caller-chosen namespace.
    ///
    /// The root must be unsealed, carry `GLOBAL` and `SEAL`, and its window
    /// must cover the namespace; anything less is an invalid authority.
    pub fn with_range(root: Capability, range: OtypeRange) -> Result<Self> {
        if root.is_sealed() {
            return Err(SealError::InvalidAuthority(
                "root sealing authority is sealed".into(),
            )
            .into());
        }
        if !root.has_perms(Perms::GLOBAL | Perms::SEAL) {
            return Err(SealError::InvalidAuthority(
                "root authority lacks GLOBAL or SEAL".into(),
            )
            .into());
        }
        let covered = root.base() <= range.min().value()
            && root.end() > range.max().value();
        if !covered {
            return Err(SealError::InvalidAuthority(
                "root authority window does not cover the type namespace".into(),
            )
            .into());
        }
        Ok(TypeAllocator {
            root,
            next: AtomicU64::new(range.min().value()),
            range,
        })
    }

    /// The namespace this allocator draws from.
    pub fn range(&self) -> OtypeRange {
        self.range
    }

    /// The next identifier a successful allocation would claim.
    ///
    /// Diagnostic only; by the time the caller looks at it another thread
    /// may already have advanced it.
    pub fn next_unclaimed(&self) -> u64 {
        self.next.load(Ordering::Relaxed)
    }

    /// Claim `size` consecutive type identifiers and mint the sealing
    /// authority for the claimed range.
    ///
    /// The returned authority carries `GLOBAL | SEAL`, is bounded to the
    /// claimed window `[base, base + size)`, and has its cursor at the
    /// first slot. If the range does not fit inside the namespace the call
    /// fails with [`AllocError::Exhausted`]; the counter stays advanced and
    /// the range is forfeited. There is no rollback and no reuse.
    pub fn allocate(&self, size: u64) -> Result<Capability> {
        if size == 0 {
            return Err(AllocError::ZeroSize.into());
        }

        // The counter must stay strictly monotonic; relaxed ordering is
        // enough because range uniqueness needs only the atomicity of the
        // read-modify-write itself.
        let base = self.next.fetch_add(size, Ordering::Relaxed);
        let max = self.range.max().value();
        if base.saturating_add(size - 1) > max {
            debug!(base, size, max, "type namespace exhausted");
            return Err(AllocError::Exhausted {
                requested: size,
                next: base,
                max,
            }
            .into());
        }

        let authority = self
            .root
            .with_bounds(base, size)?
            .with_perms(Perms::GLOBAL | Perms::SEAL)?;
        trace!(base, size, "claimed type range");
        Ok(authority)
    }

    /// Mint the unsealing authority matching `authority`.
    ///
    /// The root is the single amplification point of the hierarchy: an
    /// unsealing authority can only be derived from it, never from the
    /// sealing authority itself. The result mirrors the sealing authority's
    /// window and cursor and carries `GLOBAL | UNSEAL`.
    pub fn unsealer_for(&self, authority: &Capability) -> Result<Capability> {
        if authority.is_sealed() || !authority.has_perms(Perms::SEAL) {
            return Err(SealError::InvalidAuthority(
                "not a sealing authority issued by this allocator".into(),
            )
            .into());
        }
        if !self.root.has_perms(Perms::UNSEAL) {
            return Err(SealError::InvalidAuthority(
                "root authority cannot mint unsealing authorities".into(),
            )
            .into());
        }

        // Deriving from the root re-checks that the window is one of ours:
        // a foreign authority's bounds fall outside the root window.
        let unsealer = self
            .root
            .with_bounds(authority.base(), authority.length())?
            .with_offset(authority.offset())?
            .with_perms(Perms::GLOBAL | Perms::UNSEAL)?;
        Ok(unsealer)
    }
}
