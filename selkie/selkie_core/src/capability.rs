//! The capability value type.
//!
//! A [`Capability`] is a protected reference: an address window, a cursor,
//! a permission set, and a seal state. Values are immutable after
//! construction; every operation returns a new value. All derivations pass
//! through one internal funnel that enforces the narrowing-only discipline,
//! so the non-amplification property is checked in exactly one place.
//!
//! Sealed capabilities are opaque: their fields may be inspected but the
//! capability cannot be derived from or re-sealed until a holder of the
//! matching [`UNSEAL`](crate::perms::Perms::UNSEAL) authority unseals it.

use serde::Serialize;
use std::fmt;

use crate::error::DeriveError;
use crate::otype::Otype;
use crate::perms::Perms;

/// Seal state of a capability.
///
/// The pre-seal permission set travels with the sealed value so that
/// unsealing can restore it exactly (store-and-restore).
#[derive(Clone, Debug, PartialEq, Eq)]
enum SealState {
    Unsealed,
    Sealed { otype: Otype, saved: Perms },
}

/// A protected reference: window, cursor, permissions, seal state.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Capability {
    base: u64,
    length: u64,
    offset: u64,
    perms: Perms,
    state: SealState,
}

impl Capability {
    /// Build an unsealed capability over `[base, base + length)` with the
    /// cursor parked at the base.
    pub fn new(base: u64, length: u64, perms: Perms) -> Self {
        Capability {
            base,
            length,
            offset: 0,
            perms,
            state: SealState::Unsealed,
        }
    }

    /// Window base address.
    pub fn base(&self) -> u64 {
        self.base
    }

    /// Window length in slots or bytes, depending on what the window maps.
    pub fn length(&self) -> u64 {
        self.length
    }

    /// Cursor, relative to the window base.
    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// One past the last address of the window.
    pub fn end(&self) -> u64 {
        self.base.saturating_add(self.length)
    }

    /// Absolute address of the cursor.
    pub fn address(&self) -> u64 {
        self.base.wrapping_add(self.offset)
    }

    /// Whether the cursor currently points inside the window.
    pub fn cursor_in_bounds(&self) -> bool {
        self.offset < self.length
    }

    /// The active permission set.
    pub fn perms(&self) -> Perms {
        self.perms
    }

    /// Whether all of `required` are present in the active set.
    pub fn has_perms(&self, required: Perms) -> bool {
        self.perms.contains(required)
    }

    /// Whether the capability is sealed.
    pub fn is_sealed(&self) -> bool {
        matches!(self.state, SealState::Sealed { .. })
    }

    /// The stamped type, if sealed.
    pub fn otype(&self) -> Option<Otype> {
        match self.state {
            SealState::Sealed { otype, .. } => Some(otype),
            SealState::Unsealed => None,
        }
    }

    /// The single derivation funnel.
    ///
    /// Every public derivation routes through here: the source must be
    /// unsealed, the permission set may only shrink, and the window may only
    /// shrink. Violations are reported, never clamped.
    fn derive(
        &self,
        base: u64,
        length: u64,
        offset: u64,
        perms: Perms,
    ) -> Result<Capability, DeriveError> {
        if self.is_sealed() {
            return Err(DeriveError::Sealed);
        }
        if !self.perms.contains(perms) {
            return Err(DeriveError::PermsEscalation {
                requested: perms,
                held: self.perms,
            });
        }
        let widened = base < self.base
            || base.checked_add(length).map_or(true, |end| end > self.end());
        if widened {
            return Err(DeriveError::BoundsWidened { base, length });
        }
        Ok(Capability {
            base,
            length,
            offset,
            perms,
            state: SealState::Unsealed,
        })
    }

    /// Derive a copy with a narrowed permission set.
    pub fn with_perms(&self, perms: Perms) -> Result<Capability, DeriveError> {
        self.derive(self.base, self.length, self.offset, perms)
    }

    /// Derive a copy with a narrowed window. The cursor is rebased to the
    /// new window's base.
    pub fn with_bounds(&self, base: u64, length: u64) -> Result<Capability, DeriveError> {
        self.derive(base, length, 0, self.perms)
    }

    /// Derive a copy with the cursor moved.
    ///
    /// The cursor may point past the window; the window is checked when the
    /// capability is exercised, not when the cursor is set.
    pub fn with_offset(&self, offset: u64) -> Result<Capability, DeriveError> {
        self.derive(self.base, self.length, offset, self.perms)
    }

    /// Sealed copy of this capability: `active` becomes the visible
    /// permission set and the current set is saved for restore at unseal.
    ///
    /// Only the sealing primitive calls this, after validating the
    /// authority; it is deliberately not part of the public surface.
    pub(crate) fn sealed_copy(&self, otype: Otype, active: Perms) -> Capability {
        Capability {
            perms: active,
            state: SealState::Sealed {
                otype,
                saved: self.perms,
            },
            ..self.clone()
        }
    }

    /// Unsealed copy with the saved pre-seal permission set restored.
    pub(crate) fn unsealed_copy(&self) -> Capability {
        match self.state {
            SealState::Sealed { saved, .. } => Capability {
                perms: saved,
                state: SealState::Unsealed,
                ..self.clone()
            },
            SealState::Unsealed => self.clone(),
        }
    }

    /// Snapshot of the fields for structured diagnostics.
    pub fn summary(&self) -> CapSummary {
        CapSummary {
            base: self.base,
            length: self.length,
            offset: self.offset,
            perms: self.perms.names().into_iter().map(String::from).collect(),
            sealed: self.is_sealed(),
            otype: self.otype().map(Otype::value),
        }
    }
}

/// Serializable rendering of a capability's fields.
///
/// This is diagnostic output only; a summary cannot be turned back into a
/// capability.
#[derive(Debug, Clone, Serialize)]
pub struct CapSummary {
    /// Window base address.
    pub base: u64,

    /// Window length.
    pub length: u64,

    /// Cursor relative to the base.
    pub offset: u64,

    /// Names of the active permission bits.
    pub perms: Vec<String>,

    /// Whether the capability is sealed.
    pub sealed: bool,

    /// Stamped type value, when sealed.
    pub otype: Option<u64>,
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "cap {:#x} [{:#x},{:#x}) off {:#x} perms {}",
            self.address(),
            self.base,
            self.end(),
            self.offset,
            self.perms.names().join("|"),
        )?;
        match self.state {
            SealState::Sealed { otype, .. } => write!(f, " sealed otype {}", otype),
            SealState::Unsealed => write!(f, " unsealed"),
        }
    }
}
