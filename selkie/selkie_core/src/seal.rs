//! Sealing and unsealing primitives.
//!
//! Sealing stamps a capability with the type encoded by a sealing
//! authority and masks its class rights, making it opaque until a holder
//! of the matching [`UNSEAL`](crate::perms::Perms::UNSEAL) authority
//! restores it. Both operations are pure: inputs are never mutated, and a
//! failed operation leaves every value exactly as it was.
//!
//! The type an authority stamps is its cursor address (`base + offset`).
//! A multi-slot authority may move its cursor with
//! [`Capability::with_offset`] to stamp any type in its claimed range.

use tracing::debug;

use crate::capability::Capability;
use crate::error::SealError;
use crate::otype::Otype;
use crate::perms::Perms;

/// Validate a sealing authority and return the type it stamps.
fn stamped_otype(authority: &Capability) -> Result<Otype, SealError> {
    if authority.is_sealed() {
        return Err(SealError::InvalidAuthority(
            "authority is itself sealed".into(),
        ));
    }
    if !authority.has_perms(Perms::SEAL) {
        return Err(SealError::InvalidAuthority(
            "authority lacks the SEAL permission".into(),
        ));
    }
    if !authority.cursor_in_bounds() {
        return Err(SealError::InvalidAuthority(
            "authority cursor is outside its claimed type range".into(),
        ));
    }
    Ok(Otype::new(authority.address()))
}

/// Seal `target` under `authority`, masking all class rights.
///
/// The result carries the authority's encoded type, the same window and
/// cursor as `target`, and an active permission set with
/// [`Perms::CLASS_RIGHTS`] removed. The pre-seal set travels with the
/// sealed value and is restored exactly by [`unseal`].
///
/// Fails with [`SealError::InvalidAuthority`] if `authority` cannot seal
/// or if `target` is already sealed; double-sealing is rejected, never
/// re-stamped.
pub fn seal(target: &Capability, authority: &Capability) -> Result<Capability, SealError> {
    seal_preserving(target, authority, Perms::empty())
}

/// Seal `target` under `authority`, preserving the class rights in `keep`.
///
/// This is the policy hook the object constructor uses to leave `EXECUTE`
/// on a code half and the data rights on a data half. Only bits `target`
/// already holds survive; `keep` can never amplify.
pub fn seal_preserving(
    target: &Capability,
    authority: &Capability,
    keep: Perms,
) -> Result<Capability, SealError> {
    let otype = stamped_otype(authority)?;
    if target.is_sealed() {
        return Err(SealError::InvalidAuthority(
            "target is already sealed".into(),
        ));
    }

    let kept = target.perms() & keep & Perms::CLASS_RIGHTS;
    let active = (target.perms() - Perms::CLASS_RIGHTS) | kept;

    debug!(%otype, ?active, "sealing capability");
    Ok(target.sealed_copy(otype, active))
}

/// Unseal `sealed` under `authority`, restoring the pre-seal permission
/// set exactly.
///
/// Requires `authority` to be unsealed, to carry
/// [`UNSEAL`](Perms::UNSEAL), and to encode the type `sealed` was stamped
/// with; otherwise fails with [`SealError::TypeMismatch`] and the sealed
/// capability remains usable and unchanged.
pub fn unseal(sealed: &Capability, authority: &Capability) -> Result<Capability, SealError> {
    if authority.is_sealed() {
        return Err(SealError::InvalidAuthority(
            "authority is itself sealed".into(),
        ));
    }
    if !authority.has_perms(Perms::UNSEAL) {
        return Err(SealError::InvalidAuthority(
            "authority lacks the UNSEAL permission".into(),
        ));
    }
    let otype = sealed.otype().ok_or_else(|| {
        SealError::InvalidAuthority("capability is not sealed".into())
    })?;

    let granted = Otype::new(authority.address());
    if granted != otype {
        return Err(SealError::TypeMismatch {
            authority: granted,
            sealed: otype,
        });
    }

    debug!(%otype, "unsealing capability");
    Ok(sealed.unsealed_copy())
}

#[cfg(test)]
mod tests {
    use super::*;

    // An authority the way the allocator would mint it: a one-slot window
    // at `otype` with the cursor at its base.
    fn authority(otype: u64, perms: Perms) -> Capability {
        Capability::new(otype, 1, perms)
    }

    #[test]
    fn test_seal_masks_class_rights() {
        let target = Capability::new(0x2000, 0x400, Perms::DATA);
        let auth = authority(5, Perms::GLOBAL | Perms::SEAL);

        let sealed = seal(&target, &auth).unwrap();
        assert!(sealed.is_sealed());
        assert_eq!(sealed.otype(), Some(Otype::new(5)));
        assert_eq!(sealed.perms(), Perms::GLOBAL);
        assert_eq!(sealed.base(), target.base());
        assert_eq!(sealed.length(), target.length());
    }

    #[test]
    fn test_seal_preserving_keeps_only_held_bits() {
        let code = Capability::new(0x1000, 0x400, Perms::CODE);
        let auth = authority(5, Perms::GLOBAL | Perms::SEAL);

        let sealed = seal_preserving(&code, &auth, Perms::EXECUTE).unwrap();
        assert_eq!(sealed.perms(), Perms::GLOBAL | Perms::EXECUTE);

        // STORE is not held by the code window, so asking to keep it
        // preserves nothing.
        let sealed = seal_preserving(&code, &auth, Perms::STORE).unwrap();
        assert_eq!(sealed.perms(), Perms::GLOBAL);
    }

    #[test]
    fn test_seal_requires_seal_right() {
        let target = Capability::new(0x2000, 0x400, Perms::DATA);
        let auth = authority(5, Perms::GLOBAL);
        assert!(matches!(
            seal(&target, &auth),
            Err(SealError::InvalidAuthority(_))
        ));
    }

    #[test]
    fn test_seal_rejects_sealed_authority() {
        let target = Capability::new(0x2000, 0x400, Perms::DATA);
        let auth = authority(5, Perms::GLOBAL | Perms::SEAL);
        let sealed_auth = seal(&auth, &authority(6, Perms::SEAL)).unwrap();

        assert!(matches!(
            seal(&target, &sealed_auth),
            Err(SealError::InvalidAuthority(_))
        ));
    }

    #[test]
    fn test_seal_rejects_out_of_range_cursor() {
        let target = Capability::new(0x2000, 0x400, Perms::DATA);
        let auth = authority(5, Perms::GLOBAL | Perms::SEAL)
            .with_offset(3)
            .unwrap();
        assert!(matches!(
            seal(&target, &auth),
            Err(SealError::InvalidAuthority(_))
        ));
    }

    #[test]
    fn test_double_seal_rejected() {
        let target = Capability::new(0x2000, 0x400, Perms::DATA);
        let auth = authority(5, Perms::GLOBAL | Perms::SEAL);

        let sealed = seal(&target, &auth).unwrap();
        assert!(matches!(
            seal(&sealed, &auth),
            Err(SealError::InvalidAuthority(_))
        ));
    }

    #[test]
    fn test_unseal_round_trip() {
        let target = Capability::new(0x2000, 0x400, Perms::DATA);
        let sealer = authority(5, Perms::GLOBAL | Perms::SEAL);
        let unsealer = authority(5, Perms::GLOBAL | Perms::UNSEAL);

        let sealed = seal(&target, &sealer).unwrap();
        let restored = unseal(&sealed, &unsealer).unwrap();
        assert_eq!(restored, target);
    }

    #[test]
    fn test_unseal_type_mismatch_leaves_input_usable() {
        let target = Capability::new(0x2000, 0x400, Perms::DATA);
        let sealer = authority(5, Perms::GLOBAL | Perms::SEAL);
        let wrong = authority(6, Perms::GLOBAL | Perms::UNSEAL);
        let right = authority(5, Perms::GLOBAL | Perms::UNSEAL);

        let sealed = seal(&target, &sealer).unwrap();
        let err = unseal(&sealed, &wrong).unwrap_err();
        assert_eq!(
            err,
            SealError::TypeMismatch {
                authority: Otype::new(6),
                sealed: Otype::new(5),
            }
        );

        // The sealed value is untouched and still unseals correctly.
        assert_eq!(unseal(&sealed, &right).unwrap(), target);
    }

    #[test]
    fn test_unseal_requires_unseal_right_and_sealed_target() {
        let target = Capability::new(0x2000, 0x400, Perms::DATA);
        let sealer = authority(5, Perms::GLOBAL | Perms::SEAL);
        let sealed = seal(&target, &sealer).unwrap();

        // A sealing authority cannot unseal.
        assert!(matches!(
            unseal(&sealed, &sealer),
            Err(SealError::InvalidAuthority(_))
        ));

        // Unsealing an unsealed capability is an authority misuse, not a
        // type mismatch.
        let unsealer = authority(5, Perms::GLOBAL | Perms::UNSEAL);
        assert!(matches!(
            unseal(&target, &unsealer),
            Err(SealError::InvalidAuthority(_))
        ));
    }
}
