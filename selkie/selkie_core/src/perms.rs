//! Permission bits carried by capabilities.
//!
//! Permissions form a lattice under set inclusion: every derivation may only
//! narrow the set, never widen it. The named composites below are the
//! permission classes the sealing protocol works in terms of.

use bitflags::bitflags;

bitflags! {
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    /// Rights a capability may carry, as a bit field.
    pub struct Perms: u16 {
        /// The capability may be stored outside its originating domain.
        const GLOBAL = 1 << 0;
        /// The window may be executed as code.
        const EXECUTE = 1 << 1;
        /// Plain data loads through the window.
        const LOAD = 1 << 2;
        /// Plain data stores through the window.
        const STORE = 1 << 3;
        /// Loading other capabilities through the window.
        const LOAD_CAP = 1 << 4;
        /// Storing other capabilities through the window.
        const STORE_CAP = 1 << 5;
        /// Storing non-global capabilities through the window.
        const STORE_LOCAL_CAP = 1 << 6;
        /// The capability may stamp others with its encoded type.
        const SEAL = 1 << 7;
        /// The capability may strip a matching stamp.
        const UNSEAL = 1 << 8;
    }
}

impl Perms {
    /// Rights exercised through a data window.
    pub const DATA_RIGHTS: Perms = Perms::LOAD
        .union(Perms::STORE)
        .union(Perms::LOAD_CAP)
        .union(Perms::STORE_CAP)
        .union(Perms::STORE_LOCAL_CAP);

    /// The rights masked off when a capability is sealed.
    pub const CLASS_RIGHTS: Perms = Perms::DATA_RIGHTS.union(Perms::EXECUTE);

    /// Rights of a freshly built code window.
    pub const CODE: Perms = Perms::GLOBAL.union(Perms::LOAD).union(Perms::EXECUTE);

    /// Rights of a freshly built data window.
    pub const DATA: Perms = Perms::GLOBAL.union(Perms::DATA_RIGHTS);

    /// Rights the platform root sealing authority carries.
    pub const ROOT: Perms = Perms::GLOBAL.union(Perms::SEAL).union(Perms::UNSEAL);

    /// Names of the set bits, for diagnostics.
    pub fn names(&self) -> Vec<&'static str> {
        self.iter_names().map(|(name, _)| name).collect()
    }
}
