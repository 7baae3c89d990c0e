//! # Selkie Core
//!
//! `selkie_core` provides the capability model at the heart of the Selkie
//! sealing library: the [`Capability`] value type, its permission and
//! object-type vocabulary, the sealing/unsealing primitives, and the error
//! hierarchy shared by the whole system.
//!
//! ## Core Principles
//!
//! 1. **Unforgeable opacity**: sealing is a one-way transformation. A
//!    sealed capability can be inspected but not exercised, and only a
//!    holder of the matching unsealing authority can reverse it.
//!
//! 2. **Narrowing-only derivation**: every operation that produces a new
//!    capability funnels through a single internal derivation that forbids
//!    adding permissions or widening bounds. Amplification exists nowhere
//!    except at the root of the sealing hierarchy.
//!
//! 3. **Values, not objects**: capabilities are immutable values, freely
//!    cloneable and shareable across threads. A failed operation leaves
//!    every input untouched.
//!
//! ## Crate Structure
//!
//! - **capability**: the protected value type and its derivations
//! - **perms**: permission bits and the named permission classes
//! - **otype**: object-type identifiers and namespace ranges
//! - **seal**: the sealing and unsealing primitives
//! - **error**: error types for all Selkie components

pub mod capability;
pub mod error;
pub mod otype;
pub mod perms;
pub mod seal;

// Re-export key types for convenience
pub use capability::{CapSummary, Capability};
pub use error::{AllocError, DeriveError, Error, PlatformError, Result, SealError};
pub use otype::{Otype, OtypeRange};
pub use perms::Perms;
pub use seal::{seal, seal_preserving, unseal};
