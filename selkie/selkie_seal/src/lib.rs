//! # Selkie Seal
//!
//! This crate implements the Selkie sealing protocol on top of the
//! capability model in `selkie_core`: allocating globally-unique object
//! types, minting sealing and unsealing authorities, and building matched
//! code/data object-capability pairs.
//!
//! ## Core Components
//!
//! - **Allocator**: claims unique type ranges from a bounded namespace with
//!   one atomic counter and derives per-object sealing authorities from the
//!   process root
//! - **Object**: constructs sealed `(code, data)` pairs that share a type
//!   but carry disjoint rights
//! - **Root**: the trait seam for fetching the platform root authority,
//!   plus a deterministic in-process implementation
//! - **Audit**: an optional bounded trail of protocol operations
//!
//! ## Usage Example
//!
//! ```
//! use selkie_seal::{
//!     CodeRegion, DataRegion, ObjectCap, RootAuthority, SyntheticRoot, TypeAllocator,
//! };
//!
//! // One root per process, one allocator on top of it.
//! let root = SyntheticRoot::user().fetch_root()?;
//! let allocator = TypeAllocator::new(root)?;
//!
//! // Each object gets its own authority, hence its own type.
//! let authority = allocator.allocate(1)?;
//! let object = ObjectCap::build(
//!     CodeRegion { entry: 0x1000, end: 0x1400 },
//!     DataRegion { base: 0x2000, end: 0x2400 },
//!     &authority,
//! )?;
//!
//! assert_eq!(object.code().otype(), object.data().otype());
//! # Ok::<(), selkie_core::Error>(())
//! ```

pub mod allocator;
pub mod audit;
pub mod object;
pub mod root;

// Re-export commonly used types
pub use allocator::TypeAllocator;
pub use audit::{AuditEntry, AuditLog, AuditOp};
pub use object::{code_window, data_window, CodeRegion, DataRegion, ObjectCap};
pub use root::{RootAuthority, SyntheticRoot};

// The sealing primitives live with the capability model; re-export them so
// this crate's surface covers the whole protocol.
pub use selkie_core::seal::{seal, seal_preserving, unseal};
