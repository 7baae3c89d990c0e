//! A bounded audit trail of sealing-protocol operations.
//!
//! Purely observational: callers that want a trail record into it
//! explicitly, and nothing in the protocol consults it. Errors still
//! propagate to callers as values whether or not they were recorded.

use std::sync::RwLock;
use std::time::{SystemTime, UNIX_EPOCH};

use selkie_core::Otype;

/// The operation an audit entry describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuditOp {
    /// A type-range allocation of the given size.
    Allocate {
        /// Number of slots requested.
        size: u64,
    },

    /// A seal operation.
    Seal,

    /// An unseal operation.
    Unseal,
}

/// An entry in the audit log.
#[derive(Debug, Clone)]
pub struct AuditEntry {
    /// Timestamp of the operation (milliseconds since UNIX epoch).
    pub timestamp: u64,

    /// The operation performed.
    pub op: AuditOp,

    /// The object type involved, when one was determined.
    pub otype: Option<Otype>,

    /// Whether the operation succeeded.
    pub permitted: bool,
}

impl AuditEntry {
    /// Creates a new audit entry stamped with the current time.
    pub fn new(op: AuditOp, otype: Option<Otype>, permitted: bool) -> Self {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as u64;

        AuditEntry {
            timestamp: now,
            op,
            otype,
            permitted,
        }
    }
}

/// A thread-safe, bounded audit log of sealing operations.
pub struct AuditLog {
    entries: RwLock<Vec<AuditEntry>>,
    max_entries: usize,
}

impl AuditLog {
    /// Creates a new audit log keeping at most `max_entries` entries.
    pub fn new(max_entries: usize) -> Self {
        AuditLog {
            entries: RwLock::new(Vec::new()),
            max_entries,
        }
    }

    /// Records an operation, dropping the oldest entries beyond the cap.
    pub fn record(&self, op: AuditOp, otype: Option<Otype>, permitted: bool) {
        let entry = AuditEntry::new(op, otype, permitted);

        let mut entries = self.entries.write().unwrap();
        entries.push(entry);

        if entries.len() > self.max_entries {
            let excess = entries.len() - self.max_entries;
            entries.drain(0..excess);
        }
    }

    /// Snapshot of the current entries, oldest first.
    pub fn entries(&self) -> Vec<AuditEntry> {
        self.entries.read().unwrap().clone()
    }

    /// Clears all entries.
    pub fn clear(&self) {
        self.entries.write().unwrap().clear();
    }

    /// The maximum number of entries retained.
    pub fn max_entries(&self) -> usize {
        self.max_entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_and_snapshot() {
        let log = AuditLog::new(10);
        log.record(AuditOp::Allocate { size: 3 }, None, true);
        log.record(AuditOp::Seal, Some(Otype::new(4)), true);
        log.record(AuditOp::Unseal, Some(Otype::new(4)), false);

        let entries = log.entries();
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0].op, AuditOp::Allocate { size: 3 });
        assert_eq!(entries[1].otype, Some(Otype::new(4)));
        assert!(!entries[2].permitted);
    }

    #[test]
    fn test_trims_oldest_beyond_cap() {
        let log = AuditLog::new(2);
        log.record(AuditOp::Allocate { size: 1 }, None, true);
        log.record(AuditOp::Seal, Some(Otype::new(4)), true);
        log.record(AuditOp::Seal, Some(Otype::new(5)), true);

        let entries = log.entries();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].otype, Some(Otype::new(4)));
        assert_eq!(entries[1].otype, Some(Otype::new(5)));
    }

    #[test]
    fn test_clear() {
        let log = AuditLog::new(4);
        log.record(AuditOp::Seal, Some(Otype::new(4)), true);
        log.clear();
        assert!(log.entries().is_empty());
        assert_eq!(log.max_entries(), 4);
    }
}
